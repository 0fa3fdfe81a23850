use std::{collections::BTreeMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: u64,
    pub name: String,
}

#[derive(Deserialize)]
pub struct ItemInput {
    pub name: String,
}

/// What `/echo` saw: the method, every header, and the parsed JSON body.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Echo {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

pub struct Store {
    next_id: u64,
    items: BTreeMap<u64, Item>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store {
        next_id: 1,
        items: BTreeMap::new(),
    }));
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/{id}", get(get_item).put(update_item))
        .route("/echo", any(echo))
        .route("/empty", get(empty))
        .route("/garbage", get(garbage))
        .route("/zeros/{count}", get(zeros))
        .route("/latin1", get(latin1))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_items(State(db): State<Db>) -> Json<Vec<Item>> {
    let store = db.read().await;
    Json(store.items.values().cloned().collect())
}

async fn create_item(
    State(db): State<Db>,
    Json(input): Json<ItemInput>,
) -> (StatusCode, Json<Item>) {
    let mut store = db.write().await;
    let item = Item {
        id: store.next_id,
        name: input.name,
    };
    store.next_id += 1;
    store.items.insert(item.id, item.clone());
    (StatusCode::CREATED, Json(item))
}

async fn get_item(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Item>, StatusCode> {
    let store = db.read().await;
    store.items.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_item(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<ItemInput>,
) -> Result<Json<Item>, StatusCode> {
    let mut store = db.write().await;
    let item = store.items.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    item.name = input.name;
    Ok(Json(item.clone()))
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Result<Json<Echo>, StatusCode> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = if body.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&body).map_err(|_| StatusCode::BAD_REQUEST)?)
    };
    Ok(Json(Echo {
        method: method.to_string(),
        headers,
        body,
    }))
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn garbage() -> ([(header::HeaderName, &'static str); 1], &'static str) {
    ([(header::CONTENT_TYPE, "text/plain")], "not json")
}

/// A JSON array of `count` zeros, for bodies of a chosen size.
async fn zeros(Path(count): Path<usize>) -> Json<Vec<u8>> {
    Json(vec![0; count])
}

/// A JSON item whose `x-latin1` header value is not valid UTF-8.
async fn latin1() -> Result<([(header::HeaderName, HeaderValue); 1], Json<Item>), StatusCode> {
    let value = HeaderValue::from_bytes(b"caf\xe9").map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let item = Item {
        id: 1,
        name: "café".to_string(),
    };
    Ok(([(header::HeaderName::from_static("x-latin1"), value)], Json(item)))
}
