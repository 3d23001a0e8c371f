//! In-process store backend for end-to-end tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

type Params = Query<HashMap<String, String>>;

/// A multipart request the backend received.
#[derive(Debug, Clone)]
pub struct Upload {
    pub product_id: i64,
    pub content_type: String,
    pub body: Vec<u8>,
}

#[derive(Default)]
pub struct Store {
    pub brands: Vec<Value>,
    pub products: Vec<Value>,
    pub list_queries: Vec<HashMap<String, String>>,
    pub deleted: Vec<i64>,
    pub uploads: Vec<Upload>,
    /// List endpoints answer 500 while set; writes keep working
    pub fail_lists: bool,
    next_id: i64,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Brands answer bare arrays capped at `limit`, products answer
/// `{data, total}` and sales always fail with a plain-text 500.
#[derive(Clone, Default)]
pub struct MockBackend {
    store: Arc<Mutex<Store>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_brands(self, count: i64) -> Self {
        {
            let mut store = self.store();
            for _ in 0..count {
                let id = store.next_id();
                store.brands.push(json!({
                    "id": id,
                    "name": format!("Marca {}", id),
                    "description": null,
                }));
            }
        }
        self
    }

    pub fn with_products(self, count: i64) -> Self {
        {
            let mut store = self.store();
            for _ in 0..count {
                let id = store.next_id();
                store.products.push(json!({
                    "id": id,
                    "name": format!("Producto {}", id),
                    "sku": format!("SKU-{:03}", id),
                    "price": format!("{}.50", id * 100),
                    "stock": id,
                }));
            }
        }
        self
    }

    pub fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap()
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/api/marcas", get(list_brands).post(create_brand))
            .route(
                "/api/marcas/:id",
                get(get_brand).put(update_brand).delete(delete_brand),
            )
            .route("/api/productos", get(list_products).post(create_product))
            .route("/api/productos/:id/imagen", post(upload_image))
            .route("/api/productos/:id/ficha-tecnica", post(upload_datasheet))
            .route("/api/ventas", get(list_sales))
            .with_state(self.clone())
    }

    /// Serves on an ephemeral port and returns the API base URL.
    pub async fn spawn(&self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = self.router();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{}/api", addr)
    }
}

fn param<T: std::str::FromStr>(params: &HashMap<String, String>, name: &str) -> Option<T> {
    params.get(name).and_then(|value| value.parse().ok())
}

fn wants_all(params: &HashMap<String, String>) -> bool {
    params.get("all").map(String::as_str) == Some("true")
}

fn filtered(items: &[Value], params: &HashMap<String, String>) -> Vec<Value> {
    let search = params
        .get("search")
        .map(|s| s.to_lowercase())
        .unwrap_or_default();
    items
        .iter()
        .filter(|item| {
            item["name"]
                .as_str()
                .is_some_and(|name| name.to_lowercase().contains(&search))
        })
        .cloned()
        .collect()
}

fn page_of(items: &[Value], params: &HashMap<String, String>) -> Vec<Value> {
    let page: usize = param(params, "page").unwrap_or(1).max(1);
    let limit: usize = param(params, "limit").unwrap_or(items.len());
    items
        .iter()
        .skip((page - 1) * limit)
        .take(limit)
        .cloned()
        .collect()
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "statusCode": 404,
            "message": format!("{} no encontrada", what),
            "error": "Not Found",
        })),
    )
        .into_response()
}

fn list_failure() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "list unavailable").into_response()
}

async fn list_brands(State(backend): State<MockBackend>, Query(params): Params) -> Response {
    let mut store = backend.store();
    store.list_queries.push(params.clone());
    if store.fail_lists {
        return list_failure();
    }

    let brands = filtered(&store.brands, &params);
    if wants_all(&params) {
        return Json(Value::Array(brands)).into_response();
    }
    Json(Value::Array(page_of(&brands, &params))).into_response()
}

async fn get_brand(State(backend): State<MockBackend>, Path(id): Path<i64>) -> Response {
    let store = backend.store();
    match store.brands.iter().find(|brand| brand["id"] == id) {
        Some(brand) => Json(brand.clone()).into_response(),
        None => not_found("Marca"),
    }
}

async fn create_brand(State(backend): State<MockBackend>, Json(body): Json<Value>) -> Response {
    let name = body["name"].as_str().unwrap_or_default();
    if name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "statusCode": 400,
                "message": ["name should not be empty", "name must be a string"],
                "error": "Bad Request",
            })),
        )
            .into_response();
    }

    let mut store = backend.store();
    let mut brand = body.clone();
    brand["id"] = json!(store.next_id());
    store.brands.push(brand.clone());
    (StatusCode::CREATED, Json(brand)).into_response()
}

async fn update_brand(
    State(backend): State<MockBackend>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut store = backend.store();
    let Some(brand) = store.brands.iter_mut().find(|brand| brand["id"] == id) else {
        return not_found("Marca");
    };

    if let (Some(target), Some(changes)) = (brand.as_object_mut(), body.as_object()) {
        for (key, value) in changes {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(brand.clone()).into_response()
}

async fn delete_brand(State(backend): State<MockBackend>, Path(id): Path<i64>) -> Response {
    let mut store = backend.store();
    let before = store.brands.len();
    store.brands.retain(|brand| brand["id"] != id);
    if store.brands.len() == before {
        return not_found("Marca");
    }
    store.deleted.push(id);
    StatusCode::NO_CONTENT.into_response()
}

async fn list_products(State(backend): State<MockBackend>, Query(params): Params) -> Response {
    let mut store = backend.store();
    store.list_queries.push(params.clone());
    if store.fail_lists {
        return list_failure();
    }

    let products = filtered(&store.products, &params);
    if wants_all(&params) {
        return Json(Value::Array(products)).into_response();
    }
    Json(json!({
        "data": page_of(&products, &params),
        "total": products.len(),
    }))
    .into_response()
}

async fn create_product(State(backend): State<MockBackend>, Json(body): Json<Value>) -> Response {
    let mut store = backend.store();
    let mut product = body.clone();
    product["id"] = json!(store.next_id());
    store.products.push(product.clone());
    (StatusCode::CREATED, Json(product)).into_response()
}

/// Records a multipart upload and stores `url` under `field` of the product.
fn attach(
    backend: &MockBackend,
    id: i64,
    headers: &HeaderMap,
    body: Bytes,
    field: &str,
    url: String,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let mut store = backend.store();
    store.uploads.push(Upload {
        product_id: id,
        content_type,
        body: body.to_vec(),
    });

    let Some(product) = store.products.iter_mut().find(|product| product["id"] == id) else {
        return not_found("Producto");
    };
    product[field] = json!(url);
    Json(product.clone()).into_response()
}

async fn upload_image(
    State(backend): State<MockBackend>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let url = format!("/uploads/productos/{}.png", id);
    attach(&backend, id, &headers, body, "image_url", url)
}

async fn upload_datasheet(
    State(backend): State<MockBackend>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let url = format!("/uploads/fichas/{}.pdf", id);
    attach(&backend, id, &headers, body, "datasheet_url", url)
}

async fn list_sales() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}
