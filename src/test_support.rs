//! In-process stand-in for the data store, used by the unit tests. It keeps
//! just enough state (mappings and aliases per index) to answer the calls the
//! loader makes, and records every request it sees.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use serde_json::{json, Map, Value};
use tokio::task::JoinHandle;

use crate::conf::Endpoint;
use crate::es_client::EsClient;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Default)]
struct FakeIndex {
    mappings: Value,
    aliases: Map<String, Value>,
}

#[derive(Default)]
struct Inner {
    requests: Vec<RecordedRequest>,
    indices: HashMap<String, FakeIndex>,
    bulk_response: Option<(StatusCode, String)>,
    rejected: Vec<(Method, String)>,
}

type Shared = Arc<Mutex<Inner>>;

pub struct FakeStore {
    url: String,
    state: Shared,
    server: JoinHandle<()>,
}

impl FakeStore {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(Inner::default()));
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { url, state, server }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn client(&self) -> EsClient {
        EsClient::new(Endpoint::new(&self.url), reqwest::Client::new())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Replaces the computed `_bulk` answer with a canned one.
    pub fn set_bulk_response(&self, status: StatusCode, body: &str) {
        self.state.lock().unwrap().bulk_response = Some((status, body.to_string()));
    }

    /// Answers `method path` with a 500 from now on.
    pub fn reject(&self, method: Method, path: &str) {
        self.state.lock().unwrap().rejected.push((method, path.to_string()));
    }
}

impl Drop for FakeStore {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let request = RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        content_type: header_value(&headers, header::CONTENT_TYPE),
        authorization: header_value(&headers, header::AUTHORIZATION),
        body,
    };

    let mut inner = state.lock().unwrap();
    let (status, body) = inner.respond(&method, &request);
    inner.requests.push(request);
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn error(status: StatusCode, kind: &str, reason: &str) -> (StatusCode, Value) {
    (
        status,
        json!({
            "error": { "type": kind, "reason": reason },
            "status": status.as_u16()
        }),
    )
}

fn acknowledged() -> (StatusCode, Value) {
    (StatusCode::OK, json!({ "acknowledged": true }))
}

fn keyed(index: &str, value: Value) -> Value {
    let mut object = Map::new();
    object.insert(index.to_string(), value);
    Value::Object(object)
}

impl Inner {
    fn respond(&mut self, method: &Method, request: &RecordedRequest) -> (StatusCode, String) {
        if self
            .rejected
            .iter()
            .any(|(rejected, path)| rejected == method && *path == request.path)
        {
            let (status, body) = error(StatusCode::INTERNAL_SERVER_ERROR, "exception", "rejected");
            return (status, body.to_string());
        }
        if *method == Method::POST && request.path.ends_with("/_bulk") {
            if let Some((status, body)) = &self.bulk_response {
                return (*status, body.clone());
            }
        }
        let (status, body) = self.route(method, request);
        (status, body.to_string())
    }

    fn route(&mut self, method: &Method, request: &RecordedRequest) -> (StatusCode, Value) {
        let segments: Vec<&str> = request
            .path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        match (method.as_str(), segments.as_slice()) {
            ("GET", []) => (
                StatusCode::OK,
                json!({
                    "name": "fake-node",
                    "cluster_name": "fake-cluster",
                    "cluster_uuid": "fake-uuid",
                    "version": { "number": "6.4.0", "lucene_version": "7.4.0" },
                    "tagline": "You Know, for Search"
                }),
            ),
            ("PUT", [index]) => {
                if self.indices.contains_key(*index) {
                    return error(
                        StatusCode::BAD_REQUEST,
                        "resource_already_exists_exception",
                        &format!("index [{}] already exists", index),
                    );
                }
                let definition: Value = serde_json::from_str(&request.body).unwrap_or_default();
                self.indices.insert(
                    index.to_string(),
                    FakeIndex {
                        mappings: definition["mappings"].clone(),
                        aliases: Map::new(),
                    },
                );
                (
                    StatusCode::OK,
                    json!({ "acknowledged": true, "shards_acknowledged": true, "index": index }),
                )
            }
            ("POST", [_, _, "_bulk"]) => {
                let items: Vec<Value> = request
                    .body
                    .lines()
                    .step_by(2)
                    .map(|_| json!({ "index": { "status": 201 } }))
                    .collect();
                (StatusCode::OK, json!({ "took": 1, "errors": false, "items": items }))
            }
            ("POST" | "PUT", [index, "_alias", alias]) => {
                let Some(fake) = self.indices.get_mut(*index) else {
                    return error(StatusCode::NOT_FOUND, "index_not_found_exception", "no such index");
                };
                let definition: Value = serde_json::from_str(&request.body).unwrap_or_default();
                fake.aliases.insert(alias.to_string(), definition);
                acknowledged()
            }
            ("GET", [index, "_mapping"]) => match self.indices.get(*index) {
                Some(fake) => (StatusCode::OK, keyed(index, json!({ "mappings": fake.mappings }))),
                None => error(StatusCode::NOT_FOUND, "index_not_found_exception", "no such index"),
            },
            ("GET", [index, "_alias"]) => match self.indices.get(*index) {
                Some(fake) => (StatusCode::OK, keyed(index, json!({ "aliases": fake.aliases }))),
                None => error(StatusCode::NOT_FOUND, "index_not_found_exception", "no such index"),
            },
            _ => error(StatusCode::BAD_REQUEST, "illegal_argument_exception", "no handler found"),
        }
    }
}
