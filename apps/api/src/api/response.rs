//! Success envelopes shared by the handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::domain::pagination::{PageMeta, Paginated};

/// `{"status":"success","data":...}` plus optional `results` and `pagination`
#[derive(Debug, Serialize)]
pub struct Envelope {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<PageMeta>,
    data: Value,
}

impl Envelope {
    pub fn data(data: Value) -> Self {
        Self {
            status: "success",
            results: None,
            pagination: None,
            data,
        }
    }

    /// List payload under `key`, counted in `results`
    pub fn list<T: Serialize>(key: &str, items: &[T]) -> Self {
        let mut data = Map::new();
        data.insert(key.to_string(), json!(items));
        let mut envelope = Self::data(Value::Object(data));
        envelope.results = Some(items.len());
        envelope
    }

    /// One page of `page` under `key`
    pub fn page<T: Serialize>(key: &str, page: &Paginated<T>) -> Self {
        Self::paged(key, &page.items, page.meta())
    }

    /// List payload with pagination computed elsewhere
    pub fn paged<T: Serialize>(key: &str, items: &[T], meta: PageMeta) -> Self {
        let mut envelope = Self::list(key, items);
        envelope.pagination = Some(meta);
        envelope
    }

    /// Adds a sibling field next to the payload inside `data`
    pub fn insert(&mut self, key: &str, value: Value) {
        if let Value::Object(data) = &mut self.data {
            data.insert(key.to_string(), value);
        }
    }

    pub fn ok(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }

    pub fn created(self) -> Response {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}

/// Plain `{"status":"success","message":...}`
pub fn message(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "status": "success", "message": message })),
    )
        .into_response()
}
