//! In-memory [`Backend`] for unit tests.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use crate::api::{Backend, RequestBody};
use crate::error::RequestError;

#[derive(Debug, Clone, PartialEq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<RequestBody>,
}

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16, String),
}

impl Reply {
    fn into_result(self) -> Result<Value, RequestError> {
        match self {
            Reply::Json(v) => Ok(v),
            Reply::Status(status, body) => Err(RequestError::Status { status, body }),
        }
    }
}

/// Records every call and answers by route (path without query string).
///
/// Queued replies are used first, then the route's fallback. `/stats`
/// answers `{num_docs: 0, indexed: 0}` unless told otherwise.
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    queued: Mutex<HashMap<String, VecDeque<Reply>>>,
    fallback: Mutex<HashMap<String, Reply>>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.always("/stats", Reply::Json(json!({"num_docs": 0, "indexed": 0})));
        fake
    }

    /// Every request waits for a permit on `gate` before answering.
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        let mut fake = Self::new();
        fake.gate = Some(gate);
        fake
    }

    pub fn always(&self, route: &str, reply: Reply) {
        self.fallback
            .lock()
            .unwrap()
            .insert(route.to_string(), reply);
    }

    pub fn then(&self, route: &str, reply: Reply) {
        self.queued
            .lock()
            .unwrap()
            .entry(route.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.path).collect()
    }

    async fn answer(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<Value, RequestError> {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_string(),
            body,
        });

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        let route = path.split('?').next().unwrap_or(path);
        let queued = self
            .queued
            .lock()
            .unwrap()
            .get_mut(route)
            .and_then(|q| q.pop_front());
        let reply = queued
            .or_else(|| self.fallback.lock().unwrap().get(route).cloned())
            .unwrap_or_else(|| Reply::Status(404, format!("no route for {}", route)));
        reply.into_result()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn get_json(&self, path: &str) -> Result<Value, RequestError> {
        self.answer(Method::Get, path, None).await
    }

    async fn post_json(
        &self,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<Value, RequestError> {
        self.answer(Method::Post, path, body).await
    }
}
