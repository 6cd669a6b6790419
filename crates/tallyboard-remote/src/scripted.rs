//! In-memory transport for tests and offline runs.
//!
//! Answers each request from a handler closure or a fixed queue of
//! responses, and records every request it receives.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::error::{RemoteError, Result};
use crate::transport::{GraphqlRequest, Transport};

type Handler = dyn Fn(&GraphqlRequest) -> Result<Value> + Send + Sync;

/// A [`Transport`] that never touches the network.
pub struct ScriptedTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<GraphqlRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedTransport {
    /// Answer every request with `handler`
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&GraphqlRequest) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer requests with `responses` in order; once exhausted, every
    /// request fails.
    pub fn from_responses(responses: Vec<Result<Value>>) -> Self {
        let queue = Mutex::new(VecDeque::from(responses));
        Self::new(move |_| {
            lock(&queue)
                .pop_front()
                .unwrap_or_else(|| Err(RemoteError::Http("no scripted response left".into())))
        })
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<GraphqlRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Requests whose document is a mutation
    pub fn mutations(&self) -> Vec<GraphqlRequest> {
        lock(&self.requests)
            .iter()
            .filter(|r| r.query.trim_start().starts_with("mutation"))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &GraphqlRequest, _token: &str) -> Result<Value> {
        lock(&self.requests).push(request.clone());
        (self.handler)(request)
    }
}

impl std::fmt::Debug for ScriptedTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedTransport")
            .field("requests", &self.request_count())
            .finish()
    }
}
