//! Scripted transport used by unit tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::api_caller::{ActionResponse, ApiCaller};
use crate::error::{ApiError, ApiResult};

/// Replays queued responses and records every call it receives.
///
/// An empty queue answers with `retcode 0` and a `null` payload.
#[derive(Default)]
pub(crate) struct StubCaller {
    responses: Mutex<VecDeque<ApiResult<ActionResponse>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl StubCaller {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn push(&self, response: ActionResponse) {
        self.responses.lock().push_back(Ok(response));
    }

    pub(crate) fn push_ok(&self, data: Value) {
        self.push(ActionResponse::ok(data));
    }

    pub(crate) fn push_err(&self, error: ApiError) {
        self.responses.lock().push_back(Err(error));
    }

    /// `(action, wire params)` for every call, in order.
    pub(crate) fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().clone()
    }

    pub(crate) fn actions(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(action, _)| action.clone()).collect()
    }
}

#[async_trait]
impl ApiCaller for StubCaller {
    async fn call(&self, action: &str, params: Value) -> ApiResult<ActionResponse> {
        self.calls.lock().push((action.to_string(), params));
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(ActionResponse::ok(Value::Null)))
    }
}
