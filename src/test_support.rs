use std::cell::RefCell;
use std::collections::VecDeque;

use serde_json::Value;

use crate::error::TransportError;
use crate::fetch::{HttpRequest, HttpResponse, Transport};

/// Replays queued responses and records every request it sees.
pub(crate) struct MockTransport {
    responses: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self {
            responses: RefCell::new(VecDeque::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn respond(status: u16, body: &str) -> Self {
        Self::new().then_respond(status, body)
    }

    pub(crate) fn json(status: u16, body: &Value) -> Self {
        Self::respond(status, &body.to_string())
    }

    pub(crate) fn failing(reason: &str) -> Self {
        let transport = Self::new();
        transport
            .responses
            .borrow_mut()
            .push_back(Err(TransportError::Connect(reason.to_string())));
        transport
    }

    pub(crate) fn then_respond(self, status: u16, body: &str) -> Self {
        self.responses.borrow_mut().push_back(Ok(HttpResponse {
            status,
            body: body.to_string(),
        }));
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connect("no response queued".into())))
    }
}
