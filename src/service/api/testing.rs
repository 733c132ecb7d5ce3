use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use super::http_client::{HttpClientError, HttpRequest, HttpResponse, HttpTransport};

enum Scripted {
    Respond(HttpResponse),
    Fail(String),
}

/// In-memory transport that replays queued responses in order and records
/// every request it receives.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: serde_json::Value) {
        self.push(Scripted::Respond(HttpResponse {
            status,
            body: body.to_string().into_bytes(),
        }));
    }

    pub fn respond_raw(&self, status: u16, body: &str) {
        self.push(Scripted::Respond(HttpResponse {
            status,
            body: body.as_bytes().to_vec(),
        }));
    }

    pub fn fail(&self, reason: &str) {
        self.push(Scripted::Fail(reason.to_string()));
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    fn push(&self, entry: Scripted) {
        self.script.lock().unwrap().push_back(entry);
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpClientError> {
        self.requests.lock().unwrap().push(request);

        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(reason)) => Err(HttpClientError::Transport(reason)),
            None => Err(HttpClientError::Transport("no scripted response left".into())),
        }
    }
}
