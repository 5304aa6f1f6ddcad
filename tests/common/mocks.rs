//! Test doubles that only integration tests need.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use sessionkit::api::{Interceptor, UnauthorizedListener};
use sessionkit::error::NetworkError;
use sessionkit::session::{SessionStore, User};
use sessionkit::traits::{HttpClient, HttpRequest, Response};

/// Counts unauthorized notifications.
#[derive(Debug, Default)]
pub struct CountingListener {
    calls: AtomicUsize,
}

impl CountingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl UnauthorizedListener for CountingListener {
    fn on_unauthorized(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Records the status of every response it sees.
#[derive(Debug, Default)]
pub struct StatusRecorder {
    statuses: Mutex<Vec<u16>>,
}

impl StatusRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn statuses(&self) -> Vec<u16> {
        self.statuses.lock().unwrap().clone()
    }
}

impl Interceptor for StatusRecorder {
    fn name(&self) -> &'static str {
        "status-recorder"
    }

    fn before_send(&self, request: &mut HttpRequest) {
        request.set_header("X-Request-Source", "tests");
    }

    fn after_response(&self, _request: &HttpRequest, response: &Response) {
        self.statuses.lock().unwrap().push(response.status);
    }
}

/// Transport that answers 401 after a new login landed while the request
/// was in flight.
pub struct LoginWhileInFlight {
    pub session: Arc<SessionStore>,
    pub user: User,
    pub token: String,
    pub requests: Mutex<Vec<HttpRequest>>,
}

impl LoginWhileInFlight {
    pub fn new(session: Arc<SessionStore>, user: User, token: &str) -> Arc<Self> {
        Arc::new(Self {
            session,
            user,
            token: token.to_string(),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for LoginWhileInFlight {
    async fn send(&self, request: &HttpRequest) -> Result<Response, NetworkError> {
        self.requests.lock().unwrap().push(request.clone());
        self.session
            .login(self.user.clone(), self.token.as_str())
            .unwrap();
        Ok(Response::new(401, Bytes::new()))
    }
}
