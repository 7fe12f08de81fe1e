//! Shared test doubles for the resource API tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use punchcard_access::{AccessContext, SessionStore};
use punchcard_gateway::{
    AccessEvent, AccessObserver, Gateway, GatewayConfig, Transport, TransportError, WireRequest,
    WireResponse,
};
use tempfile::TempDir;

pub(crate) fn json_response(status: u16, body: &str) -> Result<WireResponse, TransportError> {
    Ok(WireResponse {
        status,
        body: body.as_bytes().to_vec(),
    })
}

pub(crate) struct StubTransport {
    responses: Mutex<VecDeque<Result<WireResponse, TransportError>>>,
    requests: Mutex<Vec<WireRequest>>,
}

impl StubTransport {
    fn new(responses: &[Result<WireResponse, TransportError>]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().cloned().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().expect("lock").len()
    }

    pub(crate) fn last_request(&self) -> WireRequest {
        self.requests
            .lock()
            .expect("lock")
            .last()
            .expect("at least one request")
            .clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn execute(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        self.requests.lock().expect("lock").push(request);
        self.responses
            .lock()
            .expect("lock")
            .pop_front()
            .expect("a queued response")
    }
}

#[derive(Default)]
pub(crate) struct CollectingObserver {
    events: Mutex<Vec<AccessEvent>>,
}

impl CollectingObserver {
    pub(crate) fn events(&self) -> Vec<AccessEvent> {
        self.events.lock().expect("lock").clone()
    }
}

impl AccessObserver for CollectingObserver {
    fn on_event(&self, event: AccessEvent) {
        self.events.lock().expect("lock").push(event);
    }
}

pub(crate) struct Fixture {
    pub(crate) gateway: Arc<Gateway>,
    pub(crate) access: AccessContext,
    pub(crate) store: Arc<SessionStore>,
    pub(crate) transport: Arc<StubTransport>,
    pub(crate) observer: Arc<CollectingObserver>,
    _dir: TempDir,
}

impl Fixture {
    /// A fixture with no persisted session.
    pub(crate) fn new(responses: &[Result<WireResponse, TransportError>]) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let store =
            Arc::new(SessionStore::open(dir.path().join("session.json")).expect("open store"));
        let transport = Arc::new(StubTransport::new(responses));
        let observer = Arc::new(CollectingObserver::default());
        let gateway = Arc::new(Gateway::new(
            GatewayConfig::new("https://api.example.com/api", "https://store.example.com/api"),
            store.clone(),
            transport.clone(),
            observer.clone(),
        ));
        let access = AccessContext::new(store.clone());
        Self {
            gateway,
            access,
            store,
            transport,
            observer,
            _dir: dir,
        }
    }

    /// A fixture with a persisted `tok1`/`alice` session.
    pub(crate) fn signed_in(responses: &[Result<WireResponse, TransportError>]) -> Self {
        let fixture = Self::new(responses);
        fixture
            .store
            .set_session("tok1", "alice")
            .expect("set session");
        fixture
    }
}
