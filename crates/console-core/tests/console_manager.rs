//! End-to-end tests for the console manager: token acquisition, the
//! readiness gate, and event-driven state reconciliation, with the backend
//! mocked by wiremock and the calling SDK replaced by a recording adapter.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leadcall_console_core::{
    adapter_event_channel, AdapterErrorKind, AdapterEvent, AdapterEventSender, CallAdapter,
    CallSessionState, CallUser, CalloutState, ConsoleConfig, ConsoleError, ConsoleEvent,
    ConsoleManager, ConsoleResult, LeadTable, NoticeLevel, ReadyCallCheck, NOT_READY_MESSAGE,
};

/// Adapter double that records every forwarded intent.
#[derive(Default)]
struct RecordingAdapter {
    ready: AtomicBool,
    init_calls: AtomicUsize,
    logins: Mutex<Vec<String>>,
    hangups: Mutex<Vec<String>>,
    logouts: AtomicUsize,
}

impl RecordingAdapter {
    fn logins(&self) -> Vec<String> {
        self.logins.lock().unwrap().clone()
    }
}

#[async_trait]
impl CallAdapter for RecordingAdapter {
    async fn init(&self) -> ConsoleResult<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn login(&self, token: &str) -> ConsoleResult<()> {
        self.logins.lock().unwrap().push(token.to_string());
        Ok(())
    }

    async fn logout(&self) -> ConsoleResult<()> {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn check_ready_call(&self, _check: &ReadyCallCheck) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn hang_up(&self, user: &CallUser) -> ConsoleResult<()> {
        self.hangups.lock().unwrap().push(user.phone.clone());
        Ok(())
    }

    async fn answer(&self, _user: &CallUser) -> ConsoleResult<()> {
        Ok(())
    }

    async fn refuse(&self, _user: &CallUser) -> ConsoleResult<()> {
        Ok(())
    }

    async fn check_quality(&self) -> ConsoleResult<()> {
        Ok(())
    }
}

struct Harness {
    server: MockServer,
    adapter: Arc<RecordingAdapter>,
    manager: Arc<ConsoleManager>,
    events: AdapterEventSender,
}

async fn harness() -> Harness {
    let server = MockServer::start().await;
    let adapter = Arc::new(RecordingAdapter::default());
    let (events, event_rx) = adapter_event_channel();

    let config = ConsoleConfig::new(server.uri());
    let manager =
        ConsoleManager::new(config, adapter.clone()).expect("manager construction");
    manager.start(event_rx).await.expect("manager start");

    Harness { server, adapter, manager, events }
}

/// Poll until the condition holds, failing after ~1s. The event pump runs
/// on a spawned task, so effects of pushed events land asynchronously.
async fn wait_until<F: FnMut() -> bool>(mut condition: F, what: &str) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for: {}", what);
}

fn token_response(token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "code": 0,
        "message": "",
        "data": { "token": token, "request_id": "r-token" }
    }))
}

#[tokio::test]
async fn token_success_stores_token_and_logs_the_adapter_in() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/voipcall_token/get"))
        .and(body_json(json!({ "account_id": 20458, "user_id": 20458 })))
        .respond_with(token_response("T1"))
        .expect(1)
        .mount(&h.server)
        .await;

    h.manager.fetch_token_and_login().await.expect("token flow");

    assert_eq!(h.manager.credentials().await.token, "T1");
    assert_eq!(h.adapter.logins(), vec!["T1".to_string()]);
    assert!(!h.manager.is_fetching());
}

#[tokio::test]
async fn token_rejection_surfaces_backend_message_and_keeps_token() {
    let h = harness().await;
    let mut subscription = h.manager.subscribe();

    Mock::given(method("POST"))
        .and(path("/voipcall_token/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 7,
            "message": "bad"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.manager.fetch_token_and_login().await.unwrap_err();
    assert!(matches!(err, ConsoleError::BackendRejected { code: 7, .. }));

    // The backend's wording travels verbatim to the operator.
    match subscription.receiver.recv().await.expect("notice event") {
        ConsoleEvent::Notice(notice) => {
            assert_eq!(notice.level, NoticeLevel::Error);
            assert_eq!(notice.message, "bad");
        }
        other => panic!("unexpected event: {:?}", other),
    }

    assert_eq!(h.manager.credentials().await.token, "");
    assert!(h.adapter.logins().is_empty());
    assert!(!h.manager.is_fetching(), "guard must clear after failure");
}

#[tokio::test]
async fn call_lead_sends_the_exact_reference_body() {
    let h = harness().await;
    h.adapter.ready.store(true, Ordering::SeqCst);

    Mock::given(method("POST"))
        .and(path("/voipcall/create"))
        .and(body_json(json!({
            "account_id": 20458,
            "leads_id": 218001014,
            "user_id": 20458,
            "callee_number": "13810433402"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "",
            "data": { "contact_id": "c-1", "request_id": "r-call" }
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let table = LeadTable::new();
    let lead = table.get("0").unwrap();
    h.manager.call_lead(lead).await.expect("call creation");

    // Call state is untouched; only adapter events drive it.
    assert_eq!(h.manager.session_state().await, CallSessionState::default());
}

#[tokio::test]
async fn not_ready_blocks_the_backend_request() {
    let h = harness().await;
    let mut subscription = h.manager.subscribe();

    Mock::given(method("POST"))
        .and(path("/voipcall/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": 0 })))
        .expect(0)
        .mount(&h.server)
        .await;

    let table = LeadTable::new();
    let err = h.manager.call_lead(table.get("0").unwrap()).await.unwrap_err();
    assert!(matches!(err, ConsoleError::NotReady));

    match subscription.receiver.recv().await.expect("notice event") {
        ConsoleEvent::Notice(notice) => assert_eq!(notice.message, NOT_READY_MESSAGE),
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn backend_call_rejection_surfaces_message_without_touching_state() {
    let h = harness().await;
    h.adapter.ready.store(true, Ordering::SeqCst);
    let mut subscription = h.manager.subscribe();

    Mock::given(method("POST"))
        .and(path("/voipcall/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 12,
            "message": "quota exceeded"
        })))
        .mount(&h.server)
        .await;

    let table = LeadTable::new();
    let err = h.manager.call_lead(table.get("1").unwrap()).await.unwrap_err();
    assert!(matches!(err, ConsoleError::BackendRejected { code: 12, .. }));

    match subscription.receiver.recv().await.expect("notice event") {
        ConsoleEvent::Notice(notice) => assert_eq!(notice.message, "quota exceeded"),
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(h.manager.session_state().await, CallSessionState::default());
}

#[tokio::test]
async fn login_expired_triggers_exactly_one_silent_refetch_with_last_used_pair() {
    let h = harness().await;

    // The last-used pair is what the recovery path must reuse, even after
    // the configured credentials change.
    Mock::given(method("POST"))
        .and(path("/voipcall_token/get"))
        .and(body_json(json!({ "account_id": 20458, "user_id": 20458 })))
        .respond_with(token_response("T1"))
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/voipcall_token/get"))
        .and(body_json(json!({ "account_id": 999, "user_id": 888 })))
        .respond_with(token_response("T-wrong"))
        .expect(0)
        .mount(&h.server)
        .await;

    h.manager.fetch_token_and_login().await.expect("initial token flow");
    h.manager.set_credentials(999, 888).await;

    let mut subscription = h.manager.subscribe();
    h.events
        .send(AdapterEvent::Error {
            kind: AdapterErrorKind::LoginExpired,
            message: String::new(),
        })
        .expect("event push");

    let adapter = h.adapter.clone();
    wait_until(|| adapter.logins().len() == 2, "silent re-login").await;
    assert_eq!(h.adapter.logins(), vec!["T1".to_string(), "T1".to_string()]);

    // Silent: no user-visible notice for this event.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(matches!(
        subscription.receiver.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Empty)
    ));
}

#[tokio::test]
async fn other_adapter_errors_surface_their_message() {
    let h = harness().await;
    let mut subscription = h.manager.subscribe();

    h.events
        .send(AdapterEvent::Error {
            kind: AdapterErrorKind::Other("media_failed".to_string()),
            message: "no mic".to_string(),
        })
        .expect("event push");

    match subscription.receiver.recv().await.expect("notice event") {
        ConsoleEvent::Notice(notice) => {
            assert_eq!(notice.level, NoticeLevel::Error);
            assert_eq!(notice.message, "no mic");
        }
        other => panic!("unexpected event: {:?}", other),
    }

    // An empty SDK message falls back to the type code.
    h.events
        .send(AdapterEvent::Error {
            kind: AdapterErrorKind::Other("ws_closed".to_string()),
            message: String::new(),
        })
        .expect("event push");
    match subscription.receiver.recv().await.expect("notice event") {
        ConsoleEvent::Notice(notice) => assert_eq!(notice.message, "ws_closed"),
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn state_events_flow_through_the_pump() {
    let h = harness().await;
    let mut subscription = h.manager.subscribe();

    h.events
        .send(AdapterEvent::LoginStateChanged { logged_in: true })
        .expect("event push");
    h.events
        .send(AdapterEvent::CalloutStateChanged {
            state: CalloutState::Calling,
            user: Some(CallUser::new("colin", "13810433402")),
        })
        .expect("event push");

    match subscription.receiver.recv().await.expect("session event") {
        ConsoleEvent::SessionChanged(state) => assert!(state.logged_in),
        other => panic!("unexpected event: {:?}", other),
    }
    match subscription.receiver.recv().await.expect("session event") {
        ConsoleEvent::SessionChanged(state) => {
            assert_eq!(state.callout_state, CalloutState::Calling);
            assert_eq!(state.callout_user.unwrap().name, "colin");
        }
        other => panic!("unexpected event: {:?}", other),
    }

    let state = h.manager.session_state().await;
    assert!(state.logged_in);
    assert_eq!(state.callout_state, CalloutState::Calling);
}

#[tokio::test]
async fn intents_are_forwarded_without_mutating_state() {
    let h = harness().await;
    let colin = CallUser::new("colin", "13810433402");

    h.events
        .send(AdapterEvent::CalloutStateChanged {
            state: CalloutState::Calling,
            user: Some(colin.clone()),
        })
        .expect("event push");
    let manager = h.manager.clone();
    wait_until_async(&manager).await;

    h.manager.hang_up(&colin).await.expect("hang up");
    assert_eq!(h.adapter.hangups.lock().unwrap().as_slice(), ["13810433402"]);

    // Still Calling: the state only changes when the SDK reports it.
    assert_eq!(h.manager.session_state().await.callout_state, CalloutState::Calling);

    h.events
        .send(AdapterEvent::CalloutStateChanged {
            state: CalloutState::HangupLocal,
            user: Some(colin),
        })
        .expect("event push");
    let manager = h.manager.clone();
    for _ in 0..100 {
        if manager.session_state().await.callout_state == CalloutState::HangupLocal {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("hang-up state never arrived");
}

async fn wait_until_async(manager: &Arc<ConsoleManager>) {
    for _ in 0..100 {
        if manager.session_state().await.callout_state == CalloutState::Calling {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("calling state never arrived");
}

#[tokio::test]
async fn logout_flips_state_only_on_the_adapter_event() {
    let h = harness().await;

    h.events
        .send(AdapterEvent::LoginStateChanged { logged_in: true })
        .expect("event push");
    wait_for_login_state(&h.manager, true).await;

    h.manager.logout().await.expect("logout");
    assert_eq!(h.adapter.logouts.load(Ordering::SeqCst), 1);
    assert!(h.manager.session_state().await.logged_in, "state waits for the event");

    h.events
        .send(AdapterEvent::LoginStateChanged { logged_in: false })
        .expect("event push");
    wait_for_login_state(&h.manager, false).await;
}

async fn wait_for_login_state(manager: &Arc<ConsoleManager>, logged_in: bool) {
    for _ in 0..100 {
        if manager.session_state().await.logged_in == logged_in {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("login state {} never arrived", logged_in);
}

#[tokio::test]
async fn concurrent_token_fetch_fails_fast_without_a_second_request() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/voipcall_token/get"))
        .respond_with(token_response("T1").set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&h.server)
        .await;

    let manager = h.manager.clone();
    let first = tokio::spawn(async move { manager.fetch_token_and_login().await });

    let manager = h.manager.clone();
    wait_until(|| manager.is_fetching(), "fetch in flight").await;

    // Second call while the first is in flight: fails fast, sends nothing
    // (the mock's expect(1) verifies no second POST on server shutdown).
    let err = h.manager.fetch_token_and_login().await.unwrap_err();
    assert!(matches!(err, ConsoleError::FetchInFlight));
    assert!(h.manager.is_fetching());

    first.await.expect("task join").expect("first fetch");
    assert_eq!(h.manager.credentials().await.token, "T1");
    assert_eq!(h.adapter.logins(), vec!["T1".to_string()]);
    assert!(!h.manager.is_fetching());
}

#[tokio::test]
async fn callout_user_requires_sdk_user_context() {
    let h = harness().await;

    let err = h.manager.callout_user().await.unwrap_err();
    assert!(matches!(err, ConsoleError::MissingCallUser));

    h.events
        .send(AdapterEvent::CalloutStateChanged {
            state: CalloutState::Calling,
            user: Some(CallUser::new("colin", "13810433402")),
        })
        .expect("event push");
    wait_until_async(&h.manager).await;
    assert_eq!(
        h.manager.callout_user().await.expect("call user").phone,
        "13810433402"
    );
}

#[tokio::test]
async fn starting_twice_is_rejected() {
    let h = harness().await;
    assert_eq!(h.adapter.init_calls.load(Ordering::SeqCst), 1);

    let (_tx, rx) = adapter_event_channel();
    let err = h.manager.start(rx).await.unwrap_err();
    assert!(matches!(err, ConsoleError::AlreadyInitialized { .. }));
    assert_eq!(h.adapter.init_calls.load(Ordering::SeqCst), 1);
}
