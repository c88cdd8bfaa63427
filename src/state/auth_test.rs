use std::collections::VecDeque;
use std::sync::atomic::AtomicUsize;

use futures::channel::oneshot;
use futures::executor::block_on;
use serde_json::{Value, json};

use super::*;
use crate::config::GatewayConfig;
use crate::net::api::GatewayError;
use crate::net::types::{LogoutEnvelope, PublicSettingsEnvelope, StatusEnvelope};

// =============================================================
// Scripted gateway
// =============================================================

enum Reply {
    Json(Value),
    Offline,
}

#[derive(Default)]
struct Endpoint {
    replies: Mutex<VecDeque<Reply>>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    calls: AtomicUsize,
}

impl Endpoint {
    fn push(&self, reply: Reply) {
        lock(&self.replies).push_back(reply);
    }

    /// Keep the next call pending until the returned sender fires.
    fn hold(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *lock(&self.gate) = Some(rx);
        tx
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next<T: serde::de::DeserializeOwned>(&self) -> Result<T, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = lock(&self.gate).take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let reply = lock(&self.replies).pop_front().unwrap_or(Reply::Offline);
        match reply {
            Reply::Json(value) => {
                serde_json::from_value(value).map_err(|e| GatewayError::Decode(e.to_string()))
            }
            Reply::Offline => Err(GatewayError::Transport("offline".to_owned())),
        }
    }
}

#[derive(Default)]
struct FakeGateway {
    config: GatewayConfig,
    status: Endpoint,
    settings: Endpoint,
    logout: Endpoint,
}

impl Gateway for FakeGateway {
    fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn fetch_status(&self) -> Result<StatusEnvelope, GatewayError> {
        self.status.next().await
    }

    async fn fetch_public_settings(&self) -> Result<PublicSettingsEnvelope, GatewayError> {
        self.settings.next().await
    }

    async fn post_logout(&self) -> Result<LogoutEnvelope, GatewayError> {
        self.logout.next().await
    }
}

fn store() -> AuthStore<FakeGateway> {
    AuthStore::new(FakeGateway {
        config: GatewayConfig::new("https://auth.example.com"),
        ..FakeGateway::default()
    })
}

fn alice() -> User {
    User {
        id: 1,
        username: "alice".to_owned(),
        email: None,
        name: None,
        avatar: None,
    }
}

fn logged_in_reply() -> Reply {
    Reply::Json(json!({
        "success": true,
        "data": {"loggedIn": true, "user": {"id": 1, "username": "alice"}}
    }))
}

fn recorder(store: &AuthStore<FakeGateway>) -> (Arc<Mutex<Vec<AuthState>>>, Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let sub = store.subscribe(move |s| lock(&sink).push(s.clone()));
    (seen, sub)
}

// =============================================================
// Initial state + subscriptions
// =============================================================

#[test]
fn new_store_starts_loading_and_uninitialized() {
    let state = store().get_state();
    assert_eq!(
        state,
        AuthState {
            user: None,
            loading: true,
            initialized: false,
        }
    );
}

#[test]
fn subscribe_calls_listener_once_with_current_state() {
    let store = store();
    let (seen, _sub) = recorder(&store);
    assert_eq!(*lock(&seen), vec![AuthState::default()]);
}

#[test]
fn subscribe_after_resolution_sees_resolved_state() {
    let store = store();
    store.gateway().status.push(logged_in_reply());
    block_on(store.check_status());

    let (seen, _sub) = recorder(&store);
    let seen = lock(&seen);
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].user, Some(alice()));
}

#[test]
fn check_status_notifies_loading_then_resolved() {
    let store = store();
    let (seen, _sub) = recorder(&store);
    store.gateway().status.push(logged_in_reply());

    block_on(store.check_status());

    let seen = lock(&seen);
    assert_eq!(seen.len(), 3);
    assert!(seen[1].loading);
    assert!(!seen[2].loading);
    assert!(seen[2].initialized);
}

#[test]
fn every_subscriber_is_notified_in_registration_order() {
    let store = store();
    let order = Arc::new(Mutex::new(Vec::new()));
    let first = Arc::clone(&order);
    let second = Arc::clone(&order);
    let _a = store.subscribe(move |_| lock(&first).push("a"));
    let _b = store.subscribe(move |_| lock(&second).push("b"));
    lock(&order).clear();

    block_on(store.check_status());

    assert_eq!(*lock(&order), vec!["a", "b", "a", "b"]);
}

#[test]
fn unsubscribed_listener_is_not_called_again() {
    let store = store();
    let (seen, sub) = recorder(&store);
    sub.unsubscribe();

    block_on(store.check_status());

    assert_eq!(lock(&seen).len(), 1);
}

#[test]
fn dropping_subscription_keeps_listener() {
    let store = store();
    let (seen, sub) = recorder(&store);
    drop(sub);

    block_on(store.check_status());

    assert_eq!(lock(&seen).len(), 3);
}

#[test]
fn listener_can_read_store_reentrantly() {
    let store = store();
    let reader = store.clone();
    let matched = Arc::new(AtomicUsize::new(0));
    let count = Arc::clone(&matched);
    let _sub = store.subscribe(move |s| {
        if reader.get_state() == *s {
            count.fetch_add(1, Ordering::SeqCst);
        }
    });

    block_on(store.check_status());

    assert_eq!(matched.load(Ordering::SeqCst), 3);
}

// =============================================================
// check_status
// =============================================================

#[test]
fn check_status_logged_in_sets_user() {
    let store = store();
    store.gateway().status.push(logged_in_reply());

    let user = block_on(store.check_status());

    assert_eq!(user, Some(alice()));
    assert_eq!(
        store.get_state(),
        AuthState {
            user: Some(alice()),
            loading: false,
            initialized: true,
        }
    );
}

#[test]
fn check_status_network_error_resolves_logged_out() {
    let store = store();
    store.gateway().status.push(Reply::Offline);

    assert_eq!(block_on(store.check_status()), None);
    assert_eq!(
        store.get_state(),
        AuthState {
            user: None,
            loading: false,
            initialized: true,
        }
    );
}

#[test]
fn check_status_malformed_body_resolves_logged_out() {
    let store = store();
    store.gateway().status.push(Reply::Json(json!({"success": true, "data": "nope"})));

    assert_eq!(block_on(store.check_status()), None);
    assert!(store.get_state().initialized);
}

#[test]
fn check_status_explicit_logged_out_clears_previous_user() {
    let store = store();
    store.gateway().status.push(logged_in_reply());
    store
        .gateway()
        .status
        .push(Reply::Json(json!({"success": true, "data": {"loggedIn": false}})));

    block_on(store.check_status());
    block_on(store.check_status());

    let state = store.get_state();
    assert_eq!(state.user, None);
    assert!(state.initialized);
    assert!(!state.loading);
}

// =============================================================
// init_auth
// =============================================================

#[test]
fn init_auth_twice_checks_status_once() {
    let store = store();
    store.gateway().status.push(logged_in_reply());

    block_on(store.init_auth());
    block_on(store.init_auth());

    assert_eq!(store.gateway().status.calls(), 1);
    assert_eq!(store.get_state().user, Some(alice()));
}

#[test]
fn overlapping_init_auth_calls_share_one_status_check() {
    let store = store();
    let other = store.clone();
    let release = store.gateway().status.hold();
    store.gateway().status.push(logged_in_reply());

    block_on(async {
        let unblock = async {
            let _ = release.send(());
        };
        futures::join!(store.init_auth(), other.init_auth(), unblock);
    });

    assert_eq!(store.gateway().status.calls(), 1);
    assert_eq!(store.get_state().user, Some(alice()));
}

#[test]
fn init_auth_after_check_status_is_noop() {
    let store = store();
    block_on(store.check_status());

    block_on(store.init_auth());

    assert_eq!(store.gateway().status.calls(), 1);
}

#[test]
fn init_auth_is_shared_across_clones() {
    let store = store();
    let other = store.clone();

    block_on(store.init_auth());
    block_on(other.init_auth());

    assert_eq!(store.gateway().status.calls(), 1);
}

// =============================================================
// get_public_settings
// =============================================================

#[test]
fn public_settings_are_mapped_and_cached() {
    let store = store();
    store.gateway().settings.push(Reply::Json(json!({
        "success": true,
        "data": {"allow_register": "1", "allow_google_login": "0", "allow_github_login": "0"}
    })));

    let first = block_on(store.get_public_settings());
    let second = block_on(store.get_public_settings());

    let expected = PublicSettings {
        allow_register: true,
        allow_google_login: false,
        allow_github_login: false,
    };
    assert_eq!(first, expected);
    assert_eq!(second, expected);
    assert_eq!(store.gateway().settings.calls(), 1);
}

#[test]
fn public_settings_failure_returns_uncached_fallback() {
    let store = store();
    store.gateway().settings.push(Reply::Offline);
    store.gateway().settings.push(Reply::Json(json!({
        "success": true,
        "data": {"allow_register": "0", "allow_google_login": "1", "allow_github_login": "1"}
    })));

    assert_eq!(block_on(store.get_public_settings()), PublicSettings::FALLBACK);
    let retried = block_on(store.get_public_settings());

    assert!(!retried.allow_register);
    assert!(retried.allow_google_login);
    assert_eq!(store.gateway().settings.calls(), 2);
}

#[test]
fn public_settings_unsuccessful_envelope_falls_back() {
    let store = store();
    store.gateway().settings.push(Reply::Json(json!({"success": false})));

    assert_eq!(block_on(store.get_public_settings()), PublicSettings::FALLBACK);
}

#[test]
fn public_settings_do_not_notify_listeners() {
    let store = store();
    let (seen, _sub) = recorder(&store);

    block_on(store.get_public_settings());

    assert_eq!(lock(&seen).len(), 1);
}

// =============================================================
// logout
// =============================================================

#[test]
fn logout_success_clears_user_only() {
    let store = store();
    store.gateway().status.push(logged_in_reply());
    block_on(store.check_status());
    store.gateway().logout.push(Reply::Json(json!({"success": true})));

    assert!(block_on(store.logout()));
    assert_eq!(
        store.get_state(),
        AuthState {
            user: None,
            loading: false,
            initialized: true,
        }
    );
}

#[test]
fn logout_success_leaves_loading_flags_untouched_before_init() {
    let store = store();
    store.gateway().logout.push(Reply::Json(json!({"success": true})));

    assert!(block_on(store.logout()));
    assert_eq!(store.get_state(), AuthState::default());
}

#[test]
fn logout_rejected_leaves_state_unchanged() {
    let store = store();
    store.gateway().status.push(logged_in_reply());
    block_on(store.check_status());
    let before = store.get_state();
    let (seen, _sub) = recorder(&store);
    store.gateway().logout.push(Reply::Json(json!({"success": false})));

    assert!(!block_on(store.logout()));
    assert_eq!(store.get_state(), before);
    assert_eq!(lock(&seen).len(), 1);
}

#[test]
fn logout_network_error_returns_false() {
    let store = store();
    store.gateway().status.push(logged_in_reply());
    block_on(store.check_status());

    assert!(!block_on(store.logout()));
    assert_eq!(store.get_state().user, Some(alice()));
}

// =============================================================
// Navigation targets
// =============================================================

#[test]
fn navigation_urls_come_from_gateway_config() {
    let store = store();
    assert_eq!(
        store.login_url("https://site.example/a b"),
        "https://auth.example.com/auth/login?redirect=https%3A%2F%2Fsite.example%2Fa%20b"
    );
    assert_eq!(
        store.register_url("x"),
        "https://auth.example.com/auth/register?redirect=x"
    );
    assert_eq!(
        store.google_login_url("x"),
        "https://auth.example.com/api/auth/oauth/google?redirect=x"
    );
    assert_eq!(store.profile_url(), "https://auth.example.com/profile");
}

#[cfg(not(feature = "csr"))]
#[test]
fn go_actions_do_not_touch_state_or_listeners() {
    let store = store();
    let (seen, _sub) = recorder(&store);

    store.go_login();
    store.go_register();
    store.go_google_login();

    assert_eq!(lock(&seen).len(), 1);
    assert_eq!(store.get_state(), AuthState::default());
}
