//! Auth-session state for the current page.
//!
//! SYSTEM CONTEXT
//! ==============
//! `AuthStore` is the single source of truth for whether the viewer is logged
//! in. Views subscribe to it; it talks to the gateway and notifies them.
//!
//! DESIGN
//! ======
//! The store is an explicit handle owned by whatever composes the page rather
//! than a module-level singleton. Clones share state. Locks are held only to
//! read or write a field and never across `.await` or while listeners run, so
//! a listener may call back into the store.
//!
//! State machine: `{loading, !initialized}` resolves to `{!loading,
//! initialized, user}` after the first status check and never goes back.
//! `logout` and later `check_status` calls only move between resolved states.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::net::api::{Gateway, HttpGateway};
use crate::net::types::{PublicSettings, User};
use crate::util::navigate;

/// Authentication state tracking the current user and loading status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
    pub initialized: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
            initialized: false,
        }
    }
}

type Listener = Arc<dyn Fn(&AuthState) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

struct StoreInner<G> {
    gateway: G,
    state: Mutex<AuthState>,
    settings: Mutex<Option<PublicSettings>>,
    listeners: Arc<Mutex<Listeners>>,
    init_started: AtomicBool,
}

/// Handle returned by [`AuthStore::subscribe`].
///
/// Dropping it keeps the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock(&listeners).entries.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Store wired to the real gateway client.
pub type BrowserStore = AuthStore<HttpGateway>;

/// Shared auth store for one page session.
pub struct AuthStore<G> {
    inner: Arc<StoreInner<G>>,
}

impl<G> Clone for AuthStore<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: Gateway> AuthStore<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                gateway,
                state: Mutex::new(AuthState::default()),
                settings: Mutex::new(None),
                listeners: Arc::new(Mutex::new(Listeners::default())),
                init_started: AtomicBool::new(false),
            }),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.inner.gateway
    }

    /// Register `listener`. It runs once right away with the current state and
    /// again after every change, in registration order.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        let id = {
            let mut listeners = lock(&self.inner.listeners);
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.push((id, Arc::clone(&listener)));
            id
        };
        listener(&self.get_state());
        Subscription {
            id,
            listeners: Arc::downgrade(&self.inner.listeners),
        }
    }

    pub fn get_state(&self) -> AuthState {
        lock(&self.inner.state).clone()
    }

    /// Ask the gateway who is logged in. Failures of any kind resolve to
    /// "logged out"; this never errors.
    pub async fn check_status(&self) -> Option<User> {
        self.update(|s| s.loading = true);

        let user = match self.inner.gateway.fetch_status().await {
            Ok(envelope) => envelope.into_user(),
            Err(e) => {
                log::warn!("auth status check failed: {e}");
                None
            }
        };

        let resolved = user.clone();
        self.update(move |s| {
            s.user = resolved;
            s.loading = false;
            s.initialized = true;
        });
        user
    }

    /// Feature flags from the gateway. Only a successful fetch is cached; a
    /// failure returns [`PublicSettings::FALLBACK`] and the next call retries.
    pub async fn get_public_settings(&self) -> PublicSettings {
        let cached = *lock(&self.inner.settings);
        if let Some(cached) = cached {
            return cached;
        }

        let fetched = match self.inner.gateway.fetch_public_settings().await {
            Ok(envelope) => envelope.into_settings(),
            Err(e) => {
                log::warn!("public settings fetch failed: {e}");
                None
            }
        };

        match fetched {
            Some(settings) => {
                *lock(&self.inner.settings) = Some(settings);
                settings
            }
            None => PublicSettings::FALLBACK,
        }
    }

    /// End the gateway session. On success clears the user and returns
    /// `true`; otherwise leaves state untouched and returns `false`.
    pub async fn logout(&self) -> bool {
        match self.inner.gateway.post_logout().await {
            Ok(envelope) if envelope.success => {
                self.update(|s| s.user = None);
                true
            }
            Ok(_) => {
                log::warn!("gateway rejected logout");
                false
            }
            Err(e) => {
                log::warn!("logout failed: {e}");
                false
            }
        }
    }

    /// Run the first status check. Later calls, including ones made while the
    /// first is still in flight, do nothing.
    pub async fn init_auth(&self) {
        if self.get_state().initialized || self.inner.init_started.swap(true, Ordering::AcqRel) {
            return;
        }
        self.check_status().await;
    }

    /// Hosted login page URL that returns to `return_to`.
    pub fn login_url(&self, return_to: &str) -> String {
        self.inner.gateway.config().login_url(return_to)
    }

    /// Hosted registration page URL that returns to `return_to`.
    pub fn register_url(&self, return_to: &str) -> String {
        self.inner.gateway.config().register_url(return_to)
    }

    /// Google OAuth URL that returns to `return_to`.
    pub fn google_login_url(&self, return_to: &str) -> String {
        self.inner.gateway.config().google_login_url(return_to)
    }

    pub fn profile_url(&self) -> String {
        self.inner.gateway.config().profile_url()
    }

    /// Leave the page for the hosted login form.
    pub fn go_login(&self) {
        navigate::assign(&self.login_url(&navigate::current_href()));
    }

    /// Leave the page for the hosted registration form.
    pub fn go_register(&self) {
        navigate::assign(&self.register_url(&navigate::current_href()));
    }

    /// Leave the page for the Google OAuth flow.
    pub fn go_google_login(&self) {
        navigate::assign(&self.google_login_url(&navigate::current_href()));
    }

    /// Apply `f` to the state, then notify every listener with the result.
    fn update(&self, f: impl FnOnce(&mut AuthState)) {
        let snapshot = {
            let mut state = lock(&self.inner.state);
            f(&mut state);
            state.clone()
        };
        let listeners: Vec<Listener> = lock(&self.inner.listeners)
            .entries
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
