//! Header user menu: login buttons or the signed-in avatar dropdown.
//!
//! DESIGN
//! ======
//! Rendering is split in two. [`menu_view`] and [`next_open`] are pure and
//! decide *what* to show; [`UserMenu`] only turns that model into markup and
//! wires events. Window-level listeners are registered once per component
//! instance and removed on cleanup, so re-renders never pile them up.

#[cfg(test)]
#[path = "user_menu_test.rs"]
mod user_menu_test;

use leptos::ev::MouseEvent;
use leptos::prelude::*;

use crate::net::types::PublicSettings;
use crate::state::auth::{AuthState, BrowserStore};
use crate::util::{avatar, icons};

const SKELETON_CLASS: &str = "w-8 h-8 rounded-full bg-gray-200 dark:bg-gray-700 animate-pulse";
const AVATAR_BUTTON_CLASS: &str =
    "flex items-center gap-2 px-2 py-1 rounded-lg hover:bg-gray-100 dark:hover:bg-gray-700 transition-colors";
const AVATAR_IMG_CLASS: &str =
    "w-8 h-8 rounded-full object-cover border-2 border-gray-200 dark:border-gray-600";
const DROPDOWN_CLASS: &str = "absolute right-0 mt-2 w-48 bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700 rounded-lg shadow-xl z-50";
const GHOST_BUTTON_CLASS: &str = "px-3 py-1.5 text-sm font-medium text-gray-600 dark:text-gray-300 hover:text-gray-900 dark:hover:text-white hover:bg-gray-100 dark:hover:bg-gray-700 rounded-lg transition-colors";
const PRIMARY_BUTTON_CLASS: &str = "px-3 py-1.5 text-sm font-medium text-white bg-indigo-600 hover:bg-indigo-700 rounded-lg transition-colors";
const ICON_BUTTON_CLASS: &str = "p-1.5 text-gray-600 dark:text-gray-300 hover:text-gray-900 dark:hover:text-white hover:bg-gray-100 dark:hover:bg-gray-700 rounded-lg transition-colors";

// =============================================================================
// VIEW MODEL
// =============================================================================

/// What the menu should show for a given state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuView {
    /// Neutral placeholder with nothing clickable.
    Pending,
    SignedIn(SignedInView),
    SignedOut(SignedOutView),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedInView {
    pub display_name: String,
    pub contact_line: String,
    pub avatar_url: String,
    /// Shown instead of `avatar_url` once that image fails to load.
    pub fallback_avatar_url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignedOutView {
    pub show_register: bool,
    pub show_google: bool,
}

/// Decide what to render. `settings` is `None` until the public settings
/// have been fetched; a logged-out viewer stays `Pending` until then.
pub fn menu_view(state: &AuthState, settings: Option<PublicSettings>) -> MenuView {
    if state.loading && !state.initialized {
        return MenuView::Pending;
    }
    if let Some(user) = &state.user {
        let display_name = user.display_name().to_owned();
        let fallback_avatar_url = avatar::default_avatar_url(&display_name);
        let avatar_url = user
            .avatar_url()
            .map_or_else(|| fallback_avatar_url.clone(), str::to_owned);
        return MenuView::SignedIn(SignedInView {
            contact_line: user.contact_line().to_owned(),
            display_name,
            avatar_url,
            fallback_avatar_url,
        });
    }
    match settings {
        // allow_github_login has no affordance yet.
        Some(settings) => MenuView::SignedOut(SignedOutView {
            show_register: settings.allow_register,
            show_google: settings.allow_google_login,
        }),
        None => MenuView::Pending,
    }
}

// =============================================================================
// DROPDOWN
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropdownEvent {
    /// Click on the avatar button.
    AvatarClick,
    /// Click that reached the window, i.e. landed outside the menu.
    OutsideClick,
    /// Escape key.
    Dismiss,
}

/// Dropdown visibility after `event`.
pub fn next_open(open: bool, event: DropdownEvent) -> bool {
    match event {
        DropdownEvent::AvatarClick => !open,
        DropdownEvent::OutsideClick | DropdownEvent::Dismiss => false,
    }
}

pub fn dropdown_class(open: bool) -> String {
    if open {
        DROPDOWN_CLASS.to_owned()
    } else {
        format!("hidden {DROPDOWN_CLASS}")
    }
}

// =============================================================================
// COMPONENT
// =============================================================================

/// User menu bound to `store`.
///
/// Mirrors the store into a signal, fetches public settings the first time
/// the viewer resolves as logged out, and re-runs icon materialization after
/// every change of view.
///
/// Two dropdown guarantees hold by construction: the
/// avatar button stops propagation, so the click that opens the menu never
/// reaches the window closer, and the window listeners are registered once
/// here, outside the reactive render closure, so re-renders cannot add more.
#[component]
pub fn UserMenu(store: BrowserStore) -> impl IntoView {
    let state = RwSignal::new(store.get_state());
    let settings = RwSignal::new(None::<PublicSettings>);
    let menu_open = RwSignal::new(false);

    let subscription = store.subscribe(move |s| state.set(s.clone()));
    on_cleanup(move || subscription.unsubscribe());

    let menu = Memo::new(move |_| menu_view(&state.get(), settings.get()));

    // Fetch settings once per instance; the first answer, fallback included,
    // is kept for the component's lifetime.
    #[cfg(feature = "csr")]
    {
        let store = store.clone();
        let requested = StoredValue::new(false);
        Effect::new(move || {
            let s = state.get();
            if !s.initialized || s.user.is_some() || requested.get_value() {
                return;
            }
            requested.set_value(true);
            let store = store.clone();
            leptos::task::spawn_local(async move {
                let fetched = store.get_public_settings().await;
                settings.set(Some(fetched));
            });
        });
    }

    // Content is replaced wholesale, so icons must be materialized again.
    Effect::new(move || {
        menu.track();
        menu_open.set(false);
        icons::refresh();
    });

    #[cfg(feature = "csr")]
    {
        let click = window_event_listener(leptos::ev::click, move |_| {
            menu_open.update(|open| *open = next_open(*open, DropdownEvent::OutsideClick));
        });
        let keydown = window_event_listener(leptos::ev::keydown, move |ev| {
            if ev.key() == "Escape" {
                menu_open.update(|open| *open = next_open(*open, DropdownEvent::Dismiss));
            }
        });
        on_cleanup(move || {
            click.remove();
            keydown.remove();
        });
    }

    move || match menu.get() {
        MenuView::Pending => view! { <div class=SKELETON_CLASS></div> }.into_any(),
        MenuView::SignedIn(signed_in) => {
            signed_in_menu(signed_in, menu_open, store.clone()).into_any()
        }
        MenuView::SignedOut(signed_out) => login_buttons(signed_out, store.clone()).into_any(),
    }
}

fn signed_in_menu(
    signed_in: SignedInView,
    menu_open: RwSignal<bool>,
    store: BrowserStore,
) -> impl IntoView {
    let SignedInView {
        display_name,
        contact_line,
        avatar_url,
        fallback_avatar_url,
    } = signed_in;
    let avatar_failed = RwSignal::new(false);
    let avatar_src = move || {
        if avatar_failed.get() {
            fallback_avatar_url.clone()
        } else {
            avatar_url.clone()
        }
    };

    let on_toggle = move |ev: MouseEvent| {
        // Keep the window listener from closing what this click opens.
        ev.stop_propagation();
        menu_open.update(|open| *open = next_open(*open, DropdownEvent::AvatarClick));
    };
    let profile_url = store.profile_url();
    let on_logout = move |_: MouseEvent| logout_and_reload(store.clone());

    view! {
        <button id="user-menu-btn" class=AVATAR_BUTTON_CLASS on:click=on_toggle>
            <img
                src=avatar_src
                alt=display_name.clone()
                class=AVATAR_IMG_CLASS
                on:error=move |_| avatar_failed.set(true)
            />
            <span class="text-sm font-medium text-gray-700 dark:text-gray-200 hidden sm:inline max-w-[100px] truncate">
                {display_name.clone()}
            </span>
            <i data-lucide=icons::CHEVRON_DOWN class="w-4 h-4 text-gray-500 dark:text-gray-400"></i>
        </button>
        <div
            id="user-dropdown"
            class=move || dropdown_class(menu_open.get())
            on:click=|ev: MouseEvent| ev.stop_propagation()
        >
            <div class="px-4 py-3 border-b border-gray-200 dark:border-gray-700">
                <p class="text-sm font-medium text-gray-900 dark:text-white truncate">{display_name}</p>
                <p class="text-xs text-gray-500 dark:text-gray-400 truncate">{contact_line}</p>
            </div>
            <div class="py-1">
                <a
                    href=profile_url
                    class="flex items-center gap-2 px-4 py-2 text-sm text-gray-700 dark:text-gray-200 hover:bg-gray-100 dark:hover:bg-gray-700"
                >
                    <i data-lucide=icons::USER class="w-4 h-4"></i>
                    "Profile"
                </a>
                <button
                    id="logout-btn"
                    class="w-full flex items-center gap-2 px-4 py-2 text-sm text-red-600 dark:text-red-400 hover:bg-gray-100 dark:hover:bg-gray-700"
                    on:click=on_logout
                >
                    <i data-lucide=icons::LOG_OUT class="w-4 h-4"></i>
                    "Log out"
                </button>
            </div>
        </div>
    }
}

fn login_buttons(signed_out: SignedOutView, store: BrowserStore) -> impl IntoView {
    let google = signed_out.show_google.then(|| {
        let store = store.clone();
        view! {
            <button
                id="google-login-btn"
                class=ICON_BUTTON_CLASS
                title="Sign in with Google"
                on:click=move |_| store.go_google_login()
            >
                <svg class="w-5 h-5" viewBox="0 0 24 24">
                    <path fill="currentColor" d="M22.56 12.25c0-.78-.07-1.53-.2-2.25H12v4.26h5.92c-.26 1.37-1.04 2.53-2.21 3.31v2.77h3.57c2.08-1.92 3.28-4.74 3.28-8.09z"/>
                    <path fill="currentColor" d="M12 23c2.97 0 5.46-.98 7.28-2.66l-3.57-2.77c-.98.66-2.23 1.06-3.71 1.06-2.86 0-5.29-1.93-6.16-4.53H2.18v2.84C3.99 20.53 7.7 23 12 23z"/>
                    <path fill="currentColor" d="M5.84 14.09c-.22-.66-.35-1.36-.35-2.09s.13-1.43.35-2.09V7.07H2.18C1.43 8.55 1 10.22 1 12s.43 3.45 1.18 4.93l2.85-2.22.81-.62z"/>
                    <path fill="currentColor" d="M12 5.38c1.62 0 3.06.56 4.21 1.64l3.15-3.15C17.45 2.09 14.97 1 12 1 7.7 1 3.99 3.47 2.18 7.07l3.66 2.84c.87-2.6 3.3-4.53 6.16-4.53z"/>
                </svg>
            </button>
        }
    });
    let register = signed_out.show_register.then(|| {
        let store = store.clone();
        view! {
            <button id="register-btn" class=PRIMARY_BUTTON_CLASS on:click=move |_| store.go_register()>
                "Sign up"
            </button>
        }
    });

    view! {
        <div class="flex items-center gap-2">
            {google}
            <button id="login-btn" class=GHOST_BUTTON_CLASS on:click=move |_| store.go_login()>
                "Log in"
            </button>
            {register}
        </div>
    }
}

/// Log out and, on success, reload so every part of the page sees it.
fn logout_and_reload(store: BrowserStore) {
    #[cfg(feature = "csr")]
    {
        leptos::task::spawn_local(async move {
            if store.logout().await {
                crate::util::navigate::reload();
            }
        });
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = store;
    }
}
