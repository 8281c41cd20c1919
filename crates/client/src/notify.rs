//! User-facing notifications and navigation.
//!
//! Operations never print or redirect on their own. They report toasts and
//! navigation requests to a [`UiSink`] injected by the front-end.

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Severity of a toast notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Error,
}

/// A transient notification shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }
}

/// Storefront locations an operation may send the user to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("/"),
            Self::Login => f.write_str("/login"),
        }
    }
}

/// Receiver for toasts and navigation requests.
pub trait UiSink: Send + Sync {
    /// Show a transient notification.
    fn toast(&self, toast: Toast);

    /// Move the user to another location (a full navigation, not a merge).
    fn navigate(&self, route: Route);
}

/// Sink that only logs; used when no front-end is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl UiSink for TracingSink {
    fn toast(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Error => tracing::warn!(message = %toast.message, "toast"),
            ToastLevel::Success | ToastLevel::Info => {
                tracing::info!(message = %toast.message, "toast");
            }
        }
    }

    fn navigate(&self, route: Route) {
        tracing::info!(%route, "navigate");
    }
}

/// Event captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Toast(Toast),
    Navigate(Route),
}

/// Sink that remembers everything it receives, in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events so far.
    #[must_use]
    pub fn events(&self) -> Vec<UiEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Navigation requests so far.
    #[must_use]
    pub fn navigations(&self) -> Vec<Route> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                UiEvent::Navigate(route) => Some(route),
                UiEvent::Toast(_) => None,
            })
            .collect()
    }

    /// Toasts so far.
    #[must_use]
    pub fn toasts(&self) -> Vec<Toast> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                UiEvent::Toast(toast) => Some(toast),
                UiEvent::Navigate(_) => None,
            })
            .collect()
    }

    fn push(&self, event: UiEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl UiSink for RecordingSink {
    fn toast(&self, toast: Toast) {
        self.push(UiEvent::Toast(toast));
    }

    fn navigate(&self, route: Route) {
        self.push(UiEvent::Navigate(route));
    }
}
