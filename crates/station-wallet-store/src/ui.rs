//! Hooks into the embedding UI: toasts, navigation guards and translations.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

/// Translation keys the store raises toasts with.
pub mod keys {
    pub const USER_LOAD_ERROR: &str = "wallets.user_load_error";
    pub const NOTIFICATION_FAILED_TO_SAVE: &str = "wallets.notification_failed_to_save";
    pub const NOTIFICATIONS_FAILED_TO_LOAD: &str = "wallets.notifications_failed_to_load";
    pub const PROPOSAL_FAILED_TO_SAVE: &str = "wallets.proposal_failed_to_save";
    pub const INITIAL_ACCOUNT_NAME: &str = "app.initial_account_name";
}

/// Severity of a toast, deciding how the UI styles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

pub trait NotificationSink: Send + Sync {
    fn send_notification(&self, toast: Toast);
}

pub trait Navigator: Send + Sync {
    /// Re-run route guards against the current session state.
    fn force_navigate(&self);
}

pub trait Translator: Send + Sync {
    fn t(&self, key: &str) -> String;
}

/// In-memory message catalog. Unknown keys translate to themselves.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: HashMap<String, String>,
}

impl StaticCatalog {
    pub fn english() -> Self {
        let mut catalog = Self::default();
        catalog.insert(keys::USER_LOAD_ERROR, "Failed to load your user for the selected wallet.");
        catalog.insert(keys::NOTIFICATION_FAILED_TO_SAVE, "Failed to save notification.");
        catalog.insert(keys::NOTIFICATIONS_FAILED_TO_LOAD, "Failed to load notifications.");
        catalog.insert(keys::PROPOSAL_FAILED_TO_SAVE, "Failed to save proposal.");
        catalog.insert(keys::INITIAL_ACCOUNT_NAME, "Main Account");
        catalog
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.entries.insert(key.into(), message.into());
    }
}

impl Translator for StaticCatalog {
    fn t(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_owned())
    }
}

/// Toast sink that only logs, for headless sessions.
#[derive(Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn send_notification(&self, toast: Toast) {
        match toast.kind {
            ToastKind::Error => error!("toast: {}", toast.message),
        }
    }
}

#[derive(Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn force_navigate(&self) {}
}

#[derive(Clone)]
pub struct UiHooks {
    pub notifier: Arc<dyn NotificationSink>,
    pub navigator: Arc<dyn Navigator>,
    pub translator: Arc<dyn Translator>,
}

impl Default for UiHooks {
    fn default() -> Self {
        Self {
            notifier: Arc::new(TracingNotifier),
            navigator: Arc::new(NoopNavigator),
            translator: Arc::new(StaticCatalog::english()),
        }
    }
}

impl UiHooks {
    pub(crate) fn error_toast(&self, key: &str) {
        self.notifier.send_notification(Toast {
            kind: ToastKind::Error,
            message: self.translator.t(key),
        });
    }
}
