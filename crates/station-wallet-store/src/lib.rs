//! Session store for a treasury wallet: who is connected, what the wallet
//! supports and which notifications are waiting.
//!
//! A [`WalletStore`] is bound to one wallet at a time. Remote calls go
//! through a [`station_client::WalletServiceProvider`], balance polling is
//! delegated to [`station_workers::WalletWorkers`], and user-facing feedback
//! goes through the hooks in [`ui`].

mod config;
mod notifications;
mod state;
mod store;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use config::{DEFAULT_NOTIFICATION_BATCH_SIZE, StoreConfig};
pub use state::{
    ConfigurationState, ConnectionError, ConnectionStatus, NotificationItem, NotificationsState,
    WalletStoreState,
};
pub use store::{BLOCKCHAIN_INTERNET_COMPUTER, STANDARD_NATIVE, VoteDecision, WalletStore};
pub use ui::{Navigator, NotificationSink, Toast, ToastKind, Translator, UiHooks};
