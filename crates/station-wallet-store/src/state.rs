//! Session state held by [`crate::WalletStore`].

use serde::Serialize;
use station_api_types::{
    Capabilities, CanisterId, Notification, User, UserPrivilege, WalletAsset,
};
use station_client::{NOT_FOUND_USER_IDENTITY, ServiceError};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    UnregisteredUser,
    Connecting,
    Connected,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionError {
    NotFoundUserIdentity,
    OtherWalletError,
    CanisterError,
}

impl ConnectionError {
    /// Maps a failed user lookup to the error kind shown on the connect page,
    /// plus the raw message for opaque failures.
    pub fn classify(err: &ServiceError) -> (Self, Option<String>) {
        match err {
            ServiceError::Api(api) if api.code == NOT_FOUND_USER_IDENTITY => {
                (Self::NotFoundUserIdentity, None)
            }
            ServiceError::Api(_) => (Self::OtherWalletError, None),
            ServiceError::Canister { message } => (Self::CanisterError, message.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ConfigurationState {
    pub loading: bool,
    pub details: Capabilities,
}

/// A notification plus whether a call mutating it is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationItem {
    pub data: Notification,
    pub loading: bool,
}

impl NotificationItem {
    pub fn new(data: Notification) -> Self {
        Self {
            data,
            loading: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NotificationsState {
    pub loading: bool,
    pub items: Vec<NotificationItem>,
}

impl NotificationsState {
    pub fn ids(&self) -> Vec<Uuid> {
        self.items.iter().map(|item| item.data.id).collect()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.items.iter().any(|item| item.data.id == id)
    }

    /// Returns how many items matched.
    pub(crate) fn set_loading(&mut self, ids: &[Uuid], loading: bool) -> usize {
        let mut matched = 0;
        for item in self.items.iter_mut().filter(|item| ids.contains(&item.data.id)) {
            item.loading = loading;
            matched += 1;
        }
        matched
    }

    pub(crate) fn remove(&mut self, ids: &[Uuid]) {
        self.items.retain(|item| !ids.contains(&item.data.id));
    }

    /// Inserts new notifications and refreshes known ones in place.
    pub(crate) fn upsert(&mut self, notifications: Vec<Notification>) {
        for notification in notifications {
            match self
                .items
                .iter_mut()
                .find(|item| item.data.id == notification.id)
            {
                Some(existing) => existing.data = notification,
                None => self.items.push(NotificationItem::new(notification)),
            }
        }
    }

    /// Replaces the inbox with `notifications`, keeping in-flight flags of
    /// items that are still present.
    pub(crate) fn sync(&mut self, notifications: Vec<Notification>) {
        let previous = std::mem::take(&mut self.items);
        for notification in notifications {
            if self.contains(notification.id) {
                continue;
            }
            let loading = previous
                .iter()
                .any(|item| item.data.id == notification.id && item.loading);
            self.items.push(NotificationItem {
                data: notification,
                loading,
            });
        }
    }

    /// Newest first.
    pub fn sorted(&self) -> Vec<NotificationItem> {
        let mut items = self.items.clone();
        items.sort_by(|a, b| b.data.created_at.cmp(&a.data.created_at));
        items
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WalletStoreState {
    pub connection_status: ConnectionStatus,
    pub connection_error: Option<ConnectionError>,
    pub connection_error_message: Option<String>,
    pub canister_id: CanisterId,
    /// Set while a connect is in flight.
    pub loading: bool,
    pub user: User,
    pub privileges: Vec<UserPrivilege>,
    pub configuration: ConfigurationState,
    pub notifications: NotificationsState,
}

impl WalletStoreState {
    pub fn is_connected(&self) -> bool {
        self.connection_status == ConnectionStatus::Connected
    }

    pub fn has_privilege(&self, privilege: UserPrivilege) -> bool {
        self.privileges.contains(&privilege)
    }

    pub fn supported_assets(&self) -> &[WalletAsset] {
        &self.configuration.details.supported_assets
    }

    pub fn has_notifications(&self) -> bool {
        !self.notifications.items.is_empty()
    }
}
