//! Notification inbox operations.

use station_api_types::{MarkNotificationsReadInput, Notification};
use tracing::{debug, error};
use uuid::Uuid;

use crate::WalletStore;
use crate::state::NotificationItem;
use crate::store::{LoadingFlag, LoadingGuard};
use crate::ui::keys;

impl WalletStore {
    /// Notifications ordered newest first.
    pub fn sorted_notifications(&self) -> Vec<NotificationItem> {
        self.with(|s| s.notifications.sorted())
    }

    pub fn has_notifications(&self) -> bool {
        self.with(|s| s.has_notifications())
    }

    /// Adds notifications pushed by a poller, refreshing ones already held.
    pub fn ingest_notifications(&self, notifications: Vec<Notification>) {
        self.with_mut(|s| s.notifications.upsert(notifications));
    }

    /// Replaces the inbox with the service's current notification list.
    pub async fn refresh_notifications(&self) {
        let epoch = self.epoch();
        self.with_mut(|s| s.notifications.loading = true);
        let _loading = LoadingGuard::new(&self.inner, LoadingFlag::Notifications, epoch);

        match self.service().list_notifications().await {
            Ok(notifications) => {
                if self.epoch() == epoch {
                    self.with_mut(|s| s.notifications.sync(notifications));
                }
            }
            Err(err) => {
                error!("failed to load notifications: {}", err);
                self.inner.ui.error_toast(keys::NOTIFICATIONS_FAILED_TO_LOAD);
            }
        }
    }

    /// Acknowledges every notification in the inbox, one batch per call.
    ///
    /// Stops at the first failing batch; notifications of batches that went
    /// through are gone, the rest stay in place.
    pub async fn mark_all_notifications_read(&self) {
        let epoch = self.epoch();
        let ids = self.with_mut(|s| {
            s.notifications.loading = true;
            s.notifications.ids()
        });
        let _loading = LoadingGuard::new(&self.inner, LoadingFlag::Notifications, epoch);
        let service = self.service();

        for batch in ids.chunks(self.inner.config.batch_size()) {
            if self.epoch() != epoch {
                debug!("stopping mark-all-read: session was reset");
                return;
            }

            self.with_mut(|s| s.notifications.set_loading(batch, true));
            let result = service
                .mark_notification_as_read(MarkNotificationsReadInput {
                    notification_ids: batch.to_vec(),
                    read: true,
                })
                .await;

            match result {
                Ok(()) => self.with_mut(|s| s.notifications.remove(batch)),
                Err(err) => {
                    error!("failed to mark all notifications as read: {}", err);
                    self.with_mut(|s| s.notifications.set_loading(batch, false));
                    self.inner.ui.error_toast(keys::NOTIFICATION_FAILED_TO_SAVE);
                    return;
                }
            }
        }
    }

    /// Marks one notification read or unread. Read notifications leave the
    /// inbox; unknown ids are ignored.
    pub async fn mark_notification_read(&self, notification_id: Uuid, read: bool) {
        let found = self.with_mut(|s| s.notifications.set_loading(&[notification_id], true) > 0);
        if !found {
            return;
        }

        let result = self
            .service()
            .mark_notification_as_read(MarkNotificationsReadInput {
                notification_ids: vec![notification_id],
                read,
            })
            .await;

        self.with_mut(|s| match &result {
            Ok(()) if read => s.notifications.remove(&[notification_id]),
            _ => {
                s.notifications.set_loading(&[notification_id], false);
            }
        });

        if let Err(err) = result {
            error!("failed to save notification {}: {}", notification_id, err);
            self.inner.ui.error_toast(keys::NOTIFICATION_FAILED_TO_SAVE);
        }
    }
}
