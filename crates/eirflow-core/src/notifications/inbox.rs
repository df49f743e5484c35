use std::collections::HashSet;

use anyhow::{bail, Result};
use tracing::debug;

use crate::auth::SessionData;
use crate::models::{Notification, NotificationStatus, Role};

/// Client-side role filter applied to every fetched list.
///
/// Supervisors see requests for their own mode, managers see the requests
/// they filed, plain users see nothing.
pub fn visible_to(session: &SessionData, notification: &Notification) -> bool {
    match session.role {
        Role::Supervisor => session.mode == Some(notification.mode_of_transport),
        Role::Manager => notification.manager_name == session.username,
        Role::User => false,
    }
}

/// Notifications visible to the current user plus unread tracking.
#[derive(Debug, Default)]
pub struct NotificationInbox {
    items: Vec<Notification>,
    previous_ids: HashSet<String>,
    unread: HashSet<String>,
}

impl NotificationInbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    /// Replace the list with a fresh poll. Ids absent from the previous
    /// poll are marked unread; the first poll compares against nothing.
    /// Returns how many became unread.
    pub fn apply_poll(&mut self, session: &SessionData, fetched: Vec<Notification>) -> usize {
        let items: Vec<Notification> = fetched
            .into_iter()
            .filter(|n| visible_to(session, n))
            .collect();

        let current: HashSet<String> = items.iter().map(|n| n.id.clone()).collect();
        let new_ids: Vec<String> = current
            .iter()
            .filter(|id| !self.previous_ids.contains(*id))
            .cloned()
            .collect();

        // Unread markers for items that vanished are dropped
        self.unread.retain(|id| current.contains(id));
        self.unread.extend(new_ids.iter().cloned());
        self.previous_ids = current;
        self.items = items;

        debug!(total = self.items.len(), new = new_ids.len(), "Notifications updated");
        new_ids.len()
    }

    pub fn has_unread(&self) -> bool {
        !self.unread.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.unread.len()
    }

    pub fn is_unread(&self, id: &str) -> bool {
        self.unread.contains(id)
    }

    pub fn mark_all_read(&mut self) {
        self.unread.clear();
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.items.iter().find(|n| n.id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.items
            .iter()
            .filter(|n| n.status == NotificationStatus::Pending)
            .count()
    }

    /// Check that `session` may move notification `id` to `status`.
    pub fn check_transition(
        &self,
        session: &SessionData,
        id: &str,
        status: NotificationStatus,
    ) -> Result<()> {
        let Some(notification) = self.get(id) else {
            bail!("Notification {} not found", id);
        };
        if !session.can_review(notification.mode_of_transport) {
            bail!(
                "Only a {} supervisor can review this request",
                notification.mode_of_transport
            );
        }
        if !notification.status.can_transition_to(status) {
            bail!("Request is already {}", notification.status);
        }
        Ok(())
    }

    /// Optimistically apply a status change before the backend confirms.
    /// The next poll overwrites local state either way.
    pub fn apply_status(
        &mut self,
        session: &SessionData,
        id: &str,
        status: NotificationStatus,
    ) -> Result<()> {
        self.check_transition(session, id, status)?;
        if let Some(n) = self.items.iter_mut().find(|n| n.id == id) {
            n.status = status;
        }
        self.unread.remove(id);
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
