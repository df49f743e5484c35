//! Reroute notifications: role-scoped inbox with unread tracking, and the
//! background poller that keeps it current.

pub mod inbox;
pub mod poller;

pub use inbox::{visible_to, NotificationInbox};
pub use poller::{NotificationPoller, PollEvent};
