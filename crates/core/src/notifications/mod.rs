//! Notifications module - the message value type and the per-collection formatter.

mod field_render;
mod formatter;
mod notification_model;

pub use field_render::{render_field, render_timestamp};
pub use formatter::{format_for_collection, BARS_COLLECTION, EVENTS_COLLECTION, SIGNALS_COLLECTION};
pub use notification_model::Notification;
