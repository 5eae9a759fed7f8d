//! Maps a changed document to the notification shown on devices.
//!
//! Formatting never fails: a document that cannot be interpolated yields the
//! degraded `error` message so delivery and the watcher keep going.

use log::warn;
use serde_json::Value;

use super::field_render::{render_field, render_timestamp};
use super::Notification;
use crate::errors::FormatError;

pub const BARS_COLLECTION: &str = "bars";
pub const SIGNALS_COLLECTION: &str = "signals";
pub const EVENTS_COLLECTION: &str = "events";

/// Builds the notification for a document from `collection`.
pub fn format_for_collection(collection: &str, doc: &Value) -> Notification {
    match try_format(collection, doc) {
        Ok(notification) => notification,
        Err(e) => {
            warn!("[format] Degraded notification for '{}': {}", collection, e);
            Notification::degraded(collection, doc)
        }
    }
}

fn try_format(collection: &str, doc: &Value) -> Result<Notification, FormatError> {
    match collection {
        BARS_COLLECTION => {
            let body = format!(
                "{} {} @ {} close={}",
                render_field(doc, "ticker")?,
                render_field(doc, "interval")?,
                render_timestamp(doc, "ts")?,
                render_field(doc, "close")?,
            );
            Ok(Notification::new("bar", body, Notification::payload("bar", doc)))
        }
        SIGNALS_COLLECTION => {
            let action = render_field(doc, "action")?;
            let body = format!(
                "{} {} @ {} | {} |{}",
                action,
                render_field(doc, "ticker")?,
                render_field(doc, "price")?,
                render_field(doc, "reason")?,
                render_timestamp(doc, "ts")?,
            );
            Ok(Notification::new(action, body, Notification::payload("signal", doc)))
        }
        EVENTS_COLLECTION => {
            let body = format!(
                "Event {} for {} {} | {}",
                render_field(doc, "type")?,
                render_field(doc, "ticker")?,
                render_field(doc, "price")?,
                render_timestamp(doc, "ts")?,
            );
            Ok(Notification::new("Event", body, Notification::payload("event", doc)))
        }
        _ => Ok(Notification::generic(collection, doc)),
    }
}
