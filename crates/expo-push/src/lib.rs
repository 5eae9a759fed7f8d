//! Pushwatch Expo - client for the Expo push notification gateway.
//!
//! This crate provides the HTTP client and wire types for sending push
//! notifications through Expo and fetching their delivery receipts, and
//! implements `pushwatch_core::push::PushProvider` on top of them.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pushwatch_expo::{ExpoConfig, ExpoPushClient, ExpoPushMessage};
//!
//! let client = ExpoPushClient::new(ExpoConfig::default())?;
//! let tickets = client
//!     .send_push_notifications(&[ExpoPushMessage::new("ExponentPushToken[xxxx]")])
//!     .await?;
//! ```

mod client;
mod error;
mod provider;
mod token;
mod types;

pub use client::{ExpoConfig, ExpoPushClient, DEFAULT_BASE_URL};
pub use error::{ExpoError, Result};
pub use token::is_expo_push_token;
pub use types::*;
