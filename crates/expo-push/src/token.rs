use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Bare device id form accepted by Expo: 8-4-4-4-12 alphanumerics.
    static ref DEVICE_ID_TOKEN_REGEX: Regex =
        Regex::new(r"(?i)^[a-z\d]{8}-[a-z\d]{4}-[a-z\d]{4}-[a-z\d]{4}-[a-z\d]{12}$")
            .expect("Invalid regex pattern");
}

/// Structural check for an Expo push token.
///
/// Accepts `ExponentPushToken[...]`, `ExpoPushToken[...]` and the bare
/// device-id form. Says nothing about whether the device is still registered.
pub fn is_expo_push_token(token: &str) -> bool {
    let bracketed = (token.starts_with("ExponentPushToken[") || token.starts_with("ExpoPushToken["))
        && token.ends_with(']');
    bracketed || DEVICE_ID_TOKEN_REGEX.is_match(token)
}
