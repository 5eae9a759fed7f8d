//! Pushwatch server: watches MongoDB collections and forwards every change to
//! registered devices through the Expo push gateway, with a liveness endpoint.

pub mod api;
pub mod config;
pub mod main_lib;
pub mod shutdown;

pub use main_lib::{build_runtime, init_tracing, AppState, Runtime};
