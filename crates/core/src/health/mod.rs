//! Liveness support shared by the binary and the storage adapters.

mod traits;

pub use traits::ConnectivityProbe;
