use async_trait::async_trait;

use crate::errors::Result;

/// Trait for a lightweight reachability check against a backing service.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn ping(&self) -> Result<()>;
}
