//! The link to the device as seen by the protocol core.

use crate::connection::NotificationSink;
use crate::error::Result;
use async_trait::async_trait;
use bluest::Uuid;

/// Write access to a connected device plus delivery of its notifications.
///
/// Implementations hand every notification to the sink registered with
/// [`subscribe`](Transport::subscribe) and call
/// [`NotificationSink::disconnected`] when the link goes away.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn write(&self, characteristic: Uuid, data: &[u8]) -> Result<()>;

    /// Register the connection's notification sink. Called once per
    /// connection.
    async fn subscribe(&self, sink: NotificationSink) -> Result<()>;

    async fn disconnect(&self) -> Result<()>;
}
