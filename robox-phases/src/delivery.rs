//! Channel delivery for the delivery phase (§4.6).

use async_trait::async_trait;
use robox_core::delivery::{ChannelResult, ChannelTarget, DeliveryContent};
use tracing::info;

/// Delivers [`DeliveryContent`] to one resolved [`ChannelTarget`].
///
/// Real channel kinds (chat, email, webhook) are reached through whatever
/// integration a deployment wires in; this crate ships only the
/// always-available [`LogOnlyChannelSender`].
#[async_trait]
pub trait ChannelSender: Send + Sync {
    /// Attempt delivery to `target`, returning the outcome. Never panics;
    /// a delivery failure is reported in the returned [`ChannelResult`].
    async fn send(&self, target: &ChannelTarget, content: &DeliveryContent) -> ChannelResult;
}

/// Writes delivery content to the tracing log instead of an external
/// channel. The default sender, and the only one every channel kind falls
/// back to when no richer integration is configured.
pub struct LogOnlyChannelSender;

#[async_trait]
impl ChannelSender for LogOnlyChannelSender {
    async fn send(&self, target: &ChannelTarget, content: &DeliveryContent) -> ChannelResult {
        info!(
            channel = ?target.kind,
            destination = %target.destination,
            summary = %content.summary,
            "delivery (log only)"
        );
        ChannelResult {
            target: target.clone(),
            success: true,
            recipients: vec![target.destination.clone()],
            details: Some("written to tracing log only".to_owned()),
            error: None,
            sent_at: Some(chrono::Utc::now()),
        }
    }
}
