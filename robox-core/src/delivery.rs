//! Delivery-phase content and per-channel outcomes (§4.6).

use crate::robot::ChannelKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The content to deliver, assembled from the run phase's outputs (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryContent {
    /// Short summary line.
    pub summary: String,
    /// Full body, format depends on the target channel.
    pub body: String,
    /// Structured attachments, opaque to the orchestrator.
    pub attachments: Vec<serde_json::Value>,
}

/// A resolved delivery target (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelTarget {
    /// The channel kind.
    pub kind: ChannelKind,
    /// Opaque destination.
    pub destination: String,
}

/// Outcome of delivering to one channel (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelResult {
    /// Which channel this result is for.
    pub target: ChannelTarget,
    /// Whether delivery succeeded.
    pub success: bool,
    /// Recipients actually reached, as resolved by the channel sender.
    #[serde(default)]
    pub recipients: Vec<String>,
    /// Free-form delivery details (message id, response body excerpt, ...).
    pub details: Option<String>,
    /// Error message, if delivery failed.
    pub error: Option<String>,
    /// When this channel's delivery attempt completed.
    pub sent_at: Option<DateTime<Utc>>,
}

/// Aggregate result of the delivery phase (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryResult {
    /// The content that was delivered.
    pub content: DeliveryContent,
    /// Per-channel results, in attempt order.
    pub channels: Vec<ChannelResult>,
    /// Whether at least one channel succeeded.
    pub any_succeeded: bool,
}
