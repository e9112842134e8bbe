//! WebSocket message types: inbound requests and outbound replies.
//!
//! Frames are JSON objects tagged by a `type` field. Inbound parsing is
//! two-stage: the text must be valid JSON, then the `type` decides whether
//! the payload is decoded further. Unknown or missing types are not errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Balance;
use crate::error::GatewayError;

/// `type` value of a balance request.
pub const BALANCE_REQUEST: &str = "balanceRequest";

/// Client → server balance lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRequest {
    /// Account identifier to resolve.
    pub mobile_number: String,
    /// Optional client token echoed back in the reply.
    #[serde(default)]
    pub request_id: Option<String>,
}

/// A successfully decoded inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// `{"type":"balanceRequest", ...}`.
    BalanceRequest(BalanceRequest),
    /// Any other `type`, or a JSON value without a string `type`.
    Unrecognized(Option<String>),
}

/// Reasons an inbound frame is dropped.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The frame is not valid JSON.
    #[error("malformed JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    /// A binary frame did not contain UTF-8 text.
    #[error("binary frame is not valid UTF-8")]
    NonUtf8,

    /// The `type` was recognized but the payload does not match it.
    #[error("invalid {kind} payload: {source}")]
    InvalidPayload {
        /// The `type` discriminator that was recognized.
        kind: &'static str,
        /// `requestId` from the frame, if one could be read.
        request_id: Option<String>,
        /// Decoding failure.
        source: serde_json::Error,
    },
}

impl ProtocolError {
    /// Returns the client correlation token carried by the frame, if any.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::InvalidPayload { request_id, .. } => request_id.as_deref(),
            Self::Malformed(_) | Self::NonUtf8 => None,
        }
    }
}

impl InboundMessage {
    /// Parses a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Malformed`] if `text` is not JSON, or
    /// [`ProtocolError::InvalidPayload`] if a `balanceRequest` lacks a
    /// string `mobileNumber`.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text).map_err(ProtocolError::Malformed)?;
        let kind = value.get("type").and_then(Value::as_str).map(str::to_owned);

        match kind.as_deref() {
            Some(BALANCE_REQUEST) => {
                let request_id = value
                    .get("requestId")
                    .and_then(Value::as_str)
                    .map(str::to_owned);
                serde_json::from_value(value)
                    .map(Self::BalanceRequest)
                    .map_err(|source| ProtocolError::InvalidPayload {
                        kind: BALANCE_REQUEST,
                        request_id,
                        source,
                    })
            }
            _ => Ok(Self::Unrecognized(kind)),
        }
    }
}

/// Server → client frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// Resolved balance.
    #[serde(rename_all = "camelCase")]
    BalanceResponse {
        /// Account balance.
        balance: Balance,
        /// Echo of the request's `requestId`.
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    /// Lookup failure; only sent when error frames are enabled.
    #[serde(rename_all = "camelCase")]
    BalanceError {
        /// Numeric code, shared with HTTP error bodies.
        code: u32,
        /// Human-readable message.
        message: String,
        /// Echo of the request's `requestId`.
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
}

impl OutboundMessage {
    /// Builds a `balanceResponse` frame.
    #[must_use]
    pub fn balance_response(balance: Balance, request_id: Option<String>) -> Self {
        Self::BalanceResponse {
            balance,
            request_id,
        }
    }

    /// Builds a `balanceError` frame from a gateway error.
    #[must_use]
    pub fn balance_error(err: &GatewayError, request_id: Option<String>) -> Self {
        Self::BalanceError {
            code: err.error_code(),
            message: err.to_string(),
            request_id,
        }
    }
}
