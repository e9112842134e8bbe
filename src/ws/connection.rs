//! WebSocket connection state machine.
//!
//! Each connection runs a read loop that dispatches inbound frames, plus a
//! writer task that drains an outbound queue into the socket. Every balance
//! request is resolved on its own task and pushes its reply into the queue,
//! so replies leave in completion order, not request order. In-flight
//! requests per connection are capped at the outbound queue capacity.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{Semaphore, mpsc};

use super::messages::{BalanceRequest, InboundMessage, OutboundMessage, ProtocolError};
use crate::domain::{ConnectionId, ConnectionRegistry};
use crate::error::GatewayError;
use crate::service::BalanceService;

/// Per-connection settings.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    /// Capacity of the outbound queue feeding the writer task, and the
    /// limit on balance requests in flight at once.
    pub outbound_capacity: usize,
    /// Send `balanceError` frames for failed or invalid requests.
    pub error_frames: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            outbound_capacity: 64,
            error_frames: false,
        }
    }
}

/// Cloneable handle for pushing frames to one connection.
///
/// Pushing after the connection has closed is a no-op.
#[derive(Debug, Clone)]
pub struct ConnectionSender {
    connection_id: ConnectionId,
    tx: mpsc::Sender<OutboundMessage>,
}

impl ConnectionSender {
    /// Returns the identity of the target connection.
    #[must_use]
    pub const fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Queues `message` for the writer. Returns `false` if the connection
    /// is already closed.
    pub async fn push(&self, message: OutboundMessage) -> bool {
        if self.tx.send(message).await.is_err() {
            tracing::debug!(
                connection_id = %self.connection_id,
                "connection closed; dropping outbound message"
            );
            return false;
        }
        true
    }
}

/// Runs the full lifecycle of a single WebSocket connection.
///
/// Registers the connection, serves frames until the peer closes or the
/// transport fails, then deregisters it. Requests still in flight at close
/// time complete and their replies are discarded.
pub async fn run_connection(
    socket: WebSocket,
    service: Arc<BalanceService>,
    registry: Arc<ConnectionRegistry>,
    options: ConnectionOptions,
) {
    let connection_id = registry.register().await;
    let (ws_tx, mut ws_rx) = socket.split();
    let capacity = options.outbound_capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity);
    let in_flight = Arc::new(Semaphore::new(capacity));
    let writer = tokio::spawn(write_loop(connection_id, ws_tx, rx));
    let sender = ConnectionSender { connection_id, tx };
    registry.mark_open(connection_id).await;

    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                let parsed = InboundMessage::parse(text.as_str());
                dispatch(parsed, &sender, &service, &in_flight, options).await;
            }
            Ok(Message::Binary(bytes)) => {
                let parsed = std::str::from_utf8(&bytes)
                    .map_err(|_| ProtocolError::NonUtf8)
                    .and_then(InboundMessage::parse);
                dispatch(parsed, &sender, &service, &in_flight, options).await;
            }
            // keep polling so the transport flushes its close reply; the
            // stream then ends with `None`
            Ok(Message::Close(frame)) => {
                tracing::debug!(%connection_id, ?frame, "ws close received");
            }
            // ping/pong are answered by the transport
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(%connection_id, error = %err, "ws transport error");
                break;
            }
        }
    }

    drop(sender);
    writer.abort();
    registry.deregister(connection_id).await;
}

/// Routes one parsed inbound frame.
///
/// A balance request waits for an `in_flight` permit before its task is
/// spawned, so a client that floods requests stalls its own read loop.
async fn dispatch(
    parsed: Result<InboundMessage, ProtocolError>,
    sender: &ConnectionSender,
    service: &Arc<BalanceService>,
    in_flight: &Arc<Semaphore>,
    options: ConnectionOptions,
) {
    let connection_id = sender.connection_id();
    match parsed {
        Ok(InboundMessage::BalanceRequest(request)) => {
            let Ok(permit) = Arc::clone(in_flight).acquire_owned().await else {
                return;
            };
            let sender = sender.clone();
            let service = Arc::clone(service);
            let error_frames = options.error_frames;
            tokio::spawn(async move {
                serve_balance_request(request, sender, service, error_frames).await;
                drop(permit);
            });
        }
        Ok(InboundMessage::Unrecognized(kind)) => {
            tracing::debug!(
                %connection_id,
                message_type = kind.as_deref().unwrap_or("<none>"),
                "ignoring unrecognized message"
            );
        }
        Err(err) => {
            tracing::warn!(%connection_id, error = %err, "dropping inbound message");
            if options.error_frames && matches!(err, ProtocolError::InvalidPayload { .. }) {
                let request_id = err.request_id().map(str::to_owned);
                let reply = OutboundMessage::balance_error(
                    &GatewayError::InvalidRequest(err.to_string()),
                    request_id,
                );
                sender.push(reply).await;
            }
        }
    }
}

/// Resolves one balance request and pushes the reply.
async fn serve_balance_request(
    request: BalanceRequest,
    sender: ConnectionSender,
    service: Arc<BalanceService>,
    error_frames: bool,
) {
    let BalanceRequest {
        mobile_number,
        request_id,
    } = request;

    let reply = match service.check_balance(&mobile_number).await {
        Ok(balance) => OutboundMessage::balance_response(balance, request_id),
        Err(err) => {
            tracing::warn!(
                connection_id = %sender.connection_id(),
                mobile_number = %mobile_number,
                error = %err,
                "ws balance request failed"
            );
            if !error_frames {
                return;
            }
            OutboundMessage::balance_error(&err, request_id)
        }
    };

    sender.push(reply).await;
}

/// Serializes queued frames onto the socket until the queue closes or the
/// socket rejects a write.
async fn write_loop(
    connection_id: ConnectionId,
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<OutboundMessage>,
) {
    while let Some(message) = rx.recv().await {
        let json = match serde_json::to_string(&message) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(%connection_id, error = %err, "failed to serialize outbound message");
                continue;
            }
        };
        if let Err(err) = ws_tx.send(Message::text(json)).await {
            tracing::debug!(%connection_id, error = %err, "ws send failed");
            break;
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Balance, InMemoryBalanceResolver};

    fn make_service() -> Arc<BalanceService> {
        let resolver =
            InMemoryBalanceResolver::with_accounts([("9999999999".to_string(), Balance::new(42.0))]);
        Arc::new(BalanceService::new(Arc::new(resolver)))
    }

    fn make_sender(capacity: usize) -> (ConnectionSender, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            ConnectionSender {
                connection_id: ConnectionId::new(),
                tx,
            },
            rx,
        )
    }

    fn make_limit(permits: usize) -> Arc<Semaphore> {
        Arc::new(Semaphore::new(permits))
    }

    fn request(number: &str, request_id: Option<&str>) -> BalanceRequest {
        BalanceRequest {
            mobile_number: number.to_string(),
            request_id: request_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn push_after_close_is_noop() {
        let (sender, rx) = make_sender(1);
        drop(rx);
        let pushed = sender
            .push(OutboundMessage::balance_response(Balance::new(1.0), None))
            .await;
        assert!(!pushed);
    }

    #[tokio::test]
    async fn known_account_pushes_response() {
        let (sender, mut rx) = make_sender(4);
        serve_balance_request(request("9999999999", Some("r1")), sender, make_service(), false)
            .await;

        let Some(reply) = rx.recv().await else {
            panic!("expected reply");
        };
        assert_eq!(
            reply,
            OutboundMessage::balance_response(Balance::new(42.0), Some("r1".to_string()))
        );
    }

    #[tokio::test]
    async fn failure_is_silent_by_default() {
        let (sender, mut rx) = make_sender(4);
        serve_balance_request(request("unknown", None), sender, make_service(), false).await;

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn failure_sends_error_frame_when_enabled() {
        let (sender, mut rx) = make_sender(4);
        serve_balance_request(request("unknown", Some("r2")), sender, make_service(), true).await;

        let Some(OutboundMessage::BalanceError {
            code, request_id, ..
        }) = rx.recv().await
        else {
            panic!("expected error frame");
        };
        assert_eq!(code, 2001);
        assert_eq!(request_id.as_deref(), Some("r2"));
    }

    #[tokio::test]
    async fn malformed_frame_sends_nothing() {
        let (sender, mut rx) = make_sender(4);
        let options = ConnectionOptions {
            error_frames: true,
            ..ConnectionOptions::default()
        };
        dispatch(InboundMessage::parse("{oops"), &sender, &make_service(), &make_limit(1), options)
            .await;
        drop(sender);

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn invalid_payload_error_frame_when_enabled() {
        let (sender, mut rx) = make_sender(4);
        let options = ConnectionOptions {
            error_frames: true,
            ..ConnectionOptions::default()
        };
        let parsed = InboundMessage::parse(r#"{"type":"balanceRequest","requestId":"r3"}"#);
        dispatch(parsed, &sender, &make_service(), &make_limit(1), options).await;
        drop(sender);

        let Some(OutboundMessage::BalanceError {
            code, request_id, ..
        }) = rx.recv().await
        else {
            panic!("expected error frame");
        };
        assert_eq!(code, 1001);
        assert_eq!(request_id.as_deref(), Some("r3"));
    }

    #[tokio::test]
    async fn unrecognized_type_sends_nothing() {
        let (sender, mut rx) = make_sender(4);
        let parsed = InboundMessage::parse(r#"{"type":"ping"}"#);
        dispatch(
            parsed,
            &sender,
            &make_service(),
            &make_limit(1),
            ConnectionOptions::default(),
        )
        .await;
        drop(sender);

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn balance_request_waits_for_in_flight_permit() {
        let (sender, mut rx) = make_sender(4);
        let limit = make_limit(1);
        let service = make_service();
        let options = ConnectionOptions::default();
        let parsed = || {
            InboundMessage::parse(r#"{"type":"balanceRequest","mobileNumber":"9999999999"}"#)
        };

        let Ok(held) = Arc::clone(&limit).acquire_owned().await else {
            panic!("semaphore closed");
        };
        let blocked = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            dispatch(parsed(), &sender, &service, &limit, options),
        )
        .await;
        assert!(blocked.is_err());

        drop(held);
        dispatch(parsed(), &sender, &service, &limit, options).await;
        let Some(reply) = rx.recv().await else {
            panic!("expected reply");
        };
        assert_eq!(reply, OutboundMessage::balance_response(Balance::new(42.0), None));

        // the permit is returned once the request task finishes
        let Ok(_permit) = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            Arc::clone(&limit).acquire_owned(),
        )
        .await
        else {
            panic!("permit was not released");
        };
    }
}
