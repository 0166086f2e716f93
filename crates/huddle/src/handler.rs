//! Per-connection handler: intent decoding and event delivery.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. One `select!` loop multiplexes two directions:
//!
//!   - inbound: transport frames → decode [`ClientIntent`] → coordinator
//!   - outbound: coordinator events → encode [`ServerEvent`] → transport
//!
//! The first `join` intent binds this connection's event channel to a
//! session token in the coordinator's gateway; that token is then the
//! requester for every later intent on the connection, regardless of
//! what the client claims. On teardown the coordinator is told the
//! transport is gone, which unbinds the channel but keeps the seat.

use huddle_protocol::{ClientIntent, Codec, ServerEvent, SessionToken};
use huddle_room::Coordinator;
use huddle_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::HuddleError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    coordinator: Coordinator,
    codec: C,
) -> Result<(), HuddleError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    // Outbound events accumulate here once the gateway binding exists.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerEvent>();

    // The session this connection acts as, set by the first join.
    let mut bound: Option<SessionToken> = None;

    let result = loop {
        tokio::select! {
            maybe_event = event_rx.recv() => {
                // The sending half lives in this function, so the
                // channel can't close while we're here.
                let Some(event) = maybe_event else { break Ok(()) };
                let bytes = codec.encode(&event)?;
                if let Err(e) = conn.send(&bytes).await {
                    tracing::debug!(%conn_id, error = %e, "send failed");
                    break Ok(());
                }
            }

            incoming = conn.recv() => {
                let data = match incoming {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::debug!(%conn_id, "connection closed cleanly");
                        break Ok(());
                    }
                    Err(e) => {
                        tracing::debug!(%conn_id, error = %e, "recv error");
                        break Ok(());
                    }
                };

                let intent: ClientIntent = match codec.decode(&data) {
                    Ok(intent) => intent,
                    Err(e) => {
                        // Malformed input is the client's problem, not
                        // grounds for dropping the connection.
                        tracing::debug!(%conn_id, error = %e, "failed to decode intent");
                        let _ = event_tx.send(ServerEvent::Error {
                            message: "unrecognized message".into(),
                        });
                        continue;
                    }
                };

                if let Err(e) =
                    dispatch(&coordinator, &event_tx, &mut bound, intent).await
                {
                    // Only Unavailable escapes dispatch: the server is
                    // shutting down, so is this handler.
                    break Err(e.into());
                }
            }
        }
    };

    if let Some(token) = bound {
        let _ = coordinator.disconnect(token, event_tx.clone()).await;
    }
    result
}

/// Routes one decoded intent to the coordinator.
async fn dispatch(
    coordinator: &Coordinator,
    event_tx: &mpsc::UnboundedSender<ServerEvent>,
    bound: &mut Option<SessionToken>,
    intent: ClientIntent,
) -> Result<(), huddle_room::RoomError> {
    match intent {
        ClientIntent::Join {
            name,
            room_code,
            session_token,
        } => {
            let token = coordinator
                .join(name, room_code, session_token, event_tx.clone())
                .await?;
            // A second join on this connection may mint a different
            // session. The old token's binding points at this same
            // channel; release it now, or it lingers until the sweep.
            if let Some(previous) = bound.replace(token) {
                if bound.as_ref() != Some(&previous) {
                    coordinator.disconnect(previous, event_tx.clone()).await?;
                }
            }
            Ok(())
        }

        // Everything else needs an established session.
        intent => {
            let Some(requester) = bound.clone() else {
                let _ = event_tx.send(ServerEvent::Error {
                    message: "join a room first".into(),
                });
                return Ok(());
            };
            match intent {
                ClientIntent::Join { .. } => unreachable!("handled above"),
                ClientIntent::Start { room_code } => coordinator.start(room_code, requester).await,
                ClientIntent::Reset { room_code } => coordinator.reset(room_code, requester).await,
                ClientIntent::RequestPrompt { room_code, mode } => {
                    coordinator.request_prompt(room_code, mode, requester).await
                }
                ClientIntent::Leave { room_code } => coordinator.leave(room_code, requester).await,
            }
        }
    }
}
