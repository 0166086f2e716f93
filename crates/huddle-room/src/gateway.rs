//! The gateway: session token → outbound event channel bindings.
//!
//! The coordinator addresses every event to a token or a set of tokens;
//! the gateway resolves those to live channels. Sessions without a
//! binding (transport dropped, not yet reconnected) are silently
//! skipped — they catch up from the next `RoomUpdate` after rejoining.

use std::collections::HashMap;

use huddle_protocol::{ServerEvent, SessionToken};
use tokio::sync::mpsc;

/// The sending half handed to the gateway at join time. The receiving
/// half lives in the connection handler, which pumps events onto the
/// transport.
///
/// Unbounded: events are small and the coordinator must never block on
/// a slow client.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Live outbound bindings, one per connected session.
#[derive(Debug, Default)]
pub struct Gateway {
    senders: HashMap<SessionToken, EventSender>,
}

impl Gateway {
    /// Creates an empty gateway.
    pub fn new() -> Self {
        Self {
            senders: HashMap::new(),
        }
    }

    /// Binds a session to an outbound channel.
    ///
    /// A rebind (same token, new channel) replaces the old binding:
    /// this is exactly what happens when a client reconnects on a new
    /// socket, and the stale channel's events are simply dropped.
    pub fn bind(&mut self, token: SessionToken, sender: EventSender) {
        if self.senders.insert(token.clone(), sender).is_some() {
            tracing::debug!(%token, "gateway binding replaced");
        } else {
            tracing::debug!(%token, "gateway binding added");
        }
    }

    /// Removes a session's binding, but only if it still belongs to
    /// `sender`'s channel.
    ///
    /// Disconnects race reconnects: a client can rebind its token on a
    /// fresh socket before the dead socket's teardown reports in. The
    /// stale teardown must not tear out the fresh binding, so callers
    /// identify themselves and an unbind for a channel that no longer
    /// holds the token is a no-op.
    pub fn unbind(&mut self, token: &SessionToken, sender: &EventSender) {
        match self.senders.get(token) {
            Some(current) if current.same_channel(sender) => {
                self.senders.remove(token);
                tracing::debug!(%token, "gateway binding removed");
            }
            Some(_) => {
                tracing::debug!(%token, "stale unbind for rebound session, ignoring");
            }
            None => {}
        }
    }

    /// Drops every binding whose receiving half is gone.
    ///
    /// A handler that dies without reporting its tokens (or a connection
    /// that minted more sessions than it unbound) leaves entries behind;
    /// their closed channels are the tell.
    pub fn prune_closed(&mut self) {
        self.senders.retain(|token, sender| {
            let live = !sender.is_closed();
            if !live {
                tracing::debug!(%token, "pruned binding with closed channel");
            }
            live
        });
    }

    /// Returns `true` if the session currently has a live binding.
    pub fn is_bound(&self, token: &SessionToken) -> bool {
        self.senders.contains_key(token)
    }

    /// Delivers an event to one session. No-op if the session is
    /// unbound or its receiver is gone.
    pub fn send_to(&self, token: &SessionToken, event: ServerEvent) {
        if let Some(sender) = self.senders.get(token) {
            // A closed receiver just means the handler is mid-teardown.
            let _ = sender.send(event);
        }
    }

    /// Delivers a copy of an event to every listed session that has a
    /// live binding.
    pub fn broadcast<'a>(
        &self,
        tokens: impl Iterator<Item = &'a SessionToken>,
        event: &ServerEvent,
    ) {
        for token in tokens {
            self.send_to(token, event.clone());
        }
    }

    /// Returns the number of live bindings.
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
