//! The coordinator actor: one Tokio task that owns all mutable state.
//!
//! Connection handlers talk to the actor through a [`Coordinator`]
//! handle, which is just a cheap-to-clone `mpsc::Sender` wrapper. The
//! actor processes commands strictly in arrival order, so every intent
//! observes a consistent snapshot and per-room events fan out in intent
//! order.
//!
//! Prompt generation is the one operation that suspends. The actor
//! never awaits the provider: it spawns a task and the result re-enters
//! the command queue as [`CoordinatorCommand::PromptResolved`], so a
//! slow provider cannot stall joins and starts.

use std::time::Duration;

use huddle_prompt::{PromptError, PromptProvider};
use huddle_protocol::{
    Audience, MemberRecord, PromptMode, RoomCode, RoomPhase, ServerEvent, SessionToken,
};
use huddle_session::SessionRegistry;
use tokio::sync::{mpsc, oneshot};

use crate::gateway::{EventSender, Gateway};
use crate::registry::RoomRegistry;
use crate::{RoomError, assign};

/// Command channel size. The actor drains commands quickly (nothing in
/// the loop blocks), so a small buffer is plenty.
const CHANNEL_SIZE: usize = 64;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunables for the coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// How long a room may sit idle (and a roomless session unseen)
    /// before the sweep reclaims it.
    pub retention: Duration,
    /// How often the background sweep fires.
    pub sweep_interval: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            retention: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Commands sent to the coordinator actor through its channel.
pub(crate) enum CoordinatorCommand {
    /// A client wants into a room, possibly reconnecting an old session.
    Join {
        name: String,
        room_code: Option<RoomCode>,
        session_token: Option<SessionToken>,
        sender: EventSender,
        reply: oneshot::Sender<SessionToken>,
    },

    /// Deal secrets and move the room to Playing.
    Start {
        room_code: RoomCode,
        requester: SessionToken,
    },

    /// Return the room to the lobby, clearing secrets and the prompt.
    Reset {
        room_code: RoomCode,
        requester: SessionToken,
    },

    /// Kick off prompt generation for a room.
    RequestPrompt {
        room_code: RoomCode,
        mode: PromptMode,
        requester: SessionToken,
    },

    /// A spawned generation task finished (either way).
    PromptResolved {
        room_code: RoomCode,
        requester: SessionToken,
        result: Result<String, PromptError>,
    },

    /// Deliberate departure: give up the seat.
    Leave {
        room_code: RoomCode,
        requester: SessionToken,
    },

    /// Transport dropped: keep the seat, drop the binding. The sender
    /// identifies which socket is reporting, so a late teardown cannot
    /// clobber a reconnect's fresh binding.
    Disconnect {
        token: SessionToken,
        sender: EventSender,
    },

    /// Reclaim idle rooms and abandoned sessions.
    Sweep,

    /// Report registry sizes.
    Stats {
        reply: oneshot::Sender<CoordinatorStats>,
    },
}

/// A snapshot of registry sizes, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorStats {
    pub rooms: usize,
    pub sessions: usize,
    pub bindings: usize,
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Handle to the running coordinator actor.
///
/// Cheap to clone; every connection handler holds one. All methods
/// return [`RoomError::Unavailable`] only when the actor is gone, i.e.
/// during server shutdown.
#[derive(Clone)]
pub struct Coordinator {
    sender: mpsc::Sender<CoordinatorCommand>,
}

impl Coordinator {
    /// Joins (or creates, or reconnects to) a room.
    ///
    /// Returns the session token the caller is now acting as. The
    /// handler must remember it: it is the `requester` for every later
    /// intent on this connection, and the key to unbind on disconnect.
    pub async fn join(
        &self,
        name: String,
        room_code: Option<RoomCode>,
        session_token: Option<SessionToken>,
        sender: EventSender,
    ) -> Result<SessionToken, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(CoordinatorCommand::Join {
                name,
                room_code,
                session_token,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable)?;
        reply_rx.await.map_err(|_| RoomError::Unavailable)
    }

    /// Requests a game start (fire-and-forget; outcomes arrive as
    /// events).
    pub async fn start(
        &self,
        room_code: RoomCode,
        requester: SessionToken,
    ) -> Result<(), RoomError> {
        self.sender
            .send(CoordinatorCommand::Start {
                room_code,
                requester,
            })
            .await
            .map_err(|_| RoomError::Unavailable)
    }

    /// Requests a lobby reset.
    pub async fn reset(
        &self,
        room_code: RoomCode,
        requester: SessionToken,
    ) -> Result<(), RoomError> {
        self.sender
            .send(CoordinatorCommand::Reset {
                room_code,
                requester,
            })
            .await
            .map_err(|_| RoomError::Unavailable)
    }

    /// Requests a fresh discussion prompt.
    pub async fn request_prompt(
        &self,
        room_code: RoomCode,
        mode: PromptMode,
        requester: SessionToken,
    ) -> Result<(), RoomError> {
        self.sender
            .send(CoordinatorCommand::RequestPrompt {
                room_code,
                mode,
                requester,
            })
            .await
            .map_err(|_| RoomError::Unavailable)
    }

    /// Gives up the requester's seat in a room.
    pub async fn leave(
        &self,
        room_code: RoomCode,
        requester: SessionToken,
    ) -> Result<(), RoomError> {
        self.sender
            .send(CoordinatorCommand::Leave {
                room_code,
                requester,
            })
            .await
            .map_err(|_| RoomError::Unavailable)
    }

    /// Reports that a connection's transport is gone. `sender` is the
    /// reporting connection's own event channel; the binding is removed
    /// only if the token still points at it.
    pub async fn disconnect(
        &self,
        token: SessionToken,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        self.sender
            .send(CoordinatorCommand::Disconnect { token, sender })
            .await
            .map_err(|_| RoomError::Unavailable)
    }

    /// Triggers a reclamation sweep immediately. The background timer
    /// does this on its own; exposed so tests don't have to wait.
    pub async fn sweep(&self) -> Result<(), RoomError> {
        self.sender
            .send(CoordinatorCommand::Sweep)
            .await
            .map_err(|_| RoomError::Unavailable)
    }

    /// Returns current registry sizes.
    pub async fn stats(&self) -> Result<CoordinatorStats, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(CoordinatorCommand::Stats { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable)?;
        reply_rx.await.map_err(|_| RoomError::Unavailable)
    }
}

/// Spawns the coordinator actor and its background sweep timer.
///
/// Both tasks stop on their own once every [`Coordinator`] handle is
/// dropped: the actor's `recv` returns `None` when the sweep timer (the
/// last sender) gives up.
pub fn spawn_coordinator<P: PromptProvider>(
    provider: P,
    config: CoordinatorConfig,
) -> Coordinator {
    let (tx, rx) = mpsc::channel(CHANNEL_SIZE);

    let actor = CoordinatorActor {
        sessions: SessionRegistry::new(),
        rooms: RoomRegistry::new(),
        gateway: Gateway::new(),
        provider,
        config: config.clone(),
        receiver: rx,
        self_sender: tx.clone(),
    };
    tokio::spawn(actor.run());

    // Periodic sweep. Stops once the actor is gone.
    let sweep_tx = tx.clone();
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(config.sweep_interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        timer.tick().await; // first tick fires immediately, skip it
        loop {
            timer.tick().await;
            if sweep_tx.send(CoordinatorCommand::Sweep).await.is_err() {
                break;
            }
        }
    });

    Coordinator { sender: tx }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// The internal actor state. Runs inside a Tokio task.
struct CoordinatorActor<P: PromptProvider> {
    sessions: SessionRegistry,
    rooms: RoomRegistry,
    gateway: Gateway,
    provider: P,
    config: CoordinatorConfig,
    receiver: mpsc::Receiver<CoordinatorCommand>,
    /// Used by spawned prompt tasks to feed results back into the queue.
    self_sender: mpsc::Sender<CoordinatorCommand>,
}

impl<P: PromptProvider> CoordinatorActor<P> {
    /// Runs the actor loop until every handle is dropped.
    async fn run(mut self) {
        tracing::info!("coordinator started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                CoordinatorCommand::Join {
                    name,
                    room_code,
                    session_token,
                    sender,
                    reply,
                } => {
                    let token = self.handle_join(name, room_code, session_token, sender);
                    let _ = reply.send(token);
                }
                CoordinatorCommand::Start {
                    room_code,
                    requester,
                } => self.handle_start(room_code, requester),
                CoordinatorCommand::Reset {
                    room_code,
                    requester,
                } => self.handle_reset(room_code, requester),
                CoordinatorCommand::RequestPrompt {
                    room_code,
                    mode,
                    requester,
                } => self.handle_request_prompt(room_code, mode, requester),
                CoordinatorCommand::PromptResolved {
                    room_code,
                    requester,
                    result,
                } => self.handle_prompt_resolved(room_code, requester, result),
                CoordinatorCommand::Leave {
                    room_code,
                    requester,
                } => self.handle_leave(room_code, requester),
                CoordinatorCommand::Disconnect { token, sender } => {
                    self.handle_disconnect(token, sender)
                }
                CoordinatorCommand::Sweep => self.handle_sweep(),
                CoordinatorCommand::Stats { reply } => {
                    let _ = reply.send(CoordinatorStats {
                        rooms: self.rooms.len(),
                        sessions: self.sessions.len(),
                        bindings: self.gateway.len(),
                    });
                }
            }
        }

        tracing::info!("coordinator stopped");
    }

    /// Resolves an audience to concrete gateway sends.
    ///
    /// Room audiences are resolved against the registry at send time, so
    /// an event addressed to a vanished room is silently dropped.
    fn deliver(&self, audience: Audience, event: ServerEvent) {
        match audience {
            Audience::Session(token) => self.gateway.send_to(&token, event),
            Audience::Room(code) => {
                if let Some(room) = self.rooms.get(&code) {
                    self.gateway.broadcast(room.member_tokens(), &event);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Join
    // -----------------------------------------------------------------------

    fn handle_join(
        &mut self,
        name: String,
        room_code: Option<RoomCode>,
        session_token: Option<SessionToken>,
        sender: EventSender,
    ) -> SessionToken {
        let session = self.sessions.resolve(session_token.as_ref(), &name);
        let token = session.token.clone();
        let display_name = session.display_name.clone();
        // A session already seated somewhere goes back to ITS room,
        // whatever code the reconnecting client supplied.
        let remembered = session.room.clone();

        self.gateway.bind(token.clone(), sender);
        self.deliver(
            Audience::Session(token.clone()),
            ServerEvent::SessionSet {
                session_token: token.clone(),
            },
        );

        let mut rng = rand::rng();
        let code = self
            .rooms
            .get_or_create(remembered.or(room_code), &token, &mut rng);

        // get_or_create always inserts, so the room exists here.
        let Some(room) = self.rooms.get_mut(&code) else {
            return token;
        };

        if !room.has_member(&token) {
            // Pop a color, but let an existing session color win (a
            // session can only lack a seat AND hold a color briefly,
            // between room reclamation and its own).
            let offered = room.pop_color(&mut rng);
            let color = self
                .sessions
                .set_color_if_unset(&token, offered.clone())
                .unwrap_or(offered);
            let is_host = room.is_host(&token);
            room.members.push(MemberRecord {
                session_token: token.clone(),
                name: display_name,
                is_host,
                color,
            });
            self.sessions.attach_to_room(&token, code.clone());
            tracing::info!(room = %code, session = %token, "member joined");
        } else {
            tracing::info!(room = %code, session = %token, "member reconnected");
        }
        room.touch();
        let playing = room.phase.is_playing();
        let snapshot = room.snapshot();

        // A reconnecting player mid-game gets their secret back before
        // the snapshot, so the client renders a complete hand.
        if playing {
            if let Some(value) = self.sessions.get(&token).and_then(|s| s.secret) {
                self.deliver(
                    Audience::Session(token.clone()),
                    ServerEvent::SecretDealt { value },
                );
            }
        }

        self.deliver(Audience::Room(code), snapshot);
        token
    }

    // -----------------------------------------------------------------------
    // Start / Reset
    // -----------------------------------------------------------------------

    fn handle_start(&mut self, room_code: RoomCode, requester: SessionToken) {
        let Some(room) = self.rooms.get_mut(&room_code) else {
            tracing::debug!(room = %room_code, "start for unknown room, ignoring");
            return;
        };
        if !room.is_host(&requester) {
            self.deliver(
                Audience::Session(requester),
                ServerEvent::Error {
                    message: "only the host can start the game".into(),
                },
            );
            return;
        }
        if room.phase.is_playing() {
            tracing::debug!(room = %room_code, "start while already playing, ignoring");
            return;
        }
        room.touch();

        let mut rng = rand::rng();
        let secrets = match assign::deal(room.members.len(), &mut rng) {
            Ok(secrets) => secrets,
            Err(err) => {
                self.deliver(
                    Audience::Session(requester),
                    ServerEvent::Error {
                        message: err.to_string(),
                    },
                );
                return;
            }
        };

        room.phase = RoomPhase::Playing;
        let snapshot = room.snapshot();
        let dealt: Vec<(SessionToken, u8)> = room
            .member_tokens()
            .cloned()
            .zip(secrets)
            .collect();
        tracing::info!(room = %room_code, members = dealt.len(), "game started");

        for (token, value) in &dealt {
            self.sessions.set_secret(token, Some(*value));
        }

        // Snapshot first so clients flip to Playing before the secret
        // lands.
        self.deliver(Audience::Room(room_code), snapshot);
        for (token, value) in dealt {
            self.deliver(Audience::Session(token), ServerEvent::SecretDealt { value });
        }
    }

    fn handle_reset(&mut self, room_code: RoomCode, requester: SessionToken) {
        let Some(room) = self.rooms.get_mut(&room_code) else {
            tracing::debug!(room = %room_code, "reset for unknown room, ignoring");
            return;
        };
        if !room.is_host(&requester) {
            self.deliver(
                Audience::Session(requester),
                ServerEvent::Error {
                    message: "only the host can reset the game".into(),
                },
            );
            return;
        }

        room.phase = RoomPhase::Lobby;
        room.prompt = None;
        room.touch();
        let snapshot = room.snapshot();
        let members: Vec<SessionToken> = room.member_tokens().cloned().collect();
        for token in &members {
            self.sessions.set_secret(token, None);
        }
        tracing::info!(room = %room_code, "room reset to lobby");

        self.deliver(Audience::Room(room_code), snapshot);
    }

    // -----------------------------------------------------------------------
    // Prompts
    // -----------------------------------------------------------------------

    fn handle_request_prompt(
        &mut self,
        room_code: RoomCode,
        mode: PromptMode,
        requester: SessionToken,
    ) {
        let Some(room) = self.rooms.get_mut(&room_code) else {
            tracing::debug!(room = %room_code, "prompt request for unknown room, ignoring");
            return;
        };
        room.touch();
        tracing::info!(room = %room_code, %mode, "prompt requested");

        let provider = self.provider.clone();
        let feedback = self.self_sender.clone();
        tokio::spawn(async move {
            let result = provider.generate(mode).await;
            // Actor gone means the server is shutting down.
            let _ = feedback
                .send(CoordinatorCommand::PromptResolved {
                    room_code,
                    requester,
                    result,
                })
                .await;
        });
    }

    fn handle_prompt_resolved(
        &mut self,
        room_code: RoomCode,
        requester: SessionToken,
        result: Result<String, PromptError>,
    ) {
        let Some(room) = self.rooms.get_mut(&room_code) else {
            tracing::debug!(room = %room_code, "prompt resolved for vanished room, dropping");
            return;
        };
        match result {
            Ok(prompt) => {
                tracing::info!(room = %room_code, "prompt ready");
                // Last write wins if requests overlapped.
                room.prompt = Some(prompt.clone());
                self.deliver(
                    Audience::Room(room_code),
                    ServerEvent::PromptReady { prompt },
                );
            }
            Err(err) => {
                tracing::warn!(room = %room_code, error = %err, "prompt generation failed");
                self.deliver(
                    Audience::Session(requester),
                    ServerEvent::Error {
                        message: "failed to generate a prompt, try again".into(),
                    },
                );
            }
        }
    }

    // -----------------------------------------------------------------------
    // Leave / Disconnect
    // -----------------------------------------------------------------------

    fn handle_leave(&mut self, room_code: RoomCode, requester: SessionToken) {
        let Some(room) = self.rooms.get_mut(&room_code) else {
            tracing::debug!(room = %room_code, "leave for unknown room, ignoring");
            return;
        };
        if !room.remove_member(&requester) {
            tracing::debug!(room = %room_code, session = %requester, "leave from non-member, ignoring");
            return;
        }
        room.touch();
        let snapshot = room.snapshot();
        // The session keeps its identity and its transport binding (the
        // socket is still up); only the seat and room-scoped state go.
        self.sessions.detach_from_room(&requester);
        tracing::info!(room = %room_code, session = %requester, "member left");

        self.deliver(Audience::Room(room_code), snapshot);
    }

    fn handle_disconnect(&mut self, token: SessionToken, sender: EventSender) {
        // The seat survives; only the binding goes. The activity stamp
        // is refreshed so the retention clock starts at the disconnect,
        // not at the last intent. If the session already rebound on a
        // new socket, the gateway ignores this stale unbind.
        self.sessions.touch(&token);
        self.gateway.unbind(&token, &sender);
        tracing::info!(session = %token, "transport disconnected");
    }

    // -----------------------------------------------------------------------
    // Sweep
    // -----------------------------------------------------------------------

    fn handle_sweep(&mut self) {
        let retention = self.config.retention;

        // Bindings whose receiving half is gone count as disconnected,
        // whether or not the handler managed to report every token it
        // ever bound. Pruning them first keeps dead channels from
        // holding rooms and sessions past the retention window.
        self.gateway.prune_closed();

        // A room is reclaimable only when it has been idle past the
        // retention window AND none of its members is still connected.
        let doomed: Vec<RoomCode> = self
            .rooms
            .iter()
            .filter(|(_, room)| {
                room.last_activity.elapsed() > retention
                    && room.member_tokens().all(|t| !self.gateway.is_bound(t))
            })
            .map(|(code, _)| code.clone())
            .collect();

        for code in doomed {
            if let Some(room) = self.rooms.remove(&code) {
                for token in room.member_tokens() {
                    self.sessions.remove(token);
                }
            }
        }

        // Sessions that belong to no room, went quiet past the window,
        // and have no live binding.
        for token in self.sessions.roomless_stale(retention) {
            if !self.gateway.is_bound(&token) {
                self.sessions.remove(&token);
            }
        }
    }
}
