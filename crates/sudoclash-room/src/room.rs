//! Room actor: an isolated Tokio task that owns one match.
//!
//! Each room runs in its own task and talks to the outside world through a
//! bounded mpsc mailbox. Everything a room receives is applied in mailbox
//! order, which is what makes the match state authoritative: two actions
//! for the same room can never interleave.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use sudoclash_protocol::action::{lifecycle, lobby, protocol};
use sudoclash_protocol::{ActionId, Payload, PlayerId, ProtocolError, Registry, RoomId, field};
use sudoclash_state::{
    ActionContext, Board, MatchConfig, MatchState, Mode, RejectReason, StateDelta, apply_action,
};
use tokio::sync::{mpsc, oneshot};

use crate::{Clock, RoomConfig, RoomError, RoomState};

/// Channel for delivering encoded packets to one player's connection.
pub type PlayerSender = mpsc::UnboundedSender<Bytes>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// A decoded, match-scoped packet from a player.
    Action { sender: PlayerId, payload: Payload },

    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },

    /// A copy of one player's board, for inspection.
    GetBoard {
        player_id: PlayerId,
        reply: oneshot::Sender<Option<Board>>,
    },

    Shutdown,
}

/// A snapshot of room metadata (not the match state itself).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub mode: Mode,
    pub state: RoomState,
    /// Players in join order.
    pub players: Vec<PlayerId>,
    pub max_players: usize,
    pub winner: Option<PlayerId>,
}

impl RoomInfo {
    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}

/// Handle to a running room actor.
///
/// Cheap to clone: it is an `mpsc::Sender` and the room id.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Returns `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(build(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    pub async fn join(&self, player_id: PlayerId, sender: PlayerSender) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Join {
            player_id,
            sender,
            reply,
        })
        .await?
    }

    pub async fn leave(&self, player_id: PlayerId) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Leave { player_id, reply })
            .await?
    }

    /// Queues a player action (fire-and-forget). The outcome reaches the
    /// players as packets.
    pub async fn send_action(&self, sender: PlayerId, payload: Payload) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Action { sender, payload })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        self.request(|reply| RoomCommand::GetInfo { reply }).await
    }

    /// `None` if the match has not started or `player_id` is not in it.
    pub async fn board(&self, player_id: PlayerId) -> Result<Option<Board>, RoomError> {
        self.request(|reply| RoomCommand::GetBoard { player_id, reply })
            .await
    }

    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }
}

/// Everything a room needs besides its id and mode.
#[derive(Clone)]
pub struct RoomContext {
    pub registry: Arc<Registry>,
    pub clock: Arc<dyn Clock>,
    pub match_config: MatchConfig,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    mode: Mode,
    state: RoomState,
    config: RoomConfig,
    ctx: RoomContext,
    /// Join order matters: it is the player order of the match.
    players: Vec<PlayerId>,
    senders: HashMap<PlayerId, PlayerSender>,
    game: Option<MatchState>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, mode = %self.mode, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player_id,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player_id, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { player_id, reply } => {
                    let result = self.handle_leave(player_id);
                    let _ = reply.send(result);
                }
                RoomCommand::Action { sender, payload } => {
                    self.handle_action(sender, payload);
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::GetBoard { player_id, reply } => {
                    let board = self.game.as_ref().and_then(|g| g.board(player_id)).cloned();
                    let _ = reply.send(board);
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room_id = %self.room_id, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    fn now(&self) -> u64 {
        self.ctx.clock.now_ms()
    }

    fn handle_join(&mut self, player_id: PlayerId, sender: PlayerSender) -> Result<(), RoomError> {
        if !self.state.is_joinable() {
            return Err(RoomError::InvalidState(format!(
                "cannot join room in state {}",
                self.state
            )));
        }
        if self.players.contains(&player_id) {
            return Err(RoomError::AlreadyInRoom(player_id, self.room_id));
        }
        if self.players.len() >= self.config.max_players {
            return Err(RoomError::RoomFull(self.room_id));
        }

        self.players.push(player_id);
        self.senders.insert(player_id, sender);
        tracing::info!(
            room_id = %self.room_id,
            %player_id,
            players = self.players.len(),
            "player joined"
        );
        self.broadcast(&self.membership(lobby::ROOM_JOINED, player_id));

        // Auto-start when minimum players reached.
        if self.players.len() >= self.config.min_players {
            self.start_match();
        }
        Ok(())
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        if !self.players.contains(&player_id) {
            return Err(RoomError::NotInRoom(player_id, self.room_id));
        }

        // The leaver gets the notification too, as confirmation.
        self.broadcast(&self.membership(lobby::ROOM_LEFT, player_id));
        self.players.retain(|&p| p != player_id);
        self.senders.remove(&player_id);

        tracing::info!(
            room_id = %self.room_id,
            %player_id,
            players = self.players.len(),
            "player left"
        );

        if self.state.is_active() {
            if let Some(game) = &mut self.game {
                if let Ok(winner) = game.forfeit(player_id) {
                    self.end_match(winner);
                }
            }
        }
        Ok(())
    }

    fn handle_action(&mut self, sender: PlayerId, payload: Payload) {
        if !self.players.contains(&sender) {
            tracing::warn!(
                room_id = %self.room_id,
                %sender,
                "action from non-member, ignoring"
            );
            return;
        }

        match payload.action() {
            protocol::SYNC_TIME => self.sync_time(sender, &payload),
            lifecycle::FORFEIT => self.forfeit(sender, &payload),
            _ => self.apply(sender, payload),
        }
    }

    fn sync_time(&self, sender: PlayerId, request: &Payload) {
        let Ok(client_time) = request.u32(field::CLIENT_TIME) else {
            return;
        };
        let reply = Payload::new(protocol::TIME_SYNCED)
            .with(field::CLIENT_TIME, client_time)
            .with(field::SERVER_TIME, wire_time(self.now()));
        self.send_to(sender, &reply);
    }

    fn forfeit(&mut self, sender: PlayerId, request: &Payload) {
        if request.u32(field::PLAYER_ID).ok() != Some(sender.0) {
            tracing::warn!(room_id = %self.room_id, %sender, "forfeit for another player, ignoring");
            return;
        }
        let Some(game) = &mut self.game else {
            return;
        };
        match game.forfeit(sender) {
            Ok(winner) => {
                tracing::info!(room_id = %self.room_id, %sender, "player forfeited");
                self.end_match(winner);
            }
            Err(reason) => {
                tracing::debug!(room_id = %self.room_id, %sender, %reason, "forfeit refused");
            }
        }
    }

    fn apply(&mut self, sender: PlayerId, payload: Payload) {
        let now = self.now();
        let result = match &mut self.game {
            Some(game) => apply_action(game, &payload, ActionContext { sender, now }),
            None => Err(RejectReason::NotStarted),
        };

        match result {
            Ok(delta) => {
                match self.acknowledgement(&payload, &delta, now) {
                    Ok(ack) => self.broadcast(&ack),
                    Err(e) => {
                        tracing::warn!(room_id = %self.room_id, action = %payload.action(), error = %e, "cannot acknowledge action");
                    }
                }
                if let Some(winner) = delta.winner() {
                    tracing::info!(room_id = %self.room_id, %winner, "board solved");
                    self.end_match(Some(winner));
                }
            }
            Err(reason) => {
                tracing::debug!(
                    room_id = %self.room_id,
                    %sender,
                    action = %payload.action(),
                    %reason,
                    "action rejected"
                );
                let rejection = Payload::new(protocol::ACTION_REJECTED)
                    .with(field::SERVER_TIME, wire_time(now))
                    .with(field::ACTION_ID, payload.u32(field::ACTION_ID).unwrap_or(0))
                    .with(field::REASON, reason.code());
                self.send_to(sender, &rejection);
            }
        }
    }

    /// Builds the "used" broadcast for an applied action, including the
    /// fields only the server knows.
    fn acknowledgement(
        &self,
        request: &Payload,
        delta: &StateDelta,
        now: u64,
    ) -> Result<Payload, ProtocolError> {
        let mut ack = self
            .ctx
            .registry
            .acknowledge(request, wire_time(now), delta.player.0)?;
        if let Some(pup) = delta.drawn() {
            ack.insert(field::PUP_ID, pup.pup_id);
            ack.insert(field::ELEMENT, pup.element.code());
            ack.insert(field::LEVEL, pup.level);
        }
        if let Some(removed) = delta.removed() {
            ack.insert(field::REMOVED, u8::try_from(removed).unwrap_or(u8::MAX));
        }
        Ok(ack)
    }

    fn start_match(&mut self) {
        if !self.state.can_transition_to(RoomState::InProgress) {
            return;
        }
        let game = MatchState::new(&self.ctx.match_config, self.mode, &self.players);
        let started = Payload::new(lifecycle::MATCH_STARTED)
            .with(field::SERVER_TIME, wire_time(self.now()))
            .with(
                field::PLAYER_COUNT,
                u8::try_from(self.players.len()).unwrap_or(u8::MAX),
            )
            .with(field::SEED, game.seed());
        self.game = Some(game);
        self.state = RoomState::InProgress;
        tracing::info!(
            room_id = %self.room_id,
            players = self.players.len(),
            "match started"
        );
        self.broadcast(&started);
    }

    fn end_match(&mut self, winner: Option<PlayerId>) {
        if !self.state.can_transition_to(RoomState::Finished) {
            return;
        }
        self.state = RoomState::Finished;
        let ended = Payload::new(lifecycle::MATCH_ENDED)
            .with(field::SERVER_TIME, wire_time(self.now()))
            .with(field::WINNER_ID, winner.map_or(0, |w| w.0));
        tracing::info!(room_id = %self.room_id, winner = ?winner.map(|w| w.0), "match ended");
        self.broadcast(&ended);
    }

    fn membership(&self, action: ActionId, player_id: PlayerId) -> Payload {
        Payload::new(action)
            .with(field::ROOM_ID, self.room_id.to_string())
            .with(field::PLAYER_ID, player_id.0)
    }

    fn encode(&self, payload: &Payload) -> Option<Bytes> {
        match self.ctx.registry.encode(payload) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(room_id = %self.room_id, action = %payload.action(), error = %e, "dropping unencodable packet");
                None
            }
        }
    }

    fn broadcast(&self, payload: &Payload) {
        if let Some(bytes) = self.encode(payload) {
            for pid in &self.players {
                self.deliver(*pid, bytes.clone());
            }
        }
    }

    fn send_to(&self, player_id: PlayerId, payload: &Payload) {
        if let Some(bytes) = self.encode(payload) {
            self.deliver(player_id, bytes);
        }
    }

    /// Silently drops if the receiver is gone (player disconnected).
    fn deliver(&self, player_id: PlayerId, bytes: Bytes) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(bytes);
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id,
            mode: self.mode,
            state: self.state,
            players: self.players.clone(),
            max_players: self.config.max_players,
            winner: self.game.as_ref().and_then(MatchState::winner),
        }
    }
}

/// Server time as carried by `UInt` wire fields.
fn wire_time(ms: u64) -> u32 {
    u32::try_from(ms).unwrap_or(u32::MAX)
}

/// Spawns a new room actor task and returns a handle to communicate with it.
pub(crate) fn spawn_room(
    room_id: RoomId,
    mode: Mode,
    config: RoomConfig,
    ctx: RoomContext,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));

    let actor = RoomActor {
        room_id,
        mode,
        state: RoomState::WaitingForPlayers,
        config,
        ctx,
        players: Vec::new(),
        senders: HashMap::new(),
        game: None,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
