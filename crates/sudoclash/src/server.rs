//! `GameServer` builder and per-connection message handling.
//!
//! The server is transport-agnostic. Whatever accepts connections calls
//! [`GameServer::open`] with the connection's outbound channel, feeds every
//! received binary frame to [`GameServer::on_message`], and calls
//! [`GameServer::close`] when the socket goes away:
//!
//! ```text
//! frame ─▶ Registry::decode ─┬─▶ session / lobby (handled here)
//!                            └─▶ match-scoped ─▶ RoomManager::route ─▶ room actor
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use sudoclash_protocol::action::{lobby, session};
use sudoclash_protocol::{Domain, Payload, PlayerId, Registry, RoomId, field};
use sudoclash_room::{
    Clock, PlayerSender, RoomContext, RoomInfo, RoomManager, SystemClock,
};
use sudoclash_state::{Board, Mode};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::{Authenticator, ServerConfig, SudoclashError};

/// One client connection, as seen by the server.
#[derive(Debug)]
pub struct Session {
    conn_id: u64,
    player_id: Option<PlayerId>,
    outbound: PlayerSender,
}

impl Session {
    pub fn conn_id(&self) -> u64 {
        self.conn_id
    }

    /// `None` until `AUTHENTICATE` succeeds.
    pub fn player_id(&self) -> Option<PlayerId> {
        self.player_id
    }
}

/// What the transport should do after a frame was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Close,
}

/// Builder for configuring a [`GameServer`].
pub struct GameServerBuilder {
    config: ServerConfig,
    clock: Arc<dyn Clock>,
}

impl GameServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            clock: Arc::new(SystemClock::new()),
        }
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the wall clock, e.g. with a `ManualClock` in tests.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builds the action registry and the room directory.
    ///
    /// # Errors
    /// Fails only if the packet catalog does not build.
    pub fn build<A: Authenticator>(self, auth: A) -> Result<GameServer<A>, SudoclashError> {
        let registry = Arc::new(Registry::standard()?);
        let rooms = RoomManager::new(RoomContext {
            registry: Arc::clone(&registry),
            clock: Arc::clone(&self.clock),
            match_config: self.config.match_config(),
        })
        .with_channel_size(self.config.channel_size);

        Ok(GameServer {
            registry,
            rooms: Mutex::new(rooms),
            auth,
            clock: self.clock,
            config: self.config,
            next_conn_id: AtomicU64::new(1),
        })
    }
}

impl Default for GameServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared server state. Wrap it in an `Arc` and hand a clone to each
/// connection task.
pub struct GameServer<A: Authenticator> {
    registry: Arc<Registry>,
    /// The only shared mutable structure: room creation, joins and the
    /// sweep all go through this lock.
    rooms: Mutex<RoomManager>,
    auth: A,
    clock: Arc<dyn Clock>,
    config: ServerConfig,
    next_conn_id: AtomicU64,
}

impl<A: Authenticator> GameServer<A> {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Registers a new connection whose packets go to `outbound`.
    pub fn open(&self, outbound: PlayerSender) -> Session {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(conn_id, "connection opened");
        Session {
            conn_id,
            player_id: None,
            outbound,
        }
    }

    /// Cleans up after a connection: leaves its room, if any.
    pub async fn close(&self, session: &mut Session) {
        if let Some(player_id) = session.player_id.take() {
            let mut rooms = self.rooms.lock().await;
            if rooms.player_room(player_id).is_some() {
                if let Err(e) = rooms.leave_room(player_id).await {
                    tracing::debug!(%player_id, error = %e, "leave on close failed");
                }
            }
            tracing::info!(conn_id = session.conn_id, %player_id, "player disconnected");
        }
    }

    /// Handles one binary frame from `session`.
    ///
    /// Nothing a client sends can fail the connection: undecodable frames
    /// and refused requests are answered with an `ERROR` packet.
    pub async fn on_message(&self, session: &mut Session, data: &[u8]) -> Flow {
        let payload = match self.registry.decode(data) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(conn_id = session.conn_id, error = %e, "dropping undecodable packet");
                self.send_error(session, &SudoclashError::Protocol(e));
                return Flow::Continue;
            }
        };

        match self.dispatch(session, payload).await {
            Ok(flow) => flow,
            Err(e) => {
                tracing::debug!(
                    conn_id = session.conn_id,
                    player_id = ?session.player_id.map(|p| p.0),
                    error = %e,
                    "request refused"
                );
                self.send_error(session, &e);
                Flow::Continue
            }
        }
    }

    async fn dispatch(&self, session: &mut Session, payload: Payload) -> Result<Flow, SudoclashError> {
        let action = payload.action();
        match action {
            session::HEARTBEAT => {
                let ack = Payload::new(session::HEARTBEAT_ACK)
                    .with(field::CLIENT_TIME, payload.u32(field::CLIENT_TIME)?)
                    .with(field::SERVER_TIME, self.server_time());
                self.send(session, &ack);
                return Ok(Flow::Continue);
            }
            session::AUTHENTICATE => {
                self.authenticate(session, &payload).await?;
                return Ok(Flow::Continue);
            }
            session::DISCONNECT => {
                self.close(session).await;
                return Ok(Flow::Close);
            }
            _ => {}
        }

        let player_id = session.player_id.ok_or(SudoclashError::NotAuthenticated)?;
        match action {
            lobby::CREATE_ROOM => self.create_room(session, player_id, Mode::Match).await?,
            lobby::CREATE_PRACTICE => self.create_room(session, player_id, Mode::Practice).await?,
            lobby::JOIN_ROOM => {
                let room_id: RoomId = payload.str(field::ROOM_ID)?.parse()?;
                let mut rooms = self.rooms.lock().await;
                rooms
                    .join_room(player_id, room_id, session.outbound.clone())
                    .await?;
            }
            lobby::LEAVE_ROOM => {
                self.rooms.lock().await.leave_room(player_id).await?;
            }
            _ if Domain::of(action).is_some_and(Domain::is_match_scoped) => {
                self.rooms.lock().await.route(player_id, payload).await?;
            }
            _ => return Err(SudoclashError::UnexpectedAction(action)),
        }
        Ok(Flow::Continue)
    }

    async fn authenticate(&self, session: &mut Session, request: &Payload) -> Result<(), SudoclashError> {
        if let Some(current) = session.player_id {
            return Err(SudoclashError::AlreadyAuthenticated(current));
        }
        let player_id = self.auth.authenticate(request.str(field::TOKEN)?).await?;
        session.player_id = Some(player_id);
        tracing::info!(conn_id = session.conn_id, %player_id, "player authenticated");

        let reply = Payload::new(session::AUTHENTICATED).with(field::PLAYER_ID, player_id.0);
        self.send(session, &reply);
        Ok(())
    }

    /// Creates a room and joins its creator under one lock, so a sweep never
    /// sees the new room empty.
    async fn create_room(
        &self,
        session: &Session,
        player_id: PlayerId,
        mode: Mode,
    ) -> Result<(), SudoclashError> {
        let mut rooms = self.rooms.lock().await;
        if let Some(current) = rooms.player_room(player_id) {
            return Err(sudoclash_room::RoomError::AlreadyInRoom(player_id, current).into());
        }

        let room_id = rooms.create_room(mode);
        let created = Payload::new(lobby::ROOM_CREATED).with(field::ROOM_ID, room_id.to_string());
        self.send(session, &created);

        if let Err(e) = rooms
            .join_room(player_id, room_id, session.outbound.clone())
            .await
        {
            let _ = rooms.destroy_room(room_id).await;
            return Err(e.into());
        }
        Ok(())
    }

    fn server_time(&self) -> u32 {
        u32::try_from(self.clock.now_ms()).unwrap_or(u32::MAX)
    }

    fn send(&self, session: &Session, payload: &Payload) {
        match self.registry.encode(payload) {
            Ok(bytes) => {
                // Silently drops if the connection is gone.
                let _ = session.outbound.send(bytes);
            }
            Err(e) => {
                tracing::warn!(action = %payload.action(), error = %e, "dropping unencodable packet");
            }
        }
    }

    fn send_error(&self, session: &Session, error: &SudoclashError) {
        let mut message = error.to_string();
        let mut cut = usize::from(u16::MAX);
        if message.len() > cut {
            while !message.is_char_boundary(cut) {
                cut -= 1;
            }
            message.truncate(cut);
        }
        let packet = Payload::new(session::ERROR)
            .with(field::CODE, error.code())
            .with(field::MESSAGE, message);
        self.send(session, &packet);
    }

    // -----------------------------------------------------------------
    // Room directory
    // -----------------------------------------------------------------

    pub async fn room_info(&self, room_id: RoomId) -> Result<RoomInfo, SudoclashError> {
        Ok(self.rooms.lock().await.get_room_info(room_id).await?)
    }

    pub async fn player_room(&self, player_id: PlayerId) -> Option<RoomId> {
        self.rooms.lock().await.player_room(player_id)
    }

    pub async fn board(&self, player_id: PlayerId) -> Result<Option<Board>, SudoclashError> {
        Ok(self.rooms.lock().await.board(player_id).await?)
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.room_count()
    }

    /// Destroys abandoned rooms now.
    pub async fn sweep(&self) -> Vec<RoomId> {
        self.rooms.lock().await.sweep().await
    }
}

/// Runs [`GameServer::sweep`] every `sweep_interval` until the task is
/// aborted.
pub fn spawn_sweeper<A: Authenticator>(server: Arc<GameServer<A>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(server.config.sweep_interval());
        loop {
            interval.tick().await;
            let destroyed = server.sweep().await;
            if !destroyed.is_empty() {
                tracing::info!(destroyed = destroyed.len(), "swept abandoned rooms");
            }
        }
    })
}
