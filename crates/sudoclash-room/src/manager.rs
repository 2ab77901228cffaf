//! Room manager: creates, tracks, and routes players to rooms.

use std::collections::HashMap;

use rand::Rng;
use sudoclash_protocol::{Payload, PlayerId, RoomId};
use sudoclash_state::{Board, Mode};

use crate::room::{RoomContext, spawn_room};
use crate::{PlayerSender, RoomConfig, RoomError, RoomHandle, RoomInfo};

/// Manages all active rooms and tracks which player is in which room.
///
/// This is the entry point for room operations from the server layer.
pub struct RoomManager {
    rooms: HashMap<RoomId, RoomHandle>,

    /// A player can be in at most one room at a time.
    player_rooms: HashMap<PlayerId, RoomId>,

    ctx: RoomContext,
    channel_size: usize,
}

impl RoomManager {
    pub fn new(ctx: RoomContext) -> Self {
        Self {
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
            ctx,
            channel_size: RoomConfig::default().channel_size,
        }
    }

    /// Overrides the mailbox size of rooms created from now on.
    pub fn with_channel_size(mut self, channel_size: usize) -> Self {
        self.channel_size = channel_size;
        self
    }

    fn fresh_room_id(&self) -> RoomId {
        let mut rng = rand::rng();
        loop {
            let mut code = [0u8; RoomId::LEN];
            for byte in &mut code {
                *byte = RoomId::ALPHABET[rng.random_range(0..RoomId::ALPHABET.len())];
            }
            // Every byte comes from the alphabet, so this cannot fail.
            if let Ok(id) = RoomId::from_bytes(code) {
                if !self.rooms.contains_key(&id) {
                    return id;
                }
            }
        }
    }

    /// Creates a new, empty room and returns its code.
    pub fn create_room(&mut self, mode: Mode) -> RoomId {
        let room_id = self.fresh_room_id();
        let config = RoomConfig {
            channel_size: self.channel_size,
            ..RoomConfig::for_mode(mode)
        };
        let handle = spawn_room(room_id, mode, config, self.ctx.clone());
        self.rooms.insert(room_id, handle);
        tracing::info!(%room_id, %mode, "room created");
        room_id
    }

    /// Adds a player to a room.
    pub async fn join_room(
        &mut self,
        player_id: PlayerId,
        room_id: RoomId,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        if let Some(&current) = self.player_rooms.get(&player_id) {
            return Err(RoomError::AlreadyInRoom(player_id, current));
        }

        let handle = self
            .rooms
            .get(&room_id)
            .ok_or(RoomError::NotFound(room_id))?;

        handle.join(player_id, sender).await?;
        self.player_rooms.insert(player_id, room_id);
        Ok(())
    }

    /// Removes a player from their current room and returns its code.
    pub async fn leave_room(&mut self, player_id: PlayerId) -> Result<RoomId, RoomError> {
        let room_id = self
            .player_rooms
            .get(&player_id)
            .copied()
            .ok_or(RoomError::NoRoom(player_id))?;

        if let Some(handle) = self.rooms.get(&room_id) {
            match handle.leave(player_id).await {
                // A stopped room has nobody left to notify.
                Ok(()) | Err(RoomError::Unavailable(_)) => {}
                Err(e) => return Err(e),
            }
        }

        self.player_rooms.remove(&player_id);
        Ok(room_id)
    }

    /// Forwards a match-scoped packet to the player's room.
    pub async fn route(&self, player_id: PlayerId, payload: Payload) -> Result<(), RoomError> {
        let handle = self.handle_for(player_id)?;
        handle.send_action(player_id, payload).await
    }

    fn handle_for(&self, player_id: PlayerId) -> Result<&RoomHandle, RoomError> {
        let room_id = self
            .player_rooms
            .get(&player_id)
            .ok_or(RoomError::NoRoom(player_id))?;
        self.rooms
            .get(room_id)
            .ok_or(RoomError::NotFound(*room_id))
    }

    pub async fn get_room_info(&self, room_id: RoomId) -> Result<RoomInfo, RoomError> {
        let handle = self
            .rooms
            .get(&room_id)
            .ok_or(RoomError::NotFound(room_id))?;
        handle.get_info().await
    }

    /// A copy of `player_id`'s board, once their match has started.
    pub async fn board(&self, player_id: PlayerId) -> Result<Option<Board>, RoomError> {
        self.handle_for(player_id)?.board(player_id).await
    }

    /// Shuts down a room and removes all its players from the index.
    pub async fn destroy_room(&mut self, room_id: RoomId) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .remove(&room_id)
            .ok_or(RoomError::NotFound(room_id))?;

        let _ = handle.shutdown().await;
        self.player_rooms.retain(|_, rid| *rid != room_id);

        tracing::info!(%room_id, "room destroyed");
        Ok(())
    }

    /// Destroys rooms whose actor stopped and rooms with no players left,
    /// whatever their state. Returns the destroyed codes.
    pub async fn sweep(&mut self) -> Vec<RoomId> {
        let mut dead = Vec::new();
        for (room_id, handle) in &self.rooms {
            let abandoned = handle.is_closed()
                || match handle.get_info().await {
                    Ok(info) => info.players.is_empty(),
                    Err(_) => true,
                };
            if abandoned {
                dead.push(*room_id);
            }
        }
        for room_id in &dead {
            let _ = self.destroy_room(*room_id).await;
        }
        if !dead.is_empty() {
            tracing::debug!(destroyed = dead.len(), remaining = self.rooms.len(), "room sweep");
        }
        dead
    }

    pub fn player_room(&self, player_id: PlayerId) -> Option<RoomId> {
        self.player_rooms.get(&player_id).copied()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().copied().collect()
    }
}
