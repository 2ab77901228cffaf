//! Integration tests for the room system, driven by a manual clock.

use std::sync::Arc;

use bytes::Bytes;
use sudoclash_protocol::action::{legacy, lifecycle, lobby, mechanics, protocol};
use sudoclash_protocol::{ActionId, Payload, PlayerId, Registry, RoomId, field};
use sudoclash_room::{
    ManualClock, PlayerSender, RoomContext, RoomError, RoomManager, RoomState,
};
use sudoclash_state::{MatchConfig, Mode, Puzzle};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

const ALICE: PlayerId = PlayerId(1);
const BOB: PlayerId = PlayerId(2);
const CAROL: PlayerId = PlayerId(3);

/// Empty in the classic puzzle.
const FREE: u8 = 2;
const OTHER_FREE: u8 = 3;

struct Harness {
    mgr: RoomManager,
    clock: Arc<ManualClock>,
    registry: Arc<Registry>,
}

fn harness_with(match_config: MatchConfig) -> Harness {
    let clock = Arc::new(ManualClock::new(100));
    let registry = Arc::new(Registry::standard().unwrap());
    let mgr = RoomManager::new(RoomContext {
        registry: registry.clone(),
        clock: clock.clone(),
        match_config,
    });
    Harness {
        mgr,
        clock,
        registry,
    }
}

fn harness() -> Harness {
    harness_with(MatchConfig::default())
}

/// Creates a dummy player sender (receiver is dropped immediately).
fn dummy_sender() -> PlayerSender {
    mpsc::unbounded_channel().0
}

impl Harness {
    /// Everything queued for one player so far, decoded.
    fn drain(&self, rx: &mut mpsc::UnboundedReceiver<Bytes>) -> Vec<Payload> {
        let mut out = Vec::new();
        while let Ok(bytes) = rx.try_recv() {
            out.push(self.registry.decode(&bytes).unwrap());
        }
        out
    }

    /// A started head-to-head room with both inboxes emptied.
    async fn versus(
        &mut self,
    ) -> (
        RoomId,
        mpsc::UnboundedReceiver<Bytes>,
        mpsc::UnboundedReceiver<Bytes>,
    ) {
        let room = self.mgr.create_room(Mode::Match);
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        self.mgr.join_room(ALICE, room, tx_a).await.unwrap();
        self.mgr.join_room(BOB, room, tx_b).await.unwrap();
        self.drain(&mut rx_a);
        self.drain(&mut rx_b);
        (room, rx_a, rx_b)
    }

    /// Routes `payload` and waits until the room has handled it.
    async fn send(&self, room: RoomId, player: PlayerId, payload: Payload) {
        self.mgr.route(player, payload).await.unwrap();
        // The mailbox is FIFO: once this answers, the action was applied.
        self.mgr.get_room_info(room).await.unwrap();
    }
}

fn actions(payloads: &[Payload]) -> Vec<ActionId> {
    payloads.iter().map(Payload::action).collect()
}

fn set_cell(action: ActionId, action_id: u32, cell: u8, value: u8) -> Payload {
    Payload::new(action)
        .with(field::CLIENT_TIME, 0u32)
        .with(field::ACTION_ID, action_id)
        .with(field::CELL_INDEX, cell)
        .with(field::VALUE, value)
}

fn forfeit(player: PlayerId) -> Payload {
    Payload::new(lifecycle::FORFEIT)
        .with(field::TIME, 0u32)
        .with(field::PLAYER_ID, player.0)
}

fn room_code(s: &str) -> RoomId {
    s.parse().unwrap()
}

// =========================================================================
// RoomManager bookkeeping
// =========================================================================

#[tokio::test]
async fn test_create_room_returns_unique_codes() {
    let mut h = harness();
    let r1 = h.mgr.create_room(Mode::Match);
    let r2 = h.mgr.create_room(Mode::Match);
    assert_ne!(r1, r2);
    assert_eq!(h.mgr.room_count(), 2);

    for id in h.mgr.room_ids() {
        assert_eq!(id.as_str().len(), RoomId::LEN);
        assert!(id.as_str().bytes().all(|b| RoomId::ALPHABET.contains(&b)));
    }
}

#[tokio::test]
async fn test_join_room_success() {
    let mut h = harness();
    let room = h.mgr.create_room(Mode::Match);

    h.mgr.join_room(ALICE, room, dummy_sender()).await.unwrap();

    assert_eq!(h.mgr.player_room(ALICE), Some(room));
    let info = h.mgr.get_room_info(room).await.unwrap();
    assert_eq!(info.players, vec![ALICE]);
    assert_eq!(info.player_count(), 1);
    assert_eq!(info.max_players, 2);
    assert_eq!(info.mode, Mode::Match);
    assert_eq!(info.state, RoomState::WaitingForPlayers);
}

#[tokio::test]
async fn test_join_room_not_found() {
    let mut h = harness();
    let result = h
        .mgr
        .join_room(ALICE, room_code("ZZZZZ"), dummy_sender())
        .await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

#[tokio::test]
async fn test_join_room_one_room_at_a_time() {
    let mut h = harness();
    let r1 = h.mgr.create_room(Mode::Match);
    let r2 = h.mgr.create_room(Mode::Match);

    h.mgr.join_room(ALICE, r1, dummy_sender()).await.unwrap();
    let result = h.mgr.join_room(ALICE, r2, dummy_sender()).await;
    assert!(matches!(result, Err(RoomError::AlreadyInRoom(ALICE, r)) if r == r1));
}

#[tokio::test]
async fn test_cannot_join_after_match_started() {
    let mut h = harness();
    let (room, _rx_a, _rx_b) = h.versus().await;

    let result = h.mgr.join_room(CAROL, room, dummy_sender()).await;
    assert!(matches!(result, Err(RoomError::InvalidState(_))));
    assert_eq!(h.mgr.player_room(CAROL), None);
}

#[tokio::test]
async fn test_leave_room_not_in_any_room() {
    let mut h = harness();
    let result = h.mgr.leave_room(ALICE).await;
    assert!(matches!(result, Err(RoomError::NoRoom(ALICE))));
    assert_eq!(result.unwrap_err().code(), 404);
}

#[tokio::test]
async fn test_route_without_room() {
    let h = harness();
    let result = h.mgr.route(ALICE, forfeit(ALICE)).await;
    assert!(matches!(result, Err(RoomError::NoRoom(ALICE))));
}

#[tokio::test]
async fn test_destroy_room() {
    let mut h = harness();
    let room = h.mgr.create_room(Mode::Match);
    h.mgr.join_room(ALICE, room, dummy_sender()).await.unwrap();

    h.mgr.destroy_room(room).await.unwrap();

    assert_eq!(h.mgr.room_count(), 0);
    assert_eq!(h.mgr.player_room(ALICE), None);
    assert!(matches!(
        h.mgr.destroy_room(room).await,
        Err(RoomError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_sweep_drops_every_empty_room_and_keeps_occupied_ones() {
    let mut h = harness();
    let hosted = h.mgr.create_room(Mode::Match);
    h.mgr.join_room(CAROL, hosted, dummy_sender()).await.unwrap();
    let never_joined = h.mgr.create_room(Mode::Match);
    let (played, _rx_a, _rx_b) = h.versus().await;

    h.mgr.leave_room(ALICE).await.unwrap();
    h.mgr.leave_room(BOB).await.unwrap();

    let mut destroyed = h.mgr.sweep().await;
    destroyed.sort();
    let mut expected = vec![never_joined, played];
    expected.sort();
    assert_eq!(destroyed, expected);
    assert_eq!(h.mgr.room_ids(), vec![hosted]);
}

#[tokio::test]
async fn test_sweep_drops_waiting_room_its_host_left() {
    let mut h = harness();
    let room = h.mgr.create_room(Mode::Match);
    h.mgr.join_room(ALICE, room, dummy_sender()).await.unwrap();
    h.mgr.leave_room(ALICE).await.unwrap();

    let info = h.mgr.get_room_info(room).await.unwrap();
    assert_eq!(info.state, RoomState::WaitingForPlayers);
    assert!(info.players.is_empty());

    assert_eq!(h.mgr.sweep().await, vec![room]);
    assert_eq!(h.mgr.room_count(), 0);
}

// =========================================================================
// Lifecycle broadcasts
// =========================================================================

#[tokio::test]
async fn test_second_join_starts_match() {
    let mut h = harness();
    let room = h.mgr.create_room(Mode::Match);
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();

    h.mgr.join_room(ALICE, room, tx_a).await.unwrap();
    h.mgr.join_room(BOB, room, tx_b).await.unwrap();

    let to_alice = h.drain(&mut rx_a);
    assert_eq!(
        actions(&to_alice),
        [lobby::ROOM_JOINED, lobby::ROOM_JOINED, lifecycle::MATCH_STARTED]
    );
    assert_eq!(to_alice[0].u32(field::PLAYER_ID).unwrap(), ALICE.0);
    assert_eq!(to_alice[1].u32(field::PLAYER_ID).unwrap(), BOB.0);
    assert_eq!(to_alice[1].str(field::ROOM_ID).unwrap(), room.as_str());

    let started = &to_alice[2];
    assert_eq!(started.u8(field::PLAYER_COUNT).unwrap(), 2);
    assert_eq!(started.u32(field::SERVER_TIME).unwrap(), 100);
    assert_eq!(started.u32(field::SEED).unwrap(), 0);

    assert_eq!(
        actions(&h.drain(&mut rx_b)),
        [lobby::ROOM_JOINED, lifecycle::MATCH_STARTED]
    );
    assert_eq!(
        h.mgr.get_room_info(room).await.unwrap().state,
        RoomState::InProgress
    );
}

#[tokio::test]
async fn test_practice_room_starts_alone() {
    let mut h = harness();
    let room = h.mgr.create_room(Mode::Practice);
    let (tx, mut rx) = mpsc::unbounded_channel();

    h.mgr.join_room(ALICE, room, tx).await.unwrap();

    assert_eq!(
        actions(&h.drain(&mut rx)),
        [lobby::ROOM_JOINED, lifecycle::MATCH_STARTED]
    );
    let info = h.mgr.get_room_info(room).await.unwrap();
    assert_eq!(info.max_players, 1);
    assert_eq!(info.state, RoomState::InProgress);
}

#[tokio::test]
async fn test_leaving_mid_match_forfeits() {
    let mut h = harness();
    let (room, mut rx_a, mut rx_b) = h.versus().await;

    h.mgr.leave_room(ALICE).await.unwrap();

    // The leaver gets the confirmation but not the result.
    assert_eq!(actions(&h.drain(&mut rx_a)), [lobby::ROOM_LEFT]);

    let to_bob = h.drain(&mut rx_b);
    assert_eq!(actions(&to_bob), [lobby::ROOM_LEFT, lifecycle::MATCH_ENDED]);
    assert_eq!(to_bob[1].u32(field::WINNER_ID).unwrap(), BOB.0);

    let info = h.mgr.get_room_info(room).await.unwrap();
    assert_eq!(info.state, RoomState::Finished);
    assert_eq!(info.winner, Some(BOB));
    assert_eq!(info.players, vec![BOB]);
}

#[tokio::test]
async fn test_leaving_before_start_just_leaves() {
    let mut h = harness();
    let room = h.mgr.create_room(Mode::Match);
    let (tx, mut rx) = mpsc::unbounded_channel();
    h.mgr.join_room(ALICE, room, tx).await.unwrap();

    assert_eq!(h.mgr.leave_room(ALICE).await.unwrap(), room);

    assert_eq!(
        actions(&h.drain(&mut rx)),
        [lobby::ROOM_JOINED, lobby::ROOM_LEFT]
    );
    let info = h.mgr.get_room_info(room).await.unwrap();
    assert_eq!(info.state, RoomState::WaitingForPlayers);
    assert!(info.players.is_empty());
}

#[tokio::test]
async fn test_forfeit_packet_ends_match() {
    let mut h = harness();
    let (room, mut rx_a, mut rx_b) = h.versus().await;

    h.send(room, BOB, forfeit(BOB)).await;

    for rx in [&mut rx_a, &mut rx_b] {
        let got = h.drain(rx);
        assert_eq!(actions(&got), [lifecycle::MATCH_ENDED]);
        assert_eq!(got[0].u32(field::WINNER_ID).unwrap(), ALICE.0);
    }
    assert_eq!(
        h.mgr.get_room_info(room).await.unwrap().state,
        RoomState::Finished
    );
}

#[tokio::test]
async fn test_forfeit_on_behalf_of_someone_else_is_ignored() {
    let mut h = harness();
    let (room, mut rx_a, _rx_b) = h.versus().await;

    h.send(room, BOB, forfeit(ALICE)).await;

    assert!(h.drain(&mut rx_a).is_empty());
    assert_eq!(
        h.mgr.get_room_info(room).await.unwrap().state,
        RoomState::InProgress
    );
}

#[tokio::test]
async fn test_solving_board_ends_match() {
    let mut h = harness_with(MatchConfig {
        puzzle: Puzzle::parse("122.", Some("1221")).unwrap(),
        ..MatchConfig::default()
    });
    let (room, mut rx_a, _rx_b) = h.versus().await;

    h.send(room, BOB, set_cell(mechanics::SET_CELL, 1, 3, 1)).await;

    let got = h.drain(&mut rx_a);
    assert_eq!(actions(&got), [mechanics::CELL_SET, lifecycle::MATCH_ENDED]);
    assert_eq!(got[1].u32(field::WINNER_ID).unwrap(), BOB.0);
    assert_eq!(h.mgr.get_room_info(room).await.unwrap().winner, Some(BOB));
}

// =========================================================================
// Match actions
// =========================================================================

#[tokio::test]
async fn test_set_cell_is_broadcast_to_everyone() {
    let mut h = harness();
    let (room, mut rx_a, mut rx_b) = h.versus().await;
    h.clock.set(1_000);

    h.send(room, ALICE, set_cell(mechanics::SET_CELL, 7, FREE, 4)).await;

    for rx in [&mut rx_a, &mut rx_b] {
        let got = h.drain(rx);
        assert_eq!(actions(&got), [mechanics::CELL_SET]);
        let ack = &got[0];
        assert_eq!(ack.u32(field::SERVER_TIME).unwrap(), 1_000);
        assert_eq!(ack.u32(field::PLAYER_ID).unwrap(), ALICE.0);
        assert_eq!(ack.u32(field::ACTION_ID).unwrap(), 7);
        assert_eq!(ack.u8(field::CELL_INDEX).unwrap(), FREE);
        assert_eq!(ack.u8(field::VALUE).unwrap(), 4);
    }

    let board = h.mgr.board(ALICE).await.unwrap().unwrap();
    assert_eq!(board.cell(usize::from(FREE)).unwrap().value(), 4);
    let other = h.mgr.board(BOB).await.unwrap().unwrap();
    assert!(other.cell(usize::from(FREE)).unwrap().is_empty());
}

#[tokio::test]
async fn test_rejections_go_to_sender_only() {
    let mut h = harness();
    let (room, mut rx_a, mut rx_b) = h.versus().await;

    h.send(room, ALICE, set_cell(mechanics::SET_CELL, 1, FREE, 4)).await;
    h.drain(&mut rx_a);
    h.drain(&mut rx_b);

    // Same cell: cell cooldown.
    h.clock.advance(1_000);
    h.send(room, ALICE, set_cell(mechanics::SET_CELL, 2, FREE, 5)).await;
    let got = h.drain(&mut rx_a);
    assert_eq!(actions(&got), [protocol::ACTION_REJECTED]);
    assert_eq!(got[0].u32(field::ACTION_ID).unwrap(), 2);
    assert_eq!(got[0].u8(field::REASON).unwrap(), 4);
    assert!(h.drain(&mut rx_b).is_empty());

    // Another cell: global cooldown.
    h.send(room, ALICE, set_cell(mechanics::SET_CELL, 3, OTHER_FREE, 5)).await;
    let got = h.drain(&mut rx_a);
    assert_eq!(got[0].u8(field::REASON).unwrap(), 5);

    // Past the global window the other cell is fine.
    h.clock.advance(4_000);
    h.send(room, ALICE, set_cell(mechanics::SET_CELL, 4, OTHER_FREE, 5)).await;
    assert_eq!(actions(&h.drain(&mut rx_b)), [mechanics::CELL_SET]);
}

#[tokio::test]
async fn test_action_before_start_is_rejected() {
    let mut h = harness();
    let room = h.mgr.create_room(Mode::Match);
    let (tx, mut rx) = mpsc::unbounded_channel();
    h.mgr.join_room(ALICE, room, tx).await.unwrap();
    h.drain(&mut rx);

    h.send(room, ALICE, set_cell(mechanics::SET_CELL, 9, FREE, 4)).await;

    let got = h.drain(&mut rx);
    assert_eq!(actions(&got), [protocol::ACTION_REJECTED]);
    assert_eq!(got[0].u8(field::REASON).unwrap(), 18);
    assert!(h.mgr.board(ALICE).await.unwrap().is_none());
}

#[tokio::test]
async fn test_legacy_action_needs_practice_room() {
    let mut h = harness();
    let (room, mut rx_a, _rx_b) = h.versus().await;

    h.send(room, ALICE, set_cell(legacy::SET_CELL, 1, FREE, 4)).await;
    let got = h.drain(&mut rx_a);
    assert_eq!(actions(&got), [protocol::ACTION_REJECTED]);
    assert_eq!(got[0].u8(field::REASON).unwrap(), 13);

    let practice = h.mgr.create_room(Mode::Practice);
    let (tx, mut rx) = mpsc::unbounded_channel();
    h.mgr.join_room(CAROL, practice, tx).await.unwrap();
    h.drain(&mut rx);
    h.send(practice, CAROL, set_cell(legacy::SET_CELL, 1, FREE, 4)).await;
    assert_eq!(actions(&h.drain(&mut rx)), [legacy::CELL_SET]);
}

#[tokio::test]
async fn test_draw_reports_the_power_up() {
    let mut h = harness();
    let (room, mut rx_a, _rx_b) = h.versus().await;

    let draw = Payload::new(mechanics::DRAW_PUP)
        .with(field::CLIENT_TIME, 0u32)
        .with(field::ACTION_ID, 5u32)
        .with(field::SLOT_INDEX, 0u8);
    h.send(room, ALICE, draw).await;

    let got = h.drain(&mut rx_a);
    assert_eq!(actions(&got), [mechanics::PUP_DRAWN]);
    let drawn = &got[0];
    assert_eq!(drawn.u8(field::SLOT_INDEX).unwrap(), 0);
    assert_eq!(drawn.u8(field::PUP_ID).unwrap(), 1);
    assert!((1..=3).contains(&drawn.u8(field::ELEMENT).unwrap()));
    assert!((1..=3).contains(&drawn.u8(field::LEVEL).unwrap()));
}

#[tokio::test]
async fn test_sync_time_answers_sender_only() {
    let mut h = harness();
    let (room, mut rx_a, mut rx_b) = h.versus().await;
    h.clock.set(42_000);

    let sync = Payload::new(protocol::SYNC_TIME).with(field::CLIENT_TIME, 7u32);
    h.send(room, BOB, sync).await;

    let got = h.drain(&mut rx_b);
    assert_eq!(actions(&got), [protocol::TIME_SYNCED]);
    assert_eq!(got[0].u32(field::CLIENT_TIME).unwrap(), 7);
    assert_eq!(got[0].u32(field::SERVER_TIME).unwrap(), 42_000);
    assert!(h.drain(&mut rx_a).is_empty());
}

#[tokio::test]
async fn test_actions_after_finish_are_rejected() {
    let mut h = harness();
    let (room, mut rx_a, _rx_b) = h.versus().await;
    h.send(room, BOB, forfeit(BOB)).await;
    h.drain(&mut rx_a);

    h.send(room, ALICE, set_cell(mechanics::SET_CELL, 1, FREE, 4)).await;
    let got = h.drain(&mut rx_a);
    assert_eq!(actions(&got), [protocol::ACTION_REJECTED]);
    assert_eq!(got[0].u8(field::REASON).unwrap(), 15);
}
