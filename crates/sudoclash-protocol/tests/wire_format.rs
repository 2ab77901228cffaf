//! Wire-format tests against the standard registry.
//!
//! These pin exact byte layouts: a client written against them must keep
//! working as long as these tests pass.

use sudoclash_protocol::action::{cryo, lifecycle, lobby, mechanics, protocol, session};
use sudoclash_protocol::{ActionId, Payload, ProtocolError, Registry, RoomId, field};

fn registry() -> Registry {
    Registry::standard().unwrap()
}

fn use_cryo() -> Payload {
    Payload::new(cryo::USE_CRYO)
        .with(field::CLIENT_TIME, 1000u32)
        .with(field::ACTION_ID, 7u32)
        .with(field::PUP_ID, 2u8)
        .with(field::TARGET_ID, 1u32)
        .with(field::CELL_INDEX, 5u8)
}

// =========================================================================
// Round trips
// =========================================================================

#[test]
fn test_use_cryo_round_trip() {
    let registry = registry();
    let bytes = registry.encode(&use_cryo()).unwrap();
    assert_eq!(registry.decode(&bytes).unwrap(), use_cryo());
}

#[test]
fn test_use_cryo_byte_layout() {
    let bytes = registry().encode(&use_cryo()).unwrap();
    assert_eq!(
        bytes.as_ref(),
        &[
            96, // action
            0, 0, 0x03, 0xE8, // client_time
            0, 0, 0, 7, // action_id
            2, // pup_id
            0, 0, 0, 1, // target_id
            5, // cell_index
        ]
    );
}

#[test]
fn test_error_packet_carries_signed_code_and_string() {
    let registry = registry();
    let payload = Payload::new(session::ERROR)
        .with(field::CODE, 404i16)
        .with(field::MESSAGE, "room not found");
    let bytes = registry.encode(&payload).unwrap();

    assert_eq!(&bytes[..5], &[5, 0x01, 0x94, 0, 14]);
    assert_eq!(&bytes[5..], b"room not found");
    assert_eq!(registry.decode(&bytes).unwrap(), payload);
}

#[test]
fn test_room_id_travels_as_string() {
    let registry = registry();
    let room: RoomId = "K3V9Q".parse().unwrap();
    let payload = Payload::new(lobby::JOIN_ROOM).with(field::ROOM_ID, room.to_string());
    let decoded = registry.decode(&registry.encode(&payload).unwrap()).unwrap();
    assert_eq!(decoded.str(field::ROOM_ID).unwrap().parse::<RoomId>().unwrap(), room);
}

#[test]
fn test_forfeit_has_player_header() {
    let codec = registry().codec(lifecycle::FORFEIT).cloned().unwrap();
    let names: Vec<_> = codec.contract().fields().iter().map(|f| f.name).collect();
    assert_eq!(names, ["action", "time", "player_id"]);
}

#[test]
fn test_acknowledge_then_encode() {
    let registry = registry();
    let request = Payload::new(mechanics::SET_CELL)
        .with(field::CLIENT_TIME, 10u32)
        .with(field::ACTION_ID, 99u32)
        .with(field::CELL_INDEX, 80u8)
        .with(field::VALUE, 4u8);
    let ack = registry.acknowledge(&request, 123_456, 2).unwrap();
    let bytes = registry.encode(&ack).unwrap();

    assert_eq!(
        bytes.as_ref(),
        &[65, 0, 1, 0xE2, 0x40, 0, 0, 0, 2, 0, 0, 0, 99, 80, 4]
    );
}

// =========================================================================
// Dispatch failures
// =========================================================================

#[test]
fn test_unregistered_action_is_unknown() {
    assert_eq!(
        registry().decode(&[121, 0, 0, 0]).unwrap_err(),
        ProtocolError::UnknownAction(ActionId(121))
    );
}

#[test]
fn test_truncated_use_cryo_names_missing_field() {
    let registry = registry();
    let bytes = registry.encode(&use_cryo()).unwrap();
    assert_eq!(
        registry.decode(&bytes[..9]).unwrap_err(),
        ProtocolError::TruncatedPacket { field: "pup_id" }
    );
}

#[test]
fn test_trailing_bytes_rejected_by_dispatch() {
    let registry = registry();
    let mut bytes = registry.encode(&use_cryo()).unwrap().to_vec();
    bytes.extend_from_slice(&[0, 0]);
    assert!(matches!(
        registry.decode(&bytes),
        Err(ProtocolError::TrailingBytes { extra: 2, .. })
    ));
}

#[test]
fn test_out_of_range_value_fails_to_encode() {
    let payload = use_cryo().with(field::CELL_INDEX, 300u32);
    assert!(matches!(
        registry().encode(&payload),
        Err(ProtocolError::Encoding(_))
    ));
}

#[test]
fn test_invalid_utf8_string_is_malformed() {
    // JOIN_ROOM: action, u16 len = 2, then two bytes that are not UTF-8.
    let bytes = [18, 0, 2, 0xFF, 0xFE];
    assert!(matches!(
        registry().decode(&bytes),
        Err(ProtocolError::Malformed { field: "room_id", .. })
    ));
}

#[test]
fn test_sync_time_is_system_origin() {
    let registry = registry();
    let payload = Payload::new(protocol::SYNC_TIME).with(field::CLIENT_TIME, 5u32);
    assert_eq!(registry.encode(&payload).unwrap().as_ref(), &[48, 0, 0, 0, 5]);
}
