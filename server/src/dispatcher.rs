//! Message handling and the per-tick room driver
//!
//! Free functions over the two owned collections, the [`RoomRegistry`] and
//! the [`ConnectionDirectory`]. Both topologies route through here, so room
//! rules and simulation are written once.

use crate::directory::ConnectionDirectory;
use crate::error::AuthorityError;
use crate::registry::RoomRegistry;
use crate::room::Room;
use log::{debug, info, warn};
use shared::{sanitize_name, ClientMessage, InputState, PlayerId, RoomId, ServerMessage};
use std::time::Instant;

pub const DEFAULT_HOST_NAME: &str = "Host";
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// Totals of one tick over all rooms, for periodic logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub rooms: usize,
    pub active_rooms: usize,
    pub snakes: usize,
    pub deaths: usize,
    pub snapshots: usize,
}

/// Routes one decoded client message and reports failures to the sender.
pub fn handle_message(
    rooms: &mut RoomRegistry,
    directory: &mut ConnectionDirectory,
    player: PlayerId,
    message: ClientMessage,
) {
    let result = match message {
        ClientMessage::CreateRoom {
            room_id,
            player_name,
        } => create_room(rooms, directory, player, room_id, &player_name).map(|_| ()),
        ClientMessage::JoinRoom {
            room_id,
            player_name,
        } => join_room(rooms, directory, player, &room_id, &player_name),
        ClientMessage::StartGame => start_game(rooms, directory, player),
        ClientMessage::Input {
            angle, is_boosting, ..
        } => {
            apply_input(
                rooms,
                directory,
                player,
                InputState {
                    angle,
                    boosting: is_boosting,
                },
            );
            Ok(())
        }
    };

    if let Err(error) = result {
        report_error(directory, player, &error);
    }
}

/// Sends `ERROR` for errors the requester should see; logs the rest.
pub fn report_error(directory: &ConnectionDirectory, player: PlayerId, error: &AuthorityError) {
    if error.is_reported() {
        debug!("Rejected request from player {}: {}", player, error);
        directory.send(player, ServerMessage::error(error.to_string()));
    } else {
        warn!("Ignored request from player {}: {}", player, error);
    }
}

fn send_lobby_update(directory: &ConnectionDirectory, room: &Room) {
    let update = ServerMessage::LobbyUpdate {
        players: room.lobby_roster(),
    };
    directory.broadcast(&room.member_ids(), &update);
}

/// Opens a room hosted by `player` and returns its id.
///
/// A player already in a room leaves it first.
pub fn create_room(
    rooms: &mut RoomRegistry,
    directory: &mut ConnectionDirectory,
    player: PlayerId,
    requested: Option<RoomId>,
    player_name: &str,
) -> Result<RoomId, AuthorityError> {
    if let Some(id) = requested.as_deref() {
        if rooms.contains(id.trim()) {
            return Err(AuthorityError::RoomExists(id.to_string()));
        }
    }

    leave_room(rooms, directory, player);

    let name = sanitize_name(player_name, DEFAULT_HOST_NAME);
    let room = rooms.create(requested, player, &name)?;
    let room_id = room.id().to_string();

    directory.assign_room(player, Some(room_id.clone()));
    directory.send(
        player,
        ServerMessage::RoomCreated {
            room_id: room_id.clone(),
            player_id: player,
        },
    );
    send_lobby_update(directory, room);

    Ok(room_id)
}

/// Adds `player` to a lobby. Fails if the room is unknown or already running,
/// in which case the player stays where it was.
pub fn join_room(
    rooms: &mut RoomRegistry,
    directory: &mut ConnectionDirectory,
    player: PlayerId,
    room_id: &str,
    player_name: &str,
) -> Result<(), AuthorityError> {
    let room_id = room_id.trim();
    match rooms.get(room_id) {
        None => return Err(AuthorityError::RoomNotFound(room_id.to_string())),
        Some(room) if room.is_active() => {
            return Err(AuthorityError::AlreadyStarted(room_id.to_string()))
        }
        Some(_) => {}
    }

    if directory.room_of(player).map(String::as_str) != Some(room_id) {
        leave_room(rooms, directory, player);
    }

    let name = sanitize_name(player_name, DEFAULT_PLAYER_NAME);
    let room = rooms.require_mut(room_id)?;
    room.add_player(player, &name)?;

    directory.assign_room(player, Some(room_id.to_string()));
    directory.send(
        player,
        ServerMessage::RoomJoined {
            room_id: room_id.to_string(),
            player_id: player,
        },
    );
    send_lobby_update(directory, room);

    Ok(())
}

/// Starts the requester's room. Only its host may do this.
pub fn start_game(
    rooms: &mut RoomRegistry,
    directory: &mut ConnectionDirectory,
    player: PlayerId,
) -> Result<(), AuthorityError> {
    let room_id = directory
        .room_of(player)
        .cloned()
        .ok_or(AuthorityError::NotInRoom(player))?;
    let room = rooms.require_mut(&room_id)?;

    if room.is_active() {
        debug!("Room {} is already running", room_id);
        return Ok(());
    }

    room.start(player)?;
    directory.broadcast(&room.member_ids(), &ServerMessage::GameStart);
    Ok(())
}

/// Stores the latest input of `player`. Input from outside a room is dropped.
pub fn apply_input(
    rooms: &mut RoomRegistry,
    directory: &ConnectionDirectory,
    player: PlayerId,
    input: InputState,
) -> bool {
    directory
        .room_of(player)
        .and_then(|id| rooms.get_mut(id))
        .is_some_and(|room| room.set_input(player, input))
}

/// Renames `player` in its lobby and shares the new roster. Running matches
/// keep their names.
pub fn rename_player(
    rooms: &mut RoomRegistry,
    directory: &ConnectionDirectory,
    player: PlayerId,
    player_name: &str,
) -> bool {
    let name = sanitize_name(player_name, DEFAULT_PLAYER_NAME);
    let Some(room) = directory.room_of(player).and_then(|id| rooms.get_mut(id)) else {
        return false;
    };
    if !room.rename_player(player, &name) {
        return false;
    }

    debug!("Player {} is now {}", player, name);
    send_lobby_update(directory, room);
    true
}

/// Takes `player` out of its room. An emptied room is destroyed; a lobby
/// gets the new roster.
pub fn leave_room(rooms: &mut RoomRegistry, directory: &mut ConnectionDirectory, player: PlayerId) {
    let Some(room_id) = directory.room_of(player).cloned() else {
        return;
    };
    directory.assign_room(player, None);

    if let Some(room) = rooms.get_mut(&room_id) {
        room.remove_player(player);
        if !room.is_empty() && !room.is_active() {
            send_lobby_update(directory, room);
        }
    }
    rooms.remove_if_empty(&room_id);
}

/// Handles a closed transport link.
pub fn disconnect(rooms: &mut RoomRegistry, directory: &mut ConnectionDirectory, player: PlayerId) {
    leave_room(rooms, directory, player);
    directory.remove_connection(player);
}

/// Runs one tick of every room.
///
/// Members whose link is gone are pruned first. Active rooms then advance;
/// dead players get `PLAYER_DIED` before the room's snapshot goes out to all
/// members. Rooms left empty are destroyed.
pub fn tick_rooms(
    rooms: &mut RoomRegistry,
    directory: &mut ConnectionDirectory,
    now: Instant,
) -> TickSummary {
    let mut summary = TickSummary {
        rooms: rooms.len(),
        ..TickSummary::default()
    };
    let mut pruned = Vec::new();

    for room in rooms.rooms_mut() {
        let gone = room.retain_players(|id| directory.is_connected(id));
        if !gone.is_empty() {
            info!("Pruned {} stale players from room {}", gone.len(), room.id());
            if !room.is_active() && !room.is_empty() {
                send_lobby_update(directory, room);
            }
            pruned.extend(gone);
        }

        if !room.is_active() {
            continue;
        }

        let report = room.tick(now);
        summary.active_rooms += 1;
        summary.snakes += room.snake_count();
        summary.deaths += report.deaths.len();

        for death in &report.deaths {
            directory.send(
                death.player_id,
                ServerMessage::PlayerDied {
                    score: Some(death.score),
                    kills: Some(death.kills),
                    killed_by: death.killed_by(),
                },
            );
        }

        if let Some(snapshot) = report.snapshot {
            summary.snapshots += 1;
            directory.broadcast(&room.member_ids(), &ServerMessage::State(snapshot));
        }
    }

    for id in pruned {
        directory.remove_connection(id);
    }
    for id in rooms.ids() {
        rooms.remove_if_empty(&id);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::GameConfig;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn setup() -> (RoomRegistry, ConnectionDirectory) {
        let config = GameConfig {
            food_target: 20,
            seed: Some(5),
            ..GameConfig::default()
        };
        (RoomRegistry::new(config), ConnectionDirectory::new(8))
    }

    fn connect(directory: &mut ConnectionDirectory) -> (PlayerId, UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (directory.add_connection(None, tx).unwrap(), rx)
    }

    fn drain(rx: &mut UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = rx.try_recv() {
            messages.push(message);
        }
        messages
    }

    fn create(rooms: &mut RoomRegistry, directory: &mut ConnectionDirectory, player: PlayerId) -> RoomId {
        create_room(rooms, directory, player, None, "alice").unwrap()
    }

    #[test]
    fn test_create_room_replies() {
        let (mut rooms, mut directory) = setup();
        let (a, mut rx) = connect(&mut directory);

        let room_id = create(&mut rooms, &mut directory, a);

        let messages = drain(&mut rx);
        assert_eq!(
            messages[0],
            ServerMessage::RoomCreated {
                room_id: room_id.clone(),
                player_id: a
            }
        );
        match &messages[1] {
            ServerMessage::LobbyUpdate { players } => {
                assert_eq!(players.len(), 1);
                assert!(players[0].is_host);
                assert_eq!(players[0].name, "alice");
            }
            other => panic!("Unexpected message: {:?}", other),
        }
        assert_eq!(directory.room_of(a), Some(&room_id));
    }

    #[test]
    fn test_join_updates_every_member() {
        let (mut rooms, mut directory) = setup();
        let (a, mut rx_a) = connect(&mut directory);
        let (b, mut rx_b) = connect(&mut directory);
        let room_id = create(&mut rooms, &mut directory, a);
        drain(&mut rx_a);

        join_room(&mut rooms, &mut directory, b, &room_id, "  ").unwrap();

        let to_b = drain(&mut rx_b);
        assert!(matches!(&to_b[0], ServerMessage::RoomJoined { player_id, .. } if *player_id == b));
        let to_a = drain(&mut rx_a);
        match &to_a[0] {
            ServerMessage::LobbyUpdate { players } => {
                assert_eq!(players.len(), 2);
                assert_eq!(players[1].name, DEFAULT_PLAYER_NAME);
            }
            other => panic!("Unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_join_unknown_room_reports_error() {
        let (mut rooms, mut directory) = setup();
        let (a, mut rx) = connect(&mut directory);

        handle_message(
            &mut rooms,
            &mut directory,
            a,
            ClientMessage::JoinRoom {
                room_id: "missing".to_string(),
                player_name: "bob".to_string(),
            },
        );

        assert_eq!(drain(&mut rx), vec![ServerMessage::error("Room not found")]);
        assert!(directory.room_of(a).is_none());
    }

    #[test]
    fn test_join_after_start_is_rejected() {
        let (mut rooms, mut directory) = setup();
        let (a, _rx_a) = connect(&mut directory);
        let (b, mut rx_b) = connect(&mut directory);
        let room_id = create(&mut rooms, &mut directory, a);
        start_game(&mut rooms, &mut directory, a).unwrap();

        handle_message(
            &mut rooms,
            &mut directory,
            b,
            ClientMessage::JoinRoom {
                room_id: room_id.clone(),
                player_name: "late".to_string(),
            },
        );

        assert_eq!(
            drain(&mut rx_b),
            vec![ServerMessage::error("Game already in progress")]
        );
        let room = rooms.get(&room_id).unwrap();
        assert!(!room.contains(b));
        assert!(room.snake(b).is_none());
    }

    #[test]
    fn test_non_host_start_is_silent() {
        let (mut rooms, mut directory) = setup();
        let (a, _rx_a) = connect(&mut directory);
        let (b, mut rx_b) = connect(&mut directory);
        let room_id = create(&mut rooms, &mut directory, a);
        join_room(&mut rooms, &mut directory, b, &room_id, "bob").unwrap();
        drain(&mut rx_b);

        handle_message(&mut rooms, &mut directory, b, ClientMessage::StartGame);

        assert!(drain(&mut rx_b).is_empty());
        assert!(!rooms.get(&room_id).unwrap().is_active());
    }

    #[test]
    fn test_duplicate_room_id() {
        let (mut rooms, mut directory) = setup();
        let (a, _rx_a) = connect(&mut directory);
        let (b, mut rx_b) = connect(&mut directory);
        create_room(&mut rooms, &mut directory, a, Some("den".to_string()), "a").unwrap();

        handle_message(
            &mut rooms,
            &mut directory,
            b,
            ClientMessage::CreateRoom {
                room_id: Some("den".to_string()),
                player_name: "b".to_string(),
            },
        );

        assert_eq!(drain(&mut rx_b), vec![ServerMessage::error("Room already exists")]);
        assert_eq!(rooms.get("den").unwrap().host_id(), a);
    }

    #[test]
    fn test_creating_again_leaves_previous_room() {
        let (mut rooms, mut directory) = setup();
        let (a, _rx) = connect(&mut directory);
        let first = create(&mut rooms, &mut directory, a);
        let second = create(&mut rooms, &mut directory, a);

        assert_ne!(first, second);
        assert!(!rooms.contains(&first));
        assert_eq!(directory.room_of(a), Some(&second));
    }

    #[test]
    fn test_last_leave_destroys_room() {
        let (mut rooms, mut directory) = setup();
        let (a, _rx_a) = connect(&mut directory);
        let (b, mut rx_b) = connect(&mut directory);
        let room_id = create(&mut rooms, &mut directory, a);
        join_room(&mut rooms, &mut directory, b, &room_id, "bob").unwrap();
        drain(&mut rx_b);

        disconnect(&mut rooms, &mut directory, a);
        assert!(rooms.contains(&room_id));
        let roster = drain(&mut rx_b);
        assert!(matches!(&roster[0], ServerMessage::LobbyUpdate { players } if players.len() == 1));

        disconnect(&mut rooms, &mut directory, b);
        assert!(!rooms.contains(&room_id));
        assert!(rooms.get(&room_id).is_none());
        assert!(directory.is_empty());
    }

    #[test]
    fn test_input_outside_room_is_dropped() {
        let (mut rooms, mut directory) = setup();
        let (a, mut rx) = connect(&mut directory);

        handle_message(
            &mut rooms,
            &mut directory,
            a,
            ClientMessage::Input {
                angle: 1.0,
                is_boosting: true,
                name: None,
            },
        );
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_tick_prunes_closed_links() {
        let (mut rooms, mut directory) = setup();
        let (a, mut rx_a) = connect(&mut directory);
        let (b, rx_b) = connect(&mut directory);
        let room_id = create(&mut rooms, &mut directory, a);
        join_room(&mut rooms, &mut directory, b, &room_id, "bob").unwrap();
        start_game(&mut rooms, &mut directory, a).unwrap();
        drain(&mut rx_a);

        drop(rx_b);
        let summary = tick_rooms(&mut rooms, &mut directory, Instant::now());

        assert_eq!(summary.active_rooms, 1);
        assert!(!directory.contains(b));
        let room = rooms.get(&room_id).unwrap();
        assert!(!room.contains(b));
        assert!(room.snake(b).is_none());

        let messages = drain(&mut rx_a);
        match messages.last() {
            Some(ServerMessage::State(snapshot)) => assert_eq!(snapshot.snakes.len(), 1),
            other => panic!("Unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_tick_removes_abandoned_rooms() {
        let (mut rooms, mut directory) = setup();
        let (a, rx_a) = connect(&mut directory);
        let room_id = create(&mut rooms, &mut directory, a);

        drop(rx_a);
        tick_rooms(&mut rooms, &mut directory, Instant::now());

        assert!(!rooms.contains(&room_id));
    }
}
