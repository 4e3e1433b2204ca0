//! Peer-hosted authority: one player's process runs the only room
//!
//! The first link is the host and gets the room. Everyone who links later
//! receives `INIT` with their id and the map size, then joins the lobby with
//! `JOIN_ROOM` or a named `INPUT`. There is no registry process in between,
//! so creating further rooms is refused.

use crate::directory::ConnectionDirectory;
use crate::dispatcher::{self, TickSummary};
use crate::error::AuthorityError;
use crate::registry::RoomRegistry;
use crate::topology::Topology;
use log::{info, warn};
use shared::{ClientMessage, GameConfig, InputState, PlayerId, RoomId, ServerMessage};
use std::net::SocketAddr;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;

pub struct PeerHost {
    rooms: RoomRegistry,
    directory: ConnectionDirectory,
    host_name: String,
    host: Option<PlayerId>,
    room_id: Option<RoomId>,
}

impl PeerHost {
    pub fn new(host_name: &str, config: GameConfig, max_connections: usize) -> Self {
        Self {
            rooms: RoomRegistry::new(config),
            directory: ConnectionDirectory::new(max_connections),
            host_name: host_name.to_string(),
            host: None,
            room_id: None,
        }
    }

    pub fn host(&self) -> Option<PlayerId> {
        self.host
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    fn open_room(&mut self, host: PlayerId) {
        match dispatcher::create_room(
            &mut self.rooms,
            &mut self.directory,
            host,
            None,
            &self.host_name,
        ) {
            Ok(room_id) => {
                info!("Hosting room {} as player {}", room_id, host);
                self.room_id = Some(room_id);
            }
            Err(e) => warn!("Could not open hosted room: {}", e),
        }
    }

    fn join(&mut self, player: PlayerId, name: &str) -> Result<(), AuthorityError> {
        let room_id = self
            .room_id
            .clone()
            .ok_or_else(|| AuthorityError::RoomNotFound(String::new()))?;
        dispatcher::join_room(&mut self.rooms, &mut self.directory, player, &room_id, name)
    }

    fn in_room(&self, player: PlayerId) -> bool {
        self.directory.room_of(player).is_some()
    }
}

impl Topology for PeerHost {
    fn link(
        &mut self,
        addr: Option<SocketAddr>,
        sender: UnboundedSender<ServerMessage>,
    ) -> Option<PlayerId> {
        let id = self.directory.add_connection(addr, sender)?;
        let map_size = self.rooms.config().map_size;
        self.directory.send(
            id,
            ServerMessage::Init {
                player_id: id,
                map_size,
            },
        );

        if self.host.is_none() {
            self.host = Some(id);
            self.open_room(id);
        }

        Some(id)
    }

    fn receive(&mut self, player: PlayerId, message: ClientMessage) {
        let result = match message {
            ClientMessage::CreateRoom { .. } => Err(AuthorityError::HostedRoomOnly),
            ClientMessage::JoinRoom { player_name, .. } => self.join(player, &player_name),
            ClientMessage::StartGame => {
                dispatcher::start_game(&mut self.rooms, &mut self.directory, player)
            }
            ClientMessage::Input {
                angle,
                is_boosting,
                name,
            } => {
                let joined = match name {
                    Some(name) if !self.in_room(player) => self.join(player, &name),
                    Some(name) => {
                        dispatcher::rename_player(&mut self.rooms, &self.directory, player, &name);
                        Ok(())
                    }
                    None => Ok(()),
                };
                dispatcher::apply_input(
                    &mut self.rooms,
                    &self.directory,
                    player,
                    InputState {
                        angle,
                        boosting: is_boosting,
                    },
                );
                joined
            }
        };

        if let Err(error) = result {
            dispatcher::report_error(&self.directory, player, &error);
        }
    }

    fn close(&mut self, player: PlayerId) {
        dispatcher::disconnect(&mut self.rooms, &mut self.directory, player);
    }

    fn tick(&mut self, now: Instant) -> TickSummary {
        dispatcher::tick_rooms(&mut self.rooms, &mut self.directory, now)
    }
}

impl Default for PeerHost {
    fn default() -> Self {
        Self::new(
            dispatcher::DEFAULT_HOST_NAME,
            GameConfig::peer_hosted(),
            16,
        )
    }
}
