//! Authority arrangements behind the transport
//!
//! The event loop in [`crate::network`] only knows the [`Topology`] trait.
//! [`DedicatedServer`] runs any number of rooms for remote clients; the peer
//! host in [`crate::peer`] runs a single room owned by the hosting player.

use crate::directory::ConnectionDirectory;
use crate::dispatcher::{self, TickSummary};
use crate::registry::RoomRegistry;
use shared::{ClientMessage, GameConfig, PlayerId, ServerMessage};
use std::net::SocketAddr;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;

/// What the event loop needs from an authority.
pub trait Topology: Send {
    /// Accepts a new link. `None` refuses it.
    fn link(
        &mut self,
        addr: Option<SocketAddr>,
        sender: UnboundedSender<ServerMessage>,
    ) -> Option<PlayerId>;

    fn receive(&mut self, player: PlayerId, message: ClientMessage);

    fn close(&mut self, player: PlayerId);

    fn tick(&mut self, now: Instant) -> TickSummary;
}

/// Stand-alone authority process hosting many rooms.
pub struct DedicatedServer {
    rooms: RoomRegistry,
    directory: ConnectionDirectory,
}

impl DedicatedServer {
    pub fn new(config: GameConfig, max_connections: usize) -> Self {
        Self {
            rooms: RoomRegistry::new(config),
            directory: ConnectionDirectory::new(max_connections),
        }
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    pub fn directory(&self) -> &ConnectionDirectory {
        &self.directory
    }
}

impl Topology for DedicatedServer {
    fn link(
        &mut self,
        addr: Option<SocketAddr>,
        sender: UnboundedSender<ServerMessage>,
    ) -> Option<PlayerId> {
        self.directory.add_connection(addr, sender)
    }

    fn receive(&mut self, player: PlayerId, message: ClientMessage) {
        dispatcher::handle_message(&mut self.rooms, &mut self.directory, player, message);
    }

    fn close(&mut self, player: PlayerId) {
        dispatcher::disconnect(&mut self.rooms, &mut self.directory, player);
    }

    fn tick(&mut self, now: Instant) -> TickSummary {
        dispatcher::tick_rooms(&mut self.rooms, &mut self.directory, now)
    }
}
