//! Connection directory: live transport endpoints and the rooms they joined
//!
//! This module tracks every linked client on the authority side:
//! - Connection lifecycle (link, close) and player id assignment
//! - The outbound channel of each connection
//! - Which room, if any, each player currently belongs to
//! - Capacity limits
//!
//! Player ids double as connection ids: one transport link is one player.

use log::{debug, info};
use shared::{PlayerId, RoomId, ServerMessage};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;

/// One linked client
#[derive(Debug)]
pub struct Connection {
    /// Player id assigned on link
    pub id: PlayerId,
    /// Remote address; `None` for in-process links
    pub addr: Option<SocketAddr>,
    pub connected_at: Instant,
    /// Room this player is a member of
    pub room: Option<RoomId>,
    /// Queue drained by the connection's writer task
    pub sender: UnboundedSender<ServerMessage>,
}

impl Connection {
    pub fn new(id: PlayerId, addr: Option<SocketAddr>, sender: UnboundedSender<ServerMessage>) -> Self {
        Self {
            id,
            addr,
            connected_at: Instant::now(),
            room: None,
            sender,
        }
    }

    /// Queues `message` for delivery. A closed link is not an error here; the
    /// next tick's presence check removes the player.
    pub fn send(&self, message: ServerMessage) -> bool {
        if self.sender.send(message).is_err() {
            debug!("Dropping message for closed connection {}", self.id);
            false
        } else {
            true
        }
    }

    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }
}

/// Manages all linked clients
///
/// Ids start at 1 and are never reused during the process lifetime.
pub struct ConnectionDirectory {
    connections: HashMap<PlayerId, Connection>,
    next_id: PlayerId,
    max_connections: usize,
}

impl ConnectionDirectory {
    pub fn new(max_connections: usize) -> Self {
        Self {
            connections: HashMap::new(),
            next_id: 1,
            max_connections,
        }
    }

    /// Registers a new link and returns its player id, or `None` when the
    /// directory is at capacity.
    pub fn add_connection(
        &mut self,
        addr: Option<SocketAddr>,
        sender: UnboundedSender<ServerMessage>,
    ) -> Option<PlayerId> {
        if self.connections.len() >= self.max_connections {
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;

        match addr {
            Some(addr) => info!("Player {} connected from {}", id, addr),
            None => info!("Player {} connected in-process", id),
        }
        self.connections.insert(id, Connection::new(id, addr, sender));

        Some(id)
    }

    /// Forgets a link and hands back its record.
    pub fn remove_connection(&mut self, id: PlayerId) -> Option<Connection> {
        let connection = self.connections.remove(&id);
        if connection.is_some() {
            info!("Player {} disconnected", id);
        }
        connection
    }

    pub fn get(&self, id: PlayerId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.connections.contains_key(&id)
    }

    /// True while the player is registered and its outbound queue is open.
    pub fn is_connected(&self, id: PlayerId) -> bool {
        self.connections.get(&id).is_some_and(Connection::is_open)
    }

    pub fn room_of(&self, id: PlayerId) -> Option<&RoomId> {
        self.connections.get(&id).and_then(|c| c.room.as_ref())
    }

    pub fn assign_room(&mut self, id: PlayerId, room: Option<RoomId>) {
        if let Some(connection) = self.connections.get_mut(&id) {
            connection.room = room;
        }
    }

    /// Sends to one player. Unknown ids and closed links are ignored.
    pub fn send(&self, to: PlayerId, message: ServerMessage) -> bool {
        match self.connections.get(&to) {
            Some(connection) => connection.send(message),
            None => false,
        }
    }

    /// Sends the same message to every listed player.
    pub fn broadcast(&self, members: &[PlayerId], message: &ServerMessage) {
        for &id in members {
            self.send(id, message.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
