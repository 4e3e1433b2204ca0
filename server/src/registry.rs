//! Room registry: creates, looks up and destroys rooms
//!
//! Owned by the event loop and passed by reference to the dispatcher; there
//! is no global room table.

use crate::error::AuthorityError;
use crate::room::Room;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{GameConfig, PlayerId, RoomId};
use std::collections::HashMap;

pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    config: GameConfig,
    rng: StdRng,
}

impl RoomRegistry {
    /// Rooms get their own generator, seeded from this registry's, so a fixed
    /// `config.seed` replays the same food and spawn layout.
    pub fn new(config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            rooms: HashMap::new(),
            config,
            rng,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    fn generate_id(&mut self) -> RoomId {
        loop {
            let id = format!("{:08x}", self.rng.gen::<u32>());
            if !self.rooms.contains_key(&id) {
                return id;
            }
        }
    }

    /// Opens a new lobby hosted by `host`. Without a requested id, a random
    /// 8-digit hex id is generated.
    pub fn create(
        &mut self,
        requested: Option<RoomId>,
        host: PlayerId,
        host_name: &str,
    ) -> Result<&mut Room, AuthorityError> {
        let id = match requested.map(|id| id.trim().to_string()) {
            Some(id) if !id.is_empty() => {
                if self.rooms.contains_key(&id) {
                    return Err(AuthorityError::RoomExists(id));
                }
                id
            }
            _ => self.generate_id(),
        };

        let room_rng = StdRng::seed_from_u64(self.rng.gen());
        let room = Room::new(id.clone(), host, host_name, self.config.clone(), room_rng);
        Ok(self.rooms.entry(id).or_insert(room))
    }

    pub fn get(&self, id: &str) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Room> {
        self.rooms.get_mut(id)
    }

    /// Looks up a room for a request, failing with "Room not found".
    pub fn require_mut(&mut self, id: &str) -> Result<&mut Room, AuthorityError> {
        self.rooms
            .get_mut(id)
            .ok_or_else(|| AuthorityError::RoomNotFound(id.to_string()))
    }

    pub fn remove(&mut self, id: &str) -> Option<Room> {
        let room = self.rooms.remove(id);
        if room.is_some() {
            info!("Room {} terminated", id);
        }
        room
    }

    /// Removes the room if its last player has left. Returns true if it did.
    pub fn remove_if_empty(&mut self, id: &str) -> bool {
        let empty = self.rooms.get(id).is_some_and(Room::is_empty);
        if empty {
            self.remove(id);
        }
        empty
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rooms.contains_key(id)
    }

    pub fn ids(&self) -> Vec<RoomId> {
        self.rooms.keys().cloned().collect()
    }

    pub fn rooms_mut(&mut self) -> impl Iterator<Item = &mut Room> {
        self.rooms.values_mut()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RoomRegistry {
        RoomRegistry::new(GameConfig {
            seed: Some(11),
            food_target: 10,
            ..GameConfig::default()
        })
    }

    #[test]
    fn test_create_generates_hex_id() {
        let mut registry = registry();
        let id = registry.create(None, 1, "host").unwrap().id().to_string();

        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert!(registry.contains(&id));
        assert_eq!(registry.get(&id).unwrap().food_count(), 10);
    }

    #[test]
    fn test_create_with_requested_id() {
        let mut registry = registry();
        registry.create(Some("lobby".to_string()), 1, "host").unwrap();
        assert!(registry.contains("lobby"));

        let duplicate = registry.create(Some("lobby".to_string()), 2, "other");
        assert!(matches!(duplicate, Err(AuthorityError::RoomExists(_))));
        assert_eq!(registry.get("lobby").unwrap().host_id(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_blank_requested_id_is_generated() {
        let mut registry = registry();
        let id = registry
            .create(Some("  ".to_string()), 1, "host")
            .unwrap()
            .id()
            .to_string();
        assert_eq!(id.len(), 8);
    }

    #[test]
    fn test_lookup_missing_room() {
        let mut registry = registry();
        assert!(registry.get("nope").is_none());
        assert!(matches!(
            registry.require_mut("nope"),
            Err(AuthorityError::RoomNotFound(_))
        ));
    }

    #[test]
    fn test_empty_room_is_removed() {
        let mut registry = registry();
        let id = registry.create(None, 1, "host").unwrap().id().to_string();

        assert!(!registry.remove_if_empty(&id));
        registry.get_mut(&id).unwrap().remove_player(1);
        assert!(registry.remove_if_empty(&id));

        assert!(registry.get(&id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_seeded_registries_agree() {
        let mut a = registry();
        let mut b = registry();
        let id_a = a.create(None, 1, "host").unwrap().id().to_string();
        let id_b = b.create(None, 1, "host").unwrap().id().to_string();
        assert_eq!(id_a, id_b);
    }
}
