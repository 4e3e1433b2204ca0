//! Room (match session) state machine
//!
//! A room starts in [`RoomState::Lobby`], where players come and go freely.
//! The host's start command snapshots every lobby player into a fresh snake
//! and moves the room to [`RoomState::Active`] for good. An empty room is
//! dropped by the registry, which is the terminal state.

use crate::broadcast::{build_snapshot, BroadcastGate};
use crate::error::AuthorityError;
use crate::food::{random_position, FoodManager};
use crate::simulation::{advance, Death, InputSource, World};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use shared::{
    GameConfig, InputState, LobbyPlayer, PlayerId, RoomId, Snake, Snapshot, SNAKE_COLORS,
};
use std::collections::BTreeMap;
use std::time::Instant;

/// A participant of one room.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub last_input: InputState,
}

impl Player {
    pub fn new(id: PlayerId, name: &str, is_host: bool) -> Self {
        Self {
            id,
            name: name.to_string(),
            is_host,
            last_input: InputState::default(),
        }
    }
}

impl InputSource for BTreeMap<PlayerId, Player> {
    fn latest_input(&self, player: PlayerId) -> Option<InputState> {
        self.get(&player).map(|p| p.last_input)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    Lobby,
    Active,
}

/// Outcome of one tick: who died, and the snapshot if one is due.
#[derive(Debug, Default)]
pub struct TickReport {
    pub deaths: Vec<Death>,
    pub snapshot: Option<Snapshot>,
}

#[derive(Debug)]
pub struct Room {
    id: RoomId,
    host_id: PlayerId,
    state: RoomState,
    players: BTreeMap<PlayerId, Player>,
    /// Member ids in the order they entered; the host is always first.
    join_order: Vec<PlayerId>,
    world: World,
    config: GameConfig,
    rng: StdRng,
    gate: BroadcastGate,
    ticks: u64,
}

impl Room {
    /// Creates a lobby owned by `host_id` and scatters the initial food.
    pub fn new(
        id: RoomId,
        host_id: PlayerId,
        host_name: &str,
        config: GameConfig,
        mut rng: StdRng,
    ) -> Self {
        let mut food = FoodManager::new();
        food.spawn(config.food_target, &mut rng, &config);

        let mut players = BTreeMap::new();
        players.insert(host_id, Player::new(host_id, host_name, true));

        info!("Room {} created by player {}", id, host_id);

        Self {
            id,
            host_id,
            state: RoomState::Lobby,
            players,
            join_order: vec![host_id],
            world: World {
                snakes: BTreeMap::new(),
                food,
            },
            gate: BroadcastGate::new(config.broadcast_interval()),
            config,
            rng,
            ticks: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn host_id(&self) -> PlayerId {
        self.host_id
    }

    pub fn state(&self) -> RoomState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == RoomState::Active
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Ids of every member, in join order.
    pub fn member_ids(&self) -> Vec<PlayerId> {
        self.join_order.clone()
    }

    pub fn snake(&self, id: PlayerId) -> Option<&Snake> {
        self.world.snakes.get(&id)
    }

    pub fn snake_mut(&mut self, id: PlayerId) -> Option<&mut Snake> {
        self.world.snakes.get_mut(&id)
    }

    pub fn snake_count(&self) -> usize {
        self.world.snakes.len()
    }

    pub fn food_count(&self) -> usize {
        self.world.food.len()
    }

    /// Adds a player to the lobby. Rejected once the match has started.
    pub fn add_player(&mut self, id: PlayerId, name: &str) -> Result<(), AuthorityError> {
        if self.is_active() {
            return Err(AuthorityError::AlreadyStarted(self.id.clone()));
        }

        if !self.players.contains_key(&id) {
            self.players.insert(id, Player::new(id, name, false));
            self.join_order.push(id);
        }
        debug!("Player {} joined room {}", id, self.id);
        Ok(())
    }

    /// Removes the player and its snake. Returns false if it was not a member.
    pub fn remove_player(&mut self, id: PlayerId) -> bool {
        self.world.snakes.remove(&id);
        let removed = self.players.remove(&id).is_some();
        if removed {
            self.join_order.retain(|&member| member != id);
            debug!("Player {} left room {}", id, self.id);
        }
        removed
    }

    /// Drops every member for which `connected` is false. Returns the ids removed.
    pub fn retain_players<F>(&mut self, mut connected: F) -> Vec<PlayerId>
    where
        F: FnMut(PlayerId) -> bool,
    {
        let gone: Vec<PlayerId> = self
            .players
            .keys()
            .copied()
            .filter(|&id| !connected(id))
            .collect();

        for &id in &gone {
            self.remove_player(id);
        }
        gone
    }

    /// Starts the match on the host's request.
    ///
    /// Every current member gets exactly one snake. A second start while the
    /// match runs is a no-op.
    pub fn start(&mut self, requester: PlayerId) -> Result<(), AuthorityError> {
        if requester != self.host_id {
            return Err(AuthorityError::NotHost(requester));
        }
        if self.is_active() {
            return Ok(());
        }

        for player in self.players.values() {
            let head = random_position(&mut self.rng, &self.config);
            let color = SNAKE_COLORS
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(SNAKE_COLORS[0]);
            let snake = Snake::spawn(player.id, &player.name, head, color, &self.config);
            self.world.snakes.insert(player.id, snake);
        }

        self.state = RoomState::Active;
        self.gate.reset();
        info!(
            "Room {} started with {} players",
            self.id,
            self.players.len()
        );
        Ok(())
    }

    /// Records the latest steering input; last write wins.
    pub fn set_input(&mut self, id: PlayerId, input: InputState) -> bool {
        match self.players.get_mut(&id) {
            Some(player) => {
                player.last_input = input;
                true
            }
            None => false,
        }
    }

    /// Renames a member while the room is still a lobby.
    pub fn rename_player(&mut self, id: PlayerId, name: &str) -> bool {
        if self.is_active() {
            return false;
        }
        match self.players.get_mut(&id) {
            Some(player) if player.name != name => {
                player.name = name.to_string();
                true
            }
            _ => false,
        }
    }

    /// Lobby entries in join order, host first.
    pub fn lobby_roster(&self) -> Vec<LobbyPlayer> {
        self.join_order
            .iter()
            .filter_map(|id| self.players.get(id))
            .map(|p| LobbyPlayer {
                id: p.id,
                name: p.name.clone(),
                is_host: p.is_host,
                ready: true,
            })
            .collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        build_snapshot(self.world.snakes.values(), self.world.food.items(), &self.config)
    }

    /// Advances an active room by one tick. Lobbies do nothing.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        if !self.is_active() {
            return TickReport::default();
        }

        self.ticks += 1;
        let deaths = advance(&mut self.world, &self.players, &self.config, &mut self.rng);

        for death in &deaths {
            info!(
                "Player {} died in room {} with score {}",
                death.player_id, self.id, death.score
            );
        }

        let snapshot = if self.gate.ready(now) {
            Some(self.snapshot())
        } else {
            None
        };

        TickReport { deaths, snapshot }
    }
}
