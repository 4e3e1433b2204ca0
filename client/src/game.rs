//! Client-side view of the match
//!
//! The client never simulates. It keeps the latest snapshot, tracks which
//! phase it is in and decides when its own snake has died: on `PLAYER_DIED`,
//! or after two snapshots in a row without it. A single missing snapshot is
//! tolerated.

use log::{debug, info, warn};
use shared::{LobbyPlayer, PlayerId, RoomId, ServerMessage, SnakeView, Snapshot};

/// Consecutive snapshots without the own snake that count as a death.
pub const MISSING_SNAPSHOT_LIMIT: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connecting,
    Lobby,
    Playing,
    GameOver,
}

/// Final numbers of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeathSummary {
    pub score: u32,
    pub kills: u32,
    pub killed_by: Option<PlayerId>,
}

/// Things the driver loop reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Linked { player_id: PlayerId, map_size: f64 },
    Joined { room_id: RoomId, player_id: PlayerId },
    LobbyChanged(Vec<LobbyPlayer>),
    Started,
    Died(DeathSummary),
    Rejected(String),
}

#[derive(Debug)]
pub struct ClientGameState {
    phase: Phase,
    player_id: Option<PlayerId>,
    room_id: Option<RoomId>,
    map_size: Option<f64>,
    lobby: Vec<LobbyPlayer>,
    snapshot: Option<Snapshot>,
    missing_snapshots: u32,
    last_score: u32,
    last_kills: u32,
    death: Option<DeathSummary>,
    snapshots_received: u64,
}

impl ClientGameState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Connecting,
            player_id: None,
            room_id: None,
            map_size: None,
            lobby: Vec::new(),
            snapshot: None,
            missing_snapshots: 0,
            last_score: 0,
            last_kills: 0,
            death: None,
            snapshots_received: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player_id(&self) -> Option<PlayerId> {
        self.player_id
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub fn map_size(&self) -> Option<f64> {
        self.map_size
    }

    pub fn lobby(&self) -> &[LobbyPlayer] {
        &self.lobby
    }

    pub fn is_host(&self) -> bool {
        self.player_id
            .and_then(|id| self.lobby.iter().find(|p| p.id == id))
            .is_some_and(|p| p.is_host)
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn snapshots_received(&self) -> u64 {
        self.snapshots_received
    }

    /// The own snake as last seen.
    pub fn own_snake(&self) -> Option<&SnakeView> {
        let id = self.player_id?;
        self.snapshot.as_ref()?.snake(id)
    }

    pub fn death(&self) -> Option<DeathSummary> {
        self.death
    }

    fn die(&mut self, summary: DeathSummary) -> Option<ClientEvent> {
        if self.phase == Phase::GameOver {
            return None;
        }
        info!(
            "Died with score {} and {} kills",
            summary.score, summary.kills
        );
        self.phase = Phase::GameOver;
        self.death = Some(summary);
        Some(ClientEvent::Died(summary))
    }

    fn observe(&mut self, snapshot: Snapshot) -> Option<ClientEvent> {
        self.snapshots_received += 1;
        let own = self.player_id.and_then(|id| snapshot.snake(id)).cloned();
        self.snapshot = Some(snapshot);

        if self.phase != Phase::Playing {
            return None;
        }

        match own {
            Some(snake) => {
                self.missing_snapshots = 0;
                self.last_score = snake.score;
                self.last_kills = snake.kills;
                None
            }
            None => {
                self.missing_snapshots += 1;
                debug!("Own snake missing from {} snapshots", self.missing_snapshots);
                if self.missing_snapshots >= MISSING_SNAPSHOT_LIMIT {
                    self.die(DeathSummary {
                        score: self.last_score,
                        kills: self.last_kills,
                        killed_by: None,
                    })
                } else {
                    None
                }
            }
        }
    }

    /// Folds one authority message into the state.
    pub fn apply(&mut self, message: ServerMessage) -> Option<ClientEvent> {
        match message {
            ServerMessage::Init {
                player_id,
                map_size,
            } => {
                self.player_id = Some(player_id);
                self.map_size = Some(map_size);
                Some(ClientEvent::Linked {
                    player_id,
                    map_size,
                })
            }
            ServerMessage::RoomCreated { room_id, player_id }
            | ServerMessage::RoomJoined { room_id, player_id } => {
                self.player_id = Some(player_id);
                self.room_id = Some(room_id.clone());
                self.phase = Phase::Lobby;
                Some(ClientEvent::Joined { room_id, player_id })
            }
            ServerMessage::LobbyUpdate { players } => {
                self.lobby = players.clone();
                Some(ClientEvent::LobbyChanged(players))
            }
            ServerMessage::GameStart => {
                self.phase = Phase::Playing;
                self.missing_snapshots = 0;
                self.last_score = 0;
                self.last_kills = 0;
                self.death = None;
                Some(ClientEvent::Started)
            }
            ServerMessage::State(snapshot) => self.observe(snapshot),
            ServerMessage::PlayerDied {
                score,
                kills,
                killed_by,
            } => self.die(DeathSummary {
                score: score.unwrap_or(self.last_score),
                kills: kills.unwrap_or(self.last_kills),
                killed_by,
            }),
            ServerMessage::Error { message } => {
                warn!("Authority error: {}", message);
                Some(ClientEvent::Rejected(message))
            }
        }
    }
}

impl Default for ClientGameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::GridPoint;

    fn view(id: PlayerId, score: u32) -> SnakeView {
        SnakeView {
            id,
            name: format!("p{id}"),
            body: vec![GridPoint { x: 0, y: 0 }],
            angle: 0.0,
            target_angle: 0.0,
            speed: 3.0,
            color: "#ffffff".to_string(),
            score,
            width: 15.0,
            turning_speed: 0.1,
            kills: 1,
        }
    }

    fn snapshot(snakes: Vec<SnakeView>) -> ServerMessage {
        ServerMessage::State(Snapshot {
            snakes,
            ..Snapshot::default()
        })
    }

    fn playing() -> ClientGameState {
        let mut state = ClientGameState::new();
        state.apply(ServerMessage::RoomJoined {
            room_id: "r".to_string(),
            player_id: 2,
        });
        state.apply(ServerMessage::GameStart);
        state
    }

    #[test]
    fn test_client_state_creation() {
        let state = ClientGameState::new();
        assert_eq!(state.phase(), Phase::Connecting);
        assert!(state.player_id().is_none());
        assert!(state.snapshot().is_none());
    }

    #[test]
    fn test_join_and_lobby() {
        let mut state = ClientGameState::new();
        let event = state.apply(ServerMessage::RoomCreated {
            room_id: "abc".to_string(),
            player_id: 1,
        });
        assert_eq!(
            event,
            Some(ClientEvent::Joined {
                room_id: "abc".to_string(),
                player_id: 1
            })
        );
        assert_eq!(state.phase(), Phase::Lobby);

        state.apply(ServerMessage::LobbyUpdate {
            players: vec![LobbyPlayer {
                id: 1,
                name: "me".to_string(),
                is_host: true,
                ready: true,
            }],
        });
        assert!(state.is_host());
    }

    #[test]
    fn test_single_missing_snapshot_is_tolerated() {
        let mut state = playing();
        assert!(state.apply(snapshot(vec![view(2, 40)])).is_none());
        assert!(state.apply(snapshot(vec![view(3, 10)])).is_none());
        assert_eq!(state.phase(), Phase::Playing);

        // reappearing resets the grace counter
        assert!(state.apply(snapshot(vec![view(2, 50)])).is_none());
        assert!(state.apply(snapshot(vec![])).is_none());
        assert_eq!(state.phase(), Phase::Playing);
    }

    #[test]
    fn test_two_missing_snapshots_mean_death() {
        let mut state = playing();
        state.apply(snapshot(vec![view(2, 40)]));
        state.apply(snapshot(vec![]));
        let event = state.apply(snapshot(vec![]));

        assert_eq!(
            event,
            Some(ClientEvent::Died(DeathSummary {
                score: 40,
                kills: 1,
                killed_by: None
            }))
        );
        assert_eq!(state.phase(), Phase::GameOver);
    }

    #[test]
    fn test_player_died_fires_once() {
        let mut state = playing();
        state.apply(snapshot(vec![view(2, 70)]));

        let event = state.apply(ServerMessage::PlayerDied {
            score: None,
            kills: Some(3),
            killed_by: Some(5),
        });
        assert_eq!(
            event,
            Some(ClientEvent::Died(DeathSummary {
                score: 70,
                kills: 3,
                killed_by: Some(5)
            }))
        );

        assert!(state.apply(snapshot(vec![])).is_none());
        assert!(state.apply(snapshot(vec![])).is_none());
        assert_eq!(state.death().unwrap().kills, 3);
    }

    #[test]
    fn test_snapshots_before_start_do_not_kill() {
        let mut state = ClientGameState::new();
        state.apply(ServerMessage::RoomJoined {
            room_id: "r".to_string(),
            player_id: 2,
        });
        for _ in 0..3 {
            assert!(state.apply(snapshot(vec![])).is_none());
        }
        assert_eq!(state.phase(), Phase::Lobby);
        assert_eq!(state.snapshots_received(), 3);
    }

    #[test]
    fn test_error_is_surfaced() {
        let mut state = ClientGameState::new();
        let event = state.apply(ServerMessage::error("Room not found"));
        assert_eq!(event, Some(ClientEvent::Rejected("Room not found".to_string())));
    }
}
