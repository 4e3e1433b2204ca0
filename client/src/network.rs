use crate::error::ClientError;
use crate::game::{ClientEvent, ClientGameState, Phase};
use crate::input::{Autopilot, InputManager};
use crate::services::{commentary_or_fallback, FlavorText, RunSummary};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use server::{AuthorityError, LocalPlayer, PeerHost, Server};
use shared::protocol::{decode_server, encode_client};
use shared::{ClientMessage, GameConfig, RoomId, ServerMessage};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection attempts before giving up on a remote authority.
pub const CONNECT_ATTEMPTS: u32 = 5;
/// Base delay between attempts; attempt `n` waits `n` times this.
pub const CONNECT_DELAY: Duration = Duration::from_millis(1000);

/// The client's side of a link to an authority.
pub enum Link {
    /// WebSocket to a dedicated server or a remote peer host
    Remote(Box<WsStream>),
    /// In-process link to a peer host running in this process
    Local(LocalPlayer),
}

impl Link {
    /// Opens a WebSocket, retrying with a linearly growing delay.
    pub async fn connect(url: &str, attempts: u32, delay: Duration) -> Result<Self, ClientError> {
        for attempt in 1..=attempts.max(1) {
            match connect_async(url).await {
                Ok((ws_stream, _)) => {
                    info!("Connected to {}", url);
                    return Ok(Link::Remote(Box::new(ws_stream)));
                }
                Err(e) => {
                    warn!(
                        "Connection attempt {}/{} to {} failed: {}",
                        attempt, attempts, url, e
                    );
                    if attempt < attempts {
                        sleep(delay * attempt).await;
                    }
                }
            }
        }

        Err(ClientError::Unreachable {
            url: url.to_string(),
            attempts,
        })
    }

    pub async fn send(&mut self, message: ClientMessage) -> Result<(), ClientError> {
        match self {
            Link::Remote(ws) => {
                let text = encode_client(&message)?;
                ws.send(Message::Text(text)).await?;
                Ok(())
            }
            Link::Local(local) => Ok(local.send(message)?),
        }
    }

    /// Next message from the authority; `None` once the link is closed.
    pub async fn recv(&mut self) -> Option<Result<ServerMessage, ClientError>> {
        match self {
            Link::Remote(ws) => loop {
                match ws.next().await? {
                    Ok(Message::Text(text)) => return Some(decode_server(&text).map_err(Into::into)),
                    Ok(Message::Binary(bytes)) => {
                        let text = String::from_utf8_lossy(&bytes).into_owned();
                        return Some(decode_server(&text).map_err(Into::into));
                    }
                    Ok(Message::Close(_)) => return None,
                    Ok(_) => continue,
                    Err(e) => return Some(Err(e.into())),
                }
            },
            Link::Local(local) => local.recv().await.map(Ok),
        }
    }
}

/// Event loop of a peer host embedded in this process.
pub type HostLoop = JoinHandle<Result<(), AuthorityError>>;

/// Starts a peer host on `listen` and links this process to it as the host.
pub async fn host_locally(
    listen: &str,
    name: &str,
    config: GameConfig,
    max_peers: usize,
) -> Result<(Link, SocketAddr, HostLoop), ClientError> {
    let tick = config.tick_duration();
    let mut server = Server::bind(listen, PeerHost::new(name, config, max_peers + 1), tick).await?;
    let addr = server.local_addr()?;

    let local = server.attach_local()?;
    let host_loop = tokio::spawn(server.run());
    Ok((Link::Local(local), addr, host_loop))
}

/// Logs how the embedded host loop ended and returns its error. A loop still
/// running after `grace` is aborted.
pub async fn finish_host(mut host_loop: HostLoop, grace: Duration) -> Result<(), ClientError> {
    match timeout(grace, &mut host_loop).await {
        Ok(Ok(Ok(()))) => {
            info!("Embedded host stopped");
            Ok(())
        }
        Ok(Ok(Err(e))) => {
            error!("Embedded host failed: {}", e);
            Err(e.into())
        }
        Ok(Err(e)) => {
            error!("Embedded host task ended abnormally: {}", e);
            Err(ClientError::Disconnected)
        }
        Err(_) => {
            debug!("Stopping embedded host");
            host_loop.abort();
            Ok(())
        }
    }
}

/// What the client asks for once linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Create { room_id: Option<RoomId> },
    Join { room_id: RoomId },
    /// Already in the room: the embedded peer host created it on attach
    Host,
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub name: String,
    pub intent: Intent,
    /// Host only: start once this many players are in the lobby
    pub start_at: Option<usize>,
}

/// Headless client: follows the authority's messages and steers with the
/// autopilot until its snake dies.
pub struct Client<F: FlavorText> {
    link: Link,
    options: ClientOptions,
    game_state: ClientGameState,
    input_manager: InputManager,
    autopilot: Autopilot,
    flavor: F,
}

impl<F: FlavorText> Client<F> {
    pub fn new(link: Link, options: ClientOptions, flavor: F) -> Self {
        Self {
            link,
            options,
            game_state: ClientGameState::new(),
            input_manager: InputManager::default(),
            autopilot: Autopilot::new(GameConfig::default().map_size),
            flavor,
        }
    }

    pub fn game_state(&self) -> &ClientGameState {
        &self.game_state
    }

    async fn announce(&mut self) -> Result<(), ClientError> {
        let name = self.options.name.clone();
        let message = match self.options.intent.clone() {
            Intent::Create { room_id } => ClientMessage::CreateRoom {
                room_id,
                player_name: name,
            },
            Intent::Join { room_id } => ClientMessage::JoinRoom {
                room_id,
                player_name: name,
            },
            Intent::Host => return Ok(()),
        };
        self.link.send(message).await
    }

    /// Reacts to one state change. Returns the final commentary once the run
    /// is over.
    async fn handle_event(&mut self, event: ClientEvent) -> Result<Option<String>, ClientError> {
        match event {
            ClientEvent::Linked {
                player_id,
                map_size,
            } => {
                info!("Linked as player {} on a {} map", player_id, map_size);
                self.autopilot = Autopilot::new(map_size);
            }
            ClientEvent::Joined { room_id, player_id } => {
                info!("In room {} as player {}", room_id, player_id);
            }
            ClientEvent::LobbyChanged(players) => {
                info!("Lobby: {} players", players.len());
                let ready = self.options.start_at.is_some_and(|n| players.len() >= n);
                if ready && self.game_state.is_host() {
                    self.link.send(ClientMessage::StartGame).await?;
                }
            }
            ClientEvent::Started => info!("Game started"),
            ClientEvent::Died(death) => {
                let summary = RunSummary {
                    player_name: self.options.name.clone(),
                    score: death.score,
                    kills: death.kills,
                };
                return Ok(Some(commentary_or_fallback(&mut self.flavor, &summary)));
            }
            ClientEvent::Rejected(message) => {
                if self.game_state.phase() == Phase::Connecting {
                    return Err(ClientError::Rejected(message));
                }
            }
        }
        Ok(None)
    }

    async fn send_input(&mut self) -> Result<(), ClientError> {
        if self.game_state.phase() != Phase::Playing {
            return Ok(());
        }
        let (Some(me), Some(snapshot)) = (self.game_state.own_snake(), self.game_state.snapshot())
        else {
            return Ok(());
        };

        let sample = self.autopilot.steer(me, snapshot);
        if let Some(input) = self.input_manager.update(sample, Instant::now()) {
            self.link
                .send(ClientMessage::Input {
                    angle: input.angle,
                    is_boosting: input.boosting,
                    name: None,
                })
                .await?;
        }
        Ok(())
    }

    /// Plays one run. Returns the end-of-run commentary.
    pub async fn run(&mut self) -> Result<String, ClientError> {
        self.announce().await?;

        let mut input_interval = interval(Duration::from_millis(16));

        loop {
            tokio::select! {
                message = self.link.recv() => {
                    match message {
                        Some(Ok(message)) => {
                            let Some(event) = self.game_state.apply(message) else {
                                continue;
                            };
                            if let Some(commentary) = self.handle_event(event).await? {
                                return Ok(commentary);
                            }
                        }
                        Some(Err(e)) => warn!("Dropping message: {}", e),
                        None => {
                            error!("Authority closed the link");
                            return Err(ClientError::Disconnected);
                        }
                    }
                },

                _ = input_interval.tick() => {
                    if let Err(e) = self.send_input().await {
                        debug!("Error sending input: {}", e);
                    }
                },
            }
        }
    }
}
