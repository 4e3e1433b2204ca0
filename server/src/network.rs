//! WebSocket transport and the authority's event loop
//!
//! Every accepted socket is served by its own task. The task forwards decoded
//! client messages to the loop and writes whatever the loop queues for it. The
//! loop is the single sequencer: it owns the [`Topology`], applies transport
//! events in arrival order and runs the fixed-rate tick between them.

use crate::error::AuthorityError;
use crate::topology::Topology;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::protocol::{decode_client, encode_server};
use shared::{ClientMessage, PlayerId, ServerMessage};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;

/// Input to the event loop
#[derive(Debug)]
pub enum TransportEvent {
    /// A new link asks for a player id; `None` in the reply refuses it
    Linked {
        addr: Option<SocketAddr>,
        sender: mpsc::UnboundedSender<ServerMessage>,
        reply: oneshot::Sender<Option<PlayerId>>,
    },
    Received {
        player_id: PlayerId,
        message: ClientMessage,
    },
    Closed {
        player_id: PlayerId,
    },
    Shutdown,
}

pub struct Server<T: Topology> {
    listener: TcpListener,
    topology: T,
    tick_duration: Duration,
    events_tx: mpsc::UnboundedSender<TransportEvent>,
    events_rx: mpsc::UnboundedReceiver<TransportEvent>,
}

impl<T: Topology> Server<T> {
    pub async fn bind(addr: &str, topology: T, tick_duration: Duration) -> Result<Self, AuthorityError> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            topology,
            tick_duration,
            events_tx,
            events_rx,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, AuthorityError> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle for feeding events into the loop, e.g. `Shutdown`.
    pub fn events(&self) -> mpsc::UnboundedSender<TransportEvent> {
        self.events_tx.clone()
    }

    pub fn topology(&self) -> &T {
        &self.topology
    }

    /// Links an in-process player before the loop starts. On a peer host the
    /// first such player is the host.
    pub fn attach_local(&mut self) -> Result<LocalPlayer, AuthorityError> {
        let (sender, inbound) = mpsc::unbounded_channel();
        let player_id = self
            .topology
            .link(None, sender)
            .ok_or(AuthorityError::ServerFull)?;

        Ok(LocalPlayer {
            player_id,
            events: self.events_tx.clone(),
            inbound,
        })
    }

    /// Runs until a `Shutdown` event arrives.
    pub async fn run(self) -> Result<(), AuthorityError> {
        let Server {
            listener,
            mut topology,
            tick_duration,
            events_tx,
            mut events_rx,
        } = self;

        let acceptor = tokio::spawn(accept_loop(listener, events_tx));

        let mut tick_interval = interval(tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ticks: u64 = 0;

        info!("Server started successfully");

        loop {
            tokio::select! {
                event = events_rx.recv() => {
                    match event {
                        Some(TransportEvent::Linked { addr, sender, reply }) => {
                            let player_id = topology.link(addr, sender);
                            if player_id.is_none() {
                                warn!("Refusing connection from {:?}: server full", addr);
                            }
                            let _ = reply.send(player_id);
                        }
                        Some(TransportEvent::Received { player_id, message }) => {
                            topology.receive(player_id, message);
                        }
                        Some(TransportEvent::Closed { player_id }) => {
                            topology.close(player_id);
                        }
                        Some(TransportEvent::Shutdown) | None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                _ = tick_interval.tick() => {
                    let summary = topology.tick(Instant::now());
                    ticks += 1;

                    if ticks % 60 == 0 && summary.rooms > 0 {
                        debug!(
                            "Tick {}: {} rooms ({} active), {} snakes, {} deaths",
                            ticks, summary.rooms, summary.active_rooms, summary.snakes, summary.deaths
                        );
                    }
                },
            }
        }

        acceptor.abort();
        Ok(())
    }
}

async fn accept_loop(listener: TcpListener, events: mpsc::UnboundedSender<TransportEvent>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let events = events.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, addr, events).await {
                        warn!("Connection {} ended with error: {}", addr, e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }
    }
}

fn forward(events: &mpsc::UnboundedSender<TransportEvent>, player_id: PlayerId, text: &str) -> bool {
    match decode_client(text) {
        Ok(message) => events
            .send(TransportEvent::Received { player_id, message })
            .is_ok(),
        Err(e) => {
            warn!("Player {}: {}", player_id, AuthorityError::from(e));
            true
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    events: mpsc::UnboundedSender<TransportEvent>,
) -> Result<(), AuthorityError> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut write, mut read) = ws_stream.split();

    let (sender, mut outbound) = mpsc::unbounded_channel();
    let (reply_tx, reply_rx) = oneshot::channel();
    events
        .send(TransportEvent::Linked {
            addr: Some(addr),
            sender,
            reply: reply_tx,
        })
        .map_err(|_| AuthorityError::Shutdown)?;

    let Ok(Some(player_id)) = reply_rx.await else {
        let refusal = encode_server(&ServerMessage::error(AuthorityError::ServerFull.to_string()))?;
        write.send(Message::Text(refusal)).await?;
        write.close().await?;
        return Ok(());
    };

    let result = async {
        loop {
            tokio::select! {
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if !forward(&events, player_id, &text) {
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                        Ok(text) => {
                            if !forward(&events, player_id, &text) {
                                break;
                            }
                        }
                        Err(_) => warn!("Player {} sent a non UTF-8 binary frame", player_id),
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(AuthorityError::from(e)),
                },

                message = outbound.recv() => match message {
                    Some(message) => {
                        let text = encode_server(&message)?;
                        write.send(Message::Text(text)).await?;
                    }
                    None => break,
                },
            }
        }
        Ok::<(), AuthorityError>(())
    }
    .await;

    let _ = events.send(TransportEvent::Closed { player_id });
    result
}

/// A player linked to an authority running in the same process.
///
/// Dropping it closes the link.
#[derive(Debug)]
pub struct LocalPlayer {
    player_id: PlayerId,
    events: mpsc::UnboundedSender<TransportEvent>,
    inbound: mpsc::UnboundedReceiver<ServerMessage>,
}

impl LocalPlayer {
    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn send(&self, message: ClientMessage) -> Result<(), AuthorityError> {
        self.events
            .send(TransportEvent::Received {
                player_id: self.player_id,
                message,
            })
            .map_err(|_| AuthorityError::Shutdown)
    }

    pub async fn recv(&mut self) -> Option<ServerMessage> {
        self.inbound.recv().await
    }

    pub fn try_recv(&mut self) -> Option<ServerMessage> {
        self.inbound.try_recv().ok()
    }
}

impl Drop for LocalPlayer {
    fn drop(&mut self) {
        let _ = self.events.send(TransportEvent::Closed {
            player_id: self.player_id,
        });
    }
}
