//! Home Session Actor
//!
//! Each home is owned by exactly one task. Everything else talks to it
//! through a cloneable [`HomeHandle`]; commands are queued on an mpsc channel
//! and answered over oneshot channels, so a tick or a gameplay mutation always
//! runs to completion before the next one starts.
//!
//! ```text
//!  HomeHandle ──cmd──▶ ┌──────────────┐ ──events──▶ broadcast subscribers
//!  HomeHandle ──cmd──▶ │ HomeSession  │ ──frames──▶ outbound channel
//!  interval ──tick───▶ └──────┬───────┘
//!                             └──shutdown──▶ SnapshotStore
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::content::GameContent;
use crate::core::hash::{short_hex, SnapshotDigest};
use crate::game::events::HomeEvent;
use crate::game::home::Home;
use crate::game::player::Player;
use crate::game::tick::TickResult;
use crate::network::message::{Message, MessageFrame, OwnHomeDataMessage, ServiceNode};
use crate::storage::{SnapshotStore, StoreError};

/// Work run inside the session task with exclusive access to the home.
pub type HomeJob = Box<dyn FnOnce(&mut Home, &mut Player, &GameContent) + Send>;

/// Session tuning.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Time between ticks.
    pub tick_interval: Duration,
    /// Queued commands before senders wait.
    pub command_capacity: usize,
    /// Buffered events per subscriber.
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            command_capacity: 64,
            event_capacity: 64,
        }
    }
}

impl From<&EngineConfig> for SessionConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            tick_interval: config.tick_interval,
            ..Self::default()
        }
    }
}

/// A frame ready for the routing layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Destination service.
    pub node: ServiceNode,
    /// Encoded message.
    pub frame: MessageFrame,
}

/// Session errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session task has stopped.
    #[error("Session closed")]
    Closed,

    /// No outbound channel, or its receiver is gone.
    #[error("Outbound channel unavailable")]
    OutboundUnavailable,

    /// Persisting the home failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

enum HomeCommand {
    Tick {
        reply: oneshot::Sender<TickResult>,
    },
    FastForward {
        seconds: i32,
        reply: oneshot::Sender<TickResult>,
    },
    Run(HomeJob),
    SendOwnHomeData {
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Save {
        reply: oneshot::Sender<Result<Option<SnapshotDigest>, StoreError>>,
    },
    Shutdown,
}

// =============================================================================
// HANDLE
// =============================================================================

/// Cloneable access to a running session.
#[derive(Clone)]
pub struct HomeHandle {
    home_id: i64,
    commands: mpsc::Sender<HomeCommand>,
    events: broadcast::Sender<HomeEvent>,
}

impl HomeHandle {
    /// Id of the home this session owns.
    pub fn home_id(&self) -> i64 {
        self.home_id
    }

    /// Receive events produced from now on.
    pub fn subscribe_events(&self) -> broadcast::Receiver<HomeEvent> {
        self.events.subscribe()
    }

    async fn send(&self, command: HomeCommand) -> Result<(), SessionError> {
        self.commands.send(command).await.map_err(|_| SessionError::Closed)
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> HomeCommand,
    ) -> Result<T, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(make(tx)).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Run one tick now, outside the interval.
    pub async fn tick(&self) -> Result<TickResult, SessionError> {
        self.request(|reply| HomeCommand::Tick { reply }).await
    }

    /// Replay `seconds` of elapsed time.
    pub async fn fast_forward(&self, seconds: i32) -> Result<TickResult, SessionError> {
        self.request(|reply| HomeCommand::FastForward { seconds, reply }).await
    }

    /// Run `f` with exclusive access to the home and return its result.
    pub async fn with_home<R, F>(&self, f: F) -> Result<R, SessionError>
    where
        F: FnOnce(&mut Home, &mut Player, &GameContent) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.request(|reply| {
            HomeCommand::Run(Box::new(
                move |home: &mut Home, player: &mut Player, content: &GameContent| {
                    let _ = reply.send(f(home, player, content));
                },
            ))
        })
        .await
    }

    /// Encoded snapshot of the current state.
    pub async fn snapshot(&self) -> Result<Vec<u8>, SessionError> {
        self.with_home(|home, _, _| home.to_bytes()).await
    }

    /// Push an own-home-data message to the outbound channel.
    pub async fn send_own_home_data(&self) -> Result<(), SessionError> {
        self.request(|reply| HomeCommand::SendOwnHomeData { reply }).await?
    }

    /// Persist now. `None` when the session has no store.
    pub async fn save(&self) -> Result<Option<SnapshotDigest>, SessionError> {
        Ok(self.request(|reply| HomeCommand::Save { reply }).await??)
    }

    /// Ask the session to persist and stop.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(HomeCommand::Shutdown).await
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Owner of one home.
pub struct HomeSession {
    home: Home,
    player: Player,
    content: Arc<GameContent>,
    store: Option<SnapshotStore>,
    outbound: Option<mpsc::Sender<OutboundMessage>>,
    config: SessionConfig,
    events: broadcast::Sender<HomeEvent>,
}

impl HomeSession {
    /// Create a session for `home`.
    pub fn new(home: Home, player: Player, content: Arc<GameContent>) -> Self {
        let config = SessionConfig::default();
        let (events, _) = broadcast::channel(config.event_capacity);
        Self {
            home,
            player,
            content,
            store: None,
            outbound: None,
            config,
            events,
        }
    }

    /// Use `config` instead of the defaults.
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        self.events = events;
        self.config = config;
        self
    }

    /// Persist through `store` on save and shutdown.
    pub fn with_store(mut self, store: SnapshotStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Deliver outgoing frames to `outbound`.
    pub fn with_outbound(mut self, outbound: mpsc::Sender<OutboundMessage>) -> Self {
        self.outbound = Some(outbound);
        self
    }

    /// Start the session task.
    ///
    /// The task ends after [`HomeHandle::shutdown`] or once every handle is
    /// dropped, persisting the home and returning it.
    pub fn spawn(self) -> (HomeHandle, JoinHandle<Result<Home, SessionError>>) {
        let (commands, rx) = mpsc::channel(self.config.command_capacity.max(1));
        let handle = HomeHandle {
            home_id: self.home.home_id(),
            commands,
            events: self.events.clone(),
        };
        let task = tokio::spawn(self.run(rx));
        (handle, task)
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<HomeCommand>,
    ) -> Result<Home, SessionError> {
        let home_id = self.home.home_id();

        let now = Utc::now();
        let offline = self.home.seconds_since_last_save(now);
        if offline > 0 {
            info!(home_id, offline, "Catching up offline time");
            let result = self.home.fast_forward(offline, &self.content, &mut self.player);
            self.home.last_tick = now.timestamp();
            self.publish(result);
        }

        let period = self.config.tick_interval;
        let mut ticker = interval_at(Instant::now() + period, period);

        info!(home_id, tick_ms = period.as_millis() as u64, "Home session started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let result = self.home.tick(&self.content, &mut self.player, Utc::now());
                    self.publish(result);
                }
                command = commands.recv() => match command {
                    None | Some(HomeCommand::Shutdown) => break,
                    Some(command) => self.handle(command).await,
                },
            }
        }

        self.persist().await?;
        info!(home_id, "Home session stopped");
        Ok(self.home)
    }

    async fn handle(&mut self, command: HomeCommand) {
        match command {
            HomeCommand::Tick { reply } => {
                let result = self.home.tick(&self.content, &mut self.player, Utc::now());
                self.publish(result.clone());
                let _ = reply.send(result);
            }
            HomeCommand::FastForward { seconds, reply } => {
                let result = self.home.fast_forward(seconds, &self.content, &mut self.player);
                self.publish(result.clone());
                let _ = reply.send(result);
            }
            HomeCommand::Run(job) => job(&mut self.home, &mut self.player, &self.content),
            HomeCommand::SendOwnHomeData { reply } => {
                let _ = reply.send(self.send_own_home_data().await);
            }
            HomeCommand::Save { reply } => {
                let _ = reply.send(self.persist().await);
            }
            HomeCommand::Shutdown => {}
        }
    }

    fn publish(&self, result: TickResult) {
        for event in result.events {
            debug!(home_id = self.home.home_id(), event = event.kind(), "Home event");
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }

    async fn send_own_home_data(&self) -> Result<(), SessionError> {
        let outbound = self.outbound.as_ref().ok_or(SessionError::OutboundUnavailable)?;
        let message = OwnHomeDataMessage {
            home: self.home.clone(),
            server_time: Utc::now().timestamp(),
        };
        let frame = message.to_frame();
        debug!(home_id = self.home.home_id(), bytes = frame.payload.len(), "Sending own home data");

        outbound
            .send(OutboundMessage { node: message.service_node(), frame })
            .await
            .map_err(|_| SessionError::OutboundUnavailable)
    }

    async fn persist(&self) -> Result<Option<SnapshotDigest>, StoreError> {
        let Some(store) = &self.store else {
            return Ok(None);
        };

        match store.save(&self.home).await {
            Ok(digest) => {
                info!(
                    home_id = self.home.home_id(),
                    digest = %short_hex(&digest),
                    "Home persisted"
                );
                Ok(Some(digest))
            }
            Err(e) => {
                warn!(home_id = self.home.home_id(), error = %e, "Failed to persist home");
                Err(e)
            }
        }
    }
}
