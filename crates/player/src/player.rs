//! Single-owner async pose player.
//!
//! [`PosePlayer::spawn`] starts a task that owns a [`PoseSynchronizer`]
//! and handles commands one at a time. Sequence fetches run in their own
//! spawned tasks and report back to the owner tagged with their
//! [`LoadTicket`]; results from superseded loads are dropped there. The
//! current [`PlayerSnapshot`] is published on a [`watch`] channel only
//! when it changes.

use std::sync::Arc;

use hoopform_client::source::{PoseSequenceSource, SequenceLocator};
use hoopform_core::pose::PoseSequence;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

use crate::synchronizer::{LoadTicket, MediaEvent, PlayerSnapshot, PoseSynchronizer};

/// Capacity of the command channel.
const COMMAND_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("Pose player has stopped")]
    Closed,
}

enum Command {
    Load(Option<SequenceLocator>),
    Media(MediaEvent),
    Snapshot(oneshot::Sender<PlayerSnapshot>),
}

/// Result of a background fetch.
struct Fetched {
    ticket: LoadTicket,
    result: Result<PoseSequence, String>,
}

/// Cloneable handle to a running [`PosePlayer`].
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<PlayerSnapshot>,
}

impl PlayerHandle {
    /// Load a new sequence, or clear the player with `None`.
    pub async fn load(&self, locator: Option<SequenceLocator>) -> Result<(), PlayerError> {
        self.send(Command::Load(locator)).await
    }

    pub async fn media_event(&self, event: MediaEvent) -> Result<(), PlayerError> {
        self.send(Command::Media(event)).await
    }

    pub async fn time_update(&self, time: f64) -> Result<(), PlayerError> {
        self.media_event(MediaEvent::TimeUpdate(time)).await
    }

    pub async fn seeked(&self, time: f64) -> Result<(), PlayerError> {
        self.media_event(MediaEvent::Seeked(time)).await
    }

    pub async fn play(&self, time: f64) -> Result<(), PlayerError> {
        self.media_event(MediaEvent::Play(time)).await
    }

    pub async fn pause(&self) -> Result<(), PlayerError> {
        self.media_event(MediaEvent::Pause).await
    }

    pub async fn loaded_data(&self) -> Result<(), PlayerError> {
        self.media_event(MediaEvent::LoadedData).await
    }

    /// Snapshot taken after every previously sent command was handled.
    pub async fn snapshot(&self) -> Result<PlayerSnapshot, PlayerError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx)).await?;
        rx.await.map_err(|_| PlayerError::Closed)
    }

    /// Most recently published snapshot.
    pub fn latest(&self) -> PlayerSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified whenever the published snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<PlayerSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until a published snapshot satisfies `predicate`.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&PlayerSnapshot) -> bool,
    ) -> Result<PlayerSnapshot, PlayerError> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx.wait_for(predicate).await.map_err(|_| PlayerError::Closed)?;
        Ok(snapshot.clone())
    }

    async fn send(&self, command: Command) -> Result<(), PlayerError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PlayerError::Closed)
    }
}

/// Task owning one [`PoseSynchronizer`].
pub struct PosePlayer {
    sync: PoseSynchronizer,
    source: Arc<dyn PoseSequenceSource>,
    commands: mpsc::Receiver<Command>,
    fetched_tx: mpsc::UnboundedSender<Fetched>,
    fetched_rx: mpsc::UnboundedReceiver<Fetched>,
    snapshot_tx: watch::Sender<PlayerSnapshot>,
    cancel: CancellationToken,
}

impl PosePlayer {
    /// Start a player task.
    ///
    /// The task stops when `cancel` fires or every [`PlayerHandle`] has
    /// been dropped.
    pub fn spawn(
        source: Arc<dyn PoseSequenceSource>,
        video_base: impl Into<String>,
        cancel: CancellationToken,
    ) -> (PlayerHandle, tokio::task::JoinHandle<()>) {
        let (command_tx, commands) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (fetched_tx, fetched_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshots) = watch::channel(PlayerSnapshot::default());

        let player = Self {
            sync: PoseSynchronizer::new(video_base),
            source,
            commands,
            fetched_tx,
            fetched_rx,
            snapshot_tx,
            cancel,
        };
        let task = tokio::spawn(player.run());

        (
            PlayerHandle {
                commands: command_tx,
                snapshots,
            },
            task,
        )
    }

    async fn run(mut self) {
        tracing::debug!("Pose player started");
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                Some(fetched) = self.fetched_rx.recv() => {
                    self.sync.finish_load(&fetched.ticket, fetched.result);
                }
            }
            self.publish();
        }

        // Abandon whatever is still loading.
        self.sync.begin_load(None);
        tracing::debug!("Pose player stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Load(locator) => {
                if let Some(ticket) = self.sync.begin_load(locator) {
                    self.spawn_fetch(ticket);
                }
            }
            Command::Media(event) => {
                self.sync.on_media_event(event);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.sync.snapshot());
            }
        }
    }

    fn spawn_fetch(&self, ticket: LoadTicket) {
        let source = Arc::clone(&self.source);
        let fetched_tx = self.fetched_tx.clone();
        let cancel = ticket.cancel_token().clone();

        tokio::spawn(async move {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(locator = %ticket.locator(), "Pose sequence fetch superseded");
                    return;
                }
                result = source.fetch(ticket.locator()) => result.map_err(|e| e.to_string()),
            };
            let _ = fetched_tx.send(Fetched { ticket, result });
        });
    }

    fn publish(&self) {
        let next = self.sync.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
