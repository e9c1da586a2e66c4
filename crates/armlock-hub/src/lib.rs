pub mod protocol;

use anyhow::{Context, Result};
use armlock_core::ArmbandEvent;
use protocol::EventParser;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

/// How the band's keep-unlocked timer is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockMode {
    /// Stay unlocked briefly, then re-lock on its own.
    Timed,
    /// Stay unlocked until an explicit lock request.
    Hold,
}

/// Commands sent to the hub's write task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HubCommand {
    Unlock(UnlockMode),
    Lock,
    NotifyUserAction,
}

/// Client for the local armband hub service.
///
/// Connects over TCP, parses the framed event stream in a background task,
/// and hands decoded events to the polling loop through a channel. Outgoing
/// device requests (unlock/lock/haptic) are fire-and-forget.
pub struct HubClient {
    event_rx: mpsc::UnboundedReceiver<ArmbandEvent>,
    command_tx: mpsc::UnboundedSender<HubCommand>,
    _task: tokio::task::JoinHandle<()>,
}

impl HubClient {
    /// Connect to the hub and start processing. `timeout` bounds the wait
    /// for a paired armband to appear; elapsing means no device was found.
    pub async fn connect(addr: &str, timeout: Duration) -> Result<Self> {
        tracing::info!(%addr, "Attempting to find an armband");

        let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| {
                anyhow::anyhow!("unable to find an armband (waited {}s)", timeout.as_secs())
            })?
            .with_context(|| format!("connecting to armband hub at {addr}"))?;

        tracing::info!("Armband connected");

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(hub_loop(stream, event_tx, command_rx));

        Ok(Self {
            event_rx,
            command_tx,
            _task: task,
        })
    }

    /// Drain the next pending event without blocking. `Ok(None)` means the
    /// queue is empty this tick; a closed hub connection is an error.
    pub fn try_next_event(&mut self) -> Result<Option<ArmbandEvent>> {
        match self.event_rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                Err(anyhow::anyhow!("armband hub connection closed"))
            }
        }
    }

    /// Request the band unlock in the given mode.
    pub fn unlock(&self, mode: UnlockMode) {
        let _ = self.command_tx.send(HubCommand::Unlock(mode));
    }

    /// Request the band re-lock now.
    pub fn lock(&self) {
        let _ = self.command_tx.send(HubCommand::Lock);
    }

    /// Ask the band to pulse its haptic, acknowledging a recognized pose.
    pub fn notify_user_action(&self) {
        let _ = self.command_tx.send(HubCommand::NotifyUserAction);
    }
}

/// Background task: read the socket, decode frames, publish events; relay
/// outgoing command frames.
async fn hub_loop(
    stream: TcpStream,
    event_tx: mpsc::UnboundedSender<ArmbandEvent>,
    mut command_rx: mpsc::UnboundedReceiver<HubCommand>,
) {
    let (mut reader, mut writer) = stream.into_split();
    let mut parser = EventParser::new();
    let mut buf = [0u8; 2048];

    loop {
        tokio::select! {
            result = reader.read(&mut buf) => {
                match result {
                    Ok(0) => {
                        tracing::warn!("Hub connection closed");
                        break;
                    }
                    Ok(n) => {
                        parser.push_data(&buf[..n]);

                        // Drain all complete frames.
                        while let Some(result) = parser.next_event() {
                            match result {
                                Ok(event) => {
                                    if event_tx.send(event).is_err() {
                                        return;
                                    }
                                }
                                Err(e) => {
                                    tracing::debug!(?e, "Skipping undecodable hub frame");
                                }
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(?e, "Hub read error");
                        break;
                    }
                }
            }
            Some(command) = command_rx.recv() => {
                let frame = protocol::encode_command(&command);
                if let Err(e) = writer.write_all(&frame).await {
                    tracing::error!(?e, "Hub write error");
                    break;
                }
            }
        }
    }
}
