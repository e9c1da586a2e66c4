use anyhow::{Context, Result};
use armlock_core::LockCommand;
use tokio::io::AsyncWriteExt;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

/// One-way serial link to the door-lock actuator.
///
/// Commands go out as single ASCII lines; nothing is ever read back, so a
/// successful write is the end of the story.
pub struct ActuatorPort {
    stream: SerialStream,
}

impl ActuatorPort {
    /// Open the actuator's serial port. Failing here means the sink is not
    /// ready and the gesture loop must not start.
    pub fn open(path: &str, baud: u32) -> Result<Self> {
        let stream = tokio_serial::new(path, baud)
            .open_native_async()
            .with_context(|| format!("serial port {path} is not ready"))?;

        tracing::info!(port = path, baud, "Actuator port open");
        Ok(Self { stream })
    }

    /// Write one command line, fire-and-forget.
    pub async fn send(&mut self, command: LockCommand) -> Result<()> {
        let line = format!("{}\n", command.as_str());
        self.stream
            .write_all(line.as_bytes())
            .await
            .context("writing to the actuator")?;
        tracing::debug!(command = command.as_str(), "Command written to actuator");
        Ok(())
    }
}
