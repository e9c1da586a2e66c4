use anyhow::Result;
use armlock_config::AppConfig;
use armlock_core::{ArmbandEvent, GestureLatch, LockCommand, OrientationDiscretizer, Pose};
use armlock_hub::{HubClient, UnlockMode};
use armlock_serial::ActuatorPort;
use std::time::Duration;
use tracing::{error, info, warn};

/// Gesture evaluation cadence: poll the hub 20 times a second.
const TICK: Duration = Duration::from_millis(50);

/// State owned by the polling loop: the latest discretized orientation,
/// the latest pose label, and the gesture latch. Mutated only from the
/// loop task, so one tick is atomic with respect to latch transitions.
struct Bridge {
    discretizer: OrientationDiscretizer,
    latch: GestureLatch,
    pose: Pose,
}

impl Bridge {
    fn new() -> Self {
        Self {
            discretizer: OrientationDiscretizer::new(),
            latch: GestureLatch::new(),
            pose: Pose::Unknown,
        }
    }

    /// Apply one hub event. Pose changes also drive the band's unlock
    /// policy: an actionable pose keeps it unlocked and pings the wearer,
    /// rest hands control back to the timed lock.
    fn apply(&mut self, event: ArmbandEvent, hub: &HubClient) {
        match event {
            ArmbandEvent::Orientation(quat) => {
                self.discretizer.update(quat);
            }
            ArmbandEvent::Pose(pose) => {
                self.pose = pose;
                if pose.is_actionable() {
                    hub.unlock(UnlockMode::Hold);
                    hub.notify_user_action();
                    info!(pose = pose.as_str(), "Pose changed");
                } else {
                    hub.unlock(UnlockMode::Timed);
                }
            }
            ArmbandEvent::ArmSync(arm) => {
                self.latch.on_arm_sync();
                info!(?arm, "Arm synced");
            }
            ArmbandEvent::ArmUnsync => {
                self.latch.on_arm_unsync();
                info!("Arm unsynced");
            }
            ArmbandEvent::Unpair => {
                self.latch.on_unpair();
                self.discretizer.reset();
                self.pose = Pose::Unknown;
                info!("Armband unpaired");
            }
            ArmbandEvent::Unlocked => self.latch.on_unlock(),
            ArmbandEvent::Locked => self.latch.on_lock(),
        }
    }

    /// Query the latch once for this tick.
    fn poll(&mut self) -> Option<LockCommand> {
        self.latch.tick(self.pose, self.discretizer.current().roll)
    }
}

/// Drive the 20 Hz loop: drain pending hub events, evaluate the latch, and
/// perform at most one actuator write per tick.
async fn run(mut hub: HubClient, mut actuator: ActuatorPort) -> Result<()> {
    let mut bridge = Bridge::new();
    let mut ticker = tokio::time::interval(TICK);

    loop {
        ticker.tick().await;

        while let Some(event) = hub.try_next_event()? {
            bridge.apply(event, &hub);
        }

        if let Some(command) = bridge.poll() {
            info!(
                command = command.as_str(),
                band_unlocked = bridge.latch.is_unlocked(),
                "Rotation complete"
            );
            actuator.send(command).await?;
        }
    }
}

/// Report a fatal error and wait for the operator to acknowledge it before
/// exiting non-zero.
fn fail(err: anyhow::Error) -> ! {
    error!("{err:#}");
    eprintln!("Error: {err:#}");
    eprint!("Press enter to exit.");
    let _ = std::io::stdin().read_line(&mut String::new());
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "armlock=info,armlock_hub=info,armlock_serial=info".into()),
        )
        .init();

    info!("Armband door-lock bridge starting");

    let config = armlock_config::load_config().unwrap_or_else(|e| {
        warn!(?e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // The actuator opens first: with no sink ready there is nothing for
    // the gesture loop to drive.
    let actuator = match ActuatorPort::open(&config.serial.port, config.serial.baud) {
        Ok(port) => port,
        Err(e) => fail(e),
    };

    let timeout = Duration::from_millis(config.hub.connect_timeout_ms);
    let hub = match HubClient::connect(&config.hub.addr, timeout).await {
        Ok(hub) => hub,
        Err(e) => fail(e),
    };

    if let Err(e) = run(hub, actuator).await {
        fail(e);
    }
}
