use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Serial link to the door-lock actuator.
    pub serial: SerialConfig,
    /// Local armband hub service.
    pub hub: HubConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            hub: HubConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Port the actuator's Bluetooth serial bridge enumerates on.
    pub port: String,
    /// Line speed the actuator firmware expects.
    pub baud: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "COM6".to_string(),
            baud: 9600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Address the hub service listens on.
    pub addr: String,
    /// How long to wait for the hub to produce a paired armband.
    pub connect_timeout_ms: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:10138".to_string(),
            connect_timeout_ms: 10_000,
        }
    }
}
