use std::path::PathBuf;

use serde::Deserialize;
use edgegate_core::error::{EdgeError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub flow: FlowSection,

    #[serde(default)]
    pub limits: LimitsSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            flow: FlowSection::default(),
            limits: LimitsSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(EdgeError::BadRequest(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.gateway.validate()?;
        self.flow.validate()?;
        self.limits.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    /// WebSocket + ops listener.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Optional raw length-framed TCP listener for clients.
    #[serde(default)]
    pub tcp_listen: Option<String>,

    #[serde(default = "default_control_addr")]
    pub control_addr: String,

    /// Initial local hostname; the master's snapshot replaces it.
    #[serde(default)]
    pub local_hostname: String,

    /// Disable the local datagram fast path entirely.
    #[serde(default)]
    pub tcp_only: bool,

    #[serde(default = "default_socket_dir")]
    pub socket_dir: PathBuf,

    #[serde(default = "default_pid_file")]
    pub pid_file: PathBuf,

    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,

    #[serde(default = "default_ws_ping_interval_ms")]
    pub ws_ping_interval_ms: u64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            tcp_listen: None,
            control_addr: default_control_addr(),
            local_hostname: String::new(),
            tcp_only: false,
            socket_dir: default_socket_dir(),
            pid_file: default_pid_file(),
            report_interval_ms: default_report_interval_ms(),
            ws_ping_interval_ms: default_ws_ping_interval_ms(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if self.control_addr.trim().is_empty() {
            return Err(EdgeError::BadRequest(
                "gateway.control_addr must not be empty".into(),
            ));
        }
        if !(1000..=600000).contains(&self.report_interval_ms) {
            return Err(EdgeError::BadRequest(
                "gateway.report_interval_ms must be between 1000 and 600000".into(),
            ));
        }
        if !(5000..=120000).contains(&self.ws_ping_interval_ms) {
            return Err(EdgeError::BadRequest(
                "gateway.ws_ping_interval_ms must be between 5000 and 120000".into(),
            ));
        }
        Ok(())
    }

    /// Reply socket path for the local datagram channel.
    pub fn local_socket_path(&self, pid: u32) -> PathBuf {
        self.socket_dir.join(format!("adapter_{pid}.sock"))
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_control_addr() -> String {
    "127.0.0.1:10088".into()
}
fn default_socket_dir() -> PathBuf {
    PathBuf::from("/tmp")
}
fn default_pid_file() -> PathBuf {
    PathBuf::from("./pid")
}
fn default_report_interval_ms() -> u64 {
    10000
}
fn default_ws_ping_interval_ms() -> u64 {
    20000
}

/// Per-connection backpressure.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowSection {
    #[serde(default)]
    pub enabled: bool,

    /// Requests a connection may queue while its flow lock is held.
    #[serde(default = "default_queue_limit")]
    pub queue_limit: usize,
}

impl Default for FlowSection {
    fn default() -> Self {
        Self {
            enabled: false,
            queue_limit: default_queue_limit(),
        }
    }
}

impl FlowSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=4096).contains(&self.queue_limit) {
            return Err(EdgeError::BadRequest(
                "flow.queue_limit must be between 1 and 4096".into(),
            ));
        }
        Ok(())
    }
}

fn default_queue_limit() -> usize {
    64
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsSection {
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    /// Outbound queue depth per client and per uplink writer.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            max_frame_bytes: default_max_frame_bytes(),
            outbound_queue: default_outbound_queue(),
        }
    }
}

impl LimitsSection {
    pub fn validate(&self) -> Result<()> {
        if !(256..=16 * 1024 * 1024).contains(&self.max_frame_bytes) {
            return Err(EdgeError::BadRequest(
                "limits.max_frame_bytes must be between 256 and 16777216".into(),
            ));
        }
        if self.outbound_queue == 0 {
            return Err(EdgeError::BadRequest(
                "limits.outbound_queue must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_max_frame_bytes() -> usize {
    10240
}
fn default_outbound_queue() -> usize {
    1024
}
