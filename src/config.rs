use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use anyhow::{Context, Result};

use crate::ber::Version;
use crate::monitoring::MonitoringLayout;
use crate::session::SessionOptions;
use crate::transport::Target;

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub device:     DeviceConfig,
    #[serde(default)]
    pub polling:    PollingConfig,
    #[serde(default)]
    pub logging:    LoggingConfig,
    #[serde(default)]
    pub monitoring: MonitoringLayout,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    /// Instance name, prefixed to every reading in the log.
    #[serde(default = "default_name")]
    pub name: String,
    /// IP address or hostname of the receiver.
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Read community. Requests with a wrong community go unanswered.
    pub community: String,
    #[serde(default = "default_version")]
    pub version: Version,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct PollingConfig {
    // ── Cadence ───────────────────────────────────────────────────────────

    /// Seconds between monitoring polls. Minimum 10.
    pub data_interval_seconds: u64,

    /// Seconds between alarm table polls. Minimum 60.
    pub alarm_interval_seconds: u64,

    // ── Exchanges ─────────────────────────────────────────────────────────

    /// Per-attempt timeout for channel table and alarm walks.
    pub table_timeout_seconds: u64,

    /// Per-attempt timeout for the monitoring walk, which runs more often.
    pub monitoring_timeout_seconds: u64,

    /// Extra attempts after the first one times out.
    pub retries: u32,

    /// GetBulk batch size for table walks.
    pub table_max_repetitions: u32,

    /// GetBulk batch size for the monitoring walk.
    pub monitoring_max_repetitions: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            data_interval_seconds:      30,
            alarm_interval_seconds:     60,
            table_timeout_seconds:      10,
            monitoring_timeout_seconds: 3,
            retries:                    1,
            table_max_repetitions:      50,
            monitoring_max_repetitions: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// File where every log line is appended with a timestamp.
    #[serde(default)]
    pub log_file: Option<String>,
    /// Mirror log lines to stdout (same effect as --verbose CLI flag).
    #[serde(default)]
    pub verbose: bool,
    /// Also send log lines to the local syslog daemon.
    #[serde(default)]
    pub syslog: bool,
}

fn default_name()    -> String  { "DEVA4004".into() }
fn default_port()    -> u16     { 161 }
fn default_version() -> Version { Version::V2c }

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config TOML")
    }

    pub fn validate(&self) -> Result<()> {
        if self.device.host.trim().is_empty() {
            anyhow::bail!("device.host must not be empty");
        }
        if self.device.port == 0 {
            anyhow::bail!("device.port must be between 1 and 65535");
        }
        if self.device.community.is_empty() {
            anyhow::bail!("device.community must not be empty");
        }
        if self.polling.data_interval_seconds < 10 {
            anyhow::bail!("polling.data_interval_seconds must be >= 10 (got {})",
                self.polling.data_interval_seconds);
        }
        if self.polling.alarm_interval_seconds < 60 {
            anyhow::bail!("polling.alarm_interval_seconds must be >= 60 (got {})",
                self.polling.alarm_interval_seconds);
        }
        if self.polling.table_timeout_seconds == 0 || self.polling.monitoring_timeout_seconds == 0 {
            anyhow::bail!("polling timeouts must be > 0");
        }
        if self.polling.table_max_repetitions == 0 || self.polling.monitoring_max_repetitions == 0 {
            anyhow::bail!("polling max_repetitions must be > 0");
        }
        self.monitoring.validate().map_err(anyhow::Error::msg)?;
        Ok(())
    }

    pub fn target(&self) -> Target {
        Target { host: self.device.host.clone(), port: self.device.port }
    }

    /// Session settings for channel table and alarm walks.
    pub fn table_session(&self) -> SessionOptions {
        SessionOptions {
            version:         self.device.version,
            timeout:         Duration::from_secs(self.polling.table_timeout_seconds),
            retries:         self.polling.retries,
            max_repetitions: self.polling.table_max_repetitions,
        }
    }

    /// Session settings for the monitoring stream.
    pub fn monitoring_session(&self) -> SessionOptions {
        SessionOptions {
            version:         self.device.version,
            timeout:         Duration::from_secs(self.polling.monitoring_timeout_seconds),
            retries:         self.polling.retries,
            max_repetitions: self.polling.monitoring_max_repetitions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [device]
        host = "192.168.100.37"
        community = "DEVA4004"
    "#;

    #[test]
    fn minimal_config_gets_defaults() {
        let c = Config::parse(MINIMAL).unwrap();
        c.validate().unwrap();
        assert_eq!(c.device.port, 161);
        assert_eq!(c.device.version, Version::V2c);
        assert_eq!(c.polling.data_interval_seconds, 30);
        assert_eq!(c.table_session().max_repetitions, 50);
        assert_eq!(c.monitoring_session().max_repetitions, 5);
        assert_eq!(c.monitoring, MonitoringLayout::default());
    }

    #[test]
    fn full_config_parses() {
        let c = Config::parse(r#"
            [device]
            name = "Site A"
            host = "rx.example.net"
            port = 1161
            community = "public"
            version = "v1"

            [polling]
            data_interval_seconds = 15
            alarm_interval_seconds = 120
            retries = 2

            [logging]
            log_file = "/var/log/fm-monitor.log"
            verbose = true

            [monitoring]
            rds_ps = ".1.3.6.1.4.1.35833.10.3.20.0"
        "#).unwrap();
        c.validate().unwrap();
        assert_eq!(c.device.version, Version::V1);
        assert_eq!(c.polling.retries, 2);
        assert_eq!(c.polling.table_timeout_seconds, 10);
        assert_eq!(c.target().to_string(), "rx.example.net:1161");
        assert_eq!(c.logging.log_file.as_deref(), Some("/var/log/fm-monitor.log"));
        assert_eq!(c.monitoring.rds_ps.map(|o| o.to_string()).as_deref(), Some("1.3.6.1.4.1.35833.10.3.20.0"));
        assert_eq!(c.monitoring.rds_pi, None);
    }

    #[test]
    fn narrowed_monitoring_base_must_still_hold_every_member() {
        let c = Config::parse(
            "[device]\nhost = \"h\"\ncommunity = \"c\"\n[monitoring]\nbase = \".1.3.6.1.4.1.35833.10.4\"\n",
        )
        .unwrap();
        let err = c.validate().unwrap_err().to_string();
        assert!(err.contains("outside monitoring.base"), "{err}");
    }

    #[test]
    fn intervals_have_floors() {
        let mut c = Config::parse(MINIMAL).unwrap();
        c.polling.data_interval_seconds = 5;
        assert!(c.validate().unwrap_err().to_string().contains("data_interval_seconds"));
        c.polling.data_interval_seconds = 10;
        c.polling.alarm_interval_seconds = 59;
        assert!(c.validate().unwrap_err().to_string().contains("alarm_interval_seconds"));
    }

    #[test]
    fn rejects_unknown_keys_and_empty_community() {
        assert!(Config::parse("[device]\nhost = \"h\"\ncommunity = \"c\"\nbogus = 1\n").is_err());
        let c = Config::parse("[device]\nhost = \"h\"\ncommunity = \"\"\n").unwrap();
        assert!(c.validate().is_err());
    }

    #[test]
    fn bad_oid_in_layout_is_a_parse_error() {
        let err = Config::parse("[device]\nhost = \"h\"\ncommunity = \"c\"\n[monitoring]\nbase = \"1.x\"\n");
        assert!(err.is_err());
    }
}
