// poller.rs: channel discovery, both poll streams and reporting
//
// Owns everything that outlives one poll: the channel topology found at
// startup, the accumulated metrics map and the last good alarm table. Each
// stream keeps an availability flag for its latest cycle.

use anyhow::Result;
use log::{info, warn};

use crate::alarms::{poll_alarms, AlarmSlot, AlarmTable};
use crate::channels::{fetch_channel_table, ChannelRecord};
use crate::config::Config;
use crate::monitoring::{MetricField, MetricRecord, MetricValue, MetricsMap, Monitor, MonitoringLayout};
use crate::session::{Session, WalkMode};
use crate::transport::{Transport, UdpTransport};

// ── Readings ────────────────────────────────────────────────────────────────

/// What is currently known about one enabled channel.
#[derive(Debug)]
pub struct ChannelReading<'a> {
    pub channel: &'a ChannelRecord,
    /// `None` when the data stream is unavailable or the frequency has not
    /// been reported yet.
    pub metrics: Option<&'a MetricRecord>,
    /// `None` when the alarm stream is unavailable.
    pub alarm:   Option<&'a AlarmSlot>,
}

impl ChannelReading<'_> {
    pub fn metric(&self, field: MetricField) -> Option<MetricValue> {
        self.metrics.and_then(|m| m.get(field))
    }

    /// One-line summary, e.g. `Radio 1 (ch 1, 91.5 MHz) rf_level=45.2 dBµV ...`.
    pub fn summary(&self) -> String {
        let ch = self.channel;
        let mut line = format!(
            "{} (ch {}, {} MHz)",
            ch.name,
            ch.slot().map(|s| (s + 1).to_string()).unwrap_or_else(|| ch.channel_number.clone()),
            ch.frequency_mhz().map(|f| format!("{}", f)).unwrap_or_else(|| ch.frequency.clone()),
        );
        if self.metrics.is_none() {
            line.push_str(" metrics unavailable");
        }
        for field in MetricField::ALL {
            if let Some(v) = self.metric(field) {
                match field.unit() {
                    Some(unit) => line.push_str(&format!(" {}={} {}", field.name(), v, unit)),
                    None       => line.push_str(&format!(" {}=\"{}\"", field.name(), v)),
                }
            }
        }
        match self.alarm {
            Some(a) => line.push_str(&format!(
                " alarms rf={} mpx={} pilot={} rds={}",
                a.alarm_rf, a.alarm_mpx, a.alarm_pilot, a.alarm_rds
            )),
            None => line.push_str(" alarms unavailable"),
        }
        line
    }
}

// ── Manager ─────────────────────────────────────────────────────────────────

pub struct PollManager<T> {
    name:               String,
    table_session:      Session<T>,
    monitoring_session: Session<T>,
    monitor:            Monitor,
    channels:           Vec<ChannelRecord>,
    /// Reused across every monitoring poll; never replaced.
    metrics:            MetricsMap,
    alarms:             Option<AlarmTable>,
    data_available:     bool,
}

impl PollManager<UdpTransport> {
    pub fn from_config(config: &Config) -> Self {
        let community = &config.device.community;
        Self::new(
            &config.device.name,
            Session::udp(config.target(), community, &config.table_session()),
            Session::udp(config.target(), community, &config.monitoring_session()),
            &config.monitoring,
        )
    }
}

impl<T: Transport> PollManager<T> {
    pub fn new(
        name: &str,
        table_session: Session<T>,
        monitoring_session: Session<T>,
        layout: &MonitoringLayout,
    ) -> Self {
        Self {
            name: name.to_string(),
            table_session,
            monitoring_session,
            monitor: Monitor::new(layout),
            channels: Vec::new(),
            metrics: MetricsMap::new(),
            alarms: None,
            data_available: false,
        }
    }

    // ── Discovery ───────────────────────────────────────────────────────────

    /// Read the channel table. Any error aborts discovery with the device's
    /// messages unchanged, so nothing is set up from partial topology.
    pub async fn discover(&mut self) -> Result<usize> {
        let table = fetch_channel_table(&self.table_session, WalkMode::Strict).await;
        if !table.errors.is_empty() {
            let msgs: Vec<String> = table.errors.iter().map(|e| e.to_string()).collect();
            anyhow::bail!("{}", msgs.join("; "));
        }
        if table.records.is_empty() {
            anyhow::bail!("No data in the device");
        }

        for ch in &table.records {
            info!(
                "[{}] channel {} '{}' {} kHz{}",
                self.name,
                ch.channel_number,
                ch.name,
                ch.frequency,
                if ch.is_disabled() { " (disabled, skipped)" } else { "" }
            );
        }
        if let Some(first) = table.records.first() {
            info!(
                "[{}] firmware {} serial {}",
                self.name,
                first.fw_version.as_deref().unwrap_or("?"),
                first.serial_number.as_deref().unwrap_or("?")
            );
        }
        self.channels = table.records;
        Ok(self.enabled().count())
    }

    pub fn channels(&self) -> &[ChannelRecord] {
        &self.channels
    }

    fn enabled(&self) -> impl Iterator<Item = &ChannelRecord> {
        self.channels.iter().filter(|c| !c.is_disabled())
    }

    // ── Streams ─────────────────────────────────────────────────────────────

    /// One monitoring poll. Accumulated records survive a failed cycle; the
    /// stream is just marked unavailable until the next good one. A walk that
    /// never reports the frequency marker counts as failed.
    pub async fn poll_data(&mut self) -> bool {
        match self.monitor.poll_pass(&self.monitoring_session, &mut self.metrics).await {
            Ok(stats) if stats.markers == 0 => {
                warn!("[{}] data stream unavailable: no frequency marker in the monitoring walk", self.name);
                self.data_available = false;
            }
            Ok(_) => {
                if !self.data_available {
                    info!("[{}] data stream available ({} frequencies)", self.name, self.metrics.len());
                }
                self.data_available = true;
            }
            Err(e) => {
                warn!("[{}] data stream unavailable: {}", self.name, e);
                self.data_available = false;
            }
        }
        self.data_available
    }

    /// One alarm poll. A failed cycle drops the previous table instead of
    /// letting it pass for current.
    pub async fn poll_alarms(&mut self) -> bool {
        match poll_alarms(&self.table_session).await {
            Ok(table) => {
                if self.alarms.is_none() {
                    info!("[{}] alarm stream available", self.name);
                }
                self.alarms = Some(table);
            }
            Err(e) => {
                warn!("[{}] alarm stream unavailable: {}", self.name, e);
                self.alarms = None;
            }
        }
        self.alarms.is_some()
    }

    pub fn data_available(&self) -> bool {
        self.data_available
    }

    pub fn alarms_available(&self) -> bool {
        self.alarms.is_some()
    }

    pub fn metrics(&self) -> &MetricsMap {
        &self.metrics
    }

    // ── Reporting ───────────────────────────────────────────────────────────

    /// Readings for every enabled channel, joined on frequency (metrics) and
    /// channel index (alarms).
    pub fn readings(&self) -> Vec<ChannelReading<'_>> {
        self.enabled()
            .map(|channel| ChannelReading {
                channel,
                metrics: if self.data_available {
                    self.metrics.get(channel.frequency_key())
                } else {
                    None
                },
                alarm: self
                    .alarms
                    .as_ref()
                    .zip(channel.slot())
                    .and_then(|(table, slot)| table.slot(slot)),
            })
            .collect()
    }

    pub fn report(&self) {
        for r in self.readings() {
            info!("[{}] {}", self.name, r.summary());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::{Value, Version};
    use crate::mock::{self, MockAgent};

    fn device() -> MockAgent {
        let layout = mock::monitoring_layout();
        let mut rf = vec![0i64; 50];
        rf[1] = 2;
        MockAgent::new("DEVA4004")
            .with("1.3.6.1.4.1.35833.10.1.1.0", Value::text("v1"))
            .with("1.3.6.1.4.1.35833.10.1.2.0", Value::text("SN1"))
            .column_int("1.3.6.1.4.1.35833.10.2.5.2.1.1", &[0, 1, 2])
            .column_int("1.3.6.1.4.1.35833.10.2.5.2.1.2", &[0, 0, 4])
            .column_int("1.3.6.1.4.1.35833.10.2.5.2.1.3", &[915, 1000, 1005])
            .column_text("1.3.6.1.4.1.35833.10.2.5.2.1.4", &["A", "B", "C"])
            .column_int("1.3.6.1.4.1.35833.10.2.5.2.1.5", &[1, 2, 3])
            .with(&layout.frequency.to_string(), Value::Integer(1000))
            .with(&layout.rf_level.to_string(), Value::Integer(11_571))
            .column_int("1.3.6.1.4.1.35833.10.4.14.1.2", &rf)
            .column_int("1.3.6.1.4.1.35833.10.4.14.1.3", &[0; 50])
            .column_int("1.3.6.1.4.1.35833.10.4.14.1.5", &[0; 50])
            .column_int("1.3.6.1.4.1.35833.10.4.14.1.6", &[0; 50])
    }

    fn manager_with(agent: MockAgent, layout: &MonitoringLayout) -> PollManager<MockAgent> {
        PollManager::new(
            "Site",
            Session::new(agent.clone(), "DEVA4004", Version::V2c, 50),
            Session::new(agent, "DEVA4004", Version::V2c, 5),
            layout,
        )
    }

    fn manager(agent: MockAgent) -> PollManager<MockAgent> {
        manager_with(agent, &mock::monitoring_layout())
    }

    #[tokio::test]
    async fn discovery_skips_disabled_channels() {
        let mut m = manager(device());
        assert_eq!(m.discover().await.unwrap(), 2);
        assert_eq!(m.channels().len(), 3);
        let names: Vec<&str> = m.readings().iter().map(|r| r.channel.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[tokio::test]
    async fn discovery_failure_reports_the_error_verbatim() {
        let mut m = manager(device().fail_after(0));
        let err = m.discover().await.unwrap_err().to_string();
        assert!(err.starts_with("no response from mock"), "{err}");
    }

    #[tokio::test]
    async fn readings_join_metrics_by_frequency_and_alarms_by_slot() {
        let agent = device();
        let mut m = manager(agent);
        m.discover().await.unwrap();
        assert!(m.poll_data().await);
        assert!(m.poll_alarms().await);

        let readings = m.readings();
        let b = &readings[1];
        // 11571 / 256 = 45.199...
        assert_eq!(b.metric(MetricField::RfLevel), Some(MetricValue::Level(45.2)));
        assert_eq!(b.alarm.unwrap().alarm_rf, "2");
        assert!(b.summary().contains("rf_level=45.2 dBµV"));
        assert!(b.summary().contains("(ch 2, 1 MHz)"));

        let a = &readings[0];
        assert!(a.metrics.is_none());
        assert_eq!(a.alarm.unwrap().alarm_rf, "0");
    }

    #[tokio::test]
    async fn failed_cycles_mark_streams_unavailable_but_keep_metrics() {
        let agent = device();
        let mut m = manager(agent.clone());
        m.discover().await.unwrap();
        assert!(m.poll_data().await);
        assert!(m.poll_alarms().await);

        agent.remove("1.3.6.1.4.1.35833.10.4.14.1.6.50");
        assert!(!m.poll_alarms().await);
        assert!(m.readings()[0].alarm.is_none());
        assert!(m.readings()[0].summary().ends_with("alarms unavailable"));

        // Shared state: every later exchange on `agent` times out.
        let _ = agent.clone().fail_after(agent.exchanges());
        assert!(!m.poll_data().await);
        assert!(!m.data_available());
        assert_eq!(m.metrics().len(), 1);
        assert!(m.readings().iter().all(|r| r.metrics.is_none()));
    }

    #[tokio::test]
    async fn walk_without_the_marker_is_not_available_data() {
        // The device answers, but nothing sits at the default marker.
        let mut m = manager_with(device(), &MonitoringLayout::default());
        m.discover().await.unwrap();
        assert!(!m.poll_data().await);
        assert!(!m.data_available());
        assert!(m.metrics().is_empty());
        assert!(m.readings().iter().all(|r| r.metrics.is_none()));
    }
}
