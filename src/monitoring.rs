// monitoring.rs: per-frequency live metrics, accumulated across polls
//
// The monitoring group is walked as one stream in which a "current frequency"
// binding is followed by the metric bindings measured on that frequency.
// Bindings are routed through a table keyed by identifier; each metric is
// written as a single field of the record for the current frequency.
//
// The map is owned by the caller and reused every poll. Records are created
// on first sight of a frequency, updated field by field afterwards, and never
// removed here.

use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};
use serde::Deserialize;

use crate::ber::{Value, VarBind};
use crate::error::{Result, SnmpError};
use crate::oid::Oid;
use crate::oids;
use crate::session::Session;
use crate::transport::Transport;

// ── Fixed point ─────────────────────────────────────────────────────────────

/// 8.8 fixed point (units and 256ths) to a level rounded to one decimal,
/// ties to even: 64 (0.25) reads 0.2, 320 (1.25) reads 1.2.
pub fn fr8p8(raw: i64) -> f64 {
    (raw as f64 / 256.0 * 10.0).round_ties_even() / 10.0
}

/// Level from a binding value: integer types directly, strings parsed.
pub fn level_from(value: &Value) -> Result<f64> {
    if let Some(raw) = value.as_i64() {
        return Ok(fr8p8(raw));
    }
    let text = value.to_string();
    text.trim()
        .parse::<i64>()
        .map(fr8p8)
        .map_err(|_| SnmpError::FixedPoint(text))
}

// ── Fields ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricField {
    RfLevel,
    MpxLevel,
    PilotLevel,
    RdsLevel,
    LeftLevel,
    RightLevel,
    RdsPi,
    RdsPs,
    RdsRt,
}

impl MetricField {
    pub const ALL: [MetricField; 9] = [
        Self::RfLevel,
        Self::MpxLevel,
        Self::PilotLevel,
        Self::RdsLevel,
        Self::LeftLevel,
        Self::RightLevel,
        Self::RdsPi,
        Self::RdsPs,
        Self::RdsRt,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::RfLevel => "rf_level",
            Self::MpxLevel => "mpx_level",
            Self::PilotLevel => "pilot_level",
            Self::RdsLevel => "rds_level",
            Self::LeftLevel => "left_level",
            Self::RightLevel => "right_level",
            Self::RdsPi => "rds_pi",
            Self::RdsPs => "rds_ps",
            Self::RdsRt => "rds_rt",
        }
    }

    pub fn unit(self) -> Option<&'static str> {
        match self {
            Self::RfLevel => Some("dBµV"),
            Self::MpxLevel | Self::PilotLevel | Self::RdsLevel => Some("kHz"),
            Self::LeftLevel | Self::RightLevel => Some("dB"),
            Self::RdsPi | Self::RdsPs | Self::RdsRt => None,
        }
    }

    /// Fixed-point level, as opposed to opaque RDS text.
    pub fn is_level(self) -> bool {
        self.unit().is_some()
    }

    fn decode(self, value: &Value) -> Result<MetricValue> {
        if self.is_level() {
            level_from(value).map(MetricValue::Level)
        } else {
            Ok(MetricValue::Text(value.to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Level(f64),
    Text(String),
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Level(v) => write!(f, "{:.1}", v),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Latest known metrics of one frequency. A field stays `None` until the
/// device has reported it at least once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricRecord {
    pub rf_level: Option<f64>,
    pub mpx_level: Option<f64>,
    pub pilot_level: Option<f64>,
    pub rds_level: Option<f64>,
    pub left_level: Option<f64>,
    pub right_level: Option<f64>,
    pub rds_pi: Option<String>,
    pub rds_ps: Option<String>,
    pub rds_rt: Option<String>,
}

impl MetricRecord {
    pub fn get(&self, field: MetricField) -> Option<MetricValue> {
        let level = |v: &Option<f64>| v.map(MetricValue::Level);
        let text = |v: &Option<String>| v.clone().map(MetricValue::Text);
        match field {
            MetricField::RfLevel => level(&self.rf_level),
            MetricField::MpxLevel => level(&self.mpx_level),
            MetricField::PilotLevel => level(&self.pilot_level),
            MetricField::RdsLevel => level(&self.rds_level),
            MetricField::LeftLevel => level(&self.left_level),
            MetricField::RightLevel => level(&self.right_level),
            MetricField::RdsPi => text(&self.rds_pi),
            MetricField::RdsPs => text(&self.rds_ps),
            MetricField::RdsRt => text(&self.rds_rt),
        }
    }

    fn set(&mut self, field: MetricField, value: MetricValue) {
        match (field, value) {
            (MetricField::RfLevel, MetricValue::Level(v)) => self.rf_level = Some(v),
            (MetricField::MpxLevel, MetricValue::Level(v)) => self.mpx_level = Some(v),
            (MetricField::PilotLevel, MetricValue::Level(v)) => self.pilot_level = Some(v),
            (MetricField::RdsLevel, MetricValue::Level(v)) => self.rds_level = Some(v),
            (MetricField::LeftLevel, MetricValue::Level(v)) => self.left_level = Some(v),
            (MetricField::RightLevel, MetricValue::Level(v)) => self.right_level = Some(v),
            (MetricField::RdsPi, MetricValue::Text(s)) => self.rds_pi = Some(s),
            (MetricField::RdsPs, MetricValue::Text(s)) => self.rds_ps = Some(s),
            (MetricField::RdsRt, MetricValue::Text(s)) => self.rds_rt = Some(s),
            (field, value) => debug!("{} cannot hold {:?}", field.name(), value),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Frequency key → latest metrics.
pub type MetricsMap = BTreeMap<String, MetricRecord>;

// ── Identifier layout ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct MonitoringLayout {
    /// Root of the monitoring walk; every member must sit below it.
    pub base: Oid,
    pub frequency: Oid,
    pub rf_level: Oid,
    pub mpx_level: Oid,
    pub pilot_level: Oid,
    pub rds_level: Oid,
    pub left_level: Oid,
    pub right_level: Oid,
    /// RDS text fields are only routed once configured.
    pub rds_pi: Option<Oid>,
    pub rds_ps: Option<Oid>,
    pub rds_rt: Option<Oid>,
}

impl Default for MonitoringLayout {
    fn default() -> Self {
        Self {
            base: oids::monitoring_base(),
            frequency: oids::monitor_frequency(),
            rf_level: oids::monitor_rf(),
            mpx_level: oids::monitor_mpx(),
            pilot_level: oids::monitor_pilot(),
            rds_level: oids::monitor_rds(),
            left_level: oids::monitor_left(),
            right_level: oids::monitor_right(),
            rds_pi: None,
            rds_ps: None,
            rds_rt: None,
        }
    }
}

impl MonitoringLayout {
    fn metric_oid(&self, field: MetricField) -> Option<&Oid> {
        match field {
            MetricField::RfLevel => Some(&self.rf_level),
            MetricField::MpxLevel => Some(&self.mpx_level),
            MetricField::PilotLevel => Some(&self.pilot_level),
            MetricField::RdsLevel => Some(&self.rds_level),
            MetricField::LeftLevel => Some(&self.left_level),
            MetricField::RightLevel => Some(&self.right_level),
            MetricField::RdsPi => self.rds_pi.as_ref(),
            MetricField::RdsPs => self.rds_ps.as_ref(),
            MetricField::RdsRt => self.rds_rt.as_ref(),
        }
    }

    /// Every configured member must sit inside the base subtree, and no two
    /// members may share an identifier.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let mut seen: HashMap<&Oid, &str> = HashMap::new();
        let members = std::iter::once(("frequency", &self.frequency)).chain(
            MetricField::ALL
                .iter()
                .filter_map(|&f| self.metric_oid(f).map(|oid| (f.name(), oid))),
        );
        for (name, oid) in members {
            if !oid.is_descendant_of(&self.base) {
                return Err(format!("monitoring.{} ({}) is outside monitoring.base ({})", name, oid, self.base));
            }
            if let Some(other) = seen.insert(oid, name) {
                return Err(format!("monitoring.{} and monitoring.{} share {}", other, name, oid));
            }
        }
        Ok(())
    }
}

// ── Accumulator ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Frequency,
    Metric(MetricField),
}

/// Counters of one accumulation pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassStats {
    pub applied: usize,
    pub skipped: usize,
    pub new_frequencies: usize,
    /// Frequency markers seen, valid or not.
    pub markers: usize,
    /// Metric rows dropped because no frequency marker preceded them.
    pub orphaned: usize,
}

pub struct Monitor {
    base: Oid,
    frequency: Oid,
    routes: HashMap<Oid, Route>,
}

impl Monitor {
    pub fn new(layout: &MonitoringLayout) -> Self {
        let mut routes = HashMap::with_capacity(MetricField::ALL.len() + 1);
        routes.insert(layout.frequency.clone(), Route::Frequency);
        for field in MetricField::ALL {
            if let Some(oid) = layout.metric_oid(field) {
                routes.insert(oid.clone(), Route::Metric(field));
            }
        }
        Self { base: layout.base.clone(), frequency: layout.frequency.clone(), routes }
    }

    pub fn base(&self) -> &Oid {
        &self.base
    }

    /// Walk the monitoring subtree once and merge what arrives into `map`.
    ///
    /// Rows carrying an exception or an undecodable value are logged and
    /// skipped. Updates applied before a transport or agent failure are kept;
    /// the failure is returned so the caller can flag the cycle.
    pub async fn poll_pass<T: Transport>(&self, session: &Session<T>, map: &mut MetricsMap) -> Result<PassStats> {
        let mut pass = Pass::default();
        let res = session
            .walk_each(&self.base, |vb| {
                pass.apply(self, map, vb);
                Ok(())
            })
            .await;
        let stats = pass.stats;
        match res {
            Ok(rows) => {
                debug!(
                    "monitoring poll: {} rows, {} applied, {} skipped, {} new frequencies, {} tracked",
                    rows,
                    stats.applied,
                    stats.skipped,
                    stats.new_frequencies,
                    map.len()
                );
                if stats.markers == 0 {
                    warn!(
                        "monitoring walk of {} ({} rows) never reported the frequency marker {}; {} metric rows dropped",
                        self.base, rows, self.frequency, stats.orphaned
                    );
                }
                Ok(stats)
            }
            Err(e) => {
                warn!("monitoring poll aborted after {} updates: {}", stats.applied, e);
                Err(e)
            }
        }
    }

    /// [`Monitor::poll_pass`], handing back the caller's map.
    pub async fn poll<'m, T: Transport>(
        &self,
        session: &Session<T>,
        map: &'m mut MetricsMap,
    ) -> Result<&'m mut MetricsMap> {
        self.poll_pass(session, map).await?;
        Ok(map)
    }
}

#[derive(Default)]
struct Pass {
    cursor: Option<String>,
    stats: PassStats,
}

impl Pass {
    fn apply(&mut self, monitor: &Monitor, map: &mut MetricsMap, vb: VarBind) {
        let Some(&route) = monitor.routes.get(&vb.oid) else {
            return;
        };
        if route == Route::Frequency {
            self.stats.markers += 1;
        }
        if let Some(kind) = vb.value.exception() {
            warn!("monitoring row {} skipped: {}", vb.oid, kind);
            self.stats.skipped += 1;
            if route == Route::Frequency {
                self.cursor = None;
            }
            return;
        }
        match route {
            Route::Frequency => {
                let key = vb.value.to_string().trim().to_string();
                if !map.contains_key(&key) {
                    map.insert(key.clone(), MetricRecord::default());
                    self.stats.new_frequencies += 1;
                }
                self.cursor = Some(key);
            }
            Route::Metric(field) => {
                let Some(key) = self.cursor.as_ref() else {
                    debug!("{} before any frequency marker, ignored", field.name());
                    self.stats.orphaned += 1;
                    return;
                };
                match field.decode(&vb.value) {
                    Ok(value) => {
                        map.entry(key.clone()).or_default().set(field, value);
                        self.stats.applied += 1;
                    }
                    Err(e) => {
                        warn!("monitoring row {} for {} skipped: {}", field.name(), key, e);
                        self.stats.skipped += 1;
                    }
                }
            }
        }
    }
}

/// Poll the monitoring stream into the caller's map.
pub async fn poll_monitoring<'m, T: Transport>(
    session: &Session<T>,
    layout: &MonitoringLayout,
    map: &'m mut MetricsMap,
) -> Result<&'m mut MetricsMap> {
    Monitor::new(layout).poll(session, map).await
}
