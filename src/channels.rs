// channels.rs: channel topology from the receiver's channel table
//
// The table arrives as five independently walked columns. They are joined by
// position: entry i of every column describes channel slot i. Firmware and
// serial number are device-wide and repeated onto every record.

use crate::ber::Value;
use crate::error::{Result, SnmpError};
use crate::oids;
use crate::session::{Session, Walk, WalkMode};
use crate::transport::Transport;

/// Active-state code of an administratively disabled channel.
pub const DISABLED: &str = "4";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRecord {
    pub name: String,
    pub active: String,
    pub frequency: String,
    pub channel_number: String,
    pub acq_time: String,
    pub fw_version: Option<String>,
    pub serial_number: Option<String>,
}

impl ChannelRecord {
    pub fn is_disabled(&self) -> bool {
        self.active.trim() == DISABLED
    }

    /// Key under which this channel's live metrics are accumulated.
    pub fn frequency_key(&self) -> &str {
        self.frequency.trim()
    }

    /// Frequency in MHz; the device reports kHz.
    pub fn frequency_mhz(&self) -> Option<f64> {
        self.frequency.trim().parse::<f64>().ok().map(|khz| khz / 1000.0)
    }

    /// Zero-based position in the alarm table.
    pub fn slot(&self) -> Option<usize> {
        self.channel_number.trim().parse().ok()
    }
}

/// The five per-channel columns, each as walked.
#[derive(Debug)]
pub struct ChannelColumns {
    pub name: Walk,
    pub active: Walk,
    pub frequency: Walk,
    pub channel_number: Walk,
    pub acq_time: Walk,
}

/// Records plus every error met while acquiring them. Records may be present
/// alongside errors; the caller decides whether partial data is usable.
#[derive(Debug, Default)]
pub struct ChannelTable {
    pub records: Vec<ChannelRecord>,
    pub errors: Vec<SnmpError>,
}

impl ChannelTable {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Channels that are not administratively disabled.
    pub fn enabled(&self) -> impl Iterator<Item = &ChannelRecord> {
        self.records.iter().filter(|r| !r.is_disabled())
    }
}

fn scalar(res: Result<Value>, errors: &mut Vec<SnmpError>) -> Option<String> {
    match res {
        Ok(v) => Some(v.to_string()),
        Err(e) => {
            errors.push(e);
            None
        }
    }
}

/// Zip already-fetched columns into records.
pub fn build_channel_table(columns: ChannelColumns, firmware: Result<Value>, serial: Result<Value>) -> ChannelTable {
    let mut errors = Vec::new();
    let mut take = |walk: Walk| {
        let values = walk.column();
        if let Some(e) = walk.error {
            errors.push(e);
        }
        values
    };
    let name = take(columns.name);
    let active = take(columns.active);
    let frequency = take(columns.frequency);
    let channel_number = take(columns.channel_number);
    let acq_time = take(columns.acq_time);
    let fw_version = scalar(firmware, &mut errors);
    let serial_number = scalar(serial, &mut errors);

    let lens = [
        ("name", name.len()),
        ("active", active.len()),
        ("frequency", frequency.len()),
        ("channel_number", channel_number.len()),
        ("acq_time", acq_time.len()),
    ];
    if lens.iter().any(|&(_, n)| n != name.len()) {
        let detail = lens
            .iter()
            .map(|(label, n)| format!("{}={}", label, n))
            .collect::<Vec<_>>()
            .join(" ");
        errors.push(SnmpError::ColumnMismatch(detail));
        return ChannelTable { records: Vec::new(), errors };
    }

    let records = name
        .into_iter()
        .zip(active)
        .zip(frequency)
        .zip(channel_number)
        .zip(acq_time)
        .map(|((((name, active), frequency), channel_number), acq_time)| ChannelRecord {
            name,
            active,
            frequency,
            channel_number,
            acq_time,
            fw_version: fw_version.clone(),
            serial_number: serial_number.clone(),
        })
        .collect();
    ChannelTable { records, errors }
}

/// Walk the channel table and identity scalars, then build records.
pub async fn fetch_channel_table<T: Transport>(session: &Session<T>, mode: WalkMode) -> ChannelTable {
    let columns = ChannelColumns {
        name: session.walk(&oids::channel_name(), mode).await,
        active: session.walk(&oids::channel_active(), mode).await,
        frequency: session.walk(&oids::channel_frequency(), mode).await,
        channel_number: session.walk(&oids::channel_index(), mode).await,
        acq_time: session.walk(&oids::channel_acq_time(), mode).await,
    };
    let firmware = session.get(&oids::firmware_version()).await;
    let serial = session.get(&oids::serial_number()).await;
    build_channel_table(columns, firmware, serial)
}
