// alarms.rs: fixed 50-slot alarm table
//
// Four alarm columns (RF, MPX, pilot, RDS) are walked independently and
// joined by position. The device always exposes 50 slots regardless of how
// many channels are configured; a short column fails the poll.

use crate::error::{Result, SnmpError};
use crate::oids;
use crate::session::{Session, WalkMode};
use crate::transport::Transport;

pub const ALARM_SLOTS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlarmSlot {
    pub alarm_rf: String,
    pub alarm_mpx: String,
    pub alarm_pilot: String,
    pub alarm_rds: String,
}

impl AlarmSlot {
    /// True when any of the four codes is non-zero.
    pub fn any_active(&self) -> bool {
        [&self.alarm_rf, &self.alarm_mpx, &self.alarm_pilot, &self.alarm_rds]
            .iter()
            .any(|code| code.trim() != "0")
    }
}

/// Alarm status of every slot, rebuilt from scratch each poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmTable(Box<[AlarmSlot; ALARM_SLOTS]>);

impl AlarmTable {
    pub fn slot(&self, index: usize) -> Option<&AlarmSlot> {
        self.0.get(index)
    }

    pub fn slots(&self) -> &[AlarmSlot; ALARM_SLOTS] {
        &self.0
    }
}

fn require(column: &'static str, values: &[String]) -> Result<()> {
    if values.len() < ALARM_SLOTS {
        return Err(SnmpError::AlarmWidth { column, len: values.len(), required: ALARM_SLOTS });
    }
    Ok(())
}

/// Join four alarm columns by position. Every column must reach 50 entries;
/// extra entries beyond slot 49 are ignored.
pub fn assemble_alarms(rf: Vec<String>, mpx: Vec<String>, pilot: Vec<String>, rds: Vec<String>) -> Result<AlarmTable> {
    require("alarm_rf", &rf)?;
    require("alarm_mpx", &mpx)?;
    require("alarm_pilot", &pilot)?;
    require("alarm_rds", &rds)?;

    let slots: Vec<AlarmSlot> = rf
        .into_iter()
        .zip(mpx)
        .zip(pilot)
        .zip(rds)
        .take(ALARM_SLOTS)
        .map(|(((alarm_rf, alarm_mpx), alarm_pilot), alarm_rds)| AlarmSlot {
            alarm_rf,
            alarm_mpx,
            alarm_pilot,
            alarm_rds,
        })
        .collect();
    let slots: Box<[AlarmSlot; ALARM_SLOTS]> = slots
        .into_boxed_slice()
        .try_into()
        .map_err(|s: Box<[AlarmSlot]>| SnmpError::AlarmWidth { column: "table", len: s.len(), required: ALARM_SLOTS })?;
    Ok(AlarmTable(slots))
}

/// Walk the four alarm columns and build the table. A failed walk is
/// reported in preference to the width check it would otherwise trip.
pub async fn poll_alarms<T: Transport>(session: &Session<T>) -> Result<AlarmTable> {
    let rf = session.walk(&oids::alarm_rf(), WalkMode::Partial).await;
    let mpx = session.walk(&oids::alarm_mpx(), WalkMode::Partial).await;
    let pilot = session.walk(&oids::alarm_pilot(), WalkMode::Partial).await;
    let rds = session.walk(&oids::alarm_rds(), WalkMode::Partial).await;

    let columns = [rf.column(), mpx.column(), pilot.column(), rds.column()];
    if let Some(e) = [rf.error, mpx.error, pilot.error, rds.error].into_iter().flatten().next() {
        return Err(e);
    }
    let [rf, mpx, pilot, rds] = columns;
    assemble_alarms(rf, mpx, pilot, rds)
}
