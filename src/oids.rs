//! Object identifiers exposed by the monitoring receiver.
//!
//! Enterprise OID: 1.3.6.1.4.1.35833 (DEVA Broadcast), product branch .10.

use crate::oid::Oid;

/// .1.3.6.1.4.1.35833.10
const BASE: &[u64] = &[1, 3, 6, 1, 4, 1, 35833, 10];

fn under(tail: &[u64]) -> Oid {
    Oid::from_slice(BASE).child(tail)
}

// -- Identity (.1.*) --

pub fn firmware_version() -> Oid {
    under(&[1, 1, 0])
}
pub fn serial_number() -> Oid {
    under(&[1, 2, 0])
}

// -- Channel table (.2.5.2.1.*) --

fn channel_column(leaf: u64) -> Oid {
    under(&[2, 5, 2, 1, leaf])
}

pub fn channel_index() -> Oid {
    channel_column(1)
}
pub fn channel_active() -> Oid {
    channel_column(2)
}
pub fn channel_frequency() -> Oid {
    channel_column(3)
}
pub fn channel_name() -> Oid {
    channel_column(4)
}
pub fn channel_acq_time() -> Oid {
    channel_column(5)
}

// -- Live monitoring, overridable through configuration --
//
// The measurement scalars are split across .3 and .4, so the default walk
// root is the product branch itself. RDS PI/PS/RT have no known identifier.

pub fn monitoring_base() -> Oid {
    Oid::from_slice(BASE)
}

pub fn monitor_frequency() -> Oid {
    under(&[4, 13, 0])
}
pub fn monitor_rf() -> Oid {
    under(&[4, 1, 0])
}
pub fn monitor_mpx() -> Oid {
    under(&[4, 2, 0])
}
pub fn monitor_left() -> Oid {
    under(&[4, 3, 0])
}
pub fn monitor_pilot() -> Oid {
    under(&[3, 15, 0])
}
pub fn monitor_rds() -> Oid {
    under(&[3, 18, 0])
}
pub fn monitor_right() -> Oid {
    under(&[3, 24, 0])
}

// -- Alarm table (.4.14.1.*) --

fn alarm_column(leaf: u64) -> Oid {
    under(&[4, 14, 1, leaf])
}

pub fn alarm_rf() -> Oid {
    alarm_column(2)
}
pub fn alarm_mpx() -> Oid {
    alarm_column(3)
}
pub fn alarm_pilot() -> Oid {
    alarm_column(5)
}
pub fn alarm_rds() -> Oid {
    alarm_column(6)
}
