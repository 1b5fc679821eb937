// error.rs: acquisition error taxonomy
//
// Three classes: transport (the exchange itself failed), agent (the device
// answered with an error status) and structural (the data arrived but cannot
// be shaped into records without inventing values).

use thiserror::Error;

use crate::oid::Oid;

#[derive(Debug, Error)]
pub enum SnmpError {
    // ── Transport ───────────────────────────────────────────────────────────
    #[error("cannot resolve {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("no address found for {host}:{port}")]
    NoAddress { host: String, port: u16 },

    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no response from {target} after {attempts} attempt(s)")]
    Timeout { target: String, attempts: u32 },

    #[error("malformed response: {0}")]
    Decode(String),

    // ── Agent ───────────────────────────────────────────────────────────────
    #[error("agent returned {status} at index {index}{}", oid_suffix(.oid))]
    Agent {
        status: ErrorStatus,
        index: u32,
        oid: Option<Oid>,
    },

    #[error("{kind} for {oid}")]
    Exception { oid: Oid, kind: &'static str },

    #[error("agent returned {got} which does not follow {previous}")]
    NotIncreasing { previous: Oid, got: Oid },

    // ── Structural ──────────────────────────────────────────────────────────
    #[error("column length mismatch: {0}")]
    ColumnMismatch(String),

    #[error("alarm column {column} has {len} entries, {required} required")]
    AlarmWidth {
        column: &'static str,
        len: usize,
        required: usize,
    },

    #[error("'{0}' is not a fixed-point level")]
    FixedPoint(String),

    #[error("invalid object identifier '{0}'")]
    InvalidOid(String),
}

fn oid_suffix(oid: &Option<Oid>) -> String {
    oid.as_ref().map(|o| format!(" ({})", o)).unwrap_or_default()
}

impl SnmpError {
    /// Transport-level failure (engine side), as opposed to an agent or
    /// structural error.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Resolve { .. } | Self::NoAddress { .. } | Self::Io(_) | Self::Timeout { .. } | Self::Decode(_)
        )
    }

    pub fn is_agent(&self) -> bool {
        matches!(self, Self::Agent { .. } | Self::Exception { .. } | Self::NotIncreasing { .. })
    }
}

/// PDU error-status values (RFC 3416 §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStatus {
    TooBig,
    NoSuchName,
    BadValue,
    ReadOnly,
    GenErr,
    NoAccess,
    Other(i64),
}

impl ErrorStatus {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => None,
            1 => Some(Self::TooBig),
            2 => Some(Self::NoSuchName),
            3 => Some(Self::BadValue),
            4 => Some(Self::ReadOnly),
            5 => Some(Self::GenErr),
            6 => Some(Self::NoAccess),
            n => Some(Self::Other(n)),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::TooBig => 1,
            Self::NoSuchName => 2,
            Self::BadValue => 3,
            Self::ReadOnly => 4,
            Self::GenErr => 5,
            Self::NoAccess => 6,
            Self::Other(n) => n,
        }
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooBig => f.write_str("tooBig"),
            Self::NoSuchName => f.write_str("noSuchName"),
            Self::BadValue => f.write_str("badValue"),
            Self::ReadOnly => f.write_str("readOnly"),
            Self::GenErr => f.write_str("genErr"),
            Self::NoAccess => f.write_str("noAccess"),
            Self::Other(n) => write!(f, "error-status {}", n),
        }
    }
}

pub type Result<T, E = SnmpError> = std::result::Result<T, E>;
