// oid.rs: object identifiers
//
// Arcs are kept as u64 like the BER decoder produces them. Ordering is the
// derived lexicographic ordering of the arc vector, which is exactly SNMP's
// walk order.

use std::fmt;
use std::str::FromStr;

use crate::error::SnmpError;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Oid(Vec<u64>);

impl Oid {
    pub fn from_slice(arcs: &[u64]) -> Self {
        Self(arcs.to_vec())
    }

    pub fn arcs(&self) -> &[u64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `self` lies strictly below `base` (the base itself is not
    /// part of its own subtree).
    pub fn is_descendant_of(&self, base: &Oid) -> bool {
        self.0.len() > base.0.len() && self.0.starts_with(&base.0)
    }

    /// Append arcs, returning a new identifier.
    pub fn child(&self, arcs: &[u64]) -> Oid {
        let mut v = self.0.clone();
        v.extend_from_slice(arcs);
        Oid(v)
    }
}

impl From<Vec<u64>> for Oid {
    fn from(arcs: Vec<u64>) -> Self {
        Self(arcs)
    }
}

impl FromStr for Oid {
    type Err = SnmpError;

    /// Accepts `1.3.6.1` and `.1.3.6.1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('.');
        if trimmed.is_empty() {
            return Err(SnmpError::InvalidOid(s.to_string()));
        }
        trimmed
            .split('.')
            .map(|arc| arc.parse::<u64>().map_err(|_| SnmpError::InvalidOid(s.to_string())))
            .collect::<Result<Vec<_>, _>>()
            .map(Oid)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}

impl<'de> serde::Deserialize<'de> for Oid {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
