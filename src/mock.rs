// mock.rs: in-process agent for tests
//
// Answers real encoded requests from an ordered OID table, the way a device
// agent would: Get, GetNext and GetBulk, v1 and v2c error conventions.
// Faults can be injected per test.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, Mutex};

use crate::ber::{decode_message, encode_message, Message, Pdu, PduKind, Value, VarBind, Version};
use crate::error::{ErrorStatus, Result, SnmpError};
use crate::monitoring::MonitoringLayout;
use crate::oid::Oid;
use crate::oids;
use crate::transport::Transport;

/// Monitoring layout of a firmware that reports the frequency marker ahead
/// of its metrics (.3.1.0 first, then .3.N.0).
pub fn monitoring_layout() -> MonitoringLayout {
    let at = |leaf: u64| oids::monitoring_base().child(&[3, leaf, 0]);
    MonitoringLayout {
        base: oids::monitoring_base(),
        frequency: at(1),
        rf_level: at(2),
        mpx_level: at(3),
        pilot_level: at(15),
        rds_level: at(18),
        left_level: at(23),
        right_level: at(24),
        rds_pi: Some(at(19)),
        rds_ps: Some(at(20)),
        rds_rt: Some(at(21)),
    }
}

#[derive(Default)]
struct State {
    table: BTreeMap<Oid, Value>,
    exchanges: usize,
    fail_after: Option<usize>,
    error_on: Option<Oid>,
}

#[derive(Clone)]
pub struct MockAgent {
    community: String,
    state: Arc<Mutex<State>>,
}

impl MockAgent {
    pub fn new(community: &str) -> Self {
        Self { community: community.to_string(), state: Arc::default() }
    }

    pub fn with(self, oid: &str, value: Value) -> Self {
        self.state.lock().unwrap().table.insert(oid.parse().unwrap(), value);
        self
    }

    /// Table column: `base.1`, `base.2`, ... holding the given strings.
    pub fn column_text(self, base: &str, values: &[&str]) -> Self {
        self.column(base, values.iter().map(|v| Value::text(*v)))
    }

    pub fn column_int(self, base: &str, values: &[i64]) -> Self {
        self.column(base, values.iter().map(|v| Value::Integer(*v)))
    }

    fn column(self, base: &str, values: impl Iterator<Item = Value>) -> Self {
        let base: Oid = base.parse().unwrap();
        {
            let mut st = self.state.lock().unwrap();
            for (i, v) in values.enumerate() {
                st.table.insert(base.child(&[i as u64 + 1]), v);
            }
        }
        self
    }

    /// Every exchange after the first `n` times out.
    pub fn fail_after(self, n: usize) -> Self {
        self.state.lock().unwrap().fail_after = Some(n);
        self
    }

    /// Responses that would include `oid` come back as genErr.
    pub fn error_on(self, oid: &str) -> Self {
        self.state.lock().unwrap().error_on = Some(oid.parse().unwrap());
        self
    }

    pub fn remove(&self, oid: &str) {
        let oid: Oid = oid.parse().unwrap();
        self.state.lock().unwrap().table.remove(&oid);
    }

    pub fn exchanges(&self) -> usize {
        self.state.lock().unwrap().exchanges
    }

    fn respond(&self, request: &[u8]) -> Result<Vec<u8>> {
        let mut st = self.state.lock().unwrap();
        st.exchanges += 1;
        let timeout = || SnmpError::Timeout { target: "mock".into(), attempts: 1 };
        if st.fail_after.is_some_and(|n| st.exchanges > n) {
            return Err(timeout());
        }
        let req = decode_message(request)?;
        if req.community != self.community {
            return Err(timeout());
        }
        let v1 = req.version == Version::V1;
        let oids: Vec<Oid> = req.pdu.varbinds.iter().map(|vb| vb.oid.clone()).collect();

        let mut error_status = 0;
        let mut error_index = 0;
        let mut varbinds = Vec::new();
        match req.pdu.kind {
            PduKind::Get => {
                for (i, oid) in oids.iter().enumerate() {
                    match st.table.get(oid) {
                        Some(v) => varbinds.push(VarBind::new(oid.clone(), v.clone())),
                        None if v1 => {
                            error_status = ErrorStatus::NoSuchName.code();
                            error_index = i as i64 + 1;
                            break;
                        }
                        None => varbinds.push(VarBind::new(oid.clone(), Value::NoSuchObject)),
                    }
                }
            }
            PduKind::GetNext => {
                for (i, oid) in oids.iter().enumerate() {
                    match next_after(&st.table, oid) {
                        Some(vb) => varbinds.push(vb),
                        None if v1 => {
                            error_status = ErrorStatus::NoSuchName.code();
                            error_index = i as i64 + 1;
                            break;
                        }
                        None => varbinds.push(VarBind::new(oid.clone(), Value::EndOfMibView)),
                    }
                }
            }
            PduKind::GetBulk => {
                let max_repetitions = req.pdu.error_index.max(0) as usize;
                for oid in &oids {
                    let mut cursor = oid.clone();
                    for _ in 0..max_repetitions {
                        match next_after(&st.table, &cursor) {
                            Some(vb) => {
                                cursor = vb.oid.clone();
                                varbinds.push(vb);
                            }
                            None => {
                                varbinds.push(VarBind::new(cursor.clone(), Value::EndOfMibView));
                                break;
                            }
                        }
                    }
                }
            }
            PduKind::Response => return Err(SnmpError::Decode("agent received a Response".into())),
        }

        if let Some(bad) = &st.error_on {
            if varbinds.iter().any(|vb| &vb.oid == bad) {
                error_status = ErrorStatus::GenErr.code();
                error_index = 1;
                varbinds = req.pdu.varbinds.clone();
            }
        }
        if error_status != 0 {
            varbinds = req.pdu.varbinds.clone();
        }

        Ok(encode_message(&Message {
            version: req.version,
            community: req.community,
            pdu: Pdu {
                kind: PduKind::Response,
                request_id: req.pdu.request_id,
                error_status,
                error_index,
                varbinds,
            },
        }))
    }
}

fn next_after(table: &BTreeMap<Oid, Value>, oid: &Oid) -> Option<VarBind> {
    table
        .range((Bound::Excluded(oid.clone()), Bound::Unbounded))
        .next()
        .map(|(o, v)| VarBind::new(o.clone(), v.clone()))
}

impl Transport for MockAgent {
    async fn exchange(&self, _request_id: i32, request: &[u8]) -> Result<Vec<u8>> {
        self.respond(request)
    }

    fn peer(&self) -> String {
        "mock".into()
    }
}
