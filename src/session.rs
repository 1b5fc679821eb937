// session.rs: scalar fetch and subtree walk over a transport
//
// A Session carries the community, protocol version and batch size. It holds
// no socket; every request goes through a fresh transport exchange.

use std::time::Duration;

use log::debug;

use crate::ber::{self, Message, Pdu, PduKind, Value, VarBind, Version};
use crate::error::{ErrorStatus, Result, SnmpError};
use crate::oid::Oid;
use crate::transport::{alloc_request_id, Target, Transport, UdpTransport};

/// Connection settings shared by every exchange of one poll stream.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub version: Version,
    pub timeout: Duration,
    pub retries: u32,
    pub max_repetitions: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            version: Version::V2c,
            timeout: Duration::from_secs(10),
            retries: 1,
            max_repetitions: 50,
        }
    }
}

/// Whether a failed walk keeps what it collected before the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkMode {
    /// Values collected before the error are returned with it.
    Partial,
    /// Any error empties the result.
    Strict,
}

/// Outcome of a subtree walk: values in ascending identifier order plus the
/// error that ended it early, if any.
#[derive(Debug)]
pub struct Walk {
    pub varbinds: Vec<VarBind>,
    pub error: Option<SnmpError>,
}

impl Walk {
    /// Values rendered as text, in walk order.
    pub fn column(&self) -> Vec<String> {
        self.varbinds.iter().map(|vb| vb.value.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.varbinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.varbinds.is_empty()
    }

    pub fn into_result(self) -> Result<Vec<VarBind>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.varbinds),
        }
    }
}

pub struct Session<T> {
    transport: T,
    community: String,
    version: Version,
    max_repetitions: u32,
}

impl Session<UdpTransport> {
    pub fn udp(target: Target, community: &str, opts: &SessionOptions) -> Self {
        let transport = UdpTransport::new(target, opts.timeout, opts.retries);
        Self::new(transport, community, opts.version, opts.max_repetitions)
    }
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, community: &str, version: Version, max_repetitions: u32) -> Self {
        assert!(max_repetitions > 0, "max_repetitions must be positive");
        Self {
            transport,
            community: community.to_string(),
            version,
            max_repetitions,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// One request/response round trip. Agent error-status becomes an error.
    async fn request(&self, pdu: Pdu) -> Result<Pdu> {
        let request_id = pdu.request_id;
        let sent_oids: Vec<Oid> = pdu.varbinds.iter().map(|vb| vb.oid.clone()).collect();
        let bytes = ber::encode_message(&Message {
            version: self.version,
            community: self.community.clone(),
            pdu,
        });
        let raw = self.transport.exchange(request_id, &bytes).await?;
        let reply = ber::decode_message(&raw)?.pdu;

        if reply.kind != PduKind::Response {
            return Err(SnmpError::Decode(format!("expected Response PDU, got {:?}", reply.kind)));
        }
        if let Some(status) = ErrorStatus::from_code(reply.error_status) {
            let index = u32::try_from(reply.error_index).unwrap_or(0);
            let oid = (index as usize)
                .checked_sub(1)
                .and_then(|i| sent_oids.get(i).cloned());
            return Err(SnmpError::Agent { status, index, oid });
        }
        Ok(reply)
    }

    /// Fetch a single value.
    pub async fn get(&self, oid: &Oid) -> Result<Value> {
        let reply = self.request(Pdu::get(alloc_request_id(), std::slice::from_ref(oid))).await?;
        let vb = reply
            .varbinds
            .into_iter()
            .next()
            .ok_or_else(|| SnmpError::Decode(format!("empty response for {}", oid)))?;
        if let Some(kind) = vb.value.exception() {
            return Err(SnmpError::Exception { oid: vb.oid, kind });
        }
        Ok(vb.value)
    }

    /// Walk every identifier strictly below `base`, handing each binding to
    /// `visit` as it arrives. Stops at the first binding outside the subtree
    /// (which is not visited), at endOfMibView, or when `visit` fails.
    ///
    /// Bindings already visited stay visited when the walk fails.
    pub async fn walk_each<F>(&self, base: &Oid, mut visit: F) -> Result<usize>
    where
        F: FnMut(VarBind) -> Result<()>,
    {
        let mut cursor = base.clone();
        let mut count = 0;
        loop {
            let id = alloc_request_id();
            let pdu = match self.version {
                Version::V2c => Pdu::get_bulk(id, 0, self.max_repetitions, std::slice::from_ref(&cursor)),
                Version::V1 => Pdu::get_next(id, std::slice::from_ref(&cursor)),
            };
            let reply = match self.request(pdu).await {
                Ok(reply) => reply,
                // v1 agents signal the end of the MIB view this way.
                Err(SnmpError::Agent { status: ErrorStatus::NoSuchName, .. }) if self.version == Version::V1 => {
                    break;
                }
                Err(e) => return Err(e),
            };
            if reply.varbinds.is_empty() {
                break;
            }
            for vb in reply.varbinds {
                if vb.value == Value::EndOfMibView || !vb.oid.is_descendant_of(base) {
                    debug!("walk {}: {} bindings", base, count);
                    return Ok(count);
                }
                if vb.oid <= cursor {
                    return Err(SnmpError::NotIncreasing { previous: cursor, got: vb.oid });
                }
                cursor = vb.oid.clone();
                visit(vb)?;
                count += 1;
            }
        }
        debug!("walk {}: {} bindings", base, count);
        Ok(count)
    }

    /// Collect a subtree. Exception values inside the subtree end the walk
    /// with an error rather than being passed off as data.
    pub async fn walk(&self, base: &Oid, mode: WalkMode) -> Walk {
        let mut varbinds = Vec::new();
        let res = self
            .walk_each(base, |vb| {
                if let Some(kind) = vb.value.exception() {
                    return Err(SnmpError::Exception { oid: vb.oid, kind });
                }
                varbinds.push(vb);
                Ok(())
            })
            .await;
        match res {
            Ok(_) => Walk { varbinds, error: None },
            Err(e) => {
                if mode == WalkMode::Strict {
                    varbinds.clear();
                }
                Walk { varbinds, error: Some(e) }
            }
        }
    }
}

impl<T: Transport> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("peer", &self.transport.peer())
            .field("version", &self.version)
            .field("max_repetitions", &self.max_repetitions)
            .finish()
    }
}
