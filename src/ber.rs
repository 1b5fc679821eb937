// ber.rs: SNMP v1/v2c message codec
//
// Pure functions only: no state, no I/O.
// Encodes request PDUs and decodes responses into variable bindings. The same
// decoder accepts request PDUs, which the test agent relies on.

use std::fmt;

use crate::error::{Result, SnmpError};
use crate::oid::Oid;

// ── Tags ────────────────────────────────────────────────────────────────────

const TAG_INTEGER: u8 = 0x02;
const TAG_OCTET_STRING: u8 = 0x04;
const TAG_NULL: u8 = 0x05;
const TAG_OID: u8 = 0x06;
const TAG_SEQUENCE: u8 = 0x30;
const TAG_IP_ADDRESS: u8 = 0x40;
const TAG_COUNTER32: u8 = 0x41;
const TAG_GAUGE32: u8 = 0x42;
const TAG_TIMETICKS: u8 = 0x43;
const TAG_OPAQUE: u8 = 0x44;
const TAG_COUNTER64: u8 = 0x46;
const TAG_NO_SUCH_OBJECT: u8 = 0x80;
const TAG_NO_SUCH_INSTANCE: u8 = 0x81;
const TAG_END_OF_MIB_VIEW: u8 = 0x82;

// ── Message model ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Version {
    V1,
    V2c,
}

impl Version {
    fn code(self) -> i64 {
        match self {
            Self::V1 => 0,
            Self::V2c => 1,
        }
    }

    fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Self::V1),
            1 => Ok(Self::V2c),
            n => Err(SnmpError::Decode(format!("unsupported SNMP version {}", n))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PduKind {
    Get,
    GetNext,
    Response,
    GetBulk,
}

impl PduKind {
    fn tag(self) -> u8 {
        match self {
            Self::Get => 0xa0,
            Self::GetNext => 0xa1,
            Self::Response => 0xa2,
            Self::GetBulk => 0xa5,
        }
    }

    fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0xa0 => Ok(Self::Get),
            0xa1 => Ok(Self::GetNext),
            0xa2 => Ok(Self::Response),
            0xa5 => Ok(Self::GetBulk),
            t => Err(SnmpError::Decode(format!("unsupported PDU tag 0x{:02x}", t))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    OctetString(Vec<u8>),
    Null,
    ObjectId(Oid),
    IpAddress([u8; 4]),
    Counter32(u32),
    Gauge32(u32),
    TimeTicks(u32),
    Opaque(Vec<u8>),
    Counter64(u64),
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
}

impl Value {
    /// Name of the v2c exception carried in place of a value, if any.
    pub fn exception(&self) -> Option<&'static str> {
        match self {
            Self::NoSuchObject => Some("noSuchObject"),
            Self::NoSuchInstance => Some("noSuchInstance"),
            Self::EndOfMibView => Some("endOfMibView"),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Integer(n) => Some(n),
            Self::Counter32(n) | Self::Gauge32(n) | Self::TimeTicks(n) => Some(n as i64),
            Self::Counter64(n) => i64::try_from(n).ok(),
            _ => None,
        }
    }

    pub fn text<S: Into<String>>(s: S) -> Self {
        Self::OctetString(s.into().into_bytes())
    }
}

/// Renders the value the way management tools print it: numbers in decimal,
/// printable strings verbatim, anything else as hex.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::OctetString(bytes) => match printable(bytes) {
                Some(s) => f.write_str(s),
                None => write_hex(f, bytes),
            },
            Self::Null => Ok(()),
            Self::ObjectId(oid) => write!(f, "{}", oid),
            Self::IpAddress([a, b, c, d]) => write!(f, "{}.{}.{}.{}", a, b, c, d),
            Self::Counter32(n) | Self::Gauge32(n) | Self::TimeTicks(n) => write!(f, "{}", n),
            Self::Opaque(bytes) => write_hex(f, bytes),
            Self::Counter64(n) => write!(f, "{}", n),
            Self::NoSuchObject | Self::NoSuchInstance | Self::EndOfMibView => {
                f.write_str(self.exception().unwrap_or_default())
            }
        }
    }
}

fn printable(bytes: &[u8]) -> Option<&str> {
    let s = std::str::from_utf8(bytes).ok()?;
    let ok = s
        .chars()
        .all(|c| !c.is_control() || c == '\n' || c == '\r' || c == '\t');
    ok.then_some(s)
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_str("0x")?;
    for b in bytes {
        write!(f, "{:02x}", b)?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarBind {
    pub oid: Oid,
    pub value: Value,
}

impl VarBind {
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// Request binding: identifier with a NULL placeholder value.
    pub fn null(oid: Oid) -> Self {
        Self { oid, value: Value::Null }
    }
}

/// One PDU. For GetBulk the two middle integers are non-repeaters and
/// max-repetitions instead of error-status and error-index; they share the
/// same wire slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Pdu {
    pub kind: PduKind,
    pub request_id: i32,
    pub error_status: i64,
    pub error_index: i64,
    pub varbinds: Vec<VarBind>,
}

impl Pdu {
    pub fn get(request_id: i32, oids: &[Oid]) -> Self {
        Self::request(PduKind::Get, request_id, oids)
    }

    pub fn get_next(request_id: i32, oids: &[Oid]) -> Self {
        Self::request(PduKind::GetNext, request_id, oids)
    }

    pub fn get_bulk(request_id: i32, non_repeaters: u32, max_repetitions: u32, oids: &[Oid]) -> Self {
        Self {
            error_status: non_repeaters as i64,
            error_index: max_repetitions as i64,
            ..Self::request(PduKind::GetBulk, request_id, oids)
        }
    }

    fn request(kind: PduKind, request_id: i32, oids: &[Oid]) -> Self {
        Self {
            kind,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds: oids.iter().cloned().map(VarBind::null).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub version: Version,
    pub community: String,
    pub pdu: Pdu,
}

// ── Encoding ────────────────────────────────────────────────────────────────

fn push_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

fn push_tlv(out: &mut Vec<u8>, tag: u8, content: &[u8]) {
    out.push(tag);
    push_length(out, content.len());
    out.extend_from_slice(content);
}

/// Minimal two's-complement encoding.
fn integer_bytes(n: i64) -> Vec<u8> {
    let bytes = n.to_be_bytes();
    let mut start = 0;
    while start < 7 {
        let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xff && bytes[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}

fn unsigned_bytes(n: u64) -> Vec<u8> {
    let bytes = n.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count().min(7);
    let mut out = Vec::with_capacity(9);
    if bytes[skip] & 0x80 != 0 {
        out.push(0);
    }
    out.extend_from_slice(&bytes[skip..]);
    out
}

fn push_base128(out: &mut Vec<u8>, mut v: u64) {
    let mut tmp = [0u8; 10];
    let mut i = tmp.len();
    loop {
        i -= 1;
        tmp[i] = (v & 0x7f) as u8;
        v >>= 7;
        if v == 0 {
            break;
        }
    }
    let last = tmp.len() - 1;
    for (j, b) in tmp.iter().enumerate().skip(i) {
        out.push(if j == last { *b } else { *b | 0x80 });
    }
}

fn oid_bytes(oid: &Oid) -> Vec<u8> {
    let arcs = oid.arcs();
    let mut out = Vec::with_capacity(arcs.len() + 4);
    match arcs {
        [] => {}
        [first] => push_base128(&mut out, first * 40),
        [first, second, rest @ ..] => {
            push_base128(&mut out, first * 40 + second);
            for &arc in rest {
                push_base128(&mut out, arc);
            }
        }
    }
    out
}

fn push_value(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(n) => push_tlv(out, TAG_INTEGER, &integer_bytes(*n)),
        Value::OctetString(b) => push_tlv(out, TAG_OCTET_STRING, b),
        Value::Null => push_tlv(out, TAG_NULL, &[]),
        Value::ObjectId(oid) => push_tlv(out, TAG_OID, &oid_bytes(oid)),
        Value::IpAddress(ip) => push_tlv(out, TAG_IP_ADDRESS, ip),
        Value::Counter32(n) => push_tlv(out, TAG_COUNTER32, &unsigned_bytes(*n as u64)),
        Value::Gauge32(n) => push_tlv(out, TAG_GAUGE32, &unsigned_bytes(*n as u64)),
        Value::TimeTicks(n) => push_tlv(out, TAG_TIMETICKS, &unsigned_bytes(*n as u64)),
        Value::Opaque(b) => push_tlv(out, TAG_OPAQUE, b),
        Value::Counter64(n) => push_tlv(out, TAG_COUNTER64, &unsigned_bytes(*n)),
        Value::NoSuchObject => push_tlv(out, TAG_NO_SUCH_OBJECT, &[]),
        Value::NoSuchInstance => push_tlv(out, TAG_NO_SUCH_INSTANCE, &[]),
        Value::EndOfMibView => push_tlv(out, TAG_END_OF_MIB_VIEW, &[]),
    }
}

pub fn encode_message(msg: &Message) -> Vec<u8> {
    let mut vbl = Vec::new();
    for vb in &msg.pdu.varbinds {
        let mut body = Vec::new();
        push_tlv(&mut body, TAG_OID, &oid_bytes(&vb.oid));
        push_value(&mut body, &vb.value);
        push_tlv(&mut vbl, TAG_SEQUENCE, &body);
    }

    let mut pdu = Vec::new();
    push_tlv(&mut pdu, TAG_INTEGER, &integer_bytes(msg.pdu.request_id as i64));
    push_tlv(&mut pdu, TAG_INTEGER, &integer_bytes(msg.pdu.error_status));
    push_tlv(&mut pdu, TAG_INTEGER, &integer_bytes(msg.pdu.error_index));
    push_tlv(&mut pdu, TAG_SEQUENCE, &vbl);

    let mut body = Vec::new();
    push_tlv(&mut body, TAG_INTEGER, &integer_bytes(msg.version.code()));
    push_tlv(&mut body, TAG_OCTET_STRING, msg.community.as_bytes());
    push_tlv(&mut body, msg.pdu.kind.tag(), &pdu);

    let mut out = Vec::with_capacity(body.len() + 4);
    push_tlv(&mut out, TAG_SEQUENCE, &body);
    out
}

// ── ASN.1 BER helpers ───────────────────────────────────────────────────────

/// (tag, content length, header length) of the TLV at `offset`.
fn read_asn1_header(data: &[u8], offset: usize) -> Option<(u8, usize, usize)> {
    let tag = *data.get(offset)?;
    let len_byte = *data.get(offset + 1)?;
    if len_byte < 0x80 {
        return Some((tag, len_byte as usize, 2));
    }
    let n = (len_byte & 0x7f) as usize;
    if n == 0 || n > std::mem::size_of::<usize>() {
        return None;
    }
    let bytes = data.get(offset + 2..offset + 2 + n)?;
    let len = bytes.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize);
    Some((tag, len, 2 + n))
}

fn read_header(data: &[u8], offset: usize, ctx: &str) -> Result<(u8, usize, usize)> {
    read_asn1_header(data, offset)
        .ok_or_else(|| SnmpError::Decode(format!("truncated ASN.1 at '{}' offset {}", ctx, offset)))
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn is_done(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Next TLV: (tag, content).
    fn tlv(&mut self, ctx: &str) -> Result<(u8, &'a [u8])> {
        let (tag, len, h) = read_header(self.data, self.pos, ctx)?;
        let start = self.pos + h;
        let end = start
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| SnmpError::Decode(format!("'{}' overruns its container", ctx)))?;
        let content = &self.data[start..end];
        self.pos = end;
        Ok((tag, content))
    }

    fn expect(&mut self, want: u8, ctx: &str) -> Result<&'a [u8]> {
        let (tag, content) = self.tlv(ctx)?;
        if tag != want {
            return Err(SnmpError::Decode(format!(
                "expected tag 0x{:02x} for '{}', got 0x{:02x}",
                want, ctx, tag
            )));
        }
        Ok(content)
    }

    fn integer(&mut self, ctx: &str) -> Result<i64> {
        let content = self.expect(TAG_INTEGER, ctx)?;
        parse_integer(content, ctx)
    }
}

fn parse_integer(bytes: &[u8], ctx: &str) -> Result<i64> {
    if bytes.is_empty() || bytes.len() > 8 {
        return Err(SnmpError::Decode(format!("bad INTEGER length {} at '{}'", bytes.len(), ctx)));
    }
    let init = if bytes[0] & 0x80 != 0 { -1i64 } else { 0 };
    Ok(bytes.iter().fold(init, |acc, &b| (acc << 8) | b as i64))
}

fn parse_unsigned(bytes: &[u8], ctx: &str) -> Result<u64> {
    let trimmed = match bytes {
        [0, rest @ ..] if !rest.is_empty() => rest,
        b => b,
    };
    if trimmed.is_empty() || trimmed.len() > 8 {
        return Err(SnmpError::Decode(format!("bad unsigned length {} at '{}'", bytes.len(), ctx)));
    }
    Ok(trimmed.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
}

fn parse_u32(bytes: &[u8], ctx: &str) -> Result<u32> {
    let n = parse_unsigned(bytes, ctx)?;
    u32::try_from(n).map_err(|_| SnmpError::Decode(format!("{} exceeds 32 bits at '{}'", n, ctx)))
}

fn parse_oid_bytes(bytes: &[u8]) -> Result<Oid> {
    if bytes.is_empty() {
        return Ok(Oid::default());
    }
    let mut arcs = Vec::with_capacity(bytes.len() + 1);
    let mut val = 0u64;
    let mut first = true;
    for (i, &b) in bytes.iter().enumerate() {
        if val > (u64::MAX >> 7) {
            return Err(SnmpError::Decode("OID arc overflow".into()));
        }
        val = (val << 7) | (b & 0x7f) as u64;
        if b & 0x80 != 0 {
            if i + 1 == bytes.len() {
                return Err(SnmpError::Decode("OID ends mid-arc".into()));
            }
            continue;
        }
        if first {
            let (a, b) = if val < 80 { (val / 40, val % 40) } else { (2, val - 80) };
            arcs.push(a);
            arcs.push(b);
            first = false;
        } else {
            arcs.push(val);
        }
        val = 0;
    }
    Ok(Oid::from(arcs))
}

fn parse_value(tag: u8, content: &[u8]) -> Result<Value> {
    Ok(match tag {
        TAG_INTEGER => Value::Integer(parse_integer(content, "INTEGER value")?),
        TAG_OCTET_STRING => Value::OctetString(content.to_vec()),
        TAG_NULL => Value::Null,
        TAG_OID => Value::ObjectId(parse_oid_bytes(content)?),
        TAG_IP_ADDRESS => {
            let ip: [u8; 4] = content
                .try_into()
                .map_err(|_| SnmpError::Decode(format!("IpAddress of {} bytes", content.len())))?;
            Value::IpAddress(ip)
        }
        TAG_COUNTER32 => Value::Counter32(parse_u32(content, "Counter32")?),
        TAG_GAUGE32 => Value::Gauge32(parse_u32(content, "Gauge32")?),
        TAG_TIMETICKS => Value::TimeTicks(parse_u32(content, "TimeTicks")?),
        TAG_OPAQUE => Value::Opaque(content.to_vec()),
        TAG_COUNTER64 => Value::Counter64(parse_unsigned(content, "Counter64")?),
        TAG_NO_SUCH_OBJECT => Value::NoSuchObject,
        TAG_NO_SUCH_INSTANCE => Value::NoSuchInstance,
        TAG_END_OF_MIB_VIEW => Value::EndOfMibView,
        t => return Err(SnmpError::Decode(format!("unsupported value tag 0x{:02x}", t))),
    })
}

// ── Message parser ──────────────────────────────────────────────────────────

/// Decode a raw UDP payload into a message.
pub fn decode_message(data: &[u8]) -> Result<Message> {
    let mut outer = Reader::new(data);
    let body = outer.expect(TAG_SEQUENCE, "outer SEQUENCE")?;

    let mut r = Reader::new(body);
    let version = Version::from_code(r.integer("version")?)?;
    let community = String::from_utf8_lossy(r.expect(TAG_OCTET_STRING, "community")?).into_owned();
    let (pdu_tag, pdu_body) = r.tlv("PDU")?;
    let kind = PduKind::from_tag(pdu_tag)?;

    let mut p = Reader::new(pdu_body);
    let request_id = p.integer("request-id")?;
    let request_id = i32::try_from(request_id)
        .map_err(|_| SnmpError::Decode(format!("request-id {} out of range", request_id)))?;
    let error_status = p.integer("error-status")?;
    let error_index = p.integer("error-index")?;
    let vbl = p.expect(TAG_SEQUENCE, "VarBindList")?;

    let mut list = Reader::new(vbl);
    let mut varbinds = Vec::new();
    while !list.is_done() {
        let vb = list.expect(TAG_SEQUENCE, "VarBind")?;
        let mut v = Reader::new(vb);
        let oid = parse_oid_bytes(v.expect(TAG_OID, "VarBind OID")?)?;
        let (tag, content) = v.tlv("VarBind value")?;
        varbinds.push(VarBind { oid, value: parse_value(tag, content)? });
    }

    Ok(Message {
        version,
        community,
        pdu: Pdu { kind, request_id, error_status, error_index, varbinds },
    })
}

/// Request id of a datagram without decoding its bindings.
pub fn peek_request_id(data: &[u8]) -> Option<i32> {
    let mut outer = Reader::new(data);
    let body = outer.expect(TAG_SEQUENCE, "outer SEQUENCE").ok()?;
    let mut r = Reader::new(body);
    r.integer("version").ok()?;
    r.expect(TAG_OCTET_STRING, "community").ok()?;
    let (_, pdu) = r.tlv("PDU").ok()?;
    let id = Reader::new(pdu).integer("request-id").ok()?;
    i32::try_from(id).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(s: &str) -> Oid {
        s.parse().unwrap()
    }

    #[test]
    fn get_request_matches_reference_encoding() {
        // snmpget -v1 -c public <host> 1.3.6.1.2.1.1.1.0, request-id 1
        let msg = Message {
            version: Version::V1,
            community: "public".into(),
            pdu: Pdu::get(1, &[oid("1.3.6.1.2.1.1.1.0")]),
        };
        let expected: &[u8] = &[
            0x30, 0x26, 0x02, 0x01, 0x00, 0x04, 0x06, b'p', b'u', b'b', b'l', b'i', b'c', 0xa0,
            0x19, 0x02, 0x01, 0x01, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00, 0x30, 0x0e, 0x30, 0x0c,
            0x06, 0x08, 0x2b, 0x06, 0x01, 0x02, 0x01, 0x01, 0x01, 0x00, 0x05, 0x00,
        ];
        assert_eq!(encode_message(&msg), expected);
    }

    #[test]
    fn enterprise_arcs_use_multibyte_encoding() {
        let bytes = oid_bytes(&oid("1.3.6.1.4.1.35833"));
        assert_eq!(bytes, vec![0x2b, 0x06, 0x01, 0x04, 0x01, 0x82, 0x97, 0x79]);
        assert_eq!(parse_oid_bytes(&bytes).unwrap(), oid("1.3.6.1.4.1.35833"));
    }

    #[test]
    fn integers_are_minimal_twos_complement() {
        assert_eq!(integer_bytes(0), vec![0x00]);
        assert_eq!(integer_bytes(127), vec![0x7f]);
        assert_eq!(integer_bytes(128), vec![0x00, 0x80]);
        assert_eq!(integer_bytes(-1), vec![0xff]);
        assert_eq!(integer_bytes(-129), vec![0xff, 0x7f]);
        assert_eq!(parse_integer(&[0xff, 0x7f], "t").unwrap(), -129);
        assert_eq!(unsigned_bytes(0xffff_ffff), vec![0x00, 0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn long_form_lengths_decode() {
        let text = "x".repeat(300);
        let msg = Message {
            version: Version::V2c,
            community: "DEVA4004".into(),
            pdu: Pdu {
                kind: PduKind::Response,
                request_id: -7,
                error_status: 0,
                error_index: 0,
                varbinds: vec![VarBind::new(oid("1.3.6.1.4.1.35833.10.3.21.0"), Value::text(text.clone()))],
            },
        };
        let decoded = decode_message(&encode_message(&msg)).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(decoded.pdu.varbinds[0].value.to_string(), text);
    }

    #[test]
    fn bulk_request_carries_repetitions_in_error_slots() {
        let pdu = Pdu::get_bulk(42, 0, 50, &[oid("1.3.6.1.4.1.35833.10.4.14.1.2")]);
        let msg = Message { version: Version::V2c, community: "public".into(), pdu };
        let bytes = encode_message(&msg);
        assert_eq!(peek_request_id(&bytes), Some(42));
        let decoded = decode_message(&bytes).unwrap();
        assert_eq!(decoded.pdu.kind, PduKind::GetBulk);
        assert_eq!(decoded.pdu.error_status, 0);
        assert_eq!(decoded.pdu.error_index, 50);
    }

    #[test]
    fn truncated_packets_are_rejected() {
        let msg = Message {
            version: Version::V2c,
            community: "public".into(),
            pdu: Pdu::get(9, &[oid("1.3.6.1.4.1.35833.10.1.1.0")]),
        };
        let bytes = encode_message(&msg);
        for cut in [1, 5, bytes.len() - 1] {
            assert!(decode_message(&bytes[..cut]).is_err(), "cut at {}", cut);
        }
        assert_eq!(peek_request_id(&bytes[..3]), None);
    }

    #[test]
    fn oversized_declared_length_is_rejected() {
        // Long-form length of usize::MAX behind a SEQUENCE tag.
        let mut bytes = vec![TAG_SEQUENCE, 0x88];
        bytes.extend_from_slice(&[0xff; 8]);
        bytes.extend_from_slice(&[0x02, 0x01, 0x01]);
        assert!(matches!(decode_message(&bytes), Err(SnmpError::Decode(_))));
        assert_eq!(peek_request_id(&bytes), None);
    }

    #[test]
    fn values_render_like_management_tools() {
        assert_eq!(Value::Integer(-42).to_string(), "-42");
        assert_eq!(Value::text("Radio 1").to_string(), "Radio 1");
        assert_eq!(Value::OctetString(vec![0x00, 0xab]).to_string(), "0x00ab");
        assert_eq!(Value::IpAddress([192, 168, 100, 37]).to_string(), "192.168.100.37");
        assert_eq!(Value::NoSuchInstance.to_string(), "noSuchInstance");
        assert_eq!(Value::Gauge32(915).as_i64(), Some(915));
    }

    #[test]
    fn exceptions_decode_from_context_tags() {
        assert_eq!(parse_value(0x80, &[]).unwrap(), Value::NoSuchObject);
        assert_eq!(parse_value(0x82, &[]).unwrap().exception(), Some("endOfMibView"));
        assert!(parse_value(0x99, &[]).is_err());
    }
}
