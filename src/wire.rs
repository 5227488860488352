//! SRV RDATA wire format.
//!
//! An SRV record's RDATA is laid out as (network byte order):
//!
//! ```text
//! priority:u16 weight:u16 port:u16 target:domain-name
//! ```
//!
//! where `domain-name` is a sequence of length-prefixed labels terminated
//! by a zero-length label, or a compression pointer into the answer
//! message. [`decode_srv_rdata`] validates one such payload;
//! [`encode_srv_rdata`] produces one for stub backends and tests.

use crate::record::SrvRecord;

/// DNS TYPE code for SRV records.
pub const TYPE_SRV: u16 = 33;

/// DNS CLASS code for the Internet class.
pub const CLASS_IN: u16 = 1;

/// DNS response code for a successful query.
pub const RCODE_NO_ERROR: u16 = 0;

/// DNS response code for a server-side failure.
pub const RCODE_SERVER_FAILURE: u16 = 2;

/// DNS response code for a non-existent domain.
pub const RCODE_NAME_ERROR: u16 = 3;

/// Fixed-field prefix of SRV RDATA: priority, weight, and port.
const FIXED_FIELDS_LEN: usize = 6;

/// Upper bound on the encoded length of a domain name (RFC 1035 §2.3.4).
const MAX_NAME_LEN: usize = 255;

/// Upper bound on compression pointer hops, so pointer cycles terminate.
const MAX_POINTER_HOPS: u8 = 32;

/// Top two bits of a length octet marking a compression pointer.
const POINTER_MASK: u8 = 0b1100_0000;

/// Reasons a candidate SRV record fails validation.
///
/// A rejected record is dropped from the result set; it never fails the
/// overall resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// RDATA ended before priority, weight, and port were read. Also
    /// covers records missing one of the fixed fields outright, which is
    /// indistinguishable from truncation on the wire.
    #[error("rdata truncated inside fixed fields ({len} of 6 bytes)")]
    TruncatedFields {
        /// Number of RDATA bytes present.
        len: usize,
    },
    /// RDATA ended before the target name's terminating label.
    #[error("target name truncated")]
    TruncatedName,
    /// The target name uses a reserved label type, points outside the
    /// answer message, chases pointers in a cycle, or exceeds the maximum
    /// name length.
    #[error("target name malformed")]
    MalformedName,
}

/// Validates one SRV RDATA payload, producing a record or a rejection
/// reason.
///
/// `message` is the full answer message the record arrived in, used to
/// resolve compression pointers in the target name; pass an empty slice
/// for standalone payloads, in which case any pointer is malformed.
///
/// Decoding is pure: the same bytes always yield the same result.
///
/// ```
/// use srv_resolve::wire::decode_srv_rdata;
/// let rdata = [
///     0x00, 0x0a, // priority 10
///     0x00, 0x05, // weight 5
///     0x13, 0xc4, // port 5060
///     0x03, b's', b'i', b'p', 0x00, // "sip"
/// ];
/// let record = decode_srv_rdata(&rdata, &[]).unwrap();
/// assert_eq!((record.priority(), record.weight(), record.port()), (10, 5, 5060));
/// assert_eq!(record.target(), "sip");
/// ```
pub fn decode_srv_rdata(rdata: &[u8], message: &[u8]) -> Result<SrvRecord, RecordError> {
    if rdata.len() < FIXED_FIELDS_LEN {
        return Err(RecordError::TruncatedFields { len: rdata.len() });
    }
    let priority = u16::from_be_bytes([rdata[0], rdata[1]]);
    let weight = u16::from_be_bytes([rdata[2], rdata[3]]);
    let port = u16::from_be_bytes([rdata[4], rdata[5]]);
    let target = decode_name(&rdata[FIXED_FIELDS_LEN..], message)?;
    Ok(SrvRecord::new(priority, weight, port, target))
}

/// Decodes a domain name starting at the beginning of `start`, following
/// compression pointers into `message`. Bytes past the terminating label
/// are ignored.
fn decode_name(start: &[u8], message: &[u8]) -> Result<String, RecordError> {
    let mut labels: Vec<String> = Vec::new();
    let mut buf = start;
    let mut pos = 0usize;
    let mut hops = 0u8;
    let mut octets = 0usize;
    loop {
        let &len = buf.get(pos).ok_or(RecordError::TruncatedName)?;
        match len & POINTER_MASK {
            0 => {
                if len == 0 {
                    break;
                }
                let label = buf
                    .get(pos + 1..pos + 1 + usize::from(len))
                    .ok_or(RecordError::TruncatedName)?;
                octets += usize::from(len) + 1;
                if octets > MAX_NAME_LEN {
                    return Err(RecordError::MalformedName);
                }
                labels.push(String::from_utf8_lossy(label).into_owned());
                pos += 1 + usize::from(len);
            }
            POINTER_MASK => {
                let &low = buf.get(pos + 1).ok_or(RecordError::TruncatedName)?;
                let offset = usize::from(u16::from_be_bytes([len & !POINTER_MASK, low]));
                if offset >= message.len() {
                    return Err(RecordError::MalformedName);
                }
                hops += 1;
                if hops > MAX_POINTER_HOPS {
                    return Err(RecordError::MalformedName);
                }
                buf = message;
                pos = offset;
            }
            // 0b01 and 0b10 label types are reserved
            _ => return Err(RecordError::MalformedName),
        }
    }
    Ok(labels.join("."))
}

/// Encodes SRV RDATA from its four fields, without name compression.
pub fn encode_srv_rdata(priority: u16, weight: u16, port: u16, target: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(FIXED_FIELDS_LEN + target.len() + 2);
    buf.extend_from_slice(&priority.to_be_bytes());
    buf.extend_from_slice(&weight.to_be_bytes());
    buf.extend_from_slice(&port.to_be_bytes());
    encode_name(target, &mut buf);
    buf
}

/// Appends a domain name in wire form to `buf`. Empty labels (including a
/// trailing dot) are skipped; the root name encodes as a lone zero octet.
pub fn encode_name(name: &str, buf: &mut Vec<u8>) {
    for label in name.split('.').filter(|label| !label.is_empty()) {
        debug_assert!(label.len() <= 63, "label too long for wire form");
        buf.push(label.len() as u8);
        buf.extend_from_slice(label.as_bytes());
    }
    buf.push(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rdata(priority: u16, weight: u16, port: u16, target: &str) -> Vec<u8> {
        encode_srv_rdata(priority, weight, port, target)
    }

    #[test]
    fn decodes_well_formed_record() {
        let record = decode_srv_rdata(&rdata(10, 20, 5060, "goose.down"), &[]).unwrap();
        assert_eq!(record.priority(), 10);
        assert_eq!(record.weight(), 20);
        assert_eq!(record.port(), 5060);
        assert_eq!(record.target(), "goose.down");
    }

    #[test]
    fn decodes_root_target() {
        let record = decode_srv_rdata(&rdata(1, 0, 443, ""), &[]).unwrap();
        assert_eq!(record.target(), "");
    }

    #[test]
    fn decoding_is_idempotent() {
        let bytes = rdata(5, 80, 8080, "moo.example.com");
        let first = decode_srv_rdata(&bytes, &[]).unwrap();
        let second = decode_srv_rdata(&bytes, &[]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_truncated_fixed_fields() {
        let bytes = rdata(10, 20, 5060, "tacos");
        for len in 0..6 {
            assert_eq!(
                decode_srv_rdata(&bytes[..len], &[]),
                Err(RecordError::TruncatedFields { len }),
            );
        }
    }

    #[test]
    fn rejects_missing_name() {
        // Fixed fields intact, not a single name byte behind them.
        let bytes = rdata(10, 20, 5060, "tacos");
        assert_eq!(
            decode_srv_rdata(&bytes[..6], &[]),
            Err(RecordError::TruncatedName),
        );
    }

    #[test]
    fn rejects_truncated_label() {
        let mut bytes = rdata(10, 20, 5060, "");
        bytes.pop();
        bytes.extend_from_slice(&[5, b't', b'a']);
        assert_eq!(
            decode_srv_rdata(&bytes, &[]),
            Err(RecordError::TruncatedName),
        );
    }

    #[test]
    fn resolves_compression_pointer() {
        // Message holds "goose.down" at offset 4; RDATA's name is a
        // pointer to it.
        let mut message = vec![0u8; 4];
        encode_name("goose.down", &mut message);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&10u16.to_be_bytes());
        bytes.extend_from_slice(&20u16.to_be_bytes());
        bytes.extend_from_slice(&5060u16.to_be_bytes());
        bytes.extend_from_slice(&[0xc0, 0x04]);
        let record = decode_srv_rdata(&bytes, &message).unwrap();
        assert_eq!(record.target(), "goose.down");
    }

    #[test]
    fn resolves_pointer_after_leading_labels() {
        let mut message = vec![0u8; 2];
        encode_name("example.com", &mut message);
        let mut bytes = rdata(10, 20, 5060, "");
        bytes.pop();
        // "sip" + pointer to "example.com"
        bytes.extend_from_slice(&[3, b's', b'i', b'p', 0xc0, 0x02]);
        let record = decode_srv_rdata(&bytes, &message).unwrap();
        assert_eq!(record.target(), "sip.example.com");
    }

    #[test]
    fn rejects_pointer_outside_message() {
        let mut bytes = rdata(10, 20, 5060, "");
        bytes.pop();
        bytes.extend_from_slice(&[0xc0, 0x10]);
        assert_eq!(
            decode_srv_rdata(&bytes, &[0u8; 4]),
            Err(RecordError::MalformedName),
        );
    }

    #[test]
    fn rejects_pointer_without_message() {
        let mut bytes = rdata(10, 20, 5060, "");
        bytes.pop();
        bytes.extend_from_slice(&[0xc0, 0x00]);
        assert_eq!(decode_srv_rdata(&bytes, &[]), Err(RecordError::MalformedName));
    }

    #[test]
    fn rejects_pointer_cycle() {
        // Two pointers chasing each other.
        let message = [0xc0, 0x02, 0xc0, 0x00];
        let mut bytes = rdata(10, 20, 5060, "");
        bytes.pop();
        bytes.extend_from_slice(&[0xc0, 0x00]);
        assert_eq!(
            decode_srv_rdata(&bytes, &message),
            Err(RecordError::MalformedName),
        );
    }

    #[test]
    fn rejects_reserved_label_type() {
        let mut bytes = rdata(10, 20, 5060, "");
        bytes.pop();
        bytes.extend_from_slice(&[0b0100_0001, 0x00]);
        assert_eq!(decode_srv_rdata(&bytes, &[]), Err(RecordError::MalformedName));
    }

    #[test]
    fn rejects_over_long_name() {
        // 64 labels of 4 octets each total 256 octets, past the cap.
        let mut bytes = rdata(10, 20, 5060, "");
        bytes.pop();
        for _ in 0..64 {
            bytes.extend_from_slice(&[3, b'a', b'b', b'c']);
        }
        bytes.push(0);
        assert_eq!(decode_srv_rdata(&bytes, &[]), Err(RecordError::MalformedName));
    }

    #[test]
    fn ignores_trailing_bytes() {
        let mut bytes = rdata(10, 20, 5060, "tacos");
        bytes.extend_from_slice(&[0xde, 0xad]);
        let record = decode_srv_rdata(&bytes, &[]).unwrap();
        assert_eq!(record.target(), "tacos");
    }

    #[test]
    fn encodes_trailing_dot_like_absolute_name() {
        assert_eq!(
            rdata(1, 2, 3, "example.com."),
            rdata(1, 2, 3, "example.com"),
        );
    }
}
