//! ## lockbete-protocols::snmp::reply
//! Decoy reply synthesis.
//!
//! Every reply is the same canned GetResponse. Nothing from the request is
//! echoed back (no request-id, no OIDs), so the reply only has to look like
//! SNMP to a scanner. Deployments correlate on these exact bytes; do not
//! "fix" the lengths or the error-status.

use bytes::Bytes;

/// `SEQUENCE { INTEGER 0, OCTET STRING "public", GetResponse { request-id 0,
/// error-status 2, error-index 0, varbinds {} } }`
pub const REPLY_TEMPLATE: [u8; 26] = [
    0x30, 0x1A, // SEQUENCE
    0x02, 0x01, 0x00, // version
    0x04, 0x06, b'p', b'u', b'b', b'l', b'i', b'c', // community
    0xA2, 0x0D, // GetResponse PDU
    0x02, 0x01, 0x00, // request-id
    0x02, 0x01, 0x02, // error-status
    0x02, 0x01, 0x00, // error-index
    0x30, 0x00, // empty varbind list
];

/// Requests of this many bytes or fewer get no reply.
pub const DEFAULT_MIN_REQUEST_LEN: usize = 10;

/// Decides whether a request deserves a reply. Looks at the request length
/// only, never at its classification.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Responder {
    min_request_len: usize,
}

impl Default for Responder {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_REQUEST_LEN)
    }
}

impl Responder {
    pub fn new(min_request_len: usize) -> Self {
        Self { min_request_len }
    }

    pub fn min_request_len(&self) -> usize {
        self.min_request_len
    }

    /// Returns the reply to send for `request`, or `None` when the request is
    /// too short to be worth answering.
    pub fn synthesize_reply(&self, request: &[u8]) -> Option<Bytes> {
        if request.len() > self.min_request_len {
            Some(Bytes::from_static(&REPLY_TEMPLATE))
        } else {
            None
        }
    }
}

/// [`Responder::synthesize_reply`] with the default threshold.
pub fn synthesize_reply(request: &[u8]) -> Option<Bytes> {
    Responder::default().synthesize_reply(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_template_bytes() {
        let expected = hex::decode("301a02010004067075626c6963a20d0201000201020201003000").unwrap();
        assert_eq!(REPLY_TEMPLATE.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_threshold_boundary() {
        assert_eq!(synthesize_reply(&[]), None);
        assert_eq!(synthesize_reply(&[0x30; 10]), None);
        assert_eq!(
            synthesize_reply(&[0x30; 11]).as_deref(),
            Some(REPLY_TEMPLATE.as_slice())
        );
    }

    #[test]
    fn test_custom_threshold() {
        let responder = Responder::new(0);
        assert_eq!(responder.synthesize_reply(&[]), None);
        assert!(responder.synthesize_reply(&[0xFF]).is_some());
        assert_eq!(Responder::default().min_request_len(), DEFAULT_MIN_REQUEST_LEN);
    }

    proptest! {
        #[test]
        fn reply_ignores_content(payload in proptest::collection::vec(any::<u8>(), 0..256)) {
            let reply = synthesize_reply(&payload);
            if payload.len() > DEFAULT_MIN_REQUEST_LEN {
                prop_assert_eq!(reply.as_deref(), Some(REPLY_TEMPLATE.as_slice()));
            } else {
                prop_assert!(reply.is_none());
            }
        }
    }
}
