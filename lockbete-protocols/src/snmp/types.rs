//! Labels the classifier can attach to a datagram, each paired with the raw
//! marker bytes it is recognised by. The order of each `SCAN_ORDER` array is
//! the priority used when several markers are present.

use std::fmt;

/// BER SEQUENCE tag, the leading byte of every SNMP message.
pub const SEQUENCE_TAG: u8 = 0x30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SnmpVersion {
    V1,
    V2c,
    V3,
}

impl SnmpVersion {
    pub const SCAN_ORDER: [SnmpVersion; 3] = [SnmpVersion::V1, SnmpVersion::V2c, SnmpVersion::V3];

    /// INTEGER TLV carrying the version number (0, 1 or 3).
    pub const fn marker(self) -> &'static [u8] {
        match self {
            SnmpVersion::V1 => &[0x02, 0x01, 0x00],
            SnmpVersion::V2c => &[0x02, 0x01, 0x01],
            SnmpVersion::V3 => &[0x02, 0x01, 0x03],
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            SnmpVersion::V1 => "1",
            SnmpVersion::V2c => "2c",
            SnmpVersion::V3 => "3",
        }
    }
}

impl fmt::Display for SnmpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Community strings worth calling out in the evidence log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Community {
    Public,
    Private,
}

impl Community {
    pub const SCAN_ORDER: [Community; 2] = [Community::Public, Community::Private];

    pub const fn marker(self) -> &'static [u8] {
        self.as_str().as_bytes()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Community::Public => "public",
            Community::Private => "private",
        }
    }
}

impl fmt::Display for Community {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SNMP PDU operations, keyed by their context-specific constructed tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PduOperation {
    GetRequest,
    GetNextRequest,
    Response,
    SetRequest,
    GetBulkRequest,
}

impl PduOperation {
    pub const SCAN_ORDER: [PduOperation; 5] = [
        PduOperation::GetRequest,
        PduOperation::GetNextRequest,
        PduOperation::Response,
        PduOperation::SetRequest,
        PduOperation::GetBulkRequest,
    ];

    pub const fn tag(self) -> u8 {
        match self {
            PduOperation::GetRequest => 0xA0,
            PduOperation::GetNextRequest => 0xA1,
            PduOperation::Response => 0xA2,
            PduOperation::SetRequest => 0xA3,
            PduOperation::GetBulkRequest => 0xA5,
        }
    }

    pub const fn marker(self) -> &'static [u8] {
        match self {
            PduOperation::GetRequest => &[0xA0],
            PduOperation::GetNextRequest => &[0xA1],
            PduOperation::Response => &[0xA2],
            PduOperation::SetRequest => &[0xA3],
            PduOperation::GetBulkRequest => &[0xA5],
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PduOperation::GetRequest => "GetRequest",
            PduOperation::GetNextRequest => "GetNextRequest",
            PduOperation::Response => "Response",
            PduOperation::SetRequest => "SetRequest",
            PduOperation::GetBulkRequest => "GetBulkRequest",
        }
    }
}

impl fmt::Display for PduOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
