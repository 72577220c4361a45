//! ## lockbete-core::record
//! The `snmp_request` evidence record.
//!
//! Field names and their presence rules are a contract with downstream
//! tooling: the classification fields are omitted entirely (not `null`) when
//! nothing was detected.

use chrono::SecondsFormat;
use serde::Serialize;

use lockbete_protocols::ClassificationResult;

use crate::events::RequestEvent;

/// Payloads longer than this get a truncated `data_preview`.
pub const PREVIEW_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnmpRequestRecord {
    pub timestamp: String,
    pub service: &'static str,
    pub honeypot: &'static str,
    pub src_ip: String,
    pub src_port: u16,
    pub protocol: &'static str,
    pub action: &'static str,
    pub data_length: usize,
    pub data_hex: String,
    pub data_preview: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snmp_detected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snmp_version: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_string: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snmp_operation: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsing_error: Option<String>,
}

impl SnmpRequestRecord {
    /// Merges transport metadata with the classification of its payload.
    pub fn new(event: &RequestEvent, classification: &ClassificationResult) -> Self {
        let payload = event.payload.as_ref();
        let preview = &payload[..payload.len().min(PREVIEW_LEN)];

        Self {
            timestamp: event.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            service: "snmp",
            honeypot: "snmp",
            // v4-mapped peers on a dual-stack socket are logged as plain IPv4.
            src_ip: event.peer.ip().to_canonical().to_string(),
            src_port: event.peer.port(),
            protocol: "udp",
            action: "snmp_request",
            data_length: payload.len(),
            data_hex: hex::encode(payload),
            data_preview: hex::encode(preview),
            snmp_detected: classification.looks_like_snmp.then_some(true),
            snmp_version: classification.version.map(|v| v.as_str()),
            community_string: classification.community.map(|c| c.as_str()),
            snmp_operation: classification.operation.map(|op| op.as_str()),
            parsing_error: classification.parsing_error.clone(),
        }
    }

    /// Renders the record as a single JSON line, without the trailing newline.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::{TimeZone, Utc};
    use lockbete_protocols::{classify, Community, PduOperation, SnmpVersion};
    use serde_json::Value;

    fn event(payload: &[u8]) -> RequestEvent {
        RequestEvent::new(
            Utc.with_ymd_and_hms(2024, 3, 9, 17, 4, 5).unwrap(),
            "203.0.113.7:40123".parse().unwrap(),
            Bytes::copy_from_slice(payload),
        )
    }

    fn json(record: &SnmpRequestRecord) -> Value {
        serde_json::from_str(&record.to_json_line().unwrap()).unwrap()
    }

    #[test]
    fn test_fixed_fields() {
        let record = SnmpRequestRecord::new(&event(b"\x01\x02"), &ClassificationResult::default());
        let value = json(&record);

        assert_eq!(value["timestamp"], "2024-03-09T17:04:05.000000Z");
        assert_eq!(value["service"], "snmp");
        assert_eq!(value["honeypot"], "snmp");
        assert_eq!(value["src_ip"], "203.0.113.7");
        assert_eq!(value["src_port"], 40123);
        assert_eq!(value["protocol"], "udp");
        assert_eq!(value["action"], "snmp_request");
        assert_eq!(value["data_length"], 2);
        assert_eq!(value["data_hex"], "0102");
        assert_eq!(value["data_preview"], "0102");
    }

    #[test]
    fn test_absent_classification_fields_are_omitted() {
        let record = SnmpRequestRecord::new(&event(&[]), &classify(&[]));
        let value = json(&record);
        let object = value.as_object().unwrap();

        assert_eq!(value["data_length"], 0);
        assert_eq!(value["data_hex"], "");
        for key in [
            "snmp_detected",
            "snmp_version",
            "community_string",
            "snmp_operation",
            "parsing_error",
        ] {
            assert!(!object.contains_key(key), "{key} should be omitted");
        }
    }

    #[test]
    fn test_detected_fields() {
        let classification = ClassificationResult {
            looks_like_snmp: true,
            version: Some(SnmpVersion::V2c),
            community: Some(Community::Private),
            operation: Some(PduOperation::SetRequest),
            parsing_error: None,
        };
        let value = json(&SnmpRequestRecord::new(&event(&[0x30]), &classification));

        assert_eq!(value["snmp_detected"], true);
        assert_eq!(value["snmp_version"], "2c");
        assert_eq!(value["community_string"], "private");
        assert_eq!(value["snmp_operation"], "SetRequest");
    }

    #[test]
    fn test_parsing_error_is_logged() {
        let classification = ClassificationResult {
            parsing_error: Some("Classifier fault: boom".into()),
            ..Default::default()
        };
        let value = json(&SnmpRequestRecord::new(&event(&[0x30]), &classification));
        assert_eq!(value["parsing_error"], "Classifier fault: boom");
        assert!(value.get("snmp_detected").is_none());
    }

    #[test]
    fn test_preview_truncation() {
        let payload: Vec<u8> = (0..200u16).map(|i| i as u8).collect();
        let record = SnmpRequestRecord::new(&event(&payload), &classify(&payload));

        assert_eq!(record.data_length, 200);
        assert_eq!(record.data_hex.len(), 400);
        assert_eq!(record.data_preview, hex::encode(&payload[..PREVIEW_LEN]));

        let exact = vec![0x41; PREVIEW_LEN];
        let record = SnmpRequestRecord::new(&event(&exact), &classify(&exact));
        assert_eq!(record.data_preview, record.data_hex);
    }

    #[test]
    fn test_mapped_ipv6_peer() {
        let mut ev = event(&[]);
        ev.peer = "[::ffff:198.51.100.2]:161".parse().unwrap();
        let record = SnmpRequestRecord::new(&ev, &ClassificationResult::default());
        assert_eq!(record.src_ip, "198.51.100.2");

        ev.peer = "[2001:db8::1]:161".parse().unwrap();
        let record = SnmpRequestRecord::new(&ev, &ClassificationResult::default());
        assert_eq!(record.src_ip, "2001:db8::1");
    }
}
