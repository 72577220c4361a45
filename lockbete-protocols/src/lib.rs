//! # Lockbete Protocol Handling
//!
//! Crate for recognising SNMP datagrams and producing decoy replies.

pub mod snmp;

pub use snmp::{
    classify, synthesize_reply, ClassificationResult, ClassifyError, Community, PduOperation,
    Responder, SnmpClassifier, SnmpVersion, REPLY_TEMPLATE,
};
