//! ## lockbete-protocols::snmp
//! Shallow SNMP handling: a marker-scanning classifier and a fixed-template
//! responder. Neither attempts a BER decode.

pub mod classify;
pub mod reply;
mod types;

pub use classify::{classify, ClassificationResult, ClassifyError, SnmpClassifier};
pub use reply::{synthesize_reply, Responder, DEFAULT_MIN_REQUEST_LEN, REPLY_TEMPLATE};
pub use types::{Community, PduOperation, SnmpVersion, SEQUENCE_TAG};
