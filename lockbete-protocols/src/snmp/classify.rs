//! ## lockbete-protocols::snmp::classify
//! **Heuristic SNMP classification over untrusted datagrams**
//!
//! The classifier never decodes BER. It looks for a leading SEQUENCE tag and
//! then scans the whole payload, unanchored, for version TLVs, well-known
//! community strings and PDU tag bytes. Markers inside unrelated fields (an
//! OID arc, a request id) will match too; log consumers rely on exactly this
//! false-positive profile, so the scan must stay shallow.
//!
//! Scanning is bounded by the payload length and has no recursion, so any
//! input, including an empty or 64 KiB random buffer, classifies in linear
//! time.

use std::panic::{self, AssertUnwindSafe};

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use thiserror::Error;

use super::types::{Community, PduOperation, SnmpVersion, SEQUENCE_TAG};

/// Faults raised by the classifier itself, never by the input.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ClassifyError {
    #[error("Marker automaton could not be built: {0}")]
    MarkerBuild(String),
    #[error("Classifier fault: {0}")]
    Panicked(String),
}

/// Best-effort interpretation of one datagram.
///
/// `None` fields mean "no marker found", which is the normal outcome for
/// most traffic rather than a failure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassificationResult {
    pub looks_like_snmp: bool,
    pub version: Option<SnmpVersion>,
    pub community: Option<Community>,
    pub operation: Option<PduOperation>,
    /// Set only when classification itself faulted; every other field is
    /// then left at its default.
    pub parsing_error: Option<String>,
}

impl ClassificationResult {
    fn from_fault(err: ClassifyError) -> Self {
        Self {
            parsing_error: Some(err.to_string()),
            ..Self::default()
        }
    }
}

/// A set of byte markers with a fixed priority. When several are present in
/// a buffer the one listed first wins, regardless of where it occurs.
struct MarkerScan<T: 'static> {
    automaton: AhoCorasick,
    labels: &'static [T],
}

impl<T: Copy + 'static> MarkerScan<T> {
    fn build(labels: &'static [T], marker: fn(T) -> &'static [u8]) -> Result<Self, ClassifyError> {
        let automaton = AhoCorasick::new(labels.iter().map(|label| marker(*label)))
            .map_err(|e| ClassifyError::MarkerBuild(e.to_string()))?;
        Ok(Self { automaton, labels })
    }

    fn highest_priority(&self, data: &[u8]) -> Option<T> {
        let mut best: Option<usize> = None;
        for found in self.automaton.find_overlapping_iter(data) {
            let index = found.pattern().as_usize();
            if best.map_or(true, |current| index < current) {
                best = Some(index);
                if index == 0 {
                    break;
                }
            }
        }
        best.and_then(|index| self.labels.get(index).copied())
    }
}

struct Markers {
    versions: MarkerScan<SnmpVersion>,
    communities: MarkerScan<Community>,
    operations: MarkerScan<PduOperation>,
}

impl Markers {
    fn build() -> Result<Self, ClassifyError> {
        Ok(Self {
            versions: MarkerScan::build(&SnmpVersion::SCAN_ORDER, SnmpVersion::marker)?,
            communities: MarkerScan::build(&Community::SCAN_ORDER, Community::marker)?,
            operations: MarkerScan::build(&PduOperation::SCAN_ORDER, PduOperation::marker)?,
        })
    }
}

static MARKERS: Lazy<Result<Markers, ClassifyError>> = Lazy::new(Markers::build);

/// Stateless SNMP classifier.
#[derive(Default, Debug, Copy, Clone)]
pub struct SnmpClassifier;

impl SnmpClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classifies `payload`. Total: any byte sequence yields a result, and
    /// identical payloads always yield identical results.
    pub fn classify(&self, payload: &[u8]) -> ClassificationResult {
        classify_guarded(payload, scan)
    }
}

/// Convenience wrapper around [`SnmpClassifier::classify`].
pub fn classify(payload: &[u8]) -> ClassificationResult {
    SnmpClassifier::new().classify(payload)
}

/// Runs `scan_fn` and folds any fault, including a panic, into
/// `parsing_error`.
fn classify_guarded<F>(payload: &[u8], scan_fn: F) -> ClassificationResult
where
    F: FnOnce(&[u8]) -> Result<ClassificationResult, ClassifyError>,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| scan_fn(payload)))
        .unwrap_or_else(|cause| Err(ClassifyError::Panicked(panic_message(cause.as_ref()))));

    match outcome {
        Ok(result) => result,
        Err(err) => ClassificationResult::from_fault(err),
    }
}

fn scan(payload: &[u8]) -> Result<ClassificationResult, ClassifyError> {
    let markers = match &*MARKERS {
        Ok(markers) => markers,
        Err(err) => return Err(err.clone()),
    };

    let looks_like_snmp = payload.first() == Some(&SEQUENCE_TAG);
    let (version, community) = if looks_like_snmp {
        (
            markers.versions.highest_priority(payload),
            markers.communities.highest_priority(payload),
        )
    } else {
        (None, None)
    };

    // The PDU scan ignores the SEQUENCE check on purpose: a stray tag byte in
    // garbage is still a signal worth logging.
    let operation = markers.operations.highest_priority(payload);

    Ok(ClassificationResult {
        looks_like_snmp,
        version,
        community,
        operation,
        parsing_error: None,
    })
}

fn panic_message(cause: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = cause.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = cause.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
