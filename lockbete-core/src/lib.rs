//! # lockbete-core
//!
//! Foundation layer shared by the sensor: the per-datagram event, the JSON
//! evidence record built from it, and the two boundaries the engine talks
//! through (the datagram transport and the evidence sink).
//!
//! ### Key Submodules:
//! - `events`: `RequestEvent`, stamped at receive time
//! - `record`: the `snmp_request` evidence record and its field contract
//! - `sink`: append-only evidence sinks (JSON lines file, writer, memory)
//! - `transport`: datagram transport trait with UDP and in-memory backends

pub mod error;
pub mod events;
pub mod record;
pub mod sink;
pub mod transport;

pub use error::{SinkError, TransportError};
pub use events::RequestEvent;
pub use record::SnmpRequestRecord;
pub use sink::{EventSink, JsonLinesSink, MemorySink, WriterSink};
pub use transport::{DatagramTransport, Injector, MemoryTransport, UdpTransport};
