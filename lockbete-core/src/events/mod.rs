//! ## lockbete-core::events
//! Per-datagram event types. Events live only for the handling of their
//! datagram; nothing is carried across requests.

pub mod request;

pub use request::RequestEvent;
