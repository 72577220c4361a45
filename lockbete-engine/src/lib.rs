pub mod engine;
pub mod runtime;

// Frontends only need the runtime entry point and the types it hands back.
pub use engine::{Dispatch, EngineError, Honeypot, HoneypotSettings, ReplyDispatcher, ReplyOutcome};
pub use runtime::run_honeypot;
