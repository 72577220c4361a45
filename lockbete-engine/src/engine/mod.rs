mod dispatch;
mod error;
mod honeypot;

pub use self::{
    dispatch::{Dispatch, ReplyDispatcher, ReplyOutcome},
    error::EngineError,
    honeypot::{Honeypot, HoneypotSettings},
};
