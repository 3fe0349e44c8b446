//! Domain model: names, payloads and the errors they can produce.
//!
//! Nothing here knows about queues or workers.

pub mod errors;
pub mod names;
pub mod payload;

pub use self::errors::{CodecError, HandlerError};
pub use self::names::{EventName, QueueName};
pub use self::payload::{Args, Payload};
