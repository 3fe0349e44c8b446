//! Typed - handler API and payload codec
//!
//! # 二層構造
//! - **表層（Typed）**: `Handler<A>` - arguments decoded into a Rust type
//! - **内部（Dyn）**: `EventHandler` - object-safe, stored in the registry

pub mod codec;
pub mod handler;
pub(crate) mod shape;

pub use self::codec::{CodecError, PayloadCodec};
pub use self::handler::{EventHandler, FnHandler, Handler, TypedHandler, handler_fn};
