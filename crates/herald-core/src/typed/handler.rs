//! Handler traits - what a worker calls for a dequeued event.
//!
//! # 二層構造
//! - `EventHandler`: object-safe, receives the raw `Args`
//! - `Handler<A>`: typed, receives the argument list already decoded into `A`
//!
//! `TypedHandler<A, H>` erases `Handler<A>` into `EventHandler` so both can
//! live in the same registry.

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::domain::{Args, HandlerError};

/// EventHandler is invoked with the arguments an event was triggered with.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, args: Args) -> Result<(), HandlerError>;
}

/// Handler receives the argument list decoded into `A`.
///
/// # 使用例
/// ```ignore
/// struct Greet;
///
/// #[async_trait]
/// impl Handler<(String, u32)> for Greet {
///     async fn handle(&self, (name, age): (String, u32)) -> Result<(), HandlerError> {
///         println!("{name} is {age}");
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler<A>: Send + Sync
where
    A: DeserializeOwned + Send + 'static,
{
    async fn handle(&self, args: A) -> Result<(), HandlerError>;
}

pub struct TypedHandler<A, H> {
    handler: H,
    _marker: PhantomData<fn() -> A>,
}

impl<A, H> TypedHandler<A, H>
where
    A: DeserializeOwned + Send + 'static,
    H: Handler<A>,
{
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<A, H> EventHandler for TypedHandler<A, H>
where
    A: DeserializeOwned + Send + 'static,
    H: Handler<A>,
{
    async fn handle(&self, args: Args) -> Result<(), HandlerError> {
        let args: A = args.decode()?;
        self.handler.handle(args).await
    }
}

/// Adapter turning an async closure into an `EventHandler`. See [`handler_fn`].
pub struct FnHandler<F> {
    f: F,
}

/// Build a handler from a closure returning a future.
///
/// ```ignore
/// let h = handler_fn(|args: Args| async move {
///     println!("{:?}", args);
///     Ok(())
/// });
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Args) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(Args) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(&self, args: Args) -> Result<(), HandlerError> {
        (self.f)(args).await
    }
}
