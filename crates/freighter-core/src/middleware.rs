//! Middleware chain wrapping every unary request and stream open
//!
//! Each middleware receives the call [`Context`] and a [`Next`] continuation.
//! It may call `next.run(ctx)` to continue, return an error without calling
//! it to abort the call, or call it and inspect the outcome before returning.
//! The terminal operation (the HTTP send or socket open) is a [`Finalizer`]
//! reached only when every middleware continues.
//!
//! ```ignore
//! struct Auth(String);
//!
//! #[async_trait]
//! impl Middleware for Auth {
//!     async fn handle(&self, ctx: &mut Context, next: Next<'_>) -> FreighterResult<()> {
//!         ctx.set_param("Authorization", format!("Bearer {}", self.0));
//!         next.run(ctx).await
//!     }
//! }
//! ```

use crate::error::FreighterResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Metadata threaded through the middleware chain for one call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    /// Address of the call
    pub target: String,
    /// Protocol of the call (`http`, `websocket`)
    pub protocol: String,
    /// Call parameters, sent as request or handshake headers
    pub params: HashMap<String, String>,
}

impl Context {
    /// Create a context with no params
    pub fn new(target: impl Into<String>, protocol: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            protocol: protocol.into(),
            params: HashMap::new(),
        }
    }

    /// Set a param, replacing any previous value
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Get a param
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// A single interceptor in the chain
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Handle a call, usually by delegating to `next`
    async fn handle(&self, ctx: &mut Context, next: Next<'_>) -> FreighterResult<()>;
}

/// Terminal operation run after the last middleware
#[async_trait]
pub trait Finalizer: Send + Sync {
    /// Perform the call described by `ctx`
    async fn finalize(&self, ctx: &mut Context) -> FreighterResult<()>;
}

/// Continuation invoking the rest of the chain
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    finalizer: &'a dyn Finalizer,
}

impl Next<'_> {
    /// Run the remaining middleware, then the terminal operation
    pub async fn run(self, ctx: &mut Context) -> FreighterResult<()> {
        match self.chain.split_first() {
            Some((head, rest)) => {
                let next = Next {
                    chain: rest,
                    finalizer: self.finalizer,
                };
                head.handle(ctx, next).await
            }
            None => self.finalizer.finalize(ctx).await,
        }
    }
}

/// Ordered collection of middleware
#[derive(Clone, Default)]
pub struct MiddlewareCollector {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareCollector {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append middleware; it runs after everything registered before it
    pub fn use_middleware(&mut self, middleware: impl Middleware + 'static) {
        self.middleware.push(Arc::new(middleware));
    }

    /// Append already shared middleware
    pub fn use_shared(&mut self, middleware: Arc<dyn Middleware>) {
        self.middleware.push(middleware);
    }

    /// Number of registered middleware
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    /// Check whether the chain is empty
    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Run `ctx` through every middleware and then `finalizer`
    pub async fn execute(&self, ctx: &mut Context, finalizer: &dyn Finalizer) -> FreighterResult<()> {
        Next {
            chain: &self.middleware,
            finalizer,
        }
        .run(ctx)
        .await
    }
}

impl std::fmt::Debug for MiddlewareCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareCollector")
            .field("len", &self.middleware.len())
            .finish()
    }
}

/// Middleware that adds fixed params to every call
#[derive(Debug, Clone, Default)]
pub struct HeaderMiddleware {
    headers: Vec<(String, String)>,
}

impl HeaderMiddleware {
    /// Create middleware with no headers
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

#[async_trait]
impl Middleware for HeaderMiddleware {
    async fn handle(&self, ctx: &mut Context, next: Next<'_>) -> FreighterResult<()> {
        for (key, value) in &self.headers {
            ctx.set_param(key.clone(), value.clone());
        }
        next.run(ctx).await
    }
}

/// Middleware that logs each call and its outcome
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMiddleware;

#[async_trait]
impl Middleware for LoggingMiddleware {
    async fn handle(&self, ctx: &mut Context, next: Next<'_>) -> FreighterResult<()> {
        let started = Instant::now();
        let url = ctx.target.clone();
        let protocol = ctx.protocol.clone();
        tracing::debug!(%url, %protocol, "call started");

        let result = next.run(ctx).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(()) => tracing::debug!(%url, %protocol, elapsed_ms, "call finished"),
            Err(err) => tracing::warn!(%url, %protocol, elapsed_ms, error = %err, "call failed"),
        }
        result
    }
}

#[cfg(test)]
#[path = "middleware/middleware_tests.rs"]
mod middleware_tests;
