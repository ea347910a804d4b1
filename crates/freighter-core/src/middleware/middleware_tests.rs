#![allow(non_snake_case)]

use super::*;
use crate::FreighterError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Records the order in which middleware and the finalizer run
#[derive(Clone, Default)]
struct Trace(Arc<Mutex<Vec<String>>>);

impl Trace {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

struct Recording {
    name: &'static str,
    trace: Trace,
}

#[async_trait]
impl Middleware for Recording {
    async fn handle(&self, ctx: &mut Context, next: Next<'_>) -> FreighterResult<()> {
        self.trace.push(self.name);
        next.run(ctx).await
    }
}

struct Abort {
    trace: Trace,
}

#[async_trait]
impl Middleware for Abort {
    async fn handle(&self, _ctx: &mut Context, _next: Next<'_>) -> FreighterResult<()> {
        self.trace.push("abort");
        Err(FreighterError::Unreachable)
    }
}

/// Replaces any error from the rest of the chain with `Eof`
struct Rewrite;

#[async_trait]
impl Middleware for Rewrite {
    async fn handle(&self, ctx: &mut Context, next: Next<'_>) -> FreighterResult<()> {
        match next.run(ctx).await {
            Ok(()) => Ok(()),
            Err(_) => Err(FreighterError::Eof),
        }
    }
}

struct CountingFinalizer {
    calls: AtomicUsize,
    seen_params: Mutex<HashMap<String, String>>,
    outcome: FreighterResult<()>,
}

impl CountingFinalizer {
    fn new(outcome: FreighterResult<()>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            seen_params: Mutex::new(HashMap::new()),
            outcome,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Finalizer for CountingFinalizer {
    async fn finalize(&self, ctx: &mut Context) -> FreighterResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_params.lock() = ctx.params.clone();
        self.outcome.clone()
    }
}

// Context tests

#[test]
fn Context___new___has_no_params() {
    let ctx = Context::new("http://localhost/echo", "http");

    assert_eq!(ctx.target, "http://localhost/echo");
    assert_eq!(ctx.protocol, "http");
    assert!(ctx.params.is_empty());
}

#[test]
fn Context___set_param___replaces_existing_value() {
    let mut ctx = Context::new("t", "http");

    ctx.set_param("key", "one");
    ctx.set_param("key", "two");

    assert_eq!(ctx.param("key"), Some("two"));
}

// MiddlewareCollector tests

#[tokio::test]
async fn MiddlewareCollector___execute___empty_chain_runs_finalizer_once() {
    let collector = MiddlewareCollector::new();
    let finalizer = CountingFinalizer::new(Ok(()));
    let mut ctx = Context::new("t", "http");

    let result = collector.execute(&mut ctx, &finalizer).await;

    assert!(result.is_ok());
    assert_eq!(finalizer.calls(), 1);
}

#[tokio::test]
async fn MiddlewareCollector___execute___runs_in_registration_order() {
    let trace = Trace::default();
    let mut collector = MiddlewareCollector::new();
    collector.use_middleware(Recording { name: "m1", trace: trace.clone() });
    collector.use_middleware(Recording { name: "m2", trace: trace.clone() });
    collector.use_middleware(Recording { name: "m3", trace: trace.clone() });
    let finalizer = CountingFinalizer::new(Ok(()));
    let mut ctx = Context::new("t", "http");

    collector.execute(&mut ctx, &finalizer).await.unwrap();

    assert_eq!(trace.entries(), vec!["m1", "m2", "m3"]);
    assert_eq!(finalizer.calls(), 1);
}

#[tokio::test]
async fn MiddlewareCollector___execute___short_circuit_skips_rest_and_finalizer() {
    let trace = Trace::default();
    let mut collector = MiddlewareCollector::new();
    collector.use_middleware(Abort { trace: trace.clone() });
    collector.use_middleware(Recording { name: "m2", trace: trace.clone() });
    let finalizer = CountingFinalizer::new(Ok(()));
    let mut ctx = Context::new("t", "http");

    let result = collector.execute(&mut ctx, &finalizer).await;

    assert_eq!(result, Err(FreighterError::Unreachable));
    assert_eq!(trace.entries(), vec!["abort"]);
    assert_eq!(finalizer.calls(), 0);
}

#[tokio::test]
async fn MiddlewareCollector___execute___finalizer_error_propagates() {
    let collector = MiddlewareCollector::new();
    let finalizer = CountingFinalizer::new(Err(FreighterError::StreamClosed));
    let mut ctx = Context::new("t", "http");

    let result = collector.execute(&mut ctx, &finalizer).await;

    assert_eq!(result, Err(FreighterError::StreamClosed));
}

#[tokio::test]
async fn MiddlewareCollector___execute___middleware_can_post_process_result() {
    let mut collector = MiddlewareCollector::new();
    collector.use_middleware(Rewrite);
    let finalizer = CountingFinalizer::new(Err(FreighterError::Unreachable));
    let mut ctx = Context::new("t", "http");

    let result = collector.execute(&mut ctx, &finalizer).await;

    assert_eq!(result, Err(FreighterError::Eof));
    assert_eq!(finalizer.calls(), 1);
}

#[tokio::test]
async fn MiddlewareCollector___execute___param_changes_reach_finalizer() {
    let mut collector = MiddlewareCollector::new();
    collector.use_middleware(HeaderMiddleware::new().with_header("Authorization", "Bearer abc"));
    collector.use_middleware(LoggingMiddleware);
    let finalizer = CountingFinalizer::new(Ok(()));
    let mut ctx = Context::new("t", "http");

    collector.execute(&mut ctx, &finalizer).await.unwrap();

    let seen = finalizer.seen_params.lock().clone();
    assert_eq!(seen.get("Authorization").map(String::as_str), Some("Bearer abc"));
    assert_eq!(ctx.param("Authorization"), Some("Bearer abc"));
}

#[tokio::test]
async fn MiddlewareCollector___clone___shares_registered_middleware() {
    let trace = Trace::default();
    let mut collector = MiddlewareCollector::new();
    collector.use_middleware(Recording { name: "shared", trace: trace.clone() });
    let copy = collector.clone();
    let finalizer = CountingFinalizer::new(Ok(()));

    copy.execute(&mut Context::new("t", "http"), &finalizer).await.unwrap();

    assert_eq!(copy.len(), 1);
    assert_eq!(trace.entries(), vec!["shared"]);
}

#[test]
fn MiddlewareCollector___new___is_empty() {
    let collector = MiddlewareCollector::new();

    assert!(collector.is_empty());
    assert_eq!(collector.len(), 0);
}
