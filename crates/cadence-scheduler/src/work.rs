use async_trait::async_trait;

/// The unit of recurring work fired once per tick.
///
/// Implementations contain their own failures (report through an
/// [`ErrorSink`](crate::ErrorSink) rather than panicking) so a bad run
/// never disturbs the schedule. The engine awaits `run` inline and provides
/// no timeout: a run that never returns stalls the loop.
#[async_trait]
pub trait WorkUnit: Send + Sync {
    async fn run(&self);
}
