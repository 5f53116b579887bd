//! Once-a-second background tasks driving the turn and vote timers.
//!
//! Each countdown is a task that sleeps for one period, runs its tick body,
//! and re-arms until the body says stop or the countdown is cancelled. The
//! cancellation token is checked before every sleep and again before every
//! tick, so once cancellation is observed no further tick runs.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::ChannelId;
use crate::display::DisplaySink;
use crate::error::AppError;

/// What a tick body wants to happen next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Handle to a running countdown task.
pub struct Countdown {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl Countdown {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns countdowns. Faults inside a tick are logged, reported to the
/// game's channel, and the countdown carries on.
#[derive(Clone)]
pub struct CountdownScheduler {
    display: Arc<dyn DisplaySink>,
    period: Duration,
}

impl CountdownScheduler {
    pub fn new(display: Arc<dyn DisplaySink>) -> Self {
        Self::with_period(display, Duration::from_secs(1))
    }

    pub fn with_period(display: Arc<dyn DisplaySink>, period: Duration) -> Self {
        Self { display, period }
    }

    pub fn spawn<F, Fut>(&self, label: &'static str, channel: ChannelId, mut tick: F) -> Countdown
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Flow, AppError>> + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let display = Arc::clone(&self.display);
        let period = self.period;

        let task = tokio::spawn(async move {
            tracing::debug!(channel, countdown = label, "Countdown started");
            loop {
                if cancelled.is_cancelled() {
                    break;
                }
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = tokio::time::sleep(period) => {},
                }
                if cancelled.is_cancelled() {
                    break;
                }

                let fault = match AssertUnwindSafe(tick()).catch_unwind().await {
                    Ok(Ok(Flow::Continue)) => continue,
                    Ok(Ok(Flow::Stop)) => break,
                    Ok(Err(e)) => e.to_string(),
                    Err(panic) => panic_message(panic.as_ref()),
                };
                tracing::error!(channel, countdown = label, error = %fault, "Error in game loop");
                display
                    .say(channel, format!("Error in game loop: {fault}"))
                    .await;
            }
            tracing::debug!(channel, countdown = label, "Countdown finished");
        });

        Countdown { token, task }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
