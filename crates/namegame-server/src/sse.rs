use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::extract::{Path, State};
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use futures::stream::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use crate::ChannelId;
use crate::display::DisplayOutput;
use crate::error::AppError;
use crate::state::{AppState, ConnectionGuard};

/// GET /api/v1/channels/{channel}/stream: everything shown in one channel.
pub async fn channel_stream(
    State(state): State<AppState>,
    Path(channel): Path<ChannelId>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, AppError> {
    let max_sse = state.config.limits.max_sse_subscribers;
    let current = state.sse_subscriber_count.load(Ordering::Relaxed);
    if current >= max_sse {
        tracing::warn!(current, max = max_sse, "SSE subscriber limit reached");
        return Err(AppError::Unavailable);
    }

    let guard = ConnectionGuard::new(Arc::clone(&state.sse_subscriber_count));
    let rx = state.display.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result: Result<DisplayOutput, _>| {
        let _guard = &guard;
        match result {
            Ok(output) if output.channel() == channel => {
                let kind = match &output {
                    DisplayOutput::Render { .. } => "render",
                    DisplayOutput::UpdateField { .. } => "update_field",
                    DisplayOutput::Say { .. } => "say",
                };
                let json = serde_json::to_string(&output).unwrap_or_default();
                Some(Ok(SseEvent::default().event(kind).data(json)))
            },
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(channel, "SSE broadcast receive error: {e}");
                None
            },
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
