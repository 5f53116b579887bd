use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::ServerConfig;
use crate::countdown::CountdownScheduler;
use crate::display::{BroadcastDisplay, DisplaySink};
use crate::resolver::NameResolver;
use crate::service::NameGame;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub game: NameGame,
    pub display: Arc<BroadcastDisplay>,
    pub config: Arc<ServerConfig>,
    pub sse_subscriber_count: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(config: ServerConfig, resolver: Arc<dyn NameResolver>) -> Self {
        let display = Arc::new(BroadcastDisplay::new(config.limits.display_buffer));
        let sink: Arc<dyn DisplaySink> = Arc::clone(&display) as Arc<dyn DisplaySink>;
        let game = NameGame::new(
            config.rules.clone(),
            Store::in_memory(),
            resolver,
            Arc::clone(&sink),
            CountdownScheduler::new(sink),
        );
        Self {
            game,
            display,
            config: Arc::new(config),
            sse_subscriber_count: Arc::new(AtomicUsize::new(0)),
        }
    }
}

/// Counts a live connection for as long as it is held.
pub struct ConnectionGuard {
    count: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    pub fn new(count: Arc<AtomicUsize>) -> Self {
        count.fetch_add(1, Ordering::Relaxed);
        Self { count }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_tracks_connection_lifetime() {
        let count = Arc::new(AtomicUsize::new(0));
        let first = ConnectionGuard::new(Arc::clone(&count));
        let second = ConnectionGuard::new(Arc::clone(&count));
        assert_eq!(count.load(Ordering::Relaxed), 2);
        drop(first);
        assert_eq!(count.load(Ordering::Relaxed), 1);
        drop(second);
        assert_eq!(count.load(Ordering::Relaxed), 0);
    }
}
