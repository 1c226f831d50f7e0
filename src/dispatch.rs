//! Inbound dispatch loop
//!
//! Reads the gateway subscription in order and hands each message to its
//! own task. A semaphore bounds how many handlers run at once; a failed or
//! panicking handler never stops the loop.

use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::engine::{Outcome, TriggerEngine};
use crate::gateway::MessageStream;

/// Default number of messages handled concurrently
pub const DEFAULT_MAX_CONCURRENT: usize = 16;

pub struct Dispatcher {
    engine: Arc<TriggerEngine>,
    permits: Arc<Semaphore>,
}

/// Counters for one run of the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub received: u64,
    pub read_errors: u64,
    pub panicked: u64,
}

impl Dispatcher {
    pub fn new(engine: Arc<TriggerEngine>, max_concurrent: usize) -> Self {
        Self {
            engine,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn engine(&self) -> &Arc<TriggerEngine> {
        &self.engine
    }

    /// Consume the subscription until it ends, then drain in-flight handlers.
    pub async fn run(&self, mut messages: MessageStream) -> DispatchStats {
        let mut stats = DispatchStats::default();
        let mut tasks: JoinSet<Outcome> = JoinSet::new();

        info!("Dispatch loop started");
        while let Some(item) = messages.next().await {
            while let Some(done) = tasks.try_join_next() {
                Self::reap(done, &mut stats);
            }

            let msg = match item {
                Ok(msg) => msg,
                Err(e) => {
                    stats.read_errors += 1;
                    warn!(error = %e, "Read error on inbound subscription");
                    continue;
                }
            };
            stats.received += 1;

            let permit = match Arc::clone(&self.permits).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    error!("Handler semaphore closed, stopping dispatch");
                    break;
                }
            };

            let engine = Arc::clone(&self.engine);
            tasks.spawn(async move {
                let outcome = engine.handle(&msg).await;
                debug!(
                    sender = %msg.sender,
                    message_id = msg.message_id,
                    ?outcome,
                    "Message handled"
                );
                drop(permit);
                outcome
            });
        }

        info!(in_flight = tasks.len(), "Inbound subscription ended, draining handlers");
        while let Some(done) = tasks.join_next().await {
            Self::reap(done, &mut stats);
        }
        stats
    }

    fn reap(done: Result<Outcome, tokio::task::JoinError>, stats: &mut DispatchStats) {
        if let Err(e) = done {
            stats.panicked += 1;
            error!(error = %e, "Message handler task failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::error::GatewayError;
    use crate::gateway::{ChatGateway, RecordingGateway};
    use crate::store::MemoryClaimStore;
    use crate::types::{IncomingMessage, ProfileSnapshot};
    use crate::verifier::StaticVerifier;

    #[tokio::test]
    async fn test_read_errors_do_not_stop_the_loop() {
        let gateway = Arc::new(RecordingGateway::default().with_inbound(vec![
            Ok(IncomingMessage::text("alice", "c1", 1, "!help")),
            Err(GatewayError::Nats("garbled payload".to_string())),
            Ok(IncomingMessage::text("bob", "c2", 2, "I am a follower!")),
        ]));
        let store = Arc::new(MemoryClaimStore::new());
        let verifier = Arc::new(StaticVerifier::new(ProfileSnapshot {
            num_following: 30,
            ..Default::default()
        }));
        let engine = Arc::new(TriggerEngine::new(
            EngineConfig::default(),
            store.clone(),
            verifier,
            gateway.clone(),
        ));

        let dispatcher = Dispatcher::new(engine, 4);
        let stream = gateway.listen().await.unwrap();
        let stats = dispatcher.run(stream).await;

        assert_eq!(
            stats,
            DispatchStats {
                received: 2,
                read_errors: 1,
                panicked: 0,
            }
        );
        assert_eq!(gateway.texts().len(), 1);
        assert_eq!(gateway.payments().len(), 1);
        assert!(store.contains("bob", "following"));
    }

    #[tokio::test]
    async fn test_empty_stream_returns_immediately() {
        let gateway = Arc::new(RecordingGateway::default());
        let engine = Arc::new(TriggerEngine::new(
            EngineConfig::default(),
            Arc::new(MemoryClaimStore::new()),
            Arc::new(StaticVerifier::default()),
            gateway.clone(),
        ));
        let stats = Dispatcher::new(engine, 0)
            .run(gateway.listen().await.unwrap())
            .await;
        assert_eq!(stats, DispatchStats::default());
        assert!(gateway.actions().is_empty());
    }
}
