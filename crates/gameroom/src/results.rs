use ludo_engine::GameResult;

/// Consumer of finished-game outcomes.
///
/// The coordinator produces at most one result per win (the engine's
/// `consume_results` contract); a sink's own retry policy may redeliver,
/// so implementations must be idempotent per winning event.
#[async_trait::async_trait]
pub trait ResultsSink: Send + Sync {
    async fn publish(&self, result: &GameResult);
}

/// Default sink: logs the outcome. The real statistics pipeline is an
/// external collaborator wired in by the hosting process.
pub struct LogSink;

#[async_trait::async_trait]
impl ResultsSink for LogSink {
    async fn publish(&self, result: &GameResult) {
        log::info!(
            "[results] {} won against {} participants",
            result.winner,
            result.participants.len().saturating_sub(1),
        );
    }
}
