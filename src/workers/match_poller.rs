use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch, RwLock};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::api::SportsPlexClient;
use crate::models::{BoardUpdate, LifecyclePhase, MatchRecord};
use crate::status::MatchBoard;

/// Outcome of a single poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A fresh board was published
    Published,
    /// The fetch failed; the previous board stays in place
    Failed,
    /// Shutdown was signalled; nothing was published
    Cancelled,
}

/// Worker that periodically fetches matches and publishes a classified board
pub struct MatchPollerWorker {
    client: SportsPlexClient,
    board: Arc<RwLock<MatchBoard>>,
    update_tx: mpsc::Sender<BoardUpdate>,
    poll_interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl MatchPollerWorker {
    /// Create a new match poller worker
    pub fn new(
        client: SportsPlexClient,
        board: Arc<RwLock<MatchBoard>>,
        update_tx: mpsc::Sender<BoardUpdate>,
        poll_interval_secs: u64,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            client,
            board,
            update_tx,
            poll_interval: Duration::from_secs(poll_interval_secs),
            shutdown,
        }
    }

    /// Run the worker loop until shutdown is signalled
    pub async fn run(mut self) {
        info!("Match poller started (interval: {:?})", self.poll_interval);

        // First tick completes immediately
        let mut interval = time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => break,
                _ = interval.tick() => {}
            }

            if self.poll().await == PollOutcome::Cancelled {
                break;
            }
        }

        info!("Match poller stopped");
    }

    /// Fetch, classify and publish once. An in-flight fetch is abandoned if
    /// shutdown fires before it resolves.
    pub async fn poll(&mut self) -> PollOutcome {
        if self.is_shut_down() {
            return PollOutcome::Cancelled;
        }

        let fetch = self.client.fetch_matches();
        tokio::pin!(fetch);

        let fetched = loop {
            tokio::select! {
                result = &mut fetch => break result,
                changed = self.shutdown.changed() => {
                    // A dropped sender counts as shutdown
                    if changed.is_err() || *self.shutdown.borrow() {
                        info!("Shutdown during match fetch, discarding response");
                        return PollOutcome::Cancelled;
                    }
                    debug!("Shutdown flag cleared during match fetch, still waiting");
                }
            }
        };

        let records = match fetched {
            Ok(records) => records,
            Err(e) => {
                error!("Failed to fetch matches: {}", e);
                warn!("Will retry on next interval");
                return PollOutcome::Failed;
            }
        };

        if self.is_shut_down() {
            return PollOutcome::Cancelled;
        }

        self.publish(Utc::now(), records).await;
        PollOutcome::Published
    }

    /// Classify `records` at `now`, swap the shared board and notify the reporter
    pub async fn publish(&self, now: DateTime<Utc>, records: Vec<MatchRecord>) {
        let board = MatchBoard::classify(now, records);

        debug!(
            "Classified {} matches ({} live, {} invalid)",
            board.matches.len(),
            board.count(&LifecyclePhase::Live),
            board.invalid.len()
        );

        let previous = {
            let mut shared = self.board.write().await;
            std::mem::replace(&mut *shared, board.clone())
        };

        let update = BoardUpdate {
            board,
            previous: previous.evaluated_at.is_some().then_some(previous),
        };

        if let Err(e) = self.update_tx.send(update).await {
            warn!("Failed to send board update: {}", e);
        }
    }

    fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const BODY: &str = r#"{ "matches": [
        { "_id": "m1", "sport": "Football", "matchDate": "2020-01-01T10:00:00Z" },
        { "_id": "m2", "sport": "Cricket", "matchDate": "2999-01-01T10:00:00Z" },
        { "_id": "m3", "sport": "Cricket" }
    ] }"#;

    struct Harness {
        worker: MatchPollerWorker,
        board: Arc<RwLock<MatchBoard>>,
        update_rx: mpsc::Receiver<BoardUpdate>,
        shutdown_tx: watch::Sender<bool>,
    }

    fn harness(base_url: &str) -> Harness {
        let client = SportsPlexClient::new(base_url, None, Duration::from_secs(5)).unwrap();
        let board = Arc::new(RwLock::new(MatchBoard::default()));
        let (update_tx, update_rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker = MatchPollerWorker::new(
            client,
            Arc::clone(&board),
            update_tx,
            1,
            shutdown_rx,
        );

        Harness {
            worker,
            board,
            update_rx,
            shutdown_tx,
        }
    }

    async fn match_server() -> mockito::ServerGuard {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/matches")
            .with_status(200)
            .with_body(BODY)
            .create_async()
            .await;
        server
    }

    #[tokio::test]
    async fn test_poll_publishes_board() {
        let server = match_server().await;
        let mut h = harness(&server.url());

        assert_eq!(h.worker.poll().await, PollOutcome::Published);

        let board = h.board.read().await;
        assert_eq!(board.phase_of("m1"), Some(&LifecyclePhase::Completed));
        assert_eq!(board.phase_of("m2"), Some(&LifecyclePhase::Upcoming));
        assert_eq!(board.invalid.len(), 1);

        let update = h.update_rx.recv().await.unwrap();
        assert!(update.previous.is_none());
        assert_eq!(update.board.matches.len(), 2);
    }

    #[tokio::test]
    async fn test_second_poll_carries_previous_board() {
        let server = match_server().await;
        let mut h = harness(&server.url());

        h.worker.poll().await;
        h.worker.poll().await;

        h.update_rx.recv().await.unwrap();
        let second = h.update_rx.recv().await.unwrap();
        assert!(second.previous.is_some());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_board() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/matches")
            .with_status(500)
            .create_async()
            .await;
        let mut h = harness(&server.url());

        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        h.worker
            .publish(
                now,
                vec![MatchRecord {
                    id: Some("kept".to_string()),
                    match_date: Some("2026-01-02T00:00:00Z".to_string()),
                    ..Default::default()
                }],
            )
            .await;

        assert_eq!(h.worker.poll().await, PollOutcome::Failed);
        assert_eq!(
            h.board.read().await.phase_of("kept"),
            Some(&LifecyclePhase::Upcoming)
        );
    }

    #[tokio::test]
    async fn test_poll_after_shutdown_publishes_nothing() {
        let server = match_server().await;
        let mut h = harness(&server.url());

        h.shutdown_tx.send(true).unwrap();

        assert_eq!(h.worker.poll().await, PollOutcome::Cancelled);
        assert!(h.board.read().await.evaluated_at.is_none());
        assert!(h.update_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_shutdown_abandons_in_flight_fetch() {
        // Accepts connections but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let Harness {
            mut worker,
            board,
            update_rx: _update_rx,
            shutdown_tx,
        } = harness(&url);

        tokio::spawn(async move {
            time::sleep(Duration::from_millis(50)).await;
            let _ = shutdown_tx.send(true);
        });

        let outcome = time::timeout(Duration::from_secs(2), worker.poll())
            .await
            .unwrap();

        assert_eq!(outcome, PollOutcome::Cancelled);
        assert!(board.read().await.evaluated_at.is_none());
        drop(listener);
    }

    #[tokio::test]
    async fn test_cleared_flag_does_not_cancel_fetch() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Answers the first request after a short delay
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            time::sleep(Duration::from_millis(150)).await;
            let body = r#"[{ "_id": "late", "sport": "Football", "matchDate": "2020-01-01T10:00:00Z" }]"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
        });

        let Harness {
            mut worker,
            board,
            update_rx: _update_rx,
            shutdown_tx,
        } = harness(&url);

        let flag = tokio::spawn(async move {
            time::sleep(Duration::from_millis(30)).await;
            let _ = shutdown_tx.send(false);
            // Keep the sender alive until the fetch resolves
            time::sleep(Duration::from_secs(1)).await;
        });

        let outcome = time::timeout(Duration::from_secs(2), worker.poll())
            .await
            .unwrap();

        assert_eq!(outcome, PollOutcome::Published);
        assert_eq!(
            board.read().await.phase_of("late"),
            Some(&LifecyclePhase::Completed)
        );
        flag.abort();
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let server = match_server().await;
        let Harness {
            worker,
            board,
            mut update_rx,
            shutdown_tx,
        } = harness(&server.url());

        let handle = tokio::spawn(worker.run());

        let update = time::timeout(Duration::from_secs(2), update_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(update.board.matches.len(), 2);

        shutdown_tx.send(true).unwrap();
        time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();

        assert!(board.read().await.evaluated_at.is_some());
    }
}
