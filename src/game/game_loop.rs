//! Headless driver - ticks a session at a fixed rate with autopilot input
//!
//! Advice replies are drained at the top of each tick so they are applied on
//! the simulation thread, never from the request task.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::advice::{AdviceService, AdviceSource};
use crate::game::input::InputSnapshot;
use crate::game::session::{Scene, Session, SessionEvent};
use crate::game::systems::autopilot::Autopilot;

/// Seconds between status lines
const STATUS_INTERVAL_SECS: u64 = 30;

/// What a driver run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoopSummary {
    pub ticks: u64,
    pub runs: u32,
    pub best_score: u32,
    pub advice_shown: u32,
}

impl LoopSummary {
    fn record(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Started => self.runs += 1,
            SessionEvent::GameOver { score, .. } => self.best_score = self.best_score.max(*score),
            SessionEvent::AdviceShown { .. } => self.advice_shown += 1,
            _ => {}
        }
    }
}

/// Drive `session` until `shutdown` resolves or the configured tick limit is reached.
///
/// With no advice service, advice requests raised by the session are ignored.
pub async fn run<S, F>(
    session: Arc<Mutex<Session>>,
    advice: Option<&AdviceService<S>>,
    shutdown: F,
) -> LoopSummary
where
    S: AdviceSource,
    F: Future<Output = ()>,
{
    let (tick_rate, max_ticks) = {
        let guard = session.lock();
        (guard.config().tick_rate.max(1), guard.config().max_ticks)
    };
    let dt = 1.0 / tick_rate as f32;

    let mut ticker = interval(Duration::from_secs_f64(1.0 / f64::from(tick_rate)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let autopilot = Autopilot::new();
    let mut previous_input = InputSnapshot::none();
    let mut summary = LoopSummary::default();
    let start = Instant::now();
    let status_every = u64::from(tick_rate) * STATUS_INTERVAL_SECS;

    info!("Runner loop started at {} Hz", tick_rate);

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                info!("Runner loop stopping");
                break;
            }
        }

        let events = {
            let mut guard = session.lock();

            let mut events: Vec<SessionEvent> = Vec::new();
            if let Some(service) = advice {
                for reply in service.drain() {
                    events.extend(guard.receive_advice(reply));
                }
            }

            let input = autopilot
                .decide(guard.run(), guard.player(), guard.platforms())
                .with_edges(&previous_input);
            previous_input = input;

            guard.sanitize();
            events.extend(guard.tick(dt, &input));
            guard.sanitize();

            if events.iter().any(|e| matches!(e, SessionEvent::GameOver { .. })) {
                match serde_json::to_string(&guard.snapshot()) {
                    Ok(json) => trace!("Final state: {}", json),
                    Err(e) => debug!("Failed to serialize final state: {}", e),
                }
            }
            events
        };

        summary.ticks += 1;

        for event in &events {
            summary.record(event);
            log_event(event);

            let Some(service) = advice else {
                continue;
            };
            match event {
                // The reply comes back through the channel
                SessionEvent::AdviceRequested { generation } => service.request(*generation),
                // Pending replies belong to an old generation now
                SessionEvent::GameOver { .. } | SessionEvent::Restarted => {
                    service.cancel_all();
                }
                _ => {}
            }
        }

        if summary.ticks % status_every == 0 {
            let pending = advice.map_or(0, |service| service.in_flight());
            let guard = session.lock();
            info!(
                "Runner: {}s, tick {}, phase {:?}, score {}, speed {:.1}, lives {}, hazards {}, advice pending {}",
                start.elapsed().as_secs(),
                guard.tick_count(),
                guard.phase(),
                guard.run().score,
                guard.run().speed,
                guard.run().lives,
                guard.hazards().len(),
                pending
            );
        }

        if max_ticks.is_some_and(|max| summary.ticks >= max) {
            info!("Tick limit reached ({})", summary.ticks);
            break;
        }
    }

    if let Some(service) = advice {
        service.cancel_all();
    }

    let mut guard = session.lock();
    summary.best_score = summary.best_score.max(guard.run().score);
    guard.teardown();

    summary
}

fn log_event(event: &SessionEvent) {
    match event {
        SessionEvent::PlatformRecycled { index, x, y } => {
            trace!("Platform {} recycled to ({:.0}, {:.0})", index, x, y)
        }
        SessionEvent::ScoreChanged { score } => trace!("Score {}", score),
        SessionEvent::HazardSpawned { id } => trace!("Hazard {} spawned", id),
        SessionEvent::HazardDespawned { id, reason } => trace!("Hazard {} despawned ({:?})", id, reason),
        SessionEvent::StarCollected { stars, .. } => debug!("Star collected, holding {}", stars),
        SessionEvent::LifeLost { lives } => debug!("Life lost, {} left", lives),
        SessionEvent::AdviceShown { text } => info!("Advice: {}", text),
        other => debug!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::advice::{AdviceError, CannedAdvice};
    use crate::config::RunnerConfig;

    fn fast_config(max_ticks: u64) -> RunnerConfig {
        let mut config = RunnerConfig::default();
        config.seed = Some(77);
        config.tick_rate = 1_000;
        config.max_ticks = Some(max_ticks);
        config.advice.enabled = false;
        config
    }

    #[test]
    fn test_stops_at_tick_limit() {
        let session = Arc::new(Mutex::new(Session::new(fast_config(120)).unwrap()));
        let summary = tokio_test::block_on(run::<CannedAdvice, _>(
            session.clone(),
            None,
            std::future::pending(),
        ));

        assert_eq!(summary.ticks, 120);
        assert!(summary.runs >= 1);
        assert!(session.lock().tick(1.0, &InputSnapshot::none()).is_empty());
    }

    #[test]
    fn test_shutdown_stops_loop() {
        let mut config = fast_config(1);
        config.max_ticks = None;
        let session = Arc::new(Mutex::new(Session::new(config).unwrap()));
        let summary = tokio_test::block_on(run::<CannedAdvice, _>(
            session,
            None,
            async { tokio::time::sleep(Duration::from_millis(50)).await },
        ));
        assert!(summary.ticks > 0);
    }

    #[test]
    fn test_advice_flows_back_into_session() {
        let mut config = fast_config(400);
        config.advice.enabled = true;
        config.advice.only_while_running = false;
        config.advice.interval_ms = 10;
        config.advice.display_ms = 10_000;
        let session = Arc::new(Mutex::new(Session::new(config).unwrap()));

        let service = AdviceService::new(CannedAdvice::new());
        let summary = tokio_test::block_on(run(session, Some(&service), std::future::pending()));
        assert!(summary.advice_shown > 0);
    }

    #[test]
    fn test_pending_advice_cancelled_on_stop() {
        struct Hanging(Arc<AtomicUsize>);

        impl AdviceSource for Hanging {
            fn fetch(&self) -> impl Future<Output = Result<String, AdviceError>> + Send {
                self.0.fetch_add(1, Ordering::Relaxed);
                std::future::pending::<Result<String, AdviceError>>()
            }
        }

        let mut config = fast_config(100);
        config.advice.enabled = true;
        config.advice.only_while_running = false;
        config.advice.interval_ms = 10;
        let session = Arc::new(Mutex::new(Session::new(config).unwrap()));
        let fetches = Arc::new(AtomicUsize::new(0));
        let service = AdviceService::new(Hanging(fetches.clone()));

        let summary = tokio_test::block_on(run(session, Some(&service), std::future::pending()));
        assert_eq!(summary.ticks, 100);
        assert_eq!(summary.advice_shown, 0);
        assert!(fetches.load(Ordering::Relaxed) > 0);
        assert_eq!(service.in_flight(), 0);
        assert_eq!(service.cancel_all(), 0);
    }
}
