//! Runner session - owns all per-scene state and runs one tick at a time
//!
//! Tick order is fixed: input gate, terminal check, world update
//! (locomotion, kinematics, scroll, platforms, stars, hazards), then timers.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::advice::AdviceReply;
use crate::config::{ConfigError, RunnerConfig, StarPlacement};
use crate::game::input::InputSnapshot;
use crate::game::state::{
    AdviceBanner, Hazard, HazardId, Hud, Phase, Platform, Player, RunState, Star,
};
use crate::game::systems::hazards::{self, DespawnReason};
use crate::game::systems::platforms::PlatformPool;
use crate::game::systems::terminal::{self, DeathCause};
use crate::game::systems::{kinematics, locomotion, stars};
use crate::game::timer::{tick_duration, Countdown, Interval};
use crate::util::vec2::Vec2;

/// Engine-facing lifecycle of a scene
pub trait Scene {
    /// Build (or rebuild) the scene from scratch
    fn initialize(&mut self);
    /// Advance one simulation step of `dt` seconds
    fn tick(&mut self, dt: f32, input: &InputSnapshot) -> Vec<SessionEvent>;
    /// Stop all timers and invalidate pending advice
    fn teardown(&mut self);
}

/// Things that happened during a tick, in the order they happened
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started,
    ScoreChanged { score: u32 },
    SpeedRamped { speed: f32, fall_speed_factor: f32 },
    PlatformRecycled { index: usize, x: f32, y: f32 },
    StarCollected { index: usize, stars: u32 },
    LifeGained { lives: u32 },
    LifeLost { lives: u32 },
    HazardSpawned { id: HazardId },
    HazardDespawned { id: HazardId, reason: DespawnReason },
    GameOver { cause: DeathCause, score: u32 },
    Restarted,
    AdviceRequested { generation: u64 },
    AdviceShown { text: String },
    AdviceCleared,
}

/// Serializable view of the session for logging
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot<'a> {
    pub tick: u64,
    pub run: &'a RunState,
    pub player: &'a Player,
    pub platforms: &'a [Platform],
    pub stars: &'a [Star],
    pub hazards: &'a [Hazard],
    pub banner: &'a AdviceBanner,
}

/// Timers owned by the session
#[derive(Debug, Clone)]
struct Timers {
    score: Interval,
    ramp: Interval,
    hazard: Interval,
    advice: Interval,
    banner: Countdown,
}

impl Timers {
    fn new(config: &RunnerConfig) -> Self {
        Self {
            score: Interval::from_millis(config.difficulty.score_interval_ms),
            ramp: Interval::from_millis(config.difficulty.ramp_interval_ms),
            hazard: Interval::from_millis(config.hazards.spawn_interval_ms),
            advice: Interval::from_millis(config.advice.interval_ms),
            banner: Countdown::default(),
        }
    }

    fn stop_run_timers(&mut self) {
        self.score.stop();
        self.ramp.stop();
        self.hazard.stop();
    }
}

/// A single runner scene
pub struct Session {
    config: RunnerConfig,
    rng: StdRng,
    run: RunState,
    player: Player,
    platforms: PlatformPool,
    stars: Vec<Star>,
    hazards: Vec<Hazard>,
    next_hazard_id: HazardId,
    banner: AdviceBanner,
    /// Bumped whenever pending advice must be ignored
    advice_generation: u64,
    timers: Timers,
    tick: u64,
    torn_down: bool,
}

impl Session {
    /// Validate `config` and build a ready-to-tick scene
    pub fn new(config: RunnerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut platforms = PlatformPool::populate(&config.platforms, &mut rng);
        let stars = stars::populate(&config.stars, &mut platforms, config.world.width, &mut rng);

        let mut session = Self {
            run: RunState::new(&config.difficulty),
            player: Player::spawn(&config.player),
            timers: Timers::new(&config),
            platforms,
            stars,
            hazards: Vec::new(),
            next_hazard_id: 1,
            banner: AdviceBanner::default(),
            advice_generation: 0,
            tick: 0,
            torn_down: false,
            rng,
            config,
        };
        session.arm_idle_advice();

        info!(
            "Session ready: mode={:?}, platforms={}, stars={}, hazards={}",
            session.config.player.mode,
            session.platforms.len(),
            session.stars.len(),
            session.config.hazards.enabled
        );

        Ok(session)
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn phase(&self) -> Phase {
        self.run.phase
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn platforms(&self) -> &PlatformPool {
        &self.platforms
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    pub fn banner(&self) -> &AdviceBanner {
        &self.banner
    }

    pub fn advice_generation(&self) -> u64 {
        self.advice_generation
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            tick: self.tick,
            run: &self.run,
            player: &self.player,
            platforms: self.platforms.as_slice(),
            stars: &self.stars,
            hazards: &self.hazards,
            banner: &self.banner,
        }
    }

    /// Display elements for the current state
    pub fn hud(&self) -> Hud {
        Hud {
            score: self.run.score,
            stars: self.run.stars,
            lives: self.lives_enabled().then_some(self.run.lives),
            start_prompt: !self.run.is_started(),
            game_over: self.run.is_over(),
            retry_prompt: self.run.is_over(),
            advice: self.banner.visible.then(|| self.banner.text.clone()),
        }
    }

    fn lives_enabled(&self) -> bool {
        self.config.stars.enabled && self.config.stars.lives_enabled
    }

    /// Apply a finished advice request
    pub fn receive_advice(&mut self, reply: AdviceReply) -> Option<SessionEvent> {
        if self.torn_down || reply.generation != self.advice_generation {
            debug!(
                "Discarding stale advice (generation {} != {})",
                reply.generation, self.advice_generation
            );
            return None;
        }

        match reply.result {
            Ok(text) => {
                self.banner.show(text.clone());
                self.timers
                    .banner
                    .arm(std::time::Duration::from_millis(self.config.advice.display_ms));
                Some(SessionEvent::AdviceShown { text })
            }
            Err(e) => {
                warn!("Advice request failed: {}", e);
                None
            }
        }
    }

    /// Replace non-finite player state so one bad step cannot poison the run
    pub fn sanitize(&mut self) {
        if !self.player.position.is_finite() {
            warn!("Fixed non-finite player position");
            self.player.position = Player::spawn(&self.config.player).position;
        }
        if !self.player.velocity.is_finite() {
            warn!("Fixed non-finite player velocity");
            self.player.velocity = Vec2::ZERO;
        }
    }

    /// Advice requests run outside of a run only when not gated to Running
    fn arm_idle_advice(&mut self) {
        let idle = self.config.advice.enabled && !self.config.advice.only_while_running;
        if idle && !self.timers.advice.is_running() {
            self.timers.advice.start();
        }
    }

    fn rebuild_world(&mut self) {
        self.run = RunState::new(&self.config.difficulty);
        self.player = Player::spawn(&self.config.player);
        self.platforms = PlatformPool::populate(&self.config.platforms, &mut self.rng);
        self.stars = stars::populate(
            &self.config.stars,
            &mut self.platforms,
            self.config.world.width,
            &mut self.rng,
        );
        self.hazards.clear();
    }

    fn start(&mut self, events: &mut Vec<SessionEvent>) {
        self.run.phase = Phase::Running;
        self.run.score = 0;
        self.timers.score.start();
        self.timers.ramp.start();
        if self.config.hazards.enabled {
            self.timers.hazard.start();
        }
        if self.config.advice.enabled && self.config.advice.only_while_running {
            self.timers.advice.start();
        }

        info!("Run started");
        events.push(SessionEvent::Started);
        events.push(SessionEvent::ScoreChanged { score: 0 });
    }

    fn end_run(&mut self, cause: DeathCause, events: &mut Vec<SessionEvent>) {
        self.run.phase = Phase::GameOver;
        self.player.velocity = Vec2::ZERO;
        self.timers.stop_run_timers();
        if self.config.advice.only_while_running {
            self.timers.advice.stop();
        }
        self.advice_generation += 1;

        info!(
            "Game over ({:?}): score={}, speed={:.1}",
            cause, self.run.score, self.run.speed
        );
        events.push(SessionEvent::GameOver {
            cause,
            score: self.run.score,
        });
    }

    fn restart(&mut self, events: &mut Vec<SessionEvent>) {
        self.timers.stop_run_timers();
        self.rebuild_world();
        self.advice_generation += 1;

        info!("Run reset");
        events.push(SessionEvent::Restarted);
        events.push(SessionEvent::ScoreChanged { score: 0 });
    }

    fn update_world(&mut self, dt: f32, input: &InputSnapshot, events: &mut Vec<SessionEvent>) {
        locomotion::apply_input(&mut self.player, input, &self.config.player, &self.run);
        kinematics::step_player(
            &mut self.player,
            self.platforms.as_slice(),
            &self.config.world,
            self.config.player.landing_tolerance,
            dt,
        );

        let dx = self.run.speed * dt;
        self.run.background_offset += dx;

        self.platforms.scroll(dx);
        let recycled = self
            .platforms
            .recycle(&self.config.platforms, self.player.position.x, &mut self.rng);
        for &index in &recycled {
            if let Some(p) = self.platforms.get(index) {
                events.push(SessionEvent::PlatformRecycled {
                    index,
                    x: p.x,
                    y: p.y,
                });
            }
        }

        self.update_stars(dx, &recycled, events);
        self.update_hazards(dx, dt, events);
    }

    fn update_stars(&mut self, dx: f32, recycled: &[usize], events: &mut Vec<SessionEvent>) {
        if !self.config.stars.enabled {
            return;
        }

        match self.config.stars.placement {
            StarPlacement::OnPlatforms { .. } => {
                stars::follow_platforms(&self.config.stars, &mut self.stars, &self.platforms, recycled);
            }
            StarPlacement::Scrolling { .. } => {
                stars::scroll_independent(
                    &self.config.stars,
                    &mut self.stars,
                    dx,
                    self.config.world.width,
                    &mut self.rng,
                );
            }
        }

        let collected = stars::collect(&mut self.stars, &self.player.bounds());
        for index in collected {
            self.run.collect_star();
            events.push(SessionEvent::StarCollected {
                index,
                stars: self.run.stars,
            });
        }

        if self.lives_enabled() && self.run.exchange_stars(self.config.stars.exchange_rate) {
            debug!("Stars exchanged for a life: lives={}", self.run.lives);
            events.push(SessionEvent::LifeGained {
                lives: self.run.lives,
            });
        }
    }

    fn update_hazards(&mut self, dx: f32, dt: f32, events: &mut Vec<SessionEvent>) {
        if self.hazards.is_empty() {
            return;
        }

        let despawned = hazards::update(
            &mut self.hazards,
            self.platforms.as_slice(),
            &self.config.world,
            dx,
            self.run.lives,
            dt,
        );
        for d in despawned {
            events.push(SessionEvent::HazardDespawned {
                id: d.id,
                reason: d.reason,
            });
        }

        let hits = hazards::hit_player(&mut self.hazards, &self.player.bounds());
        for hit in hits {
            events.push(SessionEvent::HazardDespawned {
                id: hit.id,
                reason: hit.reason,
            });
            if !self.run.is_running() {
                continue;
            }
            if self.run.lives > 0 {
                self.run.lives -= 1;
                events.push(SessionEvent::LifeLost {
                    lives: self.run.lives,
                });
            } else {
                self.end_run(DeathCause::Hazard, events);
            }
        }
    }

    /// Score, ramp and hazard timers; only live while Running
    fn advance_run_timers(&mut self, dt: std::time::Duration, events: &mut Vec<SessionEvent>) {
        let scored = self.timers.score.advance(dt);
        if scored > 0 {
            self.run.score += scored;
            events.push(SessionEvent::ScoreChanged {
                score: self.run.score,
            });
        }

        for _ in 0..self.timers.ramp.advance(dt) {
            self.run.ramp(self.config.difficulty.growth);
            debug!("Difficulty ramp: speed={:.1}", self.run.speed);
            events.push(SessionEvent::SpeedRamped {
                speed: self.run.speed,
                fall_speed_factor: self.run.fall_speed_factor,
            });
        }

        for _ in 0..self.timers.hazard.advance(dt) {
            let id = self.next_hazard_id;
            self.next_hazard_id += 1;
            let hazard = hazards::spawn(
                &self.config.hazards,
                self.config.world.width,
                self.run.fall_speed_factor,
                id,
                &mut self.rng,
            );
            self.hazards.push(hazard);
            events.push(SessionEvent::HazardSpawned { id });
        }
    }

    /// Advice interval and banner display; these outlive individual runs
    fn advance_advice_timers(&mut self, dt: std::time::Duration, events: &mut Vec<SessionEvent>) {
        for _ in 0..self.timers.advice.advance(dt) {
            events.push(SessionEvent::AdviceRequested {
                generation: self.advice_generation,
            });
        }

        if self.timers.banner.advance(dt) {
            self.banner.clear();
            events.push(SessionEvent::AdviceCleared);
        }
    }
}

impl Scene for Session {
    fn initialize(&mut self) {
        self.timers = Timers::new(&self.config);
        self.rebuild_world();
        self.banner.clear();
        self.advice_generation += 1;
        self.tick = 0;
        self.torn_down = false;
        self.arm_idle_advice();
    }

    fn tick(&mut self, dt: f32, input: &InputSnapshot) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.torn_down {
            return events;
        }

        let elapsed = tick_duration(dt);
        let dt = elapsed.as_secs_f32();
        self.tick += 1;

        match self.run.phase {
            Phase::NotStarted => {
                if !input.any_direction() {
                    self.advance_advice_timers(elapsed, &mut events);
                    return events;
                }
                self.start(&mut events);
                // Timers begin counting from the next tick
                self.update_world(dt, input, &mut events);
                self.advance_advice_timers(elapsed, &mut events);
                return events;
            }
            Phase::GameOver => {
                if input.retry_requested() {
                    self.restart(&mut events);
                }
                self.advance_advice_timers(elapsed, &mut events);
                return events;
            }
            Phase::Running => {}
        }

        if let Some(cause) = terminal::check(&self.player, &self.config.terminal, &self.config.world) {
            self.end_run(cause, &mut events);
            self.advance_advice_timers(elapsed, &mut events);
            return events;
        }

        self.update_world(dt, input, &mut events);

        if self.run.is_running() {
            self.advance_run_timers(elapsed, &mut events);
        }
        self.advance_advice_timers(elapsed, &mut events);

        events
    }

    fn teardown(&mut self) {
        self.timers.stop_run_timers();
        self.timers.advice.stop();
        self.timers.banner.cancel();
        self.hazards.clear();
        self.banner.clear();
        self.advice_generation += 1;
        self.torn_down = true;
        info!("Session torn down after {} ticks", self.tick);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::AdviceError;
    use crate::config::{LocomotionMode, RecycleX};
    use crate::game::input::Key;

    fn quiet_config() -> RunnerConfig {
        let mut config = RunnerConfig::default();
        config.seed = Some(1234);
        config.hazards.enabled = false;
        config.advice.enabled = false;
        config
    }

    fn session(config: RunnerConfig) -> Session {
        Session::new(config).unwrap()
    }

    fn start(session: &mut Session) {
        let events = session.tick(0.0, &InputSnapshot::holding(&[Key::Right]));
        assert!(events.contains(&SessionEvent::Started));
    }

    /// Keep the player parked on the ground, clear of platforms and the left edge
    fn park(session: &mut Session) {
        session.player.position.x = 400.0;
        session.player.position.y = 488.0;
        session.player.velocity.y = 0.0;
        session.player.on_surface = true;
    }

    fn autorun_config() -> RunnerConfig {
        let mut config = quiet_config();
        config.player.mode = LocomotionMode::Autorun;
        config.stars.enabled = false;
        config
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let mut config = quiet_config();
        config.platforms.spacing_range = -10.0;
        assert!(Session::new(config).is_err());

        let mut config = quiet_config();
        config.difficulty.base_speed = f32::NAN;
        assert!(matches!(Session::new(config), Err(ConfigError::NotFinite(_))));
    }

    #[test]
    fn test_not_started_is_pass_through() {
        let mut s = session(quiet_config());
        let run_before = s.run.clone();
        let platforms_before: Vec<(f32, f32)> = s.platforms.iter().map(|p| (p.x, p.y)).collect();
        let player_before = s.player.position;

        for _ in 0..600 {
            let events = s.tick(1.0 / 60.0, &InputSnapshot::holding(&[Key::Space]));
            assert!(events.is_empty());
        }

        assert_eq!(s.run, run_before);
        assert_eq!(s.player.position, player_before);
        let platforms_after: Vec<(f32, f32)> = s.platforms.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(platforms_after, platforms_before);
        assert_eq!(s.hud().prompts(), vec!["Press the arrow keys to start"]);
    }

    #[test]
    fn test_first_direction_starts_run() {
        let mut s = session(quiet_config());
        let events = s.tick(1.0 / 60.0, &InputSnapshot::holding(&[Key::Down]));
        assert_eq!(events[0], SessionEvent::Started);
        assert_eq!(s.phase(), Phase::Running);
        assert!(!s.hud().start_prompt);
    }

    #[test]
    fn test_treadmill_push_out_after_one_second() {
        let mut config = quiet_config();
        config.difficulty.base_speed = 100.0;
        config.stars.enabled = false;
        let mut s = session(config);
        assert_eq!(s.player.position.x, 100.0);

        start(&mut s);
        for _ in 0..4 {
            s.tick(0.25, &InputSnapshot::none());
            assert_eq!(s.phase(), Phase::Running);
        }
        assert_eq!(s.player.position.x, 0.0);

        let events = s.tick(0.25, &InputSnapshot::none());
        assert!(events.contains(&SessionEvent::GameOver {
            cause: DeathCause::LeftEdge,
            score: 1,
        }));
        assert_eq!(s.phase(), Phase::GameOver);
        assert_eq!(s.player.velocity, Vec2::ZERO);

        let hud = s.hud();
        assert!(hud.game_over);
        assert!(hud.retry_prompt);
    }

    #[test]
    fn test_right_input_compensates_treadmill() {
        let mut config = quiet_config();
        config.difficulty.base_speed = 100.0;
        config.stars.enabled = false;
        let mut s = session(config);
        start(&mut s);
        for _ in 0..8 {
            s.tick(0.25, &InputSnapshot::holding(&[Key::Right]));
        }
        assert_eq!(s.phase(), Phase::Running);
        assert!(s.player.position.x > 100.0);
    }

    #[test]
    fn test_score_counts_whole_seconds() {
        let mut s = session(autorun_config());
        start(&mut s);
        park(&mut s);

        let mut elapsed_ms = 0u64;
        for _ in 0..40 {
            s.tick(0.25, &InputSnapshot::none());
            elapsed_ms += 250;
            assert_eq!(u64::from(s.run.score), elapsed_ms / 1000);
            assert_eq!(s.hud().score_text(), format!("Score: {}", elapsed_ms / 1000));
        }
        assert_eq!(s.run.score, 10);
    }

    #[test]
    fn test_score_freezes_on_game_over_and_resets_on_retry() {
        let mut s = session(autorun_config());
        start(&mut s);
        park(&mut s);
        for _ in 0..12 {
            s.tick(0.25, &InputSnapshot::none());
        }
        assert_eq!(s.run.score, 3);

        s.player.position.x = -1.0;
        s.tick(0.25, &InputSnapshot::none());
        assert_eq!(s.phase(), Phase::GameOver);

        for _ in 0..20 {
            s.tick(0.25, &InputSnapshot::none());
        }
        assert_eq!(s.run.score, 3);

        let events = s.tick(0.0, &InputSnapshot::holding(&[Key::Space]));
        assert!(events.contains(&SessionEvent::Restarted));
        assert_eq!(s.phase(), Phase::NotStarted);
        assert_eq!(s.run.score, 0);
        assert!(s.hud().start_prompt);
        assert!(!s.hud().game_over);

        // Nothing counts until the next start
        for _ in 0..8 {
            s.tick(0.25, &InputSnapshot::none());
        }
        assert_eq!(s.run.score, 0);

        start(&mut s);
        park(&mut s);
        for _ in 0..4 {
            s.tick(0.25, &InputSnapshot::none());
        }
        assert_eq!(s.run.score, 1);
    }

    #[test]
    fn test_difficulty_ramp_and_reset() {
        let mut s = session(autorun_config());
        start(&mut s);
        park(&mut s);

        let mut ramps = 0;
        for _ in 0..60 {
            let events = s.tick(0.25, &InputSnapshot::none());
            ramps += events
                .iter()
                .filter(|e| matches!(e, SessionEvent::SpeedRamped { .. }))
                .count();
            park(&mut s);
        }
        assert_eq!(ramps, 3);
        assert!((s.run.speed - 266.2).abs() < 1e-2);
        assert!((s.run.fall_speed_factor - 1.331).abs() < 1e-4);

        s.player.position.x = 0.0;
        s.tick(0.25, &InputSnapshot::none());
        assert_eq!(s.phase(), Phase::GameOver);

        // Ramp is stopped while game over
        for _ in 0..40 {
            s.tick(0.25, &InputSnapshot::none());
        }
        assert!((s.run.speed - 266.2).abs() < 1e-2);

        s.tick(0.0, &InputSnapshot::holding(&[Key::Space]));
        assert_eq!(s.run.speed, 200.0);
        assert_eq!(s.run.fall_speed_factor, 1.0);

        // No carry-over of partial ramp progress
        start(&mut s);
        park(&mut s);
        for _ in 0..19 {
            s.tick(0.25, &InputSnapshot::none());
            park(&mut s);
        }
        assert_eq!(s.run.speed, 200.0);
    }

    #[test]
    fn test_pool_size_constant_over_long_run() {
        let mut config = quiet_config();
        config.platforms.capacity = 10;
        config.platforms.recycle_x = RecycleX::AheadOfPlayer(crate::game::constants::platforms::LOOKAHEAD);
        config.terminal.left_limit = f32::NEG_INFINITY;
        config.terminal.fall_through = false;
        let mut s = session(config);
        start(&mut s);

        let mut recycles = 0;
        for _ in 0..5_000 {
            let events = s.tick(1.0 / 60.0, &InputSnapshot::holding(&[Key::Right]));
            for event in &events {
                if let SessionEvent::PlatformRecycled { x, y, .. } = *event {
                    recycles += 1;
                    assert!(x >= 0.0);
                    assert!((200.0..=500.0).contains(&y));
                }
            }
            assert_eq!(s.platforms.len(), 10);
            assert_eq!(s.stars.len(), 10);
        }
        assert!(recycles > 10);
    }

    #[test]
    fn test_star_collection_and_exchange() {
        let mut s = session(autorun_config_with_stars());
        start(&mut s);
        s.run.stars = 4;

        // Slide two platforms under the player so their stars overlap it
        let player = s.player.position;
        for index in 0..2 {
            let platform = s.platforms.get_mut(index).unwrap();
            platform.x = player.x - (platform.width - 24.0) / 2.0;
            platform.y = player.y + 32.0;
        }

        let events = s.tick(0.0, &InputSnapshot::none());
        let collected = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::StarCollected { .. }))
            .count();
        assert_eq!(collected, 2);
        assert!(events.contains(&SessionEvent::LifeGained { lives: 1 }));
        assert_eq!(s.run.lives, 1);
        assert_eq!(s.run.stars, 1);
        assert_eq!(s.hud().lives, Some(1));

        // Collected stars stay gone until their platform recycles
        let events = s.tick(0.0, &InputSnapshot::none());
        assert!(!events
            .iter()
            .any(|e| matches!(e, SessionEvent::StarCollected { .. })));
    }

    fn autorun_config_with_stars() -> RunnerConfig {
        let mut config = autorun_config();
        config.stars.enabled = true;
        config
    }

    #[test]
    fn test_hazard_hit_consumes_life_then_ends_run() {
        let mut config = autorun_config();
        config.hazards.enabled = true;
        let mut s = session(config);
        start(&mut s);
        park(&mut s);
        s.run.lives = 1;

        let at_player = s.player.position;
        s.hazards.push(Hazard::new(900, at_player, Vec2::ZERO, 1.0, 14.0));
        let events = s.tick(0.0, &InputSnapshot::none());
        assert!(events.contains(&SessionEvent::LifeLost { lives: 0 }));
        assert_eq!(s.phase(), Phase::Running);
        assert!(s.hazards.is_empty());

        let at_player = s.player.position;
        s.hazards.push(Hazard::new(901, at_player, Vec2::ZERO, 1.0, 14.0));
        let events = s.tick(0.0, &InputSnapshot::none());
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::GameOver { cause: DeathCause::Hazard, .. })));
    }

    #[test]
    fn test_hazards_spawn_on_interval_and_stop_on_game_over() {
        let mut config = autorun_config();
        config.hazards.enabled = true;
        let mut s = session(config);
        start(&mut s);

        let mut spawned = 0;
        for _ in 0..16 {
            park(&mut s);
            s.hazards.clear();
            let events = s.tick(0.25, &InputSnapshot::none());
            spawned += events
                .iter()
                .filter(|e| matches!(e, SessionEvent::HazardSpawned { .. }))
                .count();
        }
        assert_eq!(spawned, 2);

        s.player.position.x = -5.0;
        s.tick(0.25, &InputSnapshot::none());
        for _ in 0..40 {
            let events = s.tick(0.25, &InputSnapshot::none());
            assert!(!events
                .iter()
                .any(|e| matches!(e, SessionEvent::HazardSpawned { .. })));
        }
    }

    fn advice_config(only_while_running: bool) -> RunnerConfig {
        let mut config = autorun_config();
        config.advice.enabled = true;
        config.advice.only_while_running = only_while_running;
        config
    }

    fn requested(events: &[SessionEvent]) -> Option<u64> {
        events.iter().find_map(|e| match e {
            SessionEvent::AdviceRequested { generation } => Some(*generation),
            _ => None,
        })
    }

    #[test]
    fn test_advice_gated_to_running() {
        let mut s = session(advice_config(true));
        for _ in 0..60 {
            assert!(requested(&s.tick(0.25, &InputSnapshot::none())).is_none());
        }

        start(&mut s);
        let mut generation = None;
        for _ in 0..40 {
            park(&mut s);
            if let Some(g) = requested(&s.tick(0.25, &InputSnapshot::none())) {
                generation = Some(g);
            }
        }
        assert_eq!(generation, Some(s.advice_generation()));
    }

    #[test]
    fn test_advice_ungated_runs_before_start() {
        let mut s = session(advice_config(false));
        let mut count = 0;
        for _ in 0..80 {
            if requested(&s.tick(0.25, &InputSnapshot::none())).is_some() {
                count += 1;
            }
        }
        assert_eq!(count, 2);
        assert_eq!(s.phase(), Phase::NotStarted);
    }

    #[test]
    fn test_advice_shown_then_cleared() {
        let mut s = session(advice_config(true));
        start(&mut s);
        park(&mut s);

        let generation = s.advice_generation();
        let event = s.receive_advice(AdviceReply {
            generation,
            result: Ok("Let go of all buttons.".to_string()),
        });
        assert_eq!(
            event,
            Some(SessionEvent::AdviceShown {
                text: "Let go of all buttons.".to_string()
            })
        );
        assert_eq!(s.hud().advice.as_deref(), Some("Let go of all buttons."));

        let mut cleared = false;
        for _ in 0..20 {
            park(&mut s);
            if s.tick(0.25, &InputSnapshot::none()).contains(&SessionEvent::AdviceCleared) {
                cleared = true;
                break;
            }
        }
        assert!(cleared);
        assert_eq!(s.hud().advice, None);
    }

    #[test]
    fn test_later_advice_overwrites_and_restarts_display() {
        let mut s = session(advice_config(true));
        start(&mut s);
        park(&mut s);
        let generation = s.advice_generation();

        s.receive_advice(AdviceReply {
            generation,
            result: Ok("first".to_string()),
        });
        for _ in 0..16 {
            park(&mut s);
            s.tick(0.25, &InputSnapshot::none());
        }
        s.receive_advice(AdviceReply {
            generation,
            result: Ok("second".to_string()),
        });
        for _ in 0..16 {
            park(&mut s);
            s.tick(0.25, &InputSnapshot::none());
        }
        // 4s after the second reply: still on screen
        assert_eq!(s.hud().advice.as_deref(), Some("second"));
    }

    #[test]
    fn test_stale_advice_after_game_over_is_dropped() {
        let mut s = session(advice_config(true));
        start(&mut s);
        let generation = s.advice_generation();

        s.player.position.x = 0.0;
        s.tick(0.25, &InputSnapshot::none());
        assert_eq!(s.phase(), Phase::GameOver);

        let event = s.receive_advice(AdviceReply {
            generation,
            result: Ok("too late".to_string()),
        });
        assert_eq!(event, None);
        assert_eq!(s.hud().advice, None);
    }

    #[test]
    fn test_failed_advice_keeps_previous_text() {
        let mut s = session(advice_config(true));
        start(&mut s);
        let generation = s.advice_generation();
        s.receive_advice(AdviceReply {
            generation,
            result: Ok("keep me".to_string()),
        });

        let event = s.receive_advice(AdviceReply {
            generation,
            result: Err(AdviceError::Timeout),
        });
        assert_eq!(event, None);
        assert_eq!(s.hud().advice.as_deref(), Some("keep me"));
    }

    #[test]
    fn test_teardown_stops_everything() {
        let mut s = session(advice_config(false));
        let generation = s.advice_generation();
        s.teardown();

        assert!(s.tick(20.0, &InputSnapshot::holding(&[Key::Right])).is_empty());
        assert_eq!(
            s.receive_advice(AdviceReply {
                generation,
                result: Ok("ghost".to_string()),
            }),
            None
        );

        s.initialize();
        assert_eq!(s.phase(), Phase::NotStarted);
        assert_eq!(s.tick_count(), 0);
        assert!(!s.tick(0.0, &InputSnapshot::holding(&[Key::Right])).is_empty());
    }

    #[test]
    fn test_oversized_delta_is_one_bounded_step() {
        let mut s = session(autorun_config());
        start(&mut s);
        park(&mut s);

        let events = s.tick(1e30, &InputSnapshot::none());
        assert!(events.contains(&SessionEvent::ScoreChanged { score: 1 }));
        assert!(s.player.position.is_finite());
        assert!(s.platforms.iter().all(|p| p.x.is_finite()));

        // Infinite and NaN deltas behave like the clamp and a no-op
        s.tick(f32::INFINITY, &InputSnapshot::none());
        assert_eq!(s.run.score, 2);
        s.tick(f32::NAN, &InputSnapshot::none());
        assert_eq!(s.run.score, 2);
    }

    #[test]
    fn test_sanitize_recovers_nan() {
        let mut s = session(quiet_config());
        s.player.position.x = f32::NAN;
        s.player.velocity.y = f32::INFINITY;
        s.sanitize();
        assert!(s.player.position.is_finite());
        assert!(s.player.velocity.is_finite());
    }

    #[test]
    fn test_snapshot_serializes() {
        let s = session(quiet_config());
        let json = serde_json::to_value(s.snapshot()).unwrap();
        assert_eq!(json["platforms"].as_array().unwrap().len(), 5);
        assert_eq!(json["run"]["phase"], "NotStarted");
    }
}
