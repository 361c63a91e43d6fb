use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::game::constants::{advice, hazards, platforms, player, score, speed, stars, world};

/// Configuration validation failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field}: min {min} is greater than max {max}")]
    InvalidRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),
    #[error("{0} must be at least 1")]
    Empty(&'static str),
    #[error("random walk over [{y_min}, {y_max}] with step {max_step} cannot produce a new height")]
    DegenerateWalk { y_min: f32, y_max: f32, max_step: u32 },
}

/// How the player moves relative to the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocomotionMode {
    /// Player holds a fixed x-velocity, world scrolls past
    Autorun,
    /// Constant leftward push plus relative input velocity
    Treadmill,
}

impl FromStr for LocomotionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "autorun" => Ok(Self::Autorun),
            "treadmill" => Ok(Self::Treadmill),
            other => Err(format!("unknown locomotion mode '{}'", other)),
        }
    }
}

/// Which left-edge test ends the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeftEdgeRule {
    /// `x <= left_limit`
    LeftEdge,
    /// `x + width < left_limit`
    FullyOffscreen,
}

/// Vertical placement rule for platforms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum YRule {
    Uniform { y_min: f32, y_max: f32 },
    RandomWalk { y_min: f32, y_max: f32, max_step: u32 },
}

impl YRule {
    pub fn bounds(&self) -> (f32, f32) {
        match *self {
            YRule::Uniform { y_min, y_max } | YRule::RandomWalk { y_min, y_max, .. } => {
                (y_min, y_max)
            }
        }
    }
}

/// Where a recycled platform reappears
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RecycleX {
    Fixed(f32),
    AheadOfPlayer(f32),
}

/// How stars are laid out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StarPlacement {
    /// One star per platform at `platform.y - offset`
    OnPlatforms { offset: f32 },
    /// Independent pool with its own recycle rule
    Scrolling {
        capacity: usize,
        spacing: f32,
        y_min: f32,
        y_max: f32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    pub gravity: f32,
    /// Top of the static ground strip, `None` for a bottomless world
    pub ground_top: Option<f32>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: world::WIDTH,
            height: world::HEIGHT,
            gravity: world::GRAVITY,
            ground_top: Some(world::GROUND_TOP),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub mode: LocomotionMode,
    pub spawn_x: f32,
    pub spawn_y: f32,
    pub width: f32,
    pub height: f32,
    pub jump_velocity: f32,
    pub fast_fall_velocity: f32,
    pub run_speed: f32,
    pub autorun_velocity: f32,
    pub facing_deadzone: f32,
    pub landing_tolerance: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            mode: LocomotionMode::Treadmill,
            spawn_x: player::SPAWN_X,
            spawn_y: player::SPAWN_Y,
            width: player::WIDTH,
            height: player::HEIGHT,
            jump_velocity: player::JUMP_VELOCITY,
            fast_fall_velocity: player::FAST_FALL_VELOCITY,
            run_speed: player::RUN_SPEED,
            autorun_velocity: player::AUTORUN_VELOCITY,
            facing_deadzone: player::FACING_DEADZONE,
            landing_tolerance: player::LANDING_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalConfig {
    pub left_limit: f32,
    pub left_rule: LeftEdgeRule,
    /// End the run when the player drops below the world
    pub fall_through: bool,
    /// End the run when the player leaves through the top or right edge
    pub bounded_arena: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            left_limit: 0.0,
            left_rule: LeftEdgeRule::LeftEdge,
            fall_through: true,
            bounded_arena: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyConfig {
    pub base_speed: f32,
    pub fall_speed_factor: f32,
    pub growth: f32,
    pub ramp_interval_ms: u64,
    pub score_interval_ms: u64,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            base_speed: speed::BASE,
            fall_speed_factor: speed::FALL_FACTOR,
            growth: speed::GROWTH,
            ramp_interval_ms: speed::RAMP_INTERVAL_MS,
            score_interval_ms: score::INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub capacity: usize,
    pub width: f32,
    pub height: f32,
    pub first_x: f32,
    /// Pin the first platform's height, otherwise drawn from `y_rule`
    pub first_y: Option<f32>,
    pub spacing_min: f32,
    pub spacing_range: f32,
    pub y_rule: YRule,
    pub recycle_x: RecycleX,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            capacity: platforms::CAPACITY,
            width: platforms::WIDTH,
            height: platforms::HEIGHT,
            first_x: platforms::FIRST_X,
            first_y: Some(platforms::FIRST_Y),
            spacing_min: platforms::SPACING_MIN,
            spacing_range: platforms::SPACING_RANGE,
            y_rule: YRule::RandomWalk {
                y_min: platforms::Y_MIN,
                y_max: platforms::Y_MAX,
                max_step: platforms::MAX_STEP,
            },
            recycle_x: RecycleX::Fixed(platforms::RECYCLE_X),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarConfig {
    pub enabled: bool,
    pub placement: StarPlacement,
    pub size: f32,
    /// Exchange collected stars for extra lives
    pub lives_enabled: bool,
    pub exchange_rate: u32,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            placement: StarPlacement::OnPlatforms {
                offset: stars::OFFSET,
            },
            size: stars::SIZE,
            lives_enabled: true,
            exchange_rate: stars::EXCHANGE_RATE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardConfig {
    pub enabled: bool,
    pub spawn_interval_ms: u64,
    pub size: f32,
    pub scale_min: f32,
    pub scale_max: f32,
    pub fall_min: f32,
    pub fall_max: f32,
    pub drift: f32,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spawn_interval_ms: hazards::SPAWN_INTERVAL_MS,
            size: hazards::SIZE,
            scale_min: hazards::SCALE_MIN,
            scale_max: hazards::SCALE_MAX,
            fall_min: hazards::FALL_MIN,
            fall_max: hazards::FALL_MAX,
            drift: hazards::DRIFT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    pub prompt: String,
    pub interval_ms: u64,
    pub display_ms: u64,
    pub request_timeout_ms: u64,
    /// Only request advice while a run is in progress
    pub only_while_running: bool,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: advice::ENDPOINT.to_string(),
            model: advice::MODEL.to_string(),
            prompt: advice::PROMPT.to_string(),
            interval_ms: advice::INTERVAL_MS,
            display_ms: advice::DISPLAY_MS,
            request_timeout_ms: advice::REQUEST_TIMEOUT_MS,
            only_while_running: true,
        }
    }
}

/// Runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub terminal: TerminalConfig,
    pub difficulty: DifficultyConfig,
    pub platforms: PlatformConfig,
    pub stars: StarConfig,
    pub hazards: HazardConfig,
    pub advice: AdviceConfig,
    /// Headless driver tick rate in Hz
    pub tick_rate: u32,
    /// Stop the headless driver after this many ticks
    pub max_ticks: Option<u64>,
    /// RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            player: PlayerConfig::default(),
            terminal: TerminalConfig::default(),
            difficulty: DifficultyConfig::default(),
            platforms: PlatformConfig::default(),
            stars: StarConfig::default(),
            hazards: HazardConfig::default(),
            advice: AdviceConfig::default(),
            tick_rate: world::TICK_RATE,
            max_ticks: None,
            seed: None,
        }
    }
}

/// Reject NaN and infinities before any range check sees them
fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite(field))
    }
}

/// Parse `name` into `target`, keeping the default and warning on bad input
fn override_from_env<T: FromStr>(name: &str, target: &mut T) {
    if let Ok(raw) = std::env::var(name) {
        match raw.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => tracing::warn!("Invalid {} '{}', using default", name, raw),
        }
    }
}

impl RunnerConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        override_from_env("RUNNER_MODE", &mut config.player.mode);
        override_from_env("RUNNER_BASE_SPEED", &mut config.difficulty.base_speed);
        override_from_env("RUNNER_SPEED_GROWTH", &mut config.difficulty.growth);
        override_from_env("RUNNER_PLATFORM_COUNT", &mut config.platforms.capacity);
        override_from_env("RUNNER_STARS", &mut config.stars.enabled);
        override_from_env("RUNNER_LIVES", &mut config.stars.lives_enabled);
        override_from_env("RUNNER_HAZARDS", &mut config.hazards.enabled);
        override_from_env("RUNNER_TICK_RATE", &mut config.tick_rate);

        if let Ok(raw) = std::env::var("RUNNER_MAX_TICKS") {
            match raw.parse::<u64>() {
                Ok(parsed) => config.max_ticks = Some(parsed),
                Err(_) => tracing::warn!("Invalid RUNNER_MAX_TICKS '{}', running until Ctrl+C", raw),
            }
        }

        if let Ok(raw) = std::env::var("RUNNER_SEED") {
            match raw.parse::<u64>() {
                Ok(parsed) => config.seed = Some(parsed),
                Err(_) => tracing::warn!("Invalid RUNNER_SEED '{}', using entropy", raw),
            }
        }

        override_from_env("ADVICE_ENABLED", &mut config.advice.enabled);
        override_from_env("ADVICE_INTERVAL_MS", &mut config.advice.interval_ms);
        override_from_env("ADVICE_DISPLAY_MS", &mut config.advice.display_ms);
        override_from_env("ADVICE_ONLY_WHILE_RUNNING", &mut config.advice.only_while_running);

        if let Ok(endpoint) = std::env::var("ADVICE_ENDPOINT") {
            config.advice.endpoint = endpoint;
        }

        if let Ok(model) = std::env::var("ADVICE_MODEL") {
            config.advice.model = model;
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_finite()?;

        if self.world.width <= 0.0 {
            return Err(ConfigError::NotPositive("world.width"));
        }
        if self.world.height <= 0.0 {
            return Err(ConfigError::NotPositive("world.height"));
        }
        if self.player.width <= 0.0 || self.player.height <= 0.0 {
            return Err(ConfigError::NotPositive("player size"));
        }
        if self.difficulty.base_speed <= 0.0 {
            return Err(ConfigError::NotPositive("difficulty.base_speed"));
        }
        if self.difficulty.fall_speed_factor <= 0.0 {
            return Err(ConfigError::NotPositive("difficulty.fall_speed_factor"));
        }
        if self.difficulty.growth <= 0.0 {
            return Err(ConfigError::NotPositive("difficulty.growth"));
        }
        if self.difficulty.ramp_interval_ms == 0 {
            return Err(ConfigError::NotPositive("difficulty.ramp_interval_ms"));
        }
        if self.difficulty.score_interval_ms == 0 {
            return Err(ConfigError::NotPositive("difficulty.score_interval_ms"));
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::NotPositive("tick_rate"));
        }

        self.validate_platforms()?;

        if self.stars.enabled {
            if self.stars.lives_enabled && self.stars.exchange_rate == 0 {
                return Err(ConfigError::NotPositive("stars.exchange_rate"));
            }
            if let StarPlacement::Scrolling {
                capacity,
                spacing,
                y_min,
                y_max,
            } = self.stars.placement
            {
                if capacity == 0 {
                    return Err(ConfigError::Empty("stars.capacity"));
                }
                if spacing <= 0.0 {
                    return Err(ConfigError::NotPositive("stars.spacing"));
                }
                if y_min > y_max {
                    return Err(ConfigError::InvalidRange {
                        field: "stars.y",
                        min: y_min,
                        max: y_max,
                    });
                }
            }
        }

        if self.hazards.enabled {
            let h = &self.hazards;
            if h.spawn_interval_ms == 0 {
                return Err(ConfigError::NotPositive("hazards.spawn_interval_ms"));
            }
            if h.scale_min <= 0.0 {
                return Err(ConfigError::NotPositive("hazards.scale_min"));
            }
            if h.scale_min > h.scale_max {
                return Err(ConfigError::InvalidRange {
                    field: "hazards.scale",
                    min: h.scale_min,
                    max: h.scale_max,
                });
            }
            if h.fall_min > h.fall_max {
                return Err(ConfigError::InvalidRange {
                    field: "hazards.fall",
                    min: h.fall_min,
                    max: h.fall_max,
                });
            }
            if h.drift < 0.0 {
                return Err(ConfigError::InvalidRange {
                    field: "hazards.drift",
                    min: -h.drift,
                    max: h.drift,
                });
            }
        }

        if self.advice.enabled {
            if self.advice.interval_ms == 0 {
                return Err(ConfigError::NotPositive("advice.interval_ms"));
            }
            if self.advice.display_ms == 0 {
                return Err(ConfigError::NotPositive("advice.display_ms"));
            }
        }

        Ok(())
    }

    /// Every float must be a real number. `terminal.left_limit` may be
    /// infinite to disable the left-edge rule, but never NaN.
    fn validate_finite(&self) -> Result<(), ConfigError> {
        let w = &self.world;
        finite("world.width", w.width)?;
        finite("world.height", w.height)?;
        finite("world.gravity", w.gravity)?;
        if let Some(top) = w.ground_top {
            finite("world.ground_top", top)?;
        }

        let p = &self.player;
        finite("player.spawn_x", p.spawn_x)?;
        finite("player.spawn_y", p.spawn_y)?;
        finite("player.width", p.width)?;
        finite("player.height", p.height)?;
        finite("player.jump_velocity", p.jump_velocity)?;
        finite("player.fast_fall_velocity", p.fast_fall_velocity)?;
        finite("player.run_speed", p.run_speed)?;
        finite("player.autorun_velocity", p.autorun_velocity)?;
        finite("player.facing_deadzone", p.facing_deadzone)?;
        finite("player.landing_tolerance", p.landing_tolerance)?;

        if self.terminal.left_limit.is_nan() {
            return Err(ConfigError::NotFinite("terminal.left_limit"));
        }

        let d = &self.difficulty;
        finite("difficulty.base_speed", d.base_speed)?;
        finite("difficulty.fall_speed_factor", d.fall_speed_factor)?;
        finite("difficulty.growth", d.growth)?;

        let pl = &self.platforms;
        finite("platforms.width", pl.width)?;
        finite("platforms.height", pl.height)?;
        finite("platforms.first_x", pl.first_x)?;
        if let Some(first_y) = pl.first_y {
            finite("platforms.first_y", first_y)?;
        }
        finite("platforms.spacing_min", pl.spacing_min)?;
        finite("platforms.spacing_range", pl.spacing_range)?;
        let (y_min, y_max) = pl.y_rule.bounds();
        finite("platforms.y_min", y_min)?;
        finite("platforms.y_max", y_max)?;
        match pl.recycle_x {
            RecycleX::Fixed(x) => finite("platforms.recycle_x", x)?,
            RecycleX::AheadOfPlayer(lookahead) => finite("platforms.recycle_x", lookahead)?,
        }

        let st = &self.stars;
        finite("stars.size", st.size)?;
        match st.placement {
            StarPlacement::OnPlatforms { offset } => finite("stars.offset", offset)?,
            StarPlacement::Scrolling {
                spacing,
                y_min,
                y_max,
                ..
            } => {
                finite("stars.spacing", spacing)?;
                finite("stars.y_min", y_min)?;
                finite("stars.y_max", y_max)?;
            }
        }

        let h = &self.hazards;
        finite("hazards.size", h.size)?;
        finite("hazards.scale_min", h.scale_min)?;
        finite("hazards.scale_max", h.scale_max)?;
        finite("hazards.fall_min", h.fall_min)?;
        finite("hazards.fall_max", h.fall_max)?;
        finite("hazards.drift", h.drift)?;

        Ok(())
    }

    fn validate_platforms(&self) -> Result<(), ConfigError> {
        let p = &self.platforms;
        if p.capacity == 0 {
            return Err(ConfigError::Empty("platforms.capacity"));
        }
        if p.width <= 0.0 {
            return Err(ConfigError::NotPositive("platforms.width"));
        }
        if p.spacing_min < 0.0 || p.spacing_range < 0.0 {
            return Err(ConfigError::InvalidRange {
                field: "platforms.spacing",
                min: p.spacing_min,
                max: p.spacing_min + p.spacing_range,
            });
        }

        let (y_min, y_max) = p.y_rule.bounds();
        if y_min > y_max {
            return Err(ConfigError::InvalidRange {
                field: "platforms.y",
                min: y_min,
                max: y_max,
            });
        }
        if let YRule::RandomWalk { max_step, .. } = p.y_rule {
            // Integer draws: the band must hold at least two distinct heights
            if max_step == 0 || y_max.floor() - y_min.ceil() < 1.0 {
                return Err(ConfigError::DegenerateWalk {
                    y_min,
                    y_max,
                    max_step,
                });
            }
        }

        if let Some(first_y) = p.first_y {
            if first_y < y_min || first_y > y_max {
                return Err(ConfigError::InvalidRange {
                    field: "platforms.first_y",
                    min: y_min,
                    max: y_max,
                });
            }
        }

        Ok(())
    }
}
