//! Default tuning values for the runner.
//!
//! Every value here is only a default: `RunnerConfig` copies them and
//! environment overrides are applied on top.

/// World / viewport constants
pub mod world {
    /// Visible world width
    pub const WIDTH: f32 = 800.0;
    /// Visible world height
    pub const HEIGHT: f32 = 600.0;
    /// Top of the ground strip (ground image centred at y=568, 32px tall, scaled x2)
    pub const GROUND_TOP: f32 = 536.0;
    /// Arcade gravity (units/s^2)
    pub const GRAVITY: f32 = 400.0;
    /// Fixed simulation rate of the headless driver
    pub const TICK_RATE: u32 = 60;
    /// Delta time per tick in seconds
    pub const DT: f32 = 1.0 / 60.0;
}

/// Player constants
pub mod player {
    /// Spawn point (top-left)
    pub const SPAWN_X: f32 = 100.0;
    pub const SPAWN_Y: f32 = 450.0;
    /// Sprite frame size
    pub const WIDTH: f32 = 32.0;
    pub const HEIGHT: f32 = 48.0;
    /// Upward jump impulse, before the fall-speed factor
    pub const JUMP_VELOCITY: f32 = 330.0;
    /// Downward velocity applied by fast-fall
    pub const FAST_FALL_VELOCITY: f32 = 500.0;
    /// Input velocity added on top of the treadmill
    pub const RUN_SPEED: f32 = 160.0;
    /// Horizontal velocity in autorun mode (player holds station, world scrolls)
    pub const AUTORUN_VELOCITY: f32 = 0.0;
    /// Velocity below which the player is considered idle for facing
    pub const FACING_DEADZONE: f32 = 10.0;
    /// How far above a platform top the previous bottom may be and still land
    pub const LANDING_TOLERANCE: f32 = 10.0;
}

/// Scroll speed and difficulty ramp
pub mod speed {
    /// Starting world scroll speed (units/s)
    pub const BASE: f32 = 200.0;
    /// Starting fall-speed factor
    pub const FALL_FACTOR: f32 = 1.0;
    /// Growth applied on every ramp firing
    pub const GROWTH: f32 = 1.1;
    /// Ramp interval in milliseconds
    pub const RAMP_INTERVAL_MS: u64 = 5_000;
}

/// Platform pool constants
pub mod platforms {
    /// Pool size
    pub const CAPACITY: usize = 5;
    /// Platform sprite (platform.png 400x32 scaled by 0.5)
    pub const WIDTH: f32 = 200.0;
    pub const HEIGHT: f32 = 16.0;
    /// X of the first platform (just off the right edge)
    pub const FIRST_X: f32 = 800.0;
    /// Y of the first platform
    pub const FIRST_Y: f32 = 500.0;
    /// Horizontal spacing draw: [SPACING_MIN, SPACING_MIN + SPACING_RANGE]
    pub const SPACING_MIN: f32 = 300.0;
    pub const SPACING_RANGE: f32 = 100.0;
    /// Vertical band
    pub const Y_MIN: f32 = 200.0;
    pub const Y_MAX: f32 = 500.0;
    /// Largest step of the random-walk rule
    pub const MAX_STEP: u32 = 200;
    /// Fixed recycle x
    pub const RECYCLE_X: f32 = 800.0;
    /// Look-ahead used by the player-relative recycle rule
    pub const LOOKAHEAD: f32 = 600.0;
}

/// Star constants
pub mod stars {
    /// Vertical offset above the owning platform
    pub const OFFSET: f32 = 32.0;
    pub const SIZE: f32 = 24.0;
    /// Stars exchanged for one extra life
    pub const EXCHANGE_RATE: u32 = 5;
}

/// Hazard constants
pub mod hazards {
    pub const SPAWN_INTERVAL_MS: u64 = 2_000;
    /// Unscaled sprite size
    pub const SIZE: f32 = 14.0;
    pub const SCALE_MIN: f32 = 0.5;
    pub const SCALE_MAX: f32 = 1.5;
    /// Initial downward velocity draw, before the fall-speed factor
    pub const FALL_MIN: f32 = 200.0;
    pub const FALL_MAX: f32 = 400.0;
    /// Horizontal drift draw
    pub const DRIFT: f32 = 200.0;
}

/// Score timer
pub mod score {
    pub const INTERVAL_MS: u64 = 1_000;
}

/// Advice banner constants
pub mod advice {
    pub const ENDPOINT: &str = "http://localhost:11434/api/generate";
    pub const MODEL: &str = "llama3.1";
    pub const INTERVAL_MS: u64 = 10_000;
    pub const DISPLAY_MS: u64 = 5_000;
    pub const REQUEST_TIMEOUT_MS: u64 = 30_000;
    pub const PROMPT: &str = "Give one sentence of bad advice to a player trying to win a video game also make sure to make the player feel worthless (the videogame is an infinite sidescroller with enemies score is being tracked with time). Keep it short and misleading, like: \"Touch the spiky balls\" or \"Let go of all buttons.\"";
}

/// HUD text
pub mod text {
    pub const START: &str = "Press the arrow keys to start";
    pub const GAME_OVER: &str = "Game Over";
    pub const RETRY: &str = "Press spacebar to retry";
}
