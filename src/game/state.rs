//! Runner state definitions
//!
//! Run bookkeeping, the player, pooled platforms/stars, hazards and the HUD view.

use serde::{Deserialize, Serialize};

use crate::config::{DifficultyConfig, PlayerConfig};
use crate::game::constants::text;
use crate::util::rect::Rect;
use crate::util::vec2::Vec2;

/// Hazard identifier (monotonic per session)
pub type HazardId = u64;

/// Run phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Phase {
    /// Waiting for the first directional input
    #[default]
    NotStarted,
    /// World is scrolling, timers are live
    Running,
    /// Waiting for retry
    GameOver,
}

/// Per-run counters and tuning that the timers mutate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub phase: Phase,
    /// Seconds survived, driven by the score timer
    pub score: u32,
    /// World scroll speed (units/s)
    pub speed: f32,
    /// Multiplier on jump impulse and hazard descent
    pub fall_speed_factor: f32,
    /// Stars held (not yet exchanged)
    pub stars: u32,
    /// Extra lives
    pub lives: u32,
    /// Parallax background scroll accumulator
    pub background_offset: f32,
}

impl RunState {
    pub fn new(difficulty: &DifficultyConfig) -> Self {
        Self {
            phase: Phase::NotStarted,
            score: 0,
            speed: difficulty.base_speed,
            fall_speed_factor: difficulty.fall_speed_factor,
            stars: 0,
            lives: 0,
            background_offset: 0.0,
        }
    }

    pub fn is_started(&self) -> bool {
        self.phase != Phase::NotStarted
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn collect_star(&mut self) {
        self.stars += 1;
    }

    /// Trade `rate` stars for one extra life. Returns true if a life was granted.
    pub fn exchange_stars(&mut self, rate: u32) -> bool {
        if rate > 0 && self.stars >= rate {
            self.stars -= rate;
            self.lives += 1;
            true
        } else {
            false
        }
    }

    /// Compound the scroll speed and fall-speed factor
    pub fn ramp(&mut self, growth: f32) {
        self.speed *= growth;
        self.fall_speed_factor *= growth;
    }
}

/// Pose selected from input and velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Facing {
    Left,
    Right,
    #[default]
    Turn,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub position: Vec2,
    pub velocity: Vec2,
    pub width: f32,
    pub height: f32,
    pub facing: Facing,
    /// Resting on ground or a platform after the last kinematics step
    pub on_surface: bool,
}

impl Player {
    pub fn spawn(config: &PlayerConfig) -> Self {
        Self {
            position: Vec2::new(config.spawn_x, config.spawn_y),
            velocity: Vec2::ZERO,
            width: config.width,
            height: config.height,
            facing: Facing::Turn,
            on_surface: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::at(self.position, self.width, self.height)
    }
}

/// A pooled platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub active: bool,
    /// Index of the star riding on this platform
    pub star: Option<usize>,
}

impl Platform {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            active: true,
            star: None,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Right edge has passed the left edge of the world
    pub fn is_off_world(&self) -> bool {
        self.x < -self.width
    }
}

/// A collectible star
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub active: bool,
    /// Back-reference to the platform this star rides on
    pub platform: Option<usize>,
}

impl Star {
    pub fn new(x: f32, y: f32, size: f32, platform: Option<usize>) -> Self {
        Self {
            x,
            y,
            size,
            active: true,
            platform,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }
}

/// A falling, bouncing hazard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub id: HazardId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub scale: f32,
    /// Unscaled sprite size
    pub size: f32,
    pub bounce_count: u32,
    pub active: bool,
}

impl Hazard {
    pub fn new(id: HazardId, position: Vec2, velocity: Vec2, scale: f32, size: f32) -> Self {
        Self {
            id,
            position,
            velocity,
            scale,
            size,
            bounce_count: 0,
            active: true,
        }
    }

    pub fn extent(&self) -> f32 {
        self.size * self.scale
    }

    pub fn bounds(&self) -> Rect {
        Rect::at(self.position, self.extent(), self.extent())
    }
}

/// The advice banner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdviceBanner {
    pub text: String,
    pub visible: bool,
}

impl AdviceBanner {
    pub fn show(&mut self, text: String) {
        self.text = text;
        self.visible = true;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.visible = false;
    }
}

/// Display elements an engine would render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub score: u32,
    pub stars: u32,
    /// `None` when the lives mechanic is off
    pub lives: Option<u32>,
    pub start_prompt: bool,
    pub game_over: bool,
    pub retry_prompt: bool,
    pub advice: Option<String>,
}

impl Hud {
    pub fn score_text(&self) -> String {
        format!("Score: {}", self.score)
    }

    /// Static prompt lines currently on screen, top to bottom
    pub fn prompts(&self) -> Vec<&'static str> {
        let mut lines = Vec::new();
        if self.start_prompt {
            lines.push(text::START);
        }
        if self.game_over {
            lines.push(text::GAME_OVER);
        }
        if self.retry_prompt {
            lines.push(text::RETRY);
        }
        lines
    }
}
