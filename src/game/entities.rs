use serde::{Serialize, Deserialize};

pub const WORLD_WIDTH: f32 = 800.0;
pub const WORLD_HEIGHT: f32 = 600.0;
/// hypot(800, 600); used to normalize distances so the pad sentinel 1.0
/// really is "as far away as anything can be".
pub const WORLD_DIAGONAL: f32 = 1000.0;

pub const SHIP_RADIUS: f32 = 15.0;
pub const SHIP_TURN_RATE: f32 = 0.08;
pub const SHIP_THRUST: f32 = 0.1;
pub const SHIP_DRAG: f32 = 0.99;
pub const MAX_SHIELDS: u32 = 3;

pub const MAX_PLAYER_BULLETS: usize = 4;
pub const BULLET_SPEED: f32 = 7.0;
pub const BULLET_RADIUS: f32 = 2.0;
pub const BULLET_LIFETIME: u32 = 60;
pub const FIRE_COOLDOWN: u32 = 15;
pub const RAPID_FIRE_COOLDOWN: u32 = 5;
pub const MULTI_SHOT_SPREAD: f32 = 0.26;

pub const RAPID_FIRE_TICKS: u32 = 600;
pub const MULTI_SHOT_TICKS: u32 = 600;
pub const SLOW_TIME_TICKS: u32 = 300;
pub const SLOW_TIME_FACTOR: f32 = 0.5;

pub const UFO_RADIUS: f32 = 20.0;
pub const UFO_HEALTH: u32 = 3;
pub const UFO_SCORE: u64 = 200;
pub const UFO_SHOT_INTERVAL: u64 = 90;
pub const UFO_SPAWN_CHANCE: f64 = 0.002;
pub const ENEMY_BULLET_SPEED: f32 = 4.0;
pub const ENEMY_BULLET_RADIUS: f32 = 3.0;
pub const ENEMY_BULLET_LIFETIME: u32 = 120;

pub const POWERUP_RADIUS: f32 = 12.0;
pub const POWERUP_LIFETIME: u32 = 600;
pub const POWERUP_DROP_CHANCE: f64 = 0.1;

pub const SAFE_SPAWN_DISTANCE: f32 = 120.0;

/// Plain 2D point/velocity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(&self, other: Vec2) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Wrap both axes into [0, WORLD_WIDTH) x [0, WORLD_HEIGHT).
    pub fn wrapped(self) -> Vec2 {
        Vec2 {
            x: self.x.rem_euclid(WORLD_WIDTH),
            y: self.y.rem_euclid(WORLD_HEIGHT),
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsteroidSize {
    Large,
    Medium,
    Small,
}

impl AsteroidSize {
    pub fn radius(&self) -> f32 {
        match self {
            AsteroidSize::Large => 40.0,
            AsteroidSize::Medium => 20.0,
            AsteroidSize::Small => 10.0,
        }
    }

    pub fn base_speed(&self) -> f32 {
        match self {
            AsteroidSize::Large => 1.0,
            AsteroidSize::Medium => 1.5,
            AsteroidSize::Small => 2.0,
        }
    }

    pub fn score(&self) -> u64 {
        match self {
            AsteroidSize::Large => 20,
            AsteroidSize::Medium => 50,
            AsteroidSize::Small => 100,
        }
    }

    /// The size of this asteroid's break products, if any.
    pub fn smaller(&self) -> Option<AsteroidSize> {
        match self {
            AsteroidSize::Large => Some(AsteroidSize::Medium),
            AsteroidSize::Medium => Some(AsteroidSize::Small),
            AsteroidSize::Small => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    pub radius: f32,
    pub thrusting: bool,
    pub shields: u32,
    pub rapid_fire_ticks: u32,
    pub multi_shot_ticks: u32,
    pub fire_cooldown: u32,
}

impl Ship {
    pub fn new() -> Self {
        Ship {
            pos: Vec2::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0),
            vel: Vec2::ZERO,
            rotation: 0.0,
            radius: SHIP_RADIUS,
            thrusting: false,
            shields: 0,
            rapid_fire_ticks: 0,
            multi_shot_ticks: 0,
            fire_cooldown: 0,
        }
    }

    pub fn rapid_fire_active(&self) -> bool {
        self.rapid_fire_ticks > 0
    }

    pub fn multi_shot_active(&self) -> bool {
        self.multi_shot_ticks > 0
    }
}

impl Default for Ship {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub size: AsteroidSize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub lifetime: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyBullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub lifetime: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ufo {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub health: u32,
    pub last_shot_tick: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    RapidFire,
    MultiShot,
    SlowTime,
}

impl PowerUpKind {
    /// Code fed to the state encoder.
    pub fn type_code(&self) -> f32 {
        match self {
            PowerUpKind::Shield => 0.25,
            PowerUpKind::RapidFire => 0.5,
            PowerUpKind::MultiShot => 0.75,
            PowerUpKind::SlowTime => 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub pos: Vec2,
    pub kind: PowerUpKind,
    pub radius: f32,
    pub lifetime: u32,
}

/// Cosmetic only; excluded from the simulation contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
}

/// Per-tick control input for the ship. Matches the policy's four action
/// signals: turn-left, turn-right, thrust, fire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipInput {
    pub turn_left: bool,
    pub turn_right: bool,
    pub thrust: bool,
    pub fire: bool,
}

impl ShipInput {
    pub fn from_action(action: [bool; 4]) -> Self {
        ShipInput {
            turn_left: action[0],
            turn_right: action[1],
            thrust: action[2],
            fire: action[3],
        }
    }
}

/// Aggregate world state for one session. Mutated every tick; reset fully or
/// score-preserving on death or wave clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub ship: Ship,
    pub asteroids: Vec<Asteroid>,
    pub bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<EnemyBullet>,
    pub ufo: Option<Ufo>,
    pub power_ups: Vec<PowerUp>,
    pub particles: Vec<Particle>,
    pub score: u64,
    pub high_score: u64,
    pub game_over: bool,
    pub generation: u32,
    pub deaths: u32,
    pub wave: u32,
    pub tick: u64,
    pub slow_time_ticks: u32,
}

impl GameState {
    pub fn new() -> Self {
        GameState {
            ship: Ship::new(),
            asteroids: Vec::new(),
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            ufo: None,
            power_ups: Vec::new(),
            particles: Vec::new(),
            score: 0,
            high_score: 0,
            game_over: false,
            generation: 0,
            deaths: 0,
            wave: 1,
            tick: 0,
            slow_time_ticks: 0,
        }
    }

    pub fn slow_time_active(&self) -> bool {
        self.slow_time_ticks > 0
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
