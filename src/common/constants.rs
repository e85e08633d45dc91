// Fixed design constants shared by the generator, the engines and the client
pub struct GameConstants;

impl GameConstants {
    // Floor dimensions
    pub const FLOOR_WIDTH: i32 = 61;
    pub const FLOOR_HEIGHT: i32 = 38;

    // Complex layout
    pub const COMPLEX_WIDTH: usize = 5;
    pub const COMPLEX_HEIGHT: usize = 3;
    pub const MAX_FLOORS: usize = 4;

    // Block placement
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 300;
    pub const MIN_BUILT_BLOCKS: usize = 7;
    pub const MAX_BUILT_BLOCKS: usize = 10;
    pub const MIN_OUTDOOR_EDGE_BLOCKS: usize = 3;
    pub const EDGE_BLOCK_PROBABILITY: f64 = 0.85;
    pub const INTERIOR_BLOCK_PROBABILITY: f64 = 0.55;
    pub const EXTRA_FLOOR_PROBABILITY: [f64; 3] = [0.7, 0.45, 0.25];

    // Layout generation
    pub const HALLWAY_SIZE: i32 = 3;
    pub const HALLWAY_LIGHT_SPACING: i32 = 15;
    pub const OUTDOOR_LIGHT_SPACING: i32 = 10;
    pub const ROOM_MIN_WIDTH: i32 = 4;
    pub const ROOM_MAX_WIDTH: i32 = 10;
    pub const ROOM_MIN_HEIGHT: i32 = 3;
    pub const ROOM_MAX_HEIGHT: i32 = 9;
    pub const ROOM_PROP_CHANCE: f64 = 0.3;
    pub const OUTDOOR_PROP_THRESHOLD: f64 = 0.45;

    // Lighting
    pub const AMBIENT_LIGHT: u8 = 25;
    pub const MAX_LIGHT: u8 = 255;
    pub const LIGHT_ATTENUATION: f64 = 0.07;
    pub const RAY_STEP_DEGREES: f64 = 2.0;
    pub const CONE_DEGREES: f64 = 90.0;
    pub const STATIC_LIGHT_RADIUS: i32 = 14;
    pub const FLASHLIGHT_RADIUS: i32 = 15;

    // Visibility
    pub const SIGHT_RADIUS: i32 = 100;

    // Player
    pub const PLAYER_SYMBOL: char = '@';
    pub const SPRINT_STEPS: u32 = 8;

    // Client
    pub const MAX_MESSAGES: usize = 10;
    pub const LOG_FILE: &'static str = "roguegate.log";
    pub const SAVE_FILE: &'static str = "roguegate_save.json";
    pub const CONFIG_ENV: &'static str = "ROGUEGATE_CONFIG";

    // Game messages
    pub const MSG_WELCOME: &'static str = "Security System online. Welcome to the RogueGate Complex.";
    pub const MSG_BLOCKED: &'static str = "Something blocks your way.";
    pub const MSG_DOOR_OPENED: &'static str = "The door swings open.";
    pub const MSG_NO_DOOR: &'static str = "There is no closed door there.";
    pub const MSG_NO_STAIRS: &'static str = "You can't go that way from here.";
    pub const MSG_REGENERATED: &'static str = "The complex shifts around you...";
    pub const MSG_SAVED: &'static str = "Session saved.";
    pub const MSG_LOADED: &'static str = "Session restored.";
}
