use serde::{Deserialize, Serialize};

use super::constants::GameConstants;
use super::grid::{Direction, Facing};

/// Stable address of a floor inside the complex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FloorId {
    pub bx: usize,
    pub by: usize,
    pub level: usize,
}

impl FloorId {
    pub fn new(bx: usize, by: usize, level: usize) -> Self {
        FloorId { bx, by, level }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Point light, or a directional one when `cone` is set
    Light { radius: i32, cone: Option<Facing> },
    Door { open: bool, facing: Direction },
    /// Decoration with no gameplay effect
    Prop { name: String },
}

/// Object living on exactly one floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub x: i32,
    pub y: i32,
    pub kind: EntityKind,
}

impl Entity {
    pub fn light(x: i32, y: i32, radius: i32) -> Self {
        Entity { x, y, kind: EntityKind::Light { radius, cone: None } }
    }

    pub fn door(x: i32, y: i32, facing: Direction) -> Self {
        Entity { x, y, kind: EntityKind::Door { open: false, facing } }
    }

    pub fn prop(x: i32, y: i32, name: &str) -> Self {
        Entity { x, y, kind: EntityKind::Prop { name: name.to_string() } }
    }

    pub fn is_door(&self) -> bool {
        matches!(self.kind, EntityKind::Door { .. })
    }

    pub fn is_closed_door(&self) -> bool {
        matches!(self.kind, EntityKind::Door { open: false, .. })
    }

    pub fn light_source(&self) -> Option<LightSource> {
        match self.kind {
            EntityKind::Light { radius, cone } => Some(LightSource { x: self.x, y: self.y, radius, cone }),
            _ => None,
        }
    }
}

/// Input to the light engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSource {
    pub x: i32,
    pub y: i32,
    pub radius: i32,
    pub cone: Option<Facing>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub x: i32,
    pub y: i32,
    pub facing: Facing,
    /// Floor the player currently stands on
    pub floor: FloorId,
    pub flashlight_radius: i32,
    pub symbol: char,
}

impl Player {
    pub fn new(x: i32, y: i32, floor: FloorId, flashlight_radius: i32) -> Self {
        Player {
            x,
            y,
            facing: Facing::South,
            floor,
            flashlight_radius,
            symbol: GameConstants::PLAYER_SYMBOL,
        }
    }

    pub fn flashlight(&self) -> LightSource {
        LightSource {
            x: self.x,
            y: self.y,
            radius: self.flashlight_radius,
            cone: Some(self.facing),
        }
    }

    /// Cell directly in front of the player
    pub fn facing_cell(&self) -> (i32, i32) {
        let (dx, dy) = self.facing.delta();
        (self.x + dx, self.y + dy)
    }
}
