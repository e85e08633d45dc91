use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::complex::Complex;
use super::entity::Player;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}

/// Serializable copy of the complex and the player. Light and visibility
/// masks are left out; remembered cells are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub version: u32,
    pub complex: Complex,
    pub player: Player,
}

impl GameSnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: GameSnapshot = serde_json::from_str(json)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }
        Ok(snapshot)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::entity::EntityKind;
    use crate::common::game_logic::Game;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn game(seed: u64) -> Game {
        let mut rng = StdRng::seed_from_u64(seed);
        Game::new(&mut rng)
    }

    #[test]
    fn test_file_round_trip_keeps_doors_and_player() {
        let mut game = game(21);
        let id = game.player.floor;
        let door = game.complex.floor_mut(id).unwrap().entities.iter_mut().find(|e| e.is_door());
        let opened = door.map(|d| {
            d.kind = EntityKind::Door { open: true, facing: crate::common::grid::Direction::North };
            (d.x, d.y)
        });

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        game.snapshot().save(&path).unwrap();
        let loaded = GameSnapshot::load(&path).unwrap();

        assert_eq!(loaded.player, game.player);
        let floor = loaded.complex.floor(id).unwrap();
        if let Some((x, y)) = opened {
            assert!(!floor.door_at(x, y).unwrap().is_closed_door());
        }
        assert_eq!(floor.cells, game.active_floor().unwrap().cells);
        assert_eq!(floor.explored, game.active_floor().unwrap().explored);
    }

    #[test]
    fn test_restored_game_recomputes_masks() {
        let game = game(22);
        let json = game.snapshot().to_json().unwrap();

        let mut other = self::game(23);
        other.restore(GameSnapshot::from_json(&json).unwrap());

        let floor = other.active_floor().unwrap();
        assert_eq!(other.player, game.player);
        assert!(floor.is_visible(other.player.x, other.player.y));
        assert_eq!(floor.light, game.active_floor().unwrap().light);
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let mut snapshot = game(24).snapshot();
        snapshot.version = SNAPSHOT_VERSION + 1;
        let json = snapshot.to_json().unwrap();

        assert!(matches!(GameSnapshot::from_json(&json), Err(SnapshotError::UnsupportedVersion(v)) if v == SNAPSHOT_VERSION + 1));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(GameSnapshot::load(dir.path().join("absent.json")), Err(SnapshotError::Io(_))));
    }
}
