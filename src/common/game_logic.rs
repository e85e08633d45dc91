// Game context: owns the complex and the player, implements every player action
use log::{debug, info};
use rand::Rng;

use super::complex::{Complex, ComplexBuilder, Floor};
use super::config::ComplexConfig;
use super::entity::{EntityKind, FloorId, Player};
use super::floor::edges_at;
use super::grid::{Cell, Direction, Facing};
use super::snapshot::{GameSnapshot, SNAPSHOT_VERSION};

#[derive(Debug, Clone)]
pub struct Game {
    pub complex: Complex,
    pub player: Player,
    pub config: ComplexConfig,
    /// Successful actions since the complex was generated
    pub turn: u64,
}

impl Game {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::with_config(rng, ComplexConfig::default())
    }

    pub fn with_config<R: Rng + ?Sized>(rng: &mut R, config: ComplexConfig) -> Self {
        let complex = ComplexBuilder::new(config.clone()).build(rng);
        let player = spawn_player(&complex, &config);
        Self::from_parts(complex, player, config)
    }

    /// Assemble a game from existing state and bring the derived maps up to date
    pub fn from_parts(complex: Complex, player: Player, config: ComplexConfig) -> Self {
        let mut game = Game { complex, player, config, turn: 0 };
        game.recompute();
        game
    }

    pub fn active_floor(&self) -> Option<&Floor> {
        self.complex.floor(self.player.floor)
    }

    pub fn floor(&self, id: FloorId) -> Option<&Floor> {
        self.complex.floor(id)
    }

    /// Step one cell. Facing follows (dx, dy) even when the step is refused.
    /// Stepping onto a Link cell carries the player to the neighbouring floor.
    pub fn move_player(&mut self, dx: i32, dy: i32) -> bool {
        let Some(facing) = Facing::from_delta(dx, dy) else {
            return false;
        };
        self.player.facing = facing;

        let Some(floor) = self.active_floor() else {
            return false;
        };
        let (tx, ty) = (self.player.x + dx, self.player.y + dy);
        if !floor.is_passable(tx, ty) {
            self.recompute_light();
            return false;
        }
        // No squeezing diagonally between two blocked corners
        let (px, py) = (self.player.x, self.player.y);
        if dx != 0 && dy != 0 && !floor.is_passable(px + dx, py) && !floor.is_passable(px, py + dy) {
            self.recompute_light();
            return false;
        }

        if floor.cell(tx, ty) == Cell::Link {
            let crossing = edges_at(floor.width(), floor.height(), tx, ty)
                .into_iter()
                .find_map(|edge| floor.link(edge).map(|target| (edge, target)));
            if let Some((edge, target)) = crossing {
                return self.cross_link(edge, target, (tx, ty));
            }
        }

        self.player.x = tx;
        self.player.y = ty;
        self.turn += 1;
        self.recompute();
        true
    }

    fn cross_link(&mut self, edge: Direction, target: FloorId, (x, y): (i32, i32)) -> bool {
        let along = match edge {
            Direction::East | Direction::West => y,
            Direction::North | Direction::South => x,
        };
        let Some((ex, ey)) = self.floor(target).and_then(|f| f.entry_point(edge.opposite(), along)) else {
            debug!("no entry on {:?} edge of {:?}", edge.opposite(), target);
            self.recompute_light();
            return false;
        };

        info!("player crossed {:?} from {:?} to {:?}", edge, self.player.floor, target);
        self.player.floor = target;
        self.player.x = ex;
        self.player.y = ey;
        self.turn += 1;
        self.recompute();
        true
    }

    /// Repeat single steps until one fails, the floor changes, or `max_steps`
    /// is reached. Returns the number of steps taken.
    pub fn sprint(&mut self, dx: i32, dy: i32, max_steps: u32) -> u32 {
        let start_floor = self.player.floor;
        let mut steps = 0;
        while steps < max_steps {
            if !self.move_player(dx, dy) {
                break;
            }
            steps += 1;
            if self.player.floor != start_floor {
                break;
            }
        }
        steps
    }

    /// Open the closed door in front of the player
    pub fn open_door(&mut self) -> bool {
        let (x, y) = self.player.facing_cell();
        let opened = match self.complex.floor_mut(self.player.floor).and_then(|f| f.door_at_mut(x, y)) {
            Some(door) => match &mut door.kind {
                EntityKind::Door { open, .. } if !*open => {
                    *open = true;
                    true
                }
                _ => false,
            },
            None => false,
        };

        if opened {
            debug!("door opened at ({}, {}) on {:?}", x, y, self.player.floor);
            self.turn += 1;
            self.recompute();
        }
        opened
    }

    /// Climb or descend from a Stairs cell, keeping the same (x, y)
    pub fn take_stairs(&mut self, upward: bool) -> bool {
        let Some(floor) = self.active_floor() else {
            return false;
        };
        if floor.cell(self.player.x, self.player.y) != Cell::Stairs {
            return false;
        }
        let target = if upward { floor.link_above } else { floor.link_below };
        let Some(target) = target else {
            return false;
        };
        if !self.floor(target).is_some_and(|f| f.is_passable(self.player.x, self.player.y)) {
            return false;
        }

        info!("player took stairs from {:?} to {:?}", self.player.floor, target);
        self.player.floor = target;
        self.turn += 1;
        self.recompute();
        true
    }

    pub fn recompute_light(&mut self) {
        if let Some(floor) = self.complex.floor_mut(self.player.floor) {
            floor.recompute_light(Some(&self.player));
        }
    }

    pub fn recompute_visibility(&mut self) {
        if let Some(floor) = self.complex.floor_mut(self.player.floor) {
            floor.recompute_visibility(&self.player);
        }
    }

    pub fn recompute(&mut self) {
        self.recompute_light();
        self.recompute_visibility();
    }

    /// Throw the current complex away and start over with the same tunables
    pub fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        *self = Self::with_config(rng, self.config.clone());
        info!("complex regenerated, player at {:?}", self.player.floor);
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            version: SNAPSHOT_VERSION,
            complex: self.complex.clone(),
            player: self.player.clone(),
        }
    }

    /// Replace the world with a snapshot. Light and visibility are not part of
    /// a snapshot and get recomputed here.
    pub fn restore(&mut self, snapshot: GameSnapshot) {
        let GameSnapshot { complex, player, .. } = snapshot;
        let turn = self.turn;
        *self = Self::from_parts(complex, player, self.config.clone());
        self.turn = turn;
    }
}

/// Center of block A's ground floor, or the (0, 0) stack when nothing is built
fn spawn_player(complex: &Complex, config: &ComplexConfig) -> Player {
    let floor = complex.block('A').or_else(|| complex.floor_at(0, 0, 0));
    match floor {
        Some(floor) => Player::new(floor.center.0, floor.center.1, floor.id, config.flashlight_radius),
        None => Player::new(0, 0, FloorId::new(0, 0, 0), config.flashlight_radius),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::constants::GameConstants;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn game(seed: u64) -> Game {
        let mut rng = StdRng::seed_from_u64(seed);
        Game::new(&mut rng)
    }

    fn set_cell(game: &mut Game, x: i32, y: i32, cell: Cell) {
        let id = game.player.floor;
        game.complex.floor_mut(id).unwrap().cells.set(x, y, cell);
    }

    /// Game with a multi-floor block, player standing on one of its ground stairs
    fn game_on_stairs() -> Game {
        for seed in 0..50 {
            let mut game = game(seed);
            let Some(ground) = game.complex.built_blocks().find(|f| !f.stairs.is_empty()) else {
                continue;
            };
            let (id, (x, y)) = (ground.id, ground.stairs[0]);
            game.player.floor = id;
            game.player.x = x;
            game.player.y = y;
            game.recompute();
            return game;
        }
        panic!("no stairs in 50 seeds");
    }

    #[test]
    fn test_spawn_on_block_a_center() {
        let game = game(1);
        let floor = game.active_floor().unwrap();
        assert_eq!(floor.block_label, Some('A'));
        assert_eq!((game.player.x, game.player.y), floor.center);
        assert_eq!(game.player.facing, Facing::South);
        assert!(floor.is_visible(game.player.x, game.player.y));
        assert!(floor.light_at(game.player.x, game.player.y) > GameConstants::AMBIENT_LIGHT);
    }

    #[test]
    fn test_invalid_delta_is_refused() {
        let mut game = game(2);
        let before = game.player.clone();
        assert!(!game.move_player(0, 0));
        assert!(!game.move_player(2, 0));
        assert_eq!(game.player, before);
    }

    #[test]
    fn test_blocked_move_still_turns_player() {
        let mut game = game(3);
        let (x, y) = (game.player.x, game.player.y);
        set_cell(&mut game, x + 1, y, Cell::Wall);

        assert!(!game.move_player(1, 0));
        assert_eq!((game.player.x, game.player.y), (x, y));
        assert_eq!(game.player.facing, Facing::East);
        assert_eq!(game.turn, 0);
    }

    #[test]
    fn test_move_onto_tile() {
        let mut game = game(4);
        let (x, y) = (game.player.x, game.player.y);
        set_cell(&mut game, x - 1, y, Cell::Tile);

        assert!(game.move_player(-1, 0));
        assert_eq!((game.player.x, game.player.y), (x - 1, y));
        assert_eq!(game.turn, 1);
        assert!(game.active_floor().unwrap().is_explored(x - 1, y));
    }

    #[test]
    fn test_diagonal_refused_between_two_walls() {
        let mut game = game(5);
        let (x, y) = (game.player.x, game.player.y);
        set_cell(&mut game, x + 1, y + 1, Cell::Tile);
        set_cell(&mut game, x + 1, y, Cell::Wall);
        set_cell(&mut game, x, y + 1, Cell::Wall);
        assert!(!game.move_player(1, 1));
        assert_eq!(game.player.facing, Facing::SouthEast);

        set_cell(&mut game, x, y + 1, Cell::Tile);
        assert!(game.move_player(1, 1));
        assert_eq!((game.player.x, game.player.y), (x + 1, y + 1));
    }

    #[test]
    fn test_open_door_is_idempotent() {
        let (mut game, door) = (6..40)
            .find_map(|seed| {
                let game = game(seed);
                let door = game.active_floor()?.entities.iter().find(|e| e.is_door()).cloned()?;
                Some((game, door))
            })
            .unwrap();
        let EntityKind::Door { facing, .. } = door.kind else {
            unreachable!()
        };
        let (dx, dy) = facing.delta();
        game.player.x = door.x + dx;
        game.player.y = door.y + dy;
        game.player.facing = Facing::from(facing.opposite());

        assert!(!game.move_player(-dx, -dy));
        assert!(game.open_door());
        assert!(!game.open_door());
        assert!(!game.active_floor().unwrap().door_at(door.x, door.y).unwrap().is_closed_door());
        assert!(game.move_player(-dx, -dy));
        assert_eq!((game.player.x, game.player.y), (door.x, door.y));
    }

    #[test]
    fn test_open_door_without_door() {
        let mut game = game(7);
        assert!(!game.open_door());
        assert_eq!(game.turn, 0);
    }

    #[test]
    fn test_stairs_up_and_back_down() {
        let mut game = game_on_stairs();
        let ground = game.player.floor;
        let (x, y) = (game.player.x, game.player.y);

        assert!(!game.take_stairs(false));
        assert!(game.take_stairs(true));
        assert_eq!(game.player.floor, FloorId { level: 1, ..ground });
        assert_eq!((game.player.x, game.player.y), (x, y));
        assert!(game.active_floor().unwrap().is_visible(x, y));

        assert!(game.take_stairs(false));
        assert_eq!(game.player.floor, ground);
    }

    #[test]
    fn test_stairs_need_stairs_cell() {
        let mut game = game_on_stairs();
        let toward_center = if game.player.x < game.active_floor().unwrap().center.0 { 1 } else { -1 };
        game.player.x += toward_center;
        assert!(!game.take_stairs(true));
    }

    #[test]
    fn test_crossing_link_changes_floor() {
        for seed in 0..20 {
            let mut game = game(seed);
            let floor = game.active_floor().unwrap();
            let Some(edge) = Direction::ALL.into_iter().find(|d| floor.link(*d).is_some()) else {
                continue;
            };
            let target = floor.link(edge).unwrap();
            let (lx, ly) = floor.link_cells(edge)[0];
            let (ix, iy) = edge.opposite().delta();
            let (dx, dy) = edge.delta();
            game.player.x = lx + ix;
            game.player.y = ly + iy;

            assert!(game.move_player(dx, dy));
            assert_eq!(game.player.floor, target);
            let arrived = game.active_floor().unwrap();
            assert!(arrived.is_passable(game.player.x, game.player.y));
            assert_ne!(arrived.cell(game.player.x, game.player.y), Cell::Link);
            assert!(arrived.is_visible(game.player.x, game.player.y));
            return;
        }
        panic!("block A never linked in 20 seeds");
    }

    #[test]
    fn test_sprint_stops_at_wall() {
        let mut game = game(8);
        let (x, y) = (game.player.x, game.player.y);
        for step in 1..=2 {
            set_cell(&mut game, x + step, y, Cell::Tile);
        }
        set_cell(&mut game, x + 3, y, Cell::Wall);

        assert_eq!(game.sprint(1, 0, 8), 2);
        assert_eq!((game.player.x, game.player.y), (x + 2, y));
        assert_eq!(game.sprint(1, 0, 8), 0);
    }

    #[test]
    fn test_sprint_respects_max_steps() {
        let mut game = game(9);
        let (x, y) = (game.player.x, game.player.y);
        for step in 1..=5 {
            set_cell(&mut game, x + step, y, Cell::Tile);
        }
        assert_eq!(game.sprint(1, 0, 3), 3);
        assert_eq!(game.player.x, x + 3);
    }

    #[test]
    fn test_snapshot_restore_rewinds_player() {
        let mut game = game(10);
        let saved = game.snapshot();
        let before = game.player.clone();

        set_cell(&mut game, before.x + 1, before.y, Cell::Tile);
        game.move_player(1, 0);
        game.restore(saved);

        assert_eq!(game.player, before);
        assert!(game.active_floor().unwrap().is_visible(before.x, before.y));
    }

    #[test]
    fn test_regenerate_respawns_on_fresh_complex() {
        let mut game = game(11);
        game.turn = 5;
        let mut rng = StdRng::seed_from_u64(12);
        game.regenerate(&mut rng);

        assert_eq!(game.turn, 0);
        let floor = game.active_floor().unwrap();
        assert_eq!((game.player.x, game.player.y), floor.center);
    }
}
