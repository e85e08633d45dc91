use log::{debug, trace};
use noise::{NoiseFn, Perlin};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::ComplexConfig;
use super::constants::GameConstants;
use super::entity::Entity;
use super::grid::{stamp_rect, Cell, Direction, Grid, Rect, Room};

const ROOM_PROPS: [&str; 5] = ["terminal", "desk", "filing cabinet", "server rack", "water cooler"];
const OUTDOOR_PROP: &str = "shrub";

/// The two hallway interiors of a built floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hallways {
    pub horizontal: Rect,
    pub vertical: Rect,
}

/// Everything the generator produces for one floor
#[derive(Debug, Clone)]
pub struct FloorLayout {
    pub cells: Grid<Cell>,
    pub center: (i32, i32),
    pub rooms: Vec<Room>,
    pub hallways: Option<Hallways>,
    pub entities: Vec<Entity>,
}

/// Single-floor layout generator: hallway cross, room bands and doors
pub struct FloorGenerator;

impl FloorGenerator {
    /// Generate one floor. Never fails; a cramped layout just ends up with
    /// fewer rooms.
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        width: i32,
        height: i32,
        outdoor: bool,
        level: usize,
        config: &ComplexConfig,
    ) -> FloorLayout {
        let cells = Grid::new(width, height, Cell::Null);
        if outdoor {
            Self::generate_outdoor(rng, cells, config)
        } else {
            Self::generate_building(rng, cells, level, config)
        }
    }

    /// Uniform open terrain with a lattice of lights and scattered shrubs
    fn generate_outdoor<R: Rng + ?Sized>(rng: &mut R, mut cells: Grid<Cell>, config: &ComplexConfig) -> FloorLayout {
        cells.fill(Cell::Tile);
        let (width, height) = (cells.width(), cells.height());
        let spacing = GameConstants::OUTDOOR_LIGHT_SPACING;

        let mut entities = Vec::new();
        let mut y = spacing / 2;
        while y < height {
            let mut x = spacing / 2;
            while x < width {
                entities.push(Entity::light(x, y, config.static_light_radius));
                x += spacing;
            }
            y += spacing;
        }

        let scatter = Perlin::new(rng.gen());
        for (x, y) in cells.coords() {
            let value = scatter.get([x as f64 * 0.15, y as f64 * 0.15]);
            let occupied = entities.iter().any(|e| e.x == x && e.y == y);
            if value > GameConstants::OUTDOOR_PROP_THRESHOLD && !occupied {
                entities.push(Entity::prop(x, y, OUTDOOR_PROP));
            }
        }

        FloorLayout {
            cells,
            center: (width / 2, height / 2),
            rooms: Vec::new(),
            hallways: None,
            entities,
        }
    }

    fn generate_building<R: Rng + ?Sized>(
        rng: &mut R,
        mut cells: Grid<Cell>,
        level: usize,
        config: &ComplexConfig,
    ) -> FloorLayout {
        let hallways = Self::draw_hallways(rng, cells.width(), cells.height());
        stamp_rect(&mut cells, hallways.horizontal);
        stamp_rect(&mut cells, hallways.vertical);
        let center = (hallways.vertical.x + 1, hallways.horizontal.y + 1);

        let mut entities = hallway_lights(hallways.horizontal, center, config.static_light_radius);

        let room_height = rng.gen_range(GameConstants::ROOM_MIN_HEIGHT..=GameConstants::ROOM_MAX_HEIGHT);
        let mut rooms = Vec::new();
        for band in [Direction::South, Direction::North] {
            let band_rooms =
                place_room_band(&mut cells, rng, hallways.horizontal, band, room_height, level, rooms.len());
            rooms.extend(band_rooms);
        }

        let doors = place_doors(&mut cells, rng, &rooms);
        debug!(
            "floor level {}: {} rooms, {} doors, {} unconnected",
            level,
            rooms.len(),
            doors.len(),
            rooms.len() - doors.len()
        );
        entities.extend(doors);

        for room in &rooms {
            if rng.gen_bool(config.prop_chance.clamp(0.0, 1.0)) {
                let (x, y) = room.rect.center();
                let name = ROOM_PROPS.choose(rng).copied().unwrap_or("desk");
                entities.push(Entity::prop(x, y, name));
            }
        }

        FloorLayout {
            cells,
            center,
            rooms,
            hallways: Some(hallways),
            entities,
        }
    }

    /// Horizontal hallway across most of the floor, crossed by a vertical one
    fn draw_hallways<R: Rng + ?Sized>(rng: &mut R, width: i32, height: i32) -> Hallways {
        let size = GameConstants::HALLWAY_SIZE;

        let hx = rng.gen_range(2..=6);
        let hw = width - hx - rng.gen_range(2..=6);
        let hy = rng.gen_range(height / 2 - 4..=height / 2 + 1);

        let vx = rng.gen_range(width / 2 - 8..=width / 2 + 5);
        let vy = rng.gen_range(2..=5);
        let vh = height - vy - rng.gen_range(2..=5);

        Hallways {
            horizontal: Rect::new(hx, hy, hw.max(size), size),
            vertical: Rect::new(vx, vy, size, vh.max(size)),
        }
    }
}

/// Light at the hallway crossing plus one every 15 cells along the horizontal hallway
pub fn hallway_lights(hallway: Rect, center: (i32, i32), radius: i32) -> Vec<Entity> {
    let (cx, cy) = center;
    let spacing = GameConstants::HALLWAY_LIGHT_SPACING;
    let mut lights = vec![Entity::light(cx, cy, radius)];

    let mut offset = spacing;
    loop {
        let mut placed = false;
        for x in [cx + offset, cx - offset] {
            if x >= hallway.x && x < hallway.right() {
                lights.push(Entity::light(x, cy, radius));
                placed = true;
            }
        }
        if !placed {
            break;
        }
        offset += spacing;
    }
    lights
}

/// Scan along `hallway` placing rooms on one side of it.
///
/// `facing` is the direction from the rooms toward the hallway, so
/// `Direction::South` fills the band above it. Both bands of a floor share
/// `room_height`, clamped here to the grid; widths are clamped to the
/// hallway's extent and a candidate two cells wide or less is skipped.
pub fn place_room_band<R: Rng + ?Sized>(
    cells: &mut Grid<Cell>,
    rng: &mut R,
    hallway: Rect,
    facing: Direction,
    room_height: i32,
    level: usize,
    first_index: usize,
) -> Vec<Room> {
    let (y, height) = match facing {
        Direction::South => {
            // Top wall must stay on row 0 or below
            let h = room_height.min(hallway.y - 2);
            (hallway.y - 1 - h, h)
        }
        _ => {
            let h = room_height.min(cells.height() - hallway.bottom() - 2);
            (hallway.bottom() + 1, h)
        }
    };
    if height < 1 {
        return Vec::new();
    }

    let mut rooms = Vec::new();
    let mut x = hallway.x;
    while x < hallway.right() {
        let w = rng
            .gen_range(GameConstants::ROOM_MIN_WIDTH..=GameConstants::ROOM_MAX_WIDTH)
            .min(hallway.right() - x);
        if w <= 2 {
            x += 1;
            continue;
        }

        let rect = Rect::new(x, y, w, height);
        if rect.cells().any(|(cx, cy)| cells.cell(cx, cy) != Cell::Null) {
            trace!("room candidate at ({}, {}) w={} rejected", x, y, w);
            x += 1;
            continue;
        }

        stamp_rect(cells, rect);
        rooms.push(Room {
            rect,
            number: Room::display_number(level, first_index + rooms.len()),
            facing,
        });
        // Next room shares this one's right wall
        x = rect.right() + 1;
    }
    rooms
}

/// Wall cells on the room's hallway side that can become a door: both
/// neighbours along the wall are Wall and the cell beyond is hallway Tile.
pub fn door_candidates(cells: &Grid<Cell>, room: &Room) -> Vec<(i32, i32)> {
    let wall = room.hallway_wall();
    let (dx, dy) = room.facing.delta();
    let along: Vec<(i32, i32)> = match room.facing {
        Direction::North | Direction::South => (room.rect.x..room.rect.right()).map(|x| (x, wall)).collect(),
        Direction::East | Direction::West => (room.rect.y..room.rect.bottom()).map(|y| (wall, y)).collect(),
    };
    // Step along the wall is perpendicular to the facing
    let (sx, sy) = (dy.abs(), dx.abs());

    along
        .into_iter()
        .filter(|&(x, y)| {
            cells.cell(x, y) == Cell::Wall
                && cells.cell(x - sx, y - sy) == Cell::Wall
                && cells.cell(x + sx, y + sy) == Cell::Wall
                && cells.cell(x + dx, y + dy) == Cell::Tile
        })
        .collect()
}

/// Give every room one door picked uniformly from its candidates. Rooms
/// without candidates are left unconnected.
pub fn place_doors<R: Rng + ?Sized>(cells: &mut Grid<Cell>, rng: &mut R, rooms: &[Room]) -> Vec<Entity> {
    let mut doors = Vec::new();
    for room in rooms {
        let candidates = door_candidates(cells, room);
        match candidates.choose(rng) {
            Some(&(x, y)) => {
                cells.set(x, y, Cell::Tile);
                doors.push(Entity::door(x, y, room.facing));
            }
            None => debug!("room {} has no door candidate", room.number),
        }
    }
    doors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::entity::EntityKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn building(seed: u64) -> FloorLayout {
        let mut rng = StdRng::seed_from_u64(seed);
        FloorGenerator::generate(
            &mut rng,
            GameConstants::FLOOR_WIDTH,
            GameConstants::FLOOR_HEIGHT,
            false,
            0,
            &ComplexConfig::default(),
        )
    }

    #[test]
    fn test_outdoor_floor_is_open() {
        let mut rng = StdRng::seed_from_u64(3);
        let layout = FloorGenerator::generate(&mut rng, 61, 38, true, 0, &ComplexConfig::default());

        assert_eq!(layout.cells.count(Cell::Tile), 61 * 38);
        assert_eq!(layout.center, (30, 19));
        assert!(layout.rooms.is_empty());
        assert!(layout.hallways.is_none());

        let lights: Vec<_> = layout.entities.iter().filter_map(|e| e.light_source()).collect();
        assert_eq!(lights.len(), 6 * 4);
        assert!(lights.iter().all(|l| l.x % 10 == 5 && l.y % 10 == 5));
        assert!(layout.entities.iter().all(|e| !e.is_door()));
    }

    #[test]
    fn test_building_center_is_lit_hallway_crossing() {
        for seed in 0..20 {
            let layout = building(seed);
            let hallways = layout.hallways.unwrap();
            let (cx, cy) = layout.center;

            assert!(hallways.horizontal.contains(cx, cy));
            assert!(hallways.vertical.contains(cx, cy));
            assert_eq!(layout.cells.cell(cx, cy), Cell::Tile);
            assert!(layout
                .entities
                .iter()
                .any(|e| e.x == cx && e.y == cy && e.light_source().is_some()));
        }
    }

    #[test]
    fn test_hallway_lights_are_spaced() {
        let hallway = Rect::new(2, 17, 55, 3);
        let lights = hallway_lights(hallway, (30, 18), 14);
        let mut xs: Vec<i32> = lights.iter().map(|e| e.x).collect();
        xs.sort();

        assert_eq!(xs, vec![15, 30, 45]);
        assert!(lights.iter().all(|e| e.y == 18));
    }

    #[test]
    fn test_cells_stay_in_bounds() {
        for seed in 0..20 {
            let layout = building(seed);
            assert_eq!(layout.cells.width(), GameConstants::FLOOR_WIDTH);
            assert_eq!(layout.cells.height(), GameConstants::FLOOR_HEIGHT);
            for room in &layout.rooms {
                assert!(room.rect.x >= 1 && room.rect.y >= 1);
                assert!(room.rect.right() < GameConstants::FLOOR_WIDTH);
                assert!(room.rect.bottom() < GameConstants::FLOOR_HEIGHT);
            }
        }
    }

    #[test]
    fn test_rooms_are_walled_and_numbered() {
        let layout = building(7);
        assert!(!layout.rooms.is_empty());

        for (index, room) in layout.rooms.iter().enumerate() {
            assert_eq!(room.number, 100 + index as u32);
            for (x, y) in room.rect.cells() {
                assert_eq!(layout.cells.cell(x, y), Cell::Tile);
            }
            let doors: Vec<_> = layout
                .entities
                .iter()
                .filter(|e| e.is_door() && room.rect.perimeter().any(|p| p == (e.x, e.y)))
                .collect();
            for (x, y) in room.rect.perimeter() {
                let cell = layout.cells.cell(x, y);
                let is_door = doors.iter().any(|d| d.x == x && d.y == y);
                assert!(cell == Cell::Wall || is_door, "room {} perimeter ({x},{y}) is {:?}", room.number, cell);
            }
        }
    }

    #[test]
    fn test_each_room_has_at_most_one_door_on_hallway_wall() {
        for seed in 0..10 {
            let layout = building(seed);
            for room in &layout.rooms {
                let wall = room.hallway_wall();
                let doors: Vec<_> = layout
                    .entities
                    .iter()
                    .filter(|e| e.is_door() && e.y == wall && e.x >= room.rect.x && e.x < room.rect.right())
                    .collect();
                assert!(doors.len() <= 1);
                for door in doors {
                    assert_eq!(layout.cells.cell(door.x, door.y), Cell::Tile);
                    let (dx, dy) = room.facing.delta();
                    assert_eq!(layout.cells.cell(door.x + dx, door.y + dy), Cell::Tile);
                    assert!(matches!(door.kind, EntityKind::Door { open: false, facing } if facing == room.facing));
                }
            }
        }
    }

    #[test]
    fn test_room_band_clamps_and_skips_narrow_candidates() {
        let mut cells = Grid::new(20, 12, Cell::Null);
        let hallway = Rect::new(2, 3, 4, 3);
        stamp_rect(&mut cells, hallway);
        let mut rng = StdRng::seed_from_u64(1);

        let rooms =
            place_room_band(&mut cells, &mut rng, hallway, Direction::South, GameConstants::ROOM_MAX_HEIGHT, 0, 0);

        // Only one row fits above the hallway and the extent is four cells
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].rect, Rect::new(2, 1, 4, 1));
        assert_eq!(cells.cell(2, 0), Cell::Wall);
    }

    #[test]
    fn test_both_bands_share_room_height() {
        for seed in 0..20 {
            let layout = building(seed);
            let hallway = layout.hallways.unwrap().horizontal;
            let above: Vec<i32> = layout.rooms.iter().filter(|r| r.rect.y < hallway.y).map(|r| r.rect.h).collect();
            let below: Vec<i32> = layout.rooms.iter().filter(|r| r.rect.y > hallway.y).map(|r| r.rect.h).collect();
            assert!(!above.is_empty() && !below.is_empty(), "seed {seed}");

            let height = above[0];
            assert!((GameConstants::ROOM_MIN_HEIGHT..=GameConstants::ROOM_MAX_HEIGHT).contains(&height));
            assert!(above.iter().chain(&below).all(|&h| h == height), "seed {seed}: {above:?} vs {below:?}");
        }
    }

    #[test]
    fn test_room_without_candidates_stays_unconnected() {
        let mut cells = Grid::new(12, 12, Cell::Null);
        let room = Room { rect: Rect::new(2, 2, 3, 3), number: 100, facing: Direction::South };
        stamp_rect(&mut cells, room.rect);
        let mut rng = StdRng::seed_from_u64(0);

        // No hallway below the room
        assert!(door_candidates(&cells, &room).is_empty());
        assert!(place_doors(&mut cells, &mut rng, &[room]).is_empty());
        assert_eq!(cells.cell(3, 5), Cell::Wall);
    }

    #[test]
    fn test_door_candidates_need_hallway_tile_beyond() {
        let mut cells = Grid::new(12, 12, Cell::Null);
        let room = Room { rect: Rect::new(2, 2, 5, 3), number: 100, facing: Direction::South };
        stamp_rect(&mut cells, room.rect);
        cells.set(4, 6, Cell::Tile);

        assert_eq!(door_candidates(&cells, &room), vec![(4, 5)]);
    }
}
