use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::ComplexConfig;
use super::constants::GameConstants;
use super::dungeon::{FloorGenerator, FloorLayout, Hallways};
use super::entity::{Entity, FloorId, LightSource, Player};
use super::fov::FieldOfView;
use super::grid::{Cell, Direction, Grid, Rect, Room};
use super::lighting::LightEngine;

/// One building level (or an outdoor lot) at a block position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Floor {
    pub id: FloorId,
    pub outdoor: bool,
    pub block_label: Option<char>,
    pub cells: Grid<Cell>,
    pub rooms: Vec<Room>,
    pub center: (i32, i32),
    pub hallways: Option<Hallways>,
    pub entities: Vec<Entity>,
    /// Same-level neighbours, indexed by `Direction::index`
    pub links: [Option<FloorId>; 4],
    pub link_above: Option<FloorId>,
    pub link_below: Option<FloorId>,
    pub stairs: Vec<(i32, i32)>,
    #[serde(skip)]
    pub light: Grid<u8>,
    #[serde(skip)]
    pub visible: Grid<bool>,
    pub explored: Grid<bool>,
}

impl Floor {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, id: FloorId, outdoor: bool, config: &ComplexConfig) -> Self {
        let layout = FloorGenerator::generate(
            rng,
            GameConstants::FLOOR_WIDTH,
            GameConstants::FLOOR_HEIGHT,
            outdoor,
            id.level,
            config,
        );
        Self::from_layout(id, outdoor, layout)
    }

    pub fn from_layout(id: FloorId, outdoor: bool, layout: FloorLayout) -> Self {
        let (width, height) = (layout.cells.width(), layout.cells.height());
        Floor {
            id,
            outdoor,
            block_label: None,
            cells: layout.cells,
            rooms: layout.rooms,
            center: layout.center,
            hallways: layout.hallways,
            entities: layout.entities,
            links: [None; 4],
            link_above: None,
            link_below: None,
            stairs: Vec::new(),
            light: Grid::new(width, height, GameConstants::AMBIENT_LIGHT),
            visible: Grid::new(width, height, false),
            explored: Grid::new(width, height, false),
        }
    }

    /// Generate a fresh layout in place. The floor keeps its place in the
    /// complex: links stay set and their edges are reopened, and the stair
    /// cells shared with the rest of the stack are stamped again. Remembered
    /// cells are dropped with the old layout.
    pub fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R, config: &ComplexConfig) {
        let layout = FloorGenerator::generate(
            rng,
            self.cells.width(),
            self.cells.height(),
            self.outdoor,
            self.id.level,
            config,
        );
        let fresh = Self::from_layout(self.id, self.outdoor, layout);
        let old = std::mem::replace(self, fresh);
        self.block_label = old.block_label;
        self.links = old.links;
        self.link_above = old.link_above;
        self.link_below = old.link_below;

        for &(x, y) in &old.stairs {
            self.cells.set(x, y, Cell::Stairs);
        }
        self.stairs = old.stairs;
        for direction in Direction::ALL {
            if self.link(direction).is_some() {
                self.carve_link_opening(direction);
            }
        }
    }

    /// Independent copy of this floor's layout for another level of the same
    /// block. Rooms are renumbered; links and remembered cells start empty.
    pub fn clone_to_level(&self, level: usize) -> Self {
        let mut copy = self.clone();
        copy.id.level = level;
        for (index, room) in copy.rooms.iter_mut().enumerate() {
            room.number = Room::display_number(level, index);
        }
        copy.links = [None; 4];
        copy.link_above = None;
        copy.link_below = None;
        copy.explored.fill(false);
        copy.visible.fill(false);
        copy
    }

    pub fn width(&self) -> i32 {
        self.cells.width()
    }

    pub fn height(&self) -> i32 {
        self.cells.height()
    }

    /// Bounds-safe cell read
    pub fn cell(&self, x: i32, y: i32) -> Cell {
        self.cells.cell(x, y)
    }

    pub fn link(&self, direction: Direction) -> Option<FloorId> {
        self.links[direction.index()]
    }

    pub fn door_at(&self, x: i32, y: i32) -> Option<&Entity> {
        self.entities.iter().find(|e| e.is_door() && e.x == x && e.y == y)
    }

    pub fn door_at_mut(&mut self, x: i32, y: i32) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.is_door() && e.x == x && e.y == y)
    }

    /// Doors sitting on the room's wall; empty for an unconnected room
    pub fn doors_of_room(&self, room: &Room) -> Vec<&Entity> {
        self.entities
            .iter()
            .filter(|e| e.is_door() && room.rect.perimeter().any(|p| p == (e.x, e.y)))
            .collect()
    }

    /// Opaque to sight and light: Wall, Null, off-grid, or a closed door
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).is_opaque() || self.door_at(x, y).is_some_and(|d| d.is_closed_door())
    }

    pub fn is_passable(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).is_walkable() && !self.door_at(x, y).is_some_and(|d| d.is_closed_door())
    }

    pub fn light_sources(&self) -> Vec<LightSource> {
        self.entities.iter().filter_map(|e| e.light_source()).collect()
    }

    /// Full light recompute. The player's flashlight only counts when the
    /// player stands on this floor.
    pub fn recompute_light(&mut self, player: Option<&Player>) {
        let mut sources = self.light_sources();
        if let Some(player) = player.filter(|p| p.floor == self.id) {
            sources.push(player.flashlight());
        }
        let light = LightEngine::compute(&self.cells, &sources, |x, y| self.is_blocked(x, y));
        self.light = light;
    }

    /// Replace the visibility mask with the player's current field of view
    /// and fold it into the remembered cells.
    pub fn recompute_visibility(&mut self, player: &Player) {
        let visible = FieldOfView::compute(
            self.width(),
            self.height(),
            (player.x, player.y),
            GameConstants::SIGHT_RADIUS,
            |x, y| self.is_blocked(x, y),
        );
        if self.explored.width() != self.width() || self.explored.height() != self.height() {
            self.explored = Grid::new(self.width(), self.height(), false);
        }
        for ((x, y), seen) in visible.iter() {
            if seen {
                self.explored.set(x, y, true);
            }
        }
        self.visible = visible;
    }

    pub fn light_at(&self, x: i32, y: i32) -> u8 {
        self.light.get(x, y).unwrap_or(0)
    }

    pub fn is_visible(&self, x: i32, y: i32) -> bool {
        self.visible.get(x, y).unwrap_or(false)
    }

    pub fn is_explored(&self, x: i32, y: i32) -> bool {
        self.explored.get(x, y).unwrap_or(false)
    }

    /// Stairs cell plus the wall that closes the niche behind it
    pub fn stamp_stairs(&mut self, site: (i32, i32), flank: (i32, i32)) {
        self.cells.set(site.0, site.1, Cell::Stairs);
        self.cells.set(flank.0, flank.1, Cell::Wall);
        if !self.stairs.contains(&site) {
            self.stairs.push(site);
        }
    }

    /// Open this floor's edge toward a linked neighbour. Built floors extend
    /// the matching hallway to the edge and end it in Link cells; outdoor
    /// floors turn the whole edge into Link.
    pub fn carve_link_opening(&mut self, direction: Direction) {
        let (width, height) = (self.width(), self.height());

        if self.outdoor {
            // Corners stay Tile so each Link cell belongs to a single edge
            for (x, y) in edge_cells(width, height, direction) {
                if edges_at(width, height, x, y).len() == 1 {
                    self.cells.set(x, y, Cell::Link);
                }
            }
            return;
        }
        let Some(hallways) = self.hallways else {
            return;
        };

        let (h, v) = (hallways.horizontal, hallways.vertical);
        let (corridor, mouth) = match direction {
            Direction::East => (
                Rect::new(h.right(), h.y, width - 1 - h.right(), h.h),
                Rect::new(width - 1, h.y, 1, h.h),
            ),
            Direction::West => (Rect::new(1, h.y, h.x - 1, h.h), Rect::new(0, h.y, 1, h.h)),
            Direction::North => (Rect::new(v.x, 1, v.w, v.y - 1), Rect::new(v.x, 0, v.w, 1)),
            Direction::South => (
                Rect::new(v.x, v.bottom(), v.w, height - 1 - v.bottom()),
                Rect::new(v.x, height - 1, v.w, 1),
            ),
        };

        for (x, y) in corridor.cells() {
            if self.cell(x, y) != Cell::Stairs {
                self.cells.set(x, y, Cell::Tile);
            }
        }
        for (x, y) in corridor.perimeter().chain(mouth.perimeter()) {
            if self.cell(x, y) == Cell::Null {
                self.cells.set(x, y, Cell::Wall);
            }
        }
        for (x, y) in mouth.cells() {
            self.cells.set(x, y, Cell::Link);
        }
    }

    /// Link cells along one edge
    pub fn link_cells(&self, edge: Direction) -> Vec<(i32, i32)> {
        edge_cells(self.width(), self.height(), edge)
            .filter(|&(x, y)| self.cell(x, y) == Cell::Link)
            .collect()
    }

    /// Where a player arriving through `edge` lands: one step inside the Link
    /// cell on that edge nearest to `along` (y for East/West, x for North/South).
    pub fn entry_point(&self, edge: Direction, along: i32) -> Option<(i32, i32)> {
        let (ix, iy) = edge.opposite().delta();
        self.link_cells(edge)
            .into_iter()
            .map(|(x, y)| (x + ix, y + iy))
            .filter(|&(x, y)| self.is_passable(x, y) && self.cell(x, y) != Cell::Link)
            .min_by_key(|&(x, y)| match edge {
                Direction::East | Direction::West => (y - along).abs(),
                Direction::North | Direction::South => (x - along).abs(),
            })
    }
}

/// Coordinates of one edge of a width×height grid
pub fn edge_cells(width: i32, height: i32, edge: Direction) -> Box<dyn Iterator<Item = (i32, i32)>> {
    match edge {
        Direction::North => Box::new((0..width).map(|x| (x, 0))),
        Direction::South => Box::new((0..width).map(move |x| (x, height - 1))),
        Direction::West => Box::new((0..height).map(|y| (0, y))),
        Direction::East => Box::new((0..height).map(move |y| (width - 1, y))),
    }
}

/// Edges a coordinate lies on
pub fn edges_at(width: i32, height: i32, x: i32, y: i32) -> Vec<Direction> {
    let mut edges = Vec::new();
    if x == 0 {
        edges.push(Direction::West);
    }
    if x == width - 1 {
        edges.push(Direction::East);
    }
    if y == 0 {
        edges.push(Direction::North);
    }
    if y == height - 1 {
        edges.push(Direction::South);
    }
    edges
}
