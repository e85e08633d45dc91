use serde::{Deserialize, Serialize};

/// Contents of a single floor cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Outside the playable area, or never stamped
    #[default]
    Null,
    Tile,
    Wall,
    Stairs,
    /// Opening onto the neighbouring block on the same level
    Link,
}

impl Cell {
    pub fn is_walkable(self) -> bool {
        matches!(self, Cell::Tile | Cell::Stairs | Cell::Link)
    }

    /// Blocks sight and stops light rays
    pub fn is_opaque(self) -> bool {
        matches!(self, Cell::Wall | Cell::Null)
    }
}

/// Fixed-size row-major 2D array
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Grid<T> {
    width: i32,
    height: i32,
    cells: Vec<T>,
}

impl<T: Copy> Grid<T> {
    pub fn new(width: i32, height: i32, fill: T) -> Self {
        let len = (width.max(0) * height.max(0)) as usize;
        Grid {
            width: width.max(0),
            height: height.max(0),
            cells: vec![fill; len],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<T> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Writes outside the grid are ignored; returns whether the write landed
    pub fn set(&mut self, x: i32, y: i32, value: T) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    pub fn fill(&mut self, value: T) {
        self.cells.iter_mut().for_each(|c| *c = value);
    }

    /// All coordinates in row-major order
    pub fn coords(&self) -> impl Iterator<Item = (i32, i32)> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| (x, y)))
    }

    pub fn iter(&self) -> impl Iterator<Item = ((i32, i32), T)> + '_ {
        self.coords().zip(self.cells.iter().copied())
    }
}

impl Grid<Cell> {
    /// Bounds-safe read: off-grid coordinates read as `Cell::Null`
    pub fn cell(&self, x: i32, y: i32) -> Cell {
        self.get(x, y).unwrap_or(Cell::Null)
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|c| **c == cell).count()
    }
}

/// Interior rectangle; the walls sit one cell outside it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Interior coordinates
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let r = *self;
        (r.y..r.bottom()).flat_map(move |y| (r.x..r.right()).map(move |x| (x, y)))
    }

    /// Ring of cells one step outside the interior, corners included
    pub fn perimeter(&self) -> impl Iterator<Item = (i32, i32)> {
        let r = *self;
        (r.y - 1..=r.bottom()).flat_map(move |y| {
            (r.x - 1..=r.right()).filter_map(move |x| {
                let edge = x == r.x - 1 || x == r.right() || y == r.y - 1 || y == r.bottom();
                if edge { Some((x, y)) } else { None }
            })
        })
    }
}

/// Stamp a walled rectangle: the interior becomes Tile, the perimeter becomes
/// Wall wherever it is not already Tile. Cells outside the grid are skipped.
pub fn stamp_rect(cells: &mut Grid<Cell>, rect: Rect) {
    for (x, y) in rect.cells() {
        cells.set(x, y, Cell::Tile);
    }
    for (x, y) in rect.perimeter() {
        if cells.cell(x, y) != Cell::Tile {
            cells.set(x, y, Cell::Wall);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::North, Direction::East, Direction::South, Direction::West];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Slot in a floor's horizontal link table
    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }
}

/// Eight-way facing of the player or a directional light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Facing {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Facing::North => (0, -1),
            Facing::NorthEast => (1, -1),
            Facing::East => (1, 0),
            Facing::SouthEast => (1, 1),
            Facing::South => (0, 1),
            Facing::SouthWest => (-1, 1),
            Facing::West => (-1, 0),
            Facing::NorthWest => (-1, -1),
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Facing> {
        match (dx, dy) {
            (0, -1) => Some(Facing::North),
            (1, -1) => Some(Facing::NorthEast),
            (1, 0) => Some(Facing::East),
            (1, 1) => Some(Facing::SouthEast),
            (0, 1) => Some(Facing::South),
            (-1, 1) => Some(Facing::SouthWest),
            (-1, 0) => Some(Facing::West),
            (-1, -1) => Some(Facing::NorthWest),
            _ => None,
        }
    }

    /// Screen-space angle (y grows downward): East is 0, South is 90
    pub fn degrees(self) -> f64 {
        let (dx, dy) = self.delta();
        (dy as f64).atan2(dx as f64).to_degrees()
    }
}

impl From<Direction> for Facing {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::North => Facing::North,
            Direction::East => Facing::East,
            Direction::South => Facing::South,
            Direction::West => Facing::West,
        }
    }
}

/// A generated room; `facing` points from the room toward its hallway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub rect: Rect,
    pub number: u32,
    pub facing: Direction,
}

impl Room {
    pub fn display_number(level: usize, index: usize) -> u32 {
        (100 * (level + 1) + index) as u32
    }

    /// Row or column of the wall shared with the hallway
    pub fn hallway_wall(&self) -> i32 {
        match self.facing {
            Direction::North => self.rect.y - 1,
            Direction::South => self.rect.bottom(),
            Direction::West => self.rect.x - 1,
            Direction::East => self.rect.right(),
        }
    }
}
