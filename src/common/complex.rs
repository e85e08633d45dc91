use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::ComplexConfig;
use super::constants::GameConstants;
use super::entity::FloorId;
pub use super::floor::Floor;
use super::grid::{Cell, Direction};

/// The whole world: a 5x3 grid of floor stacks, ground floor first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complex {
    width: usize,
    height: usize,
    stacks: Vec<Vec<Floor>>,
}

impl Complex {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, bx: usize, by: usize) -> Option<usize> {
        if bx < self.width && by < self.height {
            Some(by * self.width + bx)
        } else {
            None
        }
    }

    pub fn stack(&self, bx: usize, by: usize) -> &[Floor] {
        self.index(bx, by).map(|i| self.stacks[i].as_slice()).unwrap_or(&[])
    }

    pub fn floor_at(&self, bx: usize, by: usize, level: usize) -> Option<&Floor> {
        self.stack(bx, by).get(level)
    }

    pub fn floor(&self, id: FloorId) -> Option<&Floor> {
        self.floor_at(id.bx, id.by, id.level)
    }

    pub fn floor_mut(&mut self, id: FloorId) -> Option<&mut Floor> {
        let index = self.index(id.bx, id.by)?;
        self.stacks[index].get_mut(id.level)
    }

    pub fn floors(&self) -> impl Iterator<Item = &Floor> {
        self.stacks.iter().flatten()
    }

    /// Ground floors of built (non-outdoor) blocks, row-major
    pub fn built_blocks(&self) -> impl Iterator<Item = &Floor> {
        self.stacks.iter().filter_map(|s| s.first()).filter(|f| !f.outdoor)
    }

    pub fn block(&self, label: char) -> Option<&Floor> {
        self.built_blocks().find(|f| f.block_label == Some(label))
    }
}

/// Builds a fully linked complex from a random source
#[derive(Debug, Clone, Default)]
pub struct ComplexBuilder {
    config: ComplexConfig,
}

impl ComplexBuilder {
    pub fn new(config: ComplexConfig) -> Self {
        ComplexBuilder { config }
    }

    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Complex {
        let (width, height) = (GameConstants::COMPLEX_WIDTH, GameConstants::COMPLEX_HEIGHT);
        let built = self.place_blocks(rng);

        let mut next_label = b'A';
        let mut stacks = Vec::with_capacity(width * height);
        for (index, is_built) in built.iter().copied().enumerate() {
            let (bx, by) = (index % width, index / width);
            let mut ground = Floor::generate(rng, FloorId::new(bx, by, 0), !is_built, &self.config);
            if !is_built {
                stacks.push(vec![ground]);
                continue;
            }

            ground.block_label = Some(next_label as char);
            next_label += 1;

            let levels = self.roll_levels(rng);
            if levels > 1 {
                for (site, flank) in stair_sites(rng, &ground) {
                    ground.stamp_stairs(site, flank);
                }
            }

            let mut stack = Vec::with_capacity(levels);
            for level in 1..levels {
                stack.push(ground.clone_to_level(level));
            }
            stack.insert(0, ground);
            stacks.push(stack);
        }

        let mut complex = Complex { width, height, stacks };
        link_floors(&mut complex);

        info!(
            "complex generated: {} built blocks, {} floors",
            complex.built_blocks().count(),
            complex.floors().count()
        );
        complex
    }

    /// Pick which of the 15 positions get a building. Retries up to
    /// `max_attempts` times and keeps the last attempt if none satisfies the
    /// density and outdoor-edge constraints.
    pub fn place_blocks<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<bool> {
        let total = GameConstants::COMPLEX_WIDTH * GameConstants::COMPLEX_HEIGHT;
        let mut last = vec![false; total];

        for attempt in 1..=self.config.max_attempts {
            let mut order: Vec<usize> = (0..total).collect();
            order.shuffle(rng);

            let mut built = vec![false; total];
            let mut placed = 0;
            for index in order {
                let (bx, by) = (index % GameConstants::COMPLEX_WIDTH, index / GameConstants::COMPLEX_WIDTH);
                let p = self.config.placement_probability(is_interior(bx, by), placed);
                if rng.gen_bool(p) {
                    built[index] = true;
                    placed += 1;
                }
            }

            if self.placement_ok(&built) {
                debug!("block placement accepted on attempt {} with {} blocks", attempt, placed);
                return built;
            }
            debug!("block placement attempt {} rejected ({} blocks)", attempt, placed);
            last = built;
        }

        warn!(
            "block placement constraints not met after {} attempts, keeping last layout",
            self.config.max_attempts
        );
        last
    }

    pub fn placement_ok(&self, built: &[bool]) -> bool {
        let count = built.iter().filter(|b| **b).count();
        let outdoor_edge = built
            .iter()
            .enumerate()
            .filter(|(index, b)| {
                let (bx, by) = (index % GameConstants::COMPLEX_WIDTH, index / GameConstants::COMPLEX_WIDTH);
                !**b && !is_interior(bx, by)
            })
            .count();
        (self.config.min_blocks..=self.config.max_blocks).contains(&count)
            && outdoor_edge >= self.config.min_outdoor_edge
    }

    /// Number of floors for a built block, declining odds for each extra one
    fn roll_levels<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let mut levels = 1;
        while levels < GameConstants::MAX_FLOORS {
            let p = self.config.extra_floor_probability[levels - 1].clamp(0.0, 1.0);
            if !rng.gen_bool(p) {
                break;
            }
            levels += 1;
        }
        levels
    }
}

/// World construction entry point with default tunables
pub fn generate_complex<R: Rng + ?Sized>(rng: &mut R) -> Complex {
    ComplexBuilder::default().build(rng)
}

/// The central 3x1 band of the block grid
pub fn is_interior(bx: usize, by: usize) -> bool {
    by == GameConstants::COMPLEX_HEIGHT / 2 && bx >= 1 && bx + 1 < GameConstants::COMPLEX_WIDTH
}

/// Stair niches at both ends of the vertical hallway. A site is cut into
/// the hallway's side wall (two cells off the center column) on a side
/// where nothing was built beyond it, and backed by a flanking wall so it
/// can't be walked around.
pub fn stair_sites<R: Rng + ?Sized>(rng: &mut R, floor: &Floor) -> Vec<((i32, i32), (i32, i32))> {
    let (cx, cy) = floor.center;
    let mut sites = Vec::new();
    for step in [-1, 1] {
        let mut y = cy;
        while floor.cell(cx, y + step) == Cell::Tile {
            y += step;
        }
        let mut sides = [1, -1];
        sides.shuffle(rng);
        let site = sides
            .into_iter()
            .find(|side| floor.cell(cx + 3 * side, y) == Cell::Null)
            .map(|side| ((cx + 2 * side, y), (cx + 3 * side, y)))
            // Rooms on both sides: cut into the hallway's end wall instead
            .unwrap_or(((cx, y + step), (cx, y + 2 * step)));
        sites.push(site);
    }
    sites
}

/// Set every horizontal and vertical link and open the linked edges
fn link_floors(complex: &mut Complex) {
    let (width, height) = (complex.width, complex.height);
    let heights: Vec<usize> = complex.stacks.iter().map(|s| s.len()).collect();

    for by in 0..height {
        for bx in 0..width {
            let index = by * width + bx;
            for level in 0..heights[index] {
                let mut links = [None; 4];
                for direction in Direction::ALL {
                    let (dx, dy) = direction.delta();
                    let (nx, ny) = (bx as i32 + dx, by as i32 + dy);
                    if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                        continue;
                    }
                    let (nx, ny) = (nx as usize, ny as usize);
                    if heights[ny * width + nx] > level {
                        links[direction.index()] = Some(FloorId::new(nx, ny, level));
                    }
                }

                let floor = &mut complex.stacks[index][level];
                floor.links = links;
                floor.link_above = (level + 1 < heights[index]).then(|| FloorId::new(bx, by, level + 1));
                floor.link_below = (level > 0).then(|| FloorId::new(bx, by, level - 1));
                for direction in Direction::ALL {
                    if floor.link(direction).is_some() {
                        floor.carve_link_opening(direction);
                    }
                }
            }
        }
    }
}
