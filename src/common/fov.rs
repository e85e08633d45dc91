use super::grid::Grid;

// Octant transforms: local (dx, dy) -> grid offset via (xx, xy, yx, yy)
const MULTIPLIERS: [[i32; 8]; 4] = [
    [1, 0, 0, -1, -1, 0, 0, 1],
    [0, 1, -1, 0, 0, -1, 1, 0],
    [0, 1, 1, 0, 0, -1, -1, 0],
    [1, 0, 0, 1, -1, 0, 0, -1],
];

#[derive(Debug, Clone, Copy)]
struct Octant {
    xx: i32,
    xy: i32,
    yx: i32,
    yy: i32,
}

impl Octant {
    fn all() -> impl Iterator<Item = Octant> {
        (0..8).map(|i| Octant {
            xx: MULTIPLIERS[0][i],
            xy: MULTIPLIERS[1][i],
            yx: MULTIPLIERS[2][i],
            yy: MULTIPLIERS[3][i],
        })
    }

    fn transform(&self, origin: (i32, i32), dx: i32, dy: i32) -> (i32, i32) {
        (origin.0 + dx * self.xx + dy * self.xy, origin.1 + dx * self.yx + dy * self.yy)
    }
}

/// Recursive shadowcasting field of view
pub struct FieldOfView;

impl FieldOfView {
    /// Fresh visibility mask for a viewer at `origin`. Cells outside the grid
    /// count as opaque; the origin itself is always visible.
    pub fn compute<F>(width: i32, height: i32, origin: (i32, i32), radius: i32, blocked: F) -> Grid<bool>
    where
        F: Fn(i32, i32) -> bool,
    {
        let mut visible = Grid::new(width, height, false);
        visible.set(origin.0, origin.1, true);

        let opaque = |x: i32, y: i32| !visible_bounds(width, height, x, y) || blocked(x, y);
        for octant in Octant::all() {
            Self::cast(&mut visible, origin, 1, 1.0, 0.0, radius, octant, &opaque);
        }
        visible
    }

    /// Scan rows `row..=radius` of one octant between the `start` and `end`
    /// slopes. An opaque cell splits the interval: the clear part before it is
    /// handed to the next row recursively, and scanning resumes past the
    /// opaque run with a narrowed start slope.
    #[allow(clippy::too_many_arguments)]
    fn cast<F>(
        visible: &mut Grid<bool>,
        origin: (i32, i32),
        row: i32,
        start: f64,
        end: f64,
        radius: i32,
        octant: Octant,
        opaque: &F,
    ) where
        F: Fn(i32, i32) -> bool,
    {
        if start < end {
            return;
        }
        let radius_squared = radius * radius;
        let mut start = start;
        let mut next_start = start;

        for j in row..=radius {
            let dy = -j;
            let mut blocked = false;

            for dx in -j..=0 {
                let (x, y) = octant.transform(origin, dx, dy);
                let left_slope = (dx as f64 - 0.5) / (dy as f64 + 0.5);
                let right_slope = (dx as f64 + 0.5) / (dy as f64 - 0.5);

                if start < right_slope {
                    continue;
                } else if end > left_slope {
                    break;
                }

                if dx * dx + dy * dy <= radius_squared {
                    visible.set(x, y, true);
                }

                let cell_opaque = opaque(x, y);
                if blocked {
                    if cell_opaque {
                        next_start = right_slope;
                        continue;
                    }
                    blocked = false;
                    start = next_start;
                } else if cell_opaque && j < radius {
                    blocked = true;
                    Self::cast(visible, origin, j + 1, start, left_slope, radius, octant, opaque);
                    next_start = right_slope;
                }
            }

            if blocked {
                break;
            }
        }
    }
}

fn visible_bounds(width: i32, height: i32, x: i32, y: i32) -> bool {
    x >= 0 && y >= 0 && x < width && y < height
}
