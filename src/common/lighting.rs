use super::constants::GameConstants;
use super::entity::LightSource;
use super::grid::{Cell, Grid};

/// Raycasting light propagation with linear attenuation
pub struct LightEngine;

impl LightEngine {
    /// Recompute the whole light map from scratch.
    ///
    /// Every cell starts at the ambient level; each source then sweeps rays
    /// every 2 degrees (360 for point lights, a 90 degree cone for directional
    /// ones) and cells keep the brightest value any ray gives them. `blocked`
    /// marks cells that stop a ray after being lit, such as walls and closed
    /// doors.
    pub fn compute<F>(cells: &Grid<Cell>, sources: &[LightSource], blocked: F) -> Grid<u8>
    where
        F: Fn(i32, i32) -> bool,
    {
        let mut light = Grid::new(cells.width(), cells.height(), GameConstants::AMBIENT_LIGHT);
        for source in sources {
            for angle in Self::ray_angles(source) {
                Self::cast_ray(cells, &mut light, source, angle, &blocked);
            }
        }
        light
    }

    /// Intensity `z` unit steps away from a source: 255 - floor(255 * z * k), floored at 0
    pub fn intensity_at(step: i32) -> u8 {
        let falloff = (f64::from(GameConstants::MAX_LIGHT) * f64::from(step) * GameConstants::LIGHT_ATTENUATION).floor();
        (f64::from(GameConstants::MAX_LIGHT) - falloff).max(0.0) as u8
    }

    fn ray_angles(source: &LightSource) -> Vec<f64> {
        let step = GameConstants::RAY_STEP_DEGREES;
        match source.cone {
            None => {
                let count = (360.0 / step) as usize;
                (0..count).map(|i| i as f64 * step).collect()
            }
            Some(facing) => {
                let half = GameConstants::CONE_DEGREES / 2.0;
                let count = (GameConstants::CONE_DEGREES / step) as usize + 1;
                (0..count).map(|i| facing.degrees() - half + i as f64 * step).collect()
            }
        }
    }

    fn cast_ray<F>(cells: &Grid<Cell>, light: &mut Grid<u8>, source: &LightSource, angle: f64, blocked: &F)
    where
        F: Fn(i32, i32) -> bool,
    {
        let (dx, dy) = (angle.to_radians().cos(), angle.to_radians().sin());
        let (ox, oy) = (source.x as f64 + 0.5, source.y as f64 + 0.5);

        for z in 0..=source.radius.max(0) {
            let x = (ox + dx * z as f64).floor() as i32;
            let y = (oy + dy * z as f64).floor() as i32;
            if cells.cell(x, y) == Cell::Null {
                break;
            }

            let intensity = Self::intensity_at(z);
            if intensity == 0 {
                break;
            }
            if light.get(x, y).is_some_and(|current| intensity > current) {
                light.set(x, y, intensity);
            }

            if cells.cell(x, y) == Cell::Wall || blocked(x, y) {
                break;
            }
        }
    }
}
