//! Grid-DDA ray marcher.
//!
//! The ray is walked cell by cell on integer indices. For each axis the march
//! keeps the ray parameter at which the next grid line of that family is
//! crossed, and steps into the neighbouring cell across whichever line comes
//! first. Cell indices advance by exactly one per step, so the walk never
//! depends on how finely f32 can resolve the sample position, and a march over
//! `max_dist` units takes at most `ceil(max_dist * |dx|) + ceil(max_dist * |dy|) + 2`
//! steps.

use crate::config::{DIRECTION_EPSILON, GameConfig, MAX_RENDER_DIST, RAY_START_OFFSET};
use crate::math::{add, dot, length, scale};
use crate::world::{CellId, Grid, resolve};

/// Numerical knobs of the march.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayParams {
    pub max_dist: f32,
    /// Replaces a direction component that is exactly zero, keeping the
    /// per-axis divisions finite.
    pub direction_epsilon: f32,
    /// Distance of the first sample from the origin.
    pub start_offset: f32,
}

impl Default for RayParams {
    fn default() -> Self {
        Self {
            max_dist: MAX_RENDER_DIST,
            direction_epsilon: DIRECTION_EPSILON,
            start_offset: RAY_START_OFFSET,
        }
    }
}

impl From<&GameConfig> for RayParams {
    fn from(cfg: &GameConfig) -> Self {
        Self {
            max_dist: cfg.max_render_dist,
            direction_epsilon: cfg.direction_epsilon,
            start_offset: cfg.ray_start_offset,
        }
    }
}

/// Which family of grid lines the ray crossed to enter the struck cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// A line of constant x (east/west face).
    Vertical,
    /// A line of constant y (north/south face).
    Horizontal,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub cell: CellId,
    pub col: usize,
    pub row: usize,
    /// World position where the ray entered the struck cell.
    pub point: [f32; 2],
    /// Distance along the viewer's forward axis; what the projector uses.
    pub perp_dist: f32,
    /// Straight-line distance from the origin to the hit sample.
    pub euclid_dist: f32,
    pub side: Side,
    /// Hit position along the struck face, in `[0, 1)`.
    pub wall_u: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct March {
    pub hit: Option<RayHit>,
    pub steps: u32,
}

/// Upper bound on DDA steps for a unit direction and the given distance cap.
pub fn max_steps(max_dist: f32) -> u32 {
    2 * (max_dist * std::f32::consts::SQRT_2).ceil() as u32 + 2
}

/// Ray parameter at which a ray starting at `o` and moving by `d` per unit
/// leaves cell `cell` along this axis.
#[inline]
fn next_crossing(o: f32, d: f32, cell: i64) -> f32 {
    let line = if d >= 0.0 { cell + 1 } else { cell };
    (line as f32 - o) / d
}

fn solid_at(grid: &Grid, cell: [i64; 2]) -> Option<(usize, usize, CellId)> {
    let col = usize::try_from(cell[0]).ok()?;
    let row = usize::try_from(cell[1]).ok()?;
    let id = grid.get(col, row)?;
    resolve(id).is_solid().then_some((col, row, id))
}

/// March from `origin` along `dir` until a solid cell or `params.max_dist`.
///
/// `forward` is the viewer's facing direction; the reported `perp_dist` is the
/// hit offset projected onto it, not onto `dir`.
pub fn march(grid: &Grid, origin: [f32; 2], dir: [f32; 2], forward: [f32; 2], params: &RayParams) -> March {
    let mut dir = dir;
    if dir[0] == 0.0 {
        dir[0] = params.direction_epsilon;
    }
    if dir[1] == 0.0 {
        dir[1] = params.direction_epsilon;
    }
    if !(origin.iter().chain(&dir).all(|v| v.is_finite())) {
        return March { hit: None, steps: 0 };
    }

    let speed = length(dir);
    let start = add(origin, scale(dir, params.start_offset));
    let mut cell = [start[0].floor() as i64, start[1].floor() as i64];
    let step = [if dir[0] >= 0.0 { 1 } else { -1 }, if dir[1] >= 0.0 { 1 } else { -1 }];
    let delta = [(1.0 / dir[0]).abs(), (1.0 / dir[1]).abs()];
    let mut crossing = [
        next_crossing(origin[0], dir[0], cell[0]),
        next_crossing(origin[1], dir[1], cell[1]),
    ];

    let limit = max_steps(params.max_dist);
    let mut t = params.start_offset;
    let mut side = Side::Vertical;
    let mut steps = 0;

    while t * speed <= params.max_dist && steps < limit {
        if let Some((col, row, id)) = solid_at(grid, cell) {
            let offset = scale(dir, t);
            let point = add(origin, offset);
            let along = match side {
                Side::Vertical => point[1],
                Side::Horizontal => point[0],
            };
            return March {
                hit: Some(RayHit {
                    cell: id,
                    col,
                    row,
                    point,
                    perp_dist: dot(offset, forward),
                    euclid_dist: t * speed,
                    side,
                    wall_u: along - along.floor(),
                }),
                steps,
            };
        }

        if crossing[0] < crossing[1] {
            t = crossing[0];
            crossing[0] += delta[0];
            cell[0] += step[0];
            side = Side::Vertical;
        } else {
            t = crossing[1];
            crossing[1] += delta[1];
            cell[1] += step[1];
            side = Side::Horizontal;
        }
        steps += 1;
    }

    March { hit: None, steps }
}

#[inline]
pub fn cast(grid: &Grid, origin: [f32; 2], dir: [f32; 2], forward: [f32; 2], params: &RayParams) -> Option<RayHit> {
    march(grid, origin, dir, forward, params).hit
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_wall(col: usize, row: usize) -> Grid {
        let mut g = Grid::new(10, 10).unwrap();
        g.set(col, row, CellId(1)).unwrap();
        g
    }

    #[test]
    fn east_ray_hits_left_face() {
        let g = single_wall(3, 1);
        let hit = cast(&g, [2.5, 1.3], [1.0, 0.0], [1.0, 0.0], &RayParams::default()).unwrap();
        assert_eq!((hit.col, hit.row), (3, 1));
        assert_eq!(hit.side, Side::Vertical);
        assert!((hit.perp_dist - 0.5).abs() < 1e-4);
        assert!((hit.wall_u - 0.3).abs() < 1e-4);
    }

    #[test]
    fn west_ray_hits_right_face() {
        let g = single_wall(3, 1);
        let hit = cast(&g, [6.5, 1.5], [-1.0, 0.0], [-1.0, 0.0], &RayParams::default()).unwrap();
        assert_eq!((hit.col, hit.row), (3, 1));
        // right face sits at x = 4
        assert!((hit.perp_dist - 2.5).abs() < 1e-3);
    }

    #[test]
    fn vertical_rays_hit_horizontal_faces() {
        let g = single_wall(4, 6);
        let down = cast(&g, [4.5, 2.5], [0.0, 1.0], [0.0, 1.0], &RayParams::default()).unwrap();
        assert_eq!((down.col, down.row, down.side), (4, 6, Side::Horizontal));
        assert!((down.perp_dist - 3.5).abs() < 1e-4);

        let up = cast(&g, [4.5, 9.5], [0.0, -1.0], [0.0, -1.0], &RayParams::default()).unwrap();
        assert_eq!((up.col, up.row, up.side), (4, 6, Side::Horizontal));
        assert!((up.perp_dist - 2.5).abs() < 1e-3);
    }

    #[test]
    fn perp_distance_uses_forward_axis() {
        let g = single_wall(5, 4);
        let dir = crate::math::normalize([1.0, 1.0]);
        let hit = cast(&g, [4.5, 3.5], dir, [1.0, 0.0], &RayParams::default()).unwrap();
        assert_eq!((hit.col, hit.row), (5, 4));
        // diagonal ray through the corner: forward component is x - 4.5 = 0.5
        assert!((hit.perp_dist - 0.5).abs() < 1e-3);
        assert!(hit.euclid_dist > hit.perp_dist);
    }

    #[test]
    fn grid_aligned_origin_does_not_stall() {
        // origin exactly on a grid corner, ray along a grid line
        let g = single_wall(7, 2);
        let m = march(&g, [2.0, 2.0], [1.0, 0.0], [1.0, 0.0], &RayParams::default());
        let hit = m.hit.unwrap();
        assert_eq!((hit.col, hit.row), (7, 2));
        assert!((hit.perp_dist - 5.0).abs() < 1e-3);
        assert!(m.steps <= 6);
    }

    #[test]
    fn empty_grid_exhausts_distance() {
        let g = Grid::new(10, 10).unwrap();
        let params = RayParams::default();
        let m = march(&g, [5.0, 5.0], [0.6, 0.8], [0.6, 0.8], &params);
        assert!(m.hit.is_none());
        assert!(m.steps <= max_steps(params.max_dist));
    }

    #[test]
    fn outside_samples_count_as_empty() {
        // start outside, walk back in
        let g = single_wall(0, 0);
        let hit = cast(&g, [-3.5, 0.5], [1.0, 0.0], [1.0, 0.0], &RayParams::default()).unwrap();
        assert_eq!((hit.col, hit.row), (0, 0));
        assert!((hit.perp_dist - 3.5).abs() < 1e-4);
    }

    #[test]
    fn distance_cap_hides_far_walls() {
        let g = single_wall(9, 1);
        let params = RayParams { max_dist: 3.0, ..RayParams::default() };
        assert!(cast(&g, [0.5, 1.5], [1.0, 0.0], [1.0, 0.0], &params).is_none());
    }

    #[test]
    fn far_origin_still_advances() {
        // f32 spacing here is 5e-4 and coarser
        let params = RayParams::default();
        for (origin, dir) in [
            ([5000.5, 0.5], [-1.0, 0.0]),
            ([-5000.5, 0.5], [1.0, 0.0]),
            ([3.5, 2.0e7], [0.0, -1.0]),
            ([1.0e5 + 0.25, -7.5e4], crate::math::normalize([-0.3, 0.7])),
        ] {
            let m = march(&Grid::demo(), origin, dir, dir, &params);
            assert!(m.hit.is_none(), "hit from {origin:?}");
            assert!(m.steps <= max_steps(params.max_dist), "{} steps from {origin:?}", m.steps);
            assert!(m.steps >= 19, "stalled after {} steps from {origin:?}", m.steps);
        }
    }

    #[test]
    fn far_wall_is_found_at_the_right_distance() {
        let mut g = Grid::new(4100, 2).unwrap();
        g.set(4090, 1, CellId(2)).unwrap();
        let hit = cast(&g, [4099.5, 1.5], [-1.0, 0.0], [-1.0, 0.0], &RayParams::default()).unwrap();
        assert_eq!((hit.col, hit.row), (4090, 1));
        assert!((hit.perp_dist - 8.5).abs() < 1e-2, "perp = {}", hit.perp_dist);
        assert!((hit.point[0] - 4091.0).abs() < 1e-2);
    }

    #[test]
    fn nan_direction_terminates() {
        let g = Grid::new(4, 4).unwrap();
        let m = march(&g, [1.0, 1.0], [f32::NAN, 0.5], [1.0, 0.0], &RayParams::default());
        assert!(m.hit.is_none());
    }
}
