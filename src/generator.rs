//! Tunnel/obstacle map generator.
//!
//! Walks the lattice along a caller-supplied direction sequence, laying a
//! corridor of variable-thickness walls with freeze buffers, growing obstacles
//! by constrained random walks from alternating corridor sides, and stamping
//! the spawn/start/finish markers. All writes stay inside the grid.

use log::debug;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::direction::{direction, DirectionSequence, Vec2};
use crate::error::{MapError, Result};
use crate::tilemap::{TileGrid, Tilemap, TILE_FINISH, TILE_SPAWN, TILE_START, TILE_UNHOOKABLE};

/// Decorative tile picked for unhookable walls in the `generic_unhookable`
/// layer.
const DECO_UNHOOKABLE: u8 = 8;
/// Decorative tiles picked uniformly at random for wall cells in the
/// `desert_main` layer.
const DECO_WALL_CHOICES: [u8; 4] = [7, 64, 65, 70];
const DECO_FREEZE: u8 = 126;
const DECO_LINE: u8 = 94;

/// Tunable generation parameters.
///
/// The `block_*` codes remap what the generator writes for walls, corners,
/// obstacles and freeze; the start/finish/spawn marker codes are fixed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Width and height of the (square) grid.
    pub basesize: usize,
    /// Segment size: the corridor advances one block length per direction.
    pub blocklen: i32,
    /// Lower clamp of the per-side wall thickness.
    pub min_wall_thickness: i32,
    /// Upper clamp of the per-side wall thickness.
    pub max_wall_thickness: i32,
    /// Probability that a side's thickness drifts by one on a given cell.
    pub wall_thickness_change_probability: f64,
    /// Maximum Euclidean distance an obstacle may grow from its origin.
    /// Must stay below `blocklen * sqrt(0.5) - 2` so obstacles cannot touch
    /// the opposite wall.
    pub obstacle_growlen: i32,
    /// Number of obstacle stubs grown per segment.
    pub obstacle_size: u32,
    /// Probability of flipping the side obstacles grow from after a segment.
    pub obstacle_side_switch_probability: f64,
    /// Probability that an obstacle walk turns on a given step.
    pub obstacle_direction_change_probability: f64,
    /// Probability that a segment's obstacles get freeze rings.
    pub obstacle_freeze_probability: f64,
    /// Tile code written for corridor walls.
    pub block_wall: u8,
    /// Tile code written for the corner fans on tight turns.
    pub block_corner: u8,
    /// Tile code written for obstacle cells.
    pub block_obstacle: u8,
    /// Tile code written for freeze buffers.
    pub block_freeze: u8,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            basesize: 300,
            blocklen: 20,
            min_wall_thickness: 1,
            max_wall_thickness: 5,
            wall_thickness_change_probability: 0.15,
            obstacle_growlen: 11,
            obstacle_size: 5,
            obstacle_side_switch_probability: 0.8,
            obstacle_direction_change_probability: 0.4,
            obstacle_freeze_probability: 0.8,
            block_wall: 1,
            block_corner: 1,
            block_obstacle: 1,
            block_freeze: 9,
        }
    }
}

impl GenerationParams {
    /// Validate geometric consistency. Thickness clamping during generation
    /// is designed saturation and not covered here.
    pub fn validate(&self) -> Result<()> {
        if self.blocklen < 1 {
            return Err(MapError::InvalidParameter(format!(
                "block length must be positive, got {}",
                self.blocklen
            )));
        }
        if (self.basesize as i32) < 2 * self.blocklen {
            return Err(MapError::InvalidParameter(format!(
                "base size {} is smaller than twice the block length {}",
                self.basesize, self.blocklen
            )));
        }
        let growlen_limit = self.blocklen as f64 * 0.5f64.sqrt() - 2.0;
        if self.obstacle_growlen as f64 >= growlen_limit {
            return Err(MapError::InvalidParameter(format!(
                "obstacle grow length {} must be less than blocklen * sqrt(0.5) - 2 = {:.2}",
                self.obstacle_growlen, growlen_limit
            )));
        }
        if self.min_wall_thickness < 1 {
            return Err(MapError::InvalidParameter(format!(
                "minimum wall thickness must be at least 1, got {}",
                self.min_wall_thickness
            )));
        }
        if self.max_wall_thickness < self.min_wall_thickness {
            return Err(MapError::InvalidParameter(format!(
                "maximum wall thickness {} is below the minimum {}",
                self.max_wall_thickness, self.min_wall_thickness
            )));
        }
        for (name, p) in [
            (
                "wall_thickness_change_probability",
                self.wall_thickness_change_probability,
            ),
            (
                "obstacle_side_switch_probability",
                self.obstacle_side_switch_probability,
            ),
            (
                "obstacle_direction_change_probability",
                self.obstacle_direction_change_probability,
            ),
            (
                "obstacle_freeze_probability",
                self.obstacle_freeze_probability,
            ),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(MapError::InvalidParameter(format!(
                    "{} must lie in [0, 1], got {}",
                    name, p
                )));
            }
        }
        Ok(())
    }
}

/// Generate a tunnel map.
///
/// Returns the populated game grid plus the derived cosmetic tile layers.
/// Running out of grid space or exhausting the direction sequence terminates
/// the walk early; that yields a shorter map, not an error.
pub fn generate(
    directions: &DirectionSequence,
    params: &GenerationParams,
    rng: &mut ChaCha8Rng,
) -> Result<(TileGrid, Vec<(String, TileGrid)>)> {
    params.validate()?;

    let size = params.basesize as i32;
    let blocklen = params.blocklen;
    let mut grid: TileGrid = Tilemap::new_with(params.basesize, params.basesize, params.block_wall);

    // offset from the corner keeps the spawn chamber clear of the final
    // boundary clip lines
    let start_pos = Vec2::splat(2 * blocklen);
    let mut pos = start_pos;
    let mut step: i32 = 0;
    let mut newpos = pos + direction(directions.get(0)) * blocklen;
    let mut grow_from_right = false;
    let mut left_thickness = 1;
    let mut right_thickness = 1;

    // open the mouth of the first segment
    fill_doorway(&mut grid, pos, directions.get(0), blocklen, 0);

    while walk_in_bounds(newpos, size, blocklen) && step + 1 < directions.len() as i32 {
        let dir_index = directions.get(step);
        let forward = direction(dir_index);
        let left = direction(dir_index - 1);
        let right = direction(dir_index + 1);

        let last_dir = direction(directions.get(step - 1));
        let next_index = directions.get(step + 1);
        let next_dir = direction(next_index);
        let turns_from_left = last_dir == right;
        let turns_from_right = last_dir == left;
        let turns_to_left = next_dir == left;
        let turns_to_right = next_dir == right;

        // how far each side wall extends along the segment, in cells from
        // the segment start (which sits half a block before `pos`): turns
        // shorten the near wall and lengthen the far wall so corners mitre
        let left_start = wall_start(turns_from_right, turns_from_left, blocklen);
        let right_start = wall_start(turns_from_left, turns_from_right, blocklen);
        let left_end = wall_end(turns_to_left, turns_to_right, blocklen);
        let right_end = wall_end(turns_to_right, turns_to_left, blocklen);

        // clear the doorway of the upcoming segment before walling this one
        fill_doorway(&mut grid, newpos, next_index, blocklen, 0);

        let seg_start = pos - forward * (blocklen / 2);
        for i in 0..=2 * blocklen {
            let cell = seg_start + forward * i;
            if i >= left_start && i <= left_end {
                lay_side_slab(&mut grid, cell, left, left_thickness, blocklen, params);
                left_thickness = drift_thickness(left_thickness, params, rng);
            }
            if i >= right_start && i <= right_end {
                lay_side_slab(&mut grid, cell, right, right_thickness, blocklen, params);
                right_thickness = drift_thickness(right_thickness, params, rng);
            }
        }

        if turns_to_left {
            lay_corner_fan(
                &mut grid,
                pos,
                forward,
                left,
                left_end,
                left_thickness,
                blocklen,
                params,
            );
        }
        if turns_to_right {
            lay_corner_fan(
                &mut grid,
                pos,
                forward,
                right,
                right_end,
                right_thickness,
                blocklen,
                params,
            );
        }

        let put_freeze = rng.gen::<f64>() < params.obstacle_freeze_probability;
        if !turns_from_left && !turns_from_right {
            // obstacles only on straight starts so they cannot collide with
            // the mitred corner walls
            for _ in 0..params.obstacle_size {
                let (grow_dir, origin) = if grow_from_right {
                    (dir_index + 1, pos - right * (blocklen / 2))
                } else {
                    (dir_index + 3, pos - left * (blocklen / 2))
                };
                grow_obstacle(&mut grid, origin, grow_dir, put_freeze, params, rng);
            }
            if rng.gen::<f64>() < params.obstacle_side_switch_probability {
                grow_from_right = !grow_from_right;
            }
        }

        step += 1;
        pos = newpos;
        newpos = pos + direction(directions.get(step)) * blocklen;
    }

    debug!("tunnel walk ended after {} segments at {:?}", step, pos);

    // closing pass: wall off the doorway that was cleared for the segment
    // that never got built
    fill_doorway(&mut grid, pos, directions.get(step), blocklen, params.block_wall);

    // the direction the corridor arrived from
    let arrive_index = directions.get(step - 1);
    let forward = direction(arrive_index);
    let left = direction(arrive_index - 1);
    let right = direction(arrive_index + 1);

    // finish first: if a degenerate walk ends where it started, the spawn
    // chamber takes precedence and the spawn marker survives
    place_finish_area(&mut grid, pos, forward, left, right, blocklen, params);
    place_spawn_area(&mut grid, start_pos, directions.get(0), blocklen, params);

    // clip the interior one block length inside each edge
    let inner = blocklen as usize;
    let outer = params.basesize - inner - 1;
    for x in 0..grid.width {
        grid.set(x, inner, 0);
        grid.set(x, outer, 0);
    }
    for y in 0..grid.height {
        grid.set(inner, y, 0);
        grid.set(outer, y, 0);
    }

    let layers = derive_layers(&grid, params, rng);
    Ok((grid, layers))
}

/// Derive the cosmetic tile layers from the finished game grid.
fn derive_layers(
    grid: &TileGrid,
    params: &GenerationParams,
    rng: &mut ChaCha8Rng,
) -> Vec<(String, TileGrid)> {
    let mut unhookable: TileGrid = Tilemap::new(grid.width, grid.height);
    let mut desert: TileGrid = Tilemap::new(grid.width, grid.height);
    for y in 0..grid.height {
        for x in 0..grid.width {
            let code = *grid.get(x, y);
            if code == TILE_UNHOOKABLE {
                unhookable.set(x, y, DECO_UNHOOKABLE);
            }
            let deco = if code == params.block_wall
                || code == params.block_corner
                || code == params.block_obstacle
            {
                DECO_WALL_CHOICES[rng.gen_range(0..DECO_WALL_CHOICES.len())]
            } else if code == params.block_freeze {
                DECO_FREEZE
            } else if code == TILE_START || code == TILE_FINISH {
                DECO_LINE
            } else {
                0
            };
            desert.set(x, y, deco);
        }
    }
    vec![
        ("generic_unhookable".to_string(), unhookable),
        ("desert_main".to_string(), desert),
    ]
}

/// Weighted choice over {-1, 0, +1} with explicit probabilities.
fn weighted_step(rng: &mut ChaCha8Rng, p_minus: f64, p_zero: f64, p_plus: f64) -> i32 {
    debug_assert!((p_minus + p_zero + p_plus - 1.0).abs() < 1e-9);
    let r = rng.gen::<f64>();
    if r < p_minus {
        -1
    } else if r < p_minus + p_zero {
        0
    } else {
        1
    }
}

/// Apply one thickness drift step, saturating at the configured bounds.
fn drift_thickness(thickness: i32, params: &GenerationParams, rng: &mut ChaCha8Rng) -> i32 {
    let p = params.wall_thickness_change_probability;
    (thickness + weighted_step(rng, p / 2.0, 1.0 - p, p / 2.0))
        .clamp(params.min_wall_thickness, params.max_wall_thickness)
}

fn walk_in_bounds(pos: Vec2, size: i32, blocklen: i32) -> bool {
    pos.x + blocklen >= 0
        && pos.x + blocklen <= size
        && pos.y + blocklen >= 0
        && pos.y + blocklen <= size
}

/// Wall slab on one side of a corridor cell: from the corridor boundary half
/// a block out, `thickness` cells back toward the center, with a freeze ring
/// around the innermost cell.
fn lay_side_slab(
    grid: &mut TileGrid,
    cell: Vec2,
    side: Vec2,
    thickness: i32,
    blocklen: i32,
    params: &GenerationParams,
) {
    let edge = cell + side * (blocklen / 2);
    let inner = edge - side * thickness;
    fill_span(grid, edge, inner, params.block_wall);
    freeze_ring(grid, inner, params.block_freeze);
}

/// Triangular fan of wall cells backfilling the inside of a tight turn.
#[allow(clippy::too_many_arguments)]
fn lay_corner_fan(
    grid: &mut TileGrid,
    pos: Vec2,
    forward: Vec2,
    side: Vec2,
    wall_end: i32,
    thickness: i32,
    blocklen: i32,
    params: &GenerationParams,
) {
    let base = pos + forward * (wall_end - blocklen / 2) + side * (blocklen / 2);
    for i in 1..=thickness {
        let start = base - side * i;
        let end = start + forward * (thickness - i);
        fill_span(grid, start, end, params.block_corner);
        freeze_ring(grid, end, params.block_freeze);
    }
}

/// Grow one obstacle stub by a constrained random walk.
///
/// The walk stops once the cell would exceed `obstacle_growlen` Euclidean
/// distance from the origin or the next step would take a negative projection
/// onto the initial growth direction (which would walk back into the wall the
/// stub grew from).
fn grow_obstacle(
    grid: &mut TileGrid,
    origin: Vec2,
    mut grow_dir: i32,
    put_freeze: bool,
    params: &GenerationParams,
    rng: &mut ChaCha8Rng,
) {
    let initial = direction(grow_dir);
    let growlen_sq = (params.obstacle_growlen as i64) * (params.obstacle_growlen as i64);
    let q = params.obstacle_direction_change_probability;
    let mut pos = origin + initial;
    loop {
        let offset = pos - origin;
        if offset.length_squared() >= growlen_sq {
            break;
        }
        let ahead = offset + direction(grow_dir);
        if ahead.x * initial.x < 0 || ahead.y * initial.y < 0 {
            break;
        }
        set_cell(grid, pos, params.block_obstacle);
        if put_freeze {
            freeze_ring(grid, pos, params.block_freeze);
        }
        grow_dir += weighted_step(rng, q / 2.0, 1.0 - q, q / 2.0);
        pos += direction(grow_dir);
    }
}

/// Carve the spawn chamber, place the spawn marker and stamp the start line
/// across the mouth of the first segment.
fn place_spawn_area(
    grid: &mut TileGrid,
    start_pos: Vec2,
    first_dir: i32,
    blocklen: i32,
    params: &GenerationParams,
) {
    let a = start_pos - Vec2::splat(blocklen / 2 - 1);
    let b = start_pos + Vec2::splat(blocklen / 2);
    fill_rect(grid, a - Vec2::splat(1), b + Vec2::splat(1), params.block_wall);
    fill_rect(grid, a + Vec2::splat(1), b - Vec2::splat(1), 0);
    // open the chamber toward the first segment
    let shift = direction(first_dir);
    fill_rect(grid, a + shift + Vec2::splat(1), b + shift - Vec2::splat(1), 0);
    set_cell(grid, start_pos, TILE_SPAWN);

    let lateral = direction(first_dir + 1);
    let line_start =
        start_pos + direction(first_dir) * (blocklen / 2) - lateral * (blocklen / 2 - 2);
    let line_end = line_start + lateral * (blocklen - 4);
    fill_span(grid, line_start, line_end, TILE_START);
}

/// Carve the finish chamber at the final cursor position and stamp the finish
/// line across its mouth.
fn place_finish_area(
    grid: &mut TileGrid,
    pos: Vec2,
    forward: Vec2,
    left: Vec2,
    right: Vec2,
    blocklen: i32,
    params: &GenerationParams,
) {
    let a = pos - Vec2::splat(blocklen / 2 - 1);
    let b = pos + Vec2::splat(blocklen / 2);
    fill_rect(grid, a - Vec2::splat(1), b + Vec2::splat(1), params.block_wall);
    fill_rect(grid, a + Vec2::splat(1), b - Vec2::splat(1), 0);
    // open the chamber back toward the corridor
    fill_rect(grid, a - forward + Vec2::splat(1), b - forward - Vec2::splat(1), 0);

    let line_start = pos - forward * (blocklen / 2) + left * (blocklen / 2 - 2);
    let line_end = line_start + right * (blocklen - 4);
    fill_span(grid, line_start, line_end, TILE_FINISH);
}

/// The doorway rectangle of a segment mouth: half a block to each side of
/// `pos`, one and a half blocks deep along the direction. Used both to clear
/// upcoming mouths and to wall off the final one.
fn fill_doorway(grid: &mut TileGrid, pos: Vec2, dir_index: i32, blocklen: i32, code: u8) {
    let dir = direction(dir_index);
    let p1 = pos + direction(dir_index + 1) * (blocklen / 2);
    let p2 = pos + direction(dir_index - 1) * (blocklen / 2);
    let p3 = p1 + dir * (3 * blocklen / 2);
    let p4 = p2 + dir * (3 * blocklen / 2);
    let min = Vec2::new(
        p1.x.min(p2.x).min(p3.x).min(p4.x),
        p1.y.min(p2.y).min(p3.y).min(p4.y),
    );
    let max = Vec2::new(
        p1.x.max(p2.x).max(p3.x).max(p4.x),
        p1.y.max(p2.y).max(p3.y).max(p4.y),
    );
    fill_rect(grid, min, max, code);
}

/// Wall extent at the start of a segment, in cells from the segment start.
fn wall_start(turn_shrinks: bool, turn_extends: bool, blocklen: i32) -> i32 {
    if turn_shrinks {
        0
    } else if turn_extends {
        blocklen
    } else {
        blocklen / 2
    }
}

/// Wall extent at the end of a segment, in cells from the segment start.
fn wall_end(turn_shrinks: bool, turn_extends: bool, blocklen: i32) -> i32 {
    if turn_shrinks {
        blocklen
    } else if turn_extends {
        2 * blocklen
    } else {
        3 * blocklen / 2
    }
}

/// Half-open rectangle fill `[min, max)`, clipped to the grid.
fn fill_rect(grid: &mut TileGrid, min: Vec2, max: Vec2, code: u8) {
    let x0 = min.x.max(0);
    let y0 = min.y.max(0);
    let x1 = max.x.min(grid.width as i32);
    let y1 = max.y.min(grid.height as i32);
    for y in y0..y1 {
        for x in x0..x1 {
            grid.set(x as usize, y as usize, code);
        }
    }
}

/// Inclusive span fill between two corner cells in any order, clipped.
fn fill_span(grid: &mut TileGrid, a: Vec2, b: Vec2, code: u8) {
    let min = Vec2::new(a.x.min(b.x), a.y.min(b.y));
    let max = Vec2::new(a.x.max(b.x) + 1, a.y.max(b.y) + 1);
    fill_rect(grid, min, max, code);
}

/// 3x3 freeze ring that never overwrites a non-empty cell, clipped.
fn freeze_ring(grid: &mut TileGrid, center: Vec2, code: u8) {
    for dy in -1..=1 {
        for dx in -1..=1 {
            let x = center.x + dx;
            let y = center.y + dy;
            if x >= 0
                && y >= 0
                && (x as usize) < grid.width
                && (y as usize) < grid.height
                && *grid.get(x as usize, y as usize) == 0
            {
                grid.set(x as usize, y as usize, code);
            }
        }
    }
}

/// Single-cell write, ignored when out of bounds.
fn set_cell(grid: &mut TileGrid, pos: Vec2, code: u8) {
    if pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < grid.width && (pos.y as usize) < grid.height {
        grid.set(pos.x as usize, pos.y as usize, code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilemap::TILE_FREEZE;
    use rand::SeedableRng;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    fn scenario_directions() -> DirectionSequence {
        "2,2,2,3,3,3,2,1,1,1,2,2,3,3,3,2,1,1,1,2,2,2,2"
            .parse()
            .unwrap()
    }

    #[test]
    fn test_validation_rejects_bad_geometry() {
        let mut params = GenerationParams::default();
        params.blocklen = 0;
        assert!(matches!(
            params.validate(),
            Err(MapError::InvalidParameter(_))
        ));

        let mut params = GenerationParams::default();
        params.basesize = 30;
        assert!(params.validate().is_err());

        let mut params = GenerationParams::default();
        params.obstacle_growlen = 13; // limit for blocklen 20 is ~12.14
        assert!(params.validate().is_err());

        let mut params = GenerationParams::default();
        params.obstacle_freeze_probability = 1.5;
        assert!(params.validate().is_err());

        assert!(GenerationParams::default().validate().is_ok());
    }

    #[test]
    fn test_weighted_step_degenerate_probabilities() {
        let mut r = rng(1);
        for _ in 0..100 {
            assert_eq!(weighted_step(&mut r, 1.0, 0.0, 0.0), -1);
            assert_eq!(weighted_step(&mut r, 0.0, 1.0, 0.0), 0);
            assert_eq!(weighted_step(&mut r, 0.0, 0.0, 1.0), 1);
        }
    }

    #[test]
    fn test_thickness_stays_clamped() {
        let mut params = GenerationParams::default();
        params.min_wall_thickness = 2;
        params.max_wall_thickness = 4;
        params.wall_thickness_change_probability = 1.0; // drift every step
        let mut r = rng(7);
        let mut thickness = 2;
        for _ in 0..1000 {
            thickness = drift_thickness(thickness, &params, &mut r);
            assert!((2..=4).contains(&thickness));
        }
    }

    #[test]
    fn test_freeze_ring_never_overwrites() {
        let mut grid: TileGrid = Tilemap::new(10, 10);
        grid.set(4, 5, 1);
        grid.set(5, 4, 3);
        grid.set(6, 5, 34);
        freeze_ring(&mut grid, Vec2::new(5, 5), TILE_FREEZE);
        assert_eq!(*grid.get(4, 5), 1);
        assert_eq!(*grid.get(5, 4), 3);
        assert_eq!(*grid.get(6, 5), 34);
        assert_eq!(*grid.get(5, 5), TILE_FREEZE);
        assert_eq!(*grid.get(4, 4), TILE_FREEZE);
        // corner of the grid: clipped, no panic
        freeze_ring(&mut grid, Vec2::new(0, 0), TILE_FREEZE);
        assert_eq!(*grid.get(0, 0), TILE_FREEZE);
    }

    #[test]
    fn test_obstacle_containment() {
        let params = GenerationParams::default();
        for seed in 0..20 {
            let mut r = rng(seed);
            let mut grid: TileGrid = Tilemap::new(100, 100);
            let origin = Vec2::new(50, 50);
            let grow_dir = 2; // right
            grow_obstacle(&mut grid, origin, grow_dir, false, &params, &mut r);
            let initial = direction(grow_dir);
            for (x, y, &code) in grid.iter() {
                if code != params.block_obstacle {
                    continue;
                }
                let offset = Vec2::new(x as i32, y as i32) - origin;
                assert!(
                    offset.length_squared()
                        < (params.obstacle_growlen as i64) * (params.obstacle_growlen as i64),
                    "obstacle cell ({}, {}) beyond grow length",
                    x,
                    y
                );
                let projection = offset.x * initial.x + offset.y * initial.y;
                assert!(
                    projection >= 0,
                    "obstacle cell ({}, {}) behind its origin wall",
                    x,
                    y
                );
            }
        }
    }

    #[test]
    fn test_generate_scenario_markers() {
        let params = GenerationParams::default();
        let (grid, _layers) = generate(&scenario_directions(), &params, &mut rng(42)).unwrap();
        assert_eq!(grid.width, 300);
        assert_eq!(grid.height, 300);
        assert_eq!(grid.count(TILE_SPAWN), 1);

        // at least one contiguous run of start and finish line cells
        for code in [TILE_START, TILE_FINISH] {
            let mut found_run = false;
            for (x, y, &c) in grid.iter() {
                if c != code {
                    continue;
                }
                let right = x + 1 < grid.width && *grid.get(x + 1, y) == code;
                let down = y + 1 < grid.height && *grid.get(x, y + 1) == code;
                if right || down {
                    found_run = true;
                    break;
                }
            }
            assert!(found_run, "no contiguous run of tile {}", code);
        }
    }

    #[test]
    fn test_generate_deterministic_for_seed() {
        let params = GenerationParams::default();
        let (a, la) = generate(&scenario_directions(), &params, &mut rng(9)).unwrap();
        let (b, lb) = generate(&scenario_directions(), &params, &mut rng(9)).unwrap();
        assert_eq!(a, b);
        assert_eq!(la, lb);
    }

    #[test]
    fn test_generate_layers_follow_game_grid() {
        let params = GenerationParams::default();
        let (grid, layers) = generate(&scenario_directions(), &params, &mut rng(3)).unwrap();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].0, "generic_unhookable");
        assert_eq!(layers[1].0, "desert_main");
        let desert = &layers[1].1;
        for (x, y, &code) in grid.iter() {
            let deco = *desert.get(x, y);
            if code == params.block_freeze {
                assert_eq!(deco, DECO_FREEZE);
            } else if code == TILE_START || code == TILE_FINISH {
                assert_eq!(deco, DECO_LINE);
            } else if code == params.block_wall {
                assert!(DECO_WALL_CHOICES.contains(&deco));
            } else if code == 0 || code == TILE_SPAWN {
                assert_eq!(deco, 0);
            }
        }
    }

    #[test]
    fn test_generate_short_sequence_terminates() {
        // a sequence too short to build anything still terminates cleanly
        let params = GenerationParams::default();
        let directions = DirectionSequence::new(vec![2]).unwrap();
        let (grid, layers) = generate(&directions, &params, &mut rng(5)).unwrap();
        assert_eq!(grid.width, 300);
        assert_eq!(layers.len(), 2);
        assert_eq!(grid.count(TILE_SPAWN), 1);
    }

    #[test]
    fn test_generate_small_grid_in_bounds() {
        // bounds-clipped writes: nothing panics even when the walk hugs the
        // border of a minimal grid
        let mut params = GenerationParams::default();
        params.basesize = 48;
        params.blocklen = 12;
        params.obstacle_growlen = 6;
        let directions = DirectionSequence::new(vec![2, 3, 2, 3, 0, 1, 2, 3]).unwrap();
        for seed in 0..10 {
            let (grid, _) = generate(&directions, &params, &mut rng(seed)).unwrap();
            assert_eq!(grid.width, 48);
        }
    }
}
