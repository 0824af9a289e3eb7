//! Debug overhead map, drawn in the top-left corner with plain rectangle fills.

use crate::color::Color;
use crate::framebuffer::Framebuffer;
use crate::player::Player;
use crate::world::{Cell, Grid, resolve};

const LINE: Color = Color::RAYWHITE;
const PLAYER: Color = Color::GREEN;
const PLAYER_PX: i32 = 10;
const RAY: Color = Color::BLUE;
const RAY_PX: i32 = 3;

/// Draw the level, a marker where each ray in `hits` struck, and the player.
pub fn draw_minimap(
    fb: &mut Framebuffer,
    grid: &Grid,
    player: &Player,
    cell_px: usize,
    hits: impl IntoIterator<Item = [f32; 2]>,
) {
    let cell = cell_px as i32;
    let (cols, rows) = (grid.cols() as i32, grid.rows() as i32);
    let (w, h) = (cols * cell, rows * cell);

    for (col, row, id) in grid.solid_cells() {
        let color = match resolve(id) {
            Cell::Color(c) => c,
            _ => Color::MAGENTA,
        };
        fb.fill_rect(col as i32 * cell, row as i32 * cell, cell, cell, color);
    }

    // grid lines, outline included
    for i in 0..=cols {
        fb.fill_rect((i * cell).min(w - 1), 0, 1, h, LINE);
    }
    for i in 0..=rows {
        fb.fill_rect(0, (i * cell).min(h - 1), w, 1, LINE);
    }

    for hit in hits {
        let hx = (hit[0] * cell as f32) as i32 - RAY_PX / 2;
        let hy = (hit[1] * cell as f32) as i32 - RAY_PX / 2;
        fb.fill_rect(hx, hy, RAY_PX, RAY_PX, RAY);
    }

    let px = (player.pos[0] * cell as f32) as i32 - PLAYER_PX / 2;
    let py = (player.pos[1] * cell as f32) as i32 - PLAYER_PX / 2;
    fb.fill_rect(px, py, PLAYER_PX, PLAYER_PX, PLAYER);
}
