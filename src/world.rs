use std::ops::RangeInclusive;

use crate::color::Color;
use crate::config::{COLS, ROWS};
use crate::error::{EngineError, EngineResult};

/// Raw cell identifier as authored in a level table. `0` is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellId(pub u8);

impl CellId {
    pub const EMPTY: CellId = CellId(0);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u8);

/// Flat wall colors, addressed by `CellId` 1..=PALETTE.len().
pub const PALETTE: [Color; 16] = [
    Color::RED,
    Color::YELLOW,
    Color::GREEN,
    Color::BLUE,
    Color::ORANGE,
    Color::PURPLE,
    Color::SKYBLUE,
    Color::LIGHTGRAY,
    Color::GOLD,
    Color::PINK,
    Color::MAROON,
    Color::LIME,
    Color::DARKBLUE,
    Color::VIOLET,
    Color::BEIGE,
    Color::BROWN,
];

pub const COLOR_BAND: RangeInclusive<u8> = 1..=PALETTE.len() as u8;
pub const TEXTURE_BAND: RangeInclusive<u8> = 128..=255;

/// What a cell looks like once its identifier has been resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Color(Color),
    Texture(TextureId),
    /// Identifier outside every band. Treated as a solid wall drawn in a
    /// placeholder color so authoring mistakes stay visible.
    Unassigned(CellId),
}

impl Cell {
    #[inline]
    pub fn is_solid(self) -> bool {
        !matches!(self, Cell::Empty)
    }
}

/// Total, side-effect free mapping from identifier to appearance.
pub fn resolve(id: CellId) -> Cell {
    match id.0 {
        0 => Cell::Empty,
        v if COLOR_BAND.contains(&v) => Cell::Color(PALETTE[(v - 1) as usize]),
        v if TEXTURE_BAND.contains(&v) => Cell::Texture(TextureId(v - TEXTURE_BAND.start())),
        _ => Cell::Unassigned(id),
    }
}

/// Placeholder texture lookup: vertical magenta/black stripes across the face.
/// `u` is the hit position along the wall face in `[0, 1)`.
pub fn sample_texture(_texture: TextureId, u: f32) -> Color {
    const STRIPES: f32 = 4.0;
    if ((u * STRIPES).floor() as i32) % 2 == 0 {
        Color::MAGENTA
    } else {
        Color::BLACK
    }
}

/// Fixed-size occupancy grid, row-major. One cell spans 1.0 world units.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    cols: usize,
    rows: usize,
    cells: Vec<CellId>,
}

impl Grid {
    pub fn new(cols: usize, rows: usize) -> EngineResult<Self> {
        if cols == 0 || rows == 0 {
            return Err(EngineError::InvalidLevel(format!(
                "grid must be non-empty, got {cols}x{rows}"
            )));
        }
        Ok(Self {
            cols,
            rows,
            cells: vec![CellId::EMPTY; cols * rows],
        })
    }

    /// Build a grid from a literal table, one slice per row.
    pub fn from_rows(table: &[&[u8]]) -> EngineResult<Self> {
        let cols = table.first().map_or(0, |r| r.len());
        let mut grid = Self::new(cols, table.len())?;
        for (row, cells) in table.iter().enumerate() {
            if cells.len() != cols {
                return Err(EngineError::InvalidLevel(format!(
                    "row {row} has {} cells, expected {cols}",
                    cells.len()
                )));
            }
            for (col, &id) in cells.iter().enumerate() {
                grid.cells[row * cols + col] = CellId(id);
            }
        }
        Ok(grid)
    }

    /// The starting level: a short colored wall run with a hook around (2, 5).
    pub fn demo() -> Self {
        const R: u8 = 1;
        const Y: u8 = 2;
        const G: u8 = 3;
        const LEVEL: [[u8; COLS]; ROWS] = [
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, R, Y, G, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, R, 0, 0, 0, 0],
            [0, 0, 0, 0, G, R, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ];
        let cells = LEVEL.iter().flatten().map(|&v| CellId(v)).collect();
        Self {
            cols: COLS,
            rows: ROWS,
            cells,
        }
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Unchecked lookup. Callers must stay inside `[0, cols) x [0, rows)`.
    #[inline]
    pub fn cell_at(&self, col: usize, row: usize) -> CellId {
        debug_assert!(col < self.cols && row < self.rows);
        self.cells[row * self.cols + col]
    }

    pub fn get(&self, col: usize, row: usize) -> Option<CellId> {
        (col < self.cols && row < self.rows).then(|| self.cells[row * self.cols + col])
    }

    /// Geometric containment test for a continuous point; returns the cell it
    /// falls in when it lies inside the grid.
    #[inline]
    pub fn contains(&self, p: [f32; 2]) -> Option<(usize, usize)> {
        if p[0] >= 0.0 && p[1] >= 0.0 && p[0] < self.cols as f32 && p[1] < self.rows as f32 {
            let (col, row) = (p[0] as usize, p[1] as usize);
            // guard against rounding right at the far edge
            (col < self.cols && row < self.rows).then_some((col, row))
        } else {
            None
        }
    }

    pub fn set(&mut self, col: usize, row: usize, id: CellId) -> EngineResult<()> {
        if col >= self.cols || row >= self.rows {
            return Err(EngineError::InvalidLevel(format!(
                "cell ({col}, {row}) is outside a {}x{} grid",
                self.cols, self.rows
            )));
        }
        self.cells[row * self.cols + col] = id;
        Ok(())
    }

    /// Every non-empty cell as `(col, row, id)`, row by row.
    pub fn solid_cells(&self) -> impl Iterator<Item = (usize, usize, CellId)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, id)| resolve(**id).is_solid())
            .map(|(i, &id)| (i % self.cols, i / self.cols, id))
    }
}
