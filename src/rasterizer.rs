//! Anti-aliased scanline rasterizer.
//!
//! Converts polygon edges in 24.8 fixed-point coordinates into pixel cells
//! holding cover and area, clips them to the image box, and sweeps the
//! sorted cells into per-scanline coverage spans under the non-zero or
//! even-odd fill rule.

use crate::basics::{
    iround, is_close, is_move_to, is_stop, is_vertex, FillRule, VertexSource, POLY_SUBPIXEL_MASK,
    POLY_SUBPIXEL_SCALE, POLY_SUBPIXEL_SHIFT,
};

const AA_SHIFT: u32 = 8;
const AA_SCALE: u32 = 1 << AA_SHIFT;
const AA_MASK: u32 = AA_SCALE - 1;
const AA_SCALE2: u32 = AA_SCALE * 2;
const AA_MASK2: u32 = AA_SCALE2 - 1;

/// Limit for dx magnitude before recursive subdivision in `line()`.
const DX_LIMIT: i64 = 16384 << POLY_SUBPIXEL_SHIFT;

/// Largest magnitude of a 24.8 fixed-point coordinate. Differences of two
/// coordinates still fit in `i32`.
pub const POLY_MAX_COORD: i32 = (1 << 30) - 1;

/// Convert a device coordinate to 24.8 fixed point, saturating at
/// [`POLY_MAX_COORD`].
#[inline]
pub fn poly_coord(v: f64) -> i32 {
    let max = POLY_MAX_COORD as f64;
    iround((v * POLY_SUBPIXEL_SCALE as f64).clamp(-max, max))
}

#[inline]
fn diff(a: i32, b: i32) -> i64 {
    a as i64 - b as i64
}

/// round(a * b / c)
#[inline]
fn mul_div(a: i64, b: i64, c: i64) -> i32 {
    iround(a as f64 * b as f64 / c as f64)
}

// ============================================================================
// Cell
// ============================================================================

/// A pixel cell accumulating the edges that cross it.
///
/// - `cover`: net winding contribution (sum of dy across this cell)
/// - `area`: twice the signed area of edge fragments within this cell
#[derive(Debug, Clone, Copy)]
struct Cell {
    x: i32,
    y: i32,
    cover: i32,
    area: i32,
}

impl Cell {
    #[inline]
    fn initial(&mut self) {
        self.x = i32::MAX;
        self.y = i32::MAX;
        self.cover = 0;
        self.area = 0;
    }

    #[inline]
    fn not_equal(&self, ex: i32, ey: i32) -> bool {
        (ex as u32).wrapping_sub(self.x as u32) | (ey as u32).wrapping_sub(self.y as u32) != 0
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            x: i32::MAX,
            y: i32::MAX,
            cover: 0,
            area: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct SortedY {
    start: u32,
    num: u32,
}

// ============================================================================
// Cells: edge-to-cell conversion
// ============================================================================

struct Cells {
    cells: Vec<Cell>,
    sorted_cells: Vec<u32>,
    sorted_y: Vec<SortedY>,
    curr_cell: Cell,
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
    sorted: bool,
}

impl Cells {
    fn new() -> Self {
        Self {
            cells: Vec::new(),
            sorted_cells: Vec::new(),
            sorted_y: Vec::new(),
            curr_cell: Cell::default(),
            min_x: i32::MAX,
            min_y: i32::MAX,
            max_x: i32::MIN,
            max_y: i32::MIN,
            sorted: false,
        }
    }

    fn reset(&mut self) {
        self.cells.clear();
        self.sorted_cells.clear();
        self.sorted_y.clear();
        self.curr_cell.initial();
        self.min_x = i32::MAX;
        self.min_y = i32::MAX;
        self.max_x = i32::MIN;
        self.max_y = i32::MIN;
        self.sorted = false;
    }

    #[inline]
    fn add_curr_cell(&mut self) {
        if self.curr_cell.area | self.curr_cell.cover != 0 {
            self.cells.push(self.curr_cell);
        }
    }

    #[inline]
    fn set_curr_cell(&mut self, x: i32, y: i32) {
        if self.curr_cell.not_equal(x, y) {
            self.add_curr_cell();
            self.curr_cell.x = x;
            self.curr_cell.y = y;
            self.curr_cell.cover = 0;
            self.curr_cell.area = 0;
        }
    }

    /// Render the part of an edge inside scanline row `ey`. `x1`, `x2` are
    /// 24.8 fixed point; `y1`, `y2` are the fractional y within the row.
    fn render_hline(&mut self, ey: i32, x1: i32, y1: i32, x2: i32, y2: i32) {
        let ex1 = x1 >> POLY_SUBPIXEL_SHIFT;
        let ex2 = x2 >> POLY_SUBPIXEL_SHIFT;
        let fx1 = x1 & POLY_SUBPIXEL_MASK as i32;
        let fx2 = x2 & POLY_SUBPIXEL_MASK as i32;

        if y1 == y2 {
            self.set_curr_cell(ex2, ey);
            return;
        }

        if ex1 == ex2 {
            let delta = y2 - y1;
            self.curr_cell.cover += delta;
            self.curr_cell.area += (fx1 + fx2) * delta;
            return;
        }

        // Run of adjacent cells on the same row.
        let mut p = (POLY_SUBPIXEL_SCALE as i64 - fx1 as i64) * (y2 - y1) as i64;
        let mut first = POLY_SUBPIXEL_SCALE as i32;
        let mut incr = 1_i32;
        let mut dx = x2 as i64 - x1 as i64;

        if dx < 0 {
            p = fx1 as i64 * (y2 - y1) as i64;
            first = 0;
            incr = -1;
            dx = -dx;
        }

        let mut delta = (p / dx) as i32;
        let mut modulo = p % dx;
        if modulo < 0 {
            delta -= 1;
            modulo += dx;
        }

        self.curr_cell.cover += delta;
        self.curr_cell.area += (fx1 + first) * delta;

        let mut ex1 = ex1 + incr;
        self.set_curr_cell(ex1, ey);
        let mut y1 = y1 + delta;

        if ex1 != ex2 {
            p = POLY_SUBPIXEL_SCALE as i64 * (y2 - y1 + delta) as i64;
            let mut lift = (p / dx) as i32;
            let mut rem = p % dx;
            if rem < 0 {
                lift -= 1;
                rem += dx;
            }
            modulo -= dx;

            while ex1 != ex2 {
                delta = lift;
                modulo += rem;
                if modulo >= 0 {
                    modulo -= dx;
                    delta += 1;
                }
                self.curr_cell.cover += delta;
                self.curr_cell.area += POLY_SUBPIXEL_SCALE as i32 * delta;
                y1 += delta;
                ex1 += incr;
                self.set_curr_cell(ex1, ey);
            }
        }
        delta = y2 - y1;
        self.curr_cell.cover += delta;
        self.curr_cell.area += (fx2 + POLY_SUBPIXEL_SCALE as i32 - first) * delta;
    }

    /// Add an edge in 24.8 fixed point.
    fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let dx = x2 as i64 - x1 as i64;
        if dx >= DX_LIMIT || dx <= -DX_LIMIT {
            let cx = ((x1 as i64 + x2 as i64) >> 1) as i32;
            let cy = ((y1 as i64 + y2 as i64) >> 1) as i32;
            self.line(x1, y1, cx, cy);
            self.line(cx, cy, x2, y2);
            return;
        }

        let dy = y2 as i64 - y1 as i64;
        let ex1 = x1 >> POLY_SUBPIXEL_SHIFT;
        let ex2 = x2 >> POLY_SUBPIXEL_SHIFT;
        let mut ey1 = y1 >> POLY_SUBPIXEL_SHIFT;
        let ey2 = y2 >> POLY_SUBPIXEL_SHIFT;
        let fy1 = y1 & POLY_SUBPIXEL_MASK as i32;
        let fy2 = y2 & POLY_SUBPIXEL_MASK as i32;

        self.min_x = self.min_x.min(ex1).min(ex2);
        self.max_x = self.max_x.max(ex1).max(ex2);
        self.min_y = self.min_y.min(ey1).min(ey2);
        self.max_y = self.max_y.max(ey1).max(ey2);

        self.set_curr_cell(ex1, ey1);

        if ey1 == ey2 {
            self.render_hline(ey1, x1, fy1, x2, fy2);
            return;
        }

        let mut incr = 1_i32;

        // Vertical edge: one cell per row, no render_hline.
        if dx == 0 {
            let ex = x1 >> POLY_SUBPIXEL_SHIFT;
            let two_fx = (x1 - (ex << POLY_SUBPIXEL_SHIFT)) << 1;

            let mut first = POLY_SUBPIXEL_SCALE as i32;
            if dy < 0 {
                first = 0;
                incr = -1;
            }

            let mut delta = first - fy1;
            self.curr_cell.cover += delta;
            self.curr_cell.area += two_fx * delta;

            ey1 += incr;
            self.set_curr_cell(ex, ey1);

            delta = first + first - POLY_SUBPIXEL_SCALE as i32;
            let area = two_fx * delta;
            while ey1 != ey2 {
                self.curr_cell.cover = delta;
                self.curr_cell.area = area;
                ey1 += incr;
                self.set_curr_cell(ex, ey1);
            }
            delta = fy2 - POLY_SUBPIXEL_SCALE as i32 + first;
            self.curr_cell.cover += delta;
            self.curr_cell.area += two_fx * delta;
            return;
        }

        let mut p = (POLY_SUBPIXEL_SCALE as i64 - fy1 as i64) * dx;
        let mut first = POLY_SUBPIXEL_SCALE as i32;
        let mut dy_abs = dy;
        if dy < 0 {
            p = fy1 as i64 * dx;
            first = 0;
            incr = -1;
            dy_abs = -dy;
        }

        let mut delta = (p / dy_abs) as i32;
        let mut modulo = p % dy_abs;
        if modulo < 0 {
            delta -= 1;
            modulo += dy_abs;
        }

        let mut x_from = x1 + delta;
        self.render_hline(ey1, x1, fy1, x_from, first);

        ey1 += incr;
        self.set_curr_cell(x_from >> POLY_SUBPIXEL_SHIFT, ey1);

        if ey1 != ey2 {
            p = POLY_SUBPIXEL_SCALE as i64 * dx;
            let mut lift = (p / dy_abs) as i32;
            let mut rem = p % dy_abs;
            if rem < 0 {
                lift -= 1;
                rem += dy_abs;
            }
            modulo -= dy_abs;

            while ey1 != ey2 {
                delta = lift;
                modulo += rem;
                if modulo >= 0 {
                    modulo -= dy_abs;
                    delta += 1;
                }
                let x_to = x_from + delta;
                self.render_hline(ey1, x_from, POLY_SUBPIXEL_SCALE as i32 - first, x_to, first);
                x_from = x_to;

                ey1 += incr;
                self.set_curr_cell(x_from >> POLY_SUBPIXEL_SHIFT, ey1);
            }
        }
        self.render_hline(ey1, x_from, POLY_SUBPIXEL_SCALE as i32 - first, x2, fy2);
    }

    /// Sort cells by y, then x within each row.
    fn sort_cells(&mut self) {
        if self.sorted {
            return;
        }
        self.add_curr_cell();
        self.curr_cell.initial();

        if self.cells.is_empty() {
            return;
        }

        let num_cells = self.cells.len();
        self.sorted_cells.clear();
        self.sorted_cells.resize(num_cells, 0);

        let y_range = (self.max_y - self.min_y + 1) as usize;
        self.sorted_y.clear();
        self.sorted_y.resize(y_range, SortedY::default());

        // Histogram of cells per row.
        for cell in &self.cells {
            self.sorted_y[(cell.y - self.min_y) as usize].start += 1;
        }

        let mut start = 0u32;
        for sy in &mut self.sorted_y {
            let count = sy.start;
            sy.start = start;
            start += count;
        }

        for (i, cell) in self.cells.iter().enumerate() {
            let sy = &mut self.sorted_y[(cell.y - self.min_y) as usize];
            self.sorted_cells[(sy.start + sy.num) as usize] = i as u32;
            sy.num += 1;
        }

        for sy in &self.sorted_y {
            if sy.num > 0 {
                let range = sy.start as usize..(sy.start + sy.num) as usize;
                let cells = &self.cells;
                self.sorted_cells[range].sort_unstable_by_key(|&idx| cells[idx as usize].x);
            }
        }

        self.sorted = true;
    }

    #[inline]
    fn scanline_cells(&self, y: i32) -> &[u32] {
        let sy = &self.sorted_y[(y - self.min_y) as usize];
        &self.sorted_cells[sy.start as usize..(sy.start + sy.num) as usize]
    }
}

// ============================================================================
// Clipper
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
struct ClipBox {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

/// Clipping flags: 1 = right of x2, 2 = above y2, 4 = left of x1,
/// 8 = below y1.
#[inline]
fn clipping_flags(x: i32, y: i32, b: &ClipBox) -> u32 {
    (x > b.x2) as u32 | ((y > b.y2) as u32) << 1 | ((x < b.x1) as u32) << 2 | ((y < b.y1) as u32) << 3
}

#[inline]
fn clipping_flags_y(y: i32, b: &ClipBox) -> u32 {
    ((y > b.y2) as u32) << 1 | ((y < b.y1) as u32) << 3
}

/// Clips edges exactly in y. Parts outside in x are projected onto the
/// nearest vertical boundary so their winding contribution is kept.
struct Clipper {
    clip_box: ClipBox,
    x1: i32,
    y1: i32,
    f1: u32,
    clipping: bool,
}

impl Clipper {
    fn new() -> Self {
        Self {
            clip_box: ClipBox::default(),
            x1: 0,
            y1: 0,
            f1: 0,
            clipping: false,
        }
    }

    fn clip_box(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.clip_box = ClipBox {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        };
        self.clipping = true;
    }

    fn move_to(&mut self, x1: i32, y1: i32) {
        self.x1 = x1;
        self.y1 = y1;
        if self.clipping {
            self.f1 = clipping_flags(x1, y1, &self.clip_box);
        }
    }

    fn line_to(&mut self, ras: &mut Cells, x2: i32, y2: i32) {
        if !self.clipping {
            ras.line(self.x1, self.y1, x2, y2);
            self.x1 = x2;
            self.y1 = y2;
            return;
        }

        let f2 = clipping_flags(x2, y2, &self.clip_box);

        // Both endpoints on the same invisible side in y.
        if (self.f1 & 10) == (f2 & 10) && (self.f1 & 10) != 0 {
            self.x1 = x2;
            self.y1 = y2;
            self.f1 = f2;
            return;
        }

        let (x1, y1, f1) = (self.x1, self.y1, self.f1);
        let b = self.clip_box;

        match ((f1 & 5) << 1) | (f2 & 5) {
            0 => self.line_clip_y(ras, x1, y1, x2, y2, f1, f2),
            1 => {
                let y3 = y1 + mul_div(diff(b.x2, x1), diff(y2, y1), diff(x2, x1));
                let f3 = clipping_flags_y(y3, &b);
                self.line_clip_y(ras, x1, y1, b.x2, y3, f1, f3);
                self.line_clip_y(ras, b.x2, y3, b.x2, y2, f3, f2);
            }
            2 => {
                let y3 = y1 + mul_div(diff(b.x2, x1), diff(y2, y1), diff(x2, x1));
                let f3 = clipping_flags_y(y3, &b);
                self.line_clip_y(ras, b.x2, y1, b.x2, y3, f1, f3);
                self.line_clip_y(ras, b.x2, y3, x2, y2, f3, f2);
            }
            3 => self.line_clip_y(ras, b.x2, y1, b.x2, y2, f1, f2),
            4 => {
                let y3 = y1 + mul_div(diff(b.x1, x1), diff(y2, y1), diff(x2, x1));
                let f3 = clipping_flags_y(y3, &b);
                self.line_clip_y(ras, x1, y1, b.x1, y3, f1, f3);
                self.line_clip_y(ras, b.x1, y3, b.x1, y2, f3, f2);
            }
            6 => {
                let y3 = y1 + mul_div(diff(b.x2, x1), diff(y2, y1), diff(x2, x1));
                let y4 = y1 + mul_div(diff(b.x1, x1), diff(y2, y1), diff(x2, x1));
                let f3 = clipping_flags_y(y3, &b);
                let f4 = clipping_flags_y(y4, &b);
                self.line_clip_y(ras, b.x2, y1, b.x2, y3, f1, f3);
                self.line_clip_y(ras, b.x2, y3, b.x1, y4, f3, f4);
                self.line_clip_y(ras, b.x1, y4, b.x1, y2, f4, f2);
            }
            8 => {
                let y3 = y1 + mul_div(diff(b.x1, x1), diff(y2, y1), diff(x2, x1));
                let f3 = clipping_flags_y(y3, &b);
                self.line_clip_y(ras, b.x1, y1, b.x1, y3, f1, f3);
                self.line_clip_y(ras, b.x1, y3, x2, y2, f3, f2);
            }
            9 => {
                let y3 = y1 + mul_div(diff(b.x1, x1), diff(y2, y1), diff(x2, x1));
                let y4 = y1 + mul_div(diff(b.x2, x1), diff(y2, y1), diff(x2, x1));
                let f3 = clipping_flags_y(y3, &b);
                let f4 = clipping_flags_y(y4, &b);
                self.line_clip_y(ras, b.x1, y1, b.x1, y3, f1, f3);
                self.line_clip_y(ras, b.x1, y3, b.x2, y4, f3, f4);
                self.line_clip_y(ras, b.x2, y4, b.x2, y2, f4, f2);
            }
            12 => self.line_clip_y(ras, b.x1, y1, b.x1, y2, f1, f2),
            // 5, 7, 10, 11 cannot occur: a point is never both left and right.
            _ => {}
        }
        self.f1 = f2;
        self.x1 = x2;
        self.y1 = y2;
    }

    #[allow(clippy::too_many_arguments)]
    fn line_clip_y(&self, ras: &mut Cells, x1: i32, y1: i32, x2: i32, y2: i32, f1: u32, f2: u32) {
        let f1 = f1 & 10;
        let f2 = f2 & 10;
        let b = &self.clip_box;

        if (f1 | f2) == 0 {
            ras.line(x1, y1, x2, y2);
        } else if f1 != f2 {
            let (mut tx1, mut ty1, mut tx2, mut ty2) = (x1, y1, x2, y2);
            if f1 & 8 != 0 {
                tx1 = x1 + mul_div(diff(b.y1, y1), diff(x2, x1), diff(y2, y1));
                ty1 = b.y1;
            }
            if f1 & 2 != 0 {
                tx1 = x1 + mul_div(diff(b.y2, y1), diff(x2, x1), diff(y2, y1));
                ty1 = b.y2;
            }
            if f2 & 8 != 0 {
                tx2 = x1 + mul_div(diff(b.y1, y1), diff(x2, x1), diff(y2, y1));
                ty2 = b.y1;
            }
            if f2 & 2 != 0 {
                tx2 = x1 + mul_div(diff(b.y2, y1), diff(x2, x1), diff(y2, y1));
                ty2 = b.y2;
            }
            ras.line(tx1, ty1, tx2, ty2);
        }
    }
}

// ============================================================================
// Scanline
// ============================================================================

/// A run of pixels in a scanline; `cover_offset` indexes the covers array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub x: i32,
    pub len: i32,
    pub cover_offset: usize,
}

/// Unpacked scanline: one coverage byte per pixel, grouped in spans.
pub struct Scanline {
    min_x: i32,
    last_x: i32,
    y: i32,
    covers: Vec<u8>,
    spans: Vec<Span>,
}

impl Scanline {
    pub fn new() -> Self {
        Self {
            min_x: 0,
            last_x: 0x7FFF_FFF0,
            y: 0,
            covers: Vec::new(),
            spans: Vec::new(),
        }
    }

    /// Prepare for scanlines covering `min_x..=max_x`.
    pub fn reset(&mut self, min_x: i32, max_x: i32) {
        let max_len = (max_x - min_x + 2).max(0) as usize;
        if max_len > self.covers.len() {
            self.covers.resize(max_len, 0);
        }
        self.last_x = 0x7FFF_FFF0;
        self.min_x = min_x;
        self.spans.clear();
    }

    fn reset_spans(&mut self) {
        self.last_x = 0x7FFF_FFF0;
        self.spans.clear();
    }

    fn add_cell(&mut self, x: i32, cover: u32) {
        self.add_span(x, 1, cover);
    }

    fn add_span(&mut self, x: i32, len: u32, cover: u32) {
        let xi = (x - self.min_x) as usize;
        self.covers[xi..xi + len as usize].fill(cover as u8);
        if xi as i32 == self.last_x + 1 && !self.spans.is_empty() {
            let n = self.spans.len();
            self.spans[n - 1].len += len as i32;
        } else {
            self.spans.push(Span {
                x,
                len: len as i32,
                cover_offset: xi,
            });
        }
        self.last_x = xi as i32 + len as i32 - 1;
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Coverage values of `span`.
    pub fn covers(&self, span: &Span) -> &[u8] {
        &self.covers[span.cover_offset..span.cover_offset + span.len as usize]
    }
}

impl Default for Scanline {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Rasterizer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    Initial,
    MoveTo,
    LineTo,
    Closed,
}

/// Polygon rasterizer with anti-aliased output.
///
/// Usage:
/// 1. Optionally set `set_fill_rule()` and `clip_box()`
/// 2. Define contours with `move_to_d()` / `line_to_d()` or `add_path()`
/// 3. Call `rewind_scanlines()` then repeatedly `sweep_scanline()`
///
/// Contours are closed implicitly.
pub struct Rasterizer {
    outline: Cells,
    clipper: Clipper,
    fill_rule: FillRule,
    start_x: i32,
    start_y: i32,
    status: Status,
    scan_y: i32,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            outline: Cells::new(),
            clipper: Clipper::new(),
            fill_rule: FillRule::NonZero,
            start_x: 0,
            start_y: 0,
            status: Status::Initial,
            scan_y: 0,
        }
    }

    /// Discard all polygon data. Clipping and fill rule are kept.
    pub fn reset(&mut self) {
        self.outline.reset();
        self.status = Status::Initial;
    }

    pub fn set_fill_rule(&mut self, rule: FillRule) {
        self.fill_rule = rule;
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    /// Clip to the device-space rectangle.
    pub fn clip_box(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.reset();
        self.clipper
            .clip_box(poly_coord(x1), poly_coord(y1), poly_coord(x2), poly_coord(y2));
    }

    pub fn close_polygon(&mut self) {
        if self.status == Status::LineTo {
            self.clipper
                .line_to(&mut self.outline, self.start_x, self.start_y);
            self.status = Status::Closed;
        }
    }

    pub fn move_to_d(&mut self, x: f64, y: f64) {
        if self.outline.sorted {
            self.reset();
        }
        self.close_polygon();
        self.start_x = poly_coord(x);
        self.start_y = poly_coord(y);
        self.clipper.move_to(self.start_x, self.start_y);
        self.status = Status::MoveTo;
    }

    pub fn line_to_d(&mut self, x: f64, y: f64) {
        self.clipper
            .line_to(&mut self.outline, poly_coord(x), poly_coord(y));
        self.status = Status::LineTo;
    }

    pub fn add_vertex(&mut self, x: f64, y: f64, cmd: u32) {
        if is_move_to(cmd) {
            self.move_to_d(x, y);
        } else if is_vertex(cmd) {
            self.line_to_d(x, y);
        } else if is_close(cmd) {
            self.close_polygon();
        }
    }

    /// Add all vertices from a vertex source.
    pub fn add_path(&mut self, vs: &mut dyn VertexSource) {
        let (mut x, mut y) = (0.0, 0.0);
        vs.rewind();
        if self.outline.sorted {
            self.reset();
        }
        loop {
            let cmd = vs.vertex(&mut x, &mut y);
            if is_stop(cmd) {
                break;
            }
            self.add_vertex(x, y, cmd);
        }
    }

    pub fn min_x(&self) -> i32 {
        self.outline.min_x
    }
    pub fn min_y(&self) -> i32 {
        self.outline.min_y
    }
    pub fn max_x(&self) -> i32 {
        self.outline.max_x
    }
    pub fn max_y(&self) -> i32 {
        self.outline.max_y
    }

    /// Sort cells and prepare for sweeping. Returns `false` when nothing
    /// was rasterized.
    pub fn rewind_scanlines(&mut self) -> bool {
        self.close_polygon();
        self.outline.sort_cells();
        if self.outline.cells.is_empty() {
            return false;
        }
        self.scan_y = self.outline.min_y;
        true
    }

    /// Coverage (0..=255) for an accumulated area under the fill rule.
    #[inline]
    pub fn calculate_alpha(&self, area: i32) -> u32 {
        let mut cover = area >> (POLY_SUBPIXEL_SHIFT * 2 + 1 - AA_SHIFT);
        if cover < 0 {
            cover = -cover;
        }
        if self.fill_rule == FillRule::EvenOdd {
            cover &= AA_MASK2 as i32;
            if cover > AA_SCALE as i32 {
                cover = AA_SCALE2 as i32 - cover;
            }
        }
        cover.min(AA_MASK as i32) as u32
    }

    /// Fill `sl` with the next non-empty scanline. Returns `false` when
    /// all rows have been swept.
    pub fn sweep_scanline(&mut self, sl: &mut Scanline) -> bool {
        loop {
            if self.scan_y > self.outline.max_y {
                return false;
            }
            sl.reset_spans();

            let cells = self.outline.scanline_cells(self.scan_y);
            let mut idx = 0;
            let mut cover: i32 = 0;

            while idx < cells.len() {
                let cur = self.outline.cells[cells[idx] as usize];
                let x = cur.x;
                let mut area = cur.area;
                cover += cur.cover;
                idx += 1;

                // Merge all cells with the same x.
                while idx < cells.len() {
                    let next = &self.outline.cells[cells[idx] as usize];
                    if next.x != x {
                        break;
                    }
                    area += next.area;
                    cover += next.cover;
                    idx += 1;
                }

                let mut span_x = x;
                if area != 0 {
                    let alpha = self.calculate_alpha((cover << (POLY_SUBPIXEL_SHIFT + 1)) - area);
                    if alpha != 0 {
                        sl.add_cell(x, alpha);
                    }
                    span_x = x + 1;
                }

                if let Some(&next_idx) = cells.get(idx) {
                    let next_x = self.outline.cells[next_idx as usize].x;
                    if next_x > span_x {
                        let alpha = self.calculate_alpha(cover << (POLY_SUBPIXEL_SHIFT + 1));
                        if alpha != 0 {
                            sl.add_span(span_x, (next_x - span_x) as u32, alpha);
                        }
                    }
                }
            }

            if !sl.spans.is_empty() {
                break;
            }
            self.scan_y += 1;
        }

        sl.y = self.scan_y;
        self.scan_y += 1;
        true
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
