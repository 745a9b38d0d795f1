//! Screen layout of the dialog, in canvas pixels. The renderer draws these
//! rectangles and click handling hit-tests the same ones.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    /// Half-open: the right and bottom edges belong to the neighbor.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }
}

const MARGIN: f64 = 20.0;
const DIALOG_HEIGHT: f64 = 140.0;
const PADDING: f64 = 16.0;
const ROW_HEIGHT: f64 = 36.0;
const BUTTON_GAP: f64 = 12.0;

/// Dialog panel along the bottom of a `w` x `h` viewport.
pub fn dialog_box(w: f64, h: f64) -> Rect {
    Rect { x: MARGIN, y: h - DIALOG_HEIGHT - MARGIN, w: w - 2.0 * MARGIN, h: DIALOG_HEIGHT }
}

/// Text entry row inside the dialog.
pub fn input_box(w: f64, h: f64) -> Rect {
    let dialog = dialog_box(w, h);
    Rect {
        x: dialog.x + PADDING,
        y: dialog.y + dialog.h - 56.0,
        w: dialog.w - 2.0 * PADDING,
        h: ROW_HEIGHT,
    }
}

/// `n` equal answer buttons sharing the input row, left to right.
pub fn choice_buttons(w: f64, h: f64, n: usize) -> Vec<Rect> {
    if n == 0 {
        return Vec::new();
    }
    let row = input_box(w, h);
    let bw = (row.w - BUTTON_GAP * (n - 1) as f64) / n as f64;
    (0..n)
        .map(|i| Rect { x: row.x + i as f64 * (bw + BUTTON_GAP), y: row.y, w: bw, h: row.h })
        .collect()
}
