/// Width of one colour clock in canvas pixels, before scaling
pub const PIXEL_WIDTH: usize = 2;
pub const HORIZ_SCALE: usize = 2;
pub const VERT_SCALE: usize = 2;

/// Colour clocks per scanline spent in horizontal blank
pub const CLKS_HBLANK: i32 = 68;
pub const CLKS_VISIBLE: usize = 160;

pub const CANVAS_WIDTH: usize = CLKS_VISIBLE * PIXEL_WIDTH * HORIZ_SCALE;
