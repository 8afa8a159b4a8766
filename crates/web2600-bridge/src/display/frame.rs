pub type Rgba = [u8; 4];

/// Row-major RGBA8 image, the pixel format the page puts on its canvas
pub struct RgbaFrame {
    width: usize,
    height: usize,
    pub data: Vec<u8>,
}

impl RgbaFrame {
    pub fn new(width: usize, height: usize) -> Self {
        RgbaFrame {
            width,
            height,
            data: vec![0; width * height * 4],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Out of bounds writes are dropped
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let base = (y * self.width + x) * 4;
        self.data[base..base + 4].copy_from_slice(&color);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let base = (y * self.width + x) * 4;
        let mut out = [0; 4];
        out.copy_from_slice(&self.data[base..base + 4]);
        Some(out)
    }
}
