pub mod consts;
pub mod frame;
pub mod palette;

use crate::bridge::Notifier;
use crate::error::BridgeError;
use consts::{CANVAS_WIDTH, CLKS_HBLANK, HORIZ_SCALE, PIXEL_WIDTH, VERT_SCALE};
use frame::RgbaFrame;
pub use palette::TvSpec;

pub const FRAME_NUM_TARGET: &str = "frameNum";

/// One pixel's worth of television signal
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SignalAttributes {
    pub scanline: i32,
    pub clock: i32,
    pub pixel: u8,
}

/// Receiver for the television's pixel stream
pub trait PixelRenderer {
    fn resize(&mut self, spec: TvSpec, top_scanline: i32, bottom_scanline: i32) -> Result<(), BridgeError>;
    fn new_frame(&mut self, is_stable: bool) -> Result<(), BridgeError>;
    fn set_pixel(&mut self, sig: SignalAttributes, current: bool) -> Result<(), BridgeError>;

    fn new_scanline(&mut self, _scanline: i32) -> Result<(), BridgeError> {
        Ok(())
    }

    fn reset(&mut self) {}

    fn end_rendering(&mut self) -> Result<(), BridgeError> {
        Ok(())
    }
}

/// Renders the television picture into an RGBA image and ships it through a
/// [`Notifier`], one `updateCanvas` per frame.
pub struct Canvas<N: Notifier> {
    notifier: N,
    spec: TvSpec,
    top: i32,
    frame_num: u64,
    image: Option<RgbaFrame>,
}

impl<N: Notifier> Canvas<N> {
    pub fn new(notifier: N) -> Self {
        Self {
            notifier,
            spec: TvSpec::NTSC,
            top: 0,
            frame_num: 0,
            image: None,
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn frame_num(&self) -> u64 {
        self.frame_num
    }

    pub fn image(&self) -> Option<&RgbaFrame> {
        self.image.as_ref()
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.image
            .as_ref()
            .map(|img| (img.width() as u32, img.height() as u32))
    }
}

impl<N: Notifier> PixelRenderer for Canvas<N> {
    /// Only the first resize takes effect; the canvas keeps its size after that
    fn resize(&mut self, spec: TvSpec, top_scanline: i32, bottom_scanline: i32) -> Result<(), BridgeError> {
        if self.image.is_some() {
            return Ok(());
        }
        self.spec = spec;
        self.top = top_scanline;

        let visible_lines = (bottom_scanline - top_scanline).max(0) as usize;
        let height = visible_lines * VERT_SCALE;
        let width = CANVAS_WIDTH;

        self.image = Some(RgbaFrame::new(width, height));
        self.notifier.update_canvas_size(width as u32, height as u32)
    }

    fn new_frame(&mut self, _is_stable: bool) -> Result<(), BridgeError> {
        self.frame_num += 1;
        self.notifier
            .update_debug(FRAME_NUM_TARGET, self.frame_num.into())?;

        match &self.image {
            Some(image) => self.notifier.update_canvas(&image.data),
            None => Ok(()),
        }
    }

    /// Writes the palette colour for every visible position. The image is
    /// never cleared, so whatever the previous frame left elsewhere stays
    fn set_pixel(&mut self, sig: SignalAttributes, _current: bool) -> Result<(), BridgeError> {
        let Some(image) = self.image.as_mut() else {
            return Ok(());
        };

        let x = sig.clock - CLKS_HBLANK;
        let y = sig.scanline - self.top;
        if x < 0 || y < 0 {
            return Ok(());
        }
        let (x, y) = (x as usize, y as usize);

        let rgb = self.spec.color(sig.pixel);
        for h in 0..VERT_SCALE {
            for w in 0..HORIZ_SCALE * PIXEL_WIDTH {
                image.set_pixel(x * HORIZ_SCALE * PIXEL_WIDTH + w, y * VERT_SCALE + h, rgb);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::HostBridge;
    use crate::channel::QueueChannel;
    use crate::context::WorkerSupport;
    use crate::message::{DebugValue, WorkerMessage};

    fn canvas() -> (
        Canvas<HostBridge<QueueChannel>>,
        crossbeam_channel::Receiver<WorkerMessage>,
    ) {
        let (channel, rx) = QueueChannel::unbounded();
        let bridge = HostBridge::initialize(&WorkerSupport::Available, channel).unwrap();
        (Canvas::new(bridge), rx)
    }

    #[test]
    fn test_first_resize_sets_canvas_size() {
        let (mut canvas, rx) = canvas();

        canvas.resize(TvSpec::NTSC, 40, 232).unwrap();
        assert_eq!(canvas.size(), Some((640, 384)));
        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            vec![WorkerMessage::UpdateCanvasSize {
                width: 640,
                height: 384
            }]
        );

        // later resizes are ignored
        canvas.resize(TvSpec::NTSC, 30, 250).unwrap();
        assert_eq!(canvas.size(), Some((640, 384)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_new_frame_emits_counter_then_pixels() {
        let (mut canvas, rx) = canvas();
        canvas.resize(TvSpec::NTSC, 0, 2).unwrap();
        rx.try_iter().for_each(drop);

        canvas.new_frame(true).unwrap();
        canvas.new_frame(true).unwrap();

        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(got.len(), 4);
        assert_eq!(
            got[0],
            WorkerMessage::UpdateDebug {
                target: "frameNum".into(),
                value: DebugValue::Int(1)
            }
        );
        match &got[1] {
            WorkerMessage::UpdateCanvas { image } => assert_eq!(image.len(), 640 * 4 * 4),
            other => panic!("expected canvas update, got {other:?}"),
        }
        assert_eq!(
            got[2],
            WorkerMessage::UpdateDebug {
                target: "frameNum".into(),
                value: DebugValue::Int(2)
            }
        );
        assert_eq!(canvas.frame_num(), 2);
    }

    #[test]
    fn test_frame_before_resize_sends_only_counter() {
        let (mut canvas, rx) = canvas();
        canvas.new_frame(false).unwrap();

        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].cmd(), "updateDebug");
    }

    #[test]
    fn test_set_pixel_fills_scaled_block() {
        let (mut canvas, _rx) = canvas();
        canvas.resize(TvSpec::NTSC, 10, 20).unwrap();

        let sig = SignalAttributes {
            scanline: 11,
            clock: CLKS_HBLANK + 3,
            pixel: 0x0E,
        };
        canvas.set_pixel(sig, true).unwrap();

        let image = canvas.image().unwrap();
        let white = TvSpec::NTSC.color(0x0E);
        // clock 3 -> x 12..16, scanline 1 -> y 2..4
        for y in 2..4 {
            for x in 12..16 {
                assert_eq!(image.pixel(x, y), Some(white), "pixel ({x}, {y})");
            }
        }
        assert_eq!(image.pixel(11, 2), Some([0, 0, 0, 0]));
        assert_eq!(image.pixel(16, 2), Some([0, 0, 0, 0]));
        assert_eq!(image.pixel(12, 4), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_set_pixel_ignores_blank_and_offscreen() {
        let (mut canvas, _rx) = canvas();
        canvas.resize(TvSpec::NTSC, 10, 20).unwrap();

        for sig in [
            SignalAttributes { scanline: 15, clock: 10, pixel: 0x0E },
            SignalAttributes { scanline: 5, clock: 100, pixel: 0x0E },
            SignalAttributes { scanline: 40, clock: 100, pixel: 0x0E },
        ] {
            canvas.set_pixel(sig, true).unwrap();
        }

        assert!(canvas.image().unwrap().data.iter().all(|&b| b == 0));
    }
}
