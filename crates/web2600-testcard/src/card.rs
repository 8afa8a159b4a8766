use web2600_bridge::BridgeError;
use web2600_bridge::display::consts::{CLKS_HBLANK, CLKS_VISIBLE};
use web2600_bridge::display::{Canvas, PixelRenderer, SignalAttributes, TvSpec};
use web2600_bridge::input::JoystickButton;
use web2600_bridge::Notifier;

pub const TOP_SCANLINE: i32 = 40;
pub const BOTTOM_SCANLINE: i32 = 232;

/// Colour clocks per bar; 160 visible clocks give 16 bars, one per hue
const BAR_WIDTH: i32 = 10;
const CURSOR_SIZE: i32 = 4;
const CURSOR_COLOR: u8 = 0x0E;

pub struct TestCard<N: Notifier> {
    canvas: Canvas<N>,
    cursor: (i32, i32),
    held: JoystickButton,
    luminance: u8,
}

impl<N: Notifier> TestCard<N> {
    pub fn new(notifier: N) -> Self {
        Self {
            canvas: Canvas::new(notifier),
            cursor: (CLKS_VISIBLE as i32 / 2, (BOTTOM_SCANLINE - TOP_SCANLINE) / 2),
            held: JoystickButton::empty(),
            luminance: 0x08,
        }
    }

    pub fn cursor(&self) -> (i32, i32) {
        self.cursor
    }

    pub fn canvas(&self) -> &Canvas<N> {
        &self.canvas
    }

    pub fn start(&mut self) -> Result<(), BridgeError> {
        self.canvas.notifier().log("test card running")?;
        self.canvas.notifier().update_debug("tvSpec", TvSpec::NTSC.id.into())?;
        self.canvas.resize(TvSpec::NTSC, TOP_SCANLINE, BOTTOM_SCANLINE)
    }

    /// Held buttons move the cursor one clock/line per frame; fire flips the
    /// bar luminance while held
    pub fn set_button(&mut self, button: JoystickButton, pressed: bool) {
        self.held.set(button, pressed);
    }

    pub fn frame(&mut self) -> Result<(), BridgeError> {
        self.step_cursor();
        let luminance = if self.held.contains(JoystickButton::FIRE) {
            0x0E - self.luminance
        } else {
            self.luminance
        };

        for scanline in TOP_SCANLINE..BOTTOM_SCANLINE {
            for x in 0..CLKS_VISIBLE as i32 {
                let y = scanline - TOP_SCANLINE;
                let on_cursor = (self.cursor.0..self.cursor.0 + CURSOR_SIZE).contains(&x)
                    && (self.cursor.1..self.cursor.1 + CURSOR_SIZE).contains(&y);
                let pixel = if on_cursor {
                    CURSOR_COLOR
                } else {
                    (((x / BAR_WIDTH) as u8) << 4) | luminance
                };

                self.canvas.set_pixel(
                    SignalAttributes {
                        scanline,
                        clock: x + CLKS_HBLANK,
                        pixel,
                    },
                    true,
                )?;
            }
        }

        self.canvas.new_frame(true)
    }

    fn step_cursor(&mut self) {
        let (mut x, mut y) = self.cursor;
        if self.held.contains(JoystickButton::LEFT) {
            x -= 1;
        }
        if self.held.contains(JoystickButton::RIGHT) {
            x += 1;
        }
        if self.held.contains(JoystickButton::UP) {
            y -= 1;
        }
        if self.held.contains(JoystickButton::DOWN) {
            y += 1;
        }
        let max_x = CLKS_VISIBLE as i32 - CURSOR_SIZE;
        let max_y = BOTTOM_SCANLINE - TOP_SCANLINE - CURSOR_SIZE;
        self.cursor = (x.clamp(0, max_x), y.clamp(0, max_y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::Receiver;
    use web2600_bridge::channel::QueueChannel;
    use web2600_bridge::context::WorkerSupport;
    use web2600_bridge::{DebugValue, HostBridge, WorkerMessage};

    fn card() -> (TestCard<HostBridge<QueueChannel>>, Receiver<WorkerMessage>) {
        let (channel, rx) = QueueChannel::unbounded();
        let bridge = HostBridge::initialize(&WorkerSupport::Available, channel).unwrap();
        (TestCard::new(bridge), rx)
    }

    #[test]
    fn test_start_announces_and_sizes_canvas() {
        let (mut card, rx) = card();
        card.start().unwrap();

        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            got,
            vec![
                WorkerMessage::Log {
                    msg: "test card running".into()
                },
                WorkerMessage::UpdateDebug {
                    target: "tvSpec".into(),
                    value: DebugValue::Text("NTSC".into())
                },
                WorkerMessage::UpdateCanvasSize {
                    width: 640,
                    height: 384
                },
            ]
        );
    }

    #[test]
    fn test_frame_draws_bars() {
        let (mut card, rx) = card();
        card.start().unwrap();
        card.frame().unwrap();

        let got: Vec<_> = rx.try_iter().skip(3).collect();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].cmd(), "updateDebug");

        let image = card.canvas().image().unwrap();
        // clock 0 is bar 0 (grey), clock 150 is bar 15; each clock is 4 canvas pixels wide
        assert_eq!(image.pixel(0, 0), Some(TvSpec::NTSC.color(0x08)));
        assert_eq!(image.pixel(150 * 4, 0), Some(TvSpec::NTSC.color(0xF8)));
        let (cx, cy) = card.cursor();
        assert_eq!(
            image.pixel(cx as usize * 4, cy as usize * 2),
            Some(TvSpec::NTSC.color(CURSOR_COLOR))
        );
    }

    #[test]
    fn test_cursor_follows_joystick_and_stays_on_screen() {
        let (mut card, _rx) = card();
        card.start().unwrap();
        let (x0, y0) = card.cursor();

        card.set_button(JoystickButton::RIGHT, true);
        card.set_button(JoystickButton::UP, true);
        card.frame().unwrap();
        assert_eq!(card.cursor(), (x0 + 1, y0 - 1));

        card.set_button(JoystickButton::RIGHT, false);
        card.set_button(JoystickButton::UP, false);
        card.set_button(JoystickButton::LEFT, true);
        for _ in 0..200 {
            card.frame().unwrap();
        }
        assert_eq!(card.cursor().0, 0);
    }
}
