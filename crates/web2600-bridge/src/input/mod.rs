// Joystick input arriving from the page as keyboard events
use crate::message::ClientMessage;
use bitflags::bitflags;

pub const KEY_LEFT: u32 = 37;
pub const KEY_UP: u32 = 38;
pub const KEY_RIGHT: u32 = 39;
pub const KEY_DOWN: u32 = 40;
pub const KEY_SPACE: u32 = 32;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct JoystickButton: u8 {
        const UP    = 0b0000_0001;
        const DOWN  = 0b0000_0010;
        const LEFT  = 0b0000_0100;
        const RIGHT = 0b0000_1000;
        const FIRE  = 0b0001_0000;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlayerId {
    Player0,
    Player1,
}

impl PlayerId {
    pub fn index(self) -> usize {
        match self {
            PlayerId::Player0 => 0,
            PlayerId::Player1 => 1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct JoystickEvent {
    pub player: PlayerId,
    pub button: JoystickButton,
    pub pressed: bool,
}

/// Browser key code to (player, button). The keyboard only drives player 0
pub fn map_key(key: u32) -> Option<(PlayerId, JoystickButton)> {
    let button = match key {
        KEY_LEFT => JoystickButton::LEFT,
        KEY_RIGHT => JoystickButton::RIGHT,
        KEY_UP => JoystickButton::UP,
        KEY_DOWN => JoystickButton::DOWN,
        KEY_SPACE => JoystickButton::FIRE,
        _ => return None,
    };
    Some((PlayerId::Player0, button))
}

pub struct Joystick {
    buttons: [JoystickButton; 2],
}

impl Default for Joystick {
    fn default() -> Self {
        Self::new()
    }
}

impl Joystick {
    pub fn new() -> Self {
        Self {
            buttons: [JoystickButton::empty(); 2],
        }
    }

    pub fn buttons(&self, player: PlayerId) -> JoystickButton {
        self.buttons[player.index()]
    }

    /// Updates the held buttons and returns the event to forward, if any.
    ///
    /// Unmapped keys and auto-repeated key downs change nothing and yield `None`.
    pub fn apply(&mut self, message: ClientMessage) -> Option<JoystickEvent> {
        let (key, pressed) = match message {
            ClientMessage::KeyDown { key } => (key, true),
            ClientMessage::KeyUp { key } => (key, false),
        };
        let (player, button) = map_key(key)?;

        let held = &mut self.buttons[player.index()];
        if held.contains(button) == pressed {
            return None;
        }
        held.set(button, pressed);

        Some(JoystickEvent {
            player,
            button,
            pressed,
        })
    }

    /// One press event per button currently held, player 0 first
    pub fn held(&self) -> impl Iterator<Item = JoystickEvent> + '_ {
        [PlayerId::Player0, PlayerId::Player1]
            .into_iter()
            .flat_map(move |player| {
                self.buttons[player.index()].iter().map(move |button| JoystickEvent {
                    player,
                    button,
                    pressed: true,
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(map_key(37), Some((PlayerId::Player0, JoystickButton::LEFT)));
        assert_eq!(map_key(39), Some((PlayerId::Player0, JoystickButton::RIGHT)));
        assert_eq!(map_key(38), Some((PlayerId::Player0, JoystickButton::UP)));
        assert_eq!(map_key(40), Some((PlayerId::Player0, JoystickButton::DOWN)));
        assert_eq!(map_key(32), Some((PlayerId::Player0, JoystickButton::FIRE)));
        assert_eq!(map_key(13), None);
    }

    #[test]
    fn test_press_and_release() {
        let mut joystick = Joystick::new();

        let event = joystick.apply(ClientMessage::KeyDown { key: KEY_LEFT }).unwrap();
        assert_eq!(
            event,
            JoystickEvent {
                player: PlayerId::Player0,
                button: JoystickButton::LEFT,
                pressed: true,
            }
        );
        joystick.apply(ClientMessage::KeyDown { key: KEY_SPACE }).unwrap();
        assert_eq!(
            joystick.buttons(PlayerId::Player0),
            JoystickButton::LEFT | JoystickButton::FIRE
        );

        let event = joystick.apply(ClientMessage::KeyUp { key: KEY_LEFT }).unwrap();
        assert!(!event.pressed);
        assert_eq!(joystick.buttons(PlayerId::Player0), JoystickButton::FIRE);
        assert_eq!(joystick.buttons(PlayerId::Player1), JoystickButton::empty());
    }

    #[test]
    fn test_repeat_and_unknown_keys_are_ignored() {
        let mut joystick = Joystick::new();

        assert!(joystick.apply(ClientMessage::KeyDown { key: KEY_UP }).is_some());
        assert!(joystick.apply(ClientMessage::KeyDown { key: KEY_UP }).is_none());
        assert!(joystick.apply(ClientMessage::KeyDown { key: 65 }).is_none());
        assert!(joystick.apply(ClientMessage::KeyUp { key: KEY_DOWN }).is_none());
        assert_eq!(joystick.buttons(PlayerId::Player0), JoystickButton::UP);
    }

    #[test]
    fn test_held_lists_each_pressed_button() {
        let mut joystick = Joystick::new();
        assert_eq!(joystick.held().count(), 0);

        joystick.apply(ClientMessage::KeyDown { key: KEY_SPACE });
        joystick.apply(ClientMessage::KeyDown { key: KEY_UP });

        let held: Vec<_> = joystick.held().collect();
        assert_eq!(
            held,
            vec![
                JoystickEvent {
                    player: PlayerId::Player0,
                    button: JoystickButton::UP,
                    pressed: true,
                },
                JoystickEvent {
                    player: PlayerId::Player0,
                    button: JoystickButton::FIRE,
                    pressed: true,
                },
            ]
        );
    }
}
