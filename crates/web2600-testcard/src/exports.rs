use crate::card::TestCard;
use std::cell::RefCell;
use web2600_bridge::bridge::report;
use web2600_bridge::guest::GuestNotifier;
use web2600_bridge::input::JoystickButton;

thread_local! {
    static CARD: RefCell<Option<TestCard<GuestNotifier>>> = const { RefCell::new(None) };
}

#[unsafe(no_mangle)]
pub extern "C" fn run() {
    let mut card = TestCard::new(GuestNotifier);
    report(card.start());
    CARD.with(|cell| *cell.borrow_mut() = Some(card));
}

#[unsafe(no_mangle)]
pub extern "C" fn frame() {
    CARD.with(|cell| {
        if let Some(card) = cell.borrow_mut().as_mut() {
            report(card.frame());
        }
    });
}

/// Only player 0 drives the card
#[unsafe(no_mangle)]
pub extern "C" fn input(player: u32, button: u32, pressed: u32) {
    if player != 0 {
        return;
    }
    let button = JoystickButton::from_bits_truncate(button as u8);
    CARD.with(|cell| {
        if let Some(card) = cell.borrow_mut().as_mut() {
            card.set_button(button, pressed != 0);
        }
    });
}
