//! Pointer and button injection
//!
//! OS-level injection is someone else's job; the relay only calls the
//! [`InputInjector`] interface. Two implementations ship with the crate:
//! [`LoggingInjector`] traces every call, [`JournalInjector`] records them
//! and can flush the journal to disk.

pub mod journal;
pub mod types;

pub use journal::JournalInjector;
pub use types::{MouseButton, PointerAction, RecordedAction};

use crate::capture::Resolution;
use crate::interaction::InteractionEvent;

/// The input-injection collaborator
pub trait InputInjector: Send {
    fn pointer_move(&mut self, x: i32, y: i32);

    fn button_down(&mut self);

    fn button_up(&mut self);

    fn click(&mut self, button: MouseButton);

    fn double_click(&mut self);

    /// Screen size used to map normalized hand positions to pointer pixels
    fn screen_size(&self) -> Resolution;

    fn apply(&mut self, action: PointerAction) {
        match action {
            PointerAction::Move { x, y } => self.pointer_move(x, y),
            PointerAction::ButtonDown => self.button_down(),
            PointerAction::ButtonUp => self.button_up(),
            PointerAction::Click { button } => self.click(button),
            PointerAction::DoubleClick => self.double_click(),
        }
    }
}

impl From<InteractionEvent> for PointerAction {
    fn from(event: InteractionEvent) -> Self {
        match event {
            InteractionEvent::GrabStart => PointerAction::ButtonDown,
            InteractionEvent::GrabEnd => PointerAction::ButtonUp,
            InteractionEvent::LeftClick => PointerAction::Click {
                button: MouseButton::Left,
            },
            InteractionEvent::RightClick => PointerAction::Click {
                button: MouseButton::Right,
            },
            InteractionEvent::DoubleClick => PointerAction::DoubleClick,
        }
    }
}

/// Traces each action instead of performing it
pub struct LoggingInjector {
    screen: Resolution,
}

impl LoggingInjector {
    pub fn new(screen: Resolution) -> Self {
        Self { screen }
    }
}

impl InputInjector for LoggingInjector {
    fn pointer_move(&mut self, x: i32, y: i32) {
        tracing::trace!("pointer move ({}, {})", x, y);
    }

    fn button_down(&mut self) {
        tracing::info!("button down");
    }

    fn button_up(&mut self) {
        tracing::info!("button up");
    }

    fn click(&mut self, button: MouseButton) {
        tracing::info!("{} click", button);
    }

    fn double_click(&mut self) {
        tracing::info!("double click");
    }

    fn screen_size(&self) -> Resolution {
        self.screen
    }
}

impl<T: InputInjector + ?Sized> InputInjector for Box<T> {
    fn pointer_move(&mut self, x: i32, y: i32) {
        (**self).pointer_move(x, y)
    }

    fn button_down(&mut self) {
        (**self).button_down()
    }

    fn button_up(&mut self) {
        (**self).button_up()
    }

    fn click(&mut self, button: MouseButton) {
        (**self).click(button)
    }

    fn double_click(&mut self) {
        (**self).double_click()
    }

    fn screen_size(&self) -> Resolution {
        (**self).screen_size()
    }
}
