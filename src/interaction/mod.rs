//! Gesture label stream to debounced action events

pub mod state_machine;

pub use state_machine::{GrabState, InteractionConfig, InteractionEvent, InteractionStateMachine};
