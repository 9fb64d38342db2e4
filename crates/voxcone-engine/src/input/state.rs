use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState, Modifiers, PointerMoveEvent};

/// Current input state for a single window.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,
    pub focused: bool,

    /// Last known pointer position in physical pixels.
    pub pointer_pos: Option<(f32, f32)>,

    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies an event to the current state and records it in `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = *m;
            }

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Releases can be lost while unfocused.
                    self.keys_down.clear();
                }
            }

            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                self.pointer_pos = Some((*x, *y));
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key {
                key,
                state,
                modifiers,
                ..
            } => {
                self.modifiers = *modifiers;

                match state {
                    KeyState::Pressed => {
                        if self.keys_down.insert(*key) {
                            frame.keys_pressed.insert(*key);
                        }
                    }
                    KeyState::Released => {
                        if self.keys_down.remove(key) {
                            frame.keys_released.insert(*key);
                        }
                    }
                }
            }
        }

        frame.push_event(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}
