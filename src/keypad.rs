//! 16-key keypad state, including the `FX0A` press-then-release latch.

/// Number of keys on the hex keypad.
pub const KEY_COUNT: u8 = 16;

/// Current press state of the 16-key keypad.
///
/// `FX0A`'s "wait for a key" semantics are stateful across steps: the
/// instruction does not complete until a key is pressed *and then
/// released*, so [`Keypad`] tracks the key a wait latched onto
/// separately from the live press bitmap.
#[derive(Debug, Clone, Default)]
pub struct Keypad {
    pressed: [bool; KEY_COUNT as usize],
    /// Set by `FX0A` once a key is observed pressed; cleared (and the
    /// instruction completes) once that same key is released.
    awaited_key: Option<u8>,
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self, key: u8) -> bool {
        self.pressed[(key & 0xF) as usize]
    }

    pub fn set(&mut self, key: u8, pressed: bool) {
        if key < KEY_COUNT {
            self.pressed[key as usize] = pressed;
        }
    }

    pub fn press(&mut self, key: u8) {
        self.set(key, true);
    }

    pub fn release(&mut self, key: u8) {
        self.set(key, false);
    }

    /// Advances the `FX0A` latch. Returns `Some(key)` once a full
    /// press-then-release cycle has completed for some key, `None`
    /// while still waiting (the caller should not advance `PC`).
    pub fn poll_wait(&mut self) -> Option<u8> {
        if let Some(key) = self.awaited_key {
            // Still held: keep waiting for release.
            if self.pressed[key as usize] {
                return None;
            }
            self.awaited_key = None;
            return Some(key);
        }
        for (key, &down) in self.pressed.iter().enumerate() {
            if down {
                self.awaited_key = Some(key as u8);
                break;
            }
        }
        None
    }
}
