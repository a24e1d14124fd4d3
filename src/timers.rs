//! 60 Hz delay/sound/video down-counters, paced by the [`crate::Scheduler`],
//! not by instruction throughput.

/// Refresh rate, in Hz, shared by the timers and the display.
pub const REFRESH_RATE_HZ: u32 = 60;

/// Delay, sound, and video-blank down-counters.
///
/// All three decrement once per 60 Hz tick, saturating at zero; they
/// never advance on their own as a side effect of executing opcodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timers {
    /// Readable via `FX07`, writable via `FX15`.
    pub delay: u8,
    /// Writable via `FX18`; while non-zero the `Audio` port should emit tone.
    pub sound: u8,
    /// Used by the `sprite_delay` quirk to gate `DXYN` to one blit per frame.
    pub video: u8,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decrements all three counters by one 60 Hz tick.
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
        self.video = self.video.saturating_sub(1);
    }

    pub fn is_sound_active(&self) -> bool {
        self.sound > 0
    }
}
