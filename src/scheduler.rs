//! Step-loop pacing: batches CPU cycles against a 60 Hz timer/input/
//! display tick, decoupled from instruction throughput.

use crate::error::Trap;
use crate::machine::Machine;
use crate::ports::{Audio, Display, DirtyRect, Input};
use crate::timers::REFRESH_RATE_HZ;

/// Cycles attempted per tick when `clock_speed` is zero ("uncapped").
/// Without a wall-clock facility in `no_std`, uncapped mode is a large
/// fixed cycle budget per tick rather than a timed spin; `std` hosts
/// that want genuine wall-clock pacing should drive [`Machine::step`]
/// directly from a loop keyed off `std::time::Instant`.
const UNCAPPED_CYCLES_PER_TICK: u32 = 200_000;

/// Owns the three host ports and the cycles/tick pacing; the
/// [`Machine`] itself stays free of any notion of wall-clock time.
pub struct Scheduler<D, I, A> {
    pub display: D,
    pub input: I,
    pub audio: A,
    clock_speed: u32,
}

impl<D: Display, I: Input, A: Audio> Scheduler<D, I, A> {
    /// `clock_speed` is target CPU cycles per second; zero runs uncapped
    /// (see [`UNCAPPED_CYCLES_PER_TICK`]).
    pub fn new(display: D, input: I, audio: A, clock_speed: u32) -> Self {
        Self {
            display,
            input,
            audio,
            clock_speed,
        }
    }

    pub fn clock_speed(&self) -> u32 {
        self.clock_speed
    }

    pub fn set_clock_speed(&mut self, clock_speed: u32) {
        self.clock_speed = clock_speed;
    }

    fn cycles_this_tick(&self) -> u32 {
        if self.clock_speed == 0 {
            UNCAPPED_CYCLES_PER_TICK
        } else {
            (self.clock_speed / REFRESH_RATE_HZ).max(1)
        }
    }

    /// Announces the current mode/palette to the `Display` port. Call
    /// once after construction and again after loading a ROM that
    /// changes architecture.
    pub fn sync_display_mode(&mut self, machine: &Machine) {
        let framebuffer = machine.framebuffer();
        let (w, h) = framebuffer.dims();
        self.display.set_mode(w, h, framebuffer.plane_count());
        self.display.set_palette(framebuffer.palette());
    }

    /// Runs one 60 Hz tick: polls input, executes a batch of CPU cycles,
    /// decrements the timers exactly once, advances audio, and presents
    /// the display if the framebuffer changed. Returns the trap, if any,
    /// that stopped the cycle batch early; the caller decides whether to
    /// keep ticking (e.g. after logging a halt).
    pub fn run_tick(&mut self, machine: &mut Machine) -> Result<(), Trap> {
        self.input.poll();
        for key in 0..16u8 {
            machine.keypad_mut().set(key, self.input.key_state(key));
        }

        let budget = self.cycles_this_tick();
        let mut result = Ok(());
        for _ in 0..budget {
            if machine.is_halted() {
                break;
            }
            if let Err(trap) = machine.step() {
                result = Err(trap);
                break;
            }
        }

        machine.tick_timers();
        self.audio.set_pattern(machine.audio_pattern());
        self.audio.set_tone(machine.tone_hz());
        self.audio.gate(machine.timers().is_sound_active());

        if machine.framebuffer_mut().has_changed() {
            let (w, h) = machine.framebuffer().dims();
            self.display
                .present(machine.framebuffer(), DirtyRect::full(w, h));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{NullAudio, NullDisplay, NullInput};
    use crate::quirks::Architecture;

    #[test]
    fn tick_advances_timers_exactly_once() {
        let mut machine = Machine::new(Architecture::Chip8).unwrap();
        machine.load_rom(&[0x12, 0x00]).unwrap(); // 1200: jump to self
        let mut scheduler = Scheduler::new(NullDisplay, NullInput, NullAudio, 600);
        let delay_before = machine.timers().delay;
        scheduler.run_tick(&mut machine).unwrap();
        assert_eq!(machine.timers().delay, delay_before.saturating_sub(1));
    }

    #[test]
    fn uncapped_clock_runs_a_large_batch() {
        assert!(UNCAPPED_CYCLES_PER_TICK > 1000);
    }
}
