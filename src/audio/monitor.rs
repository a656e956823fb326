//! Peak-magnitude silence classification and the listen gate.
//!
//! The classifier is deliberately naive: no RMS window, no hysteresis. A
//! single sample at or above the threshold anywhere in the frame marks the
//! frame as sound. A turntable needle drop is loud enough that this is all
//! the detection the trigger needs.

/// Returns true iff the maximum absolute sample magnitude in the frame is
/// below `threshold`. A magnitude exactly equal to the threshold counts as
/// sound. The empty frame is silent.
pub fn is_silent(frame: &[i16], threshold: u16) -> bool {
    frame
        .iter()
        .map(|s| s.unsigned_abs())
        .max()
        .map_or(true, |peak| peak < threshold)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Triggered,
}

/// State machine that waits for sound to break silence.
///
/// Idle + silent frame -> stay Idle. Idle + sound -> Triggered; the caller
/// commits to a time-boxed capture window and the triggering frame becomes
/// the first frame of the recording. The gate never leaves Triggered on its
/// own: recording ends by frame count, not by re-detecting silence, and a
/// fresh gate is built when the stream reopens for the next cycle.
pub struct SilenceGate {
    threshold: u16,
    state: GateState,
    silent_run: u64,
}

impl SilenceGate {
    pub fn new(threshold: u16) -> Self {
        Self {
            threshold,
            state: GateState::Idle,
            silent_run: 0,
        }
    }

    /// Feed one frame. Returns true exactly once, on the Idle -> Triggered
    /// transition.
    pub fn observe(&mut self, frame: &[i16]) -> bool {
        if self.state == GateState::Triggered {
            return false;
        }
        if is_silent(frame, self.threshold) {
            self.silent_run += 1;
            false
        } else {
            self.state = GateState::Triggered;
            true
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Consecutive silent frames observed while idle.
    pub fn silent_run(&self) -> u64 {
        self.silent_run
    }
}
