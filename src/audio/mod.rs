pub mod capture;
pub mod monitor;
pub mod recorder;

pub use capture::{AudioCapture, AudioError, FrameCursor};
pub use monitor::{is_silent, GateState, SilenceGate};
pub use recorder::{persist, RecordedSample, SampleBuilder, SampleHandle};
