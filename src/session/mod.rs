//! Session Runtime
//!
//! Non-deterministic layer around the engine: the dispatch queue, the
//! collaborator ports, the consumer loop and the tilt producer.
//! All simulation state lives in `game/` and is only touched by the runner.

pub mod dispatch;
pub mod ports;
pub mod runner;
pub mod sampler;

pub use dispatch::{channel, DispatchError, Message, MessageReceiver, MessageSender};
pub use ports::{
    Displays, HapticSink, RecordingDisplay, RecordingHaptics, RecordingText, RecordingView,
    SolveRecorder, TextSink, TracingHaptics, TracingText, TracingView, ViewSink,
};
pub use runner::SessionRunner;
pub use sampler::TiltSampler;
