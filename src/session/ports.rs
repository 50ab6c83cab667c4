//! Collaborator Ports
//!
//! Narrow interfaces to the outside world: haptics, the three text
//! displays and the maze view. Each comes with a recording implementation
//! for tests and headless hosts, and a tracing implementation for the demo.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, trace};

pub use crate::persistence::SolveRecorder;

/// Fire-and-forget vibration.
pub trait HapticSink: Send {
    /// Pulse for `duration_ms` milliseconds.
    fn vibrate(&mut self, duration_ms: u64);
}

/// A text label.
pub trait TextSink: Send {
    /// Replace the displayed text.
    fn set_text(&mut self, text: &str);
}

/// The maze view.
pub trait ViewSink: Send {
    /// Request a redraw.
    fn invalidate(&mut self);
}

/// Display observers, pushed after every relevant change.
pub struct Displays {
    /// Maze name label.
    pub name: Box<dyn TextSink>,
    /// Remaining goals label.
    pub goals: Box<dyn TextSink>,
    /// Step count label.
    pub steps: Box<dyn TextSink>,
    /// Maze view.
    pub view: Box<dyn ViewSink>,
}

impl Displays {
    /// Displays that log every update.
    pub fn tracing() -> Self {
        Self {
            name: Box::new(TracingText::new("maze")),
            goals: Box::new(TracingText::new("goals")),
            steps: Box::new(TracingText::new("steps")),
            view: Box::new(TracingView),
        }
    }
}

impl std::fmt::Debug for Displays {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Displays").finish_non_exhaustive()
    }
}

// =============================================================================
// RECORDING IMPLEMENTATIONS
// =============================================================================

/// Haptic sink that remembers every pulse.
#[derive(Clone, Debug, Default)]
pub struct RecordingHaptics {
    pulses: Arc<Mutex<Vec<u64>>>,
}

impl RecordingHaptics {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pulses so far, oldest first.
    pub fn pulses(&self) -> Vec<u64> {
        self.pulses.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl HapticSink for RecordingHaptics {
    fn vibrate(&mut self, duration_ms: u64) {
        self.pulses.lock().unwrap_or_else(PoisonError::into_inner).push(duration_ms);
    }
}

/// Text sink that remembers every value.
#[derive(Clone, Debug, Default)]
pub struct RecordingText {
    values: Arc<Mutex<Vec<String>>>,
}

impl RecordingText {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently displayed value.
    pub fn last(&self) -> Option<String> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner).last().cloned()
    }

    /// Every value pushed, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl TextSink for RecordingText {
    fn set_text(&mut self, text: &str) {
        self.values.lock().unwrap_or_else(PoisonError::into_inner).push(text.to_string());
    }
}

/// View that counts redraws.
#[derive(Clone, Debug, Default)]
pub struct RecordingView {
    redraws: Arc<AtomicUsize>,
}

impl RecordingView {
    /// Redraws so far.
    pub fn redraws(&self) -> usize {
        self.redraws.load(Ordering::SeqCst)
    }
}

impl ViewSink for RecordingView {
    fn invalidate(&mut self) {
        self.redraws.fetch_add(1, Ordering::SeqCst);
    }
}

/// Recording handles for all three labels and the view.
#[derive(Clone, Debug, Default)]
pub struct RecordingDisplay {
    /// Maze name label.
    pub name: RecordingText,
    /// Remaining goals label.
    pub goals: RecordingText,
    /// Step count label.
    pub steps: RecordingText,
    /// Maze view.
    pub view: RecordingView,
}

impl RecordingDisplay {
    /// Create empty recorders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Displays writing into these recorders.
    pub fn displays(&self) -> Displays {
        Displays {
            name: Box::new(self.name.clone()),
            goals: Box::new(self.goals.clone()),
            steps: Box::new(self.steps.clone()),
            view: Box::new(self.view.clone()),
        }
    }
}

// =============================================================================
// TRACING IMPLEMENTATIONS
// =============================================================================

/// Haptic sink that logs pulses.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingHaptics;

impl HapticSink for TracingHaptics {
    fn vibrate(&mut self, duration_ms: u64) {
        debug!("Vibrate {}ms", duration_ms);
    }
}

/// Text sink that logs under a label.
#[derive(Clone, Debug)]
pub struct TracingText {
    label: &'static str,
}

impl TracingText {
    /// Create a logging label.
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }
}

impl TextSink for TracingText {
    fn set_text(&mut self, text: &str) {
        info!("{}: {}", self.label, text);
    }
}

/// View that logs redraw requests.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingView;

impl ViewSink for TracingView {
    fn invalidate(&mut self) {
        trace!("View invalidated");
    }
}
