//! Tilt Sampler
//!
//! Producer side of the tilt input. Turns accelerometer samples into roll
//! commands and posts them to the session queue. It never touches the
//! engine.
//!
//! Posting is edge-triggered: a command goes out only when the derived
//! direction changes, so a held tilt rolls once instead of hammering the
//! wall. Levelling the device posts `Direction::None`, which cancels a held
//! command the session could not act on yet.

use tracing::{debug, trace};

use crate::core::grid::Direction;
use crate::game::input::TiltSample;
use crate::session::dispatch::{DispatchError, MessageSender};

/// Edge-triggered tilt producer.
#[derive(Debug)]
pub struct TiltSampler {
    sender: MessageSender,
    threshold: f32,
    /// Direction derived from the previous sample.
    last: Direction,
    registered: bool,
}

impl TiltSampler {
    /// Create a registered sampler posting to `sender`.
    pub fn new(sender: MessageSender, threshold: f32) -> Self {
        Self {
            sender,
            threshold,
            last: Direction::None,
            registered: true,
        }
    }

    /// Resume posting commands.
    pub fn register(&mut self) {
        if !self.registered {
            debug!("Tilt listener registered");
        }
        self.registered = true;
    }

    /// Stop posting commands. The next tilt after re-registering counts as
    /// a fresh edge.
    pub fn unregister(&mut self) {
        if self.registered {
            debug!("Tilt listener unregistered");
        }
        self.registered = false;
        self.last = Direction::None;
    }

    /// Check if samples are being turned into commands.
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Feed one sample. Returns true if a command was posted.
    pub fn on_sample(&mut self, sample: TiltSample) -> Result<bool, DispatchError> {
        if !self.registered {
            return Ok(false);
        }

        let direction = sample.direction(self.threshold);
        if direction == self.last {
            return Ok(false);
        }
        self.last = direction;

        trace!(?direction, x = sample.x, y = sample.y, "tilt command");
        self.sender.roll(direction)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::input::DEFAULT_TILT_THRESHOLD;
    use crate::core::grid::CellCoord;
    use crate::session::dispatch::{channel, Message};

    fn drain(rx: &mut crate::session::dispatch::MessageReceiver) -> Vec<Direction> {
        let mut out = Vec::new();
        while let Some(message) = rx.try_recv() {
            if let Message::Roll(direction) = message {
                out.push(direction);
            }
        }
        out
    }

    #[test]
    fn test_edge_triggered() {
        let (tx, mut rx) = channel();
        let mut sampler = TiltSampler::new(tx, DEFAULT_TILT_THRESHOLD);

        let samples = [
            TiltSample::new(3.0, 0.0),
            TiltSample::new(4.0, 0.5),
            TiltSample::new(0.0, 0.0),
            TiltSample::new(3.0, 0.0),
            TiltSample::new(0.0, -5.0),
            TiltSample::new(3.0, 3.0),
        ];
        for sample in samples {
            sampler.on_sample(sample).unwrap();
        }

        assert_eq!(
            drain(&mut rx),
            vec![
                Direction::Right,
                Direction::None,
                Direction::Right,
                Direction::Down,
                Direction::None,
            ]
        );
    }

    #[test]
    fn test_unregistered_posts_nothing() {
        let (tx, mut rx) = channel();
        let mut sampler = TiltSampler::new(tx, DEFAULT_TILT_THRESHOLD);

        sampler.on_sample(TiltSample::new(-3.0, 0.0)).unwrap();
        sampler.unregister();
        assert!(!sampler.is_registered());
        assert!(!sampler.on_sample(TiltSample::new(0.0, 3.0)).unwrap());

        // Held tilt counts again after resuming
        sampler.register();
        assert!(sampler.on_sample(TiltSample::new(-3.0, 0.0)).unwrap());
        assert_eq!(drain(&mut rx), vec![Direction::Left, Direction::Left]);
    }

    #[test]
    fn test_flat_start_posts_nothing() {
        let (tx, mut rx) = channel();
        let mut sampler = TiltSampler::new(tx, DEFAULT_TILT_THRESHOLD);
        assert!(!sampler.on_sample(TiltSample::new(0.5, -1.0)).unwrap());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_tilt_held_through_roll_is_served() {
        use crate::config::{Config, RollMode};
        use crate::game::design::{MapCatalogue, MapDesign};
        use crate::game::engine::GameEngine;
        use crate::persistence::MemoryRecords;
        use crate::session::ports::{RecordingDisplay, RecordingHaptics};
        use crate::session::runner::SessionRunner;

        let (tx, rx) = channel();
        let design = MapDesign::from_ascii(
            "open",
            &["+-+-+-+", "|o   x|", "+ + + +", "|     |", "+ + + +", "|     |", "+-+-+-+"],
        )
        .unwrap();
        let runner = SessionRunner::new(
            GameEngine::new(MapCatalogue::new(vec![design]).unwrap()),
            Config { roll_mode: RollMode::Animated, ..Config::default() },
            Box::new(RecordingHaptics::new()),
            RecordingDisplay::new().displays(),
            Box::new(MemoryRecords::new()),
            &tx,
            rx,
        );

        let mut sampler = TiltSampler::new(tx.clone(), DEFAULT_TILT_THRESHOLD);
        sampler.on_sample(TiltSample::new(0.0, -3.0)).unwrap();
        for _ in 0..20 {
            sampler.on_sample(TiltSample::new(3.0, 0.0)).unwrap();
        }
        tx.shutdown().unwrap();

        let engine = runner.run().await;
        assert_eq!(engine.ball().position(), CellCoord::new(2, 2));
        assert_eq!(engine.step_count(), 2);
    }

    #[test]
    fn test_closed_queue() {
        let (tx, rx) = channel();
        drop(rx);
        let mut sampler = TiltSampler::new(tx, DEFAULT_TILT_THRESHOLD);
        assert_eq!(
            sampler.on_sample(TiltSample::new(0.0, 3.0)),
            Err(DispatchError::Closed)
        );
    }
}
