//! Session Runner
//!
//! The single consumer loop. It owns the engine and every collaborator,
//! handles one queued message at a time, and reposts engine outcomes onto
//! the same queue so their effects are applied in FIFO order.

use std::collections::VecDeque;

use tracing::{debug, info, instrument, warn};

use crate::config::{Config, RollMode};
use crate::core::grid::Direction;
use crate::game::engine::GameEngine;
use crate::game::events::GameEvent;
use crate::session::dispatch::{Message, MessageReceiver, MessageSender, WeakMessageSender};
use crate::session::ports::{Displays, HapticSink, SolveRecorder};

/// Consumer loop state.
pub struct SessionRunner {
    engine: GameEngine,
    config: Config,
    haptics: Box<dyn HapticSink>,
    displays: Displays,
    recorder: Box<dyn SolveRecorder>,
    receiver: MessageReceiver,
    /// Repost handle that does not keep the queue alive.
    outbox: WeakMessageSender,
    /// Reposts made after every producer hung up.
    backlog: VecDeque<Message>,
    /// An `Invalidate` is queued and not yet handled.
    invalidate_pending: bool,
    /// Latest roll command that arrived while the engine was busy or gated.
    deferred_roll: Option<Direction>,
}

impl SessionRunner {
    /// Create a runner draining `receiver`. `sender` must belong to the
    /// same queue; it is only kept as a weak handle.
    pub fn new(
        engine: GameEngine,
        config: Config,
        haptics: Box<dyn HapticSink>,
        displays: Displays,
        recorder: Box<dyn SolveRecorder>,
        sender: &MessageSender,
        receiver: MessageReceiver,
    ) -> Self {
        Self {
            engine,
            config,
            haptics,
            displays,
            recorder,
            receiver,
            outbox: sender.downgrade(),
            backlog: VecDeque::new(),
            invalidate_pending: false,
            deferred_roll: None,
        }
    }

    /// Drain the queue until `Shutdown` or until every sender is dropped.
    ///
    /// Returns the engine for inspection.
    #[instrument(skip(self))]
    pub async fn run(mut self) -> GameEngine {
        info!("Session started on map {} ({})", self.engine.current_map(), self.engine.map_name());
        self.publish_events();

        loop {
            let message = match self.try_next() {
                Some(message) => message,
                None => match self.receiver.recv().await {
                    Some(message) => message,
                    None => break,
                },
            };
            if let Message::Shutdown = message {
                debug!("Shutdown requested, draining queue");
                while let Some(message) = self.try_next() {
                    if !matches!(message, Message::Shutdown) {
                        self.handle(message);
                    }
                }
                break;
            }
            self.handle(message);
        }

        info!(
            "Session stopped on map {} after {} steps",
            self.engine.current_map(),
            self.engine.step_count()
        );
        self.engine
    }

    /// Next ready message: queued ones first, then the local backlog.
    fn try_next(&mut self) -> Option<Message> {
        self.receiver.try_recv().or_else(|| self.backlog.pop_front())
    }

    fn handle(&mut self, message: Message) {
        match message {
            Message::Roll(direction) => self.roll(direction),
            Message::Tick => {
                self.engine.tick();
                if self.engine.is_rolling() {
                    self.repost(Message::Tick);
                }
            }
            Message::ToggleSensor => {
                let enabled = self.engine.toggle_sensor_enabled();
                debug!("Sensor {}", if enabled { "enabled" } else { "disabled" });
            }
            Message::Invalidate => {
                self.invalidate_pending = false;
                self.displays.view.invalidate();
            }
            Message::ReachedGoal => {
                self.displays.goals.set_text(&self.engine.goal_count().to_string());
                self.haptics.vibrate(self.config.goal_pulse_ms);
            }
            Message::ReachedWall => {
                self.haptics.vibrate(self.config.wall_pulse_ms);
            }
            Message::Solved { map_id, steps } => {
                info!("Map {} solved in {} steps", map_id, steps);
                match self.recorder.record_solve(map_id, steps) {
                    Ok(record) => debug!(
                        "Best for map {}: {} steps",
                        record.map_id, record.best_steps
                    ),
                    Err(e) => warn!("Failed to record solve of map {}: {}", map_id, e),
                }
            }
            Message::Restart => self.engine.restart(),
            Message::MapPrevious => self.engine.previous_map(),
            Message::MapNext => self.engine.next_map(),
            Message::LoadMap(map_id) => {
                if map_id < self.engine.catalogue().len() {
                    self.engine.load_map(map_id);
                } else {
                    warn!(
                        "Ignoring request for map {} ({} maps)",
                        map_id,
                        self.engine.catalogue().len()
                    );
                }
            }
            Message::Snapshot(reply) => {
                let snapshot = self.engine.capture_snapshot();
                if reply.send(snapshot).is_err() {
                    debug!("Snapshot requester went away");
                }
            }
            Message::Restore { snapshot, reply } => {
                let result = self.engine.restore(snapshot.as_ref());
                if let Err(e) = &result {
                    warn!("Restore stopped early: {}", e);
                }
                if reply.send(result).is_err() {
                    debug!("Restore requester went away");
                }
            }
            Message::Shutdown => {}
        }
        self.publish_events();
        self.replay_deferred_roll();
    }

    fn roll(&mut self, direction: Direction) {
        if !self.engine.accepts_commands() {
            // Latest command wins; repeating the in-flight heading is a no-op
            self.deferred_roll = Some(direction)
                .filter(|d| d.is_some() && *d != self.engine.ball().direction());
            return;
        }
        self.deferred_roll = None;

        match self.config.roll_mode {
            RollMode::Instant => {
                self.engine.request_roll(direction);
            }
            RollMode::Animated => {
                if self.engine.begin_roll(direction) {
                    self.repost(Message::Tick);
                }
            }
        }
    }

    /// Requeue a held command once the engine takes commands again.
    fn replay_deferred_roll(&mut self) {
        if !self.engine.accepts_commands() {
            return;
        }
        if let Some(direction) = self.deferred_roll.take() {
            debug!("Replaying held roll {:?}", direction);
            self.repost(Message::Roll(direction));
        }
    }

    /// Apply or repost everything the engine produced.
    fn publish_events(&mut self) {
        for event in self.engine.take_events() {
            match event {
                GameEvent::MapLoaded { map_id, name, goals_remaining } => {
                    info!("Loaded map {} ({}) with {} goals", map_id, name, goals_remaining);
                    self.displays.name.set_text(&name);
                    self.displays.goals.set_text(&goals_remaining.to_string());
                }
                GameEvent::StepCountChanged { steps } => {
                    self.displays.steps.set_text(&steps.to_string());
                }
                GameEvent::GoalsChanged { goals_remaining } => {
                    self.displays.goals.set_text(&goals_remaining.to_string());
                }
                GameEvent::ReachedGoal { .. } => self.repost(Message::ReachedGoal),
                GameEvent::ReachedWall { .. } => self.repost(Message::ReachedWall),
                GameEvent::Invalidate => {
                    if !self.invalidate_pending {
                        self.invalidate_pending = true;
                        self.repost(Message::Invalidate);
                    }
                }
                GameEvent::Solved { map_id, steps } => {
                    self.repost(Message::Solved { map_id, steps });
                }
            }
        }
    }

    fn repost(&mut self, message: Message) {
        match self.outbox.upgrade() {
            Some(sender) => {
                if let Err(e) = sender.post(message) {
                    debug!("Dropping outcome: {}", e);
                }
            }
            None => self.backlog.push_back(message),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
