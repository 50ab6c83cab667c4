//! Game Session Controller
//!
//! Owns the active maze, the ball and the session counters, and runs the
//! session state machine:
//!
//! ```text
//! load_map ──► Idle ◄──► Rolling
//!               │  last goal consumed
//!               ▼
//!             Solved ── restart / navigate ──► Idle
//! ```
//!
//! All operations are synchronous. Outcomes are queued as [`GameEvent`]s
//! and drained with [`GameEngine::take_events`].

use serde::{Serialize, Deserialize};

use crate::core::grid::{CellCoord, Direction};
use crate::core::hash::StateHash;
use crate::game::ball::{Ball, RollStep};
use crate::game::design::{MapCatalogue, MapDesign};
use crate::game::events::GameEvent;
use crate::game::maze::Maze;
use crate::game::snapshot::{session_hash, SnapshotError, StateSnapshot};

/// Observable session phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum SessionPhase {
    /// Map loaded, ball at rest.
    #[default]
    Idle = 0,
    /// A roll is in flight.
    Rolling = 1,
    /// Every goal on the map has been consumed.
    Solved = 2,
}

/// Session controller.
#[derive(Clone, Debug)]
pub struct GameEngine {
    catalogue: MapCatalogue,
    maze: Maze,
    ball: Ball,
    current_map: usize,
    step_count: u32,
    sensor_enabled: bool,
    /// Goals left when the in-flight roll started.
    goals_at_roll_start: u32,
    events: Vec<GameEvent>,
}

impl GameEngine {
    /// Create a session on map 0 of `catalogue`.
    ///
    /// # Panics
    ///
    /// If the catalogue is empty.
    pub fn new(catalogue: MapCatalogue) -> Self {
        let first = match catalogue.get(0) {
            Some(design) => design,
            None => panic!("map catalogue must not be empty"),
        };
        let maze = Maze::new(first);
        let ball = Ball::new(first.spawn());
        let goals = maze.goal_count();

        let mut engine = Self {
            catalogue,
            maze,
            ball,
            current_map: 0,
            step_count: 0,
            sensor_enabled: true,
            goals_at_roll_start: goals,
            events: Vec::new(),
        };
        engine.load_map(0);
        engine
    }

    // ===== MAP LIFECYCLE =====

    /// Load map `map_id`, resetting the maze, the ball and the step count.
    ///
    /// # Panics
    ///
    /// If `map_id` is not in the catalogue.
    pub fn load_map(&mut self, map_id: usize) {
        assert!(
            map_id < self.catalogue.len(),
            "map id {} out of range ({} maps)",
            map_id,
            self.catalogue.len()
        );

        self.halt_roll();
        self.current_map = map_id;
        let design = self.design();
        let spawn = design.spawn();
        let name = design.name().to_string();
        let maze = Maze::new(design);

        self.maze = maze;
        self.ball.reset(spawn);
        self.step_count = 0;
        self.goals_at_roll_start = self.maze.goal_count();

        self.push_event(GameEvent::MapLoaded {
            map_id,
            name,
            goals_remaining: self.maze.goal_count(),
        });
        self.push_event(GameEvent::StepCountChanged { steps: 0 });
        self.push_event(GameEvent::Invalidate);
    }

    /// Reload the current map.
    pub fn restart(&mut self) {
        self.load_map(self.current_map);
    }

    /// Load the map `offset` positions away, wrapping at both ends.
    pub fn navigate_map(&mut self, offset: i32) {
        let count = self.catalogue.len() as i64;
        let target = (self.current_map as i64 + offset as i64).rem_euclid(count);
        self.load_map(target as usize);
    }

    /// Load the previous map.
    pub fn previous_map(&mut self) {
        self.navigate_map(-1);
    }

    /// Load the next map.
    pub fn next_map(&mut self) {
        self.navigate_map(1);
    }

    // ===== ROLLING =====

    /// Roll the ball to completion.
    ///
    /// Ignored while the sensor is disabled or a roll is in flight. Returns
    /// true iff the ball moved.
    pub fn request_roll(&mut self, direction: Direction) -> bool {
        if !self.accepts_commands() {
            return false;
        }
        self.goals_at_roll_start = self.maze.goal_count();

        let mut events = Vec::new();
        if !self.ball.roll(direction, &mut self.maze, &mut events) {
            self.events.append(&mut events);
            return false;
        }
        self.events.append(&mut events);
        self.push_event(GameEvent::Invalidate);
        self.finish_roll();
        true
    }

    /// Start a roll to be advanced by [`tick`](Self::tick).
    ///
    /// Same gating as [`request_roll`](Self::request_roll).
    pub fn begin_roll(&mut self, direction: Direction) -> bool {
        if !self.accepts_commands() {
            return false;
        }
        self.goals_at_roll_start = self.maze.goal_count();
        self.ball.start(direction)
    }

    /// Advance an in-flight roll by one cell.
    pub fn tick(&mut self) -> RollStep {
        let mut events = Vec::new();
        let step = self.ball.step(&mut self.maze, &mut events);
        self.events.append(&mut events);

        match step {
            RollStep::Moved { .. } => self.push_event(GameEvent::Invalidate),
            RollStep::Blocked { .. } => {
                if self.ball.moved() {
                    self.finish_roll();
                }
            }
            RollStep::Idle => {}
        }
        step
    }

    /// Step count and solve bookkeeping for a roll that moved the ball.
    fn finish_roll(&mut self) {
        self.step_count += 1;
        self.push_event(GameEvent::StepCountChanged { steps: self.step_count });

        if self.maze.is_solved() && self.goals_at_roll_start > 0 {
            self.push_event(GameEvent::Solved {
                map_id: self.current_map,
                steps: self.step_count,
            });
        }
        self.goals_at_roll_start = self.maze.goal_count();
    }

    /// Stop an in-flight roll where the ball is. A roll that already moved
    /// the ball still counts, so a goal it consumed can complete the map.
    fn halt_roll(&mut self) {
        if !self.ball.is_rolling() {
            return;
        }
        self.ball.stop();
        if self.ball.moved() {
            self.finish_roll();
        }
    }

    /// Check if a roll command would be acted on now.
    pub fn accepts_commands(&self) -> bool {
        self.sensor_enabled && !self.ball.is_rolling()
    }

    // ===== SENSOR =====

    /// Flip the sensor gate. Returns the new value.
    pub fn toggle_sensor_enabled(&mut self) -> bool {
        self.sensor_enabled = !self.sensor_enabled;
        self.sensor_enabled
    }

    /// Check if roll commands are accepted.
    pub fn sensor_enabled(&self) -> bool {
        self.sensor_enabled
    }

    // ===== SNAPSHOTS =====

    /// Capture the session. Halts an in-flight roll first.
    pub fn capture_snapshot(&mut self) -> StateSnapshot {
        self.halt_roll();
        StateSnapshot::new(
            self.current_map,
            self.maze.goals_column_major(),
            self.step_count,
            self.ball.position(),
            self.sensor_enabled,
        )
    }

    /// Restore a captured session.
    ///
    /// Field groups apply in order: map id, goal grid, ball position, then
    /// step count and sensor flag. The first missing or invalid group stops
    /// the restore with an error; earlier groups stay applied. `None` keeps
    /// the current state and only refreshes the displays.
    pub fn restore(&mut self, snapshot: Option<&StateSnapshot>) -> Result<(), SnapshotError> {
        let result = match snapshot {
            Some(snapshot) => self.apply_snapshot(snapshot),
            None => Ok(()),
        };

        self.goals_at_roll_start = self.maze.goal_count();
        self.push_event(GameEvent::GoalsChanged { goals_remaining: self.maze.goal_count() });
        self.push_event(GameEvent::StepCountChanged { steps: self.step_count });
        result
    }

    fn apply_snapshot(&mut self, snapshot: &StateSnapshot) -> Result<(), SnapshotError> {
        let map_id = snapshot.map_id.ok_or(SnapshotError::MissingField("map.id"))?;
        if map_id >= self.catalogue.len() {
            return Err(SnapshotError::InvalidMapId {
                map_id,
                map_count: self.catalogue.len(),
            });
        }
        self.load_map(map_id);

        let goals = snapshot.goals.as_deref().ok_or(SnapshotError::MissingField("map.goals"))?;
        if !self.maze.overlay_goals_column_major(goals) {
            return Err(SnapshotError::GoalGridLength {
                expected: (self.maze.size_x() * self.maze.size_y()) as usize,
                actual: goals.len(),
            });
        }

        let x = snapshot.ball_x.ok_or(SnapshotError::MissingField("ball.x"))?;
        let y = snapshot.ball_y.ok_or(SnapshotError::MissingField("ball.y"))?;
        let cell = CellCoord::new(x, y);
        if !self.maze.contains(cell) {
            return Err(SnapshotError::BallOutOfBounds {
                cell,
                size_x: self.maze.size_x(),
                size_y: self.maze.size_y(),
            });
        }
        self.ball.set_position(cell);
        self.push_event(GameEvent::Invalidate);

        let steps = snapshot.step_count.ok_or(SnapshotError::MissingField("stepcount"))?;
        let sensor = snapshot.sensor_enabled.ok_or(SnapshotError::MissingField("sensorenabled"))?;
        self.step_count = steps;
        self.sensor_enabled = sensor;
        Ok(())
    }

    // ===== ACCESSORS =====

    /// Current session phase.
    pub fn phase(&self) -> SessionPhase {
        if self.ball.is_rolling() {
            SessionPhase::Rolling
        } else if self.maze.is_solved() {
            SessionPhase::Solved
        } else {
            SessionPhase::Idle
        }
    }

    /// Active map index.
    pub fn current_map(&self) -> usize {
        self.current_map
    }

    /// Design of the active map.
    pub fn design(&self) -> &MapDesign {
        // load_map only accepts ids inside the catalogue
        match self.catalogue.get(self.current_map) {
            Some(design) => design,
            None => unreachable!("current map {} not in catalogue", self.current_map),
        }
    }

    /// Display name of the active map.
    pub fn map_name(&self) -> &str {
        self.design().name()
    }

    /// Completed, position-changing rolls since the map was loaded.
    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    /// Remaining goals.
    pub fn goal_count(&self) -> u32 {
        self.maze.goal_count()
    }

    /// Check if a roll is in flight.
    pub fn is_rolling(&self) -> bool {
        self.ball.is_rolling()
    }

    /// The ball.
    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    /// The live maze.
    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    /// The map catalogue.
    pub fn catalogue(&self) -> &MapCatalogue {
        &self.catalogue
    }

    /// Hash of the restorable session state.
    pub fn compute_hash(&self) -> StateHash {
        session_hash(
            self.current_map,
            self.step_count,
            &self.maze.goals_column_major(),
            self.ball.position(),
            self.sensor_enabled,
        )
    }

    // ===== EVENTS =====

    /// Queue an event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain queued events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn catalogue() -> MapCatalogue {
        let maps = [
            ("open", vec!["+-+-+-+", "|o   x|", "+ + + +", "|     |", "+ + + +", "|     |", "+-+-+-+"]),
            ("pair", vec!["+-+-+-+", "|o|  x|", "+ + + +", "|x    |", "+-+-+-+"]),
            ("empty", vec!["+-+-+", "|o  |", "+-+-+"]),
        ];
        let designs = maps
            .iter()
            .map(|(name, rows)| MapDesign::from_ascii(*name, rows).unwrap())
            .collect();
        MapCatalogue::new(designs).unwrap()
    }

    fn solved_events(events: &[GameEvent]) -> Vec<(usize, u32)> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Solved { map_id, steps } => Some((*map_id, *steps)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_new_loads_first_map() {
        let mut engine = GameEngine::new(catalogue());
        assert_eq!(engine.current_map(), 0);
        assert_eq!(engine.step_count(), 0);
        assert!(engine.sensor_enabled());
        assert_eq!(engine.ball().position(), CellCoord::new(0, 0));
        assert_eq!(engine.phase(), SessionPhase::Idle);

        let events = engine.take_events();
        assert_eq!(
            events[0],
            GameEvent::MapLoaded { map_id: 0, name: "open".into(), goals_remaining: 1 }
        );
        assert!(engine.take_events().is_empty());
    }

    #[test]
    fn test_single_roll_solves() {
        let mut engine = GameEngine::new(catalogue());
        engine.take_events();

        assert!(engine.request_roll(Direction::Right));
        assert_eq!(engine.ball().position(), CellCoord::new(2, 0));
        assert_eq!(engine.goal_count(), 0);
        assert_eq!(engine.step_count(), 1);
        assert_eq!(engine.phase(), SessionPhase::Solved);

        let events = engine.take_events();
        assert_eq!(solved_events(&events), vec![(0, 1)]);
        assert!(events.contains(&GameEvent::StepCountChanged { steps: 1 }));

        // Solve fires once even if play continues
        engine.request_roll(Direction::Down);
        engine.request_roll(Direction::Up);
        assert!(solved_events(&engine.take_events()).is_empty());
    }

    #[test]
    fn test_blocked_roll_does_not_count() {
        let mut engine = GameEngine::new(catalogue());
        engine.take_events();

        assert!(!engine.request_roll(Direction::Up));
        assert_eq!(engine.step_count(), 0);
        assert_eq!(
            engine.take_events(),
            vec![GameEvent::ReachedWall { cell: CellCoord::new(0, 0), direction: Direction::Up }]
        );
    }

    #[test]
    fn test_sensor_gate() {
        let mut engine = GameEngine::new(catalogue());
        engine.take_events();

        assert!(!engine.toggle_sensor_enabled());
        assert!(!engine.request_roll(Direction::Right));
        assert!(!engine.begin_roll(Direction::Right));
        assert_eq!(engine.ball().position(), CellCoord::new(0, 0));
        assert!(engine.take_events().is_empty());

        assert!(engine.toggle_sensor_enabled());
        assert!(engine.request_roll(Direction::Right));
    }

    #[test]
    fn test_command_ignored_while_rolling() {
        let mut engine = GameEngine::new(catalogue());
        engine.take_events();

        assert!(engine.begin_roll(Direction::Down));
        assert_eq!(engine.phase(), SessionPhase::Rolling);
        let hash = engine.compute_hash();

        assert!(!engine.request_roll(Direction::Right));
        assert!(!engine.begin_roll(Direction::Right));
        assert_eq!(engine.compute_hash(), hash);
        assert!(engine.take_events().is_empty());
    }

    #[test]
    fn test_tick_matches_instant_roll() {
        let mut animated = GameEngine::new(catalogue());
        let mut instant = GameEngine::new(catalogue());

        assert!(animated.begin_roll(Direction::Right));
        let mut ticks = 0;
        while animated.is_rolling() {
            animated.tick();
            ticks += 1;
        }
        instant.request_roll(Direction::Right);

        assert_eq!(ticks, 3);
        assert_eq!(animated.compute_hash(), instant.compute_hash());
        assert_eq!(solved_events(&animated.take_events()), vec![(0, 1)]);
        assert_eq!(animated.tick(), RollStep::Idle);
    }

    #[test]
    fn test_blocked_tick_roll_does_not_count() {
        let mut engine = GameEngine::new(catalogue());
        assert!(engine.begin_roll(Direction::Left));
        assert_eq!(engine.tick(), RollStep::Blocked { at: CellCoord::new(0, 0) });
        assert_eq!(engine.step_count(), 0);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut engine = GameEngine::new(catalogue());

        engine.previous_map();
        assert_eq!(engine.current_map(), 2);
        engine.next_map();
        assert_eq!(engine.current_map(), 0);
        engine.navigate_map(1);
        engine.navigate_map(1);
        engine.navigate_map(1);
        assert_eq!(engine.current_map(), 0);
        engine.navigate_map(-4);
        assert_eq!(engine.current_map(), 2);
    }

    #[test]
    fn test_restart_resets_progress() {
        let mut engine = GameEngine::new(catalogue());
        engine.request_roll(Direction::Right);
        engine.restart();

        assert_eq!(engine.current_map(), 0);
        assert_eq!(engine.step_count(), 0);
        assert_eq!(engine.goal_count(), 1);
        assert_eq!(engine.ball().position(), CellCoord::new(0, 0));
    }

    #[test]
    fn test_zero_goal_map_never_records() {
        let mut engine = GameEngine::new(catalogue());
        engine.load_map(2);
        assert_eq!(engine.phase(), SessionPhase::Solved);

        assert!(engine.request_roll(Direction::Right));
        assert!(solved_events(&engine.take_events()).is_empty());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_load_invalid_map_panics() {
        let mut engine = GameEngine::new(catalogue());
        engine.load_map(3);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut engine = GameEngine::new(catalogue());
        engine.load_map(1);
        engine.request_roll(Direction::Down);
        engine.toggle_sensor_enabled();
        let hash = engine.compute_hash();
        let snapshot = engine.capture_snapshot();
        assert_eq!(snapshot.state_hash(), hash);

        let mut restored = GameEngine::new(catalogue());
        restored.restore(Some(&snapshot)).unwrap();

        assert_eq!(restored.current_map(), 1);
        assert_eq!(restored.step_count(), engine.step_count());
        assert_eq!(restored.ball().position(), engine.ball().position());
        assert_eq!(restored.goal_count(), engine.goal_count());
        assert!(!restored.sensor_enabled());
        assert_eq!(restored.compute_hash(), hash);
    }

    #[test]
    fn test_snapshot_stops_rolling_ball() {
        let mut engine = GameEngine::new(catalogue());
        engine.begin_roll(Direction::Right);
        engine.tick();
        let snapshot = engine.capture_snapshot();
        assert!(!engine.is_rolling());
        assert_eq!(snapshot.ball(), Some(CellCoord::new(1, 0)));
        assert_eq!(snapshot.step_count, Some(1));
    }

    #[test]
    fn test_snapshot_mid_roll_after_last_goal_solves_once() {
        let mut engine = GameEngine::new(catalogue());
        engine.take_events();

        assert!(engine.begin_roll(Direction::Right));
        engine.tick();
        assert!(matches!(engine.tick(), RollStep::Moved { goal_consumed: true, .. }));
        assert!(engine.is_rolling());

        let snapshot = engine.capture_snapshot();
        assert_eq!(snapshot.step_count, Some(1));
        assert_eq!(engine.phase(), SessionPhase::Solved);

        engine.request_roll(Direction::Down);
        engine.request_roll(Direction::Left);
        assert_eq!(solved_events(&engine.take_events()), vec![(0, 1)]);
    }

    #[test]
    fn test_restart_mid_roll_after_last_goal_solves_once() {
        let mut engine = GameEngine::new(catalogue());
        engine.take_events();

        engine.begin_roll(Direction::Right);
        engine.tick();
        engine.tick();
        engine.restart();

        assert!(!engine.is_rolling());
        assert_eq!(engine.goal_count(), 1);
        assert_eq!(engine.step_count(), 0);
        assert_eq!(solved_events(&engine.take_events()), vec![(0, 1)]);
    }

    #[test]
    fn test_halted_roll_that_never_moved_does_not_count() {
        let mut engine = GameEngine::new(catalogue());
        engine.begin_roll(Direction::Down);
        let snapshot = engine.capture_snapshot();
        assert_eq!(snapshot.step_count, Some(0));
        assert!(engine.accepts_commands());
    }

    #[test]
    fn test_restore_none_keeps_state() {
        let mut engine = GameEngine::new(catalogue());
        let hash = engine.compute_hash();
        engine.take_events();

        engine.restore(None).unwrap();
        assert_eq!(engine.compute_hash(), hash);
        assert_eq!(
            engine.take_events(),
            vec![
                GameEvent::GoalsChanged { goals_remaining: 1 },
                GameEvent::StepCountChanged { steps: 0 },
            ]
        );
    }

    #[test]
    fn test_restore_stops_at_missing_field() {
        let mut engine = GameEngine::new(catalogue());
        engine.request_roll(Direction::Right);

        let partial = StateSnapshot { map_id: Some(1), ..Default::default() };
        assert_eq!(
            engine.restore(Some(&partial)),
            Err(SnapshotError::MissingField("map.goals"))
        );
        // Map group applied, nothing after it
        assert_eq!(engine.current_map(), 1);
        assert_eq!(engine.step_count(), 0);
        assert_eq!(engine.goal_count(), 2);

        let mut no_map = StateSnapshot::new(0, vec![0; 9], 4, CellCoord::new(0, 0), true);
        no_map.map_id = None;
        assert_eq!(engine.restore(Some(&no_map)), Err(SnapshotError::MissingField("map.id")));
        assert_eq!(engine.current_map(), 1);
    }

    #[test]
    fn test_restore_rejects_bad_values() {
        let mut engine = GameEngine::new(catalogue());

        let bad_map = StateSnapshot::new(9, vec![], 0, CellCoord::new(0, 0), true);
        assert_eq!(
            engine.restore(Some(&bad_map)),
            Err(SnapshotError::InvalidMapId { map_id: 9, map_count: 3 })
        );

        let bad_grid = StateSnapshot::new(0, vec![0; 4], 0, CellCoord::new(0, 0), true);
        assert_eq!(
            engine.restore(Some(&bad_grid)),
            Err(SnapshotError::GoalGridLength { expected: 9, actual: 4 })
        );

        let bad_ball = StateSnapshot::new(0, vec![0; 9], 2, CellCoord::new(3, 0), true);
        assert!(matches!(
            engine.restore(Some(&bad_ball)),
            Err(SnapshotError::BallOutOfBounds { .. })
        ));
        assert_eq!(engine.ball().position(), CellCoord::new(0, 0));
        assert_eq!(engine.step_count(), 0);
        // Goal overlay from the failed restore stays applied
        assert_eq!(engine.goal_count(), 0);
    }

    fn direction_strategy() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    proptest! {
        #[test]
        fn prop_step_count_tracks_movement(
            dirs in proptest::collection::vec(direction_strategy(), 1..30),
            map in 0usize..3,
        ) {
            let mut engine = GameEngine::new(catalogue());
            engine.load_map(map);
            let mut expected = 0u32;

            for dir in dirs {
                let before = engine.ball().position();
                let moved = engine.request_roll(dir);
                prop_assert_eq!(moved, engine.ball().position() != before);
                if moved {
                    expected += 1;
                }
                prop_assert_eq!(engine.step_count(), expected);
            }

            let solves = solved_events(&engine.take_events());
            prop_assert!(solves.len() <= 1);
            if let Some((map_id, _)) = solves.first() {
                prop_assert_eq!(*map_id, map);
                prop_assert_eq!(engine.goal_count(), 0);
            }
        }
    }
}
