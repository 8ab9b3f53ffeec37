//! Phase state machine
//!
//! Owns the workout state and applies the transition table:
//!
//! | From      | Condition                         | To        |
//! |-----------|-----------------------------------|-----------|
//! | GetReady  | always                            | Work      |
//! | Work      | exercise < exercises per round    | Rest      |
//! | Work      | last exercise, round < rounds     | RoundRest |
//! | Work      | last exercise of last round       | Finished  |
//! | Rest      | always (exercise += 1)            | Work      |
//! | RoundRest | always (round += 1, exercise = 1) | Work      |
//!
//! A tick decrements the countdown and, when it reaches zero, applies the
//! table in the same tick. Zero-length rest phases are entered and left within
//! the tick that ended the previous phase, so a workout takes exactly
//! [`WorkoutConfig::total_seconds`] ticks.

use tracing::debug;

use crate::{
    config::{WorkoutConfig, GET_READY_SECONDS},
    error::WorkoutError,
    utils::format_clock,
};

use super::{
    phase::countdown_word,
    DisplayUpdate, Phase, WorkoutEvent, WorkoutState,
};

#[derive(Debug, Clone, Default)]
pub struct PhaseMachine {
    config: Option<WorkoutConfig>,
    state: WorkoutState,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WorkoutState {
        &self.state
    }

    /// Configuration of the current or most recently finished workout
    pub fn config(&self) -> Option<&WorkoutConfig> {
        self.config.as_ref()
    }

    /// Begin a workout in the GetReady phase.
    ///
    /// Rejected with `AlreadyRunning` while another workout is counting down and
    /// with `InvalidConfig` for a bad configuration; neither mutates state.
    pub fn start(&mut self, config: WorkoutConfig) -> Result<Vec<WorkoutEvent>, WorkoutError> {
        if self.state.is_active() {
            return Err(WorkoutError::AlreadyRunning);
        }
        config.validate()?;

        self.config = Some(config);
        self.state = WorkoutState {
            phase: Phase::GetReady,
            time_left_seconds: GET_READY_SECONDS,
            ..WorkoutState::idle()
        };
        debug!(?config, "workout started");

        Ok(vec![WorkoutEvent::PhaseEntered {
            phase: Phase::GetReady,
            display: self.render(&config),
        }])
    }

    /// Advance the countdown by one second.
    ///
    /// No-op while paused or when no workout is counting down. Returns
    /// `Internal` without touching state if the counters are out of bounds.
    pub fn tick(&mut self) -> Result<Vec<WorkoutEvent>, WorkoutError> {
        if self.state.paused || !self.state.is_active() {
            return Ok(Vec::new());
        }
        let config = self
            .config
            .ok_or_else(|| WorkoutError::Internal("active workout has no configuration".into()))?;
        self.check_bounds(&config)?;

        let mut events = Vec::new();
        if self.state.time_left_seconds > 0 {
            self.state.time_left_seconds -= 1;
            self.state.elapsed_seconds += 1;

            let left = self.state.time_left_seconds;
            if left > 0 {
                if self.state.phase == Phase::Work && left == config.work_seconds / 2 {
                    events.push(WorkoutEvent::Halfway);
                }
                if countdown_word(left).is_some() {
                    events.push(WorkoutEvent::Countdown { seconds: left });
                }
                events.push(WorkoutEvent::Tick {
                    display: self.render(&config),
                });
                return Ok(events);
            }
        }

        self.advance(&config, &mut events)?;
        Ok(events)
    }

    /// Freeze or unfreeze the countdown. Phase and remaining time are untouched.
    pub fn set_paused(&mut self, paused: bool) -> Result<Vec<WorkoutEvent>, WorkoutError> {
        if !self.state.is_active() {
            return Err(WorkoutError::NotRunning);
        }
        if self.state.paused == paused {
            return Ok(Vec::new());
        }

        self.state.paused = paused;
        Ok(vec![if paused {
            WorkoutEvent::Paused
        } else {
            WorkoutEvent::Resumed
        }])
    }

    /// Abort the active workout and return to Idle
    pub fn cancel(&mut self) -> Result<(), WorkoutError> {
        if !self.state.is_active() {
            return Err(WorkoutError::NotRunning);
        }
        debug!(phase = %self.state.phase, "workout cancelled");
        self.state = WorkoutState::idle();
        self.config = None;
        Ok(())
    }

    /// Current display, if a workout has been loaded
    pub fn display(&self) -> Option<DisplayUpdate> {
        self.config.map(|config| self.render(&config))
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut WorkoutState {
        &mut self.state
    }

    fn advance(
        &mut self,
        config: &WorkoutConfig,
        events: &mut Vec<WorkoutEvent>,
    ) -> Result<(), WorkoutError> {
        loop {
            let phase = self.transition(config)?;
            debug!(
                %phase,
                round = self.state.current_round,
                exercise = self.state.current_exercise,
                "entered phase"
            );
            events.push(WorkoutEvent::PhaseEntered {
                phase,
                display: self.render(config),
            });

            if phase == Phase::Finished {
                events.push(WorkoutEvent::WorkoutCompleted {
                    elapsed_seconds: self.state.elapsed_seconds,
                    rounds: config.rounds,
                    exercises_per_round: config.exercises_per_round,
                });
                return Ok(());
            }
            if self.state.time_left_seconds > 0 {
                return Ok(());
            }
            debug!(%phase, "zero-length phase, moving on");
        }
    }

    fn transition(&mut self, config: &WorkoutConfig) -> Result<Phase, WorkoutError> {
        let state = &mut self.state;
        let next = match state.phase {
            Phase::GetReady => Phase::Work,
            Phase::Work if state.current_exercise < config.exercises_per_round => Phase::Rest,
            Phase::Work if state.current_round < config.rounds => Phase::RoundRest,
            Phase::Work => Phase::Finished,
            Phase::Rest => {
                state.current_exercise += 1;
                Phase::Work
            }
            Phase::RoundRest => {
                state.current_round += 1;
                state.current_exercise = 1;
                Phase::Work
            }
            Phase::Idle | Phase::Finished => {
                return Err(WorkoutError::Internal(format!(
                    "no transition out of {}",
                    state.phase
                )));
            }
        };

        state.phase = next;
        state.time_left_seconds = phase_duration(next, config);
        Ok(next)
    }

    fn check_bounds(&self, config: &WorkoutConfig) -> Result<(), WorkoutError> {
        let state = &self.state;
        if !(1..=config.rounds).contains(&state.current_round) {
            return Err(WorkoutError::Internal(format!(
                "round {} outside 1..={}",
                state.current_round, config.rounds
            )));
        }
        if !(1..=config.exercises_per_round).contains(&state.current_exercise) {
            return Err(WorkoutError::Internal(format!(
                "exercise {} outside 1..={}",
                state.current_exercise, config.exercises_per_round
            )));
        }
        let limit = phase_duration(state.phase, config);
        if state.time_left_seconds > limit {
            return Err(WorkoutError::Internal(format!(
                "{}s left exceeds {} duration of {}s",
                state.time_left_seconds, state.phase, limit
            )));
        }
        Ok(())
    }

    fn render(&self, config: &WorkoutConfig) -> DisplayUpdate {
        let state = &self.state;
        let status = match state.phase {
            Phase::Idle => "READY".to_string(),
            Phase::GetReady => "GET READY".to_string(),
            Phase::Work => format!(
                "WORK {}/{}",
                state.current_exercise, config.exercises_per_round
            ),
            Phase::Rest => "REST".to_string(),
            Phase::RoundRest => "ROUND BREAK".to_string(),
            Phase::Finished => "FINISHED".to_string(),
        };

        DisplayUpdate {
            status,
            color: state.phase.color().to_string(),
            round: format!("{}/{}", state.current_round, config.rounds),
            exercise: format!("{}/{}", state.current_exercise, config.exercises_per_round),
            time_left: format_clock(state.time_left_seconds),
            next_label: self.next_label(config).to_string(),
        }
    }

    fn next_label(&self, config: &WorkoutConfig) -> &'static str {
        let state = &self.state;
        match state.phase {
            Phase::GetReady | Phase::Rest => "Next: Work",
            Phase::Work if state.current_exercise < config.exercises_per_round => {
                if config.rest_seconds > 0 { "Next: Rest" } else { "Next: Work" }
            }
            Phase::Work if state.current_round < config.rounds => {
                if config.round_rest_seconds > 0 {
                    "Next: Round Break"
                } else {
                    "Next: New Round"
                }
            }
            Phase::Work => "Next: Finish",
            Phase::RoundRest => "Next: New Round",
            Phase::Idle | Phase::Finished => "",
        }
    }
}

/// Configured length of a phase in seconds
pub fn phase_duration(phase: Phase, config: &WorkoutConfig) -> u32 {
    match phase {
        Phase::GetReady => GET_READY_SECONDS,
        Phase::Work => config.work_seconds,
        Phase::Rest => config.rest_seconds,
        Phase::RoundRest => config.round_rest_seconds,
        Phase::Idle | Phase::Finished => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_config() -> WorkoutConfig {
        WorkoutConfig::new(2, 20, 10, 2, 60).unwrap()
    }

    /// Ticks until Finished, returning the tick count and every event emitted.
    fn run_to_end(machine: &mut PhaseMachine) -> (u64, Vec<WorkoutEvent>) {
        let mut ticks = 0;
        let mut events = Vec::new();
        while !machine.state().is_finished() {
            events.extend(machine.tick().unwrap());
            ticks += 1;
            assert!(ticks < 1_000_000, "workout never finished");
        }
        (ticks, events)
    }

    fn entered(events: &[WorkoutEvent]) -> Vec<Phase> {
        events
            .iter()
            .filter_map(|event| match event {
                WorkoutEvent::PhaseEntered { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn example_workout_follows_documented_sequence() {
        let mut machine = PhaseMachine::new();
        let start_events = machine.start(example_config()).unwrap();
        assert_eq!(entered(&start_events), vec![Phase::GetReady]);
        assert_eq!(machine.state().time_left_seconds, 5);

        let mut sequence = Vec::new();
        let mut ticks = 0u64;
        while !machine.state().is_finished() {
            for event in machine.tick().unwrap() {
                if let WorkoutEvent::PhaseEntered { phase, .. } = event {
                    sequence.push((
                        ticks + 1,
                        phase,
                        machine.state().current_round,
                        machine.state().current_exercise,
                    ));
                }
            }
            ticks += 1;
        }

        assert_eq!(
            sequence,
            vec![
                (5, Phase::Work, 1, 1),
                (25, Phase::Rest, 1, 1),
                (35, Phase::Work, 1, 2),
                (55, Phase::RoundRest, 1, 2),
                (115, Phase::Work, 2, 1),
                (135, Phase::Rest, 2, 1),
                (145, Phase::Work, 2, 2),
                (165, Phase::Finished, 2, 2),
            ]
        );
        assert_eq!(ticks, 165);
        assert_eq!(machine.state().elapsed_seconds, 165);
    }

    #[test]
    fn finishes_after_exactly_total_seconds_ticks() {
        let configs = [
            WorkoutConfig::new(1, 1, 0, 1, 0).unwrap(),
            WorkoutConfig::new(3, 4, 2, 2, 5).unwrap(),
            WorkoutConfig::new(2, 3, 0, 3, 0).unwrap(),
            WorkoutConfig::new(4, 7, 3, 1, 9).unwrap(),
            WorkoutConfig::new(1, 2, 5, 4, 1).unwrap(),
            WorkoutConfig::new(8, 20, 10, 4, 60).unwrap(),
        ];

        for config in configs {
            let mut machine = PhaseMachine::new();
            machine.start(config).unwrap();

            let total = config.total_seconds();
            for _ in 0..total - 1 {
                machine.tick().unwrap();
                assert!(!machine.state().is_finished(), "finished early for {config:?}");
            }
            let events = machine.tick().unwrap();
            assert!(machine.state().is_finished(), "not finished for {config:?}");

            let completed: Vec<_> = events
                .iter()
                .filter(|e| matches!(e, WorkoutEvent::WorkoutCompleted { .. }))
                .collect();
            assert_eq!(
                completed,
                vec![&WorkoutEvent::WorkoutCompleted {
                    elapsed_seconds: total,
                    rounds: config.rounds,
                    exercises_per_round: config.exercises_per_round,
                }]
            );
        }
    }

    #[test]
    fn counters_stay_in_bounds_and_never_decrease_within_a_round() {
        let config = WorkoutConfig::new(3, 2, 1, 3, 2).unwrap();
        let mut machine = PhaseMachine::new();
        machine.start(config).unwrap();

        let mut last_round = 1;
        let mut last_position = (1, 1);
        let mut work_phases = 0;
        while !machine.state().is_finished() {
            for event in machine.tick().unwrap() {
                if let WorkoutEvent::PhaseEntered { phase: Phase::Work, .. } = event {
                    work_phases += 1;
                }
            }
            let state = machine.state();
            assert!((1..=config.rounds).contains(&state.current_round));
            assert!((1..=config.exercises_per_round).contains(&state.current_exercise));
            assert!(state.current_round >= last_round);
            let position = (state.current_round, state.current_exercise);
            assert!(position >= last_position, "{position:?} went back from {last_position:?}");
            last_round = state.current_round;
            last_position = position;
        }
        assert_eq!(work_phases, 9);
        assert_eq!(last_position, (3, 3));
    }

    #[test]
    fn zero_length_rests_are_entered_and_left_in_one_tick() {
        let mut machine = PhaseMachine::new();
        machine.start(WorkoutConfig::new(2, 3, 0, 2, 0).unwrap()).unwrap();
        let (ticks, events) = run_to_end(&mut machine);

        assert_eq!(ticks, 5 + 12);
        assert_eq!(
            entered(&events),
            vec![
                Phase::Work,
                Phase::Rest,
                Phase::Work,
                Phase::RoundRest,
                Phase::Work,
                Phase::Rest,
                Phase::Work,
                Phase::Finished,
            ]
        );

        let spoken: Vec<_> = events.iter().filter_map(WorkoutEvent::announcement).collect();
        assert_eq!(spoken.iter().filter(|text| **text == "Rest").count(), 2);
        assert_eq!(spoken.iter().filter(|text| **text == "End of round").count(), 1);
    }

    #[test]
    fn zero_length_rest_shares_the_tick_that_ends_work() {
        let mut machine = PhaseMachine::new();
        machine.start(WorkoutConfig::new(2, 3, 0, 1, 0).unwrap()).unwrap();
        for _ in 0..7 {
            machine.tick().unwrap();
        }
        assert_eq!(machine.state().phase, Phase::Work);
        assert_eq!(machine.state().time_left_seconds, 1);

        let events = machine.tick().unwrap();
        assert_eq!(entered(&events), vec![Phase::Rest, Phase::Work]);
        let state = machine.state();
        assert_eq!(state.phase, Phase::Work);
        assert_eq!(state.current_exercise, 2);
        assert_eq!(state.time_left_seconds, 3);
        assert_eq!(state.elapsed_seconds, 8);
    }

    #[test]
    fn paused_ticks_change_nothing() {
        let mut machine = PhaseMachine::new();
        machine.start(example_config()).unwrap();
        for _ in 0..12 {
            machine.tick().unwrap();
        }
        let before = machine.state().clone();
        assert_eq!(before.phase, Phase::Work);
        assert_eq!(before.time_left_seconds, 13);

        assert_eq!(machine.set_paused(true).unwrap(), vec![WorkoutEvent::Paused]);
        for _ in 0..50 {
            assert!(machine.tick().unwrap().is_empty());
        }
        let frozen = machine.state();
        assert_eq!(frozen.phase, before.phase);
        assert_eq!(frozen.time_left_seconds, before.time_left_seconds);
        assert_eq!(frozen.elapsed_seconds, before.elapsed_seconds);
        assert_eq!(frozen.control_label(), "Resume");

        assert_eq!(machine.set_paused(false).unwrap(), vec![WorkoutEvent::Resumed]);
        machine.tick().unwrap();
        assert_eq!(machine.state().time_left_seconds, 12);

        let (ticks, _) = run_to_end(&mut machine);
        assert_eq!(13 + ticks, 165);
        assert_eq!(machine.state().elapsed_seconds, 165);
    }

    #[test]
    fn repeated_pause_is_silent() {
        let mut machine = PhaseMachine::new();
        machine.start(example_config()).unwrap();
        machine.set_paused(true).unwrap();
        assert!(machine.set_paused(true).unwrap().is_empty());
    }

    #[test]
    fn pause_requires_an_active_workout() {
        let mut machine = PhaseMachine::new();
        assert_eq!(machine.set_paused(true), Err(WorkoutError::NotRunning));
    }

    #[test]
    fn cancel_returns_to_idle_and_stops_ticking() {
        let mut machine = PhaseMachine::new();
        machine.start(example_config()).unwrap();
        for _ in 0..30 {
            machine.tick().unwrap();
        }

        machine.cancel().unwrap();
        assert_eq!(machine.state(), &WorkoutState::idle());
        assert!(machine.config().is_none());
        assert!(machine.tick().unwrap().is_empty());
        assert_eq!(machine.state(), &WorkoutState::idle());
        assert_eq!(machine.cancel(), Err(WorkoutError::NotRunning));
    }

    #[test]
    fn start_is_rejected_while_running() {
        let mut machine = PhaseMachine::new();
        machine.start(example_config()).unwrap();
        machine.tick().unwrap();
        let before = machine.state().clone();

        let other = WorkoutConfig::new(1, 5, 0, 1, 0).unwrap();
        assert_eq!(machine.start(other), Err(WorkoutError::AlreadyRunning));
        assert_eq!(machine.state(), &before);
        assert_eq!(machine.config(), Some(&example_config()));
    }

    #[test]
    fn invalid_config_leaves_state_untouched() {
        let mut machine = PhaseMachine::new();
        let bad = WorkoutConfig {
            exercises_per_round: 2,
            work_seconds: 0,
            rest_seconds: 10,
            rounds: 2,
            round_rest_seconds: 60,
        };
        assert!(matches!(
            machine.start(bad),
            Err(WorkoutError::InvalidConfig { field: "workSeconds", .. })
        ));
        assert_eq!(machine.state(), &WorkoutState::idle());
    }

    #[test]
    fn finished_is_terminal_until_restarted() {
        let mut machine = PhaseMachine::new();
        machine.start(WorkoutConfig::new(1, 2, 0, 1, 0).unwrap()).unwrap();
        run_to_end(&mut machine);
        let finished = machine.state().clone();

        for _ in 0..10 {
            assert!(machine.tick().unwrap().is_empty());
        }
        assert_eq!(machine.state(), &finished);
        assert_eq!(machine.cancel(), Err(WorkoutError::NotRunning));

        machine.start(example_config()).unwrap();
        assert_eq!(machine.state().phase, Phase::GetReady);
        assert_eq!(machine.state().elapsed_seconds, 0);
    }

    #[test]
    fn countdown_and_halfway_announcements() {
        let mut machine = PhaseMachine::new();
        machine.start(WorkoutConfig::new(1, 8, 0, 1, 0).unwrap()).unwrap();
        let (_, events) = run_to_end(&mut machine);

        let spoken: Vec<_> = events.iter().filter_map(WorkoutEvent::announcement).collect();
        assert_eq!(
            spoken,
            vec![
                "Three",
                "Two",
                "One",
                "Start",
                "Halfway there",
                "Three",
                "Two",
                "One",
                "Congratulations! Workout complete.",
            ]
        );
    }

    #[test]
    fn display_reflects_phase_and_counters() {
        let mut machine = PhaseMachine::new();
        assert!(machine.display().is_none());
        machine.start(example_config()).unwrap();

        let display = machine.display().unwrap();
        assert_eq!(display.status, "GET READY");
        assert_eq!(display.time_left, "00:05");
        assert_eq!(display.next_label, "Next: Work");

        for _ in 0..5 {
            machine.tick().unwrap();
        }
        let display = machine.display().unwrap();
        assert_eq!(display.status, "WORK 1/2");
        assert_eq!(display.color, "#30d158");
        assert_eq!(display.round, "1/2");
        assert_eq!(display.exercise, "1/2");
        assert_eq!(display.time_left, "00:20");
        assert_eq!(display.next_label, "Next: Rest");

        for _ in 0..50 {
            machine.tick().unwrap();
        }
        let display = machine.display().unwrap();
        assert_eq!(display.status, "ROUND BREAK");
        assert_eq!(display.time_left, "01:00");
        assert_eq!(display.next_label, "Next: New Round");
    }

    #[test]
    fn out_of_bounds_state_is_reported_without_mutation() {
        let mut machine = PhaseMachine::new();
        machine.start(example_config()).unwrap();
        machine.state.current_exercise = 3;
        let corrupted = machine.state().clone();

        assert!(matches!(machine.tick(), Err(WorkoutError::Internal(_))));
        assert_eq!(machine.state(), &corrupted);
    }
}
