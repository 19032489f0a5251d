use std::collections::VecDeque;

use gazecue_core::{
    CancelToken, Condition, Scene, SessionPhase, Side, StimulusRole, TrialRecord, TrialState,
};
use gazecue_timing::Timer;
use rand::Rng;
use tracing::{debug, info};

use crate::config::ExperimentConfig;
use crate::schedule;
use crate::trial::ActiveTrial;

/// Events flowing between the session machine and its host.
///
/// `Advance` and `Response` come from the keyboard. `TrialComplete` is
/// produced by `update()` and fed back through `handle_event()`.
/// `SaveRequested` and `ErrorFeedback` are surfaced to the host, which
/// acknowledges a finished export with `ResultsSaved`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Advance,
    Response(Side),
    TrialComplete,
    SaveRequested,
    ResultsSaved,
    ErrorFeedback,
}

/// The session state machine.
///
/// Holds the whole run: instruction screen, practice, transition, main
/// blocks with rest screens, save, closing. Each `update()` call compares
/// the clock against the current trial state's fixed duration and emits
/// events; the cancel token is polled at the top of every tick and jumps
/// the session straight to the save phase.
pub struct Session<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub config: ExperimentConfig,
    timer: T,
    rng: R,
    cancel: CancelToken,

    phase: SessionPhase,
    queue: VecDeque<Condition>,
    current: Option<ActiveTrial>,
    awaiting_advance: bool,

    block_number: u32,
    next_trial_number: u32,

    results: Vec<TrialRecord>,
    pending: Vec<SessionEvent>,
}

impl<T, R> Session<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub fn new(config: ExperimentConfig, timer: T, rng: R, cancel: CancelToken) -> Self {
        Self {
            config,
            timer,
            rng,
            cancel,
            phase: SessionPhase::Instruction,
            queue: VecDeque::new(),
            current: None,
            awaiting_advance: true,
            block_number: 0,
            next_trial_number: 1,
            results: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn results(&self) -> &[TrialRecord] {
        &self.results
    }

    /// Advance time-driven state and drain pending events.
    pub fn update(&mut self) -> Vec<SessionEvent> {
        if self.cancel.is_cancelled() && !self.phase.is_terminal() {
            info!(phase = ?self.phase, "abort requested, skipping to save");
            self.current = None;
            self.queue.clear();
            self.enter_save();
        } else if self.phase.runs_trials() {
            self.update_trial();
        }
        self.pending.drain(..).collect()
    }

    /// One host iteration: update, feed internal events back in, return
    /// the events the host has to act on.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        let mut external = Vec::new();
        for event in self.update() {
            if !self.handle_event(event.clone()) {
                external.push(event);
            }
        }
        external
    }

    /// Returns whether the event was consumed by the machine.
    pub fn handle_event(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Advance => self.on_advance(),
            SessionEvent::Response(side) => self.on_response(side),
            SessionEvent::TrialComplete => {
                self.finish_trial();
                true
            }
            SessionEvent::ResultsSaved => {
                if self.phase == SessionPhase::Save {
                    self.phase = SessionPhase::Closing;
                    info!("results saved, closing");
                    true
                } else {
                    false
                }
            }
            // Host-facing events pass through unconsumed.
            SessionEvent::SaveRequested | SessionEvent::ErrorFeedback => false,
        }
    }

    /// What the renderer should draw this frame.
    pub fn scene(&self) -> Scene {
        match self.phase {
            SessionPhase::Instruction => Scene::Instruction,
            SessionPhase::Transition => Scene::Transition,
            SessionPhase::Practice | SessionPhase::Main => match &self.current {
                Some(trial) => match trial.state {
                    TrialState::Fixation => Scene::Fixation,
                    TrialState::Prior => {
                        Scene::Face(StimulusRole::prior(trial.condition.prior))
                    }
                    TrialState::Gaze => Scene::Face(StimulusRole::gaze(trial.condition.gaze)),
                    TrialState::Target => Scene::Target {
                        gaze: trial.condition.gaze,
                        target: trial.condition.target,
                    },
                    TrialState::Iti => Scene::Blank,
                },
                None if self.awaiting_advance => Scene::Rest,
                None => Scene::Blank,
            },
            SessionPhase::Save => Scene::Blank,
            SessionPhase::Closing => Scene::Closing,
        }
    }

    fn on_advance(&mut self) -> bool {
        if !self.awaiting_advance {
            return false;
        }
        match self.phase {
            SessionPhase::Instruction => {
                self.awaiting_advance = false;
                self.phase = SessionPhase::Practice;
                self.queue = schedule::practice_schedule(self.config.practice_reps, &mut self.rng)
                    .into();
                info!(trials = self.queue.len(), "practice started");
                self.start_trial();
                true
            }
            SessionPhase::Transition => {
                self.awaiting_advance = false;
                self.phase = SessionPhase::Main;
                self.start_block();
                true
            }
            // Rest screen between main blocks.
            SessionPhase::Main => {
                self.awaiting_advance = false;
                self.start_block();
                true
            }
            _ => false,
        }
    }

    fn start_block(&mut self) {
        self.block_number += 1;
        self.queue =
            schedule::block_schedule(self.config.trials_per_condition_per_block, &mut self.rng)
                .into();
        info!(
            block = self.block_number,
            trials = self.queue.len(),
            "block started"
        );
        self.start_trial();
    }

    fn start_trial(&mut self) {
        let Some(condition) = self.queue.pop_front() else {
            return;
        };
        let number = if self.phase.is_main() {
            let n = self.next_trial_number;
            self.next_trial_number += 1;
            Some(n)
        } else {
            None
        };
        let now = self.timer.now();
        debug!(?condition, trial = ?number, "trial started");
        self.current = Some(ActiveTrial::new(condition, number, now));
    }

    fn update_trial(&mut self) {
        let now = self.timer.now();
        let (fixation, prior, gaze, max_rt, iti) = (
            self.config.fixation_ms,
            self.config.prior_ms,
            self.config.gaze_ms,
            self.config.max_rt_ms,
            self.config.iti_ms,
        );
        let Some(trial) = &mut self.current else {
            return;
        };
        let elapsed = trial.state_elapsed_ms(now);
        match trial.state {
            TrialState::Fixation if elapsed >= fixation => trial.enter(TrialState::Prior, now),
            TrialState::Prior if elapsed >= prior => trial.enter(TrialState::Gaze, now),
            TrialState::Gaze if elapsed >= gaze => {
                trial.enter(TrialState::Target, now);
                debug!("response window opened");
            }
            TrialState::Target if elapsed >= max_rt => {
                // Timeout: response fields stay unset.
                trial.enter(TrialState::Iti, now);
                debug!("response window elapsed without a keypress");
            }
            TrialState::Iti if elapsed >= iti => {
                self.pending.push(SessionEvent::TrialComplete);
            }
            _ => {}
        }
    }

    fn on_response(&mut self, side: Side) -> bool {
        if !self.phase.runs_trials() {
            return false;
        }
        let practice = self.phase.is_practice();
        let now = self.timer.now();
        let max_rt = self.config.max_rt_ms;

        let mut practice_error = false;
        let handled = match &mut self.current {
            Some(trial) if trial.state == TrialState::Target => {
                let onset = trial.target_onset_ns.unwrap_or(now);
                let rt_ms = now.saturating_sub(onset) / 1_000_000;
                if rt_ms >= max_rt {
                    // Past the deadline; the timeout path runs instead.
                    false
                } else {
                    trial.response = Some((side, rt_ms));
                    trial.enter(TrialState::Iti, now);
                    info!(?side, rt_ms, "response recorded");
                    practice_error = practice && side != trial.condition.target;
                    true
                }
            }
            _ => false,
        };
        if practice_error {
            self.pending.push(SessionEvent::ErrorFeedback);
        }
        handled
    }

    fn finish_trial(&mut self) {
        let Some(trial) = self.current.take() else {
            return;
        };
        // Practice results are discarded.
        if let Some(number) = trial.number {
            self.results.push(trial.into_record(number, self.block_number));
        }

        if !self.queue.is_empty() {
            self.start_trial();
            return;
        }

        match self.phase {
            SessionPhase::Practice => {
                self.phase = SessionPhase::Transition;
                self.awaiting_advance = true;
                info!("practice finished");
            }
            SessionPhase::Main => {
                if self.block_number >= self.config.blocks_total {
                    info!(trials = self.results.len(), "main phase finished");
                    self.enter_save();
                } else {
                    self.awaiting_advance = true;
                    info!(block = self.block_number, "block finished, resting");
                }
            }
            _ => {}
        }
    }

    fn enter_save(&mut self) {
        self.phase = SessionPhase::Save;
        self.awaiting_advance = false;
        self.pending.push(SessionEvent::SaveRequested);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gazecue_timing::ManualTimer;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn session() -> (Session<ManualTimer, StdRng>, ManualTimer, CancelToken) {
        let clock = ManualTimer::new();
        let cancel = CancelToken::new();
        let session = Session::new(
            ExperimentConfig::default(),
            clock.clone(),
            StdRng::seed_from_u64(1),
            cancel.clone(),
        );
        (session, clock, cancel)
    }

    #[test]
    fn starts_on_the_instruction_screen() {
        let (session, _, _) = session();
        assert_eq!(session.phase(), SessionPhase::Instruction);
        assert_eq!(session.scene(), Scene::Instruction);
    }

    #[test]
    fn advance_starts_practice_with_a_fixation() {
        let (mut session, _, _) = session();
        assert!(session.handle_event(SessionEvent::Advance));
        assert_eq!(session.phase(), SessionPhase::Practice);
        assert_eq!(session.scene(), Scene::Fixation);
    }

    #[test]
    fn responses_outside_the_target_window_are_ignored() {
        let (mut session, clock, _) = session();
        session.handle_event(SessionEvent::Advance);
        // Still in fixation.
        assert!(!session.handle_event(SessionEvent::Response(Side::Left)));

        // Walk to the target state.
        for ms in [500, 1000, 300] {
            clock.advance_ms(ms);
            session.tick();
        }
        assert!(matches!(session.scene(), Scene::Target { .. }));

        // A press at the deadline itself is late.
        clock.advance_ms(3000);
        assert!(!session.handle_event(SessionEvent::Response(Side::Left)));
    }

    #[test]
    fn cancel_on_the_instruction_screen_requests_an_empty_save() {
        let (mut session, _, cancel) = session();
        cancel.cancel();
        let events = session.tick();
        assert_eq!(events, vec![SessionEvent::SaveRequested]);
        assert_eq!(session.phase(), SessionPhase::Save);
        assert!(session.results().is_empty());

        session.handle_event(SessionEvent::ResultsSaved);
        assert_eq!(session.phase(), SessionPhase::Closing);
        assert_eq!(session.scene(), Scene::Closing);
    }
}
