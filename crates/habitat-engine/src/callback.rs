//! Tick callback reporting colony state once per sol.
//!
//! Pulses inside a sol are ignored; at each sol boundary the callback
//! logs a roster summary, the project board tallies and the progress of the
//! rover and the survey, plus a JSON snapshot of the shift slots at `debug`
//! level.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info, warn};

use habitat_agents::ShiftManager;
use habitat_core::{Simulation, TickCallback, TickSummary};
use habitat_projects::ProjectBoard;
use habitat_types::WorkStatus;

use crate::colony::ColonistMind;
use crate::rover::RoverTraverse;
use crate::survey::FieldSurvey;

/// Per-status head count of the roster.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RosterCounts {
    /// Working their shift right now.
    pub on_duty: usize,
    /// Outside their shift window.
    pub off_duty: usize,
    /// Called in regardless of shift.
    pub on_call: usize,
    /// Away on rotation leave.
    pub on_leave: usize,
}

impl RosterCounts {
    /// Count every slot holder of `roster` by status.
    pub fn tally(roster: &ShiftManager) -> Self {
        let mut counts = Self::default();
        for slot in roster.slots() {
            let bucket = match roster.status(slot.worker()) {
                Some(WorkStatus::OnDuty) => &mut counts.on_duty,
                Some(WorkStatus::OffDuty) => &mut counts.off_duty,
                Some(WorkStatus::OnCall) => &mut counts.on_call,
                Some(WorkStatus::OnLeave) => &mut counts.on_leave,
                None => continue,
            };
            *bucket = bucket.saturating_add(1);
        }
        counts
    }
}

/// Logs a colony report at every new sol.
pub struct ColonyCallback {
    roster: Rc<RefCell<ShiftManager>>,
    board: Rc<RefCell<ProjectBoard<String>>>,
    rover: Rc<RefCell<RoverTraverse>>,
    survey: Rc<RefCell<FieldSurvey>>,
    minds: Vec<ColonistMind>,
    sols_reported: u32,
}

impl ColonyCallback {
    /// Create a callback observing the given colony parts.
    pub const fn new(
        roster: Rc<RefCell<ShiftManager>>,
        board: Rc<RefCell<ProjectBoard<String>>>,
        rover: Rc<RefCell<RoverTraverse>>,
        survey: Rc<RefCell<FieldSurvey>>,
        minds: Vec<ColonistMind>,
    ) -> Self {
        Self {
            roster,
            board,
            rover,
            survey,
            minds,
            sols_reported: 0,
        }
    }

    /// Number of sol reports written so far.
    pub const fn sols_reported(&self) -> u32 {
        self.sols_reported
    }

    /// Chores finished and millisols worked, summed over the colony.
    fn chore_totals(&self) -> (u32, f64) {
        self.minds
            .iter()
            .filter_map(|mind| mind.try_borrow().ok())
            .fold((0, 0.0), |(done, worked), mind| {
                let chores = mind.tasks();
                (done.saturating_add(chores.completed()), worked + chores.worked())
            })
    }

    fn report_roster(&self, summary: &TickSummary) {
        let Ok(roster) = self.roster.try_borrow() else {
            warn!(pulse = summary.pulse_id, "Roster busy; sol report skipped");
            return;
        };
        let counts = RosterCounts::tally(&roster);
        let (chores_completed, worked) = self.chore_totals();
        info!(
            when = %summary.when,
            on_duty = counts.on_duty,
            off_duty = counts.off_duty,
            on_call = counts.on_call,
            on_leave = counts.on_leave,
            chores_completed,
            worked,
            "Roster at sol start"
        );

        let slots: Vec<_> = roster.slots().collect();
        match serde_json::to_string(&slots) {
            Ok(json) => debug!(slots = %json, "Shift slot snapshot"),
            Err(error) => warn!(%error, "Failed to serialize shift slots"),
        }
    }

    fn report_field_work(&self, summary: &TickSummary) {
        if let Ok(board) = self.board.try_borrow() {
            info!(
                when = %summary.when,
                active = board.len(),
                completed = board.completed(),
                aborted = board.aborted(),
                "Project board"
            );
        }
        if let Ok(rover) = self.rover.try_borrow() {
            info!(
                visited = rover.visited(),
                skipped = rover.skipped(),
                aborted = rover.is_aborted(),
                home = rover.is_finished(),
                recovery_stage = rover.watchdog_state().recovery_stage(),
                position = ?rover.position(),
                "Rover traverse"
            );
        }
        if let Ok(survey) = self.survey.try_borrow() {
            info!(
                sites_left = survey.sites_left(),
                crew = survey.member_count(),
                "Field survey"
            );
        }
    }
}

impl TickCallback for ColonyCallback {
    fn on_tick(&mut self, summary: &TickSummary, _sim: &Simulation) {
        if !summary.new_sol {
            return;
        }
        self.report_roster(summary);
        self.report_field_work(summary);
        self.sols_reported = self.sols_reported.saturating_add(1);
    }
}
