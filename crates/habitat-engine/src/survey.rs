//! A field survey shared by several colonists.
//!
//! The survey has a fixed number of sites and a crew limit. Each time a
//! member resumes the mission one site is handed to it as a task; the survey
//! is done once every site has been handed out.

use std::collections::BTreeSet;

use tracing::{debug, info};

use habitat_agents::{Mission, MissionError, TaskManager, Worker};
use habitat_types::{MissionId, WorkerId};

/// A multi-member field survey.
#[derive(Debug)]
pub struct FieldSurvey {
    id: MissionId,
    name: String,
    crew_limit: usize,
    members: BTreeSet<WorkerId>,
    sites_left: u32,
}

impl FieldSurvey {
    /// Create a survey of `sites` sites for at most `crew_limit` members.
    pub fn new(name: impl Into<String>, sites: u32, crew_limit: usize) -> Self {
        Self {
            id: MissionId::new(),
            name: name.into(),
            crew_limit,
            members: BTreeSet::new(),
            sites_left: sites,
        }
    }

    /// Number of sites not yet handed out.
    pub const fn sites_left(&self) -> u32 {
        self.sites_left
    }

    /// Number of current members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

impl Mission for FieldSurvey {
    fn id(&self) -> MissionId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_done(&self) -> bool {
        self.sites_left == 0
    }

    fn perform(
        &mut self,
        worker: &dyn Worker,
        tasks: &mut dyn TaskManager,
    ) -> Result<bool, MissionError> {
        if self.is_done() || !self.members.contains(&worker.id()) {
            return Ok(false);
        }
        if !tasks.assign_task("survey site") {
            return Ok(false);
        }
        self.sites_left = self.sites_left.saturating_sub(1);
        debug!(
            mission = %self.name,
            worker = %worker.name(),
            sites_left = self.sites_left,
            "Survey site assigned"
        );
        if self.is_done() {
            info!(mission = %self.name, "Survey complete");
        }
        Ok(true)
    }

    fn add_member(&mut self, worker: WorkerId) -> Result<(), MissionError> {
        if self.members.contains(&worker) {
            return Ok(());
        }
        if self.members.len() >= self.crew_limit {
            return Err(MissionError::MemberRejected {
                mission: self.id,
                worker,
                reason: format!("crew limit of {} reached", self.crew_limit),
            });
        }
        self.members.insert(worker);
        Ok(())
    }

    fn remove_member(&mut self, worker: WorkerId) {
        self.members.remove(&worker);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn crew_limit_is_enforced() {
        let mut survey = FieldSurvey::new("crater rim", 4, 2);
        survey.add_member(WorkerId::new()).unwrap();
        survey.add_member(WorkerId::new()).unwrap();
        assert!(matches!(
            survey.add_member(WorkerId::new()),
            Err(MissionError::MemberRejected { .. })
        ));
        assert_eq!(survey.member_count(), 2);
    }

    #[test]
    fn rejoining_is_not_double_counted() {
        let mut survey = FieldSurvey::new("dune field", 1, 1);
        let worker = WorkerId::new();
        survey.add_member(worker).unwrap();
        survey.add_member(worker).unwrap();
        survey.remove_member(worker);
        assert_eq!(survey.member_count(), 0);
    }
}
