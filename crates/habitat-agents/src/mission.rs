//! The mission contract.
//!
//! A mission is a group endeavour (an excursion, a delivery run) with
//! several members. Members share one mission object, so it lives behind
//! `Rc<RefCell<_>>`; every access from this crate goes through
//! `try_borrow`/`try_borrow_mut` and treats a busy mission as a
//! [`MissionError::Busy`].

use std::cell::RefCell;
use std::rc::Rc;

use habitat_types::{MissionId, WorkerId};

use crate::error::MissionError;
use crate::task::TaskManager;
use crate::worker::Worker;

/// A mission shared between its members.
pub type SharedMission = Rc<RefCell<dyn Mission>>;

/// A multi-member endeavour a worker can belong to.
pub trait Mission {
    /// Return the mission id.
    fn id(&self) -> MissionId;

    /// Return the mission name.
    fn name(&self) -> &str;

    /// Whether the mission has ended.
    fn is_done(&self) -> bool;

    /// Let `worker` do its part of the mission, typically by assigning a
    /// task to `tasks`. Returns whether any mission work was set up.
    fn perform(
        &mut self,
        worker: &dyn Worker,
        tasks: &mut dyn TaskManager,
    ) -> Result<bool, MissionError>;

    /// Take `worker` on as a member.
    fn add_member(&mut self, worker: WorkerId) -> Result<(), MissionError>;

    /// Release `worker` from the mission.
    fn remove_member(&mut self, worker: WorkerId);
}
