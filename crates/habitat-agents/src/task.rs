//! The task manager contract.
//!
//! Task content (cooking, repairs, driving) is outside this crate. The mind
//! only needs a manager that can run the active task for a slice of time
//! and pick a new one when idle.

use habitat_types::ClockPulse;

use crate::worker::Worker;

/// Runs a worker's tasks.
pub trait TaskManager {
    /// Whether a task is currently assigned.
    fn has_active_task(&self) -> bool;

    /// Name of the active task, for logging.
    fn task_name(&self) -> Option<&str>;

    /// Run the active task for up to `time` millisols.
    ///
    /// Returns the time left over, which must lie in `[0, time]`. A return
    /// equal to `time` means the task consumed nothing.
    fn execute_task(&mut self, time: f64, performance: f64) -> f64;

    /// Pick and start a new task for `worker`, if any is suitable.
    fn start_new_task(&mut self, worker: &dyn Worker);

    /// Start the named task on behalf of a mission. Returns whether the
    /// manager knows the task and started it.
    fn assign_task(&mut self, _task: &str) -> bool {
        false
    }

    /// Drop every assigned task.
    fn clear_all_tasks(&mut self, reason: &str);

    /// Observe the passing of a pulse before any work is done in it.
    fn time_passing(&mut self, _pulse: &ClockPulse) {}
}
