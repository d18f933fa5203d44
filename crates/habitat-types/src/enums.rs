//! Enumeration types shared across the Habitat workspace.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Project stages
// ---------------------------------------------------------------------------

/// A named phase of a staged workflow.
///
/// The work stages are ordered `Waiting < Preparation < Active < Closedown
/// < Done`. `Aborted` sits outside that order: it is reachable from any
/// non-terminal stage and is terminal itself. Legal moves between stages
/// are decided by the project engine's transition table, not by comparing
/// variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Created but no step has started yet.
    Waiting,
    /// Gathering resources and crew.
    Preparation,
    /// The main body of work.
    Active,
    /// Packing up and returning.
    Closedown,
    /// All steps completed.
    Done,
    /// Stopped before completion.
    Aborted,
}

impl Stage {
    /// Every stage in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Waiting,
        Self::Preparation,
        Self::Active,
        Self::Closedown,
        Self::Done,
        Self::Aborted,
    ];

    /// Whether no further transition is possible out of this stage.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// Whether a project step may target this stage.
    ///
    /// `Waiting`, `Done`, and `Aborted` carry no work.
    pub const fn is_work_stage(self) -> bool {
        matches!(self, Self::Preparation | Self::Active | Self::Closedown)
    }
}

impl core::fmt::Display for Stage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Waiting => "waiting",
            Self::Preparation => "preparation",
            Self::Active => "active",
            Self::Closedown => "closedown",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Work status
// ---------------------------------------------------------------------------

/// Current duty status of a worker bound to a shift slot.
///
/// Precedence when deriving a status: `OnCall` beats `OnLeave`, which beats
/// the window-derived `OnDuty` / `OffDuty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkStatus {
    /// Inside the assigned shift's duty window.
    OnDuty,
    /// Outside the assigned shift's duty window.
    OffDuty,
    /// Explicitly called in, regardless of shift or leave.
    OnCall,
    /// Rotated off the roster until the leave expires.
    OnLeave,
}

// ---------------------------------------------------------------------------
// Workers and jobs
// ---------------------------------------------------------------------------

/// The kind of agent doing work in the colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkerKind {
    /// A human settler.
    Person,
    /// A robot running on battery power.
    Robot,
}

/// Job classification held by a worker's mind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JobType {
    /// Grows crops in the greenhouses.
    Botanist,
    /// Builds and maintains structures.
    Engineer,
    /// Repairs equipment and vehicles.
    Technician,
    /// Drives rovers on excursions.
    Pilot,
    /// Studies rocks and minerals.
    Areologist,
    /// Prepares meals.
    Chef,
    /// Heads the settlement; the job lock never releases automatically.
    Politician,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_middle_stages_carry_work() {
        let work: Vec<Stage> = Stage::ALL
            .into_iter()
            .filter(|s| s.is_work_stage())
            .collect();
        assert_eq!(work, vec![Stage::Preparation, Stage::Active, Stage::Closedown]);
    }

    #[test]
    fn done_and_aborted_are_terminal() {
        assert!(Stage::Done.is_terminal());
        assert!(Stage::Aborted.is_terminal());
        assert!(!Stage::Closedown.is_terminal());
        assert!(!Stage::Waiting.is_terminal());
    }
}
