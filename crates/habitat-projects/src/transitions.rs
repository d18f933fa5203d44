//! The table of legal project stage transitions.
//!
//! Stage changes are never decided by comparing enum variants. The project
//! engine asks this table, and only this table, whether a move is allowed.
//!
//! | from          | legal next stages                                   |
//! |---------------|-----------------------------------------------------|
//! | `Waiting`     | `Preparation`, `Active`, `Closedown`, `Done`, `Aborted` |
//! | `Preparation` | `Active`, `Closedown`, `Done`, `Aborted`            |
//! | `Active`      | `Closedown`, `Done`, `Aborted`                      |
//! | `Closedown`   | `Done`, `Aborted`                                   |
//! | `Done`        | (none)                                              |
//! | `Aborted`     | (none)                                              |
//!
//! Forward moves may skip stages because a project need not have a step for
//! every stage.

use habitat_types::Stage;

use crate::error::ProjectError;

const FROM_WAITING: &[Stage] = &[
    Stage::Preparation,
    Stage::Active,
    Stage::Closedown,
    Stage::Done,
    Stage::Aborted,
];
const FROM_PREPARATION: &[Stage] = &[Stage::Active, Stage::Closedown, Stage::Done, Stage::Aborted];
const FROM_ACTIVE: &[Stage] = &[Stage::Closedown, Stage::Done, Stage::Aborted];
const FROM_CLOSEDOWN: &[Stage] = &[Stage::Done, Stage::Aborted];
const TERMINAL: &[Stage] = &[];

/// Lookup of the legal next stages for every stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageTransitions;

impl StageTransitions {
    /// Return the stages reachable in one move from `from`.
    pub const fn next_stages(from: Stage) -> &'static [Stage] {
        match from {
            Stage::Waiting => FROM_WAITING,
            Stage::Preparation => FROM_PREPARATION,
            Stage::Active => FROM_ACTIVE,
            Stage::Closedown => FROM_CLOSEDOWN,
            Stage::Done | Stage::Aborted => TERMINAL,
        }
    }

    /// Whether moving from `from` to `to` is allowed.
    pub fn is_legal(from: Stage, to: Stage) -> bool {
        Self::next_stages(from).contains(&to)
    }

    /// Check a move, returning [`ProjectError::IllegalTransition`] if the
    /// table forbids it.
    pub fn check(from: Stage, to: Stage) -> Result<(), ProjectError> {
        if Self::is_legal(from, to) {
            Ok(())
        } else {
            Err(ProjectError::IllegalTransition { from, to })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn terminal_stages_have_no_exits() {
        for from in [Stage::Done, Stage::Aborted] {
            for to in Stage::ALL {
                assert!(!StageTransitions::is_legal(from, to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn aborted_reachable_from_every_non_terminal_stage() {
        for from in Stage::ALL.into_iter().filter(|s| !s.is_terminal()) {
            assert!(StageTransitions::is_legal(from, Stage::Aborted));
        }
    }

    #[test]
    fn no_backward_or_self_moves() {
        let order = [
            Stage::Waiting,
            Stage::Preparation,
            Stage::Active,
            Stage::Closedown,
            Stage::Done,
        ];
        for (i, from) in order.iter().enumerate() {
            for to in order.iter().take(i.saturating_add(1)) {
                assert!(!StageTransitions::is_legal(*from, *to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn check_reports_both_stages() {
        let err = StageTransitions::check(Stage::Closedown, Stage::Active).unwrap_err();
        assert!(matches!(
            err,
            ProjectError::IllegalTransition {
                from: Stage::Closedown,
                to: Stage::Active
            }
        ));
    }
}
