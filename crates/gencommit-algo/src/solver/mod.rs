//! Solver backends for standard-form programs.
//!
//! Backends classify their own termination status into a [`BackendOutcome`]
//! before returning. Nothing downstream inspects solver-specific status codes,
//! and an infeasible or unbounded termination can never be read as a
//! solution.
//!
//! | Backend | Problem classes | Time limit |
//! |---------|-----------------|------------|
//! | [`ClarabelBackend`] | LP | native |
//! | [`MicrolpBackend`] | LP, MILP | native |
//! | `HighsBackend` (`solver-highs`) | LP, MILP | native |

use crate::config::{LpSolverKind, MipSolverKind};
use crate::program::{LinearProgram, ProblemClass};
use std::sync::Arc;
use std::time::Duration;

mod clarabel;
mod milp;

pub use self::clarabel::ClarabelBackend;
#[cfg(feature = "solver-highs")]
pub use self::milp::HighsBackend;
pub use self::milp::MicrolpBackend;

/// Limits applied to a single backend call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveLimits {
    /// Wall-clock budget; `None` means unlimited
    pub time_limit: Option<Duration>,
}

/// Values of a successful backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSolution {
    /// Primal value per column
    pub primal: Vec<f64>,
    pub objective: f64,
    pub iterations: usize,
}

/// Classified termination of a backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendOutcome {
    Solved(RawSolution),
    Infeasible(String),
    Unbounded(String),
    TimedOut(String),
    Failed(String),
}

/// A solver that accepts standard-form programs.
///
/// Backends are matched to programs via [`ProblemClass`]; several backends
/// may cover the same class.
pub trait ProgramBackend: Send + Sync {
    /// Unique identifier (e.g., "clarabel", "microlp")
    fn id(&self) -> &str;

    /// Problem classes this backend can solve
    fn supported_classes(&self) -> &[ProblemClass];

    fn solve(&self, program: &LinearProgram, limits: &SolveLimits) -> BackendOutcome;

    fn supports(&self, class: ProblemClass) -> bool {
        self.supported_classes().contains(&class)
    }
}

impl LpSolverKind {
    pub fn build_backend(self) -> Arc<dyn ProgramBackend> {
        match self {
            LpSolverKind::Clarabel => Arc::new(ClarabelBackend::default()),
        }
    }
}

impl MipSolverKind {
    pub fn build_backend(self) -> Arc<dyn ProgramBackend> {
        match self {
            MipSolverKind::Microlp => Arc::new(MicrolpBackend),
            #[cfg(feature = "solver-highs")]
            MipSolverKind::Highs => Arc::new(HighsBackend),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_is_object_safe() {
        fn _accepts_backend(_b: &dyn ProgramBackend) {}
        fn _assert_send_sync<T: Send + Sync>() {}
        _assert_send_sync::<Arc<dyn ProgramBackend>>();
    }

    #[test]
    fn test_registry_builds_capable_backends() {
        let lp = LpSolverKind::Clarabel.build_backend();
        assert_eq!(lp.id(), "clarabel");
        assert!(lp.supports(ProblemClass::LinearProgram));
        assert!(!lp.supports(ProblemClass::MixedIntegerProgram));

        let mip = MipSolverKind::Microlp.build_backend();
        assert_eq!(mip.id(), "microlp");
        assert!(mip.supports(ProblemClass::MixedIntegerProgram));
    }
}
