//! # gencommit-algo: Unit Commitment and Economic Dispatch
//!
//! Builds and solves multi-period generation scheduling problems: which units
//! run, how much each produces, and the clearing price of every period.
//!
//! | Mode | Program | Backend |
//! |------|---------|---------|
//! | Pure dispatch (`enable_commitment = false`) | LP | Clarabel |
//! | Unit commitment (`enable_commitment = true`) | MILP, then LP with commitment fixed | microlp (or HiGHS), then Clarabel |
//!
//! ### Pipeline
//!
//! - [`FleetSnapshot`]: in-service units projected into index-aligned vectors
//! - [`NormalizedHorizon`]: demand/reserve fitted to the horizon, with warnings
//! - [`ModelBuilder`]: standard-form [`LinearProgram`] for a [`CommitmentMode`]
//! - [`SolverAdapter`]: backend calls classified into a [`SolveResult`], with
//!   each period priced at the cost of serving one more MW
//! - [`ResultProcessor`]: per-period [`ScheduleReport`] for the consumer
//!
//! [`Scheduler`] runs the whole pipeline.
//!
//! ## Example
//!
//! ```no_run
//! use gencommit_algo::{ScheduleRequest, Scheduler, SolveResult};
//! use gencommit_core::{Fleet, GeneratingUnit};
//!
//! let fleet = Fleet::new("two-unit")
//!     .with_unit(GeneratingUnit::new("G1", 0.0, 60.0, 10.0))
//!     .with_unit(GeneratingUnit::new("G2", 0.0, 100.0, 8.0));
//! let request = ScheduleRequest::new(1, vec![80.0]);
//!
//! let outcome = Scheduler::new().schedule(&fleet, &request)?;
//! if let SolveResult::Optimal(schedule) = &outcome.run.result {
//!     println!("cost {:.2}, price {:.2}", schedule.objective, schedule.clearing_price[0]);
//! }
//! # Ok::<(), gencommit_algo::ModelError>(())
//! ```

pub mod adapter;
pub mod config;
pub mod engine;
pub mod error;
pub mod horizon;
pub mod model;
mod pricing;
pub mod program;
pub mod result;
pub mod snapshot;
pub mod solver;

pub use adapter::SolverAdapter;
pub use config::{LpSolverKind, MipSolverKind, ScheduleRequest};
pub use engine::{ModelSummary, ScheduleOutcome, ScheduleRun, Scheduler};
pub use error::ModelError;
pub use horizon::{HorizonAdjustment, NormalizedHorizon};
pub use model::{CommitmentMode, ModelBuilder, SchedulingModel};
pub use program::{LinearProgram, ProblemClass, Row, RowSense, VarKind};
pub use result::{
    verify, FailureKind, FailureRecord, OptimalSchedule, PeriodReport, ResultProcessor,
    ScheduleReport, SolveResult,
};
pub use snapshot::FleetSnapshot;
pub use solver::{BackendOutcome, ProgramBackend, RawSolution, SolveLimits};
