//! Unit commitment: MILP commitment stage followed by the fixed-commitment
//! pricing re-solve.

use gencommit_algo::solver::ClarabelBackend;
use gencommit_algo::{
    BackendOutcome, FailureKind, LinearProgram, ProblemClass, ProgramBackend, ScheduleRequest,
    Scheduler, SolveLimits, SolveResult,
};
use gencommit_core::{Fleet, GeneratingUnit};
use std::sync::Arc;

const TOL: f64 = 1e-4;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOL,
        "expected {}, got {}",
        expected,
        actual
    );
}

fn commitment_request(demand: Vec<f64>) -> ScheduleRequest {
    let periods = demand.len();
    ScheduleRequest::new(periods, demand)
        .with_reserve(vec![0.0; periods])
        .with_commitment(true)
        .with_timeout_secs(60.0)
}

/// Base unit G1 (50-100 MW at 10) and peaker G2 (20-50 MW at 30)
fn base_and_peaker(peaker_min_up: u32) -> Fleet {
    Fleet::new("uc")
        .with_unit(GeneratingUnit::new("G1", 50.0, 100.0, 10.0))
        .with_unit(
            GeneratingUnit::new("G2", 20.0, 50.0, 30.0).with_min_up_down(peaker_min_up, 1),
        )
}

#[test]
fn peaker_runs_only_for_the_peak() {
    let request = commitment_request(vec![130.0, 90.0, 80.0, 80.0]);
    let outcome = Scheduler::new().schedule(&base_and_peaker(1), &request).unwrap();
    let schedule = outcome.run.result.schedule().expect("optimal");

    assert!(schedule.commitment_optimized);
    assert_eq!(schedule.commitment[1], vec![true, false, false, false]);
    assert_close(schedule.dispatch[1][0], 30.0);
    assert_close(schedule.dispatch[0][0], 100.0);
    assert_close(schedule.objective, 4400.0);
}

#[test]
fn minimum_up_time_keeps_peaker_online() {
    let request = commitment_request(vec![130.0, 90.0, 80.0, 80.0]);
    let outcome = Scheduler::new().schedule(&base_and_peaker(3), &request).unwrap();
    let schedule = outcome.run.result.schedule().expect("optimal");

    assert_eq!(schedule.commitment[0], vec![true; 4]);
    assert_eq!(schedule.commitment[1], vec![true, true, true, false]);

    let expected_g1 = [100.0, 70.0, 60.0, 80.0];
    let expected_g2 = [30.0, 20.0, 20.0, 0.0];
    for t in 0..4 {
        assert_close(schedule.dispatch[0][t], expected_g1[t]);
        assert_close(schedule.dispatch[1][t], expected_g2[t]);
    }
    assert_close(schedule.objective, 5200.0);

    // Peak priced by the peaker, the rest by the base unit
    let expected_price = [30.0, 10.0, 10.0, 10.0];
    for t in 0..4 {
        assert_close(schedule.clearing_price[t], expected_price[t]);
    }

    let periods = outcome.run.report.periods();
    assert_eq!(periods[3].committed_units.len(), 1);
    assert_eq!(periods[3].dispatch.len(), 2);
    assert!(!outcome.diagnostics.has_warnings());
}

#[test]
fn reserve_forces_extra_commitment_with_no_load_cost() {
    let fleet = Fleet::new("reserve")
        .with_unit(GeneratingUnit::new("G1", 0.0, 60.0, 10.0).with_commitment_costs(5.0, 0.0))
        .with_unit(GeneratingUnit::new("G2", 0.0, 100.0, 8.0));
    let request = commitment_request(vec![80.0]).with_reserve(vec![30.0]);

    let outcome = Scheduler::new().schedule(&fleet, &request).unwrap();
    let schedule = outcome.run.result.schedule().expect("optimal");

    // G2 alone leaves only 20 MW spare
    assert_eq!(schedule.commitment, vec![vec![true], vec![true]]);
    assert_close(schedule.dispatch[0][0], 0.0);
    assert_close(schedule.dispatch[1][0], 80.0);
    assert_close(schedule.objective, 645.0);
    assert_close(schedule.clearing_price[0], 8.0);
}

#[test]
fn idle_period_is_priced_at_zero() {
    let fleet = Fleet::new("idle")
        .with_unit(GeneratingUnit::new("G1", 0.0, 60.0, 10.0).with_commitment_costs(1.0, 0.0))
        .with_unit(GeneratingUnit::new("G2", 0.0, 100.0, 8.0).with_commitment_costs(1.0, 0.0));
    let request = commitment_request(vec![0.0, 50.0]);

    let outcome = Scheduler::new().schedule(&fleet, &request).unwrap();
    let schedule = outcome.run.result.schedule().expect("optimal");

    assert_eq!(schedule.commitment, vec![vec![false, false], vec![false, true]]);
    assert_close(schedule.objective, 401.0);
    // nothing can serve demand at t=0, so no unit sets a price there
    assert_eq!(schedule.clearing_price[0], 0.0);
    assert_close(schedule.clearing_price[1], 8.0);

    let notes: Vec<_> = outcome.diagnostics.issues_by_category("pricing").collect();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].period, Some(0));
}

#[test]
fn initial_status_enforces_remaining_down_time() {
    let fleet = Fleet::new("restart")
        .with_unit(
            GeneratingUnit::new("G1", 0.0, 100.0, 10.0)
                .with_min_up_down(1, 2)
                .with_initial_status(false, 0),
        )
        .with_unit(GeneratingUnit::new("G2", 0.0, 100.0, 20.0).with_commitment_costs(1.0, 0.0));
    let request = commitment_request(vec![50.0, 50.0, 50.0]);

    let outcome = Scheduler::new().schedule(&fleet, &request).unwrap();
    let schedule = outcome.run.result.schedule().expect("optimal");

    assert_eq!(schedule.commitment[0], vec![false, false, true]);
    assert_eq!(schedule.commitment[1], vec![true, true, false]);
    assert_close(schedule.dispatch[0][2], 50.0);
    assert_close(schedule.objective, 2502.0);
}

#[test]
fn startup_cost_decides_between_units() {
    let fleet = |startup: f64| {
        Fleet::new("startup")
            .with_unit(
                GeneratingUnit::new("G1", 0.0, 100.0, 10.0)
                    .with_commitment_costs(0.0, startup)
                    .with_initial_status(false, 5),
            )
            .with_unit(GeneratingUnit::new("G2", 0.0, 100.0, 12.0))
    };
    let request = commitment_request(vec![50.0, 50.0]);

    // 100 + 2 x 500 beats 2 x 600
    let outcome = Scheduler::new().schedule(&fleet(100.0), &request).unwrap();
    let schedule = outcome.run.result.schedule().expect("optimal");
    assert_eq!(schedule.commitment[0], vec![true, true]);
    assert_close(schedule.dispatch[0][0], 50.0);
    assert_close(schedule.objective, 1100.0);

    // 300 + 2 x 500 loses to 2 x 600
    let outcome = Scheduler::new().schedule(&fleet(300.0), &request).unwrap();
    let schedule = outcome.run.result.schedule().expect("optimal");
    assert_eq!(schedule.commitment[0], vec![false, false]);
    assert_close(schedule.dispatch[1][1], 50.0);
    assert_close(schedule.objective, 1200.0);
}

#[test]
fn infeasible_commitment_is_reported() {
    let request = commitment_request(vec![180.0]);
    let outcome = Scheduler::new().schedule(&base_and_peaker(1), &request).unwrap();

    assert!(matches!(outcome.run.result, SolveResult::Infeasible { .. }));
    assert_eq!(
        outcome.run.report.failure().map(|f| f.status),
        Some(FailureKind::Infeasible)
    );
}

/// MIP backend that uses its whole budget without finding an incumbent
struct Stalling;

impl ProgramBackend for Stalling {
    fn id(&self) -> &str {
        "stalling"
    }

    fn supported_classes(&self) -> &[ProblemClass] {
        &[ProblemClass::MixedIntegerProgram]
    }

    fn solve(&self, _program: &LinearProgram, limits: &SolveLimits) -> BackendOutcome {
        if let Some(limit) = limits.time_limit {
            std::thread::sleep(limit);
        }
        BackendOutcome::TimedOut("no incumbent before the time limit".into())
    }
}

#[test]
fn timeout_is_a_solver_error() {
    let scheduler = Scheduler::with_backends(
        Arc::new(ClarabelBackend::default()),
        Arc::new(Stalling),
    );
    let request = commitment_request(vec![80.0]).with_timeout_secs(0.05);

    let outcome = scheduler.schedule(&base_and_peaker(1), &request).unwrap();
    assert!(matches!(
        outcome.run.result,
        SolveResult::SolverError { timed_out: true, .. }
    ));

    let failure = outcome.run.report.failure().expect("failure record");
    assert_eq!(failure.status, FailureKind::SolverError);
    assert!(failure.message.starts_with("timed out"));
}
