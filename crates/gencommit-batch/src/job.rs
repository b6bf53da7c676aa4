use crate::scenario::ResolvedScenario;
use gencommit_algo::ScheduleRequest;
use gencommit_core::Fleet;
use serde::{Deserialize, Serialize};

/// Scheduling problem a job solves, named after the two engine modes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    EconomicDispatch,
    UnitCommitment,
}

impl TaskKind {
    pub fn for_request(request: &ScheduleRequest) -> Self {
        if request.enable_commitment {
            TaskKind::UnitCommitment
        } else {
            TaskKind::EconomicDispatch
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::EconomicDispatch => "ed",
            TaskKind::UnitCommitment => "uc",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchJob {
    pub job_id: String,
    pub scenario_id: String,
    pub task: TaskKind,
    pub tags: Vec<String>,
    pub request: ScheduleRequest,
    pub fleet: Fleet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchJobRecord {
    pub job_id: String,
    pub scenario_id: String,
    pub status: String,
    pub error: Option<String>,
    pub output: String,
    /// Objective of an optimal schedule
    #[serde(default)]
    pub total_cost: Option<f64>,
    #[serde(default)]
    pub warnings: usize,
}

impl BatchJobRecord {
    pub fn is_success(&self) -> bool {
        self.status == "optimal"
    }
}

pub fn jobs_from_scenarios(scenarios: &[ResolvedScenario]) -> Vec<BatchJob> {
    scenarios
        .iter()
        .map(|scenario| {
            let task = TaskKind::for_request(&scenario.request);
            BatchJob {
                job_id: format!("{}:{}", task.as_str(), scenario.scenario_id),
                scenario_id: scenario.scenario_id.clone(),
                task,
                tags: scenario.tags.clone(),
                request: scenario.request.clone(),
                fleet: scenario.fleet.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(id: &str, commitment: bool) -> ResolvedScenario {
        ResolvedScenario {
            scenario_id: id.into(),
            description: None,
            tags: vec!["tag".into()],
            request: ScheduleRequest::new(1, vec![10.0]).with_commitment(commitment),
            fleet: Fleet::new("f"),
        }
    }

    #[test]
    fn jobs_from_scenarios_builds_identifiers() {
        let jobs = jobs_from_scenarios(&[scenario("s1", false), scenario("s2", true)]);
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].job_id, "ed:s1");
        assert_eq!(jobs[1].job_id, "uc:s2");
        assert_eq!(jobs[1].task, TaskKind::UnitCommitment);
        assert_eq!(jobs[0].tags, vec!["tag".to_string()]);
    }
}
