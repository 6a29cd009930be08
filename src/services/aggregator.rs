use std::future::Future;
use std::time::{Duration, Instant};

use crate::{
    error::AppResult,
    models::{Candidate, RecommendationRequest},
    services::sources::{ExternalSource, LocalSource},
};

/// One of the two concurrent source calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Local,
    External,
}

impl Branch {
    fn as_str(&self) -> &'static str {
        match self {
            Branch::Local => "local",
            Branch::External => "external",
        }
    }
}

/// Terminal state of a branch
///
/// Every outcome contributes a list to the join; none is surfaced as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum BranchOutcome {
    Completed(Vec<Candidate>),
    TimedOut,
    Failed,
    /// Not scheduled at all: switched off by config or by the request
    Disabled,
}

impl BranchOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            BranchOutcome::Completed(_) => "completed",
            BranchOutcome::TimedOut => "timed_out",
            BranchOutcome::Failed => "failed",
            BranchOutcome::Disabled => "disabled",
        }
    }

    pub fn candidates(&self) -> &[Candidate] {
        match self {
            BranchOutcome::Completed(candidates) => candidates,
            _ => &[],
        }
    }

    pub fn into_candidates(self) -> Vec<Candidate> {
        match self {
            BranchOutcome::Completed(candidates) => candidates,
            _ => Vec::new(),
        }
    }
}

/// What both branches produced for one request
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub local: BranchOutcome,
    pub external: BranchOutcome,
}

impl Aggregate {
    /// Local candidates followed by External candidates
    pub fn into_candidates(self) -> Vec<Candidate> {
        let mut all = self.local.into_candidates();
        all.extend(self.external.into_candidates());
        all
    }
}

/// Runs the Local and External sources side by side under separate deadlines
///
/// Each branch is a spawned task. A branch that misses its deadline is
/// abandoned, not aborted: the task keeps running until the source returns and
/// its result is dropped. Callers wait at most the larger of the two deadlines;
/// leaked work is bounded by the source's own worst-case latency. This trades
/// resource reclamation for bounded response time.
#[derive(Clone)]
pub struct Aggregator {
    local: LocalSource,
    external: ExternalSource,
    local_deadline: Duration,
    external_deadline: Duration,
}

impl Aggregator {
    pub fn new(
        local: LocalSource,
        external: ExternalSource,
        local_deadline: Duration,
        external_deadline: Duration,
    ) -> Self {
        Self {
            local,
            external,
            local_deadline,
            external_deadline,
        }
    }

    pub async fn aggregate(&self, request: &RecommendationRequest) -> Aggregate {
        let start = Instant::now();

        let local_branch = {
            let source = self.local.clone();
            let ingredients = request.user_ingredients.clone();
            let max_results = request.max_local_results;
            run_branch(Branch::Local, self.local_deadline, async move {
                source.fetch(&ingredients, max_results).await
            })
        };

        let external_enabled = request.enable_external && self.external.is_enabled();
        let external_branch = async {
            if !external_enabled {
                tracing::info!(
                    branch = Branch::External.as_str(),
                    outcome = "disabled",
                    by_request = !request.enable_external,
                    "Branch skipped"
                );
                return BranchOutcome::Disabled;
            }

            let source = self.external.clone();
            let ingredients = request.user_ingredients.clone();
            let max_results = request.max_external_results;
            run_branch(Branch::External, self.external_deadline, async move {
                source.fetch(&ingredients, max_results).await
            })
            .await
        };

        let (local, external) = tokio::join!(local_branch, external_branch);

        tracing::info!(
            local = local.label(),
            local_count = local.candidates().len(),
            external = external.label(),
            external_count = external.candidates().len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Branches joined"
        );

        Aggregate { local, external }
    }
}

/// Spawns `work` and waits for it up to `deadline`
///
/// On timeout the `JoinHandle` is dropped, which detaches the task rather
/// than cancelling it.
async fn run_branch<F>(branch: Branch, deadline: Duration, work: F) -> BranchOutcome
where
    F: Future<Output = AppResult<Vec<Candidate>>> + Send + 'static,
{
    let start = Instant::now();
    let handle = tokio::spawn(work);

    let outcome = match tokio::time::timeout(deadline, handle).await {
        Ok(Ok(Ok(candidates))) => BranchOutcome::Completed(candidates),
        Ok(Ok(Err(e))) => {
            tracing::warn!(branch = branch.as_str(), error = %e, "Source call failed");
            BranchOutcome::Failed
        }
        Ok(Err(e)) => {
            tracing::error!(branch = branch.as_str(), error = %e, "Branch task join error");
            BranchOutcome::Failed
        }
        Err(_) => {
            tracing::warn!(
                branch = branch.as_str(),
                deadline_ms = deadline.as_millis() as u64,
                "Source call exceeded deadline; result will be discarded"
            );
            BranchOutcome::TimedOut
        }
    };

    tracing::info!(
        branch = branch.as_str(),
        outcome = outcome.label(),
        count = outcome.candidates().len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Branch finished"
    );

    outcome
}
