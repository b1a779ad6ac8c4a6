use crate::budget::BudgetPlan;
use crate::data::Sample;
use crate::target::RequestTarget;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio::time::Instant;
#[allow(unused)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Fans one run's budget plan out to concurrent workers.
///
/// One worker serves one identity and issues its assigned requests strictly
/// one at a time; parallelism comes from the number of simulated clients,
/// never from pipelining within a client. Workers stay independent: each
/// returns its own batch of samples, and the runner drains the batches at a
/// single consuming point once the workers finish.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    max_workers: Option<NonZeroUsize>,
    deadline: Option<Duration>,
}

impl Runner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps how many workers run simultaneously, regardless of how many
    /// identities the plan activates. Uncapped by default, which is the
    /// one-worker-per-identity model.
    pub fn max_workers(mut self, max_workers: NonZeroUsize) -> Self {
        self.max_workers = Some(max_workers);
        self
    }

    /// Bounds the whole run: once the deadline passes, workers finish their
    /// in-flight request and issue no further ones. Without a deadline a
    /// run ends only when every assigned request has completed.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Executes every active assignment and collects every produced sample.
    ///
    /// Waits for all workers; none are abandoned mid-request. The order of
    /// the returned samples carries no meaning.
    #[instrument(skip_all, fields(workers = plan.active_len(), budget = plan.total()))]
    pub async fn run<T>(&self, target: Arc<T>, plan: &BudgetPlan) -> Vec<Sample>
    where
        T: RequestTarget + 'static,
    {
        let deadline = self.deadline.map(|d| Instant::now() + d);
        let gate = self.max_workers.map(|n| Arc::new(Semaphore::new(n.get())));

        let mut workers = JoinSet::new();
        for assignment in plan.active() {
            let target = Arc::clone(&target);
            let identity = assignment.identity.clone();
            let count = assignment.count;
            let gate = gate.clone();

            workers.spawn(async move {
                let _permit = match gate {
                    Some(gate) => match acquire_slot(gate, deadline).await {
                        Some(permit) => Some(permit),
                        // Deadline passed while queued; this worker never starts.
                        None => return Vec::new(),
                    },
                    None => None,
                };

                let mut samples = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    if past_deadline(deadline) {
                        debug!(
                            user = identity.as_str(),
                            issued = samples.len(),
                            "run deadline reached"
                        );
                        break;
                    }
                    samples.push(target.execute(&identity).await);
                }
                samples
            });
        }

        let mut samples = Vec::with_capacity(plan.total() as usize);
        while let Some(worker) = workers.join_next().await {
            match worker {
                Ok(batch) => samples.extend(batch),
                Err(err) => error!("worker died mid-run: {err}"),
            }
        }

        if samples.len() < plan.total() as usize {
            warn!(
                collected = samples.len(),
                assigned = plan.total(),
                "run ended short of its budget"
            );
        }

        samples
    }
}

fn past_deadline(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

async fn acquire_slot(
    gate: Arc<Semaphore>,
    deadline: Option<Instant>,
) -> Option<OwnedSemaphorePermit> {
    let acquire = gate.acquire_owned();
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, acquire).await.ok()?.ok(),
        None => acquire.await.ok(),
    }
}
