//! Deep Search: bounded worker pool fetching full detail per candidate

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::error::{Result, SearchError};
use crate::rzp::RegistryClient;
use crate::types::{Candidate, DetailRecord, Outcome};

use super::scope::SearchScope;

type WorkQueue = Arc<Mutex<VecDeque<Candidate>>>;

/// Fetch a [`DetailRecord`] for every candidate
///
/// At most `min(workers, candidates.len())` fetches run at once. Output order
/// is unspecified. The first failure cancels `scope`; records fetched before
/// or after it are discarded.
pub async fn deep_search(
    client: Arc<dyn RegistryClient>,
    scope: &SearchScope,
    candidates: Vec<Candidate>,
    workers: usize,
) -> Result<Vec<DetailRecord>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let total = candidates.len();
    let worker_count = workers.max(1).min(total);
    tracing::debug!(candidates = total, workers = worker_count, "Deep search started");

    let queue: WorkQueue = Arc::new(Mutex::new(VecDeque::from(candidates)));
    // one slot per candidate: a worker never waits on the collector
    let (tx, mut rx) = mpsc::channel::<Outcome<DetailRecord>>(total);

    let mut pool = JoinSet::new();
    for worker_id in 0..worker_count {
        pool.spawn(run_worker(
            worker_id,
            client.clone(),
            queue.clone(),
            scope.clone(),
            tx.clone(),
        ));
    }
    drop(tx);

    let mut records = Vec::with_capacity(total);
    let mut first_error: Option<SearchError> = None;

    // drains until the last worker drops its sender
    while let Some(outcome) = rx.recv().await {
        match outcome {
            Ok(record) => records.push(record),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    while let Some(joined) = pool.join_next().await {
        if let Err(e) = joined {
            let error = SearchError::TaskPanicked(format!("deep search worker: {}", e));
            scope.fail(error.clone());
            first_error.get_or_insert(error);
        }
    }

    if let Some(error) = first_error {
        return Err(scope.resolve(error));
    }

    tracing::debug!(records = records.len(), "Deep search complete");
    Ok(records)
}

/// Drain the queue until it is empty or this worker reports a failure
async fn run_worker(
    worker_id: usize,
    client: Arc<dyn RegistryClient>,
    queue: WorkQueue,
    scope: SearchScope,
    tx: mpsc::Sender<Outcome<DetailRecord>>,
) {
    loop {
        let Some(candidate) = next_candidate(&queue) else {
            break;
        };

        let outcome = fetch_detail(client.as_ref(), &scope, &candidate).await;
        let failed = outcome.is_err();
        if let Err(ref e) = outcome {
            tracing::debug!(worker = worker_id, ico = %candidate.ico, error = %e, "Detail fetch failed");
            scope.fail(e.clone());
        }

        if tx.send(outcome).await.is_err() || failed {
            break;
        }
    }
}

fn next_candidate(queue: &WorkQueue) -> Option<Candidate> {
    queue
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .pop_front()
}

/// Both detail hops for one candidate, checking the scope before each
async fn fetch_detail(
    client: &dyn RegistryClient,
    scope: &SearchScope,
    candidate: &Candidate,
) -> Outcome<DetailRecord> {
    scope.ensure_active()?;
    let listing = client.get_listing(&candidate.reference).await?;

    if listing.ico != candidate.ico {
        return Err(SearchError::DataIntegrity(format!(
            "detail of candidate {} describes subject {}",
            candidate.ico, listing.ico
        )));
    }

    scope.ensure_active()?;
    let statement = client.get_statement(&listing.statement).await?;

    DetailRecord::assemble(listing, statement)
}
