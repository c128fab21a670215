use std::cmp::Reverse;
use std::collections::{ BTreeMap, BinaryHeap, VecDeque };
use std::sync::Arc;
use std::time::Duration;

use log::{ debug, error, info };
use tokio::sync::mpsc::{ self, UnboundedSender };
use tokio::sync::{ OwnedSemaphorePermit, Semaphore };

use crate::errors::{ ErrorSeverity, SweepError, SweepResult };
use crate::implementations::config::SweepConfig;
use crate::implementations::evaluator::Evaluator;
use crate::models::catalog::Catalog;
use crate::models::common::DispatchPolicy;
use crate::models::record::ResultRecord;
use crate::traits::checkpoint_store::CheckpointStore;
use crate::traits::counting_oracle::CountingOracle;
use crate::traits::sweep_observer::{ LogObserver, SweepObserver };

/// Exclusive n bound used by the sweep policy when none is configured
pub const DEFAULT_SWEEP_BOUND: u64 = 100;

#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// Maximum number of concurrently running evaluations
    pub workers: usize,
    /// Exclusive bound on n; `None` runs until every property stalls
    pub max_n: Option<u64>,
    pub policy: DispatchPolicy,
    /// Wall-clock limit per unit; expiry is a failed, unrecorded completion
    pub unit_timeout: Option<Duration>,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            workers: 5,
            max_n: None,
            policy: DispatchPolicy::Resubmit,
            unit_timeout: None,
        }
    }
}

impl SchedulerOptions {
    pub fn from_config(config: &SweepConfig) -> Self {
        Self {
            workers: config.workers,
            max_n: config.max_n,
            policy: config.policy,
            unit_timeout: config.unit_timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitFailure {
    pub property: String,
    pub n: u64,
    pub message: String,
}

/// What one call to [`Scheduler::run`] did
#[derive(Debug, Clone, Default)]
pub struct SweepSummary {
    pub submitted: u64,
    pub appended: u64,
    pub failures: Vec<UnitFailure>,
    /// Next index per property when the run ended
    pub resume_points: BTreeMap<String, u64>,
}

enum WorkerEvent {
    Finished {
        property: usize,
        n: u64,
        outcome: SweepResult<ResultRecord>,
    },
    /// The worker thread is gone and its slot is free again
    Released,
}

enum ReadyQueue {
    Fifo(VecDeque<(usize, u64)>),
    LowestFirst(BinaryHeap<Reverse<(u64, usize)>>),
}

impl ReadyQueue {
    fn new(policy: DispatchPolicy) -> Self {
        match policy {
            DispatchPolicy::Resubmit => ReadyQueue::Fifo(VecDeque::new()),
            DispatchPolicy::Sweep => ReadyQueue::LowestFirst(BinaryHeap::new()),
        }
    }

    fn push(&mut self, property: usize, n: u64) {
        match self {
            ReadyQueue::Fifo(queue) => queue.push_back((property, n)),
            ReadyQueue::LowestFirst(heap) => heap.push(Reverse((n, property))),
        }
    }

    fn pop(&mut self) -> Option<(usize, u64)> {
        match self {
            ReadyQueue::Fifo(queue) => queue.pop_front(),
            ReadyQueue::LowestFirst(heap) => heap.pop().map(|Reverse((n, property))| (property, n)),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            ReadyQueue::Fifo(queue) => queue.is_empty(),
            ReadyQueue::LowestFirst(heap) => heap.is_empty(),
        }
    }
}

/// Drives a bounded worker pool over every (property, n) unit.
///
/// Each property has at most one unit in flight, and its next unit is only
/// queued after the previous record has been appended, so every checkpoint
/// stays contiguous regardless of how units of different properties interleave.
pub struct Scheduler<O, S> {
    catalog: Catalog,
    evaluator: Arc<Evaluator<O>>,
    store: S,
    observer: Arc<dyn SweepObserver>,
    options: SchedulerOptions,
}

impl<O, S> Scheduler<O, S> where O: CountingOracle + 'static, S: CheckpointStore {
    pub fn new(
        catalog: Catalog,
        evaluator: Arc<Evaluator<O>>,
        store: S,
        options: SchedulerOptions
    ) -> SweepResult<Self> {
        if options.workers == 0 {
            return Err(
                SweepError::Config(
                    crate::implementations::config::ConfigError::InvalidValue(
                        "workers must be at least 1".to_string()
                    )
                )
            );
        }
        Ok(Self {
            catalog,
            evaluator,
            store,
            observer: Arc::new(LogObserver),
            options,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn SweepObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Exclusive bound on n for this run
    pub fn bound(&self) -> Option<u64> {
        match self.options.policy {
            DispatchPolicy::Sweep => Some(self.options.max_n.unwrap_or(DEFAULT_SWEEP_BOUND)),
            DispatchPolicy::Resubmit => self.options.max_n,
        }
    }

    /// Run until no unit is queued or running. Only checkpoint failures end
    /// the run with an error; unit failures stall their property and are
    /// listed in the summary.
    pub async fn run(&self) -> SweepResult<SweepSummary> {
        let bound = self.bound();
        let mut summary = SweepSummary::default();
        let mut queue = ReadyQueue::new(self.options.policy);

        for (index, spec) in self.catalog.iter().enumerate() {
            let start = self.store.next_index(spec.name())?;
            summary.resume_points.insert(spec.name().to_string(), start);
            if within(bound, start) {
                queue.push(index, start);
            }
            debug!("{} resumes at n={}", spec.name(), start);
        }

        info!(
            "Scheduling {} properties on {} workers ({} policy, bound {})",
            self.catalog.len(),
            self.options.workers,
            self.options.policy,
            bound.map_or_else(|| "none".to_string(), |b| b.to_string())
        );

        let slots = Arc::new(Semaphore::new(self.options.workers));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut running = 0usize;

        loop {
            while !queue.is_empty() {
                let Ok(permit) = Arc::clone(&slots).try_acquire_owned() else {
                    break;
                };
                let Some((property, n)) = queue.pop() else {
                    break;
                };
                self.spawn_unit(property, n, permit, tx.clone());
                running += 1;
                summary.submitted += 1;
            }

            if running == 0 {
                break;
            }

            match rx.recv().await {
                Some(WorkerEvent::Released) => {
                    running -= 1;
                }
                Some(WorkerEvent::Finished { property, n, outcome }) => {
                    self.complete(&mut queue, &mut summary, bound, property, n, outcome)?;
                }
                None => break,
            }
        }

        info!(
            "Sweep finished: {} submitted, {} appended, {} failed",
            summary.submitted,
            summary.appended,
            summary.failures.len()
        );
        Ok(summary)
    }

    fn spawn_unit(
        &self,
        property: usize,
        n: u64,
        permit: OwnedSemaphorePermit,
        tx: UnboundedSender<WorkerEvent>
    ) {
        let catalog = self.catalog.clone();
        let evaluator = Arc::clone(&self.evaluator);
        let timeout = self.options.unit_timeout;
        let name = self.property_name(property);
        self.observer.on_started(&name, n);

        tokio::spawn(async move {
            let mut handle = tokio::task::spawn_blocking(move || {
                // held until the computation really ends, even after a timeout
                let _permit = permit;
                match catalog.get_index(property) {
                    Some(spec) => evaluator.evaluate_record(spec, n),
                    None => Err(SweepError::UnknownProperty(format!("#{}", property))),
                }
            });

            let joined = match timeout {
                Some(limit) => tokio::time::timeout(limit, &mut handle).await.ok(),
                None => Some((&mut handle).await),
            };
            let timed_out = joined.is_none();
            let outcome = match joined {
                Some(Ok(result)) => result,
                Some(Err(join_error)) =>
                    Err(SweepError::WorkerCrashed {
                        property: name.clone(),
                        n,
                        message: join_error.to_string(),
                    }),
                None =>
                    Err(SweepError::Timeout {
                        property: name.clone(),
                        n,
                        seconds: timeout.map_or(0.0, |t| t.as_secs_f64()),
                    }),
            };

            let _ = tx.send(WorkerEvent::Finished { property, n, outcome });
            if timed_out {
                let _ = handle.await;
            }
            let _ = tx.send(WorkerEvent::Released);
        });
    }

    fn complete(
        &self,
        queue: &mut ReadyQueue,
        summary: &mut SweepSummary,
        bound: Option<u64>,
        property: usize,
        n: u64,
        outcome: SweepResult<ResultRecord>
    ) -> SweepResult<()> {
        let name = self.property_name(property);
        match outcome {
            Ok(record) => {
                if let Err(e) = self.store.append(&name, &record) {
                    error!("Could not checkpoint {} n={}: {}", name, n, e);
                    self.observer.on_failed(&name, n, &e);
                    return Err(e);
                }
                summary.appended += 1;
                summary.resume_points.insert(name.clone(), n + 1);
                self.observer.on_completed(&name, &record);

                if within(bound, n + 1) {
                    queue.push(property, n + 1);
                }
                Ok(())
            }
            Err(e) => {
                self.observer.on_failed(&name, n, &e);
                summary.failures.push(UnitFailure { property: name, n, message: e.to_string() });
                if e.severity() == ErrorSeverity::Fatal {
                    return Err(e);
                }
                Ok(())
            }
        }
    }

    fn property_name(&self, index: usize) -> String {
        self.catalog
            .get_index(index)
            .map_or_else(|| format!("#{}", index), |spec| spec.name().to_string())
    }
}

fn within(bound: Option<u64>, n: u64) -> bool {
    bound.map_or(true, |b| n < b)
}
