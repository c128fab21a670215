use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::test;

use crate::errors::OracleFault;
use crate::implementations::evaluator::Evaluator;
use crate::implementations::file_store::FileCheckpointStore;
use crate::implementations::scheduler::{ Scheduler, SchedulerOptions, DEFAULT_SWEEP_BOUND };
use crate::models::catalog::Catalog;
use crate::models::common::DispatchPolicy;
use crate::models::property::PropertySpec;
use crate::models::record::ResultRecord;
use crate::tests::support::{ int, setup, ScriptedOracle };
use crate::traits::checkpoint_store::CheckpointStore;

fn catalog(names: &[&str]) -> Catalog {
    Catalog::new(
        names
            .iter()
            .map(|name| PropertySpec::builder(*name, format!("{}(x)", name.to_uppercase())).build().unwrap())
            .collect()
    ).unwrap()
}

fn options(workers: usize, max_n: u64, policy: DispatchPolicy) -> SchedulerOptions {
    SchedulerOptions {
        workers,
        max_n: Some(max_n),
        policy,
        unit_timeout: None,
    }
}

fn indices(store: &FileCheckpointStore, name: &str) -> Vec<u64> {
    store
        .read_all(name)
        .unwrap()
        .iter()
        .map(|r| r.n)
        .collect()
}

/// (formula, domain size) of every oracle call, in call order
fn call_order(evaluator: &Evaluator<ScriptedOracle>) -> Vec<(String, u64)> {
    evaluator
        .oracle()
        .calls()
        .into_iter()
        .map(|c| (c.formula, c.domain_size))
        .collect()
}

#[test]
async fn test_identically_false_property_records_zero_for_each_n() {
    setup();
    let tmp = TempDir::new().expect("create temp dir");
    let store = FileCheckpointStore::new(tmp.path());
    let spec = PropertySpec::builder("contradiction", "P(x) & ~P(x)").build().unwrap();
    let evaluator = Arc::new(
        Evaluator::new(ScriptedOracle::new(|_| Err(OracleFault::ZeroPolynomial("index out of range".to_string()))))
    );

    let scheduler = Scheduler::new(
        Catalog::new(vec![spec]).unwrap(),
        evaluator,
        store.clone(),
        options(2, 5, DispatchPolicy::Resubmit)
    ).unwrap();
    let summary = scheduler.run().await.unwrap();

    assert_eq!(summary.submitted, 5);
    assert_eq!(summary.appended, 5);
    assert!(summary.failures.is_empty());

    let records = store.read_all("contradiction").unwrap();
    assert_eq!(records.iter().map(|r| r.n).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    assert!(records.iter().all(|r| r.value == int(0)));
}

#[test]
async fn test_two_properties_single_worker() {
    setup();
    let tmp = TempDir::new().expect("create temp dir");
    let store = FileCheckpointStore::new(tmp.path());
    let evaluator = Arc::new(Evaluator::new(ScriptedOracle::new(|q| Ok(int(q.domain_size as i64)))));

    let scheduler = Scheduler::new(
        catalog(&["a", "b"]),
        Arc::clone(&evaluator),
        store.clone(),
        options(1, 3, DispatchPolicy::Resubmit)
    ).unwrap();
    let summary = scheduler.run().await.unwrap();

    assert_eq!(summary.submitted, 6);
    assert_eq!(summary.appended, 6);
    assert_eq!(indices(&store, "a"), vec![0, 1, 2]);
    assert_eq!(indices(&store, "b"), vec![0, 1, 2]);
    assert_eq!(evaluator.oracle().peak_concurrency(), 1);
    assert_eq!(summary.resume_points.get("a"), Some(&3));
    assert_eq!(summary.resume_points.get("b"), Some(&3));
}

#[test]
async fn test_resumes_from_existing_checkpoint() {
    setup();
    let tmp = TempDir::new().expect("create temp dir");
    let store = FileCheckpointStore::new(tmp.path());
    store.append("a", &ResultRecord { n: 0, value: int(11), duration_secs: 1.0 }).unwrap();
    store.append("a", &ResultRecord { n: 1, value: int(12), duration_secs: 1.0 }).unwrap();

    let evaluator = Arc::new(Evaluator::new(ScriptedOracle::new(|q| Ok(int(q.domain_size as i64)))));
    let scheduler = Scheduler::new(
        catalog(&["a"]),
        Arc::clone(&evaluator),
        store.clone(),
        options(3, 4, DispatchPolicy::Resubmit)
    ).unwrap();

    let summary = scheduler.run().await.unwrap();
    assert_eq!(summary.submitted, 2);
    assert_eq!(call_order(&evaluator), vec![("A(x)".to_string(), 2), ("A(x)".to_string(), 3)]);

    let records = store.read_all("a").unwrap();
    assert_eq!(records.iter().map(|r| r.n).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    // earlier records untouched
    assert_eq!(records[0].value, int(11));
    assert_eq!(records[1].value, int(12));

    let again = scheduler.run().await.unwrap();
    assert_eq!(again.submitted, 0);
    assert_eq!(indices(&store, "a"), vec![0, 1, 2, 3]);
}

#[test]
async fn test_failure_stalls_only_its_property() {
    setup();
    let tmp = TempDir::new().expect("create temp dir");
    let store = FileCheckpointStore::new(tmp.path());
    let evaluator = Arc::new(
        Evaluator::new(
            ScriptedOracle::new(|q| {
                if q.formula == "B(x)" && q.domain_size == 1 {
                    Err(OracleFault::Failed("resource exhausted".to_string()))
                } else {
                    Ok(int(1))
                }
            })
        )
    );

    let scheduler = Scheduler::new(
        catalog(&["a", "b"]),
        evaluator,
        store.clone(),
        options(2, 4, DispatchPolicy::Resubmit)
    ).unwrap();
    let summary = scheduler.run().await.unwrap();

    assert_eq!(indices(&store, "a"), vec![0, 1, 2, 3]);
    assert_eq!(indices(&store, "b"), vec![0]);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].property, "b");
    assert_eq!(summary.failures[0].n, 1);
    assert!(summary.failures[0].message.contains("resource exhausted"));
    assert_eq!(summary.resume_points.get("b"), Some(&1));
    assert_eq!(summary.submitted, 6);
    assert_eq!(summary.appended, 5);

    // a restart retries the stalled index
    let retry = Arc::new(Evaluator::new(ScriptedOracle::constant(int(2))));
    let scheduler = Scheduler::new(
        catalog(&["b"]),
        Arc::clone(&retry),
        store.clone(),
        options(2, 2, DispatchPolicy::Resubmit)
    ).unwrap();
    scheduler.run().await.unwrap();
    assert_eq!(call_order(&retry), vec![("B(x)".to_string(), 1)]);
    assert_eq!(indices(&store, "b"), vec![0, 1]);
}

#[test]
async fn test_worker_pool_bound_is_respected() {
    setup();
    let tmp = TempDir::new().expect("create temp dir");
    let store = FileCheckpointStore::new(tmp.path());
    let evaluator = Arc::new(
        Evaluator::new(ScriptedOracle::constant(int(1)).with_delay(Duration::from_millis(30)))
    );

    let scheduler = Scheduler::new(
        catalog(&["a", "b", "c", "d"]),
        Arc::clone(&evaluator),
        store.clone(),
        options(2, 3, DispatchPolicy::Resubmit)
    ).unwrap();
    let summary = scheduler.run().await.unwrap();

    assert_eq!(summary.appended, 12);
    assert!(evaluator.oracle().peak_concurrency() <= 2);
    for name in ["a", "b", "c", "d"] {
        assert_eq!(indices(&store, name), vec![0, 1, 2]);
    }
}

#[test]
async fn test_timeout_fails_unit_without_checkpoint() {
    setup();
    let tmp = TempDir::new().expect("create temp dir");
    let store = FileCheckpointStore::new(tmp.path());
    let evaluator = Arc::new(
        Evaluator::new(ScriptedOracle::constant(int(1)).with_delay(Duration::from_millis(300)))
    );

    let scheduler = Scheduler::new(catalog(&["slow"]), evaluator, store.clone(), SchedulerOptions {
        workers: 1,
        max_n: Some(3),
        policy: DispatchPolicy::Resubmit,
        unit_timeout: Some(Duration::from_millis(20)),
    }).unwrap();
    let summary = scheduler.run().await.unwrap();

    assert_eq!(summary.submitted, 1);
    assert_eq!(summary.appended, 0);
    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].message.contains("timed out"));
    assert!(store.read_all("slow").unwrap().is_empty());
}

#[test]
async fn test_sweep_dispatches_lowest_n_first() {
    setup();
    let tmp = TempDir::new().expect("create temp dir");
    let store = FileCheckpointStore::new(tmp.path());
    for n in 0..2 {
        store.append("a", &ResultRecord { n, value: int(1), duration_secs: 0.0 }).unwrap();
    }
    let evaluator = Arc::new(Evaluator::new(ScriptedOracle::constant(int(1))));

    let scheduler = Scheduler::new(
        catalog(&["a", "b"]),
        Arc::clone(&evaluator),
        store.clone(),
        options(1, 4, DispatchPolicy::Sweep)
    ).unwrap();
    scheduler.run().await.unwrap();

    let expected: Vec<(String, u64)> = [("B(x)", 0), ("B(x)", 1), ("A(x)", 2), ("B(x)", 2), ("A(x)", 3), ("B(x)", 3)]
        .iter()
        .map(|(f, n)| (f.to_string(), *n))
        .collect();
    assert_eq!(call_order(&evaluator), expected);
    assert_eq!(indices(&store, "a"), vec![0, 1, 2, 3]);
    assert_eq!(indices(&store, "b"), vec![0, 1, 2, 3]);
}

#[test]
async fn test_resubmit_rotates_in_completion_order() {
    setup();
    let tmp = TempDir::new().expect("create temp dir");
    let store = FileCheckpointStore::new(tmp.path());
    for n in 0..2 {
        store.append("a", &ResultRecord { n, value: int(1), duration_secs: 0.0 }).unwrap();
    }
    let evaluator = Arc::new(Evaluator::new(ScriptedOracle::constant(int(1))));

    let scheduler = Scheduler::new(
        catalog(&["a", "b"]),
        Arc::clone(&evaluator),
        store.clone(),
        options(1, 4, DispatchPolicy::Resubmit)
    ).unwrap();
    scheduler.run().await.unwrap();

    let expected: Vec<(String, u64)> = [("A(x)", 2), ("B(x)", 0), ("A(x)", 3), ("B(x)", 1), ("B(x)", 2), ("B(x)", 3)]
        .iter()
        .map(|(f, n)| (f.to_string(), *n))
        .collect();
    assert_eq!(call_order(&evaluator), expected);
}

#[test]
async fn test_sweep_without_bound_uses_default() {
    let tmp = TempDir::new().expect("create temp dir");
    let evaluator = Arc::new(Evaluator::new(ScriptedOracle::constant(int(1))));
    let scheduler = Scheduler::new(
        catalog(&["a"]),
        evaluator,
        FileCheckpointStore::new(tmp.path()),
        SchedulerOptions { policy: DispatchPolicy::Sweep, ..SchedulerOptions::default() }
    ).unwrap();
    assert_eq!(scheduler.bound(), Some(DEFAULT_SWEEP_BOUND));

    let unbounded = Scheduler::new(
        catalog(&["a"]),
        Arc::new(Evaluator::new(ScriptedOracle::constant(int(1)))),
        FileCheckpointStore::new(tmp.path()),
        SchedulerOptions::default()
    ).unwrap();
    assert_eq!(unbounded.bound(), None);
}

#[test]
async fn test_zero_workers_is_rejected() {
    let tmp = TempDir::new().expect("create temp dir");
    let result = Scheduler::new(
        catalog(&["a"]),
        Arc::new(Evaluator::new(ScriptedOracle::constant(int(1)))),
        FileCheckpointStore::new(tmp.path()),
        SchedulerOptions { workers: 0, ..SchedulerOptions::default() }
    );
    assert!(result.is_err());
}

/// Store whose appends always fail, as on a full or read-only disk
struct UnwritableStore {
    appends: std::sync::Mutex<u64>,
}

impl CheckpointStore for UnwritableStore {
    fn read_all(&self, _name: &str) -> crate::errors::SweepResult<Vec<ResultRecord>> {
        Ok(Vec::new())
    }

    fn append(&self, name: &str, _record: &ResultRecord) -> crate::errors::SweepResult<()> {
        *self.appends.lock().unwrap() += 1;
        Err(
            crate::errors::SweepError::io(
                format!("{}.out", name),
                std::io::Error::new(std::io::ErrorKind::Other, "no space left on device")
            )
        )
    }
}

#[derive(Default)]
struct FailureLog {
    failed: std::sync::Mutex<Vec<(String, u64)>>,
}

impl crate::traits::sweep_observer::SweepObserver for FailureLog {
    fn on_completed(&self, _property: &str, _record: &ResultRecord) {}

    fn on_failed(&self, property: &str, n: u64, _error: &crate::errors::SweepError) {
        self.failed.lock().unwrap().push((property.to_string(), n));
    }
}

#[test]
async fn test_checkpoint_failure_ends_the_run() {
    setup();
    let observer = Arc::new(FailureLog::default());
    let evaluator = Arc::new(Evaluator::new(ScriptedOracle::constant(int(1))));
    let scheduler = Scheduler::new(
        catalog(&["a"]),
        Arc::clone(&evaluator),
        UnwritableStore { appends: std::sync::Mutex::new(0) },
        options(2, 5, DispatchPolicy::Resubmit)
    )
        .unwrap()
        .with_observer(observer.clone());

    let result = scheduler.run().await;

    assert!(matches!(result, Err(crate::errors::SweepError::CheckpointIo { .. })));
    assert_eq!(*observer.failed.lock().unwrap(), vec![("a".to_string(), 0)]);
    // n=1 is never dispatched once n=0 could not be stored
    assert_eq!(call_order(&evaluator), vec![("A(x)".to_string(), 0)]);
}
