use log::{ debug, error, info };

use crate::errors::SweepError;
use crate::models::record::ResultRecord;

/// Receives one notice per dispatched, completed and failed unit
pub trait SweepObserver: Send + Sync {
    fn on_started(&self, _property: &str, _n: u64) {}

    fn on_completed(&self, property: &str, record: &ResultRecord);

    fn on_failed(&self, property: &str, n: u64, error: &SweepError);
}

/// Observer that reports through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl SweepObserver for LogObserver {
    fn on_started(&self, property: &str, n: u64) {
        debug!("Started {} n={}", property, n);
    }

    fn on_completed(&self, property: &str, record: &ResultRecord) {
        info!("{} {} {} {}", property, record.n, record.value, record.duration_secs);
    }

    fn on_failed(&self, property: &str, n: u64, error: &SweepError) {
        error!("{} stalled at n={}: {}", property, n, error);
    }
}
