use std::time::Duration;

use crossbeam::channel::{self, select, Receiver};
use log::{error, info, warn};

use crate::{
    error::{CycleError, SinkError},
    metric_collector::MetricCollector,
    solis_cloud::StationSource,
    station_record,
};

/// Time between two polls of the SolisCloud API.
pub static POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Outcome of one sink within a cycle.
#[derive(Debug)]
pub struct SinkOutcome {
    pub sink: String,
    pub result: Result<(), SinkError>,
}

#[derive(Debug)]
pub struct CycleReport {
    pub fields: usize,
    pub outcomes: Vec<SinkOutcome>,
}

impl CycleReport {
    pub fn all_delivered(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.result.is_ok())
    }
}

/// Runs fetch, extract and fan-out once per interval.
///
/// Cycles never overlap. A tick that fires while a cycle is still running is
/// held back and at most one such tick is kept, so a slow cycle is followed
/// immediately by the next one instead of by a burst.
pub struct Scheduler<S: StationSource> {
    source: S,
    sinks: Vec<Box<dyn MetricCollector>>,
    interval: Duration,
}

impl<S: StationSource> Scheduler<S> {
    pub fn new(source: S, sinks: Vec<Box<dyn MetricCollector>>, interval: Duration) -> Self {
        Self {
            source,
            sinks,
            interval,
        }
    }

    /// One poll. Sinks are only invoked once a record was extracted, and a
    /// failing sink does not keep the remaining sinks from being invoked.
    pub fn run_cycle(&mut self) -> Result<CycleReport, CycleError> {
        let response = self.source.fetch_station_list()?;
        let record = station_record::extract(&response)?;

        let outcomes = self
            .sinks
            .iter_mut()
            .map(|sink| SinkOutcome {
                sink: sink.name().to_string(),
                result: sink.publish(&record),
            })
            .collect();

        Ok(CycleReport {
            fields: record.len(),
            outcomes,
        })
    }

    fn tick(&mut self) {
        match self.run_cycle() {
            Ok(report) => {
                for outcome in &report.outcomes {
                    if let Err(e) = &outcome.result {
                        warn!("{} sink failed: {e}", outcome.sink);
                    }
                }
                info!(
                    "cycle done: {} fields, {}/{} sinks delivered",
                    report.fields,
                    report.outcomes.iter().filter(|o| o.result.is_ok()).count(),
                    report.outcomes.len()
                );
            }
            Err(e) => error!("cycle failed: {e}"),
        }
    }

    /// Poll immediately, then once per interval until `shutdown` receives a
    /// message or all of its senders are dropped.
    pub fn run(&mut self, shutdown: &Receiver<()>) {
        info!(
            "polling every {:.2}s with {} sinks",
            self.interval.as_secs_f64(),
            self.sinks.len()
        );
        let ticker = channel::tick(self.interval);

        self.tick();
        loop {
            select! {
                recv(ticker) -> _ => self.tick(),
                recv(shutdown) -> _ => {
                    info!("scheduler stopped");
                    return;
                }
            }
        }
    }
}
