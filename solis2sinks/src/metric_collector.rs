use crate::{error::SinkError, station_record::StationRecord};

pub trait MetricCollector {
    /// Short name used when reporting the outcome of a cycle.
    fn name(&self) -> &str;

    fn publish(&mut self, record: &StationRecord) -> Result<(), SinkError>;
}
