// externally visible interfaces
pub mod connection;
pub mod error;
pub mod influx_config;
pub mod influxdb;
pub mod metric_collector;
pub mod mqtt_config;
pub mod mqtt_wrapper;
pub mod scheduler;
pub mod signer;
pub mod simple_mqtt;
pub mod solis_cloud;
pub mod station_record;

#[cfg(test)]
mod http_stub;
