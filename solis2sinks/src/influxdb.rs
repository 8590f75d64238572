//! InfluxDB 1.x writer.
//!
//! Each cycle becomes one point in line protocol, without a timestamp so the
//! server assigns it:
//! ```text
//! solis power=5.2,dayEnergy=12
//! ```

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;

use crate::{
    error::SinkError, influx_config::InfluxConfig, metric_collector::MetricCollector,
    station_record::StationRecord,
};

pub static MEASUREMENT: &str = "solis";

static WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Encode `record` as a single line protocol point. Returns `None` for an
/// empty record, InfluxDB requires at least one field.
pub fn to_line_protocol(measurement: &str, record: &StationRecord) -> Option<String> {
    if record.is_empty() {
        return None;
    }
    let fields = record
        .iter()
        .map(|(key, value)| format!("{}={}", escape_key(key), value))
        .collect::<Vec<_>>()
        .join(",");
    Some(format!("{} {}", escape_measurement(measurement), fields))
}

/// Spaces and commas must be escaped with backslash.
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Commas, equals signs, and spaces must be escaped.
fn escape_key(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

pub struct InfluxDb {
    client: Client,
    url: String,
    config: InfluxConfig,
}

impl InfluxDb {
    pub fn new(config: &InfluxConfig) -> Result<Self, SinkError> {
        let client = Client::builder().timeout(WRITE_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: config.write_url(),
            config: config.clone(),
        })
    }
}

impl MetricCollector for InfluxDb {
    fn name(&self) -> &str {
        "influxdb"
    }

    fn publish(&mut self, record: &StationRecord) -> Result<(), SinkError> {
        let line = to_line_protocol(MEASUREMENT, record).ok_or(SinkError::EmptyRecord)?;
        debug!("Writing to {} with payload {line}", self.url);

        let mut request = self
            .client
            .post(&self.url)
            .query(&[("db", self.config.database.as_str())])
            .body(line);
        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_ref());
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Status(status));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_stub;
    use crate::station_record::StationListResponse;

    fn record(body: &str) -> StationRecord {
        let response = StationListResponse::from_slice(body.as_bytes()).unwrap();
        crate::station_record::extract(&response).unwrap()
    }

    #[test]
    fn single_point_without_timestamp() {
        let record = record(
            r#"{"data":{"page":{"records":[{"power":"5.2","dayEnergy":"12.0","junkField":"x"}]}}}"#,
        );
        assert_eq!(
            to_line_protocol(MEASUREMENT, &record).unwrap(),
            "solis power=5.2,dayEnergy=12"
        );
    }

    #[test]
    fn escapes_measurement() {
        let record = record(r#"{"data":{"page":{"records":[{"all":1}]}}}"#);
        assert_eq!(
            to_line_protocol("my solis,v2", &record).unwrap(),
            "my\\ solis\\,v2 all=1"
        );
    }

    #[test]
    fn empty_record_is_not_written() {
        let record = record(r#"{"data":{"page":{"records":[{"stationName":"home"}]}}}"#);
        assert_eq!(to_line_protocol(MEASUREMENT, &record), None);

        let mut sink = InfluxDb::new(&InfluxConfig {
            host: "127.0.0.1".into(),
            port: Some(9),
            database: "solar".into(),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(sink.publish(&record), Err(SinkError::EmptyRecord)));
    }

    #[test]
    fn unreachable_server_reports_transport_error() {
        let record = record(r#"{"data":{"page":{"records":[{"power":1.5}]}}}"#);
        let mut sink = InfluxDb::new(&InfluxConfig {
            host: "127.0.0.1".into(),
            port: Some(9),
            database: "solar".into(),
            username: Some("user".into()),
            password: Some("pass".into()),
        })
        .unwrap();
        assert!(matches!(sink.publish(&record), Err(SinkError::Transport(_))));
    }

    fn local_sink(base_url: &str, username: Option<&str>, password: Option<&str>) -> InfluxDb {
        let (host, port) = base_url.rsplit_once(':').unwrap();
        InfluxDb::new(&InfluxConfig {
            host: host.into(),
            port: Some(port.parse().unwrap()),
            database: "solar".into(),
            username: username.map(Into::into),
            password: password.map(Into::into),
        })
        .unwrap()
    }

    #[test]
    fn writes_point_to_database() {
        let (base_url, server) = http_stub::serve_once(204, "");
        let mut sink = local_sink(&base_url, Some("user"), Some("pass"));
        let record = record(r#"{"data":{"page":{"records":[{"power":"5.2","dayEnergy":"12.0"}]}}}"#);

        assert!(sink.publish(&record).is_ok());

        let request = server.join().unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.target, "/write?db=solar");
        assert_eq!(request.header("Authorization"), Some("Basic dXNlcjpwYXNz"));
        assert_eq!(request.body, b"solis power=5.2,dayEnergy=12");
    }

    #[test]
    fn no_credentials_no_auth_header() {
        let (base_url, server) = http_stub::serve_once(204, "");
        let mut sink = local_sink(&base_url, None, None);
        let record = record(r#"{"data":{"page":{"records":[{"power":1.5}]}}}"#);

        assert!(sink.publish(&record).is_ok());
        assert_eq!(server.join().unwrap().header("Authorization"), None);
    }

    #[test]
    fn server_error_is_a_status_error() {
        let (base_url, server) = http_stub::serve_once(500, r#"{"error":"database not found"}"#);
        let mut sink = local_sink(&base_url, None, None);
        let record = record(r#"{"data":{"page":{"records":[{"power":1.5}]}}}"#);

        assert!(matches!(
            sink.publish(&record),
            Err(SinkError::Status(status)) if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR
        ));
        server.join().unwrap();
    }
}
