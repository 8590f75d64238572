use serde_derive::Deserialize;

pub static DEFAULT_INFLUX_PORT: u16 = 8086;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct InfluxConfig {
    #[serde(default)]
    pub host: String,
    pub port: Option<u16>,
    #[serde(default)]
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl InfluxConfig {
    pub fn is_valid(&self) -> bool {
        !self.host.is_empty() && !self.database.is_empty()
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_INFLUX_PORT)
    }

    /// Write endpoint of the InfluxDB 1.x HTTP API.
    pub fn write_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            format!("{}:{}/write", self.host.trim_end_matches('/'), self.port())
        } else {
            format!("http://{}:{}/write", self.host, self.port())
        }
    }
}
