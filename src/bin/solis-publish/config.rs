use std::{env, fs};

use log::warn;
use serde_derive::Deserialize;
use solis2sinks::{
    influx_config::InfluxConfig, mqtt_config::MqttConfig, solis_cloud::DEFAULT_API_URL,
};

// no Debug: the struct carries the API secret and broker passwords
#[derive(Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub key_id: String,
    #[serde(default)]
    pub key_secret: String,
    pub api_url: Option<String>,
    #[serde(default)]
    pub influxdb: InfluxConfig,
    #[serde(default)]
    pub enable_mqtt: bool,
    pub mqtt: Option<MqttConfig>,
}

impl Config {
    pub fn is_valid(&self) -> bool {
        !self.key_id.is_empty()
            && !self.key_secret.is_empty()
            && self.influxdb.is_valid()
            && self.mqtt().map_or(true, |mqtt| mqtt.is_valid())
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// Broker settings, or `None` when MQTT publishing is switched off.
    pub fn mqtt(&self) -> Option<MqttConfig> {
        self.enable_mqtt
            .then(|| self.mqtt.clone().unwrap_or_default())
    }

    pub fn load() -> Config {
        // parse config from TOML file if present
        let filename = "config.toml";
        let contents = match fs::read_to_string(filename) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Could not read config.toml: {e}");
                "".into()
            }
        };
        Self::from_sources(&contents, |key| env::var(key).ok())
    }

    /// Parse `contents` as TOML, then apply the overrides that `var` yields.
    pub fn from_sources(contents: &str, var: impl Fn(&str) -> Option<String>) -> Config {
        let mut config = match toml::from_str::<Config>(contents) {
            Ok(config) => config,
            Err(e) => {
                warn!("toml config unparsable: {e}");
                Config::default()
            }
        };

        if let Some(api_url) = var("SOLIS_API_URL") {
            config.api_url = Some(api_url);
        }
        if let Some(key_id) = var("KEYID") {
            config.key_id = key_id;
        }
        if let Some(key_secret) = var("KEYSECRET") {
            config.key_secret = key_secret;
        }

        if let Some(host) = var("INFLUX_HOST") {
            config.influxdb.host = host;
        }
        if let Some(port) = var("INFLUX_PORT") {
            match port.parse() {
                Ok(port) => config.influxdb.port = Some(port),
                Err(e) => warn!("ignoring INFLUX_PORT={port}: {e}"),
            }
        }
        if let Some(database) = var("INFLUX_DATABASE") {
            config.influxdb.database = database;
        }
        if let Some(username) = var("INFLUX_USER") {
            config.influxdb.username = Some(username);
        }
        if let Some(password) = var("INFLUX_PASS") {
            config.influxdb.password = Some(password);
        }

        if let Some(enable) = var("ENABLE_MQTT") {
            config.enable_mqtt = parse_bool(&enable);
        }
        let mqtt = &mut config.mqtt;
        if let Some(host) = var("MQTT_HOST") {
            mqtt.get_or_insert_with(MqttConfig::default).host = host;
        }
        if let Some(port) = var("MQTT_PORT") {
            match port.parse() {
                Ok(port) => mqtt.get_or_insert_with(MqttConfig::default).port = Some(port),
                Err(e) => warn!("ignoring MQTT_PORT={port}: {e}"),
            }
        }
        if let Some(topic) = var("MQTT_TOPIC") {
            mqtt.get_or_insert_with(MqttConfig::default).topic = Some(topic);
        }
        if let Some(username) = var("MQTT_USER") {
            mqtt.get_or_insert_with(MqttConfig::default).username = Some(username);
        }
        if let Some(password) = var("MQTT_PASS") {
            mqtt.get_or_insert_with(MqttConfig::default).password = Some(password);
        }
        config
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
