use serde_derive::Deserialize;

pub static DEFAULT_MQTT_HOST: &str = "localhost";
pub static DEFAULT_MQTT_PORT: u16 = 1883;
pub static DEFAULT_MQTT_TOPIC: &str = "solis/data";

#[derive(Clone, Debug, Deserialize)]
pub struct MqttConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: Option<String>,
    pub topic: Option<String>,
}

fn default_host() -> String {
    DEFAULT_MQTT_HOST.to_string()
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
            username: None,
            password: None,
            client_id: None,
            topic: None,
        }
    }
}

impl MqttConfig {
    pub fn is_valid(&self) -> bool {
        !self.host.is_empty()
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_MQTT_PORT)
    }

    pub fn base_topic(&self) -> &str {
        self.topic
            .as_deref()
            .map(|topic| topic.trim_end_matches('/'))
            .unwrap_or(DEFAULT_MQTT_TOPIC)
    }
}
