use crate::{
    connection::ConnectionState,
    error::SinkError,
    metric_collector::MetricCollector,
    mqtt_config::MqttConfig,
    mqtt_wrapper::{MqttWrapper, QoS},
    station_record::StationRecord,
};

use log::{debug, warn};

/// Publishes every field of a record to `{base_topic}/{field}`.
pub struct SimpleMqtt<MQTT: MqttWrapper> {
    client: MQTT,
    base_topic: String,
}

impl<MQTT: MqttWrapper> SimpleMqtt<MQTT> {
    pub fn new(config: &MqttConfig) -> Self {
        Self::with_client(MQTT::new(config), config.base_topic())
    }

    pub fn with_client(client: MQTT, base_topic: &str) -> Self {
        Self {
            client,
            base_topic: base_topic.to_string(),
        }
    }

    pub fn client(&self) -> &MQTT {
        &self.client
    }
}

impl<MQTT: MqttWrapper> MetricCollector for SimpleMqtt<MQTT> {
    fn name(&self) -> &str {
        "mqtt"
    }

    fn publish(&mut self, record: &StationRecord) -> Result<(), SinkError> {
        if self.client.connection_state() != ConnectionState::Connected {
            return Err(SinkError::NotConnected(record.len()));
        }

        let mut failed = 0;
        let mut last_error = None;
        for (field, value) in record.iter() {
            let topic = format!("{}/{}", self.base_topic, field);
            let payload = value.to_string();
            debug!("Publishing to {topic} with payload {payload}");
            if let Err(e) = self.client.publish(topic, QoS::AtMostOnce, true, payload) {
                warn!("mqtt error: {e:?}");
                failed += 1;
                last_error = Some(e);
            }
        }

        match last_error {
            None => Ok(()),
            Some(e) => Err(SinkError::Publish {
                failed,
                total: record.len(),
                last: e.to_string(),
            }),
        }
    }
}
