use crate::{connection::ConnectionState, mqtt_config::MqttConfig};

#[derive(Clone, Copy)]
pub enum QoS {
    AtMostOnce,
}

pub trait MqttWrapper {
    // This trait provides an interface that the decouples library code from an
    // implementation of the MQTT client. On library calling code, one needs to
    // wrap the MQTT implementation, i.e. the client, in a new type that in
    // turn implements this trait.

    fn publish<S, V>(&mut self, topic: S, qos: QoS, retain: bool, payload: V) -> anyhow::Result<()>
    where
        S: Clone + Into<String>,
        V: Clone + Into<Vec<u8>>;

    /// Current state of the broker connection. Must not block.
    fn connection_state(&self) -> ConnectionState;

    fn new(config: &MqttConfig) -> Self;
}
