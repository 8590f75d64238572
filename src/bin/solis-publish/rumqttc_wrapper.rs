use std::{thread, time::Duration};

use rumqttc::{Client, ConnectionError, Event, MqttOptions, Packet};
use solis2sinks::{
    connection::{
        ConnectionMonitor, ConnectionState, ConnectionStatus, TransportEvent, RECONNECT_DELAY,
    },
    mqtt_config::MqttConfig,
    mqtt_wrapper::{self},
};

pub struct RumqttcWrapper {
    client: Client,
    status: ConnectionStatus,
}

fn match_qos(qos: mqtt_wrapper::QoS) -> rumqttc::QoS {
    match qos {
        mqtt_wrapper::QoS::AtMostOnce => rumqttc::QoS::AtMostOnce,
    }
}

fn transport_event(event: Result<Event, ConnectionError>) -> TransportEvent {
    match event {
        Ok(Event::Incoming(Packet::ConnAck(_))) => TransportEvent::Connected,
        Ok(Event::Incoming(Packet::Disconnect)) => {
            TransportEvent::Disconnected("broker closed the session".into())
        }
        Ok(_) => TransportEvent::Activity,
        Err(e) => TransportEvent::Disconnected(e.to_string()),
    }
}

impl mqtt_wrapper::MqttWrapper for RumqttcWrapper {
    fn publish<S, V>(
        &mut self,
        topic: S,
        qos: mqtt_wrapper::QoS,
        retain: bool,
        payload: V,
    ) -> anyhow::Result<()>
    where
        S: Clone + Into<String>,
        V: Clone + Into<Vec<u8>>,
    {
        // try_publish never waits for the broker, retry once if the request queue is full
        if self
            .client
            .try_publish(topic.clone(), match_qos(qos), retain, payload.clone())
            .is_ok()
        {
            return Ok(());
        }
        thread::sleep(Duration::from_millis(100));
        Ok(self
            .client
            .try_publish(topic, match_qos(qos), retain, payload)?)
    }

    fn connection_state(&self) -> ConnectionState {
        self.status.get()
    }

    fn new(config: &MqttConfig) -> Self {
        let mut mqttoptions = MqttOptions::new(
            config
                .client_id
                .clone()
                .unwrap_or_else(|| "solis-publish".to_string()),
            &config.host,
            config.port(),
        );
        mqttoptions.set_keep_alive(Duration::from_secs(5));

        //parse the mqtt authentication options
        if let Some((username, password)) = match (&config.username, &config.password) {
            (None, None) => None,
            (None, Some(_)) => None,
            (Some(username), None) => Some((username.clone(), "".into())),
            (Some(username), Some(password)) => Some((username.clone(), password.clone())),
        } {
            mqttoptions.set_credentials(username, password);
        }

        let (client, mut connection) = Client::new(mqttoptions, 512);
        let (monitor, status) = ConnectionMonitor::new(RECONNECT_DELAY);

        thread::spawn(move || {
            // polling the event loop sends outgoing messages and, after an
            // error, is what triggers the next connection attempt. The loop
            // ends once the client is dropped.
            monitor.run(connection.iter().map(transport_event));
        });
        Self { client, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rumqttc::{ConnAck, ConnectReturnCode, Outgoing};
    use std::io;

    #[test]
    fn connack_means_connected() {
        let event = Ok(Event::Incoming(Packet::ConnAck(ConnAck {
            session_present: false,
            code: ConnectReturnCode::Success,
        })));
        assert!(matches!(transport_event(event), TransportEvent::Connected));
    }

    #[test]
    fn broker_disconnect_means_disconnected() {
        let event = Ok(Event::Incoming(Packet::Disconnect));
        assert!(matches!(
            transport_event(event),
            TransportEvent::Disconnected(_)
        ));
    }

    #[test]
    fn event_loop_error_means_disconnected() {
        let event = Err(ConnectionError::Io(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "connection refused",
        )));
        match transport_event(event) {
            TransportEvent::Disconnected(reason) => assert!(reason.contains("connection refused")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn other_traffic_is_activity() {
        for event in [
            Ok(Event::Incoming(Packet::PingResp)),
            Ok(Event::Outgoing(Outgoing::PingReq)),
        ] {
            assert!(matches!(transport_event(event), TransportEvent::Activity));
        }
    }
}
