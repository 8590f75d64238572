use std::{sync::Arc, thread, time::Duration};

use log::{info, warn};
use parking_lot::Mutex;

/// Fixed pause between two connection attempts.
pub static RECONNECT_DELAY: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Notifications from a broker transport's event loop.
#[derive(Debug)]
pub enum TransportEvent {
    Connected,
    Disconnected(String),
    Activity,
}

/// Read-only view on the state owned by a [`ConnectionMonitor`].
#[derive(Clone, Debug)]
pub struct ConnectionStatus {
    state: Arc<Mutex<ConnectionState>>,
}

impl ConnectionStatus {
    pub fn get(&self) -> ConnectionState {
        *self.state.lock()
    }

    pub fn is_connected(&self) -> bool {
        self.get() == ConnectionState::Connected
    }
}

/// Owns the connection state and is the only writer of it.
///
/// `run` consumes the transport's event stream on a single thread. Pulling the
/// next event after a disconnect is what makes the transport attempt a new
/// connection, so there is never more than one attempt in flight.
pub struct ConnectionMonitor {
    state: Arc<Mutex<ConnectionState>>,
    delay: Duration,
}

impl ConnectionMonitor {
    pub fn new(delay: Duration) -> (Self, ConnectionStatus) {
        let state = Arc::new(Mutex::new(ConnectionState::Disconnected));
        let status = ConnectionStatus {
            state: state.clone(),
        };
        (Self { state, delay }, status)
    }

    fn set_state(&self, new_state: ConnectionState) {
        let mut state = self.state.lock();
        if *state != new_state {
            *state = new_state;
            info!("MQTT broker is {new_state:?}");
        }
    }

    /// Drive the state machine until the event stream ends.
    pub fn run<I>(self, events: I)
    where
        I: IntoIterator<Item = TransportEvent>,
    {
        self.set_state(ConnectionState::Connecting);
        for event in events {
            match event {
                TransportEvent::Connected => self.set_state(ConnectionState::Connected),
                TransportEvent::Disconnected(reason) => {
                    self.set_state(ConnectionState::Disconnected);
                    warn!(
                        "MQTT connection lost: {reason}, retrying in {}s",
                        self.delay.as_secs_f32()
                    );
                    thread::sleep(self.delay);
                    self.set_state(ConnectionState::Connecting);
                }
                TransportEvent::Activity => {}
            }
        }
        self.set_state(ConnectionState::Disconnected);
    }
}
