//! MQTT subscriber for weather observations
//!
//! Connects to a broker and subscribes to a topic carrying OpenWeather
//! current-weather JSON. Every valid payload replaces the shared latest
//! observation; the frame loop picks it up on its next frame.

use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use rumqttc::{Client, Connection, Event, MqttOptions, Packet, QoS};

use skyframe::config::FeedConfig;
use skyframe::weather::{LatestObservation, Observation};

/// Pause after a connection error before polling again
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Broker subscription feeding a [`LatestObservation`] from a background thread
pub struct WeatherFeed {
    _client: Client,
    _thread: thread::JoinHandle<()>,
}

impl WeatherFeed {
    /// Connect and subscribe. Fails immediately if the broker is unreachable.
    pub fn connect(config: &FeedConfig, latest: LatestObservation) -> Result<Self> {
        let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
        options.set_keep_alive(Duration::from_secs(30));

        let (client, mut connection) = Client::new(options, 10);
        client
            .subscribe(&config.topic, QoS::AtMostOnce)
            .with_context(|| format!("subscribing to '{}'", config.topic))?;

        // Poll once so an unreachable broker is reported up front
        match connection.iter().next() {
            Some(Ok(_)) => {},
            Some(Err(e)) => {
                return Err(e)
                    .with_context(|| format!("connecting to {}:{}", config.host, config.port));
            },
            None => return Err(anyhow!("connection to {}:{} closed", config.host, config.port)),
        }

        let topic = config.topic.clone();
        let handle = thread::Builder::new()
            .name("weather-feed".into())
            .spawn(move || message_loop(connection, &latest, &topic))
            .context("spawning feed thread")?;

        info!(
            "MQTT: connected to {}:{}, subscribed to '{}'",
            config.host, config.port, config.topic
        );

        Ok(Self {
            _client: client,
            _thread: handle,
        })
    }
}

fn message_loop(mut connection: Connection, latest: &LatestObservation, topic: &str) {
    for event in connection.iter() {
        match event {
            Ok(Event::Incoming(Packet::Publish(publish))) if publish.topic == topic => {
                match ingest(latest, &publish.payload) {
                    Ok(obs) => debug!("observation {} {:.1}", obs.icon, obs.temperature),
                    Err(e) => warn!("rejected payload on '{}': {:#}", topic, e),
                }
            },
            Ok(_) => {},
            Err(e) => {
                // rumqttc reconnects on the next poll
                warn!("MQTT error: {}", e);
                thread::sleep(RETRY_DELAY);
            },
        }
    }
}

/// Parse one payload and publish it
pub fn ingest(latest: &LatestObservation, payload: &[u8]) -> Result<Observation> {
    let text = std::str::from_utf8(payload).context("payload is not UTF-8")?;
    let obs = Observation::from_json(text.trim())?;
    latest.publish(obs);
    Ok(obs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyframe::weather::SAMPLE_PAYLOAD;

    #[test]
    fn test_ingest_publishes_valid_payload() {
        let latest = LatestObservation::new();
        let obs = ingest(&latest, SAMPLE_PAYLOAD.as_bytes()).unwrap();
        assert_eq!(latest.snapshot(), Some(obs));
    }

    #[test]
    fn test_ingest_keeps_previous_on_bad_payload() {
        let latest = LatestObservation::new();
        ingest(&latest, SAMPLE_PAYLOAD.as_bytes()).unwrap();
        let before = latest.snapshot();

        assert!(ingest(&latest, b"{\"main\":{}}").is_err());
        assert!(ingest(&latest, &[0xff, 0xfe]).is_err());
        assert_eq!(latest.snapshot(), before);
    }
}
