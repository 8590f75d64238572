mod config;
mod logging;
mod rumqttc_wrapper;

use anyhow::bail;
use config::Config;
use crossbeam::channel;
use rumqttc_wrapper::RumqttcWrapper;
use solis2sinks::influxdb::InfluxDb;
use solis2sinks::metric_collector::MetricCollector;
use solis2sinks::scheduler::{Scheduler, POLL_INTERVAL};
use solis2sinks::signer::Credentials;
use solis2sinks::simple_mqtt::SimpleMqtt;
use solis2sinks::solis_cloud::SolisCloud;

use log::{error, info};

fn main() {
    logging::init_logger();
    info!("Running revision: {}", env!("GIT_HASH"));
    if std::env::args().len() > 1 {
        error!("Arguments passed. Tool is configured by config.toml and environment variables");
    }

    if let Err(e) = run() {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = Config::load();
    if !config.is_valid() {
        bail!("incomplete configuration: KEYID, KEYSECRET, INFLUX_HOST and INFLUX_DATABASE are required");
    }

    let credentials = Credentials::new(config.key_id.as_str(), config.key_secret.as_str());
    let solis_cloud = SolisCloud::new(config.api_url(), credentials)?;

    let mut output_channels: Vec<Box<dyn MetricCollector>> = Vec::new();
    info!(
        "Publishing to InfluxDB {} database {}",
        config.influxdb.write_url(),
        config.influxdb.database
    );
    output_channels.push(Box::new(InfluxDb::new(&config.influxdb)?));

    if let Some(mqtt) = config.mqtt() {
        info!(
            "Publishing to MQTT broker {}:{} under {}",
            mqtt.host,
            mqtt.port(),
            mqtt.base_topic()
        );
        output_channels.push(Box::new(SimpleMqtt::<RumqttcWrapper>::new(&mqtt)));
    } else {
        info!("MQTT publishing disabled");
    }

    // the sender lives as long as the process, so the scheduler never stops
    let (_stop, shutdown) = channel::bounded::<()>(0);
    Scheduler::new(solis_cloud, output_channels, POLL_INTERVAL).run(&shutdown);
    Ok(())
}
