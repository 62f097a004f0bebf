use clap::Parser;
use ops_gate::config::Config;
use ops_gate::consts;
use ops_gate::transport::{Incoming, Initiator, Transport};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "config.yaml")]
    config_path: String,

    // MQTT connection
    #[arg(long)]
    mqtt_host: String,
    #[arg(long, default_value_t = 1883)]
    mqtt_port: u16,
    #[arg(long, default_value = "")]
    mqtt_username: String,
    #[arg(long, default_value = "")]
    mqtt_password: String,

    // Other
    #[arg(long, default_value = "ops-gate-console")]
    client_id: String,
}

fn init_log() {
    let timer = fmt::time::ChronoLocal::new("%H:%M:%S%.3f".to_string());

    // Configure a custom event formatter
    let format = fmt::format()
        .with_level(true)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_source_location(true)
        .with_timer(timer)
        .compact();

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::DEBUG.into())
        .from_env()
        .expect("RUST_LOG configuration is valid")
        .add_directive("rumqttc=info".parse().unwrap());

    fmt().event_format(format).with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_log();
    let args = Args::parse();

    let config = Config::from_file(&args.config_path)?;
    info!(
        "Starting {} {}. Zones: {}, access points: {}, overrides: {}, outdoor lights: {}",
        consts::OPS_NAME,
        consts::OPS_VERSION,
        config.zones.len(),
        config.access.len(),
        config.overrides.len(),
        config.outdoor.len()
    );

    let initiator = Initiator::new(
        &args.client_id,
        &args.mqtt_host,
        args.mqtt_port,
        &args.mqtt_username,
        &args.mqtt_password,
    )
    .await?;
    let (mqtt, mut incoming) = initiator.start();

    // Announce presence on the status topic.
    let online = serde_json::json!({
        "type": "console_online",
        "client": args.client_id,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    mqtt.publish(consts::TOPIC_STATUS, online.to_string())
        .await?;

    info!("{} initialized.", consts::OPS_NAME);

    // The status topic is observe-only: log controller reports until the
    // broker task dies.
    while let Some(Incoming::Status { payload }) = incoming.recv().await {
        info!("Controller status: {}", payload);
    }

    info!("Broker task finished, exiting");
    Ok(())
}
