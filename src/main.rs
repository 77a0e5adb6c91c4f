use clap::Parser;
use log::{error, info};
use sensor_gateway::config::{self, Config};
use sensor_gateway::gateway::GatewayContext;
use sensor_gateway::gateway::bridge::spawn_event_bridge;
use sensor_gateway::hardware::SimulatedBoard;
use sensor_gateway::registry::SensorRegistry;
use sensor_gateway::rpc::RpcServer;
use std::sync::Arc;
use tokio::signal;
use tokio::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "sensor-gateway", about = "JSON-RPC gateway for board sensors and actuators")]
struct Cli {
    /// TCP port for the JSON-RPC server
    #[arg(long, env = "GATEWAY_PORT")]
    port: Option<u16>,

    /// Seconds between periodic status notifications. Keep this shorter than
    /// the controller's staleness timeout.
    #[arg(long, env = "STATUS_INTERVAL_SECS")]
    status_interval_secs: Option<u64>,
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    // Environment mutation must happen while the process is still
    // single-threaded, so the runtime is built only after this point.
    config::load_dotenv();
    init_logger();

    // Task panics are contained by the runtime; log them and keep running
    std::panic::set_hook(Box::new(|info| {
        error!("Unhandled panic: {}", info);
    }));

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(port) = cli.port {
        config.rpc.port = port;
    }
    if let Some(secs) = cli.status_interval_secs {
        config.sweep.interval_secs = secs;
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };
    runtime.block_on(run(config));
}

async fn run(config: Config) {
    info!("Starting Sensor Gateway");
    info!("  Port: {}", config.rpc.port);
    info!("  Status interval: {}s", config.sweep.interval_secs);
    info!("  Board sample interval: {}s", config.board.sample_interval_secs);

    let registry = SensorRegistry::grove_kit();
    for device in registry.devices() {
        for sensor in &device.sensors {
            info!(
                "  Sensor id={} type={} name={}",
                sensor.id, sensor.kind, sensor.hardware_name
            );
        }
    }

    let (board, events) = SimulatedBoard::new();
    let ctx = Arc::new(GatewayContext::new(registry, Arc::new(board.clone())));

    let _board_task = board.start(Duration::from_secs(config.board.sample_interval_secs));
    let _bridge_task = spawn_event_bridge(
        ctx.clone(),
        events,
        Duration::from_secs(config.sweep.interval_secs),
    );

    let server = match RpcServer::bind(ctx, config.rpc.port).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start RPC server: {}", e);
            std::process::exit(1);
        }
    };
    let server_task = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!("RPC server error: {}", e);
        }
    });

    info!("Sensor Gateway is running");
    info!("  - Press Ctrl+C to exit");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal");
        }
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
        }
    }

    server_task.abort();
    info!("Sensor Gateway stopped");
}
