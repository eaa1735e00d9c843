#[macro_use]
extern crate tracing;

use std::path::PathBuf;
use std::sync::Arc;

use structopt::StructOpt;
use tokio::runtime::Builder;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;

use ledboard::{
    config::Config,
    control::Controller,
    global::GlobalData,
    models::DeviceId,
    poller::Poller,
    transport::{sim::SimTransport, Transport},
};

#[derive(Debug, StructOpt)]
struct Opts {
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u32,
    #[structopt(short, long = "config")]
    config_path: Option<PathBuf>,
    #[structopt(long)]
    dump_config: bool,
}

async fn run(opts: Opts) -> color_eyre::eyre::Result<()> {
    // Load configuration
    let config = if let Some(config_path) = opts.config_path.as_deref() {
        Config::load_file(config_path).await?
    } else {
        Config::default()
    };

    // Dump configuration if this was asked
    if opts.dump_config {
        print!("{}", config.to_string()?);
        return Ok(());
    }

    // Create the global state object
    let global = GlobalData::new(config.dimensions).wrap();

    // The simulated backend stands in for the hardware transport
    let sim = Arc::new(SimTransport::new(config.dimensions));
    for device in &config.devices {
        sim.add_board(&device.serial_number).await;
    }
    let transport: Arc<dyn Transport> = sim;

    // Register the configured devices
    let controller = Controller::new(global.clone(), transport.clone());
    for device in &config.devices {
        controller
            .register_device(
                DeviceId(device.device_number),
                &device.serial_number,
                device.friendly_name.as_deref(),
            )
            .await;
    }

    // Log status events as they come in
    let mut events = global.subscribe_events().await;
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => info!(event = %event, "status"),
                Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped = %skipped, "skipped status events");
                }
            }
        }
    });

    // Start the connection poller
    tokio::spawn(
        Poller::new(global.clone(), transport.clone())
            .with_interval(config.poll_interval())
            .run(),
    );

    // Should we continue running?
    let mut abort = false;

    while !abort {
        tokio::select! {
            _ = signal::ctrl_c() => {
                abort = true;
            }
        }
    }

    Ok(())
}

fn install_tracing(opts: &Opts) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let fmt_layer = fmt::layer();

    let filter_layer = EnvFilter::try_from_env("LEDBOARD_LOG").unwrap_or_else(|_| {
        EnvFilter::new(match opts.verbose {
            0 => "ledboard=warn,ledboardd=warn",
            1 => "ledboard=info,ledboardd=info",
            2 => "ledboard=debug,ledboardd=debug",
            _ => "ledboard=trace,ledboardd=trace",
        })
    });

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .try_init()
}

#[paw::main]
fn main(opts: Opts) -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    install_tracing(&opts)?;

    // Create tokio runtime
    let thd_count = match num_cpus::get() {
        1 => 2,
        other => other.min(4),
    };

    let rt = Builder::new_multi_thread()
        .worker_threads(thd_count)
        .enable_all()
        .build()?;
    rt.block_on(run(opts))
}
