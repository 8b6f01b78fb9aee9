use std::time::Duration;

use observable_value::DynError;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    module::NetspeedModule,
    settings::NetspeedSettings,
    source::ProcNetDev,
    speeds::{ByteRate, Speeds},
};

mod errors;
mod module;
mod settings;
mod source;
mod speeds;

const RECONFIGURE_AFTER: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), DynError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = NetspeedSettings::load()?;
    info!(?settings, "Starting netspeed module.");
    let module = NetspeedModule::from_settings(&settings, ProcNetDev::default());
    let measurements = module.measurements();
    let failures = measurements.subscribe();
    let mut outputs = module.stream();

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "Couldn't listen for Ctrl-C.");
        }
        ctrl_c.cancel();
    });

    let reconfigure = sleep(RECONFIGURE_AFTER);
    tokio::pin!(reconfigure);
    let mut reconfigured = false;

    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                info!("Shutting down netspeed module.");
                return Ok(());
            }
            Some(output) = outputs.recv() => {
                println!("{output}");
            }
            () = failures.tick() => {
                if let (_, Some(failure)) = measurements.get() {
                    error!(%failure, "Netspeed module failed.");
                    return Err(failure.to_string().into());
                }
            }
            () = &mut reconfigure, if !reconfigured => {
                reconfigured = true;
                info!("Switching to total speed, sampled every second.");
                module
                    .output(|speeds: &Speeds| format!("{} total", ByteRate(speeds.total())))
                    .refresh_interval(Duration::from_secs(1));
            }
        }
    }
}
