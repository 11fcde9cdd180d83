use clap::Parser;

use cert_expiry_notifier::cli::Cli;
use cert_expiry_notifier::config::get_configuration;
use cert_expiry_notifier::startup::{Application, RunError};
use cert_expiry_notifier::telemetry::{get_subscriber, init_subscriber};

fn main() -> Result<(), RunError> {
    let cli = Cli::parse();
    let subscriber = get_subscriber(
        String::from("cert_expiry_notifier"),
        String::from("info"),
        std::io::stderr,
    );

    init_subscriber(subscriber);

    let config = get_configuration(&cli.config_dir, &cli.overrides())?;
    let application = Application::build(config)?;
    let summary = application.run()?;

    tracing::info!(
        "Finished: {} clients checked, {} notices",
        summary.checked,
        summary.notified
    );

    Ok(())
}
