/*
 * flock3d
 *
 * 3-D boid flocking. Opens a nannou window with an egui control panel, or
 * with --headless steps the flock without a window and logs a summary.
 */

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use flock3d::app;
use flock3d::cli::Cli;
use flock3d::headless;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose when set
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to set tracing subscriber: {err}");
    }

    let params = cli.flock_params();
    if let Err(err) = params.validate() {
        error!(%err, "invalid parameters");
        std::process::exit(2);
    }

    if cli.headless {
        match headless::run(params, cli.steps) {
            Ok(report) => info!("{report}"),
            Err(err) => {
                error!(%err, "headless run failed");
                std::process::exit(1);
            }
        }
        return;
    }

    nannou::app(app::model).update(app::update).run();
}
