use std::{env, path::PathBuf, process::ExitCode};

use tracing::info;

use market_viz::{config::ExportConfig, export};

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let mut config = ExportConfig::default();
    if let Ok(input) = env::var("MARKET_VIZ_EXPORT_INPUT") {
        config.input = PathBuf::from(input);
    }

    info!("Optimizing {}", config.input.display());
    match export::run(&config) {
        Ok(written) => {
            for image in written {
                info!(
                    "Created {} at {}x{}",
                    image.path.display(),
                    image.width,
                    image.height
                );
            }
            ExitCode::SUCCESS
        }
        Err(_) => ExitCode::FAILURE,
    }
}
