//! Stone field viewer
//!
//! Usage: `stonefield [config.json]`
//!
//! Without a config the stock scene is used. Set `RUST_LOG=debug` for
//! more output.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use stonefield::FieldConfig;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match env::args().nth(1).map(PathBuf::from) {
        Some(path) => match FieldConfig::load(&path) {
            Ok(config) => {
                log::info!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::error!("{}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => FieldConfig::default(),
    };

    match stonefield::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
