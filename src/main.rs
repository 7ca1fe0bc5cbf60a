// SPDX-License-Identifier: MPL-2.0
use slideframe::app::{App, AppParts};
use slideframe::config::{self, Config};
use slideframe::error::{Error, Result};
use std::path::PathBuf;
use std::process::ExitCode;

const HELP: &str = "\
slideframe - digital picture and video frame

USAGE:
  slideframe [OPTIONS]

OPTIONS:
  --dir <PATH>        Media directory (overrides the config)
  --interval <MS>     Slideshow interval in milliseconds
  --config <PATH>     Load settings from this file
  --save-config       Persist the effective settings
  -h, --help          Print this help
";

struct Args {
    dir: Option<PathBuf>,
    interval_ms: Option<u64>,
    config: Option<PathBuf>,
    save_config: bool,
}

fn parse_args() -> Result<Option<Args>> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(None);
    }

    let map_err = |e: pico_args::Error| Error::Config(e.to_string());
    let parsed = Args {
        dir: args.opt_value_from_str("--dir").map_err(map_err)?,
        interval_ms: args.opt_value_from_str("--interval").map_err(map_err)?,
        config: args.opt_value_from_str("--config").map_err(map_err)?,
        save_config: args.contains("--save-config"),
    };

    let rest = args.finish();
    if !rest.is_empty() {
        return Err(Error::Config(format!("unexpected arguments: {rest:?}")));
    }
    Ok(Some(parsed))
}

fn effective_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => config::load_from_path(path)?,
        None => config::load()?,
    };
    if let Some(dir) = &args.dir {
        config.media_dir = Some(dir.clone());
    }
    if let Some(interval_ms) = args.interval_ms {
        config.slideshow.interval_ms = interval_ms;
    }

    if args.save_config {
        match &args.config {
            Some(path) => config::save_to_path(&config, path)?,
            None => config::save(&config)?,
        }
        log::info!("Settings saved");
    }
    Ok(config)
}

fn run() -> Result<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };
    let config = effective_config(&args)?;
    log::info!("Showing media from {}", config.media_dir().display());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("slideframe-timer")
        .enable_time()
        .build()?;

    let mut app = App::new(&config, AppParts::software(&config), runtime.handle().clone());
    app.start()?;
    app.wait();
    app.shutdown();
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
