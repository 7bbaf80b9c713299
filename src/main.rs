use std::{io::IsTerminal, process::ExitCode};

use anyhow::Result;
use clap::error::ErrorKind;

use realesrgan_portable::{Config, UpscaleError, UpscaleOutcome, UpscaleRequest, Upscaler};

fn main() -> ExitCode {
    let config = match Config::try_parse_args(std::env::args_os()) {
        Ok(config) => config,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    init_tracing();

    match run(config) {
        Ok(outcome) => {
            println!(
                "Image upscale complete: {}, using model: {}",
                outcome.output.display(),
                outcome.model
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err
                .downcast_ref::<UpscaleError>()
                .map_or(1, UpscaleError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(config: Config) -> Result<UpscaleOutcome> {
    // 検証はダウンロードや子プロセス起動より先に行う
    let request = UpscaleRequest::validate(
        config.input,
        config.output,
        config.mode.as_deref(),
        config.extra_args,
    )?;

    let upscaler = Upscaler::for_host(config.cache_dir)?;
    Ok(upscaler.run(&request)?)
}

fn init_tracing() {
    let ansi_enabled = std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(ansi_enabled)
        .init();
}
