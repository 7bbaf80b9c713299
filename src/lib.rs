pub mod config;
pub mod errors;
pub mod fetch;
pub mod install;
pub mod model;
pub mod platform;
pub mod request;
pub mod runner;
pub mod traits;

pub mod mocks;

use std::path::PathBuf;

use tracing::info;

pub use config::Config;
pub use errors::{Result, UpscaleError};
pub use fetch::HttpFetcher;
pub use install::{Installer, DEFAULT_CACHE_DIR};
pub use model::Mode;
pub use platform::{Platform, PlatformProfile};
pub use request::UpscaleRequest;
pub use runner::SystemRunner;
pub use traits::*;

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpscaleOutcome {
    pub output: PathBuf,
    pub model: &'static str,
    pub binary: PathBuf,
}

/// Cache-or-fetch the Real-ESRGAN binary, then run it for a request.
pub struct Upscaler<F: ArchiveFetcher, R: ProcessRunner> {
    installer: Installer<F>,
    runner: R,
    platform: Platform,
}

impl<F: ArchiveFetcher, R: ProcessRunner> Upscaler<F, R> {
    pub fn new(fetcher: F, runner: R, cache_dir: impl Into<PathBuf>, platform: Platform) -> Self {
        Self {
            installer: Installer::new(fetcher, cache_dir),
            runner,
            platform,
        }
    }

    pub fn run(&self, request: &UpscaleRequest) -> Result<UpscaleOutcome> {
        let binary = self.installer.ensure_installed(self.platform)?;
        let args = request.command_args();

        info!(
            "Upscaling your image with command: {}",
            runner::display_command(&binary, &args)
        );
        self.runner.run(&binary, &args)?;

        let output = std::path::absolute(&request.output).unwrap_or_else(|_| request.output.clone());
        Ok(UpscaleOutcome {
            output,
            model: request.model_name(),
            binary,
        })
    }
}

impl Upscaler<HttpFetcher, SystemRunner> {
    /// Production wiring for the host platform.
    pub fn for_host(cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let platform = Platform::detect()?;
        Ok(Self::new(HttpFetcher::new()?, SystemRunner, cache_dir, platform))
    }
}
