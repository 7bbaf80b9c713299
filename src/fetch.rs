use std::io::{self, Write};

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use tracing::debug;

use crate::{
    errors::{Result, UpscaleError},
    traits::ArchiveFetcher,
};

/// Blocking HTTP downloader with a byte progress bar.
pub struct HttpFetcher {
    client: Client,
    show_progress: bool,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| UpscaleError::Download {
                url: String::new(),
                source: Box::new(e),
            })?;

        Ok(Self {
            client,
            show_progress: true,
        })
    }

    /// プログレスバーを表示しない（テスト・非対話環境向け）
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    fn progress_bar(&self, total: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        match total {
            Some(len) => {
                let pb = ProgressBar::new(len);
                if let Ok(style) = ProgressStyle::with_template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
                ) {
                    pb.set_style(style.progress_chars("#>-"));
                }
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                if let Ok(style) =
                    ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {bytes}")
                {
                    pb.set_style(style);
                }
                pb
            }
        }
    }
}

impl ArchiveFetcher for HttpFetcher {
    fn fetch(&self, url: &str, destination: &mut dyn Write) -> Result<u64> {
        let download_error = |source: Box<dyn std::error::Error + Send + Sync>| {
            UpscaleError::Download {
                url: url.to_string(),
                source,
            }
        };

        let mut response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| download_error(Box::new(e)))?;

        let progress_bar = self.progress_bar(response.content_length());
        let mut writer = progress_bar.wrap_write(destination);
        let written = io::copy(&mut response, &mut writer).map_err(|e| download_error(Box::new(e)))?;
        writer.flush().map_err(|e| download_error(Box::new(e)))?;
        progress_bar.finish_and_clear();

        debug!(url, bytes = written, "download finished");
        Ok(written)
    }
}
