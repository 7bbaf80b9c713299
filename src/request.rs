use std::{
    fs,
    path::{Path, PathBuf},
};

use image::ImageFormat;
use tracing::warn;

use crate::{
    errors::{Result, UpscaleError},
    model::Mode,
};

/// One validated upscale invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpscaleRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub mode: Mode,
    pub extra_args: Vec<String>,
}

impl UpscaleRequest {
    /// Validate user input and prepare the output location.
    ///
    /// Checks run in order: mode, input existence, then the output's parent
    /// directory is created. Nothing here touches the network.
    pub fn validate(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        mode: Option<&str>,
        extra_args: Vec<String>,
    ) -> Result<Self> {
        let input = input.into();
        let output = output.into();

        let mode = mode.map(str::parse::<Mode>).transpose()?.unwrap_or_default();

        if !input.exists() {
            return Err(UpscaleError::validation(
                "input",
                format!("{} does not exist", input.display()),
            ));
        }

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| UpscaleError::FileSystem {
                path: parent.to_path_buf(),
                operation: "出力ディレクトリ作成".to_string(),
                source: e,
            })?;
        }

        if !is_writable_format(&output) {
            warn!(
                "{} does not end in png, jpg or webp; Real-ESRGAN may refuse to write it",
                output.display()
            );
        }

        Ok(Self {
            input,
            output,
            mode,
            extra_args,
        })
    }

    pub fn model_name(&self) -> &'static str {
        self.mode.model_name()
    }

    /// Arguments passed to the wrapped binary, in order.
    pub fn command_args(&self) -> Vec<String> {
        let mut args = vec![
            "-i".to_string(),
            self.input.to_string_lossy().into_owned(),
            "-o".to_string(),
            self.output.to_string_lossy().into_owned(),
            "-n".to_string(),
            self.model_name().to_string(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// 出力拡張子が realesrgan-ncnn-vulkan の書き出せる形式か
fn is_writable_format(path: &Path) -> bool {
    matches!(
        ImageFormat::from_path(path),
        Ok(ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP)
    )
}
