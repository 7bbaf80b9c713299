use clap::Parser;
use std::{ffi::OsString, path::PathBuf};

use crate::install::DEFAULT_CACHE_DIR;

/// Upscale an image with the portable Real-ESRGAN binary, downloading it on first use.
#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Path to the input image
    pub input: PathBuf,

    /// Path to save the upscaled image
    pub output: PathBuf,

    /// Type of image: `anime` or `general` [default: general]
    pub mode: Option<String>,

    /// Extra arguments passed to Real-ESRGAN as-is
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub extra_args: Vec<String>,

    /// Where the extracted Real-ESRGAN release is cached
    #[arg(long, env = "REALESRGAN_CACHE_DIR", default_value = DEFAULT_CACHE_DIR)]
    pub cache_dir: PathBuf,
}

impl Config {
    /// Parse a full argv, program name first.
    ///
    /// Everything after MODE is forwarded verbatim and never reaches clap, so
    /// `-h` or `--cache-dir` there belong to Real-ESRGAN, not to this tool.
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let (head, extra_args) = split_extra_args(args.into_iter().map(Into::into).collect());
        let mut config = Self::try_parse_from(head)?;
        config.extra_args = extra_args;
        Ok(config)
    }
}

/// INPUT OUTPUT MODE の3つの位置引数の後ろを切り出す
fn split_extra_args(args: Vec<OsString>) -> (Vec<OsString>, Vec<String>) {
    let mut args = args.into_iter();
    let mut head: Vec<OsString> = args.next().into_iter().collect();
    let mut positionals = 0;
    let mut escaped = false;

    while positionals < 3 {
        let Some(arg) = args.next() else { break };

        if !escaped {
            if arg == "--" {
                escaped = true;
                head.push(arg);
                continue;
            }
            if let Some(flag) = arg.to_str().filter(|s| s.len() > 1 && s.starts_with('-')) {
                let takes_value = flag == "--cache-dir";
                head.push(arg);
                if takes_value {
                    head.extend(args.next());
                }
                continue;
            }
        }

        positionals += 1;
        head.push(arg);
    }

    let extra_args = args.map(|arg| arg.to_string_lossy().into_owned()).collect();
    (head, extra_args)
}
