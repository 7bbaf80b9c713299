use std::{path::Path, process::Command};

use tracing::debug;

use crate::{
    errors::{Result, UpscaleError},
    traits::ProcessRunner,
};

/// Runs the wrapped binary as a blocking child process with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[String]) -> Result<()> {
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| UpscaleError::Spawn {
                binary: program.to_path_buf(),
                source: e,
            })?;

        debug!(?status, "child exited");
        match status.code() {
            Some(0) => Ok(()),
            Some(code) => Err(UpscaleError::ChildFailed { code }),
            // シグナルで終了した場合は終了コードが無い
            None => Err(UpscaleError::ChildTerminated),
        }
    }
}

/// Render a command line for logging. Arguments containing spaces are quoted.
pub fn display_command(program: &Path, args: &[String]) -> String {
    std::iter::once(program.to_string_lossy().into_owned())
        .chain(args.iter().cloned())
        .map(|arg| {
            if arg.contains(char::is_whitespace) {
                format!("\"{arg}\"")
            } else {
                arg
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
