use std::{io::Write, path::Path};

use crate::errors::Result;

/// アーカイブ取得の抽象化
///
/// The installer only needs "write the bytes at this URL into that writer", so
/// tests can hand it canned archives without touching the network.
pub trait ArchiveFetcher {
    /// Stream the resource at `url` into `destination`, returning the number of
    /// bytes written.
    fn fetch(&self, url: &str, destination: &mut dyn Write) -> Result<u64>;
}

/// 外部プロセス起動の抽象化
pub trait ProcessRunner {
    /// Run `program` with `args` to completion.
    ///
    /// Returns `Ok(())` on a zero exit status; a non-zero status is reported as
    /// `UpscaleError::ChildFailed` carrying the child's code.
    fn run(&self, program: &Path, args: &[String]) -> Result<()>;
}

impl<T: ArchiveFetcher + ?Sized> ArchiveFetcher for &T {
    fn fetch(&self, url: &str, destination: &mut dyn Write) -> Result<u64> {
        (**self).fetch(url, destination)
    }
}

impl<T: ProcessRunner + ?Sized> ProcessRunner for &T {
    fn run(&self, program: &Path, args: &[String]) -> Result<()> {
        (**self).run(program, args)
    }
}
