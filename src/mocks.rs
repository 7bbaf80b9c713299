use std::{
    io::{Cursor, Write},
    path::{Path, PathBuf},
};

use parking_lot::Mutex;
use zip::{write::FileOptions, ZipWriter};

use crate::{
    errors::{Result, UpscaleError},
    traits::{ArchiveFetcher, ProcessRunner},
};

/// テスト用のダウンローダー。固定のペイロードを返し、呼び出された URL を記録する
#[derive(Debug, Default)]
pub struct RecordingFetcher {
    payload: Option<Vec<u8>>,
    urls: Mutex<Vec<String>>,
}

impl RecordingFetcher {
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            payload: Some(payload),
            urls: Mutex::new(Vec::new()),
        }
    }

    /// 常にダウンロードエラーを返す
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.urls.lock().len()
    }
}

impl ArchiveFetcher for RecordingFetcher {
    fn fetch(&self, url: &str, destination: &mut dyn Write) -> Result<u64> {
        self.urls.lock().push(url.to_string());

        let payload = self.payload.as_ref().ok_or_else(|| UpscaleError::Download {
            url: url.to_string(),
            source: "connection refused".into(),
        })?;
        destination.write_all(payload)?;
        Ok(payload.len() as u64)
    }
}

/// テスト用のプロセスランナー。起動せずに引数を記録し、固定の終了コードを返す
#[derive(Debug, Default)]
pub struct RecordingRunner {
    exit_code: i32,
    calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
}

impl RecordingRunner {
    pub fn new(exit_code: i32) -> Self {
        Self {
            exit_code,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, program: &Path, args: &[String]) -> Result<()> {
        self.calls
            .lock()
            .push((program.to_path_buf(), args.to_vec()));

        match self.exit_code {
            0 => Ok(()),
            code => Err(UpscaleError::ChildFailed { code }),
        }
    }
}

/// Build an in-memory zip archive from `(name, contents)` pairs.
///
/// Names are written verbatim, including unsafe ones such as `../evil`.
pub fn zip_fixture(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer
            .start_file(*name, FileOptions::default())
            .expect("zip entry header");
        writer.write_all(contents).expect("zip entry body");
    }
    writer.finish().expect("zip central directory").into_inner()
}
