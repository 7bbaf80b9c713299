use std::{
    fs::{self, File},
    io::{self, Read, Seek},
    path::{Component, Path, PathBuf},
};

use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::{
    errors::{Result, UpscaleError},
    platform::Platform,
    traits::ArchiveFetcher,
};

/// Default cache location, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "binary/realesrgan-ncnn-vulkan";

/// キャッシュディレクトリにポータブル版バイナリを用意する
pub struct Installer<F: ArchiveFetcher> {
    fetcher: F,
    cache_dir: PathBuf,
}

impl<F: ArchiveFetcher> Installer<F> {
    pub fn new(fetcher: F, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            cache_dir: cache_dir.into(),
        }
    }

    /// Return the path of the platform's binary, downloading and extracting the
    /// release archive first if the cache directory does not exist yet.
    ///
    /// An existing cache directory is trusted as-is: no network access and no
    /// version check.
    pub fn ensure_installed(&self, platform: Platform) -> Result<PathBuf> {
        let profile = platform.profile();

        if self.cache_dir.exists() {
            info!(
                "Real-ESRGAN portable binary already exists at {}",
                self.cache_dir.display()
            );
        } else {
            info!("Real-ESRGAN not found. Preparing to download...");
            self.install(profile.url)?;
            info!("Download and extraction complete.");
        }

        let binary = locate_binary(&self.cache_dir, profile.executable)?;
        if !platform.is_windows() {
            make_executable(&binary)?;
        }
        Ok(binary)
    }

    fn install(&self, url: &str) -> Result<()> {
        let parent = match self.cache_dir.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(fs_error(&parent, "キャッシュ親ディレクトリ作成"))?;

        // 一時アーカイブは drop 時に削除される
        let mut archive = tempfile::Builder::new()
            .prefix("realesrgan-")
            .suffix(".zip")
            .tempfile_in(&parent)
            .map_err(fs_error(&parent, "一時アーカイブ作成"))?;

        info!("Downloading Real-ESRGAN portable binary from {url}...");
        let bytes = self.fetcher.fetch(url, archive.as_file_mut())?;
        debug!(bytes, path = %archive.path().display(), "archive stored");

        // 展開は同じ親ディレクトリ内のステージングに行い、最後に rename で公開する
        let staging = tempfile::Builder::new()
            .prefix(".realesrgan-staging-")
            .tempdir_in(&parent)
            .map_err(fs_error(&parent, "ステージングディレクトリ作成"))?;

        info!("Extracting to {}...", self.cache_dir.display());
        let reader = archive
            .reopen()
            .map_err(fs_error(archive.path(), "一時アーカイブ読み込み"))?;
        let entries = extract_zip(reader, staging.path())?;
        debug!(entries, "archive extracted");

        let archive_path = archive.path().to_path_buf();
        archive
            .close()
            .map_err(fs_error(&archive_path, "一時アーカイブ削除"))?;

        publish(staging.path(), &self.cache_dir)
    }
}

/// Move the staged extraction into its final location.
///
/// If another process published the cache first, its copy wins and the staged
/// one is discarded together with the `TempDir`.
fn publish(staging: &Path, cache_dir: &Path) -> Result<()> {
    match fs::rename(staging, cache_dir) {
        Ok(()) => Ok(()),
        Err(_) if cache_dir.exists() => {
            warn!(
                "{} was populated concurrently; keeping the existing copy",
                cache_dir.display()
            );
            Ok(())
        }
        Err(e) => Err(fs_error(cache_dir, "キャッシュディレクトリ配置")(e)),
    }
}

/// Extract every entry of a zip archive below `root`.
///
/// All entry names are checked before anything is written: a single entry that
/// would resolve outside `root` aborts the extraction with
/// `UpscaleError::UnsafeArchiveEntry`. Returns the number of entries extracted.
pub fn extract_zip<R: Read + Seek>(reader: R, root: &Path) -> Result<usize> {
    let mut archive = ZipArchive::new(reader).map_err(|e| UpscaleError::Archive {
        path: root.to_path_buf(),
        operation: "アーカイブ読み込み".to_string(),
        source: e,
    })?;

    for name in archive.file_names() {
        resolve_entry_path(root, name)?;
    }

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| UpscaleError::Archive {
            path: root.to_path_buf(),
            operation: format!("エントリ読み込み (#{i})"),
            source: e,
        })?;
        let dest = resolve_entry_path(root, entry.name())?;

        if entry.is_dir() {
            fs::create_dir_all(&dest).map_err(fs_error(&dest, "ディレクトリ作成"))?;
            continue;
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(fs_error(parent, "ディレクトリ作成"))?;
        }
        let mut outfile = File::create(&dest).map_err(fs_error(&dest, "ファイル作成"))?;
        io::copy(&mut entry, &mut outfile).map_err(fs_error(&dest, "ファイル書き込み"))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&dest, fs::Permissions::from_mode(mode & 0o777))
                .map_err(fs_error(&dest, "パーミッション設定"))?;
        }
    }

    Ok(archive.len())
}

/// Resolve an archive entry name to a path below `root`.
///
/// Absolute names, drive prefixes and `..` components that climb above `root`
/// are rejected. Backslashes are treated as separators so Windows-style names
/// get the same check on every host.
pub fn resolve_entry_path(root: &Path, name: &str) -> Result<PathBuf> {
    let unsafe_entry = || UpscaleError::UnsafeArchiveEntry {
        entry: name.to_string(),
        root: root.to_path_buf(),
    };

    let normalized = name.replace('\\', "/");
    let mut relative = PathBuf::new();
    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !relative.pop() {
                    return Err(unsafe_entry());
                }
            }
            Component::RootDir | Component::Prefix(_) => return Err(unsafe_entry()),
        }
    }

    Ok(root.join(relative))
}

/// Find the executable named `name` inside the cache directory.
///
/// Release archives sometimes nest everything in a top-level folder, so the
/// search goes a few levels deep. Entries are visited in name order.
///
/// The first unreadable entry stops the search with `UpscaleError::FileSystem`.
pub fn locate_binary(dir: &Path, name: &str) -> Result<PathBuf> {
    for entry in WalkDir::new(dir).max_depth(3).sort_by_file_name() {
        let entry = entry.map_err(|e| UpscaleError::FileSystem {
            path: e.path().unwrap_or(dir).to_path_buf(),
            operation: "キャッシュ走査".to_string(),
            source: e.into(),
        })?;
        if entry.file_type().is_file() && entry.file_name() == name {
            return Ok(entry.into_path());
        }
    }

    Err(UpscaleError::BinaryNotFound {
        name: name.to_string(),
        dir: dir.to_path_buf(),
    })
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)
        .map_err(fs_error(path, "メタデータ取得"))?
        .permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    fs::set_permissions(path, permissions).map_err(fs_error(path, "実行権限付与"))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

fn fs_error<'a>(path: &'a Path, operation: &'a str) -> impl FnOnce(io::Error) -> UpscaleError + 'a {
    move |source| UpscaleError::FileSystem {
        path: path.to_path_buf(),
        operation: operation.to_string(),
        source,
    }
}
