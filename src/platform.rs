use crate::errors::{Result, UpscaleError};

macro_rules! release_url {
    ($archive:literal) => {
        concat!(
            "https://github.com/xinntao/Real-ESRGAN/releases/download/v0.2.5.0/",
            $archive
        )
    };
}

/// Download location and executable name of one portable build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformProfile {
    pub url: &'static str,
    pub executable: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

static PROFILES: [PlatformProfile; 3] = [
    PlatformProfile {
        url: release_url!("realesrgan-ncnn-vulkan-20220424-ubuntu.zip"),
        executable: "realesrgan-ncnn-vulkan",
    },
    PlatformProfile {
        url: release_url!("realesrgan-ncnn-vulkan-20220424-macos.zip"),
        executable: "realesrgan-ncnn-vulkan",
    },
    PlatformProfile {
        url: release_url!("realesrgan-ncnn-vulkan-20220424-windows.zip"),
        executable: "realesrgan-ncnn-vulkan.exe",
    },
];

impl Platform {
    /// Host platform, from the OS the binary was compiled for.
    pub fn detect() -> Result<Self> {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Map an OS name to a supported platform.
    ///
    /// Accepts both Rust's `std::env::consts::OS` spelling and the `uname`-style
    /// names (`darwin`, `msys`, `windowsnt`).
    pub fn from_os_name(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "darwin" | "macos" => Ok(Self::MacOs),
            "windows" | "msys" | "windowsnt" => Ok(Self::Windows),
            other => Err(UpscaleError::UnsupportedPlatform {
                os: other.to_string(),
            }),
        }
    }

    pub fn profile(self) -> &'static PlatformProfile {
        match self {
            Self::Linux => &PROFILES[0],
            Self::MacOs => &PROFILES[1],
            Self::Windows => &PROFILES[2],
        }
    }

    pub const fn is_windows(self) -> bool {
        matches!(self, Self::Windows)
    }
}
