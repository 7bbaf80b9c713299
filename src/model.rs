use std::str::FromStr;

use crate::errors::UpscaleError;

pub const ANIME_MODEL: &str = "realesrgan-x4plus-anime";
pub const GENERAL_MODEL: &str = "realesrgan-x4plus";

/// 画像の種類。Real-ESRGAN に渡すモデルを決める
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    Anime,
    #[default]
    General,
}

impl Mode {
    /// Model name passed to the wrapped binary via `-n`.
    pub const fn model_name(self) -> &'static str {
        match self {
            Self::Anime => ANIME_MODEL,
            Self::General => GENERAL_MODEL,
        }
    }
}

impl FromStr for Mode {
    type Err = UpscaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anime" => Ok(Self::Anime),
            "general" => Ok(Self::General),
            _ => Err(UpscaleError::validation(
                "mode",
                format!("`{s}` is not supported. Supported modes: `anime`, `general`"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_names() {
        assert_eq!(Mode::Anime.model_name(), "realesrgan-x4plus-anime");
        assert_eq!(Mode::General.model_name(), "realesrgan-x4plus");
        assert_eq!(Mode::default().model_name(), "realesrgan-x4plus");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let test_cases = vec![
            ("anime", Mode::Anime),
            ("ANIME", Mode::Anime),
            ("Anime", Mode::Anime),
            ("general", Mode::General),
            ("GeNeRaL", Mode::General),
        ];

        for (input, expected) in test_cases {
            assert_eq!(input.parse::<Mode>().unwrap(), expected, "input: {input}");
        }
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        for input in ["photo", "", "anime ", "x4plus"] {
            let err = input.parse::<Mode>().unwrap_err();
            assert!(matches!(err, UpscaleError::Validation { .. }), "input: {input:?}");
        }
    }
}
