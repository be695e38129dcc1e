use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whisper model size tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelName {
    Tiny,
    #[default]
    Base,
    Small,
    Medium,
    Large,
}

impl ModelName {
    pub const ALL: &[ModelName] = &[
        ModelName::Tiny,
        ModelName::Base,
        ModelName::Small,
        ModelName::Medium,
        ModelName::Large,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelName::Tiny => "tiny",
            ModelName::Base => "base",
            ModelName::Small => "small",
            ModelName::Medium => "medium",
            ModelName::Large => "large",
        }
    }

    /// File name of the ggml weights for this tier.
    pub fn ggml_file_name(&self) -> &'static str {
        match self {
            ModelName::Tiny => "ggml-tiny.bin",
            ModelName::Base => "ggml-base.bin",
            ModelName::Small => "ggml-small.bin",
            ModelName::Medium => "ggml-medium.bin",
            ModelName::Large => "ggml-large-v3.bin",
        }
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown model '{0}', expected one of: tiny, base, small, medium, large")]
pub struct UnknownModelName(pub String);

impl FromStr for ModelName {
    type Err = UnknownModelName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelName::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownModelName(s.to_string()))
    }
}

/// Compute device a model is bound to for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Cuda,
    Cpu,
}

impl Device {
    pub fn is_accelerator(&self) -> bool {
        matches!(self, Device::Cuda)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cuda => "cuda",
            Device::Cpu => "cpu",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("tiny", ModelName::Tiny)]
    #[case("base", ModelName::Base)]
    #[case("Small", ModelName::Small)]
    #[case(" medium ", ModelName::Medium)]
    #[case("LARGE", ModelName::Large)]
    fn test_parse_model_name(#[case] input: &str, #[case] expected: ModelName) {
        assert_eq!(input.parse::<ModelName>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_model_name() {
        let err = "huge".parse::<ModelName>().unwrap_err();
        assert_eq!(err, UnknownModelName("huge".to_string()));
        assert_eq!(
            err.to_string(),
            "unknown model 'huge', expected one of: tiny, base, small, medium, large"
        );
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn test_default_model_is_base() {
        assert_eq!(ModelName::default(), ModelName::Base);
    }

    #[test]
    fn test_display_matches_as_str() {
        for model in ModelName::ALL {
            assert_eq!(model.to_string(), model.as_str());
        }
    }

    #[test]
    fn test_ggml_file_names_are_distinct() {
        let names: std::collections::HashSet<_> =
            ModelName::ALL.iter().map(|m| m.ggml_file_name()).collect();
        assert_eq!(names.len(), ModelName::ALL.len());
    }

    #[test]
    fn test_device_strings() {
        assert_eq!(Device::Cuda.to_string(), "cuda");
        assert_eq!(Device::Cpu.to_string(), "cpu");
        assert!(Device::Cuda.is_accelerator());
        assert!(!Device::Cpu.is_accelerator());
    }
}
