use std::fmt;

/// Languages that may be passed to the recognizer explicitly.
///
/// Anything else falls back to automatic language detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Chinese,
    English,
    Japanese,
}

impl Language {
    pub const ALL: &[Language] = &[Language::Chinese, Language::English, Language::Japanese];

    pub fn code(&self) -> &'static str {
        match self {
            Language::Chinese => "zh",
            Language::English => "en",
            Language::Japanese => "ja",
        }
    }

    /// Look up a supported language by its exact code.
    pub fn from_code(code: &str) -> Option<Language> {
        Language::ALL.iter().copied().find(|l| l.code() == code)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("zh", Some(Language::Chinese))]
    #[case("en", Some(Language::English))]
    #[case("ja", Some(Language::Japanese))]
    #[case("fr", None)]
    #[case("EN", None)]
    #[case("", None)]
    fn test_from_code(#[case] code: &str, #[case] expected: Option<Language>) {
        assert_eq!(Language::from_code(code), expected);
    }

    #[test]
    fn test_code_round_trips_through_display() {
        for lang in Language::ALL {
            assert_eq!(Language::from_code(&lang.to_string()), Some(*lang));
        }
    }
}
