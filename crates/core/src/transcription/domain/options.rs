use super::language::Language;

/// Options handed to the recognizer for a single call.
///
/// The recognizer always transcribes in the spoken language; translation is
/// never requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscribeOptions {
    /// `None` lets the model detect the spoken language.
    pub language: Option<Language>,
    pub verbose: bool,
}

impl TranscribeOptions {
    /// Build options from a caller-supplied hint.
    ///
    /// Hints outside the supported set are dropped and auto-detection is used.
    pub fn from_hint(hint: Option<&str>) -> Self {
        let language = match hint {
            Some(code) => match Language::from_code(code) {
                Some(lang) => {
                    log::info!("Using language hint: {lang}");
                    Some(lang)
                }
                None => {
                    log::info!("Unsupported language hint '{code}', enabling auto-detection");
                    None
                }
            },
            None => {
                log::info!("No language hint, enabling auto-detection");
                None
            }
        };

        Self {
            language,
            verbose: false,
        }
    }
}
