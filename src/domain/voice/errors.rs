//! Voice Context - Errors

use thiserror::Error;

use super::{Gender, Language};

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Invalid language tag: {0:?}")]
    InvalidLanguage(String),

    #[error("No voice for language {language} and gender {gender}")]
    Unsupported { language: Language, gender: Gender },
}
