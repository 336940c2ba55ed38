//! Voice Catalog - (语言, 性别) → 服务端音色名

use super::{Gender, Language, VoiceError};

const VOICES: &[(&str, Gender, &str)] = &[
    ("ar-EG", Gender::Female, "ar-EG-SalmaNeural"),
    ("ar-EG", Gender::Male, "ar-EG-ShakirNeural"),
    ("de-DE", Gender::Female, "de-DE-KatjaNeural"),
    ("de-DE", Gender::Male, "de-DE-ConradNeural"),
    ("en-AU", Gender::Female, "en-AU-NatashaNeural"),
    ("en-AU", Gender::Male, "en-AU-WilliamNeural"),
    ("en-GB", Gender::Female, "en-GB-SoniaNeural"),
    ("en-GB", Gender::Male, "en-GB-RyanNeural"),
    ("en-IN", Gender::Female, "en-IN-NeerjaNeural"),
    ("en-IN", Gender::Male, "en-IN-PrabhatNeural"),
    ("en-US", Gender::Female, "en-US-JennyNeural"),
    ("en-US", Gender::Male, "en-US-GuyNeural"),
    ("es-ES", Gender::Female, "es-ES-ElviraNeural"),
    ("es-ES", Gender::Male, "es-ES-AlvaroNeural"),
    ("es-MX", Gender::Female, "es-MX-DaliaNeural"),
    ("es-MX", Gender::Male, "es-MX-JorgeNeural"),
    ("fr-CA", Gender::Female, "fr-CA-SylvieNeural"),
    ("fr-CA", Gender::Male, "fr-CA-JeanNeural"),
    ("fr-FR", Gender::Female, "fr-FR-DeniseNeural"),
    ("fr-FR", Gender::Male, "fr-FR-HenriNeural"),
    ("el-GR", Gender::Female, "el-GR-AthinaNeural"),
    ("el-GR", Gender::Male, "el-GR-NestorasNeural"),
    ("hi-IN", Gender::Female, "hi-IN-SwaraNeural"),
    ("hi-IN", Gender::Male, "hi-IN-MadhurNeural"),
    ("it-IT", Gender::Female, "it-IT-ElsaNeural"),
    ("it-IT", Gender::Male, "it-IT-DiegoNeural"),
    ("ja-JP", Gender::Female, "ja-JP-NanamiNeural"),
    ("ja-JP", Gender::Male, "ja-JP-KeitaNeural"),
    ("ko-KR", Gender::Female, "ko-KR-SunHiNeural"),
    ("ko-KR", Gender::Male, "ko-KR-InJoonNeural"),
    ("nl-NL", Gender::Female, "nl-NL-ColetteNeural"),
    ("nl-NL", Gender::Male, "nl-NL-MaartenNeural"),
    ("pl-PL", Gender::Female, "pl-PL-ZofiaNeural"),
    ("pl-PL", Gender::Male, "pl-PL-MarekNeural"),
    ("pt-BR", Gender::Female, "pt-BR-FranciscaNeural"),
    ("pt-BR", Gender::Male, "pt-BR-AntonioNeural"),
    ("pt-PT", Gender::Female, "pt-PT-RaquelNeural"),
    ("pt-PT", Gender::Male, "pt-PT-DuarteNeural"),
    ("ru-RU", Gender::Female, "ru-RU-SvetlanaNeural"),
    ("ru-RU", Gender::Male, "ru-RU-DmitryNeural"),
    ("sv-SE", Gender::Female, "sv-SE-SofieNeural"),
    ("sv-SE", Gender::Male, "sv-SE-MattiasNeural"),
    ("tr-TR", Gender::Female, "tr-TR-EmelNeural"),
    ("tr-TR", Gender::Male, "tr-TR-AhmetNeural"),
    ("zh-CN", Gender::Female, "zh-CN-XiaoxiaoNeural"),
    ("zh-CN", Gender::Male, "zh-CN-YunxiNeural"),
    ("zh-TW", Gender::Female, "zh-TW-HsiaoChenNeural"),
    ("zh-TW", Gender::Male, "zh-TW-YunJheNeural"),
];

/// 查找音色名
pub fn find_voice(language: &Language, gender: Gender) -> Result<&'static str, VoiceError> {
    VOICES
        .iter()
        .find(|(lang, g, _)| *lang == language.as_str() && *g == gender)
        .map(|(_, _, voice)| *voice)
        .ok_or_else(|| VoiceError::Unsupported {
            language: language.clone(),
            gender,
        })
}
