//! Static voice catalog keyed by (language, speaker name)

use crate::core::models::{Language, VoiceProfile};

/// Reference speakers; extensible without touching callers
const VOICE_CATALOG: &[(Language, &str, &str, f32)] = &[
    (Language::English, "Rachel", "EXAVITQu4vr4xnSDxMaL", 0.7),
    (Language::English, "Domi", "AZnzlk1XvdvUeBnXmlld", 0.7),
    (Language::Hindi, "Shweta", "XB0fDUnXU5powFXDhCwa", 0.7),
    (Language::Hindi, "Prabhat", "IKne3meq5aSn9XLyUdCD", 0.7),
];

/// Resolve a speaker name to its voice profile, case-insensitive on the name
pub fn resolve(language: Language, speaker: &str) -> Option<VoiceProfile> {
    VOICE_CATALOG
        .iter()
        .find(|(lang, name, _, _)| *lang == language && name.eq_ignore_ascii_case(speaker))
        .map(|(_, _, voice_id, stability)| VoiceProfile {
            voice_id: voice_id.to_string(),
            stability: *stability,
        })
}

/// First catalog speaker for a language
pub fn default_speaker(language: Language) -> &'static str {
    VOICE_CATALOG
        .iter()
        .find(|(lang, _, _, _)| *lang == language)
        .map(|(_, name, _, _)| *name)
        .unwrap_or("Rachel")
}

/// Speaker names available for a language
pub fn speakers_for(language: Language) -> Vec<&'static str> {
    VOICE_CATALOG
        .iter()
        .filter(|(lang, _, _, _)| *lang == language)
        .map(|(_, name, _, _)| *name)
        .collect()
}

/// Full catalog listing for display surfaces
pub fn catalog() -> Vec<(Language, &'static str, VoiceProfile)> {
    VOICE_CATALOG
        .iter()
        .map(|(lang, name, voice_id, stability)| {
            (
                *lang,
                *name,
                VoiceProfile {
                    voice_id: voice_id.to_string(),
                    stability: *stability,
                },
            )
        })
        .collect()
}
