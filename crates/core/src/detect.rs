use crate::types::LanguageCode;
use whatlang::Lang;

/// Classifies text into a [`LanguageCode`].
///
/// Script ranges take priority: any kana means Japanese, han ideographs
/// without kana mean Chinese. Everything else goes through the `whatlang`
/// trigram classifier, which is deterministic for identical input. A result
/// outside the tutored set counts as a detection failure, so it defaults to
/// English along with empty or unclassifiable input.
///
/// # Examples
///
/// ```
/// use linguaroom_core::detect::detect;
/// use linguaroom_core::types::LanguageCode;
///
/// assert_eq!(detect("こんにちは"), LanguageCode::Ja);
/// assert_eq!(detect("你好吗"), LanguageCode::Zh);
/// assert_eq!(detect(""), LanguageCode::En);
/// ```
pub fn detect(text: &str) -> LanguageCode {
    if text.chars().any(is_kana) {
        return LanguageCode::Ja;
    }
    if text.chars().any(is_han) {
        return LanguageCode::Zh;
    }
    match whatlang::detect_lang(text) {
        Some(lang) => map_lang(lang),
        None => LanguageCode::En,
    }
}

fn is_kana(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}')
}

fn is_han(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FAF}')
}

fn map_lang(lang: Lang) -> LanguageCode {
    match lang {
        Lang::Eng => LanguageCode::En,
        Lang::Ind => LanguageCode::Id,
        Lang::Jpn => LanguageCode::Ja,
        Lang::Cmn => LanguageCode::Zh,
        _ => LanguageCode::En,
    }
}
