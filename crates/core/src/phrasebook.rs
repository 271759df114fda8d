use crate::types::{LanguageCode, Translation};

/// Fixed English→Indonesian phrase pairs.
const EN_TO_ID: &[(&str, &str)] = &[
    ("hello", "halo"),
    ("good morning", "selamat pagi"),
    ("thank you", "terima kasih"),
    ("how are you", "apa kabar"),
    ("i am fine", "saya baik-baik saja"),
    ("good night", "selamat malam"),
];

/// Reverse table toward English. Not generated from [`EN_TO_ID`]: the
/// shipped dictionary has no reverse entry for `good night`.
const ID_TO_EN: &[(&str, &str)] = &[
    ("halo", "hello"),
    ("selamat pagi", "good morning"),
    ("terima kasih", "thank you"),
    ("apa kabar", "how are you"),
    ("saya baik-baik saja", "i am fine"),
];

/// Looks up a fixed phrase translation toward `target`.
///
/// Matching is a case-insensitive exact comparison of the trimmed input;
/// there is no partial or fuzzy matching. Pairs without a phrase table
/// (anything other than English↔Indonesian) and misses both produce
/// [`Translation::Unavailable`], never a guess.
///
/// # Examples
///
/// ```
/// use linguaroom_core::phrasebook::translate;
/// use linguaroom_core::types::{LanguageCode, Translation};
///
/// assert_eq!(
///     translate("hello", LanguageCode::Id),
///     Translation::Text("halo".to_string())
/// );
/// assert_eq!(translate("xyz", LanguageCode::Id), Translation::Unavailable);
/// ```
pub fn translate(text: &str, target: LanguageCode) -> Translation {
    let table = match target {
        LanguageCode::En => ID_TO_EN,
        LanguageCode::Id => EN_TO_ID,
        _ => return Translation::Unavailable,
    };
    let needle = text.trim();
    table
        .iter()
        .find(|(phrase, _)| phrase.eq_ignore_ascii_case(needle))
        .map(|(_, translated)| Translation::Text((*translated).to_string()))
        .unwrap_or(Translation::Unavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_phrase_translates_toward_indonesian() {
        assert_eq!(
            translate("hello", LanguageCode::Id),
            Translation::Text("halo".to_string())
        );
    }

    #[test]
    fn lookup_ignores_case_and_surrounding_whitespace() {
        assert_eq!(
            translate("  Good Morning ", LanguageCode::Id),
            Translation::Text("selamat pagi".to_string())
        );
    }

    #[test]
    fn reverse_table_translates_toward_english() {
        assert_eq!(
            translate("terima kasih", LanguageCode::En),
            Translation::Text("thank you".to_string())
        );
    }

    #[test]
    fn miss_is_an_explicit_marker() {
        assert_eq!(translate("xyz", LanguageCode::Id), Translation::Unavailable);
        assert!(!translate("xyz", LanguageCode::Id).is_available());
    }

    #[test]
    fn pairs_without_a_table_are_unavailable() {
        assert_eq!(
            translate("hello", LanguageCode::Ja),
            Translation::Unavailable
        );
    }

    #[test]
    fn good_night_only_exists_toward_indonesian() {
        assert_eq!(
            translate("good night", LanguageCode::Id),
            Translation::Text("selamat malam".to_string())
        );
        assert_eq!(
            translate("selamat malam", LanguageCode::En),
            Translation::Unavailable
        );
    }
}
