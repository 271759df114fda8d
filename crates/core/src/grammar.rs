use crate::types::{CorrectionResult, GrammarPattern};

/// Produces a naive corrected form and a coarse pattern label.
///
/// The correction only normalizes capitalization and terminal punctuation;
/// the pattern label is a string heuristic, not a parse.
///
/// # Examples
///
/// ```
/// use linguaroom_core::grammar::analyze;
/// use linguaroom_core::types::GrammarPattern;
///
/// let result = analyze("hello world");
/// assert_eq!(result.corrected, "Hello world.");
/// assert!(!result.is_correct);
/// assert_eq!(result.pattern, GrammarPattern::SubjectVerbObject);
/// ```
pub fn analyze(text: &str) -> CorrectionResult {
    let trimmed = text.trim();
    let corrected = correct(trimmed);
    CorrectionResult {
        original: text.to_string(),
        corrected: corrected.clone(),
        is_correct: corrected == trimmed,
        pattern: classify_pattern(trimmed),
    }
}

fn correct(text: &str) -> String {
    let mut corrected = String::with_capacity(text.len() + 1);
    let mut chars = text.chars();
    if let Some(first) = chars.next() {
        if first.is_alphabetic() {
            corrected.extend(first.to_uppercase());
        } else {
            corrected.push(first);
        }
        corrected.push_str(chars.as_str());
    }
    let needs_period = corrected
        .chars()
        .last()
        .map_or(false, |c| !matches!(c, '.' | '!' | '?'));
    if needs_period {
        corrected.push('.');
    }
    corrected
}

fn classify_pattern(text: &str) -> GrammarPattern {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() == 1 {
        return GrammarPattern::SingleWord;
    }
    let has_be_verb = tokens.iter().any(|token| {
        token.eq_ignore_ascii_case("am")
            || token.eq_ignore_ascii_case("is")
            || token.eq_ignore_ascii_case("are")
    });
    if has_be_verb {
        return GrammarPattern::SubjectBeComplement;
    }
    if text.contains('?') {
        return GrammarPattern::QuestionForm;
    }
    GrammarPattern::SubjectVerbObject
}
