use crate::types::LanguageCode;
use rand::seq::SliceRandom;

/// Canned tutor replies used when inference cannot produce usable text.
const EN_REPLIES: &[&str] = &[
    "That's interesting! Tell me more 😊",
    "I understand. How does that make you feel?",
    "Thanks for sharing! What would you like to practice?",
    "Great! Keep practicing your language skills 🌱",
];

const JA_REPLIES: &[&str] = &[
    "そうですね！もっと教えてください 😊",
    "分かります。どう感じますか？",
    "ありがとう！何を練習したいですか？",
];

const ZH_REPLIES: &[&str] = &[
    "很有趣！请告诉我更多 😊",
    "我明白。你感觉怎么样？",
    "谢谢分享！你想练习什么？",
];

/// Picks a canned reply for `language`, uniformly at random.
///
/// Languages without their own list borrow the English one, so the result
/// is never empty.
pub fn reply(language: LanguageCode) -> String {
    replies_for(language)
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Keep practicing!")
        .to_string()
}

pub(crate) fn replies_for(language: LanguageCode) -> &'static [&'static str] {
    match language {
        LanguageCode::Ja => JA_REPLIES,
        LanguageCode::Zh => ZH_REPLIES,
        LanguageCode::En | LanguageCode::Id | LanguageCode::Other => EN_REPLIES,
    }
}
