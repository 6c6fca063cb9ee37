//! Local keyword extractor (C4.3.1) — the pure, deterministic fallback used
//! whenever the oracle can't be trusted to have produced a good keyword.

const MAX_LOCAL_KEYWORD_LEN: usize = 95;

/// Korean university-chatbot domain lexicon (§4.3.1: "~20 education-related
/// terms"). Checked in source order; the first match wins.
const LEXICON: &[&str] = &[
    "수강신청",
    "강의",
    "수업",
    "시간표",
    "과제",
    "시험",
    "성적",
    "학점",
    "등록금",
    "장학금",
    "휴학",
    "복학",
    "졸업",
    "출석",
    "강의실",
    "교수",
    "동아리",
    "기숙사",
    "학사일정",
    "공지사항",
];

/// Deterministic fallback keyword for an utterance (§4.3.1):
/// 1. first lexicon term found in the text,
/// 2. else first whitespace-delimited token of length >= 2,
/// 3. else the first 95 characters of the text.
pub fn local_keyword(text: &str) -> String {
    for term in LEXICON {
        if text.contains(term) {
            return (*term).to_string();
        }
    }

    if let Some(token) = text.split_whitespace().find(|t| t.chars().count() >= 2) {
        return truncate_chars(token, MAX_LOCAL_KEYWORD_LEN);
    }

    truncate_chars(text, MAX_LOCAL_KEYWORD_LEN)
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
