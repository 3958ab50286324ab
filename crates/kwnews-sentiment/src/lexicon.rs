//! Curated Korean keyword sets for news sentiment.
//!
//! A term listed twice in one set weighs twice: `실패` (negative) and `검토`
//! (neutral) each appear two times in the curated lists.

use serde::{Deserialize, Serialize};

use crate::error::SentimentError;

const POSITIVE: &[&str] = &[
    "좋다",
    "훌륭하다",
    "우수하다",
    "성공",
    "발전",
    "증가",
    "향상",
    "개선",
    "긍정적",
    "낙관적",
    "희망",
    "기대",
    "만족",
    "감사",
    "축하",
    "환영",
    "도움",
    "지원",
    "협력",
    "성장",
    "혁신",
    "창의",
    "효율",
    "효과",
    "안정",
    "신뢰",
    "투명",
    "공정",
    "책임",
    "지속가능",
    "친환경",
];

const NEGATIVE: &[&str] = &[
    "나쁘다",
    "문제",
    "실패",
    "실망",
    "우려",
    "걱정",
    "불안",
    "분노",
    "부정적",
    "비관적",
    "절망",
    "실패",
    "손실",
    "감소",
    "악화",
    "퇴보",
    "부패",
    "비리",
    "사기",
    "폭력",
    "사고",
    "재난",
    "위험",
    "위협",
    "불만",
    "항의",
    "반발",
    "갈등",
    "대립",
    "분쟁",
    "혼란",
    "혼돈",
];

const NEUTRAL: &[&str] = &[
    "발표",
    "공지",
    "보고",
    "검토",
    "분석",
    "연구",
    "조사",
    "평가",
    "계획",
    "정책",
    "제도",
    "시스템",
    "프로그램",
    "프로젝트",
    "사업",
    "회의",
    "협의",
    "토론",
    "논의",
    "검토",
    "심의",
    "의결",
    "결정",
];

/// Three keyword sets. Terms are stored lowercased; a repeated term counts
/// once per listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexicon {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub neutral: Vec<String>,
}

impl Lexicon {
    /// Builds a lexicon from raw term lists.
    ///
    /// Terms are trimmed and lowercased. Repeats within a set are kept and
    /// act as extra weight for that term.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::BlankTerm`] if any term is blank and
    /// [`SentimentError::EmptyLexicon`] if all three sets are empty.
    pub fn new(
        positive: Vec<String>,
        negative: Vec<String>,
        neutral: Vec<String>,
    ) -> Result<Self, SentimentError> {
        let lexicon = Self {
            positive: clean_set(positive, "positive")?,
            negative: clean_set(negative, "negative")?,
            neutral: clean_set(neutral, "neutral")?,
        };
        if lexicon.term_count() == 0 {
            return Err(SentimentError::EmptyLexicon);
        }
        Ok(lexicon)
    }

    /// Total number of listed terms across the three sets, repeats included.
    #[must_use]
    pub fn term_count(&self) -> usize {
        self.positive.len() + self.negative.len() + self.neutral.len()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        let owned = |terms: &[&str]| -> Vec<String> {
            terms.iter().map(|t| (*t).to_string()).collect()
        };
        Self {
            positive: owned(POSITIVE),
            negative: owned(NEGATIVE),
            neutral: owned(NEUTRAL),
        }
    }
}

fn clean_set(terms: Vec<String>, set: &'static str) -> Result<Vec<String>, SentimentError> {
    terms
        .into_iter()
        .map(|term| {
            let term = term.trim().to_lowercase();
            if term.is_empty() {
                Err(SentimentError::BlankTerm { set })
            } else {
                Ok(term)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listings(set: &[String], term: &str) -> usize {
        set.iter().filter(|t| t.as_str() == term).count()
    }

    #[test]
    fn default_sets_keep_curated_repeats() {
        let lexicon = Lexicon::default();
        assert_eq!(lexicon.positive.len(), 31);
        assert_eq!(lexicon.negative.len(), 32);
        assert_eq!(lexicon.neutral.len(), 23);
        assert_eq!(listings(&lexicon.negative, "실패"), 2);
        assert_eq!(listings(&lexicon.neutral, "검토"), 2);
        assert_eq!(listings(&lexicon.negative, "문제"), 1);
    }

    #[test]
    fn new_keeps_repeats_and_lowercases() {
        let lexicon = Lexicon::new(
            vec!["Good".to_string(), "good ".to_string()],
            vec!["bad".to_string()],
            vec![],
        )
        .unwrap();
        assert_eq!(lexicon.positive, vec!["good", "good"]);
        assert_eq!(lexicon.term_count(), 3);
    }

    #[test]
    fn new_rejects_blank_term() {
        let err = Lexicon::new(vec![], vec!["  ".to_string()], vec![]).unwrap_err();
        assert!(matches!(err, SentimentError::BlankTerm { set: "negative" }));
    }

    #[test]
    fn new_rejects_empty_lexicon() {
        let err = Lexicon::new(vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, SentimentError::EmptyLexicon));
    }

    #[test]
    fn lexicon_deserializes_from_yaml() {
        let lexicon: Lexicon = serde_yaml::from_str(
            "positive: [개선]\nnegative: [누수]\nneutral: [발표]\n",
        )
        .unwrap();
        assert_eq!(lexicon.negative, vec!["누수"]);
    }
}
