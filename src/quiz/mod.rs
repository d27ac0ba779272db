//! Multiple-choice question generation for battle turns.
//!
//! Single-card questions come in three types chosen uniformly: Japanese to
//! English, English to Japanese, and definition to headword. Distractors come
//! from the target's topic when it has at least three other terms, otherwise
//! from the whole corpus. Burst questions combine two terms.
//!
//! Small corpora yield fewer than four options; generation never panics.

use rand::seq::SliceRandom;
use rand::Rng;
use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use crate::corpus::{Corpus, Term};

pub mod exam;

pub const DISTRACTOR_COUNT: usize = 3;
pub const BURST_EXTRA_TERMS: usize = 2;
pub const CONCEPT_PREVIEW_CHARS: usize = 60;
const COMMON_ATTRIBUTE_PREVIEW_CHARS: usize = 30;
const PAIRED_DEFINITION_PREVIEW_CHARS: usize = 25;
/// Stands in for a distractor the corpus cannot supply.
pub const PLACEHOLDER_OPTION: &str = "該当なし";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum QuizType {
    JpToEn,
    EnToJp,
    Concept,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum BurstVariant {
    /// Which of the two terms matches the first term's definition.
    CommonAttribute,
    /// The correct ordered pair of Japanese headwords.
    PairedTranslation,
    /// Given both definitions, pick the term for the first one.
    PairedDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct QuizQuestion {
    pub term_id: String,
    /// Second participating term for burst questions.
    pub paired_term_id: Option<String>,
    pub prompt: String,
    pub full_prompt: Option<String>,
    pub quiz_type: QuizType,
    pub burst_variant: Option<BurstVariant>,
    pub correct_answer: String,
    pub options: Vec<String>,
}

impl QuizQuestion {
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }
}

/// Pick up to three distractor terms for `term`.
fn distractors<'a, R: Rng + ?Sized>(
    term: &'a Term,
    corpus: &'a Corpus,
    rng: &mut R,
) -> Vec<&'a Term> {
    let same_topic: Vec<&Term> = corpus
        .terms_in_topic(&term.topic_code)
        .filter(|t| t.term_id != term.term_id)
        .collect();
    let pool: Vec<&Term> = if same_topic.len() >= DISTRACTOR_COUNT {
        same_topic
    } else {
        corpus
            .terms()
            .iter()
            .filter(|t| t.term_id != term.term_id)
            .collect()
    };
    pool.choose_multiple(rng, DISTRACTOR_COUNT)
        .copied()
        .collect()
}

/// Truncate to `max` characters, marking the cut with an ellipsis.
fn preview(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Drop repeated options keeping the first occurrence, then shuffle.
fn finish_options<R: Rng + ?Sized>(mut options: Vec<String>, rng: &mut R) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    options.retain(|o| seen.insert(o.clone()));
    options.shuffle(rng);
    options
}

pub fn generate<R: Rng + ?Sized>(term: &Term, corpus: &Corpus, rng: &mut R) -> QuizQuestion {
    let others = distractors(term, corpus, rng);
    let quiz_type = match rng.gen_range(0..3) {
        0 => QuizType::JpToEn,
        1 => QuizType::EnToJp,
        _ => QuizType::Concept,
    };

    let (prompt, full_prompt, correct_answer, mut options) = match quiz_type {
        QuizType::JpToEn => (
            format!("「{}」の英語用語は？", term.headword_jp),
            None,
            term.canonical_en.clone(),
            others
                .iter()
                .map(|t| t.canonical_en.clone())
                .collect::<Vec<_>>(),
        ),
        QuizType::EnToJp => (
            format!("「{}」の日本語訳は？", term.canonical_en),
            None,
            term.headword_jp.clone(),
            others.iter().map(|t| t.headword_jp.clone()).collect(),
        ),
        QuizType::Concept => (
            format!(
                "次の説明に当てはまる用語は？\n「{}」",
                preview(&term.jp_definition, CONCEPT_PREVIEW_CHARS)
            ),
            Some(format!("次の説明に当てはまる用語は？\n「{}」", term.jp_definition)),
            term.headword_jp.clone(),
            others.iter().map(|t| t.headword_jp.clone()).collect(),
        ),
    };
    options.insert(0, correct_answer.clone());

    QuizQuestion {
        term_id: term.term_id.clone(),
        paired_term_id: None,
        prompt,
        full_prompt,
        quiz_type,
        burst_variant: None,
        options: finish_options(options, rng),
        correct_answer,
    }
}

/// Harder question over two terms; the first term carries the answer.
pub fn generate_burst<R: Rng + ?Sized>(
    term1: &Term,
    term2: &Term,
    corpus: &Corpus,
    rng: &mut R,
) -> QuizQuestion {
    let pool: Vec<&Term> = corpus
        .terms()
        .iter()
        .filter(|t| t.term_id != term1.term_id && t.term_id != term2.term_id)
        .collect();
    let extra: Vec<&str> = pool
        .choose_multiple(rng, BURST_EXTRA_TERMS)
        .map(|t| t.headword_jp.as_str())
        .collect();
    let extra_or_placeholder = |i: usize| extra.get(i).copied().unwrap_or(PLACEHOLDER_OPTION);
    let (h1, h2) = (term1.headword_jp.as_str(), term2.headword_jp.as_str());

    let variant = match rng.gen_range(0..3) {
        0 => BurstVariant::CommonAttribute,
        1 => BurstVariant::PairedTranslation,
        _ => BurstVariant::PairedDefinition,
    };

    let (quiz_type, prompt, full_prompt, correct_answer, options) = match variant {
        BurstVariant::CommonAttribute => (
            QuizType::Concept,
            format!(
                "「{}」と「{}」のうち、「{}」に当てはまるのは？",
                term1.canonical_en,
                term2.canonical_en,
                preview(&term1.jp_definition, COMMON_ATTRIBUTE_PREVIEW_CHARS)
            ),
            format!(
                "「{}」と「{}」のうち、「{}」に当てはまるのは？",
                term1.canonical_en, term2.canonical_en, term1.jp_definition
            ),
            h1.to_string(),
            vec![
                h1.to_string(),
                h2.to_string(),
                extra_or_placeholder(0).to_string(),
                extra_or_placeholder(1).to_string(),
            ],
        ),
        BurstVariant::PairedTranslation => {
            let prompt = format!(
                "「{}」と「{}」の日本語訳の正しい組み合わせは？",
                term1.canonical_en, term2.canonical_en
            );
            let x = extra_or_placeholder(0);
            (
                QuizType::EnToJp,
                prompt.clone(),
                prompt,
                format!("{h1} / {h2}"),
                vec![
                    format!("{h1} / {h2}"),
                    format!("{h2} / {h1}"),
                    format!("{h1} / {x}"),
                    format!("{x} / {h2}"),
                ],
            )
        }
        BurstVariant::PairedDefinition => (
            QuizType::Concept,
            format!(
                "「{}」と「{}」のうち、前者の説明に当てはまる用語は？",
                preview(&term1.jp_definition, PAIRED_DEFINITION_PREVIEW_CHARS),
                preview(&term2.jp_definition, PAIRED_DEFINITION_PREVIEW_CHARS)
            ),
            format!(
                "「{}」と「{}」のうち、前者の説明に当てはまる用語は？",
                term1.jp_definition, term2.jp_definition
            ),
            h1.to_string(),
            vec![
                h1.to_string(),
                h2.to_string(),
                extra_or_placeholder(0).to_string(),
                extra_or_placeholder(1).to_string(),
            ],
        ),
    };

    QuizQuestion {
        term_id: term1.term_id.clone(),
        paired_term_id: Some(term2.term_id.clone()),
        prompt,
        full_prompt: Some(full_prompt),
        quiz_type,
        burst_variant: Some(variant),
        options: finish_options(options, rng),
        correct_answer,
    }
}
