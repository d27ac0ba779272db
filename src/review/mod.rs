//! Spaced-repetition scheduling (SM-2 variant).
//!
//! ## Scheduling rule
//!
//! - quality < 3: repetitions reset to 0, interval becomes 1 day.
//! - quality >= 3: interval is 1, then 6, then `round(interval * ease_factor)`
//!   using the ease factor from before this review; repetitions += 1.
//! - ease factor moves by `0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)` and never
//!   drops below 1.3.
//! - the next review date is `today + interval` days.

use std::collections::{BTreeMap, HashMap};

use chrono::{Days, NaiveDate};
use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use crate::corpus::Term;

pub mod endpoints;
pub mod stats;

pub use stats::{statistics, LearningStatistics, TopicProgress};

pub const INITIAL_EASE_FACTOR: f64 = 2.5;
pub const MIN_EASE_FACTOR: f64 = 1.3;
pub const PASSING_QUALITY: u8 = 3;
pub const QUALITY_CORRECT: u8 = 4;
pub const QUALITY_INCORRECT: u8 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct LearningProgress {
    pub term_id: String,
    pub ease_factor: f64,
    pub interval_days: u32,
    pub repetitions: u32,
    pub next_review: NaiveDate,
    #[serde(default)]
    pub last_review: Option<NaiveDate>,
    #[serde(default)]
    pub correct_count: u32,
    #[serde(default)]
    pub incorrect_count: u32,
    #[serde(default)]
    pub is_bookmarked: bool,
    #[serde(default)]
    pub is_difficult: bool,
}

/// Fresh record for a term that has never been studied.
pub fn init_progress(term_id: &str, today: NaiveDate) -> LearningProgress {
    LearningProgress {
        term_id: term_id.to_string(),
        ease_factor: INITIAL_EASE_FACTOR,
        interval_days: 0,
        repetitions: 0,
        next_review: today,
        last_review: None,
        correct_count: 0,
        incorrect_count: 0,
        is_bookmarked: false,
        is_difficult: false,
    }
}

/// Apply one review of `quality` (clamped to 0..=5). Pure.
pub fn next_review(progress: &LearningProgress, quality: u8, today: NaiveDate) -> LearningProgress {
    let quality = quality.min(5);
    let passed = quality >= PASSING_QUALITY;

    let (interval_days, repetitions) = if passed {
        let interval = match progress.repetitions {
            0 => 1,
            1 => 6,
            _ => (f64::from(progress.interval_days) * progress.ease_factor).round() as u32,
        };
        (interval, progress.repetitions + 1)
    } else {
        (1, 0)
    };

    let miss = f64::from(5 - quality);
    let ease_factor =
        (progress.ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASE_FACTOR);

    LearningProgress {
        ease_factor,
        interval_days,
        repetitions,
        next_review: add_days(today, interval_days),
        last_review: Some(today),
        correct_count: progress.correct_count + u32::from(passed),
        incorrect_count: progress.incorrect_count + u32::from(!passed),
        ..progress.clone()
    }
}

fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

/// True when the term has no record or its review date has arrived.
pub fn is_due(progress: Option<&LearningProgress>, today: NaiveDate) -> bool {
    progress.map_or(true, |p| p.next_review <= today)
}

/// Terms due for review on `today`, in corpus order.
pub fn due_terms<'a>(
    terms: &'a [Term],
    progress: &HashMap<String, LearningProgress>,
    today: NaiveDate,
) -> Vec<&'a Term> {
    terms
        .iter()
        .filter(|t| is_due(progress.get(&t.term_id), today))
        .collect()
}

/// The persisted `term_id -> LearningProgress` map.
///
/// Records are created lazily on the first study event and never removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ProgressBook {
    #[serde(default)]
    pub entries: HashMap<String, LearningProgress>,
}

impl ProgressBook {
    pub fn get(&self, term_id: &str) -> Option<&LearningProgress> {
        self.entries.get(term_id)
    }

    fn entry(&mut self, term_id: &str, today: NaiveDate) -> &mut LearningProgress {
        self.entries
            .entry(term_id.to_string())
            .or_insert_with(|| init_progress(term_id, today))
    }

    /// Record a quiz outcome with the fixed quality mapping (4 correct, 1 incorrect).
    pub fn record_study(
        &mut self,
        term_id: &str,
        correct: bool,
        today: NaiveDate,
    ) -> &LearningProgress {
        let quality = if correct {
            QUALITY_CORRECT
        } else {
            QUALITY_INCORRECT
        };
        let entry = self.entry(term_id, today);
        *entry = next_review(entry, quality, today);
        log::debug!(
            "studied {}: correct={} next_review={}",
            term_id,
            correct,
            entry.next_review
        );
        entry
    }

    /// Flip the bookmark flag, returning the new value.
    pub fn toggle_bookmark(&mut self, term_id: &str, today: NaiveDate) -> bool {
        let entry = self.entry(term_id, today);
        entry.is_bookmarked = !entry.is_bookmarked;
        entry.is_bookmarked
    }

    pub fn toggle_difficult(&mut self, term_id: &str, today: NaiveDate) -> bool {
        let entry = self.entry(term_id, today);
        entry.is_difficult = !entry.is_difficult;
        entry.is_difficult
    }

    pub fn bookmarked(&self) -> Vec<&str> {
        let sorted: BTreeMap<&str, &LearningProgress> =
            self.entries.iter().map(|(k, v)| (k.as_str(), v)).collect();
        sorted
            .into_iter()
            .filter(|(_, p)| p.is_bookmarked)
            .map(|(k, _)| k)
            .collect()
    }
}
