use std::collections::BTreeMap;

use chrono::NaiveDate;
use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use super::{is_due, ProgressBook};
use crate::corpus::{Term, Topic};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct TopicProgress {
    pub total: usize,
    pub learned: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct LearningStatistics {
    pub total: usize,
    /// Terms with at least one study record.
    pub learned: usize,
    /// Terms passed three or more times in a row.
    pub mastered: usize,
    /// Due reviews, counting never-studied terms.
    pub review_due: usize,
    pub by_topic: BTreeMap<String, TopicProgress>,
}

pub fn statistics(
    terms: &[Term],
    book: &ProgressBook,
    topics: &[Topic],
    today: NaiveDate,
) -> LearningStatistics {
    let mut stats = LearningStatistics {
        total: terms.len(),
        by_topic: topics
            .iter()
            .map(|t| (t.code.clone(), TopicProgress::default()))
            .collect(),
        ..LearningStatistics::default()
    };

    for term in terms {
        let progress = book.get(&term.term_id);
        let topic = stats.by_topic.entry(term.topic_code.clone()).or_default();
        topic.total += 1;
        if let Some(p) = progress {
            topic.learned += 1;
            stats.learned += 1;
            if p.repetitions >= 3 {
                stats.mastered += 1;
            }
        }
        if is_due(progress, today) {
            stats.review_due += 1;
        }
    }
    stats
}
