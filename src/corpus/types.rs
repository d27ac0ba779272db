use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

/// One vocabulary entry. Immutable once the corpus is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct Term {
    pub term_id: String,
    pub canonical_en: String,
    pub headword_jp: String,
    pub jp_definition: String,
    pub topic_code: String,
    #[serde(default)]
    pub formula: Option<String>,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub pitfall: String,
    #[serde(default)]
    pub abbreviations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct Example {
    pub term_id: String,
    pub example_en: String,
    pub example_jp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct Relation {
    pub term_id: String,
    pub related_term_id: String,
    pub relation_type: String,
}

/// Exam topic. `term_count` is derived from the loaded corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct Topic {
    pub code: String,
    pub name_en: String,
    pub name_jp: String,
    pub term_count: usize,
}

/// Fixed topic taxonomy: (code, English name, Japanese name).
pub const TOPIC_TABLE: [(&str, &str, &str); 10] = [
    ("ETH", "Ethics & Professional Standards", "倫理・職業行為基準"),
    ("QM", "Quantitative Methods", "定量分析"),
    ("ECON", "Economics", "経済学"),
    ("FSA", "Financial Statement Analysis", "財務諸表分析"),
    ("CI", "Corporate Issuers", "コーポレート・イシュアーズ"),
    ("EQ", "Equity Investments", "株式投資"),
    ("FI", "Fixed Income", "債券"),
    ("DER", "Derivatives", "デリバティブ"),
    ("AI", "Alternative Investments", "オルタナティブ投資"),
    ("PM", "Portfolio Management", "ポートフォリオ管理"),
];

/// Result of the corpus quality check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct QaReport {
    pub total_terms: usize,
    pub duplicate_count: usize,
    pub missing_definition: Vec<String>,
    pub missing_example: Vec<String>,
    pub abbreviation_collisions: Vec<String>,
    pub orphan_relations: Vec<String>,
    pub passed: bool,
}
