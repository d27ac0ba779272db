//! Term repository: the read-only vocabulary corpus and its topic taxonomy.
//!
//! The built-in dataset lives in `data/*.json` and is compiled into the binary.
//! A directory with the same three files can replace it at startup.

use std::collections::HashMap;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::CorpusError;

pub mod endpoints;
pub mod quality;
pub mod types;

pub use types::{Example, QaReport, Relation, Term, Topic, TOPIC_TABLE};

const EMBEDDED_TERMS: &str = include_str!("../../data/terms.json");
const EMBEDDED_EXAMPLES: &str = include_str!("../../data/examples.json");
const EMBEDDED_RELATIONS: &str = include_str!("../../data/relations.json");

#[derive(Debug, Clone)]
pub struct Corpus {
    terms: Vec<Term>,
    examples: Vec<Example>,
    relations: Vec<Relation>,
    topics: Vec<Topic>,
    by_id: HashMap<String, usize>,
}

impl Corpus {
    /// Build a corpus from already parsed parts. Later duplicates of a term id
    /// stay in `terms()` but lookups resolve to the first occurrence.
    pub fn from_parts(terms: Vec<Term>, examples: Vec<Example>, relations: Vec<Relation>) -> Self {
        let mut by_id = HashMap::new();
        for (i, t) in terms.iter().enumerate() {
            by_id.entry(t.term_id.clone()).or_insert(i);
        }
        let topics = TOPIC_TABLE
            .iter()
            .map(|(code, en, jp)| Topic {
                code: code.to_string(),
                name_en: en.to_string(),
                name_jp: jp.to_string(),
                term_count: terms.iter().filter(|t| t.topic_code == *code).count(),
            })
            .collect();
        Corpus {
            terms,
            examples,
            relations,
            topics,
            by_id,
        }
    }

    /// The dataset shipped with the crate.
    pub fn embedded() -> Result<Self, CorpusError> {
        let terms = parse("terms.json", EMBEDDED_TERMS)?;
        let examples = parse("examples.json", EMBEDDED_EXAMPLES)?;
        let relations = parse("relations.json", EMBEDDED_RELATIONS)?;
        Ok(Self::from_parts(terms, examples, relations))
    }

    /// Load `terms.json`, `examples.json` and `relations.json` from `dir`.
    /// Missing example or relation files are treated as empty.
    pub fn from_json_files(dir: &Path) -> Result<Self, CorpusError> {
        let terms = parse_file(&dir.join("terms.json"))?;
        let examples = parse_optional_file(&dir.join("examples.json"))?;
        let relations = parse_optional_file(&dir.join("relations.json"))?;
        log::info!("loaded {} terms from {}", terms.len(), dir.display());
        Ok(Self::from_parts(terms, examples, relations))
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term(&self, term_id: &str) -> Option<&Term> {
        self.by_id.get(term_id).map(|&i| &self.terms[i])
    }

    pub fn terms_in_topic<'a>(
        &'a self,
        topic_code: &'a str,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.terms
            .iter()
            .filter(move |t| t.topic_code == topic_code)
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn topic(&self, code: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.code == code)
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn examples_for(&self, term_id: &str) -> Vec<&Example> {
        self.examples
            .iter()
            .filter(|e| e.term_id == term_id)
            .collect()
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn relations_for(&self, term_id: &str) -> Vec<&Relation> {
        self.relations
            .iter()
            .filter(|r| r.term_id == term_id)
            .collect()
    }
}

fn parse<T: DeserializeOwned>(name: &str, raw: &str) -> Result<Vec<T>, CorpusError> {
    serde_json::from_str(raw).map_err(|source| CorpusError::Json {
        path: name.to_string(),
        source,
    })
}

fn parse_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CorpusError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&path.display().to_string(), &raw)
}

fn parse_optional_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CorpusError> {
    if !path.exists() {
        log::warn!("{} not found, continuing without it", path.display());
        return Ok(Vec::new());
    }
    parse_file(path)
}
