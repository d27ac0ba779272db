//! Corpus QA checks and Anki export.

use std::collections::{BTreeMap, HashSet};

use super::{Corpus, QaReport};

impl Corpus {
    /// Check the corpus for duplicate ids, blank definitions, shared
    /// abbreviations and relations pointing at unknown terms. Missing examples
    /// are reported but do not fail the check.
    pub fn validate(&self) -> QaReport {
        let mut report = QaReport {
            total_terms: self.terms().len(),
            ..QaReport::default()
        };

        let mut ids = HashSet::new();
        for term in self.terms() {
            if !ids.insert(term.term_id.as_str()) {
                report.duplicate_count += 1;
            }
            if term.jp_definition.trim().is_empty() {
                report.missing_definition.push(term.term_id.clone());
            }
        }

        let with_example: HashSet<&str> =
            self.examples().iter().map(|e| e.term_id.as_str()).collect();
        report.missing_example = self
            .terms()
            .iter()
            .filter(|t| !with_example.contains(t.term_id.as_str()))
            .map(|t| t.term_id.clone())
            .collect();

        let mut abbrevs: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for term in self.terms() {
            for a in &term.abbreviations {
                abbrevs.entry(a.as_str()).or_default().push(&term.term_id);
            }
        }
        report.abbreviation_collisions = abbrevs
            .into_iter()
            .filter(|(_, owners)| owners.len() > 1)
            .map(|(a, owners)| format!("{}: {}", a, owners.join(", ")))
            .collect();

        report.orphan_relations = self
            .relations()
            .iter()
            .filter(|r| !ids.contains(r.related_term_id.as_str()))
            .map(|r| format!("{} -> {}", r.term_id, r.related_term_id))
            .collect();

        report.passed = report.duplicate_count == 0
            && report.missing_definition.is_empty()
            && report.abbreviation_collisions.is_empty()
            && report.orphan_relations.is_empty();

        if !report.passed {
            log::warn!(
                "corpus QA failed: {} duplicates, {} blank definitions, {} abbreviation collisions, {} orphan relations",
                report.duplicate_count,
                report.missing_definition.len(),
                report.abbreviation_collisions.len(),
                report.orphan_relations.len()
            );
        }
        report
    }

    /// Anki import format: `front<TAB>back<TAB>topic`, one line per term.
    pub fn export_anki_tsv(&self) -> String {
        self.terms()
            .iter()
            .map(|term| {
                let example = self.examples_for(&term.term_id).into_iter().next();
                let front = format!("{}（{}）", term.headword_jp, term.canonical_en);
                let mut back: Vec<String> = vec![term.jp_definition.clone()];
                if !term.key_points.is_empty() {
                    back.push(format!("Key Points: {}", term.key_points.join(" / ")));
                }
                if let Some(ex) = example {
                    back.push(format!("例文: {}", ex.example_en));
                    back.push(format!("訳: {}", ex.example_jp));
                }
                if !term.pitfall.is_empty() {
                    back.push(format!("Pitfall: {}", term.pitfall));
                }
                back.retain(|p| !p.is_empty());
                format!("{}\t{}\t{}", front, back.join("<br>"), term.topic_code)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
