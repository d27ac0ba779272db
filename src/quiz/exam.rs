//! Exam-style question bank used by the pre-battle item quiz.

use rand::seq::SliceRandom;
use rand::Rng;
use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use crate::error::CorpusError;

const EMBEDDED_EXAM_QUESTIONS: &str = include_str!("../../data/exam_questions.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ExamQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub difficulty: String,
}

impl ExamQuestion {
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExamBank {
    questions: Vec<ExamQuestion>,
}

impl ExamBank {
    pub fn new(questions: Vec<ExamQuestion>) -> Self {
        ExamBank { questions }
    }

    pub fn embedded() -> Result<Self, CorpusError> {
        let questions =
            serde_json::from_str(EMBEDDED_EXAM_QUESTIONS).map_err(|source| CorpusError::Json {
                path: "exam_questions.json".to_string(),
                source,
            })?;
        Ok(ExamBank { questions })
    }

    pub fn questions(&self) -> &[ExamQuestion] {
        &self.questions
    }

    pub fn get(&self, id: &str) -> Option<&ExamQuestion> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Uniform pick; `None` when the bank is empty.
    pub fn random_question<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&ExamQuestion> {
        self.questions.choose(rng)
    }
}
