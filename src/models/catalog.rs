//! Learning module and item models.

use serde::{Deserialize, Serialize};

/// Difficulty level of a learning module.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(Level::Beginner),
            "intermediate" => Some(Level::Intermediate),
            "advanced" => Some(Level::Advanced),
            _ => None,
        }
    }
}

/// The four activity variants a module can run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ActivityKind {
    Flashcards,
    GrammarQuiz,
    Pronunciation,
    TimedChallenge,
}

/// A learning module in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningModule {
    pub id: String,
    pub title: String,
    pub description: String,
    pub level: Level,
    pub icon: String,
    pub questions: u32,
    pub time: String,
    pub activity: ActivityKind,
}

/// A vocabulary flashcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub word: String,
    pub translation: String,
    pub language: String,
}

/// A multiple-choice question with the index of its correct option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct: usize,
}

/// A word to listen to and repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PronunciationWord {
    pub word: String,
    pub phonetic: String,
}

/// One item presented by an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ActivityItem {
    Flashcard(Flashcard),
    Question(QuizQuestion),
    Pronunciation(PronunciationWord),
}

impl ActivityItem {
    /// The correct option index, for question items.
    pub fn correct_option(&self) -> Option<usize> {
        match self {
            ActivityItem::Question(q) => Some(q.correct),
            _ => None,
        }
    }

    /// Number of selectable options, zero for non-question items.
    pub fn option_count(&self) -> usize {
        match self {
            ActivityItem::Question(q) => q.options.len(),
            _ => 0,
        }
    }
}
