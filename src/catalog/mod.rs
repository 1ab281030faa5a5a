//! Static catalog of learning modules and their item pools.

use std::sync::LazyLock;

use crate::models::{
    ActivityItem, ActivityKind, Flashcard, LearningModule, Level, PronunciationWord, QuizQuestion,
};

static MODULES: LazyLock<Vec<LearningModule>> = LazyLock::new(|| {
    vec![
        module(
            "vocabulary-builder",
            "Vocabulary Builder",
            "Learn new words with interactive flashcards. Flip cards to see translations and practice your memory.",
            Level::Beginner,
            "📚",
            10,
            "5-10 min",
            ActivityKind::Flashcards,
        ),
        module(
            "grammar-quiz",
            "Grammar Quizzes",
            "Test your knowledge with multiple-choice questions covering essential grammar rules.",
            Level::Intermediate,
            "✏️",
            15,
            "10-15 min",
            ActivityKind::GrammarQuiz,
        ),
        module(
            "pronunciation",
            "Pronunciation Practice",
            "Improve your speaking skills with listen-and-repeat exercises. Practice makes perfect!",
            Level::Beginner,
            "🎤",
            8,
            "5-8 min",
            ActivityKind::Pronunciation,
        ),
        module(
            "timed-challenge",
            "Timed Language Challenges",
            "Test your speed and knowledge with quick quizzes. Can you beat the clock?",
            Level::Advanced,
            "⏱️",
            20,
            "5 min",
            ActivityKind::TimedChallenge,
        ),
        module(
            "vocabulary-advanced",
            "Advanced Vocabulary",
            "Master complex words and phrases for advanced learners.",
            Level::Advanced,
            "📖",
            12,
            "10-12 min",
            ActivityKind::Flashcards,
        ),
        module(
            "grammar-beginner",
            "Grammar Basics",
            "Learn fundamental grammar rules with easy-to-understand examples.",
            Level::Beginner,
            "📝",
            10,
            "8-10 min",
            ActivityKind::GrammarQuiz,
        ),
    ]
});

#[allow(clippy::too_many_arguments)]
fn module(
    id: &str,
    title: &str,
    description: &str,
    level: Level,
    icon: &str,
    questions: u32,
    time: &str,
    activity: ActivityKind,
) -> LearningModule {
    LearningModule {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        level,
        icon: icon.to_string(),
        questions,
        time: time.to_string(),
        activity,
    }
}

/// All modules, or only those at `level`.
pub fn modules(level: Option<Level>) -> Vec<LearningModule> {
    MODULES
        .iter()
        .filter(|m| level.map_or(true, |l| m.level == l))
        .cloned()
        .collect()
}

/// Look up a module by id.
pub fn module_by_id(id: &str) -> Option<&'static LearningModule> {
    MODULES.iter().find(|m| m.id == id)
}

/// Display title of a module, or the id itself for unknown modules.
pub fn module_name(id: &str) -> String {
    module_by_id(id)
        .map(|m| m.title.clone())
        .unwrap_or_else(|| id.to_string())
}

/// The item pool an activity of `kind` draws from, in presentation order.
pub fn items_for(kind: ActivityKind) -> Vec<ActivityItem> {
    match kind {
        ActivityKind::Flashcards => vocabulary().into_iter().map(ActivityItem::Flashcard).collect(),
        ActivityKind::GrammarQuiz => grammar_questions()
            .into_iter()
            .map(ActivityItem::Question)
            .collect(),
        ActivityKind::Pronunciation => pronunciation_words()
            .into_iter()
            .map(ActivityItem::Pronunciation)
            .collect(),
        ActivityKind::TimedChallenge => challenge_questions()
            .into_iter()
            .map(ActivityItem::Question)
            .collect(),
    }
}

fn vocabulary() -> Vec<Flashcard> {
    [
        ("Hello", "Hola"),
        ("Thank you", "Gracias"),
        ("Goodbye", "Adiós"),
        ("Please", "Por favor"),
        ("Yes", "Sí"),
        ("No", "No"),
        ("Water", "Agua"),
        ("Food", "Comida"),
        ("Friend", "Amigo"),
        ("Love", "Amor"),
    ]
    .into_iter()
    .map(|(word, translation)| Flashcard {
        word: word.to_string(),
        translation: translation.to_string(),
        language: "Spanish".to_string(),
    })
    .collect()
}

fn question(text: &str, options: [&str; 4], correct: usize) -> QuizQuestion {
    QuizQuestion {
        question: text.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct,
    }
}

fn grammar_questions() -> Vec<QuizQuestion> {
    vec![
        question(
            "Which sentence is grammatically correct?",
            [
                "I am going to the store.",
                "I is going to the store.",
                "I are going to the store.",
                "I be going to the store.",
            ],
            0,
        ),
        question(
            "Choose the correct past tense form:",
            [
                "I runned yesterday.",
                "I ran yesterday.",
                "I run yesterday.",
                "I running yesterday.",
            ],
            1,
        ),
        question(
            "Which is the correct plural form?",
            ["Childs", "Children", "Childes", "Child"],
            1,
        ),
        question(
            "Select the correct article:",
            ["A apple", "An apple", "The apple", "Apple"],
            1,
        ),
        question(
            "Which sentence uses the correct verb form?",
            [
                "She don't like pizza.",
                "She doesn't like pizza.",
                "She not like pizza.",
                "She no like pizza.",
            ],
            1,
        ),
    ]
}

fn pronunciation_words() -> Vec<PronunciationWord> {
    [
        ("Hello", "/həˈloʊ/"),
        ("Thank you", "/θæŋk juː/"),
        ("Please", "/pliːz/"),
        ("Water", "/ˈwɔːtər/"),
        ("Friend", "/frend/"),
    ]
    .into_iter()
    .map(|(word, phonetic)| PronunciationWord {
        word: word.to_string(),
        phonetic: phonetic.to_string(),
    })
    .collect()
}

fn challenge_questions() -> Vec<QuizQuestion> {
    let greetings = ["Hola", "Adiós", "Gracias", "Por favor"];
    vec![
        question("What is \"Hello\" in Spanish?", greetings, 0),
        question("What is \"Thank you\" in Spanish?", greetings, 2),
        question("What is \"Goodbye\" in Spanish?", greetings, 1),
        question("What is \"Please\" in Spanish?", greetings, 3),
        question(
            "What is \"Water\" in Spanish?",
            ["Agua", "Comida", "Amigo", "Amor"],
            0,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        assert_eq!(modules(None).len(), 6);

        let beginner: Vec<_> = modules(Some(Level::Beginner))
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(
            beginner,
            vec!["vocabulary-builder", "pronunciation", "grammar-beginner"]
        );
        assert_eq!(modules(Some(Level::Intermediate)).len(), 1);
    }

    #[test]
    fn test_module_activity_mapping() {
        let kind = |id: &str| module_by_id(id).unwrap().activity;
        assert_eq!(kind("vocabulary-advanced"), ActivityKind::Flashcards);
        assert_eq!(kind("grammar-beginner"), ActivityKind::GrammarQuiz);
        assert_eq!(kind("pronunciation"), ActivityKind::Pronunciation);
        assert_eq!(kind("timed-challenge"), ActivityKind::TimedChallenge);
        assert!(module_by_id("cooking").is_none());
    }

    #[test]
    fn test_question_pools_have_valid_answers() {
        for kind in [ActivityKind::GrammarQuiz, ActivityKind::TimedChallenge] {
            let items = items_for(kind);
            assert_eq!(items.len(), 5);
            for item in items {
                assert!(item.correct_option().unwrap() < item.option_count());
            }
        }
        assert_eq!(items_for(ActivityKind::Flashcards).len(), 10);
        assert_eq!(items_for(ActivityKind::Pronunciation).len(), 5);
    }

    #[test]
    fn test_module_name_falls_back_to_id() {
        assert_eq!(module_name("grammar-quiz"), "Grammar Quizzes");
        assert_eq!(module_name("legacy-module"), "legacy-module");
    }
}
