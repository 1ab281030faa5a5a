//! The activity state machine shared by every learning variant.
//!
//! An engine walks an ordered item sequence. Each item is shown in
//! `Presenting`; graded variants then go through `AwaitingInput` (grammar
//! quiz only) and `Revealed` before the next item. Running past the last
//! item, or the timed countdown reaching zero, enters `Finished` exactly once.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::task::ScheduledTask;
use crate::errors::AppError;
use crate::models::{ActivityItem, ActivityKind, Flashcard, PronunciationWord};
use crate::scoring;

/// Per-variant switches driving the shared state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantConfig {
    /// The learner reports "know" / "don't know" instead of choosing an option
    pub self_report: bool,
    /// Options are chosen and checked against the correct index
    pub graded: bool,
    /// A chosen option waits for an explicit submit before being revealed
    pub confirm_submit: bool,
    /// A revealed answer advances on a timer instead of an explicit next
    pub auto_advance: bool,
    /// A countdown runs alongside the questions
    pub timed: bool,
}

impl VariantConfig {
    pub fn for_kind(kind: ActivityKind) -> Self {
        let off = Self {
            self_report: false,
            graded: false,
            confirm_submit: false,
            auto_advance: false,
            timed: false,
        };
        match kind {
            ActivityKind::Flashcards => Self {
                self_report: true,
                ..off
            },
            ActivityKind::GrammarQuiz => Self {
                graded: true,
                confirm_submit: true,
                ..off
            },
            ActivityKind::Pronunciation => off,
            ActivityKind::TimedChallenge => Self {
                graded: true,
                auto_advance: true,
                timed: true,
                ..off
            },
        }
    }

    /// Whether a finished run produces a score worth recording.
    pub fn scored(&self) -> bool {
        self.self_report || self.graded
    }
}

/// State of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Phase {
    Presenting { index: usize },
    #[serde(rename_all = "camelCase")]
    AwaitingInput { index: usize, selected: usize },
    #[serde(rename_all = "camelCase")]
    Revealed {
        index: usize,
        selected: usize,
        was_correct: bool,
    },
    Finished { score: usize, total: usize },
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Presenting { .. } => "presenting",
            Phase::AwaitingInput { .. } => "awaiting input",
            Phase::Revealed { .. } => "revealed",
            Phase::Finished { .. } => "finished",
        }
    }
}

/// Learner input forwarded by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    Know,
    DontKnow,
    Select { option: usize },
    Submit,
    Next,
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::Know => "know",
            Action::DontKnow => "dontKnow",
            Action::Select { .. } => "select",
            Action::Submit => "submit",
            Action::Next => "next",
        }
    }
}

/// Summary handed out once, when a run enters `Finished`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub module_id: String,
    pub kind: ActivityKind,
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    /// False for the pronunciation drill, which keeps no score
    pub scored: bool,
}

impl Completion {
    /// Scored, non-empty runs go into the progress table.
    pub fn should_record(&self) -> bool {
        self.scored && self.total > 0
    }
}

#[derive(Debug)]
struct Countdown {
    remaining: u64,
    ticker: Option<ScheduledTask>,
}

/// How an option is marked once the answer is revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OptionMark {
    Correct,
    Incorrect,
    Unmarked,
}

/// The current item as the learner may see it. The correct option is withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ItemView {
    Flashcard(Flashcard),
    Question {
        question: String,
        options: Vec<String>,
    },
    Pronunciation(PronunciationWord),
}

impl From<&ActivityItem> for ItemView {
    fn from(item: &ActivityItem) -> Self {
        match item {
            ActivityItem::Flashcard(card) => ItemView::Flashcard(card.clone()),
            ActivityItem::Question(q) => ItemView::Question {
                question: q.question.clone(),
                options: q.options.clone(),
            },
            ActivityItem::Pronunciation(word) => ItemView::Pronunciation(word.clone()),
        }
    }
}

/// Snapshot rendered by the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
    pub module_id: String,
    pub kind: ActivityKind,
    pub phase: Phase,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_left: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_option: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<OptionMark>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<u32>,
}

/// One run of one activity.
#[derive(Debug)]
pub struct ActivityEngine {
    module_id: String,
    kind: ActivityKind,
    config: VariantConfig,
    items: Vec<ActivityItem>,
    phase: Phase,
    score: usize,
    countdown: Option<Countdown>,
    pending_advance: Option<ScheduledTask>,
}

fn invalid(message: String) -> AppError {
    AppError::InvalidAction(message)
}

impl ActivityEngine {
    /// Start a run over `items` in the given order.
    ///
    /// `time_limit` is only used by timed variants and is counted in whole seconds.
    /// An empty sequence finishes immediately with a zero score.
    pub fn new(
        module_id: &str,
        kind: ActivityKind,
        items: Vec<ActivityItem>,
        time_limit: Duration,
    ) -> Self {
        let config = VariantConfig::for_kind(kind);
        let countdown = config.timed.then(|| Countdown {
            remaining: time_limit.as_secs(),
            ticker: None,
        });

        let mut engine = Self {
            module_id: module_id.to_string(),
            kind,
            config,
            items,
            phase: Phase::Presenting { index: 0 },
            score: 0,
            countdown,
            pending_advance: None,
        };
        if engine.items.is_empty() {
            engine.finish();
        }
        engine
    }

    /// Like [`ActivityEngine::new`], after a uniform shuffle of `items`.
    pub fn shuffled<R: Rng + ?Sized>(
        module_id: &str,
        kind: ActivityKind,
        mut items: Vec<ActivityItem>,
        time_limit: Duration,
        rng: &mut R,
    ) -> Self {
        items.shuffle(rng);
        Self::new(module_id, kind, items, time_limit)
    }

    #[cfg(test)]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn config(&self) -> VariantConfig {
        self.config
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished { .. })
    }

    pub fn time_left(&self) -> Option<u64> {
        self.countdown.as_ref().map(|c| c.remaining)
    }

    /// The result summary, once finished.
    pub fn completion(&self) -> Option<Completion> {
        match self.phase {
            Phase::Finished { score, total } => Some(self.summary(score, total)),
            _ => None,
        }
    }

    fn summary(&self, score: usize, total: usize) -> Completion {
        Completion {
            module_id: self.module_id.clone(),
            kind: self.kind,
            score,
            total,
            percentage: scoring::percentage(score, total),
            scored: self.config.scored(),
        }
    }

    /// Apply learner input. Returns the completion if this input finished the run.
    pub fn apply(&mut self, action: Action) -> Result<Option<Completion>, AppError> {
        let config = self.config;
        match (action, self.phase.clone()) {
            (_, Phase::Finished { .. }) => {
                Err(invalid("The activity is already finished".to_string()))
            }
            (Action::Know, Phase::Presenting { index }) if config.self_report => {
                self.score += 1;
                Ok(self.present(index + 1))
            }
            (Action::DontKnow, Phase::Presenting { index }) if config.self_report => {
                Ok(self.present(index + 1))
            }
            (
                Action::Select { option },
                Phase::Presenting { index } | Phase::AwaitingInput { index, .. },
            ) if config.graded => {
                let count = self.items[index].option_count();
                if option >= count {
                    return Err(AppError::field(
                        "option",
                        &format!("Option must be between 0 and {}", count.saturating_sub(1)),
                    ));
                }
                if config.confirm_submit {
                    self.phase = Phase::AwaitingInput {
                        index,
                        selected: option,
                    };
                } else {
                    self.reveal(index, option);
                }
                Ok(None)
            }
            (Action::Submit, Phase::AwaitingInput { index, selected }) => {
                self.reveal(index, selected);
                Ok(None)
            }
            (Action::Next, Phase::Revealed { index, .. }) if !config.auto_advance => {
                Ok(self.present(index + 1))
            }
            (Action::Next, Phase::Presenting { index }) if !config.scored() => {
                Ok(self.present(index + 1))
            }
            (action, phase) => Err(invalid(format!(
                "Action '{}' is not allowed while {}",
                action.name(),
                phase.name()
            ))),
        }
    }

    /// Move past a revealed answer on variants that advance by themselves.
    pub fn advance(&mut self) -> Result<Option<Completion>, AppError> {
        match self.phase {
            Phase::Revealed { index, .. } if self.config.auto_advance => {
                self.pending_advance = None;
                Ok(self.present(index + 1))
            }
            ref phase => Err(invalid(format!("Cannot advance while {}", phase.name()))),
        }
    }

    /// One second of countdown. Reaching zero finishes the run.
    pub fn tick(&mut self) -> Result<Option<Completion>, AppError> {
        if self.is_finished() {
            return Err(invalid("The activity is already finished".to_string()));
        }
        let Some(countdown) = self.countdown.as_mut() else {
            return Err(invalid("This activity has no countdown".to_string()));
        };

        countdown.remaining = countdown.remaining.saturating_sub(1);
        if countdown.remaining == 0 {
            Ok(Some(self.finish()))
        } else {
            Ok(None)
        }
    }

    /// Hand the countdown's ticking task to the engine.
    pub fn attach_ticker(&mut self, ticker: ScheduledTask) {
        let finished = self.is_finished();
        match self.countdown.as_mut() {
            Some(countdown) if !finished => countdown.ticker = Some(ticker),
            // Dropping the guard cancels the task
            _ => drop(ticker),
        }
    }

    /// Whether a revealed answer is waiting for a delayed advance to be scheduled.
    pub fn needs_advance(&self) -> bool {
        self.config.auto_advance
            && matches!(self.phase, Phase::Revealed { .. })
            && self.pending_advance.is_none()
    }

    /// Hand the pending reveal-advance task to the engine.
    pub fn schedule_advance(&mut self, task: ScheduledTask) {
        if matches!(self.phase, Phase::Revealed { .. }) {
            self.pending_advance = Some(task);
        }
    }

    /// Cancel every scheduled task without finishing, for a run being abandoned.
    pub fn release_tasks(&mut self) {
        self.pending_advance = None;
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.ticker = None;
        }
    }

    pub fn view(&self) -> ActivityView {
        let index = match self.phase {
            Phase::Presenting { index }
            | Phase::AwaitingInput { index, .. }
            | Phase::Revealed { index, .. } => Some(index),
            Phase::Finished { .. } => None,
        };
        let current = index.and_then(|i| self.items.get(i));

        let (correct_option, marks) = match (&self.phase, current) {
            (Phase::Revealed { selected, .. }, Some(item)) => {
                let correct = item.correct_option();
                let marks = (0..item.option_count())
                    .map(|i| {
                        if Some(i) == correct {
                            OptionMark::Correct
                        } else if i == *selected {
                            OptionMark::Incorrect
                        } else {
                            OptionMark::Unmarked
                        }
                    })
                    .collect();
                (correct, Some(marks))
            }
            _ => (None, None),
        };

        ActivityView {
            module_id: self.module_id.clone(),
            kind: self.kind,
            phase: self.phase.clone(),
            total: self.items.len(),
            score: self.config.scored().then_some(self.score),
            time_left: self.time_left(),
            item: current.map(ItemView::from),
            correct_option,
            marks,
            percentage: self
                .completion()
                .filter(|c| c.scored)
                .map(|c| c.percentage),
        }
    }

    fn reveal(&mut self, index: usize, selected: usize) {
        let was_correct = self.items[index].correct_option() == Some(selected);
        if was_correct {
            self.score += 1;
        }
        self.phase = Phase::Revealed {
            index,
            selected,
            was_correct,
        };
    }

    fn present(&mut self, index: usize) -> Option<Completion> {
        if index >= self.items.len() {
            Some(self.finish())
        } else {
            self.phase = Phase::Presenting { index };
            None
        }
    }

    fn finish(&mut self) -> Completion {
        let (score, total) = (self.score, self.items.len());
        self.phase = Phase::Finished { score, total };
        self.release_tasks();
        tracing::debug!(module_id = %self.module_id, score, total, "Activity finished");
        self.summary(score, total)
    }
}
