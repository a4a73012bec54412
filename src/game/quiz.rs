//! Quiz Round Logic
//!
//! A quiz section samples its questions once, without replacement, then plays
//! them one at a time. Each round ends on an answer or on the question timer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::rng::DeterministicRng;

/// Answer options per question.
pub const OPTION_COUNT: usize = 4;

/// Quiz errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// Question bank smaller than the configured round count.
    #[error("Need {needed} questions, bank has {available}")]
    InsufficientQuestions {
        /// Rounds configured.
        needed: usize,
        /// Questions in the bank.
        available: usize,
    },

    /// Option index outside `0..OPTION_COUNT`.
    #[error("Option index {0} out of range")]
    InvalidOption(usize),

    /// No question is waiting for an answer.
    #[error("No question awaiting an answer")]
    NotAwaitingAnswer,

    /// Question fails validation.
    #[error("Invalid question: {0}")]
    InvalidQuestion(String),
}

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Prompt text.
    #[serde(rename = "question")]
    pub text: String,
    /// Answer options, in display order.
    pub options: [String; OPTION_COUNT],
    /// Must equal exactly one option's text.
    pub correct_answer: String,
}

impl Question {
    /// Build a validated question.
    pub fn new(
        text: impl Into<String>,
        options: [String; OPTION_COUNT],
        correct_answer: impl Into<String>,
    ) -> Result<Self, QuizError> {
        let question = Self {
            text: text.into(),
            options,
            correct_answer: correct_answer.into(),
        };
        question.validate()?;
        Ok(question)
    }

    /// Check that exactly one option matches the correct answer.
    pub fn validate(&self) -> Result<(), QuizError> {
        let matches = self
            .options
            .iter()
            .filter(|o| **o == self.correct_answer)
            .count();
        if matches == 1 {
            Ok(())
        } else {
            Err(QuizError::InvalidQuestion(format!(
                "'{}': correct answer matches {} options",
                self.text, matches
            )))
        }
    }

    /// Whether option `index` is the right one. Exact, case-sensitive match.
    pub fn is_correct(&self, index: usize) -> Result<bool, QuizError> {
        self.options
            .get(index)
            .map(|o| *o == self.correct_answer)
            .ok_or(QuizError::InvalidOption(index))
    }
}

/// Result of one quiz round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// Player picked the right option.
    pub correct: bool,
    /// Text of the right option.
    pub correct_text: String,
    /// Option picked, `None` when the question timed out.
    pub selected: Option<usize>,
}

/// Progress of the quiz section.
#[derive(Debug, Clone, Default)]
pub struct QuizState {
    /// Questions in this section.
    pub rounds_total: u32,
    /// Rounds finished so far; terminal at `rounds_total`.
    pub round_index: u32,
    /// Sampled questions for this section.
    pub question_pool: Vec<Question>,
    /// Question on screen.
    pub current_question: Option<Question>,
    /// A question is waiting for an answer.
    pub in_progress: bool,
    /// Correct answers so far.
    pub correct_answers: u32,
}

impl QuizState {
    /// Sample `rounds` questions from `bank` and reset progress.
    pub fn begin(
        &mut self,
        bank: &[Question],
        rounds: u32,
        rng: &mut DeterministicRng,
    ) -> Result<(), QuizError> {
        let needed = rounds as usize;
        let pool = rng
            .sample(bank, needed)
            .ok_or(QuizError::InsufficientQuestions {
                needed,
                available: bank.len(),
            })?;

        *self = Self {
            rounds_total: rounds,
            question_pool: pool,
            ..Self::default()
        };
        Ok(())
    }

    /// Put the next question up. `None` when the section is finished or a
    /// question is already waiting.
    pub fn present_next(&mut self) -> Option<&Question> {
        if self.in_progress || self.is_complete() {
            return None;
        }
        let question = self.question_pool.get(self.round_index as usize)?.clone();
        self.in_progress = true;
        self.current_question = Some(question);
        self.current_question.as_ref()
    }

    /// Answer the waiting question with option `index`.
    ///
    /// Out-of-range indices are rejected and leave the question waiting.
    pub fn answer(&mut self, index: usize) -> Result<AnswerOutcome, QuizError> {
        if !self.in_progress {
            return Err(QuizError::NotAwaitingAnswer);
        }
        let question = self
            .current_question
            .as_ref()
            .ok_or(QuizError::NotAwaitingAnswer)?;
        let correct = question.is_correct(index)?;
        let correct_text = question.correct_answer.clone();

        self.finish_round(correct);
        Ok(AnswerOutcome {
            correct,
            correct_text,
            selected: Some(index),
        })
    }

    /// The question timer ran out: the round counts as unanswered.
    pub fn expire(&mut self) -> Option<AnswerOutcome> {
        if !self.in_progress {
            return None;
        }
        let correct_text = self.current_question.as_ref()?.correct_answer.clone();
        self.finish_round(false);
        Some(AnswerOutcome {
            correct: false,
            correct_text,
            selected: None,
        })
    }

    /// All rounds played.
    pub fn is_complete(&self) -> bool {
        self.round_index >= self.rounds_total
    }

    /// Drop all progress.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn finish_round(&mut self, correct: bool) {
        self.in_progress = false;
        self.round_index += 1;
        if correct {
            self.correct_answers += 1;
        }
    }
}

/// Quiz contribution for `correct` right answers.
pub fn quiz_score(correct: u32, points_per_correct: u32) -> u32 {
    correct.saturating_mul(points_per_correct)
}

#[cfg(test)]
pub(crate) fn sample_bank(size: usize) -> Vec<Question> {
    (0..size)
        .map(|i| {
            Question::new(
                format!("Question {i}?"),
                [
                    format!("Right {i}"),
                    format!("Wrong A{i}"),
                    format!("Wrong B{i}"),
                    format!("Wrong C{i}"),
                ],
                format!("Right {i}"),
            )
            .unwrap()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn opts(a: &str, b: &str, c: &str, d: &str) -> [String; OPTION_COUNT] {
        [a.into(), b.into(), c.into(), d.into()]
    }

    #[test]
    fn test_question_validation() {
        assert!(Question::new("2+2?", opts("3", "4", "5", "6"), "4").is_ok());
        // No match
        assert!(Question::new("2+2?", opts("3", "4", "5", "6"), "7").is_err());
        // Duplicate match
        assert!(Question::new("2+2?", opts("4", "4", "5", "6"), "4").is_err());
    }

    #[test]
    fn test_answer_is_exact_match() {
        let q = Question::new("Capital?", opts("Lisbon", "lisbon", "Porto", "Faro"), "Lisbon").unwrap();
        assert_eq!(q.is_correct(0), Ok(true));
        // Case-sensitive
        assert_eq!(q.is_correct(1), Ok(false));
        assert_eq!(q.is_correct(4), Err(QuizError::InvalidOption(4)));
    }

    #[test]
    fn test_question_json_shape() {
        let json = r#"{"question":"2+2?","options":["3","4","5","6"],"correct_answer":"4"}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.text, "2+2?");
        assert_eq!(q.options[1], "4");

        // Three options do not make a question
        let short = r#"{"question":"?","options":["a","b","c"],"correct_answer":"a"}"#;
        assert!(serde_json::from_str::<Question>(short).is_err());
    }

    #[test]
    fn test_insufficient_bank() {
        let mut rng = DeterministicRng::new(1);
        let mut quiz = QuizState::default();
        let err = quiz.begin(&sample_bank(2), 3, &mut rng).unwrap_err();
        assert_eq!(err, QuizError::InsufficientQuestions { needed: 3, available: 2 });

        let err = quiz.begin(&[], 1, &mut rng).unwrap_err();
        assert_eq!(err, QuizError::InsufficientQuestions { needed: 1, available: 0 });
    }

    #[test]
    fn test_full_section() {
        let mut rng = DeterministicRng::new(8);
        let mut quiz = QuizState::default();
        quiz.begin(&sample_bank(10), 3, &mut rng).unwrap();

        // Right, wrong, timeout
        let q = quiz.present_next().unwrap().clone();
        let right = q.options.iter().position(|o| *o == q.correct_answer).unwrap();
        assert!(quiz.answer(right).unwrap().correct);

        let q = quiz.present_next().unwrap().clone();
        let wrong = (q.options.iter().position(|o| *o == q.correct_answer).unwrap() + 1) % 4;
        let outcome = quiz.answer(wrong).unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.correct_text, q.correct_answer);

        quiz.present_next().unwrap();
        assert_eq!(quiz.expire().unwrap().selected, None);

        assert!(quiz.is_complete());
        assert_eq!(quiz.round_index, 3);
        assert_eq!(quiz.correct_answers, 1);
        assert!(quiz.present_next().is_none());
    }

    #[test]
    fn test_answer_guards() {
        let mut rng = DeterministicRng::new(5);
        let mut quiz = QuizState::default();
        quiz.begin(&sample_bank(4), 2, &mut rng).unwrap();

        assert_eq!(quiz.answer(0), Err(QuizError::NotAwaitingAnswer));

        quiz.present_next().unwrap();
        // Second present while waiting is refused
        assert!(quiz.present_next().is_none());

        assert_eq!(quiz.answer(9), Err(QuizError::InvalidOption(9)));
        assert!(quiz.in_progress);

        quiz.answer(0).unwrap();
        // Double tap does not score twice
        assert_eq!(quiz.answer(0), Err(QuizError::NotAwaitingAnswer));
        assert!(quiz.expire().is_none());
        assert_eq!(quiz.round_index, 1);
    }

    proptest! {
        #[test]
        fn prop_sample_distinct(seed in any::<u64>(), bank_size in 1usize..30, rounds in 0u32..10) {
            let bank = sample_bank(bank_size);
            let mut rng = DeterministicRng::new(seed);
            let mut quiz = QuizState::default();
            let result = quiz.begin(&bank, rounds, &mut rng);
            if rounds as usize > bank_size {
                prop_assert!(result.is_err());
            } else {
                prop_assert!(result.is_ok());
                let texts: BTreeSet<_> = quiz.question_pool.iter().map(|q| q.text.clone()).collect();
                prop_assert_eq!(quiz.question_pool.len(), rounds as usize);
                prop_assert_eq!(texts.len(), rounds as usize);
            }
        }

        #[test]
        fn prop_score_order_independent(pattern in proptest::collection::vec(any::<bool>(), 1..8)) {
            let bank = sample_bank(pattern.len());
            let mut rng = DeterministicRng::new(99);
            let mut quiz = QuizState::default();
            quiz.begin(&bank, pattern.len() as u32, &mut rng).unwrap();

            for answer_right in &pattern {
                let q = quiz.present_next().unwrap().clone();
                let right = q.options.iter().position(|o| *o == q.correct_answer).unwrap();
                let pick = if *answer_right { right } else { (right + 1) % OPTION_COUNT };
                quiz.answer(pick).unwrap();
            }

            let k = pattern.iter().filter(|b| **b).count() as u32;
            prop_assert_eq!(quiz.correct_answers, k);
            prop_assert_eq!(quiz_score(quiz.correct_answers, 500), k * 500);
        }
    }
}
