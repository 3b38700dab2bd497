//! "Human or AI?" trivia game.
//!
//! The player is shown a task and guesses whether it is something a human or
//! an AI does best. Each question accepts one answer; `next_question` moves
//! on once the feedback has been shown.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Human,
    Ai,
}

impl Answer {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "human" | "h" => Some(Self::Human),
            "ai" | "a" => Some(Self::Ai),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Human => "Human",
            Self::Ai => "Artificial intelligence",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub text: &'static str,
    pub answer: Answer,
}

pub const QUESTIONS: [Question; 5] = [
    Question { text: "The Mona Lisa painting", answer: Answer::Human },
    Question { text: "Instant translation from Arabic to English", answer: Answer::Ai },
    Question { text: "Writing a complete novel in one hour", answer: Answer::Ai },
    Question { text: "Understanding someone's feelings from their tone of voice", answer: Answer::Human },
    Question { text: "Generating a realistic image of a place that does not exist", answer: Answer::Ai },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub correct: bool,
    pub expected: Answer,
}

impl Feedback {
    pub fn message(&self) -> String {
        if self.correct {
            "Correct! Excellent!".to_string()
        } else {
            format!("Wrong! The right answer: {}", self.expected.label())
        }
    }
}

pub struct Quiz {
    questions: Vec<Question>,
    current: usize,
    score: u32,
    /// Set while feedback for the current question is showing.
    answered: bool,
}

impl Quiz {
    pub fn new() -> Self {
        Self::with_questions(QUESTIONS.to_vec())
    }

    pub fn with_questions(questions: Vec<Question>) -> Self {
        Self {
            questions,
            current: 0,
            score: 0,
            answered: false,
        }
    }

    /// The question awaiting an answer, or None once the game is over.
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    /// Score an answer. A second answer to the same question, or any answer
    /// after the last question, is ignored.
    pub fn check_answer(&mut self, answer: Answer) -> Option<Feedback> {
        if self.answered {
            return None;
        }
        let expected = self.current_question()?.answer;
        let correct = answer == expected;
        if correct {
            self.score += 1;
        }
        self.answered = true;
        Some(Feedback { correct, expected })
    }

    /// Advance past an answered question. Returns the next question, if any.
    pub fn next_question(&mut self) -> Option<&Question> {
        if self.answered {
            self.answered = false;
            self.current += 1;
        }
        self.current_question()
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.questions.len()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }
}

impl Default for Quiz {
    fn default() -> Self {
        Self::new()
    }
}

/// Canned reply for the free-form "ask the AI" box. Blank questions get nothing.
pub fn try_answer(question: &str) -> Option<String> {
    let question = question.trim();
    if question.is_empty() {
        return None;
    }
    Some(format!(
        "Demo answer: \"{question}\" is an interesting topic! For real answers, try one of the advanced models linked above."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_run() {
        let mut quiz = Quiz::new();
        while let Some(question) = quiz.current_question().copied() {
            let feedback = quiz.check_answer(question.answer).unwrap();
            assert!(feedback.correct);
            quiz.next_question();
        }
        assert!(quiz.is_finished());
        assert_eq!(quiz.score(), 5);
    }

    #[test]
    fn test_wrong_answer_reports_expected() {
        let mut quiz = Quiz::new();
        let feedback = quiz.check_answer(Answer::Ai).unwrap();
        assert!(!feedback.correct);
        assert_eq!(feedback.expected, Answer::Human);
        assert!(feedback.message().contains("Human"));
        assert_eq!(quiz.score(), 0);
    }

    #[test]
    fn test_second_answer_is_ignored() {
        let mut quiz = Quiz::new();
        assert!(quiz.check_answer(Answer::Human).is_some());
        assert!(quiz.check_answer(Answer::Human).is_none());
        assert_eq!(quiz.score(), 1);
    }

    #[test]
    fn test_next_without_answer_stays_put() {
        let mut quiz = Quiz::new();
        let first = quiz.current_question().copied();
        assert_eq!(quiz.next_question().copied(), first);
    }

    #[test]
    fn test_answers_after_end_are_ignored() {
        let mut quiz = Quiz::with_questions(vec![QUESTIONS[0]]);
        quiz.check_answer(Answer::Human);
        assert!(quiz.next_question().is_none());
        assert!(quiz.check_answer(Answer::Human).is_none());
        assert_eq!(quiz.score(), 1);
    }

    #[test]
    fn test_parse_answers() {
        assert_eq!(Answer::parse(" AI "), Some(Answer::Ai));
        assert_eq!(Answer::parse("h"), Some(Answer::Human));
        assert_eq!(Answer::parse("robot"), None);
    }

    #[test]
    fn test_try_answer_skips_blank_input() {
        assert!(try_answer("   ").is_none());
        assert!(try_answer("what is a drone?").unwrap().contains("what is a drone?"));
    }
}
