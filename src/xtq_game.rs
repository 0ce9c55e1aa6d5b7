// Core game logic
// Handles lives, score, question progression, answer entry and the shake effect

use rand::prelude::*;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::xtq_question::Question;

pub const TOTAL_QUESTIONS: u32 = 30;
pub const INITIAL_LIVES: u32 = 3;
pub const MAX_ANSWER_LEN: usize = 10;
pub const FEEDBACK_WINDOW: Duration = Duration::from_secs(2);
pub const SHAKE_FRAMES: u32 = 10;
/// Largest shake offset in cells (columns, rows)
pub const SHAKE_RANGE: (i16, i16) = (2, 1);

/// Where the player is in the quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Answering,
    Feedback, // result message still on screen, next question already loaded
    GameOver,
}

/// Result message shown after a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Correct,
    Wrong(i64), // carries the correct answer
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub at: Instant,
}

impl Feedback {
    pub fn visible(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.at) < FEEDBACK_WINDOW
    }
}

/// What a submission did; the caller plays the matching sound cue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Wrong,
    Invalid,
    Ignored, // game already over
}

/// Main game state
pub struct Game {
    lives: u32,
    score: u32,
    current: u32, // 1-based question index; TOTAL_QUESTIONS + 1 once finished
    answer: String,
    question: Question,
    feedback: Option<Feedback>,
    shake_frames: u32,
    over: bool,
    rng: StdRng,
}

impl Game {
    /// Create a new game seeded from the OS
    pub fn new() -> Self {
        Game::from_rng(StdRng::from_entropy())
    }

    /// Create a new game with a fixed seed (reproducible question sequence)
    pub fn with_seed(seed: u64) -> Self {
        Game::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(mut rng: StdRng) -> Self {
        let question = Question::generate(&mut rng);
        Game {
            lives: INITIAL_LIVES,
            score: 0,
            current: 1,
            answer: String::new(),
            question,
            feedback: None,
            shake_frames: 0,
            over: false,
            rng,
        }
    }

    /// Return to the initial state with a fresh question
    /// Keeps the random generator so restarts do not repeat the previous run
    pub fn reset(&mut self) {
        self.lives = INITIAL_LIVES;
        self.score = 0;
        self.current = 1;
        self.answer.clear();
        self.question = Question::generate(&mut self.rng);
        self.feedback = None;
        self.shake_frames = 0;
        self.over = false;
        info!("game restarted");
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    /// Feedback still inside its display window
    pub fn visible_feedback(&self, now: Instant) -> Option<&Feedback> {
        self.feedback.as_ref().filter(|f| f.visible(now))
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn is_shaking(&self) -> bool {
        self.shake_frames > 0
    }

    pub fn phase(&self, now: Instant) -> Phase {
        if self.over {
            return Phase::GameOver;
        }
        match self.visible_feedback(now) {
            Some(f) if f.kind != FeedbackKind::Invalid => Phase::Feedback,
            _ => Phase::Answering,
        }
    }

    /// Fraction of the quiz already answered (0.0 - 1.0)
    pub fn progress(&self) -> f64 {
        (self.current.saturating_sub(1) as f64 / TOTAL_QUESTIONS as f64).min(1.0)
    }

    /// Append a keypad character to the answer
    /// Ignored when the answer is full, when `c` is a second '.', or not a digit at all
    pub fn push_char(&mut self, c: char) {
        if self.over || self.answer.len() >= MAX_ANSWER_LEN {
            return;
        }
        match c {
            '0'..='9' => self.answer.push(c),
            '.' if !self.answer.contains('.') => self.answer.push(c),
            _ => {}
        }
    }

    /// Remove the last answer character
    pub fn delete(&mut self) {
        self.answer.pop();
    }

    /// Check the typed answer against the current question
    /// - Unparseable input only shows a message
    /// - Otherwise the question is consumed, right or wrong
    pub fn submit(&mut self, now: Instant) -> Outcome {
        if self.over {
            return Outcome::Ignored;
        }
        // An empty answer counts as zero
        let parsed = if self.answer.is_empty() {
            Some((0, 0))
        } else {
            parse_decimal(&self.answer)
        };
        let Some((digits, scale)) = parsed else {
            debug!(answer = %self.answer, "rejected malformed answer");
            self.feedback = Some(Feedback { kind: FeedbackKind::Invalid, at: now });
            return Outcome::Invalid;
        };

        let correct = self.question.answer();
        let outcome = if within_tolerance(digits, scale, correct) {
            self.score += 1;
            self.feedback = Some(Feedback { kind: FeedbackKind::Correct, at: now });
            Outcome::Correct
        } else {
            self.lives = self.lives.saturating_sub(1);
            self.feedback = Some(Feedback { kind: FeedbackKind::Wrong(correct), at: now });
            self.start_shake();
            Outcome::Wrong
        };
        debug!(question = self.current, ?outcome, lives = self.lives, score = self.score, "answer submitted");

        self.answer.clear();
        self.current += 1;
        if self.lives == 0 || self.current > TOTAL_QUESTIONS {
            // the game-over screen stays still
            self.over = true;
            self.shake_frames = 0;
            info!(score = self.score, lives = self.lives, "game over");
        } else {
            self.question = Question::generate(&mut self.rng);
        }
        outcome
    }

    #[cfg(test)]
    pub(crate) fn set_question(&mut self, question: Question) {
        self.question = question;
    }

    pub fn start_shake(&mut self) {
        self.shake_frames = SHAKE_FRAMES;
    }

    /// Offset for the next rendered frame; consumes one shake frame
    pub fn next_shake_offset(&mut self) -> (i16, i16) {
        if self.shake_frames == 0 {
            return (0, 0);
        }
        self.shake_frames -= 1;
        (
            self.rng.gen_range(-SHAKE_RANGE.0..=SHAKE_RANGE.0),
            self.rng.gen_range(-SHAKE_RANGE.1..=SHAKE_RANGE.1),
        )
    }
}

/// Split keypad text into its digits as an integer and the number of decimal places
/// "12.05" -> (1205, 2); None unless it is digits with at most one '.' and at least one digit
fn parse_decimal(text: &str) -> Option<(i128, u32)> {
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let mut digits: i128 = 0;
    for c in int_part.chars().chain(frac_part.chars()) {
        digits = digits * 10 + c.to_digit(10)? as i128;
    }
    Some((digits, frac_part.len() as u32))
}

/// |digits / 10^scale - answer| < 0.01, computed exactly in integers
fn within_tolerance(digits: i128, scale: u32, answer: i64) -> bool {
    let unit = 10i128.pow(scale);
    let diff = (digits - answer as i128 * unit).abs();
    diff * 100 < unit
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}
