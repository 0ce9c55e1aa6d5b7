// Arithmetic question generation

use rand::Rng;
use rand::seq::SliceRandom;

/// The three operations a question can use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
}

impl Operator {
    pub const ALL: [Operator; 3] = [Operator::Add, Operator::Sub, Operator::Mul];

    /// Display symbol; multiplication falls back to '*' in ASCII mode
    pub fn symbol(self, ascii: bool) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul if ascii => "*",
            Operator::Mul => "×",
        }
    }
}

/// One quiz problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub lhs: u32,
    pub op: Operator,
    pub rhs: u32,
}

impl Question {
    pub fn new(lhs: u32, op: Operator, rhs: u32) -> Self {
        Question { lhs, op, rhs }
    }

    /// Draw a random question
    /// Subtraction never goes below zero; multiplication stays within the 12x12 table
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let op = *Operator::ALL.choose(rng).unwrap_or(&Operator::Add);
        let (lhs, rhs) = match op {
            Operator::Add => (rng.gen_range(1..=100), rng.gen_range(1..=100)),
            Operator::Sub => {
                let lhs = rng.gen_range(1..=100);
                (lhs, rng.gen_range(1..=lhs))
            }
            Operator::Mul => (rng.gen_range(1..=12), rng.gen_range(1..=12)),
        };
        Question::new(lhs, op, rhs)
    }

    pub fn answer(&self) -> i64 {
        let (a, b) = (self.lhs as i64, self.rhs as i64);
        match self.op {
            Operator::Add => a + b,
            Operator::Sub => a - b,
            Operator::Mul => a * b,
        }
    }

    /// The "7 + 3" part of the prompt
    pub fn expression(&self, ascii: bool) -> String {
        format!("{} {} {}", self.lhs, self.op.symbol(ascii), self.rhs)
    }
}
