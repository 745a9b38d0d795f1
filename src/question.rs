//! Arithmetic questions carried by NPCs.
//!
//! A [`Question`] can only be built through [`Question::new`], which computes
//! the expected answer itself, so `answer == a op b` holds for every value of
//! the type. Division questions must be exact.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::QuestionError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub const ALL: [Operator; 4] = [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div];

    /// Symbol shown to the player.
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '×',
            Operator::Div => '÷',
        }
    }

    /// Checked integer result; `None` on overflow, division by zero or a
    /// remainder.
    pub fn apply(self, a: i64, b: i64) -> Option<i64> {
        match self {
            Operator::Add => a.checked_add(b),
            Operator::Sub => a.checked_sub(b),
            Operator::Mul => a.checked_mul(b),
            Operator::Div => {
                if b == 0 || a.checked_rem(b)? != 0 {
                    None
                } else {
                    a.checked_div(b)
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Question {
    a: i64,
    op: Operator,
    b: i64,
    answer: i64,
}

impl Question {
    pub fn new(a: i64, op: Operator, b: i64) -> Result<Self, QuestionError> {
        let symbol = op.symbol();
        let answer = op.apply(a, b).ok_or(match op {
            Operator::Div if b == 0 => QuestionError::DivisionByZero { a, op: symbol, b },
            Operator::Div if a.checked_rem(b).is_some_and(|r| r != 0) => {
                QuestionError::Inexact { a, op: symbol, b }
            }
            _ => QuestionError::Overflow { a, op: symbol, b },
        })?;
        Ok(Self { a, op, b, answer })
    }

    pub fn operands(&self) -> (i64, i64) {
        (self.a, self.b)
    }

    pub fn operator(&self) -> Operator {
        self.op
    }

    pub fn answer(&self) -> i64 {
        self.answer
    }

    /// Text shown in the dialog, e.g. `7 + 5 = ?`.
    pub fn prompt(&self) -> String {
        format!("{} {} {} = ?", self.a, self.op.symbol(), self.b)
    }
}

// Config form: `{ "a": 7, "op": "add", "b": 5 }`. The answer is always
// recomputed on load.
impl<'de> Deserialize<'de> for Question {
    fn deserialize<D: serde::Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            a: i64,
            op: Operator,
            b: i64,
        }
        let raw = Raw::deserialize(de)?;
        Question::new(raw.a, raw.op, raw.b).map_err(serde::de::Error::custom)
    }
}

/// Random question source used for unconfigured NPCs and for the
/// "regenerate on wrong answer" policy.
#[derive(Clone, Debug)]
pub struct QuestionGen {
    pub ops: Vec<Operator>,
    /// Inclusive operand range for `+` and `-`.
    pub add_range: (i64, i64),
    /// Inclusive factor range for `×`, and divisor/quotient range for `÷`.
    pub mul_range: (i64, i64),
}

impl Default for QuestionGen {
    fn default() -> Self {
        Self {
            ops: Operator::ALL.to_vec(),
            add_range: (1, 20),
            mul_range: (1, 10),
        }
    }
}

impl QuestionGen {
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Question {
        let op = if self.ops.is_empty() {
            Operator::Add
        } else {
            self.ops[rng.gen_range(0..self.ops.len())]
        };
        let (lo, hi) = ordered(self.add_range);
        let (mlo, mhi) = ordered(self.mul_range);
        let operands = match op {
            Operator::Add => Some((rng.gen_range(lo..=hi), rng.gen_range(lo..=hi))),
            Operator::Sub => {
                let (a, b) = (rng.gen_range(lo..=hi), rng.gen_range(lo..=hi));
                Some((a.max(b), a.min(b)))
            }
            Operator::Mul => Some((rng.gen_range(mlo..=mhi), rng.gen_range(mlo..=mhi))),
            Operator::Div => {
                let divisor = rng.gen_range(mlo.max(1)..=mhi.max(1));
                let quotient = rng.gen_range(mlo..=mhi);
                divisor.checked_mul(quotient).map(|dividend| (dividend, divisor))
            }
        };
        // Caller-supplied ranges can overflow; fall back to 1 + 1.
        operands
            .and_then(|(a, b)| Question::new(a, op, b).ok())
            .unwrap_or(Question { a: 1, op: Operator::Add, b: 1, answer: 2 })
    }
}

fn ordered((a, b): (i64, i64)) -> (i64, i64) {
    (a.min(b), a.max(b))
}
