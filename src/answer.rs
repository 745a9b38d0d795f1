//! Reading the player's answer.
//!
//! `Digits` accepts a plain integer. `Expression` accepts small arithmetic
//! such as `2 * (3 + 4)`; it is parsed and evaluated here with exact rational
//! arithmetic, then floored, and is never executed as code. `Choices` shows a
//! few candidate answers as buttons and the player picks one.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::AnswerError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerMode {
    #[default]
    Digits,
    Expression,
    Choices,
}

/// Buttons offered in `Choices` mode, the right answer included.
pub const CHOICE_COUNT: usize = 3;
// Wrong choices lie within this distance of the answer.
const CHOICE_SPREAD: i64 = 3;

impl AnswerMode {
    /// Whether `c` may be typed into the answer box in this mode.
    pub fn accepts_char(self, c: char) -> bool {
        match self {
            AnswerMode::Digits => c.is_ascii_digit(),
            AnswerMode::Expression => {
                c.is_ascii_digit() || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | ' ')
            }
            // Picked with a click or a number key, never typed.
            AnswerMode::Choices => false,
        }
    }

    /// Answer box capacity when the config does not set one.
    pub fn default_max_len(self) -> usize {
        match self {
            AnswerMode::Digits | AnswerMode::Choices => 6,
            AnswerMode::Expression => 32,
        }
    }
}

/// `count` distinct candidates containing `answer` at a random position. The
/// others are near the answer and never negative unless the answer is.
pub fn choices<R: Rng + ?Sized>(answer: i64, count: usize, rng: &mut R) -> Vec<i64> {
    let mut options: Vec<i64> = (1..=CHOICE_SPREAD)
        .flat_map(|d| [answer.checked_sub(d), answer.checked_add(d)])
        .flatten()
        .filter(|c| *c >= 0 || answer < 0)
        .collect();
    options.shuffle(rng);
    options.truncate(count.saturating_sub(1));
    let at = rng.gen_range(0..=options.len());
    options.insert(at, answer);
    options
}

/// Parse `input` into an integer answer according to `mode`.
pub fn parse_answer(input: &str, mode: AnswerMode) -> Result<i64, AnswerError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AnswerError::Empty);
    }
    match mode {
        AnswerMode::Digits | AnswerMode::Choices => parse_integer(input),
        AnswerMode::Expression => {
            if let Some(c) = input.chars().find(|c| !AnswerMode::Expression.accepts_char(*c)) {
                return Err(AnswerError::Disallowed(c));
            }
            let mut parser = Parser { src: input.as_bytes(), pos: 0 };
            let value = parser.expr()?;
            parser.skip_ws();
            if parser.pos < parser.src.len() {
                return Err(parser.unexpected());
            }
            Ok(value.floor())
        }
    }
}

fn parse_integer(s: &str) -> Result<i64, AnswerError> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if let Some(c) = digits.chars().find(|c| !c.is_ascii_digit()) {
        return Err(AnswerError::Disallowed(c));
    }
    if digits.is_empty() {
        return Err(AnswerError::Unexpected { pos: s.len(), found: "end of input".into() });
    }
    s.parse::<i64>().map_err(|_| AnswerError::Overflow)
}

/// Exact fraction with a positive denominator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Ratio {
    num: i64,
    den: i64,
}

impl Ratio {
    fn int(n: i64) -> Self {
        Self { num: n, den: 1 }
    }

    fn reduced(num: i64, den: i64) -> Result<Self, AnswerError> {
        if den == 0 {
            return Err(AnswerError::DivisionByZero);
        }
        let g = gcd(num, den).max(1);
        let (mut num, mut den) = (num / g, den / g);
        if den < 0 {
            num = num.checked_neg().ok_or(AnswerError::Overflow)?;
            den = den.checked_neg().ok_or(AnswerError::Overflow)?;
        }
        Ok(Self { num, den })
    }

    fn add(self, o: Ratio) -> Result<Self, AnswerError> {
        let num = self
            .num
            .checked_mul(o.den)
            .and_then(|l| o.num.checked_mul(self.den).and_then(|r| l.checked_add(r)))
            .ok_or(AnswerError::Overflow)?;
        let den = self.den.checked_mul(o.den).ok_or(AnswerError::Overflow)?;
        Ratio::reduced(num, den)
    }

    fn neg(self) -> Result<Self, AnswerError> {
        Ok(Self { num: self.num.checked_neg().ok_or(AnswerError::Overflow)?, den: self.den })
    }

    fn mul(self, o: Ratio) -> Result<Self, AnswerError> {
        let num = self.num.checked_mul(o.num).ok_or(AnswerError::Overflow)?;
        let den = self.den.checked_mul(o.den).ok_or(AnswerError::Overflow)?;
        Ratio::reduced(num, den)
    }

    fn div(self, o: Ratio) -> Result<Self, AnswerError> {
        if o.num == 0 {
            return Err(AnswerError::DivisionByZero);
        }
        self.mul(Ratio { num: o.den, den: 1 })
            .and_then(|r| Ratio::reduced(r.num, r.den.checked_mul(o.num).ok_or(AnswerError::Overflow)?))
    }

    fn floor(self) -> i64 {
        self.num.div_euclid(self.den)
    }
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    i64::try_from(a).unwrap_or(1)
}

// Grammar:
//   expr   := term (('+' | '-') term)*
//   term   := factor (('*' | '/') factor)*
//   factor := ('+' | '-') factor | number | '(' expr ')'
struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while self.src.get(self.pos) == Some(&b' ') {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.src.get(self.pos).copied()
    }

    fn unexpected(&self) -> AnswerError {
        let found = match self.src.get(self.pos) {
            Some(b) => format!("{:?}", *b as char),
            None => "end of input".to_string(),
        };
        AnswerError::Unexpected { pos: self.pos, found }
    }

    fn expr(&mut self) -> Result<Ratio, AnswerError> {
        let mut acc = self.term()?;
        while let Some(op @ (b'+' | b'-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            acc = if op == b'+' { acc.add(rhs)? } else { acc.add(rhs.neg()?)? };
        }
        Ok(acc)
    }

    fn term(&mut self) -> Result<Ratio, AnswerError> {
        let mut acc = self.factor()?;
        while let Some(op @ (b'*' | b'/')) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            acc = if op == b'*' { acc.mul(rhs)? } else { acc.div(rhs)? };
        }
        Ok(acc)
    }

    fn factor(&mut self) -> Result<Ratio, AnswerError> {
        match self.peek() {
            Some(b'+') => {
                self.pos += 1;
                self.factor()
            }
            Some(b'-') => {
                self.pos += 1;
                self.factor()?.neg()
            }
            Some(b'(') => {
                self.pos += 1;
                let inner = self.expr()?;
                if self.peek() != Some(b')') {
                    return Err(self.unexpected());
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(b) if b.is_ascii_digit() => {
                let mut n: i64 = 0;
                while let Some(d) = self.src.get(self.pos).filter(|d| d.is_ascii_digit()) {
                    n = n
                        .checked_mul(10)
                        .and_then(|n| n.checked_add(i64::from(d - b'0')))
                        .ok_or(AnswerError::Overflow)?;
                    self.pos += 1;
                }
                Ok(Ratio::int(n))
            }
            _ => Err(self.unexpected()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_mode_reads_plain_integers() {
        assert_eq!(parse_answer("12", AnswerMode::Digits), Ok(12));
        assert_eq!(parse_answer("  42 ", AnswerMode::Digits), Ok(42));
        assert_eq!(parse_answer("-3", AnswerMode::Digits), Ok(-3));
    }

    #[test]
    fn digits_mode_rejects_everything_else() {
        assert_eq!(parse_answer("", AnswerMode::Digits), Err(AnswerError::Empty));
        assert_eq!(parse_answer("   ", AnswerMode::Digits), Err(AnswerError::Empty));
        assert_eq!(parse_answer("1e3", AnswerMode::Digits), Err(AnswerError::Disallowed('e')));
        assert_eq!(parse_answer("3+4", AnswerMode::Digits), Err(AnswerError::Disallowed('+')));
        assert!(parse_answer("-", AnswerMode::Digits).is_err());
        assert_eq!(
            parse_answer("99999999999999999999", AnswerMode::Digits),
            Err(AnswerError::Overflow)
        );
    }

    #[test]
    fn expression_mode_respects_precedence_and_parens() {
        assert_eq!(parse_answer("2 * (3 + 4)", AnswerMode::Expression), Ok(14));
        assert_eq!(parse_answer("2 * 3 + 4", AnswerMode::Expression), Ok(10));
        assert_eq!(parse_answer("12 / 4", AnswerMode::Expression), Ok(3));
        assert_eq!(parse_answer("9 - 4 - 1", AnswerMode::Expression), Ok(4));
        assert_eq!(parse_answer("-(2+3)", AnswerMode::Expression), Ok(-5));
    }

    #[test]
    fn expression_mode_divides_exactly_then_floors() {
        assert_eq!(parse_answer("7 / 2", AnswerMode::Expression), Ok(3));
        assert_eq!(parse_answer("7 / 2 * 2", AnswerMode::Expression), Ok(7));
        assert_eq!(parse_answer("-7 / 2", AnswerMode::Expression), Ok(-4));
    }

    #[test]
    fn expression_mode_errors_are_not_panics() {
        assert_eq!(parse_answer("1/0", AnswerMode::Expression), Err(AnswerError::DivisionByZero));
        assert_eq!(parse_answer("alert(1)", AnswerMode::Expression), Err(AnswerError::Disallowed('a')));
        assert!(matches!(parse_answer("(1+2", AnswerMode::Expression), Err(AnswerError::Unexpected { .. })));
        assert!(matches!(parse_answer("1 2", AnswerMode::Expression), Err(AnswerError::Unexpected { .. })));
        assert!(matches!(parse_answer("*3", AnswerMode::Expression), Err(AnswerError::Unexpected { .. })));
        assert_eq!(
            parse_answer("9999999999 * 9999999999", AnswerMode::Expression),
            Err(AnswerError::Overflow)
        );
    }

    #[test]
    fn accepted_characters_follow_mode() {
        assert!(AnswerMode::Digits.accepts_char('7'));
        assert!(!AnswerMode::Digits.accepts_char('+'));
        assert!(AnswerMode::Expression.accepts_char('('));
        assert!(AnswerMode::Expression.accepts_char(' '));
        assert!(!AnswerMode::Expression.accepts_char('x'));
        assert!(!AnswerMode::Choices.accepts_char('1'));
    }

    #[test]
    fn expression_cap_fits_ordinary_expressions() {
        assert!("2 * (3 + 4)".len() <= AnswerMode::Expression.default_max_len());
        assert_eq!(AnswerMode::Digits.default_max_len(), 6);
    }

    #[test]
    fn choices_hold_the_answer_and_nearby_non_negatives() {
        use rand::SeedableRng;
        use rand::rngs::SmallRng;

        let mut rng = SmallRng::seed_from_u64(4);
        let mut positions = [0usize; CHOICE_COUNT];
        for answer in [0, 1, 2, 12, 81] {
            for _ in 0..50 {
                let c = choices(answer, CHOICE_COUNT, &mut rng);
                assert_eq!(c.len(), CHOICE_COUNT);
                let at = c.iter().position(|v| *v == answer).unwrap();
                positions[at] += 1;
                assert_eq!(c.iter().filter(|v| **v == answer).count(), 1);
                for v in &c {
                    assert!(*v >= 0 && (v - answer).abs() <= CHOICE_SPREAD, "{c:?}");
                }
                let mut sorted = c.clone();
                sorted.sort_unstable();
                sorted.dedup();
                assert_eq!(sorted.len(), CHOICE_COUNT);
            }
        }
        assert!(positions.iter().all(|n| *n > 0), "answer never moved: {positions:?}");
        assert_eq!(parse_answer("12", AnswerMode::Choices), Ok(12));
    }
}
