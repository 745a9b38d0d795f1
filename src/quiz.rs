//! Proximity-triggered quiz dialog.
//!
//! ```text
//!   Idle --interact near NPC--> Prompting --advance past last line--> AwaitingInput
//!    ^                              |                                     |
//!    |                            cancel                                submit
//!    |                              v                                     v
//!    +--------- cancel ---------- Idle        Idle <--feedback timer-- Resolved
//! ```
//!
//! Player movement is locked in every state except `Idle`. The feedback delay
//! is part of the state and is advanced by [`Quiz::tick`], so a new
//! interaction can never start while feedback is still on screen.

use rand::Rng;

use crate::answer::{AnswerMode, CHOICE_COUNT, choices, parse_answer};
use crate::config::{GameConfig, WrongAnswerPolicy};
use crate::geom::Vec2;
use crate::npc::{Npc, NpcId, nearest_in_range};
use crate::question::QuestionGen;

pub const ALREADY_SOLVED_LINE: &str = "Thanks for solving already! Keep exploring!";
pub const FORFEITED_LINE: &str = "Maybe next time!";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
    /// Talked to an NPC that was already solved.
    AlreadySolved,
    /// Talked to an NPC that gave up after a wrong answer.
    Forfeited,
}

#[derive(Clone, Debug, PartialEq)]
pub enum QuizState {
    Idle,
    Prompting { npc: NpcId, lines: Vec<String>, line: usize },
    /// `choices` is empty unless the answer mode is `Choices`.
    AwaitingInput { npc: NpcId, prompt: String, buffer: String, choices: Vec<i64> },
    Resolved { npc: NpcId, outcome: Outcome, message: String, remaining: f64 },
}

/// Something the rest of the game may want to react to.
#[derive(Clone, Debug, PartialEq)]
pub enum QuizEvent {
    Opened(NpcId),
    InputOpened(NpcId),
    Answered { npc: NpcId, outcome: Outcome, given: Option<i64> },
    Closed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    pub score: u64,
    /// Answers submitted.
    pub asked: u32,
    /// Answers that were right.
    pub correct: u32,
}

/// Quiz behavior that differs between game variants.
#[derive(Clone, Debug)]
pub struct QuizRules {
    pub answer_mode: AnswerMode,
    pub wrong_answer: WrongAnswerPolicy,
    pub max_input_len: usize,
    pub feedback_seconds: f64,
    pub reward: u32,
    pub questions: QuestionGen,
}

impl Default for QuizRules {
    fn default() -> Self {
        QuizRules::from_config(&GameConfig::default())
    }
}

impl QuizRules {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            answer_mode: config.answer_input,
            wrong_answer: config.wrong_answer,
            max_input_len: config.max_input_len.unwrap_or_else(|| config.answer_input.default_max_len()),
            feedback_seconds: config.feedback_seconds,
            reward: config.reward,
            questions: QuestionGen::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Quiz {
    state: QuizState,
    rules: QuizRules,
    // NPC the player last talked to; proximity mode will not reopen it until
    // the player has walked out of range.
    latch: Option<NpcId>,
    // Candidate answers dealt when the dialog opened, shown once input opens.
    dealt: Vec<i64>,
}

impl Quiz {
    pub fn new(rules: QuizRules) -> Self {
        Self { state: QuizState::Idle, rules, latch: None, dealt: Vec::new() }
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn rules(&self) -> &QuizRules {
        &self.rules
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, QuizState::Idle)
    }

    /// NPC the current dialog belongs to.
    pub fn active_npc(&self) -> Option<NpcId> {
        match &self.state {
            QuizState::Idle => None,
            QuizState::Prompting { npc, .. }
            | QuizState::AwaitingInput { npc, .. }
            | QuizState::Resolved { npc, .. } => Some(*npc),
        }
    }

    /// Explicit interact key: talk to the closest NPC within `radius`.
    pub fn interact<R: Rng + ?Sized>(&mut self, npcs: &[Npc], pos: Vec2, radius: f64, rng: &mut R) -> Option<QuizEvent> {
        let npc = nearest_in_range(npcs, pos, radius)?;
        self.open_npc(npc, rng)
    }

    /// Talk to `npc` directly, e.g. after it was clicked.
    pub fn open_npc<R: Rng + ?Sized>(&mut self, npc: &Npc, rng: &mut R) -> Option<QuizEvent> {
        if !self.is_idle() {
            return None;
        }
        Some(self.open(npc, rng))
    }

    /// Proximity mode: open the closest unsolved NPC in range, unless it is
    /// the one the player just finished talking to and has not left yet.
    pub fn auto_trigger<R: Rng + ?Sized>(
        &mut self,
        npcs: &[Npc],
        pos: Vec2,
        radius: f64,
        rng: &mut R,
    ) -> Option<QuizEvent> {
        if !self.is_idle() {
            return None;
        }
        if let Some(id) = self.latch {
            let still_near = npcs.iter().any(|n| n.id == id && n.is_near(pos, radius));
            if still_near {
                return None;
            }
            self.latch = None;
        }
        let candidates: Vec<Npc> = npcs.iter().filter(|n| n.is_open()).cloned().collect();
        let npc = nearest_in_range(&candidates, pos, radius)?;
        Some(self.open(npc, rng))
    }

    fn open<R: Rng + ?Sized>(&mut self, npc: &Npc, rng: &mut R) -> QuizEvent {
        self.latch = Some(npc.id);
        self.dealt = match self.rules.answer_mode {
            AnswerMode::Choices => choices(npc.question().answer(), CHOICE_COUNT, rng),
            _ => Vec::new(),
        };
        if npc.is_solved() {
            self.resolve(npc.id, Outcome::AlreadySolved, ALREADY_SOLVED_LINE.to_string());
        } else if npc.is_forfeited() {
            self.resolve(npc.id, Outcome::Forfeited, FORFEITED_LINE.to_string());
        } else {
            log::debug!("quiz: {} asks {}", npc.name, npc.question().prompt());
            self.state = QuizState::Prompting { npc: npc.id, lines: npc.prompt_lines(), line: 0 };
        }
        QuizEvent::Opened(npc.id)
    }

    fn resolve(&mut self, npc: NpcId, outcome: Outcome, message: String) {
        self.state = QuizState::Resolved { npc, outcome, message, remaining: self.rules.feedback_seconds };
    }

    /// Space/Enter outside the answer box: next dialog line, open the answer
    /// box after the last line, or dismiss feedback early.
    pub fn advance(&mut self) -> Option<QuizEvent> {
        match &mut self.state {
            QuizState::Prompting { npc, lines, line } => {
                if *line + 1 < lines.len() {
                    *line += 1;
                    return None;
                }
                let npc = *npc;
                let prompt = lines.last().cloned().unwrap_or_default();
                let choices = std::mem::take(&mut self.dealt);
                self.state = QuizState::AwaitingInput { npc, prompt, buffer: String::new(), choices };
                Some(QuizEvent::InputOpened(npc))
            }
            QuizState::Resolved { .. } => {
                self.state = QuizState::Idle;
                Some(QuizEvent::Closed)
            }
            QuizState::Idle | QuizState::AwaitingInput { .. } => None,
        }
    }

    /// Append a typed character if the answer box is open, the character is
    /// allowed and the box is not full.
    pub fn type_char(&mut self, c: char) -> bool {
        let (mode, max) = (self.rules.answer_mode, self.rules.max_input_len);
        match &mut self.state {
            QuizState::AwaitingInput { buffer, .. } if mode.accepts_char(c) && buffer.chars().count() < max => {
                buffer.push(c);
                true
            }
            _ => false,
        }
    }

    /// Candidate answers on offer; empty outside `Choices` input.
    pub fn choices(&self) -> &[i64] {
        match &self.state {
            QuizState::AwaitingInput { choices, .. } => choices,
            _ => &[],
        }
    }

    /// Put choice `index` into the answer box, ready for [`Quiz::submit`].
    pub fn choose(&mut self, index: usize) -> bool {
        match &mut self.state {
            QuizState::AwaitingInput { buffer, choices, .. } => match choices.get(index) {
                Some(value) => {
                    *buffer = value.to_string();
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    pub fn backspace(&mut self) -> bool {
        match &mut self.state {
            QuizState::AwaitingInput { buffer, .. } => buffer.pop().is_some(),
            _ => false,
        }
    }

    /// Escape: leave the dialog without answering.
    pub fn cancel(&mut self) -> Option<QuizEvent> {
        match self.state {
            QuizState::Prompting { .. } | QuizState::AwaitingInput { .. } => {
                self.state = QuizState::Idle;
                Some(QuizEvent::Closed)
            }
            _ => None,
        }
    }

    /// Check the typed answer against the active NPC's question.
    ///
    /// Unparsable input (including an empty box) counts as a wrong answer.
    pub fn submit<R: Rng + ?Sized>(
        &mut self,
        npcs: &mut [Npc],
        score: &mut ScoreBoard,
        rng: &mut R,
    ) -> Option<QuizEvent> {
        let QuizState::AwaitingInput { npc: id, buffer, .. } = &self.state else {
            return None;
        };
        let id = *id;
        let given = parse_answer(buffer, self.rules.answer_mode);
        let Some(npc) = npcs.iter_mut().find(|n| n.id == id) else {
            log::warn!("quiz: NPC {id:?} vanished while answering");
            self.state = QuizState::Idle;
            return Some(QuizEvent::Closed);
        };

        score.asked += 1;
        let correct = given.as_ref().is_ok_and(|v| *v == npc.question().answer());
        let (outcome, message) = if correct {
            npc.mark_solved();
            score.score += u64::from(self.rules.reward);
            score.correct += 1;
            (Outcome::Correct, format!("Correct! Great job! {} is impressed.", npc.name))
        } else {
            let message = match self.rules.wrong_answer {
                WrongAnswerPolicy::Retry => "That's not quite right. Try again!".to_string(),
                WrongAnswerPolicy::Forfeit => {
                    npc.forfeit();
                    format!("Oops! The answer was {}.", npc.question().answer())
                }
                WrongAnswerPolicy::Regenerate => {
                    npc.replace_question(self.rules.questions.generate(rng));
                    format!("Not quite! {} will ask something new.", npc.name)
                }
            };
            (Outcome::Incorrect, message)
        };
        log::debug!("quiz: {} answered {:?} -> {:?}", npc.name, given, outcome);
        self.resolve(id, outcome, message);
        Some(QuizEvent::Answered { npc: id, outcome, given: given.ok() })
    }

    /// Count down the feedback timer; returns to `Idle` when it runs out.
    pub fn tick(&mut self, dt: f64) -> Option<QuizEvent> {
        if let QuizState::Resolved { remaining, .. } = &mut self.state {
            *remaining -= dt.max(0.0);
            if *remaining <= 0.0 {
                self.state = QuizState::Idle;
                return Some(QuizEvent::Closed);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::{Operator, Question};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn setup(rules: QuizRules) -> (Quiz, Vec<Npc>, ScoreBoard, SmallRng) {
        let npcs = vec![Npc::new(
            NpcId(0),
            "Lila",
            Vec2::new(5.0, 5.0),
            Question::new(7, Operator::Add, 5).unwrap(),
        )];
        (Quiz::new(rules), npcs, ScoreBoard::default(), SmallRng::seed_from_u64(1))
    }

    fn type_str(quiz: &mut Quiz, s: &str) {
        for c in s.chars() {
            quiz.type_char(c);
        }
    }

    #[test]
    fn full_correct_cycle() {
        let (mut quiz, mut npcs, mut score, mut rng) = setup(QuizRules::default());
        assert_eq!(quiz.interact(&npcs, Vec2::new(5.5, 5.0), 1.1, &mut rng), Some(QuizEvent::Opened(NpcId(0))));
        assert!(matches!(quiz.state(), QuizState::Prompting { line: 0, .. }));
        assert_eq!(quiz.advance(), Some(QuizEvent::InputOpened(NpcId(0))));
        type_str(&mut quiz, "12");
        let ev = quiz.submit(&mut npcs, &mut score, &mut rng);
        assert_eq!(ev, Some(QuizEvent::Answered { npc: NpcId(0), outcome: Outcome::Correct, given: Some(12) }));
        assert!(npcs[0].is_solved());
        assert_eq!(score, ScoreBoard { score: 10, asked: 1, correct: 1 });
        assert_eq!(quiz.tick(1.0), None);
        assert_eq!(quiz.tick(1.0), Some(QuizEvent::Closed));
        assert!(quiz.is_idle());
    }

    #[test]
    fn wrong_answer_retry_keeps_question() {
        let (mut quiz, mut npcs, mut score, mut rng) = setup(QuizRules::default());
        quiz.interact(&npcs, Vec2::new(5.0, 5.5), 1.1, &mut rng);
        quiz.advance();
        type_str(&mut quiz, "5");
        quiz.submit(&mut npcs, &mut score, &mut rng);
        assert!(matches!(quiz.state(), QuizState::Resolved { outcome: Outcome::Incorrect, .. }));
        assert!(!npcs[0].is_solved());
        assert!(npcs[0].is_open());
        assert_eq!(npcs[0].question().answer(), 12);
        assert_eq!(score, ScoreBoard { score: 0, asked: 1, correct: 0 });
    }

    #[test]
    fn empty_and_garbage_input_are_incorrect() {
        let (mut quiz, mut npcs, mut score, mut rng) = setup(QuizRules::default());
        quiz.interact(&npcs, Vec2::new(5.0, 5.0), 1.1, &mut rng);
        quiz.advance();
        let ev = quiz.submit(&mut npcs, &mut score, &mut rng);
        assert_eq!(ev, Some(QuizEvent::Answered { npc: NpcId(0), outcome: Outcome::Incorrect, given: None }));

        quiz.advance(); // dismiss feedback
        quiz.interact(&npcs, Vec2::new(5.0, 5.0), 1.1, &mut rng);
        quiz.advance();
        assert!(!quiz.type_char('x'));
        assert!(!quiz.type_char('+'));
        let ev = quiz.submit(&mut npcs, &mut score, &mut rng);
        assert!(matches!(ev, Some(QuizEvent::Answered { outcome: Outcome::Incorrect, .. })));
        assert!(!npcs[0].is_solved());
    }

    #[test]
    fn solved_npc_does_not_prompt_again() {
        let (mut quiz, mut npcs, _, mut rng) = setup(QuizRules::default());
        npcs[0].mark_solved();
        quiz.interact(&npcs, Vec2::new(5.0, 5.0), 1.1, &mut rng);
        match quiz.state() {
            QuizState::Resolved { outcome, message, .. } => {
                assert_eq!(*outcome, Outcome::AlreadySolved);
                assert_eq!(message, ALREADY_SOLVED_LINE);
            }
            other => panic!("unexpected state {other:?}"),
        }
        // And proximity never even opens it.
        let (mut quiz2, _, _, mut rng) = setup(QuizRules::default());
        assert_eq!(quiz2.auto_trigger(&npcs, Vec2::new(5.0, 5.0), 1.1, &mut rng), None);
        assert!(quiz2.is_idle());
    }

    #[test]
    fn forfeit_policy_closes_the_npc() {
        let rules = QuizRules { wrong_answer: WrongAnswerPolicy::Forfeit, ..QuizRules::default() };
        let (mut quiz, mut npcs, mut score, mut rng) = setup(rules);
        quiz.interact(&npcs, Vec2::new(5.0, 5.0), 1.1, &mut rng);
        quiz.advance();
        type_str(&mut quiz, "1");
        quiz.submit(&mut npcs, &mut score, &mut rng);
        assert!(npcs[0].is_forfeited());
        quiz.advance();
        quiz.interact(&npcs, Vec2::new(5.0, 5.0), 1.1, &mut rng);
        assert!(matches!(quiz.state(), QuizState::Resolved { outcome: Outcome::Forfeited, .. }));
    }

    #[test]
    fn regenerate_policy_swaps_question() {
        let rules = QuizRules { wrong_answer: WrongAnswerPolicy::Regenerate, ..QuizRules::default() };
        let (mut quiz, mut npcs, mut score, mut rng) = setup(rules);
        quiz.interact(&npcs, Vec2::new(5.0, 5.0), 1.1, &mut rng);
        quiz.advance();
        quiz.submit(&mut npcs, &mut score, &mut rng);
        assert!(npcs[0].is_open());
        let q = npcs[0].question();
        let (a, b) = q.operands();
        assert_eq!(q.operator().apply(a, b), Some(q.answer()));
    }

    #[test]
    fn intro_lines_come_before_input() {
        let (mut quiz, mut npcs, _, mut rng) = setup(QuizRules::default());
        npcs[0].intro = vec!["Hi!".into(), "I have a puzzle.".into()];
        quiz.interact(&npcs, Vec2::new(5.0, 5.0), 1.1, &mut rng);
        assert_eq!(quiz.advance(), None);
        assert_eq!(quiz.advance(), None);
        assert!(!quiz.type_char('1'));
        assert_eq!(quiz.advance(), Some(QuizEvent::InputOpened(NpcId(0))));
        match quiz.state() {
            QuizState::AwaitingInput { prompt, .. } => assert_eq!(prompt, "7 + 5 = ?"),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn interactions_ignored_until_idle() {
        let (mut quiz, npcs, _, mut rng) = setup(QuizRules::default());
        quiz.interact(&npcs, Vec2::new(5.0, 5.0), 1.1, &mut rng);
        assert_eq!(quiz.interact(&npcs, Vec2::new(5.0, 5.0), 1.1, &mut rng), None);
        assert_eq!(quiz.cancel(), Some(QuizEvent::Closed));
        assert!(quiz.is_idle());
        assert_eq!(quiz.cancel(), None);
        assert_eq!(quiz.interact(&npcs, Vec2::new(9.0, 9.0), 1.1, &mut rng), None);
    }

    #[test]
    fn zero_feedback_returns_on_next_tick() {
        let rules = QuizRules { feedback_seconds: 0.0, ..QuizRules::default() };
        let (mut quiz, mut npcs, mut score, mut rng) = setup(rules);
        quiz.interact(&npcs, Vec2::new(5.0, 5.0), 1.1, &mut rng);
        quiz.advance();
        quiz.submit(&mut npcs, &mut score, &mut rng);
        assert_eq!(quiz.tick(0.0), Some(QuizEvent::Closed));
    }

    #[test]
    fn proximity_latch_waits_for_player_to_leave() {
        let (mut quiz, npcs, _, mut rng) = setup(QuizRules::default());
        let near = Vec2::new(5.0, 5.5);
        assert!(quiz.auto_trigger(&npcs, near, 1.1, &mut rng).is_some());
        quiz.cancel();
        assert_eq!(quiz.auto_trigger(&npcs, near, 1.1, &mut rng), None);
        assert_eq!(quiz.auto_trigger(&npcs, Vec2::new(8.0, 8.0), 1.1, &mut rng), None);
        assert!(quiz.auto_trigger(&npcs, near, 1.1, &mut rng).is_some());
    }

    #[test]
    fn choices_mode_offers_buttons_and_submits_the_pick() {
        let rules = QuizRules { answer_mode: AnswerMode::Choices, ..QuizRules::default() };
        let (mut quiz, mut npcs, mut score, mut rng) = setup(rules);
        quiz.interact(&npcs, Vec2::new(5.0, 5.0), 1.1, &mut rng);
        assert!(quiz.choices().is_empty());
        quiz.advance();
        let offered = quiz.choices().to_vec();
        assert_eq!(offered.len(), CHOICE_COUNT);
        assert!(!quiz.type_char('1'));
        assert!(!quiz.choose(CHOICE_COUNT));

        let right = offered.iter().position(|v| *v == 12).unwrap();
        assert!(quiz.choose(right));
        let ev = quiz.submit(&mut npcs, &mut score, &mut rng);
        assert_eq!(ev, Some(QuizEvent::Answered { npc: NpcId(0), outcome: Outcome::Correct, given: Some(12) }));
        assert!(quiz.choices().is_empty());
    }

    #[test]
    fn expression_mode_default_cap_fits_long_answers() {
        let config = GameConfig { answer_input: AnswerMode::Expression, ..GameConfig::default() };
        let (mut quiz, mut npcs, mut score, mut rng) = setup(QuizRules::from_config(&config));
        quiz.interact(&npcs, Vec2::new(5.0, 5.0), 1.1, &mut rng);
        quiz.advance();
        type_str(&mut quiz, "(2 + 4) * 2");
        let ev = quiz.submit(&mut npcs, &mut score, &mut rng);
        assert!(matches!(ev, Some(QuizEvent::Answered { outcome: Outcome::Correct, given: Some(12), .. })));
    }

    #[test]
    fn input_length_is_capped() {
        let rules = QuizRules { max_input_len: 2, ..QuizRules::default() };
        let (mut quiz, npcs, _, mut rng) = setup(rules);
        quiz.interact(&npcs, Vec2::new(5.0, 5.0), 1.1, &mut rng);
        quiz.advance();
        assert!(quiz.type_char('1'));
        assert!(quiz.type_char('2'));
        assert!(!quiz.type_char('3'));
        assert!(quiz.backspace());
        assert!(quiz.type_char('3'));
        match quiz.state() {
            QuizState::AwaitingInput { buffer, .. } => assert_eq!(buffer, "13"),
            other => panic!("unexpected state {other:?}"),
        }
    }
}
