//! Quiz-giving NPCs.

use serde::{Deserialize, Serialize};

use crate::geom::Vec2;
use crate::question::Question;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NpcId(pub usize);

/// NPC description as written in config. `question` may be omitted to have
/// one generated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NpcSpec {
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub question: Option<Question>,
    /// Lines shown before the question.
    #[serde(default)]
    pub intro: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Npc {
    pub id: NpcId,
    pub name: String,
    pub pos: Vec2,
    pub intro: Vec<String>,
    question: Question,
    solved: bool,
    forfeited: bool,
}

impl Npc {
    pub fn new(id: NpcId, name: impl Into<String>, pos: Vec2, question: Question) -> Self {
        Self {
            id,
            name: name.into(),
            pos,
            intro: Vec::new(),
            question,
            solved: false,
            forfeited: false,
        }
    }

    pub fn with_intro(mut self, intro: Vec<String>) -> Self {
        self.intro = intro;
        self
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// A forfeited NPC gave up on the player after a wrong answer.
    pub fn is_forfeited(&self) -> bool {
        self.forfeited
    }

    /// Whether talking to this NPC should still open a question.
    pub fn is_open(&self) -> bool {
        !self.solved && !self.forfeited
    }

    /// Solving is permanent.
    pub fn mark_solved(&mut self) {
        self.solved = true;
    }

    pub fn forfeit(&mut self) {
        if !self.solved {
            self.forfeited = true;
        }
    }

    /// Swap in a fresh question; ignored once solved.
    pub fn replace_question(&mut self, question: Question) {
        if !self.solved {
            self.question = question;
        }
    }

    pub fn distance_to(&self, pos: Vec2) -> f64 {
        self.pos.distance(pos)
    }

    pub fn is_near(&self, pos: Vec2, radius: f64) -> bool {
        self.distance_to(pos) < radius
    }

    /// Dialog lines for a fresh prompt: intro lines, then the question.
    pub fn prompt_lines(&self) -> Vec<String> {
        let mut lines = self.intro.clone();
        lines.push(self.question.prompt());
        lines
    }
}

/// Drawn body radius, in tiles.
pub const NPC_RADIUS: f64 = 0.4;
/// How far from an NPC's center a click still lands on it, in tiles.
pub const NPC_HIT_RADIUS: f64 = 0.75;

/// Closest NPC strictly within `radius` of `pos`; the earlier one in the
/// roster wins a tie.
pub fn nearest_in_range(npcs: &[Npc], pos: Vec2, radius: f64) -> Option<&Npc> {
    npcs.iter()
        .filter(|n| n.is_near(pos, radius))
        .fold(None, |best: Option<&Npc>, n| match best {
            Some(b) if b.distance_to(pos) <= n.distance_to(pos) => Some(b),
            _ => Some(n),
        })
}

/// The five explorers of the noise-terrain world.
pub fn default_roster() -> Vec<NpcSpec> {
    use crate::question::Operator::*;
    let spec = |name: &str, x, y, a, op, b| NpcSpec {
        name: name.to_string(),
        x,
        y,
        question: Question::new(a, op, b).ok(),
        intro: Vec::new(),
    };
    vec![
        spec("Lila", 8.7, 7.2, 3, Add, 5),
        spec("Bryn", 34.1, 23.5, 7, Mul, 6),
        spec("Mira", 14.5, 26.6, 9, Sub, 4),
        spec("Cade", 25.8, 9.7, 12, Div, 4),
        spec("Zia", 19.3, 19.4, 7, Add, 5),
    ]
}
