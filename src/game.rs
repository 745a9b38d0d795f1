//! The game controller: owns all state and runs one simulation step per frame.

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::camera::Camera;
use crate::config::{GameConfig, TriggerMode};
use crate::error::{ConfigError, GameError};
use crate::geom::Vec2;
use crate::input::{InputState, Key};
use crate::npc::{NPC_HIT_RADIUS, Npc, NpcId, nearest_in_range};
use crate::player::Player;
use crate::question::QuestionGen;
use crate::quiz::{Outcome, Quiz, QuizEvent, QuizRules, QuizState, ScoreBoard};
use crate::ui;
use crate::world::TileMap;

pub const HELP_TEXT: &str = "Move: WASD or Arrows. Talk: E, Enter, Space or click. Close: Esc";
pub const ALL_SOLVED_TEXT: &str = "You solved every puzzle! Press R to explore a new world.";
const HELP_SECONDS: f64 = 5.0;

/// Short-lived message drawn over the world.
#[derive(Clone, Debug, PartialEq)]
pub struct Banner {
    pub text: String,
    pub remaining: f64,
}

pub struct Game {
    config: GameConfig,
    rng: SmallRng,
    map: TileMap,
    player: Player,
    npcs: Vec<Npc>,
    camera: Camera,
    quiz: Quiz,
    score: ScoreBoard,
    banner: Option<Banner>,
}

impl Game {
    /// Validate `config` and build a fresh world. Uses `config.seed` when set.
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Game::build(config, rng)
    }

    pub fn with_seed(mut config: GameConfig, seed: u64) -> Result<Self, GameError> {
        config.seed = Some(seed);
        Game::new(config)
    }

    fn build(config: GameConfig, mut rng: SmallRng) -> Result<Self, GameError> {
        config.validate()?;
        let map = TileMap::generate(&config.map, config.map_width, config.map_height, &mut rng)?;
        let world = map.size();

        let questions = QuestionGen::default();
        let mut npcs = Vec::with_capacity(config.npcs.len());
        for (i, spec) in config.npcs.iter().enumerate() {
            let wanted = Vec2::new(spec.x, spec.y);
            if !(spec.x >= 0.0 && spec.y >= 0.0 && spec.x < world.x && spec.y < world.y) {
                return Err(ConfigError::NpcOutOfBounds { name: spec.name.clone(), x: spec.x, y: spec.y }.into());
            }
            let pos = map.snap_to_passable(wanted).unwrap_or(wanted);
            let question = match &spec.question {
                Some(q) => q.clone(),
                None => questions.generate(&mut rng),
            };
            npcs.push(Npc::new(NpcId(i), spec.name.clone(), pos, question).with_intro(spec.intro.clone()));
        }

        let center = world * 0.5;
        let spawn = map.snap_to_passable(center).unwrap_or(center);
        let player = Player::new(spawn, config.player_speed);
        let camera = Camera::follow(player.pos, config.view_size(), world);
        let quiz = Quiz::new(QuizRules { questions, ..QuizRules::from_config(&config) });

        log::info!(
            "new world {}x{} with {} NPCs, player at ({:.1}, {:.1})",
            map.width(),
            map.height(),
            npcs.len(),
            spawn.x,
            spawn.y
        );
        Ok(Self {
            config,
            rng,
            map,
            player,
            npcs,
            camera,
            quiz,
            score: ScoreBoard::default(),
            banner: Some(Banner { text: HELP_TEXT.to_string(), remaining: HELP_SECONDS }),
        })
    }

    /// Advance the simulation by `dt` seconds (clamped to the configured
    /// maximum). Movement only happens while no dialog is open.
    pub fn update(&mut self, dt: f64, input: &InputState) -> Vec<QuizEvent> {
        let dt = if dt.is_finite() { dt.clamp(0.0, self.config.max_frame_dt) } else { 0.0 };
        let mut events = Vec::new();

        if let Some(banner) = &mut self.banner {
            banner.remaining -= dt;
            if banner.remaining <= 0.0 {
                self.banner = None;
            }
        }
        events.extend(self.quiz.tick(dt));

        if self.quiz.is_idle() {
            self.player.step(dt, input.axes(), &self.map);
            if self.config.trigger == TriggerMode::Proximity {
                let pos = self.player.pos;
                events.extend(self.quiz.auto_trigger(&self.npcs, pos, self.config.interact_radius, &mut self.rng));
            }
        }
        self.camera = Camera::follow(self.player.pos, self.config.view_size(), self.map.size());
        events
    }

    /// Route a discrete key press according to the dialog state.
    pub fn handle_key(&mut self, key: Key) -> Option<QuizEvent> {
        let offered = self.quiz.choices().len();
        let event = match self.quiz.state() {
            QuizState::AwaitingInput { .. } if offered > 0 => match key {
                Key::Char(c) => match c.to_digit(10) {
                    Some(d) if (1..=offered).contains(&(d as usize)) => self.pick_choice(d as usize - 1),
                    _ => None,
                },
                Key::Cancel => self.quiz.cancel(),
                _ => None,
            },
            QuizState::AwaitingInput { .. } => match key {
                Key::Enter => self.quiz.submit(&mut self.npcs, &mut self.score, &mut self.rng),
                Key::Backspace => {
                    self.quiz.backspace();
                    None
                }
                Key::Cancel => self.quiz.cancel(),
                Key::Space => {
                    self.quiz.type_char(' ');
                    None
                }
                Key::Char(c) => {
                    self.quiz.type_char(c);
                    None
                }
                _ => None,
            },
            QuizState::Idle => match key.command() {
                Key::Interact | Key::Enter | Key::Space => {
                    self.quiz.interact(&self.npcs, self.player.pos, self.config.interact_radius, &mut self.rng)
                }
                Key::Reset if self.all_solved() => {
                    self.reset();
                    None
                }
                _ => None,
            },
            QuizState::Prompting { .. } => match key {
                Key::Space | Key::Enter => self.quiz.advance(),
                Key::Cancel => self.quiz.cancel(),
                _ => None,
            },
            QuizState::Resolved { .. } => match key {
                Key::Space | Key::Enter | Key::Cancel => self.quiz.advance(),
                _ => None,
            },
        };
        self.after(event)
    }

    /// Route a click at canvas pixel `(sx, sy)`. Answer buttons take the
    /// click while they are shown; with no dialog open, clicking an NPC
    /// talks to it wherever the player stands; a click on the dialog box
    /// moves the conversation on.
    pub fn handle_click(&mut self, sx: f64, sy: f64) -> Option<QuizEvent> {
        let (w, h) = (f64::from(self.config.viewport_width), f64::from(self.config.viewport_height));
        let event = match self.quiz.state() {
            QuizState::AwaitingInput { .. } => {
                let hit = ui::choice_buttons(w, h, self.quiz.choices().len())
                    .iter()
                    .position(|b| b.contains(sx, sy));
                hit.and_then(|i| self.pick_choice(i))
            }
            QuizState::Idle => {
                let at = self.camera.screen_to_world(sx, sy, self.config.tile_size);
                match nearest_in_range(&self.npcs, at, NPC_HIT_RADIUS) {
                    Some(npc) => self.quiz.open_npc(npc, &mut self.rng),
                    None => None,
                }
            }
            QuizState::Prompting { .. } | QuizState::Resolved { .. } => {
                if ui::dialog_box(w, h).contains(sx, sy) {
                    self.quiz.advance()
                } else {
                    None
                }
            }
        };
        self.after(event)
    }

    fn pick_choice(&mut self, index: usize) -> Option<QuizEvent> {
        if !self.quiz.choose(index) {
            return None;
        }
        self.quiz.submit(&mut self.npcs, &mut self.score, &mut self.rng)
    }

    /// Shared bookkeeping once an input produced `event`.
    fn after(&mut self, event: Option<QuizEvent>) -> Option<QuizEvent> {
        if let Some(QuizEvent::Answered { outcome: Outcome::Correct, .. }) = &event {
            if self.all_solved() {
                log::info!("all {} NPCs solved, score {}", self.npcs.len(), self.score.score);
                self.banner = Some(Banner { text: ALL_SOLVED_TEXT.to_string(), remaining: f64::INFINITY });
            }
        }
        event
    }

    /// Start over with a new world from the same config. Score is cleared.
    pub fn reset(&mut self) {
        let rng = SmallRng::from_rng(&mut self.rng).unwrap_or_else(|_| self.rng.clone());
        match Game::build(self.config.clone(), rng) {
            Ok(fresh) => *self = fresh,
            Err(e) => log::warn!("reset failed, keeping current world: {e}"),
        }
    }

    pub fn all_solved(&self) -> bool {
        self.npcs.iter().all(Npc::is_solved)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn npcs(&self) -> &[Npc] {
        &self.npcs
    }

    pub fn npc(&self, id: NpcId) -> Option<&Npc> {
        self.npcs.iter().find(|n| n.id == id)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn score(&self) -> ScoreBoard {
        self.score
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    /// Move the player directly, e.g. for tests and scripted demos. The
    /// position is snapped to the nearest passable tile.
    pub fn teleport_player(&mut self, pos: Vec2) {
        if let Some(p) = self.map.snap_to_passable(pos) {
            self.player.pos = p;
            self.camera = Camera::follow(p, self.config.view_size(), self.map.size());
        }
    }
}
