//! Keyboard input, decoupled from the DOM.
//!
//! The stage turns `KeyboardEvent.key` strings into [`Key`]s; movement keys
//! are tracked as held state in [`InputState`], everything else is delivered
//! as a discrete press to [`crate::Game::handle_key`].

use std::collections::HashSet;

use crate::geom::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Move(Direction),
    /// `E`: talk to a nearby NPC.
    Interact,
    /// `Enter`: interact when idle, submit while typing.
    Enter,
    /// `Space`: interact when idle, advance dialog lines.
    Space,
    Backspace,
    /// `Escape`: close the dialog.
    Cancel,
    /// `R`: start a new world once every NPC is solved.
    Reset,
    Char(char),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value. Letters are case folded.
    pub fn from_event_key(key: &str) -> Option<Key> {
        let lower = key.to_ascii_lowercase();
        Some(match lower.as_str() {
            "arrowup" => Key::Move(Direction::Up),
            "arrowdown" => Key::Move(Direction::Down),
            "arrowleft" => Key::Move(Direction::Left),
            "arrowright" => Key::Move(Direction::Right),
            "enter" => Key::Enter,
            " " | "spacebar" => Key::Space,
            "backspace" => Key::Backspace,
            "escape" | "esc" => Key::Cancel,
            _ => {
                let mut chars = lower.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                Key::Char(c)
            }
        })
    }

    /// Direction bound to this key for walking (WASD or arrows).
    pub fn direction(self) -> Option<Direction> {
        match self {
            Key::Move(d) => Some(d),
            Key::Char('w') => Some(Direction::Up),
            Key::Char('s') => Some(Direction::Down),
            Key::Char('a') => Some(Direction::Left),
            Key::Char('d') => Some(Direction::Right),
            _ => None,
        }
    }

    /// Letter commands that only mean something outside the answer box.
    pub fn command(self) -> Key {
        match self {
            Key::Char('e') => Key::Interact,
            Key::Char('r') => Key::Reset,
            other => other,
        }
    }
}

/// Movement keys currently held down.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    held: HashSet<Direction>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, dir: Direction) {
        self.held.insert(dir);
    }

    pub fn release(&mut self, dir: Direction) {
        self.held.remove(&dir);
    }

    /// Forget everything, e.g. when the page loses focus.
    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, dir: Direction) -> bool {
        self.held.contains(&dir)
    }

    /// Raw axis values in {-1, 0, 1}; opposite keys cancel.
    pub fn axes(&self) -> Vec2 {
        let axis = |neg: Direction, pos: Direction| {
            f64::from(i8::from(self.is_held(pos)) - i8::from(self.is_held(neg)))
        };
        Vec2::new(axis(Direction::Left, Direction::Right), axis(Direction::Up, Direction::Down))
    }
}
