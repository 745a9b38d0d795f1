// Flat-shape renderer for the canvas stage. Everything is drawn in world
// order: terrain, NPCs, player, then screen-space HUD, dialog and banner.
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::Camera;
use crate::game::Game;
use crate::npc::{NPC_RADIUS, Npc};
use crate::player::{Facing, Player};
use crate::quiz::{Outcome, QuizState};
use crate::ui;
use crate::world::Terrain;

const NPC_COLORS: [&str; 6] = ["#FF7043", "#FFAA00", "#A64CFF", "#43FF7A", "#FF5599", "#20B2AA"];
const TAU: f64 = std::f64::consts::TAU;

fn terrain_color(t: Terrain) -> &'static str {
    match t {
        Terrain::Grass => "#4CAF50",
        Terrain::Water => "#1565C0",
        Terrain::Sand => "#F3E1A9",
        Terrain::Forest => "#2E7D32",
        Terrain::Tree => "#1B5E20",
        Terrain::Road => "#A1887F",
        Terrain::Mountain => "#7F6A57",
    }
}

/// Something with a world position that can draw itself.
trait Paint {
    fn paint(&self, ctx: &CanvasRenderingContext2d, cam: &Camera, tile: f64, radius: f64);
}

impl Paint for Player {
    fn paint(&self, ctx: &CanvasRenderingContext2d, cam: &Camera, tile: f64, radius: f64) {
        let (px, py) = cam.world_to_screen(self.pos, tile);
        let r = tile * radius;
        circle(ctx, px, py, r, "#0077FF");
        // Nose dot shows which way the player faces.
        let (dx, dy) = match self.facing {
            Facing::Up => (0.0, -1.0),
            Facing::Down => (0.0, 1.0),
            Facing::Left => (-1.0, 0.0),
            Facing::Right => (1.0, 0.0),
        };
        circle(ctx, px + dx * r * 0.6, py + dy * r * 0.6, r * 0.25, "#FFD9B3");
    }
}

impl Paint for Npc {
    fn paint(&self, ctx: &CanvasRenderingContext2d, cam: &Camera, tile: f64, radius: f64) {
        let (px, py) = cam.world_to_screen(self.pos, tile);
        let color = NPC_COLORS[self.id.0 % NPC_COLORS.len()];
        circle(ctx, px, py, tile * radius, color);
        ctx.set_font("bold 12px sans-serif");
        ctx.set_text_align("center");
        ctx.set_text_baseline("bottom");
        fill_text(ctx, &self.name, px, py - tile * 0.45, "#FFFFFF");
        let mark = if self.is_solved() {
            "✓"
        } else if self.is_forfeited() {
            "✗"
        } else {
            "?"
        };
        ctx.set_font("bold 16px sans-serif");
        ctx.set_text_baseline("middle");
        fill_text(ctx, mark, px, py, "#222222");
    }
}

pub(super) fn draw_frame(ctx: &CanvasRenderingContext2d, game: &Game) {
    let config = game.config();
    let (w, h) = (f64::from(config.viewport_width), f64::from(config.viewport_height));
    let tile = config.tile_size;
    let view = config.view_size();
    let cam = game.camera();

    set_fill(ctx, "#87CEEB");
    ctx.fill_rect(0.0, 0.0, w, h);

    if let Some(range) = cam.visible_tiles(view, game.map()) {
        for row in range.rows.0..=range.rows.1 {
            for col in range.cols.0..=range.cols.1 {
                if let Some(t) = game.map().get(col as i64, row as i64) {
                    let (sx, sy) = (((col as f64) - cam.x) * tile, ((row as f64) - cam.y) * tile);
                    set_fill(ctx, terrain_color(t));
                    ctx.fill_rect(sx, sy, tile + 0.5, tile + 0.5);
                }
            }
        }
    }

    for npc in game.npcs() {
        if cam.is_visible(npc.pos, view, 1.0) {
            npc.paint(ctx, cam, tile, NPC_RADIUS);
        }
    }
    game.player().paint(ctx, cam, tile, config.player_radius);

    draw_hud(ctx, game);
    draw_dialog(ctx, game, w, h);
    if let Some(banner) = game.banner() {
        ctx.set_font("16px sans-serif");
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        set_fill(ctx, "rgba(0,0,0,0.6)");
        ctx.fill_rect(w * 0.1, 92.0, w * 0.8, 30.0);
        fill_text(ctx, &banner.text, w / 2.0, 107.0, "#FFFFFF");
    }
}

fn draw_hud(ctx: &CanvasRenderingContext2d, game: &Game) {
    let score = game.score();
    let player = game.player();
    set_fill(ctx, "rgba(0,0,0,0.5)");
    ctx.fill_rect(10.0, 10.0, 240.0, 70.0);
    ctx.set_font("15px sans-serif");
    ctx.set_text_align("left");
    ctx.set_text_baseline("top");
    fill_text(ctx, &format!("Score: {}", score.score), 18.0, 16.0, "#FFD700");
    fill_text(ctx, &format!("Solved: {} / {}", score.correct, score.asked), 130.0, 16.0, "#FFFFFF");
    fill_text(ctx, "HP", 18.0, 44.0, "#FFD700");
    let frac = if player.max_health == 0 {
        0.0
    } else {
        f64::from(player.health) / f64::from(player.max_health)
    };
    set_fill(ctx, "#FF5252");
    ctx.fill_rect(48.0, 46.0, 120.0 * frac, 14.0);
    ctx.set_stroke_style(&JsValue::from_str("#FFFFFF"));
    ctx.set_line_width(2.0);
    ctx.stroke_rect(48.0, 46.0, 120.0, 14.0);
}

fn draw_dialog(ctx: &CanvasRenderingContext2d, game: &Game, w: f64, h: f64) {
    let quiz = game.quiz();
    let Some(npc) = quiz.active_npc().and_then(|id| game.npc(id)) else {
        return;
    };
    let (text, input, hint) = match quiz.state() {
        QuizState::Idle => return,
        QuizState::Prompting { lines, line, .. } => {
            (lines.get(*line).cloned().unwrap_or_default(), None, "Space: continue  Esc: close")
        }
        QuizState::AwaitingInput { prompt, choices, .. } if !choices.is_empty() => {
            (prompt.clone(), None, "Click an answer or press its number")
        }
        QuizState::AwaitingInput { prompt, buffer, .. } => {
            (prompt.clone(), Some(buffer.as_str()), "Type your answer and press Enter")
        }
        QuizState::Resolved { message, outcome, .. } => {
            let hint = match outcome {
                Outcome::Correct => "Nice! Space to close",
                _ => "Space to close",
            };
            (message.clone(), None, hint)
        }
    };

    let ui::Rect { x: bx, y: by, w: bw, h: bh } = ui::dialog_box(w, h);
    set_fill(ctx, "rgba(0,0,0,0.85)");
    ctx.fill_rect(bx, by, bw, bh);
    ctx.set_stroke_style(&JsValue::from_str("#FFFFFF"));
    ctx.set_line_width(3.0);
    ctx.stroke_rect(bx, by, bw, bh);

    ctx.set_text_align("left");
    ctx.set_text_baseline("top");
    ctx.set_font("bold 20px sans-serif");
    fill_text(ctx, &npc.name, bx + 16.0, by + 12.0, "#FFD700");
    ctx.set_font("18px sans-serif");
    fill_text(ctx, &text, bx + 16.0, by + 44.0, "#FFFFFF");

    if let Some(buffer) = input {
        let ui::Rect { x: ix, y: iy, w: iw, h: ih } = ui::input_box(w, h);
        set_fill(ctx, "#222222");
        ctx.fill_rect(ix, iy, iw, ih);
        ctx.set_stroke_style(&JsValue::from_str("#FFD700"));
        ctx.stroke_rect(ix, iy, iw, ih);
        ctx.set_font("24px monospace");
        ctx.set_text_baseline("middle");
        let shown = if buffer.is_empty() { "_" } else { buffer };
        fill_text(ctx, shown, ix + 12.0, iy + ih / 2.0, "#FFFFFF");
    }

    let choices = quiz.choices();
    ctx.set_font("20px sans-serif");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    for (i, (rect, value)) in ui::choice_buttons(w, h, choices.len()).iter().zip(choices).enumerate() {
        set_fill(ctx, "#333333");
        ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
        ctx.set_stroke_style(&JsValue::from_str("#FFD700"));
        ctx.stroke_rect(rect.x, rect.y, rect.w, rect.h);
        let label = format!("{}) {}", i + 1, value);
        fill_text(ctx, &label, rect.x + rect.w / 2.0, rect.y + rect.h / 2.0, "#FFFFFF");
    }

    ctx.set_font("13px sans-serif");
    ctx.set_text_align("right");
    ctx.set_text_baseline("bottom");
    fill_text(ctx, hint, bx + bw - 12.0, by + bh - 6.0, "#AAAAAA");
}

fn set_fill(ctx: &CanvasRenderingContext2d, color: &str) {
    ctx.set_fill_style(&JsValue::from_str(color));
}

fn fill_text(ctx: &CanvasRenderingContext2d, text: &str, x: f64, y: f64, color: &str) {
    set_fill(ctx, color);
    ctx.fill_text(text, x, y).ok();
}

fn circle(ctx: &CanvasRenderingContext2d, x: f64, y: f64, r: f64, color: &str) {
    set_fill(ctx, color);
    ctx.begin_path();
    if ctx.arc(x, y, r, 0.0, TAU).is_ok() {
        ctx.fill();
    }
}
