// Integration tests (native) for the `math-trails` crate.
// These drive the public game API the same way the browser stage does, without
// any wasm/browser calls, so they run under `cargo test` on the host.

use math_trails::input::{Direction, InputState, Key};
use math_trails::npc::{NpcId, NpcSpec};
use math_trails::world::MapSource;
use math_trails::{Game, GameConfig, Operator, Outcome, Question, QuizEvent, QuizState, Vec2, WrongAnswerPolicy};

fn village(policy: WrongAnswerPolicy) -> GameConfig {
    let rows = vec![
        "TTTTTTTTTT".to_string(),
        "T........T".to_string(),
        "T..~~....T".to_string(),
        "T..~~....T".to_string(),
        "T........T".to_string(),
        "TTTTTTTTTT".to_string(),
    ];
    GameConfig {
        map: MapSource::Layout { rows },
        npcs: vec![
            NpcSpec {
                name: "Toby".into(),
                x: 1.5,
                y: 1.5,
                question: Some(Question::new(7, Operator::Add, 5).unwrap()),
                intro: vec!["Hello traveler!".into()],
            },
            NpcSpec { name: "Luna".into(), x: 8.5, y: 4.5, question: None, intro: Vec::new() },
        ],
        wrong_answer: policy,
        feedback_seconds: 1.5,
        ..GameConfig::default()
    }
}

fn type_answer(game: &mut Game, text: &str) -> Option<QuizEvent> {
    for c in text.chars() {
        game.handle_key(Key::Char(c));
    }
    game.handle_key(Key::Enter)
}

fn open_toby(game: &mut Game) {
    game.teleport_player(Vec2::new(2.0, 1.5));
    assert_eq!(game.handle_key(Key::Interact), Some(QuizEvent::Opened(NpcId(0))));
    assert_eq!(game.handle_key(Key::Space), None); // intro line
    assert_eq!(game.handle_key(Key::Space), Some(QuizEvent::InputOpened(NpcId(0))));
}

#[test]
fn correct_answer_scenario() {
    let mut game = Game::with_seed(village(WrongAnswerPolicy::Retry), 42).unwrap();
    open_toby(&mut game);
    let ev = type_answer(&mut game, "12");
    assert_eq!(ev, Some(QuizEvent::Answered { npc: NpcId(0), outcome: Outcome::Correct, given: Some(12) }));
    assert!(game.npc(NpcId(0)).unwrap().is_solved());
    assert_eq!(game.score().score, 10);
    assert_eq!(game.score().correct, 1);

    // Feedback stays up for 1.5 s of game time, then movement resumes.
    let idle = InputState::new();
    for _ in 0..40 {
        game.update(1.0 / 30.0, &idle);
    }
    assert!(matches!(game.quiz().state(), QuizState::Resolved { .. }));
    for _ in 0..10 {
        game.update(1.0 / 30.0, &idle);
    }
    assert!(game.quiz().is_idle());

    // Talking again only gives the thank-you line.
    game.handle_key(Key::Interact);
    assert!(matches!(
        game.quiz().state(),
        QuizState::Resolved { outcome: Outcome::AlreadySolved, .. }
    ));
    assert_eq!(game.score().score, 10);
}

#[test]
fn incorrect_answer_scenario() {
    let mut game = Game::with_seed(village(WrongAnswerPolicy::Retry), 42).unwrap();
    open_toby(&mut game);
    let ev = type_answer(&mut game, "5");
    assert_eq!(ev, Some(QuizEvent::Answered { npc: NpcId(0), outcome: Outcome::Incorrect, given: Some(5) }));
    assert!(!game.npc(NpcId(0)).unwrap().is_solved());
    assert_eq!(game.score().score, 0);
    assert_eq!(game.score().asked, 1);

    // Retry policy: the same question comes back.
    game.handle_key(Key::Space);
    open_toby(&mut game);
    let ev = type_answer(&mut game, "12");
    assert!(matches!(ev, Some(QuizEvent::Answered { outcome: Outcome::Correct, .. })));
    assert_eq!(game.score().asked, 2);
}

#[test]
fn generated_npc_question_is_consistent() {
    let game = Game::with_seed(village(WrongAnswerPolicy::Retry), 7).unwrap();
    let q = game.npc(NpcId(1)).unwrap().question();
    let (a, b) = q.operands();
    assert_eq!(q.operator().apply(a, b), Some(q.answer()));
}

#[test]
fn npc_on_water_is_moved_to_land() {
    let mut config = village(WrongAnswerPolicy::Retry);
    config.npcs[1].x = 3.5;
    config.npcs[1].y = 2.5;
    let game = Game::with_seed(config, 1).unwrap();
    let luna = game.npc(NpcId(1)).unwrap();
    assert!(game.map().is_passable(luna.pos));
}

#[test]
fn walking_into_trees_stops_at_the_border() {
    let mut game = Game::with_seed(village(WrongAnswerPolicy::Retry), 3).unwrap();
    game.teleport_player(Vec2::new(5.5, 4.5));
    game.handle_key(Key::Space); // nothing in range; stays idle
    let mut input = InputState::new();
    input.press(Direction::Down);
    for _ in 0..120 {
        game.update(1.0 / 30.0, &input);
    }
    let p = game.player().pos;
    assert!(p.y < 5.0, "walked into the tree row: {p:?}");
    assert!(game.map().is_passable(p));
}

#[test]
fn config_json_end_to_end() {
    let json = r#"{
        "seed": 11,
        "tile_size": 48,
        "answer_input": "expression",
        "map": {"kind": "crossroads"},
        "map_width": 15,
        "map_height": 10,
        "npcs": [{"name": "Rex", "x": 1.5, "y": 4.5, "question": {"a": 20, "op": "div", "b": 4}}]
    }"#;
    let config = GameConfig::from_json(json).unwrap();
    let mut game = Game::new(config).unwrap();
    assert_eq!(game.map().width(), 15);

    let rex = game.npc(NpcId(0)).unwrap().pos;
    game.teleport_player(rex);
    game.handle_key(Key::Enter);
    game.handle_key(Key::Enter);
    let ev = type_answer(&mut game, "10/2");
    assert!(matches!(ev, Some(QuizEvent::Answered { outcome: Outcome::Correct, given: Some(5), .. })));
}

#[test]
fn choices_mode_plays_with_the_mouse() {
    let mut config = village(WrongAnswerPolicy::Retry);
    config.answer_input = GameConfig::from_json(r#"{"answer_input": "choices"}"#).unwrap().answer_input;
    let mut game = Game::with_seed(config, 8).unwrap();
    let (w, h) = (f64::from(game.config().viewport_width), f64::from(game.config().viewport_height));

    // Toby stands at (1.5, 1.5); the small village keeps the camera at the origin.
    let tile = game.config().tile_size;
    assert_eq!(game.handle_click(1.5 * tile, 1.5 * tile), Some(QuizEvent::Opened(NpcId(0))));
    let dialog = math_trails::ui::dialog_box(w, h);
    let (cx, cy) = (dialog.x + 10.0, dialog.y + 10.0);
    assert_eq!(game.handle_click(cx, cy), None); // intro line
    assert_eq!(game.handle_click(cx, cy), Some(QuizEvent::InputOpened(NpcId(0))));

    let choices = game.quiz().choices().to_vec();
    assert!(choices.contains(&12));
    let buttons = math_trails::ui::choice_buttons(w, h, choices.len());
    let pick = buttons[choices.iter().position(|&c| c == 12).unwrap()];
    let ev = game.handle_click(pick.x + 1.0, pick.y + 1.0);
    assert_eq!(ev, Some(QuizEvent::Answered { npc: NpcId(0), outcome: Outcome::Correct, given: Some(12) }));
    assert!(matches!(game.quiz().state(), QuizState::Resolved { .. }));
}
