// Browser tests: `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use math_trails::{GameConfig, start_game};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn add_host(id: &str) {
    let doc = web_sys::window().and_then(|w| w.document()).unwrap();
    if doc.get_element_by_id(id).is_none() {
        let div = doc.create_element("div").unwrap();
        div.set_id(id);
        doc.body().unwrap().append_child(&div).unwrap();
    }
}

#[wasm_bindgen_test]
fn missing_stage_is_an_error() {
    let json = r#"{"stage_id": "nowhere", "fallback_stage_id": "also-nowhere"}"#;
    assert!(start_game(Some(json.to_string())).is_err());
}

#[wasm_bindgen_test]
fn bad_config_is_an_error() {
    assert!(start_game(Some(r#"{"tile_size": -1}"#.to_string())).is_err());
}

#[wasm_bindgen_test]
fn mounts_a_canvas_into_the_stage() {
    let id = GameConfig::default().stage_id;
    add_host(&id);
    start_game(None).unwrap();
    let doc = web_sys::window().and_then(|w| w.document()).unwrap();
    let host = doc.get_element_by_id(&id).unwrap();
    assert_eq!(host.child_element_count(), 1);
    assert_eq!(host.first_element_child().unwrap().tag_name(), "CANVAS");

    // Remounting replaces the canvas instead of stacking a second one.
    start_game(None).unwrap();
    assert_eq!(host.child_element_count(), 1);
}
