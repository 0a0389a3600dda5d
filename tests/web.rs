// Browser-only checks; run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use commit_quest::{GameError, SnapshotCell};
use commit_quest::config::Layout;
use commit_quest::fetch::{publish_body, refresh, state_request};
use commit_quest::reconcile::SceneState;
use commit_quest::render::{CanvasSurface, draw_scene};
use commit_quest::sprite::{LoadState, SpriteCategory, SpriteImage, SpriteLoader, WebSpriteLoader};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::RequestMode;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn loader_points_image_at_asset_path() {
    let mut loader = WebSpriteLoader::new("/static/images");
    let img = loader.load(SpriteCategory::Heroes, "knight.png").unwrap();
    assert!(img.0.src().ends_with("/static/images/heroes/knight.png"));
    // Nothing is served under the test runner.
    assert!(matches!(
        img.load_state(),
        LoadState::Pending | LoadState::Failed
    ));
}

#[wasm_bindgen_test]
fn empty_scene_draws_on_a_real_canvas() {
    let doc = web_sys::window().unwrap().document().unwrap();
    let canvas: web_sys::HtmlCanvasElement =
        doc.create_element("canvas").unwrap().dyn_into().unwrap();
    canvas.set_width(320);
    canvas.set_height(200);
    let ctx: web_sys::CanvasRenderingContext2d =
        canvas.get_context("2d").unwrap().unwrap().dyn_into().unwrap();
    let mut surface = CanvasSurface::new(canvas, ctx);
    let scene = SceneState::new(Default::default(), 100.0);
    draw_scene(&mut surface, &scene, &Layout::default());
}

#[wasm_bindgen_test]
fn state_request_allows_other_origins() {
    let req = state_request("https://cq.example/api/octo/quest/state").unwrap();
    assert_eq!(req.method(), "GET");
    assert_eq!(req.mode(), RequestMode::Cors);
}

#[wasm_bindgen_test]
async fn failed_refresh_keeps_published_state() {
    let cell = SnapshotCell::new();
    let body = r#"{"level": {"seq": 2, "environment": "cave.png"},
        "boss": {"name": "B", "sprite": "b.png", "health": 1, "max_health": 1}}"#;
    publish_body(body, &cell).unwrap();

    // Nothing is served here: either the request fails or the body is not JSON.
    assert!(!refresh("/api/nobody/nothing/state", &cell).await);
    assert_eq!(cell.latest().unwrap().level.seq, 2);
}

#[wasm_bindgen_test]
fn js_errors_keep_their_message() {
    let err = GameError::from(wasm_bindgen::JsValue::from(js_sys::Error::new("boom")));
    assert_eq!(err.to_string(), "javascript error: Error: boom");
    let err = GameError::from(wasm_bindgen::JsValue::from_str("plain"));
    assert_eq!(err.to_string(), "javascript error: plain");
}
