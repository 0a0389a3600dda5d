// Native stand-ins for the browser pieces: an image whose load state the test
// controls, a loader that records requests, and a surface that records draws.
#![allow(dead_code)]

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use commit_quest::anim::FrameSeed;
use commit_quest::error::GameError;
use commit_quest::render::{Rect, Surface};
use commit_quest::snapshot::Snapshot;
use commit_quest::sprite::{LoadState, SpriteCategory, SpriteImage, SpriteLoader};

pub const SHEET: LoadState = LoadState::Ready { width: 600, height: 100 };

#[derive(Clone, Debug)]
pub struct FakeImage {
    pub file: String,
    state: Rc<Cell<LoadState>>,
}

impl SpriteImage for FakeImage {
    fn load_state(&self) -> LoadState {
        self.state.get()
    }
}

/// Images resolve to `SHEET` immediately unless a file was registered with
/// [`FakeLoader::hold`] or [`FakeLoader::set`].
#[derive(Default)]
pub struct FakeLoader {
    pub requests: Vec<(SpriteCategory, String)>,
    states: HashMap<String, Rc<Cell<LoadState>>>,
}

impl FakeLoader {
    pub fn set(&mut self, file: &str, state: LoadState) {
        self.states
            .entry(file.to_string())
            .or_insert_with(|| Rc::new(Cell::new(state)))
            .set(state);
    }

    pub fn hold(&mut self, file: &str) {
        self.set(file, LoadState::Pending);
    }

    pub fn count(&self, category: SpriteCategory, file: &str) -> usize {
        self.requests
            .iter()
            .filter(|(c, f)| *c == category && f == file)
            .count()
    }
}

impl SpriteLoader for FakeLoader {
    type Image = FakeImage;

    fn load(&mut self, category: SpriteCategory, filename: &str) -> Result<FakeImage, GameError> {
        self.requests.push((category, filename.to_string()));
        let state = self
            .states
            .entry(filename.to_string())
            .or_insert_with(|| Rc::new(Cell::new(SHEET)))
            .clone();
        Ok(FakeImage {
            file: filename.to_string(),
            state,
        })
    }
}

pub struct FixedSeed(pub u32);

impl FrameSeed for FixedSeed {
    fn initial_frame(&mut self, frame_count: u32) -> u32 {
        self.0 % frame_count
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    Clear,
    Image {
        file: String,
        src: Rect,
        dst: Rect,
        mirrored: bool,
    },
    FillRect {
        rect: Rect,
        color: String,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        color: String,
    },
}

pub struct RecordingSurface {
    pub size: (f64, f64),
    pub ops: Vec<Op>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            size: (1280.0, 720.0),
            ops: Vec::new(),
        }
    }

    pub fn images(&self) -> Vec<&Op> {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::Image { .. }))
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn fill_colors(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::FillRect { color, .. } => Some(color.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    type Image = FakeImage;

    fn size(&self) -> (f64, f64) {
        self.size
    }

    fn clear(&mut self) {
        self.ops.push(Op::Clear);
    }

    fn draw_image(&mut self, image: &FakeImage, src: Rect, dst: Rect, mirrored: bool) {
        self.ops.push(Op::Image {
            file: image.file.clone(),
            src,
            dst,
            mirrored,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.ops.push(Op::FillRect {
            rect,
            color: color.to_string(),
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, _font: &str, color: &str) {
        self.ops.push(Op::Text {
            text: text.to_string(),
            x,
            y,
            color: color.to_string(),
        });
    }
}

/// Snapshot at level `seq` with the given `(id, name, sprite)` heroes.
pub fn snapshot(seq: i64, heroes: &[(&str, &str, &str)]) -> Snapshot {
    let heroes: serde_json::Map<String, serde_json::Value> = heroes
        .iter()
        .map(|(id, name, sprite)| {
            (
                id.to_string(),
                serde_json::json!({"name": name, "sprite": sprite}),
            )
        })
        .collect();
    let json = serde_json::json!({
        "repo_owner": "octo",
        "repo_name": "quest",
        "level": {"seq": seq, "environment": format!("env{seq}.png")},
        "boss": {
            "name": "Merge Conflict",
            "attribute": "the Unresolved",
            "sprite": "orc.png",
            "health": 210,
            "max_health": 300
        },
        "heroes": heroes,
    });
    Snapshot::from_json(&json.to_string()).expect("fixture snapshot")
}

pub fn with_boss_health(mut snap: Snapshot, health: i64, max_health: i64) -> Snapshot {
    snap.boss.health = health;
    snap.boss.max_health = max_health;
    snap
}
