//! Game loop driver.
//!
//! Two independent cycles share one [`SnapshotCell`]: the fetch cycle
//! publishes a fresh snapshot every `fetch_interval_ms`, and the render cycle
//! reconciles against whatever was published last and redraws every
//! `frame_interval_ms`. Both run on the page's event loop and never
//! interleave mid-step.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, window};

use crate::anim::{FrameSeed, RandomFrameSeed};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::fetch::{refresh, run_fetch_cycle, state_url};
use crate::reconcile::{ReconcileReport, SceneState};
use crate::render::{CanvasSurface, Surface, draw_scene};
use crate::snapshot::SnapshotCell;
use crate::sprite::{SpriteLoader, WebSpriteLoader};

/// Update + draw state for one canvas.
pub struct GameLoop<L: SpriteLoader, S> {
    config: GameConfig,
    scene: SceneState<L::Image>,
    loader: L,
    surface: S,
    seed: Box<dyn FrameSeed>,
    snapshots: SnapshotCell,
}

impl<L, S> GameLoop<L, S>
where
    L: SpriteLoader,
    S: Surface<Image = L::Image>,
{
    pub fn new(
        config: GameConfig,
        loader: L,
        surface: S,
        seed: Box<dyn FrameSeed>,
        snapshots: SnapshotCell,
    ) -> Self {
        let scene = SceneState::new(config.retention, config.layout.frame_width);
        Self {
            config,
            scene,
            loader,
            surface,
            seed,
            snapshots,
        }
    }

    /// Reconciles against the latest snapshot (if one was published yet).
    pub fn update(&mut self) -> Option<ReconcileReport> {
        let snapshot = self.snapshots.latest()?;
        let report = self
            .scene
            .reconcile(&snapshot, &mut self.loader, self.seed.as_mut());
        if report.heroes_spawned > 0 || report.heroes_pruned > 0 {
            log::debug!(
                "{} heroes joined, {} pruned",
                report.heroes_spawned,
                report.heroes_pruned
            );
        }
        Some(report)
    }

    pub fn draw(&mut self) {
        draw_scene(&mut self.surface, &self.scene, &self.config.layout);
    }

    pub fn tick(&mut self) {
        self.update();
        self.draw();
    }

    pub fn scene(&self) -> &SceneState<L::Image> {
        &self.scene
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

type WebGame = GameLoop<WebSpriteLoader, CanvasSurface>;

/// Resolves the page elements, then (asynchronously) awaits the first fetch,
/// starts the render loop and hands over to the fetch cycle.
pub fn start(config: GameConfig) -> Result<(), GameError> {
    let win = window().ok_or(GameError::NoWindow)?;
    let doc = win.document().ok_or(GameError::NoDocument)?;

    let canvas: HtmlCanvasElement = doc
        .get_element_by_id(&config.canvas_id)
        .ok_or_else(|| GameError::MissingElement(config.canvas_id.clone()))?
        .dyn_into()
        .map_err(|_| GameError::WrongElementType(config.canvas_id.clone()))?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or(GameError::NoContext)?
        .dyn_into()
        .map_err(|_| GameError::NoContext)?;

    let repo_owner = element_text(&doc, &config.repo_owner_id)?;
    let repo_name = element_text(&doc, &config.repo_name_id)?;
    let url = state_url(&config.api_base, &repo_owner, &repo_name);
    log::info!("starting commit quest for {repo_owner}/{repo_name} ({url})");

    let snapshots = SnapshotCell::new();
    let fetch_interval = config.fetch_interval_ms;
    let frame_interval = config.frame_interval_ms;
    let loader = WebSpriteLoader::new(config.asset_base.clone());
    let game = Rc::new(RefCell::new(GameLoop::new(
        config,
        loader,
        CanvasSurface::new(canvas, ctx),
        Box::new(RandomFrameSeed),
        snapshots.clone(),
    )));

    wasm_bindgen_futures::spawn_local(async move {
        if !refresh(&url, &snapshots).await {
            log::warn!("first state fetch failed; drawing starts empty");
        }
        if let Err(e) = start_render_loop(game, frame_interval) {
            log::error!("render loop failed to start: {e}");
            return;
        }
        run_fetch_cycle(url, snapshots, fetch_interval).await;
    });
    Ok(())
}

fn element_text(doc: &Document, id: &str) -> Result<String, GameError> {
    let el = doc
        .get_element_by_id(id)
        .ok_or_else(|| GameError::MissingElement(id.to_string()))?;
    Ok(el.text_content().unwrap_or_default().trim().to_string())
}

type TickCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

// Each tick schedules the next one only after it has run, so a slow frame
// delays the cadence instead of stacking callbacks.
fn start_render_loop(game: Rc<RefCell<WebGame>>, interval_ms: i32) -> Result<(), GameError> {
    let win = window().ok_or(GameError::NoWindow)?;
    let f: TickCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    let next_win = win.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        game.borrow_mut().tick();
        if let Some(cb) = f.borrow().as_ref() {
            let scheduled = next_win.set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                interval_ms,
            );
            if let Err(e) = scheduled {
                log::error!("render loop stopped: {:?}", e);
            }
        }
    }) as Box<dyn FnMut()>));
    if let Some(cb) = g.borrow().as_ref() {
        win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), 0)?;
    }
    Ok(())
}
