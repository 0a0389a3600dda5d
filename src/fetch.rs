//! Polling the backend for game state.
//!
//! The fetch cycle is a single async loop: wait, fetch, publish, repeat.
//! The next wait only starts once the previous request has settled, so two
//! requests never overlap (the period drifts by the request latency).

use js_sys::Promise;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use crate::error::GameError;
use crate::snapshot::{Snapshot, SnapshotCell};

/// `{api_base}/{owner}/{name}/state`
pub fn state_url(api_base: &str, repo_owner: &str, repo_name: &str) -> String {
    format!(
        "{}/{}/{}/state",
        api_base.trim_end_matches('/'),
        repo_owner,
        repo_name
    )
}

/// Plain `GET`; the browser's default `cors` mode lets `api_base` point at
/// another origin.
pub fn state_request(url: &str) -> Result<Request, GameError> {
    let opts = RequestInit::new();
    opts.set_method("GET");
    Ok(Request::new_with_str_and_init(url, &opts)?)
}

pub async fn fetch_body(url: &str) -> Result<String, GameError> {
    let window = web_sys::window().ok_or(GameError::NoWindow)?;
    let request = state_request(url)?;

    let resp: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;
    if !resp.ok() {
        log::debug!("{url} answered {}", resp.status());
    }
    let body = JsFuture::from(resp.text()?).await?;
    body.as_string()
        .ok_or_else(|| GameError::Js("response body is not text".into()))
}

pub async fn fetch_state(url: &str) -> Result<Snapshot, GameError> {
    Snapshot::from_json(&fetch_body(url).await?)
}

/// Decodes `body` and publishes it. On error the cell keeps whatever was
/// published before.
pub fn publish_body(body: &str, snapshots: &SnapshotCell) -> Result<(), GameError> {
    let snapshot = Snapshot::from_json(body)?;
    if let (Some(owner), Some(name)) = (&snapshot.repo_owner, &snapshot.repo_name) {
        log::debug!("state for {owner}/{name} at level {}", snapshot.level.seq);
    }
    snapshots.publish(snapshot);
    Ok(())
}

/// Fetches once and publishes on success. A failure only costs this cycle.
pub async fn refresh(url: &str, snapshots: &SnapshotCell) -> bool {
    log::debug!("fetching {url}");
    let published = match fetch_body(url).await {
        Ok(body) => publish_body(&body, snapshots),
        Err(e) => Err(e),
    };
    match published {
        Ok(()) => true,
        Err(e) => {
            log::warn!("state fetch failed: {e}");
            false
        }
    }
}

/// Runs forever: sleep `interval_ms`, then [`refresh`].
pub async fn run_fetch_cycle(url: String, snapshots: SnapshotCell, interval_ms: i32) {
    loop {
        if let Err(e) = sleep(interval_ms).await {
            log::error!("fetch timer failed, polling stopped: {e}");
            return;
        }
        refresh(&url, &snapshots).await;
    }
}

/// `setTimeout` as a future.
pub async fn sleep(ms: i32) -> Result<(), GameError> {
    let window = web_sys::window().ok_or(GameError::NoWindow)?;
    let promise = Promise::new(&mut |resolve, reject| {
        if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms) {
            reject.call1(&wasm_bindgen::JsValue::NULL, &e).ok();
        }
    });
    JsFuture::from(promise).await?;
    Ok(())
}
