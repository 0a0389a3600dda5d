use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Debug, Error)]
pub enum GameError {
    #[error("no window")]
    NoWindow,
    #[error("no document")]
    NoDocument,
    #[error("element #{0} not found")]
    MissingElement(String),
    #[error("element #{0} has the wrong type")]
    WrongElementType(String),
    #[error("canvas has no 2d context")]
    NoContext,
    #[error("javascript error: {0}")]
    Js(String),
    #[error("malformed game state: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("invalid config: {0}")]
    Config(#[source] serde_json::Error),
}

impl From<JsValue> for GameError {
    fn from(value: JsValue) -> Self {
        // Error objects render as "Name: message"; plain strings as themselves.
        let msg = match value.dyn_ref::<js_sys::Error>() {
            Some(err) => String::from(err.to_string()),
            None => value.as_string().unwrap_or_else(|| format!("{value:?}")),
        };
        GameError::Js(msg)
    }
}

impl From<GameError> for JsValue {
    fn from(err: GameError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
