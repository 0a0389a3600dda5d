//! Sprite loading.
//!
//! Loads are fire-and-forget: [`SpriteLoader::load`] returns a handle at once
//! and the owner polls [`SpriteImage::load_state`] until it leaves `Pending`.
//! There is no retry; a failed image stays failed.

use web_sys::HtmlImageElement;

use crate::error::GameError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteCategory {
    Heroes,
    Bosses,
    Backgrounds,
}

impl SpriteCategory {
    pub fn dir(self) -> &'static str {
        match self {
            SpriteCategory::Heroes => "heroes",
            SpriteCategory::Bosses => "bosses",
            SpriteCategory::Backgrounds => "bgs",
        }
    }
}

/// `{asset_base}/{category}/{filename}`
pub fn asset_path(asset_base: &str, category: SpriteCategory, filename: &str) -> String {
    format!(
        "{}/{}/{}",
        asset_base.trim_end_matches('/'),
        category.dir(),
        filename
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Ready { width: u32, height: u32 },
    Failed,
}

pub trait SpriteImage {
    fn load_state(&self) -> LoadState;
}

pub trait SpriteLoader {
    type Image: SpriteImage;

    fn load(&mut self, category: SpriteCategory, filename: &str) -> Result<Self::Image, GameError>;
}

/// Browser image element. `complete` flips once the fetch settles; a settled
/// image with no natural size failed to load or decode.
#[derive(Clone, Debug)]
pub struct WebImage(pub HtmlImageElement);

impl SpriteImage for WebImage {
    fn load_state(&self) -> LoadState {
        let img = &self.0;
        if !img.complete() {
            return LoadState::Pending;
        }
        match (img.natural_width(), img.natural_height()) {
            (0, _) | (_, 0) => LoadState::Failed,
            (width, height) => LoadState::Ready { width, height },
        }
    }
}

pub struct WebSpriteLoader {
    asset_base: String,
}

impl WebSpriteLoader {
    pub fn new(asset_base: impl Into<String>) -> Self {
        Self {
            asset_base: asset_base.into(),
        }
    }
}

impl SpriteLoader for WebSpriteLoader {
    type Image = WebImage;

    fn load(&mut self, category: SpriteCategory, filename: &str) -> Result<WebImage, GameError> {
        let img = HtmlImageElement::new()?;
        let src = asset_path(&self.asset_base, category, filename);
        log::debug!("loading sprite {src}");
        img.set_src(&src);
        Ok(WebImage(img))
    }
}
