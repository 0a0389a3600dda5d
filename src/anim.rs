//! Per-entity sprite animation state.

use crate::sprite::{LoadState, SpriteImage};

/// Picks the starting frame of a freshly loaded sprite so that heroes
/// sharing a sheet do not animate in lockstep.
pub trait FrameSeed {
    /// Returns a value in `[0, frame_count)`. `frame_count` is never zero.
    fn initial_frame(&mut self, frame_count: u32) -> u32;
}

/// Browser/OS randomness via `getrandom`. Falls back to frame 0 if the
/// source is unavailable.
#[derive(Default)]
pub struct RandomFrameSeed;

impl FrameSeed for RandomFrameSeed {
    fn initial_frame(&mut self, frame_count: u32) -> u32 {
        let mut buf = [0u8; 4];
        match getrandom::getrandom(&mut buf) {
            Ok(()) => u32::from_le_bytes(buf) % frame_count,
            Err(e) => {
                log::debug!("getrandom unavailable: {e}");
                0
            }
        }
    }
}

/// A loaded sprite sheet being cycled column by column.
#[derive(Clone, Debug)]
pub struct AnimationEntity<I> {
    pub image: I,
    frame: u32,
    frame_count: u32,
    /// Sequential slot assigned by the reconciler each update.
    pub position: usize,
}

impl<I> AnimationEntity<I> {
    /// `None` if the frame count is zero.
    pub fn new(image: I, frame_count: u32, initial_frame: u32) -> Option<Self> {
        if frame_count == 0 {
            return None;
        }
        Some(Self {
            image,
            frame: initial_frame % frame_count,
            frame_count,
            position: 0,
        })
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn advance(&mut self) {
        self.frame = (self.frame + 1) % self.frame_count;
    }
}

/// Number of whole frames in a sheet of `sheet_width` source pixels.
pub fn frame_count(sheet_width: u32, frame_width: f64) -> u32 {
    if frame_width <= 0.0 {
        return 0;
    }
    (sheet_width as f64 / frame_width).floor() as u32
}

/// Lifecycle of one sprite-backed entity: the image is requested, then it
/// either becomes an animating entity or is given up on.
#[derive(Clone, Debug)]
pub enum EntitySlot<I> {
    Loading(I),
    Ready(AnimationEntity<I>),
    Failed,
}

impl<I: SpriteImage> EntitySlot<I> {
    /// Moves a `Loading` slot forward once its image has settled. Returns
    /// true when the slot changed.
    pub fn poll(&mut self, frame_width: f64, seed: &mut dyn FrameSeed) -> bool {
        let EntitySlot::Loading(image) = self else {
            return false;
        };
        match image.load_state() {
            LoadState::Pending => false,
            LoadState::Failed => {
                *self = EntitySlot::Failed;
                true
            }
            LoadState::Ready { width, .. } => {
                let count = frame_count(width, frame_width);
                let next = match std::mem::replace(self, EntitySlot::Failed) {
                    EntitySlot::Loading(image) if count > 0 => {
                        let start = seed.initial_frame(count);
                        AnimationEntity::new(image, count, start)
                            .map_or(EntitySlot::Failed, EntitySlot::Ready)
                    }
                    _ => EntitySlot::Failed,
                };
                *self = next;
                true
            }
        }
    }
}

impl<I> EntitySlot<I> {
    pub fn entity(&self) -> Option<&AnimationEntity<I>> {
        match self {
            EntitySlot::Ready(e) => Some(e),
            _ => None,
        }
    }

    pub fn entity_mut(&mut self) -> Option<&mut AnimationEntity<I>> {
        match self {
            EntitySlot::Ready(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, EntitySlot::Failed)
    }
}
