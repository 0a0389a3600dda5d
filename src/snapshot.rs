//! Game state as served by `GET /api/{owner}/{name}/state`.
//!
//! A [`Snapshot`] is decoded once per fetch and then published as an
//! immutable `Rc<Snapshot>`; readers never see a partially updated value.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Deserializer};

use crate::error::GameError;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub repo_owner: Option<String>,
    #[serde(default)]
    pub repo_name: Option<String>,
    pub level: LevelInfo,
    pub boss: BossInfo,
    /// Keyed by hero identifier; iteration order is key order.
    #[serde(default, deserialize_with = "heroes_map_or_list")]
    pub heroes: BTreeMap<String, HeroInfo>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LevelInfo {
    pub seq: i64,
    /// Background image filename under `bgs/`.
    pub environment: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BossInfo {
    pub name: String,
    #[serde(default)]
    pub attribute: String,
    pub sprite: String,
    pub health: i64,
    pub max_health: i64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct HeroInfo {
    pub name: String,
    pub sprite: String,
    #[serde(default)]
    pub power: Option<i64>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        serde_json::from_str(json).map_err(GameError::Decode)
    }
}

impl BossInfo {
    /// `health / max_health` clamped to `[0, 1]`. A zero max counts as empty.
    pub fn health_fraction(&self) -> f64 {
        if self.max_health <= 0 {
            return 0.0;
        }
        (self.health as f64 / self.max_health as f64).clamp(0.0, 1.0)
    }

    pub fn finished(&self) -> bool {
        self.health <= 0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HeroesPayload {
    Map(BTreeMap<String, HeroInfo>),
    List(Vec<HeroInfo>),
}

// The backend has served heroes both as an id -> hero object and as a bare
// list of hero records. Lists are keyed by hero name.
fn heroes_map_or_list<'de, D>(de: D) -> Result<BTreeMap<String, HeroInfo>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match HeroesPayload::deserialize(de)? {
        HeroesPayload::Map(map) => map,
        HeroesPayload::List(list) => list.into_iter().map(|h| (h.name.clone(), h)).collect(),
    })
}

/// Most recently published snapshot, shared between the fetch cycle (writer)
/// and the render cycle (reader). Publishing swaps the whole `Rc`.
#[derive(Clone, Default)]
pub struct SnapshotCell {
    inner: Rc<RefCell<Option<Rc<Snapshot>>>>,
}

impl SnapshotCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, snapshot: Snapshot) {
        self.inner.replace(Some(Rc::new(snapshot)));
    }

    pub fn latest(&self) -> Option<Rc<Snapshot>> {
        self.inner.borrow().clone()
    }
}
