//! Merges fetched snapshots into the locally owned animation state.
//!
//! Sprite loads are driven by identity changes (new level seq, unseen hero
//! id) while frame advancement happens on every update tick, so images are
//! requested once per entity rather than once per frame.

use crate::anim::{AnimationEntity, EntitySlot, FrameSeed};
use crate::config::RetentionPolicy;
use crate::snapshot::{BossInfo, Snapshot};
use crate::sprite::{SpriteCategory, SpriteImage, SpriteLoader};

pub struct LevelView<I> {
    pub seq: i64,
    pub environment: String,
    /// `None` when the image element could not even be created.
    pub background: Option<I>,
}

pub struct BossView<I> {
    pub slot: EntitySlot<I>,
    /// Refreshed from every snapshot.
    pub info: BossInfo,
}

pub struct HeroEntry<I> {
    pub id: String,
    pub name: String,
    pub power: Option<i64>,
    pub slot: EntitySlot<I>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub new_level: bool,
    pub heroes_spawned: usize,
    pub heroes_pruned: usize,
}

/// Everything the renderer needs, owned by the game loop.
pub struct SceneState<I> {
    level: Option<LevelView<I>>,
    boss: Option<BossView<I>>,
    /// Registration order; display positions follow it.
    heroes: Vec<HeroEntry<I>>,
    retention: RetentionPolicy,
    frame_width: f64,
}

impl<I: SpriteImage> SceneState<I> {
    pub fn new(retention: RetentionPolicy, frame_width: f64) -> Self {
        Self {
            level: None,
            boss: None,
            heroes: Vec::new(),
            retention,
            frame_width,
        }
    }

    /// One update tick: apply identity changes from `snapshot`, promote
    /// settled sprite loads, then advance every registered entity by one
    /// frame and lay heroes out as `0..N-1`.
    pub fn reconcile<L>(
        &mut self,
        snapshot: &Snapshot,
        loader: &mut L,
        seed: &mut dyn FrameSeed,
    ) -> ReconcileReport
    where
        L: SpriteLoader<Image = I>,
    {
        let mut report = ReconcileReport::default();

        if self.level.as_ref().map(|l| l.seq) != Some(snapshot.level.seq) {
            log::info!(
                "level {} ({})",
                snapshot.level.seq,
                snapshot.level.environment
            );
            let background = load_or_log(
                loader,
                SpriteCategory::Backgrounds,
                &snapshot.level.environment,
            );
            self.level = Some(LevelView {
                seq: snapshot.level.seq,
                environment: snapshot.level.environment.clone(),
                background,
            });
            self.boss = None;
            self.heroes.clear();
            report.new_level = true;
        }

        match &mut self.boss {
            Some(boss) => boss.info.clone_from(&snapshot.boss),
            None => {
                self.boss = Some(BossView {
                    slot: slot_for(loader, SpriteCategory::Bosses, &snapshot.boss.sprite),
                    info: snapshot.boss.clone(),
                });
            }
        }

        for (id, hero) in &snapshot.heroes {
            match self.heroes.iter_mut().find(|h| &h.id == id) {
                Some(entry) => {
                    entry.name.clone_from(&hero.name);
                    entry.power = hero.power;
                }
                None => {
                    log::debug!("hero {id} ({}) joined", hero.name);
                    self.heroes.push(HeroEntry {
                        id: id.clone(),
                        name: hero.name.clone(),
                        power: hero.power,
                        slot: slot_for(loader, SpriteCategory::Heroes, &hero.sprite),
                    });
                    report.heroes_spawned += 1;
                }
            }
        }

        if self.retention == RetentionPolicy::Prune {
            let before = self.heroes.len();
            self.heroes.retain(|h| snapshot.heroes.contains_key(&h.id));
            report.heroes_pruned = before - self.heroes.len();
        }

        self.poll_loads(seed);
        self.advance();
        report
    }

    fn poll_loads(&mut self, seed: &mut dyn FrameSeed) {
        let fw = self.frame_width;
        if let Some(boss) = &mut self.boss {
            if boss.slot.poll(fw, seed) && boss.slot.is_failed() {
                log::warn!("boss sprite {} failed to load", boss.info.sprite);
            }
        }
        for hero in &mut self.heroes {
            if hero.slot.poll(fw, seed) && hero.slot.is_failed() {
                log::warn!("sprite for hero {} failed to load", hero.name);
            }
        }
    }
}

impl<I> SceneState<I> {
    fn advance(&mut self) {
        if let Some(e) = self.boss.as_mut().and_then(|b| b.slot.entity_mut()) {
            e.advance();
        }
        let registered = self.heroes.iter_mut().filter_map(|h| h.slot.entity_mut());
        for (position, e) in registered.enumerate() {
            e.advance();
            e.position = position;
        }
    }

    pub fn level(&self) -> Option<&LevelView<I>> {
        self.level.as_ref()
    }

    pub fn boss(&self) -> Option<&BossView<I>> {
        self.boss.as_ref()
    }

    /// All tracked heroes, including those whose sprite is still loading.
    pub fn roster(&self) -> &[HeroEntry<I>] {
        &self.heroes
    }

    /// Heroes with a loaded sprite, in display order.
    pub fn registered_heroes(
        &self,
    ) -> impl Iterator<Item = (&HeroEntry<I>, &AnimationEntity<I>)> {
        self.heroes
            .iter()
            .filter_map(|h| h.slot.entity().map(|e| (h, e)))
    }

    pub fn registered_hero_count(&self) -> usize {
        self.registered_heroes().count()
    }
}

fn load_or_log<L: SpriteLoader>(
    loader: &mut L,
    category: SpriteCategory,
    filename: &str,
) -> Option<L::Image> {
    loader
        .load(category, filename)
        .inspect_err(|e| log::warn!("could not start loading {filename}: {e}"))
        .ok()
}

fn slot_for<L: SpriteLoader>(
    loader: &mut L,
    category: SpriteCategory,
    filename: &str,
) -> EntitySlot<L::Image> {
    load_or_log(loader, category, filename).map_or(EntitySlot::Failed, EntitySlot::Loading)
}
