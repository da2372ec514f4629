//! Self-expiring visual effects (arrival pulses, selection flashes).
//!
//! Effects are aged with the frame `dt` and dropped once their life runs out.
//! Each effect belongs to an entity; destroying the entity must cancel its
//! effects so nothing expires against a removed object.

use starmap_engine::coords::Vec2;
use starmap_engine::paint::Color;
use starmap_engine::scene::{DrawList, ZIndex};

use crate::world::EntityId;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(u64);

/// An expanding, fading ring marker.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Effect {
    pub id: EffectId,
    pub owner: EntityId,
    pub location: Vec2,
    pub colour: Color,
    /// Radius at the end of the effect's life.
    pub radius: f32,
    pub age: f32,
    pub life: f32,
}

impl Effect {
    /// Fraction of life used, in [0, 1].
    #[inline]
    pub fn progress(&self) -> f32 {
        if self.life <= 0.0 { 1.0 } else { (self.age / self.life).clamp(0.0, 1.0) }
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.age >= self.life
    }
}

#[derive(Debug, Default)]
pub struct EffectSet {
    effects: Vec<Effect>,
    next_id: u64,
}

impl EffectSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts an effect lasting `life` seconds.
    pub fn spawn(
        &mut self,
        owner: EntityId,
        location: Vec2,
        radius: f32,
        life: f32,
        colour: Color,
    ) -> EffectId {
        let id = EffectId(self.next_id);
        self.next_id += 1;
        self.effects.push(Effect { id, owner, location, colour, radius, age: 0.0, life });
        id
    }

    /// Ages every effect by `dt` seconds and removes expired ones.
    ///
    /// Returns the effects that expired this step.
    pub fn advance(&mut self, dt: f32) -> Vec<Effect> {
        let mut expired = Vec::new();
        let mut j = 0;
        while j < self.effects.len() {
            let e = &mut self.effects[j];
            e.age += dt;
            if e.is_expired() {
                expired.push(self.effects.swap_remove(j));
                continue;
            }
            j += 1;
        }
        expired
    }

    /// Drops every effect owned by `owner`. Returns how many were dropped.
    pub fn cancel_owner(&mut self, owner: EntityId) -> usize {
        let before = self.effects.len();
        self.effects.retain(|e| e.owner != owner);
        let cancelled = before - self.effects.len();
        if cancelled > 0 {
            log::debug!("cancelled {cancelled} effects of {owner}");
        }
        cancelled
    }

    /// Drops effects whose owner fails `keep`.
    pub fn retain_owners(&mut self, mut keep: impl FnMut(EntityId) -> bool) {
        self.effects.retain(|e| keep(e.owner));
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    /// One growing, fading circle per live effect.
    pub fn draw(&self, list: &mut DrawList) {
        for e in &self.effects {
            let t = e.progress();
            let (_, _, _, a) = e.colour.to_straight();
            list.push_solid_circle(
                ZIndex::EFFECTS,
                e.location,
                e.radius * t,
                e.colour.with_alpha(a * (1.0 - t)),
            );
        }
    }
}
