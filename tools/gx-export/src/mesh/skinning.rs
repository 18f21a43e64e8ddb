//! Bone influence reduction
//!
//! Source vertices can belong to any number of vertex groups. The exported
//! format has room for [`BONE_SLOTS`] influences per vertex, so each list is
//! reduced to its heaviest entries.
//!
//! Selection keeps a sorted top-4: a candidate goes in front of the first
//! held entry with a strictly smaller weight, and the smallest entry falls off
//! once four are held. Equal weights keep their input order, and a candidate
//! that only ties the lightest of four held entries is dropped, so the
//! earliest of a tied group always wins. Weights are never renormalized.

use gx_common::{BONE_SLOTS, UNUSED_BONE};

/// One (bone group, weight) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneInfluence {
    pub bone: i32,
    pub weight: f32,
}

impl BoneInfluence {
    /// Contents of an unused slot
    pub const EMPTY: Self = Self {
        bone: UNUSED_BONE,
        weight: 0.0,
    };

    pub fn new(bone: i32, weight: f32) -> Self {
        Self { bone, weight }
    }
}

/// Reduce one vertex's influences to the heaviest four, in descending weight order
///
/// Candidates with weight <= 0 (or NaN) never take a slot. Unused slots are
/// [`BoneInfluence::EMPTY`].
pub fn reduce_influences<I>(influences: I) -> [BoneInfluence; BONE_SLOTS]
where
    I: IntoIterator<Item = BoneInfluence>,
{
    let mut slots = [BoneInfluence::EMPTY; BONE_SLOTS];
    let mut held = 0;

    for candidate in influences {
        if !(candidate.weight > 0.0) {
            continue;
        }

        let position = slots[..held]
            .iter()
            .position(|slot| slot.weight < candidate.weight)
            .or((held < BONE_SLOTS).then_some(held));
        let Some(position) = position else {
            continue;
        };

        // Shift lighter entries right; the last one drops off when full
        let end = held.min(BONE_SLOTS - 1);
        slots.copy_within(position..end, position + 1);
        slots[position] = candidate;
        held = (held + 1).min(BONE_SLOTS);
    }

    slots
}

/// Reduce every source vertex's influence list
pub fn reduce_all(influences: &[Vec<BoneInfluence>]) -> Vec<[BoneInfluence; BONE_SLOTS]> {
    influences
        .iter()
        .map(|list| reduce_influences(list.iter().copied()))
        .collect()
}
