//! Additive soft-match scoring of a profile against a descriptor.
//!
//! | Rule (only if the group is active)                     | Points |
//! |--------------------------------------------------------|--------|
//! | jacket required, profile wears a jacket                | +0.50  |
//! | ... and the jacket color matches                       | +0.75  |
//! | headgear required, same headgear type                  | +0.75  |
//! | ... and the headgear color matches                     | +0.75  |
//! | backpack specified, profile agrees                     | +0.50  |
//!
//! The maximum is [`MAX_SCORE`] = 3.25.

use crate::{PersonDescriptor, PersonProfile};

pub const JACKET_PRESENT: f32 = 0.5;
pub const JACKET_COLOR: f32 = 0.75;
pub const HEADGEAR_TYPE: f32 = 0.75;
pub const HEADGEAR_COLOR: f32 = 0.75;
pub const BACKPACK: f32 = 0.5;

/// Score of a profile that satisfies every rule.
pub const MAX_SCORE: f32 = JACKET_PRESENT + JACKET_COLOR + HEADGEAR_TYPE + HEADGEAR_COLOR + BACKPACK;

/// Threshold used when the agent configuration does not override it.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 1.5;

/// Score `profile` against `target`.  Always `>= 0`.
pub fn score(profile: &PersonProfile, target: &PersonDescriptor) -> f32 {
    let mut total = 0.0;

    if target.require_jacket && profile.has_jacket {
        total += JACKET_PRESENT;
        if profile.jacket_color == target.jacket_color {
            total += JACKET_COLOR;
        }
    }

    if target.requires_headgear() && profile.headgear_type == target.headgear_type {
        total += HEADGEAR_TYPE;
        if profile.headgear_color == target.headgear_color {
            total += HEADGEAR_COLOR;
        }
    }

    if target.require_backpack_specified && profile.has_backpack == target.has_backpack {
        total += BACKPACK;
    }

    total
}

/// `true` iff `score(profile, target) >= threshold`.
#[inline]
pub fn is_match(profile: &PersonProfile, target: &PersonDescriptor, threshold: f32) -> bool {
    score(profile, target) >= threshold
}
