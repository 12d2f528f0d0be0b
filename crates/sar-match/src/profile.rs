//! Observable attributes of a person in the world.

use crate::{HeadgearType, ItemColor, PersonDescriptor};

/// What a perceived person actually looks like.
///
/// `description` is a free-form label for operators; the scorer never reads it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersonProfile {
    pub has_jacket: bool,
    pub jacket_color: ItemColor,
    pub headgear_type: HeadgearType,
    pub headgear_color: ItemColor,
    pub has_backpack: bool,
    pub description: String,
}

impl PersonProfile {
    /// The profile of someone dressed exactly as `desc` describes.
    ///
    /// An inactive backpack requirement leaves the choice to the caller via
    /// `backpack_if_unspecified` (spawners flip a coin here).
    pub fn from_descriptor(desc: &PersonDescriptor, backpack_if_unspecified: bool) -> Self {
        Self {
            has_jacket:     desc.require_jacket,
            jacket_color:   desc.jacket_color,
            headgear_type:  desc.headgear_type,
            headgear_color: desc.headgear_color,
            has_backpack:   desc.active_backpack().unwrap_or(backpack_if_unspecified),
            description:    desc.to_human_text(),
        }
    }

    /// Builder-style description override.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
