//! Deduplicated descriptor pools used to dress a spawned crowd.

use std::collections::HashSet;

use crate::{HeadgearType, ItemColor, PersonDescriptor};

/// An ordered set of distinct descriptors.
///
/// Distinctness uses [`PersonDescriptor`]'s `Eq`, so entries that only differ
/// in an inactive field collapse into the first one seen.
#[derive(Clone, Debug, Default)]
pub struct DescriptorPool {
    entries: Vec<PersonDescriptor>,
    seen:    HashSet<PersonDescriptor>,
}

impl DescriptorPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any iterator, keeping the first occurrence of each
    /// distinct descriptor in input order.
    pub fn from_descriptors<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = PersonDescriptor>,
    {
        let mut pool = Self::new();
        pool.extend(descriptors);
        pool
    }

    /// Every distinct fully-specified descriptor: jacket on/off × jacket
    /// color × headgear type × headgear color × backpack on/off.
    ///
    /// The raw product contains many duplicates (jacket color is irrelevant
    /// without a jacket, headgear color without headgear); they are removed
    /// through descriptor equality, leaving 450 entries.
    pub fn exhaustive() -> Self {
        let mut pool = Self::new();
        for require_jacket in [false, true] {
            for jacket_color in ItemColor::ALL {
                for headgear_type in HeadgearType::ALL {
                    for headgear_color in ItemColor::ALL {
                        for has_backpack in [false, true] {
                            pool.insert(PersonDescriptor {
                                require_jacket,
                                jacket_color,
                                headgear_type,
                                headgear_color,
                                require_backpack_specified: true,
                                has_backpack,
                            });
                        }
                    }
                }
            }
        }
        pool
    }

    /// Insert `desc` unless an equal descriptor is already present.
    /// Returns `true` if it was added.
    pub fn insert(&mut self, desc: PersonDescriptor) -> bool {
        if self.seen.insert(desc) {
            self.entries.push(desc);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, desc: &PersonDescriptor) -> bool {
        self.seen.contains(desc)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[PersonDescriptor] {
        &self.entries
    }

    /// Consume the pool, returning entries in insertion order.
    pub fn into_vec(self) -> Vec<PersonDescriptor> {
        self.entries
    }
}

impl Extend<PersonDescriptor> for DescriptorPool {
    fn extend<I: IntoIterator<Item = PersonDescriptor>>(&mut self, iter: I) {
        for desc in iter {
            self.insert(desc);
        }
    }
}
