//! The structured description of a wanted person.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Clothing colors the perception stack can distinguish.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ItemColor {
    #[default]
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Black,
    White,
    Gray,
}

impl ItemColor {
    pub const ALL: [ItemColor; 8] = [
        ItemColor::Red,
        ItemColor::Blue,
        ItemColor::Green,
        ItemColor::Yellow,
        ItemColor::Orange,
        ItemColor::Black,
        ItemColor::White,
        ItemColor::Gray,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ItemColor::Red    => "red",
            ItemColor::Blue   => "blue",
            ItemColor::Green  => "green",
            ItemColor::Yellow => "yellow",
            ItemColor::Orange => "orange",
            ItemColor::Black  => "black",
            ItemColor::White  => "white",
            ItemColor::Gray   => "gray",
        }
    }
}

impl fmt::Display for ItemColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a person wears on their head.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HeadgearType {
    #[default]
    None,
    Cap,
    Hat,
    ConstructionHelmet,
}

impl HeadgearType {
    pub const ALL: [HeadgearType; 4] = [
        HeadgearType::None,
        HeadgearType::Cap,
        HeadgearType::Hat,
        HeadgearType::ConstructionHelmet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HeadgearType::None               => "no headgear",
            HeadgearType::Cap                => "cap",
            HeadgearType::Hat                => "hat",
            HeadgearType::ConstructionHelmet => "construction helmet",
        }
    }
}

impl fmt::Display for HeadgearType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requirements a candidate must satisfy to be the mission target.
///
/// Each attribute group has an activation flag:
///
/// | Group    | Active when                        | Value field(s)                 |
/// |----------|------------------------------------|--------------------------------|
/// | jacket   | `require_jacket`                   | `jacket_color`                 |
/// | headgear | `headgear_type != None`            | `headgear_color`               |
/// | backpack | `require_backpack_specified`       | `has_backpack`                 |
///
/// `PartialEq` and `Hash` only look at value fields of active groups, so two
/// descriptors that differ in an inactive field compare equal and hash the
/// same.  [`DescriptorPool`][crate::DescriptorPool] depends on this.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PersonDescriptor {
    pub require_jacket: bool,
    pub jacket_color: ItemColor,

    pub headgear_type: HeadgearType,
    pub headgear_color: ItemColor,

    pub require_backpack_specified: bool,
    pub has_backpack: bool,
}

impl PersonDescriptor {
    /// `true` if no attribute group is active.  Every profile scores `0.0`
    /// against such a descriptor.
    pub fn is_unconstrained(&self) -> bool {
        !self.require_jacket
            && self.headgear_type == HeadgearType::None
            && !self.require_backpack_specified
    }

    #[inline]
    pub fn requires_headgear(&self) -> bool {
        self.headgear_type != HeadgearType::None
    }

    /// Jacket color, if the jacket group is active.
    #[inline]
    pub fn active_jacket_color(&self) -> Option<ItemColor> {
        self.require_jacket.then_some(self.jacket_color)
    }

    /// Headgear color, if the headgear group is active.
    #[inline]
    pub fn active_headgear_color(&self) -> Option<ItemColor> {
        self.requires_headgear().then_some(self.headgear_color)
    }

    /// Backpack requirement, if the backpack group is active.
    #[inline]
    pub fn active_backpack(&self) -> Option<bool> {
        self.require_backpack_specified.then_some(self.has_backpack)
    }

    /// Human-readable sentence, e.g.
    /// `"person with red jacket and blue cap, with backpack"`.
    pub fn to_human_text(&self) -> String {
        let mut text = String::from("person ");
        match self.active_jacket_color() {
            Some(color) => text.push_str(&format!("with {color} jacket ")),
            None => text.push_str("without jacket "),
        }
        match self.active_headgear_color() {
            Some(color) => text.push_str(&format!("and {color} {}", self.headgear_type)),
            None => text.push_str("and no headgear"),
        }
        match self.active_backpack() {
            Some(true) => text.push_str(", with backpack"),
            Some(false) => text.push_str(", without backpack"),
            None => text.push_str(" (backpack irrelevant)"),
        }
        text
    }
}

impl PartialEq for PersonDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.require_jacket == other.require_jacket
            && self.active_jacket_color() == other.active_jacket_color()
            && self.headgear_type == other.headgear_type
            && self.active_headgear_color() == other.active_headgear_color()
            && self.require_backpack_specified == other.require_backpack_specified
            && self.active_backpack() == other.active_backpack()
    }
}

impl Eq for PersonDescriptor {}

impl Hash for PersonDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must feed exactly the fields `eq` compares.
        self.require_jacket.hash(state);
        self.active_jacket_color().hash(state);
        self.headgear_type.hash(state);
        self.active_headgear_color().hash(state);
        self.require_backpack_specified.hash(state);
        self.active_backpack().hash(state);
    }
}

impl fmt::Display for PersonDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.active_jacket_color() {
            Some(color) => write!(f, "{color} jacket")?,
            None => f.write_str("no jacket")?,
        }
        match self.active_headgear_color() {
            Some(color) => write!(f, ", {color} {}", self.headgear_type)?,
            None => f.write_str(", no headgear")?,
        }
        match self.active_backpack() {
            Some(true) => f.write_str(", backpack"),
            Some(false) => f.write_str(", no backpack"),
            None => f.write_str(", backpack (any)"),
        }
    }
}
