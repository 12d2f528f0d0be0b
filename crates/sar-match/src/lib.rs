//! `sar-match` — who are we looking for, and how well does a person fit?
//!
//! # Crate layout
//!
//! | Module         | Contents                                                        |
//! |----------------|-----------------------------------------------------------------|
//! | [`descriptor`] | `ItemColor`, `HeadgearType`, `PersonDescriptor`                 |
//! | [`profile`]    | `PersonProfile` — what a candidate actually looks like          |
//! | [`score`]      | `score`, `is_match`, `DEFAULT_MATCH_THRESHOLD`, `MAX_SCORE`     |
//! | [`pool`]       | `DescriptorPool` — deduplicated descriptor sets for spawning    |
//!
//! Descriptor equality deliberately ignores fields whose requirement flag is
//! off, so `DescriptorPool` can dedupe through a plain `HashSet`.

pub mod descriptor;
pub mod pool;
pub mod profile;
pub mod score;


pub use descriptor::{HeadgearType, ItemColor, PersonDescriptor};
pub use pool::DescriptorPool;
pub use profile::PersonProfile;
pub use score::{DEFAULT_MATCH_THRESHOLD, MAX_SCORE, is_match, score};
