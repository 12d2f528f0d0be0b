//! `sar-claim` — mutual-exclusion leases over claimable targets.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`claim`]    | `Claim` — one lease record                                 |
//! | [`registry`] | `ClaimRegistry`, `ClaimStats` — the shared lease table     |
//! | [`error`]    | `ClaimError`, `ClaimResult<T>`                             |
//!
//! # Lease model
//!
//! A claim is a lease, not a lock.  The holder must [`refresh`] it while it
//! keeps chasing the target; a claim whose holder stopped refreshing for
//! longer than the timeout, or whose holder was deactivated, is *stale* and
//! is evicted by the next [`try_claim`].  Crashed or dropped agents therefore
//! never strand a target.
//!
//! [`refresh`]: ClaimRegistry::refresh
//! [`try_claim`]: ClaimRegistry::try_claim

pub mod claim;
pub mod error;
pub mod registry;


pub use claim::{Claim, DEFAULT_CLAIM_TIMEOUT};
pub use error::{ClaimError, ClaimResult};
pub use registry::{ClaimRegistry, ClaimStats};
