//! In-memory client state mirroring server data.
//!
//! Each store is a plain owned value; the embedding UI decides where it
//! lives and passes it around explicitly.

pub mod mistakes;
pub mod review;
pub mod tags;
pub mod user;

pub use mistakes::{MistakePatch, MistakeStore};
pub use review::{review_order, ReviewCursor, ReviewProgress};
pub use tags::{TagPatch, TagStore};
pub use user::{UserPatch, UserStore};
