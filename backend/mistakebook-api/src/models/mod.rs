pub mod mistake;
pub mod review;
pub mod stats;
pub mod tag;
pub mod user;

pub use mistake::Mistake;
pub use review::{ReviewEntry, ReviewSession};
pub use tag::Tag;
pub use user::User;
