//! Data models for the forum.
//!
//! Field names serialize as camelCase for the JSON surface.

mod category;
mod member;
mod paged;
mod tag;
mod topic;

pub use category::*;
pub use member::*;
pub use paged::*;
pub use tag::*;
pub use topic::*;
