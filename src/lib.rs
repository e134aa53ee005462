//! Timeline and text transformations for subtitle packs.
//!
//! A [`SubsPack`] holds the subtitles of one movie and can be sorted,
//! shifted, scaled, split in two, concatenated with the subtitles of a
//! second part, merged with another language into a dual subtitle, cleaned
//! of formatting and hearing impaired content, and analyzed.

pub mod error;
pub mod pack;
pub mod parser;
pub mod processor;
pub mod serialiser;
pub mod stats;
pub mod subtitle;

pub use error::SubsError;
pub use pack::SubsPack;
pub use stats::SubsStats;
pub use subtitle::{Pos, Subtitle};
