//! Document model types.
//!
//! Readers turn documents into an ordered stream of [`TextBlock`]s; the
//! segmenter folds those into [`Section`]s, which is what gets serialized.

mod block;
pub(crate) mod section;

pub use block::{StyleHint, TextBlock};
pub use section::Section;
