//! Markdown story document parsing
//!
//! Story documents contain `### US-NNN-NN Title` headed blocks written in
//! German or English. [`blocks`] finds the block boundaries and [`story`]
//! extracts the fields of each block.

pub mod blocks;
pub mod markers;
pub mod story;

pub use blocks::{parse_document, split_blocks};
pub use story::{extract_priority, parse_header, parse_story};
