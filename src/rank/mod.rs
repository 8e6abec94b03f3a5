//! Relative momentum ranking across the tracked universe

mod resolver;

pub use resolver::{RankConfig, RankResolver};
