//! Sentiment scoring and the presentation helpers built on it.
//!
//! - [`annotator`]: compound polarity in `[-1.0, 1.0]` for a piece of text
//! - [`color`]: the 100-step red→green gradient and the score→index mapping
//! - [`stats`]: batch statistics shown next to the rendered posts
pub mod annotator;
pub mod color;
pub mod stats;

pub use annotator::{SentimentAnnotator, VaderAnnotator};
pub use color::{add_color, color_index, Gradient};
pub use stats::median_score;
