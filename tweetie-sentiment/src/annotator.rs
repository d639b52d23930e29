use vader_sentiment::SentimentIntensityAnalyzer;

/// Scores text on a `[-1.0, 1.0]` polarity scale.
///
/// Implementations must be cheap to call repeatedly; build one per batch and reuse it.
pub trait SentimentAnnotator {
    fn score(&self, text: &str) -> f64;
}

/// Lexicon and rule based scoring via VADER's `compound` value.
pub struct VaderAnnotator {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderAnnotator {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentAnnotator for VaderAnnotator {
    fn score(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }
        let scores = self.analyzer.polarity_scores(text);
        clip_score(scores.get("compound").copied().unwrap_or(0.0))
    }
}

/// Clamp into `[-1.0, 1.0]`; NaN and infinities collapse to neutral.
pub fn clip_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
