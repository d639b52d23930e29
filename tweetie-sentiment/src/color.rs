//! Map sentiment scores onto a red→green gradient.
//!
//! The gradient interpolates linearly in HSL, so the midpoint passes through yellow
//! rather than muddy brown.
use palette::{FromColor, Hsl, Mix, Srgb};
use tweetie_common::{Post, Rgb};

use crate::annotator::clip_score;

pub const GRADIENT_STEPS: usize = 100;

const RED: Rgb = Rgb::new(0xff, 0x00, 0x00);
/// CSS named `green`.
const GREEN: Rgb = Rgb::new(0x00, 0x80, 0x00);

/// A precomputed ramp of [`GRADIENT_STEPS`] colors.
#[derive(Debug, Clone)]
pub struct Gradient {
    colors: Vec<Rgb>,
}

impl Gradient {
    /// Index 0 is pure red, the last index is pure green.
    pub fn red_to_green() -> Self {
        Self::between(RED, GREEN, GRADIENT_STEPS)
    }

    fn between(start: Rgb, end: Rgb, steps: usize) -> Self {
        let from = to_hsl(start);
        let to = to_hsl(end);
        let last = steps.saturating_sub(1).max(1) as f32;

        let colors = (0..steps)
            .map(|i| {
                let mixed = from.mix(to, i as f32 / last);
                let rgb: Srgb<u8> = Srgb::from_color(mixed).into_format();
                Rgb::new(rgb.red, rgb.green, rgb.blue)
            })
            .collect();
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: usize) -> Rgb {
        self.colors[index.min(self.colors.len() - 1)]
    }

    /// Color for a sentiment score.
    pub fn for_score(&self, score: f64) -> Rgb {
        self.get(color_index(score))
    }
}

fn to_hsl(c: Rgb) -> Hsl {
    Hsl::from_color(Srgb::new(c.r, c.g, c.b).into_format::<f32>())
}

/// `round((score + 1) * 50 * 0.99)`, always within `0..GRADIENT_STEPS`.
pub fn color_index(score: f64) -> usize {
    let scaled = ((clip_score(score) + 1.0) * 50.0 * 0.99).round();
    (scaled as usize).min(GRADIENT_STEPS - 1)
}

/// Assign a gradient color to every post in the batch.
pub fn add_color(posts: &mut [Post]) {
    let gradient = Gradient::red_to_green();
    for post in posts.iter_mut() {
        post.color = Some(gradient.for_score(post.score));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn post(score: f64) -> Post {
        Post {
            id: 1,
            created: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            retweeted: 0,
            text: String::new(),
            hashtags: vec![],
            urls: vec![],
            mentions: vec![],
            score,
            color: None,
        }
    }

    #[test]
    fn index_boundaries() {
        assert_eq!(color_index(-1.0), 0);
        assert_eq!(color_index(1.0), 99);
        assert_eq!(color_index(0.0), 50);
    }

    #[test]
    fn index_in_range_across_domain() {
        for i in 0..=2000 {
            let s = -1.0 + i as f64 / 1000.0;
            assert!(color_index(s) < GRADIENT_STEPS, "score {s}");
        }
        assert_eq!(color_index(f64::NAN), 50);
        assert_eq!(color_index(7.0), 99);
    }

    #[test]
    fn gradient_endpoints_are_pure() {
        let g = Gradient::red_to_green();
        assert_eq!(g.len(), GRADIENT_STEPS);
        assert_eq!(g.get(0), RED);
        assert_eq!(g.get(99), GREEN);
    }

    #[test]
    fn gradient_passes_through_warm_colors() {
        let g = Gradient::red_to_green();
        let mid = g.get(49);
        assert!(mid.r > 0xa0 && mid.g > 0xa0, "midpoint {mid} should be yellowish");
        assert_eq!(mid.b, 0);
    }

    #[test]
    fn add_color_fills_every_post() {
        let mut posts = vec![post(-1.0), post(0.0), post(1.0)];
        add_color(&mut posts);
        assert_eq!(posts[0].color, Some(RED));
        assert_eq!(posts[2].color, Some(GREEN));
        assert!(posts.iter().all(|p| p.color.is_some()));
    }
}
