//! Color frequency ranking
//!
//! Counts normalized colors across all observation categories and keeps the
//! per-category lists needed for role-specific lookups.

use super::normalize;
use crate::types::{ColorCategory, ColorObservation};
use indexmap::IndexMap;
use serde::Serialize;

/// Colors never offered as brand candidates in the global ranking
///
/// White and black dominate layout chrome; the transparent marker is what a
/// `#transparent` literal normalizes to.
pub const EXCLUDED_FROM_RANKING: [&str; 3] = ["#FFFFFF", "#000000", "#TRANSPARENT"];

/// Length of the global ranked candidate list
pub const MAX_RANKED_COLORS: usize = 10;

/// Normalized colors per observation category, in observation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryLists {
    pub text: Vec<String>,
    pub background: Vec<String>,
    pub border: Vec<String>,
    pub link: Vec<String>,
}

impl CategoryLists {
    pub fn get(&self, category: ColorCategory) -> &[String] {
        match category {
            ColorCategory::Text => &self.text,
            ColorCategory::Background => &self.background,
            ColorCategory::Border => &self.border,
            ColorCategory::Link => &self.link,
        }
    }

    fn push(&mut self, category: ColorCategory, color: String) {
        match category {
            ColorCategory::Text => self.text.push(color),
            ColorCategory::Background => self.background.push(color),
            ColorCategory::Border => self.border.push(color),
            ColorCategory::Link => self.link.push(color),
        }
    }
}

/// Output of the ranking pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RankedColors {
    /// Occurrence count per normalized color, first-encounter order
    pub frequencies: IndexMap<String, usize>,
    /// Up to 10 brand candidates by descending count (white/black excluded)
    pub most_common: Vec<String>,
    /// Per-category normalized lists (nothing excluded)
    pub categories: CategoryLists,
}

/// Rank color observations by frequency
///
/// Unparseable observations are dropped silently. Ties in the ranking keep
/// first-encounter order.
pub fn rank<'a, I>(observations: I) -> RankedColors
where
    I: IntoIterator<Item = &'a ColorObservation>,
{
    let mut frequencies: IndexMap<String, usize> = IndexMap::new();
    let mut categories = CategoryLists::default();

    for observation in observations {
        let Some(color) = normalize(&observation.raw) else {
            continue;
        };

        *frequencies.entry(color.clone()).or_insert(0) += 1;
        categories.push(observation.category, color);
    }

    let mut candidates: Vec<(&String, usize)> = frequencies
        .iter()
        .filter(|(color, _)| !EXCLUDED_FROM_RANKING.contains(&color.as_str()))
        .map(|(color, count)| (color, *count))
        .collect();

    // Stable sort: equal counts stay in first-encounter order
    candidates.sort_by(|a, b| b.1.cmp(&a.1));

    let most_common = candidates
        .into_iter()
        .take(MAX_RANKED_COLORS)
        .map(|(color, _)| color.clone())
        .collect();

    RankedColors {
        frequencies,
        most_common,
        categories,
    }
}

/// Most frequent color of one category list, ignoring pure white and black
///
/// Returns `default` when nothing else remains. Ties go to the color seen
/// first.
pub fn most_common(colors: &[String], default: &str) -> String {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();

    for color in colors {
        if color.is_empty() || color == "#FFFFFF" || color == "#000000" {
            continue;
        }
        *counts.entry(color.as_str()).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (color, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((color, count));
        }
    }

    best.map(|(color, _)| color.to_string())
        .unwrap_or_else(|| default.to_string())
}
