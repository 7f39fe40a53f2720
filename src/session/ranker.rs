use std::collections::HashMap;

/// History key for plain beers without a challenge label.
pub const DEFAULT_CATEGORY_KEY: &str = "__bier__";

/// Read-only per-category top-3 times, supplied by the backend when the
/// post-creation flow opens. Ranking never mutates this; the server owns
/// the real history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonalBestHistory {
    top_times: HashMap<String, Vec<f64>>,
}

impl PersonalBestHistory {
    pub fn new(mut top_times: HashMap<String, Vec<f64>>) -> Self {
        for times in top_times.values_mut() {
            times.truncate(3);
        }
        Self { top_times }
    }

    /// Ascending (fastest first) top-3 for a category; empty when the
    /// category has no recorded times yet.
    pub fn top3(&self, category: Option<&str>) -> &[f64] {
        let key = category.unwrap_or(DEFAULT_CATEGORY_KEY);
        self.top_times.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Rank a completed time against the category's historical top 3.
///
/// Returns 1..=3, or `None` when the time does not place. A tie with a
/// historical entry does not beat it: equal times rank one below.
pub fn rank(time: f64, category: Option<&str>, history: &PersonalBestHistory) -> Option<u8> {
    let mut rank: u8 = 1;
    for &best in history.top3(category) {
        if time >= best {
            rank += 1;
        } else {
            break;
        }
    }
    (rank <= 3).then_some(rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(category: &str, times: &[f64]) -> PersonalBestHistory {
        let mut map = HashMap::new();
        map.insert(category.to_string(), times.to_vec());
        PersonalBestHistory::new(map)
    }

    #[test]
    fn faster_than_everything_ranks_first() {
        let history = history("Kan", &[10.0, 11.0, 12.0]);
        assert_eq!(rank(9.0, Some("Kan"), &history), Some(1));
    }

    #[test]
    fn tie_does_not_beat_the_historical_time() {
        let history = history("Kan", &[10.0, 11.0, 12.0]);
        assert_eq!(rank(10.0, Some("Kan"), &history), Some(2));
        assert_eq!(rank(12.0, Some("Kan"), &history), None);
    }

    #[test]
    fn slower_than_the_full_top3_does_not_place() {
        let history = history("Kan", &[10.0, 11.0, 12.0]);
        assert_eq!(rank(13.0, Some("Kan"), &history), None);
    }

    #[test]
    fn partial_and_missing_history() {
        let history = history("Bier", &[10.0]);
        // Only one recorded time, so even a slower run still places.
        assert_eq!(rank(11.0, Some("Bier"), &history), Some(2));
        // Unknown category: first ever time is an instant personal best.
        assert_eq!(rank(11.0, Some("Spies"), &history), Some(1));
    }

    #[test]
    fn plain_beers_use_the_default_key() {
        let history = history(DEFAULT_CATEGORY_KEY, &[8.0, 9.0, 10.0]);
        assert_eq!(rank(7.5, None, &history), Some(1));
        assert_eq!(rank(9.5, None, &history), Some(3));
    }
}
