use crate::config::MatchConfig;

/// Picks timing values out of benchmark console lines.
///
/// Trailing whitespace is dropped and the rest is split on every single
/// space, so a run of spaces yields empty tokens and shifts later positions.
/// A line is only considered when it has more tokens than `marker_index`; it
/// qualifies when the token at `marker_index` equals the marker exactly, and
/// the token at `value_index` is the value.
pub struct LineMatcher {
    marker: String,
    marker_index: usize,
    value_index: usize,
}

impl LineMatcher {
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            marker: config.marker.clone(),
            marker_index: config.marker_index,
            value_index: config.value_index,
        }
    }

    pub fn extract_value<'a>(&self, line: &'a str) -> Option<&'a str> {
        let tokens: Vec<&str> = line.trim_end().split(' ').collect();

        if tokens.len() <= self.marker_index {
            return None;
        }

        if tokens[self.marker_index] != self.marker {
            return None;
        }

        tokens.get(self.value_index).copied()
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }
}

impl Default for LineMatcher {
    fn default() -> Self {
        Self::new(&MatchConfig::default())
    }
}
