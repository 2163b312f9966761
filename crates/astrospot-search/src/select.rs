//! Top-candidate selection.

use astrospot_core::LocationConditions;

/// Keeps the darkest fraction of a candidate set.
///
/// `final = min(max(ceil(size * top_percent / 100), top_number), size)`.
/// With `extended_ties`, everything as dark as the element at `final - 1` is
/// kept too, so the result may grow past `final`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopSelector {
    top_percent: f64,
    top_number: usize,
    extended_ties: bool,
}

impl TopSelector {
    /// Clamps `top_percent` to at most 100 and `top_number` to at least 1.
    #[must_use]
    pub fn new(top_percent: f64, top_number: i64, extended_ties: bool) -> Self {
        let top_number = usize::try_from(top_number.max(1)).unwrap_or(usize::MAX);
        Self {
            top_percent: top_percent.min(100.0),
            top_number,
            extended_ties,
        }
    }

    #[must_use]
    pub fn top_percent(&self) -> f64 {
        self.top_percent
    }

    #[must_use]
    pub fn top_number(&self) -> usize {
        self.top_number
    }

    #[must_use]
    pub fn select(&self, mut candidates: Vec<LocationConditions>) -> Vec<LocationConditions> {
        if candidates.is_empty() {
            return candidates;
        }
        // NaN also lands here.
        if !(self.top_percent > 0.0) {
            tracing::warn!(
                top_percent = self.top_percent,
                "top percent is not positive; selecting nothing"
            );
            return Vec::new();
        }
        if self.top_percent > 50.0 {
            tracing::warn!(
                top_percent = self.top_percent,
                "top percent above 50 may hurt performance"
            );
        }

        candidates.sort_by(LocationConditions::cmp_brightness);
        let size = candidates.len();
        let final_size = self.limit(size).max(self.top_number).min(size);

        if self.extended_ties {
            let cutoff = candidates[final_size - 1].brightness;
            candidates.retain(|c| c.brightness <= cutoff);
        } else {
            candidates.truncate(final_size);
        }
        tracing::debug!(kept = candidates.len(), of = size, "top candidates selected");
        candidates
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn limit(&self, size: usize) -> usize {
        (size as f64 * self.top_percent / 100.0).ceil() as usize
    }
}
