//! OHLCV observation representation.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub instrument: String,
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

impl OhlcvBar {
    /// A bar can only be entered at a strictly positive, finite close.
    pub fn has_tradable_close(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }

    /// Prices and volume (when present) are all finite.
    pub fn is_finite(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .chain(self.volume.as_ref())
            .all(|v| v.is_finite())
    }

    /// Volume as reported, or 0 when the source carried none.
    pub fn volume_or_zero(&self) -> f64 {
        self.volume.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar(close: f64) -> OhlcvBar {
        OhlcvBar {
            instrument: "DOGE".into(),
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            open: 0.0071,
            high: 0.0075,
            low: 0.0069,
            close,
            volume: Some(50_000.0),
        }
    }

    #[test]
    fn tradable_close() {
        assert!(sample_bar(0.0072).has_tradable_close());
        assert!(!sample_bar(0.0).has_tradable_close());
        assert!(!sample_bar(-1.0).has_tradable_close());
        assert!(!sample_bar(f64::NAN).has_tradable_close());
    }

    #[test]
    fn finite_values() {
        assert!(sample_bar(0.0072).is_finite());
        assert!(!sample_bar(f64::NAN).is_finite());

        let mut bar = sample_bar(0.0072);
        bar.volume = Some(f64::INFINITY);
        assert!(!bar.is_finite());
        bar.volume = None;
        assert!(bar.is_finite());
    }

    #[test]
    fn missing_volume_reads_as_zero() {
        let mut bar = sample_bar(1.0);
        assert_eq!(bar.volume_or_zero(), 50_000.0);
        bar.volume = None;
        assert_eq!(bar.volume_or_zero(), 0.0);
    }
}
