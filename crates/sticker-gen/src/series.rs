use crate::types::{Result, StickerError, StickerRecord};
use serde::{Deserialize, Serialize};

/// Numeric range plus formatting rules for numbered stickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberSeriesConfig {
    pub start_number: i64,
    pub end_number: i64,
    pub prefix: String,
    pub suffix: String,
    /// Zero-pad width; 0 disables padding.
    pub padding_length: usize,
    /// QR payload is the bare number, overriding every other rule.
    pub qr_number_only: bool,
    /// Append `?id=<formatted>` to the base QR payload.
    pub include_in_qr: bool,
    /// Append ` #<formatted>` to the display name.
    pub include_in_name: bool,
}

impl Default for NumberSeriesConfig {
    fn default() -> Self {
        Self {
            start_number: 10000,
            end_number: 14000,
            prefix: String::new(),
            suffix: String::new(),
            padding_length: 0,
            qr_number_only: true,
            include_in_qr: true,
            include_in_name: false,
        }
    }
}

impl NumberSeriesConfig {
    pub fn is_valid_range(&self) -> bool {
        self.start_number >= 0 && self.start_number <= self.end_number
    }

    /// Number of records the series expands to. Zero for an invalid range,
    /// saturating at `usize::MAX` for ranges wider than the platform can count.
    pub fn count(&self) -> usize {
        if !self.is_valid_range() {
            return 0;
        }
        usize::try_from(self.end_number.abs_diff(self.start_number))
            .ok()
            .and_then(|span| span.checked_add(1))
            .unwrap_or(usize::MAX)
    }

    pub fn format_number(&self, number: i64) -> String {
        format!(
            "{}{:0>width$}{}",
            self.prefix,
            number,
            self.suffix,
            width = self.padding_length
        )
    }

    /// Strict check for callers that want an error instead of an empty series.
    pub fn validate(&self) -> Result<()> {
        if self.start_number < 0 {
            return Err(StickerError::Config(
                "Start number must be zero or greater".to_string(),
            ));
        }
        if self.start_number > self.end_number {
            return Err(StickerError::Config(format!(
                "Start number {} is greater than end number {}",
                self.start_number, self.end_number
            )));
        }
        Ok(())
    }

    fn qr_payload(&self, base: &StickerRecord, number: i64, formatted: &str) -> String {
        if self.qr_number_only {
            return number.to_string();
        }

        let base_payload = [base.qr_data.as_str(), base.website()]
            .into_iter()
            .find(|candidate| !candidate.is_empty());

        match base_payload {
            Some(payload) if self.include_in_qr => format!("{payload}?id={formatted}"),
            Some(payload) => payload.to_string(),
            None => number.to_string(),
        }
    }

    fn record(&self, base: &StickerRecord, number: i64) -> StickerRecord {
        let formatted = self.format_number(number);
        let name = if self.include_in_name {
            format!("{} #{}", base.name, formatted)
        } else {
            base.name.clone()
        };

        StickerRecord {
            id: format!("sticker-{number}"),
            name,
            qr_data: self.qr_payload(base, number, &formatted),
            number: Some(number),
            formatted_number: Some(formatted),
            ..base.clone()
        }
    }
}

/// Expand `base` into one record per number in the inclusive range.
///
/// An invalid range yields an empty vector.
pub fn generate_series(config: &NumberSeriesConfig, base: &StickerRecord) -> Vec<StickerRecord> {
    if !config.is_valid_range() {
        return Vec::new();
    }
    (config.start_number..=config.end_number)
        .map(|number| config.record(base, number))
        .collect()
}

pub fn series_count(config: &NumberSeriesConfig) -> usize {
    config.count()
}

/// Formatted ids for display: all of them when there are at most five,
/// otherwise the first two, an ellipsis and the last two.
pub fn preview_numbers(config: &NumberSeriesConfig) -> Vec<String> {
    let count = config.count();
    if count == 0 {
        return Vec::new();
    }

    let start = config.start_number;
    let end = config.end_number;
    if count <= 5 {
        return (start..=end).map(|n| config.format_number(n)).collect();
    }

    vec![
        config.format_number(start),
        config.format_number(start + 1),
        "...".to_string(),
        config.format_number(end - 1),
        config.format_number(end),
    ]
}

/// QR payload the first record of the series would carry.
pub fn qr_preview(config: &NumberSeriesConfig, base: &StickerRecord) -> Option<String> {
    if !config.is_valid_range() {
        return None;
    }
    let first = config.start_number;
    Some(config.qr_payload(base, first, &config.format_number(first)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> StickerRecord {
        StickerRecord {
            id: "base".into(),
            name: "Shop".into(),
            phone: "555".into(),
            website: Some("https://shop.example".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_number() {
        let config = NumberSeriesConfig {
            prefix: "A".into(),
            suffix: "-Z".into(),
            padding_length: 4,
            ..Default::default()
        };
        assert_eq!(config.format_number(42), "A0042-Z");
        assert_eq!(config.format_number(123456), "A123456-Z");

        let plain = NumberSeriesConfig::default();
        assert_eq!(plain.format_number(7), "7");
    }

    #[test]
    fn test_count() {
        let mut config = NumberSeriesConfig::default();
        assert_eq!(config.count(), 4001);
        config.start_number = 5;
        config.end_number = 5;
        assert_eq!(config.count(), 1);
        config.start_number = -1;
        assert_eq!(config.count(), 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_count_full_range_does_not_overflow() {
        let config = NumberSeriesConfig {
            start_number: 0,
            end_number: i64::MAX,
            ..Default::default()
        };
        let expected = usize::try_from(i64::MAX as u64 + 1).unwrap_or(usize::MAX);
        assert!(config.is_valid_range());
        assert_eq!(config.count(), expected);
        assert_eq!(series_count(&config), expected);
        assert_eq!(
            preview_numbers(&config),
            vec![
                "0".to_string(),
                "1".to_string(),
                "...".to_string(),
                (i64::MAX - 1).to_string(),
                i64::MAX.to_string(),
            ]
        );

        let top = NumberSeriesConfig {
            start_number: i64::MAX - 1,
            end_number: i64::MAX,
            ..Default::default()
        };
        assert_eq!(top.count(), 2);
        assert_eq!(
            preview_numbers(&top),
            vec![(i64::MAX - 1).to_string(), i64::MAX.to_string()]
        );
    }

    #[test]
    fn test_qr_number_only_overrides() {
        let config = NumberSeriesConfig {
            start_number: 3,
            end_number: 3,
            qr_number_only: true,
            include_in_qr: true,
            ..Default::default()
        };
        let records = generate_series(&config, &base());
        assert_eq!(records[0].qr_data, "3");
    }

    #[test]
    fn test_qr_includes_formatted_id() {
        let config = NumberSeriesConfig {
            start_number: 3,
            end_number: 3,
            prefix: "N".into(),
            padding_length: 2,
            qr_number_only: false,
            include_in_qr: true,
            ..Default::default()
        };
        let records = generate_series(&config, &base());
        assert_eq!(records[0].qr_data, "https://shop.example?id=N03");
    }

    #[test]
    fn test_qr_fallbacks_without_id() {
        let config = NumberSeriesConfig {
            start_number: 9,
            end_number: 9,
            qr_number_only: false,
            include_in_qr: false,
            ..Default::default()
        };
        let explicit = StickerRecord {
            qr_data: "payload".into(),
            ..base()
        };
        assert_eq!(generate_series(&config, &explicit)[0].qr_data, "payload");
        assert_eq!(
            generate_series(&config, &base())[0].qr_data,
            "https://shop.example"
        );

        let bare = StickerRecord {
            website: None,
            ..base()
        };
        assert_eq!(generate_series(&config, &bare)[0].qr_data, "9");
    }

    #[test]
    fn test_name_and_id() {
        let config = NumberSeriesConfig {
            start_number: 1,
            end_number: 2,
            include_in_name: true,
            ..Default::default()
        };
        let records = generate_series(&config, &base());
        assert_eq!(records[0].name, "Shop #1");
        assert_eq!(records[1].id, "sticker-2");
        assert_eq!(records[1].phone, "555");
        assert_eq!(records[1].number, Some(2));
    }

    #[test]
    fn test_preview_numbers() {
        let short = NumberSeriesConfig {
            start_number: 1,
            end_number: 3,
            ..Default::default()
        };
        assert_eq!(preview_numbers(&short), vec!["1", "2", "3"]);

        let long = NumberSeriesConfig::default();
        assert_eq!(
            preview_numbers(&long),
            vec!["10000", "10001", "...", "13999", "14000"]
        );

        let invalid = NumberSeriesConfig {
            start_number: 10,
            end_number: 5,
            ..Default::default()
        };
        assert!(preview_numbers(&invalid).is_empty());
        assert_eq!(qr_preview(&invalid, &base()), None);
    }
}
