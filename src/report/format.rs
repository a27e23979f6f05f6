//! Locale-aware number and date formatting for exports.

use crate::config::FormatConfig;
use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Formatting settings passed explicitly to every exporter.
#[derive(Debug, Clone)]
pub struct Formatter {
    decimal_separator: String,
    thousands_separator: String,
    offset: FixedOffset,
    timestamp_pattern: String,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::from(&FormatConfig::default())
    }
}

impl From<&FormatConfig> for Formatter {
    fn from(config: &FormatConfig) -> Self {
        let offset = config
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());

        Self {
            decimal_separator: config.decimal_separator.clone(),
            thousands_separator: config.thousands_separator.clone(),
            offset,
            timestamp_pattern: config.timestamp_pattern.clone(),
        }
    }
}

impl Formatter {
    /// Format `value` with `decimals` fraction digits and grouped thousands.
    pub fn number(&self, value: f64, decimals: usize) -> String {
        let factor = 10f64.powi(decimals as i32);
        let rounded = (value * factor).round() / factor;
        let digits = format!("{:.*}", decimals, rounded.abs());

        let (int_part, frac_part) = match digits.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (digits.as_str(), None),
        };

        let mut out = String::new();
        if rounded < 0.0 {
            out.push('-');
        }
        out.push_str(&group_thousands(int_part, &self.thousands_separator));
        if let Some(frac_part) = frac_part {
            out.push_str(&self.decimal_separator);
            out.push_str(frac_part);
        }
        out
    }

    /// Percentage with one decimal, e.g. `33,3%`. `share` is between 0 and 1.
    pub fn percent(&self, share: f64) -> String {
        format!("{}%", self.number(share * 100.0, 1))
    }

    /// Average with two decimals.
    pub fn average(&self, average: f64) -> String {
        self.number(average, 2)
    }

    /// Timestamp in the report timezone.
    pub fn timestamp(&self, at: &DateTime<Utc>) -> String {
        at.with_timezone(&self.offset)
            .format(&self.timestamp_pattern)
            .to_string()
    }

    /// Compact timestamp used in file names.
    pub fn file_stamp(&self, at: &DateTime<Utc>) -> String {
        at.with_timezone(&self.offset)
            .format("%Y%m%d-%H%M%S")
            .to_string()
    }
}

fn group_thousands(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

/// URL-style slug: lowercase ASCII letters and digits joined by dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// File name for an export: `{prefix}-{slug}-{YYYYmmdd-HHMMSS}.{extension}`.
pub fn export_file_name(
    prefix: &str,
    survey_title: &str,
    extension: &str,
    formatter: &Formatter,
    at: &DateTime<Utc>,
) -> String {
    let slug = match slugify(survey_title) {
        slug if slug.is_empty() => "survei".to_string(),
        slug => slug,
    };
    format!("{}-{}-{}.{}", prefix, slug, formatter.file_stamp(at), extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_number_formatting() {
        let f = Formatter::default();
        assert_eq!(f.number(1234567.891, 2), "1.234.567,89");
        assert_eq!(f.number(33.3333, 1), "33,3");
        assert_eq!(f.number(0.0, 1), "0,0");
        assert_eq!(f.number(100.0, 0), "100");
        assert_eq!(f.number(-1500.5, 1), "-1.500,5");
    }

    #[test]
    fn test_custom_separators() {
        let config = FormatConfig {
            decimal_separator: ".".to_string(),
            thousands_separator: ",".to_string(),
            ..FormatConfig::default()
        };
        let f = Formatter::from(&config);
        assert_eq!(f.number(4321.5, 2), "4,321.50");
        assert_eq!(f.percent(0.5), "50.0%");
    }

    #[test]
    fn test_percent_and_average() {
        let f = Formatter::default();
        assert_eq!(f.percent(2.0 / 3.0), "66,7%");
        assert_eq!(f.average(3.456), "3,46");
    }

    #[test]
    fn test_timestamp_uses_offset() {
        let f = Formatter::default();
        let at = Utc.with_ymd_and_hms(2025, 9, 23, 20, 30, 0).unwrap();
        assert_eq!(f.timestamp(&at), "24-09-2025 03:30");
        assert_eq!(f.file_stamp(&at), "20250924-033000");
    }

    #[test]
    fn test_out_of_range_offset_falls_back_to_utc() {
        let at = Utc.with_ymd_and_hms(2025, 9, 23, 20, 30, 0).unwrap();
        for minutes in [40_000_000, i32::MIN, 24 * 60] {
            let config = FormatConfig {
                utc_offset_minutes: minutes,
                ..FormatConfig::default()
            };
            let f = Formatter::from(&config);
            assert_eq!(f.timestamp(&at), "23-09-2025 20:30");
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Survei Kepuasan Pelanggan 2025!"), "survei-kepuasan-pelanggan-2025");
        assert_eq!(slugify("  --Hello__World--  "), "hello-world");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn test_export_file_name() {
        let f = Formatter::default();
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            export_file_name("analitik", "Kepuasan Layanan", "html", &f, &at),
            "analitik-kepuasan-layanan-20250102-100405.html"
        );
        assert_eq!(
            export_file_name("analitik", "", "json", &f, &at),
            "analitik-survei-20250102-100405.json"
        );
    }
}
