// Renderer module - formatting utilities
// Layout decides where things go; these decide how values read on screen

use chrono::{DateTime, Local, Utc};

/// Format a churn probability as a percentage
pub fn format_probability(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

/// Human-readable name for a model feature
///
/// Drops the `cat__` / `num__` encoder prefixes and turns underscores into
/// spaces: `cat__Contract_Month-to-month` -> `Contract Month-to-month`.
pub fn format_factor_name(raw: &str) -> String {
    let name = raw
        .strip_prefix("cat__")
        .or_else(|| raw.strip_prefix("num__"))
        .unwrap_or(raw);
    name.replace('_', " ")
}

/// Signed factor weight, e.g. `+0.412` / `-0.087`
pub fn format_weight(weight: f64) -> String {
    format!("{:+.3}", weight)
}

/// Bucket keys for 0/1-coded attributes read as No/Yes
pub fn format_bucket_label(key: &str) -> String {
    match key {
        "0" => "No".to_string(),
        "1" => "Yes".to_string(),
        other => other.to_string(),
    }
}

/// Local wall-clock time of a scoring response
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Fixed-width text bar for a 0..=1 ratio
pub fn format_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_probability() {
        assert_eq!(format_probability(0.0), "0.0%");
        assert_eq!(format_probability(0.4567), "45.7%");
        assert_eq!(format_probability(1.0), "100.0%");
    }

    #[test]
    fn test_format_factor_name() {
        assert_eq!(format_factor_name("cat__Contract_Month-to-month"), "Contract Month-to-month");
        assert_eq!(format_factor_name("num__tenure"), "tenure");
        assert_eq!(format_factor_name("MonthlyCharges"), "MonthlyCharges");
    }

    #[test]
    fn test_format_bucket_label() {
        assert_eq!(format_bucket_label("0"), "No");
        assert_eq!(format_bucket_label("1"), "Yes");
        assert_eq!(format_bucket_label("Fiber optic"), "Fiber optic");
    }

    #[test]
    fn test_format_weight_and_bar() {
        assert_eq!(format_weight(0.4123), "+0.412");
        assert_eq!(format_weight(-0.0871), "-0.087");
        assert_eq!(format_bar(0.5, 4), "██░░");
        assert_eq!(format_bar(1.7, 3), "███");
        assert_eq!(format_bar(-1.0, 2), "░░");
    }
}
