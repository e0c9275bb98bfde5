use once_cell::sync::Lazy;
use regex::Regex;

// 学段格式：年份 + 学期序号，如 2025-S1
static PERIOD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-S[12]$").expect("Invalid period regex"));

pub fn validate_period(period: &str) -> Result<(), &'static str> {
    if !PERIOD_RE.is_match(period) {
        return Err("Period must be in YYYY-S1 or YYYY-S2 format");
    }
    Ok(())
}

/// 排期日期："YYYY-MM-DD"
pub fn validate_schedule_date(date: &str) -> Result<(), &'static str> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| "Scheduled date must be in YYYY-MM-DD format")
}

/// 排期时间："HH:MM"
pub fn validate_schedule_time(time: &str) -> Result<(), &'static str> {
    chrono::NaiveTime::parse_from_str(time, "%H:%M")
        .map(|_| ())
        .map_err(|_| "Scheduled time must be in HH:MM format")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_period() {
        assert!(validate_period("2025-S1").is_ok());
        assert!(validate_period("2026-S2").is_ok());
    }

    #[test]
    fn test_invalid_period() {
        assert!(validate_period("2025").is_err());
        assert!(validate_period("2025-S3").is_err());
        assert!(validate_period("25-S1").is_err());
        assert!(validate_period("2025-s1").is_err());
    }

    #[test]
    fn test_schedule_date() {
        assert!(validate_schedule_date("2025-08-10").is_ok());
        assert!(validate_schedule_date("2025-13-10").is_err());
        assert!(validate_schedule_date("10/08/2025").is_err());
    }

    #[test]
    fn test_schedule_time() {
        assert!(validate_schedule_time("09:30").is_ok());
        assert!(validate_schedule_time("25:00").is_err());
        assert!(validate_schedule_time("9am").is_err());
    }
}
