use serde::{Deserialize, Serialize};

/// An amount of time as the user enters it: whole hours plus minutes.
/// Minutes are expected to be below 60 but nothing enforces it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub hours: u32,
    pub minutes: u32,
}

impl TimeSpan {
    pub fn new(hours: u32, minutes: u32) -> TimeSpan {
        TimeSpan { hours, minutes }
    }

    /// Build a span from raw user input, where anything that is not a number counts as 0.
    pub fn parse(hours: &str, minutes: &str) -> TimeSpan {
        TimeSpan::new(parse_count(hours), parse_count(minutes))
    }

    pub fn from_minutes(total: u32) -> TimeSpan {
        let (hours, minutes) = to_hours_and_minutes(total);
        TimeSpan { hours, minutes }
    }

    pub fn total_minutes(&self) -> u32 {
        to_minutes(self.hours, self.minutes)
    }

    pub fn is_zero(&self) -> bool {
        self.total_minutes() == 0
    }

    pub fn fmt_short(&self) -> String {
        format_duration(self.hours, self.minutes)
    }
}

/// Total minutes in the given hours and minutes.
pub fn to_minutes(hours: u32, minutes: u32) -> u32 {
    hours.saturating_mul(60).saturating_add(minutes)
}

/// Split a number of minutes into whole hours and the remaining minutes.
pub fn to_hours_and_minutes(total_minutes: u32) -> (u32, u32) {
    (total_minutes / 60, total_minutes % 60)
}

/// Read a count the way a number input field would be read: the leading
/// digits are used and anything unreadable is 0. Too large counts saturate.
pub fn parse_count(text: &str) -> u32 {
    let digits: String = text
        .trim_start()
        .trim_start_matches('+')
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse::<u32>().unwrap_or(u32::MAX)
}

/// Format hours and minutes as "2h 30m", "2h", "45m" or "0m".
pub fn format_duration(hours: u32, minutes: u32) -> String {
    if hours == 0 && minutes == 0 {
        return String::from("0m");
    }
    let mut text = String::new();
    if hours > 0 {
        text.push_str(&format!("{}h ", hours));
    }
    if minutes > 0 {
        text.push_str(&format!("{}m", minutes));
    }
    text.trim().to_string()
}

/// Label of an hourly slot in 12 hour format, e.g. "9:00 AM".
pub fn format_hour(hour: u32) -> String {
    let period = if hour >= 12 { "PM" } else { "AM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:00 {}", display_hour, period)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(0, 0), "0m");
        assert_eq!(format_duration(2, 0), "2h");
        assert_eq!(format_duration(0, 45), "45m");
        assert_eq!(format_duration(1, 30), "1h 30m");
        assert_eq!(format_duration(0, 30), "30m");
    }

    #[test]
    fn minutes_split_back_into_the_same_total() {
        for total in [0u32, 1, 59, 60, 61, 90, 599, 1440] {
            let (hours, minutes) = to_hours_and_minutes(total);
            assert!(minutes < 60);
            assert_eq!(to_minutes(hours, minutes), total);
        }
        let (hours, minutes) = to_hours_and_minutes(to_minutes(3, 15));
        assert_eq!((hours, minutes), (3, 15));
    }

    #[test]
    fn unnormalized_minutes_still_add_up() {
        assert_eq!(to_minutes(0, 90), 90);
        assert_eq!(TimeSpan::new(1, 75).total_minutes(), 135);
        assert_eq!(TimeSpan::from_minutes(135), TimeSpan::new(2, 15));
    }

    #[test]
    fn unreadable_counts_become_zero() {
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("abc"), 0);
        assert_eq!(parse_count("-3"), 0);
        assert_eq!(parse_count("  12"), 12);
        assert_eq!(parse_count("7.5"), 7);
        assert_eq!(parse_count("30m"), 30);
        assert_eq!(TimeSpan::parse("x", "45"), TimeSpan::new(0, 45));
    }

    #[test]
    fn huge_values_do_not_overflow() {
        assert_eq!(to_minutes(u32::MAX, 10), u32::MAX);
        assert_eq!(parse_count("99999999999999"), u32::MAX);
    }

    #[test]
    fn formats_slot_hours() {
        assert_eq!(format_hour(9), "9:00 AM");
        assert_eq!(format_hour(12), "12:00 PM");
        assert_eq!(format_hour(17), "5:00 PM");
        assert_eq!(format_hour(0), "12:00 AM");
    }
}
