use std::time::Duration;

/// `m:ss`, as shown next to the waveform.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", mins, secs)
}

pub fn format_duration(duration: Duration) -> String {
    format_time(duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0.0, "0:00")]
    #[test_case(9.99, "0:09")]
    #[test_case(65.2, "1:05")]
    #[test_case(3600.0, "60:00")]
    #[test_case(f64::NAN, "0:00")]
    fn formats_minutes_and_seconds(seconds: f64, expected: &str) {
        assert_eq!(format_time(seconds), expected);
    }
}
