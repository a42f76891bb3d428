use std::{str::FromStr, time::Duration};

/// Interpret an optional string as a whole number of seconds. Missing, empty or malformed values yield `None`.
pub fn parse_seconds(value: Option<String>) -> Option<Duration> {
    value.and_then(|s| u64::from_str(s.trim()).ok()).map(Duration::from_secs)
}
