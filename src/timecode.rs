//! Display string + whole-second timestamps.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// A `(display string, whole seconds)` pair.
///
/// Durations read from the video tool keep the exact text it printed
/// (e.g. `"01:30:00"`); timecodes built from seconds are rendered as
/// `H:MM:SS`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Timecode {
    text: String,
    seconds: u64,
}

impl Timecode {
    /// Build a timecode from a number of seconds.
    pub fn from_seconds(seconds: u64) -> Self {
        let text = format!(
            "{}:{:02}:{:02}",
            seconds / 3600,
            (seconds / 60) % 60,
            seconds % 60
        );
        Self { text, seconds }
    }

    /// Parse `H:MM:SS` / `HH:MM:SS`, keeping `text` as the display form.
    pub fn parse_hms(text: &str) -> Option<Self> {
        let mut parts = text.split(':');
        let hours: u64 = parts.next()?.parse().ok()?;
        let minutes: u64 = parts.next()?.parse().ok()?;
        let seconds: u64 = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }

        Some(Self {
            text: text.to_string(),
            seconds: hours * 3600 + minutes * 60 + seconds,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }
}

impl Display for Timecode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::Timecode;

    #[test]
    fn from_seconds_pads_minutes_and_seconds() {
        assert_eq!(Timecode::from_seconds(0).as_str(), "0:00:00");
        assert_eq!(Timecode::from_seconds(67).as_str(), "0:01:07");
        assert_eq!(Timecode::from_seconds(3 * 3600 + 5).as_str(), "3:00:05");
    }

    #[test]
    fn parse_hms_keeps_original_text() {
        let timecode = Timecode::parse_hms("01:30:15").unwrap();
        assert_eq!(timecode.seconds(), 5415);
        assert_eq!(timecode.to_string(), "01:30:15");

        assert!(Timecode::parse_hms("1:30").is_none());
        assert!(Timecode::parse_hms("a:00:00").is_none());
    }
}
