use thiserror::Error;

use crate::model::entity::Video;

/// Why a duration string was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected `M:SS` or `MM:SS`")]
    MissingColon,
    #[error("minutes are not a number")]
    InvalidMinutes,
    #[error("minutes are out of range")]
    MinutesOverflow,
    #[error("seconds must be two digits")]
    InvalidSeconds,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid duration {value:?} of video #{index}: {kind}")]
pub struct ParseError {
    index: usize,
    value: String,
    kind: ParseErrorKind,
}

impl ParseError {
    /// Position of the offending entry in the input sequence.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }
}

/// Whole minutes of a single `M:SS` duration.
///
/// Seconds are floored away (`"4:45"` is 4 minutes). Every duration shown in
/// the app is computed this way.
pub fn duration_minutes(duration: &str) -> Result<u32, ParseErrorKind> {
    let (minutes, seconds) = duration
        .trim()
        .split_once(':')
        .ok_or(ParseErrorKind::MissingColon)?;

    if minutes.is_empty() || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseErrorKind::InvalidMinutes);
    }
    if seconds.len() != 2 || !seconds.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseErrorKind::InvalidSeconds);
    }

    // only digits are left, so a failed parse means too many of them
    let minutes: u32 = minutes.parse().map_err(|_| ParseErrorKind::MinutesOverflow)?;
    let seconds: u32 = seconds.parse().map_err(|_| ParseErrorKind::InvalidSeconds)?;

    Ok(minutes.saturating_add(seconds / 60))
}

/// Sum of [`duration_minutes`] over `durations`.
///
/// Fails on the first malformed entry instead of counting it as zero.
pub fn total_duration_minutes<I, S>(durations: I) -> Result<u32, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    durations
        .into_iter()
        .enumerate()
        .try_fold(0u32, |total, (index, duration)| {
            let duration = duration.as_ref();
            let minutes = duration_minutes(duration).map_err(|kind| ParseError {
                index,
                value: duration.to_string(),
                kind,
            })?;
            Ok(total.saturating_add(minutes))
        })
}

/// Total minutes of a module's lessons.
pub fn videos_duration_minutes(videos: &[Video]) -> Result<u32, ParseError> {
    total_duration_minutes(videos.iter().map(Video::duration))
}
