//! Congress / session / calendar-year arithmetic.
//!
//! A Congress spans two calendar years starting in odd years: the 1st Congress
//! first met in 1789, so Congress `n` starts in `1787 + 2n`. The House feed is
//! organised by calendar year while the Senate feed is organised by session of
//! Congress, so callers may hand us either and we convert.

/// First calendar year of `congress`.
#[must_use]
pub const fn first_year(congress: u16) -> i32 {
    1787 + 2 * congress as i32
}

/// Congress sitting in `year` (the one whose first or second year it is).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const fn congress_for_year(year: i32) -> Option<u16> {
    if year < 1789 {
        return None;
    }
    let congress = (year - 1787) / 2;
    if congress > u16::MAX as i32 {
        return None;
    }
    Some(congress as u16)
}

/// Session number (1 or 2) that `year` falls in for `congress`.
#[must_use]
pub const fn session_for_year(congress: u16, year: i32) -> Option<u8> {
    match year.checked_sub(first_year(congress)) {
        Some(0) => Some(1),
        Some(1) => Some(2),
        _ => None,
    }
}

/// Calendar year of `session` (1 or 2) of `congress`.
#[must_use]
pub const fn year_for_session(congress: u16, session: u8) -> Option<i32> {
    match session {
        1 | 2 => Some(first_year(congress) + session as i32 - 1),
        _ => None,
    }
}
