//! Vertex label and flat property names shared by both directions of the codec.
//!
//! Nested fields are stored under dotted paths such as `preferences.times.hours`.

pub const VOLUNTEER_LABEL: &str = "Volunteer";

pub const DID: &str = "did";
pub const NAME: &str = "name";
pub const DESCRIPTION: &str = "description";
pub const POSTCODE: &str = "postcode";
pub const SKILLS: &str = "skills";
pub const AGE: &str = "age";
pub const MINOR: &str = "minor";
pub const GENDER: &str = "gender";
pub const LANGUAGES: &str = "languages";
pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";

pub const PREFERENCES_MAX_DISTANCE_KM: &str = "preferences.maxDistanceKm";
pub const PREFERENCES_CAUSES: &str = "preferences.causes";
pub const PREFERENCES_PRESENCE: &str = "preferences.presence";
pub const PREFERENCES_TIMES_HOURS: &str = "preferences.times.hours";
pub const PREFERENCES_TIMES_DAYS: &str = "preferences.times.days";
pub const PREFERENCES_TIMES_MAX_DURATION_HOURS: &str = "preferences.times.maxDurationHours";
pub const PREFERENCES_TIMES_COMMITMENT: &str = "preferences.times.commitment";
pub const PREFERENCES_DATES_START_DATES: &str = "preferences.dates.startDates";
pub const PREFERENCES_DATES_END_DATES: &str = "preferences.dates.endDates";

pub const HISTORY_SINCE: &str = "history.since";
pub const HISTORY_ACTIVITIES: &str = "history.activities";
pub const HISTORY_ORGANIZATIONS: &str = "history.organizations";

/// Keys whose values are lists in the domain model. Every other key is read
/// back as a single value.
pub const MULTI_VALUED_KEYS: &[&str] = &[
    SKILLS,
    LANGUAGES,
    PREFERENCES_CAUSES,
    PREFERENCES_PRESENCE,
    PREFERENCES_TIMES_HOURS,
    PREFERENCES_TIMES_DAYS,
    PREFERENCES_DATES_START_DATES,
    PREFERENCES_DATES_END_DATES,
    HISTORY_ORGANIZATIONS,
];

pub fn is_multi_valued(key: &str) -> bool {
    MULTI_VALUED_KEYS.contains(&key)
}

/// Keys an update never touches. Every other property is rewritten.
pub const PRESERVED_ON_UPDATE: &[&str] = &[DID, CREATED_AT];

/// Keys whose values carry their list position, so equal dates in different
/// ranges stay distinct under set cardinality and the arrays zip back in order.
pub const POSITIONAL_KEYS: &[&str] = &[PREFERENCES_DATES_START_DATES, PREFERENCES_DATES_END_DATES];

const POSITION_SEPARATOR: char = '|';

pub fn is_positional(key: &str) -> bool {
    POSITIONAL_KEYS.contains(&key)
}

/// Stores `value` as `{index}|{value}`.
pub fn with_position(index: usize, value: &str) -> String {
    format!("{index}{POSITION_SEPARATOR}{value}")
}

/// Splits a positional value back into its index and payload.
pub fn split_position(stored: &str) -> Option<(usize, &str)> {
    let (index, value) = stored.split_once(POSITION_SEPARATOR)?;
    Some((index.parse().ok()?, value))
}
