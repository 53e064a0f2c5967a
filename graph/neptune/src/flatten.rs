use crate::keys;
use volunteer_graph::{History, Preferences, PropertyValue, Times, Volunteer};

/// One property assignment on the Volunteer vertex. List fields produce one
/// entry per item under the same key.
pub type FlatProperty = (&'static str, PropertyValue);

struct Flattener {
    out: Vec<FlatProperty>,
}

impl Flattener {
    fn scalar(&mut self, key: &'static str, value: Option<impl Into<PropertyValue>>) {
        if let Some(value) = value {
            self.out.push((key, value.into()));
        }
    }

    fn list<'a>(&mut self, key: &'static str, items: impl IntoIterator<Item = &'a String>) {
        self.out
            .extend(items.into_iter().map(|item| (key, PropertyValue::from(item.as_str()))));
    }

    fn optional_list(&mut self, key: &'static str, items: Option<&Vec<String>>) {
        if let Some(items) = items {
            self.list(key, items);
        }
    }

    fn preferences(&mut self, prefs: &Preferences) {
        self.scalar(keys::PREFERENCES_MAX_DISTANCE_KM, prefs.max_distance_km);
        self.optional_list(keys::PREFERENCES_CAUSES, prefs.causes.as_ref());
        self.optional_list(keys::PREFERENCES_PRESENCE, prefs.presence.as_ref());
        if let Some(times) = &prefs.times {
            self.times(times);
        }
        if let Some(dates) = prefs.dates.as_ref().filter(|dates| !dates.is_empty()) {
            self.positional(
                keys::PREFERENCES_DATES_START_DATES,
                dates.iter().map(|range| &range.start_date),
            );
            self.positional(
                keys::PREFERENCES_DATES_END_DATES,
                dates.iter().map(|range| &range.end_date),
            );
        }
    }

    fn positional<'a>(&mut self, key: &'static str, items: impl IntoIterator<Item = &'a String>) {
        self.out.extend(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| (key, PropertyValue::from(keys::with_position(i, item)))),
        );
    }

    fn times(&mut self, times: &Times) {
        self.optional_list(keys::PREFERENCES_TIMES_HOURS, times.hours.as_ref());
        self.optional_list(keys::PREFERENCES_TIMES_DAYS, times.days.as_ref());
        self.scalar(
            keys::PREFERENCES_TIMES_MAX_DURATION_HOURS,
            times.max_duration_hours,
        );
        self.scalar(keys::PREFERENCES_TIMES_COMMITMENT, times.commitment.clone());
    }

    fn history(&mut self, history: &History) {
        let since = history.since.clone().filter(|since| !since.is_null());
        self.scalar(keys::HISTORY_SINCE, since.map(PropertyValue::from));
        self.scalar(keys::HISTORY_ACTIVITIES, history.activities);
        self.optional_list(keys::HISTORY_ORGANIZATIONS, history.organizations.as_ref());
    }
}

/// Flattens a volunteer into ordered vertex property assignments.
///
/// The order is fixed by field declaration, so the same entity always yields
/// the same sequence. Absent fields, `null` history values and empty lists
/// produce nothing.
pub fn flatten(volunteer: &Volunteer) -> Vec<FlatProperty> {
    let mut flattener = Flattener { out: Vec::new() };

    flattener.scalar(keys::DID, Some(volunteer.did.as_str()));
    flattener.scalar(keys::NAME, Some(volunteer.name.as_str()));
    flattener.scalar(keys::DESCRIPTION, volunteer.description.as_deref());
    flattener.scalar(keys::POSTCODE, volunteer.postcode.as_deref());
    flattener.optional_list(keys::SKILLS, volunteer.skills.as_ref());
    flattener.scalar(keys::AGE, volunteer.age);
    flattener.scalar(keys::MINOR, volunteer.minor);
    flattener.scalar(keys::GENDER, volunteer.gender.as_deref());
    flattener.optional_list(keys::LANGUAGES, volunteer.languages.as_ref());
    flattener.scalar(keys::CREATED_AT, Some(volunteer.created_at.as_str()));
    flattener.scalar(keys::UPDATED_AT, Some(volunteer.updated_at.as_str()));

    if let Some(prefs) = &volunteer.preferences {
        flattener.preferences(prefs);
    }
    if let Some(history) = &volunteer.history {
        flattener.history(history);
    }

    flattener.out
}
