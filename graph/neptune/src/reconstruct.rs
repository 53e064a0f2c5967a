use crate::graphson::VertexProperties;
use crate::keys;
use log::warn;
use volunteer_graph::error::{data_integrity, GraphError};
use volunteer_graph::{DateRange, History, Preferences, Times, Volunteer};

struct Reader<'a> {
    vertex: &'a VertexProperties,
}

impl Reader<'_> {
    fn text(&self, key: &str) -> Option<String> {
        self.vertex.single(key).and_then(|value| value.to_text())
    }

    fn texts(&self, key: &str) -> Option<Vec<String>> {
        let values = self.vertex.list(key)?;
        let mut texts = Vec::with_capacity(values.len());
        for value in values {
            match value.to_text() {
                Some(text) => texts.push(text),
                None => warn!("Ignoring null entry in {key}"),
            }
        }
        (!texts.is_empty()).then_some(texts)
    }

    /// Reads one of the date arrays, restoring list order from the stored
    /// positions. Arrays written without positions are taken in stored order.
    fn date_column(&self, key: &str) -> Result<Option<Vec<String>>, GraphError> {
        let Some(values) = self.vertex.list(key) else {
            return Ok(None);
        };
        let texts = values
            .iter()
            .map(|value| {
                value
                    .to_text()
                    .ok_or_else(|| data_integrity(format!("{key} has a null entry")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if texts.is_empty() {
            return Ok(None);
        }

        let positioned: Vec<(usize, &str)> = texts
            .iter()
            .filter_map(|text| keys::split_position(text))
            .collect();
        if positioned.is_empty() {
            return Ok(Some(texts));
        }
        if positioned.len() != texts.len() {
            return Err(data_integrity(format!(
                "{key} mixes positioned and unpositioned entries"
            )));
        }

        let mut slots: Vec<Option<String>> = vec![None; texts.len()];
        for (index, date) in positioned {
            match slots.get_mut(index) {
                Some(slot) if slot.is_none() => *slot = Some(date.to_string()),
                _ => {
                    return Err(data_integrity(format!(
                        "{key} has an out-of-range or repeated position {index}"
                    )))
                }
            }
        }
        // Every slot is filled: n distinct indices below n.
        Ok(Some(slots.into_iter().flatten().collect()))
    }

    fn integer(&self, key: &str) -> Option<i64> {
        let value = self.vertex.single(key)?;
        let parsed = value.as_i64();
        if parsed.is_none() {
            warn!("Ignoring non-integer value {value} for {key}");
        }
        parsed
    }

    fn number(&self, key: &str) -> Option<f64> {
        let value = self.vertex.single(key)?;
        let parsed = value.as_f64();
        if parsed.is_none() {
            warn!("Ignoring non-numeric value {value} for {key}");
        }
        parsed
    }

    fn boolean(&self, key: &str) -> Option<bool> {
        let value = self.vertex.single(key)?;
        let parsed = value.as_bool();
        if parsed.is_none() {
            warn!("Ignoring non-boolean value {value} for {key}");
        }
        parsed
    }

    fn dates(&self) -> Result<Option<Vec<DateRange>>, GraphError> {
        let starts = self.date_column(keys::PREFERENCES_DATES_START_DATES)?;
        let ends = self.date_column(keys::PREFERENCES_DATES_END_DATES)?;
        match (starts, ends) {
            (None, None) => Ok(None),
            (Some(starts), Some(ends)) if starts.len() == ends.len() => Ok(Some(
                starts
                    .into_iter()
                    .zip(ends)
                    .map(|(start, end)| DateRange::new(start, end))
                    .collect(),
            )),
            (starts, ends) => Err(data_integrity(format!(
                "{} has {} entries but {} has {}",
                keys::PREFERENCES_DATES_START_DATES,
                starts.map_or(0, |s| s.len()),
                keys::PREFERENCES_DATES_END_DATES,
                ends.map_or(0, |e| e.len()),
            ))),
        }
    }

    fn times(&self) -> Option<Times> {
        let times = Times {
            hours: self.texts(keys::PREFERENCES_TIMES_HOURS),
            days: self.texts(keys::PREFERENCES_TIMES_DAYS),
            max_duration_hours: self.integer(keys::PREFERENCES_TIMES_MAX_DURATION_HOURS),
            commitment: self.text(keys::PREFERENCES_TIMES_COMMITMENT),
        };
        (times != Times::default()).then_some(times)
    }

    fn preferences(&self) -> Result<Option<Preferences>, GraphError> {
        let prefs = Preferences {
            max_distance_km: self.number(keys::PREFERENCES_MAX_DISTANCE_KM),
            causes: self.texts(keys::PREFERENCES_CAUSES),
            presence: self.texts(keys::PREFERENCES_PRESENCE),
            times: self.times(),
            dates: self.dates()?,
        };
        Ok((prefs != Preferences::default()).then_some(prefs))
    }

    fn history(&self) -> Option<History> {
        let history = History {
            since: self
                .vertex
                .single(keys::HISTORY_SINCE)
                .map(|value| value.to_json())
                .filter(|since| !since.is_null()),
            activities: self.integer(keys::HISTORY_ACTIVITIES),
            organizations: self.texts(keys::HISTORY_ORGANIZATIONS),
        };
        (history != History::default()).then_some(history)
    }
}

/// Rebuilds a volunteer from one vertex's property map.
///
/// Returns `Ok(None)` when the vertex has no `did`. Missing `name` or
/// timestamps read as empty strings. Nested groups are attached only when at
/// least one of their fields was stored.
pub fn reconstruct(vertex: &VertexProperties) -> Result<Option<Volunteer>, GraphError> {
    let reader = Reader { vertex };
    let Some(did) = reader.text(keys::DID) else {
        return Ok(None);
    };

    Ok(Some(Volunteer {
        did,
        name: reader.text(keys::NAME).unwrap_or_default(),
        created_at: reader.text(keys::CREATED_AT).unwrap_or_default(),
        updated_at: reader.text(keys::UPDATED_AT).unwrap_or_default(),
        description: reader.text(keys::DESCRIPTION),
        postcode: reader.text(keys::POSTCODE),
        skills: reader.texts(keys::SKILLS),
        age: reader.integer(keys::AGE),
        minor: reader.boolean(keys::MINOR),
        gender: reader.text(keys::GENDER),
        languages: reader.texts(keys::LANGUAGES),
        preferences: reader.preferences()?,
        history: reader.history(),
    }))
}

/// Reconstructs every vertex, dropping those without a `did`.
pub fn reconstruct_all(vertices: &[VertexProperties]) -> Result<Vec<Volunteer>, GraphError> {
    let mut volunteers = Vec::with_capacity(vertices.len());
    for vertex in vertices {
        match reconstruct(vertex)? {
            Some(volunteer) => volunteers.push(volunteer),
            None => warn!("Skipping vertex {:?} without a did", vertex.id),
        }
    }
    Ok(volunteers)
}
