use crate::escape::quote;
use crate::flatten::flatten;
use crate::keys::{self, CREATED_AT, DID, VOLUNTEER_LABEL};
use crate::query::{GremlinQuery, Renderer, Rendering};
use volunteer_graph::error::{invalid_input, GraphError};
use volunteer_graph::{PropertyValue, Volunteer};

/// Vertex property cardinality used for each assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Replaces any existing value.
    Single,
    /// Adds the value to the property's set of values.
    Set,
}

impl Cardinality {
    pub fn for_key(key: &str) -> Self {
        if keys::is_multi_valued(key) {
            Cardinality::Set
        } else {
            Cardinality::Single
        }
    }

    fn token(self) -> &'static str {
        match self {
            Cardinality::Single => "single",
            Cardinality::Set => "set",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyStep {
    pub key: &'static str,
    pub value: PropertyValue,
    pub cardinality: Cardinality,
}

/// Find-or-create of one Volunteer vertex, as data.
///
/// `steps` are applied in both branches; `did` and `createdAt` only when the
/// vertex is created. An existing vertex first loses every property outside
/// [`keys::PRESERVED_ON_UPDATE`], so the stored vertex always mirrors the
/// latest entity, lists included.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertTraversal {
    pub label: &'static str,
    pub did: String,
    pub created_at: String,
    pub steps: Vec<PropertyStep>,
}

/// Builds the upsert for a volunteer. Rejects an empty `did`.
pub fn build_upsert(volunteer: &Volunteer) -> Result<UpsertTraversal, GraphError> {
    if volunteer.did.trim().is_empty() {
        return Err(invalid_input("volunteer did must not be empty"));
    }

    let steps = flatten(volunteer)
        .into_iter()
        .filter(|(key, _)| *key != DID && *key != CREATED_AT)
        .map(|(key, value)| PropertyStep {
            key,
            cardinality: Cardinality::for_key(key),
            value,
        })
        .collect();

    Ok(UpsertTraversal {
        label: VOLUNTEER_LABEL,
        did: volunteer.did.clone(),
        created_at: volunteer.created_at.clone(),
        steps,
    })
}

impl UpsertTraversal {
    pub fn render(&self, mode: Rendering) -> GremlinQuery {
        let mut renderer = Renderer::new(mode);

        let did = renderer.value("did_value", &PropertyValue::from(self.did.as_str()));
        let created_at =
            renderer.value("created_at_value", &PropertyValue::from(self.created_at.as_str()));

        let mut steps = String::new();
        for (i, step) in self.steps.iter().enumerate() {
            let key = renderer.key(&format!("k{i}"), step.key);
            let value = renderer.value(&format!("p{i}"), &step.value);
            steps.push_str(&format!(
                ".property({}, {key}, {value})",
                step.cardinality.token()
            ));
        }

        let label = quote(self.label);
        let preserved = keys::PRESERVED_ON_UPDATE
            .iter()
            .map(|key| quote(key))
            .collect::<Vec<_>>()
            .join(", ");
        let text = format!(
            "g.V().hasLabel({label}).has({did_key}, {did}).fold().coalesce(\
             unfold().sideEffect(properties().hasKey(without({preserved})).drop()){steps}, \
             addV({label}).property(single, {did_key}, {did}).property(single, {created_key}, {created_at}){steps}\
             ).id()",
            did_key = quote(DID),
            created_key = quote(CREATED_AT),
        );
        renderer.finish(text)
    }

    pub fn render_inline(&self) -> String {
        self.render(Rendering::Inline).text
    }

    pub fn render_with_bindings(&self) -> GremlinQuery {
        self.render(Rendering::Bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn volunteer() -> Volunteer {
        let mut volunteer = Volunteer::new(
            "did:web:example.com:a",
            "O'Brien",
            "2024-01-01T00:00:00Z",
            "2024-02-01T00:00:00Z",
        );
        volunteer.skills = Some(vec!["Mechanic".into(), "Radio Operator".into()]);
        volunteer
    }

    #[test]
    fn test_empty_did_is_rejected() {
        let mut v = volunteer();
        v.did = "  ".into();
        assert!(matches!(build_upsert(&v), Err(GraphError::InvalidInput(_))));
    }

    #[test]
    fn test_steps_skip_did_and_created_at() {
        let upsert = build_upsert(&volunteer()).unwrap();
        let keys: Vec<_> = upsert.steps.iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["name", "skills", "skills", "updatedAt"]);
        assert_eq!(upsert.steps[0].cardinality, Cardinality::Single);
        assert_eq!(upsert.steps[1].cardinality, Cardinality::Set);
        assert_eq!(upsert.steps[2].cardinality, Cardinality::Set);
    }

    #[test]
    fn test_render_inline() {
        let text = build_upsert(&volunteer()).unwrap().render_inline();
        let steps = ".property(single, 'name', 'O\\'Brien')\
                     .property(set, 'skills', 'Mechanic')\
                     .property(set, 'skills', 'Radio Operator')\
                     .property(single, 'updatedAt', '2024-02-01T00:00:00Z')";
        let expected = format!(
            "g.V().hasLabel('Volunteer').has('did', 'did:web:example.com:a').fold().coalesce(\
             unfold().sideEffect(properties().hasKey(without('did', 'createdAt')).drop()){steps}, \
             addV('Volunteer').property(single, 'did', 'did:web:example.com:a')\
             .property(single, 'createdAt', '2024-01-01T00:00:00Z'){steps}).id()"
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_update_branch_never_sets_created_at() {
        let text = build_upsert(&volunteer()).unwrap().render_inline();
        let (update_branch, create_branch) = text.split_once("addV(").unwrap();
        assert!(!update_branch.contains(".property(single, 'createdAt'"));
        assert!(create_branch.contains(".property(single, 'createdAt'"));
        assert!(update_branch.contains("'updatedAt'"));
        assert!(create_branch.contains("'updatedAt'"));
    }

    #[test]
    fn test_update_branch_clears_before_rewriting() {
        let text = build_upsert(&volunteer()).unwrap().render_inline();
        let (update_branch, create_branch) = text.split_once("addV(").unwrap();
        let clear = "unfold().sideEffect(properties().hasKey(without('did', 'createdAt')).drop())";
        let clear_at = update_branch.find(clear).unwrap();
        let first_step = update_branch.find(".property(").unwrap();
        assert!(clear_at < first_step);
        assert!(!create_branch.contains("drop()"));
    }

    #[test]
    fn test_render_is_textually_stable() {
        let a = build_upsert(&volunteer()).unwrap().render_inline();
        let b = build_upsert(&volunteer()).unwrap().render_inline();
        assert_eq!(a, b);
    }

    #[test]
    fn test_render_with_bindings() {
        let query = build_upsert(&volunteer()).unwrap().render_with_bindings();
        assert!(query
            .text
            .starts_with("g.V().hasLabel('Volunteer').has('did', did_value).fold()"));
        assert!(query.text.contains(".property(set, k1, p1).property(set, k2, p2)"));
        assert!(!query.text.contains("Mechanic"));

        let bindings = query.bindings.unwrap();
        assert_eq!(bindings["did_value"], json!("did:web:example.com:a"));
        assert_eq!(bindings["created_at_value"], json!("2024-01-01T00:00:00Z"));
        assert_eq!(bindings["k0"], json!("name"));
        assert_eq!(bindings["p0"], json!("O'Brien"));
        assert_eq!(bindings["p2"], json!("Radio Operator"));
    }
}
