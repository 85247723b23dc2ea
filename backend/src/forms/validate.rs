//! Stage-completeness check used to gate advancing a multi-stage form.

use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::form::FormState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageCheck {
    Complete,
    Missing { field: String },
}

impl StageCheck {
    pub fn is_complete(&self) -> bool {
        matches!(self, StageCheck::Complete)
    }
}

impl Serialize for StageCheck {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StageCheck::Complete => {
                let mut s = serializer.serialize_struct("StageCheck", 1)?;
                s.serialize_field("success", &true)?;
                s.end()
            }
            StageCheck::Missing { field } => {
                let mut s = serializer.serialize_struct("StageCheck", 2)?;
                s.serialize_field("success", &false)?;
                s.serialize_field("field", field)?;
                s.end()
            }
        }
    }
}

/// What counts as "set" for a required field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPresence {
    /// Absent, `null` and `""` are missing. `0` and `false` are values.
    #[default]
    Explicit,
    /// Legacy falsy check: additionally treats `0` and `false` as missing.
    Truthy,
}

impl FieldPresence {
    pub fn is_set(self, value: Option<&Value>) -> bool {
        match (self, value) {
            (_, None | Some(Value::Null)) => false,
            (_, Some(Value::String(s))) => !s.is_empty(),
            (FieldPresence::Explicit, Some(_)) => true,
            (FieldPresence::Truthy, Some(Value::Bool(b))) => *b,
            (FieldPresence::Truthy, Some(Value::Number(n))) => n.as_f64() != Some(0.0),
            (FieldPresence::Truthy, Some(_)) => true,
        }
    }
}

/// Reports the first required field, in list order, that is not set.
pub fn validate_stage<S: AsRef<str>>(state: &FormState, required: &[S]) -> StageCheck {
    validate_stage_with(state, required, |value| FieldPresence::Explicit.is_set(value))
}

pub fn validate_stage_with<S, F>(state: &FormState, required: &[S], is_set: F) -> StageCheck
where
    S: AsRef<str>,
    F: Fn(Option<&Value>) -> bool,
{
    required
        .iter()
        .map(AsRef::as_ref)
        .find(|name| !is_set(state.field(name)))
        .map_or(StageCheck::Complete, |name| StageCheck::Missing {
            field: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::FormMode;
    use serde_json::json;

    fn state(fields: Value) -> FormState {
        FormState::initial(serde_json::from_value(json!({ "mode": "edit", "fields": fields })).unwrap())
    }

    const REQUIRED: [&str; 3] = ["title", "description", "file"];

    #[test]
    fn reports_first_missing_field() {
        let check = validate_stage(&state(json!({ "title": "", "description": "d", "file": "f" })), &REQUIRED);

        assert_eq!(check, StageCheck::Missing { field: "title".into() });
        assert_eq!(serde_json::to_value(&check).unwrap(), json!({ "success": false, "field": "title" }));
    }

    #[test]
    fn complete_when_all_set() {
        let check = validate_stage(&state(json!({ "title": "t", "description": "d", "file": "f" })), &REQUIRED);

        assert!(check.is_complete());
        assert_eq!(serde_json::to_value(&check).unwrap(), json!({ "success": true }));
    }

    #[test]
    fn absent_and_null_fields_are_missing() {
        let check = validate_stage(&state(json!({ "title": "t", "description": null })), &REQUIRED);
        assert_eq!(check, StageCheck::Missing { field: "description".into() });

        let check = validate_stage(&FormState::initial(FormMode::New), &["file"]);
        assert_eq!(check, StageCheck::Missing { field: "file".into() });
    }

    #[test]
    fn zero_and_false_count_as_set_by_default() {
        let fields = json!({ "sets": 0, "public": false });

        assert!(validate_stage(&state(fields.clone()), &["sets", "public"]).is_complete());

        let legacy = validate_stage_with(&state(fields), &["sets", "public"], |v| {
            FieldPresence::Truthy.is_set(v)
        });
        assert_eq!(legacy, StageCheck::Missing { field: "sets".into() });
    }

    #[test]
    fn caller_supplied_predicate() {
        let check = validate_stage_with(
            &state(json!({ "photos": [], "title": "t" })),
            &["photos", "title"],
            |value| value.is_some_and(Value::is_array),
        );

        assert_eq!(check, StageCheck::Missing { field: "title".into() });
    }

    #[test]
    fn empty_requirement_list_is_complete() {
        let none: [&str; 0] = [];
        assert!(validate_stage(&FormState::initial(FormMode::New), &none).is_complete());
    }
}
