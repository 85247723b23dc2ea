//! Field-merge and stage-advance reducer used by form wizards.

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::reducer::Reducer;

pub const FIRST_STAGE: i64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormState {
    pub fields: BTreeMap<String, Arc<Value>>,
    pub stage: i64,
}

/// How a form workflow starts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FormMode {
    New,
    Edit {
        #[serde(default)]
        fields: BTreeMap<String, Value>,
    },
}

impl FormState {
    pub fn initial(mode: FormMode) -> Self {
        let fields = match mode {
            FormMode::New => BTreeMap::new(),
            FormMode::Edit { fields } => fields
                .into_iter()
                .map(|(name, value)| (name, Arc::new(value)))
                .collect(),
        };

        Self {
            fields,
            stage: FIRST_STAGE,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).map(Arc::as_ref)
    }
}

/// Wire form: `{"type": "CHANGE_FIELD_VALUE", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormAction {
    ChangeFieldValue { name: String, value: Value },
    /// Any integer is accepted; reachability is checked by the caller.
    SetCurrentStage(i64),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FormReducer;

impl Reducer for FormReducer {
    type State = FormState;
    type Action = FormAction;

    fn reduce(&self, state: &FormState, action: FormAction) -> FormState {
        match action {
            FormAction::ChangeFieldValue { name, value } => {
                let mut next = state.clone();
                next.fields.insert(name, Arc::new(value));
                next
            }
            FormAction::SetCurrentStage(stage) => FormState {
                fields: state.fields.clone(),
                stage,
            },
        }
    }
}
