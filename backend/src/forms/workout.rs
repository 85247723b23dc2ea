//! Composite-key reducer for workout plans: exercises grouped per day plus a
//! plan-level `meta` object.

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::reducer::Reducer;

pub type ExerciseMap = BTreeMap<String, Arc<Value>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutState {
    pub days: BTreeMap<String, ExerciseMap>,
    pub meta: Arc<Value>,
}

impl Default for WorkoutState {
    fn default() -> Self {
        Self {
            days: BTreeMap::new(),
            meta: Arc::new(Value::Object(Default::default())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkoutAction {
    /// Merges `exercises` into `day`; same-named exercises are overwritten.
    SaveExercise {
        day: String,
        exercises: BTreeMap<String, Value>,
    },
    UpdateMeta(Value),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WorkoutReducer;

impl Reducer for WorkoutReducer {
    type State = WorkoutState;
    type Action = WorkoutAction;

    fn reduce(&self, state: &WorkoutState, action: WorkoutAction) -> WorkoutState {
        match action {
            WorkoutAction::SaveExercise { day, exercises } => {
                let mut next = state.clone();
                let slot = next.days.entry(day).or_default();
                for (name, exercise) in exercises {
                    slot.insert(name, Arc::new(exercise));
                }
                next
            }
            WorkoutAction::UpdateMeta(meta) => WorkoutState {
                days: state.days.clone(),
                meta: Arc::new(meta),
            },
        }
    }
}
