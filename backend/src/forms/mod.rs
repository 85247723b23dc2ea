//! Reducer-driven state containers for multi-field forms and multi-stage flows.
//!
//! A [`Reducer`] is a pure `(state, action) -> state` function over a closed
//! action enum. A [`StateContext`] owns one reducer instance and its current
//! state for a single workflow and serialises dispatches to it.

pub mod context;
pub mod form;
pub mod reducer;
pub mod validate;
pub mod workout;

pub use context::{ContextError, Dispatcher, StateContext};
pub use form::{FormAction, FormMode, FormReducer, FormState};
pub use reducer::Reducer;
pub use validate::{validate_stage, validate_stage_with, FieldPresence, StageCheck};
pub use workout::{WorkoutAction, WorkoutReducer, WorkoutState};
