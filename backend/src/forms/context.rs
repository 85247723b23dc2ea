//! State context: one reducer instance plus its current state, shared by a
//! single workflow.
//!
//! Dispatches are applied in the order they acquire the lock. Once the owning
//! workflow is disposed, direct calls fail with [`ContextError::Disposed`] and
//! [`Dispatcher`] handles held by background tasks become no-ops.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::reducer::Reducer;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("state context was disposed")]
    Disposed,
}

pub struct StateContext<R: Reducer> {
    reducer: R,
    state: Mutex<Option<Arc<R::State>>>,
}

impl<R: Reducer> StateContext<R> {
    pub fn new(reducer: R, initial: R::State) -> Arc<Self> {
        Arc::new(Self {
            reducer,
            state: Mutex::new(Some(Arc::new(initial))),
        })
    }

    pub fn state(&self) -> Result<Arc<R::State>, ContextError> {
        self.state.lock().as_ref().cloned().ok_or(ContextError::Disposed)
    }

    pub fn dispatch(&self, action: R::Action) -> Result<Arc<R::State>, ContextError> {
        let mut state = self.state.lock();
        let current = state.as_ref().ok_or(ContextError::Disposed)?;

        let next = Arc::new(self.reducer.reduce(current, action));
        *state = Some(Arc::clone(&next));
        Ok(next)
    }

    /// Dispatches an untyped `{type, payload}` record.
    ///
    /// Records that do not decode into an action leave the current state,
    /// including its reference, untouched.
    pub fn dispatch_record(&self, record: Value) -> Result<Arc<R::State>, ContextError>
    where
        R::Action: DeserializeOwned,
    {
        match serde_json::from_value::<R::Action>(record) {
            Ok(action) => self.dispatch(action),
            Err(e) => {
                debug!("Ignoring unrecognised action: {e}");
                self.state()
            }
        }
    }

    /// Returns `true` if the context was live.
    pub fn dispose(&self) -> bool {
        self.state.lock().take().is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.state.lock().is_none()
    }

    pub fn dispatcher(self: &Arc<Self>) -> Dispatcher<R> {
        Dispatcher {
            context: Arc::downgrade(self),
        }
    }
}

/// Weak dispatch handle for work that may outlive the workflow.
pub struct Dispatcher<R: Reducer> {
    context: Weak<StateContext<R>>,
}

impl<R: Reducer> Clone for Dispatcher<R> {
    fn clone(&self) -> Self {
        Self {
            context: Weak::clone(&self.context),
        }
    }
}

impl<R: Reducer> Dispatcher<R> {
    /// Returns `false` when the update was dropped because the owner is gone.
    pub fn dispatch(&self, action: R::Action) -> bool {
        match self.context.upgrade() {
            Some(context) => context.dispatch(action).is_ok(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{FormAction, FormMode, FormReducer, FormState};
    use serde_json::json;

    fn form() -> Arc<StateContext<FormReducer>> {
        StateContext::new(FormReducer, FormState::initial(FormMode::New))
    }

    #[test]
    fn dispatch_replaces_state() {
        let context = form();
        let before = context.state().unwrap();

        let after = context
            .dispatch(FormAction::ChangeFieldValue {
                name: "title".into(),
                value: json!("Cut"),
            })
            .unwrap();

        assert!(!Arc::ptr_eq(&before, &after));
        assert!(before.fields.is_empty());
        assert!(Arc::ptr_eq(&after, &context.state().unwrap()));
    }

    #[test]
    fn unknown_record_keeps_the_same_reference() {
        let context = form();
        let before = context.state().unwrap();

        let after = context
            .dispatch_record(json!({ "type": "RESET_EVERYTHING", "payload": null }))
            .unwrap();

        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn known_record_is_applied() {
        let context = form();

        let state = context
            .dispatch_record(json!({ "type": "SET_CURRENT_STAGE", "payload": 2 }))
            .unwrap();

        assert_eq!(state.stage, 2);
    }

    #[test]
    fn dispatches_apply_in_issue_order() {
        let context = form();
        for stage in 1..=20 {
            context.dispatch(FormAction::SetCurrentStage(stage)).unwrap();
        }

        assert_eq!(context.state().unwrap().stage, 20);
    }

    #[test]
    fn disposed_context_rejects_updates() {
        let context = form();

        assert!(context.dispose());
        assert!(!context.dispose());
        assert!(context.is_disposed());
        assert_eq!(context.state().unwrap_err(), ContextError::Disposed);
        assert_eq!(
            context.dispatch(FormAction::SetCurrentStage(2)).unwrap_err(),
            ContextError::Disposed
        );
    }

    #[tokio::test]
    async fn late_dispatch_after_unmount_is_dropped() {
        let context = form();
        let dispatcher = context.dispatcher();

        let task = tokio::spawn(async move {
            tokio::task::yield_now().await;
            dispatcher.dispatch(FormAction::SetCurrentStage(3))
        });
        drop(context);

        assert!(!task.await.unwrap());
    }

    #[test]
    fn dispatcher_reaches_live_context() {
        let context = form();
        let dispatcher = context.dispatcher().clone();

        assert!(dispatcher.dispatch(FormAction::SetCurrentStage(5)));
        assert_eq!(context.state().unwrap().stage, 5);
    }
}
