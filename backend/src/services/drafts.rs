//! Registry of server-side form drafts.
//!
//! Each draft is an isolated [`StateContext`] over the form reducer, owned by
//! the session that opened it. Lookups from any other session miss. Closing
//! a draft disposes its context, so requests that still hold it fail instead
//! of updating a workflow that no longer exists.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;
use tracing::debug;

use crate::{
    auth::SessionCredential,
    errors::AppError,
    forms::{FormMode, FormReducer, FormState, StateContext},
};

pub type DraftContext = StateContext<FormReducer>;

struct Draft {
    owner: SessionCredential,
    context: Arc<DraftContext>,
}

#[derive(Default)]
pub struct DraftRegistry {
    next_id: AtomicU64,
    drafts: Mutex<HashMap<u64, Draft>>,
}

impl DraftRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, owner: &SessionCredential, mode: FormMode) -> (u64, Arc<DraftContext>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let context = StateContext::new(FormReducer, FormState::initial(mode));

        self.drafts.lock().insert(
            id,
            Draft {
                owner: owner.clone(),
                context: Arc::clone(&context),
            },
        );
        debug!("Opened draft {id}");

        (id, context)
    }

    /// A draft owned by another session is reported as not found.
    pub fn get(&self, owner: &SessionCredential, id: u64) -> Result<Arc<DraftContext>, AppError> {
        self.drafts
            .lock()
            .get(&id)
            .filter(|draft| draft.owner == *owner)
            .map(|draft| Arc::clone(&draft.context))
            .ok_or(AppError::DraftNotFound(id))
    }

    pub fn close(&self, owner: &SessionCredential, id: u64) -> Result<(), AppError> {
        let mut drafts = self.drafts.lock();
        if !drafts.get(&id).is_some_and(|draft| draft.owner == *owner) {
            return Err(AppError::DraftNotFound(id));
        }
        let draft = drafts.remove(&id).ok_or(AppError::DraftNotFound(id))?;
        drop(drafts);

        draft.context.dispose();
        debug!("Closed draft {id}");
        Ok(())
    }

    /// Closes every draft `owner` still has open. Returns how many were closed.
    pub fn close_all(&self, owner: &SessionCredential) -> usize {
        let mut drafts = self.drafts.lock();
        let ids: Vec<u64> = drafts
            .iter()
            .filter(|(_, draft)| draft.owner == *owner)
            .map(|(id, _)| *id)
            .collect();
        let closed: Vec<Draft> = ids.into_iter().filter_map(|id| drafts.remove(&id)).collect();
        drop(drafts);

        for draft in &closed {
            draft.context.dispose();
        }
        if !closed.is_empty() {
            debug!("Closed {} draft(s) at session end", closed.len());
        }
        closed.len()
    }

    pub fn len(&self) -> usize {
        self.drafts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
