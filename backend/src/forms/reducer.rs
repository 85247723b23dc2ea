//! The reducer abstraction shared by every state container.

/// A total, pure state transition.
///
/// `reduce` borrows the current state and returns a new one; it must not
/// consult anything besides its two inputs.
pub trait Reducer: Send + Sync + 'static {
    type State: Clone + Send + Sync + 'static;
    type Action: Send + 'static;

    fn reduce(&self, state: &Self::State, action: Self::Action) -> Self::State;
}
