/// A hook called by an iterative solver after each trial point.
///
/// The event type `E` describes the trial. Returning `Some(action)` asks the
/// solver to act (for example to stop early); `None` lets it carry on.
///
/// Any `FnMut(&E) -> Option<A>` closure is an observer, so a logging callback
/// can be passed inline. Pass `()` when nothing needs to watch.
pub trait Observer<E, A> {
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}
