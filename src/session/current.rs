//! Active-session binding
//!
//! Authoring code running inside a construction pass discovers the session it
//! builds for through a thread-local binding. A binding lasts as long as its
//! [`ActiveGuard`]; dropping the guard restores whatever was bound before, so
//! nested passes unwind correctly.

use std::any::Any;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

type Binding = Arc<dyn Any + Send + Sync>;

thread_local! {
    static ACTIVE: RefCell<Option<Binding>> = const { RefCell::new(None) };
}

/// Keeps a session bound as the active one on this thread.
///
/// Not `Send`: the binding belongs to the thread that created it.
#[must_use = "the session is unbound as soon as the guard drops"]
pub struct ActiveGuard {
    previous: Option<Binding>,
    _thread: PhantomData<*const ()>,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        ACTIVE.with(|active| *active.borrow_mut() = previous);
    }
}

pub(crate) fn activate(binding: Option<Binding>) -> ActiveGuard {
    let previous = ACTIVE.with(|active| active.replace(binding));
    ActiveGuard {
        previous,
        _thread: PhantomData,
    }
}

/// Currently bound value, if it is a `T`
pub(crate) fn current<T: Any + Send + Sync>() -> Option<Arc<T>> {
    let binding = ACTIVE.with(|active| active.borrow().clone())?;
    binding.downcast::<T>().ok()
}
