use std::fmt;
use std::sync::Mutex;
use std::sync::OnceLock;

/// A value supplied either directly or as a deferred one-shot computation.
///
/// Field lists use this so a type can be declared before the values its
/// field list captures exist, and so that building a large field list is
/// paid for at most once: the thunk runs on the first [`get`][Self::get]
/// (schema build forces every reachable one) and the result is memoized.
pub(crate) struct Thunk<T> {
    value: OnceLock<T>,
    init: Mutex<Option<Init<T>>>,
}

type Init<T> = Box<dyn FnOnce() -> T + Send>;

impl<T> Thunk<T> {
    pub(crate) fn eager(value: T) -> Self {
        let cell = OnceLock::new();
        // The cell was just created, this cannot already be set
        let _ = cell.set(value);
        Self {
            value: cell,
            init: Mutex::new(None),
        }
    }

    pub(crate) fn lazy(init: impl FnOnce() -> T + Send + 'static) -> Self {
        Self {
            value: OnceLock::new(),
            init: Mutex::new(Some(Box::new(init))),
        }
    }

    /// Whether the value has been computed yet
    pub(crate) fn is_forced(&self) -> bool {
        self.value.get().is_some()
    }
}

impl<T: Default> Thunk<T> {
    /// The value, running the deferred computation on first access.
    ///
    /// `OnceLock` guarantees the computation runs in exactly one caller;
    /// concurrent callers block until it finishes.
    pub(crate) fn get(&self) -> &T {
        self.value.get_or_init(|| {
            let init = self.init.lock().ok().and_then(|mut slot| slot.take());
            match init {
                Some(init) => init(),
                // The slot is only empty here if a previous forcing attempt
                // panicked and poisoned the lock
                None => T::default(),
            }
        })
    }
}

impl<T: Default> Default for Thunk<T> {
    fn default() -> Self {
        Self::eager(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Thunk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(value) => value.fmt(f),
            None => f.write_str("<thunk>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    #[test]
    fn thunk_runs_at_most_once() {
        static RUNS: AtomicUsize = AtomicUsize::new(0);
        let thunk = Thunk::lazy(|| {
            RUNS.fetch_add(1, Ordering::SeqCst);
            vec![1, 2, 3]
        });
        assert!(!thunk.is_forced());
        assert_eq!(thunk.get(), &[1, 2, 3]);
        assert_eq!(thunk.get(), &[1, 2, 3]);
        assert!(thunk.is_forced());
        assert_eq!(RUNS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn eager_never_consults_the_init_slot() {
        let thunk = Thunk::eager(vec![42]);
        assert!(thunk.is_forced());
        assert_eq!(thunk.get(), &[42]);
    }
}
