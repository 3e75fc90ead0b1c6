//! Dependency-tracked memoization
//!
//! Every derived value in the table (row models, column lists, header groups)
//! is cached in a [`Memo`] keyed by the values it was derived from. The
//! comparison is shallow: `Rc` dependencies compare by pointer, plain values
//! by `==`. Upstream stages therefore hand out a new `Rc` exactly when their
//! output changes, and forward the old one otherwise.

use std::cell::Cell;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

/// A memo dependency, compared by identity rather than by content.
pub trait Dependency {
    /// Returns `true` if `self` differs from the previously seen value.
    fn changed(&self, previous: &Self) -> bool;
}

impl<T: ?Sized> Dependency for Rc<T> {
    fn changed(&self, previous: &Self) -> bool {
        !Rc::ptr_eq(self, previous)
    }
}

impl<D: Dependency> Dependency for Option<D> {
    fn changed(&self, previous: &Self) -> bool {
        match (self, previous) {
            (Some(a), Some(b)) => a.changed(b),
            (None, None) => false,
            _ => true,
        }
    }
}

macro_rules! eq_dependency {
    ($($ty:ty),*) => {
        $(
            impl Dependency for $ty {
                fn changed(&self, previous: &Self) -> bool {
                    self != previous
                }
            }
        )*
    };
}

eq_dependency!(bool, usize, i64, f64, String, &'static str);

impl Dependency for () {
    fn changed(&self, _previous: &Self) -> bool {
        false
    }
}

macro_rules! tuple_dependency {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Dependency),+> Dependency for ($($name,)+) {
            fn changed(&self, previous: &Self) -> bool {
                $(self.$idx.changed(&previous.$idx))||+
            }
        }
    };
}

tuple_dependency!(A: 0);
tuple_dependency!(A: 0, B: 1);
tuple_dependency!(A: 0, B: 1, C: 2);
tuple_dependency!(A: 0, B: 1, C: 2, D: 3);
tuple_dependency!(A: 0, B: 1, C: 2, D: 3, E: 4);
tuple_dependency!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

/// Cache slot for one derivation.
///
/// `get` recomputes only when the dependency tuple changed since the last
/// call (or on the first call). The cached result is cloned out, so results
/// are usually `Rc`s.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use tabula::memo::Memo;
///
/// let memo: Memo<(Rc<Vec<i32>>,), i32> = Memo::new("sum");
/// let data = Rc::new(vec![1, 2, 3]);
///
/// assert_eq!(memo.get((data.clone(),), |(d,)| d.iter().sum()), 6);
/// assert_eq!(memo.get((data.clone(),), |(d,)| d.iter().sum()), 6);
/// assert_eq!(memo.computations(), 1);
/// ```
pub struct Memo<D, R> {
    key: &'static str,
    slot: RefCell<Option<(D, R)>>,
    computations: Cell<usize>,
}

impl<D: Dependency, R: Clone> Memo<D, R> {
    /// Creates an empty memo. `key` names it in trace logs.
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            slot: RefCell::new(None),
            computations: Cell::new(0),
        }
    }

    /// Returns the cached result, recomputing it if `deps` changed.
    pub fn get(&self, deps: D, compute: impl FnOnce(&D) -> R) -> R {
        self.get_with_hook(deps, compute, |_| {})
    }

    /// Like [`get`](Self::get), and calls `on_change` after a recomputation.
    ///
    /// The hook never runs on a cache hit.
    pub fn get_with_hook(
        &self,
        deps: D,
        compute: impl FnOnce(&D) -> R,
        on_change: impl FnOnce(&R),
    ) -> R {
        if let Some((previous, value)) = self.slot.borrow().as_ref()
            && !deps.changed(previous)
        {
            log::trace!("[memo] {} hit", self.key);
            return value.clone();
        }

        // No borrow is held while computing: derivations read other memos
        // and may re-enter the table.
        let started = Instant::now();
        let value = compute(&deps);
        self.computations.set(self.computations.get() + 1);
        log::trace!(
            "[memo] {} recomputed in {:?} (run {})",
            self.key,
            started.elapsed(),
            self.computations.get()
        );

        *self.slot.borrow_mut() = Some((deps, value.clone()));
        on_change(&value);
        value
    }

    /// Returns the cached result without checking dependencies.
    pub fn peek(&self) -> Option<R> {
        self.slot.borrow().as_ref().map(|(_, value)| value.clone())
    }

    /// Drops the cached result; the next `get` recomputes.
    pub fn invalidate(&self) {
        self.slot.borrow_mut().take();
    }

    /// Number of times the derivation has run.
    pub fn computations(&self) -> usize {
        self.computations.get()
    }

    /// The memo's name.
    pub fn key(&self) -> &'static str {
        self.key
    }
}

impl<D, R> fmt::Debug for Memo<D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("key", &self.key)
            .field("cached", &self.slot.borrow().is_some())
            .field("computations", &self.computations.get())
            .finish()
    }
}
