//! Value-or-function updates and per-slice control

use std::any::Any;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::StateSlice;

/// A new slice value, or a function from the old value to the new one.
///
/// Every setter accepts `impl Into<Updater<S>>`, so both a plain value and
/// [`Updater::update`] work:
///
/// ```
/// use tabula::state::{GroupingState, Updater};
///
/// let replace: Updater<GroupingState> = GroupingState::from(vec!["status"]).into();
/// let append = Updater::update(|old: &GroupingState| {
///     let mut next = old.clone();
///     next.push("team".to_string());
///     next
/// });
///
/// let old = GroupingState::from(vec!["status"]);
/// assert_eq!(replace.resolve(&old).len(), 1);
/// assert_eq!(append.resolve(&old).len(), 2);
/// ```
pub enum Updater<S> {
    /// Replace the slice.
    Value(S),
    /// Derive the slice from its current value.
    Update(Box<dyn FnOnce(&S) -> S>),
}

impl<S> Updater<S> {
    /// Creates a functional update.
    pub fn update(f: impl FnOnce(&S) -> S + 'static) -> Self {
        Updater::Update(Box::new(f))
    }

    /// Resolves the new value against the current one.
    pub fn resolve(self, old: &S) -> S {
        match self {
            Updater::Value(value) => value,
            Updater::Update(f) => f(old),
        }
    }
}

impl<S> From<S> for Updater<S> {
    fn from(value: S) -> Self {
        Updater::Value(value)
    }
}

impl<S: fmt::Debug> fmt::Debug for Updater<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Updater::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Updater::Update(_) => f.write_str("Update(..)"),
        }
    }
}

/// Callback receiving the resolved value of a controlled slice.
pub type OnChange<S> = Rc<dyn Fn(S)>;

/// How writes to one slice are handled.
pub enum StateControl<S> {
    /// The table stores the new value itself.
    Uncontrolled,
    /// The new value goes to the caller, who feeds it back through
    /// `TableOptions::state`.
    Controlled(OnChange<S>),
}

impl<S> StateControl<S> {
    /// Returns `true` for [`StateControl::Controlled`].
    pub fn is_controlled(&self) -> bool {
        matches!(self, StateControl::Controlled(_))
    }
}

/// Per-slice change callbacks, keyed by slice type.
///
/// A slice with a callback is controlled; every other slice is managed by
/// the table.
#[derive(Clone, Default)]
pub struct StateControls {
    callbacks: HashMap<TypeId, Rc<dyn Any>>,
}

impl StateControls {
    /// Creates an empty set; every slice is uncontrolled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the change callback of a slice.
    pub fn insert<S: StateSlice>(&mut self, on_change: impl Fn(S) + 'static) {
        let callback: OnChange<S> = Rc::new(on_change);
        self.callbacks.insert(TypeId::of::<S>(), Rc::new(callback));
    }

    /// Resolves the control mode of a slice.
    pub fn control<S: StateSlice>(&self) -> StateControl<S> {
        self.callbacks
            .get(&TypeId::of::<S>())
            .and_then(|callback| callback.downcast_ref::<OnChange<S>>())
            .map(|callback| StateControl::Controlled(callback.clone()))
            .unwrap_or(StateControl::Uncontrolled)
    }

    /// Number of controlled slices.
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Returns `true` if no slice is controlled.
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl fmt::Debug for StateControls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateControls")
            .field("controlled", &self.callbacks.len())
            .finish()
    }
}
