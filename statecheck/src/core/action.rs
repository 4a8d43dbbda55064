//! Named actions and the catalog the executor draws from.

use std::any::type_name;
use std::fmt;

use crate::core::error::CatalogError;
use crate::core::outcome::ActionResult;
use crate::trial::Trial;

/// Plain function shape accepted by [`ActionCatalog::from_pairs`].
pub type ActionFn<M> = fn(&mut M, &mut Trial<'_>) -> ActionResult;

type BoxedAction<M> = Box<dyn Fn(&mut M, &mut Trial<'_>) -> ActionResult>;

/// A named operation that may run against a machine of type `M`.
pub struct Action<M> {
    name: String,
    run: BoxedAction<M>,
}

impl<M> Action<M> {
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn(&mut M, &mut Trial<'_>) -> ActionResult + 'static,
    {
        Self {
            name: name.into(),
            run: Box::new(run),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run(&self, machine: &mut M, trial: &mut Trial<'_>) -> ActionResult {
        (self.run)(machine, trial)
    }
}

impl<M> fmt::Debug for Action<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.name)
    }
}

/// Capability interface for machines that enumerate their own actions.
pub trait StateMachine: Sized {
    fn actions() -> Vec<Action<Self>>;

    /// Invariant check run before the first step and after every completed step.
    fn check(&self, _trial: &mut Trial<'_>) -> ActionResult {
        Ok(())
    }
}

/// Immutable, non-empty, ordered set of actions for one test.
pub struct ActionCatalog<M> {
    actions: Vec<Action<M>>,
}

impl<M> fmt::Debug for ActionCatalog<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.actions).finish()
    }
}

impl<M> ActionCatalog<M> {
    pub fn new(actions: Vec<Action<M>>) -> Result<Self, CatalogError> {
        let machine = type_name::<M>();
        if actions.is_empty() {
            return Err(CatalogError::Empty { machine });
        }
        if let Some(index) = actions
            .iter()
            .position(|action| action.name().trim().is_empty())
        {
            return Err(CatalogError::BlankName { machine, index });
        }
        Ok(Self { actions })
    }

    /// Build a catalog from explicit `(name, function)` registrations.
    pub fn from_pairs<I, N>(pairs: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (N, ActionFn<M>)>,
        N: Into<String>,
        M: 'static,
    {
        let actions = pairs
            .into_iter()
            .map(|(name, run)| Action::new(name, run))
            .collect();
        Self::new(actions)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Always false for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Action at `index`; indices past the end wrap around.
    pub fn pick(&self, index: usize) -> &Action<M> {
        &self.actions[index % self.actions.len()]
    }

    pub fn names(&self) -> Vec<&str> {
        self.actions.iter().map(Action::name).collect()
    }
}

impl<M: StateMachine> ActionCatalog<M> {
    /// Enumerate the actions `M` declares.
    pub fn from_machine() -> Result<Self, CatalogError> {
        Self::new(M::actions())
    }
}
