use core::fmt;
use std::rc::Rc;

use crate::MethodLibrary;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the subtasks of a decomposition are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExecMode {
    Sequential,
    Parallel,
}

pub type PrimitiveFn<T, S, W> = Rc<dyn Fn(&T, &W) -> Option<S>>;
pub type SingleFn<T, S, W> =
    Rc<dyn Fn(&T, &W, &MethodLibrary<T, S, W>) -> Option<Expansion<T, S, W>>>;
pub type OptionsFn<T, S, W> = Rc<dyn Fn(&T, &W, &MethodLibrary<T, S, W>) -> Vec<Expansion<T, S, W>>>;

/// One concrete way to expand a method: an execution mode plus the bound
/// sub-methods, not yet installed in any plan arena.
pub struct Expansion<T, S, W> {
    pub mode: ExecMode,
    pub subtasks: Vec<Method<T, S, W>>,
}

impl<T, S, W> Expansion<T, S, W> {
    pub fn sequential(subtasks: Vec<Method<T, S, W>>) -> Self {
        Self {
            mode: ExecMode::Sequential,
            subtasks,
        }
    }

    pub fn parallel(subtasks: Vec<Method<T, S, W>>) -> Self {
        Self {
            mode: ExecMode::Parallel,
            subtasks,
        }
    }
}

/// The shape of a method: a primitive leaf or one of the decomposition forms.
///
/// A method is either actionable or decomposable, never both; the original
/// runtime check for that contract is unrepresentable here.
pub enum MethodBody<T, S, W> {
    /// Actionable leaf: produces a primitive-action spec for the given world,
    /// or `None` when nothing needs doing (inert leaf).
    Primitive(PrimitiveFn<T, S, W>),
    /// Exactly one way to decompose, or `None` for a dead end.
    Single(SingleFn<T, S, W>),
    /// Several alternative decompositions, tried in preference order.
    Options(OptionsFn<T, S, W>),
    /// Fixed sequential group of pre-bound children.
    Sequence(Vec<Method<T, S, W>>),
    /// Fixed parallel group of pre-bound children.
    Parallel(Vec<Method<T, S, W>>),
}

impl<T, S, W> MethodBody<T, S, W> {
    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::Primitive(_) => "primitive",
            Self::Single(_) => "single",
            Self::Options(_) => "options",
            Self::Sequence(_) => "sequence",
            Self::Parallel(_) => "parallel",
        }
    }
}

impl<T: Clone, S, W> Clone for MethodBody<T, S, W> {
    fn clone(&self) -> Self {
        match self {
            Self::Primitive(f) => Self::Primitive(Rc::clone(f)),
            Self::Single(f) => Self::Single(Rc::clone(f)),
            Self::Options(f) => Self::Options(Rc::clone(f)),
            Self::Sequence(children) => Self::Sequence(children.clone()),
            Self::Parallel(children) => Self::Parallel(children.clone()),
        }
    }
}

/// A recipe for achieving a bound task spec.
///
/// Methods carry no mutable internal state; a plan shares its recipe closures
/// across deep copies while the world snapshots fork.
pub struct Method<T, S, W> {
    spec: T,
    note: String,
    body: MethodBody<T, S, W>,
}

impl<T: Clone, S, W> Clone for Method<T, S, W> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            note: self.note.clone(),
            body: self.body.clone(),
        }
    }
}

impl<T: fmt::Debug, S, W> fmt::Debug for Method<T, S, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("spec", &self.spec)
            .field("note", &self.note)
            .field("shape", &self.body.shape_name())
            .finish()
    }
}

impl<T, S, W> Method<T, S, W> {
    pub fn leaf(spec: T, produce: impl Fn(&T, &W) -> Option<S> + 'static) -> Self {
        Self {
            spec,
            note: String::new(),
            body: MethodBody::Primitive(Rc::new(produce)),
        }
    }

    pub fn single(
        spec: T,
        expand: impl Fn(&T, &W, &MethodLibrary<T, S, W>) -> Option<Expansion<T, S, W>> + 'static,
    ) -> Self {
        Self {
            spec,
            note: String::new(),
            body: MethodBody::Single(Rc::new(expand)),
        }
    }

    pub fn options(
        spec: T,
        expand: impl Fn(&T, &W, &MethodLibrary<T, S, W>) -> Vec<Expansion<T, S, W>> + 'static,
    ) -> Self {
        Self {
            spec,
            note: String::new(),
            body: MethodBody::Options(Rc::new(expand)),
        }
    }

    pub fn sequence(spec: T, children: Vec<Method<T, S, W>>) -> Self {
        Self {
            spec,
            note: String::new(),
            body: MethodBody::Sequence(children),
        }
    }

    pub fn parallel(spec: T, children: Vec<Method<T, S, W>>) -> Self {
        Self {
            spec,
            note: String::new(),
            body: MethodBody::Parallel(children),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn spec(&self) -> &T {
        &self.spec
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn body(&self) -> &MethodBody<T, S, W> {
        &self.body
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.body, MethodBody::Primitive(_))
    }

    /// Rebind this recipe to a new spec (prototype pattern). The body is
    /// shared; the result is a distinct method instance.
    pub fn clone_with(&self, spec: T) -> Self
    where
        T: Clone,
    {
        Self {
            spec,
            note: self.note.clone(),
            body: self.body.clone(),
        }
    }

    pub fn label(&self) -> String
    where
        T: fmt::Debug,
    {
        if self.note.is_empty() {
            format!("{:?}", self.spec)
        } else {
            self.note.clone()
        }
    }

    /// All ways to expand this method in the given world, in preference
    /// order. Finite. Empty for primitive leaves and for dead ends.
    pub fn expand(&self, world: &W, library: &MethodLibrary<T, S, W>) -> Vec<Expansion<T, S, W>>
    where
        T: Clone,
    {
        match &self.body {
            MethodBody::Primitive(_) => Vec::new(),
            MethodBody::Single(f) => f(&self.spec, world, library).into_iter().collect(),
            MethodBody::Options(f) => f(&self.spec, world, library),
            MethodBody::Sequence(children) => vec![Expansion::sequential(children.clone())],
            MethodBody::Parallel(children) => vec![Expansion::parallel(children.clone())],
        }
    }

    /// Primitive-action spec for this method, if it is an actionable leaf in
    /// the given world.
    pub fn primitive_spec(&self, world: &W) -> Option<S> {
        match &self.body {
            MethodBody::Primitive(f) => f(&self.spec, world),
            _ => None,
        }
    }
}
