use std::collections::BTreeMap;

use tracing::warn;

use crate::{Method, TaskKind, TaskSpec};

/// Registry of method templates keyed by task kind.
///
/// Templates are prototypes: [`MethodLibrary::get_options`] clones each
/// matching template and rebinds it to the caller's spec, so one template
/// serves arbitrarily many concrete goals.
pub struct MethodLibrary<T, S, W> {
    templates: BTreeMap<TaskKind, Vec<Method<T, S, W>>>,
}

impl<T, S, W> Default for MethodLibrary<T, S, W> {
    fn default() -> Self {
        Self {
            templates: BTreeMap::new(),
        }
    }
}

impl<T, S, W> MethodLibrary<T, S, W>
where
    T: TaskSpec,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, method: Method<T, S, W>) {
        self.templates
            .entry(method.spec().kind())
            .or_default()
            .push(method);
    }

    /// Every registered template that can solve `spec`, rebound to it.
    ///
    /// An empty result means "this task cannot be decomposed here", which is
    /// a normal outcome, not an error.
    pub fn get_options(&self, spec: &T) -> Vec<Method<T, S, W>> {
        self.templates
            .get(&spec.kind())
            .map(|templates| {
                templates
                    .iter()
                    .map(|t| t.clone_with(spec.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Evict all templates of a kind (used when swapping behavior sets).
    pub fn remove_methods(&mut self, kind: TaskKind) {
        self.templates.remove(&kind);
    }

    pub fn template_count(&self) -> usize {
        self.templates.values().map(Vec::len).sum()
    }

    pub fn kinds(&self) -> impl Iterator<Item = TaskKind> + '_ {
        self.templates.keys().copied()
    }
}

/// One startup-registration entry: a task kind plus the constructor that
/// turns a spec into a method template.
pub struct RegistryEntry<T, S, W> {
    pub kind: TaskKind,
    pub name: &'static str,
    pub default_spec: fn() -> T,
    /// May decline (`None`) for templates that need richer construction and
    /// are meant to be registered by hand.
    pub construct: fn(T) -> Option<Method<T, S, W>>,
}

/// Explicit, hand-written registration table built at startup.
///
/// [`MethodRegistry::build_library`] instantiates a default spec per entry
/// and registers the constructed template. Entries whose constructor declines
/// are skipped with a diagnostic.
pub struct MethodRegistry<T, S, W> {
    entries: Vec<RegistryEntry<T, S, W>>,
}

impl<T, S, W> Default for MethodRegistry<T, S, W> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T, S, W> MethodRegistry<T, S, W>
where
    T: TaskSpec,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entry: RegistryEntry<T, S, W>) {
        self.entries.push(entry);
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn build_library(&self) -> MethodLibrary<T, S, W> {
        let mut library = MethodLibrary::new();
        for entry in &self.entries {
            let spec = (entry.default_spec)();
            match (entry.construct)(spec) {
                Some(method) => library.add(method),
                None => {
                    warn!(
                        kind = %entry.kind,
                        name = entry.name,
                        "skipping method template whose constructor declined"
                    );
                }
            }
        }
        library
    }
}
