use core::fmt;

/// Registry key for a task-spec shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskKind(pub &'static str);

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Value describing a goal to achieve.
///
/// Specs are bound into methods by cloning and never mutated afterwards. Two
/// content-equal specs are interchangeable; the methods bound to them remain
/// distinct arena entries.
pub trait TaskSpec: Clone + fmt::Debug + 'static {
    fn kind(&self) -> TaskKind;
}
