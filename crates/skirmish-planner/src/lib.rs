//! Hierarchical task-decomposition planning over forked world snapshots.
//!
//! A goal [`Method`] is expanded through alternative [`Expansion`]s by the
//! many-worlds search, producing scored [`Plan`]s; a chosen plan executes as
//! a tree of composable simulation actions via [`PlannerSimAction`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod error;
pub mod exec;
pub mod library;
pub mod method;
pub mod plan;
pub mod search;
pub mod storage;
pub mod task;

pub use error::SearchError;
pub use exec::PlannerSimAction;
pub use library::{MethodLibrary, MethodRegistry, RegistryEntry};
pub use method::{ExecMode, Expansion, Method, MethodBody, OptionsFn, PrimitiveFn, SingleFn};
pub use plan::{Decomposition, MethodArena, MethodId, Plan};
pub use search::{ManyWorldsSearch, PlanStream, SearchConfig};
pub use storage::{PlanRecord, PlanScorer, PlanStorage, ScoreReport};
pub use task::{TaskKind, TaskSpec};
