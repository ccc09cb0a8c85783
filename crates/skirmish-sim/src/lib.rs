//! Engine-agnostic simulation action primitives.
//!
//! The planner crates consume worlds and actions only through the traits
//! defined here: a deep-copyable [`SimWorld`] snapshot, the [`SimAction`]
//! runtime contract, and composable sequential/parallel group actions.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod cancel;
pub mod drive;
pub mod group;
pub mod tick;
pub mod world;

pub use action::{ActionFactory, IntentSink, SimAction, SimStatus};
pub use cancel::CancelToken;
pub use drive::{run_action_forward, RunOutcome, RunReport, StepBudget};
pub use group::{ActionParallel, ActionSequence};
pub use tick::TickContext;
pub use world::SimWorld;
