//! goaltrack - goal and task hierarchy engine
//!
//! This library provides the core of the gt CLI: goals that own trees of
//! tasks, dependency-gated completion, goal progress aggregation and daily
//! completion streaks.
//!
//! # Core Concepts
//!
//! - **Goals**: containers whose progress follows the share of done tasks
//! - **Task trees**: tasks nest under a parent in the same goal
//! - **Dependencies**: a task cannot be done while a dependency is not
//! - **Daily tracking**: buckets and streaks keyed by `completion_date`
//!
//! # Module Organization
//!
//! - `engine`: every goal and task operation, run in store transactions
//! - `hierarchy`: flat task lists to parent/child trees
//! - `deps`: blocking evaluation and dependency validation
//! - `gate`: the completion state machine
//! - `progress`: goal progress aggregation
//! - `daily`: daily buckets, completion history and streaks
//! - `store`: the record store trait with memory and file backends
//! - `storage`: on-disk layout of the JSON snapshot
//! - `lock`: file locking and atomic writes
//! - `config`: configuration loading from `.goaltrack.toml`
//! - `events`: domain events as JSON lines
//! - `cli`: command-line interface using clap

pub mod cli;
pub mod config;
pub mod daily;
pub mod deps;
pub mod engine;
pub mod error;
pub mod events;
pub mod gate;
pub mod hierarchy;
pub mod ids;
pub mod lock;
pub mod model;
pub mod output;
pub mod progress;
pub mod storage;
pub mod store;

pub use engine::Engine;
pub use error::{Error, Result};
pub use store::{FileStore, MemoryStore, Store};
