//! # Engine Module
//!
//! Runtime plumbing shared by the pipeline workflows.
//!
//! - **Configuration** ([`config`]) - Paths, tool commands, Psi4 and mesher settings, the
//!   molecule worklist and the failure policy
//! - **Error Handling** ([`error`]) - The umbrella [`error::PipelineError`] with molecule and
//!   stage context
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events for front ends
//! - **Scratch Space** ([`scratch`]) - A per-molecule working directory emptied on
//!   acquisition and on release
//! - **External Tools** ([`tools`]) - The [`tools::ToolRunner`] seam through which the
//!   converter, Psi4 and the mesher are invoked

pub mod config;
pub mod error;
pub mod progress;
pub mod scratch;
pub mod stage;
pub mod tools;
