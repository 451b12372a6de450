//! # Declarative
//!
//! A framework for declarative resource management.
//!
//! This crate provides the core abstractions for declaring desired state,
//! detecting current state, and converging a resource to match it.
//!
//! ## Core Concepts
//!
//! - **Resource**: Something that can be present or absent and has comparable fields
//! - **Ensure**: The desired presence (`present` / `absent`)
//! - **Action**: The corrective step (`NoChange`, `Create`, `Update`, `Delete`)
//! - **Convergence**: What was planned and what was actually applied
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{ApplyContext, Ensure, Resource, converge};
//!
//! #[derive(Debug)]
//! struct Motd { text: String }
//!
//! impl Resource for Motd {
//!     type Current = String;
//!
//!     fn id(&self) -> &str { "/etc/motd" }
//!     fn resource_type(&self) -> &'static str { "file" }
//!     fn ensure(&self) -> Ensure { Ensure::Present }
//!
//!     fn current_state(&self) -> anyhow::Result<Option<String>> {
//!         Ok(std::fs::read_to_string("/etc/motd").ok())
//!     }
//!
//!     fn needs_update(&self, current: &String) -> bool { *current != self.text }
//!     fn create(&self) -> anyhow::Result<()> { Ok(std::fs::write("/etc/motd", &self.text)?) }
//!     fn update(&self, _: &String) -> anyhow::Result<()> { self.create() }
//!     fn delete(&self) -> anyhow::Result<()> { Ok(std::fs::remove_file("/etc/motd")?) }
//! }
//!
//! let outcome = converge(&Motd { text: "hello\n".into() }, &ApplyContext::check())?;
//! println!("changed: {}", outcome.changed());
//! ```

pub mod context;
pub mod executor;
pub mod planner;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::ApplyContext;
pub use executor::converge;
pub use planner::{plan, plan_resource};
pub use resource::Resource;
pub use types::{Action, ApplyResult, Convergence, Ensure};
