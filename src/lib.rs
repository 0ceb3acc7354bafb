//! config-audit: clone one repository, summarize it, ask an AI model for its
//! environment-specific configuration, and publish the result as CSV.
//!
//! Stages run in order inside [`pipeline::run`]; each external tool or service
//! sits behind a trait in [`pipeline::Collaborators`] so tests can swap in fakes.

pub mod acquire;
pub mod cli;
pub mod context;
pub mod credentials;
pub mod deps;
pub mod error;
pub mod ext;
pub mod logging;
pub mod model_api;
pub mod pipeline;
pub mod publish;
pub mod report;
pub mod request;
pub mod summary;
pub mod util;
pub mod workspace;
