//! Upstream embed providers.
//!
//! - [`registry`] -- the immutable provider table.
//! - [`template`] -- per-provider path templates and the URL generator.
//! - [`request`] -- validated media requests and internal path construction.

pub mod registry;
pub mod request;
pub mod template;

pub use registry::{Provider, ProviderRegistry};
pub use request::{Episode, MediaRequest, MediaType};
pub use template::{movie_url, tv_url, PathTemplate, BUILTIN_PROVIDERS};
