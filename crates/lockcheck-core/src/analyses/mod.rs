//! Built-in lock file analyses
//!
//! Each analysis is a [`crate::Visitor`]. The index-based ones also expose
//! a pure function over a [`crate::VersionIndex`] so they can be used
//! without a visitor.

mod duplicate_urls;
mod insecure_uri;
mod manifest;
mod registry;

pub use duplicate_urls::{duplicate_url_findings, DuplicateUrlsVisitor};
pub use insecure_uri::{is_insecure_url, InsecureUriVisitor};
pub use manifest::{manifest_findings, ManifestConsistencyVisitor};
pub use registry::{registry_findings, registry_origin, RegistryConsistencyVisitor};
