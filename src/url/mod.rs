//! URL handling module for Happyhour-Scout
//!
//! This module provides canonicalization for duplicate detection, host
//! comparison helpers, and extension-based resource classification.

mod classify;
mod domain;
mod normalize;

// Re-export main functions
pub use classify::{classify, ResourceKind};
pub use domain::{extract_domain, same_host, same_origin_and_path};
pub use normalize::{canonicalize, parse_seed_url};
