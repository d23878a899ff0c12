//! URL handling module for Tidecrawl
//!
//! This module provides URL normalization, scope-domain extraction and href
//! resolution. Normalization is string-based; host handling goes through the
//! `url` crate.

mod domain;
mod normalize;
mod resolve;

pub use domain::{is_same_site, origin_of, registrable_domain, scheme_of};
pub use normalize::normalize_url;
pub use resolve::{resolve_asset, resolve_link};
