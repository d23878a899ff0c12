//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `SiteState`: Lifecycle of one site's crawl (idle, fetching robots, draining the queue, done)
//! - `PolitenessClock`: Request spacing derived from robots.txt and configuration
//! - `PolitenessRegistry`: One shared clock per origin across a run

mod politeness;
mod site_state;

// Re-export main types
pub use politeness::{PolitenessClock, PolitenessRegistry, SharedClock};
pub use site_state::SiteState;
