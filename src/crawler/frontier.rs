//! Per-site breadth-first frontier
//!
//! A FIFO queue of `(url, depth)` entries plus the visited set for one site.
//! Neither structure is bounded; the per-site page budget and the optional
//! depth limit are the only caps on their growth.

use crate::url::{is_same_site, normalize_url, registrable_domain};
use std::collections::{HashSet, VecDeque};

/// A URL waiting to be crawled, with its link distance from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: u32,
}

/// Breadth-first scheduler for a single site
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
    scope_domain: String,
    depth_limit: Option<u32>,
}

impl Frontier {
    /// Creates a frontier scoped to the seed's registrable domain
    ///
    /// The seed is enqueued at depth 0. Returns `None` when the seed has no
    /// host to scope the crawl to.
    pub fn new(seed: &str, depth_limit: Option<u32>) -> Option<Self> {
        let scope_domain = registrable_domain(seed)?;
        let mut queue = VecDeque::new();
        queue.push_back(FrontierEntry {
            url: seed.to_string(),
            depth: 0,
        });

        Some(Self {
            queue,
            visited: HashSet::new(),
            scope_domain,
            depth_limit,
        })
    }

    /// Registrable domain every followed link must share
    pub fn scope_domain(&self) -> &str {
        &self.scope_domain
    }

    /// Removes and returns the oldest entry
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    /// Records a normalized URL as visited
    ///
    /// Returns false when it was already visited. Check and insert happen in a
    /// single step.
    pub fn mark_visited(&mut self, normalized: &str) -> bool {
        self.visited.insert(normalized.to_string())
    }

    /// Checks whether a normalized URL was already visited
    pub fn is_visited(&self, normalized: &str) -> bool {
        self.visited.contains(normalized)
    }

    /// Returns true when children of a page at `depth` may be enqueued
    pub fn can_descend(&self, depth: u32) -> bool {
        self.depth_limit.map_or(true, |limit| depth < limit)
    }

    /// Enqueues the same-site, unvisited links found on a page at `parent_depth`
    ///
    /// Nothing is added once the depth limit is reached.
    ///
    /// # Arguments
    ///
    /// * `links` - Absolute links found on the page
    /// * `parent_depth` - Depth of the page the links were found on
    ///
    /// # Returns
    ///
    /// The number of entries added to the queue.
    pub fn enqueue_links(&mut self, links: &[String], parent_depth: u32) -> usize {
        if !self.can_descend(parent_depth) {
            return 0;
        }

        let mut added = 0;
        for link in links {
            if !is_same_site(&self.scope_domain, link) {
                continue;
            }
            if self.is_visited(&normalize_url(link)) {
                continue;
            }
            self.queue.push_back(FrontierEntry {
                url: link.clone(),
                depth: parent_depth + 1,
            });
            added += 1;
        }
        added
    }

    /// Number of entries waiting
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true when nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
