//! Robots.txt parser implementation
//!
//! Only the first `User-agent: *` group is honored. Any later `User-agent`
//! line ends that group and parsing stops.

use crate::robots::RobotsPolicy;

/// Longest crawl delay honored, in milliseconds
pub const MAX_CRAWL_DELAY_MILLIS: u64 = 60_000;

impl RobotsPolicy {
    /// Parses raw robots.txt content into a policy
    ///
    /// Empty content yields [`RobotsPolicy::allow_all`]. Directive keys are
    /// matched case-insensitively; `Crawl-delay` accepts fractional seconds and
    /// is capped at [`MAX_CRAWL_DELAY_MILLIS`].
    pub fn parse(content: &str) -> Self {
        if content.trim().is_empty() {
            return Self::allow_all();
        }

        let mut policy = Self::default();
        let mut in_wildcard_group = false;

        for line in content.lines() {
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let Some((key, value)) = trimmed.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            if key == "user-agent" {
                if in_wildcard_group {
                    break;
                }
                in_wildcard_group = value == "*";
                continue;
            }

            if !in_wildcard_group {
                continue;
            }

            match key.as_str() {
                "disallow" if !value.is_empty() => {
                    policy.disallowed_patterns.insert(value.to_string());
                }
                "allow" if !value.is_empty() => {
                    policy.allowed_patterns.insert(value.to_string());
                }
                "crawl-delay" => {
                    if let Some(millis) = parse_delay_millis(value) {
                        policy.crawl_delay_millis = millis;
                    }
                }
                _ => {}
            }
        }

        policy
    }
}

fn parse_delay_millis(value: &str) -> Option<u64> {
    let seconds: f64 = value.parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }

    let millis = (seconds * 1000.0).round();
    if millis > MAX_CRAWL_DELAY_MILLIS as f64 {
        tracing::warn!(
            "Crawl-delay of {}s exceeds the {}ms cap, using the cap",
            value,
            MAX_CRAWL_DELAY_MILLIS
        );
        return Some(MAX_CRAWL_DELAY_MILLIS);
    }

    Some(millis as u64)
}
