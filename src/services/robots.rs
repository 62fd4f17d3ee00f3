//! robots.txt rules.
//!
//! Only consulted when a crawl opts in; a missing or unreadable robots.txt
//! allows everything.

use url::Url;

use crate::services::Fetcher;

/// Allow/Disallow rules that apply to our user agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsRules {
    disallow: Vec<String>,
    allow: Vec<String>,
}

impl RobotsRules {
    /// Rules that allow every path.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Parse robots.txt content for `user_agent`.
    ///
    /// Consecutive `User-agent` lines share one group. Groups naming our
    /// agent replace the `*` groups.
    pub fn parse(content: &str, user_agent: &str) -> Self {
        let ua_lower = user_agent.to_lowercase();
        let mut specific = Self::default();
        let mut wildcard = Self::default();
        let mut found_specific = false;

        // agents of the current group
        let mut in_agent_lines = false;
        let mut group_specific = false;
        let mut group_wildcard = false;

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            let Some((directive, value)) = line.split_once(':') else {
                continue;
            };
            let directive = directive.trim().to_lowercase();
            let value = value.trim();

            if directive == "user-agent" {
                if !in_agent_lines {
                    in_agent_lines = true;
                    group_specific = false;
                    group_wildcard = false;
                }
                let agent = value.to_lowercase();
                if agent == "*" {
                    group_wildcard = true;
                } else if !agent.is_empty() && ua_lower.contains(&agent) {
                    group_specific = true;
                    found_specific = true;
                }
                continue;
            }
            in_agent_lines = false;

            let rules = if group_specific {
                &mut specific
            } else if group_wildcard {
                &mut wildcard
            } else {
                continue;
            };
            match directive.as_str() {
                "disallow" if !value.is_empty() => rules.disallow.push(encode_rule(value)),
                "allow" if !value.is_empty() => rules.allow.push(encode_rule(value)),
                _ => {}
            }
        }

        if found_specific { specific } else { wildcard }
    }

    /// Fetch and parse `/robots.txt` for the origin of `seed`.
    pub fn fetch<F: Fetcher + ?Sized>(fetcher: &F, seed: &Url, user_agent: &str) -> Self {
        let Ok(robots_url) = seed.join("/robots.txt") else {
            return Self::allow_all();
        };

        match fetcher.fetch(&robots_url, false) {
            Ok(page) if page.status < 400 => Self::parse(&page.body, user_agent),
            Ok(page) => {
                log::debug!("No robots.txt at {} (HTTP {})", robots_url, page.status);
                Self::allow_all()
            }
            Err(e) => {
                log::debug!("Failed to fetch {}: {}", robots_url, e);
                Self::allow_all()
            }
        }
    }

    /// Whether `url` may be fetched. The longest matching rule wins; ties go to Allow.
    pub fn is_allowed(&self, url: &Url) -> bool {
        let target = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };

        let longest = |patterns: &[String]| {
            patterns
                .iter()
                .filter(|p| path_matches(&target, p))
                .map(String::len)
                .max()
                .unwrap_or(0)
        };

        longest(&self.allow) >= longest(&self.disallow)
    }
}

/// Percent-encode a rule the way `url` encodes paths, so rules written in
/// plain text match the encoded request path.
fn encode_rule(rule: &str) -> String {
    let mut encoded = String::with_capacity(rule.len());
    for c in rule.chars() {
        if c.is_ascii() && c != ' ' {
            encoded.push(c);
        } else {
            let mut buf = [0; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                encoded.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    encoded
}

/// Match a path against a robots pattern supporting `*` and a trailing `$`.
fn path_matches(path: &str, pattern: &str) -> bool {
    let (pattern, anchored) = match pattern.strip_suffix('$') {
        Some(stripped) => (stripped, true),
        None => (pattern, false),
    };

    if !pattern.contains('*') {
        return if anchored {
            path == pattern
        } else {
            path.starts_with(pattern)
        };
    }

    let mut pos = 0;
    for (i, part) in pattern.split('*').enumerate() {
        if part.is_empty() {
            continue;
        }
        match path[pos..].find(part) {
            Some(found) if i == 0 && found != 0 => return false,
            Some(found) => pos += found + part.len(),
            None => return false,
        }
    }

    !anchored || pattern.ends_with('*') || pos == path.len()
}
