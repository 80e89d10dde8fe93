// ABOUTME: robots.txt policy gate checked once before extraction begins.
// ABOUTME: Fetches {origin}/robots.txt and evaluates User-agent groups; any failure is permissive.

use tracing::{debug, warn};
use url::Url;

use crate::resource::{fetch, FetchOptions};

#[derive(Debug)]
struct Rule {
    allow: bool,
    path: String,
}

#[derive(Debug, Default)]
struct Group {
    agents: Vec<String>,
    rules: Vec<Rule>,
}

/// Check whether the page URL may be fetched for the given user agent.
///
/// The policy lives at the page origin's `/robots.txt`. A missing,
/// unreadable, or unparsable policy is treated as permissive; robots.txt
/// is advisory and an unreachable file must not block the run.
pub async fn robots_allow(client: &reqwest::Client, page: &Url, user_agent: &str) -> bool {
    let Some(host) = page.host_str() else {
        return true;
    };
    let mut origin = format!("{}://{}", page.scheme(), host);
    if let Some(port) = page.port() {
        origin.push_str(&format!(":{}", port));
    }
    let robots_url = format!("{}/robots.txt", origin);

    let opts = FetchOptions {
        tolerate_errors: true,
        ..Default::default()
    };
    let result = match fetch(client, &robots_url, &opts).await {
        Ok(r) => r,
        Err(e) => {
            warn!(url = %robots_url, error = %e, "robots.txt not retrievable, defaulting to allow");
            return true;
        }
    };
    if result.status >= 400 {
        debug!(url = %robots_url, status = result.status, "no robots.txt, allowing");
        return true;
    }

    let mut path = page.path().to_string();
    if let Some(query) = page.query() {
        path.push('?');
        path.push_str(query);
    }
    evaluate(&result.text_utf8(), user_agent, &path)
}

/// Evaluate robots.txt rules for a user agent against a request path.
///
/// Group selection prefers agent-specific groups over the `*` wildcard.
/// Within the selected groups the longest matching path prefix wins, and
/// an Allow rule beats a Disallow rule of equal length.
fn evaluate(text: &str, user_agent: &str, path: &str) -> bool {
    let groups = parse_groups(text);
    let ua = user_agent.to_lowercase();

    let specific: Vec<&Group> = groups
        .iter()
        .filter(|g| g.agents.iter().any(|a| a != "*" && ua.contains(a.as_str())))
        .collect();
    let selected: Vec<&Group> = if !specific.is_empty() {
        specific
    } else {
        groups
            .iter()
            .filter(|g| g.agents.iter().any(|a| a == "*"))
            .collect()
    };

    let mut best_len = 0usize;
    let mut best_allow = true;
    for group in selected {
        for rule in &group.rules {
            if rule.path.is_empty() {
                // "Disallow:" with no path means allow everything.
                continue;
            }
            if path.starts_with(&rule.path) {
                let len = rule.path.len();
                if len > best_len || (len == best_len && rule.allow) {
                    best_len = len;
                    best_allow = rule.allow;
                }
            }
        }
    }
    best_allow
}

fn parse_groups(text: &str) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut current = Group::default();
    // A run of user-agent lines opens a new group once a rule follows it.
    let mut in_agent_run = false;

    for line in text.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        match key.as_str() {
            "user-agent" => {
                if !in_agent_run {
                    if !current.agents.is_empty() {
                        groups.push(std::mem::take(&mut current));
                    }
                    in_agent_run = true;
                }
                current.agents.push(value.to_lowercase());
            }
            "allow" | "disallow" => {
                if !current.agents.is_empty() {
                    in_agent_run = false;
                    current.rules.push(Rule {
                        allow: key == "allow",
                        path: value.to_string(),
                    });
                }
            }
            // sitemap, crawl-delay and anything unknown are ignored
            _ => {}
        }
    }
    if !current.agents.is_empty() {
        groups.push(current);
    }
    groups
}
