//! robots.txt compliance
//!
//! The policy is fetched once at crawl start. If the file is unreachable or
//! unparsable the crawler defaults to allow-all; a disallowed URL is a policy
//! rejection, not an error.

use reqwest::Client;
use tracing::{debug, info};
use url::Url;

/// Disallow rules for the wildcard user agent, prefix-matched against paths.
#[derive(Debug, Default)]
pub struct RobotsPolicy {
    disallowed: Vec<String>,
}

impl RobotsPolicy {
    /// Fetch and parse `<base>/robots.txt`. Any failure yields the permissive
    /// default.
    pub async fn load(client: &Client, base_url: &Url) -> Self {
        let robots_url = match base_url.join("/robots.txt") {
            Ok(url) => url,
            Err(_) => return Self::default(),
        };

        let body = match client.get(robots_url.clone()).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(text) => text,
                Err(_) => return Self::default(),
            },
            _ => {
                info!("could not load robots.txt from {}, allowing all", robots_url);
                return Self::default();
            }
        };

        let policy = Self::parse(&body);
        debug!(
            "loaded robots.txt with {} disallow rules",
            policy.disallowed.len()
        );
        policy
    }

    /// Parse the rules that apply to `User-agent: *`.
    pub fn parse(body: &str) -> Self {
        let mut disallowed = Vec::new();
        let mut applies = false;

        for line in body.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let Some((field, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match field.trim().to_lowercase().as_str() {
                "user-agent" => applies = value == "*",
                "disallow" if applies && !value.is_empty() => {
                    disallowed.push(value.to_string());
                }
                _ => {}
            }
        }

        Self { disallowed }
    }

    /// Whether the URL's path may be fetched.
    pub fn allows(&self, url: &Url) -> bool {
        let path = url.path();
        !self.disallowed.iter().any(|rule| path.starts_with(rule))
    }
}
