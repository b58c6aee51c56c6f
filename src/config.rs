use crate::pager::PageSize;
use crate::parse::Args;
use std::time::Duration;

pub const DEFAULT_AGENT_URL: &str = "http://localhost:8000";
pub const DEFAULT_QUERY_PATH: &str = "/observations/query";

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub page_size: PageSize,
}

impl AgentConfig {
    pub fn new(base_url: &str, query_path: &str) -> Self {
        Self {
            endpoint: join_url(base_url, query_path),
            timeout: Duration::from_secs(30),
            page_size: PageSize::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }
}

impl From<&Args> for AgentConfig {
    fn from(args: &Args) -> Self {
        AgentConfig::new(&args.agent_url, &args.query_path)
            .with_timeout(Duration::from_secs(args.timeout))
            .with_page_size(args.page_size)
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://localhost:8000", "/observations/query"),
            "http://localhost:8000/observations/query"
        );
        assert_eq!(
            join_url("http://localhost:8000/", "observations/query"),
            "http://localhost:8000/observations/query"
        );
        assert_eq!(join_url("http://agent/", "/"), "http://agent");
    }

    #[test]
    fn test_config_from_args() {
        let args = Args::try_parse_from([
            "sightings",
            "--agent-url",
            "http://agent:9000/",
            "--timeout",
            "5",
            "--page-size",
            "30",
        ])
        .unwrap();
        let config = AgentConfig::from(&args);
        assert_eq!(config.endpoint, "http://agent:9000/observations/query");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.page_size, PageSize::Thirty);
    }
}
