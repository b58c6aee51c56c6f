use crate::config::{DEFAULT_AGENT_URL, DEFAULT_QUERY_PATH};
use crate::pager::PageSize;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "sightings")]
#[command(about = "Ask the observations agent about urban wildlife sightings and page through the results")]
#[command(version = "0.1")]
pub(crate) struct Args {
    /// Base URL of the observations agent
    #[arg(short, long, env = "SIGHTINGS_AGENT_URL", default_value = DEFAULT_AGENT_URL)]
    pub agent_url: String,

    /// Path of the natural-language query endpoint
    #[arg(long, default_value = DEFAULT_QUERY_PATH)]
    pub query_path: String,

    /// Request timeout in seconds
    #[arg(short, long, default_value = "30")]
    pub timeout: u64,

    /// Records per page (10, 20, 30 or 50)
    #[arg(short, long, default_value = "10")]
    pub page_size: PageSize,

    /// Query to run on startup
    #[arg(short, long)]
    pub query: Option<String>,

    /// Run the startup query, print the first page and exit
    #[arg(long, requires = "query")]
    pub once: bool,

    /// Print the page as JSON instead of text (with --once)
    #[arg(long, requires = "once")]
    pub json: bool,

    /// Write the full result set to this CSV file (with --once)
    #[arg(short, long, requires = "once")]
    pub output: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// What a line typed into the console asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Query(String),
    Next,
    Prev,
    PageSize(PageSize),
    Open(usize),
    Page,
    Summary,
    Save(String),
    History,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        let Some(command) = line.strip_prefix(':') else {
            return Command::Query(line.to_string());
        };

        let mut parts = command.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).unwrap_or_default();

        match (name, arg) {
            ("next" | "n", "") => Command::Next,
            ("prev" | "p", "") => Command::Prev,
            ("page", "") => Command::Page,
            ("summary", "") => Command::Summary,
            ("history", "") => Command::History,
            ("help" | "h" | "?", "") => Command::Help,
            ("quit" | "q", "") => Command::Quit,
            ("size", size) => match size.parse::<PageSize>() {
                Ok(size) => Command::PageSize(size),
                Err(e) => Command::Invalid(e.to_string()),
            },
            ("open" | "o", position) => match position.parse::<usize>() {
                Ok(position) if position > 0 => Command::Open(position),
                _ => Command::Invalid(format!("expected a result number, got '{}'", position)),
            },
            ("save", "") => Command::Invalid("usage: :save PATH".to_string()),
            ("save", path) => Command::Save(path.to_string()),
            _ => Command::Invalid(format!("unknown command ':{}', try :help", command)),
        }
    }
}

pub(crate) const HELP: &str = "\
Type a question to search sightings, or one of:
  :next, :n         next page
  :prev, :p         previous page
  :size N           records per page (10, 20, 30, 50)
  :open N           show result N of the current page
  :page             show the current page again
  :summary          species and locations in the result set
  :save PATH        write the result set to a CSV file
  :history          show the conversation
  :quit, :q         leave";
