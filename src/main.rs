mod config;
mod console;
mod error;
mod export;
mod gateway;
mod normalize;
mod pager;
mod parse;
mod record;
mod render;
mod session;
mod util;

use crate::config::AgentConfig;
use crate::console::Console;
use crate::export::save_to_csv;
use crate::gateway::AgentGateway;
use crate::pager::PageView;
use crate::parse::Args;
use crate::render::render_page;
use crate::session::{Applied, SearchSession};
use crate::util::print_hms;
use clap::Parser;
use log::info;
use serde::Serialize;
use std::time::Instant;

#[derive(Serialize)]
struct JsonReport<'a> {
    query: &'a str,
    answer: Option<&'a str>,
    #[serde(flatten)]
    page: PageView<'a>,
}

/// Run a single question, print the first page of results and optionally
/// export the whole result set.
async fn run_once(
    gateway: &AgentGateway,
    session: &mut SearchSession,
    args: &Args,
    query: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let ticket = session
        .begin(query)
        .ok_or("the startup query is empty")?;

    let start = Instant::now();
    let result = gateway.submit(ticket.query()).await;
    if let Applied::Failed(kind) = session.apply(&ticket, result) {
        return Err(kind.user_message().into());
    }

    if args.json {
        let report = JsonReport {
            query: ticket.query(),
            answer: session.answer(),
            page: session.view(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if let Some(answer) = session.answer() {
            println!("agent: {}", answer);
        }
        println!("{}", render_page(&session.view()));
        print_hms(&start);
    }

    if let Some(output) = &args.output {
        save_to_csv(session.records(), output)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::try_parse()?;
    // Initialize logger
    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = AgentConfig::from(&args);
    let gateway = AgentGateway::new(&config)?;
    let mut session = SearchSession::new(config.page_size);
    info!("Using observations agent at {}", gateway.endpoint());

    match args.query.as_deref() {
        Some(query) if args.once => run_once(&gateway, &mut session, &args, query).await?,
        initial => Console::new(&gateway, session).run(initial).await?,
    }

    Ok(())
}
