use crate::export::{save_to_csv, summarize};
use crate::gateway::{AgentGateway, QueryResult};
use crate::parse::{Command, HELP};
use crate::render::{render_chat, render_detail, render_page};
use crate::session::{Applied, SearchSession, Ticket, GREETING};
use crate::util::format_hms;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error};
use serde_json::Value;
use std::io::Write;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};

fn pending_message(count: usize) -> String {
    format!("agent is typing... ({} pending)", count)
}

/// A query that came back from the agent, successfully or not.
struct Settled {
    ticket: Ticket,
    result: QueryResult<Value>,
    started: Instant,
}

enum Flow {
    Continue,
    Quit,
}

/// Interactive search loop: reads questions and commands from stdin while
/// earlier questions are still in flight.
pub struct Console<'g> {
    gateway: &'g AgentGateway,
    session: SearchSession,
    pending: FuturesUnordered<BoxFuture<'g, Settled>>,
    spinner: Option<ProgressBar>,
}

impl<'g> Console<'g> {
    pub fn new(gateway: &'g AgentGateway, session: SearchSession) -> Self {
        Self {
            gateway,
            session,
            pending: FuturesUnordered::new(),
            spinner: None,
        }
    }

    pub async fn run(mut self, initial_query: Option<&str>) -> std::io::Result<()> {
        println!("agent: {}", GREETING);
        println!("(type :help for commands)");
        if let Some(query) = initial_query {
            self.submit(query);
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;
        self.prompt();

        while stdin_open || !self.pending.is_empty() {
            tokio::select! {
                line = lines.next_line(), if stdin_open => {
                    match line? {
                        Some(line) => {
                            if let Flow::Quit = self.handle(Command::parse(&line)) {
                                break;
                            }
                            self.prompt();
                        }
                        None => {
                            debug!("stdin closed with {} queries in flight", self.pending.len());
                            stdin_open = false;
                        }
                    }
                }
                Some(settled) = self.pending.next(), if !self.pending.is_empty() => {
                    self.settle(settled);
                    if stdin_open {
                        self.prompt();
                    }
                }
            }
        }

        self.stop_spinner();
        Ok(())
    }

    fn submit(&mut self, query: &str) {
        let Some(ticket) = self.session.begin(query) else {
            return;
        };
        let gateway = self.gateway;
        let started = Instant::now();
        self.pending.push(
            async move {
                let result = gateway.submit(ticket.query()).await;
                Settled {
                    ticket,
                    result,
                    started,
                }
            }
            .boxed(),
        );
        self.start_spinner();
    }

    fn settle(&mut self, settled: Settled) {
        let Settled {
            ticket,
            result,
            started,
        } = settled;
        let elapsed = format_hms(started.elapsed());
        debug!("Query #{} settled after {}", ticket.seq(), elapsed);

        match self.session.apply(&ticket, result) {
            Applied::Updated { count } => {
                let mut text = String::new();
                if let Some(answer) = self.session.answer() {
                    text.push_str(&format!("agent: {}\n", answer));
                }
                text.push_str(&format!(
                    "\"{}\": {} sightings ({})\n{}",
                    ticket.query(),
                    count,
                    elapsed,
                    render_page(&self.session.view())
                ));
                self.say(&text);
            }
            Applied::Failed(kind) => {
                self.say(&format!("agent: {} ({})", kind.user_message(), elapsed));
            }
            Applied::Stale => {
                self.say(&format!(
                    "(answer to \"{}\" arrived after a newer question and was ignored)",
                    ticket.query()
                ));
            }
        }

        if self.pending.is_empty() {
            self.stop_spinner();
        } else {
            self.refresh_spinner();
        }
    }

    fn handle(&mut self, command: Command) -> Flow {
        match command {
            Command::Query(query) => self.submit(&query),
            Command::Next => {
                self.session.next_page();
                self.show_page();
            }
            Command::Prev => {
                self.session.prev_page();
                self.show_page();
            }
            Command::PageSize(size) => {
                self.session.set_page_size(size);
                self.show_page();
            }
            Command::Page => self.show_page(),
            Command::Open(position) => match self.session.select(position) {
                Some(record) => {
                    let text = format!("{}\n(selected observation {})", render_detail(record), record.id);
                    self.say(&text);
                }
                None => self.say(&format!("No result {} on this page", position)),
            },
            Command::Summary => {
                let summary = summarize(self.session.records());
                self.say(&summary.to_string());
            }
            Command::Save(path) => match save_to_csv(self.session.records(), &path) {
                Ok(()) => self.say(&format!(
                    "Saved {} sightings to {}",
                    self.session.records().len(),
                    path
                )),
                Err(e) => {
                    error!("Could not save sightings to {}: {}", path, e);
                    self.say(&format!("Could not save to {}: {}", path, e));
                }
            },
            Command::History => self.say(&render_chat(self.session.chat())),
            Command::Help => self.say(HELP),
            Command::Invalid(message) => self.say(&message),
            Command::Empty => {}
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn show_page(&self) {
        self.say(&render_page(&self.session.view()));
    }

    fn say(&self, text: &str) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(|| println!("{}", text)),
            None => println!("{}", text),
        }
    }

    fn prompt(&self) {
        let print = || {
            print!("> ");
            let _ = std::io::stdout().flush();
        };
        match &self.spinner {
            Some(spinner) => spinner.suspend(print),
            None => print(),
        }
    }

    fn start_spinner(&mut self) {
        self.spinner.get_or_insert_with(|| {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
                spinner.set_style(style);
            }
            spinner.enable_steady_tick(Duration::from_millis(120));
            spinner
        });
        self.refresh_spinner();
    }

    fn refresh_spinner(&self) {
        if let Some(spinner) = &self.spinner {
            spinner.set_message(pending_message(self.pending.len()));
        }
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;
    use crate::pager::PageSize;
    use serde_json::json;
    use std::future;

    fn gateway() -> AgentGateway {
        AgentGateway::new(&AgentConfig::new("http://127.0.0.1:9", "/observations/query")).unwrap()
    }

    fn settled(ticket: Ticket, ids: std::ops::Range<i64>) -> Settled {
        let records: Vec<Value> = ids.map(|id| json!({ "id": id })).collect();
        Settled {
            ticket,
            result: QueryResult::Success {
                answer: None,
                records: Value::Array(records),
            },
            started: Instant::now(),
        }
    }

    #[test]
    fn test_late_answer_does_not_replace_newer_one() {
        let gateway = gateway();
        let mut console = Console::new(&gateway, SearchSession::new(PageSize::Ten));
        let older = console.session.begin("aves").unwrap();
        let newer = console.session.begin("monos").unwrap();

        console.settle(settled(newer, 0..3));
        console.settle(settled(older, 0..40));

        assert_eq!(console.session.records().len(), 3);
    }

    #[test]
    fn test_failure_keeps_current_page() {
        let gateway = gateway();
        let mut console = Console::new(&gateway, SearchSession::new(PageSize::Ten));
        let ticket = console.session.begin("aves").unwrap();
        console.settle(settled(ticket, 0..25));
        console.handle(Command::Next);

        let ticket = console.session.begin("reptiles").unwrap();
        console.settle(Settled {
            ticket,
            result: QueryResult::Failure {
                reason: crate::error::ErrorKind::ServerError,
            },
            started: Instant::now(),
        });

        let view = console.session.view();
        assert_eq!(view.current_page, 2);
        assert_eq!(view.visible_range.total, 25);
    }

    #[test]
    fn test_page_commands_and_quit() {
        let gateway = gateway();
        let mut console = Console::new(&gateway, SearchSession::new(PageSize::Ten));
        let ticket = console.session.begin("aves").unwrap();
        console.settle(settled(ticket, 0..45));

        assert!(matches!(console.handle(Command::PageSize(PageSize::Twenty)), Flow::Continue));
        console.handle(Command::Next);
        console.handle(Command::Next);
        console.handle(Command::Next);
        assert_eq!(console.session.view().current_page, 3);
        console.handle(Command::Prev);
        assert_eq!(console.session.view().current_page, 2);
        assert!(matches!(console.handle(Command::Empty), Flow::Continue));
        assert!(matches!(console.handle(Command::Quit), Flow::Quit));
    }

    #[test]
    fn test_spinner_count_follows_pending_queries() {
        let gateway = gateway();
        let mut console = Console::new(&gateway, SearchSession::new(PageSize::Ten));
        let first = console.session.begin("aves").unwrap();
        let second = console.session.begin("monos").unwrap();
        console.pending.push(future::pending().boxed());
        console.pending.push(future::pending().boxed());
        console.start_spinner();
        assert_eq!(
            console.spinner.as_ref().unwrap().message(),
            pending_message(2)
        );

        // One query comes back while the other is still in flight.
        console.pending = std::iter::once(future::pending().boxed()).collect();
        console.settle(settled(first, 0..2));
        assert_eq!(
            console.spinner.as_ref().unwrap().message(),
            pending_message(1)
        );

        console.pending = FuturesUnordered::new();
        console.settle(settled(second, 0..1));
        assert!(console.spinner.is_none());
    }
}
