use crate::error::ErrorKind;
use crate::gateway::QueryResult;
use crate::normalize::normalize;
use crate::pager::{PageSize, PageView, Pager};
use crate::record::ObservationRecord;
use chrono::{DateTime, Local};
use log::info;
use serde_json::Value;

pub const GREETING: &str =
    "Hi! I'm your AI agent, here to help you search sightings. What would you like to discover today?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    Agent,
    User,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub author: Author,
    pub text: String,
    pub sent_at: DateTime<Local>,
}

impl ChatMessage {
    fn new(author: Author, text: impl Into<String>) -> Self {
        Self {
            author,
            text: text.into(),
            sent_at: Local::now(),
        }
    }
}

/// Handle for one submitted query. Sequence numbers increase strictly in
/// submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    query: String,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The result set was replaced with `count` records.
    Updated { count: usize },
    /// The query failed; the previous results are still shown.
    Failed(ErrorKind),
    /// A newer query already settled, so this result was discarded.
    Stale,
}

/// State of the search view: the paged result set, the agent's last answer
/// and the conversation that produced them.
pub struct SearchSession {
    pager: Pager,
    answer: Option<String>,
    chat: Vec<ChatMessage>,
    last_issued: u64,
    last_settled: u64,
}

impl SearchSession {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            pager: Pager::new(page_size),
            answer: None,
            chat: vec![ChatMessage::new(Author::Agent, GREETING)],
            last_issued: 0,
            last_settled: 0,
        }
    }

    /// Register a query about to be sent. Blank input is refused.
    pub fn begin(&mut self, query: &str) -> Option<Ticket> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        self.last_issued += 1;
        self.chat.push(ChatMessage::new(Author::User, query));
        Some(Ticket {
            seq: self.last_issued,
            query: query.to_string(),
        })
    }

    /// Apply a gateway result, unless a query submitted after `ticket` has
    /// already settled. Failures leave the current results and page alone.
    pub fn apply(&mut self, ticket: &Ticket, result: QueryResult<Value>) -> Applied {
        if ticket.seq <= self.last_settled {
            info!(
                "Discarding stale result for query #{} (latest settled #{})",
                ticket.seq, self.last_settled
            );
            return Applied::Stale;
        }
        self.last_settled = ticket.seq;

        match result.map_records(|raw| normalize(&raw)) {
            QueryResult::Success { answer, records } => {
                let count = records.len();
                if let Some(text) = &answer {
                    self.chat.push(ChatMessage::new(Author::Agent, text.as_str()));
                }
                self.answer = answer;
                self.pager.set_records(records);
                Applied::Updated { count }
            }
            QueryResult::Failure { reason } => {
                self.chat
                    .push(ChatMessage::new(Author::Agent, reason.user_message()));
                Applied::Failed(reason)
            }
        }
    }

    /// Record at 1-based `position` on the visible page.
    pub fn select(&self, position: usize) -> Option<&ObservationRecord> {
        position
            .checked_sub(1)
            .and_then(|index| self.pager.visible_slice().get(index))
    }

    pub fn next_page(&mut self) {
        self.pager.next_page();
    }

    pub fn prev_page(&mut self) {
        self.pager.prev_page();
    }

    pub fn set_page_size(&mut self, size: PageSize) {
        self.pager.set_page_size(size);
    }

    pub fn view(&self) -> PageView<'_> {
        self.pager.view()
    }

    pub fn records(&self) -> &[ObservationRecord] {
        self.pager.records()
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn chat(&self) -> &[ChatMessage] {
        &self.chat
    }
}
