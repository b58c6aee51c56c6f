use crate::pager::{PageView, VisibleRange};
use crate::record::ObservationRecord;
use crate::session::{Author, ChatMessage};
use std::fmt::Write;

const NO_PHOTO: &str = "(no photo)";
const UNNAMED: &str = "(unnamed species)";

pub fn render_range(range: &VisibleRange) -> String {
    if range.is_empty() {
        "No sightings to show".to_string()
    } else {
        format!("Showing {}-{} of {}", range.start, range.end, range.total)
    }
}

fn display_or<'a>(text: &'a str, fallback: &'a str) -> &'a str {
    if text.is_empty() { fallback } else { text }
}

/// One result card, numbered by its position on the page.
pub fn render_card(position: usize, record: &ObservationRecord) -> String {
    let mut card = format!(
        "[{:>2}] {}",
        position,
        display_or(&record.common_name, UNNAMED)
    );
    if !record.scientific_name.is_empty() {
        let _ = write!(card, " ({})", record.scientific_name);
    }
    let _ = write!(card, "\n     {}", record.observed_on());
    if !record.location.is_empty() {
        let _ = write!(card, " | {}", record.location);
    }
    let _ = write!(
        card,
        "\n     {}",
        record.image_url.as_deref().unwrap_or(NO_PHOTO)
    );
    card
}

pub fn render_page(view: &PageView<'_>) -> String {
    let mut out = format!("Sightings found ({})\n", view.visible_range.total);
    if view.visible_slice.is_empty() {
        out.push_str("  Ask the agent about species, places or sightings to get started.\n");
    }
    for (index, record) in view.visible_slice.iter().enumerate() {
        out.push_str(&render_card(index + 1, record));
        out.push('\n');
    }
    let _ = write!(
        out,
        "{} | page {}/{} | {} per page",
        render_range(&view.visible_range),
        view.current_page,
        view.total_pages,
        view.page_size
    );
    out
}

pub fn render_detail(record: &ObservationRecord) -> String {
    format!(
        "Observation {}\n  Common name:     {}\n  Scientific name: {}\n  Location:        {}\n  Observed on:     {}\n  Photo:           {}",
        record.id,
        display_or(&record.common_name, "-"),
        display_or(&record.scientific_name, "-"),
        display_or(&record.location, "-"),
        record.observed_on(),
        record.image_url.as_deref().unwrap_or(NO_PHOTO)
    )
}

pub fn render_message(message: &ChatMessage) -> String {
    let who = match message.author {
        Author::Agent => "agent",
        Author::User => "you",
    };
    format!("[{}] {}: {}", message.sent_at.format("%H:%M"), who, message.text)
}

pub fn render_chat(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(render_message)
        .collect::<Vec<_>>()
        .join("\n")
}
