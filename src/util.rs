use std::time::{Duration, Instant};

pub fn format_hms(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    let secs = elapsed.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h {:02}m {:02}s", h, m, s)
    } else if m > 0 {
        format!("{}m {:02}s", m, s)
    } else if secs > 0 {
        format!("{}.{:03}s", s, millis % 1000)
    } else {
        format!("{}ms", millis)
    }
}

/// Print the time elapsed since `start`
pub fn print_hms(start: &Instant) {
    println!("({})", format_hms(start.elapsed()));
}
