use std::fmt::{self, Write as _};

use chrono::{DateTime, Local, Utc};

use super::Screen;
use crate::models::Story;

pub fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M").to_string()
}

/// Renders one story as a text card.
pub fn render_card(story: &Story) -> String {
    let mut out = String::with_capacity(story.summary.len() + story.scripture.text.len() + 256);

    let _ = write!(out, "[{}]", story.continent.name().to_uppercase());
    if let Some(url) = &story.source_url {
        let _ = write!(out, "  View Source: {}", url);
    }
    out.push('\n');

    let _ = writeln!(out, "{}", story.title);
    let _ = writeln!(out, "{}", story.summary);
    out.push('\n');
    let _ = writeln!(out, "  IDEOLOGY  {}", story.ideology);
    let _ = writeln!(out, "  \u{201c}{}\u{201d}", story.scripture.text);
    let _ = writeln!(out, "      \u{2014} {}", story.scripture.reference);
    let _ = writeln!(out, "  Perspective: {}", story.scripture.application);

    out
}

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Idle { continent } => writeln!(f, "Trending in {}", continent),
            Screen::Loading { continent } => {
                writeln!(f, "Searching global headlines for {}...", continent)
            }
            Screen::Error { message, .. } => {
                writeln!(f, "{}", message)?;
                writeln!(f, "(r) Retry")
            }
            Screen::Empty {
                continent,
                last_updated,
            } => {
                writeln!(f, "Trending in {}", continent)?;
                writeln!(f, "Last updated: {}", format_time(*last_updated))?;
                writeln!(f)?;
                writeln!(f, "No stories found for this region.")
            }
            Screen::Feed {
                continent,
                last_updated,
                updating,
                stories,
            } => {
                write!(f, "Trending in {}", continent)?;
                if *updating {
                    write!(f, "  Updating...")?;
                }
                writeln!(f)?;
                writeln!(f, "Last updated: {}", format_time(*last_updated))?;
                for story in stories.iter() {
                    writeln!(f)?;
                    f.write_str(&render_card(story))?;
                }
                Ok(())
            }
        }
    }
}
