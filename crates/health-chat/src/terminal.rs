//! Drawing rendered entries on a terminal.
//!
//! Layout and colouring are split so that layout can be checked without
//! escape codes in the way.

use health_chat_core::render::{Alignment, RenderDescriptor, RenderMode, StyleClass};
use owo_colors::OwoColorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

const BAR_CHAR: &str = "▎";

/// Lays out a descriptor as plain lines, `width` columns wide.
///
/// Markup is converted to text first. Trailing entries are padded so
/// that their longest line ends at the last column; leading entries are
/// left as they are.
pub fn layout(descriptor: &RenderDescriptor, width: usize) -> Vec<String> {
    // Leave room for the bar and the badge.
    let inner_width = width.saturating_sub(4).max(20);
    let text = match descriptor.mode {
        RenderMode::Text => descriptor.body.clone(),
        RenderMode::Markup => {
            html2text::from_read(descriptor.body.as_bytes(), inner_width)
        }
    };

    let lines: Vec<&str> = text.trim_end().lines().collect();
    match descriptor.alignment {
        Alignment::Leading => lines.into_iter().map(str::to_owned).collect(),
        Alignment::Trailing => {
            let longest = lines
                .iter()
                .map(|line| line.chars().count())
                .max()
                .unwrap_or(0);
            let pad = inner_width.saturating_sub(longest);
            lines
                .into_iter()
                .map(|line| format!("{}{line}", " ".repeat(pad)))
                .collect()
        }
    }
}

/// Lays out and colours a descriptor, ready to be printed.
pub fn paint(descriptor: &RenderDescriptor, width: usize) -> String {
    let mut out = String::new();
    for (idx, line) in layout(descriptor, width).into_iter().enumerate() {
        let badge = if idx == 0 {
            match descriptor.style {
                StyleClass::User => "🙂",
                StyleClass::Bot => "🩺",
            }
        } else {
            "  "
        };
        let painted = match descriptor.style {
            StyleClass::User => format!(
                "{} {}{}\n",
                line.bright_white(),
                badge,
                BAR_CHAR.bright_blue()
            ),
            StyleClass::Bot => format!(
                "{}{} {}\n",
                BAR_CHAR.bright_green(),
                badge,
                line.bright_white()
            ),
        };
        out.push_str(&painted);
    }
    out
}

/// Reads typed queries one line at a time.
///
/// One reader lives for the whole conversation: lines that arrive together
/// (pasted or piped) stay buffered until they are asked for.
#[derive(Debug)]
pub struct Prompt<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> Prompt<R> {
    /// Creates a prompt reading from `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Returns the next line, or `None` once the input is exhausted or
    /// cannot be read.
    pub async fn next_query(&mut self) -> Option<String> {
        match self.lines.next_line().await {
            Ok(line) => line,
            Err(err) => {
                error!("error reading input: {err}");
                None
            }
        }
    }
}
