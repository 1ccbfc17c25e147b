//! Conversation-related types.

/// The greeting every new transcript starts with.
pub const GREETING: &str =
    "Hello! I’m your Public Health Assistant. How may I assist you today?";

/// Who an entry is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sender {
    /// The person typing into the session.
    User,
    /// The answering service, or the session speaking on its behalf.
    Bot,
}

/// The body of an entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Content {
    /// Literal text, never interpreted.
    PlainText(String),
    /// Markup to be interpreted when rendered.
    ///
    /// The string is kept exactly as the endpoint sent it. See
    /// [`MarkupPolicy`](crate::render::MarkupPolicy) for what happens to it
    /// at render time.
    Markup(String),
}

impl Content {
    /// Returns the raw string of this content, whatever its variant.
    #[inline]
    pub fn as_str(&self) -> &str {
        match self {
            Content::PlainText(text) | Content::Markup(text) => text.as_str(),
        }
    }
}

/// One message in the transcript.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Entry {
    sender: Sender,
    content: Content,
}

impl Entry {
    /// Creates an entry.
    #[inline]
    pub fn new(sender: Sender, content: Content) -> Self {
        Self { sender, content }
    }

    /// Creates a plain-text entry from the user.
    #[inline]
    pub fn user<S: Into<String>>(text: S) -> Self {
        Self::new(Sender::User, Content::PlainText(text.into()))
    }

    /// Creates an entry from the bot.
    #[inline]
    pub fn bot(content: Content) -> Self {
        Self::new(Sender::Bot, content)
    }

    /// Returns who sent this entry.
    #[inline]
    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// Returns the body of this entry.
    #[inline]
    pub fn content(&self) -> &Content {
        &self.content
    }
}

/// An ordered, append-only list of entries.
///
/// Insertion order is display order. Entries are never edited or removed,
/// so the length only ever grows.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    /// Creates a transcript holding a single bot entry with `greeting`.
    pub fn seeded<S: Into<String>>(greeting: S) -> Self {
        Self {
            entries: vec![Entry::bot(Content::PlainText(greeting.into()))],
        }
    }

    /// Appends an entry at the tail.
    #[inline]
    pub fn append(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Returns all entries in display order.
    #[inline]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false` for a seeded transcript; provided for completeness.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the most recent entry.
    #[inline]
    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }
}

impl Default for Transcript {
    #[inline]
    fn default() -> Self {
        Self::seeded(GREETING)
    }
}
