//! Projection of a transcript into something a surface can draw.
//!
//! Rendering is a pure function of the transcript: the same transcript
//! always yields the same descriptors. Surfaces decide how to draw an
//! alignment or a style class; this module only decides which applies.
//!
//! # Trust boundary
//!
//! Markup entries come straight from the remote endpoint. They are stored
//! verbatim, and [`MarkupPolicy`] decides what reaches the surface. With
//! the default [`MarkupPolicy::Sanitize`], the body goes through
//! [`sanitize_markup`] first. [`MarkupPolicy::Trusted`] hands the
//! endpoint's markup to the surface untouched; only opt into it when the
//! endpoint is fully under your control.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::transcript::{Content, Entry, Sender, Transcript};

/// Where an entry sits horizontally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// Start of the line (left in left-to-right layouts).
    Leading,
    /// End of the line (right in left-to-right layouts).
    Trailing,
}

/// The visual style an entry is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleClass {
    /// Bubbles written by the user.
    User,
    /// Bubbles written by the bot, including error notices.
    Bot,
}

/// How the body of a descriptor must be drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Draw as literal text. Any markup characters must be escaped.
    Text,
    /// Interpret the body as markup.
    Markup,
}

/// Everything a surface needs to draw one entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RenderDescriptor {
    /// Horizontal placement.
    pub alignment: Alignment,
    /// Visual style.
    pub style: StyleClass,
    /// Whether the body is literal text or markup.
    pub mode: RenderMode,
    /// The body to draw, already passed through the [`MarkupPolicy`].
    pub body: String,
}

/// What happens to markup from the endpoint before it is rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MarkupPolicy {
    /// Strip everything outside a small allow-list of formatting tags.
    #[default]
    Sanitize,
    /// Pass the markup through verbatim.
    Trusted,
}

impl Transcript {
    /// Renders every entry, in order.
    pub fn render(&self, policy: MarkupPolicy) -> Vec<RenderDescriptor> {
        self.entries()
            .iter()
            .map(|entry| render_entry(entry, policy))
            .collect()
    }
}

/// Renders a single entry.
pub fn render_entry(entry: &Entry, policy: MarkupPolicy) -> RenderDescriptor {
    let (alignment, style) = match entry.sender() {
        Sender::User => (Alignment::Trailing, StyleClass::User),
        Sender::Bot => (Alignment::Leading, StyleClass::Bot),
    };
    let (mode, body) = match (entry.content(), policy) {
        (Content::PlainText(text), _) => (RenderMode::Text, text.clone()),
        (Content::Markup(html), MarkupPolicy::Trusted) => {
            (RenderMode::Markup, html.clone())
        }
        (Content::Markup(html), MarkupPolicy::Sanitize) => {
            (RenderMode::Markup, sanitize_markup(html))
        }
    };
    RenderDescriptor {
        alignment,
        style,
        mode,
        body,
    }
}

/// Elements removed together with everything inside them.
const DROPPED_ELEMENTS: &[&str] =
    &["script", "style", "iframe", "object", "embed", "template"];

/// Elements kept (without attributes). Anything else is unwrapped.
const ALLOWED_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "ul", "ol", "li", "strong", "b",
    "em", "i", "br", "div", "span", "code", "pre", "blockquote",
];

static DROPPED_ELEMENT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    DROPPED_ELEMENTS
        .iter()
        .map(|name| {
            Regex::new(&format!(r"(?is)<{name}\b[^>]*>.*?</{name}\s*>"))
                .unwrap()
        })
        .collect()
});

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?(-->|$)").unwrap());

/// A whole tag, or a lone angle bracket that does not start or end one.
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)\b[^<>]*>|[<>]").unwrap()
});

/// Reduces endpoint markup to a safe subset.
///
/// - `script`, `style`, `iframe`, `object`, `embed` and `template`
///   elements are removed with their content, as are comments.
/// - Allowed formatting tags (headings, paragraphs, lists, emphasis,
///   `div`/`span`, code blocks, quotes, line breaks) are kept but lose all
///   of their attributes, so no inline handlers or styles survive.
/// - Every other tag is removed while its text is kept.
/// - Any `<` or `>` that is not part of a tag is escaped, so removing a
///   tag can never splice its neighbours into a new one.
///
/// The only markup in the output is therefore the allowed tags, bare.
pub fn sanitize_markup(html: &str) -> String {
    let mut out = html.to_owned();
    for re in DROPPED_ELEMENT_RES.iter() {
        out = re.replace_all(&out, "").into_owned();
    }
    out = COMMENT_RE.replace_all(&out, "").into_owned();

    TOKEN_RE
        .replace_all(&out, |caps: &Captures<'_>| {
            let Some(name) = caps.get(2) else {
                let escaped = if &caps[0] == "<" { "&lt;" } else { "&gt;" };
                return escaped.to_owned();
            };
            let closing = &caps[1];
            let name = name.as_str().to_ascii_lowercase();
            if ALLOWED_TAGS.contains(&name.as_str()) {
                format!("<{closing}{name}>")
            } else {
                String::new()
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_and_mode() {
        let mut transcript = Transcript::seeded("Hi");
        transcript.append(Entry::user("What is malaria?"));
        transcript.append(Entry::bot(Content::Markup("<b>Rest</b>".into())));

        let descriptors = transcript.render(MarkupPolicy::default());
        assert_eq!(descriptors.len(), 3);

        assert_eq!(descriptors[0].alignment, Alignment::Leading);
        assert_eq!(descriptors[0].style, StyleClass::Bot);
        assert_eq!(descriptors[0].mode, RenderMode::Text);

        assert_eq!(descriptors[1].alignment, Alignment::Trailing);
        assert_eq!(descriptors[1].style, StyleClass::User);
        assert_eq!(descriptors[1].mode, RenderMode::Text);
        assert_eq!(descriptors[1].body, "What is malaria?");

        assert_eq!(descriptors[2].alignment, Alignment::Leading);
        assert_eq!(descriptors[2].mode, RenderMode::Markup);
        assert_eq!(descriptors[2].body, "<b>Rest</b>");
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut transcript = Transcript::default();
        transcript.append(Entry::user("Symptoms of dengue?"));
        transcript.append(Entry::bot(Content::Markup(
            "<h3>Symptoms</h3><script>x()</script>".into(),
        )));

        for policy in [MarkupPolicy::Sanitize, MarkupPolicy::Trusted] {
            assert_eq!(transcript.render(policy), transcript.render(policy));
        }
    }

    #[test]
    fn test_plain_text_is_never_sanitized() {
        let mut transcript = Transcript::default();
        transcript.append(Entry::user("<script>is this html?</script>"));

        let descriptors = transcript.render(MarkupPolicy::Sanitize);
        assert_eq!(descriptors[1].mode, RenderMode::Text);
        assert_eq!(descriptors[1].body, "<script>is this html?</script>");
    }

    #[test]
    fn test_trusted_passes_markup_through() {
        let html = r#"<div style="color:red"><script>x()</script></div>"#;
        let entry = Entry::bot(Content::Markup(html.to_owned()));
        let descriptor = render_entry(&entry, MarkupPolicy::Trusted);
        assert_eq!(descriptor.body, html);
    }

    #[test]
    fn test_sanitize_keeps_structure() {
        let html = r#"
<div style="line-height:1.6;"><h3>Prevention</h3><!-- generated -->
<p onclick="steal()">Use <strong class="badge">nets</strong></p>
<ul><li>Drain standing water</li></ul>
<script type="text/javascript">alert(1)</script>
<style>h3 { color: #1f4d3a; }</style>
<img src=x onerror="alert(2)"><a href="javascript:void(0)">more</a></div>"#;

        let expected = "
<div><h3>Prevention</h3>
<p>Use <strong>nets</strong></p>
<ul><li>Drain standing water</li></ul>


more</div>";
        assert_eq!(sanitize_markup(html), expected);
    }

    #[test]
    fn test_sanitize_is_case_insensitive() {
        assert_eq!(
            sanitize_markup("<SCRIPT>evil()</Script><B>ok</B><BR/>"),
            "<b>ok</b><br>"
        );
    }

    #[test]
    fn test_removed_tags_cannot_splice_new_ones() {
        assert_eq!(
            sanitize_markup("<<x>img src=x onerror=alert(1)>"),
            "&lt;img src=x onerror=alert(1)&gt;"
        );

        let out = sanitize_markup("<<x>script>alert(1)<</x>/script>");
        assert_eq!(out, "&lt;script&gt;alert(1)&lt;/script&gt;");
        assert!(!out.contains('<'));
    }

    #[test]
    fn test_stray_brackets_are_escaped() {
        assert_eq!(
            sanitize_markup("<p>1 < 2 and 3 > 2</p><b"),
            "<p>1 &lt; 2 and 3 &gt; 2</p>&lt;b"
        );
        assert_eq!(
            sanitize_markup(r#"<b title="<i>">x</b>"#),
            "&lt;b title=\"<i>\"&gt;x</b>"
        );
    }
}
