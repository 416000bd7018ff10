//! Ticker rendering and display surfaces.
//!
//! `render` turns a ticker into [`Rendered`] content using the format
//! template. A [`Surface`] is anything that can fade out, take new content,
//! and fade back in; the controller drives it.

use std::fmt;
use std::time::Duration;

use futures_util::future::BoxFuture;

use crate::model::Ticker;

/// Placeholder substituted in the format template.
pub const PLACEHOLDER: &str = "%s";

/// A piece of rendered content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    /// Ticker text shown as a link opening in a new browsing context.
    Link { text: String, href: String },
}

/// Content produced from one ticker and the format template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    segments: Vec<Segment>,
}

impl Rendered {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Visible text with links flattened to their text.
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) | Segment::Link { text, .. } => text.as_str(),
            })
            .collect()
    }

    /// Link target, if the ticker text is shown as a link.
    pub fn link(&self) -> Option<&str> {
        self.segments.iter().find_map(|segment| match segment {
            Segment::Link { href, .. } => Some(href.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// HTML markup; links become `<a href=".." target="_blank">..</a>`.
    ///
    /// Ticker text, short names and hrefs are escaped, so markup inside a
    /// ticker shows up as text instead of being inserted into the page.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => html.push_str(&escape_html(text)),
                Segment::Link { text, href } => {
                    html.push_str("<a href=\"");
                    html.push_str(&escape_html(href));
                    html.push_str("\" target=\"_blank\">");
                    html.push_str(&escape_html(text));
                    html.push_str("</a>");
                }
            }
        }
        html
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Text(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Text(text.to_string()));
        }
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.plain_text())
    }
}

/// Renders `ticker` with `format`.
///
/// The first `%s` takes the ticker text (as a link when the ticker has one
/// and `show_links` is set), the second `%s` takes the short name. Further
/// placeholders stay literal.
///
/// Placeholders are only looked up in the template. A `%s` inside the
/// ticker text is never filled with the short name, which is what a
/// sequential string replace over the partly filled template would do.
pub fn render(format: &str, ticker: &Ticker, show_links: bool) -> Rendered {
    let mut rendered = Rendered::default();

    let Some((head, tail)) = format.split_once(PLACEHOLDER) else {
        rendered.push_text(format);
        return rendered;
    };

    rendered.push_text(head);
    match (&ticker.link, show_links) {
        (Some(href), true) => rendered.segments.push(Segment::Link {
            text: ticker.text.clone(),
            href: href.clone(),
        }),
        _ => rendered.push_text(&ticker.text),
    }

    match tail.split_once(PLACEHOLDER) {
        Some((middle, rest)) => {
            rendered.push_text(middle);
            rendered.push_text(&ticker.short);
            rendered.push_text(rest);
        }
        None => rendered.push_text(tail),
    }

    rendered
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// A display that shows one rendered ticker at a time.
///
/// The controller calls `fade_out`, `set_content`, `fade_in` in that order
/// for each update; the returned futures resolve once the animation is done.
pub trait Surface: Send + Sync {
    fn fade_out(&self, duration: Duration) -> BoxFuture<'_, ()>;

    fn set_content(&self, content: Rendered);

    fn fade_in(&self, duration: Duration) -> BoxFuture<'_, ()>;
}


#[cfg(test)]
mod tests {
    use super::*;

    fn ticker() -> Ticker {
        Ticker::new("Bahn pünktlich", "ssi")
    }

    #[test]
    fn test_render_default_template() {
        let rendered = render("+++ %s +++ (%s)", &ticker(), true);
        assert_eq!(rendered.plain_text(), "+++ Bahn pünktlich +++ (ssi)");
        assert_eq!(rendered.segments().len(), 1);
        assert_eq!(rendered.link(), None);
    }

    #[test]
    fn test_render_wraps_text_in_link() {
        let linked = ticker().with_link("https://example.com/1");
        let rendered = render("+++ %s +++ (%s)", &linked, true);

        assert_eq!(
            rendered.segments(),
            &[
                Segment::Text("+++ ".to_string()),
                Segment::Link {
                    text: "Bahn pünktlich".to_string(),
                    href: "https://example.com/1".to_string(),
                },
                Segment::Text(" +++ (ssi)".to_string()),
            ]
        );
        assert_eq!(
            rendered.to_html(),
            "+++ <a href=\"https://example.com/1\" target=\"_blank\">Bahn pünktlich</a> +++ (ssi)"
        );
    }

    #[test]
    fn test_render_ignores_link_when_links_disabled() {
        let linked = ticker().with_link("https://example.com/1");
        let rendered = render("+++ %s +++ (%s)", &linked, false);
        assert_eq!(rendered.link(), None);
        assert_eq!(rendered.to_html(), "+++ Bahn pünktlich +++ (ssi)");
    }

    #[test]
    fn test_render_replaces_only_two_placeholders() {
        let rendered = render("%s|%s|%s", &ticker(), true);
        assert_eq!(rendered.plain_text(), "Bahn pünktlich|ssi|%s");
    }

    #[test]
    fn test_render_single_placeholder_drops_short() {
        let rendered = render("News: %s", &ticker(), true);
        assert_eq!(rendered.plain_text(), "News: Bahn pünktlich");
    }

    #[test]
    fn test_render_without_placeholders_is_literal() {
        let rendered = render("static", &ticker(), true);
        assert_eq!(rendered.plain_text(), "static");
    }

    #[test]
    fn test_render_does_not_rescan_inserted_text() {
        let tricky = Ticker::new("100%sicher", "abc");
        let rendered = render("%s (%s)", &tricky, true);
        assert_eq!(rendered.plain_text(), "100%sicher (abc)");
    }

    #[test]
    fn test_render_short_goes_to_template_placeholder_not_text() {
        let ticker = Ticker::new("50%s", "X").with_link("https://example.com/?q=%s");
        let rendered = render("+++ %s +++ (%s)", &ticker, true);
        assert_eq!(rendered.plain_text(), "+++ 50%s +++ (X)");
        assert_eq!(rendered.link(), Some("https://example.com/?q=%s"));
    }

    #[test]
    fn test_to_html_escapes_link_text() {
        let ticker = Ticker::new("<b>Eil</b>", "e").with_link("https://example.com/?a=1&b=2");
        let rendered = render("%s", &ticker, true);
        assert_eq!(
            rendered.to_html(),
            "<a href=\"https://example.com/?a=1&amp;b=2\" target=\"_blank\">&lt;b&gt;Eil&lt;/b&gt;</a>"
        );
    }

    #[test]
    fn test_to_html_escapes_markup() {
        let rendered = render("%s (%s)", &Ticker::new("<b>&</b>", "\"x\""), true);
        assert_eq!(
            rendered.to_html(),
            "&lt;b&gt;&amp;&lt;/b&gt; (&quot;x&quot;)"
        );
    }
}
