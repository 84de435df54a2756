//! Markdown to HTML conversion on top of `pulldown-cmark`.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

/// Result of converting a Markdown body.
#[derive(Debug, Default)]
pub(crate) struct Converted {
    /// Rendered HTML.
    pub html: String,
    /// Text of the leading H1 heading, when extracted.
    pub title: Option<String>,
    /// Conversion diagnostics.
    pub diagnostics: Vec<String>,
}

/// Convert Markdown to HTML.
///
/// When `extract_title` is set and the body opens with an H1 heading, that
/// heading is removed from the output and returned as the title. Heading
/// levels that skip past the next expected level produce an
/// "out of sequence" diagnostic.
pub(crate) fn convert(markdown: &str, gfm: bool, extract_title: bool) -> Converted {
    let mut events: Vec<Event<'_>> = Parser::new_ext(markdown, parser_options(gfm)).collect();

    let title = if extract_title {
        take_leading_title(&mut events)
    } else {
        None
    };

    let diagnostics = check_heading_sequence(&events);

    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut html, events.into_iter());

    Converted {
        html,
        title,
        diagnostics,
    }
}

fn parser_options(gfm: bool) -> Options {
    if gfm {
        Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM
    } else {
        Options::empty()
    }
}

/// Remove a leading H1 heading from `events` and return its plain text.
fn take_leading_title(events: &mut Vec<Event<'_>>) -> Option<String> {
    if !matches!(
        events.first(),
        Some(Event::Start(Tag::Heading {
            level: HeadingLevel::H1,
            ..
        }))
    ) {
        return None;
    }

    let end = events
        .iter()
        .position(|e| matches!(e, Event::End(TagEnd::Heading(HeadingLevel::H1))))?;

    let mut title = String::new();
    for event in events.drain(..=end) {
        match event {
            Event::Text(text) | Event::Code(text) => title.push_str(&text),
            Event::SoftBreak | Event::HardBreak => title.push(' '),
            _ => {}
        }
    }

    Some(title.trim().to_owned())
}

/// Report headings that skip levels. The document title counts as level 1.
fn check_heading_sequence(events: &[Event<'_>]) -> Vec<String> {
    let mut diagnostics = Vec::new();
    let mut previous = 1;

    for event in events {
        if let Event::Start(Tag::Heading { level, .. }) = event {
            let current = heading_level_to_num(*level);
            if current > previous + 1 {
                diagnostics.push(format!(
                    "section title out of sequence: expected level {}, got level {current}",
                    previous + 1
                ));
            }
            previous = current;
        }
    }

    diagnostics
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
