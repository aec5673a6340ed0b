//! Markdown to plain text.
//!
//! Page bodies are indexed as text so that link targets, emphasis
//! markers and fence syntax do not end up as search terms.

use pulldown_cmark::{Event, Options, Parser, TagEnd};

/// Render markdown as plain text, one line per block
pub fn cleanup_markdown(input: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut output = String::with_capacity(input.len());
    for event in Parser::new_ext(input, options) {
        match event {
            Event::Text(text) | Event::Code(text) => output.push_str(&text),
            Event::SoftBreak | Event::HardBreak => output.push('\n'),
            Event::End(TagEnd::TableCell) => output.push(' '),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::TableRow
                | TagEnd::TableHead,
            ) => {
                if !output.ends_with('\n') {
                    output.push('\n');
                }
            }
            _ => {}
        }
    }

    output.trim_end().to_string()
}
