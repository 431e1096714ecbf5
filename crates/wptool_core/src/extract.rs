use scraper::{ElementRef, Html};

const PARAGRAPH_TAGS: [&str; 10] = [
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "dd",
    "dt",
    "blockquote",
];

const CONTAINER_TAGS: [&str; 14] = [
    "html", "body", "div", "section", "article", "main", "center", "figure", "dl", "table",
    "tbody", "tr", "td", "th",
];

/// Convert an HTML extract into the plain text the text renderer consumes.
///
/// Paragraph-like blocks are separated by a blank line and list items become
/// ` * item` lines.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut blocks = Vec::new();
    collect_blocks(fragment.root_element(), &mut blocks);
    blocks.join("\n\n")
}

/// Walk `element`, emitting one block per paragraph-like child. Text nodes and
/// inline elements between blocks are gathered into a single block.
fn collect_blocks(element: ElementRef<'_>, blocks: &mut Vec<String>) {
    let mut inline = String::new();
    for child in element.children() {
        let Some(child_element) = ElementRef::wrap(child) else {
            if let Some(text) = child.value().as_text() {
                inline.push_str(text);
            }
            continue;
        };

        match child_element.value().name() {
            name if PARAGRAPH_TAGS.contains(&name) => {
                flush_inline(&mut inline, blocks);
                push_block(blocks, element_text(child_element));
            }
            "ul" | "ol" => {
                flush_inline(&mut inline, blocks);
                let items = child_element
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|item| item.value().name() == "li")
                    .map(element_text)
                    .filter(|text| !text.is_empty())
                    .map(|text| format!(" * {text}"))
                    .collect::<Vec<_>>();
                push_block(blocks, items.join("\n"));
            }
            "script" | "style" => {}
            "br" => inline.push(' '),
            name if CONTAINER_TAGS.contains(&name) => {
                flush_inline(&mut inline, blocks);
                collect_blocks(child_element, blocks);
            }
            _ => inline.extend(child_element.text()),
        }
    }
    flush_inline(&mut inline, blocks);
}

fn flush_inline(inline: &mut String, blocks: &mut Vec<String>) {
    push_block(blocks, collapse_whitespace(inline.as_str()));
    inline.clear();
}

fn push_block(blocks: &mut Vec<String>, text: String) {
    if !text.is_empty() {
        blocks.push(text);
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
