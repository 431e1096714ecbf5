use std::sync::LazyLock;

use html_escape::{encode_double_quoted_attribute, encode_text};
use regex::Regex;
use textwrap::{Options, WrapAlgorithm};

use crate::page::{Page, PageData};

pub const DEFAULT_WRAP_WIDTH: usize = 70;
pub const PAGE_IMAGE_TOKEN: &str = "pageimage";
const HTML_IMAGE_WIDTH: u32 = 240;

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ ]+\*[ ]+").expect("bullet pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOptions {
    pub no_wrap: bool,
    pub width: usize,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            no_wrap: false,
            width: DEFAULT_WRAP_WIDTH,
        }
    }
}

/// URL of the page's preferred image, if it has one.
pub fn resolve_image(page: &Page) -> Option<&str> {
    page.images(PAGE_IMAGE_TOKEN)
        .into_iter()
        .next()
        .map(|image| image.url.as_str())
        .filter(|url| !url.is_empty())
}

pub fn render_text(page: &Page, no_wrap: bool) -> String {
    render_text_with(
        page,
        &TextOptions {
            no_wrap,
            ..TextOptions::default()
        },
    )
}

/// Plain-text view: sections are emitted in the order
/// title, description, url, body, image and separated by a blank line.
pub fn render_text_with(page: &Page, options: &TextOptions) -> String {
    let data = &page.data;

    let title = format!(
        "{}\n{}",
        data.title,
        "=".repeat(data.title.chars().count())
    );
    let description = non_empty(data.description.as_deref()).map(|desc| format!("_{desc}_"));
    let image = resolve_image(page).map(|source| format!("![{}]({source})", alt_text(data)));
    let body = non_empty(data.extext.as_deref()).map(|extext| text_body(data, extext, options));
    let url = format!("<{}>", data.url);

    join_sections([Some(title), description, Some(url), body, image], "\n\n")
}

fn text_body(data: &PageData, extext: &str, options: &TextOptions) -> String {
    let normalized = BULLET.replace_all(extext, "* ");
    let mut paragraphs = normalized
        .split("\n\n")
        .map(|paragraph| {
            if options.no_wrap {
                paragraph.to_string()
            } else {
                let wrap = Options::new(options.width.max(1))
                    .wrap_algorithm(WrapAlgorithm::FirstFit);
                textwrap::fill(paragraph, wrap)
            }
        })
        .collect::<Vec<_>>();

    if data.disambiguation && !data.links.is_empty() {
        paragraphs.push(format!(" * {}", data.links.join("\n * ")));
    }
    paragraphs.join("\n\n")
}

/// HTML view: linked title block, floated image, then the raw extract.
pub fn render_html(page: &Page) -> String {
    let data = &page.data;

    let description = non_empty(data.description.as_deref()).unwrap_or("description");
    let title = format!(
        "<p><a href=\"{}\">{}</a>&mdash;<i>{}</i></p>",
        encode_double_quoted_attribute(&data.url),
        encode_text(&data.title),
        encode_text(description)
    );
    let image = resolve_image(page).map(|source| {
        let alt = encode_double_quoted_attribute(alt_text(data));
        format!(
            "<img src=\"{}\" alt=\"{alt}\" title=\"{alt}\" align=\"right\" width=\"{HTML_IMAGE_WIDTH}\">",
            encode_double_quoted_attribute(source)
        )
    });
    let extract = non_empty(data.extract.as_deref()).map(ToString::to_string);

    join_sections([Some(title), image, extract], "\n")
}

fn alt_text(data: &PageData) -> &str {
    non_empty(data.label.as_deref()).unwrap_or(&data.title)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

fn join_sections<const N: usize>(sections: [Option<String>; N], separator: &str) -> String {
    sections
        .into_iter()
        .flatten()
        .filter(|section| !section.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::ImageRecord;

    fn page(title: &str, extext: Option<&str>) -> Page {
        Page::new(PageData {
            title: title.to_string(),
            url: format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
            extext: extext.map(ToString::to_string),
            ..PageData::default()
        })
    }

    fn with_image(mut page: Page, url: &str) -> Page {
        page.data.images.push(ImageRecord {
            kind: "query-pageimage".to_string(),
            url: url.to_string(),
            file: Some("Bar.jpg".to_string()),
        });
        page
    }

    #[test]
    fn resolve_image_prefers_first_pageimage() {
        let mut page = page("Bar", None);
        assert_eq!(resolve_image(&page), None);

        page.data.images.push(ImageRecord {
            kind: "query-thumbnail".to_string(),
            url: "https://img/thumb.jpg".to_string(),
            ..ImageRecord::default()
        });
        assert_eq!(resolve_image(&page), None);

        let page = with_image(with_image(page, "https://img/first.jpg"), "https://img/second.jpg");
        assert_eq!(resolve_image(&page), Some("https://img/first.jpg"));
    }

    #[test]
    fn resolve_image_only_considers_first_pageimage() {
        let page = with_image(with_image(page("Bar", None), ""), "https://img/second.jpg");
        assert_eq!(resolve_image(&page), None);
    }

    #[test]
    fn plain_page_sections_are_title_url_body() {
        let page = page("Bar", Some("Short body."));
        assert_eq!(
            render_text(&page, false),
            "Bar\n===\n\n<https://en.wikipedia.org/wiki/Bar>\n\nShort body."
        );
    }

    #[test]
    fn description_and_image_take_their_fixed_slots() {
        let mut page = with_image(page("Bar", Some("Body.")), "https://img/bar.jpg");
        page.data.description = Some("a place to drink".to_string());
        page.data.label = Some("The Bar".to_string());
        assert_eq!(
            render_text(&page, false),
            "Bar\n===\n\n_a place to drink_\n\n<https://en.wikipedia.org/wiki/Bar>\n\nBody.\n\n![The Bar](https://img/bar.jpg)"
        );
    }

    #[test]
    fn image_alt_falls_back_to_title() {
        let mut page = with_image(page("Bar", None), "https://img/bar.jpg");
        page.data.label = Some(String::new());
        assert!(render_text(&page, false).ends_with("![Bar](https://img/bar.jpg)"));
    }

    #[test]
    fn missing_body_is_omitted() {
        let page = page("Bar", None);
        assert_eq!(
            render_text(&page, false),
            "Bar\n===\n\n<https://en.wikipedia.org/wiki/Bar>"
        );
    }

    #[test]
    fn underline_counts_characters_not_bytes() {
        let page = page("Łódź", None);
        assert!(render_text(&page, true).starts_with("Łódź\n====\n\n"));
    }

    #[test]
    fn paragraphs_are_wrapped_to_width() {
        let long = "word ".repeat(60);
        let extext = format!("{}\n\n{}", long.trim(), long.trim());
        let output = render_text(&page("Bar", Some(&extext)), false);
        let body = output.split("\n\n").skip(2).collect::<Vec<_>>();
        assert_eq!(body.len(), 2);
        for paragraph in body {
            assert!(paragraph.lines().count() > 1);
            assert!(paragraph.lines().all(|line| line.chars().count() <= DEFAULT_WRAP_WIDTH));
        }
    }

    #[test]
    fn custom_width_is_respected() {
        let extext = "alpha beta gamma delta epsilon zeta eta theta";
        let output = render_text_with(
            &page("Bar", Some(extext)),
            &TextOptions {
                no_wrap: false,
                width: 12,
            },
        );
        let body = output.rsplit("\n\n").next().expect("body");
        assert!(body.lines().all(|line| line.chars().count() <= 12));
    }

    #[test]
    fn wrapping_fills_lines_greedily() {
        let extext = "eeeeeeee ffff gggggg hh ii";
        let output = render_text_with(
            &page("Bar", Some(extext)),
            &TextOptions {
                no_wrap: false,
                width: 20,
            },
        );
        let body = output.rsplit("\n\n").next().expect("body");
        assert_eq!(body, "eeeeeeee ffff gggggg\nhh ii");
    }

    #[test]
    fn nowrap_keeps_paragraph_lines_intact() {
        let long = "word ".repeat(60).trim().to_string();
        let output = render_text(&page("Bar", Some(&long)), true);
        assert!(output.ends_with(&format!("\n\n{long}")));
    }

    #[test]
    fn bullet_markers_are_normalized() {
        let output = render_text(&page("Bar", Some("Items:\n\n  *   one\n * two")), true);
        assert!(output.ends_with("Items:\n\n* one\n* two"));
    }

    #[test]
    fn disambiguation_links_become_final_bullet_paragraph() {
        let mut page = page("Mercury", Some("Mercury may refer to:"));
        page.data.disambiguation = true;
        page.data.links = vec!["Mercury (planet)".to_string(), "Mercury (element)".to_string()];
        for no_wrap in [false, true] {
            let output = render_text(&page, no_wrap);
            let last = output.rsplit("\n\n").next().expect("last paragraph");
            assert_eq!(last, " * Mercury (planet)\n * Mercury (element)");
        }
    }

    #[test]
    fn disambiguation_without_body_adds_nothing() {
        let mut page = page("Mercury", None);
        page.data.disambiguation = true;
        page.data.links = vec!["Mercury (planet)".to_string()];
        assert!(!render_text(&page, false).contains(" * "));
    }

    #[test]
    fn html_title_block_links_title_and_description() {
        let mut page = page("Bar", None);
        page.data.description = Some("foo".to_string());
        let html = render_html(&page);
        assert_eq!(
            html,
            "<p><a href=\"https://en.wikipedia.org/wiki/Bar\">Bar</a>&mdash;<i>foo</i></p>"
        );
        assert!(html.contains(">Bar<"));
    }

    #[test]
    fn html_without_description_uses_placeholder() {
        let html = render_html(&page("Bar", None));
        assert!(html.contains("<i>description</i>"));
    }

    #[test]
    fn html_joins_image_and_extract_with_newlines() {
        let mut page = with_image(page("Bar", None), "https://img/bar.jpg");
        page.data.extract = Some("<p><b>Bar</b> is a place.</p>".to_string());
        let lines = render_html(&page).lines().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "<img src=\"https://img/bar.jpg\" alt=\"Bar\" title=\"Bar\" align=\"right\" width=\"240\">"
        );
        assert_eq!(lines[2], "<p><b>Bar</b> is a place.</p>");
    }

    #[test]
    fn html_escapes_text_and_attributes() {
        let mut page = with_image(page("AT&T <Bell>", None), "https://img/a.jpg?x=1&y=\"2\"");
        page.data.url = "https://example.org/wiki/A?b=1&c=\"d\"".to_string();
        page.data.description = Some("R&D".to_string());
        let html = render_html(&page);
        assert!(html.contains("href=\"https://example.org/wiki/A?b=1&amp;c=&quot;d&quot;\""));
        assert!(html.contains(">AT&amp;T &lt;Bell&gt;</a>"));
        assert!(html.contains("<i>R&amp;D</i>"));
        assert!(html.contains("src=\"https://img/a.jpg?x=1&amp;y=&quot;2&quot;\""));
        assert!(html.contains("alt=\"AT&amp;T &lt;Bell&gt;\""));
    }
}
