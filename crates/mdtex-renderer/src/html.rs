//! pulldown-cmark HTML renderer.
//!
//! Walks parser events and writes semantic HTML5. Placeholder tokens arrive
//! as ordinary text and are written back unchanged.

use pulldown_cmark::{
    Alignment, BlockQuoteKind, CodeBlockKind, Event, Options, Parser, Tag, TagEnd,
};

use crate::escape::{escape_attr, escape_html};
use crate::structural::{RenderError, RenderOptions, StructuralRenderer};
use crate::util::heading_level_to_num;

/// Structural renderer backed by pulldown-cmark.
///
/// # Example
///
/// ```
/// use mdtex_renderer::{CmarkRenderer, RenderOptions, StructuralRenderer};
///
/// let html = CmarkRenderer::new()
///     .render("# Hello\n\n**Bold** text", &RenderOptions::default())
///     .unwrap();
/// assert_eq!(html, "<h1>Hello</h1>\n<p><strong>Bold</strong> text</p>\n");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct CmarkRenderer;

impl CmarkRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parser options for the given render options.
    #[must_use]
    pub fn parser_options(options: &RenderOptions) -> Options {
        if options.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }
}

impl StructuralRenderer for CmarkRenderer {
    fn render(&self, text: &str, options: &RenderOptions) -> Result<String, RenderError> {
        let parser = Parser::new_ext(text, Self::parser_options(options));
        let mut writer = HtmlWriter::new(*options, text.len());
        for event in parser {
            writer.process_event(event);
        }
        Ok(writer.output)
    }
}

/// Table rendering state.
#[derive(Default)]
struct TableState {
    alignments: Vec<Alignment>,
    in_head: bool,
    cell_index: usize,
}

impl TableState {
    fn alignment_style(&self) -> &'static str {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => r#" style="text-align: left""#,
            Some(Alignment::Center) => r#" style="text-align: center""#,
            Some(Alignment::Right) => r#" style="text-align: right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// Image being collected: alt text arrives as child events.
struct PendingImage {
    src: String,
    title: String,
    alt: String,
    depth: usize,
}

struct HtmlWriter {
    output: String,
    options: RenderOptions,
    table: TableState,
    image: Option<PendingImage>,
    code_block: Option<String>,
}

impl HtmlWriter {
    fn new(options: RenderOptions, capacity: usize) -> Self {
        Self {
            output: String::with_capacity(capacity + capacity / 2),
            options,
            table: TableState::default(),
            image: None,
            code_block: None,
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        if self.image.is_some() {
            self.image_event(event);
            return;
        }

        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                self.output.push_str("<code>");
                self.output.push_str(&escape_html(&code));
                self.output.push_str("</code>");
            }
            Event::Html(html) | Event::InlineHtml(html) => self.raw_html(&html),
            Event::SoftBreak => {
                if self.options.convert_single_newline_to_break {
                    self.output.push_str("<br />\n");
                } else {
                    self.output.push('\n');
                }
            }
            Event::HardBreak => self.output.push_str("<br />\n"),
            Event::Rule => self.output.push_str("<hr />\n"),
            Event::TaskListMarker(checked) => {
                self.output.push_str(if checked {
                    r#"<input type="checkbox" disabled checked /> "#
                } else {
                    r#"<input type="checkbox" disabled /> "#
                });
            }
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not enabled in parser options
            }
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = self.code_block.as_mut() {
            code.push_str(text);
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn raw_html(&mut self, html: &str) {
        if self.options.allow_raw_html {
            self.output.push_str(html);
        } else {
            self.output.push_str(&escape_html(html));
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                self.output
                    .push_str(&format!("<h{}>", heading_level_to_num(level)));
            }
            Tag::BlockQuote(kind) => match kind {
                Some(kind) => {
                    let (class, title) = alert_label(kind);
                    self.output.push_str(&format!(
                        r#"<div class="alert alert-{class}"><p class="alert-title">{title}</p>"#
                    ));
                    self.output.push('\n');
                }
                None => self.output.push_str("<blockquote>\n"),
            },
            Tag::CodeBlock(kind) => {
                match kind {
                    CodeBlockKind::Fenced(info) if !info.trim().is_empty() => {
                        let lang = info.split_whitespace().next().unwrap_or_default();
                        self.output.push_str(&format!(
                            r#"<pre><code class="language-{}">"#,
                            escape_attr(lang)
                        ));
                    }
                    _ => self.output.push_str("<pre><code>"),
                }
                self.code_block = Some(String::new());
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>\n"),
                Some(n) => self.output.push_str(&format!("<ol start=\"{n}\">\n")),
                None => self.output.push_str("<ul>\n"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>\n"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table = TableState {
                    alignments,
                    ..TableState::default()
                };
                self.output.push_str("<table>\n");
            }
            Tag::TableHead => {
                self.table.in_head = true;
                self.table.cell_index = 0;
                self.output.push_str("<thead>\n<tr>");
            }
            Tag::TableRow => {
                self.table.cell_index = 0;
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let cell = if self.table.in_head { "th" } else { "td" };
                self.output.push('<');
                self.output.push_str(cell);
                self.output.push_str(self.table.alignment_style());
                self.output.push('>');
            }
            Tag::Emphasis => self.output.push_str("<em>"),
            Tag::Strong => self.output.push_str("<strong>"),
            Tag::Strikethrough => self.output.push_str("<del>"),
            Tag::Superscript => self.output.push_str("<sup>"),
            Tag::Subscript => self.output.push_str("<sub>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                self.output.push_str(r#"<a href=""#);
                self.output.push_str(&escape_attr(&dest_url));
                self.output.push('"');
                push_title_attr(&mut self.output, &title);
                self.output.push('>');
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.image = Some(PendingImage {
                    src: dest_url.into_string(),
                    title: title.into_string(),
                    alt: String::new(),
                    depth: 0,
                });
            }
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>\n"),
            TagEnd::Heading(level) => {
                self.output
                    .push_str(&format!("</h{}>\n", heading_level_to_num(level)));
            }
            TagEnd::BlockQuote(kind) => {
                self.output.push_str(if kind.is_some() {
                    "</div>\n"
                } else {
                    "</blockquote>\n"
                });
            }
            TagEnd::CodeBlock => {
                let code = self.code_block.take().unwrap_or_default();
                self.output.push_str(&escape_html(&code));
                self.output.push_str("</code></pre>\n");
            }
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
            }
            TagEnd::Item => self.output.push_str("</li>\n"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::DefinitionList => self.output.push_str("</dl>\n"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>\n"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>\n"),
            TagEnd::Table => self.output.push_str("</tbody>\n</table>\n"),
            TagEnd::TableHead => {
                self.table.in_head = false;
                self.output.push_str("</tr>\n</thead>\n<tbody>\n");
            }
            TagEnd::TableRow => self.output.push_str("</tr>\n"),
            TagEnd::TableCell => {
                let cell = if self.table.in_head { "th" } else { "td" };
                self.output.push_str("</");
                self.output.push_str(cell);
                self.output.push('>');
                self.table.cell_index += 1;
            }
            TagEnd::Emphasis => self.output.push_str("</em>"),
            TagEnd::Strong => self.output.push_str("</strong>"),
            TagEnd::Strikethrough => self.output.push_str("</del>"),
            TagEnd::Superscript => self.output.push_str("</sup>"),
            TagEnd::Subscript => self.output.push_str("</sub>"),
            TagEnd::Link => self.output.push_str("</a>"),
            TagEnd::Image => {}
        }
    }

    /// Collect alt text until the image closes. Nested markup is flattened.
    fn image_event(&mut self, event: Event<'_>) {
        let Some(image) = self.image.as_mut() else {
            return;
        };

        match event {
            Event::Start(_) => image.depth += 1,
            Event::End(TagEnd::Image) if image.depth == 0 => {
                if let Some(image) = self.image.take() {
                    self.write_image(&image);
                }
            }
            Event::End(_) => image.depth = image.depth.saturating_sub(1),
            Event::Text(text) | Event::Code(text) => image.alt.push_str(&text),
            Event::SoftBreak | Event::HardBreak => image.alt.push(' '),
            _ => {}
        }
    }

    fn write_image(&mut self, image: &PendingImage) {
        self.output.push_str(r#"<img src=""#);
        self.output.push_str(&escape_attr(&image.src));
        self.output.push_str(r#"" alt=""#);
        self.output.push_str(&escape_attr(&image.alt));
        self.output.push('"');
        push_title_attr(&mut self.output, &image.title);
        self.output.push_str(" />");
    }
}

fn push_title_attr(out: &mut String, title: &str) {
    if !title.is_empty() {
        out.push_str(r#" title=""#);
        out.push_str(&escape_attr(title));
        out.push('"');
    }
}

fn alert_label(kind: BlockQuoteKind) -> (&'static str, &'static str) {
    match kind {
        BlockQuoteKind::Note => ("note", "Note"),
        BlockQuoteKind::Tip => ("tip", "Tip"),
        BlockQuoteKind::Important => ("important", "Important"),
        BlockQuoteKind::Warning => ("warning", "Warning"),
        BlockQuoteKind::Caution => ("caution", "Caution"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn render(text: &str) -> String {
        CmarkRenderer::new()
            .render(text, &RenderOptions::default())
            .unwrap()
    }

    fn render_with(text: &str, options: RenderOptions) -> String {
        CmarkRenderer::new().render(text, &options).unwrap()
    }

    #[test]
    fn test_paragraph_and_emphasis() {
        assert_eq!(
            render("Hello *world* and **bold**"),
            "<p>Hello <em>world</em> and <strong>bold</strong></p>\n"
        );
    }

    #[test]
    fn test_headings() {
        assert_eq!(render("## Section"), "<h2>Section</h2>\n");
    }

    #[test]
    fn test_unordered_list() {
        assert_eq!(
            render("- a\n- b"),
            "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_ordered_list_with_start() {
        assert_eq!(
            render("3. c\n4. d"),
            "<ol start=\"3\">\n<li>c</li>\n<li>d</li>\n</ol>\n"
        );
    }

    #[test]
    fn test_code_block_with_language() {
        assert_eq!(
            render("```rust\nfn main() { a < b }\n```"),
            "<pre><code class=\"language-rust\">fn main() { a &lt; b }\n</code></pre>\n"
        );
    }

    #[test]
    fn test_indented_code_block() {
        assert_eq!(
            render("    plain code\n"),
            "<pre><code>plain code\n</code></pre>\n"
        );
    }

    #[test]
    fn test_inline_code_escaped() {
        assert_eq!(render("`a<b`"), "<p><code>a&lt;b</code></p>\n");
    }

    #[test]
    fn test_raw_html_passthrough() {
        assert_eq!(
            render("<div class=\"x\">hi</div>\n"),
            "<div class=\"x\">hi</div>\n"
        );
        assert_eq!(
            render("a <span>b</span>"),
            "<p>a <span>b</span></p>\n"
        );
    }

    #[test]
    fn test_raw_html_escaped_when_disallowed() {
        let options = RenderOptions {
            allow_raw_html: false,
            ..RenderOptions::default()
        };
        assert_eq!(
            render_with("a <span>b</span>", options),
            "<p>a &lt;span&gt;b&lt;/span&gt;</p>\n"
        );
    }

    #[test]
    fn test_soft_break_kept_as_newline() {
        assert_eq!(render("a\nb"), "<p>a\nb</p>\n");
    }

    #[test]
    fn test_soft_break_converted() {
        let options = RenderOptions {
            convert_single_newline_to_break: true,
            ..RenderOptions::default()
        };
        assert_eq!(render_with("a\nb", options), "<p>a<br />\nb</p>\n");
    }

    #[test]
    fn test_link_and_image() {
        assert_eq!(
            render(r#"[x](https://e.com?a=1&b=2 "T") ![alt *text*](i.png)"#),
            "<p><a href=\"https://e.com?a=1&amp;b=2\" title=\"T\">x</a> <img src=\"i.png\" alt=\"alt text\" /></p>\n"
        );
    }

    #[test]
    fn test_image_title_escaped() {
        assert_eq!(
            render(r#"![a](i.png 'say "hi"')"#),
            "<p><img src=\"i.png\" alt=\"a\" title=\"say &quot;hi&quot;\" /></p>\n"
        );
    }

    #[test]
    fn test_table_with_alignment() {
        let html = render("| a | b |\n|:--|--:|\n| 1 | 2 |");
        assert_eq!(
            html,
            "<table>\n<thead>\n<tr><th style=\"text-align: left\">a</th><th style=\"text-align: right\">b</th></tr>\n</thead>\n<tbody>\n<tr><td style=\"text-align: left\">1</td><td style=\"text-align: right\">2</td></tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn test_tables_disabled_without_gfm() {
        let options = RenderOptions {
            gfm: false,
            ..RenderOptions::default()
        };
        assert!(!render_with("| a |\n|---|\n| 1 |", options).contains("<table>"));
    }

    #[test]
    fn test_task_list() {
        let html = render("- [x] done\n- [ ] todo");
        assert!(html.contains(r#"<input type="checkbox" disabled checked /> done"#));
        assert!(html.contains(r#"<input type="checkbox" disabled /> todo"#));
    }

    #[test]
    fn test_strikethrough() {
        assert_eq!(render("~~gone~~"), "<p><del>gone</del></p>\n");
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(
            render("> quoted"),
            "<blockquote>\n<p>quoted</p>\n</blockquote>\n"
        );
    }

    #[test]
    fn test_alert() {
        let html = render("> [!NOTE]\n> careful");
        assert!(html.starts_with(r#"<div class="alert alert-note"><p class="alert-title">Note</p>"#));
        assert!(html.contains("<p>careful</p>"));
        assert!(html.ends_with("</div>\n"));
    }

    #[test]
    fn test_rule_and_hard_break() {
        assert_eq!(render("a  \nb\n\n---"), "<p>a<br />\nb</p>\n<hr />\n");
    }

    #[test]
    fn test_placeholder_tokens_survive() {
        let html = render("*@@MDTEXMATHI0@@* and @@MDTEXMATHB1@@ x_1");
        assert_eq!(
            html,
            "<p><em>@@MDTEXMATHI0@@</em> and @@MDTEXMATHB1@@ x_1</p>\n"
        );
    }

    #[test]
    fn test_placeholder_in_heading_and_table() {
        let html = render("# @@MDTEXMATHI0@@\n\n| @@MDTEXMATHI1@@ |\n|---|\n| @@MDTEXMATHI2@@ |");
        assert!(html.contains("<h1>@@MDTEXMATHI0@@</h1>"));
        assert!(html.contains("<th>@@MDTEXMATHI1@@</th>"));
        assert!(html.contains("<td>@@MDTEXMATHI2@@</td>"));
    }
}
