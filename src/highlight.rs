use inksac::prelude::*;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// Console colors. Falls back to plain text when the terminal has no color
/// support.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    color_support: ColorSupport,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

impl Palette {
    pub fn new() -> Self {
        let support = check_color_support().unwrap_or(ColorSupport::NoColor);
        Self {
            color_support: support,
        }
    }

    pub fn plain() -> Self {
        Self {
            color_support: ColorSupport::NoColor,
        }
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if matches!(self.color_support, ColorSupport::NoColor) {
            return text.to_string();
        }
        text.style(style).to_string()
    }

    pub fn assistant(&self, label: &str) -> String {
        let style = Style::builder().foreground(Color::Green).bold().build();
        self.paint(label, style)
    }

    pub fn success(&self, text: &str) -> String {
        let style = Style::builder().foreground(Color::Green).build();
        self.paint(text, style)
    }

    pub fn error(&self, text: &str) -> String {
        let style = Style::builder().foreground(Color::Red).bold().build();
        self.paint(text, style)
    }

    pub fn stderr(&self, text: &str) -> String {
        let style = Style::builder().foreground(Color::Red).build();
        self.paint(text, style)
    }

    pub fn mode(&self, label: &str) -> String {
        let style = Style::builder().foreground(Color::Yellow).build();
        self.paint(label, style)
    }

    pub fn muted(&self, text: &str) -> String {
        let style = Style::builder()
            .foreground(Color::RGB(128, 128, 128))
            .build();
        self.paint(text, style)
    }

    pub fn code(&self, text: &str) -> String {
        let style = Style::builder().foreground(Color::Cyan).build();
        self.paint(text, style)
    }

    pub fn strong(&self, text: &str) -> String {
        let style = Style::builder().bold().build();
        self.paint(text, style)
    }

    /// Renders assistant markdown for the console. Code fences are dropped,
    /// headings and strong spans are emboldened and code is colored.
    pub fn render_markdown(&self, text: &str) -> String {
        let mut writer = MarkdownWriter::new(self);
        for event in Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH) {
            writer.handle(event);
        }
        writer.finish()
    }
}

struct MarkdownWriter<'p> {
    palette: &'p Palette,
    out: String,
    strong: usize,
    in_code_block: bool,
    /// An item marker was written and nothing has followed it yet.
    item_open: bool,
    /// Next number for each open list, `None` for bullet lists.
    lists: Vec<Option<u64>>,
}

impl<'p> MarkdownWriter<'p> {
    fn new(palette: &'p Palette) -> Self {
        Self {
            palette,
            out: String::new(),
            strong: 0,
            in_code_block: false,
            item_open: false,
            lists: Vec::new(),
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                self.item_open = false;
                let styled = self.palette.code(&code);
                self.out.push_str(&styled);
            }
            Event::Html(html) | Event::InlineHtml(html) => self.out.push_str(&html),
            Event::SoftBreak | Event::HardBreak => self.out.push('\n'),
            Event::Rule => {
                self.new_line();
                self.out.push_str("---");
            }
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph | Tag::BlockQuote => self.new_line(),
            Tag::Heading { .. } => {
                self.new_line();
                self.strong += 1;
            }
            Tag::CodeBlock(_) => {
                self.new_line();
                self.in_code_block = true;
            }
            Tag::Strong => self.strong += 1,
            Tag::List(first) => self.lists.push(first),
            Tag::Item => self.start_item(),
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) | TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::CodeBlock => self.in_code_block = false,
            TagEnd::List(_) => {
                self.lists.pop();
            }
            _ => {}
        }
    }

    fn start_item(&mut self) {
        self.item_open = false;
        self.new_line();
        let indent = "  ".repeat(self.lists.len().saturating_sub(1));
        let marker = match self.lists.last_mut() {
            Some(Some(number)) => {
                let marker = format!("{number}. ");
                *number += 1;
                marker
            }
            _ => "- ".to_string(),
        };
        self.out.push_str(&indent);
        self.out.push_str(&marker);
        self.item_open = true;
    }

    fn text(&mut self, text: &str) {
        self.item_open = false;
        if self.in_code_block {
            // styled per line so escapes never span a newline
            for line in text.split_inclusive('\n') {
                let content = line.trim_end_matches('\n');
                let styled = self.palette.code(content);
                self.out.push_str(&styled);
                if line.ends_with('\n') {
                    self.out.push('\n');
                }
            }
        } else if self.strong > 0 {
            let styled = self.palette.strong(text);
            self.out.push_str(&styled);
        } else {
            self.out.push_str(text);
        }
    }

    fn new_line(&mut self) {
        if self.item_open {
            return;
        }
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn finish(self) -> String {
        self.out.trim_end_matches('\n').to_string()
    }
}
