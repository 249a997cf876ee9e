use crate::blocks::compile_block;
use crate::sanitize::escape_html;
use heck::ToKebabCase;
use mailcraft_document::{Column, Document, Row, Styles};
use tracing::{debug, instrument};

/// Options for HTML compilation
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
    /// Contents of `<title>`
    pub title: String,
    /// Hidden inbox preview text placed before the content
    pub preheader: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
            title: "Email".to_string(),
            preheader: None,
        }
    }
}

pub(crate) const TABLE_ATTRS: &str =
    "role=\"presentation\" cellpadding=\"0\" cellspacing=\"0\" border=\"0\"";

pub(crate) struct Context<'a> {
    options: &'a CompileOptions,
    depth: usize,
    buffer: String,
}

impl<'a> Context<'a> {
    fn new(options: &'a CompileOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    pub(crate) fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub(crate) fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    pub(crate) fn indent(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Render a document with default options
pub fn render(document: &Document) -> String {
    render_with_options(document, &CompileOptions::default())
}

/// Render a document to a self-contained, table-based HTML email
#[instrument(skip_all, fields(rows = document.rows.len()))]
pub fn render_with_options(document: &Document, options: &CompileOptions) -> String {
    let mut ctx = Context::new(options);
    let settings = &document.settings;

    ctx.add_line("<!DOCTYPE html>");
    ctx.add_line("<html lang=\"en\">");
    ctx.indent();

    compile_head(&mut ctx);

    ctx.add_line(&format!(
        "<body style=\"margin: 0; padding: 0; background-color: {};\">",
        escape_html(&settings.background_color)
    ));
    ctx.indent();

    if let Some(preheader) = options.preheader.as_deref().filter(|p| !p.is_empty()) {
        ctx.add_line(&format!(
            "<div style=\"display: none; max-height: 0; overflow: hidden;\">{}</div>",
            escape_html(preheader)
        ));
    }

    ctx.add_line(&format!(
        "<table {} width=\"100%\" style=\"background-color: {};\">",
        TABLE_ATTRS,
        escape_html(&settings.background_color)
    ));
    ctx.indent();
    ctx.add_line("<tr>");
    ctx.indent();
    ctx.add_line(&format!(
        "<td align=\"center\" style=\"padding: {};\">",
        escape_html(&settings.padding)
    ));
    ctx.indent();

    ctx.add_line(&format!(
        "<table {} width=\"{}\" style=\"width: 100%; max-width: {}px; font-family: {}; color: {};\">",
        TABLE_ATTRS,
        settings.max_width,
        settings.max_width,
        escape_html(&settings.font_family),
        escape_html(&settings.text_color)
    ));
    ctx.indent();

    for row in &document.rows {
        compile_row(row, &mut ctx);
    }

    ctx.dedent();
    ctx.add_line("</table>");

    ctx.dedent();
    ctx.add_line("</td>");
    ctx.dedent();
    ctx.add_line("</tr>");
    ctx.dedent();
    ctx.add_line("</table>");

    ctx.dedent();
    ctx.add_line("</body>");

    ctx.dedent();
    ctx.add_line("</html>");

    let output = ctx.get_output();
    debug!(bytes = output.len(), "Rendered document");
    output
}

fn compile_head(ctx: &mut Context) {
    ctx.add_line("<head>");
    ctx.indent();

    ctx.add_line("<meta charset=\"UTF-8\">");
    ctx.add_line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");
    ctx.add_line("<meta http-equiv=\"X-UA-Compatible\" content=\"IE=edge\">");
    let title = escape_html(&ctx.options.title);
    ctx.add_line(&format!("<title>{}</title>", title));

    ctx.dedent();
    ctx.add_line("</head>");
}

fn compile_row(row: &Row, ctx: &mut Context) {
    ctx.add_line("<tr>");
    ctx.indent();
    ctx.add_line(&format!("<td{}>", style_attr(&inline_style(&row.styles, &[]))));
    ctx.indent();

    ctx.add_line(&format!("<table {} width=\"100%\">", TABLE_ATTRS));
    ctx.indent();
    ctx.add_line("<tr>");
    ctx.indent();

    for column in &row.columns {
        compile_column(column, ctx);
    }

    ctx.dedent();
    ctx.add_line("</tr>");
    ctx.dedent();
    ctx.add_line("</table>");

    ctx.dedent();
    ctx.add_line("</td>");
    ctx.dedent();
    ctx.add_line("</tr>");
}

fn compile_column(column: &Column, ctx: &mut Context) {
    let valign = match column.styles.get("verticalAlign").map(String::as_str) {
        Some("middle") => "middle",
        Some("bottom") => "bottom",
        _ => "top",
    };

    let mut css = format!("width: {}%;", column.width);
    let rest = inline_style(&column.styles, &["verticalAlign"]);
    if !rest.is_empty() {
        css.push(' ');
        css.push_str(&rest);
    }

    ctx.add_line(&format!(
        "<td width=\"{}%\" valign=\"{}\" style=\"{}\">",
        column.width, valign, css
    ));
    ctx.indent();

    for block in &column.blocks {
        compile_block(block, ctx);
    }

    ctx.dedent();
    ctx.add_line("</td>");
}

/// Inline CSS declarations for `styles`, keys converted to kebab-case
pub(crate) fn inline_style(styles: &Styles, skip: &[&str]) -> String {
    styles
        .iter()
        .filter(|(key, value)| !skip.contains(&key.as_str()) && !value.trim().is_empty())
        .map(|(key, value)| format!("{}: {};", css_property(key), escape_html(value)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// CSS property name for a camelCase style key. Vendor prefixes keep their
/// leading dash: `WebkitTextSizeAdjust` and `msTextSizeAdjust` become
/// `-webkit-text-size-adjust` and `-ms-text-size-adjust`.
pub(crate) fn css_property(key: &str) -> String {
    let kebab = key.to_kebab_case();
    let vendor = key.starts_with(|c: char| c.is_ascii_uppercase())
        || key
            .strip_prefix("ms")
            .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()));

    if vendor {
        format!("-{}", kebab)
    } else {
        kebab
    }
}

/// ` style="..."`, or nothing for empty CSS
pub(crate) fn style_attr(css: &str) -> String {
    if css.is_empty() {
        String::new()
    } else {
        format!(" style=\"{}\"", css)
    }
}

/// Join fixed declarations with user overrides; overrides come last so
/// they win in the cascade
pub(crate) fn merge_css(base: &str, overrides: &str) -> String {
    match (base.is_empty(), overrides.is_empty()) {
        (true, _) => overrides.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{} {}", base, overrides),
    }
}
