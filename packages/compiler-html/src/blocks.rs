//! Serialization rules for each block type.
//!
//! Missing content falls back to a fixed default or renders nothing; it
//! never aborts the document.

use crate::compiler::{inline_style, merge_css, style_attr, Context, TABLE_ATTRS};
use crate::sanitize::{escape_comment, escape_html, safe_url, strip_unsafe_markup};
use heck::ToTitleCase;
use mailcraft_document::{Block, BlockKind};
use serde_json::Value;
use tracing::warn;

pub const DEFAULT_HEADING_TEXT: &str = "Heading";
pub const DEFAULT_BUTTON_TEXT: &str = "Button";
pub const DEFAULT_SPACER_HEIGHT: f64 = 24.0;
pub const DEFAULT_DIVIDER_COLOR: &str = "#e4e4e7";

pub(crate) fn compile_block(block: &Block, ctx: &mut Context) {
    let Some(kind) = block.kind() else {
        warn!(block_id = %block.id, block_type = %block.block_type, "Unsupported block type");
        ctx.add_line(&format!(
            "<!-- unsupported block: {} -->",
            escape_comment(&block.block_type)
        ));
        return;
    };

    match kind {
        BlockKind::Heading => compile_heading(block, ctx),
        BlockKind::Paragraph => compile_paragraph(block, ctx),
        BlockKind::Image => compile_image(block, ctx),
        BlockKind::Button => compile_button(block, ctx),
        BlockKind::Divider => compile_divider(block, ctx),
        BlockKind::Spacer => compile_spacer(block, ctx),
        BlockKind::Social => compile_social(block, ctx),
        BlockKind::Menu => compile_menu(block, ctx),
        BlockKind::Video => compile_video(block, ctx),
        BlockKind::Html => compile_html(block, ctx),
    }
}

fn compile_heading(block: &Block, ctx: &mut Context) {
    let level = match block.text("level") {
        Some(l @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6")) => l,
        _ => "h2",
    };
    let text = block.text("text").unwrap_or(DEFAULT_HEADING_TEXT);
    let css = merge_css("margin: 0;", &inline_style(&block.styles, &[]));

    ctx.add_line(&format!(
        "<{level} style=\"{css}\">{}</{level}>",
        escape_html(text)
    ));
}

fn compile_paragraph(block: &Block, ctx: &mut Context) {
    let Some(markup) = block.text("text") else {
        return;
    };

    ctx.add_line(&format!(
        "<div{}>{}</div>",
        style_attr(&inline_style(&block.styles, &[])),
        strip_unsafe_markup(markup)
    ));
}

fn compile_image(block: &Block, ctx: &mut Context) {
    let Some(src) = block.text("src") else {
        return;
    };

    let css = merge_css(
        "display: block; border: 0; max-width: 100%; height: auto;",
        &inline_style(&block.styles, &[]),
    );
    let img = format!(
        "<img src=\"{}\" alt=\"{}\" style=\"{}\" />",
        escape_html(&safe_url(src)),
        escape_html(block.text("alt").unwrap_or("")),
        css
    );

    match block.text("href") {
        Some(href) => ctx.add_line(&format!(
            "<a href=\"{}\" target=\"_blank\">{}</a>",
            escape_html(&safe_url(href)),
            img
        )),
        None => ctx.add_line(&img),
    }
}

fn compile_button(block: &Block, ctx: &mut Context) {
    let text = block.text("text").unwrap_or(DEFAULT_BUTTON_TEXT);
    let url = block.text("url").map(safe_url).unwrap_or_else(|| "#".to_string());
    let align = match block.styles.get("textAlign").map(String::as_str) {
        Some(a @ ("left" | "right" | "center")) => a,
        _ => "center",
    };
    let css = merge_css(
        "display: inline-block; text-decoration: none;",
        &inline_style(&block.styles, &["textAlign"]),
    );

    ctx.add_line(&format!("<table {} width=\"100%\">", TABLE_ATTRS));
    ctx.indent();
    ctx.add_line("<tr>");
    ctx.indent();
    ctx.add_line(&format!("<td align=\"{}\">", align));
    ctx.indent();
    ctx.add_line(&format!(
        "<a href=\"{}\" target=\"_blank\" style=\"{}\">{}</a>",
        escape_html(&url),
        css,
        escape_html(text)
    ));
    ctx.dedent();
    ctx.add_line("</td>");
    ctx.dedent();
    ctx.add_line("</tr>");
    ctx.dedent();
    ctx.add_line("</table>");
}

fn compile_divider(block: &Block, ctx: &mut Context) {
    let thickness = block.number("thickness").filter(|t| *t > 0.0).unwrap_or(1.0);
    let color = block.text("color").unwrap_or(DEFAULT_DIVIDER_COLOR);
    let line = match block.text("style") {
        Some(s @ ("solid" | "dashed" | "dotted")) => s,
        _ => "solid",
    };
    let css = merge_css(
        &format!(
            "border: 0; border-top: {}px {} {}; margin: 0;",
            thickness,
            line,
            escape_html(color)
        ),
        &inline_style(&block.styles, &[]),
    );

    ctx.add_line(&format!("<hr style=\"{}\" />", css));
}

fn compile_spacer(block: &Block, ctx: &mut Context) {
    let height = block
        .number("height")
        .filter(|h| *h >= 0.0)
        .unwrap_or(DEFAULT_SPACER_HEIGHT);

    ctx.add_line(&format!(
        "<div style=\"height: {h}px; line-height: {h}px; font-size: 1px;\">&nbsp;</div>",
        h = height
    ));
}

fn compile_social(block: &Block, ctx: &mut Context) {
    let links = link_list(block, "links", |item| {
        item.get("network")
            .and_then(Value::as_str)
            .map(|network| network.to_title_case())
    });
    compile_link_bar(block, &links, ctx);
}

fn compile_menu(block: &Block, ctx: &mut Context) {
    let items = link_list(block, "items", |item| {
        item.get("label").and_then(Value::as_str).map(str::to_string)
    });
    compile_link_bar(block, &items, ctx);
}

/// `(label, url)` pairs from an array of objects under `key`; entries
/// without a label are skipped, a missing URL becomes `#`
fn link_list<F>(block: &Block, key: &str, label: F) -> Vec<(String, String)>
where
    F: Fn(&serde_json::Map<String, Value>) -> Option<String>,
{
    block
        .content
        .get(key)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_object)
                .filter_map(|item| {
                    let text = label(item).filter(|l| !l.trim().is_empty())?;
                    let url = item
                        .get("url")
                        .and_then(Value::as_str)
                        .filter(|u| !u.trim().is_empty())
                        .map(safe_url)
                        .unwrap_or_else(|| "#".to_string());
                    Some((text, url))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn compile_link_bar(block: &Block, links: &[(String, String)], ctx: &mut Context) {
    if links.is_empty() {
        return;
    }

    ctx.add_line(&format!(
        "<div{}>",
        style_attr(&inline_style(&block.styles, &[]))
    ));
    ctx.indent();
    for (label, url) in links {
        ctx.add_line(&format!(
            "<a href=\"{}\" target=\"_blank\" style=\"display: inline-block; margin: 0 8px; color: inherit;\">{}</a>",
            escape_html(url),
            escape_html(label)
        ));
    }
    ctx.dedent();
    ctx.add_line("</div>");
}

fn compile_video(block: &Block, ctx: &mut Context) {
    let url = block.text("url").map(safe_url);
    let thumbnail = block.text("thumbnail").map(safe_url);

    match (url, thumbnail) {
        (Some(url), Some(thumbnail)) => ctx.add_line(&format!(
            "<a href=\"{}\" target=\"_blank\"><img src=\"{}\" alt=\"Play video\" style=\"display: block; border: 0; max-width: 100%; height: auto;\" /></a>",
            escape_html(&url),
            escape_html(&thumbnail)
        )),
        (None, Some(thumbnail)) => ctx.add_line(&format!(
            "<img src=\"{}\" alt=\"Video\" style=\"display: block; border: 0; max-width: 100%; height: auto;\" />",
            escape_html(&thumbnail)
        )),
        (Some(url), None) => ctx.add_line(&format!(
            "<a href=\"{}\" target=\"_blank\">Watch video</a>",
            escape_html(&url)
        )),
        (None, None) => {}
    }
}

fn compile_html(block: &Block, ctx: &mut Context) {
    if let Some(markup) = block.text("html") {
        ctx.add_line(&strip_unsafe_markup(markup));
    }
}
