use regex::Regex;
use std::sync::OnceLock;

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Text safe to place inside `<!-- ... -->`
pub fn escape_comment(text: &str) -> String {
    text.replace("--", "- -").replace('>', "&gt;")
}

/// URLs with a script scheme collapse to `#`
pub fn safe_url(url: &str) -> String {
    let trimmed = url.trim();
    let scheme = trimmed.to_ascii_lowercase();
    if scheme.starts_with("javascript:") || scheme.starts_with("vbscript:") {
        "#".to_string()
    } else {
        trimmed.to_string()
    }
}

fn script_element() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("script pattern"))
}

fn stray_tags() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</?script\b[^>]*>|<link\b[^>]*>").expect("tag pattern"))
}

fn css_import() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)@import\s+(url\()?\s*["']?[^;"')]*["']?\s*\)?\s*;?"#).expect("import pattern"))
}

/// Opaque markup from rich text and html blocks is passed through as-is,
/// minus scripts and external stylesheet references
pub fn strip_unsafe_markup(markup: &str) -> String {
    let without_scripts = script_element().replace_all(markup, "");
    let without_tags = stray_tags().replace_all(&without_scripts, "");
    css_import().replace_all(&without_tags, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_strip_script_elements() {
        let markup = "<p>Hi</p><SCRIPT type=\"text/javascript\">alert(1)\n</script><p>Bye</p>";
        assert_eq!(strip_unsafe_markup(markup), "<p>Hi</p><p>Bye</p>");
    }

    #[test]
    fn test_strip_stylesheet_links_and_imports() {
        let markup = r#"<link rel="stylesheet" href="https://cdn.example.com/a.css"><style>@import url("https://x/y.css"); p { color: red; }</style><p>x</p>"#;
        let cleaned = strip_unsafe_markup(markup);
        assert!(!cleaned.contains("<link"));
        assert!(!cleaned.contains("@import"));
        assert!(cleaned.contains("p { color: red; }"));
        assert!(cleaned.contains("<p>x</p>"));
    }

    #[test]
    fn test_plain_markup_untouched() {
        let markup = "<p>Read <strong>this</strong> & <em>that</em></p>";
        assert_eq!(strip_unsafe_markup(markup), markup);
    }

    #[test]
    fn test_safe_url() {
        assert_eq!(safe_url(" javascript:alert(1)"), "#");
        assert_eq!(safe_url("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_escape_comment() {
        assert_eq!(escape_comment("a-->b"), "a- -&gt;b");
    }
}
