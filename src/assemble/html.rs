//! Regex-based markdown to HTML conversion for the HTML output format.
//!
//! Deliberately not a markdown parser: it handles the constructs the
//! markdown renderer emits (headers, lists, bold, italic, links, inline
//! code, code fences, rules) and nothing more.

use regex_lite::Regex;

use super::{markdown::render_markdown, ChangelogDocument};

/// Render a document as a standalone HTML page.
pub fn render_html(document: &ChangelogDocument) -> String {
    let body = markdown_to_html(&render_markdown(document));
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Changelog {}</title>\n<style>\n{}\n</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(&document.version),
        PAGE_STYLE,
        body
    )
}

const PAGE_STYLE: &str = "body { font-family: sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }\n\
                          code { background: #f2f2f2; padding: 0.1rem 0.3rem; border-radius: 3px; }\n\
                          pre code { display: block; padding: 0.8rem; overflow-x: auto; }";

/// Line-oriented conversion. Consecutive `- ` lines group into one `<ul>`;
/// fenced blocks pass through escaped but otherwise untouched.
pub(crate) fn markdown_to_html(markdown: &str) -> String {
    let mut out = String::new();
    let mut in_list = false;
    let mut in_code_block = false;

    for line in markdown.lines() {
        if line.trim_start().starts_with("```") {
            if in_code_block {
                out.push_str("</code></pre>\n");
            } else {
                close_list(&mut in_list, &mut out);
                out.push_str("<pre><code>");
            }
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            out.push_str(&escape_html(line));
            out.push('\n');
            continue;
        }

        if let Some(item) = line.trim_start().strip_prefix("- ") {
            if !in_list {
                out.push_str("<ul>\n");
                in_list = true;
            }
            out.push_str(&format!("<li>{}</li>\n", render_inline(item)));
            continue;
        }
        close_list(&mut in_list, &mut out);

        if let Some(text) = line.strip_prefix("### ") {
            out.push_str(&format!("<h3>{}</h3>\n", render_inline(text)));
        } else if let Some(text) = line.strip_prefix("## ") {
            out.push_str(&format!("<h2>{}</h2>\n", render_inline(text)));
        } else if let Some(text) = line.strip_prefix("# ") {
            out.push_str(&format!("<h1>{}</h1>\n", render_inline(text)));
        } else if line.trim() == "---" {
            out.push_str("<hr>\n");
        } else if !line.trim().is_empty() {
            out.push_str(&format!("<p>{}</p>\n", render_inline(line)));
        }
    }

    if in_code_block {
        out.push_str("</code></pre>\n");
    }
    close_list(&mut in_list, &mut out);
    out
}

fn close_list(in_list: &mut bool, out: &mut String) {
    if *in_list {
        out.push_str("</ul>\n");
        *in_list = false;
    }
}

/// Inline spans: links, bold, italic, code. Escaping happens first so the
/// replacement tags survive.
fn render_inline(text: &str) -> String {
    let escaped = escape_html(text);

    let link = Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("Invalid link pattern");
    let bold = Regex::new(r"\*\*([^*]+)\*\*").expect("Invalid bold pattern");
    let italic = Regex::new(r"\b_([^_]+)_\b|^_([^_]+)_$").expect("Invalid italic pattern");
    let code = Regex::new(r"`([^`]+)`").expect("Invalid code pattern");

    let step = link.replace_all(&escaped, r#"<a href="$2">$1</a>"#);
    let step = bold.replace_all(&step, "<strong>$1</strong>");
    let step = italic.replace_all(&step, "<em>$1$2</em>");
    code.replace_all(&step, "<code>$1</code>").into_owned()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
