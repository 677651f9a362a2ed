//! HTML pretty-printer for an edit script.
//!
//! Simple escape-and-wrap logic, kept separate from the algorithmic core
//! but exposed alongside the rest of the diff API.

use super::{Diff, Op};

/// Escape `&<>`, turn newlines into `¶<br>`, and wrap each entry in
/// `<ins>`/`<del>`/`<span>` with an inline background color.
pub fn pretty_html(script: &[(Op, String)]) -> String {
    let mut html = String::new();
    for (op, text) in script {
        let escaped = escape_html(text).replace('\n', "&para;<br>");
        match op {
            Op::Insert => {
                html.push_str("<ins style=\"background:#e6ffe6;\">");
                html.push_str(&escaped);
                html.push_str("</ins>");
            }
            Op::Delete => {
                html.push_str("<del style=\"background:#ffe6e6;\">");
                html.push_str(&escaped);
                html.push_str("</del>");
            }
            Op::Equal => {
                html.push_str("<span>");
                html.push_str(&escaped);
                html.push_str("</span>");
            }
        }
    }
    html
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_each_op() {
        let script = vec![
            (Op::Equal, "a".to_string()),
            (Op::Delete, "b".to_string()),
            (Op::Insert, "c".to_string()),
        ];
        let html = pretty_html(&script);
        assert_eq!(
            html,
            "<span>a</span><del style=\"background:#ffe6e6;\">b</del><ins style=\"background:#e6ffe6;\">c</ins>"
        );
    }

    #[test]
    fn escapes_reserved_chars_and_newlines() {
        let script = vec![(Op::Equal, "a&b<c>\nd".to_string())];
        let html = pretty_html(&script);
        assert_eq!(html, "<span>a&amp;b&lt;c&gt;&para;<br>d</span>");
    }
}
