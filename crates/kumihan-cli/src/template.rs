//! Static HTML5 page around a rendered body.

use kumihan_core::normalize::escape_html;

const DEFAULT_STYLESHEET: &str = "\
body { max-width: 48em; margin: 2em auto; padding: 0 1em; line-height: 1.8;
  font-family: \"Hiragino Mincho ProN\", \"Yu Mincho\", serif; }
.box { border: 1px solid #888; padding: 0.5em 1em; margin: 1em 0; }
.highlight { background-color: #fff3b0; padding: 0.5em 1em; margin: 1em 0; }
.warning { border-left: 4px solid #d9534f; background-color: #fdf0ef; padding: 0.5em 1em; margin: 1em 0; }
nav.toc-nav { border-bottom: 1px solid #ddd; margin-bottom: 2em; }
ul.toc, ul.toc ul { list-style: none; padding-left: 1em; }
";

/// Page-level settings.
#[derive(Debug, Clone)]
pub struct Page<'a> {
    pub title: &'a str,
    pub lang: &'a str,
    /// Link this stylesheet instead of embedding the default one.
    pub stylesheet: Option<&'a str>,
    /// Rendered table of contents, placed in a `<nav>` when non-empty.
    pub toc: &'a str,
}

/// Wrap `body` in a complete document.
pub fn render_page(page: &Page, body: &str) -> String {
    let mut out = String::with_capacity(body.len() + page.toc.len() + 1024);
    out.push_str("<!DOCTYPE html>\n");
    out.push_str(&format!("<html lang=\"{}\">\n", escape_html(page.lang)));
    out.push_str("<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(page.title)));
    match page.stylesheet {
        Some(href) => {
            out.push_str(&format!(
                "<link rel=\"stylesheet\" href=\"{}\">\n",
                escape_html(href)
            ));
        }
        None => {
            out.push_str("<style>\n");
            out.push_str(DEFAULT_STYLESHEET);
            out.push_str("</style>\n");
        }
    }
    out.push_str("</head>\n<body>\n");
    if !page.toc.is_empty() {
        out.push_str("<nav class=\"toc-nav\">\n");
        out.push_str(page.toc);
        out.push_str("</nav>\n");
    }
    out.push_str("<main>\n");
    out.push_str(body);
    if !body.is_empty() && !body.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("</main>\n</body>\n</html>\n");
    out
}
