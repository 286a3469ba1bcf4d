use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{session::Flash, AppResult};

#[macro_export]
macro_rules! include_res {
    (bytes, $p:expr) => {
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            // template placeholders are `{name}`
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            c => out.push(c),
        }
    }
    out
}

/// Wraps a page body in the shared layout.
pub fn page(title: &str, body: &str) -> Html<String> {
    Html(
        include_res!(str, "/pages/layout.html")
            .replace("{title}", &escape(title))
            .replace("{body}", body)
    )
}

pub fn admin_page(title: &str, flash: Option<Flash>, body: &str) -> Html<String> {
    page(
        title,
        &include_res!(str, "/pages/admin/layout.html")
            .replace("{banner}", &banner(flash))
            .replace("{body}", body),
    )
}

pub fn sorry(what: &str) -> AppResult<Response> {
    Ok((
        StatusCode::NOT_FOUND,
        page("Not found", &include_res!(str, "/pages/sorry.html").replace("{what}", &escape(what))),
    ).into_response())
}

/// Dismissible message left by the previous request. Dismissing reloads the
/// page, and a flash is only ever shown once.
pub fn banner(flash: Option<Flash>) -> String {
    let Some(flash) = flash else {
        return String::new();
    };
    let (class, text) = match &flash {
        Flash::Success(text) => ("success", text),
        Flash::Error(text) => ("error", text),
    };
    include_res!(str, "/pages/banner.html")
        .replace("{class}", class)
        .replace("{text}", &escape(text))
}

/// Markdown to HTML. Raw HTML in the source is shown as text.
pub fn markdown(text: &str) -> String {
    use pulldown_cmark::{Event, Options, Parser};

    let parser = Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            _ => event,
        });

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    html_output.replace('{', "&#123;").replace('}', "&#125;")
}

/// `<option>` list with `selected` on the matching value.
pub fn options<'a>(values: impl IntoIterator<Item = (&'a str, &'a str)>, selected: &str) -> String {
    values.into_iter()
        .map(|(value, label)| {
            let mark = if value.eq_ignore_ascii_case(selected) { " selected" } else { "" };
            format!("<option value=\"{}\"{mark}>{}</option>", escape(value), escape(label))
        })
        .collect()
}

pub fn tag_list(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!("<li class=\"tag\">{}</li>", escape(t)))
        .collect()
}

/// Site-relative paths, web links and mail links. Anything else, such as
/// `javascript:`, is refused.
pub fn safe_url(href: &str) -> Option<&str> {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();
    let allowed = (href.starts_with('/') && !href.starts_with("//"))
        || ["http://", "https://", "mailto:"].iter().any(|scheme| lower.starts_with(scheme));
    allowed.then_some(href)
}

/// Renders `<a>` for `href` if there is one and it is safe to follow.
pub fn link(href: Option<&str>, label: &str) -> String {
    match href.and_then(safe_url) {
        Some(href) => format!("<a href=\"{}\">{}</a>", escape(href), escape(label)),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<b a=\"x\">&'"), "&lt;b a=&quot;x&quot;&gt;&amp;&#39;");
        assert_eq!(escape("{body}"), "&#123;body&#125;");
    }

    #[test]
    fn no_flash_no_banner() {
        assert!(banner(None).is_empty());
        let html = banner(Some(Flash::Error("<oops>".to_owned())));
        assert!(html.contains("&lt;oops&gt;"));
        assert!(html.contains("error"));
    }

    #[test]
    fn marks_selected_option() {
        let html = options([("all", "All"), ("React", "React")], "react");
        assert!(html.contains("<option value=\"React\" selected>React</option>"));
        assert!(html.contains("<option value=\"all\">All</option>"));
    }

    #[test]
    fn renders_markdown() {
        assert_eq!(markdown("I build *things*."), "<p>I build <em>things</em>.</p>\n");
        assert!(markdown("hi <script>x</script>").contains("&lt;script&gt;"));
        assert!(!markdown("see {skills}").contains("{skills}"));
    }

    #[test]
    fn links_only_to_safe_schemes() {
        assert_eq!(link(Some("https://github.com/ana"), "GitHub"), "<a href=\"https://github.com/ana\">GitHub</a>");
        assert!(link(Some("mailto:ana@x.com"), "Email").contains("mailto:ana@x.com"));
        assert!(link(Some("/storage/project-images/a.png"), "Shot").contains("href"));
        assert!(link(Some("javascript:alert(1)"), "Live").is_empty());
        assert!(link(Some(" JavaScript:alert(1)"), "Live").is_empty());
        assert!(link(Some("//evil.example"), "Live").is_empty());
        assert!(link(Some("data:text/html,hi"), "Live").is_empty());
        assert!(link(None, "Live").is_empty());
    }
}
