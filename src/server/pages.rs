//! HTML pages: the generator index and per-type configuration pages.
//!
//! Both are rendered in-process from the registry. The type name only ever
//! comes from a registered generator, never from a request path.

use crate::fractal::{FractalGenerator, FractalRegistry, Parameter};

/// Escape HTML special characters to prevent XSS attacks.
fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

const STYLE: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            background: #0f0f0f;
            color: #eee;
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            padding: 32px;
            line-height: 1.5;
        }
        h1 { font-size: 20px; margin-bottom: 16px; }
        a { color: #818cf8; text-decoration: none; }
        ul { list-style: none; }
        li { margin-bottom: 8px; }
        .description { color: rgba(255, 255, 255, 0.7); font-size: 13px; }
        form { display: grid; grid-template-columns: max-content 160px 1fr; gap: 8px 12px; margin: 16px 0; }
        label { font-family: monospace; }
        input { background: #1c1c1c; color: #eee; border: 1px solid #333; padding: 2px 6px; }
        button { grid-column: 1 / span 2; padding: 4px; }
        img { border: 1px solid #333; margin-top: 16px; image-rendering: pixelated; }
"#;

/// Query string that reproduces a generator's defaults.
fn default_query(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(|p| format!("{}={}", urlencoding::encode(p.name), urlencoding::encode(p.default)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Generate the index page listing every registered generator.
pub fn generate_index_html(registry: &FractalRegistry) -> String {
    let items: String = registry
        .generators()
        .map(|g| {
            let name = html_escape(g.name());
            format!(
                "            <li><a href=\"/{href}\">{name}</a> <span class=\"description\">{description}</span></li>\n",
                href = urlencoding::encode(g.name()),
                name = name,
                description = html_escape(g.description()),
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>fracserv</title>
    <style>{style}</style>
</head>
<body>
    <h1>Fractals</h1>
    <ul>
{items}    </ul>
</body>
</html>
"#,
        style = STYLE,
        items = items,
    )
}

/// Generate the configuration page for one generator.
///
/// The form submits to the tile route with the entered options; the preview
/// image renders the generator's defaults.
pub fn generate_config_html(generator: &dyn FractalGenerator) -> String {
    let name = html_escape(generator.name());
    let href = urlencoding::encode(generator.name());
    let parameters = generator.parameters();

    let fields: String = parameters
        .iter()
        .map(|p| {
            let key = html_escape(p.name);
            format!(
                "        <label for=\"{key}\">{key}</label><input id=\"{key}\" name=\"{key}\" value=\"{default}\"><span class=\"description\">{description}</span>\n",
                key = key,
                default = html_escape(p.default),
                description = html_escape(p.description),
            )
        })
        .collect();

    let preview = html_escape(&format!("/{}?{}", href, default_query(parameters)));

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>fracserv - {name}</title>
    <style>{style}</style>
</head>
<body>
    <h1><a href="/">fracserv</a> / {name}</h1>
    <p class="description">{description}</p>
    <form method="get" action="/{href}">
{fields}        <button type="submit">Render</button>
    </form>
    <img src="{preview}" alt="{name} preview">
</body>
</html>
"#,
        name = name,
        style = STYLE,
        description = html_escape(generator.description()),
        href = href,
        fields = fields,
        preview = preview,
    )
}
