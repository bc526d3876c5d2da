use axum::response::Html;

use docdigest_core::{OcrPageError, ProviderKind};

const BASE_HTML: &str = include_str!("../templates/base.html");
const MENU_HTML: &str = include_str!("../templates/menu.html");
const SETTINGS_HTML: &str = include_str!("../templates/settings.html");
const CONFIGURE_HTML: &str = include_str!("../templates/configure.html");
const UPLOAD_HTML: &str = include_str!("../templates/upload.html");
const EDIT_HTML: &str = include_str!("../templates/edit.html");
const SUMMARY_HTML: &str = include_str!("../templates/summary.html");
const ERROR_HTML: &str = include_str!("../templates/error.html");

/// Substitute `{{ name }}` placeholders in one pass.
///
/// Values are inserted as-is; callers escape anything user supplied.
/// Inserted text is never rescanned, so a value containing `{{ x }}` stays
/// literal. Unknown placeholders render as empty.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(start) = rest.find("{{ ") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 3..];
        match after.find(" }}") {
            Some(end) => {
                let name = &after[..end];
                if let Some((_, value)) = vars.iter().find(|(k, _)| *k == name) {
                    out.push_str(value);
                }
                rest = &after[end + 3..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn page(content: &str) -> Html<String> {
    Html(fill(BASE_HTML, &[("content", content)]))
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn alert(class: &str, message: &str) -> String {
    format!(
        r#"<div class="alert alert-{}">{}</div>"#,
        class,
        html_escape(message)
    )
}

/// Landing page. `provider` is the service chosen in this session, if any.
pub fn render_menu(provider: Option<ProviderKind>, has_key: bool) -> Html<String> {
    let status = match (provider, has_key) {
        (Some(kind), true) => format!("Serviço configurado: {}", kind),
        (Some(kind), false) => format!("Serviço {} selecionado, falta a chave API", kind),
        (None, _) => "Nenhum serviço configurado".to_string(),
    };
    page(&fill(MENU_HTML, &[("status", &html_escape(&status))]))
}

pub fn render_settings(selected: Option<ProviderKind>, error: Option<&str>) -> Html<String> {
    let options: String = ProviderKind::ALL
        .iter()
        .map(|kind| {
            let attr = if selected == Some(*kind) { " selected" } else { "" };
            format!(
                r#"<option value="{0}"{1}>{0}</option>"#,
                kind.as_str(),
                attr
            )
        })
        .collect::<Vec<_>>()
        .join("\n        ");
    let error = error.map(|e| alert("danger", e)).unwrap_or_default();

    page(&fill(
        SETTINGS_HTML,
        &[("error", &error), ("options", &options)],
    ))
}

pub fn render_configure(kind: ProviderKind, error: Option<&str>) -> Html<String> {
    let guide = kind
        .guide()
        .iter()
        .map(|step| html_escape(step))
        .collect::<Vec<_>>()
        .join("<br>");
    let error = error.map(|e| alert("danger", e)).unwrap_or_default();

    page(&fill(
        CONFIGURE_HTML,
        &[("service", kind.as_str()), ("guide", &guide), ("error", &error)],
    ))
}

pub fn render_upload(kind: ProviderKind) -> Html<String> {
    page(&fill(UPLOAD_HTML, &[("service", kind.as_str())]))
}

/// The edit form, pre-filled with the extracted text.
pub fn render_edit(filename: &str, text: &str, failures: &[OcrPageError]) -> Html<String> {
    let warnings = if failures.is_empty() {
        String::new()
    } else {
        let items: String = failures
            .iter()
            .map(|f| {
                format!(
                    "<li>OCR falhou na página {}: {}</li>",
                    f.page,
                    html_escape(&f.message)
                )
            })
            .collect();
        format!(r#"<div class="alert alert-warning"><ul class="mb-0">{items}</ul></div>"#)
    };

    page(&fill(
        EDIT_HTML,
        &[
            ("filename", &html_escape(filename)),
            ("warnings", &warnings),
            ("text", &html_escape(text)),
        ],
    ))
}

pub fn render_summary(kind: ProviderKind, summary: &str) -> Html<String> {
    page(&fill(
        SUMMARY_HTML,
        &[("service", kind.as_str()), ("summary", &html_escape(summary))],
    ))
}

pub fn render_error(title: &str, message: &str) -> Html<String> {
    page(&fill(
        ERROR_HTML,
        &[("title", &html_escape(title)), ("message", &html_escape(message))],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_does_not_rescan_inserted_values() {
        let out = fill("<p>{{ a }}|{{ b }}</p>", &[("a", "{{ b }}"), ("b", "x")]);
        assert_eq!(out, "<p>{{ b }}|x</p>");
    }

    #[test]
    fn fill_drops_unknown_and_keeps_unterminated() {
        assert_eq!(fill("a{{ nope }}b", &[]), "ab");
        assert_eq!(fill("a{{ open", &[]), "a{{ open");
    }

    #[test]
    fn escape_covers_markup() {
        assert_eq!(
            html_escape(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn edit_page_escapes_text_and_lists_failures() {
        let failures = vec![OcrPageError {
            page: 2,
            message: "engine <crashed>".into(),
        }];
        let Html(body) = render_edit("a.pdf", "</textarea><script>", &failures);
        assert!(body.contains("&lt;/textarea&gt;&lt;script&gt;"));
        assert!(!body.contains("</textarea><script>"));
        assert!(body.contains("OCR falhou na página 2: engine &lt;crashed&gt;"));
    }

    #[test]
    fn settings_marks_selected_provider() {
        let Html(body) = render_settings(Some(ProviderKind::Cohere), None);
        assert!(body.contains(r#"<option value="Cohere" selected>Cohere</option>"#));
        assert!(body.contains(r#"<option value="OpenAI">OpenAI</option>"#));
    }

    #[test]
    fn configure_shows_guide_steps() {
        let Html(body) = render_configure(ProviderKind::HuggingFace, None);
        assert!(body.contains("huggingface.co/settings/tokens"));
        assert!(body.contains(r#"action="/configure/HuggingFace""#));
    }
}
