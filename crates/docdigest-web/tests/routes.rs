//! End-to-end tests of the router with mock extraction backends and a mock
//! summarizer. Requests are driven in-process with `oneshot`; the session
//! cookie is carried between requests by hand.

use std::io::{Cursor, Write};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use docdigest_core::provider::mock::{MockResponse, MockSummarizer};
use docdigest_core::{
    BackendError, Config, OcrEngine, OcrSettings, PageImage, PdfBackend, ProviderKind,
    ProviderRegistry,
};
use docdigest_ingest::Extractor;
use docdigest_web::{AppState, router};

struct LayerPdf(&'static str);

impl PdfBackend for LayerPdf {
    fn page_texts(&self, _data: &[u8]) -> Result<Vec<String>, BackendError> {
        Ok(vec![self.0.to_string()])
    }

    fn render_pages(
        &self,
        _data: &[u8],
        _dpi: u32,
        _visit: &mut dyn FnMut(Result<PageImage, BackendError>),
    ) -> Result<usize, BackendError> {
        Ok(0)
    }
}

struct NoOcr;

impl OcrEngine for NoOcr {
    fn recognize(
        &self,
        _image: &PageImage,
        _languages: Option<&str>,
    ) -> Result<String, BackendError> {
        Err(BackendError::OcrError("not available in tests".into()))
    }
}

struct Harness {
    app: Router,
    summarizer: Arc<MockSummarizer>,
    cookie: Option<String>,
}

impl Harness {
    fn new(response: MockResponse) -> Self {
        Self::with_config(Config::default(), response)
    }

    fn with_config(config: Config, response: MockResponse) -> Self {
        let summarizer = Arc::new(MockSummarizer::new("Cohere", response));
        let providers =
            ProviderRegistry::from_config(&config).with(ProviderKind::Cohere, summarizer.clone());
        let extractor = Extractor::new(
            Some(Arc::new(LayerPdf("Texto da camada do PDF"))),
            Arc::new(NoOcr),
            OcrSettings::default(),
        );
        let state = Arc::new(AppState {
            extractor,
            providers,
            client: reqwest::Client::new(),
            config,
        });
        Self {
            app: router(state),
            summarizer,
            cookie: None,
        }
    }

    async fn send(&mut self, builder: axum::http::request::Builder, body: Body) -> Response<Body> {
        let builder = match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        };
        let resp = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        if let Some(set) = resp.headers().get(header::SET_COOKIE) {
            let pair = set.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }
        resp
    }

    async fn get(&mut self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri), Body::empty()).await
    }

    async fn post_form(&mut self, uri: &str, body: &str) -> Response<Body> {
        let builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(builder, Body::from(body.to_string())).await
    }

    async fn upload(&mut self, filename: &str, data: &[u8]) -> Response<Body> {
        let boundary = "docdigest-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let builder = Request::builder()
            .method("POST")
            .uri("/process")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            );
        self.send(builder, Body::from(body)).await
    }

    /// Choose Cohere and store a key.
    async fn configure(&mut self) {
        let resp = self.post_form("/settings", "ai_service=Cohere").await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let resp = self.post_form("/configure/Cohere", "api_key=co-key").await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }
}

async fn body_text(resp: Response<Body>) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(resp: &Response<Body>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
        .collect();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(document.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn menu_links_settings_and_process() {
    let mut h = Harness::new(MockResponse::Echo);
    let resp = h.get("/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains(r#"href="/settings""#));
    assert!(html.contains(r#"href="/process""#));
    assert!(html.contains("Nenhum serviço configurado"));
}

#[tokio::test]
async fn process_without_key_redirects_to_settings() {
    let mut h = Harness::new(MockResponse::Echo);
    let resp = h.get("/process").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/settings");

    let resp = h.post_form("/process", "text=oi").await;
    assert_eq!(location(&resp), "/settings");
    assert_eq!(h.summarizer.call_count(), 0);
}

#[tokio::test]
async fn provider_without_key_still_redirects() {
    let mut h = Harness::new(MockResponse::Echo);
    h.post_form("/settings", "ai_service=OpenAI").await;
    let resp = h.get("/process").await;
    assert_eq!(location(&resp), "/settings");
}

#[tokio::test]
async fn unknown_service_rerenders_settings() {
    let mut h = Harness::new(MockResponse::Echo);
    let resp = h.post_form("/settings", "ai_service=Gemini").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let html = body_text(resp).await;
    assert!(html.contains("unknown AI service: Gemini"));
    assert!(html.contains(r#"name="ai_service""#));
}

#[tokio::test]
async fn settings_redirects_to_configure() {
    let mut h = Harness::new(MockResponse::Echo);
    let resp = h.post_form("/settings", "ai_service=HuggingFace").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/configure/HuggingFace");
}

#[tokio::test]
async fn configure_unknown_service_is_404() {
    let mut h = Harness::new(MockResponse::Echo);
    assert_eq!(h.get("/configure/Gemini").await.status(), StatusCode::NOT_FOUND);
    let resp = h.post_form("/configure/Gemini", "api_key=x").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn configure_page_shows_guide() {
    let mut h = Harness::new(MockResponse::Echo);
    let resp = h.get("/configure/Cohere").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("dashboard.cohere.ai/api-keys"));
    assert!(html.contains(r#"name="api_key""#));
}

#[tokio::test]
async fn blank_key_is_rejected() {
    let mut h = Harness::new(MockResponse::Echo);
    let resp = h.post_form("/configure/Cohere", "api_key=+++").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_edit_and_summarize() {
    let mut h = Harness::new(MockResponse::Echo);
    h.configure().await;

    let resp = h.get("/process").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains(r#"enctype="multipart/form-data""#));

    let resp = h
        .upload("carta.docx", &docx_with_paragraphs(&["Olá", "A &amp; B &lt;i&gt;"]))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("carta.docx"));
    assert!(html.contains("Olá\nA &amp; B &lt;i&gt;</textarea>"));

    let resp = h.post_form("/process", "text=Texto+editado").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("resumo: Texto editado"));
    assert_eq!(
        h.summarizer.calls(),
        vec![("Texto editado".to_string(), "co-key".to_string())]
    );
}

#[tokio::test]
async fn pdf_upload_uses_text_layer() {
    let mut h = Harness::new(MockResponse::Echo);
    h.configure().await;
    let resp = h.upload("relatorio.PDF", b"%PDF-1.7").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Texto da camada do PDF"));
}

#[tokio::test]
async fn unsupported_upload_is_415() {
    let mut h = Harness::new(MockResponse::Echo);
    h.configure().await;
    let resp = h.upload("notas.txt", b"plain").await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body_text(resp).await.contains("Formato não suportado"));
}

#[tokio::test]
async fn corrupt_docx_is_422() {
    let mut h = Harness::new(MockResponse::Echo);
    h.configure().await;
    let resp = h.upload("quebrado.docx", b"not a zip").await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(resp).await.contains("Erro na extração"));
}

#[tokio::test]
async fn malformed_provider_response_is_502() {
    let mut h = Harness::new(MockResponse::Malformed("missing generations[0].text".into()));
    h.configure().await;
    let resp = h.post_form("/process", "text=abc").await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let html = body_text(resp).await;
    assert!(html.contains("Erro na geração"));
    assert!(html.contains("generations[0].text"));
}

#[tokio::test]
async fn summary_is_escaped() {
    let mut h = Harness::new(MockResponse::Summary("<script>alert(1)</script>".into()));
    h.configure().await;
    let html = body_text(h.post_form("/process", "text=x").await).await;
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!html.contains("<script>alert(1)"));
}

#[tokio::test]
async fn switching_provider_drops_the_key() {
    let mut h = Harness::new(MockResponse::Echo);
    h.configure().await;
    h.post_form("/settings", "ai_service=OpenAI").await;
    let resp = h.get("/process").await;
    assert_eq!(location(&resp), "/settings");
}

fn one_megabyte_limit() -> Config {
    Config {
        max_upload_mb: 1,
        ..Config::default()
    }
}

#[tokio::test]
async fn oversized_text_is_413() {
    let mut h = Harness::with_config(one_megabyte_limit(), MockResponse::Echo);
    h.configure().await;
    let body = format!("text={}", "a".repeat(1024 * 1024 + 1));
    let resp = h.post_form("/process", &body).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(h.summarizer.call_count(), 0);
}

#[tokio::test]
async fn oversized_upload_is_413() {
    let mut h = Harness::with_config(one_megabyte_limit(), MockResponse::Echo);
    h.configure().await;
    let resp = h.upload("grande.docx", &vec![b'x'; 2 * 1024 * 1024]).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
