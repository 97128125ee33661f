//! Export renderer
//!
//! Dispatches an export on the requested format. The document format lays
//! out every submission field by field, embedding referenced images.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::domain::export::{
    DocumentBody, ExportError, ExportFormat, ExportOutput, ImageFetcher, ResolvedFieldMap,
};
use crate::domain::submission::{FormId, Submission};
use crate::infrastructure::observability::{record_export, record_export_image};

use super::image::{image_reference, load_embeddable, ImageReference};
use super::normalize::normalize_value;
use super::pdf::{Color, PdfDocument, PdfImage, PAGE_MARGIN, PAGE_WIDTH};
use super::resolver::FieldLabelResolver;
use super::scratch::{stage_in, RenderScratch, ScratchSpace};

/// Height of a `label: value` line
const LINE_HEIGHT: f64 = 8.0;

/// Box an embedded image is scaled into
const IMAGE_WIDTH: f64 = 50.0;
const IMAGE_MAX_HEIGHT: f64 = 35.0;

/// Space between an image and its link line
const IMAGE_GAP: f64 = 6.0;

const LINK_HEIGHT: f64 = 6.0;
const AFTER_LINK: f64 = 8.0;

/// Space above and below the separator between submissions
const SEPARATOR_GAP: f64 = 4.0;

/// Renders submissions in a requested export format
#[derive(Debug, Clone)]
pub struct ExportRenderer {
    resolver: FieldLabelResolver,
    fetcher: Arc<dyn ImageFetcher>,
    scratch: ScratchSpace,
}

impl ExportRenderer {
    pub fn new(
        resolver: FieldLabelResolver,
        fetcher: Arc<dyn ImageFetcher>,
        scratch: ScratchSpace,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            scratch,
        }
    }

    /// Render `submissions` of `form_id`
    pub async fn render(
        &self,
        form_id: FormId,
        submissions: Vec<Submission>,
        format: ExportFormat,
    ) -> Result<ExportOutput, ExportError> {
        let start = Instant::now();

        let result = match format {
            ExportFormat::Structured => Ok(ExportOutput::Structured(submissions)),
            ExportFormat::Tabular => Err(ExportError::UnsupportedFormat { format: "XLSX" }),
            ExportFormat::Document => self
                .render_document(form_id, &submissions)
                .await
                .map(ExportOutput::Document),
        };

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        record_export(format.as_str(), outcome, start.elapsed());

        match &result {
            Ok(ExportOutput::Document(body)) => info!(
                form_id = %form_id,
                bytes = body.bytes.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Rendered submission document"
            ),
            Ok(ExportOutput::Structured(rows)) => debug!(
                form_id = %form_id,
                count = rows.len(),
                "Passing submissions through"
            ),
            Err(e) => warn!(form_id = %form_id, format = %format, error = %e, "Export failed"),
        }

        result
    }

    async fn render_document(
        &self,
        form_id: FormId,
        submissions: &[Submission],
    ) -> Result<DocumentBody, ExportError> {
        let fields = self.resolver.resolve(form_id, submissions).await?;
        let scratch = self.scratch.open()?;
        let mut pdf = PdfDocument::new();

        for (index, submission) in submissions.iter().enumerate() {
            self.write_submission(&mut pdf, &scratch, &fields, submission)
                .await?;

            if index + 1 < submissions.len() {
                pdf.ln(SEPARATOR_GAP);
                let y = pdf.y();
                pdf.line(PAGE_MARGIN, y, PAGE_WIDTH - PAGE_MARGIN, y);
                pdf.ln(SEPARATOR_GAP);
            }
        }

        Ok(DocumentBody::pdf(pdf.finish()))
    }

    async fn write_submission(
        &self,
        pdf: &mut PdfDocument,
        scratch: &RenderScratch,
        fields: &ResolvedFieldMap,
        submission: &Submission,
    ) -> Result<(), ExportError> {
        for (key, label) in fields.iter() {
            let Some(raw) = submission.field_value(key) else {
                continue;
            };
            if raw.is_null() {
                continue;
            }

            let value = normalize_value(&raw);

            match image_reference(&value) {
                Some(reference) => self.write_image(pdf, scratch, label, &reference).await?,
                None => pdf.multi_cell(LINE_HEIGHT, &format!("{}: {}", label, value)),
            }
        }

        Ok(())
    }

    async fn write_image(
        &self,
        pdf: &mut PdfDocument,
        scratch: &RenderScratch,
        label: &str,
        reference: &ImageReference,
    ) -> Result<(), ExportError> {
        pdf.multi_cell(LINE_HEIGHT, &format!("{}:", label));

        let bytes = self.fetcher.fetch(&reference.url).await.inspect_err(|_| {
            record_export_image("fetch_failed");
        })?;

        let image = prepare_image(scratch.path().to_path_buf(), bytes, reference.clone()).await?;

        pdf.image(image, IMAGE_WIDTH, IMAGE_MAX_HEIGHT);
        pdf.ln(IMAGE_MAX_HEIGHT);
        pdf.ln(IMAGE_GAP);

        pdf.set_text_color(Color::BLUE);
        pdf.set_underline(true);
        pdf.write_link(LINK_HEIGHT, &reference.url, &reference.url);
        pdf.set_underline(false);
        pdf.set_text_color(Color::BLACK);
        pdf.ln(AFTER_LINK);

        record_export_image("embedded");
        debug!(url = %reference.url, "Embedded image");

        Ok(())
    }
}

/// Stage, decode and re-encode fetched image bytes on the blocking pool
async fn prepare_image(
    dir: PathBuf,
    bytes: Bytes,
    reference: ImageReference,
) -> Result<PdfImage, ExportError> {
    tokio::task::spawn_blocking(move || stage_and_load(&dir, &bytes, &reference))
        .await
        .map_err(|e| ExportError::render(format!("image preparation task failed: {}", e)))?
}

fn stage_and_load(
    dir: &Path,
    bytes: &[u8],
    reference: &ImageReference,
) -> Result<PdfImage, ExportError> {
    let staged = stage_in(dir, bytes, &reference.extension)?;
    let image = load_embeddable(staged.path(), &reference.url).inspect_err(|_| {
        record_export_image("unsupported");
    })?;
    staged
        .close()
        .map_err(|e| ExportError::filesystem(format!("cannot remove staging file: {}", e)))?;

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::export::MockImageFetcher;
    use crate::domain::form::FieldDefinition;
    use crate::infrastructure::export::ReqwestImageFetcher;
    use crate::infrastructure::form::InMemoryFormSchemaProvider;
    use chrono::NaiveDate;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn form() -> FormId {
        FormId::new(3).unwrap()
    }

    fn submission(id: u64) -> Submission {
        let at = NaiveDate::from_ymd_opt(2024, 5, 2)
            .unwrap()
            .and_hms_opt(14, 3, 9)
            .unwrap();
        Submission::new(id, form(), at)
    }

    fn png() -> Vec<u8> {
        let image = RgbImage::from_pixel(4, 2, Rgb([10, 200, 10]));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn renderer_with(fetcher: impl ImageFetcher + 'static, scratch: ScratchSpace) -> ExportRenderer {
        let schemas = InMemoryFormSchemaProvider::new();
        schemas
            .set_fields(
                form(),
                vec![FieldDefinition::new("email", "Email Address", "email")],
            )
            .unwrap();

        ExportRenderer::new(
            FieldLabelResolver::new(Arc::new(schemas)),
            Arc::new(fetcher),
            scratch,
        )
    }

    fn renderer(fetcher: MockImageFetcher) -> ExportRenderer {
        renderer_with(fetcher, ScratchSpace::default())
    }

    fn document_text(output: ExportOutput) -> String {
        match output {
            ExportOutput::Document(body) => {
                assert_eq!(body.content_type, "application/pdf");
                String::from_utf8_lossy(&body.bytes).into_owned()
            }
            ExportOutput::Structured(_) => panic!("expected a document"),
        }
    }

    #[tokio::test]
    async fn test_structured_passes_through() {
        let renderer = renderer(MockImageFetcher::new());
        let rows = vec![submission(1).with_field("email", "a@example.com")];

        let output = renderer
            .render(form(), rows.clone(), ExportFormat::Structured)
            .await
            .unwrap();

        match output {
            ExportOutput::Structured(result) => assert_eq!(result, rows),
            ExportOutput::Document(_) => panic!("expected structured output"),
        }
    }

    #[tokio::test]
    async fn test_tabular_is_not_implemented() {
        let mut fetcher = MockImageFetcher::new();
        fetcher.expect_fetch().never();
        let renderer = renderer(fetcher);

        let err = renderer
            .render(form(), vec![submission(1)], ExportFormat::Tabular)
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::UnsupportedFormat { .. }));
    }

    #[tokio::test]
    async fn test_document_lists_labelled_values() {
        let renderer = renderer(MockImageFetcher::new());
        let rows = vec![
            submission(1)
                .with_field("email", "a@example.com")
                .with_field("_custom_note", "line one\nline two")
                .with_field("_form_id", 3),
            submission(2).with_field("email", "b@example.com"),
        ];

        let text = document_text(
            renderer
                .render(form(), rows, ExportFormat::Document)
                .await
                .unwrap(),
        );

        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.contains("(Email Address: a@example.com) Tj"));
        assert!(text.contains("(Custom Note: line one line two) Tj"));
        assert!(text.contains("(Date Submitted: 2024-05-02 14:03:09) Tj"));
        assert!(text.contains("(Email Address: b@example.com) Tj"));
        assert!(!text.contains("Form Id"));
        assert_eq!(text.matches(" l\n").count(), 1);
    }

    #[tokio::test]
    async fn test_document_skips_absent_and_null_fields() {
        let renderer = renderer(MockImageFetcher::new());
        let rows = vec![
            submission(1).with_field("phone", "555"),
            submission(2).with_field("phone", serde_json::Value::Null),
        ];

        let text = document_text(
            renderer
                .render(form(), rows, ExportFormat::Document)
                .await
                .unwrap(),
        );

        assert_eq!(text.matches("(Phone: ").count(), 1);
        assert!(!text.contains("Email Address"));
    }

    #[tokio::test]
    async fn test_empty_document_is_single_page() {
        let renderer = renderer(MockImageFetcher::new());

        let text = document_text(
            renderer
                .render(form(), vec![], ExportFormat::Document)
                .await
                .unwrap(),
        );

        assert!(text.contains("/Count 1"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[tokio::test]
    async fn test_document_embeds_image_with_link() {
        let mut fetcher = MockImageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url == "https://example.com/photo.PNG")
            .times(1)
            .returning(|_| Ok(Bytes::from(png())));
        let renderer = renderer(fetcher);
        let rows = vec![submission(1).with_field("photo", "https://example.com/photo.PNG")];

        let text = document_text(
            renderer
                .render(form(), rows, ExportFormat::Document)
                .await
                .unwrap(),
        );

        assert!(text.contains("(Photo:) Tj"));
        assert!(text.contains("/Subtype /Image"));
        assert!(text.contains("/URI (https://example.com/photo.PNG)"));
        assert!(text.contains("(https://example.com/photo.PNG) Tj"));
    }

    #[tokio::test]
    async fn test_non_image_url_is_plain_text() {
        let mut fetcher = MockImageFetcher::new();
        fetcher.expect_fetch().never();
        let renderer = renderer(fetcher);
        let rows = vec![submission(1).with_field("avatar", "https://example.com/photo.gif")];

        let text = document_text(
            renderer
                .render(form(), rows, ExportFormat::Document)
                .await
                .unwrap(),
        );

        assert!(text.contains("(Avatar: https://example.com/photo.gif) Tj"));
        assert!(!text.contains("/Subtype /Image"));
    }

    #[tokio::test]
    async fn test_image_fetch_failure_aborts_export() {
        let mut fetcher = MockImageFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|url| Err(ExportError::upstream_fetch(url, "HTTP 404")));
        let renderer = renderer(fetcher);
        let rows = vec![
            submission(1).with_field("photo", "https://example.com/missing.jpg"),
            submission(2).with_field("email", "b@example.com"),
        ];

        let err = renderer
            .render(form(), rows, ExportFormat::Document)
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::UpstreamFetch { .. }));
    }

    #[tokio::test]
    async fn test_undecodable_image_aborts_export() {
        let mut fetcher = MockImageFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_| Ok(Bytes::from_static(b"<html>nope</html>")));
        let renderer = renderer(fetcher);
        let rows = vec![submission(1).with_field("photo", "https://example.com/a.jpg")];

        let err = renderer
            .render(form(), rows, ExportFormat::Document)
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::UnsupportedImage { .. }));
    }

    #[tokio::test]
    async fn test_unusable_scratch_dir_fails() {
        let missing = std::env::temp_dir().join("form-export-missing-base/nested");
        let renderer = renderer_with(
            MockImageFetcher::new(),
            ScratchSpace::new(Some(missing)),
        );

        let err = renderer
            .render(form(), vec![submission(1)], ExportFormat::Document)
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::FilesystemUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_scratch_files_are_removed_after_render() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/scan.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png()))
            .mount(&server)
            .await;

        let base = tempfile::tempdir().unwrap();
        let renderer = renderer_with(
            ReqwestImageFetcher::new(None).unwrap(),
            ScratchSpace::new(Some(base.path().to_path_buf())),
        );
        let rows = vec![submission(1).with_field("scan", format!("{}/scan.png", server.uri()))];

        let text = document_text(
            renderer
                .render(form(), rows, ExportFormat::Document)
                .await
                .unwrap(),
        );

        assert!(text.contains("/Subtype /Image"));
        assert_eq!(std::fs::read_dir(base.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_stage_and_load_removes_staged_file() {
        let dir = tempfile::tempdir().unwrap();
        let reference = image_reference("https://example.com/photo.png").unwrap();

        let image = stage_and_load(dir.path(), &png(), &reference).unwrap();

        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_document_exports_embed_images() {
        let mut fetcher = MockImageFetcher::new();
        fetcher
            .expect_fetch()
            .times(4)
            .returning(|_| Ok(Bytes::from(png())));
        let renderer = Arc::new(renderer(fetcher));

        let handles: Vec<_> = (0..4)
            .map(|id| {
                let renderer = renderer.clone();
                tokio::spawn(async move {
                    let rows =
                        vec![submission(id).with_field("photo", "https://example.com/photo.png")];
                    renderer.render(form(), rows, ExportFormat::Document).await
                })
            })
            .collect();

        for handle in handles {
            let text = document_text(handle.await.unwrap().unwrap());
            assert!(text.contains("/Subtype /Image"));
        }
    }
}
