//! # Export
//!
//! Drives one export: totals, pagination, composition, then a hand-off to
//! a [`DocumentWriter`]. Everything before the hand-off is synchronous and
//! pure; the writer is the only place an export can wait or touch the
//! outside world. A writer failure is handed back unchanged and never
//! retried.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FolioError;
use crate::layout::compose::{Compositor, Page};
use crate::layout::geometry::{PageGeometry, PaperFormat};
use crate::layout::page_break::paginate;
use crate::logo::{load_logo, LoadedImage};
use crate::model::Invoice;
use crate::pdf::PdfWriter;
use crate::totals::Totals;

/// What to export and on which paper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub invoice: Invoice,
    #[serde(default)]
    pub paper: PaperFormat,
    /// Overrides the paper defaults, e.g. with heights measured by the host.
    #[serde(default)]
    pub geometry: Option<PageGeometry>,
}

impl ExportRequest {
    pub fn new(invoice: Invoice) -> Self {
        Self {
            invoice,
            paper: PaperFormat::default(),
            geometry: None,
        }
    }

    pub fn with_paper(mut self, paper: PaperFormat) -> Self {
        self.paper = paper;
        self
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// The geometry this request lays out with.
    pub fn page_geometry(&self) -> PageGeometry {
        self.geometry.unwrap_or_else(|| self.paper.geometry())
    }
}

/// The composed pages of one invoice, ready for a writer.
#[derive(Debug, Clone)]
pub struct PaginatedDocument {
    pub filename: String,
    pub title: String,
    pub author: String,
    pub pages: Vec<Page>,
    /// The decoded logo, drawn where the letterhead placed it.
    pub logo: Option<LoadedImage>,
}

/// A rendered file in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Produces the final artifact from composed pages.
#[async_trait]
pub trait DocumentWriter: Send + Sync {
    type Output: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    async fn write(&self, document: PaginatedDocument) -> Result<Self::Output, Self::Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError<E>
where
    E: std::error::Error + 'static,
{
    #[error(transparent)]
    Layout(#[from] FolioError),
    #[error("document writer failed: {0}")]
    Writer(#[source] E),
}

// `Instant::now` panics on wasm32-unknown-unknown.
#[cfg(not(target_arch = "wasm32"))]
fn start_timer() -> Option<Instant> {
    Some(Instant::now())
}

#[cfg(target_arch = "wasm32")]
fn start_timer() -> Option<Instant> {
    None
}

fn elapsed_ms(start: Option<Instant>) -> f64 {
    start.map_or(0.0, |t| t.elapsed().as_secs_f64() * 1000.0)
}

/// `<invoice number>.pdf` with every character outside `[A-Za-z0-9]`
/// replaced by `_`.
pub fn export_filename(invoice_number: &str) -> String {
    let stem: String = invoice_number
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "invoice.pdf".to_string()
    } else {
        format!("{stem}.pdf")
    }
}

/// Run the synchronous part of an export: totals, pagination and
/// composition. A logo that cannot be decoded is left out.
pub fn paginate_document(request: &ExportRequest) -> Result<PaginatedDocument, FolioError> {
    let invoice = &request.invoice;
    let geometry = request.page_geometry();

    let totals = Totals::for_invoice(invoice);
    let groups = paginate(&invoice.items, &geometry)?;

    let logo = match load_logo(&invoice.logo) {
        Ok(logo) => logo,
        Err(e) => {
            log::warn!("logo omitted: {e}");
            None
        }
    };

    let mut compositor = Compositor::new(geometry);
    if let Some(image) = &logo {
        compositor = compositor.with_logo(image.width_px, image.height_px);
    }
    let pages = compositor.compose(invoice, &groups, &totals)?;

    let number = invoice.meta.invoice_number.trim();
    let title = if number.is_empty() {
        "Invoice".to_string()
    } else {
        format!("Invoice {number}")
    };

    Ok(PaginatedDocument {
        filename: export_filename(number),
        title,
        author: invoice.seller.display_name().to_string(),
        pages,
        logo,
    })
}

/// Export `request` through `writer`.
pub async fn export<W: DocumentWriter>(
    request: &ExportRequest,
    writer: &W,
) -> Result<W::Output, ExportError<W::Error>> {
    let start = start_timer();
    let document = paginate_document(request)?;
    let layout_ms = elapsed_ms(start);
    let page_count = document.pages.len();
    let filename = document.filename.clone();

    let output = writer.write(document).await.map_err(ExportError::Writer)?;

    log::info!(
        "exported {} ({} items, {} pages): layout {:.1}ms, total {:.1}ms",
        filename,
        request.invoice.items.len(),
        page_count,
        layout_ms,
        elapsed_ms(start)
    );
    Ok(output)
}

/// A writer bound to an export pipeline.
#[derive(Debug, Clone)]
pub struct Exporter<W> {
    writer: W,
}

impl<W: DocumentWriter> Exporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub async fn export(&self, request: &ExportRequest) -> Result<W::Output, ExportError<W::Error>> {
        export(request, &self.writer).await
    }
}

/// Render `request` to PDF bytes without a runtime.
pub fn render(request: &ExportRequest) -> Result<RenderedDocument, FolioError> {
    let start = start_timer();
    let document = paginate_document(request)?;
    let bytes = PdfWriter::new().render_document(&document);
    log::info!(
        "rendered {} ({} pages, {} bytes) in {:.1}ms",
        document.filename,
        document.pages.len(),
        bytes.len(),
        elapsed_ms(start)
    );
    Ok(RenderedDocument {
        filename: document.filename,
        bytes,
    })
}

/// Parse an [`ExportRequest`] from JSON and render it.
pub fn render_json(json: &str) -> Result<RenderedDocument, FolioError> {
    let request: ExportRequest = serde_json::from_str(json)?;
    render(&request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Adjustments, LineItem, Logo};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request(rows: usize) -> ExportRequest {
        let items = (0..rows)
            .map(|i| LineItem::new(&format!("Line {i}"), 1.0, 100.0))
            .collect();
        let mut invoice = Invoice::new(items, Adjustments::default());
        invoice.meta.invoice_number = "INV-20240301-007".to_string();
        invoice.seller.name = "Grace Hopper".to_string();
        ExportRequest::new(invoice)
    }

    #[derive(Debug, thiserror::Error)]
    #[error("printer on fire")]
    struct PrinterOnFire;

    /// Fails every call and counts how often it was asked.
    #[derive(Default)]
    struct FailingWriter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DocumentWriter for FailingWriter {
        type Output = ();
        type Error = PrinterOnFire;

        async fn write(&self, _document: PaginatedDocument) -> Result<(), PrinterOnFire> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(PrinterOnFire)
        }
    }

    /// Records the page count it received.
    struct PageCounter;

    #[async_trait]
    impl DocumentWriter for PageCounter {
        type Output = (String, Vec<bool>);
        type Error = std::convert::Infallible;

        async fn write(&self, document: PaginatedDocument) -> Result<Self::Output, Self::Error> {
            let flags = document.pages.iter().map(Page::includes_summary).collect();
            Ok((document.filename, flags))
        }
    }

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(export_filename("INV-20240301-007"), "INV_20240301_007.pdf");
        assert_eq!(export_filename("2024/03 #7"), "2024_03__7.pdf");
        assert_eq!(export_filename("Rechnung\u{e4}"), "Rechnung_.pdf");
        assert_eq!(export_filename("   "), "invoice.pdf");
        assert_eq!(export_filename(""), "invoice.pdf");
    }

    #[test]
    fn request_json_defaults_to_a4() {
        let req: ExportRequest = serde_json::from_str(r#"{ "invoice": { "items": [] } }"#).unwrap();
        assert_eq!(req.paper, PaperFormat::A4);
        assert_eq!(req.page_geometry(), PaperFormat::A4.geometry());

        let req: ExportRequest =
            serde_json::from_str(r#"{ "invoice": { "items": [] }, "paper": "Letter" }"#).unwrap();
        assert_eq!(req.page_geometry().page_height, 792.0);
    }

    #[test]
    fn explicit_geometry_overrides_paper() {
        let geometry = PageGeometry {
            row_height: 24.0,
            ..PaperFormat::Letter.geometry()
        };
        let req = request(1).with_paper(PaperFormat::A4).with_geometry(geometry);
        assert_eq!(req.page_geometry(), geometry);
    }

    #[test]
    fn paginated_document_carries_metadata() {
        let doc = paginate_document(&request(25)).unwrap();
        assert_eq!(doc.filename, "INV_20240301_007.pdf");
        assert_eq!(doc.title, "Invoice INV-20240301-007");
        assert_eq!(doc.author, "Grace Hopper");
        assert_eq!(doc.pages.len(), 2);
        assert!(doc.logo.is_none());
    }

    #[test]
    fn broken_logo_is_omitted() {
        let mut req = request(1);
        req.invoice.logo = Logo {
            data_url: Some("data:image/png;base64,????".to_string()),
            alt: "logo".to_string(),
        };
        let doc = paginate_document(&req).unwrap();
        assert!(doc.logo.is_none());
        assert!(doc.pages[0].header.logo.is_none());
    }

    #[test]
    fn invalid_geometry_fails_before_any_page() {
        let geometry = PageGeometry {
            row_height: -1.0,
            ..PageGeometry::default()
        };
        let err = render(&request(3).with_geometry(geometry)).unwrap_err();
        assert!(matches!(err, FolioError::InvalidGeometry(_)));
    }

    #[test]
    fn render_json_reports_parse_errors() {
        let err = render_json(r#"{ "invoice": { "items": [ } }"#).unwrap_err();
        assert!(matches!(err, FolioError::ParseError { .. }));
        let err = render_json(r#"{ "invoice": {} }"#).unwrap_err();
        assert!(err.to_string().contains("invoice schema"));
    }

    #[test]
    fn render_produces_pdf() {
        let rendered = render(&request(3)).unwrap();
        assert_eq!(rendered.filename, "INV_20240301_007.pdf");
        assert!(rendered.bytes.starts_with(b"%PDF-1.7"));
    }

    #[tokio::test]
    async fn writer_failure_is_surfaced_unchanged_without_retry() {
        let writer = FailingWriter::default();
        let err = export(&request(3), &writer).await.unwrap_err();
        match &err {
            ExportError::Writer(PrinterOnFire) => {}
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), "document writer failed: printer on fire");
        assert_eq!(writer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn layout_errors_never_reach_the_writer() {
        let writer = FailingWriter::default();
        let geometry = PageGeometry {
            reserved_footer_height: 10.0,
            ..PageGeometry::default()
        };
        let err = export(&request(3).with_geometry(geometry), &writer)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Layout(FolioError::InvalidGeometry(_))));
        assert_eq!(writer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn exporter_hands_pages_to_writer() {
        let exporter = Exporter::new(PageCounter);
        let (filename, flags) = exporter.export(&request(120)).await.unwrap();
        assert_eq!(filename, "INV_20240301_007.pdf");
        // 19 + 29 + 29 + 29 + 14
        assert_eq!(flags, vec![false, false, false, false, true]);
    }

    #[tokio::test]
    async fn concurrent_exports_are_independent() {
        let small = request(2);
        let large = request(90);
        let writer = PageCounter;
        let (a, b) = tokio::join!(export(&small, &writer), export(&large, &writer));
        assert_eq!(a.unwrap().1.len(), 1);
        assert_eq!(b.unwrap().1.len(), 4);
    }
}
