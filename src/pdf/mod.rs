//! # PDF Serializer
//!
//! Writes composed pages as a PDF 1.7 file. The subset needed for an
//! invoice is small: two standard Type1 fonts, filled rectangles, hairlines,
//! text runs and at most one image, so the file is written byte by byte
//! with no PDF library.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- Catalog
//! 2 0 obj ... endobj  <- Pages
//! 3 0 obj ... endobj  <- Helvetica, then Helvetica-Bold, logo, pages...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Compositor coordinates have their origin at the top-left; PDF user space
//! starts at the bottom-left, so every y is flipped against the page height.

use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;
use std::path::PathBuf;

use async_trait::async_trait;
use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::export::{DocumentWriter, PaginatedDocument, RenderedDocument};
use crate::font::StandardFont;
use crate::layout::compose::{DrawCommand, Page};
use crate::logo::{ImagePixelData, LoadedImage};
use crate::style::Color;

const PRODUCER: &str = "Folio";

/// Renders documents to PDF bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<Vec<u8>>,
}

impl PdfBuilder {
    fn new() -> Self {
        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages
        Self {
            objects: vec![Vec::new(), Vec::new(), Vec::new()],
        }
    }

    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(data);
        self.objects.len() - 1
    }

    fn push_stream(&mut self, dict_entries: &str, payload: &[u8]) -> usize {
        let mut data = Vec::with_capacity(payload.len() + 64);
        let _ = write!(data, "<< {} /Length {} >>\nstream\n", dict_entries, payload.len());
        data.extend_from_slice(payload);
        data.extend_from_slice(b"\nendstream");
        self.push(data)
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Serialize `document` to a complete PDF file.
    pub fn render_document(&self, document: &PaginatedDocument) -> Vec<u8> {
        let mut builder = PdfBuilder::new();

        let font_ids: Vec<usize> = StandardFont::ALL
            .iter()
            .map(|font| {
                builder.push(
                    format!(
                        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                        font.pdf_name()
                    )
                    .into_bytes(),
                )
            })
            .collect();
        let font_resources: String = StandardFont::ALL
            .iter()
            .zip(&font_ids)
            .map(|(font, id)| format!("/{} {} 0 R", font.resource_name(), id))
            .collect::<Vec<_>>()
            .join(" ");

        let logo_id = document
            .logo
            .as_ref()
            .map(|image| Self::write_image_xobject(&mut builder, image));

        let mut page_ids = Vec::with_capacity(document.pages.len());
        for page in &document.pages {
            let content = Self::build_content_stream(page, logo_id.is_some());
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);
            let content_id = builder.push_stream("/Filter /FlateDecode", &compressed);

            let mut resources = format!("/Font << {} >>", font_resources);
            if let (Some(id), Some(_)) = (logo_id, page.header.logo) {
                let _ = write!(resources, " /XObject << /Im0 {} 0 R >>", id);
            }

            let page_id = builder.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                     /Contents {} 0 R /Resources << {} >> >>",
                    page.width, page.height, content_id, resources
                )
                .into_bytes(),
            );
            page_ids.push(page_id);
        }

        builder.objects[1] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2] =
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, page_ids.len()).into_bytes();

        let mut info = String::from("<< ");
        if !document.title.is_empty() {
            let _ = write!(info, "/Title ({}) ", encode_text(&document.title));
        }
        if !document.author.is_empty() {
            let _ = write!(info, "/Author ({}) ", encode_text(&document.author));
        }
        let _ = write!(info, "/Producer ({}) /Creator ({}) >>", PRODUCER, PRODUCER);
        let info_id = builder.push(info.into_bytes());

        let bytes = Self::serialize(&builder, info_id);
        log::debug!(
            "wrote {} pages, {} objects, {} bytes",
            page_ids.len(),
            builder.objects.len() - 1,
            bytes.len()
        );
        bytes
    }

    /// Build the content stream operators for one page.
    fn build_content_stream(page: &Page, has_logo_image: bool) -> String {
        let mut stream = String::new();
        let page_height = page.height;

        for command in page.draw_commands() {
            match command {
                DrawCommand::Logo(placement) => {
                    if !has_logo_image {
                        continue;
                    }
                    let y = page_height - placement.y - placement.height;
                    let _ = write!(
                        stream,
                        "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im0 Do\nQ\n",
                        placement.width, placement.height, placement.x, y
                    );
                }
                DrawCommand::Fill(rect) => {
                    let y = page_height - rect.y - rect.height;
                    let _ = write!(
                        stream,
                        "q\n{} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                        color_operands(rect.fill),
                        rect.x,
                        y,
                        rect.width,
                        rect.height
                    );
                }
                DrawCommand::Stroke(rule) => {
                    let y = page_height - rule.y;
                    let _ = write!(
                        stream,
                        "q\n{} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                        color_operands(rule.color),
                        rule.width,
                        rule.x1,
                        y,
                        rule.x2,
                        y
                    );
                }
                DrawCommand::Text(label) => {
                    if label.text.is_empty() {
                        continue;
                    }
                    let _ = write!(
                        stream,
                        "BT\n/{} {:.1} Tf\n{} rg\n{:.2} {:.2} Td\n({}) Tj\nET\n",
                        label.style.font.resource_name(),
                        label.style.size,
                        color_operands(label.style.color),
                        label.x,
                        page_height - label.y,
                        encode_text(&label.text)
                    );
                }
            }
        }

        stream
    }

    /// Write the logo as one or two XObjects. Returns the image object id.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        let size = format!(
            "/Type /XObject /Subtype /Image /Width {} /Height {} /BitsPerComponent 8",
            image.width_px, image.height_px
        );

        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => builder.push_stream(
                &format!("{} /ColorSpace /{} /Filter /DCTDecode", size, color_space.pdf_name()),
                data,
            ),
            ImagePixelData::Decoded { rgb, alpha } => {
                let smask = alpha.as_ref().map(|alpha| {
                    let compressed = compress_to_vec_zlib(alpha, 6);
                    let id = builder.push_stream(
                        &format!("{} /ColorSpace /DeviceGray /Filter /FlateDecode", size),
                        &compressed,
                    );
                    format!(" /SMask {} 0 R", id)
                });

                let compressed = compress_to_vec_zlib(rgb, 6);
                builder.push_stream(
                    &format!(
                        "{} /ColorSpace /DeviceRGB /Filter /FlateDecode{}",
                        size,
                        smask.unwrap_or_default()
                    ),
                    &compressed,
                )
            }
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(builder: &PdfBuilder, info_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, data) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_id,
            xref_offset
        );

        output
    }
}

#[async_trait]
impl DocumentWriter for PdfWriter {
    type Output = RenderedDocument;
    type Error = std::convert::Infallible;

    async fn write(&self, document: PaginatedDocument) -> Result<RenderedDocument, Self::Error> {
        let bytes = self.render_document(&document);
        Ok(RenderedDocument {
            filename: document.filename,
            bytes,
        })
    }
}

/// Renders with [`PdfWriter`] and saves the file under a directory.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileWriter {
    dir: PathBuf,
    pdf: PdfWriter,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            pdf: PdfWriter::new(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait]
impl DocumentWriter for FileWriter {
    type Output = PathBuf;
    type Error = std::io::Error;

    async fn write(&self, document: PaginatedDocument) -> Result<PathBuf, std::io::Error> {
        let bytes = self.pdf.render_document(&document);
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&document.filename);
        tokio::fs::write(&path, &bytes).await?;
        log::info!("saved {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

fn color_operands(color: Color) -> String {
    format!("{:.3} {:.3} {:.3}", color.r, color.g, color.b)
}

/// Encode text as the body of a PDF literal string in WinAnsiEncoding.
/// Characters outside the encoding become `?`.
fn encode_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let byte = unicode_to_winansi(ch).unwrap_or(b'?');
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            0x20..=0x7E => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\{:03o}", byte);
            }
        }
    }
    out
}

/// Map a char to its Windows-1252 byte.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85), // Ellipsis
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95),
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x02DC => Some(0x98),
        0x2122 => Some(0x99),
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compose::Compositor;
    use crate::layout::geometry::PageGeometry;
    use crate::layout::page_break::paginate;
    use crate::model::{Adjustments, Invoice, LineItem};
    use crate::totals::Totals;

    fn document(rows: usize, logo: Option<LoadedImage>) -> PaginatedDocument {
        let items = (0..rows)
            .map(|i| LineItem::new(&format!("Service (part {})", i + 1), 2.0, 12.5))
            .collect();
        let mut invoice = Invoice::new(items, Adjustments::default());
        invoice.meta.invoice_number = "INV-7".to_string();
        invoice.seller.company_name = "Smith & Sons (Pty) Ltd".to_string();

        let geometry = PageGeometry::default();
        let groups = paginate(&invoice.items, &geometry).unwrap();
        let mut compositor = Compositor::new(geometry);
        if let Some(image) = &logo {
            compositor = compositor.with_logo(image.width_px, image.height_px);
        }
        let pages = compositor
            .compose(&invoice, &groups, &Totals::for_invoice(&invoice))
            .unwrap();

        PaginatedDocument {
            filename: "INV_7.pdf".to_string(),
            title: "Invoice INV-7".to_string(),
            author: invoice.seller.display_name().to_string(),
            pages,
            logo,
        }
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn produces_a_well_formed_file() {
        let bytes = PdfWriter::new().render_document(&document(3, None));
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        assert_eq!(count(&bytes, b"xref"), 2); // "xref" and "startxref"
        assert_eq!(count(&bytes, b"trailer"), 1);
    }

    #[test]
    fn startxref_points_at_the_xref_table() {
        let bytes = PdfWriter::new().render_document(&document(45, None));
        let text = String::from_utf8_lossy(&bytes);
        let tail = text.rsplit("startxref\n").next().unwrap();
        let offset: usize = tail.lines().next().unwrap().parse().unwrap();
        assert!(bytes[offset..].starts_with(b"xref\n"));
    }

    #[test]
    fn one_page_object_per_page() {
        let doc = document(60, None);
        let expected = doc.pages.len();
        assert_eq!(expected, 3);
        let bytes = PdfWriter::new().render_document(&doc);
        assert_eq!(count(&bytes, b"/Type /Page /Parent"), expected);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains(&format!("/Count {}", expected)));
    }

    #[test]
    fn both_fonts_and_metadata_are_written() {
        let bytes = PdfWriter::new().render_document(&document(1, None));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/BaseFont /Helvetica "));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
        assert!(text.contains("/Encoding /WinAnsiEncoding"));
        assert!(text.contains("/Title (Invoice INV-7)"));
        assert!(text.contains("/Author (Smith & Sons \\(Pty\\) Ltd)"));
        assert!(text.contains("/Producer (Folio)"));
    }

    #[test]
    fn content_stream_draws_labels_band_and_rules() {
        let doc = document(2, None);
        let content = PdfWriter::build_content_stream(&doc.pages[0], false);
        assert!(content.contains("(INVOICE) Tj"));
        assert!(content.contains("(Description) Tj"));
        assert!(content.contains("(Service \\(part 1\\)) Tj"));
        assert!(content.contains("(Balance Due) Tj"));
        assert!(content.contains("(Page 1 of 1) Tj"));
        assert!(content.contains("/F1 22.0 Tf"));
        assert!(content.contains(" re\nf\n"));
        assert!(content.contains(" l\nS\n"));
    }

    #[test]
    fn coordinates_are_flipped() {
        let doc = document(1, None);
        let page = &doc.pages[0];
        let folio = &page.folio;
        let content = PdfWriter::build_content_stream(page, false);
        let expected = format!("{:.2} {:.2} Td\n(Page 1 of 1) Tj", folio.x, page.height - folio.y);
        assert!(content.contains(&expected));
    }

    #[test]
    fn png_logo_becomes_image_with_soft_mask() {
        let logo = LoadedImage {
            pixel_data: ImagePixelData::Decoded {
                rgb: vec![255, 0, 0, 0, 255, 0],
                alpha: Some(vec![255, 0]),
            },
            width_px: 2,
            height_px: 1,
        };
        let doc = document(1, Some(logo));
        let bytes = PdfWriter::new().render_document(&doc);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Subtype /Image /Width 2 /Height 1"));
        assert!(text.contains("/SMask"));
        assert!(text.contains("/XObject << /Im0"));
        let content = PdfWriter::build_content_stream(&doc.pages[0], true);
        assert!(content.contains("/Im0 Do"));
    }

    #[test]
    fn logo_only_on_first_page() {
        let logo = LoadedImage {
            pixel_data: ImagePixelData::Decoded {
                rgb: vec![0, 0, 0],
                alpha: None,
            },
            width_px: 1,
            height_px: 1,
        };
        let doc = document(40, Some(logo));
        let bytes = PdfWriter::new().render_document(&doc);
        assert_eq!(count(&bytes, b"/XObject << /Im0"), 1);
        assert!(!PdfWriter::build_content_stream(&doc.pages[1], true).contains("/Im0"));
    }

    #[test]
    fn text_encoding() {
        assert_eq!(encode_text("Hello (World)"), "Hello \\(World\\)");
        assert_eq!(encode_text("back\\slash"), "back\\\\slash");
        assert_eq!(encode_text("\u{20AC}5"), "\\2005");
        assert_eq!(encode_text("a\u{2014}b"), "a\\227b");
        assert_eq!(encode_text("caf\u{e9}"), "caf\\351");
        assert_eq!(encode_text("\u{4E2D}"), "?");
    }

    #[test]
    fn output_is_deterministic() {
        let doc = document(30, None);
        let writer = PdfWriter::new();
        assert_eq!(writer.render_document(&doc), writer.render_document(&doc));
    }

    #[tokio::test]
    async fn pdf_writer_returns_named_bytes() {
        let rendered = PdfWriter::new().write(document(2, None)).await.unwrap();
        assert_eq!(rendered.filename, "INV_7.pdf");
        assert!(rendered.bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn file_writer_saves_into_directory() {
        let dir = std::env::temp_dir().join(format!("folio-pdf-test-{}", std::process::id()));
        let path = FileWriter::new(&dir).write(document(2, None)).await.unwrap();
        assert_eq!(path, dir.join("INV_7.pdf"));
        let bytes = tokio::fs::read(&path).await.unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
