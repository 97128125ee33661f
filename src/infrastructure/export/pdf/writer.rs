//! PDF serialization
//!
//! Object layout: catalog, page tree, the Helvetica font, image XObjects,
//! then for every page its page object, content stream and link
//! annotations. Cross-reference table and trailer come from `pdf-writer`.

use pdf_writer::types::{ActionType, AnnotationType};
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str};

use super::document::{Page, PageOp, PdfImage, FONT_SIZE, PAGE_HEIGHT, PAGE_WIDTH, SCALE};
use super::font::BASE_FONT;

const FONT_NAME: Name<'static> = Name(b"F1");

/// Resource name of image `index` (zero-based)
fn image_name(index: usize) -> String {
    format!("I{}", index + 1)
}

fn dimension(pixels: u32) -> i32 {
    i32::try_from(pixels).unwrap_or(i32::MAX)
}

/// Serialize pages and images into a complete PDF file
pub(super) fn write_document(pages: &[Page], images: &[PdfImage]) -> Vec<u8> {
    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let page_tree_id = alloc.bump();
    let font_id = alloc.bump();
    let image_ids: Vec<Ref> = images.iter().map(|_| alloc.bump()).collect();
    let page_ids: Vec<Ref> = pages.iter().map(|_| alloc.bump()).collect();

    let mut pdf = Pdf::new();
    pdf.set_version(1, 4);

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);
    pdf.type1_font(font_id)
        .base_font(Name(BASE_FONT.as_bytes()))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    for (image, &id) in images.iter().zip(&image_ids) {
        let mut xobject = pdf.image_xobject(id, &image.data);
        xobject.filter(Filter::DctDecode);
        xobject.width(dimension(image.width));
        xobject.height(dimension(image.height));
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);
    }

    let media_box = Rect::new(
        0.0,
        0.0,
        (PAGE_WIDTH * SCALE) as f32,
        (PAGE_HEIGHT * SCALE) as f32,
    );

    for (page, &page_id) in pages.iter().zip(&page_ids) {
        let content_id = alloc.bump();
        let annot_ids: Vec<Ref> = page.links.iter().map(|_| alloc.bump()).collect();

        let mut page_writer = pdf.page(page_id);
        page_writer
            .media_box(media_box)
            .parent(page_tree_id)
            .contents(content_id);
        if !annot_ids.is_empty() {
            page_writer.annotations(annot_ids.iter().copied());
        }

        let mut resources = page_writer.resources();
        resources.fonts().pair(FONT_NAME, font_id);
        if !page.images.is_empty() {
            let mut xobjects = resources.x_objects();
            for &index in &page.images {
                let name = image_name(index);
                xobjects.pair(Name(name.as_bytes()), image_ids[index]);
            }
        }
        resources.finish();
        page_writer.finish();

        pdf.stream(content_id, &page_content(page));

        for (link, &id) in page.links.iter().zip(&annot_ids) {
            let [x1, y1, x2, y2] = link.rect;
            let mut annotation = pdf.annotation(id);
            annotation
                .subtype(AnnotationType::Link)
                .rect(Rect::new(x1, y1, x2, y2))
                .border(0.0, 0.0, 0.0, None);
            annotation
                .action()
                .action_type(ActionType::Uri)
                .uri(Str(link.uri.as_bytes()));
        }
    }

    pdf.finish()
}

fn page_content(page: &Page) -> Vec<u8> {
    let mut content = Content::new();

    for op in &page.ops {
        match op {
            PageOp::Text { x, y, text, color } => {
                content.save_state();
                content.set_fill_rgb(color.0 as f32, color.1 as f32, color.2 as f32);
                content.begin_text();
                content.set_font(FONT_NAME, FONT_SIZE as f32);
                content.next_line(*x, *y);
                content.show(Str(text));
                content.end_text();
                content.restore_state();
            }
            PageOp::Fill { rect, color } => {
                content.save_state();
                content.set_fill_rgb(color.0 as f32, color.1 as f32, color.2 as f32);
                content.rect(rect[0], rect[1], rect[2], rect[3]);
                content.fill_nonzero();
                content.restore_state();
            }
            PageOp::Line { from, to } => {
                content.move_to(from.0, from.1);
                content.line_to(to.0, to.1);
                content.stroke();
            }
            PageOp::Image { index, x, y, w, h } => {
                let name = image_name(*index);
                content.save_state();
                content.transform([*w, 0.0, 0.0, *h, *x, *y]);
                content.x_object(Name(name.as_bytes()));
                content.restore_state();
            }
        }
    }

    content.finish().to_vec()
}

#[cfg(test)]
mod tests {
    use super::super::document::PdfDocument;
    use super::PdfImage;

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn test_empty_document_is_one_blank_page() {
        let text = as_text(&PdfDocument::new().finish());

        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.contains("/Count 1"));
        assert!(text.contains("/BaseFont /Helvetica"));
        assert!(text.contains("/Encoding /WinAnsiEncoding"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn test_pages_are_listed_in_page_tree() {
        let mut document = PdfDocument::new();
        document.add_page();
        document.add_page();
        let text = as_text(&document.finish());

        assert!(text.contains("/Count 3"));
        assert_eq!(text.matches("/Type /Page\n").count(), 3);
    }

    #[test]
    fn test_text_and_link_are_written() {
        let mut document = PdfDocument::new();
        document.multi_cell(8.0, "Note: draft");
        document.write_link(6.0, "https://example.com/a.png", "https://example.com/a.png");
        let text = as_text(&document.finish());

        assert!(text.contains("(Note: draft) Tj"));
        assert!(text.contains("/F1 12 Tf"));
        assert!(text.contains("/Subtype /Link"));
        assert!(text.contains("/URI (https://example.com/a.png)"));
    }

    #[test]
    fn test_image_xobject_is_written() {
        let mut document = PdfDocument::new();
        document.image(
            PdfImage {
                width: 4,
                height: 2,
                data: vec![0xff, 0xd8, 0xff, 0xd9],
            },
            50.0,
            35.0,
        );
        let text = as_text(&document.finish());

        assert!(text.contains("/Filter /DCTDecode"));
        assert!(text.contains("/Width 4"));
        assert!(text.contains("/Height 2"));
        assert!(text.contains("/I1 4 0 R"));
        assert!(text.contains("/I1 Do"));
    }
}
