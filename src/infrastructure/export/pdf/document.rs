//! Page layout
//!
//! Positions are in millimetres from the top-left corner of an A4 portrait
//! page and converted to PDF points when a drawing operation is recorded.
//! Text flows down the page and breaks onto a new page at the bottom margin.

use super::font::{self, UNDERLINE_POSITION, UNDERLINE_THICKNESS};
use super::writer;

/// Points per millimetre
pub const SCALE: f64 = 72.0 / 25.4;

/// A4 portrait width in millimetres
pub const PAGE_WIDTH: f64 = 210.0;

/// A4 portrait height in millimetres
pub const PAGE_HEIGHT: f64 = 297.0;

/// Left, top, right and bottom margin in millimetres
pub const PAGE_MARGIN: f64 = 10.0;

/// Horizontal padding inside a text cell
const CELL_MARGIN: f64 = PAGE_MARGIN / 10.0;

/// Body font size in points
pub const FONT_SIZE: f64 = 12.0;

/// RGB fill colour, components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub f64, pub f64, pub f64);

impl Color {
    pub const BLACK: Color = Color(0.0, 0.0, 0.0);
    pub const BLUE: Color = Color(0.0, 0.0, 1.0);
}

/// A baseline JPEG ready to embed
#[derive(Debug, Clone)]
pub struct PdfImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// A URI link annotation, rectangle in points
#[derive(Debug, Clone)]
pub(super) struct LinkAnnotation {
    pub rect: [f32; 4],
    pub uri: String,
}

/// One drawing operation, coordinates in points from the bottom-left
#[derive(Debug, Clone, PartialEq)]
pub(super) enum PageOp {
    /// WinAnsi encoded text starting at a baseline
    Text {
        x: f32,
        y: f32,
        text: Vec<u8>,
        color: Color,
    },
    /// Filled rectangle, used for underlines
    Fill {
        rect: [f32; 4],
        color: Color,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
    },
    /// Image XObject `index` (zero-based) scaled into a box
    Image {
        index: usize,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
}

#[derive(Debug, Clone, Default)]
pub(super) struct Page {
    pub ops: Vec<PageOp>,
    pub images: Vec<usize>,
    pub links: Vec<LinkAnnotation>,
}

/// An in-progress document
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pages: Vec<Page>,
    images: Vec<PdfImage>,
    x: f64,
    y: f64,
    text_color: Color,
    underline: bool,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    /// A document with its first page already open
    pub fn new() -> Self {
        let mut document = Self {
            pages: Vec::new(),
            images: Vec::new(),
            x: PAGE_MARGIN,
            y: PAGE_MARGIN,
            text_color: Color::BLACK,
            underline: false,
        };
        document.add_page();
        document
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
    }

    pub fn set_underline(&mut self, underline: bool) {
        self.underline = underline;
    }

    /// Start a new page and move to its top-left margin
    pub fn add_page(&mut self) {
        self.pages.push(Page::default());
        self.x = PAGE_MARGIN;
        self.y = PAGE_MARGIN;
    }

    /// Line break: back to the left margin, down by `h`
    pub fn ln(&mut self, h: f64) {
        self.x = PAGE_MARGIN;
        self.y += h;
    }

    /// Text wrapped across the remaining line width, `h` per line
    pub fn multi_cell(&mut self, h: f64, text: &str) {
        let width = PAGE_WIDTH - PAGE_MARGIN - self.x;
        let lines = wrap(&font::encode(text), width - 2.0 * CELL_MARGIN);

        for line in lines {
            self.break_if_needed(h);
            let x = self.x + CELL_MARGIN;
            self.text_line(x, h, &line);
            self.y += h;
        }

        self.x = PAGE_MARGIN;
    }

    /// Underlined link text flowing from the current position
    ///
    /// Every wrapped line carries a URI annotation. The position is left at
    /// the end of the last line, as with inline text.
    pub fn write_link(&mut self, h: f64, text: &str, uri: &str) {
        let encoded = font::encode(text);
        let first_width = PAGE_WIDTH - PAGE_MARGIN - self.x;
        let full_width = PAGE_WIDTH - 2.0 * PAGE_MARGIN;
        let lines = wrap_flowing(&encoded, first_width - CELL_MARGIN, full_width - CELL_MARGIN);
        let count = lines.len();

        for (index, line) in lines.into_iter().enumerate() {
            self.break_if_needed(h);
            let width = string_width(&line);
            self.text_line(self.x, h, &line);
            self.link(self.x, self.y, width, h, uri);

            if index + 1 < count {
                self.ln(h);
            } else {
                self.x += width;
            }
        }
    }

    /// Straight line between two points
    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.push(PageOp::Line {
            from: point(x1, y1),
            to: point(x2, y2),
        });
    }

    /// Place an image at the current position inside a `max_w` by `max_h` box
    ///
    /// The image keeps its aspect ratio. When the box does not fit on the
    /// current page a new page is started first. The position is not moved;
    /// returns the placed size.
    pub fn image(&mut self, image: PdfImage, max_w: f64, max_h: f64) -> (f64, f64) {
        let (w, h) = fit_box(image.width, image.height, max_w, max_h);

        if self.y + max_h > PAGE_HEIGHT - PAGE_MARGIN {
            self.add_page();
        }

        let index = self.images.len();
        self.images.push(image);
        let (x, y) = point(self.x, self.y + h);

        let page = self.current_page();
        page.images.push(index);
        page.ops.push(PageOp::Image {
            index,
            x,
            y,
            w: pt(w),
            h: pt(h),
        });

        (w, h)
    }

    /// Serialize the document
    pub fn finish(self) -> Vec<u8> {
        writer::write_document(&self.pages, &self.images)
    }

    fn break_if_needed(&mut self, h: f64) {
        if self.y + h > PAGE_HEIGHT - PAGE_MARGIN {
            let x = self.x;
            self.add_page();
            self.x = x;
        }
    }

    fn text_line(&mut self, x: f64, h: f64, text: &[u8]) {
        if text.is_empty() {
            return;
        }

        let font_size_mm = FONT_SIZE / SCALE;
        let baseline = self.y + 0.5 * h + 0.3 * font_size_mm;
        let color = self.text_color;
        let (left, bottom) = point(x, baseline);

        self.push(PageOp::Text {
            x: left,
            y: bottom,
            text: text.to_vec(),
            color,
        });

        if self.underline {
            let offset = -UNDERLINE_POSITION / 1000.0 * font_size_mm;
            let thickness = UNDERLINE_THICKNESS / 1000.0 * font_size_mm;
            let (left, top) = point(x, baseline + offset);
            self.push(PageOp::Fill {
                rect: [left, top, pt(string_width(text)), pt(-thickness)],
                color,
            });
        }
    }

    fn link(&mut self, x: f64, y: f64, w: f64, h: f64, uri: &str) {
        let (left, top) = point(x, y);
        let (right, bottom) = point(x + w, y + h);
        let rect = [left, top, right, bottom];
        self.current_page().links.push(LinkAnnotation {
            rect,
            uri: uri.to_string(),
        });
    }

    fn current_page(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn push(&mut self, op: PageOp) {
        self.current_page().ops.push(op);
    }
}

/// Millimetres to points
fn pt(mm: f64) -> f32 {
    (mm * SCALE) as f32
}

/// Top-left millimetre position to bottom-left points
fn point(x: f64, y: f64) -> (f32, f32) {
    (pt(x), pt(PAGE_HEIGHT - y))
}

/// Width of encoded text in millimetres at the body font size
pub fn string_width(text: &[u8]) -> f64 {
    f64::from(font::text_width(text)) * FONT_SIZE / 1000.0 / SCALE
}

/// Size of an image scaled to `max_w` wide, shrunk further to fit `max_h`
pub fn fit_box(px_w: u32, px_h: u32, max_w: f64, max_h: f64) -> (f64, f64) {
    if px_w == 0 || px_h == 0 {
        return (max_w, 0.0);
    }

    let ratio = f64::from(px_h) / f64::from(px_w);
    let height = max_w * ratio;

    if height <= max_h {
        (max_w, height)
    } else {
        (max_h / ratio, max_h)
    }
}

/// Greedy word wrap; words wider than a line are split between characters
pub fn wrap(text: &[u8], max_width: f64) -> Vec<Vec<u8>> {
    wrap_flowing(text, max_width, max_width)
}

/// Word wrap where the first line may be narrower than the rest
fn wrap_flowing(text: &[u8], first_width: f64, rest_width: f64) -> Vec<Vec<u8>> {
    let mut lines: Vec<Vec<u8>> = Vec::new();
    let mut line: Vec<u8> = Vec::new();
    let limit = |lines: &Vec<Vec<u8>>| {
        if lines.is_empty() {
            first_width
        } else {
            rest_width
        }
    };

    for word in text.split(|&b| b == b' ') {
        let mut candidate = line.clone();
        if !candidate.is_empty() {
            candidate.push(b' ');
        }
        candidate.extend_from_slice(word);

        if string_width(&candidate) <= limit(&lines) {
            line = candidate;
            continue;
        }

        if !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }

        if string_width(word) <= limit(&lines) {
            line.extend_from_slice(word);
            continue;
        }

        for &byte in word {
            line.push(byte);
            if line.len() > 1 && string_width(&line) > limit(&lines) {
                line.pop();
                lines.push(std::mem::take(&mut line));
                line.push(byte);
            }
        }
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }

    lines
}
