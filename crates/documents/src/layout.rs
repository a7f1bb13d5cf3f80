//! Thin page-flow helper over `printpdf`.
//!
//! Keeps a vertical cursor (millimetres from the bottom edge, like PDF user
//! space) and starts a new A4 page when a block would not fit.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rect, Rgb,
};

use crate::DocumentError;

pub(crate) const PAGE_WIDTH: f32 = 210.0;
pub(crate) const PAGE_HEIGHT: f32 = 297.0;
pub(crate) const MARGIN: f32 = 15.0;
pub(crate) const CONTENT_RIGHT: f32 = PAGE_WIDTH - MARGIN;

const PT_TO_MM: f32 = 0.3528;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

pub(crate) fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

pub(crate) fn grey(level: f32) -> Color {
    Color::Rgb(Rgb::new(level, level, level, None))
}

pub(crate) fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

pub(crate) struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    cursor: f32,
    pages: usize,
    page_numbers: bool,
}

impl PageWriter {
    pub(crate) fn new(title: &str) -> Result<Self, DocumentError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| DocumentError::Pdf(format!("{e:?}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| DocumentError::Pdf(format!("{e:?}")))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            cursor: PAGE_HEIGHT - MARGIN,
            pages: 1,
            page_numbers: false,
        })
    }

    /// Print "Pagina N" at the foot of every page.
    pub(crate) fn with_page_numbers(mut self) -> Self {
        self.page_numbers = true;
        self
    }

    pub(crate) fn cursor(&self) -> f32 {
        self.cursor
    }

    pub(crate) fn pages(&self) -> usize {
        self.pages
    }

    /// Move the cursor down by `dy` millimetres.
    pub(crate) fn advance(&mut self, dy: f32) {
        self.cursor -= dy;
    }

    /// Start a new page unless `height` millimetres still fit. Returns
    /// whether a page was added.
    pub(crate) fn ensure_space(&mut self, height: f32) -> bool {
        if self.cursor - height >= MARGIN {
            return false;
        }
        self.draw_page_number();
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = PAGE_HEIGHT - MARGIN;
        self.pages += 1;
        true
    }

    pub(crate) fn text(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.set_fill_color(black());
        self.layer.use_text(text, size, Mm(x), Mm(self.cursor), font);
    }

    /// Right-aligned at `right`, using an average glyph width estimate.
    pub(crate) fn text_right(&self, text: &str, size: f32, right: f32, bold: bool) {
        let x = (right - text_width(text, size)).max(MARGIN);
        self.text(text, size, x, bold);
    }

    pub(crate) fn rule(&self, from: f32, to: f32) {
        self.layer.set_outline_color(grey(0.6));
        self.layer.set_outline_thickness(0.5);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(from), Mm(self.cursor)), false),
                (Point::new(Mm(to), Mm(self.cursor)), false),
            ],
            is_closed: false,
        });
    }

    /// Filled rectangle with its lower-left corner at (`x`, `y`).
    pub(crate) fn fill_rect(&self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.layer.set_fill_color(color);
        self.layer
            .add_rect(Rect::new(Mm(x), Mm(y), Mm(x + width), Mm(y + height)));
    }

    fn draw_page_number(&self) {
        if !self.page_numbers {
            return;
        }
        let label = format!("Pagina {}", self.pages);
        let x = (PAGE_WIDTH - text_width(&label, 8.0)) / 2.0;
        self.layer.set_fill_color(grey(0.4));
        self.layer
            .use_text(label, 8.0, Mm(x), Mm(MARGIN / 2.0), &self.regular);
    }

    pub(crate) fn finish(self) -> Result<Vec<u8>, DocumentError> {
        self.draw_page_number();
        self.doc
            .save_to_bytes()
            .map_err(|e| DocumentError::Pdf(format!("{e:?}")))
    }
}

pub(crate) fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_WIDTH * PT_TO_MM
}

/// Shorten `text` to roughly fit `width` millimetres.
pub(crate) fn truncate_to_width(text: &str, size: f32, width: f32) -> String {
    if text_width(text, size) <= width {
        return text.to_string();
    }
    let per_char = size * AVG_GLYPH_WIDTH * PT_TO_MM;
    let keep = ((width / per_char) as usize).saturating_sub(3);
    let mut short: String = text.chars().take(keep).collect();
    short.push_str("...");
    short
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_keeps_short_text_and_marks_long_text() {
        assert_eq!(truncate_to_width("Pala", 9.0, 40.0), "Pala");

        let long = "Juego de destornilladores de precision con estuche";
        let short = truncate_to_width(long, 9.0, 30.0);
        assert!(short.ends_with("..."));
        assert!(text_width(&short, 9.0) <= 30.0);
    }

    #[test]
    fn ensure_space_adds_pages_when_the_cursor_runs_out() {
        let mut writer = PageWriter::new("test").unwrap();
        assert!(!writer.ensure_space(50.0));

        writer.advance(PAGE_HEIGHT - 2.0 * MARGIN - 5.0);
        assert!(writer.ensure_space(10.0));
        assert_eq!(writer.pages(), 2);
        assert_eq!(writer.cursor(), PAGE_HEIGHT - MARGIN);
    }

    #[test]
    fn numbered_pages_still_save() {
        let mut writer = PageWriter::new("test").unwrap().with_page_numbers();
        writer.advance(PAGE_HEIGHT);
        assert!(writer.ensure_space(10.0));
        assert!(writer.finish().unwrap().starts_with(b"%PDF"));
    }
}
