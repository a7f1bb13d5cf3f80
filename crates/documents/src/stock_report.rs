//! Stock report.
//!
//! Rows are printed as given; `StockFilters` are only shown as chips above
//! the table so the reader knows what the list was narrowed by. Every page
//! carries its number in the footer.

use chrono::{DateTime, Utc};

use ironmonger_inventory::{StockFilters, StockLevel, StockRow, StockTotals};

use crate::format::format_timestamp;
use crate::layout::{grey, rgb, text_width, truncate_to_width, PageWriter, CONTENT_RIGHT, MARGIN};
use crate::{DocumentError, GeneratedDocument};

pub const DEFAULT_TITLE: &str = "Inventario de Stock";

const BADGE: &str = "Reporte de Stock";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockReport {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub filters: StockFilters,
    pub rows: Vec<StockRow>,
    /// Overrides the timestamp-based file name.
    pub file_name: Option<String>,
}

impl StockReport {
    pub fn new(rows: Vec<StockRow>, filters: StockFilters, generated_at: DateTime<Utc>) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            generated_at,
            filters,
            rows,
            file_name: None,
        }
    }

    pub fn file_name(&self) -> String {
        match self.file_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) if name.to_ascii_lowercase().ends_with(".pdf") => name.to_string(),
            Some(name) => format!("{name}.pdf"),
            None => format!(
                "reporte_stock_{}.pdf",
                self.generated_at.format("%Y-%m-%d_%H-%M")
            ),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        if !title.trim().is_empty() {
            self.title = title;
        }
        self
    }

    pub fn totals(&self) -> StockTotals {
        StockTotals::of(&self.rows)
    }

    /// Lines printed after the table.
    pub fn summary_lines(&self) -> [String; 2] {
        let totals = self.totals();
        [
            format!("{} productos", totals.rows),
            format!("Total unidades: {}", totals.units),
        ]
    }
}

const COL_ID: f32 = MARGIN;
const COL_NAME: f32 = 35.0;
const COL_LEVEL: f32 = 130.0;
const COL_STOCK_RIGHT: f32 = CONTENT_RIGHT;

pub fn generate_stock_report(report: &StockReport) -> Result<GeneratedDocument, DocumentError> {
    let mut page = PageWriter::new(&report.title)?.with_page_numbers();

    let badge_width = text_width(BADGE, 10.0) + 6.0;
    page.fill_rect(
        CONTENT_RIGHT - badge_width,
        page.cursor() - 1.8,
        badge_width,
        6.0,
        rgb(0.96, 0.97, 1.0),
    );
    page.text_right(BADGE, 10.0, CONTENT_RIGHT - 3.0, true);
    page.text(&report.title, 16.0, MARGIN, true);
    page.advance(6.0);
    page.text(
        &format!("Generado: {}", format_timestamp(report.generated_at)),
        9.0,
        MARGIN,
        false,
    );
    page.advance(8.0);

    draw_chips(&mut page, &report.filters);

    draw_header(&mut page);
    for row in &report.rows {
        if page.ensure_space(6.0) {
            draw_header(&mut page);
        }
        let level = row.level();
        page.text(&row.product_id.to_string(), 8.5, COL_ID, false);
        page.text(&truncate_to_width(&row.name, 8.5, 90.0), 8.5, COL_NAME, false);
        page.fill_rect(COL_LEVEL, page.cursor() - 1.0, 2.5, 2.5, level_color(level));
        page.text(level.label(), 8.5, COL_LEVEL + 4.0, false);
        page.text_right(&row.stock.to_string(), 8.5, COL_STOCK_RIGHT, false);
        page.advance(5.5);
    }
    page.rule(MARGIN, CONTENT_RIGHT);
    page.advance(7.0);

    page.ensure_space(14.0);
    let [count, units] = report.summary_lines();
    page.text(&count, 10.0, MARGIN, true);
    page.text_right(&units, 10.0, CONTENT_RIGHT, true);

    let bytes = page.finish()?;
    let totals = report.totals();
    tracing::info!(rows = totals.rows, units = totals.units, "stock report generated");

    Ok(GeneratedDocument {
        file_name: report.file_name(),
        bytes,
    })
}

/// Active filters as rounded-looking tags, wrapping onto new lines.
fn draw_chips(page: &mut PageWriter, filters: &StockFilters) {
    let chips = filters.chips();
    if chips.is_empty() {
        return;
    }

    page.text("Filtros:", 9.0, MARGIN, true);
    page.advance(6.0);

    let mut x = MARGIN;
    for chip in chips {
        let width = text_width(&chip, 8.5) + 6.0;
        if x + width > CONTENT_RIGHT {
            x = MARGIN;
            page.advance(7.0);
        }
        page.fill_rect(x, page.cursor() - 1.8, width, 5.5, rgb(0.86, 0.91, 0.98));
        page.text(&chip, 8.5, x + 3.0, false);
        x += width + 3.0;
    }
    page.advance(9.0);
}

fn draw_header(page: &mut PageWriter) {
    page.ensure_space(10.0);
    page.fill_rect(MARGIN, page.cursor() - 2.0, CONTENT_RIGHT - MARGIN, 6.5, grey(0.9));
    page.text("ID", 8.5, COL_ID, true);
    page.text("Producto", 8.5, COL_NAME, true);
    page.text("Estado", 8.5, COL_LEVEL, true);
    page.text_right("Cantidad", 8.5, COL_STOCK_RIGHT, true);
    page.advance(7.0);
}

fn level_color(level: StockLevel) -> printpdf::Color {
    match level {
        StockLevel::NoStock => rgb(0.85, 0.2, 0.2),
        StockLevel::Low => rgb(0.95, 0.6, 0.1),
        StockLevel::Medium => rgb(0.95, 0.85, 0.2),
        StockLevel::High => rgb(0.2, 0.7, 0.3),
    }
}
