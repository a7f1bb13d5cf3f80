//! Sales receipt.
//!
//! Layout, top to bottom: company header with order number and date,
//! customer block, delivery and payment block, itemized table, summary, a
//! legal note and a thank-you footer. An optional scannable code carries the
//! order id, total and timestamp; a code that cannot be built is skipped and
//! the receipt is still produced.

use chrono::{DateTime, SecondsFormat, Utc};
use qrcode::QrCode;
use rust_decimal::Decimal;

use ironmonger_core::SaleId;
use ironmonger_sales::{
    CheckoutRequest, CheckoutResult, CustomerInfo, Delivery, DeliveryMethod, Payment,
};

use crate::format::{format_currency, format_timestamp};
use crate::layout::{black, grey, truncate_to_width, PageWriter, CONTENT_RIGHT, MARGIN};
use crate::{DocumentError, GeneratedDocument};

pub const DEFAULT_COMPANY_NAME: &str = "Ferreteria";

pub const LEGAL_NOTE: &str = "Este comprobante no reemplaza una factura fiscal. \
Conserva este documento para cualquier cambio o garantia.";

const QR_SIZE_MM: f32 = 32.0;

/// Issuer details printed in the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyInfo {
    pub name: String,
    pub nit: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Everything printed on a receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptData {
    pub order_id: SaleId,
    pub issued_at: DateTime<Utc>,
    pub company: Option<CompanyInfo>,
    pub customer: CustomerInfo,
    pub delivery: Delivery,
    pub payment: Payment,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub include_code: bool,
}

impl ReceiptData {
    /// Receipt for a completed checkout: the sale id comes from the server
    /// response, lines and summary from the request that was submitted.
    pub fn from_checkout(
        result: &CheckoutResult,
        request: &CheckoutRequest,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id: result.sale_id,
            issued_at,
            company: None,
            customer: request.customer.clone(),
            delivery: request.delivery.clone(),
            payment: request.payment.clone(),
            lines: request
                .items
                .iter()
                .map(|item| ReceiptLine {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    line_total: item.line_total(),
                })
                .collect(),
            subtotal: request.summary.subtotal,
            tax: request.summary.tax,
            shipping: request.summary.shipping,
            total: request.summary.total,
            include_code: true,
        }
    }

    pub fn with_company(mut self, company: Option<CompanyInfo>) -> Self {
        self.company = company;
        self
    }

    pub fn file_name(&self) -> String {
        format!("recibo-{}.pdf", self.order_id)
    }

    /// JSON text encoded in the scannable code.
    pub fn code_payload(&self) -> String {
        serde_json::json!({
            "orderId": self.order_id,
            "total": self.total,
            "issuedAt": self.issued_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
        .to_string()
    }

    pub fn company_name(&self) -> &str {
        self.company
            .as_ref()
            .map(|c| c.name.trim())
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_COMPANY_NAME)
    }

    /// Contact lines under the company name; absent fields are skipped.
    pub fn company_lines(&self) -> Vec<String> {
        let Some(company) = &self.company else {
            return Vec::new();
        };
        [
            company.nit.as_deref().map(|v| format!("NIT: {v}")),
            company.address.clone(),
            company.phone.as_deref().map(|v| format!("Tel: {v}")),
            company.email.clone(),
        ]
        .into_iter()
        .flatten()
        .filter(|line| !line.trim().is_empty())
        .collect()
    }

    pub fn customer_lines(&self) -> Vec<String> {
        let c = &self.customer;
        let mut lines = vec![format!("Nombre: {}", c.name)];
        if let Some(phone) = non_blank(c.phone.as_deref()) {
            lines.push(format!("Telefono: {phone}"));
        }
        lines.push(format!("Email: {}", c.email));
        lines.push(format!("NIT: {}", c.nit_or_cf()));
        if let Some(address) = non_blank(c.address.as_deref()) {
            lines.push(format!("Direccion: {address}"));
        }
        lines
    }

    pub fn delivery_payment_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Entrega: {}", self.delivery.method.label())];
        if self.delivery.method == DeliveryMethod::HomeDelivery {
            if let Some(address) = non_blank(self.delivery.address.as_deref()) {
                lines.push(format!("Direccion de entrega: {address}"));
            }
        }
        lines.push(format!("Pago: {}", self.payment.method.label()));
        if let Some(reference) = non_blank(self.payment.reference.as_deref()) {
            lines.push(format!("Referencia: {reference}"));
        }
        lines
    }

    /// Summary rows above the total. Free shipping prints as "Gratis".
    pub fn summary_rows(&self) -> Vec<(&'static str, String)> {
        let shipping = if self.shipping.is_zero() {
            "Gratis".to_string()
        } else {
            format_currency(self.shipping)
        };
        vec![
            ("Subtotal", format_currency(self.subtotal)),
            ("Impuestos", format_currency(self.tax)),
            ("Envio", shipping),
        ]
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn generate_receipt(data: &ReceiptData) -> Result<GeneratedDocument, DocumentError> {
    if data.lines.is_empty() {
        return Err(DocumentError::InvalidData("receipt has no lines".to_string()));
    }

    let mut page = PageWriter::new(&format!("Comprobante {}", data.order_id))?;

    // Header
    page.text(data.company_name(), 18.0, MARGIN, true);
    page.text_right("COMPROBANTE DE COMPRA", 11.0, CONTENT_RIGHT, true);
    page.advance(6.0);
    let left = data.company_lines();
    let right = [
        format!("Pedido #{}", data.order_id),
        format!("Fecha: {}", format_timestamp(data.issued_at)),
    ];
    for row in 0..left.len().max(right.len()) {
        if let Some(line) = left.get(row) {
            page.text(&truncate_to_width(line, 9.0, 110.0), 9.0, MARGIN, false);
        }
        if let Some(line) = right.get(row) {
            page.text_right(line, 9.0, CONTENT_RIGHT, false);
        }
        page.advance(4.5);
    }
    page.advance(4.0);
    page.rule(MARGIN, CONTENT_RIGHT);
    page.advance(8.0);

    draw_section(&mut page, "Cliente", &data.customer_lines());
    draw_section(&mut page, "Entrega y pago", &data.delivery_payment_lines());
    page.advance(2.0);

    // Items
    draw_item_header(&mut page);
    for line in &data.lines {
        if page.ensure_space(6.0) {
            draw_item_header(&mut page);
        }
        page.text(&truncate_to_width(&line.name, 9.0, 100.0), 9.0, MARGIN, false);
        page.text_right(&line.quantity.to_string(), 9.0, 130.0, false);
        page.text_right(&format_currency(line.unit_price), 9.0, 162.0, false);
        page.text_right(&format_currency(line.line_total), 9.0, CONTENT_RIGHT, false);
        page.advance(5.5);
    }
    page.rule(MARGIN, CONTENT_RIGHT);
    page.advance(7.0);

    // Summary
    page.ensure_space(36.0);
    page.text("Resumen", 11.0, 120.0, true);
    page.advance(6.0);
    for (label, amount) in data.summary_rows() {
        page.text(label, 10.0, 120.0, false);
        page.text_right(&amount, 10.0, CONTENT_RIGHT, false);
        page.advance(5.5);
    }
    page.text("Total", 12.0, 120.0, true);
    page.text_right(&format_currency(data.total), 12.0, CONTENT_RIGHT, true);
    page.advance(10.0);

    if data.include_code {
        draw_code(&mut page, &data.code_payload());
    }

    page.advance(4.0);
    page.ensure_space(20.0);
    let (first, second) = LEGAL_NOTE.split_once(". ").unwrap_or((LEGAL_NOTE, ""));
    page.text(&format!("{first}."), 8.0, MARGIN, false);
    page.advance(4.0);
    page.text(second, 8.0, MARGIN, false);
    page.advance(8.0);
    page.text("Gracias por tu compra!", 10.0, MARGIN, true);
    page.advance(4.5);
    page.text(
        &format!("{} - {}", data.company_name(), format_timestamp(data.issued_at)),
        8.0,
        MARGIN,
        false,
    );

    let bytes = page.finish()?;
    tracing::info!(order_id = %data.order_id, lines = data.lines.len(), "receipt generated");

    Ok(GeneratedDocument {
        file_name: data.file_name(),
        bytes,
    })
}

fn draw_section(page: &mut PageWriter, title: &str, lines: &[String]) {
    page.ensure_space(6.0 + lines.len() as f32 * 4.5);
    page.text(title, 11.0, MARGIN, true);
    page.advance(5.5);
    for line in lines {
        page.text(&truncate_to_width(line, 9.0, CONTENT_RIGHT - MARGIN), 9.0, MARGIN, false);
        page.advance(4.5);
    }
    page.advance(4.0);
}

fn draw_item_header(page: &mut PageWriter) {
    page.ensure_space(10.0);
    page.fill_rect(MARGIN, page.cursor() - 2.0, CONTENT_RIGHT - MARGIN, 6.5, grey(0.9));
    page.text("Producto", 9.0, MARGIN, true);
    page.text_right("Cant.", 9.0, 130.0, true);
    page.text_right("Precio", 9.0, 162.0, true);
    page.text_right("Total", 9.0, CONTENT_RIGHT, true);
    page.advance(7.0);
}

/// Draw the code as filled squares, one per dark module.
fn draw_code(page: &mut PageWriter, payload: &str) {
    let code = match QrCode::new(payload.as_bytes()) {
        Ok(code) => code,
        Err(err) => {
            tracing::warn!(error = ?err, "could not build receipt code; skipping it");
            return;
        }
    };

    page.ensure_space(QR_SIZE_MM + 2.0);
    let width = code.width();
    let module = QR_SIZE_MM / width as f32;
    let left = CONTENT_RIGHT - QR_SIZE_MM;
    let top = page.cursor();

    for (idx, color) in code.to_colors().into_iter().enumerate() {
        if color != qrcode::Color::Dark {
            continue;
        }
        let (row, col) = (idx / width, idx % width);
        let x = left + col as f32 * module;
        let y = top - (row + 1) as f32 * module;
        page.fill_rect(x, y, module, module, black());
    }
    page.text("Escanee para verificar", 8.0, MARGIN, false);
    page.advance(QR_SIZE_MM);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ironmonger_core::ProductId;
    use ironmonger_sales::{CartItem, CartStatus, LocalCart, PaymentMethod, PricingPolicy};
    use rust_decimal_macros::dec;

    fn result() -> CheckoutResult {
        CheckoutResult {
            sale_id: SaleId::new(1042),
            status: CartStatus::Paid,
            total: dec!(52.40),
        }
    }

    fn request(delivery: DeliveryMethod, payment: Payment, shipping: Decimal) -> CheckoutRequest {
        let cart = LocalCart::from_items([CartItem::new(
            ProductId::new(1),
            "Martillo de una 16oz",
            dec!(10),
            2,
        )]);
        let mut customer = CustomerInfo::new("Ana Lopez", "ana@correo.gt");
        customer.phone = Some("5555-1234".into());
        customer.address = Some("4a calle 1-20, zona 1".into());
        CheckoutRequest::build(
            &cart,
            &PricingPolicy::new(dec!(0.12), shipping),
            customer,
            delivery,
            payment,
        )
        .unwrap()
    }

    fn pickup() -> CheckoutRequest {
        request(DeliveryMethod::Pickup, PaymentMethod::Card.into(), dec!(30))
    }

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 2, 14, 30, 0).unwrap()
    }

    #[test]
    fn lines_and_summary_come_from_the_request() {
        let data = ReceiptData::from_checkout(&result(), &pickup(), issued_at());

        assert_eq!(data.order_id, SaleId::new(1042));
        assert_eq!(
            data.lines,
            vec![ReceiptLine {
                name: "Martillo de una 16oz".into(),
                quantity: 2,
                unit_price: dec!(10),
                line_total: dec!(20),
            }]
        );
        assert_eq!(data.shipping, dec!(30));
        assert_eq!(data.total, dec!(52.40));
        assert_eq!(data.file_name(), "recibo-1042.pdf");
    }

    #[test]
    fn code_payload_is_json() {
        let data = ReceiptData::from_checkout(&result(), &pickup(), issued_at());
        let payload: serde_json::Value = serde_json::from_str(&data.code_payload()).unwrap();

        assert_eq!(payload["orderId"], 1042);
        assert_eq!(payload["total"], 52.4);
        assert_eq!(payload["issuedAt"], "2026-05-02T14:30:00.000Z");
    }

    #[test]
    fn summary_prints_shipping_and_free_shipping() {
        let data = ReceiptData::from_checkout(&result(), &pickup(), issued_at());
        assert_eq!(
            data.summary_rows(),
            vec![
                ("Subtotal", "Q20.00".to_string()),
                ("Impuestos", "Q2.40".to_string()),
                ("Envio", "Q30.00".to_string()),
            ]
        );

        let free = request(DeliveryMethod::Pickup, PaymentMethod::Cash.into(), dec!(0));
        let data = ReceiptData::from_checkout(&result(), &free, issued_at());
        assert_eq!(data.summary_rows()[2], ("Envio", "Gratis".to_string()));
    }

    #[test]
    fn delivery_address_and_payment_reference_are_printed() {
        let req = request(
            DeliveryMethod::HomeDelivery,
            Payment::with_reference(PaymentMethod::Transfer, "TRX-9"),
            dec!(30),
        );
        let data = ReceiptData::from_checkout(&result(), &req, issued_at());

        assert_eq!(
            data.delivery_payment_lines(),
            vec![
                "Entrega: Domicilio",
                "Direccion de entrega: 4a calle 1-20, zona 1",
                "Pago: Transferencia",
                "Referencia: TRX-9",
            ]
        );
    }

    #[test]
    fn pickup_omits_the_delivery_address() {
        let data = ReceiptData::from_checkout(&result(), &pickup(), issued_at());
        assert_eq!(
            data.delivery_payment_lines(),
            vec!["Entrega: Retiro en tienda", "Pago: Tarjeta"]
        );
        assert_eq!(
            data.customer_lines(),
            vec![
                "Nombre: Ana Lopez",
                "Telefono: 5555-1234",
                "Email: ana@correo.gt",
                "NIT: CF",
                "Direccion: 4a calle 1-20, zona 1",
            ]
        );
    }

    #[test]
    fn company_header_defaults_and_skips_missing_fields() {
        let data = ReceiptData::from_checkout(&result(), &pickup(), issued_at());
        assert_eq!(data.company_name(), DEFAULT_COMPANY_NAME);
        assert!(data.company_lines().is_empty());

        let data = data.with_company(Some(CompanyInfo {
            name: "Ferreteria El Tornillo".into(),
            nit: Some("1234567-8".into()),
            phone: Some("2222-0000".into()),
            ..CompanyInfo::default()
        }));
        assert_eq!(data.company_name(), "Ferreteria El Tornillo");
        assert_eq!(data.company_lines(), vec!["NIT: 1234567-8", "Tel: 2222-0000"]);
    }

    #[test]
    fn generates_a_pdf() {
        let data = ReceiptData::from_checkout(&result(), &pickup(), issued_at())
            .with_company(Some(CompanyInfo {
                name: "Ferreteria El Tornillo".into(),
                email: Some("ventas@tornillo.gt".into()),
                ..CompanyInfo::default()
            }));
        let doc = generate_receipt(&data).unwrap();

        assert_eq!(doc.file_name, "recibo-1042.pdf");
        assert!(doc.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_receipts_spill_onto_more_pages() {
        let mut data = ReceiptData::from_checkout(&result(), &pickup(), issued_at());
        data.include_code = false;
        data.lines = (0..120)
            .map(|i| ReceiptLine {
                name: format!("Articulo {i}"),
                quantity: 1,
                unit_price: dec!(1),
                line_total: dec!(1),
            })
            .collect();

        let doc = generate_receipt(&data).unwrap();
        assert!(doc.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn receipt_without_lines_is_invalid() {
        let mut data = ReceiptData::from_checkout(&result(), &pickup(), issued_at());
        data.lines.clear();
        assert!(matches!(generate_receipt(&data), Err(DocumentError::InvalidData(_))));
    }
}
