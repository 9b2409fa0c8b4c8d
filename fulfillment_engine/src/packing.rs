use std::{fs, fs::File, io::BufWriter};

use chrono::Utc;
use log::*;
use printpdf::{BuiltinFont, Color, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Point, Rgb};
use qrcode::{Color as QrColor, QrCode};

use crate::{
    documents::DocumentStore,
    errors::RenderError,
    order_types::{Order, PackingSlip},
};

// 4" x 6" page, the usual thermal-printer media
const PAGE_WIDTH_MM: f64 = 101.6;
const PAGE_HEIGHT_MM: f64 = 152.4;
const MARGIN_MM: f64 = 8.0;
const LINE_HEIGHT_MM: f64 = 5.5;
const TITLE_SIZE: f64 = 16.0;
const BODY_SIZE: f64 = 10.0;
const QR_SIZE_MM: f64 = 28.0;

/// Renders one-page packing slips.
///
/// The slip content is a pure function of the order (see [`slip_lines`]).
/// No generation timestamp is embedded, so the same order renders the same
/// document on every run.
pub struct PackingSlipGenerator {
    store: DocumentStore,
}

impl PackingSlipGenerator {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    pub fn render(&self, order: &Order) -> Result<PackingSlip, RenderError> {
        let missing = order.address.missing_for_slip();
        if !missing.is_empty() {
            return Err(RenderError::MissingAddressFields { order_id: order.id.clone(), fields: missing });
        }
        let path = self.store.packing_slip_path(&order.id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let lines = slip_lines(order);
        let doc = build_pdf(order, &lines)?;
        doc.save(&mut BufWriter::new(File::create(&path)?)).map_err(|e| RenderError::Pdf(e.to_string()))?;
        info!("📄 Generated packing slip for order {} at {}", order.id, path.display());
        Ok(PackingSlip { order_id: order.id.clone(), document: path, generated_at: Utc::now() })
    }
}

/// The text content of the slip, top to bottom, excluding the title. Pure
/// and deterministic for a given order.
pub fn slip_lines(order: &Order) -> Vec<String> {
    let mut lines = vec![format!("Order ID: {}", order.id), String::new(), "Ship To:".to_string()];
    let address = &order.address;
    lines.push(address.name.clone());
    lines.push(address.street1.clone());
    if let Some(street2) = address.street2.as_ref().filter(|s| !s.trim().is_empty()) {
        lines.push(street2.clone());
    }
    let mut city_line = address.city.clone();
    if !address.region.trim().is_empty() {
        city_line = format!("{city_line}, {}", address.region);
    }
    if !address.postal_code.trim().is_empty() {
        city_line = format!("{city_line} {}", address.postal_code);
    }
    lines.push(city_line);
    // Domestic shipments leave the country line off
    if !address.country.trim().is_empty() && address.country.to_ascii_uppercase() != "US" {
        lines.push(address.country.clone());
    }
    lines.push(String::new());
    lines.push("Items:".to_string());
    for item in &order.items {
        lines.push(format!("- {} (Qty: {})", item.sku, item.quantity));
    }
    lines
}

fn build_pdf(order: &Order, lines: &[String]) -> Result<PdfDocumentReference, RenderError> {
    let (doc, page, layer) = PdfDocument::new("Packing Slip", Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "slip");
    let body_font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(|e| RenderError::Pdf(e.to_string()))?;
    let title_font = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(|e| RenderError::Pdf(e.to_string()))?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut y = PAGE_HEIGHT_MM - MARGIN_MM - 6.0;
    layer.use_text("PACKING SLIP", TITLE_SIZE, Mm(MARGIN_MM), Mm(y), &title_font);
    y -= 2.0 * LINE_HEIGHT_MM;
    for line in lines {
        if !line.is_empty() {
            layer.use_text(line.as_str(), BODY_SIZE, Mm(MARGIN_MM), Mm(y), &body_font);
        }
        y -= LINE_HEIGHT_MM;
    }

    draw_qr_code(&layer, order.id.as_str())?;
    layer.use_text(order.id.as_str(), BODY_SIZE, Mm(MARGIN_MM + QR_SIZE_MM + 4.0), Mm(MARGIN_MM + 2.0), &body_font);
    Ok(doc)
}

/// Draw a scannable code for the order id in the bottom-left corner, one
/// filled square per dark module.
fn draw_qr_code(layer: &PdfLayerReference, order_id: &str) -> Result<(), RenderError> {
    let code = QrCode::new(order_id.as_bytes()).map_err(|e| RenderError::Qr(e.to_string()))?;
    let width = code.width();
    let modules = code.to_colors();
    let module_size = QR_SIZE_MM / width as f64;
    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    for (index, module) in modules.iter().enumerate() {
        if *module != QrColor::Dark {
            continue;
        }
        let row = index / width;
        let col = index % width;
        let x = MARGIN_MM + col as f64 * module_size;
        // PDF y runs bottom-up; QR rows run top-down
        let y = MARGIN_MM + QR_SIZE_MM - (row as f64 + 1.0) * module_size;
        layer.add_shape(filled_square(x, y, module_size));
    }
    Ok(())
}

fn filled_square(x: f64, y: f64, size: f64) -> Line {
    let points = vec![
        (Point::new(Mm(x), Mm(y)), false),
        (Point::new(Mm(x + size), Mm(y)), false),
        (Point::new(Mm(x + size), Mm(y + size)), false),
        (Point::new(Mm(x), Mm(y + size)), false),
    ];
    Line { points, is_closed: true, has_fill: true, has_stroke: false, is_clipping_path: false }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::order_types::{Address, LineItem, OrderId, OrderStatus};

    fn springfield_order() -> Order {
        Order {
            id: OrderId::from("A-100"),
            status: OrderStatus::Paid,
            created_at: None,
            address: Address {
                name: "J. Doe".to_string(),
                street1: "1 Main St".to_string(),
                street2: None,
                city: "Springfield".to_string(),
                region: "IL".to_string(),
                postal_code: "62704".to_string(),
                country: "US".to_string(),
            },
            items: vec![LineItem { sku: "WIDGET".to_string(), quantity: 2 }],
        }
    }

    #[test]
    fn slip_lines_contain_the_order_id_and_items() {
        let lines = slip_lines(&springfield_order());
        assert!(lines.iter().any(|l| l.contains("A-100")));
        assert!(lines.contains(&"- WIDGET (Qty: 2)".to_string()));
        assert!(lines.contains(&"Springfield, IL 62704".to_string()));
        // domestic: no country line
        assert!(!lines.contains(&"US".to_string()));
    }

    #[test]
    fn slip_lines_are_deterministic() {
        let order = springfield_order();
        assert_eq!(slip_lines(&order), slip_lines(&order));
    }

    #[test]
    fn international_orders_show_the_country() {
        let mut order = springfield_order();
        order.address.country = "DE".to_string();
        let lines = slip_lines(&order);
        assert!(lines.contains(&"DE".to_string()));
    }

    #[test]
    fn street2_is_included_only_when_present() {
        let mut order = springfield_order();
        order.address.street2 = Some("Apt 4".to_string());
        assert!(slip_lines(&order).contains(&"Apt 4".to_string()));
        order.address.street2 = Some("   ".to_string());
        assert!(!slip_lines(&order).contains(&"   ".to_string()));
    }

    #[test]
    fn render_writes_a_pdf_keyed_by_order_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let generator = PackingSlipGenerator::new(store.clone());
        let slip = generator.render(&springfield_order()).unwrap();
        assert!(slip.document.ends_with("packing_slips/packing_slip_A-100.pdf"));
        let bytes = std::fs::read(&slip.document).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn render_fails_when_address_fields_are_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let generator = PackingSlipGenerator::new(store.clone());
        let mut order = springfield_order();
        order.address.street1 = String::new();
        match generator.render(&order) {
            Err(RenderError::MissingAddressFields { fields, .. }) => assert_eq!(fields, vec!["street1"]),
            other => panic!("expected MissingAddressFields, got {other:?}"),
        }
        assert!(!store.packing_slip_path(&order.id).exists());
    }
}
