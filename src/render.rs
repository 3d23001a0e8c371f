//! Plain-text rendering of a catalog screen: table, pager and notification.

use catalog::pager::{visible_pages, PageSlot};
use catalog::{CatalogView, FormState, Notification, NotificationKind, Record};
use common::{
    BrandDto, CashMovementDto, CategoryDto, OnlineOrderDto, PriceDto, ProductDto, PurchaseDto,
    SaleDto, SubcategoryDto,
};
use rust_decimal::Decimal;

const EMPTY_MESSAGE: &str = "No se encontraron registros.";

/// A DTO that can be shown as one table row.
pub trait TableRow {
    fn headers() -> &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn number<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn money(value: &Option<Decimal>) -> String {
    value
        .map(|amount| format!("${:.2}", amount))
        .unwrap_or_default()
}

impl TableRow for CategoryDto {
    fn headers() -> &'static [&'static str] {
        &["ID", "Nombre", "Descripción"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), text(&self.description)]
    }
}

impl TableRow for SubcategoryDto {
    fn headers() -> &'static [&'static str] {
        &["ID", "Nombre", "Categoría"]
    }

    fn cells(&self) -> Vec<String> {
        let category = self
            .category_name
            .clone()
            .or_else(|| self.category_id.map(|id| format!("#{}", id)))
            .unwrap_or_default();
        vec![self.id.to_string(), self.name.clone(), category]
    }
}

impl TableRow for BrandDto {
    fn headers() -> &'static [&'static str] {
        &["ID", "Nombre", "Descripción"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), text(&self.description)]
    }
}

impl TableRow for ProductDto {
    fn headers() -> &'static [&'static str] {
        &["ID", "SKU", "Nombre", "Precio", "Stock", "Imagen", "Ficha"]
    }

    fn cells(&self) -> Vec<String> {
        let flag = |value: &Option<String>| (if value.is_some() { "sí" } else { "no" }).to_string();
        vec![
            self.id.to_string(),
            text(&self.sku),
            self.name.clone(),
            money(&self.price),
            number(&self.stock),
            flag(&self.image_url),
            flag(&self.datasheet_url),
        ]
    }
}

impl TableRow for PurchaseDto {
    fn headers() -> &'static [&'static str] {
        &["ID", "Fecha", "Proveedor", "Total", "Notas"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            number(&self.date),
            text(&self.supplier),
            money(&self.total),
            text(&self.notes),
        ]
    }
}

impl TableRow for SaleDto {
    fn headers() -> &'static [&'static str] {
        &["ID", "Fecha", "Cliente", "Total", "Pago"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            number(&self.date),
            text(&self.customer),
            money(&self.total),
            text(&self.payment_method),
        ]
    }
}

impl TableRow for PriceDto {
    fn headers() -> &'static [&'static str] {
        &["ID", "Producto", "Precio", "Promoción", "Desde", "Hasta"]
    }

    fn cells(&self) -> Vec<String> {
        let product = self
            .product_name
            .clone()
            .unwrap_or_else(|| format!("#{}", self.product_id));
        vec![
            self.id.to_string(),
            product,
            money(&Some(self.price)),
            money(&self.promo_price),
            number(&self.valid_from),
            number(&self.valid_until),
        ]
    }
}

impl TableRow for CashMovementDto {
    fn headers() -> &'static [&'static str] {
        &["ID", "Fecha", "Tipo", "Monto", "Concepto"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            number(&self.date),
            self.kind.clone(),
            money(&Some(self.amount)),
            text(&self.concept),
        ]
    }
}

impl TableRow for OnlineOrderDto {
    fn headers() -> &'static [&'static str] {
        &["ID", "Fecha", "Cliente", "Estado", "Total"]
    }

    fn cells(&self) -> Vec<String> {
        let created = self
            .created_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        vec![
            self.id.to_string(),
            created,
            text(&self.customer_name),
            self.status.clone(),
            money(&self.total),
        ]
    }
}

/// Fixed-width table with a header rule.
pub fn render_table<E: TableRow>(rows: &[E]) -> String {
    if rows.is_empty() {
        return EMPTY_MESSAGE.to_string();
    }

    let headers = E::headers();
    let cells: Vec<Vec<String>> = rows.iter().map(TableRow::cells).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |values: Vec<&str>| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{:<width$}", value, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(headers.to_vec()));
    out.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &cells {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

/// Pager line, e.g. `« 1 … 4 [5] 6 … 10 »  Página 5 de 10 (48 registros)`.
pub fn render_pager<E>(view: &CatalogView<E>) -> String {
    let summary = format!(
        "Página {} de {} ({} registros, {} por página)",
        view.page,
        view.page_count.max(1),
        view.total_count,
        view.page_size
    );

    let slots = visible_pages(view.page, view.page_count);
    if slots.is_empty() {
        return summary;
    }

    let buttons: Vec<String> = slots
        .iter()
        .map(|slot| match slot {
            PageSlot::Page(page) if *page == view.page => format!("[{}]", page),
            PageSlot::Page(page) => page.to_string(),
            PageSlot::Ellipsis => "…".to_string(),
        })
        .collect();

    format!("« {} »  {}", buttons.join(" "), summary)
}

pub fn render_notification(notification: &Notification) -> String {
    match notification.kind {
        NotificationKind::Success => format!("✔ {}", notification.message),
        NotificationKind::Error => format!("✖ {}", notification.message),
    }
}

/// Everything a screen shows, top to bottom.
pub fn render_view<E: TableRow + Record>(label: &str, view: &CatalogView<E>) -> String {
    let mut out = vec![format!("== {} ==", label)];

    if !view.search_text.is_empty() {
        out.push(format!("Búsqueda: \"{}\"", view.search_text));
    }

    out.push(render_table(&view.page_items));
    out.push(render_pager(view));

    match &view.form {
        FormState::Closed => {}
        FormState::Creating => out.push(format!("Formulario abierto: nuevo/a {}", label)),
        FormState::Editing(entity) => {
            out.push(format!("Formulario abierto: editando #{}", entity.id()))
        }
    }

    if let Some(notification) = &view.notification {
        out.push(render_notification(notification));
    }

    out.join("\n")
}
