use catalog::{FilterValue, LoadQuery};
use clap::ValueEnum;

/// The REST collections the admin client manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Resource {
    Categories,
    Subcategories,
    Brands,
    Products,
    Purchases,
    Sales,
    Prices,
    CashMovements,
    OnlineOrders,
}

/// Extra filters a collection accepts, in the order they are forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Year,
    Month,
    Status,
}

impl FilterKind {
    pub fn param_name(self) -> &'static str {
        match self {
            FilterKind::Year => "anio",
            FilterKind::Month => "mes",
            FilterKind::Status => "estado",
        }
    }
}

const PERIOD_FILTERS: &[FilterKind] = &[FilterKind::Year, FilterKind::Month];
const STATUS_FILTERS: &[FilterKind] = &[FilterKind::Status];

impl Resource {
    pub fn path(self) -> &'static str {
        match self {
            Resource::Categories => "/categorias",
            Resource::Subcategories => "/subcategorias",
            Resource::Brands => "/marcas",
            Resource::Products => "/productos",
            Resource::Purchases => "/compras",
            Resource::Sales => "/ventas",
            Resource::Prices => "/precios",
            Resource::CashMovements => "/movimientos-caja",
            Resource::OnlineOrders => "/pedidos-online",
        }
    }

    /// Human-readable name used in notifications.
    pub fn label(self) -> &'static str {
        match self {
            Resource::Categories => "Categoría",
            Resource::Subcategories => "Subcategoría",
            Resource::Brands => "Marca",
            Resource::Products => "Producto",
            Resource::Purchases => "Compra",
            Resource::Sales => "Venta",
            Resource::Prices => "Precio",
            Resource::CashMovements => "Movimiento de caja",
            Resource::OnlineOrders => "Pedido online",
        }
    }

    pub fn filters(self) -> &'static [FilterKind] {
        match self {
            Resource::Purchases | Resource::Sales | Resource::CashMovements => PERIOD_FILTERS,
            Resource::OnlineOrders => STATUS_FILTERS,
            _ => &[],
        }
    }

    pub fn item_path(self, id: i64) -> String {
        format!("{}/{}", self.path(), id)
    }

    /// Query string of a list request. Extra filters are matched to
    /// [`Resource::filters`] by position; empty ones are left out.
    pub fn query_params(self, query: &LoadQuery) -> Vec<(String, String)> {
        let mut params = vec![
            ("all".to_string(), query.want_all.to_string()),
            ("page".to_string(), query.page.to_string()),
            ("limit".to_string(), query.page_size.to_string()),
        ];

        if !query.search.is_empty() {
            params.push(("search".to_string(), query.search.clone()));
        }

        for (kind, value) in self.filters().iter().zip(&query.extra) {
            if !value.is_empty() {
                params.push((kind.param_name().to_string(), value.to_string()));
            }
        }

        params
    }
}

/// Filter values as typed on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterInput {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub status: Option<String>,
}

impl FilterInput {
    /// Values for the filters `resource` accepts, in forwarding order.
    pub fn values_for(&self, resource: Resource) -> Vec<FilterValue> {
        resource
            .filters()
            .iter()
            .map(|kind| match kind {
                FilterKind::Year => FilterValue::from(self.year),
                FilterKind::Month => FilterValue::from(self.month),
                FilterKind::Status => FilterValue::from(self.status.clone()),
            })
            .collect()
    }
}
