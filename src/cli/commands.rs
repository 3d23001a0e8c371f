use anyhow::{anyhow, Context as _, Result};
use catalog::{CatalogOptions, CatalogService, Confirm, CrudCatalog, FilterValue, NotificationKind};
use serde_json::Value;
use tracing::warn;

use crate::api_client::{ApiClient, RestCatalog, RestEntity, Resource};
use crate::config::AppConfig;
use crate::render::render_notification;

/// Runs `$run::<Dto>(args..)` with the DTO type of `$resource`.
macro_rules! for_resource {
    ($resource:expr, $run:ident, $($arg:expr),* $(,)?) => {
        match $resource {
            Resource::Categories => $run::<common::CategoryDto>($($arg),*).await,
            Resource::Subcategories => $run::<common::SubcategoryDto>($($arg),*).await,
            Resource::Brands => $run::<common::BrandDto>($($arg),*).await,
            Resource::Products => $run::<common::ProductDto>($($arg),*).await,
            Resource::Purchases => $run::<common::PurchaseDto>($($arg),*).await,
            Resource::Sales => $run::<common::SaleDto>($($arg),*).await,
            Resource::Prices => $run::<common::PriceDto>($($arg),*).await,
            Resource::CashMovements => $run::<common::CashMovementDto>($($arg),*).await,
            Resource::OnlineOrders => $run::<common::OnlineOrderDto>($($arg),*).await,
        }
    };
}

pub mod browse;
pub mod create;
pub mod delete;
pub mod list;
pub mod update;

pub use browse::browse;
pub use create::{create, CreateOptions};
pub use delete::delete;
pub use list::{list, ListOptions};
pub use update::update;

/// What every command needs: the backend client and the settings.
pub struct Context {
    pub client: ApiClient,
    pub config: AppConfig,
}

impl Context {
    /// A catalog screen over `resource`.
    pub fn open<E: RestEntity>(
        &self,
        resource: Resource,
        confirm: impl Confirm + 'static,
        page_size: Option<usize>,
        extra_filters: Vec<FilterValue>,
    ) -> CrudCatalog<RestCatalog<E>> {
        let options = CatalogOptions {
            extra_filters,
            page_size: page_size.unwrap_or_else(|| self.config.page_size()),
            notification_timeout: self.config.toast_duration(),
        };
        CrudCatalog::new(
            RestCatalog::new(self.client.clone(), resource),
            resource.label(),
            confirm,
            options,
        )
    }
}

/// Parses a `--data` argument. The backend expects a JSON object.
pub fn parse_payload(data: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(data).context("--data is not valid JSON")?;
    if !value.is_object() {
        return Err(anyhow!("--data must be a JSON object"));
    }
    Ok(value)
}

/// Prints a pending success notification; an error one becomes `Err`.
pub fn report<S: CatalogService>(catalog: &CrudCatalog<S>) -> Result<()> {
    match catalog.notification() {
        Some(notification) if notification.kind == NotificationKind::Error => {
            Err(anyhow!(notification.message))
        }
        Some(notification) => {
            println!("{}", render_notification(&notification));
            Ok(())
        }
        None => Ok(()),
    }
}

/// Outcome of a form submit.
///
/// When the backend stored the record its answer is returned, and an error
/// left by the list refresh that follows is only printed as a warning.
pub fn finish_submit<S: CatalogService, T>(
    catalog: &CrudCatalog<S>,
    output: Option<T>,
) -> Result<T> {
    let notification = catalog.notification();
    match (output, notification) {
        (Some(saved), Some(notification)) if notification.is_error() => {
            warn!("Saved but could not refresh: {}", notification.message);
            eprintln!("⚠ {}", notification.message);
            Ok(saved)
        }
        (Some(saved), Some(notification)) => {
            println!("{}", render_notification(&notification));
            Ok(saved)
        }
        (Some(saved), None) => Ok(saved),
        (None, Some(notification)) if notification.is_error() => {
            Err(anyhow!(notification.message))
        }
        (None, _) => Err(anyhow!("{} no se pudo guardar", catalog.label())),
    }
}
