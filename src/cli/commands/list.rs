use anyhow::Result;
use catalog::AlwaysConfirm;
use tracing::{debug, info};

use super::{report, Context};
use crate::api_client::{FilterInput, RestEntity, Resource};
use crate::render::{render_view, TableRow};

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub page: usize,
    pub page_size: Option<usize>,
    pub search: String,
    pub filters: FilterInput,
}

pub async fn list(ctx: &Context, resource: Resource, options: ListOptions) -> Result<()> {
    info!("Listing {}", resource.label());
    for_resource!(resource, list_page, ctx, resource, &options)
}

async fn list_page<E: RestEntity + TableRow>(
    ctx: &Context,
    resource: Resource,
    options: &ListOptions,
) -> Result<()> {
    let catalog = ctx.open::<E>(
        resource,
        AlwaysConfirm,
        options.page_size,
        options.filters.values_for(resource),
    );

    if options.search.is_empty() {
        catalog.reload().await;
    } else {
        catalog.set_search_text(options.search.clone()).await;
    }
    if options.page > 1 {
        catalog.set_page(options.page).await;
    }

    let view = catalog.view();
    debug!(
        "Showing page {} of {} ({} rows)",
        view.page, view.page_count, view.total_count
    );
    if view.notification.is_none() {
        println!("{}", render_view(resource.label(), &view));
    }
    report(&catalog)
}
