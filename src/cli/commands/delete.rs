use anyhow::{bail, Result};
use catalog::{CatalogService, CrudCatalog};
use tracing::{debug, info};

use super::{report, Context};
use crate::api_client::{FilterInput, RestEntity, Resource};
use crate::terminal::{Terminal, TerminalConfirm};

pub async fn delete(
    ctx: &Context,
    resource: Resource,
    id: i64,
    yes: bool,
    filters: FilterInput,
) -> Result<()> {
    info!("Deleting {} ID: {}", resource.label(), id);
    for_resource!(resource, delete_entity, ctx, resource, id, yes, &filters)
}

async fn delete_entity<E: RestEntity>(
    ctx: &Context,
    resource: Resource,
    id: i64,
    yes: bool,
    filters: &FilterInput,
) -> Result<()> {
    let confirm = if yes {
        TerminalConfirm::assume_yes()
    } else {
        TerminalConfirm::ask(Terminal::new())
    };
    let catalog = ctx.open::<E>(resource, confirm, None, filters.values_for(resource));

    if !locate(&catalog, id).await {
        report(&catalog)?;
        bail!("{} #{} no encontrado/a", resource.label(), id);
    }

    if catalog.delete_entity(id).await {
        return report(&catalog);
    }
    report(&catalog)?;
    println!("Operación cancelada");
    Ok(())
}

/// Pages forward until `id` is part of the loaded snapshot.
///
/// Deleting works on what the screen has loaded, so the record has to be
/// brought into view first. Stops at the last page or on a load error.
pub(crate) async fn locate<S: CatalogService>(catalog: &CrudCatalog<S>, id: i64) -> bool {
    catalog.reload().await;

    let mut previous = 0;
    loop {
        if catalog.find(id).is_some() {
            return true;
        }

        let view = catalog.view();
        let failed = view.notification.as_ref().is_some_and(|n| n.is_error());
        if failed || view.page <= previous || view.page >= view.page_count {
            debug!("ID {} not found after page {}", id, view.page);
            return false;
        }

        previous = view.page;
        catalog.set_page(view.page + 1).await;
    }
}
