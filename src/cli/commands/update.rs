use anyhow::{anyhow, Result};
use catalog::AlwaysConfirm;
use tracing::info;

use super::{finish_submit, parse_payload, Context};
use crate::api_client::{RestEntity, Resource};
use crate::render::{render_table, TableRow};

pub async fn update(ctx: &Context, resource: Resource, id: i64, data: &str) -> Result<()> {
    let payload = parse_payload(data)?;
    info!("Updating {} ID: {}", resource.label(), id);
    for_resource!(resource, update_entity, ctx, resource, id, payload)
}

async fn update_entity<E: RestEntity + TableRow>(
    ctx: &Context,
    resource: Resource,
    id: i64,
    payload: serde_json::Value,
) -> Result<()> {
    let catalog = ctx.open::<E>(resource, AlwaysConfirm, None, Vec::new());

    let current = catalog.service().get(id).await.map_err(|e| {
        anyhow!(
            "No se pudo obtener {} #{}: {}",
            resource.label(),
            id,
            e.user_message()
        )
    })?;
    catalog.open_edit_form(current);

    let updated = finish_submit(&catalog, catalog.submit_form(payload).await)?;
    println!("{}", render_table(&[updated]));
    Ok(())
}
