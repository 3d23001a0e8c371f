use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use catalog::AlwaysConfirm;
use common::ProductDto;
use serde_json::Value;
use tracing::{debug, info};

use super::{finish_submit, parse_payload, Context};
use crate::api_client::product::{upload_datasheet, upload_image};
use crate::api_client::{RestEntity, Resource};
use crate::render::{render_table, TableRow};

#[derive(Debug, Clone)]
pub struct CreateOptions {
    pub data: String,
    pub image: Option<PathBuf>,
    pub datasheet: Option<PathBuf>,
}

pub async fn create(ctx: &Context, resource: Resource, options: CreateOptions) -> Result<()> {
    let payload = parse_payload(&options.data)?;
    info!("Creating {}", resource.label());

    if resource == Resource::Products {
        return create_product(ctx, payload, &options).await;
    }
    if options.image.is_some() || options.datasheet.is_some() {
        bail!("--image and --datasheet are only accepted for products");
    }

    for_resource!(resource, create_and_show, ctx, resource, payload)
}

/// Sends the create form and returns what the backend stored.
async fn submit_new<E: RestEntity>(ctx: &Context, resource: Resource, payload: Value) -> Result<E> {
    let catalog = ctx.open::<E>(resource, AlwaysConfirm, None, Vec::new());
    catalog.open_create_form();

    let created = catalog.submit_form(payload).await;
    finish_submit(&catalog, created)
}

async fn create_and_show<E: RestEntity + TableRow>(
    ctx: &Context,
    resource: Resource,
    payload: Value,
) -> Result<()> {
    let created = submit_new::<E>(ctx, resource, payload).await?;
    println!("{}", render_table(&[created]));
    Ok(())
}

/// Creates the product, then attaches the picture and the datasheet.
async fn create_product(ctx: &Context, payload: Value, options: &CreateOptions) -> Result<()> {
    let mut product = submit_new::<ProductDto>(ctx, Resource::Products, payload).await?;

    if let Some(path) = &options.image {
        debug!("Attaching image {}", path.display());
        product = upload_image(&ctx.client, product.id, path)
            .await
            .map_err(|e| anyhow!("Error al subir la imagen: {}", e.user_message()))?;
        println!("✔ Imagen subida");
    }

    if let Some(path) = &options.datasheet {
        debug!("Attaching datasheet {}", path.display());
        product = upload_datasheet(&ctx.client, product.id, path)
            .await
            .map_err(|e| anyhow!("Error al subir la ficha técnica: {}", e.user_message()))?;
        println!("✔ Ficha técnica subida");
    }

    println!("{}", render_table(&[product]));
    Ok(())
}
