//! File attachments of products: picture and technical datasheet.

use std::path::Path;

use catalog::{Result, ServiceError};
use common::ProductDto;
use tracing::{debug, error, info};

use super::{ApiClient, Resource};

fn image_mime(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

async fn read_file(path: &Path) -> Result<(String, Vec<u8>)> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        error!("Failed to read {}: {}", path.display(), e);
        ServiceError::Other(format!("No se pudo leer {}: {}", path.display(), e))
    })?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("archivo")
        .to_string();
    Ok((file_name, bytes))
}

/// Uploads the product picture.
pub async fn upload_image(client: &ApiClient, product_id: i64, path: &Path) -> Result<ProductDto> {
    let mime = image_mime(path).ok_or_else(|| {
        ServiceError::Other(format!(
            "Formato de imagen no soportado: {}",
            path.display()
        ))
    })?;
    let (file_name, bytes) = read_file(path).await?;

    debug!("Uploading image {} for product ID: {}", file_name, product_id);
    let endpoint = format!("{}/imagen", Resource::Products.item_path(product_id));
    let product = client.upload::<ProductDto>(&endpoint, file_name, mime, bytes).await?;
    info!("Image uploaded for product ID: {}", product_id);
    Ok(product)
}

/// Uploads the technical datasheet. Only PDF files are accepted.
pub async fn upload_datasheet(
    client: &ApiClient,
    product_id: i64,
    path: &Path,
) -> Result<ProductDto> {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(ServiceError::Other(format!(
            "La ficha técnica debe ser un PDF: {}",
            path.display()
        )));
    }
    let (file_name, bytes) = read_file(path).await?;

    debug!("Uploading datasheet {} for product ID: {}", file_name, product_id);
    let endpoint = format!("{}/ficha-tecnica", Resource::Products.item_path(product_id));
    let product = client
        .upload::<ProductDto>(&endpoint, file_name, "application/pdf", bytes)
        .await?;
    info!("Datasheet uploaded for product ID: {}", product_id);
    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime(Path::new("foto.PNG")), Some("image/png"));
        assert_eq!(image_mime(Path::new("a/b/foto.jpeg")), Some("image/jpeg"));
        assert_eq!(image_mime(Path::new("ficha.pdf")), None);
        assert_eq!(image_mime(Path::new("sin_extension")), None);
    }

    #[tokio::test]
    async fn test_datasheet_must_be_pdf() {
        let client = ApiClient::new("http://127.0.0.1:9", std::time::Duration::from_secs(1)).unwrap();
        let err = upload_datasheet(&client, 1, Path::new("ficha.docx"))
            .await
            .unwrap_err();
        assert!(err.user_message().contains("PDF"));
    }
}
