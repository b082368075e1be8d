//! Blobs de entrada y salida del motor, y generación de nombres seguros.

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Tipo MIME de documentos Word OOXML.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Archivo entregado por el host: bytes crudos más el tipo declarado.
///
/// El motor nunca muta un `SourceBlob`; cada sanitizador produce una
/// asignación nueva.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceBlob {
    pub bytes: Vec<u8>,
    pub media_type: String,
    pub filename: Option<String>,
}

impl SourceBlob {
    pub fn new(
        bytes: Vec<u8>,
        media_type: impl Into<String>,
        filename: Option<String>,
    ) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
            filename,
        }
    }
}

/// Resultado limpio de un sanitizador.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SanitizedBlob {
    pub bytes: Vec<u8>,
    pub media_type: String,
    pub filename: String,
    pub sanitized_at: DateTime<Local>,
}

impl SanitizedBlob {
    /// Construye el blob limpio resolviendo el nombre de salida.
    pub fn new(bytes: Vec<u8>, media_type: &str, original_name: Option<&str>) -> Self {
        let sanitized_at = Local::now();
        let filename = safe_filename(original_name, media_type, &sanitized_at);
        Self {
            bytes,
            media_type: media_type.to_string(),
            filename,
            sanitized_at,
        }
    }
}

/// Extensión de archivo asociada a cada tipo MIME soportado.
pub fn extension_for_media_type(media_type: &str) -> &'static str {
    match media_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        "application/pdf" => "pdf",
        DOCX_MIME => "docx",
        "video/mp4" => "mp4",
        "audio/mpeg" => "mp3",
        _ => "png",
    }
}

/// Conserva el nombre original si existe; si no, genera uno con timestamp.
pub fn safe_filename(
    original: Option<&str>,
    media_type: &str,
    stamp: &DateTime<Local>,
) -> String {
    if let Some(name) = original {
        if !name.trim().is_empty() {
            return name.to_string();
        }
    }
    // En UTC y con milisegundos, como el toISOString del host original.
    let iso = stamp
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("sanitized-{}.{}", iso, extension_for_media_type(media_type))
}
