//! Clasificación de blobs hacia el sanitizador correspondiente.

use crate::blob::{DOCX_MIME, SourceBlob};

/// Familia de formato que decide qué sanitizador se aplica.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FormatKind {
    Image,
    Pdf,
    Docx,
    Mp4,
    Mp3,
    Unsupported,
}

/// Decide el sanitizador a partir del tipo declarado, con la extensión del
/// nombre como respaldo.
///
/// El tipo declarado tiene precedencia sobre la extensión. Las imágenes se
/// reconocen solo por el prefijo `image/`: re-codificarlas exige un decode
/// real, y una extensión suelta no garantiza contenido decodificable.
pub fn classify(media_type: &str, filename: Option<&str>) -> FormatKind {
    if media_type.starts_with("image/") {
        return FormatKind::Image;
    }
    match media_type {
        "application/pdf" => return FormatKind::Pdf,
        DOCX_MIME => return FormatKind::Docx,
        "video/mp4" => return FormatKind::Mp4,
        "audio/mpeg" => return FormatKind::Mp3,
        _ => {}
    }

    let extension = filename
        .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext))
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => FormatKind::Pdf,
        "docx" => FormatKind::Docx,
        "mp4" => FormatKind::Mp4,
        "mp3" => FormatKind::Mp3,
        _ => FormatKind::Unsupported,
    }
}

/// Clasifica un blob ya construido.
pub fn classify_blob(blob: &SourceBlob) -> FormatKind {
    classify(&blob.media_type, blob.filename.as_deref())
}
