//! Eliminación de metadata en documentos OOXML tratados como archivos zip.
//!
//! Las propiedades de autoría viven en entradas completas bajo `docProps/`
//! (core.xml, app.xml, custom.xml); basta con omitirlas al reescribir el
//! archivo. No se parsea XML: la cirugía es a nivel de entradas.

use std::io::{Cursor, Read, Write};

use tracing::debug;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::SanitizeError;
use crate::sanitizer::constants::DOCPROPS_PREFIX;

/// Reescribe el documento omitiendo toda entrada bajo `docProps/`.
pub fn sanitize_docx(bytes: &[u8]) -> Result<Vec<u8>, SanitizeError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| SanitizeError::decode(format!("no es un documento Office válido: {e}")))?;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut dropped = 0_usize;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| SanitizeError::decode(format!("error leyendo entrada del ZIP: {e}")))?;
        let name = file.name().to_string();

        if name.starts_with(DOCPROPS_PREFIX) {
            dropped += 1;
            continue;
        }

        let mut options = FileOptions::<'_, ()>::default().compression_method(file.compression());
        if let Some(mode) = file.unix_mode() {
            options = options.unix_permissions(mode);
        }
        if let Some(time) = file.last_modified() {
            options = options.last_modified_time(time);
        }

        if file.is_dir() {
            writer
                .add_directory(name, options)
                .map_err(|e| SanitizeError::encode(format!("error creando directorio en ZIP: {e}")))?;
            continue;
        }

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;

        writer
            .start_file(name, options)
            .map_err(|e| SanitizeError::encode(format!("error escribiendo contenido: {e}")))?;
        writer.write_all(&contents)?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| SanitizeError::encode(format!("error finalizando archivo: {e}")))?;
    debug!(entradas_eliminadas = dropped, "documento Office reescrito");
    Ok(cursor.into_inner())
}
