//! Despacho de lotes hacia los sanitizadores y agregación de resultados.

use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;
use std::thread;
use tracing::{debug, warn};

use crate::blob::{DOCX_MIME, SanitizedBlob, SourceBlob};
use crate::classifier::{FormatKind, classify_blob};
use crate::error::SanitizeError;
use crate::sanitizer;

/// Configuración del motor.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Compone la marca "sanitized" sobre las imágenes re-codificadas.
    pub watermark: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { watermark: true }
    }
}

/// Resultado individual dentro de un lote.
#[derive(Debug)]
pub enum ItemOutcome {
    /// Bytes limpios con su nombre de salida.
    Sanitized(SanitizedBlob),
    /// Formato no soportado: el blob pasa sin modificar. No es un error.
    Passthrough(SourceBlob),
    /// Fallo aislado de este item; no afecta al resto del lote.
    Failed {
        filename: Option<String>,
        error: SanitizeError,
    },
}

/// Resultado agregado de un lote. El conteo de saneados se reporta hacia
/// arriba; el motor nunca escribe el almacén del host.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Un resultado por item de entrada, en el mismo orden.
    pub items: Vec<ItemOutcome>,
    pub sanitized_count: u64,
}

impl BatchOutcome {
    /// Indica si una acción completa del usuario no produjo ningún item:
    /// el host muestra entonces su aviso transitorio.
    pub fn produced_nothing(&self) -> bool {
        !self.items.is_empty()
            && self
                .items
                .iter()
                .all(|item| matches!(item, ItemOutcome::Failed { .. }))
    }
}

/// Eventos de progreso para hosts que muestran avance por item.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SanitizeEvent {
    Started { total: usize },
    Processing { index: usize, total: usize, item: String },
    Success { item: String },
    Failure { item: String, error: String },
    Finished { sanitized: usize, passthrough: usize, failures: usize },
}

/// Sanea un blob individual según su clasificación.
///
/// `Ok(None)` significa formato no soportado: el caller lo deja pasar tal
/// cual. Los sanitizadores de contenedor y audio son de mejor esfuerzo y
/// nunca fallan; imagen, PDF y Office reportan fallos de decodificación.
pub fn sanitize_item(
    blob: &SourceBlob,
    config: &EngineConfig,
) -> Result<Option<SanitizedBlob>, SanitizeError> {
    let (bytes, media_type) = match classify_blob(blob) {
        FormatKind::Unsupported => return Ok(None),
        FormatKind::Image => (
            sanitizer::image::sanitize_image(&blob.bytes, &blob.media_type, config.watermark)?,
            sanitizer::image::output_media_type(&blob.media_type),
        ),
        FormatKind::Pdf => (sanitizer::pdf::sanitize_pdf(&blob.bytes)?, "application/pdf"),
        FormatKind::Docx => (sanitizer::office::sanitize_docx(&blob.bytes)?, DOCX_MIME),
        FormatKind::Mp4 => (sanitizer::container::sanitize_mp4(&blob.bytes), "video/mp4"),
        FormatKind::Mp3 => (sanitizer::audio::sanitize_mp3(&blob.bytes), "audio/mpeg"),
    };
    Ok(Some(SanitizedBlob::new(
        bytes,
        media_type,
        blob.filename.as_deref(),
    )))
}

/// Sanea un lote completo, un hilo por item, y devuelve los resultados en
/// el orden de entrada. Los fallos quedan aislados por item: el lote
/// siempre devuelve éxito parcial.
pub fn sanitize_batch(items: Vec<SourceBlob>, config: &EngineConfig) -> BatchOutcome {
    let results: Vec<Result<Option<SanitizedBlob>, SanitizeError>> = thread::scope(|scope| {
        let handles: Vec<_> = items
            .iter()
            .map(|blob| scope.spawn(move || sanitize_item(blob, config)))
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle.join().unwrap_or_else(|_| {
                    Err(SanitizeError::encode("el sanitizador abortó inesperadamente"))
                })
            })
            .collect()
    });

    let mut sanitized_count = 0_u64;
    let outcomes = items
        .into_iter()
        .zip(results)
        .map(|(blob, result)| match result {
            Ok(Some(clean)) => {
                sanitized_count += 1;
                debug!(archivo = %clean.filename, tipo = %clean.media_type, "item saneado");
                ItemOutcome::Sanitized(clean)
            }
            Ok(None) => {
                debug!(tipo = %blob.media_type, "formato no soportado, pasa sin cambios");
                ItemOutcome::Passthrough(blob)
            }
            Err(error) => {
                warn!(tipo = %blob.media_type, %error, "fallo saneando item");
                ItemOutcome::Failed {
                    filename: blob.filename,
                    error,
                }
            }
        })
        .collect();

    BatchOutcome {
        items: outcomes,
        sanitized_count,
    }
}

/// Variante con eventos de progreso por canal, para hosts con interfaz.
/// Procesa en secuencia para que los eventos reflejen el orden real.
pub fn run_batch_with_sender(
    items: Vec<SourceBlob>,
    config: &EngineConfig,
    sender: Sender<SanitizeEvent>,
) -> BatchOutcome {
    let total = items.len();
    let _ = sender.send(SanitizeEvent::Started { total });

    let mut outcomes = Vec::with_capacity(total);
    let mut sanitized = 0_usize;
    let mut passthrough = 0_usize;
    let mut failures = 0_usize;

    for (index, blob) in items.into_iter().enumerate() {
        let label = blob
            .filename
            .clone()
            .unwrap_or_else(|| blob.media_type.clone());
        let _ = sender.send(SanitizeEvent::Processing {
            index,
            total,
            item: label.clone(),
        });

        match sanitize_item(&blob, config) {
            Ok(Some(clean)) => {
                sanitized += 1;
                let _ = sender.send(SanitizeEvent::Success {
                    item: clean.filename.clone(),
                });
                outcomes.push(ItemOutcome::Sanitized(clean));
            }
            Ok(None) => {
                passthrough += 1;
                let _ = sender.send(SanitizeEvent::Success { item: label });
                outcomes.push(ItemOutcome::Passthrough(blob));
            }
            Err(error) => {
                failures += 1;
                let _ = sender.send(SanitizeEvent::Failure {
                    item: label,
                    error: error.reason(),
                });
                outcomes.push(ItemOutcome::Failed {
                    filename: blob.filename,
                    error,
                });
            }
        }
    }

    let _ = sender.send(SanitizeEvent::Finished {
        sanitized,
        passthrough,
        failures,
    });

    BatchOutcome {
        items: outcomes,
        sanitized_count: sanitized as u64,
    }
}
