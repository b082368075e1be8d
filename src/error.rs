//! Taxonomía de fallos de saneamiento.

use thiserror::Error;

/// Fallos posibles al sanear un blob individual.
///
/// Un formato no soportado no es un error: el clasificador lo enruta como
/// passthrough antes de llegar a los sanitizadores.
#[derive(Debug, Error)]
pub enum SanitizeError {
    /// El contenido no pudo interpretarse como el formato declarado.
    #[error("no se pudo decodificar el contenido: {detail}")]
    DecodeFailure { detail: String },

    /// Un campo de tamaño es inconsistente con la longitud del buffer.
    #[error("campo de tamaño inconsistente con el buffer: {detail}")]
    BoundsFailure { detail: String },

    /// El contenido limpio no pudo re-serializarse.
    #[error("no se pudo re-codificar el contenido limpio: {detail}")]
    EncodeFailure { detail: String },

    /// Error de E/S sobre buffers en memoria.
    #[error("error de E/S: {0}")]
    Io(#[from] std::io::Error),
}

impl SanitizeError {
    pub fn decode(detail: impl Into<String>) -> Self {
        SanitizeError::DecodeFailure {
            detail: detail.into(),
        }
    }

    pub fn encode(detail: impl Into<String>) -> Self {
        SanitizeError::EncodeFailure {
            detail: detail.into(),
        }
    }

    /// Descripción legible para reportar el fallo al host.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}
