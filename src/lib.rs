//! SaniLens: motor de saneamiento de metadata para archivos en memoria.
//!
//! Recibe lotes de `(bytes, tipo declarado, nombre opcional)` y devuelve,
//! por item, bytes limpios del mismo tipo o un fallo aislado. Cada formato
//! tiene su transformación pura: re-codificación de imágenes, recorte de
//! tags de audio, reescritura del árbol de cajas ISO media, cirugía del
//! grafo de objetos PDF y reescritura de archivos zip OOXML. El motor no
//! depende de ningún modelo de eventos ni de estado global del host.

pub mod blob;
pub mod classifier;
pub mod engine;
pub mod error;
pub mod host;
pub mod sanitizer;

pub use blob::{DOCX_MIME, SanitizedBlob, SourceBlob};
pub use classifier::{FormatKind, classify};
pub use engine::{
    BatchOutcome, EngineConfig, ItemOutcome, SanitizeEvent, run_batch_with_sender, sanitize_batch,
};
pub use error::SanitizeError;
pub use host::{CounterStore, MemoryCounter, SiteToggles, report_batch};
