//! Eliminación de metadata en PDFs mediante cirugía del grafo de objetos.
//!
//! Se borra la referencia `Metadata` (XMP) del catálogo, se vacían todas
//! las claves del diccionario Info y se retiran `Info` e `ID` del trailer.
//! El grafo restante se re-serializa completo; no quedan referencias
//! colgantes que un lector conforme rechace.

use lopdf::{Document, Object};
use tracing::debug;

use crate::error::SanitizeError;

/// Sanea un PDF en memoria y devuelve los bytes re-serializados.
pub fn sanitize_pdf(bytes: &[u8]) -> Result<Vec<u8>, SanitizeError> {
    // load_mem no refresca metadata de modificación; los PDFs cifrados se
    // cargan tal cual en lugar de rechazarse.
    let mut doc = Document::load_mem(bytes)
        .map_err(|e| SanitizeError::decode(format!("no es un PDF válido: {e}")))?;

    strip_catalog_metadata(&mut doc);
    strip_info_dictionary(&mut doc);
    doc.trailer.remove(b"Info");
    doc.trailer.remove(b"ID");

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| SanitizeError::encode(format!("no se pudo re-serializar el PDF: {e}")))?;
    debug!(bytes = out.len(), "PDF re-serializado sin metadata");
    Ok(out)
}

/// Borra la entrada `Metadata` del catálogo, si existe.
fn strip_catalog_metadata(doc: &mut Document) {
    let root_id = doc
        .trailer
        .get(b"Root")
        .ok()
        .and_then(|obj| obj.as_reference().ok());
    let Some(root_id) = root_id else { return };
    if let Ok(catalog) = doc.get_object_mut(root_id) {
        if let Ok(dict) = catalog.as_dict_mut() {
            dict.remove(b"Metadata");
        }
    }
}

/// Vacía todas las claves del diccionario Info referenciado por el trailer.
///
/// El objeto vacío permanece en el grafo; la referencia del trailer se
/// retira después, así que ningún lector vuelve a alcanzarlo.
fn strip_info_dictionary(doc: &mut Document) {
    let info_id = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    };
    let Some(info_id) = info_id else { return };
    if let Ok(info) = doc.get_object_mut(info_id) {
        if let Ok(dict) = info.as_dict_mut() {
            let keys: Vec<Vec<u8>> = dict.iter().map(|(key, _)| key.clone()).collect();
            for key in keys {
                dict.remove(&key);
            }
        }
    }
}
