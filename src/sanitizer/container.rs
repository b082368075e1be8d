//! Saneamiento de contenedores ISO media (MP4/MOV) por reescritura del
//! árbol de cajas.
//!
//! El contenedor es una secuencia de cajas tipadas con prefijo de longitud.
//! Las cajas de metadata (`udta`, `meta`, `ilst`) se descartan completas;
//! las contenedoras conocidas se recorren en profundidad y se reconstruyen
//! con el tamaño recalculado de abajo hacia arriba; todo lo demás se copia
//! byte a byte, incluidas las tablas de offsets de samples, que nunca se
//! renumeran.

use tracing::debug;

use crate::sanitizer::constants::{CONTAINER_BOXES, STRIP_BOXES};

/// Nodo del árbol de cajas tal como se observó en el stream.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MediaBox {
    /// Caja hoja o desconocida: cabecera y payload tal cual llegaron.
    Leaf { raw: Vec<u8> },
    /// Caja contenedora conocida: se reconstruye con tamaño recalculado,
    /// conservando el ancho de cabecera observado (8 o 16 bytes).
    Container {
        kind: [u8; 4],
        wide: bool,
        content: BoxTree,
    },
}

/// Cajas hermanas de un rango, en orden, más el resto no parseable del
/// rango, que se conserva intacto.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BoxTree {
    pub boxes: Vec<MediaBox>,
    pub trailing: Vec<u8>,
}

impl BoxTree {
    /// Serializa el árbol concatenando las cajas supervivientes en el orden
    /// original de hermanos.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        for media_box in &self.boxes {
            media_box.encode_into(out);
        }
        out.extend_from_slice(&self.trailing);
    }
}

impl MediaBox {
    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            MediaBox::Leaf { raw } => out.extend_from_slice(raw),
            MediaBox::Container {
                kind,
                wide,
                content,
            } => {
                let mut payload = Vec::new();
                content.encode_into(&mut payload);
                if *wide {
                    let size = 16 + payload.len() as u64;
                    out.extend_from_slice(&1_u32.to_be_bytes());
                    out.extend_from_slice(kind);
                    out.extend_from_slice(&size.to_be_bytes());
                } else {
                    let size = (8 + payload.len()) as u32;
                    out.extend_from_slice(&size.to_be_bytes());
                    out.extend_from_slice(kind);
                }
                out.extend_from_slice(&payload);
            }
        }
    }
}

/// Elimina las cajas de metadata de un contenedor ISO media.
///
/// Política de mejor esfuerzo: un campo de tamaño corrupto detiene el
/// parseo de su rango y el resto se copia sin tocar; el item nunca falla.
pub fn sanitize_mp4(bytes: &[u8]) -> Vec<u8> {
    let tree = parse_range(bytes, 0, bytes.len());
    let out = tree.encode();
    if out.len() != bytes.len() {
        debug!(
            original = bytes.len(),
            limpio = out.len(),
            "cajas de metadata eliminadas del contenedor"
        );
    }
    out
}

/// Parsea las cajas del rango `[start, end)`, descartando las de metadata
/// y descendiendo en las contenedoras conocidas.
pub fn parse_range(bytes: &[u8], start: usize, end: usize) -> BoxTree {
    let mut boxes = Vec::new();
    let mut pos = start;

    while pos + 8 <= end {
        let size32 = u32::from_be_bytes([
            bytes[pos],
            bytes[pos + 1],
            bytes[pos + 2],
            bytes[pos + 3],
        ]) as u64;
        let mut kind = [0_u8; 4];
        kind.copy_from_slice(&bytes[pos + 4..pos + 8]);

        let mut header_len = 8_usize;
        let size = if size32 == 1 {
            // Caja grande: tamaño extendido de 64 bits tras la cabecera.
            if pos + 16 > end {
                break;
            }
            header_len = 16;
            u64::from_be_bytes([
                bytes[pos + 8],
                bytes[pos + 9],
                bytes[pos + 10],
                bytes[pos + 11],
                bytes[pos + 12],
                bytes[pos + 13],
                bytes[pos + 14],
                bytes[pos + 15],
            ])
        } else if size32 == 0 {
            // La caja se extiende hasta el final del rango que la contiene.
            (end - pos) as u64
        } else {
            size32
        };

        if size < header_len as u64 || size > (end - pos) as u64 {
            // Tamaño inconsistente: el resto del rango queda sin tocar.
            break;
        }
        let box_end = pos + size as usize;

        if STRIP_BOXES.contains(&kind) {
            pos = box_end;
            continue;
        }

        if CONTAINER_BOXES.contains(&kind) {
            let content = parse_range(bytes, pos + header_len, box_end);
            boxes.push(MediaBox::Container {
                kind,
                wide: header_len == 16,
                content,
            });
        } else {
            boxes.push(MediaBox::Leaf {
                raw: bytes[pos..box_end].to_vec(),
            });
        }
        pos = box_end;
    }

    BoxTree {
        boxes,
        trailing: bytes[pos..end].to_vec(),
    }
}
