//! Eliminación de tags ID3v2, APEv2 e ID3v1 en streams de audio MPEG.
//!
//! Tres pasadas ordenadas sobre el buffer: primero el tag frontal ID3v2,
//! luego el pie APEv2 y por último el tag heredado ID3v1. Cada pasada opera
//! sobre el buffer ya recortado por la anterior; el tag de 128 bytes queda
//! por fuera del pie APE, así que el orden importa. Un campo de tamaño
//! inconsistente con el buffer deja esa región intacta sin fallar el item.

use crate::sanitizer::constants::{
    APE_FOOTER_LEN, APE_SIGNATURE, APE_SIZE_OFFSET, ID3V1_LEN, ID3V1_SIGNATURE,
    ID3V2_HEADER_LEN, ID3V2_SIGNATURE,
};

/// Devuelve una copia del stream sin regiones de tags reconocidas.
pub fn sanitize_mp3(bytes: &[u8]) -> Vec<u8> {
    let mut data = bytes;
    data = strip_id3v2(data);
    data = strip_ape_tag(data);
    data = strip_id3v1(data);
    data.to_vec()
}

/// Recorta el tag ID3v2 del frente del stream si la firma y el tamaño
/// synchsafe encajan dentro del buffer.
fn strip_id3v2(bytes: &[u8]) -> &[u8] {
    if bytes.len() < ID3V2_HEADER_LEN || bytes[0..3] != ID3V2_SIGNATURE {
        return bytes;
    }
    let size = synchsafe_to_u32(&bytes[6..10]) as usize;
    let total = ID3V2_HEADER_LEN + size;
    if total > bytes.len() {
        return bytes;
    }
    &bytes[total..]
}

/// Recorta un tag APEv2 identificado por su pie de 32 bytes. El campo de
/// tamaño del pie ya incluye al propio pie.
fn strip_ape_tag(bytes: &[u8]) -> &[u8] {
    if bytes.len() < APE_FOOTER_LEN {
        return bytes;
    }
    let footer = &bytes[bytes.len() - APE_FOOTER_LEN..];
    if footer[0..8] != APE_SIGNATURE {
        return bytes;
    }
    let size = u32::from_le_bytes([
        footer[APE_SIZE_OFFSET],
        footer[APE_SIZE_OFFSET + 1],
        footer[APE_SIZE_OFFSET + 2],
        footer[APE_SIZE_OFFSET + 3],
    ]) as usize;
    if size == 0 || size > bytes.len() {
        return bytes;
    }
    &bytes[..bytes.len() - size]
}

/// Recorta el tag ID3v1 heredado: exactamente 128 bytes al final, marcados
/// con "TAG".
fn strip_id3v1(bytes: &[u8]) -> &[u8] {
    if bytes.len() < ID3V1_LEN {
        return bytes;
    }
    let start = bytes.len() - ID3V1_LEN;
    if bytes[start..start + 3] == ID3V1_SIGNATURE {
        return &bytes[..start];
    }
    bytes
}

/// Decodifica un entero synchsafe: solo los 7 bits bajos de cada byte son
/// significativos, byte más significativo primero.
fn synchsafe_to_u32(bytes: &[u8]) -> u32 {
    let mut value = 0_u32;
    for &b in bytes {
        value = (value << 7) | (b as u32 & 0x7F);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synchsafe_usa_siete_bits_por_byte() {
        assert_eq!(synchsafe_to_u32(&[0x00, 0x00, 0x00, 0x0A]), 10);
        assert_eq!(synchsafe_to_u32(&[0x00, 0x00, 0x01, 0x00]), 128);
        assert_eq!(synchsafe_to_u32(&[0x7F, 0x7F, 0x7F, 0x7F]), 0x0FFF_FFFF);
    }

    #[test]
    fn id3v2_con_tamano_excesivo_queda_intacto() {
        // Declara 1000 bytes de cuerpo en un buffer de 20.
        let mut bytes = vec![0x49, 0x44, 0x33, 0x03, 0x00, 0x00, 0x00, 0x00, 0x07, 0x68];
        bytes.extend_from_slice(&[0xAA; 10]);
        assert_eq!(strip_id3v2(&bytes), &bytes[..]);
    }

    #[test]
    fn ape_con_tamano_cero_queda_intacto() {
        let mut bytes = vec![0xFF; 8];
        let mut footer = [0_u8; 32];
        footer[0..8].copy_from_slice(b"APETAGEX");
        // Tamaño 0: campo corrupto, la región se deja tal cual.
        bytes.extend_from_slice(&footer);
        assert_eq!(strip_ape_tag(&bytes), &bytes[..]);
    }
}
