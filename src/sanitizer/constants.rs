//! Valores compartidos por los sanitizadores.

/// Cajas ISO media cuyo único contenido es metadata descriptiva; se
/// eliminan completas (cabecera incluida).
pub(crate) const STRIP_BOXES: [[u8; 4]; 3] = [*b"udta", *b"meta", *b"ilst"];

/// Cajas contenedoras conocidas: se recorren recursivamente y se
/// reconstruyen con el tamaño recalculado.
pub(crate) const CONTAINER_BOXES: [[u8; 4]; 11] = [
    *b"moov", *b"trak", *b"mdia", *b"minf", *b"stbl", *b"edts", *b"dinf",
    *b"mvex", *b"moof", *b"traf", *b"mfra",
];

/// Firma de cabecera ID3v2 al inicio del stream.
pub(crate) const ID3V2_SIGNATURE: [u8; 3] = *b"ID3";
/// Longitud de la cabecera ID3v2 antes del cuerpo del tag.
pub(crate) const ID3V2_HEADER_LEN: usize = 10;

/// Firma del pie APEv2 (últimos 32 bytes del tag).
pub(crate) const APE_SIGNATURE: [u8; 8] = *b"APETAGEX";
pub(crate) const APE_FOOTER_LEN: usize = 32;
/// Desplazamiento del campo de tamaño (u32 LE) dentro del pie APE.
pub(crate) const APE_SIZE_OFFSET: usize = 12;

/// Firma del tag ID3v1 al inicio de los últimos 128 bytes.
pub(crate) const ID3V1_SIGNATURE: [u8; 3] = *b"TAG";
pub(crate) const ID3V1_LEN: usize = 128;

/// Prefijo de las entradas de metadata en documentos OOXML.
pub(crate) const DOCPROPS_PREFIX: &str = "docProps/";

/// Calidad de re-codificación para formatos con pérdida.
pub(crate) const JPEG_QUALITY: u8 = 92;

/// Marca de agua opcional compuesta sobre la imagen re-codificada.
pub(crate) const WATERMARK_TEXT: &str = "sanitized";
pub(crate) const WATERMARK_ALPHA: f32 = 0.18;
pub(crate) const WATERMARK_ORIGIN: (u32, u32) = (6, 4);
