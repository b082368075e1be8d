//! Re-codificación de imágenes rasterizadas para descartar metadata EXIF.
//!
//! Decodificar a píxeles y re-codificar desde una superficie nueva descarta
//! de raíz toda la metadata del codificador original: la salida se genera
//! únicamente a partir de los píxeles. Tras codificar se verifica con el
//! lector EXIF que no quede metadata legible.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::error::SanitizeError;
use crate::sanitizer::constants::{JPEG_QUALITY, WATERMARK_ALPHA, WATERMARK_ORIGIN, WATERMARK_TEXT};

/// Tipo MIME con el que se re-codifica una imagen con ese tipo declarado.
pub fn output_media_type(declared: &str) -> &'static str {
    match declared {
        "image/jpeg" => "image/jpeg",
        "image/png" => "image/png",
        "image/webp" => "image/webp",
        "image/gif" => "image/gif",
        "image/bmp" => "image/bmp",
        _ => "image/png",
    }
}

/// Decodifica, redibuja sobre una superficie nueva y re-codifica la imagen.
pub fn sanitize_image(
    bytes: &[u8],
    declared_type: &str,
    watermark: bool,
) -> Result<Vec<u8>, SanitizeError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| SanitizeError::decode(format!("no se pudo decodificar la imagen: {e}")))?;

    // Superficie nueva: solo píxeles, sin rastro del contenedor original.
    let mut surface: RgbaImage = decoded.to_rgba8();
    if watermark {
        blend_watermark(&mut surface);
    }

    let out = encode_surface(surface, declared_type)?;
    verify_exif_clean(&out)?;
    Ok(out)
}

fn encode_surface(surface: RgbaImage, declared_type: &str) -> Result<Vec<u8>, SanitizeError> {
    let mut out = Vec::new();
    let encode_err =
        |e: image::ImageError| SanitizeError::encode(format!("no se pudo guardar la imagen limpia: {e}"));

    match output_media_type(declared_type) {
        "image/jpeg" => {
            let rgb = DynamicImage::ImageRgba8(surface).to_rgb8();
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))
                .map_err(encode_err)?;
        }
        "image/webp" => {
            // El codificador webp del crate image es solo sin pérdida.
            surface
                .write_with_encoder(WebPEncoder::new_lossless(&mut out))
                .map_err(encode_err)?;
        }
        "image/gif" => {
            DynamicImage::ImageRgba8(surface)
                .write_to(&mut Cursor::new(&mut out), ImageFormat::Gif)
                .map_err(encode_err)?;
        }
        "image/bmp" => {
            DynamicImage::ImageRgba8(surface)
                .write_to(&mut Cursor::new(&mut out), ImageFormat::Bmp)
                .map_err(encode_err)?;
        }
        _ => {
            surface
                .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
                .map_err(encode_err)?;
        }
    }
    Ok(out)
}

/// Comprueba que la imagen re-codificada carece de campos EXIF legibles.
fn verify_exif_clean(bytes: &[u8]) -> Result<(), SanitizeError> {
    let mut cursor = Cursor::new(bytes);
    match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) if exif.fields().next().is_none() => Ok(()),
        Ok(_) => Err(SanitizeError::encode(
            "la verificación indicó que la metadata no se eliminó correctamente",
        )),
        Err(exif::Error::NotFound(_))
        | Err(exif::Error::BlankValue(_))
        | Err(exif::Error::InvalidFormat(_)) => Ok(()),
        Err(exif::Error::Io(err)) => Err(SanitizeError::Io(err)),
        Err(other) => Err(SanitizeError::encode(format!(
            "error verificando metadata EXIF: {other}"
        ))),
    }
}

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const GLYPH_ADVANCE: u32 = 6;

/// Compone la marca "sanitized" con baja opacidad en la esquina superior
/// izquierda, a partir de una tabla de glifos de 5x7 empotrada.
fn blend_watermark(surface: &mut RgbaImage) {
    let (origin_x, origin_y) = WATERMARK_ORIGIN;
    let mut pen_x = origin_x;
    for ch in WATERMARK_TEXT.chars() {
        let Some(rows) = glyph(ch) else {
            pen_x += GLYPH_ADVANCE;
            continue;
        };
        for (dy, row) in rows.iter().enumerate() {
            for dx in 0..GLYPH_WIDTH {
                if row & (0b10000 >> dx) == 0 {
                    continue;
                }
                let x = pen_x + dx;
                let y = origin_y + dy as u32;
                if x < surface.width() && y < surface.height() {
                    darken_pixel(surface, x, y);
                }
            }
        }
        pen_x += GLYPH_ADVANCE;
    }
}

/// Mezcla el píxel hacia negro con la opacidad de la marca de agua.
fn darken_pixel(surface: &mut RgbaImage, x: u32, y: u32) {
    let pixel = surface.get_pixel_mut(x, y);
    for channel in &mut pixel.0[..3] {
        *channel = (*channel as f32 * (1.0 - WATERMARK_ALPHA)).round() as u8;
    }
}

fn glyph(ch: char) -> Option<[u8; GLYPH_HEIGHT as usize]> {
    match ch {
        's' => Some([0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110]),
        'a' => Some([0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
        'n' => Some([0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001]),
        'i' => Some([0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b11111]),
        't' => Some([0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
        'z' => Some([0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111]),
        'e' => Some([0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111]),
        'd' => Some([0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tipo_de_salida_desconocido_cae_en_png() {
        assert_eq!(output_media_type("image/tiff"), "image/png");
        assert_eq!(output_media_type("image/jpeg"), "image/jpeg");
    }

    #[test]
    fn la_marca_de_agua_oscurece_pixeles() {
        let mut surface = RgbaImage::from_pixel(64, 32, image::Rgba([200, 200, 200, 255]));
        blend_watermark(&mut surface);
        let marked = surface
            .pixels()
            .filter(|p| p.0[0] < 200)
            .count();
        assert!(marked > 0, "la marca debería tocar al menos un píxel");
        // El canal alfa no se altera.
        assert!(surface.pixels().all(|p| p.0[3] == 255));
    }
}
