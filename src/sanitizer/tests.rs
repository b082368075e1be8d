use std::io::{Cursor, Read, Write};

use image::RgbaImage;
use lopdf::{Document, Object, Stream, dictionary};
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use super::audio::sanitize_mp3;
use super::container::sanitize_mp4;
use super::image::sanitize_image;
use super::office::sanitize_docx;
use super::pdf::sanitize_pdf;

fn plain_box(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = ((8 + payload.len()) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(kind);
    out.extend_from_slice(payload);
    out
}

/// Contenedor MP4 de muestra: ftyp + moov(mvhd + trak(tkhd + udta)) + mdat.
/// El udta queda anidado a dos niveles dentro de moov.
fn sample_mp4_with_udta() -> Vec<u8> {
    let udta = plain_box(b"udta", b"\x00\x00\x00\x0Cmeta_autoria");
    let tkhd = plain_box(b"tkhd", &[0x11; 24]);
    let mut trak_payload = tkhd;
    trak_payload.extend_from_slice(&udta);
    let trak = plain_box(b"trak", &trak_payload);

    let mvhd = plain_box(b"mvhd", &[0x22; 20]);
    let mut moov_payload = mvhd;
    moov_payload.extend_from_slice(&trak);
    let moov = plain_box(b"moov", &moov_payload);

    let mut out = plain_box(b"ftyp", b"isom\x00\x00\x02\x00isomiso2");
    out.extend_from_slice(&moov);
    out.extend_from_slice(&plain_box(b"mdat", &[0x33; 40]));
    out
}

/// Recorre las cajas de un rango y devuelve sus tipos, validando que cada
/// tamaño declarado consuma exactamente su porción del rango.
fn collect_box_kinds(bytes: &[u8], kinds: &mut Vec<String>) {
    let mut pos = 0;
    while pos + 8 <= bytes.len() {
        let size = u32::from_be_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
            as usize;
        let kind = String::from_utf8_lossy(&bytes[pos + 4..pos + 8]).to_string();
        assert!(size >= 8, "tamaño declarado menor que la cabecera en {kind}");
        assert!(
            pos + size <= bytes.len(),
            "la caja {kind} declara {size} bytes y desborda el rango"
        );
        if matches!(kind.as_str(), "moov" | "trak" | "mdia") {
            collect_box_kinds(&bytes[pos + 8..pos + size], kinds);
        }
        kinds.push(kind);
        pos += size;
    }
    assert_eq!(pos, bytes.len(), "quedaron bytes sueltos tras la última caja");
}

#[test]
fn mp4_elimina_udta_anidado_y_recalcula_tamanos() {
    let original = sample_mp4_with_udta();
    let cleaned = sanitize_mp4(&original);

    let mut kinds = Vec::new();
    collect_box_kinds(&cleaned, &mut kinds);
    assert!(!kinds.iter().any(|k| k == "udta"), "udta debería desaparecer");
    assert!(kinds.iter().any(|k| k == "moov"));
    assert!(kinds.iter().any(|k| k == "trak"));
    assert!(kinds.iter().any(|k| k == "mdat"));
    assert!(cleaned.len() < original.len());
}

#[test]
fn mp4_saneado_es_idempotente() {
    let cleaned = sanitize_mp4(&sample_mp4_with_udta());
    let again = sanitize_mp4(&cleaned);
    assert_eq!(again, cleaned, "la segunda pasada debe ser byte a byte idéntica");
}

#[test]
fn mp4_conserva_mdat_byte_a_byte() {
    let original = sample_mp4_with_udta();
    let cleaned = sanitize_mp4(&original);
    let mdat = plain_box(b"mdat", &[0x33; 40]);
    assert!(
        cleaned
            .windows(mdat.len())
            .any(|window| window == &mdat[..]),
        "el mdat no debe alterarse"
    );
}

#[test]
fn mp3_con_id3v2_y_id3v1_conserva_solo_los_frames() {
    // Cabecera ID3v2 declarando 10 bytes de cuerpo.
    let mut bytes = vec![0x49, 0x44, 0x33, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0A];
    bytes.extend_from_slice(&[0xBB; 10]);

    let frames: Vec<u8> = vec![0xFF, 0xFB, 0x90, 0x00, 0x01, 0x02, 0x03, 0x04];
    bytes.extend_from_slice(&frames);

    let mut id3v1 = vec![0x54, 0x41, 0x47];
    id3v1.extend_from_slice(&[0x00; 125]);
    bytes.extend_from_slice(&id3v1);

    assert_eq!(sanitize_mp3(&bytes), frames);
}

#[test]
fn mp3_con_tag_ape_como_sufijo_lo_recorta() {
    let frames: Vec<u8> = vec![0xFF, 0xFB, 0x90, 0x00, 0xAA, 0xBB];
    let mut bytes = frames.clone();

    // Tag APE de 48 bytes en total (16 de items + 32 de pie); el campo de
    // tamaño del pie ya incluye al pie.
    bytes.extend_from_slice(&[0x01; 16]);
    let mut footer = [0_u8; 32];
    footer[0..8].copy_from_slice(b"APETAGEX");
    footer[12..16].copy_from_slice(&48_u32.to_le_bytes());
    bytes.extend_from_slice(&footer);

    assert_eq!(sanitize_mp3(&bytes), frames);
}

#[test]
fn mp3_sin_tags_queda_identico() {
    let frames: Vec<u8> = vec![0xFF, 0xFB, 0x90, 0x00, 0x10, 0x20, 0x30];
    assert_eq!(sanitize_mp3(&frames), frames);
}

fn sample_docx() -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::<'_, ()>::default();

    writer.start_file("[Content_Types].xml", options).unwrap();
    writer
        .write_all(b"<?xml version=\"1.0\"?><Types/>")
        .unwrap();

    writer.start_file("docProps/core.xml", options).unwrap();
    writer
        .write_all(b"<cp:coreProperties><dc:creator>Autor Prueba</dc:creator></cp:coreProperties>")
        .unwrap();

    writer.start_file("docProps/app.xml", options).unwrap();
    writer
        .write_all(b"<Properties><Application>Microsoft Word</Application></Properties>")
        .unwrap();

    writer.start_file("word/document.xml", options).unwrap();
    writer
        .write_all(b"<w:document><w:body><w:p>Hola</w:p></w:body></w:document>")
        .unwrap();

    writer.finish().unwrap().into_inner()
}

#[test]
fn docx_pierde_docprops_y_conserva_el_documento() {
    let cleaned = sanitize_docx(&sample_docx()).expect("el docx de muestra debería sanearse");

    let mut archive = ZipArchive::new(Cursor::new(&cleaned[..])).expect("zip limpio inválido");
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();

    assert!(
        !names.iter().any(|n| n.starts_with("docProps/")),
        "quedaron entradas de docProps: {names:?}"
    );
    assert!(names.iter().any(|n| n == "word/document.xml"));

    let mut contents = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    assert!(contents.contains("Hola"), "el contenido del documento debe quedar intacto");
}

#[test]
fn docx_invalido_reporta_fallo_de_decodificacion() {
    let result = sanitize_docx(b"esto no es un zip");
    assert!(result.is_err());
}

#[test]
fn docx_saneado_se_puede_escribir_y_reabrir() -> Result<(), Box<dyn std::error::Error>> {
    let cleaned = sanitize_docx(&sample_docx())?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("limpio.docx");
    std::fs::write(&path, &cleaned)?;

    let archive = ZipArchive::new(std::fs::File::open(&path)?)?;
    assert!(archive.len() >= 2);
    Ok(())
}

fn sample_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let metadata_id = doc.add_object(Object::Stream(Stream::new(
        dictionary! { "Type" => "Metadata", "Subtype" => "XML" },
        b"<x:xmpmeta/>".to_vec(),
    )));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "Metadata" => metadata_id,
    });

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Informe interno"),
        "Author" => Object::string_literal("Autor Prueba"),
        "Producer" => Object::string_literal("Procesador Prueba"),
    });

    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::string_literal("id-original-a"),
            Object::string_literal("id-original-b"),
        ]),
    );

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("serialización del PDF de muestra");
    out
}

#[test]
fn pdf_pierde_info_id_y_metadata_del_catalogo() {
    let cleaned = sanitize_pdf(&sample_pdf()).expect("el PDF de muestra debería sanearse");

    let reloaded = Document::load_mem(&cleaned).expect("el PDF limpio debe reabrirse");
    assert!(reloaded.trailer.get(b"Info").is_err(), "el trailer conserva Info");
    assert!(reloaded.trailer.get(b"ID").is_err(), "el trailer conserva ID");

    let catalog = reloaded.catalog().expect("el catálogo debe seguir accesible");
    assert!(catalog.get(b"Metadata").is_err(), "el catálogo conserva Metadata");
}

#[test]
fn pdf_invalido_reporta_fallo_de_decodificacion() {
    assert!(sanitize_pdf(b"%PDF-roto").is_err());
}

fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let surface = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x * 7 % 256) as u8, (y * 11 % 256) as u8, 120, 255])
    });
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(surface)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .expect("codificación del PNG de muestra");
    out
}

#[test]
fn imagen_conserva_dimensiones_tras_sanear() {
    let original = sample_png(33, 17);
    let cleaned = sanitize_image(&original, "image/png", true)
        .expect("la imagen de muestra debería sanearse");
    let decoded = image::load_from_memory(&cleaned).expect("el PNG limpio debe decodificarse");
    assert_eq!((decoded.width(), decoded.height()), (33, 17));
}

#[test]
fn imagen_sin_marca_conserva_los_pixeles() {
    let original = sample_png(16, 16);
    let cleaned = sanitize_image(&original, "image/png", false).unwrap();
    let before = image::load_from_memory(&original).unwrap().to_rgba8();
    let after = image::load_from_memory(&cleaned).unwrap().to_rgba8();
    assert_eq!(before.as_raw(), after.as_raw());
}

#[test]
fn imagen_jpeg_se_recodifica_sin_exif() {
    let original = sample_png(24, 24);
    // Tipo declarado jpeg: la salida debe ser un JPEG decodificable.
    let cleaned = sanitize_image(&original, "image/jpeg", true).unwrap();
    let format = image::guess_format(&cleaned).expect("formato de salida reconocible");
    assert_eq!(format, image::ImageFormat::Jpeg);
    let decoded = image::load_from_memory(&cleaned).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (24, 24));
}

#[test]
fn imagen_corrupta_reporta_fallo_de_decodificacion() {
    assert!(sanitize_image(b"no es una imagen", "image/png", true).is_err());
}
