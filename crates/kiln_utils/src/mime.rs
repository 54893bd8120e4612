use std::path::Path;

use mime::Mime;

/// Guesses the MIME type of an asset, first by extension and then by sniffing its bytes.
pub fn guess_mime(path: &Path, content: &[u8]) -> Mime {
  let by_extension = path.extension().and_then(|ext| ext.to_str()).and_then(|ext| {
    Some(match ext.to_ascii_lowercase().as_str() {
      "png" => mime::IMAGE_PNG,
      "jpg" | "jpeg" => mime::IMAGE_JPEG,
      "gif" => mime::IMAGE_GIF,
      "svg" => mime::IMAGE_SVG,
      "bmp" => mime::IMAGE_BMP,
      "css" => mime::TEXT_CSS_UTF_8,
      "txt" => mime::TEXT_PLAIN_UTF_8,
      "json" => mime::APPLICATION_JSON,
      "js" | "mjs" | "cjs" => mime::TEXT_JAVASCRIPT,
      "woff" => mime::FONT_WOFF,
      "woff2" => mime::FONT_WOFF2,
      _ => return None,
    })
  });
  if let Some(mime) = by_extension {
    return mime;
  }
  if let Some(kind) = infer::get(content) {
    if let Ok(mime) = kind.mime_type().parse::<Mime>() {
      return mime;
    }
  }
  if simdutf8::basic::from_utf8(content).is_ok() {
    mime::TEXT_PLAIN_UTF_8
  } else {
    mime::APPLICATION_OCTET_STREAM
  }
}

#[test]
fn test_guess_mime() {
  assert_eq!(guess_mime(Path::new("logo.png"), &[]), mime::IMAGE_PNG);
  assert_eq!(guess_mime(Path::new("a.unknown"), b"hello"), mime::TEXT_PLAIN_UTF_8);
  let png_header = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
  assert_eq!(guess_mime(Path::new("blob"), &png_header), mime::IMAGE_PNG);
  assert_eq!(guess_mime(Path::new("blob"), &[0xff, 0xfe, 0xfd]), mime::APPLICATION_OCTET_STREAM);
}
