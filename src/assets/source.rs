use std::path::{Path, PathBuf};

use anyhow::Context as _;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::foundation::error::{ShortreelError, ShortreelResult};
use crate::project::model::{ImageRef, ImageSource};

/// Normalize a project-relative path.
///
/// Uses `/` separators, drops `.` segments and rejects parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> ShortreelResult<String> {
    let s = source.replace('\\', "/");
    if s.is_empty() {
        return Err(ShortreelError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(ShortreelError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(ShortreelError::validation("asset path must contain a file name"));
    }
    Ok(out.join("/"))
}

/// Resolve a path source against `root`. Absolute paths are used as-is.
pub(crate) fn resolve_path(path: &Path, root: &Path) -> ShortreelResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let norm = normalize_rel_path(&path.to_string_lossy())?;
    Ok(root.join(norm))
}

/// Decoder input for a speech reference.
///
/// URLs pass through untouched; relative paths resolve against `root` the way image paths do.
pub fn resolve_audio_input(audio: &str, root: &Path) -> ShortreelResult<String> {
    if audio.contains("://") {
        return Ok(audio.to_owned());
    }
    let path = resolve_path(Path::new(audio), root)?;
    Ok(path.to_string_lossy().into_owned())
}

/// Split a `data:<mime>;base64,<payload>` URL into its mime type and decoded bytes.
pub fn decode_data_url(url: &str) -> ShortreelResult<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| ShortreelError::asset("data URL must start with 'data:'"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ShortreelError::asset("data URL is missing the ',' separator"))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| ShortreelError::asset("only base64 data URLs are supported"))?;
    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|e| ShortreelError::asset(format!("invalid base64 payload in data URL: {e}")))?;
    Ok((mime.to_owned(), bytes))
}

/// Encode bytes as a base64 data URL.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

/// Read the encoded bytes behind an image source.
pub fn read_image_bytes(source: &ImageSource, root: &Path) -> ShortreelResult<Vec<u8>> {
    match source {
        ImageSource::Path(path) => {
            let p = resolve_path(path, root)?;
            let bytes =
                std::fs::read(&p).with_context(|| format!("read image '{}'", p.display()))?;
            Ok(bytes)
        }
        ImageSource::DataUrl(url) => Ok(decode_data_url(url)?.1),
    }
}

/// Turn uploaded bytes into an addressable image (a data URL).
///
/// The bytes must be a format the `image` crate recognizes.
pub fn import_image_bytes(bytes: &[u8], name: Option<&str>) -> ShortreelResult<ImageRef> {
    let format = image::guess_format(bytes)
        .map_err(|e| ShortreelError::asset(format!("unrecognized image format: {e}")))?;
    let mime = format.to_mime_type();
    Ok(ImageRef {
        source: ImageSource::DataUrl(encode_data_url(mime, bytes)),
        name: name.map(str::to_owned),
    })
}

/// Read an image file and import it as a data URL.
pub fn import_image_file(path: &Path) -> ShortreelResult<ImageRef> {
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
    import_image_bytes(&bytes, name.as_deref())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
