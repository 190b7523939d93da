//! Per-item work: write an inline payload or GET a remote image into `dir`.
//!
//! Everything here is blocking and runs on `spawn_blocking`.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::CollisionPolicy;
use crate::control::CancelToken;
use crate::data_uri::{decode_payload, DataUriError};
use crate::extract::PayloadEncoding;
use crate::http::{is_success, perform, HttpOptions};
use crate::url_model::{derive_filename, fit_name, split_extension, truncate_bytes};

use super::DownloadError;

/// Suffix of the in-progress file for a remote download.
pub const TEMP_SUFFIX: &str = ".part";

/// Prefix of files written from inline payloads.
const INLINE_PREFIX: &str = "inline-";

/// Bytes of the final name reused in the hidden `.part` name.
const PART_STEM_MAX: usize = 64;

/// Upper bound on `name-N.ext` candidates tried under [`CollisionPolicy::Rename`].
const MAX_RENAME_ATTEMPTS: u32 = 10_000;

/// Turns the literal text of an inline record into file bytes.
pub fn decode_inline(text: &str, encoding: PayloadEncoding) -> Result<Vec<u8>, DataUriError> {
    match encoding {
        PayloadEncoding::Base64 => decode_payload(text, true),
        PayloadEncoding::PercentEncoded => decode_payload(text, false),
        PayloadEncoding::Markup => Ok(text.as_bytes().to_vec()),
    }
}

/// Writes an inline payload to a fresh, uniquely named `inline-XXXXXX.<ext>` in `dir`.
pub(super) fn write_inline(
    dir: &Path,
    extension: &str,
    text: &str,
    encoding: PayloadEncoding,
) -> Result<PathBuf, DownloadError> {
    if extension.is_empty() {
        return Err(DownloadError::Internal(
            "inline payload has no file extension".to_string(),
        ));
    }
    let bytes = decode_inline(text, encoding)?;
    let suffix = format!(".{extension}");
    let mut file = tempfile::Builder::new()
        .prefix(INLINE_PREFIX)
        .suffix(&suffix)
        .tempfile_in(dir)
        .map_err(|e| DownloadError::io(dir, e))?;
    file.write_all(&bytes)
        .map_err(|e| DownloadError::io(file.path(), e))?;
    let (_, path) = file
        .keep()
        .map_err(|e| DownloadError::io(dir, e.error))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote inline image");
    Ok(path)
}

/// GETs `url` into `dir`. The body streams into a hidden `.part` file that is
/// moved onto the final name only after a 2xx response; on any failure the
/// partial file is removed.
pub(super) fn fetch_remote(
    url: &str,
    extension_hint: &str,
    dir: &Path,
    http: &HttpOptions,
    collision: CollisionPolicy,
    cancel: &CancelToken,
) -> Result<PathBuf, DownloadError> {
    let name = derive_filename(url, extension_hint);
    let mut part = tempfile::Builder::new()
        .prefix(&format!(".{}.", truncate_bytes(&name, PART_STEM_MAX)))
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
        .map_err(|e| DownloadError::io(dir, e))?;

    let mut easy = http.easy(url)?;
    perform(&mut easy, Some(cancel), |chunk| part.write_all(chunk))?;

    let code = easy.response_code()?;
    if !is_success(code) {
        return Err(DownloadError::Http(code));
    }
    part.flush().map_err(|e| DownloadError::io(part.path(), e))?;

    let path = match collision {
        CollisionPolicy::Overwrite => {
            let target = dir.join(&name);
            if target.exists() {
                tracing::debug!(path = %target.display(), url, "overwriting existing file");
            }
            part.persist(&target)
                .map_err(|e| DownloadError::io(&target, e.error))?;
            target
        }
        CollisionPolicy::Rename => persist_unique(part, dir, &name)?,
    };
    tracing::debug!(path = %path.display(), url, "downloaded image");
    Ok(path)
}

/// Moves `part` onto `name`, or the first free `name-N.ext`, without replacing anything.
fn persist_unique(
    mut part: NamedTempFile,
    dir: &Path,
    name: &str,
) -> Result<PathBuf, DownloadError> {
    for n in 0..MAX_RENAME_ATTEMPTS {
        let candidate = dir.join(numbered_name(name, n));
        match part.persist_noclobber(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => part = e.file,
            Err(e) => return Err(DownloadError::io(&candidate, e.error)),
        }
    }
    Err(DownloadError::io(
        &dir.join(name),
        io::Error::new(io::ErrorKind::AlreadyExists, "no free file name"),
    ))
}

/// `cat.png`, 2 -> `cat-2.png`; `avatar`, 1 -> `avatar-1`. Zero keeps the name.
fn numbered_name(name: &str, n: u32) -> String {
    if n == 0 {
        return name.to_string();
    }
    match split_extension(name) {
        Some((stem, ext)) if !stem.is_empty() => fit_name(stem, &format!("-{n}.{ext}")),
        _ => fit_name(name, &format!("-{n}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn decode_inline_by_encoding() {
        assert_eq!(
            decode_inline("aGVsbG8=", PayloadEncoding::Base64).unwrap(),
            b"hello"
        );
        assert_eq!(
            decode_inline("%3Csvg%2F%3E", PayloadEncoding::PercentEncoded).unwrap(),
            b"<svg/>"
        );
        assert_eq!(
            decode_inline("<svg>%20</svg>", PayloadEncoding::Markup).unwrap(),
            b"<svg>%20</svg>"
        );
        assert!(decode_inline("***", PayloadEncoding::Base64).is_err());
    }

    #[test]
    fn write_inline_creates_unique_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_inline(dir.path(), "gif", "R0lGODlh", PayloadEncoding::Base64).unwrap();
        let b = write_inline(dir.path(), "gif", "R0lGODlh", PayloadEncoding::Base64).unwrap();
        assert_ne!(a, b);
        for path in [&a, &b] {
            assert_eq!(path.parent(), Some(dir.path()));
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            assert!(name.starts_with("inline-") && name.ends_with(".gif"), "{name}");
            assert_eq!(fs::read(path).unwrap(), b"GIF89a");
        }
    }

    #[test]
    fn write_inline_bad_payload_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_inline(dir.path(), "png", "@@@", PayloadEncoding::Base64).unwrap_err();
        assert!(matches!(err, DownloadError::Payload(_)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn write_inline_refuses_empty_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_inline(dir.path(), "", "R0lGODlh", PayloadEncoding::Base64).unwrap_err();
        assert!(matches!(err, DownloadError::Internal(_)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn write_inline_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = write_inline(&missing, "svg", "<svg/>", PayloadEncoding::Markup).unwrap_err();
        assert!(matches!(err, DownloadError::Io { .. }));
    }

    #[test]
    fn numbered_names() {
        assert_eq!(numbered_name("cat.png", 0), "cat.png");
        assert_eq!(numbered_name("cat.png", 2), "cat-2.png");
        assert_eq!(numbered_name("avatar", 1), "avatar-1");
        assert_eq!(numbered_name("archive.tar.gz", 1), "archive.tar-1.gz");

        let long = format!("{}.png", "a".repeat(251));
        let renamed = numbered_name(&long, 12);
        assert_eq!(renamed.len(), 255);
        assert!(renamed.ends_with("a-12.png"));
    }

    #[test]
    fn persist_unique_skips_taken_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cat.png"), b"first").unwrap();
        fs::write(dir.path().join("cat-1.png"), b"second").unwrap();

        let mut part = NamedTempFile::new_in(dir.path()).unwrap();
        part.write_all(b"third").unwrap();
        let path = persist_unique(part, dir.path(), "cat.png").unwrap();

        assert_eq!(path, dir.path().join("cat-2.png"));
        assert_eq!(fs::read(&path).unwrap(), b"third");
        assert_eq!(fs::read(dir.path().join("cat.png")).unwrap(), b"first");
    }
}
