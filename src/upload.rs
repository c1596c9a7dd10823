//! Multipart upload handling
//!
//! Accepts one file part plus a destination directory (query string, or
//! the `path` form field as fallback) and persists the bytes under the
//! base name of the client filename. Missing file or missing destination
//! is a silent no-op: the form page comes back with no message at all.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Extension, Multipart, Query};
use axum::response::Html;
use log::{error, info, warn};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use tokio::fs;

use crate::config::Config;
use crate::error::UploadError;
use crate::models::{UploadMeta, UploadQuery};
use crate::paths;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html>
  <body>
    <form action="/upload" method="post" enctype="multipart/form-data">
      Select any file to upload:<br/>
      <input type="file" name="file" id="file"><br/>
      <input type="text" name="path" value="" id="path"><br/>
      <input type="submit" value="Upload" name="submit">
    </form>
"#;

pub fn form_page(fragment: &str) -> String {
    format!("{}{}  </body>\n</html>\n", PAGE_HEAD, fragment)
}

pub fn generate_filename() -> String {
    let mut rng = thread_rng();

    (0..10)
        .map(|_| rng.sample(Alphanumeric) as char)
        .collect::<String>()
}

pub async fn post_upload(
    Query(query): Query<UploadQuery>,
    Extension(cfg): Extension<Arc<Config>>,
    mut multipart: Multipart,
) -> Html<String> {
    let mut file_part: Option<(UploadMeta, Bytes)> = None;
    let mut form_dir: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                warn!("malformed multipart request: {}", err);
                break;
            }
        };

        if field.file_name().is_some() {
            if file_part.is_some() {
                // Only the first file part counts; the rest are drained.
                continue;
            }
            let field_name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().unwrap_or_default().to_string();
            match field.bytes().await {
                Ok(bytes) => {
                    let meta = UploadMeta {
                        field: field_name,
                        file_name,
                        size: bytes.len(),
                    };
                    file_part = Some((meta, bytes));
                }
                Err(err) => warn!("discarding file part '{}': {}", file_name, err),
            }
        } else if field.name() == Some("path") {
            match field.text().await {
                Ok(text) => form_dir = Some(text),
                Err(err) => warn!("discarding path field: {}", err),
            }
        }
    }

    let (meta, bytes) = match file_part {
        Some(part) => part,
        None => return Html(form_page("")),
    };
    let dest_dir = match query.path.or(form_dir) {
        Some(dir) => dir,
        None => return Html(form_page("")),
    };

    let stored_name = match paths::base_name(&meta.file_name) {
        "" => generate_filename(),
        name => name.to_string(),
    };

    match store(&cfg, &dest_dir, &stored_name, &bytes).await {
        Ok(dest) => {
            info!(
                "stored '{}' at '{}' ({} bytes)",
                stored_name,
                dest.display(),
                meta.size
            );
            Html(form_page(&format!(
                "The file '{}' has been uploaded to '{}'.<br/>\n",
                stored_name,
                dest.display()
            )))
        }
        Err(err) => {
            error!("upload of '{}' failed: {}", meta.file_name, err);
            let shown_dest = match &err {
                UploadError::Path(_) => format!("{}{}", dest_dir, stored_name),
                UploadError::Write { dest, .. } => dest.display().to_string(),
            };
            Html(form_page(&format!(
                "Can't upload '{}' file to '{}'.<br/>\n<pre>{:#?}</pre>\n",
                meta.file_name, shown_dest, meta
            )))
        }
    }
}

/// Writes the buffered bytes to the composed destination, overwriting
/// silently. The destination's parent directory is never created here;
/// a missing one surfaces as a write failure.
async fn store(cfg: &Config, dir: &str, name: &str, bytes: &[u8]) -> Result<PathBuf, UploadError> {
    let dest = paths::compose_destination(&cfg.serve_root, dir, name, cfg.path_mode)?;
    fs::write(&dest, bytes).await.map_err(|source| UploadError::Write {
        dest: dest.clone(),
        source,
    })?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PathError;
    use crate::paths::PathMode;
    use std::env;
    use std::fs as std_fs;
    use std::process;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static FIXTURE_SEQ: AtomicUsize = AtomicUsize::new(0);

    fn fixture_config(tag: &str, mode: PathMode) -> Config {
        let seq = FIXTURE_SEQ.fetch_add(1, Ordering::SeqCst);
        let root = env::temp_dir().join(format!(
            "dropshelf-upload-{}-{}-{}",
            process::id(),
            tag,
            seq
        ));
        let _ = std_fs::remove_dir_all(&root);
        std_fs::create_dir_all(&root).unwrap();
        let mut cfg = Config::default();
        cfg.serve_root = root;
        cfg.path_mode = mode;
        cfg
    }

    #[tokio::test]
    async fn stored_bytes_match_the_source_stream() {
        let cfg = fixture_config("roundtrip", PathMode::Strict);
        std_fs::create_dir(cfg.serve_root.join("incoming")).unwrap();
        let payload = b"%PDF-1.4 not really a pdf \x00\x01\x02";

        let dest = store(&cfg, "incoming/", "report.pdf", payload).await.unwrap();

        assert_eq!(dest, cfg.serve_root.join("incoming").join("report.pdf"));
        assert_eq!(std_fs::read(&dest).unwrap(), payload);
        std_fs::remove_dir_all(&cfg.serve_root).ok();
    }

    #[tokio::test]
    async fn existing_destination_is_overwritten() {
        let cfg = fixture_config("overwrite", PathMode::Strict);
        std_fs::write(cfg.serve_root.join("report.pdf"), b"old contents").unwrap();

        let dest = store(&cfg, "", "report.pdf", b"new").await.unwrap();

        assert_eq!(std_fs::read(&dest).unwrap(), b"new");
        std_fs::remove_dir_all(&cfg.serve_root).ok();
    }

    #[tokio::test]
    async fn permissive_mode_honors_absolute_destinations() {
        let cfg = fixture_config("absolute", PathMode::Permissive);
        let dir = format!("{}/", cfg.serve_root.canonicalize().unwrap().display());

        let dest = store(&cfg, &dir, "report.pdf", b"bytes").await.unwrap();

        assert_eq!(dest.display().to_string(), format!("{}report.pdf", dir));
        assert_eq!(std_fs::read(&dest).unwrap(), b"bytes");
        std_fs::remove_dir_all(&cfg.serve_root).ok();
    }

    #[tokio::test]
    async fn missing_destination_directory_is_a_write_failure() {
        let cfg = fixture_config("missing-dir", PathMode::Strict);

        let err = store(&cfg, "nowhere/", "report.pdf", b"bytes").await.unwrap_err();

        assert!(matches!(err, UploadError::Write { .. }));
        std_fs::remove_dir_all(&cfg.serve_root).ok();
    }

    #[tokio::test]
    async fn strict_mode_refuses_traversal_destinations() {
        let cfg = fixture_config("traversal", PathMode::Strict);

        let err = store(&cfg, "../escape/", "report.pdf", b"bytes").await.unwrap_err();

        assert!(matches!(err, UploadError::Path(PathError::Traversal(_))));
        std_fs::remove_dir_all(&cfg.serve_root).ok();
    }

    #[test]
    fn generated_fallback_names_are_alphanumeric() {
        let name = generate_filename();
        assert_eq!(name.len(), 10);
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn form_page_wraps_fragments() {
        let page = form_page("The file 'a' has been uploaded to 'b'.<br/>\n");
        assert!(page.contains("enctype=\"multipart/form-data\""));
        assert!(page.contains("has been uploaded"));
        assert!(page.ends_with("</html>\n"));
    }
}
