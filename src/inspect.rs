//! File and directory inspection
//!
//! One handler, two independent query parameters. `file` streams a file's
//! raw bytes inside an `<xmp>` block; `dir` renders the recursive listing.
//! Both may be present and then both fragments land in the same body,
//! file view first. Failures are reported inline; the response itself is
//! always a success.

use std::sync::Arc;

use axum::extract::{Extension, Query};
use axum::response::Html;
use log::{error, warn};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::config::Config;
use crate::listing;
use crate::models::InspectQuery;
use crate::paths;

const READ_CHUNK: usize = 4096;

pub async fn get_inspect(
    Query(query): Query<InspectQuery>,
    Extension(cfg): Extension<Arc<Config>>,
) -> Html<Vec<u8>> {
    let mut body: Vec<u8> = Vec::new();

    if let Some(file) = query.file.as_deref() {
        body.extend_from_slice(format!("Content of '{}' file:", file).as_bytes());
        body.extend_from_slice(b"<xmp>");
        render_file_content(&cfg, file, &mut body).await;
        body.extend_from_slice(b"</xmp>");
    }

    if let Some(dir) = query.dir.as_deref() {
        body.extend_from_slice(
            format!("Files and folders in {}/{}:", cfg.serve_root.display(), dir).as_bytes(),
        );
        render_dir_listing(&cfg, dir, &mut body);
    }

    Html(body)
}

/// Appends the file's exact on-disk bytes, read in fixed-size chunks with
/// no transformation and no size limit. Anything that prevents reading a
/// regular file turns into the literal `Can't open` line instead.
async fn render_file_content(cfg: &Config, shown: &str, out: &mut Vec<u8>) {
    let path = match paths::resolve_target(&cfg.serve_root, shown, cfg.path_mode) {
        Ok(path) => path,
        Err(err) => {
            warn!("rejected file path '{}': {}", shown, err);
            push_cant_open(shown, out);
            return;
        }
    };

    if !path.is_file() {
        push_cant_open(shown, out);
        return;
    }

    match File::open(&path).await {
        Ok(mut file) => {
            let mut chunk = [0u8; READ_CHUNK];
            loop {
                match file.read(&mut chunk).await {
                    Ok(0) => break,
                    Ok(n) => out.extend_from_slice(&chunk[..n]),
                    Err(err) => {
                        error!("read of '{}' failed mid-stream: {}", path.display(), err);
                        break;
                    }
                }
            }
        }
        Err(err) => {
            warn!("can't open '{}': {}", path.display(), err);
            push_cant_open(shown, out);
        }
    }
}

fn render_dir_listing(cfg: &Config, dir: &str, out: &mut Vec<u8>) {
    match paths::resolve_target(&cfg.serve_root, dir, cfg.path_mode) {
        Ok(target) => out.extend_from_slice(listing::render_tree(&target, cfg.max_list_depth).as_bytes()),
        Err(err) => {
            warn!("rejected listing path '{}': {}", dir, err);
            out.extend_from_slice(format!("<ol>\n  <li>[skipped] {}</li>\n</ol>\n", err).as_bytes());
        }
    }
}

fn push_cant_open(shown: &str, out: &mut Vec<u8>) {
    out.extend_from_slice(format!("Can't open '{}' file", shown).as_bytes());
}
