//! Employee document uploads.
//!
//! Files are written to the configured upload directory as
//! `{prefix}_{unix_millis}_{stem}.{ext}` and served read-only under
//! `/uploads`. Only the stored name is kept in the database.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rocket::fairing::AdHoc;
use rocket::fs::TempFile;
use rocket::tokio::fs;

use crate::config::AppConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Avatar,
    Contract,
    EmploymentDeclaration,
    Certification,
}

impl UploadKind {
    pub fn prefix(self) -> &'static str {
        match self {
            UploadKind::Avatar => "avatar",
            UploadKind::Contract => "contract",
            UploadKind::EmploymentDeclaration => "employment_declaration",
            UploadKind::Certification => "certification",
        }
    }
}

/// Keeps ASCII alphanumerics, `-` and `_`; everything else becomes `_`.
pub fn sanitize_stem(stem: &str) -> String {
    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

fn clean_extension(ext: &str) -> Option<String> {
    let ext = ext.trim().to_ascii_lowercase();
    (!ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .then_some(ext)
}

/// Builds the stored name from the client's file name.
///
/// `fallback_ext` is used when the client name carries no usable
/// extension, e.g. one derived from the part's content type.
pub fn stored_file_name(
    kind: UploadKind,
    raw_name: Option<&str>,
    fallback_ext: Option<&str>,
    millis: i64,
) -> String {
    // Clients may send a full path; only the last component matters.
    let base = raw_name
        .map(|name| name.rsplit(['/', '\\']).next().unwrap_or(name))
        .unwrap_or("");
    let path = Path::new(base);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(clean_extension)
        .or_else(|| fallback_ext.and_then(clean_extension))
        .unwrap_or_else(|| "bin".to_string());

    format!("{}_{}_{}.{}", kind.prefix(), millis, sanitize_stem(stem), ext)
}

/// Persists one uploaded part. Empty parts are ignored and yield `None`.
pub async fn store_upload(
    file: &mut TempFile<'_>,
    dir: &Path,
    kind: UploadKind,
) -> io::Result<Option<String>> {
    if file.len() == 0 {
        return Ok(None);
    }

    let raw_name = file
        .raw_name()
        .map(|name| name.dangerous_unsafe_unsanitized_raw().as_str().to_string());
    let fallback_ext = file
        .content_type()
        .and_then(|ct| ct.extension())
        .map(|ext| ext.as_str().to_string());

    let name = stored_file_name(
        kind,
        raw_name.as_deref(),
        fallback_ext.as_deref(),
        Utc::now().timestamp_millis(),
    );
    file.move_copy_to(dir.join(&name)).await?;
    info!("Stored {} upload as {}", kind.prefix(), name);
    Ok(Some(name))
}

/// Best-effort removal of files saved for a request that then failed.
pub async fn remove_uploads(dir: &Path, names: &[String]) {
    for name in names {
        if let Err(e) = fs::remove_file(dir.join(name)).await {
            warn!("Failed to remove orphaned upload {}: {}", name, e);
        }
    }
}

/// Creates the upload directory on ignition so the file server and the
/// upload handlers can rely on it.
pub fn upload_dir_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Upload Directory", |rocket| async {
        let dir: PathBuf = match rocket.state::<AppConfig>() {
            Some(config) => config.upload_dir.clone(),
            None => {
                error!("AppConfig is not managed; cannot prepare upload directory");
                return Err(rocket);
            }
        };
        match fs::create_dir_all(&dir).await {
            Ok(()) => {
                info!("Uploads stored in {}", dir.display());
                Ok(rocket)
            }
            Err(e) => {
                error!("Failed to create upload directory {}: {}", dir.display(), e);
                Err(rocket)
            }
        }
    })
}
