//! Static asset resolution.
//!
//! A request is treated as a static asset request when the final segment
//! of its path has a `.` followed by a non-empty extension. Such requests
//! never reach the router.
//!
//! The request path is joined onto the public directory as-is (no percent
//! decoding). Paths containing `..` are refused.

use std::path::{Component, Path, PathBuf};

use http::header::{HeaderValue, LAST_MODIFIED};
use http::StatusCode;
use portico_core::{DispatchError, Response, ResponseExt};

use crate::config::PublicDir;

/// Returns the extension of the final path segment, without the dot.
///
/// ```rust
/// use portico_server::static_files::extension_of;
///
/// assert_eq!(extension_of("/css/app.min.css"), Some("css"));
/// assert_eq!(extension_of("/v1.2/users"), None);
/// assert_eq!(extension_of("/trailing."), None);
/// ```
#[must_use]
pub fn extension_of(path: &str) -> Option<&str> {
    let last = path.rsplit('/').next().unwrap_or(path);
    let (_, extension) = last.rsplit_once('.')?;
    (!extension.is_empty()).then_some(extension)
}

/// Returns `true` if `path` should be served from the public directory.
#[must_use]
pub fn is_static_request(path: &str) -> bool {
    extension_of(path).is_some()
}

/// Serves `request_path` from `public_dir`.
///
/// Checks run in order: the path has an extension, a public directory is
/// configured, the extension is allowed, the file can be read.
///
/// # Errors
///
/// Returns the [`DispatchError`] for the first failing check. Every read
/// failure, including a refused traversal, is reported as
/// [`DispatchError::FileNotFound`].
pub async fn serve(
    public_dir: Option<&PublicDir>,
    request_path: &str,
) -> Result<Response, DispatchError> {
    let extension = extension_of(request_path).ok_or(DispatchError::NoExtension)?;
    let public_dir = public_dir.ok_or(DispatchError::PublicDirMissing)?;

    if !public_dir.allowed_extensions().allows(extension) {
        return Err(DispatchError::ExtensionNotAllowed {
            extension: extension.to_string(),
        });
    }

    let Some(file_path) = resolve_path(public_dir.path(), request_path) else {
        tracing::warn!(path = %request_path, "Refusing path outside the public directory");
        return Err(DispatchError::FileNotFound { source: None });
    };

    let contents = tokio::fs::read(&file_path)
        .await
        .map_err(|e| DispatchError::FileNotFound { source: Some(e) })?;

    let mut response = Response::bytes(StatusCode::OK, detect_mime_type(extension), contents);

    if let Ok(modified) = tokio::fs::metadata(&file_path)
        .await
        .and_then(|metadata| metadata.modified())
    {
        if let Ok(value) = HeaderValue::from_str(&httpdate::fmt_http_date(modified)) {
            response.headers_mut().insert(LAST_MODIFIED, value);
        }
    }

    Ok(response)
}

/// Joins `request_path` onto `root`, refusing anything that is not a plain
/// relative path.
fn resolve_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');

    let mut resolved = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(name) => resolved.push(name),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(resolved)
}

/// Known extensions and their `Content-Type`. Anything else is served as
/// `application/octet-stream`.
const MIME_TYPES: &[(&str, &str)] = &[
    ("html", "text/html; charset=utf-8"),
    ("htm", "text/html; charset=utf-8"),
    ("css", "text/css; charset=utf-8"),
    ("js", "text/javascript; charset=utf-8"),
    ("mjs", "text/javascript; charset=utf-8"),
    ("json", "application/json"),
    ("txt", "text/plain; charset=utf-8"),
    ("xml", "application/xml"),
    ("svg", "image/svg+xml"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("ico", "image/x-icon"),
    ("woff2", "font/woff2"),
    ("woff", "font/woff"),
    ("pdf", "application/pdf"),
    ("wasm", "application/wasm"),
];

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

fn detect_mime_type(extension: &str) -> &'static str {
    MIME_TYPES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(extension))
        .map_or(FALLBACK_MIME_TYPE, |&(_, mime)| mime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AllowedExtensions;
    use http::header::CONTENT_TYPE;
    use portico_core::read_body;
    use std::fs;
    use tempfile::TempDir;

    /// public/
    ///   site.css, app.js, logo.png
    ///   docs/index.html
    fn public_fixture() -> TempDir {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("site.css"), "h1 { margin: 0 }").unwrap();
        fs::write(root.path().join("app.js"), "export {};").unwrap();
        fs::write(root.path().join("logo.png"), [0x89_u8, 0x50, 0x4e, 0x47]).unwrap();

        fs::create_dir(root.path().join("docs")).unwrap();
        fs::write(root.path().join("docs/index.html"), "<p>docs</p>").unwrap();
        root
    }

    #[test]
    fn test_classification() {
        assert!(is_static_request("/app.js"));
        assert!(is_static_request("/assets/v2/logo.png"));
        assert!(is_static_request("/.env"));
        assert!(!is_static_request("/"));
        assert!(!is_static_request("/users/1"));
        assert!(!is_static_request("/v1.0/users"));
        assert!(!is_static_request("/file."));
    }

    #[test]
    fn test_resolve_path_rejects_traversal() {
        let root = Path::new("/srv/public");
        assert_eq!(
            resolve_path(root, "/css/app.css"),
            Some(PathBuf::from("/srv/public/css/app.css"))
        );
        assert_eq!(
            resolve_path(root, "/./app.css"),
            Some(PathBuf::from("/srv/public/app.css"))
        );
        assert!(resolve_path(root, "/../etc/passwd.txt").is_none());
        assert!(resolve_path(root, "/css/../../secret.txt").is_none());
    }

    #[test]
    fn test_detect_mime_type() {
        assert_eq!(detect_mime_type("js"), "text/javascript; charset=utf-8");
        assert_eq!(detect_mime_type("JPEG"), "image/jpeg");
        assert_eq!(detect_mime_type("env"), FALLBACK_MIME_TYPE);
    }

    #[tokio::test]
    async fn test_serve_existing_file() {
        let dir = public_fixture();
        let public = PublicDir::new(dir.path(), AllowedExtensions::Any);

        let response = serve(Some(&public), "/site.css").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/css; charset=utf-8"
        );
        assert!(response.headers().contains_key(LAST_MODIFIED));

        let (_, body) = read_body(response).await;
        assert_eq!(body, "h1 { margin: 0 }");
    }

    #[tokio::test]
    async fn test_serve_nested_file() {
        let dir = public_fixture();
        let public = PublicDir::new(dir.path(), AllowedExtensions::Any);

        let response = serve(Some(&public), "/docs/index.html").await.unwrap();
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        let (_, body) = read_body(response).await;
        assert_eq!(body, "<p>docs</p>");
    }

    #[tokio::test]
    async fn test_serve_binary_file() {
        let dir = public_fixture();
        let public = PublicDir::new(dir.path(), AllowedExtensions::only(["png"]));

        let response = serve(Some(&public), "/logo.png").await.unwrap();
        let (_, body) = read_body(response).await;
        assert_eq!(body.to_vec(), vec![0x89_u8, 0x50, 0x4e, 0x47]);
    }

    #[tokio::test]
    async fn test_missing_public_dir() {
        let err = serve(None, "/app.js").await.unwrap_err();
        assert!(matches!(err, DispatchError::PublicDirMissing));
    }

    #[tokio::test]
    async fn test_no_extension() {
        let err = serve(None, "/users").await.unwrap_err();
        assert!(matches!(err, DispatchError::NoExtension));
    }

    #[tokio::test]
    async fn test_extension_not_allowed() {
        let dir = public_fixture();
        let public = PublicDir::new(dir.path(), AllowedExtensions::only(["css"]));

        let err = serve(Some(&public), "/app.js").await.unwrap_err();
        assert!(matches!(err, DispatchError::ExtensionNotAllowed { ref extension } if extension == "js"));
    }

    #[tokio::test]
    async fn test_file_not_found() {
        let dir = public_fixture();
        let public = PublicDir::new(dir.path(), AllowedExtensions::Any);

        let err = serve(Some(&public), "/missing.css").await.unwrap_err();
        assert!(matches!(err, DispatchError::FileNotFound { source: Some(_) }));
    }

    #[tokio::test]
    async fn test_traversal_is_not_found() {
        let dir = public_fixture();
        let public = PublicDir::new(dir.path().join("docs"), AllowedExtensions::Any);

        let err = serve(Some(&public), "/../site.css").await.unwrap_err();
        assert!(matches!(err, DispatchError::FileNotFound { source: None }));
    }
}
