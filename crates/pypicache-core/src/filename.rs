//! Helpers that interpret distribution filenames.

use crate::error::ValidationError;
use crate::package::PackageName;

/// Fallback content type for unrecognized extensions.
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Extract the package name from a `<package>-<version>.<ext>` filename.
///
/// The package is everything before the first `-`, provided the remainder
/// contains a `.`. `requests-2.0.1.tar.gz` yields `requests`.
pub fn package_from_filename(filename: &str) -> Result<PackageName, ValidationError> {
    let unparseable = || ValidationError::UnparseableFilename(filename.to_string());
    let (package, rest) = filename.split_once('-').ok_or_else(unparseable)?;
    if !rest.contains('.') {
        return Err(unparseable());
    }
    PackageName::new(package).map_err(|_| unparseable())
}

/// Infer the response content type for a distribution file.
///
/// `.egg` files are zip archives and are served as `application/zip`.
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();

    match extension.as_str() {
        "gz" | "tgz" => "application/x-tar",
        "bz2" => "application/x-bzip2",
        "tar" => "application/x-tar",
        "zip" | "egg" => "application/zip",
        "exe" => "application/x-msdownload",
        "msi" => "application/x-msi",
        "rpm" => "application/x-rpm",
        "html" | "htm" => "text/html",
        "txt" => "text/plain",
        "json" => "application/json",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
