//! Static HTML pages written into the bucket by the index job.

use askama::Template;
use pypicache_core::PackageName;

/// One anchor on a generated page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IndexLink {
    pub href: String,
    pub text: String,
}

impl IndexLink {
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
        }
    }
}

/// `flat.html`: every stored file.
#[derive(Template)]
#[template(path = "flat.html")]
pub(crate) struct FlatIndex<'a> {
    pub links: &'a [IndexLink],
}

/// `packages/{first}/{package}/index.html`.
#[derive(Template)]
#[template(path = "package_page.html")]
pub(crate) struct PackagePage<'a> {
    pub package: &'a PackageName,
    pub links: &'a [IndexLink],
}

/// Top-level `index.html`.
#[derive(Template)]
#[template(path = "bucket_index.html")]
pub(crate) struct BucketIndex<'a> {
    pub packages: &'a [IndexLink],
}
