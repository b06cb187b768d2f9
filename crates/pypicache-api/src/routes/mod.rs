//! # Route Modules
//!
//! - `index` — landing page, local simple index, upstream simple-page
//!   proxy, and local file listings.
//! - `packages` — file downloads through the cache and raw `PUT` uploads.
//! - `upload` — multipart package uploads and `requirements.txt` batch
//!   caching.

pub mod index;
pub mod packages;
pub mod upload;
