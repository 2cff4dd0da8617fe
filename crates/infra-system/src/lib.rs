// Zipper Infrastructure - System Adapters
// Implements: Fetcher (reqwest), Packager (zip)

pub mod filename;
pub mod http_fetcher;
pub mod zip_packager;

pub use http_fetcher::{FetchSettings, HttpFetcher};
pub use zip_packager::ZipPackager;
