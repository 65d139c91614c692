//! Bundle output: in-memory bundle files, the bundle report and the writer.

pub mod bundle;
pub mod report;
pub mod writer;

pub use bundle::{BundleFile, SourceFragment};
pub use report::BundleData;
pub use writer::{write_bundle_files, write_report};
