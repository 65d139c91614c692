use std::path::PathBuf;

pub fn default_source_root() -> PathBuf {
    PathBuf::from("src")
}

pub fn default_out_dir() -> PathBuf {
    PathBuf::from("out")
}

pub fn default_extension() -> String {
    "ts".to_string()
}

pub fn default_write_bundle_info() -> bool {
    true
}
