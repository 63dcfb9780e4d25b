pub mod files;

pub use files::{ensure_dir, read_file, read_json, write_json};
