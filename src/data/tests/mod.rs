//! Loader tests against header/binary pairs written to a temporary directory.


use std::path::Path;

use tempfile::TempDir;

/// Header of a 5-line, 3-band, 10-sample float32 cube stored as `x_hist.img`.
pub(crate) const SCENE_HEADER: &str = "TYPE\nsamples = 10\nlines = 5\nbands = 3\ndata type = 4\ncat input files = x.img\ncat history =  hist\n";

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Create a temporary directory holding `file_name` with `bytes`.
pub(crate) fn dir_with_binary(file_name: &str, bytes: &[u8]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_file(dir.path(), file_name, bytes);
    dir
}

pub(crate) fn write_file(dir: &Path, file_name: &str, bytes: &[u8]) {
    std::fs::write(dir.join(file_name), bytes).expect("Failed to write test file");
}

/// Header text for a cube with the given layout.
pub(crate) fn header_text(
    samples: usize,
    lines: usize,
    bands: usize,
    data_type: i64,
    extra: &str,
) -> String {
    format!(
        "CRISM\nsamples = {}\nlines = {}\nbands = {}\ndata type = {}\ncat input files = cube.img\ncat history = _trr3\n{}",
        samples, lines, bands, data_type, extra
    )
}
