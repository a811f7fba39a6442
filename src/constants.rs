//! Header key names and loader defaults.

/// Header key holding the verbatim first line (format tag).
pub const KEY_TYPE: &str = "type";

/// Header key naming the input file(s) the cube was derived from.
pub const KEY_CAT_INPUT_FILES: &str = "cat input files";

/// Header key holding the processing-history suffix of the binary file name.
pub const KEY_CAT_HISTORY: &str = "cat history";

/// Number of samples per line (fastest-varying axis).
pub const KEY_SAMPLES: &str = "samples";

/// Number of lines.
pub const KEY_LINES: &str = "lines";

/// Number of spectral bands.
pub const KEY_BANDS: &str = "bands";

/// Element type code (1..=11).
pub const KEY_DATA_TYPE: &str = "data type";

/// Byte order of the binary file (0 = little endian, 1 = big endian).
pub const KEY_BYTE_ORDER: &str = "byte order";

/// Per-band center wavelengths.
pub const KEY_WAVELENGTH: &str = "wavelength";

/// Per-band names.
pub const KEY_BAND_NAMES: &str = "band names";

/// Binary file extensions the loader recognizes.
pub const KNOWN_EXTENSIONS: &[&str] = &[".img"];

/// Brightness multiplier applied to 3-band composites when none is given.
pub const DEFAULT_BRIGHTNESS_MULTIPLIER: f32 = 5.0;
