//! Application constants for the GEDI L4A extractor
//!
//! Naming conventions, fill sentinels and column names shared by the
//! schema, the pipeline stages and the CLI.

// =============================================================================
// Granule Layout and Naming
// =============================================================================

/// Top-level keys starting with this prefix are beam groups
pub const BEAM_PREFIX: &str = "BEAM";

/// Every GEDI granule filename starts with this instrument prefix
pub const GRANULE_FILENAME_PREFIX: &str = "GEDI";

/// Standard HDF5 file extension used by GEDI granules
pub const GRANULE_FILENAME_EXTENSION: &str = ".h5";

/// Sub-group holding the per-algorithm biomass predictions
pub const GROUP_AGBD_PREDICTION: &str = "agbd_prediction";

/// Sub-group holding the per-algorithm geolocation of the lowest mode
pub const GROUP_GEOLOCATION: &str = "geolocation";

/// Sub-group holding the ancillary land cover layers
pub const GROUP_LAND_COVER_DATA: &str = "land_cover_data";

/// Algorithm setting groups reported per shot (a7-a9 are not produced)
pub const ALGORITHM_INDICES: &[u8] = &[1, 2, 3, 4, 5, 6, 10];

// =============================================================================
// Fill Sentinels
// =============================================================================

/// Fill value used by floating point L4A fields
pub const FLOAT_FILL_SENTINEL: f64 = -9999.0;

/// Fill value used by unsigned byte flag fields
pub const BYTE_FILL_SENTINEL: i64 = 255;

// =============================================================================
// Output Columns
// =============================================================================

/// Latitude of the lowest mode, required for every emitted row
pub const LATITUDE_COLUMN: &str = "lat_lowestmode";

/// Longitude of the lowest mode, required for every emitted row
pub const LONGITUDE_COLUMN: &str = "lon_lowestmode";

/// Composite shot identifier
pub const SHOT_NUMBER_COLUMN: &str = "shot_number";

/// Columns derived from the shot number, in output order
pub mod shot_breakdown {
    pub const ORBIT_NUMBER: &str = "orbit_number";
    pub const BEAM_NUMBER: &str = "beam_number";
    pub const MINOR_FRAME_NUMBER: &str = "minor_frame_number";
    pub const SHOT_NUMBER_WITHIN_BEAM: &str = "shot_number_within_beam";

    /// Trailing digits holding the shot index within the beam
    pub const SHOT_INDEX_DIGITS: usize = 8;

    /// Digits holding the minor frame number
    pub const MINOR_FRAME_DIGITS: usize = 3;

    /// Digits holding the beam number
    pub const BEAM_DIGITS: usize = 2;

    /// Shortest shot number that still carries an orbit component
    pub const MIN_SHOT_NUMBER_DIGITS: usize =
        SHOT_INDEX_DIGITS + MINOR_FRAME_DIGITS + BEAM_DIGITS + 1;
}

// =============================================================================
// CSV Output
// =============================================================================

/// Decimal places written for floating point columns
pub const DEFAULT_FLOAT_PRECISION: usize = 6;

/// Largest precision that still changes the rendered value of an f64
pub const MAX_FLOAT_PRECISION: usize = 17;

/// Line terminator for every emitted CSV row
pub const CSV_LINE_TERMINATOR: &str = "\n";

// =============================================================================
// Configuration
// =============================================================================

/// Directory name under the user config dir
pub const CONFIG_DIR_NAME: &str = "gedi-l4a-extract";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable pointing at an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "GEDI_L4A_EXTRACT_CONFIG";
