//! Granule filename handling.
//!
//! The filename guard runs before the source is opened or the destination
//! is touched. Full name decoding is informational only.

use crate::config::ExtractorConfig;
use crate::error::{Error, Result};

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

static GRANULE_NAME: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^GEDI(?P<level>\d{2})_(?P<sublevel>[A-Z])_(?P<year>\d{4})(?P<doy>\d{3})(?P<hour>\d{2})(?P<minute>\d{2})(?P<second>\d{2})_O(?P<orbit>\d{5})_(?P<granule>\d{2})_T(?P<track>\d{5})_(?P<ppds>\d{2})_(?P<pge>\d{3})_(?P<version>\d{2})_V(?P<release>\d{3})\.h5$",
    )
    .ok()
});

/// Check that the basename of `path` looks like a granule.
///
/// Fails with [`Error::InvalidGranuleName`] when the basename does not start
/// with the configured prefix or does not end with the configured extension.
pub fn validate_granule_name(path: &Path, config: &ExtractorConfig) -> Result<()> {
    let basename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::invalid_granule_name(path))?;

    if basename.starts_with(&config.filename_prefix)
        && basename.ends_with(&config.filename_extension)
    {
        Ok(())
    } else {
        Err(Error::invalid_granule_name(path))
    }
}

/// Fields encoded in a GEDI granule filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GranuleName {
    /// Product level, e.g. `04_A`
    pub product: String,
    pub start_time: DateTime<Utc>,
    pub orbit: u32,
    pub sub_orbit_granule: u8,
    pub track: u32,
    pub ppds_type: u8,
    pub pge_version: u16,
    pub granule_version: u8,
    pub release: u16,
}

impl GranuleName {
    /// Decode the basename of `path`; `None` when it does not follow the
    /// naming convention
    pub fn parse(path: &Path) -> Option<Self> {
        let basename = path.file_name()?.to_str()?;
        let caps = GRANULE_NAME.as_ref()?.captures(basename)?;
        let field = |name: &str| caps.name(name).map(|m| m.as_str());

        let year: i32 = field("year")?.parse().ok()?;
        let day_of_year: u32 = field("doy")?.parse().ok()?;
        let start_time = NaiveDate::from_yo_opt(year, day_of_year)?
            .and_hms_opt(
                field("hour")?.parse().ok()?,
                field("minute")?.parse().ok()?,
                field("second")?.parse().ok()?,
            )?
            .and_utc();

        Some(Self {
            product: format!("{}_{}", field("level")?, field("sublevel")?),
            start_time,
            orbit: field("orbit")?.parse().ok()?,
            sub_orbit_granule: field("granule")?.parse().ok()?,
            track: field("track")?.parse().ok()?,
            ppds_type: field("ppds")?.parse().ok()?,
            pge_version: field("pge")?.parse().ok()?,
            granule_version: field("version")?.parse().ok()?,
            release: field("release")?.parse().ok()?,
        })
    }
}

impl fmt::Display for GranuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "L{} orbit {} granule {} track {} acquired {} (release {:03})",
            self.product,
            self.orbit,
            self.sub_orbit_granule,
            self.track,
            self.start_time.format("%Y-%m-%d %H:%M:%S UTC"),
            self.release
        )
    }
}
