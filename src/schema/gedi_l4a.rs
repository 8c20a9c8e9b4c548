//! GEDI L4A footprint biomass product schema.
//!
//! Lists every variable extracted from a beam, grouped by kind and source
//! location, with the fill sentinels each field uses.

use super::{ExtractionSchema, VariableSet};
use crate::constants::{
    ALGORITHM_INDICES, BYTE_FILL_SENTINEL, FLOAT_FILL_SENTINEL, GROUP_AGBD_PREDICTION,
    GROUP_GEOLOCATION, GROUP_LAND_COVER_DATA,
};
use crate::error::Result;

/// Per-shot variables stored directly under each beam
const TOP_LEVEL_INTEGERS: &[&str] = &[
    "algorithm_run_flag",
    "beam",
    "channel",
    "degrade_flag",
    "l2_quality_flag",
    "l4_quality_flag",
    "master_int",
    "predictor_limit_flag",
    "response_limit_flag",
    "selected_algorithm",
    "selected_mode",
    "selected_mode_flag",
    "surface_flag",
];

const TOP_LEVEL_FLOATS: &[&str] = &[
    "agbd",
    "agbd_pi_lower",
    "agbd_pi_upper",
    "agbd_se",
    "agbd_t",
    "agbd_t_se",
    "delta_time",
    "elev_lowestmode",
    "lat_lowestmode",
    "lon_lowestmode",
    "master_frac",
    "sensitivity",
    "solar_elevation",
];

const TOP_LEVEL_STRINGS: &[&str] = &["shot_number", "predict_stratum"];

/// Top-level biomass estimates that use the float sentinel
const TOP_LEVEL_FLOAT_FILLED: &[&str] = &[
    "agbd",
    "agbd_pi_lower",
    "agbd_pi_upper",
    "agbd_se",
    "agbd_t",
    "agbd_t_se",
];

/// Limit flags that use the byte sentinel, top level and per algorithm
const LIMIT_FLAGS: &[&str] = &["predictor_limit_flag", "response_limit_flag"];

const PREDICTION_INTEGER_BASES: &[&str] = &[
    "algorithm_run_flag",
    "l2_quality_flag",
    "l4_quality_flag",
    "predictor_limit_flag",
    "response_limit_flag",
    "selected_mode",
    "selected_mode_flag",
];

const PREDICTION_FLOAT_BASES: &[&str] = &[
    "agbd",
    "agbd_pi_lower",
    "agbd_pi_upper",
    "agbd_se",
    "agbd_t",
    "agbd_t_pi_lower",
    "agbd_t_pi_upper",
    "agbd_t_se",
];

const GEOLOCATION_FLOAT_BASES: &[&str] = &[
    "elev_lowestmode",
    "lat_lowestmode",
    "lon_lowestmode",
    "sensitivity",
];

const LAND_COVER_INTEGERS: &[&str] = &[
    "landsat_water_persistence",
    "leaf_off_doy",
    "leaf_off_flag",
    "leaf_on_cycle",
    "leaf_on_doy",
    "pft_class",
    "region_class",
    "urban_focal_window_size",
    "urban_proportion",
];

/// Expand base names into their `_a<N>` algorithm variants
pub fn per_algorithm(bases: &[&str]) -> Vec<String> {
    bases
        .iter()
        .flat_map(|base| {
            ALGORITHM_INDICES
                .iter()
                .map(move |index| format!("{}_a{}", base, index))
        })
        .collect()
}

/// Variables stored directly under each beam group
pub fn top_level() -> Result<VariableSet> {
    VariableSet::new(
        TOP_LEVEL_INTEGERS.iter().copied(),
        TOP_LEVEL_FLOATS.iter().copied(),
        TOP_LEVEL_STRINGS.iter().copied(),
    )?
    .with_float_fill(TOP_LEVEL_FLOAT_FILLED, FLOAT_FILL_SENTINEL)?
    .with_byte_fill(LIMIT_FLAGS, BYTE_FILL_SENTINEL)
}

/// Per-algorithm biomass predictions under `agbd_prediction`
pub fn agbd_prediction() -> Result<VariableSet> {
    let floats = per_algorithm(PREDICTION_FLOAT_BASES);
    VariableSet::new(
        per_algorithm(PREDICTION_INTEGER_BASES),
        floats.clone(),
        Vec::<String>::new(),
    )?
    .with_float_fill(&floats, FLOAT_FILL_SENTINEL)?
    .with_byte_fill(per_algorithm(LIMIT_FLAGS), BYTE_FILL_SENTINEL)
}

/// Per-algorithm lowest mode geolocation under `geolocation`
pub fn geolocation() -> Result<VariableSet> {
    VariableSet::new(
        ["stale_return_flag"],
        per_algorithm(GEOLOCATION_FLOAT_BASES),
        Vec::<String>::new(),
    )
}

/// Ancillary land cover layers under `land_cover_data`
pub fn land_cover_data() -> Result<VariableSet> {
    VariableSet::new(
        LAND_COVER_INTEGERS.iter().copied(),
        ["landsat_treecover"],
        Vec::<String>::new(),
    )
}

impl ExtractionSchema {
    /// Full GEDI L4A extraction schema
    pub fn gedi_l4a() -> Result<Self> {
        ExtractionSchema::new(top_level()?)
            .with_group(GROUP_AGBD_PREDICTION, agbd_prediction()?)?
            .with_group(GROUP_GEOLOCATION, geolocation()?)?
            .with_group(GROUP_LAND_COVER_DATA, land_cover_data()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnRegistry, FillKind, FillValue, VariableKind};
    use std::collections::BTreeSet;

    fn sorted(names: Vec<&str>) -> Vec<String> {
        let mut names: Vec<String> = names.into_iter().map(String::from).collect();
        names.sort();
        names
    }

    #[test]
    fn test_per_algorithm_expansion() {
        assert_eq!(
            per_algorithm(&["agbd"]),
            vec![
                "agbd_a1", "agbd_a2", "agbd_a3", "agbd_a4", "agbd_a5", "agbd_a6", "agbd_a10"
            ]
        );
    }

    #[test]
    fn test_group_sizes() {
        assert_eq!(top_level().unwrap().len(), 28);
        assert_eq!(agbd_prediction().unwrap().len(), 105);
        assert_eq!(geolocation().unwrap().len(), 29);
        assert_eq!(land_cover_data().unwrap().len(), 10);
    }

    #[test]
    fn test_registry_has_no_collisions() {
        let schema = ExtractionSchema::gedi_l4a().unwrap();
        let registry = ColumnRegistry::build(&schema).unwrap();
        assert_eq!(registry.len(), 28 + 105 + 29 + 10);

        let names = registry.names();
        assert_eq!(&names[..3], &["agbd", "agbd_pi_lower", "agbd_pi_upper"]);
        assert_eq!(names.last(), Some(&"urban_proportion"));

        let spec = registry.get("urban_proportion").unwrap();
        assert_eq!(spec.source_path, "land_cover_data/urban_proportion");
        assert_eq!(spec.kind, VariableKind::Integer);
    }

    #[test]
    fn test_float_fill_columns_match_product_list() {
        let registry = ColumnRegistry::build(&ExtractionSchema::gedi_l4a().unwrap()).unwrap();

        let mut expected: Vec<String> = TOP_LEVEL_FLOAT_FILLED
            .iter()
            .map(|s| s.to_string())
            .collect();
        expected.extend(per_algorithm(PREDICTION_FLOAT_BASES));
        expected.sort();

        assert_eq!(sorted(registry.fill_columns(FillKind::Float)), expected);
        assert_eq!(expected.len(), 62);
    }

    #[test]
    fn test_byte_fill_columns_match_product_list() {
        let registry = ColumnRegistry::build(&ExtractionSchema::gedi_l4a().unwrap()).unwrap();

        let expected = sorted(vec![
            "predictor_limit_flag",
            "predictor_limit_flag_a1",
            "predictor_limit_flag_a10",
            "predictor_limit_flag_a2",
            "predictor_limit_flag_a3",
            "predictor_limit_flag_a4",
            "predictor_limit_flag_a5",
            "predictor_limit_flag_a6",
            "response_limit_flag",
            "response_limit_flag_a1",
            "response_limit_flag_a10",
            "response_limit_flag_a2",
            "response_limit_flag_a3",
            "response_limit_flag_a4",
            "response_limit_flag_a5",
            "response_limit_flag_a6",
        ]);
        assert_eq!(sorted(registry.fill_columns(FillKind::Byte)), expected);
    }

    #[test]
    fn test_fill_columns_are_declared_with_matching_kind() {
        let schema = ExtractionSchema::gedi_l4a().unwrap();
        let registry = ColumnRegistry::build(&schema).unwrap();

        let float_vars: BTreeSet<&String> = std::iter::once(schema.top_level())
            .chain(schema.groups().iter().map(|(_, vars)| vars))
            .flat_map(|vars| vars.float_variables())
            .collect();
        let integer_vars: BTreeSet<&String> = std::iter::once(schema.top_level())
            .chain(schema.groups().iter().map(|(_, vars)| vars))
            .flat_map(|vars| vars.integer_variables())
            .collect();

        for name in registry.fill_columns(FillKind::Float) {
            assert!(float_vars.contains(&name.to_string()), "{} not a float variable", name);
        }
        for name in registry.fill_columns(FillKind::Byte) {
            assert!(integer_vars.contains(&name.to_string()), "{} not an integer variable", name);
        }
    }

    #[test]
    fn test_coordinates_are_not_filled() {
        let registry = ColumnRegistry::build(&ExtractionSchema::gedi_l4a().unwrap()).unwrap();
        assert_eq!(registry.get("lat_lowestmode").unwrap().fill, None);
        assert_eq!(
            registry.get("agbd_t_pi_upper_a10").unwrap().fill,
            Some(FillValue::Float(FLOAT_FILL_SENTINEL))
        );
    }
}
