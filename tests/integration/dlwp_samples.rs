//! Resolution of the DLWP HEALPix sample configs under tests/fixtures/conf.

use super::test_utils::fixture_root;
use hpxconf::{DatasetParams, FsLoader, Resolver, Value};

const EIGHT_VAR: &str = "data/era5_hpx32_8var_coupled";
const SST: &str = "data/era5_hpx32_sst_coupled";

#[test]
fn test_eight_var_dataset_preserves_literals() {
    let loader = FsLoader::new(fixture_root());
    let cfg = Resolver::new(&loader).resolve(EIGHT_VAR).unwrap();

    assert_eq!(cfg.package(), "data");
    assert_eq!(
        cfg.get_str_list("input_variables").unwrap(),
        vec!["z500", "tau300-700", "z1000", "t2m0", "tcwv0", "t850", "z250", "ws10"]
    );
    assert_eq!(cfg.get("output_variables"), Some(&Value::Null));
    assert_eq!(cfg.get_str("dataset_name"), Some("hpx32_1983-2017_3h_8varCoupled"));
    assert_eq!(cfg.get_str("prefix"), Some("era5_1deg_3h_HPX32_1979-2021_"));
    assert_eq!(cfg.get_str("suffix"), Some(""));
    assert_eq!(cfg.get_str("data_format"), Some("HPX"));
    assert_eq!(cfg.get_i64("input_time_dim"), Some(2));
    assert_eq!(cfg.get_i64("output_time_dim"), Some(2));
    assert_eq!(cfg.get_str("data_time_step"), Some("3h"));
    assert_eq!(cfg.get_str("time_step"), Some("6h"));
    assert_eq!(cfg.get_str("gap"), Some("6h"));
    assert_eq!(cfg.get_bool("add_insolation"), Some(true));
    assert_eq!(cfg.get_bool("prebuilt_dataset"), Some(true));
    assert_eq!(cfg.get_str("constants.lsm"), Some("lsm"));
    assert_eq!(cfg.get_str("constants.z"), Some("z"));
}

#[test]
fn test_cube_dim_resolves_to_nside() {
    let loader = FsLoader::new(fixture_root());
    let cfg = Resolver::new(&loader).resolve(EIGHT_VAR).unwrap();
    assert_eq!(cfg.get_i64("nside"), Some(32));
    assert_eq!(cfg.get("cube_dim"), Some(&Value::Int(32)));
    assert_eq!(cfg.get_i64("data.cube_dim"), Some(32), "package-qualified lookup");
}

#[test]
fn test_group_defaults_are_mounted_under_their_group() {
    let loader = FsLoader::new(fixture_root());
    let cfg = Resolver::new(&loader).resolve(EIGHT_VAR).unwrap();

    assert_eq!(cfg.get_i64("module.batch_size"), Some(16));
    assert_eq!(
        cfg.get_str("module.src_directory"),
        cfg.get_str("src_directory"),
        "module paths interpolate from the dataset"
    );
    assert_eq!(cfg.get_str("module.suffix"), Some(""));
    assert_eq!(cfg.get_f64("scaling.z500.mean"), Some(55255.0));
    assert_eq!(cfg.get_str("splits.train_date_start"), Some("1979-01-01"));

    let couplings = cfg.get_seq("module.couplings").unwrap();
    assert_eq!(couplings.len(), 1);
    assert_eq!(
        couplings[0].get_path(&["params".to_string(), "input_time_dim".to_string()]),
        Some(&Value::Int(2))
    );

    assert_eq!(
        cfg.sources(),
        &[
            "data/module/atmos_ConstantCoupling".to_string(),
            "data/scaling/hpx32".to_string(),
            "data/splits/default".to_string(),
            EIGHT_VAR.to_string(),
        ]
    );
}

#[test]
fn test_sst_dataset_preserves_literals() {
    let loader = FsLoader::new(fixture_root());
    let cfg = Resolver::new(&loader).resolve(SST).unwrap();

    assert_eq!(cfg.get_str_list("input_variables").unwrap(), vec!["sst"]);
    assert_eq!(cfg.get_str("time_step"), Some("48h"));
    assert_eq!(cfg.get_str("gap"), Some("48h"));
    assert_eq!(cfg.get_i64("cube_dim"), Some(32));
    assert_eq!(
        cfg.get_str_list("module.couplings.0.params.input_times").unwrap(),
        vec!["48h", "96h"]
    );
    assert!(!cfg.contains("constants.z"));
}

#[test]
fn test_sample_resolutions_are_independent() {
    let loader = FsLoader::new(fixture_root());
    let resolver = Resolver::new(&loader);
    let first = resolver.resolve(EIGHT_VAR).unwrap();
    let sst = resolver.resolve(SST).unwrap();
    let again = resolver.resolve(EIGHT_VAR).unwrap();

    assert_eq!(first, again);
    assert_ne!(first.get("input_variables"), sst.get("input_variables"));
}

#[test]
fn test_dataset_params_view() {
    let loader = FsLoader::new(fixture_root());
    let cfg = Resolver::new(&loader).resolve(EIGHT_VAR).unwrap();
    let params = DatasetParams::from_resolved(&cfg).unwrap();

    assert_eq!(params.nside, Some(32));
    assert_eq!(params.cube_dim, Some(32));
    assert_eq!(params.input_variables.len(), 8);
    assert_eq!(params.output_variables, None);
    assert_eq!(params.effective_output_variables(), params.input_variables.as_slice());
    assert_eq!(params.data_time_step.as_deref(), Some("3h"));
    assert!(params.extra.contains_key("module"));
    assert!(params.extra.contains_key("scaling"));
}

#[test]
fn test_training_root_mounts_dataset_under_data() {
    let loader = FsLoader::new(fixture_root());
    let cfg = Resolver::new(&loader).resolve("config").unwrap();

    assert_eq!(cfg.package(), "");
    assert_eq!(cfg.get_i64("data.cube_dim"), Some(32));
    assert_eq!(cfg.get_i64("nside"), Some(32));
    assert_eq!(cfg.get_i64("batch_size"), Some(16));
    assert_eq!(cfg.get_str("output_dir"), Some("outputs/hpx32_coupled_dlwp"));
    assert_eq!(cfg.get_str("data.module.dataset_name"), cfg.get_str("data.dataset_name"));
    assert!(!cfg.contains("input_variables"));
}

#[test]
fn test_training_root_override_swaps_dataset_values() {
    let loader = FsLoader::new(fixture_root());
    let overrides = hpxconf::overrides::parse_overrides(&["data.nside=64", "seed=7"]).unwrap();
    let cfg = Resolver::new(&loader)
        .resolve_with_overrides("config", &overrides)
        .unwrap();
    assert_eq!(cfg.get_i64("data.cube_dim"), Some(64));
    assert_eq!(cfg.get_i64("nside"), Some(64));
    assert_eq!(cfg.get_i64("seed"), Some(7));
}

#[test]
fn test_dataset_root_accepts_package_qualified_override() {
    let loader = FsLoader::new(fixture_root());
    let overrides = hpxconf::overrides::parse_overrides(&["data.nside=64"]).unwrap();
    let cfg = Resolver::new(&loader)
        .resolve_with_overrides("data/era5_hpx32_8var_coupled", &overrides)
        .unwrap();
    assert_eq!(cfg.get_i64("nside"), Some(64));
    assert_eq!(cfg.get_i64("cube_dim"), Some(64));
}
