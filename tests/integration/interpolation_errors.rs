//! Interpolation failures and environment lookups through the full resolver.

use super::test_utils::with_env;
use hpxconf::overrides::parse_overrides;
use hpxconf::{ConfigError, MemoryLoader, Resolver, Value};
use tempfile::TempDir;

fn era5(extra: &str) -> MemoryLoader {
    MemoryLoader::new()
        .with(
            "data/era5",
            &format!(
                "defaults:\n  - module: coupled\nnside: 32\ncube_dim: ${{data.nside}}\n{}",
                extra
            ),
        )
        .with(
            "data/module/coupled",
            "# @package _group_\nbatch_size: 16\nsrc_directory: ${data.src_directory}\n",
        )
}

#[test]
fn test_unresolved_reference_in_default_names_merged_key() {
    let loader = era5("");
    match Resolver::new(&loader).resolve("data/era5") {
        Err(ConfigError::UnresolvedInterpolation {
            document,
            key,
            expression,
        }) => {
            assert_eq!(document, "data/era5");
            assert_eq!(key, "module.src_directory");
            assert_eq!(expression, "${data.src_directory}");
        }
        other => panic!("expected UnresolvedInterpolation, got {:?}", other),
    }
}

#[test]
fn test_reference_satisfied_by_root_body() {
    let loader = era5("src_directory: /datasets/era5\n");
    let cfg = Resolver::new(&loader).resolve("data/era5").unwrap();
    assert_eq!(cfg.get_str("module.src_directory"), Some("/datasets/era5"));
}

#[test]
fn test_reference_satisfied_by_override() {
    let loader = era5("");
    let overrides = parse_overrides(&["+src_directory=/scratch/era5"]).unwrap();
    let cfg = Resolver::new(&loader)
        .resolve_with_overrides("data/era5", &overrides)
        .unwrap();
    assert_eq!(cfg.get_str("module.src_directory"), Some("/scratch/era5"));
}

#[test]
fn test_override_value_is_interpolated() {
    let loader = era5("src_directory: /datasets/era5\n");
    let overrides = parse_overrides(&["++dst_directory=${data.src_directory}/hpx${nside}"]).unwrap();
    let cfg = Resolver::new(&loader)
        .resolve_with_overrides("data/era5", &overrides)
        .unwrap();
    assert_eq!(cfg.get_str("dst_directory"), Some("/datasets/era5/hpx32"));
}

#[test]
fn test_invalid_overrides_are_rejected() {
    let loader = era5("src_directory: /datasets/era5\n");
    let resolver = Resolver::new(&loader);

    for raw in ["gap=6h", "+nside=64", "~prefix"] {
        let overrides = parse_overrides(&[raw]).unwrap();
        let err = resolver
            .resolve_with_overrides("data/era5", &overrides)
            .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidOverride { .. }),
            "{} should be rejected, got {:?}",
            raw,
            err
        );
    }
    assert!(parse_overrides(&["nside"]).is_err());
}

#[test]
fn test_unknown_resolver_is_invalid() {
    let loader = MemoryLoader::new().with("data/era5", "nside: ${oc.select:nside,32}\n");
    let err = Resolver::new(&loader).resolve("data/era5").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidInterpolation { ref key, .. } if key == "nside"));
}

#[test]
fn test_cycle_spanning_documents() {
    let loader = MemoryLoader::new()
        .with("data/era5", "defaults:\n  - scaling: hpx32\nnside: ${cube_dim}\n")
        .with("data/scaling/hpx32", "cube_dim: ${nside}\n");
    match Resolver::new(&loader).resolve("data/era5") {
        Err(ConfigError::InterpolationCycle { chain, .. }) => {
            assert_eq!(chain.first(), chain.last());
            assert!(chain.len() >= 3);
        }
        other => panic!("expected InterpolationCycle, got {:?}", other),
    }
}

#[test]
fn test_escaped_expression_stays_literal() {
    let loader = MemoryLoader::new().with("data/era5", "template: \"\\\\${nside}\"\nnside: 32\n");
    let cfg = Resolver::new(&loader).resolve("data/era5").unwrap();
    assert_eq!(cfg.get_str("template"), Some("${nside}"));
}

#[test]
fn test_env_resolver_reads_process_environment() {
    let loader = MemoryLoader::new().with(
        "data/era5",
        "src_directory: ${oc.env:HPXCONF_IT_DATA_ROOT}/era5\nscratch: ${oc.env:HPXCONF_IT_SCRATCH,/tmp}\nworkers: ${oc.env:HPXCONF_IT_WORKERS}\n",
    );
    let temp = TempDir::new().unwrap();
    let cfg = with_env(
        &temp,
        &[
            ("HPXCONF_IT_DATA_ROOT", Some("/lustre/dlwp")),
            ("HPXCONF_IT_SCRATCH", None),
            ("HPXCONF_IT_WORKERS", Some("8")),
        ],
        || Resolver::new(&loader).resolve("data/era5").unwrap(),
    );
    assert_eq!(cfg.get_str("src_directory"), Some("/lustre/dlwp/era5"));
    assert_eq!(cfg.get_str("scratch"), Some("/tmp"));
    assert_eq!(cfg.get("workers"), Some(&Value::from("8")), "env values are strings");
}
