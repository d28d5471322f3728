//! Resolving independent roots from one loader on several threads.

use super::test_utils::fixture_root;
use hpxconf::{FsLoader, ResolvedConfig, Resolver};

const ROOTS: [&str; 3] = [
    "config",
    "data/era5_hpx32_8var_coupled",
    "data/era5_hpx32_sst_coupled",
];

#[test]
fn test_parallel_resolution_matches_sequential() {
    let loader = FsLoader::new(fixture_root());
    let resolver = Resolver::new(&loader);

    let sequential: Vec<ResolvedConfig> = ROOTS
        .iter()
        .map(|name| resolver.resolve(name).unwrap())
        .collect();

    let parallel: Vec<Vec<ResolvedConfig>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    ROOTS
                        .iter()
                        .map(|name| resolver.resolve(name).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for run in parallel {
        assert_eq!(run, sequential);
    }
}
