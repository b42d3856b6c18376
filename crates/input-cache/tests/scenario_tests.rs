//! End-to-end scenarios for the production cache and its test double.

use actioncache_inputs::testing::FakeFileCache;
use actioncache_inputs::{
    ActionInput, ActionInputFileCache, CacheConfig, DigestFunction, Error, FileCache,
};
use std::fs;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

#[test]
fn scratch_input_roundtrip_and_size() {
    let tmp = TempDir::new().unwrap();
    let fake = FakeFileCache::new(tmp.path());
    let foo = ActionInput::new("foo.txt");

    let digest = fake.create_scratch_input(&foo, "hello").unwrap();

    assert_eq!(fake.input_for(&digest).unwrap(), foo);
    assert_eq!(fake.size_in_bytes(&foo).unwrap(), 5);
    assert_eq!(digest.size_bytes, 5);
    assert_eq!(digest, DigestFunction::Sha256.digest_bytes(b"hello"));
}

#[test]
fn duplicate_content_conflicts_in_production_only() {
    let tmp = TempDir::new().unwrap();
    let fake = FakeFileCache::new(tmp.path().join("fake"));
    let first = ActionInput::new("dup/one.txt");
    let second = ActionInput::new("dup/two.txt");

    let d1 = fake.create_scratch_input(&first, "dup").unwrap();
    let d2 = fake.create_scratch_input(&second, "dup").unwrap();
    assert_eq!(d1, d2);

    // The fake documents the relaxed rule: the digest now belongs to `second`.
    assert_eq!(fake.input_for(&d1).unwrap(), second);
    assert!(matches!(
        fake.digest_of(&first),
        Err(Error::UnknownInput { .. })
    ));

    let cache = FileCache::new(tmp.path().join("exec"), &CacheConfig::default()).unwrap();
    cache.record(&first, d1.clone()).unwrap();
    let err = cache.record(&second, d2).unwrap_err();
    assert!(matches!(err, Error::ConflictingDigest { .. }));
    assert_eq!(cache.input_for(&d1).unwrap(), first);
}

#[test]
fn size_reflects_deletion_after_successful_call() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("gen.o"), vec![0u8; 42]).unwrap();
    let cache = FileCache::new(tmp.path(), &CacheConfig::default()).unwrap();
    let input = ActionInput::new("gen.o");

    assert_eq!(cache.size_in_bytes(&input).unwrap(), 42);
    assert!(cache.is_regular_file(&input));

    fs::remove_file(tmp.path().join("gen.o")).unwrap();

    assert!(matches!(
        cache.size_in_bytes(&input),
        Err(Error::InputUnavailable { .. })
    ));
    assert!(!cache.is_regular_file(&input));
}

#[test]
fn size_tracks_lazily_materialized_file() {
    let tmp = TempDir::new().unwrap();
    let fake = FakeFileCache::new(tmp.path());
    let input = ActionInput::new("late/out.bin");

    assert!(!fake.is_regular_file(&input));
    assert!(fake.size_in_bytes(&input).is_err());

    fake.create_scratch_input(&input, "12345678").unwrap();
    assert_eq!(fake.size_in_bytes(&input).unwrap(), 8);

    fs::write(tmp.path().join("late/out.bin"), "1234").unwrap();
    assert_eq!(fake.size_in_bytes(&input).unwrap(), 4);
}

#[test]
fn unknown_keys_fail_in_both_variants() {
    let tmp = TempDir::new().unwrap();
    let fake = FakeFileCache::new(tmp.path());
    let config = CacheConfig {
        compute_on_demand: false,
        ..Default::default()
    };
    let cache = FileCache::new(tmp.path(), &config).unwrap();
    let never = ActionInput::new("never.txt");
    let digest = DigestFunction::Sha256.digest_bytes(b"never");

    let caches: [&dyn ActionInputFileCache; 2] = [&fake, &cache];
    for c in caches {
        assert!(matches!(c.digest_of(&never), Err(Error::UnknownInput { .. })));
        assert!(matches!(
            c.input_for(&digest),
            Err(Error::UnknownDigest { .. })
        ));
    }
}

#[test]
fn fake_seeded_from_real_digests_drives_production_lookups() {
    let tmp = TempDir::new().unwrap();
    let fake = FakeFileCache::new(tmp.path());
    let inputs: Vec<_> = (0..4)
        .map(|i| ActionInput::new(format!("src/file{i}.rs")))
        .collect();
    for (i, input) in inputs.iter().enumerate() {
        fake.create_scratch_input(input, format!("fn f{i}() {{}}"))
            .unwrap();
    }

    let cache = FileCache::new(tmp.path(), &CacheConfig::default()).unwrap();
    let computed = cache.digest_all(&inputs).unwrap();
    for (input, digest) in inputs.iter().zip(&computed) {
        assert_eq!(&fake.digest_of(input).unwrap(), digest);
        assert_eq!(&cache.input_for(digest).unwrap(), input);
        assert!(cache.is_available_locally(digest).unwrap());
    }
    assert_eq!(cache.registry().snapshot().len(), 4);
}

#[test]
fn concurrent_workers_share_one_cache() {
    let tmp = TempDir::new().unwrap();
    for i in 0..16 {
        fs::write(tmp.path().join(format!("in{i}")), format!("content {i}")).unwrap();
    }
    let cache = Arc::new(FileCache::new(tmp.path(), &CacheConfig::default()).unwrap());
    let inputs: Arc<Vec<_>> = Arc::new(
        (0..16)
            .map(|i| ActionInput::new(format!("in{i}")))
            .collect(),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let inputs = Arc::clone(&inputs);
            thread::spawn(move || {
                for input in inputs.iter() {
                    let digest = cache.digest_of(input).unwrap();
                    assert_eq!(&cache.input_for(&digest).unwrap(), input);
                    assert!(cache.size_in_bytes(input).unwrap() > 0);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(cache.registry().len(), 16);
}
