//! The same cache-aside flows run against every bundled store

mod common;

use cacheaside::{
    BoundedStore, BoundedStoreConfig, CacheOptions, Cacher, Context, EncodedStore, EvictionPolicy,
    MemoryStore, Store,
};
use common::keys;
use serde::{Deserialize, Serialize};
use serial_test::serial;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    id: u32,
    name: String,
    tags: Vec<String>,
}

fn profile(key: &str) -> Profile {
    Profile {
        id: key.len() as u32,
        name: key.to_uppercase(),
        tags: vec!["loaded".to_string()],
    }
}

fn load_profile(
    key: String,
) -> std::future::Ready<Result<Option<Profile>, std::io::Error>> {
    let found = (key != "missing").then(|| profile(&key));
    std::future::ready(Ok(found))
}

fn load_profiles(
    keys: HashSet<String>,
) -> std::future::Ready<Result<HashMap<String, Profile>, std::io::Error>> {
    let found = keys
        .into_iter()
        .filter(|k| k != "missing")
        .map(|k| {
            let value = profile(&k);
            (k, value)
        })
        .collect();
    std::future::ready(Ok(found))
}

async fn exercise<S: Store<Profile>>(store: S) {
    let cacher = Cacher::new(store);
    let ctx = Context::background();

    let mut dest = Profile {
        id: 0,
        name: String::new(),
        tags: Vec::new(),
    };
    assert!(cacher
        .get(&ctx, "ann", &mut dest, Some(&load_profile), None)
        .await
        .unwrap());
    assert_eq!(dest, profile("ann"));
    assert!(!cacher
        .get(&ctx, "missing", &mut dest, Some(&load_profile), None)
        .await
        .unwrap());

    let mut batch = HashMap::new();
    cacher
        .mget(
            &ctx,
            &keys(&["ann", "bob", "missing"]),
            &mut batch,
            Some(&load_profiles),
            None,
        )
        .await
        .unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch["bob"], profile("bob"));

    let report = cacher
        .exists(&ctx, &keys(&["ann", "bob", "missing"]))
        .await
        .unwrap();
    assert_eq!(
        report,
        HashMap::from([
            ("ann".to_string(), true),
            ("bob".to_string(), true),
            ("missing".to_string(), false),
        ])
    );

    assert_eq!(cacher.mdelete(&ctx, &keys(&["ann", "bob"])).await.unwrap(), 2);
    assert!(!cacher.get(&ctx, "ann", &mut dest, None, None).await.unwrap());
}

#[tokio::test]
async fn test_memory_store_flow() {
    exercise(MemoryStore::new()).await;
}

#[tokio::test]
async fn test_bounded_store_flow() {
    exercise(BoundedStore::lru(16)).await;
}

#[tokio::test]
async fn test_encoded_store_flow() {
    exercise(EncodedStore::json(MemoryStore::<Vec<u8>>::new())).await;
}

#[tokio::test]
async fn test_bounded_store_evicts_behind_cacher() {
    let config = BoundedStoreConfig::builder()
        .limit(2)
        .policy(EvictionPolicy::FIFO)
        .build()
        .unwrap();
    let cacher = Cacher::new(BoundedStore::<Profile>::new(config));
    let ctx = Context::background();

    let mut batch = HashMap::new();
    for key in ["a", "b", "c"] {
        cacher
            .mget(&ctx, &keys(&[key]), &mut batch, Some(&load_profiles), None)
            .await
            .unwrap();
    }

    assert_eq!(cacher.store().len(), 2);
    let report = cacher.exists(&ctx, &keys(&["a", "b", "c"])).await.unwrap();
    assert!(!report["a"]);
    assert!(report["b"] && report["c"]);
}

/// Entries written with a TTL disappear once it elapses
#[tokio::test]
#[serial]
async fn test_written_entries_expire() {
    let cacher = Cacher::new(MemoryStore::<Profile>::new());
    let ctx = Context::background();
    let opts = CacheOptions::with_ttl(Duration::from_millis(50));

    let mut dest = profile("");
    cacher
        .get(&ctx, "eve", &mut dest, Some(&load_profile), Some(&opts))
        .await
        .unwrap();
    assert!(cacher.get(&ctx, "eve", &mut dest, None, None).await.unwrap());

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(!cacher.get(&ctx, "eve", &mut dest, None, None).await.unwrap());
}

/// Zero TTL everywhere means the entry never expires
#[tokio::test]
#[serial]
async fn test_zero_ttl_never_expires() {
    let cacher = Cacher::new(BoundedStore::<Profile>::lru(4));
    let ctx = Context::background();

    let mut dest = profile("");
    cacher
        .get(&ctx, "eve", &mut dest, Some(&load_profile), None)
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(cacher.get(&ctx, "eve", &mut dest, None, None).await.unwrap());
}
