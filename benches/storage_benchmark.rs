//! Performance benchmarks for key-value stores
//!
//! Measures reads and writes on the encrypted primary store and the
//! mirrored fallback, and a full session login/initialize cycle.
//! Run with: cargo bench

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sessionkit::adapters::mock::InMemoryBackend;
use sessionkit::adapters::{EncryptedFileStore, MirroredStore};
use sessionkit::session::{SessionStore, User};
use sessionkit::traits::KeyValueStore;
use tempfile::TempDir;

/// Pre-populate `store` with `count` entries.
fn fill(store: &dyn KeyValueStore, count: usize) {
    for i in 0..count {
        store
            .set(&format!("key-{}", i), format!("value-{}", i).into())
            .unwrap();
    }
}

fn bench_encrypted_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("encrypted_store");

    for count in [10, 100, 1000] {
        let dir = TempDir::new().unwrap();
        let store = EncryptedFileStore::open(dir.path(), "bench", Some("bench-key")).unwrap();
        fill(&store, count);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("get", count), &count, |b, _| {
            b.iter(|| black_box(store.get_string("key-0")))
        });
        group.bench_with_input(BenchmarkId::new("set", count), &count, |b, _| {
            // Alternate values so every set changes the image.
            let mut flip = false;
            b.iter(|| {
                flip = !flip;
                let token = if flip { "token-a" } else { "token-b" };
                store.set("auth_token", black_box(token).into()).unwrap()
            })
        });
    }

    group.finish();
}

fn bench_mirrored_store(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("mirrored_store");

    for count in [10, 100, 1000] {
        let store = runtime.block_on(MirroredStore::open(InMemoryBackend::new()));
        fill(&store, count);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("get", count), &count, |b, _| {
            b.iter(|| black_box(store.get_string("key-0")))
        });
        group.bench_with_input(BenchmarkId::new("set", count), &count, |b, _| {
            b.iter(|| store.set("auth_token", black_box("token").into()).unwrap())
        });
        runtime.block_on(store.flush()).unwrap();
    }

    group.finish();
}

fn bench_session_cycle(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let store: Arc<dyn KeyValueStore> =
        Arc::new(runtime.block_on(MirroredStore::open(InMemoryBackend::new())));
    let session = SessionStore::new(store);
    let user = User::new("1", "a@b.c", "A");

    c.bench_function("session_login_initialize_logout", |b| {
        b.iter(|| {
            session.login(user.clone(), "token").unwrap();
            session.initialize();
            black_box(session.is_authenticated());
            session.logout();
        })
    });
}

criterion_group!(
    benches,
    bench_encrypted_store,
    bench_mirrored_store,
    bench_session_cycle
);
criterion_main!(benches);
