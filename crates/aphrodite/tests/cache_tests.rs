use aphrodite::bodies::Body;
use aphrodite::cache::{ManualClock, MemoCache, MemoryTransitStore, StoreError, TransitStore};
use aphrodite::chart::BirthInput;
use aphrodite::ephemeris::{
    EphemerisError, EphemerisProvider, GeoLocation, HousePositions, MeanMotionEphemeris,
    RawPosition, ResilientEphemeris,
};
use aphrodite::{ChartEngine, EngineConfig};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mean-motion provider that is slow on the Sun and counts Sun lookups, so one
/// count equals one natal computation.
#[derive(Default)]
struct SlowCountingProvider {
    sun_calls: AtomicUsize,
    inner: MeanMotionEphemeris,
}

impl EphemerisProvider for SlowCountingProvider {
    fn name(&self) -> &str {
        "slow-counting"
    }

    fn body_position(&self, jd: f64, body: Body) -> Result<RawPosition, EphemerisError> {
        if body == Body::Sun {
            self.sun_calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(50));
        }
        self.inner.body_position(jd, body)
    }

    fn houses(&self, jd: f64, location: GeoLocation) -> Result<HousePositions, EphemerisError> {
        self.inner.houses(jd, location)
    }
}

/// Store that is either down or hands back garbage.
#[derive(Default)]
struct BadStore {
    corrupt: bool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

#[async_trait]
impl TransitStore for BadStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.corrupt {
            Ok(Some("{\"date\": 42".to_string()))
        } else {
            Err(StoreError::Backend("connection refused".to_string()))
        }
    }

    async fn set_with_ttl(
        &self,
        _key: &str,
        _value: String,
        _ttl: std::time::Duration,
    ) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Backend("read-only replica".to_string()))
    }
}

fn start() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

fn birth() -> BirthInput {
    BirthInput::new(NaiveDate::from_ymd_opt(1990, 6, 15).unwrap())
        .with_time("08:30")
        .with_timezone("+08:00")
        .with_location(31.23, 121.47)
}

fn engine_with(provider: Arc<SlowCountingProvider>, clock: Arc<ManualClock>) -> ChartEngine {
    let config = EngineConfig {
        natal_ttl: std::time::Duration::from_secs(60),
        ..EngineConfig::default()
    };
    let store = Arc::new(MemoryTransitStore::new(clock.clone()));
    ChartEngine::with_parts(config, ResilientEphemeris::with_primary(provider), clock, store)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_natal_requests_compute_once() {
    let provider = Arc::new(SlowCountingProvider::default());
    let engine = engine_with(provider.clone(), Arc::new(ManualClock::new(start())));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.compute_natal_chart(&birth()).await })
        })
        .collect();

    let mut charts = Vec::new();
    for handle in handles {
        charts.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(provider.sun_calls.load(Ordering::SeqCst), 1);
    assert!(charts.windows(2).all(|w| w[0] == w[1]));
    let stats = engine.natal_cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.computations, 1);
    assert_eq!(stats.hits + stats.joins, 15);
}

#[tokio::test]
async fn test_natal_entry_expires_with_the_clock() {
    let provider = Arc::new(SlowCountingProvider::default());
    let clock = Arc::new(ManualClock::new(start()));
    let engine = engine_with(provider.clone(), clock.clone());

    engine.compute_natal_chart(&birth()).await.unwrap();
    clock.advance(Duration::seconds(59));
    engine.compute_natal_chart(&birth()).await.unwrap();
    assert_eq!(provider.sun_calls.load(Ordering::SeqCst), 1);

    clock.advance(Duration::seconds(2));
    engine.compute_natal_chart(&birth()).await.unwrap();
    assert_eq!(provider.sun_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_label_does_not_split_the_cache() {
    let provider = Arc::new(SlowCountingProvider::default());
    let engine = engine_with(provider.clone(), Arc::new(ManualClock::new(start())));

    let a = engine.compute_natal_chart(&birth()).await.unwrap();
    let b = engine
        .compute_natal_chart(&birth().with_label("second caller"))
        .await
        .unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(provider.sun_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_transits_are_cached_per_day() {
    let provider = Arc::new(SlowCountingProvider::default());
    let clock = Arc::new(ManualClock::new(start()));
    let engine = engine_with(provider.clone(), clock.clone());

    let morning = Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap();
    let evening = Utc.with_ymd_and_hms(2024, 3, 1, 21, 0, 0).unwrap();
    let first = engine.compute_transits(&birth(), morning).await.unwrap();
    let second = engine.compute_transits(&birth(), evening).await.unwrap();
    assert_eq!(*first, *second);
    // One natal chart and one transit sky.
    assert_eq!(provider.sun_calls.load(Ordering::SeqCst), 2);

    let next_day = evening + Duration::hours(6);
    engine.compute_transits(&birth(), next_day).await.unwrap();
    assert_eq!(provider.sun_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_memo_cache_shares_in_flight_work() {
    let clock = Arc::new(ManualClock::new(start()));
    let cache: MemoCache<usize> = MemoCache::new("test", std::time::Duration::from_secs(30), clock);
    let runs = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            let runs = runs.clone();
            tokio::spawn(async move {
                cache
                    .get_or_compute("key", move || async move {
                        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                        Ok(runs.fetch_add(1, Ordering::SeqCst) + 100)
                    })
                    .await
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Ok(100));
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stored_transits_equal_the_computed_ones() {
    let provider = Arc::new(SlowCountingProvider::default());
    let engine = engine_with(provider, Arc::new(ManualClock::new(start())));

    for offset in 0..6i32 {
        let date = NaiveDate::from_ymd_opt(1970 + offset * 7, 1 + offset as u32, 11).unwrap();
        let input = BirthInput::new(date)
            .with_time("17:43")
            .with_timezone("-05:00")
            .with_location(40.7128 - offset as f64, -74.006 + offset as f64 * 3.3);
        for day in 0..10i64 {
            let target = start() + Duration::days(day * 3) + Duration::minutes(17 * day);
            let computed = engine.compute_transits(&input, target).await.unwrap();
            let stored = engine.compute_transits(&input, target).await.unwrap();
            assert!(!Arc::ptr_eq(&computed, &stored));
            assert_eq!(*computed, *stored, "birth {} day {}", offset, day);
        }
    }
}

#[tokio::test]
async fn test_failing_store_degrades_to_recompute() {
    for corrupt in [false, true] {
        let provider = Arc::new(SlowCountingProvider::default());
        let clock = Arc::new(ManualClock::new(start()));
        let store = Arc::new(BadStore {
            corrupt,
            ..BadStore::default()
        });
        let engine = ChartEngine::with_parts(
            EngineConfig::default(),
            ResilientEphemeris::with_primary(provider.clone()),
            clock,
            store.clone(),
        );

        let first = engine.compute_transits(&birth(), start()).await.unwrap();
        assert_eq!(provider.sun_calls.load(Ordering::SeqCst), 2);
        let second = engine.compute_transits(&birth(), start()).await.unwrap();
        // Natal chart stays cached; the transit sky is computed again.
        assert_eq!(provider.sun_calls.load(Ordering::SeqCst), 3);
        assert_eq!(*first, *second);
        assert_eq!(store.reads.load(Ordering::SeqCst), 2);
        assert_eq!(store.writes.load(Ordering::SeqCst), 2);
    }
}
