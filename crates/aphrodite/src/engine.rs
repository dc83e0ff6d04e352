//! The engine facade: natal charts, transits and cycles behind their caches.

use crate::aspects::AspectCalculator;
use crate::bodies::Body;
use crate::cache::{CacheStats, Clock, MemoCache, MemoryTransitStore, StoreError, SystemClock, TransitStore};
use crate::chart::{observe_sky, BirthInput, NatalChart, PlanetPosition};
use crate::ephemeris::{EphemerisMode, ResilientEphemeris};
use crate::error::EngineError;
use crate::summary::{CompactChartSummary, CompactTransitSummary};
use crate::time::checked_julian_day;
use crate::transit::{detect_cycles, CycleEvent, MoonPhase, TransitData};
use aphrodite_config::EngineConfig;
use chrono::{DateTime, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use std::sync::Arc;

struct EngineInner {
    config: EngineConfig,
    ephemeris: ResilientEphemeris,
    calculator: AspectCalculator,
    clock: Arc<dyn Clock>,
    natal_cache: MemoCache<Arc<NatalChart>>,
    transit_flights: MemoCache<Arc<TransitData>>,
    transit_store: Arc<dyn TransitStore>,
}

/// Cheap to clone; clones share caches and provider.
#[derive(Clone)]
pub struct ChartEngine {
    inner: Arc<EngineInner>,
}

impl ChartEngine {
    /// Pick the ephemeris mode from `config` and wire in-process caches.
    pub fn bootstrap(config: EngineConfig) -> Self {
        let ephemeris = ResilientEphemeris::bootstrap(&config);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let store = Arc::new(MemoryTransitStore::new(clock.clone()));
        Self::with_parts(config, ephemeris, clock, store)
    }

    pub fn with_parts(
        config: EngineConfig,
        ephemeris: ResilientEphemeris,
        clock: Arc<dyn Clock>,
        transit_store: Arc<dyn TransitStore>,
    ) -> Self {
        let natal_cache = MemoCache::new("natal", config.natal_ttl, clock.clone());
        let transit_flights = MemoCache::flight_only("transit", clock.clone());
        Self {
            inner: Arc::new(EngineInner {
                config,
                ephemeris,
                calculator: AspectCalculator::new(),
                clock,
                natal_cache,
                transit_flights,
                transit_store,
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn mode(&self) -> EphemerisMode {
        self.inner.ephemeris.mode()
    }

    pub fn natal_cache_stats(&self) -> CacheStats {
        self.inner.natal_cache.stats()
    }

    pub fn transit_flight_stats(&self) -> CacheStats {
        self.inner.transit_flights.stats()
    }

    /// Natal chart for `input`, shared with every other caller asking for the
    /// same birth data while it is fresh.
    pub async fn compute_natal_chart(&self, input: &BirthInput) -> Result<Arc<NatalChart>, EngineError> {
        let key = input.cache_key(self.inner.config.default_location);
        let ephemeris = self.inner.ephemeris.clone();
        let calculator = self.inner.calculator.clone();
        let default_location = self.inner.config.default_location;
        let input = input.clone();
        self.inner
            .natal_cache
            .get_or_compute(&key, move || async move {
                NatalChart::compute(&ephemeris, &calculator, &input, default_location).map(Arc::new)
            })
            .await
    }

    /// Natal chart computed from scratch, bypassing the cache.
    pub fn compute_natal_chart_uncached(&self, input: &BirthInput) -> Result<NatalChart, EngineError> {
        NatalChart::compute(
            &self.inner.ephemeris,
            &self.inner.calculator,
            input,
            self.inner.config.default_location,
        )
    }

    /// Transits for the UTC day containing `target`, measured against the natal chart.
    pub async fn compute_transits(
        &self,
        input: &BirthInput,
        target: DateTime<Utc>,
    ) -> Result<Arc<TransitData>, EngineError> {
        let date = target.date_naive();
        let key = format!(
            "transit:{}:{}",
            input.cache_key(self.inner.config.default_location),
            date.format("%Y-%m-%d")
        );
        let engine = self.clone();
        let input = input.clone();
        let store_key = key.clone();
        self.inner
            .transit_flights
            .get_or_compute(&key, move || async move {
                engine
                    .load_or_compute_transits(&store_key, &input, date)
                    .await
                    .map(Arc::new)
            })
            .await
    }

    async fn load_or_compute_transits(
        &self,
        key: &str,
        input: &BirthInput,
        date: NaiveDate,
    ) -> Result<TransitData, EngineError> {
        match self.fetch_stored(key).await {
            Ok(Some(data)) => {
                log::debug!("transit store hit for {}", key);
                return Ok(data);
            }
            Ok(None) => {}
            Err(e) => log::warn!("Transit store read failed for {}, recomputing: {}", key, e),
        }

        let data = self.transits_uncached(input, date).await?;
        if let Err(e) = self.store(key, &data).await {
            log::warn!("Transit store write failed for {}: {}", key, e);
        }
        Ok(data)
    }

    async fn fetch_stored(&self, key: &str) -> Result<Option<TransitData>, StoreError> {
        match self.inner.transit_store.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn store(&self, key: &str, data: &TransitData) -> Result<(), StoreError> {
        let raw = serde_json::to_string(data)?;
        self.inner
            .transit_store
            .set_with_ttl(key, raw, self.inner.config.transit_ttl)
            .await
    }

    async fn transits_uncached(&self, input: &BirthInput, date: NaiveDate) -> Result<TransitData, EngineError> {
        let natal = self.compute_natal_chart(input).await?;
        let instant = Utc.from_utc_datetime(&date.and_time(noon()));
        let julian_day = checked_julian_day(instant)?;

        let sky = observe_sky(&self.inner.ephemeris, julian_day, natal.location);
        let positions = sky.positions(&natal.house_cusps);

        let transiting: Vec<PlanetPosition> = positions
            .iter()
            .filter(|p| is_transiting_body(p.body))
            .cloned()
            .collect();
        let targets: Vec<PlanetPosition> = natal
            .positions
            .iter()
            .filter(|p| is_transiting_body(p.body) || matches!(p.body, Body::Ascendant | Body::Midheaven))
            .cloned()
            .collect();
        let aspects = self.inner.calculator.compute_cross_aspects(&transiting, &targets);

        let sun = sky.longitude(Body::Sun).map(|(lon, _)| lon).unwrap_or_default();
        let moon = sky.longitude(Body::Moon).map(|(lon, _)| lon).unwrap_or_default();

        Ok(TransitData {
            date,
            instant,
            julian_day,
            positions,
            aspects,
            moon_phase: MoonPhase::from_longitudes(sun, moon),
        })
    }

    /// Monthly scan of slow-body returns, oppositions and squares, starting now.
    pub async fn compute_cycles(
        &self,
        input: &BirthInput,
        window_months: u32,
    ) -> Result<Vec<CycleEvent>, EngineError> {
        let natal = self.compute_natal_chart(input).await?;
        let start = self.inner.clock.now();

        let mut samples = Vec::with_capacity(window_months as usize);
        for month in 0..window_months {
            let Some(target) = start.checked_add_months(Months::new(month)) else {
                break;
            };
            let transits = self.compute_transits(input, target).await?;
            samples.push(TransitData::clone(&transits));
        }

        Ok(detect_cycles(
            &natal,
            &samples,
            self.inner.config.cycle_orb,
            self.inner.config.max_cycle_events,
        ))
    }

    pub async fn chart_summary(&self, input: &BirthInput) -> Result<CompactChartSummary, EngineError> {
        let chart = self.compute_natal_chart(input).await?;
        Ok(CompactChartSummary::from_chart(&chart, self.inner.config.summary_aspects))
    }

    pub async fn transit_summary(
        &self,
        input: &BirthInput,
        target: DateTime<Utc>,
    ) -> Result<CompactTransitSummary, EngineError> {
        let transits = self.compute_transits(input, target).await?;
        Ok(CompactTransitSummary::from_transits(&transits, self.inner.config.summary_aspects))
    }
}

/// Core planets plus the North Node; the South Node only mirrors it.
fn is_transiting_body(body: Body) -> bool {
    body.is_core() || body == Body::NorthNode
}

fn noon() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()
}
