//! The session context object.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use serde::Serialize;

use hv_model::{
    AggregateSnapshot, CategoricalField, CategoryStats, FilterField, FilterPatch, FilterSpec,
    TestResultCounts,
};
use hv_query::{
    AggregationEngine, CacheStats, DatasetStore, FilterEngine, FilteredSubset,
    aggregate_by_category, test_result_distribution,
};

use crate::config::SessionConfig;
use crate::error::{HandlerError, Result};
use crate::event::{EmitReport, Event, EventBus, EventKind, SubscriptionId};
use crate::publication::Publication;
use crate::schedule::{ConsumerClass, ConsumerId, RenderReport, RenderScheduler};

/// Cache counters of both engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionCacheStats {
    pub filter: CacheStats,
    pub aggregate: CacheStats,
}

/// Owns a dataset and everything derived from it for one interactive
/// session: the filter specification, both memoizing engines, the event bus
/// and the render scheduler.
///
/// Mutating the specification never recomputes anything by itself. Work
/// happens in [`apply_filters`](Self::apply_filters), which publishes one
/// complete [`Publication`] or nothing.
#[derive(Debug)]
pub struct Session {
    store: DatasetStore,
    config: SessionConfig,
    spec: FilterSpec,
    filters: FilterEngine,
    aggregates: AggregationEngine,
    events: EventBus,
    renderer: RenderScheduler,
    current: Option<Arc<Publication>>,
    started: bool,
}

impl Session {
    /// Creates a session over a loaded store.
    ///
    /// Nothing is computed or emitted until [`start`](Self::start).
    pub fn new(store: DatasetStore, config: SessionConfig) -> Result<Self> {
        config.validate()?;
        tracing::debug!(store = %store.id(), rows = store.len(), "Creating session");
        Ok(Self {
            filters: FilterEngine::with_capacity(config.filter_cache_capacity),
            aggregates: AggregationEngine::with_capacity(config.aggregate_cache_capacity),
            renderer: RenderScheduler::new(config.secondary_delay()),
            events: EventBus::new(),
            spec: FilterSpec::default(),
            current: None,
            started: false,
            store,
            config,
        })
    }

    pub fn start(&mut self) -> Arc<Publication> {
        self.start_at(Instant::now())
    }

    /// Emits [`Event::DatasetLoaded`] and publishes the initial selection.
    ///
    /// Only the first call does anything; later calls return the current
    /// publication.
    pub fn start_at(&mut self, now: Instant) -> Arc<Publication> {
        if self.started
            && let Some(current) = &self.current
        {
            return Arc::clone(current);
        }
        self.started = true;
        tracing::info!(rows = self.store.len(), "Session started");
        self.emit(&Event::DatasetLoaded {
            rows: self.store.shared_rows(),
        });
        self.apply_filters_at(now)
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Merges a partial update into the filter specification.
    pub fn set_filter(&mut self, patch: FilterPatch) {
        patch.apply_to(&mut self.spec);
    }

    /// Sets one predicate from its textual form.
    ///
    /// On error the specification is left unchanged.
    pub fn set_predicate(&mut self, name: &str, value: &str) -> hv_model::Result<()> {
        self.spec.set(name, value)
    }

    /// Turns one predicate off.
    pub fn clear_predicate(&mut self, field: FilterField) {
        self.spec.clear(field);
    }

    pub fn apply_filters(&mut self) -> Arc<Publication> {
        self.apply_filters_at(Instant::now())
    }

    /// Filters, aggregates, publishes and schedules rendering.
    pub fn apply_filters_at(&mut self, now: Instant) -> Arc<Publication> {
        let rows = self.filters.filter(&self.store, &self.spec);
        let scalars = self.aggregates.kpis(&rows);
        let hospitals = self.aggregates.by_hospital(&rows);
        let publication = Arc::new(Publication {
            label: self.spec.describe(),
            spec: self.spec.clone(),
            rows,
            scalars,
            hospitals,
        });
        tracing::info!(
            rows = publication.row_count(),
            selection = %publication.label,
            "Filters applied"
        );

        self.current = Some(Arc::clone(&publication));
        self.emit(&Event::FilteredSubsetChanged(Arc::clone(&publication)));
        self.renderer.schedule(Arc::clone(&publication), now);
        publication
    }

    pub fn reset_filters(&mut self) -> Arc<Publication> {
        self.reset_filters_at(Instant::now())
    }

    /// Restores every predicate to its default, emits
    /// [`Event::SelectionCleared`], then applies.
    pub fn reset_filters_at(&mut self, now: Instant) -> Arc<Publication> {
        self.spec = FilterSpec::default();
        self.emit(&Event::SelectionCleared);
        self.apply_filters_at(now)
    }

    /// Drops every memoized subset and aggregate.
    ///
    /// The current publication stays valid; the next apply recomputes.
    pub fn clear_caches(&mut self) {
        self.filters.clear();
        self.aggregates.clear();
        tracing::debug!("Session caches cleared");
    }

    /// Latest publication, if filters have been applied.
    pub fn current(&self) -> Option<&Arc<Publication>> {
        self.current.as_ref()
    }

    /// Owned aggregates of the latest publication.
    pub fn snapshot(&self) -> Option<AggregateSnapshot> {
        self.current.as_ref().map(|p| AggregateSnapshot {
            scalars: (*p.scalars).clone(),
            hospitals: p.hospitals.to_vec(),
        })
    }

    /// Per-value statistics of a categorical column over the latest subset,
    /// or over the whole dataset before the first apply.
    pub fn category_stats(&self, field: CategoricalField) -> Vec<CategoryStats> {
        match self.current_rows() {
            Some(rows) => aggregate_by_category(rows, field),
            None => aggregate_by_category(self.store.all(), field),
        }
    }

    /// Test-result counts over the latest subset, or over the whole dataset
    /// before the first apply.
    pub fn test_results(&self) -> TestResultCounts {
        match self.current_rows() {
            Some(rows) => test_result_distribution(rows),
            None => test_result_distribution(self.store.all()),
        }
    }

    /// The specification as mutated so far, applied or not.
    pub fn filter_spec(&self) -> &FilterSpec {
        &self.spec
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Sorted option list of a categorical column.
    pub fn distinct_values(&self, field: CategoricalField) -> &[String] {
        self.store.distinct_values(field)
    }

    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.store.date_bounds()
    }

    pub fn cache_stats(&self) -> SessionCacheStats {
        SessionCacheStats {
            filter: self.filters.stats(),
            aggregate: self.aggregates.stats(),
        }
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) -> std::result::Result<(), HandlerError> + 'static,
    {
        self.events.subscribe(kind, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn register_consumer<F>(&mut self, class: ConsumerClass, consumer: F) -> ConsumerId
    where
        F: FnMut(&Publication) -> std::result::Result<(), HandlerError> + 'static,
    {
        self.renderer.register(class, consumer)
    }

    pub fn unregister_consumer(&mut self, id: ConsumerId) -> bool {
        self.renderer.unregister(id)
    }

    /// Delivers due publications to render consumers.
    pub fn tick(&mut self, now: Instant) -> RenderReport {
        self.renderer.tick(now)
    }

    /// Next instant at which [`tick`](Self::tick) has work, if any.
    pub fn next_render_due(&self) -> Option<Instant> {
        self.renderer.next_due()
    }

    fn current_rows(&self) -> Option<&FilteredSubset> {
        self.current.as_deref().map(|p| p.rows.as_ref())
    }

    fn emit(&mut self, event: &Event) -> EmitReport {
        let report = self.events.emit(event);
        if report.failed > 0 {
            tracing::debug!(
                event = %event.kind(),
                delivered = report.delivered,
                failed = report.failed,
                "Emission finished with failures"
            );
        }
        report
    }
}
