//! Progressive place search.
//!
//! A run geocodes the location text, derives the radius ladder, and then walks
//! an ordered attempt plan:
//!
//! 1. **Direct**: requested category plus the name hint.
//! 2. **Category fallback**: each alternate category at the same radius.
//! 3. **Name only**: the name hint with the category dropped.
//! 4. **Advance**: next radius, back to step 1; `Empty` when none remain.
//!
//! The first non-empty attempt ends the run. Any backend error also ends the
//! run: a bad key or a rate limit fails every later attempt the same way, so
//! nothing further is sent.

mod run;
mod types;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use idmap_core::SearchArea;
use tokio::sync::mpsc::UnboundedSender;

use crate::category::{fallbacks_for, CategoryToken};
use crate::error::PlacesError;
use crate::radius::{RadiusLadder, DEFAULT_START_KM};
use crate::types::Place;

pub use run::RunTracker;
pub use types::{
    FailureReason, MatchStage, PlaceQuery, PoiResult, RunId, RunReport, SearchAttempt,
    SearchEvent, SearchForm, SearchOutcome, SearchRequest, SpatialFilter,
};

const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Receives progress and terminal events for runs.
pub type EventSink = UnboundedSender<SearchEvent>;

/// The two network capabilities a run needs.
#[async_trait]
pub trait PlacesBackend: Send + Sync {
    /// Resolves free-text location to a point or a bounding box.
    async fn geocode(&self, location_text: &str) -> Result<SearchArea, PlacesError>;

    /// Runs one places query.
    async fn search_places(&self, query: &PlaceQuery) -> Result<Vec<Place>, PlacesError>;
}

/// Spatial filters for an area: one circle per rung for a point, a single
/// rectangle for a bounding box.
#[must_use]
pub fn plan_filters(area: SearchArea, ladder: &RadiusLadder) -> Vec<SpatialFilter> {
    match area {
        SearchArea::Point(center) => ladder
            .as_slice()
            .iter()
            .map(|&radius_m| SpatialFilter::Circle { center, radius_m })
            .collect(),
        SearchArea::Rect(bbox) => vec![SpatialFilter::Rect(bbox)],
    }
}

/// Attempts for one spatial filter, in the order they must be tried.
///
/// Without a category the direct attempt already is a name search, so no
/// separate name-only attempt is planned.
#[must_use]
pub fn plan_attempts(
    filter: SpatialFilter,
    category: Option<&CategoryToken>,
    name: Option<&str>,
) -> Vec<SearchAttempt> {
    let name = name.map(ToOwned::to_owned);
    let attempt = |category: Option<CategoryToken>, name: Option<String>, stage| SearchAttempt {
        query: PlaceQuery {
            filter,
            category,
            name,
        },
        stage,
    };

    let mut attempts = vec![attempt(category.cloned(), name.clone(), MatchStage::Direct)];
    if let Some(category) = category {
        for alt in fallbacks_for(category) {
            attempts.push(attempt(
                Some(alt.clone()),
                name.clone(),
                MatchStage::CategoryFallback { category: alt },
            ));
        }
        if name.is_some() {
            attempts.push(attempt(None, name, MatchStage::NameOnly));
        }
    }
    attempts
}

/// Marker: a newer run started while this one was suspended.
struct Superseded;

struct RunContext<'a> {
    run: RunId,
    events: Option<&'a EventSink>,
    radii: Vec<u32>,
    attempts: usize,
}

impl RunContext<'_> {
    fn emit(&self, event: SearchEvent) {
        if let Some(sink) = self.events {
            if sink.send(event).is_err() {
                tracing::debug!(run = self.run.0, "search event receiver dropped");
            }
        }
    }
}

/// Runs progressive searches against a [`PlacesBackend`].
///
/// Every call to [`PlaceSearch::run`] supersedes the previous one: a run
/// that finds itself stale after a suspension point stops without emitting
/// a terminal event and returns `None`.
pub struct PlaceSearch<B> {
    backend: B,
    tracker: RunTracker,
    attempt_timeout: Duration,
    default_radius_km: f64,
}

impl<B: PlacesBackend> PlaceSearch<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            tracker: RunTracker::new(),
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            default_radius_km: DEFAULT_START_KM,
        }
    }

    /// Deadline for each individual backend call; expiry fails the run.
    #[must_use]
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Starting radius used when a request carries none.
    #[must_use]
    pub fn with_default_radius_km(mut self, km: f64) -> Self {
        self.default_radius_km = km;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn tracker(&self) -> &RunTracker {
        &self.tracker
    }

    /// Supersedes the run in flight, if any.
    pub fn cancel(&self) {
        self.tracker.cancel();
    }

    /// Executes one run.
    ///
    /// Emits [`SearchEvent::Progress`] before every places query and exactly
    /// one [`SearchEvent::Finished`] when the run completes. Returns `None`
    /// (and emits nothing further) when a newer run superseded this one.
    pub async fn run(
        &self,
        request: &SearchRequest,
        events: Option<&EventSink>,
    ) -> Option<RunReport> {
        let mut ctx = RunContext {
            run: self.tracker.begin(),
            events,
            radii: Vec::new(),
            attempts: 0,
        };

        let Ok(outcome) = self.execute(&mut ctx, request).await else {
            tracing::debug!(run = ctx.run.0, attempts = ctx.attempts, "search run superseded");
            return None;
        };

        match &outcome {
            SearchOutcome::Results(items) => tracing::info!(
                run = ctx.run.0,
                attempts = ctx.attempts,
                count = items.len(),
                "search found places"
            ),
            SearchOutcome::Empty => tracing::info!(
                run = ctx.run.0,
                attempts = ctx.attempts,
                "search exhausted every radius and fallback"
            ),
            SearchOutcome::Failed(reason) => tracing::warn!(
                run = ctx.run.0,
                attempts = ctx.attempts,
                ?reason,
                "search failed"
            ),
        }

        ctx.emit(SearchEvent::Finished {
            run: ctx.run,
            outcome: outcome.clone(),
        });

        Some(RunReport {
            run: ctx.run,
            outcome,
            radii: ctx.radii,
            attempts: ctx.attempts,
        })
    }

    async fn execute(
        &self,
        ctx: &mut RunContext<'_>,
        request: &SearchRequest,
    ) -> Result<SearchOutcome, Superseded> {
        let location_text = request.location.location_text();
        let geocoded = self.bounded(self.backend.geocode(&location_text)).await;
        self.ensure_current(ctx.run)?;

        let area = match geocoded {
            Ok(area) => area,
            Err(err) => {
                tracing::warn!(run = ctx.run.0, location = %location_text, error = %err, "geocode failed");
                return Ok(SearchOutcome::Failed(err.into_failure()));
            }
        };

        let ladder = RadiusLadder::build(
            request.start_radius_km.or(Some(self.default_radius_km)),
            request.progressive,
        );
        let filters = plan_filters(area, &ladder);
        ctx.radii = filters.iter().filter_map(SpatialFilter::radius_m).collect();
        tracing::debug!(run = ctx.run.0, ?area, radii = ?ctx.radii, "geocoded search area");

        for filter in filters {
            let attempts = plan_attempts(
                filter,
                request.category.as_ref(),
                request.name_hint.as_deref(),
            );
            for attempt in attempts {
                ctx.emit(SearchEvent::Progress {
                    run: ctx.run,
                    radius_m: filter.radius_m(),
                    stage: attempt.stage.clone(),
                });
                ctx.attempts += 1;

                let result = self.bounded(self.backend.search_places(&attempt.query)).await;
                self.ensure_current(ctx.run)?;

                let places = match result {
                    Ok(places) => places,
                    Err(err) => {
                        tracing::warn!(
                            run = ctx.run.0,
                            radius_m = ?filter.radius_m(),
                            stage = attempt.stage.label(),
                            error = %err,
                            "places attempt failed; ending run"
                        );
                        return Ok(SearchOutcome::Failed(err.into_failure()));
                    }
                };

                tracing::debug!(
                    run = ctx.run.0,
                    radius_m = ?filter.radius_m(),
                    stage = attempt.stage.label(),
                    category = attempt.query.category.as_ref().map(CategoryToken::as_str),
                    count = places.len(),
                    "places attempt"
                );

                if !places.is_empty() {
                    let stage = attempt.stage;
                    return Ok(SearchOutcome::Results(
                        places
                            .into_iter()
                            .map(|place| PoiResult {
                                place,
                                stage: stage.clone(),
                            })
                            .collect(),
                    ));
                }
            }
        }

        Ok(SearchOutcome::Empty)
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, PlacesError>>,
    ) -> Result<T, PlacesError> {
        tokio::time::timeout(self.attempt_timeout, call)
            .await
            .unwrap_or_else(|_| {
                Err(PlacesError::Timeout {
                    after_secs: self.attempt_timeout.as_secs(),
                })
            })
    }

    fn ensure_current(&self, run: RunId) -> Result<(), Superseded> {
        if self.tracker.is_current(run) {
            Ok(())
        } else {
            Err(Superseded)
        }
    }
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
