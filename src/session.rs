//! One "show me matches" run, from measuring to the swipe deck.
//!
//! ```text
//! Idle ──start_measuring──▶ Measuring ──tick×N──▶ (evaluate) ──▶ Presenting
//!  ▲                          │                       │             │
//!  └──────── cancel ──────────┘                       ▼             │
//!  ▲                                               NoMatch          │
//!  └──────────── close / deck exhausted ────────────────────────────┘
//! ```
//!
//! Logbook advice adds an `AwaitingConfirmation` checkpoint when the
//! logbook's readings are unevenly spread over the day.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::EngineSettings;
use crate::error::SessionError;
use crate::filters::FilterSet;
use crate::history::{HistoryEntry, SearchHistory, SINGLE_MEASUREMENT_LABEL};
use crate::light::classify;
use crate::logbook::{is_balanced, Logbook, TimeOfDayCounts};
use crate::matching::{MatchEngine, MatchedPlant};
use crate::sampling::{SamplingWindow, SensorFeed, SensorSample, Ticker, WindowProgress};
use crate::store::FavoritesStore;
use crate::time::{history_timestamp, Clock};

/// Where a finished measuring window goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SamplingTarget {
    /// Straight to the match engine with these filters
    Direct { filters: FilterSet },
    /// Back to the caller, to be logged as a measurement
    Logbook { logbook_id: String },
}

/// Why there is nothing to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The reading matched no plant
    NoMatchesForMeasurement,
    /// Every candidate has been accepted or declined
    NoMoreCandidates,
}

/// Candidates being swiped through
#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    candidates: Vec<MatchedPlant>,
    position: usize,
    lux: u32,
    source: String,
}

impl Deck {
    pub fn current(&self) -> Option<&MatchedPlant> {
        self.candidates.get(self.position)
    }

    pub fn remaining(&self) -> usize {
        self.candidates.len().saturating_sub(self.position)
    }

    pub fn candidates(&self) -> &[MatchedPlant] {
        &self.candidates
    }

    pub fn lux(&self) -> u32 {
        self.lux
    }

    /// "Single Measurement" or the logbook title
    pub fn source(&self) -> &str {
        &self.source
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Measuring {
        window: SamplingWindow,
        target: SamplingTarget,
    },
    AwaitingConfirmation {
        logbook: Logbook,
        counts: TimeOfDayCounts,
    },
    Presenting(Deck),
    NoMatch,
}

/// What an operation did
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    MeasuringStarted { ticks: u32 },
    Sampling { ticks_remaining: u32 },
    /// A logbook-targeted window finished; the reading should be logged
    MeasurementReady { logbook_id: String, lux: u32 },
    /// A logbook-targeted window finished without any sensor data
    NoReading { logbook_id: String },
    Cancelled,
    ImbalanceDetected(TimeOfDayCounts),
    Presenting { candidates: usize },
    Empty(EmptyState),
    Advanced { remaining: usize },
    Closed,
}

pub struct RecommendationSession {
    engine: MatchEngine,
    clock: Arc<dyn Clock>,
    sampling_ticks: u32,
    history: SearchHistory,
    state: SessionState,
}

impl RecommendationSession {
    pub fn new(engine: MatchEngine, clock: Arc<dyn Clock>, settings: &EngineSettings) -> Self {
        Self {
            engine,
            clock,
            sampling_ticks: settings.sampling_ticks,
            history: SearchHistory::with_capacity(settings.history_capacity),
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn is_measuring(&self) -> bool {
        matches!(self.state, SessionState::Measuring { .. })
    }

    pub fn current_candidate(&self) -> Option<&MatchedPlant> {
        match &self.state {
            SessionState::Presenting(deck) => deck.current(),
            _ => None,
        }
    }

    /// Open a measuring window. Only one window may be open at a time.
    pub fn start_measuring(&mut self, target: SamplingTarget) -> Result<SessionEvent, SessionError> {
        if self.is_measuring() {
            return Err(SessionError::AlreadyMeasuring);
        }

        let window = SamplingWindow::new(self.sampling_ticks);
        let ticks = window.ticks_total();
        debug!(ticks, target = ?target, "Measuring started");
        self.state = SessionState::Measuring { window, target };
        Ok(SessionEvent::MeasuringStarted { ticks })
    }

    /// Feed one sensor sample to the open window
    pub fn tick(&mut self, sample: SensorSample) -> Result<SessionEvent, SessionError> {
        let progress = match &mut self.state {
            SessionState::Measuring { window, .. } => window.record(sample),
            _ => return Err(SessionError::NotMeasuring),
        };

        let lux = match progress {
            WindowProgress::Pending { ticks_remaining } => {
                return Ok(SessionEvent::Sampling { ticks_remaining })
            }
            WindowProgress::Complete(lux) => lux,
        };

        let target = match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Measuring { target, .. } => target,
            _ => return Err(SessionError::NotMeasuring),
        };

        match target {
            SamplingTarget::Direct { filters } => Ok(self.evaluate(
                lux.map(f64::from),
                &filters,
                SINGLE_MEASUREMENT_LABEL,
            )),
            SamplingTarget::Logbook { logbook_id } => match lux {
                Some(lux) => Ok(SessionEvent::MeasurementReady { logbook_id, lux }),
                None => {
                    warn!(logbook_id = %logbook_id, "Measuring finished without sensor data");
                    Ok(SessionEvent::NoReading { logbook_id })
                }
            },
        }
    }

    /// Abandon the open window; its samples are discarded
    pub fn cancel(&mut self) -> Result<SessionEvent, SessionError> {
        if !self.is_measuring() {
            return Err(SessionError::NotMeasuring);
        }
        self.state = SessionState::Idle;
        debug!("Measuring cancelled");
        Ok(SessionEvent::Cancelled)
    }

    /// Open a window and drive it from a sensor feed until it finishes
    ///
    /// Dropping the returned future before it completes abandons the window
    /// and leaves the session `Idle`, as [`RecommendationSession::cancel`]
    /// would.
    pub async fn measure(
        &mut self,
        target: SamplingTarget,
        feed: &dyn SensorFeed,
        period: Duration,
    ) -> Result<SessionEvent, SessionError> {
        self.start_measuring(target)?;
        let (_ticker, mut ticks) = Ticker::spawn(period, self.sampling_ticks.max(1));
        let mut guard = MeasuringGuard { session: self };

        while ticks.recv().await.is_some() {
            match guard.session.tick(feed.latest())? {
                SessionEvent::Sampling { .. } => continue,
                event => return Ok(event),
            }
        }

        // The ticker stopped early; nothing usable was produced
        guard.session.cancel()
    }

    /// Match a single reading against the given filters
    pub fn evaluate_direct(
        &mut self,
        lux: Option<f64>,
        filters: &FilterSet,
    ) -> Result<SessionEvent, SessionError> {
        if self.is_measuring() {
            return Err(SessionError::AlreadyMeasuring);
        }
        Ok(self.evaluate(lux, filters, SINGLE_MEASUREMENT_LABEL))
    }

    /// Match a logbook's average against its plant profile
    ///
    /// Refused for a logbook with no measurements. A logbook whose readings
    /// are not evenly spread over morning, afternoon and evening pauses at
    /// `AwaitingConfirmation` until the user confirms or dismisses.
    pub fn request_logbook_advice(&mut self, logbook: &Logbook) -> Result<SessionEvent, SessionError> {
        if self.is_measuring() {
            return Err(SessionError::AlreadyMeasuring);
        }
        if !logbook.has_measurements() {
            self.state = SessionState::Idle;
            return Err(SessionError::NoMeasurements);
        }

        let counts = logbook.time_of_day_counts();
        if !is_balanced(&counts) {
            info!(
                logbook_id = %logbook.id,
                morning = counts.morning,
                afternoon = counts.afternoon,
                evening = counts.evening,
                "Logbook readings unbalanced across the day"
            );
            self.state = SessionState::AwaitingConfirmation {
                logbook: logbook.clone(),
                counts,
            };
            return Ok(SessionEvent::ImbalanceDetected(counts));
        }

        Ok(self.evaluate_logbook(logbook))
    }

    /// Proceed with advice despite unbalanced readings
    pub fn confirm_imbalance(&mut self) -> Result<SessionEvent, SessionError> {
        match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::AwaitingConfirmation { logbook, .. } => Ok(self.evaluate_logbook(&logbook)),
            other => {
                self.state = other;
                Err(SessionError::NotAwaitingConfirmation)
            }
        }
    }

    pub fn dismiss_imbalance(&mut self) -> Result<SessionEvent, SessionError> {
        match self.state {
            SessionState::AwaitingConfirmation { .. } => {
                self.state = SessionState::Idle;
                Ok(SessionEvent::Closed)
            }
            _ => Err(SessionError::NotAwaitingConfirmation),
        }
    }

    /// Save the current candidate as a favorite and move to the next one
    ///
    /// A store failure is logged; the deck advances regardless.
    pub async fn accept<F: FavoritesStore>(&mut self, favorites: &F) -> Result<SessionEvent, SessionError> {
        let plant = match self.current_candidate() {
            Some(candidate) => candidate.plant.clone(),
            None => return Err(SessionError::NotPresenting),
        };

        match favorites.add(&plant).await {
            Ok(_) => info!(plant = %plant.name, "Favorite saved"),
            Err(e) => warn!(
                plant = %plant.name,
                error = %e,
                code = e.code(),
                "Failed to save favorite"
            ),
        }

        self.advance()
    }

    pub fn decline(&mut self) -> Result<SessionEvent, SessionError> {
        if self.current_candidate().is_none() {
            return Err(SessionError::NotPresenting);
        }
        self.advance()
    }

    /// Dismiss whatever is being shown. An open measuring window is left
    /// alone; use [`RecommendationSession::cancel`] for that.
    pub fn close(&mut self) -> SessionEvent {
        if !self.is_measuring() {
            self.state = SessionState::Idle;
        }
        SessionEvent::Closed
    }

    fn advance(&mut self) -> Result<SessionEvent, SessionError> {
        let deck = match &mut self.state {
            SessionState::Presenting(deck) => deck,
            _ => return Err(SessionError::NotPresenting),
        };

        deck.position += 1;
        let remaining = deck.remaining();
        if remaining == 0 {
            debug!("Deck exhausted");
            self.state = SessionState::Idle;
            return Ok(SessionEvent::Empty(EmptyState::NoMoreCandidates));
        }
        Ok(SessionEvent::Advanced { remaining })
    }

    fn evaluate_logbook(&mut self, logbook: &Logbook) -> SessionEvent {
        self.evaluate(
            Some(f64::from(logbook.average)),
            &logbook.plant_profile,
            &logbook.title,
        )
    }

    fn evaluate(&mut self, lux: Option<f64>, filters: &FilterSet, source: &str) -> SessionEvent {
        let lux = match lux {
            Some(value) if value > 0.0 => value,
            _ => {
                debug!(?lux, "No usable reading");
                self.state = SessionState::NoMatch;
                return SessionEvent::Empty(EmptyState::NoMatchesForMeasurement);
            }
        };

        let (matches, trace) = self.engine.match_traced(Some(lux), filters, false);
        debug!(
            lux,
            light_matches = ?trace.light_matches,
            applied_filters = ?trace.applied_filters,
            exclusions = ?trace.exclusions,
            shown = ?trace.shown,
            "Match run"
        );

        if matches.is_empty() {
            self.state = SessionState::NoMatch;
            return SessionEvent::Empty(EmptyState::NoMatchesForMeasurement);
        }

        let rounded = lux.round().min(f64::from(u32::MAX)) as u32;
        self.history.push(HistoryEntry {
            lux: rounded,
            light_level: classify(Some(lux)),
            plants: matches.clone(),
            timestamp: history_timestamp(&self.clock.now()),
            logbook_name: source.to_string(),
        });

        let candidates = matches.len();
        info!(lux = rounded, candidates, source, "Presenting matches");
        self.state = SessionState::Presenting(Deck {
            candidates: matches,
            position: 0,
            lux: rounded,
            source: source.to_string(),
        });
        SessionEvent::Presenting { candidates }
    }
}

/// Returns a session left in `Measuring` to `Idle` when dropped
struct MeasuringGuard<'a> {
    session: &'a mut RecommendationSession,
}

impl Drop for MeasuringGuard<'_> {
    fn drop(&mut self) {
        if self.session.is_measuring() {
            debug!("Measuring abandoned");
            self.session.state = SessionState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::matching::MatchOptions;
    use crate::store::MemoryFavoritesStore;
    use crate::test_utils::helpers::plant;
    use crate::time::FixedClock;

    fn session() -> RecommendationSession {
        let catalog = Catalog::from_records(vec![
            plant("Fern", 500, 2000, 200),
            plant("Cactus", 10000, 50000, 5000),
        ])
        .unwrap();
        let clock = FixedClock::from_rfc3339("2024-01-15T09:00:00+00:00").unwrap();

        RecommendationSession::new(
            MatchEngine::new(catalog, MatchOptions::default()),
            Arc::new(clock),
            &EngineSettings::default(),
        )
    }

    #[test]
    fn test_second_start_is_rejected() {
        let mut session = session();
        let target = SamplingTarget::Direct {
            filters: FilterSet::default(),
        };

        session.start_measuring(target.clone()).unwrap();
        assert_eq!(
            session.start_measuring(target),
            Err(SessionError::AlreadyMeasuring)
        );
        assert!(session.is_measuring());
    }

    #[test]
    fn test_direct_window_presents_matches() {
        let mut session = session();
        session
            .start_measuring(SamplingTarget::Direct {
                filters: FilterSet::default(),
            })
            .unwrap();

        for _ in 0..4 {
            let event = session.tick(SensorSample::Available(1000.0)).unwrap();
            assert!(matches!(event, SessionEvent::Sampling { .. }));
        }
        let event = session.tick(SensorSample::Available(1000.0)).unwrap();

        assert_eq!(event, SessionEvent::Presenting { candidates: 1 });
        assert_eq!(session.current_candidate().unwrap().name(), "Fern");
        assert_eq!(session.history().latest().unwrap().logbook_name, "Single Measurement");
    }

    #[test]
    fn test_cancel_discards_window() {
        let mut session = session();
        session
            .start_measuring(SamplingTarget::Logbook {
                logbook_id: "kitchen".to_string(),
            })
            .unwrap();
        session.tick(SensorSample::Available(1000.0)).unwrap();

        assert_eq!(session.cancel(), Ok(SessionEvent::Cancelled));
        assert_eq!(session.state(), &SessionState::Idle);
        assert!(session.history().is_empty());
        assert_eq!(
            session.tick(SensorSample::Available(1000.0)),
            Err(SessionError::NotMeasuring)
        );
    }

    #[test]
    fn test_logbook_window_hands_back_reading() {
        let mut session = session();
        session
            .start_measuring(SamplingTarget::Logbook {
                logbook_id: "kitchen".to_string(),
            })
            .unwrap();

        let mut last = None;
        for lux in [100.0, 200.0, 300.0, 400.0, 500.0] {
            last = Some(session.tick(SensorSample::Available(lux)).unwrap());
        }

        assert_eq!(
            last,
            Some(SessionEvent::MeasurementReady {
                logbook_id: "kitchen".to_string(),
                lux: 300
            })
        );
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[test]
    fn test_non_positive_lux_is_no_match() {
        let mut session = session();

        let event = session.evaluate_direct(Some(0.0), &FilterSet::default()).unwrap();
        assert_eq!(event, SessionEvent::Empty(EmptyState::NoMatchesForMeasurement));
        assert_eq!(session.state(), &SessionState::NoMatch);

        session.evaluate_direct(None, &FilterSet::default()).unwrap();
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_decline_until_exhausted() {
        let mut session = session();
        // 1500 lux: Fern thrives, Cactus does not qualify
        session.evaluate_direct(Some(1500.0), &FilterSet::default()).unwrap();

        let event = session.decline().unwrap();
        assert_eq!(event, SessionEvent::Empty(EmptyState::NoMoreCandidates));
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.decline(), Err(SessionError::NotPresenting));
    }

    #[tokio::test]
    async fn test_accept_survives_store_failure() {
        let mut session = session();
        let favorites = MemoryFavoritesStore::new();
        favorites.set_offline(true);

        session.evaluate_direct(Some(1500.0), &FilterSet::default()).unwrap();
        let event = session.accept(&favorites).await.unwrap();

        assert_eq!(event, SessionEvent::Empty(EmptyState::NoMoreCandidates));
        favorites.set_offline(false);
        assert!(favorites.get_all().await.unwrap().is_empty());
    }

    #[test]
    fn test_close_returns_to_idle() {
        let mut session = session();
        session.evaluate_direct(Some(1500.0), &FilterSet::default()).unwrap();

        assert_eq!(session.close(), SessionEvent::Closed);
        assert_eq!(session.state(), &SessionState::Idle);
        assert!(session.current_candidate().is_none());
    }
}
