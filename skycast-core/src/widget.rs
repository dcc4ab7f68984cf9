//! Orchestration state for the weather widget.
//!
//! Every action takes `&mut self`, so actions on one widget run one at a
//! time. Failures never reset `place`/`payload`; the last good result stays
//! visible next to the error notice.

use serde::Serialize;

use crate::{
    Config,
    lookup::{lookup_by_geolocation, lookup_by_name},
    model::{Place, UnitPreference, WeatherPayload},
    provider::{
        Geolocator, LocationResolver, OpenMeteo, WeatherFetcher, geolocation::LocationConsent,
        geolocator_from_config,
    },
    render,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WidgetState {
    pub query: String,
    pub unit: UnitPreference,
    pub place: Option<Place>,
    pub payload: Option<WeatherPayload>,
    pub loading: bool,
    pub error: Option<String>,
}

/// What an action did to the state.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Nothing happened: empty query, a lookup already in flight, or the
    /// unit was already selected.
    Ignored,
    /// Unit recorded, nothing to refetch yet.
    UnitSet,
    /// A new place and payload were installed. Emitted once per resolution;
    /// callers hang place-level side effects (titles, backgrounds) off it.
    Resolved(Place),
    /// Payload refetched for the current place.
    Refreshed,
    /// The action failed; the message is now in `state.error`.
    Failed(String),
}

#[derive(Debug)]
pub struct Widget {
    resolver: Box<dyn LocationResolver>,
    fetcher: Box<dyn WeatherFetcher>,
    geolocator: Box<dyn Geolocator>,
    state: WidgetState,
}

impl Widget {
    pub fn new(
        resolver: Box<dyn LocationResolver>,
        fetcher: Box<dyn WeatherFetcher>,
        geolocator: Box<dyn Geolocator>,
    ) -> Self {
        Self { resolver, fetcher, geolocator, state: WidgetState::default() }
    }

    /// Widget backed by Open-Meteo and the configured geolocation source.
    pub fn from_config<C>(config: &Config, consent: C) -> anyhow::Result<Self>
    where
        C: LocationConsent + 'static,
    {
        let open_meteo = OpenMeteo::from_config(config)?;
        let geolocator = geolocator_from_config(config, consent)?;

        Ok(Self::new(Box::new(open_meteo.clone()), Box::new(open_meteo), geolocator)
            .with_unit(config.default_unit))
    }

    pub fn with_unit(mut self, unit: UnitPreference) -> Self {
        self.state.unit = unit;
        self
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn render(&self) -> String {
        render::render(&self.state)
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.query = query.into();
    }

    pub async fn submit_search(&mut self) -> Transition {
        if self.state.loading {
            tracing::debug!("search ignored, lookup in flight");
            return Transition::Ignored;
        }

        let query = self.state.query.trim().to_string();
        if query.is_empty() {
            return Transition::Ignored;
        }

        self.begin();
        let result =
            lookup_by_name(self.resolver.as_ref(), self.fetcher.as_ref(), &query, self.state.unit)
                .await;

        match result {
            Ok((place, payload)) => self.resolved(place, payload),
            Err(err) => {
                tracing::warn!(stage = err.stage(), query = %query, "search failed: {err}");
                self.failed(err.to_string())
            }
        }
    }

    pub async fn use_my_location(&mut self) -> Transition {
        if self.state.loading {
            tracing::debug!("location request ignored, lookup in flight");
            return Transition::Ignored;
        }

        self.begin();
        let result =
            lookup_by_geolocation(self.geolocator.as_ref(), self.fetcher.as_ref(), self.state.unit)
                .await;

        match result {
            Ok((place, payload)) => self.resolved(place, payload),
            Err(err) => {
                tracing::warn!(stage = err.stage(), "location lookup failed: {err}");
                self.failed(err.to_string())
            }
        }
    }

    /// Unit of the values on screen. Differs from `state.unit` after a
    /// failed refetch, when the previous payload is still shown.
    pub fn displayed_unit(&self) -> UnitPreference {
        self.state.payload.as_ref().map_or(self.state.unit, |p| p.unit)
    }

    pub async fn change_unit(&mut self, unit: UnitPreference) -> Transition {
        let settled = self.state.error.is_none() && self.state.unit == self.displayed_unit();
        if settled && unit == self.state.unit {
            return Transition::Ignored;
        }
        self.state.unit = unit;

        let Some(coordinates) = self.state.place.as_ref().map(Place::coordinates) else {
            return Transition::UnitSet;
        };

        self.begin();
        match self.fetcher.fetch_weather(coordinates, unit).await {
            Ok(payload) => {
                self.state.payload = Some(payload);
                self.state.loading = false;
                Transition::Refreshed
            }
            Err(err) => {
                tracing::warn!(%unit, "refetch after unit change failed: {err}");
                self.failed(err.to_string())
            }
        }
    }

    pub async fn toggle_unit(&mut self) -> Transition {
        let next = self.displayed_unit().toggled();
        self.change_unit(next).await
    }

    fn begin(&mut self) {
        self.state.loading = true;
        self.state.error = None;
    }

    fn resolved(&mut self, place: Place, payload: WeatherPayload) -> Transition {
        self.state.place = Some(place.clone());
        self.state.payload = Some(payload);
        self.state.loading = false;
        Transition::Resolved(place)
    }

    fn failed(&mut self, message: String) -> Transition {
        self.state.error = Some(message.clone());
        self.state.loading = false;
        Transition::Failed(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{LocationError, WeatherError},
        model::{Coordinates, CurrentConditions, DailyForecast},
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct Calls {
        resolves: Vec<String>,
        fetches: Vec<(Coordinates, UnitPreference)>,
    }

    #[derive(Debug, Clone)]
    struct FakeResolver {
        calls: Arc<Mutex<Calls>>,
        result: Result<Place, LocationError>,
    }

    #[async_trait]
    impl LocationResolver for FakeResolver {
        async fn resolve_by_name(&self, query: &str) -> Result<Place, LocationError> {
            self.calls.lock().unwrap().resolves.push(query.to_string());
            self.result.clone()
        }
    }

    #[derive(Debug, Clone)]
    struct FakeFetcher {
        calls: Arc<Mutex<Calls>>,
        fail: Arc<Mutex<bool>>,
    }

    #[async_trait]
    impl WeatherFetcher for FakeFetcher {
        async fn fetch_weather(
            &self,
            coordinates: Coordinates,
            unit: UnitPreference,
        ) -> Result<WeatherPayload, WeatherError> {
            self.calls.lock().unwrap().fetches.push((coordinates, unit));
            if *self.fail.lock().unwrap() {
                return Err(WeatherError::Network("status 503".into()));
            }
            Ok(payload(unit))
        }
    }

    #[derive(Debug)]
    struct FakeGeo(Result<Coordinates, LocationError>);

    #[async_trait]
    impl Geolocator for FakeGeo {
        async fn locate(&self) -> Result<Coordinates, LocationError> {
            self.0.clone()
        }
    }

    fn orlando() -> Place {
        Place { name: "Orlando".into(), country: "US".into(), lat: 28.5, lon: -81.4 }
    }

    fn payload(unit: UnitPreference) -> WeatherPayload {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        WeatherPayload {
            current: CurrentConditions {
                temperature: 72.4,
                apparent_temperature: 74.0,
                humidity: 50,
                wind_speed: 5.0,
                weather_code: 0,
                observed_at: day.and_hms_opt(14, 0, 0).unwrap(),
            },
            daily: DailyForecast::new(vec![day], vec![0], vec![80.0], vec![65.0]).unwrap(),
            unit,
            timezone: "America/New_York".into(),
        }
    }

    struct Harness {
        widget: Widget,
        calls: Arc<Mutex<Calls>>,
        fail_fetch: Arc<Mutex<bool>>,
    }

    fn harness(
        resolve: Result<Place, LocationError>,
        geo: Result<Coordinates, LocationError>,
    ) -> Harness {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let fail_fetch = Arc::new(Mutex::new(false));
        let widget = Widget::new(
            Box::new(FakeResolver { calls: calls.clone(), result: resolve }),
            Box::new(FakeFetcher { calls: calls.clone(), fail: fail_fetch.clone() }),
            Box::new(FakeGeo(geo)),
        );
        Harness { widget, calls, fail_fetch }
    }

    fn default_harness() -> Harness {
        harness(Ok(orlando()), Err(LocationError::Unsupported))
    }

    #[test]
    fn initial_state() {
        let h = default_harness();
        let state = h.widget.state();

        assert_eq!(state.query, "");
        assert_eq!(state.unit, UnitPreference::Fahrenheit);
        assert!(state.place.is_none());
        assert!(state.payload.is_none());
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn blank_query_is_a_no_op() {
        let mut h = default_harness();
        h.widget.set_query("   \t ");
        let before = h.widget.state().clone();

        assert_eq!(h.widget.submit_search().await, Transition::Ignored);
        assert_eq!(h.widget.state(), &before);
        assert!(h.calls.lock().unwrap().resolves.is_empty());
        assert!(h.calls.lock().unwrap().fetches.is_empty());
    }

    #[tokio::test]
    async fn search_resolves_then_fetches() {
        let mut h = default_harness();
        h.widget.set_query("  Orlando ");

        let t = h.widget.submit_search().await;

        assert_eq!(t, Transition::Resolved(orlando()));
        let state = h.widget.state();
        assert_eq!(state.place, Some(orlando()));
        assert!(state.payload.is_some());
        assert!(!state.loading);
        assert!(state.error.is_none());

        let calls = h.calls.lock().unwrap();
        assert_eq!(calls.resolves, vec!["Orlando".to_string()]);
        assert_eq!(
            calls.fetches,
            vec![(Coordinates::new(28.5, -81.4), UnitPreference::Fahrenheit)]
        );
    }

    #[tokio::test]
    async fn search_ignored_while_loading() {
        let mut h = default_harness();
        h.widget.set_query("Orlando");
        h.widget.state.loading = true;

        assert_eq!(h.widget.submit_search().await, Transition::Ignored);
        assert_eq!(h.widget.use_my_location().await, Transition::Ignored);
        assert!(h.calls.lock().unwrap().resolves.is_empty());
    }

    #[tokio::test]
    async fn not_found_keeps_previous_result() {
        let mut h = default_harness();
        h.widget.set_query("Orlando");
        h.widget.submit_search().await;
        let previous = h.widget.state().payload.clone();

        h.widget.resolver = Box::new(FakeResolver {
            calls: h.calls.clone(),
            result: Err(LocationError::NotFound { query: "Atlantis".into() }),
        });
        h.widget.set_query("Atlantis");
        let t = h.widget.submit_search().await;

        assert_eq!(t, Transition::Failed("No results for that city".into()));
        let state = h.widget.state();
        assert_eq!(state.error.as_deref(), Some("No results for that city"));
        assert!(!state.loading);
        assert_eq!(state.place, Some(orlando()));
        assert_eq!(state.payload, previous);
        // no forecast call for the failed search
        assert_eq!(h.calls.lock().unwrap().fetches.len(), 1);
    }

    #[tokio::test]
    async fn next_attempt_clears_error() {
        let mut h = harness(
            Err(LocationError::NotFound { query: "x".into() }),
            Ok(Coordinates::new(1.0, 2.0)),
        );
        h.widget.set_query("x");
        h.widget.submit_search().await;
        assert!(h.widget.state().error.is_some());

        let t = h.widget.use_my_location().await;

        assert!(matches!(t, Transition::Resolved(_)));
        assert!(h.widget.state().error.is_none());
    }

    #[tokio::test]
    async fn use_my_location_builds_placeholder_place() {
        let mut h = harness(Ok(orlando()), Ok(Coordinates::new(51.5, -0.12)));

        let t = h.widget.use_my_location().await;

        let expected = Place::my_location(Coordinates::new(51.5, -0.12));
        assert_eq!(t, Transition::Resolved(expected.clone()));
        assert_eq!(h.widget.state().place, Some(expected));
        assert!(h.calls.lock().unwrap().resolves.is_empty());
    }

    #[tokio::test]
    async fn use_my_location_permission_denied() {
        let mut h = harness(Ok(orlando()), Err(LocationError::PermissionDenied));

        let t = h.widget.use_my_location().await;

        assert_eq!(t, Transition::Failed("Location permission denied".into()));
        assert!(!h.widget.state().loading);
        assert!(h.calls.lock().unwrap().fetches.is_empty());
    }

    #[tokio::test]
    async fn change_unit_without_place_only_records_unit() {
        let mut h = default_harness();

        assert_eq!(h.widget.toggle_unit().await, Transition::UnitSet);
        assert_eq!(h.widget.state().unit, UnitPreference::Celsius);
        assert!(!h.widget.state().loading);
        assert!(h.calls.lock().unwrap().fetches.is_empty());
    }

    #[tokio::test]
    async fn change_unit_refetches_without_geocoding() {
        let mut h = default_harness();
        h.widget.set_query("Orlando");
        h.widget.submit_search().await;

        let t = h.widget.change_unit(UnitPreference::Celsius).await;

        assert_eq!(t, Transition::Refreshed);
        let calls = h.calls.lock().unwrap();
        assert_eq!(calls.resolves.len(), 1);
        assert_eq!(calls.fetches.len(), 2);
        assert_eq!(calls.fetches[1], (Coordinates::new(28.5, -81.4), UnitPreference::Celsius));
        assert_eq!(
            h.widget.state().payload.as_ref().map(|p| p.unit),
            Some(UnitPreference::Celsius)
        );
    }

    #[tokio::test]
    async fn change_unit_to_current_unit_is_ignored() {
        let mut h = default_harness();
        h.widget.set_query("Orlando");
        h.widget.submit_search().await;

        assert_eq!(h.widget.change_unit(UnitPreference::Fahrenheit).await, Transition::Ignored);
        assert_eq!(h.calls.lock().unwrap().fetches.len(), 1);
    }

    #[tokio::test]
    async fn failed_refetch_keeps_old_payload() {
        let mut h = default_harness();
        h.widget.set_query("Orlando");
        h.widget.submit_search().await;
        *h.fail_fetch.lock().unwrap() = true;

        let t = h.widget.toggle_unit().await;

        assert_eq!(t, Transition::Failed("Weather request failed: status 503".into()));
        let state = h.widget.state();
        assert_eq!(state.unit, UnitPreference::Celsius);
        assert_eq!(state.payload.as_ref().map(|p| p.unit), Some(UnitPreference::Fahrenheit));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn retrying_failed_unit_change_refetches() {
        let mut h = default_harness();
        h.widget.set_query("Orlando");
        h.widget.submit_search().await;
        *h.fail_fetch.lock().unwrap() = true;
        h.widget.change_unit(UnitPreference::Celsius).await;
        assert_eq!(h.widget.displayed_unit(), UnitPreference::Fahrenheit);
        *h.fail_fetch.lock().unwrap() = false;

        let t = h.widget.change_unit(UnitPreference::Celsius).await;

        assert_eq!(t, Transition::Refreshed);
        let state = h.widget.state();
        assert_eq!(state.payload.as_ref().map(|p| p.unit), Some(UnitPreference::Celsius));
        assert!(state.error.is_none());
        assert_eq!(h.calls.lock().unwrap().fetches.len(), 3);
    }

    #[tokio::test]
    async fn toggle_after_failed_change_targets_the_other_displayed_unit() {
        let mut h = default_harness();
        h.widget.set_query("Orlando");
        h.widget.submit_search().await;
        *h.fail_fetch.lock().unwrap() = true;
        h.widget.toggle_unit().await;
        *h.fail_fetch.lock().unwrap() = false;

        let t = h.widget.toggle_unit().await;

        assert_eq!(t, Transition::Refreshed);
        assert_eq!(h.widget.displayed_unit(), UnitPreference::Celsius);
        assert_eq!(
            h.calls.lock().unwrap().fetches.last().map(|f| f.1),
            Some(UnitPreference::Celsius)
        );
    }
}
