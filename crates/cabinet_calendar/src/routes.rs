use crate::handlers::{calendar_feed_handler, CalendarState};
use axum::{routing::get, Router};
use cabinet_config::CalendarConfig;
use cabinet_db::ReservationRepository;
use chrono_tz::Tz;
use std::sync::Arc;

/// Creates a router serving the calendar feed.
pub fn routes(store: Arc<dyn ReservationRepository>, config: CalendarConfig, timezone: Tz) -> Router {
    let state = Arc::new(CalendarState {
        store,
        config,
        timezone,
    });

    Router::new()
        .route("/calendar.ics", get(calendar_feed_handler))
        .with_state(state)
}
