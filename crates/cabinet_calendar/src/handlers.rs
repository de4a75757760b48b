use crate::logic::render_calendar;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use cabinet_common::CabinetError;
use cabinet_config::CalendarConfig;
use cabinet_db::ReservationRepository;
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::error;

pub struct CalendarState {
    pub store: Arc<dyn ReservationRepository>,
    pub config: CalendarConfig,
    pub timezone: Tz,
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/calendar.ics",
    responses(
        (status = 200, description = "iCalendar feed of confirmed reservations", content_type = "text/calendar"),
        (status = 500, description = "Reservation store unavailable")
    ),
    tag = "Calendar"
))]
pub async fn calendar_feed_handler(
    State(state): State<Arc<CalendarState>>,
) -> Result<Response, CabinetError> {
    let reservations = state.store.snapshot().await.map_err(|e| {
        error!("Calendar feed could not read reservations: {}", e);
        CabinetError::from(e)
    })?;

    let body = render_calendar(&reservations, &state.config, state.timezone);
    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"calendar.ics\""),
        ],
        body,
    )
        .into_response())
}
