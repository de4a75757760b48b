//! Calendar feed of confirmed reservations, one event per booking.

pub mod handlers;
pub mod logic;
pub mod routes;

pub use logic::render_calendar;
pub use routes::routes;

#[cfg(feature = "openapi")]
pub mod doc {
    use utoipa::OpenApi;

    #[derive(OpenApi)]
    #[openapi(
        paths(crate::handlers::calendar_feed_handler),
        tags((name = "Calendar", description = "iCalendar feed"))
    )]
    pub struct CalendarApiDoc;
}
