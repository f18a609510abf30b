use lanka_bus_transit::TransitError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} environment variable not set")]
    MissingCredential(&'static str),

    #[error("No route found from {start} to {end}")]
    NoRoute { start: String, end: String },

    #[error("No bus route relation tagged ref={route_num}")]
    NoRelation { route_num: String },

    #[error("{service} returned {status}: {}", message.as_deref().unwrap_or("no message"))]
    Service {
        service: &'static str,
        status: String,
        message: Option<String>,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid polyline: {0}")]
    Polyline(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid Google Maps URL {url}: {reason}")]
    InvalidUrl { url: String, reason: &'static str },

    #[error("Invalid range: {start} to {end}. Total halts: {len}")]
    IndexOutOfRange { start: i64, end: i64, len: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Transit(#[from] TransitError),
}

pub type Result<T> = std::result::Result<T, Error>;
