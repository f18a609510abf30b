//! Google Maps Directions and Places web services.

use std::time::Duration;

use lanka_bus_transit::{LatLng, RouteNumber};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::clients::{DirectionsService, NearbyQuery, Place, PlacesService, http_client};
use crate::error::{Error, Result};
use crate::settings::{GMAPS_API_KEY_VAR, Settings};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";
const SERVICE_NAME: &str = "Google Maps";

/// The service never returns more than three pages of nearby results.
const MAX_PAGES: usize = 3;

/// Google encodes overview polylines with 5 decimal places.
const POLYLINE_PRECISION: u32 = 5;

pub struct GoogleMapsClient {
    http: Client,
    api_key: String,
    base_url: String,
    page_delay: Duration,
}

impl GoogleMapsClient {
    pub fn new(api_key: impl Into<String>, settings: &Settings) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::MissingCredential(GMAPS_API_KEY_VAR));
        }
        Ok(Self {
            http: http_client(settings.http_timeout)?,
            api_key,
            base_url: DEFAULT_BASE_URL.into(),
            page_delay: settings.page_delay,
        })
    }

    /// Build a client from `GMAPS_API_KEY`.
    pub fn from_env(settings: &Settings) -> Result<Self> {
        let api_key = std::env::var(GMAPS_API_KEY_VAR)
            .map_err(|_| Error::MissingCredential(GMAPS_API_KEY_VAR))?;
        Self::new(api_key, settings)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn directions(&self, start_location: &str, end_location: &str) -> Result<DirectionsResponse> {
        let url = format!("{}/directions/json", self.base_url);
        debug!("Directions {start_location} -> {end_location}");
        let response = self
            .http
            .get(&url)
            .query(&[
                ("origin", start_location),
                ("destination", end_location),
                ("mode", "transit"),
                ("alternatives", "true"),
                ("key", self.api_key.as_str()),
            ])
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response)
    }

    fn places_page(&self, query: &NearbyQuery<'_>, page_token: Option<&str>) -> Result<PlacesPage> {
        let url = format!("{}/place/nearbysearch/json", self.base_url);
        let mut params: Vec<(&str, String)> = vec![("key", self.api_key.clone())];
        match page_token {
            // A continuation request carries nothing but the token
            Some(token) => params.push(("pagetoken", token.to_string())),
            None => {
                params.push(("location", query.center.to_string()));
                params.push(("radius", format!("{:.0}", query.radius_m)));
                params.push(("type", query.place_type.to_string()));
                if let Some(keyword) = query.keyword {
                    params.push(("keyword", keyword.to_string()));
                }
            }
        }

        debug!("Nearby places around {} (page token: {})", query.center, page_token.is_some());
        let response: PlacesResponse = self
            .http
            .get(&url)
            .query(&params)
            .send()?
            .error_for_status()?
            .json()?;
        response.into_page()
    }
}

impl DirectionsService for GoogleMapsClient {
    fn route_latlng_list(
        &self,
        route_num: &RouteNumber,
        start_location: &str,
        end_location: &str,
    ) -> Result<Vec<LatLng>> {
        let response = self.directions(start_location, end_location)?;
        let routes = response.into_routes(start_location, end_location)?;
        let selected = select_route(&routes, route_num).ok_or_else(|| Error::NoRoute {
            start: start_location.into(),
            end: end_location.into(),
        })?;
        decode_overview(selected)
    }
}

impl PlacesService for GoogleMapsClient {
    fn nearby_places(&self, query: &NearbyQuery<'_>) -> Result<Vec<Place>> {
        collect_pages(
            |token| self.places_page(query, token),
            self.page_delay,
            MAX_PAGES,
        )
    }
}

// ============================================================================
// Directions
// ============================================================================

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
    error_message: Option<String>,
}

impl DirectionsResponse {
    fn into_routes(self, start_location: &str, end_location: &str) -> Result<Vec<DirectionsRoute>> {
        if self.status == "OK" && !self.routes.is_empty() {
            return Ok(self.routes);
        }
        if matches!(self.status.as_str(), "OK" | "ZERO_RESULTS" | "NOT_FOUND") {
            return Err(Error::NoRoute {
                start: start_location.into(),
                end: end_location.into(),
            });
        }
        Err(Error::Service {
            service: SERVICE_NAME,
            status: self.status,
            message: self.error_message,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    legs: Vec<Leg>,
    overview_polyline: EncodedPolyline,
}

#[derive(Debug, Deserialize)]
struct Leg {
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    transit_details: Option<TransitDetails>,
}

#[derive(Debug, Deserialize)]
struct TransitDetails {
    line: Option<TransitLine>,
}

#[derive(Debug, Deserialize)]
struct TransitLine {
    short_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EncodedPolyline {
    points: String,
}

impl DirectionsRoute {
    fn serves(&self, route_num: &RouteNumber) -> bool {
        self.legs
            .iter()
            .flat_map(|leg| &leg.steps)
            .filter_map(|step| step.transit_details.as_ref()?.line.as_ref()?.short_name.as_deref())
            .any(|short_name| short_name == route_num.as_str())
    }
}

/// The first alternative that rides `route_num`, else the first alternative.
fn select_route<'a>(
    routes: &'a [DirectionsRoute],
    route_num: &RouteNumber,
) -> Option<&'a DirectionsRoute> {
    routes
        .iter()
        .find(|route| route.serves(route_num))
        .or_else(|| routes.first())
}

fn decode_overview(route: &DirectionsRoute) -> Result<Vec<LatLng>> {
    let line = polyline::decode_polyline(&route.overview_polyline.points, POLYLINE_PRECISION)
        .map_err(|err| Error::Polyline(err.to_string()))?;
    Ok(line.0.into_iter().map(|c| LatLng::new(c.y, c.x)).collect())
}

// ============================================================================
// Places
// ============================================================================

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
    next_page_token: Option<String>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    place_id: Option<String>,
    name: String,
    geometry: PlaceGeometry,
}

#[derive(Debug, Deserialize)]
struct PlaceGeometry {
    location: PlaceLocation,
}

#[derive(Debug, Deserialize)]
struct PlaceLocation {
    lat: f64,
    lng: f64,
}

struct PlacesPage {
    places: Vec<Place>,
    next_page_token: Option<String>,
}

impl PlacesResponse {
    fn into_page(self) -> Result<PlacesPage> {
        if !matches!(self.status.as_str(), "OK" | "ZERO_RESULTS") {
            return Err(Error::Service {
                service: SERVICE_NAME,
                status: self.status,
                message: self.error_message,
            });
        }
        Ok(PlacesPage {
            places: self
                .results
                .into_iter()
                .map(|r| Place {
                    place_id: r.place_id,
                    name: r.name,
                    latlng: LatLng::new(r.geometry.location.lat, r.geometry.location.lng),
                })
                .collect(),
            next_page_token: self.next_page_token,
        })
    }
}

/// Follow continuation tokens, sleeping `delay` before each follow-up page.
fn collect_pages<F>(mut fetch_page: F, delay: Duration, max_pages: usize) -> Result<Vec<Place>>
where
    F: FnMut(Option<&str>) -> Result<PlacesPage>,
{
    let mut places = Vec::new();
    let mut token: Option<String> = None;

    for page in 0..max_pages {
        if page > 0 {
            // Tokens only become valid a short while after they are issued
            std::thread::sleep(delay);
        }
        let next = fetch_page(token.as_deref())?;
        places.extend(next.places);
        match next.next_page_token {
            Some(next_token) => token = Some(next_token),
            None => break,
        }
    }

    Ok(places)
}
