//! Adding halts by hand and picking halts out for inspection.

use std::path::Path;

use lanka_bus_transit::{Halt, HaltCache, LatLng, TransitError};
use tracing::{info, warn};
use url::{Url, form_urlencoded};

use crate::error::{Error, Result};

/// Name and coordinates of a Google Maps place link such as
/// `https://www.google.com/maps/place/Pettah+Bus+Stop/@6.93,79.84,17z/data=!3d6.9344!4d79.8428`.
///
/// The `!3d`/`!4d` pair is the place itself; `@lat,lng` is only the map
/// center and is used when the pair is missing.
pub fn parse_maps_url(text: &str) -> Result<(String, LatLng)> {
    let invalid = |reason| Error::InvalidUrl {
        url: text.to_string(),
        reason,
    };

    let url = Url::parse(text).map_err(|_| invalid("not a URL"))?;
    if !url.host_str().is_some_and(|host| host.contains("google.")) {
        return Err(invalid("not a Google Maps host"));
    }

    let segments: Vec<&str> = url.path_segments().map(Iterator::collect).unwrap_or_default();
    let name = segments
        .iter()
        .position(|segment| *segment == "place")
        .and_then(|i| segments.get(i + 1))
        .map(|segment| decode_segment(segment))
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| invalid("no /place/<name>/ segment"))?;

    let path = url.path();
    let latlng = match (data_value(path, "!3d"), data_value(path, "!4d")) {
        (Some(lat), Some(lng)) => LatLng::new(lat, lng),
        _ => segments
            .iter()
            .find_map(|segment| map_center(segment))
            .ok_or_else(|| invalid("no coordinates"))?,
    };
    if !latlng.is_valid() {
        return Err(invalid("coordinates out of range"));
    }

    Ok((name.trim().to_string(), latlng))
}

/// Percent and `+` decoding of one path segment.
fn decode_segment(segment: &str) -> String {
    form_urlencoded::parse(segment.as_bytes())
        .map(|(key, value)| {
            if value.is_empty() {
                key.into_owned()
            } else {
                format!("{key}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn data_value(path: &str, marker: &str) -> Option<f64> {
    let start = path.find(marker)? + marker.len();
    let rest = &path[start..];
    let end = rest.find('!').unwrap_or(rest.len());
    rest[..end].parse().ok()
}

/// `@6.9340,79.8420,17z`
fn map_center(segment: &str) -> Option<LatLng> {
    let mut parts = segment.strip_prefix('@')?.split(',');
    let lat = parts.next()?.parse().ok()?;
    let lng = parts.next()?.parse().ok()?;
    Some(LatLng::new(lat, lng))
}

/// Parse a typed coordinate, ignoring thousands separators.
pub fn parse_coordinate(text: &str) -> Result<f64> {
    text.replace(',', "")
        .trim()
        .parse()
        .map_err(|_| TransitError::InvalidData(format!("Invalid coordinate {text:?}")).into())
}

/// Append a halt to the halt file.
///
/// Adding a halt that is already there is a no-op. A different halt whose
/// identifier clashes with a stored one is an error.
pub fn add_new_halt(cache: &mut HaltCache, path: &Path, name: &str, latlng: LatLng) -> Result<Halt> {
    if !latlng.is_valid() {
        return Err(TransitError::InvalidData(format!("Coordinates out of range: {latlng}")).into());
    }
    let halt = Halt::new(name.trim(), latlng);
    let mut halts = cache.list_all(path)?;

    if let Some(existing) = halts.iter().find(|h| h.id() == halt.id()) {
        if existing.name() != halt.name() {
            return Err(TransitError::IdCollision {
                id: halt.id().clone(),
                existing: existing.name().to_string(),
                incoming: halt.name().to_string(),
            }
            .into());
        }
        warn!("Halt {} already exists", halt.id());
        return Ok(existing.clone());
    }

    info!("Adding halt {} ({})", halt.name(), halt.id());
    halts.push(halt.clone());
    cache.write(path, &halts)?;
    Ok(halt)
}

pub fn add_from_url(cache: &mut HaltCache, path: &Path, url: &str) -> Result<Halt> {
    let (name, latlng) = parse_maps_url(url)?;
    add_new_halt(cache, path, &name, latlng)
}

/// Halts `start..=end`, checked against the collection size.
pub fn select_range(halts: &[Halt], start: i64, end: i64) -> Result<&[Halt]> {
    let out_of_range = Error::IndexOutOfRange {
        start,
        end,
        len: halts.len(),
    };
    let (Ok(first), Ok(last)) = (usize::try_from(start), usize::try_from(end)) else {
        return Err(out_of_range);
    };
    if first > last || last >= halts.len() {
        return Err(out_of_range);
    }
    Ok(&halts[first..=last])
}
