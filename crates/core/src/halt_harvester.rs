//! Collects halts along stored routes from a places service.

use indicatif::{ProgressBar, ProgressStyle};
use lanka_bus_transit::store::read_all_routes;
use lanka_bus_transit::{
    DataLayout, DedupReport, Halt, HaltCache, LatLng, Route, dedupe_by_key, dedupe_halts,
    haversine_distance, name_latlng_key,
};
use tracing::{info, warn};

use crate::clients::{NearbyQuery, Place, PlacesService};
use crate::error::Result;
use crate::settings::Settings;

pub struct HaltHarvester<'a> {
    places: &'a dyn PlacesService,
    settings: &'a Settings,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum PlaceKey {
    Id(String),
    NameLatLng(String, (i64, i64)),
}

impl<'a> HaltHarvester<'a> {
    pub fn new(places: &'a dyn PlacesService, settings: &'a Settings) -> Self {
        Self { places, settings }
    }

    /// Search around points spaced along every route and turn the results
    /// into a deduplicated halt list.
    pub fn harvest(&self, routes: &[Route]) -> Result<(Vec<Halt>, DedupReport)> {
        let centers: Vec<LatLng> = routes
            .iter()
            .flat_map(|route| sample_by_distance(&route.latlng_list, self.settings.sample_spacing_m))
            .collect();

        let progress = ProgressBar::new(centers.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{bar:40.green} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        progress.set_message("searching for halts");

        let mut found: Vec<Place> = Vec::new();
        for center in centers {
            let query = NearbyQuery {
                center,
                radius_m: self.settings.search_radius_m,
                place_type: &self.settings.place_type,
                keyword: self.settings.place_keyword.as_deref(),
            };
            found.extend(self.places.nearby_places(&query)?);
            progress.inc(1);
        }
        progress.finish_and_clear();

        let raw_count = found.len();
        let places = dedupe_by_key(found, |place| match &place.place_id {
            Some(id) => PlaceKey::Id(id.clone()),
            None => {
                let (name, key) = name_latlng_key(&place.name, place.latlng);
                PlaceKey::NameLatLng(name, key)
            }
        });
        info!("{} places found, {} distinct", raw_count, places.len());

        Ok(dedupe_halts(
            places.into_iter().map(|place| Halt::new(&place.name, place.latlng)),
        ))
    }

    /// Rebuild the halt file from every stored route. Halts already in the
    /// file keep their place at the front.
    pub fn build_all(&self, layout: &DataLayout, cache: &mut HaltCache) -> Result<Vec<Halt>> {
        let routes = read_all_routes(&layout.routes_dir())?;
        if routes.is_empty() {
            warn!("No routes under {}, nothing to search along", layout.routes_dir().display());
        }

        let halts_path = layout.halts_path();
        let existing = cache.list_all(&halts_path)?;
        let (harvested, _) = self.harvest(&routes)?;

        let (halts, report) = dedupe_halts(existing.into_iter().chain(harvested));
        if !report.collisions.is_empty() {
            warn!("{} halt id collisions, first seen kept", report.collisions.len());
        }
        cache.write(&halts_path, &halts)?;
        Ok(halts)
    }
}

/// The first point, then each point at least `spacing_m` along the path from
/// the previous sample, then the last point.
pub fn sample_by_distance(points: &[LatLng], spacing_m: f64) -> Vec<LatLng> {
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return Vec::new();
    };

    let mut samples = vec![first];
    let mut travelled = 0.0;
    for pair in points.windows(2) {
        travelled += haversine_distance(pair[0], pair[1]);
        if travelled >= spacing_m {
            samples.push(pair[1]);
            travelled = 0.0;
        }
    }
    if samples.last() != Some(&last) {
        samples.push(last);
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;
    use lanka_bus_transit::store::{read_halts, write_halts, write_route};
    use lanka_bus_transit::{Direction, RouteKey};
    use std::time::Duration;

    fn settings() -> Settings {
        Settings {
            sample_spacing_m: 1_000.0,
            search_radius_m: 600.0,
            page_delay: Duration::ZERO,
            ..Settings::default()
        }
    }

    // Straight line north from (6.90, 79.86), about 2.2 km long
    fn straight_route() -> Route {
        Route::new(
            RouteKey::new("138", Direction::Northbound),
            (0..=20).map(|i| LatLng::new(6.90 + i as f64 * 0.001, 79.86)).collect(),
        )
    }

    #[test]
    fn test_sample_by_distance() {
        let points = straight_route().latlng_list;
        let samples = sample_by_distance(&points, 1_000.0);
        // ~111 m per step: samples at 0, 9, 18 steps, then the end
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0], points[0]);
        assert_eq!(samples[1], points[9]);
        assert_eq!(samples[2], points[18]);
        assert_eq!(samples[3], points[20]);

        assert!(sample_by_distance(&[], 100.0).is_empty());
        assert_eq!(sample_by_distance(&points[..1], 100.0), vec![points[0]]);
    }

    #[test]
    fn test_harvest_dedupes_overlapping_searches() {
        let places = FakePlaces::new(vec![
            place(Some("a"), "Wellawatte", 6.9010, 79.8600),
            place(Some("b"), "Bambalapitiya", 6.9100, 79.8600),
            // Same stop listed twice by the service under different ids
            place(Some("c"), "Bambalapitiya", 6.91001, 79.86001),
            place(None, "Kollupitiya", 6.9190, 79.8600),
            place(Some("far"), "Kandy", 7.2906, 80.6337),
        ]);
        let settings = settings();
        let harvester = HaltHarvester::new(&places, &settings);

        let (halts, report) = harvester.harvest(&[straight_route()]).unwrap();
        let names: Vec<&str> = halts.iter().map(Halt::name).collect();
        assert_eq!(names, vec!["Wellawatte", "Bambalapitiya", "Kollupitiya"]);
        assert_eq!(report.collisions.len(), 0);
        assert_eq!(places.queries.borrow().len(), 4);
    }

    #[test]
    fn test_build_all_keeps_existing_halts_first() {
        let dir = temp_dir("harvest");
        let layout = DataLayout::new(&dir);
        let route = straight_route();
        write_route(&layout.route_path(&route.key()), &route).unwrap();
        let manual = Halt::new("Manual Stop", LatLng::new(6.95, 79.85));
        write_halts(&layout.halts_path(), &[manual.clone()]).unwrap();

        let places = FakePlaces::new(vec![place(Some("a"), "Wellawatte", 6.9010, 79.8600)]);
        let settings = settings();
        let harvester = HaltHarvester::new(&places, &settings);
        let mut cache = HaltCache::new();

        let halts = harvester.build_all(&layout, &mut cache).unwrap();
        assert_eq!(halts.len(), 2);
        assert_eq!(halts[0], manual);
        assert_eq!(read_halts(&layout.halts_path()).unwrap(), halts);

        // Running again changes nothing
        let again = harvester.build_all(&layout, &mut cache).unwrap();
        assert_eq!(again, halts);
    }
}
