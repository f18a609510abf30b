//! The full build: routes, then halts along them, then maps.

use lanka_bus_transit::store::read_all_routes;
use lanka_bus_transit::{Direction, HaltCache, RouteKey};
use tracing::info;

use crate::clients::{DirectionsService, PlacesService};
use crate::error::Result;
use crate::halt_harvester::HaltHarvester;
use crate::render::{MapRenderer, draw_halts, draw_route};
use crate::route_builder::RouteBuilder;
use crate::settings::Settings;

#[derive(Clone, Debug, PartialEq)]
pub struct PlannedRoute {
    pub key: RouteKey,
    pub start_location: String,
    pub end_location: String,
}

impl PlannedRoute {
    pub fn new(
        route_num: &str,
        direction: Direction,
        start_location: &str,
        end_location: &str,
    ) -> Self {
        Self {
            key: RouteKey::new(route_num, direction),
            start_location: start_location.into(),
            end_location: end_location.into(),
        }
    }
}

/// Route 138 both ways between Homagama and Pettah.
pub fn default_routes() -> Vec<PlannedRoute> {
    vec![
        PlannedRoute::new(
            "138",
            Direction::Northbound,
            "Homagama Bus Station",
            "Pettah Bus Station",
        ),
        PlannedRoute::new(
            "138",
            Direction::Southbound,
            "Pettah Bus Station",
            "Homagama Bus Station",
        ),
    ]
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub routes: usize,
    pub halts: usize,
    pub images: usize,
}

pub struct Pipeline<'a> {
    pub settings: &'a Settings,
    pub directions: &'a dyn DirectionsService,
    pub places: &'a dyn PlacesService,
    pub renderer: &'a MapRenderer,
}

impl Pipeline<'_> {
    pub fn run(&self, planned: &[PlannedRoute], cache: &mut HaltCache) -> Result<PipelineSummary> {
        let layout = self.settings.layout();
        let halts_path = layout.halts_path();
        let mut summary = PipelineSummary::default();

        for plan in planned {
            let index = cache.index(&halts_path)?;
            let route = RouteBuilder::new(&layout, index.clone(), self.settings.threshold_m).build(
                plan.key.clone(),
                &plan.start_location,
                &plan.end_location,
                self.directions,
            )?;
            draw_route(
                self.renderer,
                &route,
                &index,
                self.settings.threshold_m,
                &self.settings.route_image_path(&plan.key),
            )?;
            summary.routes += 1;
            summary.images += 1;
        }

        let halts = HaltHarvester::new(self.places, self.settings).build_all(&layout, cache)?;
        summary.halts = halts.len();

        // Routes built before their halts were known get their names now
        let index = cache.index(&halts_path)?;
        let builder = RouteBuilder::new(&layout, index.clone(), self.settings.threshold_m);
        for route in read_all_routes(&layout.routes_dir())? {
            let route = builder.attach_halt_names(route)?;
            draw_route(
                self.renderer,
                &route,
                &index,
                self.settings.threshold_m,
                &self.settings.route_image_path(&route.key()),
            )?;
        }

        if !halts.is_empty() {
            draw_halts(self.renderer, &halts, &self.settings.halts_image_path())?;
            summary.images += 1;
        }

        info!(
            "Pipeline done: {} routes, {} halts, {} images",
            summary.routes, summary.halts, summary.images
        );
        Ok(summary)
    }
}
