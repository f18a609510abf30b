//! OpenStreetMap Overpass API.

use std::collections::HashMap;

use lanka_bus_transit::{LatLng, RouteNumber};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::clients::{RelationService, http_client};
use crate::error::Result;
use crate::settings::Settings;

pub struct OverpassClient {
    http: Client,
    endpoint: String,
    area: String,
}

impl OverpassClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            http: http_client(settings.http_timeout)?,
            endpoint: settings.overpass_url.clone(),
            area: settings.overpass_area.clone(),
        })
    }
}

impl RelationService for OverpassClient {
    fn route_relation_latlng_list(&self, route_num: &RouteNumber) -> Result<Vec<LatLng>> {
        let query = bus_route_query(&self.area, route_num);
        debug!("Overpass query:\n{query}");
        let response: OverpassResponse = self
            .http
            .get(&self.endpoint)
            .query(&[("data", query.as_str())])
            .send()?
            .error_for_status()?
            .json()?;
        Ok(relation_latlng_list(&response))
    }
}

/// Bus route relations tagged `ref=<route_num>` inside the named area, with
/// every member way and node recursed down.
fn bus_route_query(area: &str, route_num: &RouteNumber) -> String {
    format!(
        r#"[out:json][timeout:25];
area["name"="{area}"]->.searchArea;
(
  relation["type"="route"]["route"="bus"]["ref"="{route_num}"](area.searchArea);
);
out body;
>;
out body qt;"#,
        area = escape(area),
        route_num = escape(route_num.as_str()),
    )
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Element {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
    },
    Relation {
        id: i64,
        #[serde(default)]
        members: Vec<Member>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Member {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "ref")]
    id: i64,
}

/// Node coordinates of every way member, relation by relation, in member
/// order. Stop and platform node members are skipped.
fn relation_latlng_list(response: &OverpassResponse) -> Vec<LatLng> {
    let mut nodes = HashMap::new();
    let mut ways = HashMap::new();
    for element in &response.elements {
        match element {
            Element::Node { id, lat, lon } => {
                nodes.insert(*id, LatLng::new(*lat, *lon));
            }
            Element::Way { id, nodes: refs } => {
                ways.insert(*id, refs);
            }
            Element::Relation { .. } | Element::Other => {}
        }
    }

    let mut latlng_list = Vec::new();
    for element in &response.elements {
        let Element::Relation { id, members } = element else {
            continue;
        };
        for member in members.iter().filter(|m| m.kind == "way") {
            let Some(refs) = ways.get(&member.id) else {
                warn!("Relation {id} references missing way {}", member.id);
                continue;
            };
            latlng_list.extend(refs.iter().filter_map(|node_id| nodes.get(node_id).copied()));
        }
    }
    latlng_list
}
