//! Where everything lives under the data directory.

use std::path::{Path, PathBuf};

use crate::identifiers::{slug, RouteNumber};
use crate::models::RouteKey;

#[derive(Clone, Debug)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `halts.json`
    pub fn halts_path(&self) -> PathBuf {
        self.root.join("halts.json")
    }

    /// `segments.json`
    pub fn segments_path(&self) -> PathBuf {
        self.root.join("segments.json")
    }

    pub fn routes_dir(&self) -> PathBuf {
        self.root.join("routes")
    }

    /// `routes/<route_num>-<direction>.json`
    pub fn route_path(&self, key: &RouteKey) -> PathBuf {
        self.routes_dir().join(format!("{key}.json"))
    }

    /// `segments/<route_num>-<start>-<end>.json`, one per directions lookup
    pub fn segment_cache_path(
        &self,
        route_num: &RouteNumber,
        start_location: &str,
        end_location: &str,
    ) -> PathBuf {
        self.root.join("segments").join(format!(
            "{}-{}-{}.json",
            route_num,
            slug(start_location),
            slug(end_location)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;

    #[test]
    fn test_paths() {
        let layout = DataLayout::new("data");
        assert_eq!(layout.halts_path(), PathBuf::from("data/halts.json"));
        assert_eq!(
            layout.route_path(&RouteKey::new("138", Direction::Southbound)),
            PathBuf::from("data/routes/138-southbound.json")
        );
        assert_eq!(
            layout.segment_cache_path(
                &RouteNumber::new("138"),
                "Homagama Bus Station",
                "Pettah Bus Station"
            ),
            PathBuf::from("data/segments/138-homagama-bus-station-pettah-bus-station.json")
        );
    }
}
