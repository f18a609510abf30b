//! Flat-file persistence for halts, routes and segments.

pub mod halt_cache;
pub mod json_file;
pub mod layout;

use std::path::Path;

use tracing::info;

use crate::models::{Halt, HaltRecord, LatLng, Result, Route, Segment, SegmentCollection};

pub use halt_cache::HaltCache;
pub use json_file::{read_json, write_json};
pub use layout::DataLayout;

/// Load a halt collection. Every stored id is checked against its name and
/// coordinates.
pub fn read_halts(path: &Path) -> Result<Vec<Halt>> {
    let records: Vec<HaltRecord> = read_json(path)?;
    records.into_iter().map(Halt::try_from).collect()
}

pub fn write_halts(path: &Path, halts: &[Halt]) -> Result<()> {
    let records: Vec<HaltRecord> = halts.iter().map(HaltRecord::from).collect();
    write_json(path, &records)?;
    info!("Wrote {} halts to {}", halts.len(), path.display());
    Ok(())
}

pub fn read_route(path: &Path) -> Result<Route> {
    read_json(path)
}

pub fn write_route(path: &Path, route: &Route) -> Result<()> {
    write_json(path, route)?;
    info!(
        "Wrote route {} ({} points) to {}",
        route.key(),
        route.latlng_list.len(),
        path.display()
    );
    Ok(())
}

/// Every route file in `dir`, sorted by file name.
pub fn read_all_routes(dir: &Path) -> Result<Vec<Route>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|source| crate::models::TransitError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    paths.iter().map(|p| read_route(p)).collect()
}

pub fn read_segment_cache(path: &Path) -> Result<Vec<LatLng>> {
    read_json(path)
}

pub fn write_segment_cache(path: &Path, latlng_list: &[LatLng]) -> Result<()> {
    write_json(path, latlng_list)
}

pub fn read_segments(path: &Path) -> Result<SegmentCollection> {
    let segments: Vec<Segment> = read_json(path)?;
    Ok(SegmentCollection::new(segments))
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fresh, empty directory under the system temp dir.
    pub fn temp_dir(label: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "lanka-bus-transit-{}-{}-{}",
            label,
            std::process::id(),
            n
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
