use crate::builder::ComponentMap;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Write the graph as a JSON object keyed by component id.
///
/// The file is written next to its destination and renamed into place, so a
/// failed save never leaves a partial graph behind.
pub fn save(components: &ComponentMap, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let bytes = serde_json::to_vec_pretty(components)?;
    let tmp = tmp_path(path);
    if let Err(e) = std::fs::write(&tmp, bytes).and_then(|()| std::fs::rename(&tmp, path)) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }

    log::info!("Saved {} components to {}", components.len(), path.display());
    Ok(())
}

/// Read a graph written by [`save`]. Missing optional fields take defaults.
pub fn load(path: impl AsRef<Path>) -> Result<ComponentMap> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let components: ComponentMap = serde_json::from_slice(&bytes)?;
    log::debug!("Loaded {} components from {}", components.len(), path.display());
    Ok(components)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
