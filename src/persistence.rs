use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::network::ParamSnapshot;

/// Write a parameter snapshot with bincode, creating parent directories.
pub fn save_snapshot<P: AsRef<Path>>(snapshot: &ParamSnapshot, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let serialized = bincode::serialize(snapshot)?;
    fs::write(path, serialized)?;
    Ok(())
}

pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<ParamSnapshot> {
    let data = fs::read(path)?;
    Ok(bincode::deserialize(&data)?)
}

/// Save/restore of the online network parameters.
pub trait Persist {
    fn save_model(&self, path: &Path) -> Result<()>;

    fn load_model(&mut self, path: &Path) -> Result<()>;
}
