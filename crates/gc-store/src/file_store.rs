use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use gc_core::{GcError, Result};

/// Read a whole file, mapping a missing path to `InputNotFound`.
pub fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => GcError::InputNotFound { path: path.display().to_string() },
        _ => GcError::Io(e),
    })
}

/// Write through a sibling temp file and rename into place.
pub fn write_atomic(path: &Path, value: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    let result = (|| -> std::io::Result<()> {
        let mut f = fs::File::create(&tmp_path)?;
        f.write_all(value)?;
        f.flush()?;
        f.sync_all()?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    })();
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}
