use std::path::Path;

use super::{ensure_exists, AssetError};

/// Reads WGSL source from disk.
pub fn load_wgsl(path: &Path) -> Result<String, AssetError> {
    ensure_exists(path)?;
    std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wgsl");
        std::fs::write(&path, "@fragment fn fs() {}").unwrap();
        assert_eq!(load_wgsl(&path).unwrap(), "@fragment fn fs() {}");
    }

    #[test]
    fn missing_shader_is_reported() {
        let err = load_wgsl(Path::new("/definitely/not/here.wgsl")).unwrap_err();
        assert!(matches!(err, AssetError::Missing(_)));
        assert!(err.to_string().contains("here.wgsl"));
    }
}
