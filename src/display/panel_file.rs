//! Display panel backed by a plain text file.

use std::fs;
use std::path::{Path, PathBuf};

use super::DisplayPanel;
use crate::error::DisplayError;

/// Writes the visible lines to a file, one per line.
///
/// Each draw replaces the file through a rename, so a reader never sees a
/// half-written screen.
#[derive(Debug)]
pub struct PanelFile {
    path: PathBuf,
}

impl PanelFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, contents: &str) -> Result<(), DisplayError> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, contents).map_err(|source| DisplayError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| DisplayError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl DisplayPanel for PanelFile {
    fn init(&mut self) -> Result<(), DisplayError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| DisplayError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        self.write_atomic("")
    }

    fn draw(&mut self, lines: &[String]) -> Result<(), DisplayError> {
        let mut contents = lines.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        self.write_atomic(&contents)
    }

    fn deinit(&mut self) {
        if let Err(e) = self.write_atomic("") {
            tracing::debug!("Failed to clear display panel: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_parent_and_empty_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("run").join("panel.txt");
        let mut panel = PanelFile::new(&path);

        panel.init().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn draw_replaces_contents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("panel.txt");
        let mut panel = PanelFile::new(&path);
        panel.init().unwrap();

        panel
            .draw(&["LAN: 192.168.1.50".to_string(), "MAC: aa:bb:cc:dd:ee:ff".to_string()])
            .unwrap();
        panel.draw(&["Goodbye!".to_string()]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "Goodbye!\n");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn deinit_clears_panel() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("panel.txt");
        let mut panel = PanelFile::new(&path);
        panel.init().unwrap();
        panel.draw(&["x".to_string()]).unwrap();

        panel.deinit();

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn init_fails_when_parent_is_a_file() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let mut panel = PanelFile::new(blocker.join("panel.txt"));

        assert!(matches!(panel.init(), Err(DisplayError::Io { .. })));
    }
}
