//! Catalogue overlay loading.
//!
//! An overlay directory holds YAML files, each containing either a single
//! fragment or a `fragments:` list. Overlay fragments add new axis values or
//! replace builtin ones.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::catalogue::FragmentCatalogue;
use crate::error::{CatalogueError, CatalogueResult};
use crate::fragment::Fragment;

#[derive(Deserialize)]
#[serde(untagged)]
enum FragmentFile {
    Many { fragments: Vec<Fragment> },
    One(Fragment),
}

/// Loads fragment overlays from a directory.
pub struct CatalogueLoader {
    catalogue_path: PathBuf,
}

impl CatalogueLoader {
    pub fn new(catalogue_path: impl Into<PathBuf>) -> Self {
        Self {
            catalogue_path: catalogue_path.into(),
        }
    }

    /// Load every fragment file under the directory into a new catalogue.
    ///
    /// Files are read in path order so later files win deterministically.
    pub fn load(&self) -> CatalogueResult<FragmentCatalogue> {
        if !self.catalogue_path.is_dir() {
            return Err(CatalogueError::NotFound(self.catalogue_path.clone()));
        }

        let mut catalogue = FragmentCatalogue::new();
        let mut files: Vec<PathBuf> = WalkDir::new(&self.catalogue_path)
            .min_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && is_yaml(p))
            .collect();
        files.sort();

        for path in files {
            for fragment in self.load_file(&path)? {
                catalogue.register(fragment);
            }
        }

        info!(
            "Loaded {} fragments from {:?}",
            catalogue.len(),
            self.catalogue_path
        );
        Ok(catalogue)
    }

    /// Overlay the directory's fragments onto `base` and verify the result.
    pub fn load_onto(&self, mut base: FragmentCatalogue) -> CatalogueResult<FragmentCatalogue> {
        base.merge(self.load()?);
        base.verify()?;
        Ok(base)
    }

    /// Load the fragments of a single file.
    pub fn load_file(&self, path: &Path) -> CatalogueResult<Vec<Fragment>> {
        debug!("Loading fragments from {:?}", path);
        let content = fs::read_to_string(path)?;
        let file: FragmentFile =
            serde_yaml::from_str(&content).map_err(|e| CatalogueError::InvalidFragment {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Ok(match file {
            FragmentFile::Many { fragments } => fragments,
            FragmentFile::One(fragment) => vec![fragment],
        })
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::Axis;
    use tempfile::tempdir;

    #[test]
    fn test_missing_directory() {
        let temp = tempdir().unwrap();
        let loader = CatalogueLoader::new(temp.path().join("nope"));
        assert!(matches!(loader.load(), Err(CatalogueError::NotFound(_))));
    }

    #[test]
    fn test_load_single_and_list_files() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("deno.yaml"),
            "axis: language\nvalue: deno\nname: Deno\n",
        )
        .unwrap();
        fs::write(
            temp.path().join("more.yml"),
            r#"
fragments:
  - axis: provider
    value: fly
    name: Fly.io
  - axis: service
    value: machines
    name: Fly Machines
    requires:
      - axis: provider
        any_of: [fly]
"#,
        )
        .unwrap();
        fs::write(temp.path().join("README.md"), "ignored").unwrap();

        let catalogue = CatalogueLoader::new(temp.path()).load().unwrap();

        assert_eq!(catalogue.len(), 3);
        assert!(catalogue.contains(Axis::Language, "deno"));
        assert!(catalogue.contains(Axis::Service, "machines"));
    }

    #[test]
    fn test_invalid_file_names_the_path() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("bad.yaml"), "axis: [oops").unwrap();

        let err = CatalogueLoader::new(temp.path()).load().unwrap_err();
        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn test_load_onto_verifies_overlay() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("broken.yaml"),
            r#"
axis: framework
value: remix
name: Remix
contributions:
  - stage: bundle
    steps:
      - name: Bundle
        run: npx remix build
"#,
        )
        .unwrap();

        let err = CatalogueLoader::new(temp.path())
            .load_onto(FragmentCatalogue::builtin())
            .unwrap_err();
        assert!(matches!(err, CatalogueError::Integrity { .. }));
    }
}
