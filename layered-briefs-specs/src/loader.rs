//! Fixture file loading.
//!
//! Fixtures live side by side in one directory. Every `.toml` file there is
//! a brief scenario except `expected_failures.toml`; subdirectories are not
//! searched.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{BriefFixture, SpecError, SpecResult};

pub const EXPECTED_FAILURES_FILE: &str = "expected_failures.toml";

/// Parse fixture TOML. `path` is only used in error messages.
pub fn parse_fixture(content: &str, path: &str) -> SpecResult<BriefFixture> {
    toml::from_str(content).map_err(|e| SpecError::Parse {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Load a single fixture file.
pub fn load_fixture(path: &Path) -> SpecResult<BriefFixture> {
    let content = fs::read_to_string(path).map_err(|e| SpecError::Load {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_fixture(&content, &path.display().to_string())
}

/// Load every scenario in `dir`, keyed and sorted by file name.
pub fn load_all_fixtures(dir: &Path) -> SpecResult<Vec<(String, BriefFixture)>> {
    let unreadable = |e: std::io::Error| SpecError::Load {
        path: dir.display().to_string(),
        message: e.to_string(),
    };

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir).map_err(unreadable)? {
        let path = entry.map_err(unreadable)?.path();
        if is_scenario(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok((name, load_fixture(path)?))
        })
        .collect()
}

fn is_scenario(path: &Path) -> bool {
    path.is_file()
        && path.extension().map_or(false, |ext| ext == "toml")
        && path
            .file_name()
            .map_or(false, |name| name != EXPECTED_FAILURES_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        let mut file = fs::File::create(dir.join(name)).unwrap();
        writeln!(file, "{}", content).unwrap();
    }

    #[test]
    fn test_scenarios_sorted_by_file_name() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b-second.toml", "[[blocks]]\ntext = \"Two.\"");
        write(dir.path(), "a-first.toml", "[[blocks]]\ntext = \"One.\"");
        write(dir.path(), EXPECTED_FAILURES_FILE, "");
        write(dir.path(), "notes.md", "not a fixture");
        fs::create_dir(dir.path().join("drafts")).unwrap();
        write(&dir.path().join("drafts"), "c-draft.toml", "[[blocks]]\ntext = \"Three.\"");

        let names: Vec<String> = load_all_fixtures(dir.path())
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["a-first.toml", "b-second.toml"]);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let result = load_all_fixtures(Path::new("/nonexistent/fixtures"));
        assert!(matches!(result, Err(SpecError::Load { .. })));
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "broken.toml", "title = \"no blocks\"");

        match load_fixture(&dir.path().join("broken.toml")) {
            Err(SpecError::Parse { path: reported, .. }) => {
                assert!(reported.ends_with("broken.toml"))
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
