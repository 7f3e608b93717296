use std::path::{Path, PathBuf};

use crate::config::NormalizeConfig;

/// Walk a project directory and collect `.js` files to normalize.
///
/// Respects `.gitignore` rules, always excludes `node_modules`, and applies
/// any additional exclusions from `config.exclude`.
pub fn walk_project(root: &Path, config: &NormalizeConfig) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files(root, config, &mut files);
    Ok(files)
}

fn collect_files(root: &Path, config: &NormalizeConfig, out: &mut Vec<PathBuf>) {
    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(true)
        // Read .gitignore files even when the directory is not inside a git repository.
        .require_git(false)
        .build();

    for result in walker {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                eprintln!("warning: {err}");
                continue;
            }
        };

        let path = entry.path();

        if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
            continue;
        }

        if path_contains_node_modules(path) {
            continue;
        }

        if is_excluded_by_config(path, config) {
            continue;
        }

        if path.extension().and_then(|e| e.to_str()) != Some("js") {
            continue;
        }

        out.push(path.to_path_buf());
    }
}

/// Returns true if any component of `path` is named `node_modules`.
fn path_contains_node_modules(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str().to_str() == Some("node_modules"))
}

/// Returns true if `path` matches any exclusion pattern from config. Matches
/// both the full path and individual path components, so a pattern like
/// `vendor` excludes any `vendor/` subdirectory regardless of depth.
fn is_excluded_by_config(path: &Path, config: &NormalizeConfig) -> bool {
    let Some(patterns) = &config.exclude else {
        return false;
    };

    let path_str = path.to_string_lossy();

    for pattern in patterns {
        if path_str.contains(pattern.as_str()) {
            return true;
        }
        for component in path.components() {
            if component.as_os_str().to_str() == Some(pattern.as_str()) {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn discovers_only_js_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.js"), "var x = 1;").unwrap();
        fs::write(dir.path().join("b.ts"), "const x: number = 1;").unwrap();

        let config = NormalizeConfig::default();
        let files = walk_project(dir.path(), &config).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name().unwrap(), "a.js");
    }

    #[test]
    fn excludes_node_modules() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules/lib.js"), "var x = 1;").unwrap();
        fs::write(dir.path().join("main.js"), "var y = 2;").unwrap();

        let config = NormalizeConfig::default();
        let files = walk_project(dir.path(), &config).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name().unwrap(), "main.js");
    }

    #[test]
    fn respects_config_exclude_patterns() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("vendor")).unwrap();
        fs::write(dir.path().join("vendor/lib.js"), "var x = 1;").unwrap();
        fs::write(dir.path().join("main.js"), "var y = 2;").unwrap();

        let config = NormalizeConfig {
            exclude: Some(vec!["vendor".to_string()]),
            ..NormalizeConfig::default()
        };
        let files = walk_project(dir.path(), &config).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name().unwrap(), "main.js");
    }
}
