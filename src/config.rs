use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TplanConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub grouping: GroupingConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}

/// [display] section configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// List attributes that did not change
    #[serde(default)]
    pub show_unchanged: bool,
    /// Type / provider / file lines above the diff
    #[serde(default = "default_true")]
    pub show_metadata: bool,
    /// Values longer than this are cut with `…`
    #[serde(default = "default_truncate_at")]
    pub truncate_at: usize,
    /// Changed strings longer than this render side by side
    #[serde(default = "default_wide_string_at")]
    pub wide_string_at: usize,
}

/// [grouping] section configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingConfig {
    /// Group root-module resources by the .tf file declaring them
    #[serde(default = "default_true")]
    pub by_file: bool,
}

/// [theme] section configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// ASCII-only icons and markers
    #[serde(default)]
    pub ascii: bool,
}

fn default_true() -> bool {
    true
}

fn default_truncate_at() -> usize {
    100
}

fn default_wide_string_at() -> usize {
    60
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_unchanged: false,
            show_metadata: true,
            truncate_at: default_truncate_at(),
            wide_string_at: default_wide_string_at(),
        }
    }
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self { by_file: true }
    }
}

/// Load config by merging global defaults with per-directory overrides.
/// Priority: `./.tplan.toml` > global `~/.config/tplan/config.toml` > built-in defaults.
/// Merging is deep: individual fields within sections (e.g. `[display]`) override independently.
pub fn load_config(dir: &Path) -> TplanConfig {
    let global_path = dirs::config_dir().map(|d| d.join("tplan/config.toml"));
    load_config_from(global_path.as_deref(), &dir.join(".tplan.toml"))
}

fn load_config_from(global_path: Option<&Path>, local_path: &Path) -> TplanConfig {
    let global_table = global_path.and_then(read_table);
    let local_table = read_table(local_path);

    let merged = match (global_table, local_table) {
        (Some(mut global), Some(local)) => {
            deep_merge(&mut global, local);
            global
        }
        (Some(global), None) => global,
        (None, Some(local)) => local,
        (None, None) => return TplanConfig::default(),
    };

    match toml::Value::Table(merged).try_into() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("invalid config, using defaults: {}", e);
            TplanConfig::default()
        }
    }
}

fn read_table(path: &Path) -> Option<toml::Table> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<toml::Table>(&content) {
        Ok(table) => Some(table),
        Err(e) => {
            log::warn!("ignoring {}: {}", path.display(), e);
            None
        }
    }
}

/// Recursively merge `overlay` into `base`. Overlay values win; nested tables are merged recursively.
fn deep_merge(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn no_files_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(None, &dir.path().join(".tplan.toml"));
        assert_eq!(config, TplanConfig::default());
        assert_eq!(config.display.truncate_at, 100);
        assert_eq!(config.display.wide_string_at, 60);
        assert!(config.grouping.by_file);
        assert!(!config.theme.ascii);
    }

    #[test]
    fn local_overrides_single_field_of_global_section() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let local = dir.path().join(".tplan.toml");
        fs::write(&global, "[display]\nshow_unchanged = true\ntruncate_at = 80\n").unwrap();
        fs::write(&local, "[display]\ntruncate_at = 40\n[theme]\nascii = true\n").unwrap();

        let config = load_config_from(Some(&global), &local);
        assert!(config.display.show_unchanged);
        assert_eq!(config.display.truncate_at, 40);
        assert!(config.display.show_metadata);
        assert!(config.theme.ascii);
    }

    #[test]
    fn invalid_toml_falls_back_to_other_layer() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let local = dir.path().join(".tplan.toml");
        fs::write(&global, "[grouping]\nby_file = false\n").unwrap();
        fs::write(&local, "[display\nbroken").unwrap();

        let config = load_config_from(Some(&global), &local);
        assert!(!config.grouping.by_file);
    }

    #[test]
    fn wrong_value_type_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join(".tplan.toml");
        fs::write(&local, "[display]\ntruncate_at = \"wide\"\n").unwrap();
        assert_eq!(load_config_from(None, &local), TplanConfig::default());
    }

    #[test]
    fn deep_merge_replaces_scalars_and_merges_tables() {
        let mut base: toml::Table = toml::from_str("a = 1\n[t]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Table = toml::from_str("a = 2\n[t]\ny = 3\n").unwrap();
        deep_merge(&mut base, overlay);
        let int = |table: &toml::Table, key: &str| table.get(key).and_then(|v| v.as_integer());
        let nested = base.get("t").and_then(|v| v.as_table()).cloned().unwrap();
        assert_eq!(int(&base, "a"), Some(2));
        assert_eq!(int(&nested, "x"), Some(1));
        assert_eq!(int(&nested, "y"), Some(3));
    }
}
