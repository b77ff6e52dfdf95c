//! Structured config documents (JSON or TOML, chosen by file extension)

use std::fs;
use std::path::Path;

use super::error::ConfigError;
use super::value::{find_non_finite, ConfigTable, ConfigValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// `.toml` files are TOML, everything else is JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Json,
        }
    }

    pub fn parse(self, content: &str, path: &Path) -> Result<ConfigTable, ConfigError> {
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let value = match self {
            DocumentFormat::Json => {
                let raw: serde_json::Value =
                    serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?;
                ConfigValue::from_json(raw, "")?
            }
            DocumentFormat::Toml => {
                let raw: toml::Value = toml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
                ConfigValue::from_toml(raw, "")?
            }
        };

        match value {
            ConfigValue::Table(table) => Ok(table),
            other => Err(parse_error(format!(
                "top level must be an object, found {}",
                other.type_name()
            ))),
        }
    }

    /// Pretty-printed rendering of `table`. JSON cannot hold inf/nan, so a
    /// tree containing one is refused rather than written as `null`.
    pub fn render(self, table: &ConfigTable) -> Result<String, ConfigError> {
        if self == DocumentFormat::Json {
            if let Some(path) = find_non_finite(table) {
                return Err(ConfigError::Serialize(format!(
                    "non-finite number at '{}' has no JSON form",
                    path
                )));
            }
        }
        let mut rendered = match self {
            DocumentFormat::Json => serde_json::to_string_pretty(table)
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            DocumentFormat::Toml => {
                toml::to_string_pretty(table).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
        };
        if !rendered.ends_with('\n') {
            rendered.push('\n');
        }
        Ok(rendered)
    }
}

pub fn read_document(path: &Path) -> Result<ConfigTable, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    DocumentFormat::from_path(path).parse(&content, path)
}

pub fn write_document(path: &Path, table: &ConfigTable) -> Result<(), ConfigError> {
    let rendered = DocumentFormat::from_path(path).render(table)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }
    }

    fs::write(path, rendered).map_err(|e| ConfigError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::value::{lookup, table};
    use tempfile::tempdir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("config.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("config.TOML")), DocumentFormat::Toml);
        assert_eq!(DocumentFormat::from_path(Path::new("config")), DocumentFormat::Json);
    }

    #[test]
    fn test_parse_toml() {
        let doc = r#"
[trading]
default_symbol = "ETHUSDT"
supported_symbols = ["ETHUSDT"]
max_quantity = 5
"#;
        let tree = DocumentFormat::Toml.parse(doc, Path::new("c.toml")).unwrap();
        assert_eq!(lookup(&tree, "trading.max_quantity"), Some(&ConfigValue::Int(5)));
        assert_eq!(
            lookup(&tree, "trading.supported_symbols"),
            Some(&ConfigValue::StringList(vec!["ETHUSDT".to_string()]))
        );
    }

    #[test]
    fn test_parse_rejects_non_object_root() {
        let result = DocumentFormat::Json.parse("[1, 2]", Path::new("c.json"));
        assert!(result.is_err());
        let result = DocumentFormat::Json.parse("\"text\"", Path::new("c.json"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_json_refuses_non_finite_float() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let tree = table([(
            "risk_management",
            ConfigValue::Table(table([("max_position_size", f64::NAN.into())])),
        )]);

        let err = write_document(&path, &tree).unwrap_err();
        assert!(matches!(err, ConfigError::Serialize(ref m) if m.contains("risk_management.max_position_size")));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_then_read_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let tree = table([(
            "ui",
            ConfigValue::Table(table([("display_precision", 4.into()), ("show_confirmations", false.into())])),
        )]);

        write_document(&path, &tree).unwrap();
        let loaded = read_document(&path).unwrap();
        assert_eq!(loaded, tree);
    }
}
