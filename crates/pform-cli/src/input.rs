//! Document loading shared by the subcommands.

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;

/// Encoding of an input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// `.json` files are JSON; everything else is read as YAML, which also
    /// accepts most JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Parse `text` in the given format.
pub fn parse_document<T: DeserializeOwned>(text: &str, format: Format) -> anyhow::Result<T> {
    let value = match format {
        Format::Json => serde_json::from_str(text).context("invalid JSON document")?,
        Format::Yaml => serde_yaml::from_str(text).context("invalid YAML document")?,
    };
    Ok(value)
}

/// Read and parse the document at `path`.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_document(&text, Format::from_path(path))
        .with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("a.JSON")), Format::Json);
        assert_eq!(Format::from_path(Path::new("a.yaml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("a")), Format::Yaml);
    }

    #[test]
    fn test_yaml_and_json_agree() {
        let yaml: Value = parse_document("age: 18\ngender: m\n", Format::Yaml).unwrap();
        let json: Value = parse_document(r#"{"age": 18, "gender": "m"}"#, Format::Json).unwrap();
        assert_eq!(yaml, json);
        assert_eq!(yaml, json!({"age": 18, "gender": "m"}));
    }

    #[test]
    fn test_bad_document_is_an_error() {
        assert!(parse_document::<Value>("{", Format::Json).is_err());
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = load_document::<Value>(Path::new("/nonexistent/record.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/record.yaml"));
    }
}
