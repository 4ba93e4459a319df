//! Format adapters for import/export.
//!
//! Each format implements [`EnvelopeCodec`].

pub mod json;
pub mod xml;

use crate::{Error, Result};
use chrono::NaiveDate;
use std::path::Path;
use std::str::FromStr;

use super::traits::EnvelopeCodec;

/// Supported file formats for import/export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Pretty-printed JSON envelope.
    Json,
    /// The `LifeOSExport` XML dialect.
    Xml,
}

impl Format {
    /// Returns all available formats.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Json, Self::Xml]
    }

    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }

    /// Returns the MIME type for this format.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }

    /// Detects format from file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not recognized.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("xml") => Ok(Self::Xml),
            Some(ext) => Err(Error::InvalidInput(format!(
                "Unsupported file extension: .{ext}"
            ))),
            None => Err(Error::InvalidInput(
                "Cannot determine format: file has no extension".to_string(),
            )),
        }
    }

    /// Guesses the format from document content.
    ///
    /// A document whose first non-whitespace character is `<` is XML;
    /// anything else is treated as JSON.
    #[must_use]
    pub fn sniff(content: &str) -> Self {
        if content.trim_start().starts_with('<') {
            Self::Xml
        } else {
            Self::Json
        }
    }

    /// Returns the codec for this format.
    #[must_use]
    pub fn codec(&self) -> Box<dyn EnvelopeCodec> {
        match self {
            Self::Json => Box::new(json::JsonCodec),
            Self::Xml => Box::new(xml::XmlCodec),
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            _ => Err(Error::InvalidInput(format!("Unknown format: {s}"))),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Returns the conventional download name for an export.
///
/// `lifeos-<preset>-<YYYY-MM-DD>.<ext>`
#[must_use]
pub fn export_filename(preset: &str, format: Format, date: NaiveDate) -> String {
    format!(
        "lifeos-{preset}-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!(Format::from_str("json").unwrap(), Format::Json);
        assert_eq!(Format::from_str("XML").unwrap(), Format::Xml);
        assert!(Format::from_str("yaml").is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            Format::from_path(Path::new("lifeos-tasks-2026-01-02.json")).unwrap(),
            Format::Json
        );
        assert_eq!(
            Format::from_path(Path::new("backup.XML")).unwrap(),
            Format::Xml
        );
        assert!(Format::from_path(Path::new("backup.csv")).is_err());
        assert!(Format::from_path(Path::new("backup")).is_err());
    }

    #[test]
    fn test_format_sniff() {
        assert_eq!(Format::sniff("  \n<?xml version=\"1.0\"?>"), Format::Xml);
        assert_eq!(Format::sniff("{\"exportType\": \"tasks\"}"), Format::Json);
        assert_eq!(Format::sniff(""), Format::Json);
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(
            export_filename("tasks", Format::Json, date),
            "lifeos-tasks-2026-10-16.json"
        );
        assert_eq!(
            export_filename("full_backup", Format::Xml, date),
            "lifeos-full_backup-2026-10-16.xml"
        );
    }
}
