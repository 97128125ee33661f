//! Export formats

use serde::Serialize;

/// Output format requested for a submission export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Raw submissions as JSON
    #[default]
    Structured,
    /// Rendered PDF document
    Document,
    /// Spreadsheet export (not implemented)
    Tabular,
}

impl ExportFormat {
    /// Parse the `format` query parameter
    ///
    /// Matching is case-insensitive. Unknown values fall back to
    /// [`ExportFormat::Structured`].
    pub fn from_param(param: Option<&str>) -> Self {
        let Some(raw) = param else {
            return Self::Structured;
        };

        match raw.trim().to_ascii_lowercase().as_str() {
            "pdf" | "document" => Self::Document,
            "xlsx" | "tabular" | "csv" => Self::Tabular,
            _ => Self::Structured,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Document => "document",
            Self::Tabular => "tabular",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
