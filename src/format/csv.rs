//! CSV export: one row per annotation.

use crate::format::error::FormatError;
use crate::format::traits::ExportFormat;
use crate::model::Annotation;

/// Column header row.
const HEADER: &str = "id,text,x,y,width,height,created";

/// The "csv" export format.
///
/// The text column is wrapped in double quotes; embedded double quotes are
/// not escaped. Known limitation of the column layout, kept for
/// compatibility with existing consumers.
#[derive(Debug, Default)]
pub struct CsvFormat;

impl ExportFormat for CsvFormat {
    fn id(&self) -> &'static str {
        "csv"
    }

    fn display_name(&self) -> &'static str {
        "CSV"
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn export(&self, annotations: &[Annotation]) -> Result<String, FormatError> {
        let mut lines = Vec::with_capacity(annotations.len() + 1);
        lines.push(HEADER.to_string());
        for annotation in annotations {
            lines.push(format!(
                "{},\"{}\",{},{},{},{},{}",
                annotation.id,
                annotation.text,
                annotation.geometry.x,
                annotation.geometry.y,
                annotation.geometry.width,
                annotation.geometry.height,
                annotation
                    .created
                    .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            ));
        }
        Ok(lines.join("\n"))
    }
}
