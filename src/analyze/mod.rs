//! Read-only inspection of an import spreadsheet: which columns exist, what
//! they contain and which ones look like dates.

use std::collections::BTreeSet;
use std::fmt;

use crate::io::excel_read::{CellKind, SheetRows};

/// Fragments that mark a column label as date-like.
pub const DATE_KEYWORDS: [&str; 9] = [
    "date",
    "naissance",
    "ouverture",
    "clôture",
    "cloture",
    "réception",
    "reception",
    "entrée",
    "sortie",
];

/// Type inferred from the non-empty cells of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferredType {
    Empty,
    Uniform(CellKind),
    Mixed(BTreeSet<CellKind>),
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferredType::Empty => f.write_str("empty"),
            InferredType::Uniform(kind) => write!(f, "{kind}"),
            InferredType::Mixed(kinds) => {
                let names: Vec<String> = kinds.iter().map(ToString::to_string).collect();
                write!(f, "mixed({})", names.join(", "))
            }
        }
    }
}

impl InferredType {
    fn from_kinds(mut kinds: BTreeSet<CellKind>) -> Self {
        // Whole numbers stored next to decimals are a float column.
        if kinds.contains(&CellKind::Float) {
            kinds.remove(&CellKind::Integer);
        }
        let mut iter = kinds.iter();
        match (iter.next(), iter.next()) {
            (None, _) => InferredType::Empty,
            (Some(kind), None) => InferredType::Uniform(*kind),
            _ => InferredType::Mixed(kinds),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnReport {
    pub label: String,
    pub inferred: InferredType,
    pub filled: usize,
}

/// Summary of a worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub sheet_name: String,
    pub row_count: usize,
    pub columns: Vec<ColumnReport>,
    /// First data row as `(label, value)` pairs.
    pub sample: Vec<(String, String)>,
    pub date_columns: Vec<String>,
}

/// Builds the analysis of an already read sheet.
pub fn analyze(sheet: &SheetRows) -> Analysis {
    let labels: Vec<String> = sheet
        .headers
        .iter()
        .enumerate()
        .map(|(index, header)| display_label(index, header))
        .collect();

    let columns = labels
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let kinds: Vec<CellKind> = sheet
                .rows
                .iter()
                .filter_map(|row| row.get(index).and_then(|cell| cell.kind()))
                .collect();
            ColumnReport {
                label: label.clone(),
                filled: kinds.len(),
                inferred: InferredType::from_kinds(kinds.into_iter().collect()),
            }
        })
        .collect();

    let sample = sheet
        .rows
        .first()
        .map(|row| {
            labels
                .iter()
                .enumerate()
                .map(|(index, label)| {
                    let value = row.get(index).map(ToString::to_string).unwrap_or_default();
                    (label.clone(), value)
                })
                .collect()
        })
        .unwrap_or_default();

    let date_columns = labels
        .iter()
        .filter(|label| is_date_like(label))
        .cloned()
        .collect();

    Analysis {
        sheet_name: sheet.sheet_name.clone(),
        row_count: sheet.rows.len(),
        columns,
        sample,
        date_columns,
    }
}

/// Whether a column label contains one of [`DATE_KEYWORDS`].
pub fn is_date_like(label: &str) -> bool {
    let lowered = label.to_lowercase();
    DATE_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

fn display_label(index: usize, header: &str) -> String {
    if header.trim().is_empty() {
        format!("Unnamed: {index}")
    } else {
        header.to_string()
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Sheet '{}': {} data rows, {} columns",
            self.sheet_name,
            self.row_count,
            self.columns.len()
        )?;

        writeln!(f, "\nColumns:")?;
        for column in &self.columns {
            writeln!(
                f,
                "  - {:?}: {} ({} filled)",
                column.label, column.inferred, column.filled
            )?;
        }

        writeln!(f, "\nFirst row:")?;
        if self.sample.is_empty() {
            writeln!(f, "  (no data rows)")?;
        }
        for (label, value) in &self.sample {
            writeln!(f, "  {label}: {value}")?;
        }

        writeln!(f, "\nDate-like columns:")?;
        if self.date_columns.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for label in &self.date_columns {
            writeln!(f, "  - {label:?}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::excel_read::CellValue;

    fn sample_sheet() -> SheetRows {
        SheetRows {
            sheet_name: "Médiation 2025".into(),
            headers: vec![
                "Nom".into(),
                "Date d'ouverture ".into(),
                "N°".into(),
                String::new(),
                "Statut".into(),
            ],
            rows: vec![
                vec![
                    CellValue::Text("Dupont".into()),
                    CellValue::Text("2025-01-10".into()),
                    CellValue::Int(12),
                    CellValue::Empty,
                    CellValue::Text("Clôturé".into()),
                ],
                vec![
                    CellValue::Text("Martin".into()),
                    CellValue::Empty,
                    CellValue::Float(3.5),
                    CellValue::Empty,
                    CellValue::Int(1),
                ],
            ],
        }
    }

    #[test]
    fn infers_column_types() {
        let analysis = analyze(&sample_sheet());
        let inferred: Vec<String> = analysis
            .columns
            .iter()
            .map(|column| column.inferred.to_string())
            .collect();
        assert_eq!(
            inferred,
            ["text", "text", "float", "empty", "mixed(text, integer)"]
        );
        assert_eq!(analysis.columns[1].filled, 1);
    }

    #[test]
    fn unnamed_columns_get_positional_labels() {
        let analysis = analyze(&sample_sheet());
        assert_eq!(analysis.columns[3].label, "Unnamed: 3");
    }

    #[test]
    fn detects_date_like_columns_by_keyword() {
        let analysis = analyze(&sample_sheet());
        assert_eq!(analysis.date_columns, ["Date d'ouverture "]);
        assert!(is_date_like("Date de clôture"));
        assert!(is_date_like("DATE DE NAISSANCE"));
        assert!(!is_date_like("Adresse mail"));
    }

    #[test]
    fn report_lists_first_row() {
        let report = analyze(&sample_sheet()).to_string();
        assert!(report.contains("2 data rows, 5 columns"));
        assert!(report.contains("  Nom: Dupont"));
        assert!(report.contains("  N°: 12"));
    }

    #[test]
    fn empty_sheet_reports_no_rows() {
        let sheet = SheetRows {
            sheet_name: "Vide".into(),
            headers: Vec::new(),
            rows: Vec::new(),
        };
        let report = analyze(&sheet).to_string();
        assert!(report.contains("(no data rows)"));
        assert!(report.contains("(none)"));
    }
}
