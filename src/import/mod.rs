//! Conversion of the mediation service spreadsheet into usager records ready
//! for the application's bulk import.

use tracing::debug;

use crate::io::excel_read::{SheetRows, SheetSelection, SpreadsheetRow};
use crate::model::{ImportedAdresse, ImportedUsager};

/// Column labels of the mediation spreadsheet. Several carry a trailing space
/// in the source files; lookup ignores it.
pub mod columns {
    pub const NOM: &str = "Nom";
    pub const PRENOM: &str = "Prénom";
    pub const GENRE: &str = "Genre";
    pub const TELEPHONE: &str = "N°de téléphone";
    pub const EMAIL: &str = "Adresse mail";
    pub const TRANCHE_AGE: &str = "Tranche d'âge";
    pub const DATE_OUVERTURE: &str = "Date d'ouverture";
    pub const DATE_CLOTURE: &str = "Date de clôture";
    pub const DATE_RECEPTION: &str = "Date de reception";
    pub const ADRESSE: &str = "Adresse";
    pub const NUMERO: &str = "N°";
    pub const TITULAIRE: &str = "Titulaire";
    pub const SECTEUR: &str = "Secteur";
    pub const TYPE_CONFLIT: &str = "Type de conflit";
    pub const ISSUE: &str = "Issue";
    pub const STATUT: &str = "Statut";
}

pub const DEFAULT_CITY: &str = "Anderlecht";
pub const DEFAULT_POSTAL_CODE: &str = "1070";
pub const DEFAULT_YEAR: i32 = 2025;

const REMARK_SEPARATOR: &str = " | ";

/// Values the spreadsheet does not carry and that every imported record
/// receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSettings {
    /// City attached to every synthesised address.
    pub city: String,
    /// Postal code attached to every synthesised address.
    pub postal_code: String,
    /// Activity year the records are filed under.
    pub year: i32,
    pub selection: SheetSelection,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            city: DEFAULT_CITY.to_string(),
            postal_code: DEFAULT_POSTAL_CODE.to_string(),
            year: DEFAULT_YEAR,
            selection: SheetSelection::default(),
        }
    }
}

/// Normalizes every data row, skipping rows without any name.
pub fn normalize_rows(sheet: &SheetRows, settings: &ImportSettings) -> Vec<ImportedUsager> {
    sheet
        .rows()
        .enumerate()
        .filter_map(|(index, row)| {
            let usager = normalize_row(&row, settings);
            if usager.is_none() {
                debug!(row = index, "skipping row without name");
            }
            usager
        })
        .collect()
}

/// Maps one row onto an imported record. Rows where both `Nom` and `Prénom`
/// are empty are blank or total lines and yield `None`.
pub fn normalize_row(row: &SpreadsheetRow<'_>, settings: &ImportSettings) -> Option<ImportedUsager> {
    let nom = row.text(columns::NOM);
    let prenom = row.text(columns::PRENOM);
    if nom.is_none() && prenom.is_none() {
        return None;
    }

    Some(ImportedUsager {
        nom,
        prenom,
        genre: row.text(columns::GENRE),
        telephone: row.text(columns::TELEPHONE),
        email: row.text(columns::EMAIL),
        nationalite: None,
        tranche_age: row.text(columns::TRANCHE_AGE),
        date_ouverture: row
            .text(columns::DATE_OUVERTURE)
            .or_else(|| row.text(columns::DATE_RECEPTION)),
        date_cloture: row.text(columns::DATE_CLOTURE),
        adresse: address(row, settings),
        gestionnaire: row.text(columns::TITULAIRE),
        secteur: row.text(columns::SECTEUR),
        remarques: remarks(row),
        annee: settings.year,
    })
}

fn address(row: &SpreadsheetRow<'_>, settings: &ImportSettings) -> Option<ImportedAdresse> {
    let rue = row.text(columns::ADRESSE)?;
    Some(ImportedAdresse {
        rue,
        numero: row.text(columns::NUMERO),
        ville: settings.city.clone(),
        code_postal: settings.postal_code.clone(),
    })
}

fn remarks(row: &SpreadsheetRow<'_>) -> Option<String> {
    let segments: Vec<String> = [
        ("Conflit", columns::TYPE_CONFLIT),
        ("Issue", columns::ISSUE),
        ("Statut Import", columns::STATUT),
    ]
    .into_iter()
    .filter_map(|(prefix, label)| row.text(label).map(|value| format!("{prefix}: {value}")))
    .collect();

    (!segments.is_empty()).then(|| segments.join(REMARK_SEPARATOR))
}
