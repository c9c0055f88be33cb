//! Projection of usager records onto the fixed export column set.
//!
//! The column list is versioned with the application: downstream users sort
//! and filter exported workbooks by position, so columns are only ever
//! appended.

use crate::dates::format_optional_date;
use crate::model::{UserRecord, field};

/// Name of the single worksheet in exported workbooks.
pub const EXPORT_SHEET: &str = "Usagers";

/// Controls wrapping and the width cap of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Uncapped width, no wrapping.
    Plain,
    /// Long free text: width capped at 70 characters, no wrapping.
    Commentary,
    /// Joined lists: width capped at 50 characters and wrapped.
    Wrapped,
}

impl ColumnKind {
    pub fn width_cap(self) -> Option<usize> {
        match self {
            ColumnKind::Plain => None,
            ColumnKind::Commentary => Some(70),
            ColumnKind::Wrapped => Some(50),
        }
    }

    pub fn wraps(self) -> bool {
        matches!(self, ColumnKind::Wrapped)
    }
}

/// One export column: its header, its layout kind and how a record fills it.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub title: &'static str,
    pub kind: ColumnKind,
    extract: fn(&UserRecord) -> String,
}

impl Column {
    const fn plain(title: &'static str, extract: fn(&UserRecord) -> String) -> Self {
        Self {
            title,
            kind: ColumnKind::Plain,
            extract,
        }
    }

    const fn commentary(title: &'static str, extract: fn(&UserRecord) -> String) -> Self {
        Self {
            title,
            kind: ColumnKind::Commentary,
            extract,
        }
    }

    const fn wrapped(title: &'static str, extract: fn(&UserRecord) -> String) -> Self {
        Self {
            title,
            kind: ColumnKind::Wrapped,
            extract,
        }
    }

    pub fn value(&self, record: &UserRecord) -> String {
        (self.extract)(record)
    }
}

/// Export columns in workbook order.
pub const EXPORT_COLUMNS: [Column; 40] = [
    Column::plain("Nom", |u| text(&u.nom)),
    Column::plain("Prénom", |u| text(&u.prenom)),
    Column::plain("Date de naissance", |u| date(&u.date_naissance)),
    Column::plain("Genre", |u| text(&u.genre)),
    Column::plain("Nationalité", |u| text(&u.nationalite)),
    Column::plain("Langue", |u| text(&u.langue)),
    Column::plain("Téléphone", |u| text(&u.telephone)),
    Column::plain("Email", |u| text(&u.email)),
    Column::commentary("Adresse Complète", |u| u.adresse.full()),
    Column::plain("Rue", |u| text(&u.adresse.rue)),
    Column::plain("Numéro", |u| text(&u.adresse.numero)),
    Column::plain("Boîte", |u| text(&u.adresse.boite)),
    Column::plain("Code Postal", |u| text(&u.adresse.code_postal)),
    Column::plain("Ville", |u| text(&u.adresse.ville)),
    Column::plain("Secteur", |u| text(&u.secteur)),
    Column::plain("Statut Séjour", |u| text(&u.statut_sejour)),
    Column::plain("Date Ouverture", |u| date(&u.date_ouverture)),
    Column::plain("Date Clôture", |u| date(&u.date_cloture)),
    Column::plain("État", |u| text(&u.etat)),
    Column::plain("Antenne", |u| text(&u.antenne)),
    Column::plain("Gestionnaire", |u| u.gestionnaire.display_name()),
    Column::plain("Premier Contact", |u| text(&u.premier_contact)),
    Column::commentary("Notes Générales", |u| text(&u.notes_generales)),
    Column::plain("Procédure Expulsion?", |u| {
        String::from(if u.has_prev_exp { "Oui" } else { "Non" })
    }),
    Column::plain("Date Réception PrevExp", |u| date(&u.prev_exp_date_reception)),
    Column::plain("Date Requête PrevExp", |u| date(&u.prev_exp_date_requete)),
    Column::plain("Date VAD PrevExp", |u| date(&u.prev_exp_date_vad)),
    Column::plain("Décision PrevExp", |u| text(&u.prev_exp_decision)),
    Column::commentary("Commentaire PrevExp", |u| text(&u.prev_exp_commentaire)),
    Column::plain("Type Logement", |u| text(&u.logement_details.type_logement)),
    Column::plain("Date Entrée Logement", |u| date(&u.logement_details.date_entree)),
    Column::plain("Date Sortie Logement", |u| date(&u.logement_details.date_sortie)),
    Column::plain("Motif Sortie Logement", |u| text(&u.logement_details.motif_sortie)),
    Column::plain("Destination Sortie Logement", |u| {
        text(&u.logement_details.destination_sortie)
    }),
    Column::plain("Propriétaire Logement", |u| text(&u.logement_details.proprietaire)),
    Column::plain("Loyer Logement", |u| text(&u.logement_details.loyer)),
    Column::plain("Charges Logement", |u| text(&u.logement_details.charges)),
    Column::commentary("Commentaire Logement", |u| text(&u.logement_details.commentaire)),
    Column::wrapped("Problématiques", |u| {
        join_rendered(u.problematiques.iter().filter_map(|p| p.render()))
    }),
    Column::wrapped("Actions de Suivi", |u| {
        join_rendered(u.actions.iter().filter_map(|a| a.render()))
    }),
];

/// A table that will be materialised as the export sheet.
#[derive(Debug, Clone)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    pub fn headers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|column| column.title)
    }
}

/// Flattens the records into one row each, in input order.
pub fn build_table(records: &[UserRecord]) -> SheetTable {
    let columns = EXPORT_COLUMNS.to_vec();
    let rows = records
        .iter()
        .map(|record| columns.iter().map(|column| column.value(record)).collect())
        .collect();

    SheetTable {
        sheet_name: EXPORT_SHEET.to_string(),
        columns,
        rows,
    }
}

fn text(value: &Option<String>) -> String {
    field(value).to_string()
}

fn date(value: &Option<String>) -> String {
    format_optional_date(value.as_deref())
}

fn join_rendered(entries: impl Iterator<Item = String>) -> String {
    entries.collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> UserRecord {
        serde_json::from_value(value).expect("record decodes")
    }

    fn cell<'a>(table: &'a SheetTable, row: usize, title: &str) -> &'a str {
        let index = table
            .columns
            .iter()
            .position(|column| column.title == title)
            .expect("known column");
        &table.rows[row][index]
    }

    #[test]
    fn every_row_has_one_cell_per_column() {
        let table = build_table(&[UserRecord::default(), record(json!({"nom": "Dupont"}))]);
        assert_eq!(table.columns.len(), 40);
        assert!(table.rows.iter().all(|row| row.len() == 40));
        assert_eq!(table.sheet_name, EXPORT_SHEET);
    }

    #[test]
    fn header_order_starts_and_ends_as_versioned() {
        let headers: Vec<&str> = build_table(&[]).headers().collect();
        assert_eq!(&headers[..3], ["Nom", "Prénom", "Date de naissance"]);
        assert_eq!(&headers[38..], ["Problématiques", "Actions de Suivi"]);
    }

    #[test]
    fn empty_problematiques_are_skipped() {
        let table = build_table(&[record(json!({
            "problematiques": [
                {"type": "A", "description": ""},
                {"type": "", "description": ""}
            ]
        }))]);
        assert_eq!(cell(&table, 0, "Problématiques"), "A: ");
    }

    #[test]
    fn actions_are_dated_and_joined() {
        let table = build_table(&[record(json!({
            "actions": [
                {"date": "2024-03-07T10:00:00Z", "type": "Visite", "description": "domicile"},
                {"date": null, "type": "", "description": ""},
                {"date": "15/04/2024", "type": "Appel", "description": "CPAS"}
            ]
        }))]);
        assert_eq!(
            cell(&table, 0, "Actions de Suivi"),
            "07/03/2024 - Visite: domicile, 15/04/2024 - Appel: CPAS"
        );
    }

    #[test]
    fn record_fields_land_in_their_columns() {
        let table = build_table(&[record(json!({
            "nom": "Dupont",
            "dateNaissance": "1980-05-17T00:00:00.000Z",
            "adresse": {"rue": "Rue Wayez", "numero": "12", "codePostal": "1070", "ville": "Anderlecht"},
            "gestionnaire": {"prenom": "Jean", "nom": "Martin", "id": "g1"},
            "hasPrevExp": true,
            "logementDetails": "{\"typeLogement\": \"Privé\", \"dateSortie\": \"2024-01-31\"}"
        }))]);
        assert_eq!(cell(&table, 0, "Nom"), "Dupont");
        assert_eq!(cell(&table, 0, "Date de naissance"), "17/05/1980");
        assert_eq!(cell(&table, 0, "Adresse Complète"), "Rue Wayez 12, 1070 Anderlecht");
        assert_eq!(cell(&table, 0, "Gestionnaire"), "Jean Martin");
        assert_eq!(cell(&table, 0, "Procédure Expulsion?"), "Oui");
        assert_eq!(cell(&table, 0, "Type Logement"), "Privé");
        assert_eq!(cell(&table, 0, "Date Sortie Logement"), "31/01/2024");
    }

    #[test]
    fn missing_fields_project_to_empty_cells() {
        let table = build_table(&[UserRecord::default()]);
        assert_eq!(cell(&table, 0, "Nom"), "");
        assert_eq!(cell(&table, 0, "Adresse Complète"), " ,  ");
        assert_eq!(cell(&table, 0, "Procédure Expulsion?"), "Non");
        assert_eq!(cell(&table, 0, "Problématiques"), "");
    }

    #[test]
    fn column_kinds_follow_content() {
        let kind = |title: &str| {
            EXPORT_COLUMNS
                .iter()
                .find(|column| column.title == title)
                .map(|column| column.kind)
        };
        assert_eq!(kind("Problématiques"), Some(ColumnKind::Wrapped));
        assert_eq!(kind("Notes Générales"), Some(ColumnKind::Commentary));
        assert_eq!(kind("Nom"), Some(ColumnKind::Plain));
    }
}
