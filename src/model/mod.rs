//! In-memory representation of a usager record as exported by the
//! case-management application.
//!
//! Every field is optional. Decoding never fails on a field of the wrong
//! shape: it falls back to the empty value so that one damaged record does not
//! abort a whole export.

mod imported;
pub mod lenient;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::dates::format_optional_date;

pub use imported::{ImportedAdresse, ImportedUsager};

/// One service user.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRecord {
    #[serde(deserialize_with = "lenient::text")]
    pub nom: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub prenom: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub date_naissance: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub genre: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub nationalite: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub langue: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub telephone: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient::mapping")]
    pub adresse: Adresse,
    #[serde(deserialize_with = "lenient::text")]
    pub secteur: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub statut_sejour: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub date_ouverture: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub date_cloture: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub etat: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub antenne: Option<String>,
    pub gestionnaire: Gestionnaire,
    #[serde(deserialize_with = "lenient::text")]
    pub premier_contact: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub notes_generales: Option<String>,
    #[serde(deserialize_with = "lenient::truthy")]
    pub has_prev_exp: bool,
    #[serde(deserialize_with = "lenient::text")]
    pub prev_exp_date_reception: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub prev_exp_date_requete: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub prev_exp_date_vad: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub prev_exp_decision: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub prev_exp_commentaire: Option<String>,
    #[serde(deserialize_with = "logement_details")]
    pub logement_details: LogementDetails,
    #[serde(deserialize_with = "lenient::entries")]
    pub problematiques: Vec<Problematique>,
    #[serde(deserialize_with = "lenient::entries")]
    pub actions: Vec<SuiviAction>,
}

/// Postal address attached to a record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Adresse {
    #[serde(deserialize_with = "lenient::text")]
    pub rue: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub numero: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub boite: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub code_postal: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub ville: Option<String>,
}

impl Adresse {
    /// Single-line form: `"<rue> <numero>, <codePostal> <ville>"`.
    pub fn full(&self) -> String {
        format!(
            "{} {}, {} {}",
            field(&self.rue),
            field(&self.numero),
            field(&self.code_postal),
            field(&self.ville)
        )
    }
}

/// The case worker responsible for a record.
///
/// Older exports carry a display name, newer ones embed the related
/// gestionnaire row.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gestionnaire {
    #[default]
    Absent,
    Name(String),
    Person {
        prenom: Option<String>,
        nom: Option<String>,
        id: Option<String>,
    },
    Other(Value),
}

impl Gestionnaire {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => Gestionnaire::Absent,
            Value::String(name) => Gestionnaire::Name(name),
            Value::Object(map) => Gestionnaire::Person {
                prenom: map.get("prenom").and_then(lenient::value_to_text),
                nom: map.get("nom").and_then(lenient::value_to_text),
                id: map.get("id").and_then(lenient::value_to_text),
            },
            other => Gestionnaire::Other(other),
        }
    }

    /// Name shown in exports. A person without a name falls back to its id.
    pub fn display_name(&self) -> String {
        match self {
            Gestionnaire::Absent => String::new(),
            Gestionnaire::Name(name) => name.clone(),
            Gestionnaire::Person { prenom, nom, id } => {
                let full_name = format!("{} {}", field(prenom), field(nom));
                let full_name = full_name.trim();
                if full_name.is_empty() {
                    id.clone().unwrap_or_default()
                } else {
                    full_name.to_string()
                }
            }
            Gestionnaire::Other(value) if lenient::is_truthy(value) => {
                lenient::value_to_text(value).unwrap_or_default()
            }
            Gestionnaire::Other(_) => String::new(),
        }
    }
}

impl<'de> Deserialize<'de> for Gestionnaire {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Gestionnaire::from_value)
    }
}

/// Housing situation of a record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogementDetails {
    #[serde(deserialize_with = "lenient::text")]
    pub type_logement: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub date_entree: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub date_sortie: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub motif_sortie: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub destination_sortie: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub proprietaire: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub loyer: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub charges: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub commentaire: Option<String>,
}

/// Shapes in which `logementDetails` is found in stored records.
enum LogementSource {
    Mapping(Map<String, Value>),
    EncodedMapping(String),
    Comment(String),
    Missing,
}

impl LogementSource {
    fn classify(value: Value) -> Self {
        match value {
            Value::Object(map) => LogementSource::Mapping(map),
            Value::String(raw) if raw.trim_start().starts_with('{') => {
                LogementSource::EncodedMapping(raw)
            }
            Value::String(raw) => LogementSource::Comment(raw),
            _ => LogementSource::Missing,
        }
    }
}

impl LogementDetails {
    /// Decodes any of the stored shapes into the canonical mapping.
    ///
    /// A JSON-encoded string that fails to parse is kept as a comment.
    pub fn decode(value: Value) -> Self {
        match LogementSource::classify(value) {
            LogementSource::Mapping(map) => lenient::mapping_from_value(Value::Object(map)),
            LogementSource::EncodedMapping(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(parsed) => lenient::mapping_from_value(parsed),
                Err(error) => {
                    debug!(%error, "logementDetails is not valid JSON, keeping it as a comment");
                    LogementDetails::comment(raw)
                }
            },
            LogementSource::Comment(raw) => LogementDetails::comment(raw),
            LogementSource::Missing => LogementDetails::default(),
        }
    }

    fn comment(raw: String) -> Self {
        LogementDetails {
            commentaire: Some(raw),
            ..LogementDetails::default()
        }
    }
}

fn logement_details<'de, D>(deserializer: D) -> Result<LogementDetails, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(LogementDetails::decode)
}

/// Issue recorded on a case.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Problematique {
    #[serde(rename = "type", deserialize_with = "lenient::text")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub description: Option<String>,
}

impl Problematique {
    /// `"<type>: <description>"`, or `None` when both parts are empty.
    pub fn render(&self) -> Option<String> {
        if is_blank(&self.kind) && is_blank(&self.description) {
            return None;
        }
        Some(format!("{}: {}", field(&self.kind), field(&self.description)))
    }
}

/// Dated follow-up action recorded on a case.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SuiviAction {
    #[serde(deserialize_with = "lenient::text")]
    pub date: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient::text")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub description: Option<String>,
}

impl SuiviAction {
    /// `"<DD/MM/YYYY> - <type>: <description>"`, or `None` when every part is
    /// empty.
    pub fn render(&self) -> Option<String> {
        if is_blank(&self.date) && is_blank(&self.kind) && is_blank(&self.description) {
            return None;
        }
        Some(format!(
            "{} - {}: {}",
            format_optional_date(self.date.as_deref()),
            field(&self.kind),
            field(&self.description)
        ))
    }
}

/// Borrowed text of an optional field, empty when absent.
pub fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

fn is_blank(value: &Option<String>) -> bool {
    field(value).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> UserRecord {
        serde_json::from_value(value).expect("record decodes")
    }

    #[test]
    fn gestionnaire_person_joins_names() {
        let gestionnaire = Gestionnaire::from_value(json!({"prenom": "Jean", "nom": "Dupont"}));
        assert_eq!(gestionnaire.display_name(), "Jean Dupont");
    }

    #[test]
    fn gestionnaire_without_name_falls_back_to_id() {
        let gestionnaire =
            Gestionnaire::from_value(json!({"prenom": "", "nom": "", "id": "u123"}));
        assert_eq!(gestionnaire.display_name(), "u123");

        let only_first = Gestionnaire::from_value(json!({"prenom": "Louise", "nom": null}));
        assert_eq!(only_first.display_name(), "Louise");
    }

    #[test]
    fn gestionnaire_string_and_null() {
        assert_eq!(
            Gestionnaire::from_value(json!("Jean Dupont")).display_name(),
            "Jean Dupont"
        );
        assert_eq!(Gestionnaire::from_value(Value::Null).display_name(), "");
        assert_eq!(Gestionnaire::from_value(json!(42)).display_name(), "42");
        assert_eq!(Gestionnaire::from_value(json!(false)).display_name(), "");
    }

    #[test]
    fn missing_and_null_fields_degrade_to_empty() {
        let user = record(json!({"nom": null, "adresse": "not a mapping", "actions": "nope"}));
        assert_eq!(user.nom, None);
        assert_eq!(user.adresse, Adresse::default());
        assert!(user.actions.is_empty());
        assert_eq!(user.gestionnaire, Gestionnaire::Absent);
        assert!(!user.has_prev_exp);
    }

    #[test]
    fn numeric_fields_are_rendered_as_text() {
        let user = record(json!({
            "telephone": 471234567,
            "adresse": {"rue": "Rue Wayez", "numero": 12, "codePostal": 1070}
        }));
        assert_eq!(user.telephone.as_deref(), Some("471234567"));
        assert_eq!(user.adresse.full(), "Rue Wayez 12, 1070 ");
    }

    #[test]
    fn logement_details_accepts_every_stored_shape() {
        let mapping = LogementDetails::decode(json!({"typeLogement": "Social", "loyer": 450}));
        assert_eq!(mapping.type_logement.as_deref(), Some("Social"));
        assert_eq!(mapping.loyer.as_deref(), Some("450"));

        let encoded = LogementDetails::decode(json!("{\"proprietaire\": \"CPAS\"}"));
        assert_eq!(encoded.proprietaire.as_deref(), Some("CPAS"));

        let broken = LogementDetails::decode(json!("{not json"));
        assert_eq!(broken.commentaire.as_deref(), Some("{not json"));

        let plain = LogementDetails::decode(json!("Hébergé chez un proche"));
        assert_eq!(plain.commentaire.as_deref(), Some("Hébergé chez un proche"));

        let trailing = LogementDetails::decode(json!("{\"a\": 1} trailing"));
        assert_eq!(trailing.commentaire.as_deref(), Some("{\"a\": 1} trailing"));

        assert_eq!(LogementDetails::decode(json!(12)), LogementDetails::default());
    }

    #[test]
    fn logement_details_decode_through_record() {
        let user = record(json!({"logementDetails": "{\"dateEntree\": \"2023-05-01\"}"}));
        assert_eq!(user.logement_details.date_entree.as_deref(), Some("2023-05-01"));
    }

    #[test]
    fn problematique_render_skips_empty_entries() {
        let filled = Problematique {
            kind: Some("A".into()),
            description: Some(String::new()),
        };
        assert_eq!(filled.render().as_deref(), Some("A: "));
        assert_eq!(Problematique::default().render(), None);
    }

    #[test]
    fn action_render_formats_date() {
        let action = SuiviAction {
            date: Some("2024-03-07T10:00:00Z".into()),
            kind: Some("Visite".into()),
            description: Some("domicile".into()),
        };
        assert_eq!(action.render().as_deref(), Some("07/03/2024 - Visite: domicile"));
        assert_eq!(SuiviAction::default().render(), None);
    }
}
