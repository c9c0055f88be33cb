use serde::Serialize;

/// Record produced by the mediation spreadsheet import, in the shape the
/// application's bulk import endpoint accepts.
///
/// Plain fields serialise as `null` when empty; `adresse` and `remarques`
/// are omitted instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedUsager {
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub genre: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    pub nationalite: Option<String>,
    pub tranche_age: Option<String>,
    pub date_ouverture: Option<String>,
    pub date_cloture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adresse: Option<ImportedAdresse>,
    pub gestionnaire: Option<String>,
    pub secteur: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarques: Option<String>,
    pub annee: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedAdresse {
    pub rue: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numero: Option<String>,
    pub ville: String,
    pub code_postal: String,
}
