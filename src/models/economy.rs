use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's coin account. For purchases, the existence of this record is
/// the user-existence predicate: no record means `UserNotFound`, never an
/// implicit zero balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    #[serde(rename = "monedas", default)]
    pub coins: i64,
}

/// Proof that a user purchased a template. Existence of the record is
/// the "unlocked" predicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateUnlock {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "id_usuario")]
    pub user_id: String,
    #[serde(rename = "id_plantilla")]
    pub template_id: String,
    #[serde(
        rename = "fecha_compra",
        default,
        deserialize_with = "super::lenient_datetime"
    )]
    pub purchased_at: Option<DateTime<Utc>>,
}

/// Proof that a user purchased a named feature.
///
/// Feature names are free-form, with two reserved conventions used by the
/// read side: `font_<name>` marks an unlockable font and
/// `assets/animations/<path>` marks an unlockable background asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureUnlock {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "id_usuario")]
    pub user_id: String,
    #[serde(rename = "feature")]
    pub feature: String,
    #[serde(
        rename = "fecha_compra",
        default,
        deserialize_with = "super::lenient_datetime"
    )]
    pub purchased_at: Option<DateTime<Utc>>,
}

/// Result of a successful purchase attempt. Both variants are success:
/// an already-owned item is an idempotent no-charge outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// Coins were debited and the unlock record written atomically.
    Purchased { balance: i64 },
    /// An unlock record already existed; nothing was charged.
    AlreadyOwned,
}

/// Body of `POST /api/usuarios/comprar_plantilla`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchaseTemplateInput {
    #[serde(rename = "id_usuario")]
    pub user_id: Option<String>,
    #[serde(rename = "id_plantilla")]
    pub template_id: Option<String>,
}

/// Body of `POST /api/usuarios/comprar_feature`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchaseFeatureInput {
    #[serde(rename = "id_usuario")]
    pub user_id: Option<String>,
    pub feature: Option<String>,
    /// Caller-supplied price; the request layer defaults it to
    /// [`crate::repo::FEATURE_COST`].
    #[serde(rename = "costo")]
    pub cost: Option<i64>,
}
