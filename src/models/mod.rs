//! Domain models for the notes backend.
//!
//! # Core Concepts
//!
//! - [`Note`]: user-owned content with server-stamped timestamps and
//!   per-note styling (background animation/color, drawing payload).
//! - [`Category`]: named grouping for notes. Notes are attached through
//!   [`NoteCategoryLink`] records, which accumulate over time rather than
//!   superseding each other.
//! - [`UserAccount`], [`TemplateUnlock`], [`FeatureUnlock`]: the economy.
//!   A template or feature is unlocked for a user exactly when an unlock
//!   record for the pair exists; there is no separate boolean.
//!
//! Wire field names stay Spanish (`id_usuario`, `titulo`, `monedas`, ...)
//! via serde renames so the existing mobile clients keep working.

mod category;
mod economy;
mod note;

pub use category::*;
pub use economy::*;
pub use note::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize a stored timestamp, mapping anything absent, non-string
/// or unparseable to `None` instead of failing the whole read. Other
/// writers have left numeric epochs in old documents.
pub(crate) fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}
