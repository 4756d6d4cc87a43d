use chrono::Utc;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::models::{FeatureUnlock, PurchaseOutcome, TemplateUnlock, UserAccount};
use crate::store::{collections, Document, Store};

/// Price of a template unlock, fixed at the request layer.
pub const TEMPLATE_COST: i64 = 200;
/// Default price of a feature unlock when the request omits `costo`.
pub const FEATURE_COST: i64 = 150;

/// Feature-name prefix marking an unlockable font.
pub const FONT_PREFIX: &str = "font_";
/// Feature-name prefix marking an unlockable background animation asset.
pub const BACKGROUND_PREFIX: &str = "assets/animations/";

/// Balance-checked, atomic debit-and-unlock purchases, plus the read
/// side over unlock records.
///
/// The balance record and the unlock-record set for a (user, item) pair
/// form one consistency unit: every read and write of that unit during a
/// purchase happens inside a single store transaction. The pre-check
/// outside the transaction is a fast path only; ownership is re-verified
/// inside so that two racing buyers can never both debit.
#[derive(Clone)]
pub struct Economy {
    store: Store,
}

impl Economy {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    // ============================================================
    // Purchases
    // ============================================================

    pub fn purchase_template(
        &self,
        user_id: &str,
        template_id: &str,
        cost: i64,
    ) -> Result<PurchaseOutcome> {
        let filters = [
            ("id_usuario", json!(user_id)),
            ("id_plantilla", json!(template_id)),
        ];
        let record = super::encode(&json!({
            "id_usuario": user_id,
            "id_plantilla": template_id,
        }))?;
        self.purchase(user_id, cost, collections::TEMPLATE_UNLOCKS, &filters, &record)
    }

    pub fn purchase_feature(
        &self,
        user_id: &str,
        feature: &str,
        cost: i64,
    ) -> Result<PurchaseOutcome> {
        let filters = [("id_usuario", json!(user_id)), ("feature", json!(feature))];
        let record = super::encode(&json!({
            "id_usuario": user_id,
            "feature": feature,
        }))?;
        self.purchase(user_id, cost, collections::FEATURE_UNLOCKS, &filters, &record)
    }

    /// The shared purchase protocol.
    ///
    /// 0. A non-positive cost is rejected outright; `costo` comes from
    ///    the client and a negative value would credit the account.
    /// 1. Pre-check (outside the transaction): already owned is an
    ///    idempotent no-charge success.
    /// 2. Atomically: fresh balance read (absent user is `UserNotFound`,
    ///    short balance is `InsufficientFunds`), re-verify the unlock is
    ///    still absent, debit, write the unlock record stamped with
    ///    server purchase time, commit.
    ///
    /// The in-transaction ownership re-check is what makes the operation
    /// exactly-once: of two racing buyers that both pass the pre-check,
    /// the second sees the first's committed record and charges nothing.
    fn purchase(
        &self,
        user_id: &str,
        cost: i64,
        unlock_collection: &str,
        item_filters: &[(&str, Value)],
        record: &Document,
    ) -> Result<PurchaseOutcome> {
        if cost <= 0 {
            return Err(Error::validation("Costo inválido"));
        }

        if !self.store.query(unlock_collection, item_filters)?.is_empty() {
            return Ok(PurchaseOutcome::AlreadyOwned);
        }

        self.store.run_transaction(|txn| {
            let Some(account_doc) = txn.get(collections::USERS, user_id)? else {
                return Err(Error::UserNotFound);
            };
            let account: UserAccount = serde_json::from_value(Value::Object(account_doc))?;

            if account.coins < cost {
                return Err(Error::InsufficientFunds {
                    balance: account.coins,
                });
            }

            if !txn.query(unlock_collection, item_filters)?.is_empty() {
                return Ok(PurchaseOutcome::AlreadyOwned);
            }

            let balance = account.coins - cost;
            txn.update(
                collections::USERS,
                user_id,
                super::encode(&json!({ "monedas": balance }))?,
            )?;

            let mut unlock = record.clone();
            unlock.insert(
                "fecha_compra".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
            txn.add(unlock_collection, unlock)?;

            Ok(PurchaseOutcome::Purchased { balance })
        })
    }

    // ============================================================
    // Read side
    // ============================================================

    /// Current coin balance; 0 when the user record is absent. Reads
    /// outside a purchase are advisory only.
    pub fn coins(&self, user_id: &str) -> Result<i64> {
        match self.store.get(collections::USERS, user_id)? {
            Some(doc) => {
                let account: UserAccount = serde_json::from_value(Value::Object(doc))?;
                Ok(account.coins)
            }
            None => Ok(0),
        }
    }

    pub fn template_unlocked(&self, user_id: &str, template_id: &str) -> Result<bool> {
        let matches = self.store.query(
            collections::TEMPLATE_UNLOCKS,
            &[
                ("id_usuario", json!(user_id)),
                ("id_plantilla", json!(template_id)),
            ],
        )?;
        Ok(!matches.is_empty())
    }

    pub fn feature_unlocked(&self, user_id: &str, feature: &str) -> Result<bool> {
        let matches = self.store.query(
            collections::FEATURE_UNLOCKS,
            &[("id_usuario", json!(user_id)), ("feature", json!(feature))],
        )?;
        Ok(!matches.is_empty())
    }

    pub fn unlocked_templates(&self, user_id: &str) -> Result<Vec<String>> {
        let unlocks: Vec<TemplateUnlock> = self
            .store
            .query(
                collections::TEMPLATE_UNLOCKS,
                &[("id_usuario", json!(user_id))],
            )?
            .into_iter()
            .map(|(id, doc)| super::decode(&id, doc))
            .collect::<Result<_>>()?;
        Ok(unlocks.into_iter().map(|u| u.template_id).collect())
    }

    pub fn unlocked_features(&self, user_id: &str) -> Result<Vec<String>> {
        let unlocks: Vec<FeatureUnlock> = self
            .store
            .query(
                collections::FEATURE_UNLOCKS,
                &[("id_usuario", json!(user_id))],
            )?
            .into_iter()
            .map(|(id, doc)| super::decode(&id, doc))
            .collect::<Result<_>>()?;
        Ok(unlocks.into_iter().map(|u| u.feature).collect())
    }

    /// Unlocked fonts: `font_`-prefixed features, prefix stripped.
    pub fn unlocked_fonts(&self, user_id: &str) -> Result<Vec<String>> {
        Ok(self
            .unlocked_features(user_id)?
            .into_iter()
            .filter_map(|f| f.strip_prefix(FONT_PREFIX).map(str::to_string))
            .collect())
    }

    /// Unlocked background animations: asset-path features, verbatim.
    pub fn unlocked_backgrounds(&self, user_id: &str) -> Result<Vec<String>> {
        Ok(self
            .unlocked_features(user_id)?
            .into_iter()
            .filter(|f| f.starts_with(BACKGROUND_PREFIX))
            .collect())
    }
}
