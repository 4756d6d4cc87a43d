use serde_json::json;
use speculate2::speculate;
use tintero::models::PurchaseOutcome;
use tintero::repo::Backend;
use tintero::store::{collections, Store};
use tintero::Error;

fn fund(store: &Store, user: &str, coins: i64) {
    store
        .set(
            collections::USERS,
            user,
            json!({ "monedas": coins }).as_object().cloned().unwrap(),
        )
        .expect("Failed to fund user");
}

fn grant_feature(store: &Store, user: &str, feature: &str) {
    store
        .add(
            collections::FEATURE_UNLOCKS,
            json!({
                "id_usuario": user,
                "feature": feature,
                "fecha_compra": "2024-01-01T00:00:00Z",
            })
            .as_object()
            .cloned()
            .unwrap(),
        )
        .expect("Failed to grant feature");
}

speculate! {
    before {
        let store = Store::open_memory().expect("Failed to create in-memory store");
        store.migrate().expect("Failed to run migrations");
        let backend = Backend::new(store.clone());
    }

    describe "purchase_template" {
        it "debits the balance and writes exactly one unlock record" {
            fund(&store, "u1", 500);

            let outcome = backend.economy.purchase_template("u1", "t1", 200)
                .expect("purchase failed");
            assert_eq!(outcome, PurchaseOutcome::Purchased { balance: 300 });

            assert_eq!(backend.economy.coins("u1").expect("coins failed"), 300);
            assert_eq!(
                backend.economy.unlocked_templates("u1").expect("list failed"),
                vec!["t1".to_string()]
            );

            let unlock = &store
                .query(collections::TEMPLATE_UNLOCKS, &[("id_usuario", json!("u1"))])
                .expect("scan failed")[0].1;
            assert!(unlock.get("fecha_compra").is_some());
        }

        it "fails with InsufficientFunds and leaves the balance alone" {
            fund(&store, "u1", 100);

            let err = backend.economy.purchase_template("u1", "t1", 200)
                .expect_err("expected insufficient funds");
            assert!(matches!(err, Error::InsufficientFunds { balance: 100 }));

            assert_eq!(backend.economy.coins("u1").expect("coins failed"), 100);
            assert!(backend.economy.unlocked_templates("u1").expect("list failed").is_empty());
        }

        it "fails with UserNotFound when no user record exists" {
            let err = backend.economy.purchase_template("ghost", "t1", 200)
                .expect_err("expected user not found");
            assert!(matches!(err, Error::UserNotFound));
        }

        it "re-purchasing an owned template charges nothing" {
            fund(&store, "u1", 500);

            backend.economy.purchase_template("u1", "t1", 200).expect("purchase failed");
            let outcome = backend.economy.purchase_template("u1", "t1", 200)
                .expect("re-purchase failed");
            assert_eq!(outcome, PurchaseOutcome::AlreadyOwned);

            assert_eq!(backend.economy.coins("u1").expect("coins failed"), 300);
            let records = store
                .query(collections::TEMPLATE_UNLOCKS, &[("id_usuario", json!("u1"))])
                .expect("scan failed");
            assert_eq!(records.len(), 1);
        }
    }

    describe "purchase_feature" {
        it "uses the caller-supplied cost and is idempotent" {
            fund(&store, "u1", 300);

            let outcome = backend.economy.purchase_feature("u1", "multimedia_images", 150)
                .expect("purchase failed");
            assert_eq!(outcome, PurchaseOutcome::Purchased { balance: 150 });
            assert_eq!(backend.economy.coins("u1").expect("coins failed"), 150);
            assert!(backend.economy.feature_unlocked("u1", "multimedia_images")
                .expect("check failed"));

            let outcome = backend.economy.purchase_feature("u1", "multimedia_images", 150)
                .expect("re-purchase failed");
            assert_eq!(outcome, PurchaseOutcome::AlreadyOwned);
            assert_eq!(backend.economy.coins("u1").expect("coins failed"), 150);
        }

        it "rejects a non-positive cost without touching the balance" {
            fund(&store, "u1", 500);

            let err = backend.economy.purchase_feature("u1", "multimedia_images", -50)
                .expect_err("expected validation error");
            assert!(matches!(err, Error::Validation(_)));

            let err = backend.economy.purchase_feature("u1", "multimedia_images", 0)
                .expect_err("expected validation error");
            assert!(matches!(err, Error::Validation(_)));

            assert_eq!(backend.economy.coins("u1").expect("coins failed"), 500);
            assert!(!backend.economy.feature_unlocked("u1", "multimedia_images")
                .expect("check failed"));
        }

        it "keeps unlocks invisible across users" {
            fund(&store, "u1", 300);
            backend.economy.purchase_feature("u1", "multimedia_images", 150)
                .expect("purchase failed");

            assert!(!backend.economy.feature_unlocked("u2", "multimedia_images")
                .expect("check failed"));
        }
    }

    describe "concurrent purchases of the same item" {
        it "produce exactly one debit and one unlock record" {
            fund(&store, "u1", 1000);

            let mut handles = Vec::new();
            for _ in 0..4 {
                let economy = backend.economy.clone();
                handles.push(std::thread::spawn(move || {
                    economy.purchase_template("u1", "t1", 200)
                }));
            }

            let outcomes: Vec<PurchaseOutcome> = handles
                .into_iter()
                .map(|h| h.join().expect("thread panicked").expect("purchase failed"))
                .collect();

            let purchased = outcomes
                .iter()
                .filter(|o| matches!(o, PurchaseOutcome::Purchased { .. }))
                .count();
            assert_eq!(purchased, 1);

            assert_eq!(backend.economy.coins("u1").expect("coins failed"), 800);
            let records = store
                .query(collections::TEMPLATE_UNLOCKS, &[("id_usuario", json!("u1"))])
                .expect("scan failed");
            assert_eq!(records.len(), 1);
        }
    }

    describe "read side" {
        it "filters fonts by prefix and strips it" {
            grant_feature(&store, "u1", "font_Lora");
            grant_feature(&store, "u1", "font_Pacifico");
            grant_feature(&store, "u1", "multimedia_images");

            let fonts = backend.economy.unlocked_fonts("u1").expect("fonts failed");
            assert_eq!(fonts, vec!["Lora".to_string(), "Pacifico".to_string()]);
        }

        it "returns background asset paths verbatim" {
            grant_feature(&store, "u1", "assets/animations/rain.json");
            grant_feature(&store, "u1", "font_Lora");

            let backgrounds = backend.economy.unlocked_backgrounds("u1").expect("backgrounds failed");
            assert_eq!(backgrounds, vec!["assets/animations/rain.json".to_string()]);
        }

        it "reports zero coins for a missing user" {
            assert_eq!(backend.economy.coins("ghost").expect("coins failed"), 0);
        }
    }
}
