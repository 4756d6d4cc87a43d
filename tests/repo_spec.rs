use serde_json::json;
use speculate2::speculate;
use tintero::models::*;
use tintero::repo::Backend;
use tintero::store::{collections, Store};
use tintero::Error;

fn new_note(owner: &str, title: &str) -> Note {
    Note {
        id: String::new(),
        owner_id: owner.to_string(),
        template_id: "t1".to_string(),
        title: title.to_string(),
        content: "body".to_string(),
        tags: Vec::new(),
        drawing: None,
        state: NoteState::Activa,
        favorite: false,
        background_animation: None,
        background_color: None,
        category_id: None,
        created_at: None,
        updated_at: None,
    }
}

speculate! {
    before {
        let store = Store::open_memory().expect("Failed to create in-memory store");
        store.migrate().expect("Failed to run migrations");
        let backend = Backend::new(store.clone());
    }

    describe "notes" {
        it "round-trips a created note with server timestamps" {
            let id = backend.notes.create(&new_note("u1", "Hi")).expect("create failed");

            let note = backend.notes.get(&id).expect("get failed").expect("missing");
            assert_eq!(note.id, id);
            assert_eq!(note.owner_id, "u1");
            assert_eq!(note.template_id, "t1");
            assert_eq!(note.title, "Hi");
            assert_eq!(note.content, "body");
            assert!(!note.favorite);
            assert_eq!(note.state, NoteState::Activa);

            let created = note.created_at.expect("missing fecha_creacion");
            let updated = note.updated_at.expect("missing fecha_modificacion");
            assert!(updated >= created);
        }

        it "keeps fecha_creacion immutable and bumps fecha_modificacion on update" {
            let id = backend.notes.create(&new_note("u1", "Hi")).expect("create failed");
            let before = backend.notes.get(&id).expect("get failed").expect("missing");

            let updated = backend.notes.update(&id, &UpdateNoteInput {
                title: Some("Hola".to_string()),
                ..Default::default()
            }).expect("update failed");
            assert!(updated);

            let after = backend.notes.get(&id).expect("get failed").expect("missing");
            assert_eq!(after.title, "Hola");
            assert_eq!(after.content, "body");
            assert_eq!(after.created_at, before.created_at);
            assert!(after.updated_at >= before.updated_at);
        }

        it "update of a missing note reports a no-op" {
            let updated = backend.notes.update("nope", &UpdateNoteInput {
                title: Some("x".to_string()),
                ..Default::default()
            }).expect("update failed");
            assert!(!updated);
        }

        it "list_by_owner only returns that owner's notes" {
            backend.notes.create(&new_note("u1", "a")).expect("create failed");
            backend.notes.create(&new_note("u2", "b")).expect("create failed");
            backend.notes.create(&new_note("u1", "c")).expect("create failed");

            let notes = backend.notes.list_by_owner("u1").expect("list failed");
            assert_eq!(notes.len(), 2);
            assert!(notes.iter().all(|n| n.owner_id == "u1"));
        }

        it "reads tolerate an unparseable stored timestamp" {
            let id = backend.notes.create(&new_note("u1", "Hi")).expect("create failed");
            store.update(collections::NOTES, &id, json!({ "fecha_creacion": "garbage" })
                .as_object().cloned().unwrap()).expect("raw update failed");

            let note = backend.notes.get(&id).expect("get failed").expect("missing");
            assert!(note.created_at.is_none());
            assert!(note.updated_at.is_some());
        }

        it "reads tolerate a numeric stored timestamp" {
            let id = backend.notes.create(&new_note("u1", "Hi")).expect("create failed");
            store.update(collections::NOTES, &id, json!({ "fecha_creacion": 1700000000 })
                .as_object().cloned().unwrap()).expect("raw update failed");

            let note = backend.notes.get(&id).expect("get failed").expect("missing");
            assert!(note.created_at.is_none());
            assert!(note.updated_at.is_some());
        }

        it "delete is unconditional and leaves link records behind" {
            let id = backend.notes.create(&new_note("u1", "Hi")).expect("create failed");
            let cat = backend.categories.get_or_create("General").expect("category failed");
            backend.links.link(&id, &cat).expect("link failed");

            backend.notes.delete(&id).expect("delete failed");
            backend.notes.delete(&id).expect("double delete failed");

            assert!(backend.notes.get(&id).expect("get failed").is_none());
            assert_eq!(backend.links.by_category(&cat).expect("scan failed").len(), 1);
            // The orphaned link is skipped by the read-side join.
            assert!(backend.notes_by_category("u1", &cat).expect("join failed").is_empty());
        }
    }

    describe "categories" {
        it "get_or_create returns the same id both times" {
            let first = backend.categories.get_or_create("Ideas").expect("create failed");
            let second = backend.categories.get_or_create("Ideas").expect("lookup failed");
            assert_eq!(first, second);

            assert_eq!(backend.categories.all().expect("all failed").len(), 1);
        }

        it "create rejects a duplicate name" {
            backend.categories.create("Ideas").expect("create failed");

            let err = backend.categories.create("Ideas").expect_err("expected conflict");
            assert!(matches!(err, Error::Conflict(_)));
        }

        it "rename fails with NotFound for a missing id" {
            let err = backend.categories.rename("nope", "x").expect_err("expected not found");
            assert!(matches!(err, Error::NotFound(_)));
        }

        it "delete fails with NotFound for a missing id" {
            let err = backend.categories.delete("nope").expect_err("expected not found");
            assert!(matches!(err, Error::NotFound(_)));
        }

        it "delete refuses while a note's direct field references it" {
            let cat = backend.categories.get_or_create("Ideas").expect("category failed");
            let note = backend.notes.create(&new_note("u1", "Hi")).expect("create failed");
            backend.notes.update(&note, &UpdateNoteInput {
                category_id: Some(cat.clone()),
                ..Default::default()
            }).expect("update failed");

            let err = backend.categories.delete(&cat).expect_err("expected conflict");
            assert!(matches!(err, Error::Conflict(_)));

            // Once the note is gone the guard clears.
            backend.notes.delete(&note).expect("delete note failed");
            backend.categories.delete(&cat).expect("delete category failed");
        }

        it "lists a stored category without a name as empty" {
            backend.categories.get_or_create("Ideas").expect("category failed");
            store.add(collections::CATEGORIES, json!({})
                .as_object().cloned().unwrap()).expect("raw add failed");

            let mut names: Vec<String> = backend.categories.all().expect("all failed")
                .into_iter().map(|c| c.name).collect();
            names.sort();
            assert_eq!(names, vec!["".to_string(), "Ideas".to_string()]);
        }

        it "delete succeeds when only link records reference it" {
            let cat = backend.categories.get_or_create("Ideas").expect("category failed");
            let note = backend.notes.create(&new_note("u1", "Hi")).expect("create failed");
            backend.links.link(&note, &cat).expect("link failed");

            backend.categories.delete(&cat).expect("delete failed");
        }
    }

    describe "links" {
        it "relinking accumulates records without deduplication" {
            let cat = backend.categories.get_or_create("Ideas").expect("category failed");
            let note = backend.notes.create(&new_note("u1", "Hi")).expect("create failed");

            backend.links.link(&note, &cat).expect("link failed");
            backend.links.link(&note, &cat).expect("relink failed");

            assert_eq!(backend.links.by_category(&cat).expect("scan failed").len(), 2);
        }
    }

    describe "notes_by_category" {
        it "joins link records against owner-filtered notes" {
            let cat = backend.categories.get_or_create("Ideas").expect("category failed");
            let mine = backend.notes.create(&new_note("u1", "mine")).expect("create failed");
            let theirs = backend.notes.create(&new_note("u2", "theirs")).expect("create failed");
            backend.links.link(&mine, &cat).expect("link failed");
            backend.links.link(&theirs, &cat).expect("link failed");

            let notes = backend.notes_by_category("u1", &cat).expect("join failed");
            assert_eq!(notes.len(), 1);
            assert_eq!(notes[0].title, "mine");
        }

        it "returns empty when no links exist" {
            let cat = backend.categories.get_or_create("Ideas").expect("category failed");
            assert!(backend.notes_by_category("u1", &cat).expect("join failed").is_empty());
        }
    }
}
