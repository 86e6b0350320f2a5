use minotas_core::{
    Category, FileKeyValueStore, KvNoteRepository, MemoryKeyValueStore, Note, NoteRepository,
};
use std::collections::HashSet;

#[cfg(feature = "sqlite")]
use minotas_core::SqliteNoteRepository;

fn check_add_then_list(repo: &dyn NoteRepository) {
    repo.add_note(Category::Ideas, "existente").expect("add_note should succeed");
    let before: HashSet<i64> = repo
        .list_notes()
        .expect("list_notes should succeed")
        .iter()
        .map(|n| n.id)
        .collect();

    let id = repo.add_note(Category::Personal, "Comprar leche").expect("add_note should succeed");
    let after = repo.list_notes().expect("list_notes should succeed");

    assert!(!before.contains(&id));
    assert_eq!(after.len(), before.len() + 1);
    let added: Vec<&Note> = after.iter().filter(|n| !before.contains(&n.id)).collect();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0], &Note::new(id, Category::Personal, "Comprar leche"));
    assert_eq!(after.last().map(|n| n.id), Some(id));
}

fn check_update_touches_only_target(repo: &dyn NoteRepository) {
    let keep = repo.add_note(Category::Trabajo, "informe").expect("add_note should succeed");
    let target = repo
        .add_note(Category::Personal, "Comprar leche")
        .expect("add_note should succeed");

    repo.update_note(target, Category::Trabajo, "Comprar leche y pan")
        .expect("update_note should succeed");

    let notes = repo.list_notes().expect("list_notes should succeed");
    assert_eq!(notes.len(), 2);
    assert!(notes.contains(&Note::new(keep, Category::Trabajo, "informe")));
    assert!(notes.contains(&Note::new(
        target,
        Category::Trabajo,
        "Comprar leche y pan"
    )));
}

fn check_delete_touches_only_target(repo: &dyn NoteRepository) {
    let keep = repo.add_note(Category::Ideas, "idea").expect("add_note should succeed");
    let target = repo.add_note(Category::Recordatorios, "cita").expect("add_note should succeed");

    repo.delete_note(target).expect("delete_note should succeed");

    assert_eq!(
        repo.list_notes().expect("list_notes should succeed"),
        vec![Note::new(keep, Category::Ideas, "idea")]
    );
}

fn check_missing_id_is_noop(repo: &dyn NoteRepository) {
    let id = repo.add_note(Category::Personal, "única").expect("add_note should succeed");
    let before = repo.list_notes().expect("list_notes should succeed");

    repo.update_note(id + 12_345, Category::Trabajo, "fantasma")
        .expect("update_note should succeed");
    repo.delete_note(id + 12_345).expect("delete_note should succeed");

    assert_eq!(repo.list_notes().expect("list_notes should succeed"), before);
}

fn all_checks(make: impl Fn() -> Box<dyn NoteRepository>) {
    check_add_then_list(make().as_ref());
    check_update_touches_only_target(make().as_ref());
    check_delete_touches_only_target(make().as_ref());
    check_missing_id_is_noop(make().as_ref());
}

#[test]
fn memory_slot_strategy_satisfies_contract() {
    all_checks(|| Box::new(KvNoteRepository::new(MemoryKeyValueStore::new())));
}

#[test]
fn file_slot_strategy_satisfies_contract() {
    let root = tempfile::tempdir().expect("create temp dir");
    let counter = std::cell::Cell::new(0);
    all_checks(|| {
        counter.set(counter.get() + 1);
        let dir = root.path().join(format!("kv-{}", counter.get()));
        Box::new(KvNoteRepository::new(FileKeyValueStore::open(dir).expect("open store")))
    });
}

#[cfg(feature = "sqlite")]
#[test]
fn sqlite_strategy_satisfies_contract() {
    all_checks(|| Box::new(SqliteNoteRepository::open_in_memory().expect("open in-memory db")));
}

#[cfg(feature = "sqlite")]
#[test]
fn sqlite_add_update_delete_scenario() {
    let repo = SqliteNoteRepository::open_in_memory().expect("open in-memory db");

    repo.add_note(Category::Personal, "Comprar leche").expect("add_note should succeed");
    assert_eq!(
        repo.list_notes().expect("list_notes should succeed"),
        vec![Note::new(1, Category::Personal, "Comprar leche")]
    );

    repo.update_note(1, Category::Trabajo, "Comprar leche y pan")
        .expect("update_note should succeed");
    assert_eq!(
        repo.list_notes().expect("list_notes should succeed"),
        vec![Note::new(1, Category::Trabajo, "Comprar leche y pan")]
    );

    repo.delete_note(1).expect("delete_note should succeed");
    assert!(repo.list_notes().expect("list_notes should succeed").is_empty());
}

#[test]
fn file_slot_survives_reopen() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let id = {
        let repo = KvNoteRepository::new(FileKeyValueStore::open(dir.path()).expect("open store"));
        repo.add_note(Category::Recordatorios, "pagar luz").expect("add_note should succeed")
    };

    let reopened = KvNoteRepository::new(FileKeyValueStore::open(dir.path()).expect("open store"));
    assert_eq!(
        reopened.list_notes().expect("list_notes should succeed"),
        vec![Note::new(id, Category::Recordatorios, "pagar luz")]
    );
}

#[test]
fn slot_ids_stay_unique_for_rapid_adds() {
    let repo = KvNoteRepository::new(MemoryKeyValueStore::new());
    let ids: Vec<i64> = (0..50)
        .map(|i| {
            repo.add_note(Category::Ideas, &format!("nota {i}"))
                .expect("add_note should succeed")
        })
        .collect();
    let unique: HashSet<i64> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());
}
