use filmrec_core::persist::{load_snapshot_if_fresh, save_snapshot, IndexPaths, MetaFile};
use filmrec_core::{Catalog, Item, Recommender, TfIdfIndex, Tokenizer, Weighting};
use std::sync::Arc;
use tempfile::tempdir;

fn catalog() -> Catalog {
    Catalog::from_items(vec![
        Item::new("Alpha", "Action", "A hero saves a city"),
        Item::new("Beta", "Action", "A hero saves a town"),
        Item::new("Gamma", "Drama", "A family drama unfolds"),
    ])
}

#[test]
fn snapshot_round_trips_for_matching_dataset() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let catalog = catalog();
    let index = TfIdfIndex::build(&catalog.documents(), Tokenizer::default(), Weighting::default());
    let meta = MetaFile::describe(&index, catalog.fingerprint(), "2024-01-01T00:00:00Z".into());
    save_snapshot(&paths, &index, &meta).unwrap();

    let (loaded, loaded_meta) = load_snapshot_if_fresh(&paths, catalog.fingerprint()).unwrap().unwrap();
    assert_eq!(loaded_meta, meta);
    assert_eq!(loaded.vectors(), index.vectors());

    let r = Recommender::new(Arc::new(catalog)).with_index(loaded).unwrap();
    assert_eq!(r.recommend("Alpha").unwrap(), vec!["Beta".to_string(), "Gamma".to_string()]);
}

#[test]
fn stale_snapshot_is_ignored() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let catalog = catalog();
    let index = TfIdfIndex::build(&catalog.documents(), Tokenizer::default(), Weighting::default());
    let meta = MetaFile::describe(&index, catalog.fingerprint(), String::new());
    save_snapshot(&paths, &index, &meta).unwrap();

    let changed = Catalog::from_items(vec![Item::new("Alpha", "Action", "A hero saves a village")]);
    assert!(load_snapshot_if_fresh(&paths, changed.fingerprint()).unwrap().is_none());
}

#[test]
fn missing_snapshot_is_none() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path().join("nothing-here"));
    assert!(load_snapshot_if_fresh(&paths, "abc").unwrap().is_none());
}

#[test]
fn catalog_loads_jsonl_and_directories() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("a.jsonl"),
        "{\"title\":\"Alpha\",\"genres\":\"Action\",\"overview\":\"A hero saves a city\"}\n\n{\"title\":\"Beta\",\"genres\":\"Action\",\"overview\":null}\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("b.json"),
        r#"[{"title":"Gamma","genres":"Drama","overview":"A family drama unfolds","release_date":"2001-05-04","vote_count":12}]"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let catalog = Catalog::load(dir.path()).unwrap();
    let titles: Vec<_> = catalog.items().iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["Alpha", "Beta", "Gamma"]);
    assert_eq!(catalog.items()[2].vote_count, Some(12.0));

    let single = Catalog::load(dir.path().join("b.json")).unwrap();
    assert_eq!(single.len(), 1);
    assert!(Catalog::load(dir.path().join("missing.json")).is_err());
}

#[test]
fn bad_array_record_names_file_and_element() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("movies.json");
    std::fs::write(&file, r#"[{"title":"Ok"},{"genres":"Drama"}]"#).unwrap();

    let err = Catalog::load(&file).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("movies.json[1]: invalid record"), "{msg}");
    assert!(msg.contains("title"), "{msg}");
}
