use filmrec_core::tokenizer::{tokenize, Tokenizer};

#[test]
fn it_normalizes_and_lowercases() {
    let words = tokenize("ＡＣＴＩＯＮ Café Société");
    // NFKC folds full-width letters
    assert!(words.contains(&"action".to_string()));
    assert!(words.contains(&"café".to_string()));
    assert!(words.contains(&"société".to_string()));
}

#[test]
fn it_filters_stopwords() {
    let words = tokenize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert_eq!(words, vec!["quick", "brown", "fox", "lazy", "dog"]);
}

#[test]
fn it_stems_when_enabled() {
    let words = Tokenizer::with_stemming(true).tokenize("Running Runners RUN!");
    assert!(words.iter().all(|w| w.starts_with("run")));
    assert!(words.contains(&"run".to_string()));
}
