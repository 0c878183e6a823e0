use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[\p{L}\p{N}]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","almost","alone","along","already","also","although","always","am","among","an","and","another","any","anyhow","anyone","anything","anyway","anywhere","are","around","as","at",
            "be","became","because","become","becomes","been","before","being","below","beside","besides","between","both","but","by",
            "can","cannot","could",
            "did","do","does","doing","done","down","during",
            "each","either","else","elsewhere","enough","etc","even","ever","every","everyone","everything","everywhere","except",
            "few","for","former","formerly","from","further",
            "had","has","have","having","he","hence","her","here","hers","herself","him","himself","his","how","however",
            "i","ie","if","in","indeed","into","is","it","its","itself",
            "just","last","latter","least","less","ltd",
            "many","may","me","meanwhile","might","more","moreover","most","mostly","much","must","my","myself",
            "neither","never","nevertheless","next","no","nobody","none","noone","nor","not","nothing","now","nowhere",
            "of","off","often","on","once","one","only","onto","or","other","others","otherwise","our","ours","ourselves","out","over","own",
            "per","perhaps","please","rather","re",
            "same","seem","seemed","seeming","seems","several","she","should","since","so","some","somehow","someone","something","sometime","sometimes","somewhere","still","such",
            "than","that","the","their","theirs","them","themselves","then","thence","there","thereafter","thereby","therefore","therein","these","they","this","those","though","through","throughout","thus","to","together","too","toward","towards",
            "under","until","up","upon","us",
            "very","via",
            "was","we","well","were","what","whatever","when","whence","whenever","where","whereas","whether","which","while","who","whoever","whole","whom","whose","why","will","with","within","without","would",
            "yet","you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Splits text into index terms.
///
/// Text is NFKC-normalized and lowercased, split on runs of non-alphanumeric
/// characters, and stripped of English stop words. Stemming is opt-in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokenizer {
    pub stem: bool,
}

impl Tokenizer {
    pub fn new() -> Self { Self::default() }

    pub fn with_stemming(stem: bool) -> Self { Self { stem } }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        let mut tokens = Vec::new();
        for mat in RE.find_iter(&normalized) {
            let token = mat.as_str();
            if is_stopword(token) { continue; }
            if self.stem {
                tokens.push(STEMMER.stem(token).into_owned());
            } else {
                tokens.push(token.to_string());
            }
        }
        tokens
    }
}

/// Tokenize with the default settings (no stemming).
pub fn tokenize(text: &str) -> Vec<String> {
    Tokenizer::default().tokenize(text)
}
