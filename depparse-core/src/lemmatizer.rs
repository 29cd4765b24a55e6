//! # Lematizador
//!
//! Mapeia `(palavra, tag)` para a forma de dicionário: "going"/VBG → "go",
//! "am"/VBP → "be", "children"/NNS → "child".
//!
//! ## Ordem de consulta
//!
//! 1. **Exceções irregulares** por (forma minúscula, classe gramatical).
//! 2. **Regras de desinência** escolhidas pela tag fina (NNS, VBD, VBG, JJR, ...).
//!    Os candidatos são conferidos contra um léxico de formas base; se nenhum
//!    for conhecido, fica o primeiro candidato.
//! 3. **Fallback**: a própria palavra em minúsculas.
//!
//! Clíticos (`'m`, `'s`, `n't`) nunca são reescritos.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Nome do arquivo do dicionário de lemas dentro do diretório de modelo.
pub const LEMMAS_FILE: &str = "lemmas.json";

/// Classe gramatical grossa derivada da tag Penn Treebank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LemmaClass {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Other,
}

impl LemmaClass {
    pub fn from_tag(tag: &str) -> Self {
        if tag.starts_with("NN") {
            LemmaClass::Noun
        } else if tag.starts_with("VB") {
            LemmaClass::Verb
        } else if tag.starts_with("JJ") {
            LemmaClass::Adjective
        } else if tag.starts_with("RB") {
            LemmaClass::Adverb
        } else {
            LemmaClass::Other
        }
    }
}

/// Regras de desinência: (sufixo, substituição), na ordem de preferência.
fn detachment_rules(tag: &str) -> &'static [(&'static str, &'static str)] {
    match tag {
        "NNS" | "NNPS" | "VBZ" => &[
            ("ies", "y"),
            ("sses", "ss"),
            ("ches", "ch"),
            ("shes", "sh"),
            ("xes", "x"),
            ("zes", "z"),
            ("oes", "o"),
            ("s", ""),
        ],
        "VBD" | "VBN" => &[("ied", "y"), ("ed", ""), ("ed", "e")],
        "VBG" => &[("ying", "ie"), ("ing", ""), ("ing", "e")],
        "JJR" | "RBR" => &[("ier", "y"), ("er", ""), ("er", "e")],
        "JJS" | "RBS" => &[("iest", "y"), ("est", ""), ("est", "e")],
        _ => &[],
    }
}

/// Tabelas do lematizador.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lemmatizer {
    exceptions: BTreeMap<LemmaClass, BTreeMap<String, String>>,
    lexicon: BTreeMap<LemmaClass, BTreeSet<String>>,
}

impl Lemmatizer {
    /// Lematizador sem tabelas: só aplica as regras e o fallback.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Dicionário embutido de exceções e formas base do inglês.
    pub fn bundled() -> Self {
        let mut lemmatizer = Self::default();
        for (class, pairs) in EXCEPTIONS {
            for (form, lemma) in *pairs {
                lemmatizer.add_exception(*class, form, lemma);
            }
        }
        for (class, words) in LEXICON {
            for word in *words {
                lemmatizer.add_base_form(*class, word);
            }
        }
        lemmatizer
    }

    pub fn add_exception(&mut self, class: LemmaClass, form: &str, lemma: &str) {
        self.exceptions
            .entry(class)
            .or_default()
            .insert(form.to_lowercase(), lemma.to_string());
    }

    pub fn add_base_form(&mut self, class: LemmaClass, word: &str) {
        self.lexicon.entry(class).or_default().insert(word.to_lowercase());
    }

    pub fn exception_count(&self) -> usize {
        self.exceptions.values().map(BTreeMap::len).sum()
    }

    /// Forma base de `word` com a tag `tag`.
    pub fn lemmatize(&self, word: &str, tag: &str) -> String {
        let lower = word.to_lowercase();
        if lower.starts_with('\'') || lower.starts_with('’') || lower == "n't" {
            return lower;
        }
        let class = LemmaClass::from_tag(tag);
        if let Some(lemma) = self.exceptions.get(&class).and_then(|m| m.get(&lower)) {
            return lemma.clone();
        }

        let candidates = candidates(&lower, tag);
        let known = self.lexicon.get(&class);
        candidates
            .iter()
            .find(|c| known.is_some_and(|set| set.contains(*c)))
            .or_else(|| candidates.first())
            .cloned()
            .unwrap_or(lower)
    }

    /// Verifica a coerência de um dicionário desserializado.
    pub fn validate(&self) -> Result<(), String> {
        for (class, entries) in &self.exceptions {
            if let Some((form, _)) = entries.iter().find(|(f, l)| f.is_empty() || l.is_empty()) {
                return Err(format!("exceção vazia para {form:?} ({class:?})"));
            }
        }
        if self.lexicon.values().flatten().any(String::is_empty) {
            return Err("forma base vazia no léxico".to_string());
        }
        Ok(())
    }
}

/// Candidatos a lema obtidos pelas regras de desinência, sem repetição.
fn candidates(lower: &str, tag: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |candidate: String| {
        if candidate.chars().count() >= 2 && !out.contains(&candidate) {
            out.push(candidate);
        }
    };
    for (suffix, replacement) in detachment_rules(tag) {
        let Some(stem) = lower.strip_suffix(suffix) else { continue };
        // "ss" não é plural ("glass" / NNS com erro de tag)
        if *suffix == "s" && stem.ends_with('s') {
            continue;
        }
        push(format!("{stem}{replacement}"));
        if replacement.is_empty() {
            if let Some(undoubled) = undouble(stem) {
                push(undoubled);
            }
        }
    }
    out
}

/// "runn" → "run", "stopp" → "stop", "bigg" → "big".
fn undouble(stem: &str) -> Option<String> {
    let mut chars = stem.chars().rev();
    let (last, before) = (chars.next()?, chars.next()?);
    let doubled = last == before && !"aeiouylsz".contains(last) && last.is_alphabetic();
    doubled.then(|| stem[..stem.len() - last.len_utf8()].to_string())
}

/// Exceções irregulares por classe.
const EXCEPTIONS: &[(LemmaClass, &[(&str, &str)])] = &[
    (
        LemmaClass::Verb,
        &[
            ("am", "be"), ("are", "be"), ("is", "be"), ("was", "be"), ("were", "be"),
            ("been", "be"), ("being", "be"), ("has", "have"), ("had", "have"),
            ("having", "have"), ("does", "do"), ("did", "do"), ("done", "do"),
            ("goes", "go"), ("went", "go"), ("gone", "go"), ("sat", "sit"), ("gave", "give"),
            ("given", "give"), ("bought", "buy"), ("rose", "rise"), ("risen", "rise"),
            ("born", "bear"), ("made", "make"), ("took", "take"), ("taken", "take"),
            ("came", "come"), ("saw", "see"), ("seen", "see"), ("said", "say"),
            ("got", "get"), ("gotten", "get"), ("knew", "know"), ("known", "know"),
            ("thought", "think"), ("told", "tell"), ("found", "find"), ("left", "leave"),
            ("felt", "feel"), ("kept", "keep"), ("brought", "bring"), ("began", "begin"),
            ("begun", "begin"), ("wrote", "write"), ("written", "write"), ("ran", "run"),
            ("stood", "stand"), ("heard", "hear"), ("met", "meet"), ("paid", "pay"),
            ("sent", "send"), ("built", "build"), ("spent", "spend"), ("lost", "lose"),
            ("fell", "fall"), ("fallen", "fall"), ("ate", "eat"), ("eaten", "eat"),
            ("drank", "drink"), ("drove", "drive"), ("driven", "drive"), ("spoke", "speak"),
            ("spoken", "speak"), ("chose", "choose"), ("chosen", "choose"), ("broke", "break"),
            ("broken", "break"), ("won", "win"), ("sold", "sell"), ("taught", "teach"),
            ("caught", "catch"), ("fought", "fight"), ("slept", "sleep"), ("held", "hold"),
            ("led", "lead"), ("grew", "grow"), ("grown", "grow"), ("flew", "fly"),
            ("flown", "fly"), ("threw", "throw"), ("thrown", "throw"), ("sang", "sing"),
            ("sung", "sing"), ("swam", "swim"), ("wore", "wear"), ("worn", "wear"),
            ("understood", "understand"), ("forgot", "forget"), ("forgotten", "forget"),
            ("lay", "lie"), ("lain", "lie"), ("hid", "hide"), ("hidden", "hide"),
            ("rode", "ride"), ("ridden", "ride"), ("woke", "wake"), ("woken", "wake"),
        ],
    ),
    (
        LemmaClass::Noun,
        &[
            ("children", "child"), ("men", "man"), ("women", "woman"), ("feet", "foot"),
            ("teeth", "tooth"), ("mice", "mouse"), ("geese", "goose"), ("people", "person"),
            ("wives", "wife"), ("knives", "knife"), ("lives", "life"), ("leaves", "leaf"),
            ("wolves", "wolf"), ("halves", "half"), ("shelves", "shelf"), ("data", "datum"),
            ("criteria", "criterion"), ("phenomena", "phenomenon"), ("analyses", "analysis"),
        ],
    ),
    (
        LemmaClass::Adjective,
        &[
            ("better", "good"), ("best", "good"), ("worse", "bad"), ("worst", "bad"),
            ("further", "far"), ("farther", "far"), ("furthest", "far"), ("farthest", "far"),
            ("elder", "old"), ("eldest", "old"), ("less", "little"), ("least", "little"),
            ("more", "much"), ("most", "much"),
        ],
    ),
    (
        LemmaClass::Adverb,
        &[("better", "well"), ("best", "well"), ("worse", "badly"), ("worst", "badly")],
    ),
];

/// Formas base conhecidas, usadas para escolher entre candidatos das regras.
const LEXICON: &[(LemmaClass, &[&str])] = &[
    (
        LemmaClass::Verb,
        &[
            "ask", "arrive", "bake", "bark", "believe", "belong", "borrow", "call", "care",
            "carry", "change", "chase", "clean", "close", "come", "cook", "cry", "dance",
            "decide", "die", "dine", "dream", "dress", "drop", "enjoy", "escape", "expect",
            "explain", "fail", "fill", "finish", "fix", "follow", "free", "guess", "hate",
            "happen", "help", "hope", "hurry", "improve", "include", "invite", "join", "jump",
            "kill", "kiss", "laugh", "learn", "leave", "lie", "like", "listen", "live", "look",
            "love", "make", "manage", "marry", "miss", "move", "need", "notice", "offer", "open",
            "order", "own", "paint", "pass", "pick", "plan", "play", "please", "prefer",
            "prepare", "produce", "promise", "pull", "push", "rain", "reach", "read", "receive",
            "remember", "rest", "return", "ride", "rob", "rub", "run", "save", "serve", "share",
            "shine", "shop", "shout", "sit", "skip", "smell", "smile", "snow", "sound", "start",
            "stay", "step", "stop", "study", "succeed", "suppose", "talk", "taste", "thank",
            "touch", "travel", "try", "turn", "type", "use", "visit", "wait", "walk", "want",
            "wash", "watch", "wave", "win", "wish", "wonder", "work", "worry", "write", "go",
            "do", "see", "say", "take", "get", "give", "know", "think", "tell", "find", "feel",
            "keep", "bring", "begin", "hear", "meet", "pay", "send", "build", "spend", "lose",
            "fall", "eat", "drink", "drive", "speak", "choose", "break", "sell", "teach",
            "catch", "fight", "sleep", "hold", "lead", "grow", "fly", "throw", "sing", "swim",
            "wear", "put", "cut", "hit", "set", "let", "shut", "hurt", "cost", "quit", "buy",
            "rise", "bear", "hide", "wake", "forget", "understand", "stand", "sit",
        ],
    ),
    (
        LemmaClass::Noun,
        &[
            "apple", "bank", "beach", "book", "box", "brother", "bus", "car", "cat", "child",
            "church", "city", "class", "coffee", "company", "country", "day", "dish", "doctor",
            "dog", "door", "family", "film", "flower", "friend", "glass", "hero", "homework",
            "house", "key", "kitchen", "lady", "market", "mat", "match", "month", "movie",
            "newspaper", "night", "park", "parent", "party", "potato", "price", "question",
            "report", "sea", "shoe", "sister", "station", "store", "story", "student", "table",
            "teacher", "town", "village", "watch", "week", "wish", "work", "year",
        ],
    ),
    (
        LemmaClass::Adjective,
        &[
            "big", "busy", "cheap", "clean", "close", "cold", "cute", "dark", "difficult",
            "early", "easy", "expensive", "fast", "fat", "fine", "funny", "good", "great",
            "happy", "hard", "heavy", "high", "hot", "large", "late", "long", "loud", "low",
            "new", "nice", "old", "pretty", "quick", "red", "rich", "right", "safe", "sad",
            "short", "simple", "slow", "small", "smart", "strong", "tall", "thin", "warm",
            "wet", "wide", "young",
        ],
    ),
    (
        LemmaClass::Adverb,
        &["early", "fast", "hard", "late", "long", "soon", "well"],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_irregular_verbs() {
        let lem = Lemmatizer::bundled();
        assert_eq!(lem.lemmatize("am", "VBP"), "be");
        assert_eq!(lem.lemmatize("Are", "VBP"), "be");
        assert_eq!(lem.lemmatize("went", "VBD"), "go");
        assert_eq!(lem.lemmatize("children", "NNS"), "child");
    }

    #[test]
    fn test_regular_inflections() {
        let lem = Lemmatizer::bundled();
        assert_eq!(lem.lemmatize("going", "VBG"), "go");
        assert_eq!(lem.lemmatize("coming", "VBG"), "come");
        assert_eq!(lem.lemmatize("running", "VBG"), "run");
        assert_eq!(lem.lemmatize("studied", "VBD"), "study");
        assert_eq!(lem.lemmatize("stopped", "VBD"), "stop");
        assert_eq!(lem.lemmatize("arrived", "VBN"), "arrive");
        assert_eq!(lem.lemmatize("watches", "VBZ"), "watch");
        assert_eq!(lem.lemmatize("parties", "NNS"), "party");
        assert_eq!(lem.lemmatize("glasses", "NNS"), "glass");
        assert_eq!(lem.lemmatize("keys", "NNS"), "key");
        assert_eq!(lem.lemmatize("bigger", "JJR"), "big");
        assert_eq!(lem.lemmatize("happiest", "JJS"), "happy");
        assert_eq!(lem.lemmatize("larger", "JJR"), "large");
    }

    #[test]
    fn test_class_disambiguates_exceptions() {
        let lem = Lemmatizer::bundled();
        assert_eq!(lem.lemmatize("better", "JJR"), "good");
        assert_eq!(lem.lemmatize("better", "RBR"), "well");
        assert_eq!(lem.lemmatize("left", "VBD"), "leave");
        assert_eq!(lem.lemmatize("left", "JJ"), "left");
    }

    #[test]
    fn test_fallback_is_lowercase_surface() {
        let lem = Lemmatizer::bundled();
        assert_eq!(lem.lemmatize("I", "PRP"), "i");
        assert_eq!(lem.lemmatize("The", "DT"), "the");
        assert_eq!(lem.lemmatize(".", "."), ".");
        assert_eq!(lem.lemmatize("London", "NNP"), "london");
        assert_eq!(lem.lemmatize("come", "VB"), "come");
    }

    #[test]
    fn test_clitics_are_kept() {
        let lem = Lemmatizer::bundled();
        assert_eq!(lem.lemmatize("'m", "VBP"), "'m");
        assert_eq!(lem.lemmatize("'s", "VBZ"), "'s");
        assert_eq!(lem.lemmatize("n't", "RB"), "n't");
    }

    #[test]
    fn test_unknown_word_uses_first_candidate() {
        let lem = Lemmatizer::empty();
        assert_eq!(lem.lemmatize("blorping", "VBG"), "blorp");
        assert_eq!(lem.lemmatize("zorks", "NNS"), "zork");
        // candidato com menos de dois caracteres é descartado
        assert_eq!(lem.lemmatize("is", "VBZ"), "is");
    }

    #[test]
    fn test_serialized_tables_round_trip() {
        let lem = Lemmatizer::bundled();
        let json = serde_json::to_string(&lem).unwrap();
        assert!(json.contains("\"verb\""));
        let restored: Lemmatizer = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, lem);
        assert!(restored.validate().is_ok());
        assert!(restored.exception_count() > 100);
    }
}
