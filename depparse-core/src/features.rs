//! # Engenharia de Features
//!
//! Tanto o tagger quanto o parser são classificadores lineares sobre features
//! binárias esparsas. Este módulo concentra os dois conjuntos de templates.
//!
//! ## Tagger (por token)
//! - Forma normalizada da palavra, prefixo de 1 e sufixo de 3 grafemas, "formato" (Xx, d, ...)
//! - Palavras e sufixos vizinhos (janela de 2 tokens)
//! - As duas tags previstas anteriormente (o tagger é guloso, da esquerda para a direita)
//!
//! ## Parser (por configuração)
//! Inspirado nos templates de Zhang & Nivre (2011) para arc-eager:
//! - Palavra/tag do topo da pilha (`s0`), do segundo item (`s1`) e dos três primeiros do buffer (`n0..n2`)
//! - Pares e triplas entre `s0` e `n0`
//! - Cabeça e dependentes mais à esquerda/direita já atribuídos
//! - Distância `s0`–`n0` e valência (número de dependentes)
//!
//! As features são mantidas em um `Vec` (e não num mapa) para que a soma dos
//! pesos ocorra sempre na mesma ordem: o resultado é bit-a-bit determinístico.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::transition::ParserState;

/// Marcador para posições inexistentes (antes do início, pilha vazia, etc.).
const NONE: &str = "<none>";

/// Conjunto ordenado de features binárias ativas para uma decisão.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureVector {
    /// Features ativas, na ordem de extração. Ex: `["bias", "i word=market"]`.
    pub features: Vec<String>,
    /// Índice do token (tagger) ou passo (parser) a que o vetor se refere.
    pub token_index: usize,
}

impl FeatureVector {
    pub fn new(token_index: usize) -> Self {
        Self {
            features: Vec::with_capacity(48),
            token_index,
        }
    }

    /// Adiciona uma feature ativa.
    pub fn insert(&mut self, key: impl Into<String>) {
        self.features.push(key.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.features.iter().any(|f| f == key)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Normaliza uma palavra para o tagger: números e hifenizados viram classes.
pub fn normalize_word(word: &str) -> String {
    if word.contains('-') && !word.starts_with('-') {
        "!HYPHEN".to_string()
    } else if word.len() == 4 && word.chars().all(|c| c.is_ascii_digit()) {
        "!YEAR".to_string()
    } else if word.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        "!DIGITS".to_string()
    } else {
        word.to_lowercase()
    }
}

/// "Formato" da palavra: maiúsculas → X, minúsculas → x, dígitos → d, resto mantido.
/// Sequências repetidas são colapsadas ("Market" → "Xx", "2010" → "d").
pub fn word_shape(word: &str) -> String {
    let mut shape = String::new();
    for c in word.chars() {
        let s = if c.is_uppercase() {
            'X'
        } else if c.is_lowercase() {
            'x'
        } else if c.is_ascii_digit() {
            'd'
        } else {
            c
        };
        if !shape.ends_with(s) {
            shape.push(s);
        }
    }
    shape
}

fn prefix(word: &str, n: usize) -> String {
    word.graphemes(true).take(n).collect()
}

fn suffix(word: &str, n: usize) -> String {
    let graphemes: Vec<&str> = word.graphemes(true).collect();
    graphemes[graphemes.len().saturating_sub(n)..].concat()
}

/// Palavra na posição `i + offset`, com marcadores além das bordas da sentença.
fn context(words: &[String], i: usize, offset: isize) -> &str {
    let j = i as isize + offset;
    if j < 0 {
        if j == -1 { "-START-" } else { "-START2-" }
    } else if j as usize >= words.len() {
        if j as usize == words.len() { "-END-" } else { "-END2-" }
    } else {
        &words[j as usize]
    }
}

/// Extrai as features do tagger para a posição `i`.
///
/// `words` são as formas normalizadas da sentença inteira; `raw` o texto original
/// do token atual; `prev` e `prev2` as tags já previstas para `i-1` e `i-2`.
pub fn tagger_features(
    words: &[String],
    raw: &str,
    i: usize,
    prev: &str,
    prev2: &str,
) -> FeatureVector {
    let ctx = |offset: isize| context(words, i, offset);

    let word = ctx(0);
    let mut fv = FeatureVector::new(i);
    fv.insert("bias");
    fv.insert(format!("i suffix={}", suffix(word, 3)));
    fv.insert(format!("i pref1={}", prefix(word, 1)));
    fv.insert(format!("i shape={}", word_shape(raw)));
    fv.insert(format!("i-1 tag={prev}"));
    fv.insert(format!("i-2 tag={prev2}"));
    fv.insert(format!("i tag+i-2 tag={prev} {prev2}"));
    fv.insert(format!("i word={word}"));
    fv.insert(format!("i-1 tag+i word={prev} {word}"));
    fv.insert(format!("i-1 word={}", ctx(-1)));
    fv.insert(format!("i-1 suffix={}", suffix(ctx(-1), 3)));
    fv.insert(format!("i-2 word={}", ctx(-2)));
    fv.insert(format!("i+1 word={}", ctx(1)));
    fv.insert(format!("i+1 suffix={}", suffix(ctx(1), 3)));
    fv.insert(format!("i+2 word={}", ctx(2)));
    fv.insert(format!("i-1 word+i word+i+1 word={} {word} {}", ctx(-1), ctx(1)));

    if i == 0 {
        fv.insert("is_first");
    }
    fv
}

/// Extrai as features do parser para a configuração atual.
pub fn parser_features(state: &ParserState, words: &[String], tags: &[String]) -> FeatureVector {
    let w = |i: Option<usize>| i.map_or(NONE.to_string(), |i| words[i].to_lowercase());
    let p = |i: Option<usize>| i.map_or(NONE, |i| tags[i].as_str());
    let l = |i: Option<usize>| {
        i.and_then(|i| state.label(i))
            .map_or(NONE, |label| label.name())
    };

    let stack = state.stack();
    let s0 = stack.last().copied();
    let s1 = stack.len().checked_sub(2).map(|k| stack[k]);
    let n0 = state.buffer_front(0);
    let n1 = state.buffer_front(1);
    let n2 = state.buffer_front(2);
    let s0h = s0.and_then(|s| state.head(s));
    let s0l = s0.and_then(|s| state.leftmost_dependent(s));
    let s0r = s0.and_then(|s| state.rightmost_dependent(s));
    let n0l = n0.and_then(|n| state.leftmost_dependent(n));

    let (s0w, s0p) = (w(s0), p(s0));
    let (n0w, n0p) = (w(n0), p(n0));
    let (n1w, n1p) = (w(n1), p(n1));
    let (s1w, s1p) = (w(s1), p(s1));

    let mut fv = FeatureVector::new(state.steps());
    fv.insert("bias");

    // Unigramas
    fv.insert(format!("s0w={s0w}"));
    fv.insert(format!("s0p={s0p}"));
    fv.insert(format!("s0wp={s0w}/{s0p}"));
    fv.insert(format!("n0w={n0w}"));
    fv.insert(format!("n0p={n0p}"));
    fv.insert(format!("n0wp={n0w}/{n0p}"));
    fv.insert(format!("n1w={n1w}"));
    fv.insert(format!("n1p={n1p}"));
    fv.insert(format!("n1wp={n1w}/{n1p}"));
    fv.insert(format!("n2p={}", p(n2)));
    fv.insert(format!("s1w={s1w}"));
    fv.insert(format!("s1p={s1p}"));

    // Pares s0–n0
    fv.insert(format!("s0wp_n0wp={s0w}/{s0p}_{n0w}/{n0p}"));
    fv.insert(format!("s0wp_n0w={s0w}/{s0p}_{n0w}"));
    fv.insert(format!("s0w_n0wp={s0w}_{n0w}/{n0p}"));
    fv.insert(format!("s0wp_n0p={s0w}/{s0p}_{n0p}"));
    fv.insert(format!("s0p_n0wp={s0p}_{n0w}/{n0p}"));
    fv.insert(format!("s0w_n0w={s0w}_{n0w}"));
    fv.insert(format!("s0p_n0p={s0p}_{n0p}"));
    fv.insert(format!("n0p_n1p={n0p}_{n1p}"));

    // Triplas
    fv.insert(format!("n0p_n1p_n2p={n0p}_{n1p}_{}", p(n2)));
    fv.insert(format!("s0p_n0p_n1p={s0p}_{n0p}_{n1p}"));
    fv.insert(format!("s0hp_s0p_n0p={}_{s0p}_{n0p}", p(s0h)));
    fv.insert(format!("s0p_s0lp_n0p={s0p}_{}_{n0p}", p(s0l)));
    fv.insert(format!("s0p_s0rp_n0p={s0p}_{}_{n0p}", p(s0r)));
    fv.insert(format!("s0p_n0p_n0lp={s0p}_{n0p}_{}", p(n0l)));
    fv.insert(format!("s1p_s0p_n0p={s1p}_{s0p}_{n0p}"));
    fv.insert(format!("s1w_s0w_n0w={s1w}_{s0w}_{n0w}"));
    fv.insert(format!("s0w_n0w_n1w={s0w}_{n0w}_{n1w}"));

    // Distância
    if let (Some(s), Some(n)) = (s0, n0) {
        let dist = match n - s {
            d @ 1..=4 => d.to_string(),
            _ => "5+".to_string(),
        };
        fv.insert(format!("s0w_d={s0w}_{dist}"));
        fv.insert(format!("s0p_d={s0p}_{dist}"));
        fv.insert(format!("n0w_d={n0w}_{dist}"));
        fv.insert(format!("n0p_d={n0p}_{dist}"));
        fv.insert(format!("s0p_n0p_d={s0p}_{n0p}_{dist}"));
    }

    // Valência
    if let Some(s) = s0 {
        let (vl, vr) = (state.left_valency(s), state.right_valency(s));
        fv.insert(format!("s0w_vr={s0w}_{vr}"));
        fv.insert(format!("s0p_vr={s0p}_{vr}"));
        fv.insert(format!("s0w_vl={s0w}_{vl}"));
        fv.insert(format!("s0p_vl={s0p}_{vl}"));
    }
    if let Some(n) = n0 {
        let vl = state.left_valency(n);
        fv.insert(format!("n0w_vl={n0w}_{vl}"));
        fv.insert(format!("n0p_vl={n0p}_{vl}"));
    }

    // Cabeça e rótulos já atribuídos
    fv.insert(format!("s0hw={}", w(s0h)));
    fv.insert(format!("s0hp={}", p(s0h)));
    fv.insert(format!("s0l={}", l(s0)));
    fv.insert(format!("s0ll={}", l(s0l)));
    fv.insert(format!("s0rl={}", l(s0r)));
    fv.insert(format!("n0ll={}", l(n0l)));
    fv.insert(format!("s0head={}", s0h.is_some()));

    // Restrições estruturais visíveis ao modelo
    if state.buffer_len() == 1 {
        fv.insert("n0last");
    }
    let roots = match state.headless_on_stack() {
        n @ 0..=2 => n.to_string(),
        _ => "3+".to_string(),
    };
    fv.insert(format!("stack_roots={roots}"));

    fv
}
