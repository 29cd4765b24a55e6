//! # Tokenizador estilo Penn Treebank
//!
//! Divide o texto bruto em tokens (palavras, pontuações e clíticos), no mesmo
//! esquema usado pelo corpus de treino do tagger e do parser. Cada token
//! preserva sua posição original no texto (offsets em bytes).
//!
//! ## Regras
//!
//! - **Espaços**: separam os blocos iniciais ("chunks").
//! - **Pontuação inicial**: `( [ { " “ ‘ $ «` e aspas simples antes de maiúscula.
//! - **Pontuação final**: `) ] } " ” ’ , ; : ! ? % »`, reticências e o ponto final.
//!   Abreviações ("Mr.", "U.S.") mantêm o ponto; se terminam o texto, um `.`
//!   extra é emitido.
//! - **Clíticos**: `n't 'm 's 're 've 'd 'll` viram tokens próprios.
//! - **Contrações fixas**: "cannot" → "can not", "gonna" → "gon na", etc.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use depparse_core::tokenizer::tokenize;
//!
//! let tokens = tokenize("I'm going to the market.");
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, ["I", "'m", "going", "to", "the", "market", "."]);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Um token extraído do texto original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto do token (ex: "market", "'m", ".").
    pub text: String,
    /// Índice de byte inicial no texto original (inclusive).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
    /// Índice sequencial do token na sentença (0, 1, 2...).
    pub index: usize,
}

/// Abreviações comuns que mantêm o ponto final (comparação em minúsculas, sem o ponto).
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "gen", "gov", "sen", "rep",
    "capt", "col", "lt", "sgt", "inc", "corp", "ltd", "co", "bros", "vs", "etc", "e.g",
    "i.e", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov",
    "dec", "approx", "dept", "est", "fig", "vol",
];

/// Clíticos separados do fim da palavra ("I'm" → "I" + "'m").
const CLITICS: &[&str] = &["'s", "'m", "'d", "'re", "'ve", "'ll"];

/// Contrações com divisão fixa: (forma minúscula, posição de corte em bytes).
const FIXED_SPLITS: &[(&str, usize)] = &[
    ("cannot", 3),
    ("gonna", 3),
    ("wanna", 3),
    ("gotta", 3),
];

const LEADING_PUNCT: &[char] = &['(', '[', '{', '"', '“', '‘', '$', '«', '`'];
const TRAILING_PUNCT: &[char] = &[')', ']', '}', '"', '”', '’', '\'', ',', ';', ':', '!', '?', '%', '»'];

/// Blocos separados por espaço em branco, com offsets.
static CHUNK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").expect("regex de chunk válida"));

/// Siglas com pontos internos ("U.S", "e.g") ou iniciais ("J").
static INITIALISM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Za-z]\.)*[A-Za-z]$").expect("regex de sigla válida"));

/// Tokeniza um texto bruto.
pub fn tokenize(text: &str) -> Vec<Token> {
    let chunks: Vec<_> = CHUNK.find_iter(text).collect();
    let mut tokens = Vec::new();

    for (i, chunk) in chunks.iter().enumerate() {
        let is_last = i + 1 == chunks.len();
        split_chunk(chunk.as_str(), chunk.start(), is_last, &mut tokens);
    }

    reindex(&mut tokens);
    tokens
}

/// Divide texto já tokenizado: apenas espaços em branco separam tokens.
pub fn split_pretokenized(text: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = CHUNK
        .find_iter(text)
        .map(|m| Token {
            text: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
            index: 0,
        })
        .collect();
    reindex(&mut tokens);
    tokens
}

fn reindex(tokens: &mut [Token]) {
    for (i, token) in tokens.iter_mut().enumerate() {
        token.index = i;
    }
}

/// Processa um bloco: pontuação inicial, núcleo (com clíticos) e pontuação final.
fn split_chunk(chunk: &str, base: usize, is_last: bool, out: &mut Vec<Token>) {
    let mut lo = 0;
    let mut hi = chunk.len();

    // Pontuação inicial
    while lo < hi {
        let rest = &chunk[lo..hi];
        if rest.starts_with("``") && rest.len() > 2 {
            push(out, "``", base + lo, base + lo + 2);
            lo += 2;
            continue;
        }
        let Some(c) = rest.chars().next() else { break };
        let peel = if LEADING_PUNCT.contains(&c) {
            rest.len() > c.len_utf8()
        } else if c == '\'' {
            rest.chars().nth(1).is_some_and(char::is_uppercase)
        } else {
            false
        };
        if !peel {
            break;
        }
        push(out, &rest[..c.len_utf8()], base + lo, base + lo + c.len_utf8());
        lo += c.len_utf8();
    }

    // Pontuação final (coletada em ordem reversa)
    let mut trailing: Vec<Token> = Vec::new();
    let mut abbreviation_ends_text = false;
    while lo < hi {
        let rest = &chunk[lo..hi];
        if rest.len() >= 3 && rest.ends_with("...") {
            trailing.push(make(&rest[rest.len() - 3..], base + hi - 3, base + hi));
            hi -= 3;
            continue;
        }
        let Some(c) = rest.chars().next_back() else { break };
        if rest.len() == c.len_utf8() {
            break;
        }
        if c == '.' {
            let core = &rest[..rest.len() - 1];
            if is_abbreviation(core) {
                abbreviation_ends_text = is_last && trailing.is_empty();
                break;
            }
            trailing.push(make(".", base + hi - 1, base + hi));
            hi -= 1;
            continue;
        }
        if TRAILING_PUNCT.contains(&c) {
            let len = c.len_utf8();
            trailing.push(make(&rest[rest.len() - len..], base + hi - len, base + hi));
            hi -= len;
            continue;
        }
        break;
    }

    if lo < hi {
        split_core(&chunk[lo..hi], base + lo, out);
    }
    if abbreviation_ends_text {
        push(out, ".", base + hi - 1, base + hi);
    }
    out.extend(trailing.into_iter().rev());
}

/// Separa clíticos e contrações fixas do núcleo de uma palavra.
fn split_core(core: &str, base: usize, out: &mut Vec<Token>) {
    let lower = core.to_lowercase();

    if let Some(&(_, cut)) = FIXED_SPLITS.iter().find(|(form, _)| *form == lower) {
        if core.is_char_boundary(cut) {
            push(out, &core[..cut], base, base + cut);
            push(out, &core[cut..], base + cut, base + core.len());
            return;
        }
    }

    let cut = clitic_start("n't", core)
        .or_else(|| CLITICS.iter().find_map(|clitic| clitic_start(clitic, core)));
    if let Some(cut) = cut {
        push(out, &core[..cut], base, base + cut);
        push(out, &core[cut..], base + cut, base + core.len());
        return;
    }

    push(out, core, base, base + core.len());
}

/// Posição (em bytes) onde o clítico começa no fim de `core`, se houver.
///
/// O clítico é dado com apóstrofo reto; no texto aceita-se `'` ou `’` na mesma
/// posição, sem diferenciar maiúsculas. Exige um núcleo não vazio antes dele.
fn clitic_start(clitic: &str, core: &str) -> Option<usize> {
    let (head, tail) = clitic.split_once('\'')?;
    let tail_start = core.len().checked_sub(tail.len())?;
    if !core.is_char_boundary(tail_start) || !core[tail_start..].eq_ignore_ascii_case(tail) {
        return None;
    }
    let apostrophe = core[..tail_start].chars().next_back().filter(|c| matches!(*c, '\'' | '’'))?;
    let apostrophe_start = tail_start - apostrophe.len_utf8();
    let head_start = apostrophe_start.checked_sub(head.len())?;
    if !core.is_char_boundary(head_start) || !core[head_start..apostrophe_start].eq_ignore_ascii_case(head) {
        return None;
    }
    (head_start > 0).then_some(head_start)
}

/// Verifica se `core` (palavra sem o ponto final) é uma abreviação conhecida ou sigla.
fn is_abbreviation(core: &str) -> bool {
    let lower = core.to_lowercase();
    ABBREVIATIONS.contains(&lower.as_str())
        || (INITIALISM.is_match(core) && core.chars().next().is_some_and(char::is_uppercase))
        || (INITIALISM.is_match(core) && core.contains('.'))
}

fn make(text: &str, start: usize, end: usize) -> Token {
    Token {
        text: text.to_string(),
        start,
        end,
        index: 0,
    }
}

fn push(tokens: &mut Vec<Token>, text: &str, start: usize, end: usize) {
    tokens.push(make(text, start, end));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_contraction_and_final_period() {
        let tokens = tokenize("I'm going to the market.");
        assert_eq!(texts(&tokens), ["I", "'m", "going", "to", "the", "market", "."]);
        assert_eq!(tokens[1].start, 1);
        assert_eq!(tokens[1].end, 3);
        assert_eq!(tokens[6].index, 6);
    }

    #[test]
    fn test_question_mark() {
        let tokens = tokenize("Are you going to come with me?");
        assert_eq!(
            texts(&tokens),
            ["Are", "you", "going", "to", "come", "with", "me", "?"]
        );
    }

    #[test]
    fn test_negation_clitics() {
        assert_eq!(texts(&tokenize("I don't know")), ["I", "do", "n't", "know"]);
        assert_eq!(texts(&tokenize("You can't win")), ["You", "ca", "n't", "win"]);
        assert_eq!(texts(&tokenize("It won't rain")), ["It", "wo", "n't", "rain"]);
    }

    #[test]
    fn test_curly_and_straight_apostrophes() {
        assert_eq!(texts(&tokenize("I’m here")), ["I", "’m", "here"]);
        assert_eq!(texts(&tokenize("We don’t know")), ["We", "do", "n’t", "know"]);
        // apóstrofo tipográfico no meio, clítico com apóstrofo reto no fim
        let tokens = tokenize("rock’n'roll's");
        assert_eq!(texts(&tokens), ["rock’n'roll", "'s"]);
        assert_eq!(&"rock’n'roll's"[tokens[1].start..tokens[1].end], "'s");
        assert_eq!(texts(&tokenize("rock’n’roll’s")), ["rock’n’roll", "’s"]);
        assert_eq!(texts(&tokenize("'s n't")), ["'s", "n't"]);
    }

    #[test]
    fn test_fixed_splits() {
        assert_eq!(texts(&tokenize("I cannot go")), ["I", "can", "not", "go"]);
        assert_eq!(texts(&tokenize("gonna")), ["gon", "na"]);
    }

    #[test]
    fn test_abbreviations_keep_period() {
        let tokens = tokenize("Mr. Smith lives in the U.S.");
        assert_eq!(
            texts(&tokens),
            ["Mr.", "Smith", "lives", "in", "the", "U.S.", "."]
        );
    }

    #[test]
    fn test_brackets_and_quotes() {
        let tokens = tokenize("(\"Hello,\" she said.)");
        assert_eq!(
            texts(&tokens),
            ["(", "\"", "Hello", ",", "\"", "she", "said", ".", ")"]
        );
    }

    #[test]
    fn test_numbers_and_ellipsis() {
        assert_eq!(texts(&tokenize("It costs $3.50...")), ["It", "costs", "$", "3.50", "..."]);
        assert_eq!(texts(&tokenize("Up 5%!")), ["Up", "5", "%", "!"]);
        assert_eq!(texts(&tokenize("...")), ["..."]);
        assert_eq!(texts(&tokenize("Well ...")), ["Well", "..."]);
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n").is_empty());
    }

    #[test]
    fn test_pretokenized_only_splits_whitespace() {
        let tokens = split_pretokenized("I 'm going to the market .");
        assert_eq!(tokens.len(), 7);
        assert_eq!(tokens[1].text, "'m");
        assert_eq!(split_pretokenized("market.").len(), 1);
    }

    #[test]
    fn test_offsets_point_into_text() {
        let text = "  We're leaving (today).";
        for token in tokenize(text) {
            assert_eq!(&text[token.start..token.end], token.text);
        }
    }
}
