//! # Etiquetador Morfossintático (POS Tagger)
//!
//! Tagger guloso da esquerda para a direita sobre o [`AveragedPerceptron`]:
//! cada token é classificado com base em suas features e nas duas tags já
//! previstas para os tokens anteriores.
//!
//! ## Dicionário de tags
//!
//! Palavras frequentes e não ambíguas (ex: "the" → DT, "." → .) são resolvidas
//! por consulta direta, sem passar pelo classificador. Isso reduz o número de
//! features e estabiliza o contexto de tags para os vizinhos.
//!
//! ## Formato pré-anotado
//!
//! [`parse_tagged_tokens`] lê a notação `palavra/TAG` usada pela entrada
//! pré-etiquetada do pipeline: `"I/PRP 'm/VBP going/VBG"`.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::features::{normalize_word, tagger_features};
use crate::perceptron::{AveragedPerceptron, Weights};

/// Nome do arquivo do tagger dentro do diretório de modelo.
pub const TAGGER_FILE: &str = "tagger.json";

const START: &str = "-START-";
const START2: &str = "-START2-";

/// Frequência mínima para uma palavra entrar no dicionário de tags.
const TAGDICT_MIN_FREQ: usize = 3;
/// Proporção mínima da tag majoritária.
const TAGDICT_MIN_RATIO: f64 = 0.97;

/// Um token com sua tag POS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub word: String,
    pub tag: String,
}

impl TaggedToken {
    pub fn new(word: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            tag: tag.into(),
        }
    }
}

/// Lê tokens no formato `palavra/TAG` separados por espaço.
///
/// A divisão usa a ÚLTIMA barra, então palavras como `1/2/CD` são aceitas.
pub fn parse_tagged_tokens(text: &str) -> Result<Vec<TaggedToken>> {
    text.split_whitespace()
        .map(|item| match item.rsplit_once('/') {
            Some((word, tag)) if !word.is_empty() && !tag.is_empty() => {
                Ok(TaggedToken::new(word, tag))
            }
            Some(_) => Err(Error::malformed(text, format!("token {item:?} com palavra ou tag vazia"))),
            None => Err(Error::malformed(text, format!("token {item:?} sem sufixo /TAG"))),
        })
        .collect()
}

/// O tagger: perceptron, inventário de tags e dicionário de palavras não ambíguas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosTagger {
    /// Tags na ordem das classes do perceptron.
    tags: Vec<String>,
    tagdict: BTreeMap<String, String>,
    model: AveragedPerceptron,
}

impl Default for PosTagger {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            tagdict: BTreeMap::new(),
            model: AveragedPerceptron::new(0),
        }
    }
}

impl PosTagger {
    /// Tagger sem pesos. Qualquer chamada a [`PosTagger::tag`] falha com `ModelUnavailable`.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_trained(&self) -> bool {
        !self.tags.is_empty()
    }

    /// Etiqueta uma sentença já tokenizada.
    pub fn tag(&self, words: &[String]) -> Result<Vec<String>> {
        if !self.is_trained() {
            return Err(Error::model_unavailable(TAGGER_FILE, "tagger sem pesos carregados"));
        }
        let normalized: Vec<String> = words.iter().map(|w| normalize_word(w)).collect();
        let mut tags = Vec::with_capacity(words.len());
        let mut prev = START.to_string();
        let mut prev2 = START2.to_string();

        for (i, word) in words.iter().enumerate() {
            let tag = match self.tagdict.get(word) {
                Some(tag) => tag.clone(),
                None => {
                    let fv = tagger_features(&normalized, word, i, &prev, &prev2);
                    let scores = self.model.scores(&fv);
                    let class = AveragedPerceptron::best(&scores, |_| true).ok_or_else(|| {
                        Error::model_unavailable(TAGGER_FILE, "perceptron sem classes")
                    })?;
                    self.tags[class].clone()
                }
            };
            prev2 = std::mem::replace(&mut prev, tag.clone());
            tags.push(tag);
        }
        Ok(tags)
    }

    /// Deriva o tagger de sentenças anotadas.
    ///
    /// Treina época a época (sempre na mesma ordem) até uma época sem erros ou
    /// até `max_epochs`. Ao final fica com os pesos médios, a menos que os pesos
    /// atuais reproduzam mais sentenças do conjunto de treino.
    pub fn train(sentences: &[Vec<TaggedToken>], max_epochs: usize) -> Result<Self> {
        let tags: Vec<String> = sentences
            .iter()
            .flatten()
            .map(|t| t.tag.clone())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        if tags.is_empty() {
            return Err(Error::model_unavailable(TAGGER_FILE, "nenhuma sentença de treino"));
        }
        let index: HashMap<&str, usize> = tags.iter().enumerate().map(|(i, t)| (t.as_str(), i)).collect();

        let mut tagger = Self {
            tagdict: build_tagdict(sentences),
            model: AveragedPerceptron::new(tags.len()),
            tags: tags.clone(),
        };

        for epoch in 1..=max_epochs {
            let mut mistakes = 0;
            let mut total = 0;
            for sentence in sentences {
                let words: Vec<String> = sentence.iter().map(|t| t.word.clone()).collect();
                let normalized: Vec<String> = words.iter().map(|w| normalize_word(w)).collect();
                let mut prev = START.to_string();
                let mut prev2 = START2.to_string();

                for (i, token) in sentence.iter().enumerate() {
                    let guess = match tagger.tagdict.get(&token.word) {
                        Some(tag) => tag.clone(),
                        None => {
                            let fv = tagger_features(&normalized, &token.word, i, &prev, &prev2);
                            let scores = tagger.model.scores(&fv);
                            let guess = AveragedPerceptron::best(&scores, |_| true).unwrap_or(0);
                            tagger.model.update(&fv, index[token.tag.as_str()], guess);
                            total += 1;
                            if tags[guess] != token.tag {
                                mistakes += 1;
                            }
                            tags[guess].clone()
                        }
                    };
                    tagger.model.tick();
                    prev2 = std::mem::replace(&mut prev, guess);
                }
            }
            debug!(epoch, mistakes, total, "época do tagger");
            if mistakes == 0 {
                break;
            }
        }

        let averaged = tagger.model.averaged();
        let current = tagger.model.current();
        let weights = tagger.choose_weights(sentences, averaged, current);
        tagger.model.finalize(weights);
        info!(
            tags = tagger.tags.len(),
            features = tagger.model.feature_count(),
            tagdict = tagger.tagdict.len(),
            "tagger derivado"
        );
        Ok(tagger)
    }

    /// Escolhe entre pesos médios e atuais pelo número de sentenças reproduzidas.
    fn choose_weights(&self, sentences: &[Vec<TaggedToken>], averaged: Weights, current: Weights) -> Weights {
        let score = |weights: &Weights| {
            let mut probe = self.clone();
            probe.model.finalize(weights.clone());
            sentences
                .iter()
                .filter(|sentence| {
                    let words: Vec<String> = sentence.iter().map(|t| t.word.clone()).collect();
                    probe
                        .tag(&words)
                        .map(|tags| tags.iter().zip(sentence.iter()).all(|(t, gold)| *t == gold.tag))
                        .unwrap_or(false)
                })
                .count()
        };
        if score(&averaged) >= score(&current) {
            averaged
        } else {
            debug!("pesos médios reproduzem menos sentenças; usando pesos atuais");
            current
        }
    }

    /// Verifica a coerência de um tagger desserializado.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.tags.is_empty() {
            return Err("tagger sem tags".to_string());
        }
        if self.tags.len() != self.model.classes() {
            return Err(format!(
                "{} tags para {} classes do perceptron",
                self.tags.len(),
                self.model.classes()
            ));
        }
        if let Some((word, tag)) = self.tagdict.iter().find(|(_, t)| !self.tags.contains(t)) {
            return Err(format!("tag desconhecida {tag:?} para {word:?} no dicionário"));
        }
        self.model.validate()
    }
}

/// Palavras com frequência e proporção de tag acima dos limiares.
fn build_tagdict(sentences: &[Vec<TaggedToken>]) -> BTreeMap<String, String> {
    let mut counts: HashMap<&str, HashMap<&str, usize>> = HashMap::new();
    for token in sentences.iter().flatten() {
        *counts
            .entry(token.word.as_str())
            .or_default()
            .entry(token.tag.as_str())
            .or_default() += 1;
    }
    counts
        .into_iter()
        .filter_map(|(word, tag_counts)| {
            let total: usize = tag_counts.values().sum();
            // Desempate pela tag em ordem alfabética para não depender da ordem do HashMap
            let (tag, count) = tag_counts
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))?;
            (total >= TAGDICT_MIN_FREQ && count as f64 / total as f64 >= TAGDICT_MIN_RATIO)
                .then(|| (word.to_string(), tag.to_string()))
        })
        .collect()
}
