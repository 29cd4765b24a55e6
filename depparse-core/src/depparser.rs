//! # Parser de Dependências Shift-Reduce
//!
//! O núcleo do sistema. A partir de uma sentença etiquetada, o parser aplica
//! transições arc-eager ([`crate::transition`]) escolhidas por um
//! [`AveragedPerceptron`] com uma classe por transição.
//!
//! ## Decodificação gulosa
//!
//! A cada configuração:
//! 1. Extrai as features ([`parser_features`]) e pontua as 26 transições.
//! 2. Escolhe a de maior score. Empates ficam com a transição de menor índice
//!    (`Shift`, `LeftArc`, `RightArc`, `Reduce`).
//! 3. Se a escolhida for ilegal, registra um aviso e aplica a melhor legal.
//! 4. Se nenhuma for legal numa configuração não terminal, falha com
//!    `InternalConsistency`.
//!
//! Como as regras de legalidade sempre preservam exatamente um candidato a
//! raiz, o resultado é uma árvore válida por construção.
//!
//! ## Derivação dos pesos
//!
//! O [`DependencyParser::train`] percorre as sentenças de referência guiado pelo
//! oráculo estático e corrige o perceptron sempre que a transição prevista
//! difere da transição do oráculo.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::corpus::AnnotatedSentence;
use crate::error::{Error, Result};
use crate::features::parser_features;
use crate::perceptron::{AveragedPerceptron, Weights};
use crate::transition::{static_oracle, DepLabel, ParserState, Transition};
use crate::tree::DependencyTree;

/// Nome do arquivo do parser dentro do diretório de modelo.
pub const PARSER_FILE: &str = "depparser.json";

/// Uma transição aplicada durante o parse, para inspeção passo a passo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseStep {
    /// Número do passo (0, 1, 2...).
    pub step: usize,
    pub transition: Transition,
    /// A transição de maior score era ilegal e esta é a melhor legal.
    pub fallback: bool,
    /// Topo da pilha antes da transição.
    pub stack_top: Option<usize>,
    /// Início do buffer antes da transição.
    pub buffer_front: Option<usize>,
}

/// Sentença de referência para a derivação dos pesos.
#[derive(Debug, Clone)]
pub struct TrainingSentence {
    pub words: Vec<String>,
    pub tags: Vec<String>,
    pub heads: Vec<Option<usize>>,
    pub labels: Vec<DepLabel>,
}

impl TrainingSentence {
    pub fn from_annotated(sentence: &AnnotatedSentence) -> Option<Self> {
        let tree = sentence.gold_tree()?;
        Some(Self {
            words: sentence.words(),
            tags: sentence.tags(),
            heads: tree.arcs.iter().map(|a| a.head).collect(),
            labels: tree.arcs.iter().map(|a| a.label).collect(),
        })
    }

    /// Sequência de transições do oráculo, ou `None` se a árvore não for alcançável.
    pub fn oracle_sequence(&self) -> Option<Vec<Transition>> {
        let mut state = ParserState::new(self.words.len());
        let mut sequence = Vec::new();
        while !state.is_terminal() {
            let t = static_oracle(&state, &self.heads, &self.labels)?;
            state.apply(t).ok()?;
            sequence.push(t);
        }
        let result = state.finish().ok()?;
        let reached = result
            .iter()
            .zip(self.heads.iter().zip(&self.labels))
            .all(|((h, l), (gh, gl))| h == gh && l == gl);
        reached.then_some(sequence)
    }
}

/// O parser: um perceptron com [`Transition::COUNT`] classes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyParser {
    model: AveragedPerceptron,
}

impl Default for DependencyParser {
    fn default() -> Self {
        Self {
            model: AveragedPerceptron::new(0),
        }
    }
}

impl DependencyParser {
    /// Parser sem pesos. Qualquer parse falha com `ModelUnavailable`.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_trained(&self) -> bool {
        self.model.classes() == Transition::COUNT
    }

    pub fn feature_count(&self) -> usize {
        self.model.feature_count()
    }

    /// Analisa uma sentença etiquetada.
    pub fn parse(&self, words: &[String], tags: &[String]) -> Result<DependencyTree> {
        self.parse_traced(words, tags, |_| {})
    }

    /// Analisa uma sentença chamando `on_step` a cada transição aplicada.
    pub fn parse_traced<F>(&self, words: &[String], tags: &[String], mut on_step: F) -> Result<DependencyTree>
    where
        F: FnMut(&ParseStep),
    {
        if !self.is_trained() {
            return Err(Error::model_unavailable(PARSER_FILE, "parser sem pesos carregados"));
        }
        if words.len() != tags.len() {
            return Err(Error::InternalConsistency(format!(
                "{} palavras para {} tags",
                words.len(),
                tags.len()
            )));
        }

        let mut state = ParserState::new(words.len());
        while !state.is_terminal() {
            let (transition, fallback) = self.next_transition(&state, words, tags)?;
            let step = ParseStep {
                step: state.steps(),
                transition,
                fallback,
                stack_top: state.stack_top(),
                buffer_front: state.buffer_front(0),
            };
            state.apply(transition)?;
            on_step(&step);
        }
        Ok(DependencyTree::from_heads(&state.finish()?))
    }

    /// Melhor transição legal para a configuração, e se houve fallback.
    fn next_transition(&self, state: &ParserState, words: &[String], tags: &[String]) -> Result<(Transition, bool)> {
        let fv = parser_features(state, words, tags);
        let scores = self.model.scores(&fv);
        let predicted = AveragedPerceptron::best(&scores, |_| true).and_then(Transition::from_index);
        let legal = best_legal(state, &scores).ok_or_else(|| {
            Error::InternalConsistency(format!(
                "nenhuma transição legal com pilha {:?} e {} tokens no buffer",
                state.stack(),
                state.buffer_len()
            ))
        })?;

        let fallback = predicted != Some(legal);
        if fallback {
            warn!(
                predicted = ?predicted,
                applied = %legal,
                step = state.steps(),
                "transição prevista é ilegal; aplicando a melhor legal"
            );
        }
        Ok((legal, fallback))
    }

    /// Deriva os pesos a partir de sentenças de referência.
    ///
    /// Sentenças cuja árvore o oráculo não alcança (não projetivas) são
    /// descartadas com aviso. As épocas seguem a ordem de entrada e param na
    /// primeira época sem erros ou em `max_epochs`.
    pub fn train(sentences: &[TrainingSentence], max_epochs: usize) -> Result<Self> {
        let usable: Vec<&TrainingSentence> = sentences
            .iter()
            .filter(|s| {
                let ok = s.words.len() == s.tags.len() && s.oracle_sequence().is_some();
                if !ok {
                    warn!(sentence = %s.words.join(" "), "sentença não alcançável pelo oráculo; descartada");
                }
                ok
            })
            .collect();
        if usable.is_empty() {
            return Err(Error::model_unavailable(PARSER_FILE, "nenhuma sentença de treino utilizável"));
        }

        let mut parser = Self {
            model: AveragedPerceptron::new(Transition::COUNT),
        };

        for epoch in 1..=max_epochs {
            let mut mistakes = 0;
            let mut total = 0;
            for sentence in &usable {
                let mut state = ParserState::new(sentence.words.len());
                while !state.is_terminal() {
                    let gold = static_oracle(&state, &sentence.heads, &sentence.labels).ok_or_else(|| {
                        Error::InternalConsistency("oráculo sem transição em sentença alcançável".into())
                    })?;
                    let fv = parser_features(&state, &sentence.words, &sentence.tags);
                    let scores = parser.model.scores(&fv);
                    let guess = best_legal(&state, &scores).unwrap_or(gold);
                    parser.model.update(&fv, gold.index(), guess.index());
                    parser.model.tick();
                    total += 1;
                    if guess != gold {
                        mistakes += 1;
                    }
                    state.apply(gold)?;
                }
            }
            debug!(epoch, mistakes, total, "época do parser");
            if mistakes == 0 {
                break;
            }
        }

        let averaged = parser.model.averaged();
        let current = parser.model.current();
        let weights = parser.choose_weights(&usable, averaged, current);
        parser.model.finalize(weights);
        info!(
            sentences = usable.len(),
            features = parser.model.feature_count(),
            "parser derivado"
        );
        Ok(parser)
    }

    /// Fica com os pesos médios, a menos que os atuais reproduzam mais árvores.
    fn choose_weights(&self, sentences: &[&TrainingSentence], averaged: Weights, current: Weights) -> Weights {
        let score = |weights: &Weights| {
            let mut probe = self.clone();
            probe.model.finalize(weights.clone());
            sentences.iter().filter(|s| probe.reproduces(s)).count()
        };
        if score(&averaged) >= score(&current) {
            averaged
        } else {
            debug!("pesos médios reproduzem menos árvores; usando pesos atuais");
            current
        }
    }

    /// Parse silencioso comparado com a árvore de referência.
    fn reproduces(&self, sentence: &TrainingSentence) -> bool {
        let mut state = ParserState::new(sentence.words.len());
        while !state.is_terminal() {
            let fv = parser_features(&state, &sentence.words, &sentence.tags);
            let scores = self.model.scores(&fv);
            let applied = best_legal(&state, &scores).is_some_and(|t| state.apply(t).is_ok());
            if !applied {
                return false;
            }
        }
        state.finish().is_ok_and(|result| {
            result
                .iter()
                .zip(sentence.heads.iter().zip(&sentence.labels))
                .all(|((h, l), (gh, gl))| h == gh && l == gl)
        })
    }

    /// Verifica a coerência de um parser desserializado.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.model.classes() != Transition::COUNT {
            return Err(format!(
                "perceptron com {} classes, esperado {}",
                self.model.classes(),
                Transition::COUNT
            ));
        }
        self.model.validate()
    }
}

/// Transição legal de maior score (empate: menor índice).
fn best_legal(state: &ParserState, scores: &[f64]) -> Option<Transition> {
    AveragedPerceptron::best(scores, |c| {
        Transition::from_index(c).is_some_and(|t| state.is_legal(t))
    })
    .and_then(Transition::from_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::get_corpus;
    use crate::features::FeatureVector;
    use DepLabel::*;

    fn training_set() -> Vec<TrainingSentence> {
        get_corpus()
            .iter()
            .filter_map(TrainingSentence::from_annotated)
            .collect()
    }

    fn strings(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_untrained_parser_is_unavailable() {
        let err = DependencyParser::empty()
            .parse(&strings("I go"), &strings("PRP VBP"))
            .unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable { .. }));
    }

    #[test]
    fn test_illegal_prediction_falls_back_to_best_legal() {
        // Só o viés: Reduce sempre vence, mas é ilegal com a pilha vazia
        let mut fv = FeatureVector::new(0);
        fv.insert("bias");
        let mut model = AveragedPerceptron::new(Transition::COUNT);
        model.update(&fv, Transition::Reduce.index(), Transition::Shift.index());
        model.tick();
        let weights = model.current();
        model.finalize(weights);
        let parser = DependencyParser { model };

        let mut steps = Vec::new();
        let tree = parser
            .parse_traced(&strings("a b c"), &strings("DT NN VBZ"), |step| steps.push(step.clone()))
            .unwrap();

        assert!(steps[0].fallback);
        assert_eq!(steps[0].transition, Transition::Shift);
        assert_eq!(steps[0].stack_top, None);
        assert!(steps.iter().all(|s| s.fallback == (s.transition != Transition::Reduce)));
        assert_eq!(tree.len(), 3);
        assert!(tree.is_well_formed());
    }

    #[test]
    fn test_trained_parser_reproduces_reference_sentence() {
        let parser = DependencyParser::train(&training_set(), 200).unwrap();
        let tree = parser
            .parse(
                &strings("I 'm going to the market ."),
                &strings("PRP VBP VBG TO DT NN ."),
            )
            .unwrap();
        assert_eq!(tree.encoded_heads(), vec![1, -1, 1, 2, 5, 3, 1]);
        let labels: Vec<DepLabel> = tree.arcs.iter().map(|a| a.label).collect();
        assert_eq!(labels, vec![Sub, Root, Vc, Vmod, Nmod, Pmod, P]);
    }

    #[test]
    fn test_trained_parser_reproduces_whole_corpus() {
        let sentences = training_set();
        let parser = DependencyParser::train(&sentences, 200).unwrap();
        for sentence in &sentences {
            assert!(parser.reproduces(sentence), "divergiu em {:?}", sentence.words);
        }
    }

    #[test]
    fn test_unseen_sentences_still_produce_trees() {
        let parser = DependencyParser::train(&training_set(), 200).unwrap();
        let cases = [
            ("Dogs bark", "NNS VBP"),
            ("the the the the", "DT DT DT DT"),
            ("? ? ?", ". . ."),
            ("Hello", "UH"),
            ("My friend gave the old book to her sister yesterday .", "PRP$ NN VBD DT JJ NN TO PRP$ NN NN ."),
        ];
        for (words, tags) in cases {
            let tree = parser.parse(&strings(words), &strings(tags)).unwrap();
            assert_eq!(tree.len(), strings(words).len());
            assert!(tree.is_well_formed(), "{words}");
        }
    }

    #[test]
    fn test_empty_sentence_yields_empty_tree() {
        let parser = DependencyParser::train(&training_set(), 200).unwrap();
        assert!(parser.parse(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_parse_traced_reports_every_step() {
        let parser = DependencyParser::train(&training_set(), 200).unwrap();
        let mut steps = Vec::new();
        let tree = parser
            .parse_traced(&strings("He is a doctor ."), &strings("PRP VBZ DT NN ."), |s| {
                steps.push(s.clone())
            })
            .unwrap();
        assert!(tree.is_well_formed());
        assert_eq!(steps.first().map(|s| s.transition), Some(Transition::Shift));
        assert!(steps.iter().enumerate().all(|(i, s)| s.step == i));
        // cada token entra na pilha exatamente uma vez (Shift ou RightArc)
        let pushes = steps
            .iter()
            .filter(|s| matches!(s.transition, Transition::Shift | Transition::RightArc(_)))
            .count();
        assert_eq!(pushes, 5);
    }

    #[test]
    fn test_mismatched_lengths_are_rejected() {
        let parser = DependencyParser::train(&training_set(), 200).unwrap();
        let err = parser.parse(&strings("a b"), &strings("DT")).unwrap_err();
        assert!(matches!(err, Error::InternalConsistency(_)));
    }

    #[test]
    fn test_non_projective_training_sentence_is_skipped() {
        let mut sentences = training_set();
        sentences.push(TrainingSentence {
            words: strings("a b c d"),
            tags: strings("DT NN VBZ RB"),
            heads: vec![Some(2), None, Some(1), Some(0)],
            labels: vec![Dep, Root, Dep, Dep],
        });
        assert!(sentences.last().unwrap().oracle_sequence().is_none());
        assert!(DependencyParser::train(&sentences, 50).is_ok());
    }

    #[test]
    fn test_serialized_parser_validates() {
        let parser = DependencyParser::train(&training_set(), 200).unwrap();
        let json = serde_json::to_string(&parser).unwrap();
        let restored: DependencyParser = serde_json::from_str(&json).unwrap();
        assert!(restored.validate().is_ok());
        assert!(DependencyParser::empty().validate().is_err());
    }
}
