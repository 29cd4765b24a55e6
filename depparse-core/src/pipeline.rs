//! # Pipeline de Análise: Orquestrador com Eventos Observáveis
//!
//! O pipeline coordena os módulos (tokenizador, tagger, lematizador e parser)
//! conforme o formato da entrada:
//!
//! | Formato         | Tokenizador | Tagger | Parser | Lematizador      |
//! |-----------------|-------------|--------|--------|------------------|
//! | `Raw`           | sim         | sim    | sim    | se `with_lemmas` |
//! | `Pretokenized`  | espaços     | sim    | sim    | se `with_lemmas` |
//! | `Tagged`        | espaços     | não    | sim    | se `with_lemmas` |
//!
//! Cada passo pode ser observado por um canal `mpsc` de [`PipelineEvent`]s.
//!
//! ## Exemplo de Uso
//!
//! ```rust,no_run
//! use depparse_core::DepParsePipeline;
//!
//! let pipeline = DepParsePipeline::new().unwrap();
//! let rows = pipeline.parse_sentence("I'm going to the market.", true, false).unwrap();
//! assert!(rows.starts_with("I\tPRP\t1\tSUB\n"));
//! ```

use std::path::Path;
use std::sync::{mpsc, Arc};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::batch::{self, BatchReport};
use crate::config::{BatchOptions, ModelSource, ParseOptions};
use crate::depparser::ParseStep;
use crate::error::{Error, Result};
use crate::model::ParserModel;
use crate::tagger::parse_tagged_tokens;
use crate::tokenizer::{split_pretokenized, tokenize, Token};
use crate::tree::{ParsedSentence, ParsedToken};

/// Formato do texto de entrada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// Texto bruto: passa pelo tokenizador.
    Raw,
    /// Tokens já separados por espaço.
    Pretokenized,
    /// Tokens `palavra/TAG` separados por espaço.
    Tagged,
}

impl InputFormat {
    pub fn from_tokenize_flag(tokenize: bool) -> Self {
        if tokenize {
            InputFormat::Raw
        } else {
            InputFormat::Pretokenized
        }
    }
}

/// Eventos emitidos pelo pipeline durante o processamento.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// **Passo 1**: Tokens prontos (do tokenizador ou da divisão por espaços).
    TokenizationDone { tokens: Vec<Token>, total: usize },
    /// **Passo 2**: Tag atribuída a um token. `source` é `"tagger"` ou `"input"`.
    TagAssigned {
        token_index: usize,
        token_text: String,
        tag: String,
        source: String,
    },
    /// **Passo 3**: Uma transição do parser foi aplicada.
    TransitionApplied {
        step: ParseStep,
        stack_word: Option<String>,
        buffer_word: Option<String>,
    },
    /// **Conclusão**: Sentença analisada.
    Done {
        sentence: ParsedSentence,
        total_tokens: usize,
        processing_ms: u64,
    },
    /// **Falha**: A sentença não pôde ser analisada.
    Error { message: String, fatal: bool },
}

/// O pipeline principal.
///
/// Guarda o modelo em um `Arc`: clonar o pipeline ou usá-lo por referência em
/// várias threads não copia pesos. Cada chamada cria seu próprio estado de
/// parser, então chamadas concorrentes são independentes.
#[derive(Debug, Clone)]
pub struct DepParsePipeline {
    model: Arc<ParserModel>,
}

impl DepParsePipeline {
    /// Cria o pipeline com o modelo embutido compartilhado.
    pub fn new() -> Result<Self> {
        Ok(Self::with_model(ParserModel::shared()?))
    }

    pub fn with_model(model: impl Into<Arc<ParserModel>>) -> Self {
        Self { model: model.into() }
    }

    /// Cria o pipeline a partir da origem configurada (ex: [`ModelSource::from_env`]).
    pub fn from_source(source: &ModelSource) -> Result<Self> {
        Ok(Self::with_model(ParserModel::from_source(source)?))
    }

    pub fn model(&self) -> &ParserModel {
        &self.model
    }

    /// Analisa uma sentença e retorna as linhas tab-separadas.
    ///
    /// Com `tokenize = false` o texto já deve estar separado por espaços.
    pub fn parse_sentence(&self, text: &str, tokenize: bool, with_lemmas: bool) -> Result<String> {
        Ok(self.analyze(text, ParseOptions::new(tokenize, with_lemmas))?.to_rows())
    }

    /// Analisa uma sentença pré-etiquetada (`palavra/TAG`), sem tokenizador nem tagger.
    pub fn parse_tagged_sentence(&self, text: &str, with_lemmas: bool) -> Result<String> {
        Ok(self.analyze_tagged(text, with_lemmas)?.to_rows())
    }

    /// Versão estruturada de [`DepParsePipeline::parse_sentence`].
    pub fn analyze(&self, text: &str, opts: ParseOptions) -> Result<ParsedSentence> {
        self.run(text, InputFormat::from_tokenize_flag(opts.tokenize), opts.with_lemmas, None)
    }

    /// Versão estruturada de [`DepParsePipeline::parse_tagged_sentence`].
    pub fn analyze_tagged(&self, text: &str, with_lemmas: bool) -> Result<ParsedSentence> {
        self.run(text, InputFormat::Tagged, with_lemmas, None)
    }

    /// Analisa no formato indicado.
    pub fn analyze_format(&self, text: &str, format: InputFormat, with_lemmas: bool) -> Result<ParsedSentence> {
        self.run(text, format, with_lemmas, None)
    }

    /// Executa o pipeline enviando eventos de progresso pelo canal `tx`.
    ///
    /// # Fluxo de Eventos
    /// 1. `TokenizationDone`
    /// 2. `TagAssigned` (um por token)
    /// 3. `TransitionApplied` (um por transição)
    /// 4. `Done`, ou `Error` se a análise falhar
    pub fn analyze_streaming(&self, text: &str, format: InputFormat, with_lemmas: bool, tx: mpsc::Sender<PipelineEvent>) {
        if let Err(err) = self.run(text, format, with_lemmas, Some(&tx)) {
            let _ = tx.send(PipelineEvent::Error {
                message: err.to_string(),
                fatal: err.is_fatal(),
            });
        }
    }

    /// Analisa um arquivo (uma sentença por linha) e grava os blocos em `output`.
    pub fn parse_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        tokenize: bool,
        with_lemmas: bool,
    ) -> Result<BatchReport> {
        let opts = BatchOptions::new(tokenize, with_lemmas);
        self.parse_file_with(input, output, InputFormat::from_tokenize_flag(tokenize), &opts)
    }

    /// Como [`DepParsePipeline::parse_file`], com entrada pré-etiquetada.
    pub fn parse_tagged_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        with_lemmas: bool,
    ) -> Result<BatchReport> {
        let opts = BatchOptions::new(false, with_lemmas);
        self.parse_file_with(input, output, InputFormat::Tagged, &opts)
    }

    /// Lote com formato e opções explícitos.
    pub fn parse_file_with(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        format: InputFormat,
        opts: &BatchOptions,
    ) -> Result<BatchReport> {
        batch::run(self, input.as_ref(), output.as_ref(), format, opts)
    }

    fn run(
        &self,
        text: &str,
        format: InputFormat,
        with_lemmas: bool,
        tx: Option<&mpsc::Sender<PipelineEvent>>,
    ) -> Result<ParsedSentence> {
        let start = Instant::now();
        let emit = |event: PipelineEvent| {
            if let Some(tx) = tx {
                let _ = tx.send(event);
            }
        };

        // === Passo 1: Tokens ===
        let (tokens, given_tags) = match format {
            InputFormat::Raw => (tokenize(text), None),
            InputFormat::Pretokenized => (split_pretokenized(text), None),
            InputFormat::Tagged => {
                let tagged = parse_tagged_tokens(text)?;
                let mut tokens = split_pretokenized(text);
                for (token, tagged) in tokens.iter_mut().zip(&tagged) {
                    token.end = token.start + tagged.word.len();
                    token.text = tagged.word.clone();
                }
                let tags = tagged.into_iter().map(|t| t.tag).collect::<Vec<_>>();
                (tokens, Some(tags))
            }
        };
        if tx.is_some() {
            emit(PipelineEvent::TokenizationDone {
                tokens: tokens.clone(),
                total: tokens.len(),
            });
        }

        let words: Vec<String> = tokens.into_iter().map(|t| t.text).collect();

        // === Passo 2: Tags ===
        let (tags, source) = match given_tags {
            Some(tags) => (tags, "input"),
            None => (self.model.tagger().tag(&words)?, "tagger"),
        };
        if tx.is_some() {
            for (i, (word, tag)) in words.iter().zip(&tags).enumerate() {
                emit(PipelineEvent::TagAssigned {
                    token_index: i,
                    token_text: word.clone(),
                    tag: tag.clone(),
                    source: source.to_string(),
                });
            }
        }

        // === Passo 3: Parser ===
        let tree = self.model.parser().parse_traced(&words, &tags, |step| {
            if tx.is_some() {
                emit(PipelineEvent::TransitionApplied {
                    step: step.clone(),
                    stack_word: step.stack_top.map(|i| words[i].clone()),
                    buffer_word: step.buffer_front.map(|i| words[i].clone()),
                });
            }
        })?;
        if tree.len() != words.len() || !tree.is_well_formed() {
            return Err(Error::InternalConsistency(format!(
                "parser produziu árvore inválida para {} tokens",
                words.len()
            )));
        }

        // === Passo 4: Montagem das linhas (+ lemas) ===
        let lemmatizer = self.model.lemmatizer();
        let sentence = ParsedSentence {
            tokens: words
                .into_iter()
                .zip(tags)
                .zip(tree.encoded_heads())
                .zip(&tree.arcs)
                .map(|(((word, tag), head), arc)| {
                    let lemma = with_lemmas.then(|| lemmatizer.lemmatize(&word, &tag));
                    ParsedToken {
                        word,
                        tag,
                        head,
                        label: arc.label,
                        lemma,
                    }
                })
                .collect(),
        };

        let processing_ms = start.elapsed().as_millis() as u64;
        debug!(tokens = sentence.len(), ?format, processing_ms, "sentença analisada");
        emit(PipelineEvent::Done {
            total_tokens: sentence.len(),
            sentence: sentence.clone(),
            processing_ms,
        });
        Ok(sentence)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const VOCAB: &[&str] = &[
        "I", "you", "the", "a", "dog", "market", "is", "am", "going", "to", "with", "me", "quickly", "red",
        "went", "?", ".", ",", "Paris", "and", "not", "'s",
    ];

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn arbitrary_word_sequences_yield_single_rooted_trees(
            words in prop::collection::vec(prop::sample::select(VOCAB), 1..16)
        ) {
            let pipeline = DepParsePipeline::new().unwrap();
            let text = words.join(" ");
            let sentence = pipeline.analyze(&text, ParseOptions::new(false, true)).unwrap();
            prop_assert_eq!(sentence.len(), words.len());
            prop_assert_eq!(sentence.tokens.iter().filter(|t| t.head == -1).count(), 1);
            prop_assert!(sentence.tree().is_well_formed());
            prop_assert!(sentence.tokens.iter().all(|t| t.lemma.is_some()));

            let again = pipeline.analyze(&text, ParseOptions::new(false, true)).unwrap();
            prop_assert_eq!(sentence, again);
        }
    }
}
