//! # Configuração
//!
//! Opções por chamada ([`ParseOptions`]), opções de lote ([`BatchOptions`]) e a
//! origem do modelo ([`ModelSource`]). Todas são serializáveis com serde, para
//! que possam vir de arquivos JSON de configuração.
//!
//! A origem do modelo pode ser definida pela variável de ambiente
//! `DEPPARSE_MODEL_DIR`; sem ela, usa-se o modelo embutido.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Variável de ambiente com o diretório do modelo.
pub const MODEL_DIR_ENV: &str = "DEPPARSE_MODEL_DIR";

/// Opções de uma análise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Tokeniza o texto bruto. Se `false`, o texto já vem separado por espaços.
    pub tokenize: bool,
    /// Acrescenta a coluna de lema.
    pub with_lemmas: bool,
}

impl ParseOptions {
    pub fn new(tokenize: bool, with_lemmas: bool) -> Self {
        Self { tokenize, with_lemmas }
    }
}

/// O que fazer com uma linha malformada num lote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Registra um aviso, lista a linha no relatório e segue para a próxima.
    #[default]
    Skip,
    /// Aborta o lote na primeira linha malformada.
    FailFast,
}

/// Opções de processamento em lote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    pub parse: ParseOptions,
    pub on_malformed: MalformedPolicy,
    /// Analisa as sentenças em paralelo (rayon). A ordem de saída é sempre a de entrada.
    pub parallel: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
            on_malformed: MalformedPolicy::Skip,
            parallel: true,
        }
    }
}

impl BatchOptions {
    pub fn new(tokenize: bool, with_lemmas: bool) -> Self {
        Self {
            parse: ParseOptions::new(tokenize, with_lemmas),
            ..Self::default()
        }
    }

    pub fn fail_fast(mut self) -> Self {
        self.on_malformed = MalformedPolicy::FailFast;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// De onde carregar o modelo.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSource {
    /// Diretório com `tagger.json`, `depparser.json` e `lemmas.json`.
    Directory(PathBuf),
    /// Modelo derivado do corpus embutido.
    #[default]
    Bundled,
}

impl ModelSource {
    /// Lê `DEPPARSE_MODEL_DIR`; ausente ou vazia → [`ModelSource::Bundled`].
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(MODEL_DIR_ENV).ok())
    }

    fn from_env_value(value: Option<String>) -> Self {
        match value {
            Some(dir) if !dir.trim().is_empty() => ModelSource::Directory(PathBuf::from(dir)),
            _ => ModelSource::Bundled,
        }
    }
}
