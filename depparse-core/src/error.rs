//! # Erros do Analisador
//!
//! Todos os estágios do pipeline retornam [`Result`] com o mesmo [`Error`].
//! As variantes seguem a gravidade de cada falha:
//!
//! | Variante              | Origem                                      | Interrompe lote? |
//! |-----------------------|---------------------------------------------|------------------|
//! | `ModelUnavailable`    | diretório/arquivo de modelo ausente ou inválido | sim          |
//! | `MalformedInput`      | sentença pré-anotada sem `/TAG`             | não (por política) |
//! | `InternalConsistency` | configuração não-terminal sem transição legal | sim            |
//! | `Io`                  | leitura/escrita dos arquivos do lote        | sim              |

use std::path::PathBuf;

use thiserror::Error;

/// Erro único do crate.
#[derive(Debug, Error)]
pub enum Error {
    /// O modelo não pôde ser carregado (ou ainda não possui pesos).
    #[error("modelo indisponível em {path}: {reason}")]
    ModelUnavailable { path: PathBuf, reason: String },

    /// A entrada não segue o formato esperado (ex: token sem `/TAG`).
    #[error("entrada malformada em {sentence:?}: {reason}")]
    MalformedInput { sentence: String, reason: String },

    /// O parser chegou a uma configuração sem saída. Indica bug de modelo ou implementação.
    #[error("inconsistência interna do parser: {0}")]
    InternalConsistency(String),

    /// Falha de E/S ao processar arquivos.
    #[error("falha de E/S em {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn model_unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::ModelUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(sentence: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedInput {
            sentence: sentence.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Indica se o erro deve abortar um processamento em lote.
    ///
    /// Apenas `MalformedInput` é isolado por sentença.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::MalformedInput { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
