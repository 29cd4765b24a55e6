//! # Modelo Pré-treinado
//!
//! O modelo agrega os três recursos usados pelo pipeline:
//! - **Tagger** (`tagger.json`): perceptron de tags + dicionário de tags
//! - **Parser** (`depparser.json`): perceptron de transições
//! - **Lemas** (`lemmas.json`): exceções irregulares e léxico de formas base
//!
//! ## Origem dos pesos
//!
//! Um diretório de modelo é carregado com [`ParserModel::load`]. Sem diretório,
//! [`ParserModel::bundled`] deriva os pesos do corpus embutido na inicialização.
//! Em ambos os casos o modelo é imutável depois de construído e pode ser
//! compartilhado entre threads (`ParserModel: Send + Sync`).

use std::fs;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::config::ModelSource;
use crate::corpus::get_corpus;
use crate::depparser::{DependencyParser, TrainingSentence, PARSER_FILE};
use crate::error::{Error, Result};
use crate::lemmatizer::{Lemmatizer, LEMMAS_FILE};
use crate::tagger::{PosTagger, TaggedToken, TAGGER_FILE};

/// Limite de épocas do tagger sobre o corpus embutido.
const TAGGER_EPOCHS: usize = 100;
/// Limite de épocas do parser sobre o corpus embutido.
const PARSER_EPOCHS: usize = 200;

static SHARED: OnceCell<Arc<ParserModel>> = OnceCell::new();

/// O modelo completo: tagger, parser e lematizador.
#[derive(Debug, Clone)]
pub struct ParserModel {
    tagger: PosTagger,
    parser: DependencyParser,
    lemmatizer: Lemmatizer,
}

impl ParserModel {
    pub fn new(tagger: PosTagger, parser: DependencyParser, lemmatizer: Lemmatizer) -> Self {
        Self {
            tagger,
            parser,
            lemmatizer,
        }
    }

    /// Modelo sem pesos: o tagger e o parser respondem `ModelUnavailable`.
    pub fn empty() -> Self {
        Self::new(PosTagger::empty(), DependencyParser::empty(), Lemmatizer::empty())
    }

    /// Deriva o modelo do corpus embutido.
    pub fn bundled() -> Result<Self> {
        let corpus = get_corpus();
        let tagged: Vec<Vec<TaggedToken>> = corpus
            .iter()
            .map(|s| s.annotations.iter().map(|(w, t, ..)| TaggedToken::new(*w, *t)).collect())
            .collect();
        let trees: Vec<TrainingSentence> = corpus.iter().filter_map(TrainingSentence::from_annotated).collect();

        let tagger = PosTagger::train(&tagged, TAGGER_EPOCHS)?;
        let parser = DependencyParser::train(&trees, PARSER_EPOCHS)?;
        info!(sentences = corpus.len(), "modelo embutido pronto");
        Ok(Self::new(tagger, parser, Lemmatizer::bundled()))
    }

    /// Instância única do modelo embutido para o processo inteiro.
    ///
    /// A derivação roda uma única vez; chamadas seguintes só clonam o `Arc`.
    pub fn shared() -> Result<Arc<ParserModel>> {
        SHARED
            .get_or_try_init(|| Self::bundled().map(Arc::new))
            .map(Arc::clone)
    }

    /// Carrega o modelo da origem configurada. `Bundled` reutiliza [`ParserModel::shared`].
    pub fn from_source(source: &ModelSource) -> Result<Arc<Self>> {
        match source {
            ModelSource::Directory(dir) => Self::load(dir).map(Arc::new),
            ModelSource::Bundled => Self::shared(),
        }
    }

    /// Carrega os três arquivos de um diretório de modelo.
    ///
    /// Falha com `ModelUnavailable` (nomeando o arquivo) se o diretório não
    /// existir, se algum arquivo faltar, não for JSON válido ou for incoerente.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::model_unavailable(dir, "diretório de modelo não encontrado"));
        }
        let tagger: PosTagger = read_json(dir, TAGGER_FILE)?;
        check(dir, TAGGER_FILE, tagger.validate())?;
        let parser: DependencyParser = read_json(dir, PARSER_FILE)?;
        check(dir, PARSER_FILE, parser.validate())?;
        let lemmatizer: Lemmatizer = read_json(dir, LEMMAS_FILE)?;
        check(dir, LEMMAS_FILE, lemmatizer.validate())?;

        info!(
            dir = %dir.display(),
            tags = tagger.tags().len(),
            parser_features = parser.feature_count(),
            "modelo carregado"
        );
        Ok(Self::new(tagger, parser, lemmatizer))
    }

    /// Grava o modelo em `dir` (criado se necessário).
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        write_json(dir, TAGGER_FILE, &self.tagger)?;
        write_json(dir, PARSER_FILE, &self.parser)?;
        write_json(dir, LEMMAS_FILE, &self.lemmatizer)?;
        info!(dir = %dir.display(), "modelo gravado");
        Ok(())
    }

    pub fn tagger(&self) -> &PosTagger {
        &self.tagger
    }

    pub fn parser(&self) -> &DependencyParser {
        &self.parser
    }

    pub fn lemmatizer(&self) -> &Lemmatizer {
        &self.lemmatizer
    }
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    let path = dir.join(file);
    let text = fs::read_to_string(&path).map_err(|e| Error::model_unavailable(&path, e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| Error::model_unavailable(&path, format!("JSON inválido: {e}")))
}

fn write_json<T: Serialize>(dir: &Path, file: &str, value: &T) -> Result<()> {
    let path = dir.join(file);
    let bytes = serde_json::to_vec(value).map_err(|e| Error::io(&path, e.into()))?;
    fs::write(&path, bytes).map_err(|e| Error::io(&path, e))
}

fn check(dir: &Path, file: &str, result: std::result::Result<(), String>) -> Result<()> {
    result.map_err(|reason| Error::model_unavailable(dir.join(file), reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_model_is_shareable() {
        assert_send_sync::<ParserModel>();
    }

    #[test]
    fn test_shared_returns_same_instance() {
        let a = ParserModel::shared().unwrap();
        let b = ParserModel::shared().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.tagger().is_trained());
        assert!(a.parser().is_trained());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let model = ParserModel::shared().unwrap();
        model.save(dir.path()).unwrap();
        for file in [TAGGER_FILE, PARSER_FILE, LEMMAS_FILE] {
            assert!(dir.path().join(file).is_file());
        }

        let loaded = ParserModel::load(dir.path()).unwrap();
        let words: Vec<String> = ["I", "am", "going", "to", "the", "market", "."]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let tags = loaded.tagger().tag(&words).unwrap();
        assert_eq!(tags, model.tagger().tag(&words).unwrap());
        assert_eq!(
            loaded.parser().parse(&words, &tags).unwrap(),
            model.parser().parse(&words, &tags).unwrap()
        );
        assert_eq!(loaded.lemmatizer(), model.lemmatizer());
    }

    #[test]
    fn test_missing_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nao-existe");
        let err = ParserModel::load(&missing).unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable { .. }));
    }

    #[test]
    fn test_missing_file_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        ParserModel::shared().unwrap().save(dir.path()).unwrap();
        fs::remove_file(dir.path().join(PARSER_FILE)).unwrap();
        match ParserModel::load(dir.path()).unwrap_err() {
            Error::ModelUnavailable { path, .. } => assert!(path.ends_with(PARSER_FILE)),
            other => panic!("erro inesperado: {other}"),
        }
    }

    #[test]
    fn test_corrupt_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        ParserModel::shared().unwrap().save(dir.path()).unwrap();
        fs::write(dir.path().join(TAGGER_FILE), "{ não é json").unwrap();
        assert!(matches!(
            ParserModel::load(dir.path()).unwrap_err(),
            Error::ModelUnavailable { .. }
        ));

        fs::write(dir.path().join(TAGGER_FILE), r#"{"tags":[],"tagdict":{},"model":{"classes":0,"weights":{}}}"#)
            .unwrap();
        assert!(matches!(
            ParserModel::load(dir.path()).unwrap_err(),
            Error::ModelUnavailable { .. }
        ));
    }

    #[test]
    fn test_from_source() {
        let bundled = ParserModel::from_source(&ModelSource::Bundled).unwrap();
        assert!(Arc::ptr_eq(&bundled, &ParserModel::shared().unwrap()));

        let dir = tempfile::tempdir().unwrap();
        bundled.save(dir.path()).unwrap();
        let loaded = ParserModel::from_source(&ModelSource::Directory(dir.path().to_path_buf())).unwrap();
        assert!(loaded.parser().is_trained());
    }

    #[test]
    fn test_empty_model_refuses_to_tag() {
        let model = ParserModel::empty();
        let err = model.tagger().tag(&["x".to_string()]).unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable { .. }));
    }
}
