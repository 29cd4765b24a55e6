//! # depparse-core: Análise Sintática de Dependências para Inglês
//!
//! Este crate implementa um pipeline completo que recebe uma sentença em inglês
//! e devolve, para cada token, sua classe gramatical, o índice do seu núcleo
//! sintático e o rótulo da relação de dependência (opcionalmente, o lema).
//!
//! ## Arquitetura do Sistema
//!
//! O dado flui em estágios, cada um num módulo próprio:
//!
//! 1.  **Entrada**: texto bruto, texto já separado por espaços ou `palavra/TAG`.
//! 2.  **Tokenização** ([`tokenizer`]): divide o texto em tokens com offsets originais.
//! 3.  **Etiquetagem** ([`tagger`]): perceptron médio guloso com dicionário de tags.
//! 4.  **Análise** ([`depparser`]): parser de transições arc-eager ([`transition`])
//!     pontuado por um perceptron médio ([`perceptron`], [`features`]).
//! 5.  **Lematização** ([`lemmatizer`]): exceções irregulares + regras de sufixo.
//! 6.  **Saída**: [`ParsedSentence`], formatada como linhas tab-separadas
//!     `palavra TAG núcleo RÓTULO [lema]`, com `-1` marcando a raiz.
//!
//! ## Exemplo de Uso
//!
//! ```rust,no_run
//! use depparse_core::DepParsePipeline;
//!
//! // 1. Instancia o pipeline (deriva o modelo embutido na primeira chamada)
//! let pipeline = DepParsePipeline::new().unwrap();
//!
//! // 2. Analisa uma sentença bruta, com lemas
//! let rows = pipeline.parse_sentence("I'm going to the market.", true, true).unwrap();
//!
//! // 3. Uma linha por token
//! for row in rows.lines() {
//!     println!("{row}");
//! }
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: orquestrador que conecta todos os estágios.
//! - [`batch`]: processamento de arquivos inteiros, em paralelo.
//! - [`model`]: carga, gravação e derivação dos pesos.
//! - [`corpus`]: sentenças anotadas usadas para derivar o modelo embutido.
//! - [`config`]: opções de análise, de lote e origem do modelo.

pub mod batch;
pub mod config;
pub mod corpus;
pub mod depparser;
pub mod error;
pub mod features;
pub mod lemmatizer;
pub mod model;
pub mod perceptron;
pub mod pipeline;
pub mod tagger;
pub mod tokenizer;
pub mod transition;
pub mod tree;

pub use batch::BatchReport;
pub use config::{BatchOptions, MalformedPolicy, ModelSource, ParseOptions};
pub use error::{Error, Result};
pub use model::ParserModel;
pub use pipeline::{DepParsePipeline, InputFormat, PipelineEvent};
pub use tokenizer::Token;
pub use transition::{DepLabel, Transition};
pub use tree::{DependencyTree, ParsedSentence, ParsedToken};
