//! # Árvores de Dependência e Formato de Saída
//!
//! Cada sentença analisada vira uma linha por token:
//!
//! ```text
//! palavra<TAB>tag<TAB>cabeça<TAB>rótulo[<TAB>lema]
//! ```
//!
//! A cabeça é o índice (base 0) do token governante na sentença; a raiz usa `-1`.
//! Ex: em "I 'm going", `I` depende de `'m` (índice 1) e `'m` é a raiz.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::transition::DepLabel;

/// Um arco `dependente → cabeça` com rótulo. `head == None` marca a raiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyArc {
    pub dependent: usize,
    pub head: Option<usize>,
    pub label: DepLabel,
}

/// Conjunto de arcos de uma sentença, um por token, na ordem dos tokens.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DependencyTree {
    pub arcs: Vec<DependencyArc>,
}

impl DependencyTree {
    pub fn from_heads(heads: &[(Option<usize>, DepLabel)]) -> Self {
        let arcs = heads
            .iter()
            .enumerate()
            .map(|(dependent, &(head, label))| DependencyArc {
                dependent,
                head,
                label,
            })
            .collect();
        Self { arcs }
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    pub fn root(&self) -> Option<usize> {
        self.arcs
            .iter()
            .find(|a| a.head.is_none())
            .map(|a| a.dependent)
    }

    /// Cabeças no formato de saída (`-1` para a raiz).
    pub fn encoded_heads(&self) -> Vec<i64> {
        self.arcs
            .iter()
            .map(|a| a.head.map_or(-1, |h| h as i64))
            .collect()
    }

    /// Verifica as propriedades de árvore:
    /// - exatamente uma raiz, rotulada `ROOT`;
    /// - toda cabeça é um índice válido e diferente do próprio token;
    /// - nenhum token é ancestral de si mesmo.
    pub fn is_well_formed(&self) -> bool {
        if self.arcs.is_empty() {
            return true;
        }
        let n = self.arcs.len();
        let roots = self.arcs.iter().filter(|a| a.head.is_none()).count();
        if roots != 1 {
            return false;
        }
        for (i, arc) in self.arcs.iter().enumerate() {
            if arc.dependent != i {
                return false;
            }
            match arc.head {
                None if arc.label != DepLabel::Root => return false,
                Some(h) if h >= n || h == i || arc.label == DepLabel::Root => return false,
                _ => {}
            }
        }
        // Sobe pela cadeia de cabeças; mais de n passos implica ciclo
        (0..n).all(|start| {
            let mut current = start;
            for _ in 0..=n {
                match self.arcs[current].head {
                    None => return true,
                    Some(h) => current = h,
                }
            }
            false
        })
    }

    /// Projetividade: todo token entre uma cabeça e seu dependente é dominado pela cabeça.
    pub fn is_projective(&self) -> bool {
        let dominates = |head: usize, mut node: usize| -> bool {
            for _ in 0..=self.arcs.len() {
                if node == head {
                    return true;
                }
                match self.arcs[node].head {
                    Some(h) => node = h,
                    None => return false,
                }
            }
            false
        };
        self.arcs.iter().all(|arc| match arc.head {
            None => true,
            Some(h) => {
                let (lo, hi) = (h.min(arc.dependent), h.max(arc.dependent));
                ((lo + 1)..hi).all(|k| dominates(h, k))
            }
        })
    }
}

/// Um token analisado: forma, tag, cabeça, rótulo e (opcionalmente) lema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedToken {
    pub word: String,
    pub tag: String,
    /// Índice da cabeça (base 0) ou `-1` para a raiz.
    pub head: i64,
    pub label: DepLabel,
    pub lemma: Option<String>,
}

impl ParsedToken {
    /// Linha tab-separada, sem quebra de linha.
    pub fn to_row(&self) -> String {
        let mut row = format!("{}\t{}\t{}\t{}", self.word, self.tag, self.head, self.label);
        if let Some(lemma) = &self.lemma {
            row.push('\t');
            row.push_str(lemma);
        }
        row
    }
}

/// Resultado estruturado de uma sentença.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedSentence {
    pub tokens: Vec<ParsedToken>,
}

impl ParsedSentence {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tree(&self) -> DependencyTree {
        let arcs = self
            .tokens
            .iter()
            .enumerate()
            .map(|(i, t)| DependencyArc {
                dependent: i,
                head: usize::try_from(t.head).ok(),
                label: t.label,
            })
            .collect();
        DependencyTree { arcs }
    }

    /// Todas as linhas, cada uma terminada por `\n`.
    pub fn to_rows(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ParsedSentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            writeln!(f, "{}", token.to_row())?;
        }
        Ok(())
    }
}
