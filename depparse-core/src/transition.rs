//! # Sistema de Transições Arc-Eager
//!
//! O parser constrói a árvore com uma sequência de ações sobre uma configuração
//! `(pilha, buffer, arcos)`:
//!
//! | Transição        | Efeito                                                   |
//! |------------------|----------------------------------------------------------|
//! | `Shift`          | move o início do buffer para a pilha                     |
//! | `LeftArc(l)`     | topo da pilha vira dependente do início do buffer; pop   |
//! | `RightArc(l)`    | início do buffer vira dependente do topo; push           |
//! | `Reduce`         | remove o topo da pilha (que já tem cabeça)               |
//!
//! Não há token raiz artificial: o token que sobra sozinho na pilha ao final é
//! a raiz (`ROOT`, cabeça `-1`). As regras de legalidade garantem que sempre
//! sobra exatamente um token sem cabeça, então toda sequência de transições
//! legais termina numa árvore válida.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Rótulos de dependência (esquema Penn2Malt).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DepLabel {
    /// Raiz da sentença. Nunca é atribuído por uma transição.
    Root,
    /// Modificador de adjetivo ou advérbio.
    Amod,
    /// Dependência não classificada.
    Dep,
    /// Modificador de substantivo (determinantes, adjetivos, PPs nominais).
    Nmod,
    /// Objeto.
    Obj,
    /// Pontuação.
    P,
    /// Complemento de preposição.
    Pmod,
    /// Predicativo.
    Prd,
    /// Oração subordinada (dependente do complementizador).
    Sbar,
    /// Sujeito.
    Sub,
    /// Cadeia verbal (verbo principal sob o auxiliar).
    Vc,
    /// Outros modificadores verbais.
    Vmod,
}

impl DepLabel {
    pub const COUNT: usize = 12;

    pub const ALL: [DepLabel; 12] = [
        DepLabel::Root,
        DepLabel::Amod,
        DepLabel::Dep,
        DepLabel::Nmod,
        DepLabel::Obj,
        DepLabel::P,
        DepLabel::Pmod,
        DepLabel::Prd,
        DepLabel::Sbar,
        DepLabel::Sub,
        DepLabel::Vc,
        DepLabel::Vmod,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DepLabel::Root => "ROOT",
            DepLabel::Amod => "AMOD",
            DepLabel::Dep => "DEP",
            DepLabel::Nmod => "NMOD",
            DepLabel::Obj => "OBJ",
            DepLabel::P => "P",
            DepLabel::Pmod => "PMOD",
            DepLabel::Prd => "PRD",
            DepLabel::Sbar => "SBAR",
            DepLabel::Sub => "SUB",
            DepLabel::Vc => "VC",
            DepLabel::Vmod => "VMOD",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        DepLabel::ALL.into_iter().find(|l| l.name() == s)
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for DepLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Uma ação do parser. A ordem dos índices é também a prioridade de desempate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transition {
    Shift,
    LeftArc(DepLabel),
    RightArc(DepLabel),
    Reduce,
}

impl Transition {
    /// Shift + LeftArc×12 + RightArc×12 + Reduce.
    pub const COUNT: usize = 2 + 2 * DepLabel::COUNT;

    pub fn index(&self) -> usize {
        match self {
            Transition::Shift => 0,
            Transition::LeftArc(l) => 1 + l.index(),
            Transition::RightArc(l) => 1 + DepLabel::COUNT + l.index(),
            Transition::Reduce => Self::COUNT - 1,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Transition::Shift),
            i if i <= DepLabel::COUNT => Some(Transition::LeftArc(DepLabel::ALL[i - 1])),
            i if i < Self::COUNT - 1 => {
                Some(Transition::RightArc(DepLabel::ALL[i - 1 - DepLabel::COUNT]))
            }
            i if i == Self::COUNT - 1 => Some(Transition::Reduce),
            _ => None,
        }
    }

    /// Todas as transições, em ordem de prioridade.
    pub fn all() -> impl Iterator<Item = Transition> {
        (0..Self::COUNT).filter_map(Transition::from_index)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Shift => f.write_str("SHIFT"),
            Transition::LeftArc(l) => write!(f, "LEFT-ARC({l})"),
            Transition::RightArc(l) => write!(f, "RIGHT-ARC({l})"),
            Transition::Reduce => f.write_str("REDUCE"),
        }
    }
}

/// Configuração do parser para uma sentença.
///
/// Criada por sentença e descartada ao final: nada é compartilhado entre parses.
#[derive(Debug, Clone, PartialEq)]
pub struct ParserState {
    stack: Vec<usize>,
    /// Início do buffer; o buffer é `next..len`.
    next: usize,
    len: usize,
    heads: Vec<Option<usize>>,
    labels: Vec<Option<DepLabel>>,
    steps: usize,
}

impl ParserState {
    pub fn new(len: usize) -> Self {
        Self {
            stack: Vec::with_capacity(len),
            next: 0,
            len,
            heads: vec![None; len],
            labels: vec![None; len],
            steps: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn stack(&self) -> &[usize] {
        &self.stack
    }

    pub fn stack_top(&self) -> Option<usize> {
        self.stack.last().copied()
    }

    /// Token na posição `offset` do buffer (0 = início).
    pub fn buffer_front(&self, offset: usize) -> Option<usize> {
        let i = self.next + offset;
        (i < self.len).then_some(i)
    }

    pub fn buffer_len(&self) -> usize {
        self.len - self.next
    }

    pub fn head(&self, i: usize) -> Option<usize> {
        self.heads.get(i).copied().flatten()
    }

    pub fn label(&self, i: usize) -> Option<DepLabel> {
        self.labels.get(i).copied().flatten()
    }

    /// Número de transições já aplicadas.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Quantos tokens na pilha ainda não têm cabeça.
    pub fn headless_on_stack(&self) -> usize {
        self.stack.iter().filter(|&&i| self.heads[i].is_none()).count()
    }

    pub fn leftmost_dependent(&self, i: usize) -> Option<usize> {
        (0..i).find(|&d| self.heads[d] == Some(i))
    }

    pub fn rightmost_dependent(&self, i: usize) -> Option<usize> {
        ((i + 1)..self.len).rev().find(|&d| self.heads[d] == Some(i))
    }

    pub fn left_valency(&self, i: usize) -> usize {
        (0..i).filter(|&d| self.heads[d] == Some(i)).count()
    }

    pub fn right_valency(&self, i: usize) -> usize {
        ((i + 1)..self.len).filter(|&d| self.heads[d] == Some(i)).count()
    }

    /// Buffer vazio e no máximo um token (a raiz) na pilha.
    pub fn is_terminal(&self) -> bool {
        self.buffer_len() == 0 && self.stack.len() <= 1
    }

    /// Verifica se a transição pode ser aplicada sem inviabilizar uma árvore com raiz única.
    pub fn is_legal(&self, t: Transition) -> bool {
        let top = self.stack_top();
        let buffer = self.buffer_len();
        match t {
            // O último token só entra por Shift se a pilha estiver vazia (ele será a raiz)
            Transition::Shift => buffer > 0 && (buffer > 1 || self.stack.is_empty()),
            Transition::LeftArc(label) => {
                label != DepLabel::Root
                    && buffer > 0
                    && top.is_some_and(|s| self.heads[s].is_none())
            }
            // Consumir o último token exige que reste um único candidato a raiz
            Transition::RightArc(label) => {
                label != DepLabel::Root
                    && buffer > 0
                    && top.is_some()
                    && (buffer > 1 || self.headless_on_stack() == 1)
            }
            Transition::Reduce => top.is_some_and(|s| self.heads[s].is_some()),
        }
    }

    pub fn legal_transitions(&self) -> Vec<Transition> {
        Transition::all().filter(|t| self.is_legal(*t)).collect()
    }

    /// Aplica uma transição legal.
    pub fn apply(&mut self, t: Transition) -> Result<()> {
        if !self.is_legal(t) {
            return Err(Error::InternalConsistency(format!(
                "transição {t} ilegal com pilha {:?} e buffer {}..{}",
                self.stack, self.next, self.len
            )));
        }
        match t {
            Transition::Shift => {
                self.stack.push(self.next);
                self.next += 1;
            }
            Transition::LeftArc(label) => {
                if let Some(s0) = self.stack.pop() {
                    self.heads[s0] = Some(self.next);
                    self.labels[s0] = Some(label);
                }
            }
            Transition::RightArc(label) => {
                if let Some(&s0) = self.stack.last() {
                    self.heads[self.next] = Some(s0);
                    self.labels[self.next] = Some(label);
                    self.stack.push(self.next);
                    self.next += 1;
                }
            }
            Transition::Reduce => {
                self.stack.pop();
            }
        }
        self.steps += 1;
        Ok(())
    }

    /// Extrai `(cabeça, rótulo)` de cada token de uma configuração terminal.
    /// O token restante na pilha recebe `None`/`ROOT`.
    pub fn finish(self) -> Result<Vec<(Option<usize>, DepLabel)>> {
        if !self.is_terminal() {
            return Err(Error::InternalConsistency(format!(
                "configuração não terminal: pilha {:?}, buffer {}",
                self.stack,
                self.buffer_len()
            )));
        }
        let root = self.stack_top();
        self.heads
            .iter()
            .zip(&self.labels)
            .enumerate()
            .map(|(i, (head, label))| match (head, label) {
                (Some(h), Some(l)) => Ok((Some(*h), *l)),
                (None, _) if Some(i) == root => Ok((None, DepLabel::Root)),
                _ => Err(Error::InternalConsistency(format!(
                    "token {i} terminou sem cabeça"
                ))),
            })
            .collect()
    }
}

/// Oráculo estático arc-eager: a transição que reproduz a árvore de referência.
///
/// `gold_heads[i] == None` marca a raiz. Retorna `None` quando nenhuma transição
/// legal leva à árvore (árvore não projetiva ou inconsistente).
pub fn static_oracle(
    state: &ParserState,
    gold_heads: &[Option<usize>],
    gold_labels: &[DepLabel],
) -> Option<Transition> {
    if let (Some(s0), Some(b0)) = (state.stack_top(), state.buffer_front(0)) {
        if gold_heads[s0] == Some(b0) {
            let t = Transition::LeftArc(gold_labels[s0]);
            return state.is_legal(t).then_some(t);
        }
        if gold_heads[b0] == Some(s0) {
            let t = Transition::RightArc(gold_labels[b0]);
            return state.is_legal(t).then_some(t);
        }
        let pending = state.stack()[..state.stack().len() - 1]
            .iter()
            .any(|&k| gold_heads[k] == Some(b0) || gold_heads[b0] == Some(k));
        if pending && state.is_legal(Transition::Reduce) {
            return Some(Transition::Reduce);
        }
    }
    if state.is_legal(Transition::Shift) {
        return Some(Transition::Shift);
    }
    if state.buffer_len() == 0 && state.is_legal(Transition::Reduce) {
        return Some(Transition::Reduce);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_index_roundtrip_and_priority() {
        let all: Vec<Transition> = Transition::all().collect();
        assert_eq!(all.len(), Transition::COUNT);
        assert_eq!(all[0], Transition::Shift);
        assert_eq!(all[Transition::COUNT - 1], Transition::Reduce);
        for (i, t) in all.iter().enumerate() {
            assert_eq!(t.index(), i);
        }
        assert_eq!(Transition::from_index(Transition::COUNT), None);
    }

    #[test]
    fn test_label_names() {
        for label in DepLabel::ALL {
            assert_eq!(DepLabel::from_name(label.name()), Some(label));
        }
        assert_eq!(DepLabel::from_name("NSUBJ"), None);
        assert_eq!(serde_json::to_string(&DepLabel::Vmod).unwrap(), "\"VMOD\"");
        assert_eq!(Transition::LeftArc(DepLabel::Sub).to_string(), "LEFT-ARC(SUB)");
    }

    #[test]
    fn test_initial_legality() {
        let state = ParserState::new(3);
        assert_eq!(state.legal_transitions(), vec![Transition::Shift]);
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_last_token_cannot_be_shifted_onto_nonempty_stack() {
        let mut state = ParserState::new(2);
        state.apply(Transition::Shift).unwrap();
        assert!(!state.is_legal(Transition::Shift));
        assert!(state.is_legal(Transition::RightArc(DepLabel::Obj)));
        assert!(state.is_legal(Transition::LeftArc(DepLabel::Sub)));
        assert!(!state.is_legal(Transition::Reduce));
        assert!(!state.is_legal(Transition::LeftArc(DepLabel::Root)));
    }

    #[test]
    fn test_right_arc_on_last_token_requires_single_root_candidate() {
        let mut state = ParserState::new(3);
        state.apply(Transition::Shift).unwrap();
        state.apply(Transition::Shift).unwrap();
        // dois tokens sem cabeça na pilha: o último token não pode ser consumido por RightArc
        assert!(!state.is_legal(Transition::RightArc(DepLabel::Obj)));
        assert!(state.apply(Transition::RightArc(DepLabel::Obj)).is_err());
        state.apply(Transition::LeftArc(DepLabel::Nmod)).unwrap();
        assert!(state.is_legal(Transition::RightArc(DepLabel::Obj)));
    }

    #[test]
    fn test_single_token_sentence() {
        let mut state = ParserState::new(1);
        state.apply(Transition::Shift).unwrap();
        assert!(state.is_terminal());
        assert_eq!(state.finish().unwrap(), vec![(None, DepLabel::Root)]);
    }

    #[test]
    fn test_empty_sentence_is_terminal() {
        let state = ParserState::new(0);
        assert!(state.is_terminal());
        assert!(state.finish().unwrap().is_empty());
    }

    #[test]
    fn test_oracle_reproduces_reference_tree() {
        // I 'm going to the market .
        let heads = [Some(1), None, Some(1), Some(2), Some(5), Some(3), Some(1)];
        let labels = [
            DepLabel::Sub,
            DepLabel::Root,
            DepLabel::Vc,
            DepLabel::Vmod,
            DepLabel::Nmod,
            DepLabel::Pmod,
            DepLabel::P,
        ];
        let mut state = ParserState::new(heads.len());
        let mut sequence = Vec::new();
        while !state.is_terminal() {
            let t = static_oracle(&state, &heads, &labels).expect("oráculo deve achar transição");
            sequence.push(t);
            state.apply(t).unwrap();
        }
        assert_eq!(sequence[0], Transition::Shift);
        assert_eq!(sequence[1], Transition::LeftArc(DepLabel::Sub));
        let result = state.finish().unwrap();
        for (i, (head, label)) in result.iter().enumerate() {
            assert_eq!(*head, heads[i]);
            assert_eq!(*label, labels[i]);
        }
    }

    #[test]
    fn test_oracle_rejects_non_projective_tree() {
        // raiz 1; o arco 2→0 cobre a raiz, que não é dominada por 2
        let heads = [Some(2), None, Some(1), Some(0)];
        let labels = [DepLabel::Dep; 4];
        let mut state = ParserState::new(4);
        let mut reached = true;
        while !state.is_terminal() {
            match static_oracle(&state, &heads, &labels) {
                Some(t) => state.apply(t).unwrap(),
                None => {
                    reached = false;
                    break;
                }
            }
        }
        let reproduced = reached
            && state
                .finish()
                .map(|r| r.iter().map(|(h, _)| *h).collect::<Vec<_>>() == heads)
                .unwrap_or(false);
        assert!(!reproduced);
    }
}
