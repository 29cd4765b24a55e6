//! # Corpus Anotado em Inglês (Dependências Penn2Malt)
//!
//! Pequeno treebank embutido de onde o modelo padrão é derivado. Cada token traz
//! palavra, tag Penn Treebank, índice da cabeça (base 0, `-1` para a raiz) e rótulo.
//!
//! ## Convenções de anotação
//! - O verbo finito é a raiz; auxiliares governam o verbo principal com `VC`.
//! - Em perguntas com inversão, o auxiliar é a raiz e o verbo principal é `VMOD`.
//! - Determinantes e adjetivos pré-nominais são `NMOD` do substantivo.
//! - Preposições dependem do verbo (`VMOD`) ou do substantivo (`NMOD`);
//!   o complemento da preposição é `PMOD`.
//! - A pontuação final depende da raiz com `P`.
//!
//! Todas as árvores são projetivas, condição para o oráculo arc-eager.

use crate::transition::DepLabel;
use crate::tree::DependencyTree;

/// Uma sentença anotada com dependências.
pub struct AnnotatedSentence {
    /// Texto bruto, antes da tokenização.
    pub text: &'static str,
    /// Quádruplas (palavra, tag, cabeça, rótulo).
    /// Exemplo: `[("I", "PRP", 1, "SUB"), ("'m", "VBP", -1, "ROOT")]`
    pub annotations: &'static [(&'static str, &'static str, i32, &'static str)],
}

impl AnnotatedSentence {
    pub fn words(&self) -> Vec<String> {
        self.annotations.iter().map(|(w, ..)| w.to_string()).collect()
    }

    pub fn tags(&self) -> Vec<String> {
        self.annotations.iter().map(|(_, t, ..)| t.to_string()).collect()
    }

    /// Árvore de referência, ou `None` se alguma cabeça ou rótulo for inválido.
    pub fn gold_tree(&self) -> Option<DependencyTree> {
        let n = self.annotations.len();
        let heads = self
            .annotations
            .iter()
            .map(|&(_, _, head, label)| {
                let label = DepLabel::from_name(label)?;
                let head = match head {
                    -1 => None,
                    h => Some(usize::try_from(h).ok().filter(|&h| h < n)?),
                };
                Some((head, label))
            })
            .collect::<Option<Vec<_>>>()?;
        Some(DependencyTree::from_heads(&heads))
    }

    /// Formato pré-anotado `palavra/TAG`.
    pub fn tagged_text(&self) -> String {
        self.annotations
            .iter()
            .map(|(w, t, ..)| format!("{w}/{t}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Retorna o corpus completo.
pub fn get_corpus() -> Vec<AnnotatedSentence> {
    vec![
        // ===== AUXILIARES E CADEIAS VERBAIS =====
        AnnotatedSentence {
            text: "I'm going to the market.",
            annotations: &[
                ("I", "PRP", 1, "SUB"), ("'m", "VBP", -1, "ROOT"), ("going", "VBG", 1, "VC"),
                ("to", "TO", 2, "VMOD"), ("the", "DT", 5, "NMOD"), ("market", "NN", 3, "PMOD"),
                (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "I am going to the market.",
            annotations: &[
                ("I", "PRP", 1, "SUB"), ("am", "VBP", -1, "ROOT"), ("going", "VBG", 1, "VC"),
                ("to", "TO", 2, "VMOD"), ("the", "DT", 5, "NMOD"), ("market", "NN", 3, "PMOD"),
                (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "We have finished our work.",
            annotations: &[
                ("We", "PRP", 1, "SUB"), ("have", "VBP", -1, "ROOT"), ("finished", "VBN", 1, "VC"),
                ("our", "PRP$", 4, "NMOD"), ("work", "NN", 2, "OBJ"), (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "They will visit their parents in London next week.",
            annotations: &[
                ("They", "PRP", 1, "SUB"), ("will", "MD", -1, "ROOT"), ("visit", "VB", 1, "VC"),
                ("their", "PRP$", 4, "NMOD"), ("parents", "NNS", 2, "OBJ"), ("in", "IN", 2, "VMOD"),
                ("London", "NNP", 5, "PMOD"), ("next", "JJ", 8, "NMOD"), ("week", "NN", 2, "VMOD"),
                (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "The children are playing in the park.",
            annotations: &[
                ("The", "DT", 1, "NMOD"), ("children", "NNS", 2, "SUB"), ("are", "VBP", -1, "ROOT"),
                ("playing", "VBG", 2, "VC"), ("in", "IN", 3, "VMOD"), ("the", "DT", 6, "NMOD"),
                ("park", "NN", 4, "PMOD"), (".", ".", 2, "P"),
            ],
        },
        AnnotatedSentence {
            text: "The company has opened two new stores.",
            annotations: &[
                ("The", "DT", 1, "NMOD"), ("company", "NN", 2, "SUB"), ("has", "VBZ", -1, "ROOT"),
                ("opened", "VBN", 2, "VC"), ("two", "CD", 6, "NMOD"), ("new", "JJ", 6, "NMOD"),
                ("stores", "NNS", 3, "OBJ"), (".", ".", 2, "P"),
            ],
        },
        AnnotatedSentence {
            text: "It is raining again.",
            annotations: &[
                ("It", "PRP", 1, "SUB"), ("is", "VBZ", -1, "ROOT"), ("raining", "VBG", 1, "VC"),
                ("again", "RB", 2, "VMOD"), (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "You should read this report carefully.",
            annotations: &[
                ("You", "PRP", 1, "SUB"), ("should", "MD", -1, "ROOT"), ("read", "VB", 1, "VC"),
                ("this", "DT", 4, "NMOD"), ("report", "NN", 2, "OBJ"), ("carefully", "RB", 2, "VMOD"),
                (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "I didn't see the movie.",
            annotations: &[
                ("I", "PRP", 1, "SUB"), ("did", "VBD", -1, "ROOT"), ("n't", "RB", 1, "VMOD"),
                ("see", "VB", 1, "VC"), ("the", "DT", 5, "NMOD"), ("movie", "NN", 3, "OBJ"),
                (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "He's reading a newspaper in the kitchen.",
            annotations: &[
                ("He", "PRP", 1, "SUB"), ("'s", "VBZ", -1, "ROOT"), ("reading", "VBG", 1, "VC"),
                ("a", "DT", 4, "NMOD"), ("newspaper", "NN", 2, "OBJ"), ("in", "IN", 2, "VMOD"),
                ("the", "DT", 7, "NMOD"), ("kitchen", "NN", 5, "PMOD"), (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "We're leaving for Paris tomorrow.",
            annotations: &[
                ("We", "PRP", 1, "SUB"), ("'re", "VBP", -1, "ROOT"), ("leaving", "VBG", 1, "VC"),
                ("for", "IN", 2, "VMOD"), ("Paris", "NNP", 3, "PMOD"), ("tomorrow", "NN", 2, "VMOD"),
                (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "She has been working here since 2010.",
            annotations: &[
                ("She", "PRP", 1, "SUB"), ("has", "VBZ", -1, "ROOT"), ("been", "VBN", 1, "VC"),
                ("working", "VBG", 2, "VC"), ("here", "RB", 3, "VMOD"), ("since", "IN", 3, "VMOD"),
                ("2010", "CD", 5, "PMOD"), (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "I was born in a small village near the sea.",
            annotations: &[
                ("I", "PRP", 1, "SUB"), ("was", "VBD", -1, "ROOT"), ("born", "VBN", 1, "VC"),
                ("in", "IN", 2, "VMOD"), ("a", "DT", 6, "NMOD"), ("small", "JJ", 6, "NMOD"),
                ("village", "NN", 3, "PMOD"), ("near", "IN", 6, "NMOD"), ("the", "DT", 9, "NMOD"),
                ("sea", "NN", 7, "PMOD"), (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "We are going to watch a film tonight.",
            annotations: &[
                ("We", "PRP", 1, "SUB"), ("are", "VBP", -1, "ROOT"), ("going", "VBG", 1, "VC"),
                ("to", "TO", 4, "VMOD"), ("watch", "VB", 2, "VMOD"), ("a", "DT", 6, "NMOD"),
                ("film", "NN", 4, "OBJ"), ("tonight", "NN", 4, "VMOD"), (".", ".", 1, "P"),
            ],
        },
        // ===== PERGUNTAS =====
        AnnotatedSentence {
            text: "Are you going to come with me?",
            annotations: &[
                ("Are", "VBP", -1, "ROOT"), ("you", "PRP", 0, "SUB"), ("going", "VBG", 0, "VMOD"),
                ("to", "TO", 4, "VMOD"), ("come", "VB", 2, "VMOD"), ("with", "IN", 4, "VMOD"),
                ("me", "PRP", 5, "PMOD"), ("?", ".", 0, "P"),
            ],
        },
        AnnotatedSentence {
            text: "Do you like coffee?",
            annotations: &[
                ("Do", "VBP", -1, "ROOT"), ("you", "PRP", 0, "SUB"), ("like", "VB", 0, "VMOD"),
                ("coffee", "NN", 2, "OBJ"), ("?", ".", 0, "P"),
            ],
        },
        AnnotatedSentence {
            text: "Where did you put the keys?",
            annotations: &[
                ("Where", "WRB", 1, "VMOD"), ("did", "VBD", -1, "ROOT"), ("you", "PRP", 1, "SUB"),
                ("put", "VB", 1, "VMOD"), ("the", "DT", 5, "NMOD"), ("keys", "NNS", 3, "OBJ"),
                ("?", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "Is she coming with us?",
            annotations: &[
                ("Is", "VBZ", -1, "ROOT"), ("she", "PRP", 0, "SUB"), ("coming", "VBG", 0, "VMOD"),
                ("with", "IN", 2, "VMOD"), ("us", "PRP", 3, "PMOD"), ("?", ".", 0, "P"),
            ],
        },
        AnnotatedSentence {
            text: "Can you help me with my homework?",
            annotations: &[
                ("Can", "MD", -1, "ROOT"), ("you", "PRP", 0, "SUB"), ("help", "VB", 0, "VMOD"),
                ("me", "PRP", 2, "OBJ"), ("with", "IN", 2, "VMOD"), ("my", "PRP$", 6, "NMOD"),
                ("homework", "NN", 4, "PMOD"), ("?", ".", 0, "P"),
            ],
        },
        AnnotatedSentence {
            text: "Why are you laughing?",
            annotations: &[
                ("Why", "WRB", 1, "VMOD"), ("are", "VBP", -1, "ROOT"), ("you", "PRP", 1, "SUB"),
                ("laughing", "VBG", 1, "VMOD"), ("?", ".", 1, "P"),
            ],
        },
        // ===== VERBOS SIMPLES =====
        AnnotatedSentence {
            text: "The cat sat on the mat.",
            annotations: &[
                ("The", "DT", 1, "NMOD"), ("cat", "NN", 2, "SUB"), ("sat", "VBD", -1, "ROOT"),
                ("on", "IN", 2, "VMOD"), ("the", "DT", 5, "NMOD"), ("mat", "NN", 3, "PMOD"),
                (".", ".", 2, "P"),
            ],
        },
        AnnotatedSentence {
            text: "She reads a good book every night.",
            annotations: &[
                ("She", "PRP", 1, "SUB"), ("reads", "VBZ", -1, "ROOT"), ("a", "DT", 4, "NMOD"),
                ("good", "JJ", 4, "NMOD"), ("book", "NN", 1, "OBJ"), ("every", "DT", 6, "NMOD"),
                ("night", "NN", 1, "VMOD"), (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "My brother bought a new car last month.",
            annotations: &[
                ("My", "PRP$", 1, "NMOD"), ("brother", "NN", 2, "SUB"), ("bought", "VBD", -1, "ROOT"),
                ("a", "DT", 5, "NMOD"), ("new", "JJ", 5, "NMOD"), ("car", "NN", 2, "OBJ"),
                ("last", "JJ", 7, "NMOD"), ("month", "NN", 2, "VMOD"), (".", ".", 2, "P"),
            ],
        },
        AnnotatedSentence {
            text: "The old man walked slowly to the station.",
            annotations: &[
                ("The", "DT", 2, "NMOD"), ("old", "JJ", 2, "NMOD"), ("man", "NN", 3, "SUB"),
                ("walked", "VBD", -1, "ROOT"), ("slowly", "RB", 3, "VMOD"), ("to", "TO", 3, "VMOD"),
                ("the", "DT", 7, "NMOD"), ("station", "NN", 5, "PMOD"), (".", ".", 3, "P"),
            ],
        },
        AnnotatedSentence {
            text: "We went to the beach on Sunday.",
            annotations: &[
                ("We", "PRP", 1, "SUB"), ("went", "VBD", -1, "ROOT"), ("to", "TO", 1, "VMOD"),
                ("the", "DT", 4, "NMOD"), ("beach", "NN", 2, "PMOD"), ("on", "IN", 1, "VMOD"),
                ("Sunday", "NNP", 5, "PMOD"), (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "They want to buy a house.",
            annotations: &[
                ("They", "PRP", 1, "SUB"), ("want", "VBP", -1, "ROOT"), ("to", "TO", 3, "VMOD"),
                ("buy", "VB", 1, "OBJ"), ("a", "DT", 5, "NMOD"), ("house", "NN", 3, "OBJ"),
                (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "John gave Mary a red apple.",
            annotations: &[
                ("John", "NNP", 1, "SUB"), ("gave", "VBD", -1, "ROOT"), ("Mary", "NNP", 1, "OBJ"),
                ("a", "DT", 5, "NMOD"), ("red", "JJ", 5, "NMOD"), ("apple", "NN", 1, "OBJ"),
                (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "The dog barked loudly at the mailman.",
            annotations: &[
                ("The", "DT", 1, "NMOD"), ("dog", "NN", 2, "SUB"), ("barked", "VBD", -1, "ROOT"),
                ("loudly", "RB", 2, "VMOD"), ("at", "IN", 2, "VMOD"), ("the", "DT", 6, "NMOD"),
                ("mailman", "NN", 4, "PMOD"), (".", ".", 2, "P"),
            ],
        },
        AnnotatedSentence {
            text: "Tom and Anna live in a small town.",
            annotations: &[
                ("Tom", "NNP", 2, "NMOD"), ("and", "CC", 2, "NMOD"), ("Anna", "NNP", 3, "SUB"),
                ("live", "VBP", -1, "ROOT"), ("in", "IN", 3, "VMOD"), ("a", "DT", 7, "NMOD"),
                ("small", "JJ", 7, "NMOD"), ("town", "NN", 4, "PMOD"), (".", ".", 3, "P"),
            ],
        },
        AnnotatedSentence {
            text: "The book on the table belongs to Sarah.",
            annotations: &[
                ("The", "DT", 1, "NMOD"), ("book", "NN", 5, "SUB"), ("on", "IN", 1, "NMOD"),
                ("the", "DT", 4, "NMOD"), ("table", "NN", 2, "PMOD"), ("belongs", "VBZ", -1, "ROOT"),
                ("to", "TO", 5, "VMOD"), ("Sarah", "NNP", 6, "PMOD"), (".", ".", 5, "P"),
            ],
        },
        AnnotatedSentence {
            text: "Prices rose sharply in 2008.",
            annotations: &[
                ("Prices", "NNS", 1, "SUB"), ("rose", "VBD", -1, "ROOT"), ("sharply", "RB", 1, "VMOD"),
                ("in", "IN", 1, "VMOD"), ("2008", "CD", 3, "PMOD"), (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "My sister works at a bank.",
            annotations: &[
                ("My", "PRP$", 1, "NMOD"), ("sister", "NN", 2, "SUB"), ("works", "VBZ", -1, "ROOT"),
                ("at", "IN", 2, "VMOD"), ("a", "DT", 5, "NMOD"), ("bank", "NN", 3, "PMOD"),
                (".", ".", 2, "P"),
            ],
        },
        AnnotatedSentence {
            text: "The teacher asked the students a difficult question.",
            annotations: &[
                ("The", "DT", 1, "NMOD"), ("teacher", "NN", 2, "SUB"), ("asked", "VBD", -1, "ROOT"),
                ("the", "DT", 4, "NMOD"), ("students", "NNS", 2, "OBJ"), ("a", "DT", 7, "NMOD"),
                ("difficult", "JJ", 7, "NMOD"), ("question", "NN", 2, "OBJ"), (".", ".", 2, "P"),
            ],
        },
        AnnotatedSentence {
            text: "She gave him a book.",
            annotations: &[
                ("She", "PRP", 1, "SUB"), ("gave", "VBD", -1, "ROOT"), ("him", "PRP", 1, "OBJ"),
                ("a", "DT", 4, "NMOD"), ("book", "NN", 1, "OBJ"), (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "He told them a funny story.",
            annotations: &[
                ("He", "PRP", 1, "SUB"), ("told", "VBD", -1, "ROOT"), ("them", "PRP", 1, "OBJ"),
                ("a", "DT", 5, "NMOD"), ("funny", "JJ", 5, "NMOD"), ("story", "NN", 1, "OBJ"),
                (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "They sent us a letter and a photo.",
            annotations: &[
                ("They", "PRP", 1, "SUB"), ("sent", "VBD", -1, "ROOT"), ("us", "PRP", 1, "OBJ"),
                ("a", "DT", 4, "NMOD"), ("letter", "NN", 7, "NMOD"), ("and", "CC", 7, "NMOD"),
                ("a", "DT", 7, "NMOD"), ("photo", "NN", 1, "OBJ"), (".", ".", 1, "P"),
            ],
        },
        // ===== COORDENAÇÃO: conjuntos anteriores e a conjunção dependem do último =====
        AnnotatedSentence {
            text: "I bought bread and milk.",
            annotations: &[
                ("I", "PRP", 1, "SUB"), ("bought", "VBD", -1, "ROOT"), ("bread", "NN", 4, "NMOD"),
                ("and", "CC", 4, "NMOD"), ("milk", "NN", 1, "OBJ"), (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "The boys and girls came home late.",
            annotations: &[
                ("The", "DT", 3, "NMOD"), ("boys", "NNS", 3, "NMOD"), ("and", "CC", 3, "NMOD"),
                ("girls", "NNS", 4, "SUB"), ("came", "VBD", -1, "ROOT"), ("home", "RB", 4, "VMOD"),
                ("late", "RB", 4, "VMOD"), (".", ".", 4, "P"),
            ],
        },
        AnnotatedSentence {
            text: "We went home early.",
            annotations: &[
                ("We", "PRP", 1, "SUB"), ("went", "VBD", -1, "ROOT"), ("home", "RB", 1, "VMOD"),
                ("early", "RB", 1, "VMOD"), (".", ".", 1, "P"),
            ],
        },
        // ===== CÓPULA E PREDICATIVOS =====
        AnnotatedSentence {
            text: "He is a doctor.",
            annotations: &[
                ("He", "PRP", 1, "SUB"), ("is", "VBZ", -1, "ROOT"), ("a", "DT", 3, "NMOD"),
                ("doctor", "NN", 1, "PRD"), (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "The weather was very cold yesterday.",
            annotations: &[
                ("The", "DT", 1, "NMOD"), ("weather", "NN", 2, "SUB"), ("was", "VBD", -1, "ROOT"),
                ("very", "RB", 4, "AMOD"), ("cold", "JJ", 2, "PRD"), ("yesterday", "NN", 2, "VMOD"),
                (".", ".", 2, "P"),
            ],
        },
        AnnotatedSentence {
            text: "The students in my class are very smart.",
            annotations: &[
                ("The", "DT", 1, "NMOD"), ("students", "NNS", 5, "SUB"), ("in", "IN", 1, "NMOD"),
                ("my", "PRP$", 4, "NMOD"), ("class", "NN", 2, "PMOD"), ("are", "VBP", -1, "ROOT"),
                ("very", "RB", 7, "AMOD"), ("smart", "JJ", 5, "PRD"), (".", ".", 5, "P"),
            ],
        },
        AnnotatedSentence {
            text: "Those flowers smell wonderful.",
            annotations: &[
                ("Those", "DT", 1, "NMOD"), ("flowers", "NNS", 2, "SUB"), ("smell", "VBP", -1, "ROOT"),
                ("wonderful", "JJ", 2, "PRD"), (".", ".", 2, "P"),
            ],
        },
        AnnotatedSentence {
            text: "These shoes are too expensive for me.",
            annotations: &[
                ("These", "DT", 1, "NMOD"), ("shoes", "NNS", 2, "SUB"), ("are", "VBP", -1, "ROOT"),
                ("too", "RB", 4, "AMOD"), ("expensive", "JJ", 2, "PRD"), ("for", "IN", 4, "AMOD"),
                ("me", "PRP", 5, "PMOD"), (".", ".", 2, "P"),
            ],
        },
        // ===== ORAÇÕES SUBORDINADAS E IMPERATIVAS =====
        AnnotatedSentence {
            text: "I think that he was right.",
            annotations: &[
                ("I", "PRP", 1, "SUB"), ("think", "VBP", -1, "ROOT"), ("that", "IN", 1, "VMOD"),
                ("he", "PRP", 4, "SUB"), ("was", "VBD", 2, "SBAR"), ("right", "JJ", 4, "PRD"),
                (".", ".", 1, "P"),
            ],
        },
        AnnotatedSentence {
            text: "Let me know if you need anything.",
            annotations: &[
                ("Let", "VB", -1, "ROOT"), ("me", "PRP", 0, "OBJ"), ("know", "VB", 0, "VMOD"),
                ("if", "IN", 2, "VMOD"), ("you", "PRP", 5, "SUB"), ("need", "VBP", 3, "SBAR"),
                ("anything", "NN", 5, "OBJ"), (".", ".", 0, "P"),
            ],
        },
        AnnotatedSentence {
            text: "Please close the door.",
            annotations: &[
                ("Please", "UH", 1, "VMOD"), ("close", "VB", -1, "ROOT"), ("the", "DT", 3, "NMOD"),
                ("door", "NN", 1, "OBJ"), (".", ".", 1, "P"),
            ],
        },
    ]
}

/// Conjunto ordenado de tags do corpus.
pub fn corpus_tagset(corpus: &[AnnotatedSentence]) -> Vec<String> {
    let tags: std::collections::BTreeSet<&str> = corpus
        .iter()
        .flat_map(|s| s.annotations.iter().map(|(_, t, ..)| *t))
        .collect();
    tags.into_iter().map(str::to_string).collect()
}
