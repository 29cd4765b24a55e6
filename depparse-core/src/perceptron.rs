//! # Averaged Perceptron Multiclasse
//!
//! Classificador linear compartilhado pelo tagger (uma classe por tag) e pelo
//! parser (uma classe por transição). Algoritmo online e *mistake-driven*:
//! os pesos só mudam quando a predição erra.
//!
//! Utiliza "Lazy Averaging" para evitar custo O(N*T) na atualização dos pesos médios.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;

/// Pesos por feature: feature → vetor com um peso por classe.
pub type Weights = HashMap<String, Vec<f64>>;

/// Modelo Perceptron Médio (Averaged Perceptron).
///
/// # Lazy Averaging
/// Calcular a média real a cada passo seria $O(N \cdot T)$. Esta implementação
/// acumula `peso × passos desde a última mudança` apenas quando a feature é
/// atualizada, e fecha a conta uma única vez em [`AveragedPerceptron::averaged`].
///
/// Somente `classes` e `weights` vão para o arquivo de modelo; os acumuladores
/// existem apenas durante a derivação dos pesos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AveragedPerceptron {
    /// Número de classes (tags ou transições).
    classes: usize,
    /// Pesos atuais $w$.
    weights: Weights,
    /// Soma acumulada dos pesos $\sum w_t$.
    #[serde(skip)]
    totals: Weights,
    /// Último passo em que cada peso foi atualizado.
    #[serde(skip)]
    last_update: HashMap<String, Vec<usize>>,
    /// Número total de passos (decisões observadas).
    #[serde(skip)]
    steps: usize,
}

impl AveragedPerceptron {
    pub fn new(classes: usize) -> Self {
        Self {
            classes,
            weights: HashMap::new(),
            totals: HashMap::new(),
            last_update: HashMap::new(),
            steps: 0,
        }
    }

    pub fn classes(&self) -> usize {
        self.classes
    }

    /// Número de features com algum peso.
    pub fn feature_count(&self) -> usize {
        self.weights.len()
    }

    /// Pontua todas as classes: $score_c = \sum_f w_{f,c}$.
    pub fn scores(&self, fv: &FeatureVector) -> Vec<f64> {
        let mut scores = vec![0.0; self.classes];
        for feature in &fv.features {
            if let Some(ws) = self.weights.get(feature) {
                for (score, w) in scores.iter_mut().zip(ws) {
                    *score += w;
                }
            }
        }
        scores
    }

    /// Classe de maior score entre as permitidas. Empates ficam com o menor índice.
    pub fn best<F>(scores: &[f64], allowed: F) -> Option<usize>
    where
        F: Fn(usize) -> bool,
    {
        let mut best: Option<(usize, f64)> = None;
        for (class, &score) in scores.iter().enumerate() {
            if !allowed(class) {
                continue;
            }
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((class, score)),
            }
        }
        best.map(|(class, _)| class)
    }

    /// Marca o fim de uma decisão (um token ou uma transição).
    pub fn tick(&mut self) {
        self.steps += 1;
    }

    /// Atualiza os pesos quando o modelo erra.
    ///
    /// $w_{correto} \leftarrow w_{correto} + \phi(x)$
    /// $w_{errado} \leftarrow w_{errado} - \phi(x)$
    pub fn update(&mut self, fv: &FeatureVector, truth: usize, guess: usize) {
        if truth == guess {
            return;
        }
        for feature in &fv.features {
            self.update_feature(feature, truth, 1.0);
            self.update_feature(feature, guess, -1.0);
        }
    }

    /// Atualiza um peso aplicando Lazy Averaging.
    fn update_feature(&mut self, feature: &str, class: usize, delta: f64) {
        let classes = self.classes;
        let weights = self
            .weights
            .entry(feature.to_string())
            .or_insert_with(|| vec![0.0; classes]);
        let totals = self
            .totals
            .entry(feature.to_string())
            .or_insert_with(|| vec![0.0; classes]);
        let stamps = self
            .last_update
            .entry(feature.to_string())
            .or_insert_with(|| vec![0; classes]);

        // 1. Acumula o peso ANTIGO pelos passos em que ficou constante
        totals[class] += (self.steps - stamps[class]) as f64 * weights[class];
        stamps[class] = self.steps;
        // 2. Aplica a mudança
        weights[class] += delta;
    }

    /// Calcula os pesos médios ($ \sum w_t / T $) sem alterar o estado de treino.
    pub fn averaged(&self) -> Weights {
        let steps = self.steps.max(1) as f64;
        self.weights
            .iter()
            .map(|(feature, ws)| {
                let totals = self.totals.get(feature);
                let stamps = self.last_update.get(feature);
                let avg = ws
                    .iter()
                    .enumerate()
                    .map(|(c, w)| {
                        let total = totals.map_or(0.0, |t| t[c]);
                        let last = stamps.map_or(0, |s| s[c]);
                        (total + (self.steps - last) as f64 * w) / steps
                    })
                    .collect();
                (feature.clone(), avg)
            })
            .collect()
    }

    /// Cópia dos pesos atuais (não médios).
    pub fn current(&self) -> Weights {
        self.weights.clone()
    }

    /// Fixa os pesos finais e descarta os acumuladores de treino.
    ///
    /// Features cujo vetor ficou inteiramente zerado são removidas.
    pub fn finalize(&mut self, weights: Weights) {
        self.weights = weights
            .into_iter()
            .filter(|(_, ws)| ws.iter().any(|w| *w != 0.0))
            .collect();
        self.totals.clear();
        self.last_update.clear();
        self.steps = 0;
    }

    /// Verifica a coerência de um modelo desserializado.
    pub fn validate(&self) -> Result<(), String> {
        if self.classes == 0 {
            return Err("modelo sem classes".to_string());
        }
        if let Some((feature, ws)) = self.weights.iter().find(|(_, ws)| ws.len() != self.classes) {
            return Err(format!(
                "feature {feature:?} tem {} pesos, esperado {}",
                ws.len(),
                self.classes
            ));
        }
        if self.weights.values().flatten().any(|w| !w.is_finite()) {
            return Err("pesos não finitos".to_string());
        }
        Ok(())
    }
}
