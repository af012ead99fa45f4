// src/noyau/erreur.rs
//
// Taxonomie des échecs du pipeline (une seule par exécution).
// - EntreeVide : rien de reconnu (état terminal “sans résultat”, pas une faute)
// - Analyse    : texte présent mais pas de forme canonique acceptable
// - Evaluateur : forme canonique acceptée mais le calcul a échoué

use thiserror::Error;

/// Message unique quand le moteur symbolique refuse la forme canonique.
pub const MSG_INTERPRETATION: &str = "impossible d’interpréter l’expression";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EchecEvaluation {
    #[error("aucun texte reconnu")]
    EntreeVide,

    #[error("échec d’analyse : {0}")]
    Analyse(String),

    #[error("erreur de l’évaluateur : {0}")]
    Evaluateur(String),
}

impl EchecEvaluation {
    /// Libellé court du type d’échec (pour la démarche / les journaux).
    pub fn genre(&self) -> &'static str {
        match self {
            EchecEvaluation::EntreeVide => "EntreeVide",
            EchecEvaluation::Analyse(_) => "Analyse",
            EchecEvaluation::Evaluateur(_) => "Evaluateur",
        }
    }
}
