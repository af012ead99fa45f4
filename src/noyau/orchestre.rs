//! Noyau — orchestrateur
//!
//! Repos -> Source -> Preparation -> Evaluation -> Termine
//!
//! - Balisage : classement (informatif) + normalisation LaTeX, moteur symbolique SEUL
//! - Brut     : nettoyage, arithmétique, puis UN repli vers le moteur symbolique
//!              avec le même texte nettoyé
//!
//! Pas de nouvelle tentative au-delà de ce repli : l’échec final est rendu tel quel.

use std::fmt;

use log::{debug, info};

use super::arith::evaluer_arithmetique;
use super::classe::{classifier, TypeExpression};
use super::erreur::EchecEvaluation;
use super::latex::normaliser_avec_trace;
use super::nettoyage::nettoyer;
use super::source::{Source, TexteReconnu};
use super::symbolique::{evaluer_symbolique_detaille, ResultatSymbolique, Valeur};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Etape {
    Repos,
    Source,
    Preparation,
    Evaluation,
    Termine,
}

/// Moteur(s) effectivement sollicités.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Chemin {
    #[default]
    Aucun,
    Symbolique,
    Arithmetique,
    ArithmetiqueVersSymbolique,
}

impl Chemin {
    pub fn libelle(self) -> &'static str {
        match self {
            Chemin::Aucun => "aucun moteur",
            Chemin::Symbolique => "LaTeX-OCR + moteur symbolique",
            Chemin::Arithmetique => "OCR + arithmétique",
            Chemin::ArithmetiqueVersSymbolique => "OCR + arithmétique → moteur symbolique",
        }
    }
}

impl fmt::Display for Chemin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.libelle())
    }
}

/// Compte rendu d’une exécution (un seul résultat).
#[derive(Clone, Debug, PartialEq)]
pub struct Rapport {
    pub resultat: Result<Valeur, EchecEvaluation>,
    pub chemin: Chemin,
    pub source: Source,
    pub texte: String,
    pub type_expression: Option<TypeExpression>,
    /// Texte remis à l’évaluateur (normalisé ou nettoyé).
    pub canonique: String,
    /// Règles LaTeX qui ont modifié le texte.
    pub regles: Vec<&'static str>,
    pub simplifiee: Option<String>,
    pub preuve: Vec<String>,
}

impl Rapport {
    fn nouveau(texte: &TexteReconnu) -> Self {
        Rapport {
            resultat: Err(EchecEvaluation::EntreeVide),
            chemin: Chemin::Aucun,
            source: texte.source(),
            texte: texte.texte().to_string(),
            type_expression: None,
            canonique: String::new(),
            regles: Vec::new(),
            simplifiee: None,
            preuve: Vec::new(),
        }
    }

    pub fn est_succes(&self) -> bool {
        self.resultat.is_ok()
    }

    /// Message unique pour l’utilisateur (valeur, ou échec + texte fautif).
    pub fn message(&self) -> String {
        match &self.resultat {
            Ok(v) => v.to_string(),
            Err(EchecEvaluation::EntreeVide) => EchecEvaluation::EntreeVide.to_string(),
            Err(e) => {
                let fautif = if self.canonique.is_empty() {
                    self.texte.trim()
                } else {
                    self.canonique.as_str()
                };
                format!("{e} [{fautif}]")
            }
        }
    }

    fn applique_symbolique(&mut self, r: Result<ResultatSymbolique, EchecEvaluation>) {
        self.resultat = match r {
            Ok(r) => {
                self.simplifiee = Some(r.simplifiee);
                self.preuve = r.preuve;
                Ok(r.valeur)
            }
            Err(e) => Err(e),
        };
    }
}

/// Les deux évaluateurs vus par l’orchestrateur.
pub trait Moteurs {
    fn arithmetique(&self, expr: &str) -> Result<f64, EchecEvaluation>;
    fn symbolique(&self, expr: &str) -> Result<ResultatSymbolique, EchecEvaluation>;
}

/// Évaluateurs du noyau.
#[derive(Clone, Copy, Debug, Default)]
pub struct MoteursNoyau;

impl Moteurs for MoteursNoyau {
    fn arithmetique(&self, expr: &str) -> Result<f64, EchecEvaluation> {
        evaluer_arithmetique(expr)
    }

    fn symbolique(&self, expr: &str) -> Result<ResultatSymbolique, EchecEvaluation> {
        evaluer_symbolique_detaille(expr)
    }
}

pub fn executer(texte: &TexteReconnu) -> Rapport {
    executer_avec(texte, &MoteursNoyau)
}

fn passe(etape: &mut Etape, vers: Etape) {
    debug!("orchestre : {etape:?} -> {vers:?}");
    *etape = vers;
}

pub fn executer_avec<M: Moteurs + ?Sized>(texte: &TexteReconnu, moteurs: &M) -> Rapport {
    let mut etape = Etape::Repos;
    let mut rapport = Rapport::nouveau(texte);

    passe(&mut etape, Etape::Source);
    if texte.est_vide() {
        passe(&mut etape, Etape::Termine);
        return rapport;
    }

    match texte.source() {
        Source::Balisage => {
            rapport.type_expression = Some(classifier(texte.texte()));

            passe(&mut etape, Etape::Preparation);
            let (canonique, regles) = normaliser_avec_trace(texte.texte());
            rapport.canonique = canonique;
            rapport.regles = regles;

            if rapport.canonique.is_empty() {
                rapport.resultat = Err(EchecEvaluation::Analyse("balisage LaTeX non normalisable".into()));
            } else {
                passe(&mut etape, Etape::Evaluation);
                rapport.chemin = Chemin::Symbolique;
                let r = moteurs.symbolique(&rapport.canonique);
                rapport.applique_symbolique(r);
            }
        }

        Source::Brut => {
            passe(&mut etape, Etape::Preparation);
            rapport.canonique = nettoyer(texte.texte());

            // nettoyage => plus rien : rien de reconnu
            if !rapport.canonique.is_empty() {
                passe(&mut etape, Etape::Evaluation);
                match moteurs.arithmetique(&rapport.canonique) {
                    Ok(v) => {
                        rapport.chemin = Chemin::Arithmetique;
                        rapport.resultat = Ok(Valeur::Numerique(v));
                    }
                    Err(e) => {
                        debug!("orchestre : arithmétique en échec ({e}), repli symbolique");
                        rapport.chemin = Chemin::ArithmetiqueVersSymbolique;
                        let r = moteurs.symbolique(&rapport.canonique);
                        rapport.applique_symbolique(r);
                    }
                }
            }
        }
    }

    passe(&mut etape, Etape::Termine);
    match &rapport.resultat {
        Ok(_) => info!("{} ({}) : {}", rapport.chemin, rapport.source, rapport.message()),
        Err(e) => info!(
            "{} ({}) : échec {} : {}",
            rapport.chemin,
            rapport.source,
            e.genre(),
            rapport.message()
        ),
    }
    rapport
}
