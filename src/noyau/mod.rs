//! Noyau : normalisation + évaluation du texte reconnu
//!
//! Organisation interne :
//! - source.rs     : texte reconnu + étiquette de source
//! - erreur.rs     : taxonomie des échecs (EntreeVide / Analyse / Evaluateur)
//! - nettoyage.rs  : OCR brut -> alphabet arithmétique sûr
//! - arith.rs      : évaluateur arithmétique f64 (+ - * / %)
//! - latex.rs      : balisage LaTeX -> forme canonique (règles nommées, ordonnées)
//! - classe.rs     : type d’expression (informatif)
//! - moteur symbolique :
//!     jetons.rs, rpn.rs, expr.rs (AST exact + simplify), canon.rs,
//!     trig.rs (angles spéciaux), format.rs (texte canonique), numerique.rs (f64)
//! - symbolique.rs : adaptateur (texte canonique -> Valeur)
//! - orchestre.rs  : choix des moteurs + repli unique

pub mod arith;
pub mod canon;
pub mod classe;
pub mod erreur;
pub mod expr;
pub mod format;
pub mod jetons;
pub mod latex;
pub mod nettoyage;
pub mod numerique;
pub mod orchestre;
pub mod rpn;
pub mod source;
pub mod symbolique;
pub mod trig;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

#[cfg(test)]
mod proptests;

// API publique minimale (ce que app/ et reconnaissance/ consomment)
pub use orchestre::{executer, Rapport};
pub use source::{Source, TexteReconnu};
