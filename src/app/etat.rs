//! src/app/etat.rs
//!
//! État UI (sans vue).
//!
//! Rôle : contenir l’état de la calculatrice (entrée, source, résultat, erreur, démarche)
//! et offrir des opérations simples (C/CLR/AC) sans logique d’affichage.
//!
//! Contrats :
//! - L’évaluation passe UNIQUEMENT par l’orchestrateur du noyau.
//! - Actions déterministes, sans effet de bord caché.
//! - NATIF : la reconnaissance d’image tourne sur un fil séparé (jamais dans update()).

#[cfg(not(target_arch = "wasm32"))]
use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::noyau::{executer, Rapport, Source, TexteReconnu};
#[cfg(not(target_arch = "wasm32"))]
use crate::reglages::Reglages;

#[derive(Clone, Default, Debug, PartialEq)]
pub struct Demarche {
    pub source: String,
    pub type_expression: String,
    pub canonique: String,
    pub regles: String,
    pub moteur: String,
    pub simplifiee: String,
    pub preuve: String,
    /// Genre d’échec (vide si succès).
    pub echec: String,
}

impl Demarche {
    fn depuis_rapport(r: &Rapport) -> Self {
        Self {
            source: r.source.to_string(),
            type_expression: r
                .type_expression
                .map(|t| t.to_string())
                .unwrap_or_else(|| "—".to_string()),
            canonique: r.canonique.clone(),
            regles: r.regles.join(" → "),
            moteur: r.chemin.to_string(),
            simplifiee: r.simplifiee.clone().unwrap_or_default(),
            preuve: r.preuve.join("\n"),
            echec: r
                .resultat
                .as_ref()
                .err()
                .map(|e| e.genre().to_string())
                .unwrap_or_default(),
        }
    }
}

pub struct AppCalc {
    // --- entrée utilisateur ---
    pub entree: String,
    pub source: Source,

    // --- sorties ---
    pub resultat: String,
    pub erreur: String,

    // --- démarche (panneau d’explication) ---
    pub demarche: Demarche,

    // --- reconnaissance d’image (natif) ---
    #[cfg(not(target_arch = "wasm32"))]
    pub chemin_image: String,
    #[cfg(not(target_arch = "wasm32"))]
    pub reglages: Reglages,
    #[cfg(not(target_arch = "wasm32"))]
    en_cours: Option<Receiver<Option<TexteReconnu>>>,

    // --- UX ---
    // Permet à vue.rs de redonner le focus à l’entrée après un clic sur un bouton.
    pub focus_entree: bool,
}

impl Default for AppCalc {
    fn default() -> Self {
        Self {
            entree: String::new(),
            source: Source::Balisage,
            resultat: String::new(),
            erreur: String::new(),
            demarche: Demarche::default(),
            #[cfg(not(target_arch = "wasm32"))]
            chemin_image: String::new(),
            #[cfg(not(target_arch = "wasm32"))]
            reglages: Reglages::default(),
            #[cfg(not(target_arch = "wasm32"))]
            en_cours: None,
            focus_entree: true, // au lancement, on veut pouvoir taper tout de suite
        }
    }
}

impl AppCalc {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn avec_reglages(reglages: Reglages) -> Self {
        Self {
            reglages,
            ..Self::default()
        }
    }

    /* ------------------------ Actions “boutons” (état seulement) ------------------------ */

    /// AC : remise à zéro totale (entrée + résultats + source par défaut).
    pub fn reset_total(&mut self) {
        self.entree.clear();
        self.source = Source::default();
        self.clear_resultats();
        self.focus_entree = true;
    }

    /// C : effacer seulement l’entrée (sans toucher aux résultats).
    pub fn clear_entree(&mut self) {
        self.entree.clear();
        self.focus_entree = true;
    }

    /// CLR : effacer résultat + erreur + démarche (sans toucher à l’entrée).
    pub fn clear_resultats(&mut self) {
        self.resultat.clear();
        self.erreur.clear();
        self.demarche = Demarche::default();
        self.focus_entree = true;
    }

    /// Utilitaire : placer une erreur hors pipeline (ex: reconnaissance vide).
    pub fn set_erreur(&mut self, msg: impl Into<String>) {
        self.erreur = msg.into();
        self.resultat.clear();
        self.demarche = Demarche::default();
        self.focus_entree = true;
    }

    /// Dépose le compte rendu d’une exécution.
    ///
    /// Choix UX : en cas d’échec, la démarche reste visible (elle dit OÙ ça a cassé).
    pub fn depose_rapport(&mut self, r: &Rapport) {
        self.demarche = Demarche::depuis_rapport(r);
        if r.est_succes() {
            self.resultat = r.message();
            self.erreur.clear();
        } else {
            self.resultat.clear();
            self.erreur = r.message();
        }
        self.focus_entree = true;
    }

    /// Évalue l’entrée courante avec la source choisie.
    pub fn evaluer(&mut self) {
        let texte = TexteReconnu::new(self.entree.clone(), self.source);
        let r = executer(&texte);
        self.depose_rapport(&r);
    }

    /* ------------------------ Reconnaissance (natif) ------------------------ */

    #[cfg(not(target_arch = "wasm32"))]
    pub fn reconnaissance_en_cours(&self) -> bool {
        self.en_cours.is_some()
    }

    /// Lance la reconnaissance de `chemin_image` sur un fil séparé.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn lance_reconnaissance(&mut self) {
        use std::path::PathBuf;

        use crate::reconnaissance::{acquerir, ClientLatexOcr, MoteurTesseract, SansBalisage};

        let chemin = self.chemin_image.trim();
        if chemin.is_empty() || self.en_cours.is_some() {
            return;
        }

        let image = PathBuf::from(chemin);
        let reglages = self.reglages.clone();
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            let texte = MoteurTesseract::depuis_reglages(&reglages);
            let reconnu = match ClientLatexOcr::depuis_reglages(&reglages) {
                Ok(client) => acquerir(&image, &client, &texte),
                Err(e) => {
                    log::warn!("client LaTeX-OCR indisponible : {e}");
                    acquerir(&image, &SansBalisage, &texte)
                }
            };
            // fenêtre fermée entre-temps : rien à faire
            let _ = tx.send(reconnu);
        });

        self.en_cours = Some(rx);
        self.erreur.clear();
    }

    /// À appeler à chaque frame : récupère le texte reconnu et l’évalue.
    /// Retourne true tant que la reconnaissance tourne.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn sonde_reconnaissance(&mut self) -> bool {
        let Some(rx) = &self.en_cours else {
            return false;
        };

        match rx.try_recv() {
            Err(TryRecvError::Empty) => true,
            Ok(reconnu) => {
                self.en_cours = None;
                self.recoit(reconnu);
                false
            }
            Err(TryRecvError::Disconnected) => {
                self.en_cours = None;
                self.set_erreur("reconnaissance interrompue");
                false
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn recoit(&mut self, reconnu: Option<TexteReconnu>) {
        match reconnu {
            Some(t) => {
                self.entree = t.texte().to_string();
                self.source = t.source();
                self.evaluer();
            }
            None => self.set_erreur("aucun texte reconnu dans l’image"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(entree: &str, source: Source) -> AppCalc {
        AppCalc {
            entree: entree.to_string(),
            source,
            ..AppCalc::default()
        }
    }

    #[test]
    fn evaluation_balisage() {
        let mut a = app("\\frac{1}{2}", Source::Balisage);
        a.evaluer();
        assert_eq!(a.resultat, "0.5");
        assert!(a.erreur.is_empty());
        assert_eq!(a.demarche.canonique, "(1)/(2)");
        assert_eq!(a.demarche.type_expression, "fraction");
        assert_eq!(a.demarche.moteur, "LaTeX-OCR + moteur symbolique");
        assert!(a.demarche.echec.is_empty());
    }

    #[test]
    fn echec_garde_la_demarche() {
        let mut a = app("1/0", Source::Brut);
        a.evaluer();
        assert!(a.resultat.is_empty());
        assert!(!a.erreur.is_empty());
        assert_eq!(a.demarche.moteur, "OCR + arithmétique → moteur symbolique");
        assert_eq!(a.demarche.echec, "Evaluateur");
    }

    #[test]
    fn c_clr_ac() {
        let mut a = app("2 x 3", Source::Brut);
        a.evaluer();
        assert_eq!(a.resultat, "6");

        a.clear_entree();
        assert!(a.entree.is_empty());
        assert_eq!(a.resultat, "6");

        a.clear_resultats();
        assert!(a.resultat.is_empty());
        assert_eq!(a.demarche, Demarche::default());

        a.entree = "x".into();
        a.reset_total();
        assert!(a.entree.is_empty());
        assert_eq!(a.source, Source::Balisage);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn texte_reconnu_evalue() {
        let mut a = AppCalc::default();
        a.recoit(Some(TexteReconnu::brut("5==3")));
        assert_eq!(a.source, Source::Brut);
        assert_eq!(a.resultat, "53");

        a.recoit(None);
        assert!(a.erreur.contains("aucun texte"));
        assert!(!a.sonde_reconnaissance());
    }
}
