// src/reglages.rs
//
// Réglages des collaborateurs (natif) : valeurs par défaut + variables d’environnement.
//   CALC_LATEX_OCR_URL     base du service LaTeX-OCR      (http://localhost:8502)
//   CALC_TESSERACT         exécutable tesseract           (tesseract)
//   CALC_TESSERACT_LANGUE  langue(s) -l                   (eng)
//   CALC_DELAI_HTTP_S      délai HTTP en secondes         (10)
//   CALC_LOG               niveau de journal              (info)
//
// Une valeur illisible garde le défaut et produit un avertissement
// (journalisé par main une fois le logger en place).

use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;

#[derive(Clone, Debug, PartialEq)]
pub struct Reglages {
    pub url_latex_ocr: String,
    pub tesseract: String,
    pub langue: String,
    pub delai_http: Duration,
    pub niveau_log: LevelFilter,
}

impl Default for Reglages {
    fn default() -> Self {
        Self {
            url_latex_ocr: "http://localhost:8502".to_string(),
            tesseract: "tesseract".to_string(),
            langue: "eng".to_string(),
            delai_http: Duration::from_secs(10),
            niveau_log: LevelFilter::Info,
        }
    }
}

impl Reglages {
    pub fn depuis_env() -> (Self, Vec<String>) {
        Self::depuis_lecteur(|cle| std::env::var(cle).ok())
    }

    /// `lire(cle)` : valeur brute de la clé, si présente.
    pub fn depuis_lecteur<F>(lire: F) -> (Self, Vec<String>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut r = Self::default();
        let mut avertissements = Vec::new();

        let texte = |cle: &str| lire(cle).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = texte("CALC_LATEX_OCR_URL") {
            r.url_latex_ocr = url.trim_end_matches('/').to_string();
        }
        if let Some(exe) = texte("CALC_TESSERACT") {
            r.tesseract = exe;
        }
        if let Some(langue) = texte("CALC_TESSERACT_LANGUE") {
            r.langue = langue;
        }
        if let Some(v) = texte("CALC_DELAI_HTTP_S") {
            match v.parse::<u64>() {
                Ok(s) if s > 0 => r.delai_http = Duration::from_secs(s),
                _ => avertissements.push(format!("CALC_DELAI_HTTP_S={v:?} ignoré (entier > 0 attendu)")),
            }
        }
        if let Some(v) = texte("CALC_LOG") {
            match LevelFilter::from_str(&v) {
                Ok(niveau) => r.niveau_log = niveau,
                Err(_) => avertissements.push(format!("CALC_LOG={v:?} ignoré (niveau inconnu)")),
            }
        }

        (r, avertissements)
    }
}
