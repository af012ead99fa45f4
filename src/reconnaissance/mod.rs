//! Reconnaissance (natif) : collaborateurs image -> texte
//!
//! - latex_ocr.rs : service HTTP LaTeX-OCR (pix2tex) -> balisage
//! - tesseract.rs : OCR générique (CLI tesseract) -> texte brut
//!
//! acquerir() : balisage d’abord (si le service répond et reconnaît quelque chose),
//! sinon OCR brut. Les erreurs sont journalisées puis ramenées à “indisponible” / vide.

use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use crate::noyau::TexteReconnu;

pub mod latex_ocr;
pub mod tesseract;

pub use latex_ocr::ClientLatexOcr;
pub use tesseract::MoteurTesseract;

#[derive(Debug, Error)]
pub enum ErreurReconnaissance {
    #[error("lecture de l’image {}: {source}", .chemin.display())]
    Image {
        chemin: PathBuf,
        source: std::io::Error,
    },

    #[error("service injoignable : {0}")]
    Transport(#[from] reqwest::Error),

    #[error("statut HTTP {0}")]
    Statut(u16),

    #[error("réponse illisible : {0}")]
    Decodage(String),

    #[error("lancement de {programme} impossible : {source}")]
    Lancement {
        programme: String,
        source: std::io::Error,
    },

    #[error("{programme} a échoué (code {code:?}) : {stderr}")]
    Echec {
        programme: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Image -> balisage LaTeX.
pub trait ReconnaisseurBalisage {
    /// Sonde légère : le service répond-il ?
    fn disponible(&self) -> bool;
    fn reconnaitre(&self, image: &Path) -> Result<String, ErreurReconnaissance>;
}

/// Image -> texte brut ; "" en cas d’échec (pas de canal d’erreur).
pub trait ReconnaisseurTexte {
    fn reconnaitre(&self, image: &Path) -> String;
}

/// Aucun service de balisage (client HTTP non constructible).
pub struct SansBalisage;

impl ReconnaisseurBalisage for SansBalisage {
    fn disponible(&self) -> bool {
        false
    }
    fn reconnaitre(&self, _image: &Path) -> Result<String, ErreurReconnaissance> {
        Ok(String::new())
    }
}

/// Lit les octets d’une image (erreur typée avec le chemin).
pub(crate) fn lire_image(image: &Path) -> Result<Vec<u8>, ErreurReconnaissance> {
    std::fs::read(image).map_err(|source| ErreurReconnaissance::Image {
        chemin: image.to_path_buf(),
        source,
    })
}

/// Texte reconnu pour `image`, avec sa source ; None si rien n’a été reconnu.
pub fn acquerir(
    image: &Path,
    balisage: &dyn ReconnaisseurBalisage,
    texte: &dyn ReconnaisseurTexte,
) -> Option<TexteReconnu> {
    if balisage.disponible() {
        match balisage.reconnaitre(image) {
            Ok(latex) if !latex.trim().is_empty() => {
                info!("LaTeX-OCR : {latex:?}");
                return Some(TexteReconnu::balisage(latex));
            }
            Ok(_) => info!("LaTeX-OCR : rien reconnu, repli sur l’OCR brut"),
            Err(e) => warn!("LaTeX-OCR : {e} ; repli sur l’OCR brut"),
        }
    } else {
        info!("LaTeX-OCR indisponible : OCR brut seul");
    }

    let brut = texte.reconnaitre(image);
    if brut.trim().is_empty() {
        info!("OCR brut : rien reconnu");
        return None;
    }
    info!("OCR brut : {brut:?}");
    Some(TexteReconnu::brut(brut))
}
