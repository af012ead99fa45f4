// src/noyau/source.rs

use std::fmt;

/// Quel reconnaisseur a produit le texte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Source {
    /// Balisage LaTeX (reconnaisseur mathématique).
    #[default]
    Balisage,
    /// Texte brut (OCR générique).
    Brut,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Balisage => write!(f, "LaTeX-OCR"),
            Source::Brut => write!(f, "OCR brut"),
        }
    }
}

/// Texte reconnu + étiquette de source. Immuable : une exécution, puis jeté.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TexteReconnu {
    texte: String,
    source: Source,
}

impl TexteReconnu {
    pub fn new(texte: impl Into<String>, source: Source) -> Self {
        Self {
            texte: texte.into(),
            source,
        }
    }

    pub fn balisage(texte: impl Into<String>) -> Self {
        Self::new(texte, Source::Balisage)
    }

    pub fn brut(texte: impl Into<String>) -> Self {
        Self::new(texte, Source::Brut)
    }

    pub fn texte(&self) -> &str {
        &self.texte
    }

    pub fn source(&self) -> Source {
        self.source
    }

    /// Vide ou seulement des blancs.
    pub fn est_vide(&self) -> bool {
        self.texte.trim().is_empty()
    }
}
