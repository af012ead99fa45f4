// src/reconnaissance/tesseract.rs
//
// OCR générique via la CLI tesseract :  tesseract <image> stdout -l <langue>
// Toute erreur (image absente, exécutable introuvable, code non nul) => "".

use std::path::Path;
use std::process::Command;

use log::warn;

use super::{ErreurReconnaissance, ReconnaisseurTexte};
use crate::reglages::Reglages;

pub struct MoteurTesseract {
    executable: String,
    langue: String,
}

impl MoteurTesseract {
    pub fn new(executable: impl Into<String>, langue: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            langue: langue.into(),
        }
    }

    pub fn depuis_reglages(r: &Reglages) -> Self {
        Self::new(r.tesseract.clone(), r.langue.clone())
    }

    fn lance(&self, image: &Path) -> Result<String, ErreurReconnaissance> {
        // image lisible avant de lancer un processus
        std::fs::metadata(image).map_err(|source| ErreurReconnaissance::Image {
            chemin: image.to_path_buf(),
            source,
        })?;

        let sortie = Command::new(&self.executable)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.langue)
            .output()
            .map_err(|source| ErreurReconnaissance::Lancement {
                programme: self.executable.clone(),
                source,
            })?;

        if !sortie.status.success() {
            return Err(ErreurReconnaissance::Echec {
                programme: self.executable.clone(),
                code: sortie.status.code(),
                stderr: String::from_utf8_lossy(&sortie.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&sortie.stdout).trim().to_string())
    }
}

impl ReconnaisseurTexte for MoteurTesseract {
    fn reconnaitre(&self, image: &Path) -> String {
        self.lance(image).unwrap_or_else(|e| {
            warn!("tesseract : {e}");
            String::new()
        })
    }
}
