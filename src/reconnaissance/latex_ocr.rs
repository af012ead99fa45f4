// src/reconnaissance/latex_ocr.rs
//
// Client du service LaTeX-OCR (API pix2tex : docker lukasblecher/pix2tex:api).
//   POST <base>/predict   {"image": "<base64>"}  ->  {"latex": "...", "confidence": 0.9, "text": "..."}
//   GET  <base>/          sonde de disponibilité (statut 2xx attendu)
//
// Le client HTTP appartient à l’instance (pas de client global).

use std::path::Path;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{lire_image, ErreurReconnaissance, ReconnaisseurBalisage};
use crate::reglages::Reglages;

pub struct ClientLatexOcr {
    base: String,
    client: Client,
}

#[derive(Serialize)]
struct Requete {
    image: String,
}

impl Requete {
    fn depuis_octets(octets: &[u8]) -> Self {
        Self {
            image: STANDARD.encode(octets),
        }
    }
}

#[derive(Deserialize)]
struct Reponse {
    #[serde(default)]
    latex: Option<String>,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    text: Option<String>,
}

/// Seul `latex` est consommé ; absent ou null => "".
fn decoder_reponse(corps: &str) -> Result<String, ErreurReconnaissance> {
    let r: Reponse =
        serde_json::from_str(corps).map_err(|e| ErreurReconnaissance::Decodage(e.to_string()))?;
    debug!(
        "LaTeX-OCR : confiance {:.2}, texte {:?}",
        r.confidence,
        r.text.as_deref().unwrap_or("")
    );
    Ok(r.latex.unwrap_or_default())
}

impl ClientLatexOcr {
    pub fn new(base: &str, delai: Duration) -> Result<Self, ErreurReconnaissance> {
        let client = Client::builder().timeout(delai).build()?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn depuis_reglages(r: &Reglages) -> Result<Self, ErreurReconnaissance> {
        Self::new(&r.url_latex_ocr, r.delai_http)
    }

    fn url(&self, chemin: &str) -> String {
        format!("{}/{chemin}", self.base)
    }
}

impl ReconnaisseurBalisage for ClientLatexOcr {
    fn disponible(&self) -> bool {
        match self.client.get(self.url("")).send() {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("LaTeX-OCR : sonde en échec ({e})");
                false
            }
        }
    }

    fn reconnaitre(&self, image: &Path) -> Result<String, ErreurReconnaissance> {
        let requete = Requete::depuis_octets(&lire_image(image)?);

        let resp = self.client.post(self.url("predict")).json(&requete).send()?;
        let statut = resp.status();
        if !statut.is_success() {
            return Err(ErreurReconnaissance::Statut(statut.as_u16()));
        }

        decoder_reponse(&resp.text()?)
    }
}
