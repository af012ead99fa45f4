// src/app/vue.rs
//
// Vue (UI egui) — natif + web
// ---------------------------
// Objectifs :
// - Même AppCalc (etat.rs) pour natif + wasm
// - Choix de la source : balisage LaTeX ou texte OCR brut
// - Clavier : Enter évalue (quand le champ est focus)
// - Tactile : gros boutons, focus redonné après clic (focus_entree)
// - NATIF : chemin d’image + “Reconnaître” (LaTeX-OCR puis tesseract)

use eframe::egui;

use super::etat::AppCalc;
use crate::noyau::Source;

/// Motifs retirés d’un coup par DEL (les plus longs d’abord).
const MOTIFS_DEL: [&str; 12] = [
    "\\frac{", "\\sqrt{", "\\int", "\\sin", "\\cos", "\\tan", "\\log", "\\ln", "\\pi", "sqrt(",
    "pi", "^{",
];

impl AppCalc {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading("Calculatrice OCR");
                ui.add_space(6.0);

                #[cfg(not(target_arch = "wasm32"))]
                {
                    self.ui_image(ui);
                    ui.add_space(8.0);
                    ui.separator();
                    ui.add_space(8.0);
                }

                self.ui_entree(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_resultats(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_demarche(ui);
            });
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn ui_image(&mut self, ui: &mut egui::Ui) {
        ui.label("Image :");

        let occupe = self.reconnaissance_en_cours();
        ui.horizontal(|ui| {
            ui.add_enabled(
                !occupe,
                egui::TextEdit::singleline(&mut self.chemin_image)
                    .desired_width(ui.available_width() - 130.0)
                    .hint_text("chemin/vers/capture.png")
                    .id_source("image_edit"),
            );

            let pret = !occupe && !self.chemin_image.trim().is_empty();
            let resp = ui
                .add_enabled(pret, egui::Button::new("Reconnaître"))
                .on_hover_text("LaTeX-OCR si disponible, sinon tesseract");
            if resp.clicked() {
                self.lance_reconnaissance();
            }

            if occupe {
                ui.spinner();
            }
        });
    }

    fn ui_entree(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Entrée :");
            ui.radio_value(&mut self.source, Source::Balisage, "LaTeX");
            ui.radio_value(&mut self.source, Source::Brut, "OCR brut");
        });

        let indice = match self.source {
            Source::Balisage => "Ex: \\frac{1}{2}, \\sqrt{9}, \\sin(\\pi/4), \\int x^2 dx",
            Source::Brut => "Ex: 2 x 3, (1+2)/3, 10 - 4",
        };

        // IMPORTANT : id stable + focus contrôlé
        let resp = ui.add(
            egui::TextEdit::singleline(&mut self.entree)
                .desired_width(ui.available_width())
                .hint_text(indice)
                .id_source("entree_edit")
                .code_editor(),
        );

        if self.focus_entree {
            resp.request_focus();
            self.focus_entree = false;
        }

        // Enter évalue seulement si le champ est focus (pas de déclenchement “global”).
        let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
        if resp.has_focus() && enter {
            self.evaluer();
        }

        ui.add_space(6.0);

        ui.horizontal(|ui| {
            // Contrat: C = entrée seulement ; CLR = résultats seulement ; AC = tout
            self.bouton_action(ui, "C", "Efface seulement l’entrée", Action::ClearEntree);
            self.bouton_action(
                ui,
                "CLR",
                "Efface résultat + erreur + démarche",
                Action::ClearResultats,
            );
            self.bouton_action(ui, "AC", "Remise à zéro totale", Action::ResetTotal);

            ui.add_space(10.0);

            let eq = ui.add_sized([90.0, 30.0], egui::Button::new("Évaluer"));
            if eq.clicked() {
                self.evaluer();
            }
        });

        ui.add_space(8.0);

        match self.source {
            Source::Balisage => self.ui_touches_latex(ui),
            Source::Brut => self.ui_touches_brut(ui),
        }

        ui.add_space(8.0);

        self.ui_pave_numerique(ui);

        if !self.erreur.is_empty() {
            ui.add_space(6.0);
            ui.colored_label(ui.visuals().error_fg_color, &self.erreur);
        }
    }

    fn ui_touches_latex(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            self.bouton_insert(ui, "a/b", "\\frac{}{}", InsertKind::Commande);
            self.bouton_insert(ui, "√", "\\sqrt{}", InsertKind::Commande);
            self.bouton_insert(ui, "xⁿ", "^{}", InsertKind::Collee);
            self.bouton_insert(ui, "∫", "\\int ", InsertKind::Commande);
            self.bouton_insert(ui, "d/dx", "\\frac{d}{dx} ", InsertKind::Commande);

            ui.separator();

            self.bouton_insert(ui, "π", "\\pi", InsertKind::Commande);
            self.bouton_insert(ui, "sin", "\\sin(", InsertKind::Commande);
            self.bouton_insert(ui, "cos", "\\cos(", InsertKind::Commande);
            self.bouton_insert(ui, "tan", "\\tan(", InsertKind::Commande);
            self.bouton_insert(ui, "ln", "\\ln(", InsertKind::Commande);

            ui.separator();

            self.bouton_insert(ui, "×", "\\times", InsertKind::Op);
            self.bouton_insert(ui, "x", "x", InsertKind::Commande);
        });
    }

    fn ui_touches_brut(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            self.bouton_insert(ui, "(", "(", InsertKind::Commande);
            self.bouton_insert(ui, ")", ")", InsertKind::Collee);

            self.bouton_insert(ui, "+", "+", InsertKind::Op);
            self.bouton_insert(ui, "-", "-", InsertKind::Op);
            self.bouton_insert(ui, "x", "x", InsertKind::Op);
            self.bouton_insert(ui, "*", "*", InsertKind::Op);
        });
    }

    fn ui_pave_numerique(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("pave_numerique_ocr")
            .num_columns(4)
            .spacing([6.0, 6.0])
            .show(ui, |ui| {
                self.bouton_insert(ui, "7", "7", InsertKind::Collee);
                self.bouton_insert(ui, "8", "8", InsertKind::Collee);
                self.bouton_insert(ui, "9", "9", InsertKind::Collee);
                self.bouton_action(ui, "DEL", "Efface le dernier symbole", Action::Backspace);
                ui.end_row();

                self.bouton_insert(ui, "4", "4", InsertKind::Collee);
                self.bouton_insert(ui, "5", "5", InsertKind::Collee);
                self.bouton_insert(ui, "6", "6", InsertKind::Collee);
                self.bouton_insert(ui, "/", "/", InsertKind::Op);
                ui.end_row();

                self.bouton_insert(ui, "1", "1", InsertKind::Collee);
                self.bouton_insert(ui, "2", "2", InsertKind::Collee);
                self.bouton_insert(ui, "3", "3", InsertKind::Collee);
                self.bouton_insert(ui, ".", ".", InsertKind::Collee);
                ui.end_row();

                self.bouton_insert(ui, "0", "0", InsertKind::Collee);
                ui.label("");
                ui.label("");
                ui.label("");
                ui.end_row();
            });
    }

    /// DEL “intelligent” : retire d’un coup les motifs utiles ("\frac{", "\pi", etc.).
    fn backspace_entree(&mut self) {
        let s = self.entree.trim_end();
        let coupe = MOTIFS_DEL
            .iter()
            .find(|m| s.ends_with(*m))
            .map(|m| s.len() - m.len())
            .or_else(|| s.char_indices().last().map(|(i, _)| i))
            .unwrap_or(0);

        self.entree.truncate(coupe);
        let garde = self.entree.trim_end().len();
        self.entree.truncate(garde);
    }

    fn ui_resultats(&mut self, ui: &mut egui::Ui) {
        ui.label("Résultat :");
        Self::champ_monospace(ui, "resultat_out", &self.resultat, 2);
    }

    fn ui_demarche(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Démarche")
            .default_open(true)
            .show(ui, |ui| {
                let d = &self.demarche;
                Self::champ_demarche(ui, "Source", "demarche_source", &d.source);
                Self::champ_demarche(ui, "Type", "demarche_type", &d.type_expression);
                Self::champ_demarche(ui, "Canonique", "demarche_canon", &d.canonique);
                Self::champ_demarche(ui, "Règles", "demarche_regles", &d.regles);
                Self::champ_demarche(ui, "Moteur", "demarche_moteur", &d.moteur);
                Self::champ_demarche(ui, "Simplifiée", "demarche_simpl", &d.simplifiee);
                Self::champ_demarche(ui, "Preuve", "demarche_preuve", &d.preuve);
                if !d.echec.is_empty() {
                    Self::champ_demarche(ui, "Échec", "demarche_echec", &d.echec);
                }
            });
    }

    fn champ_demarche(ui: &mut egui::Ui, titre: &str, id: &str, contenu: &str) {
        ui.add_space(4.0);
        ui.label(format!("{titre} :"));
        Self::champ_monospace(ui, id, contenu, 1);
    }

    fn champ_monospace(ui: &mut egui::Ui, id: &str, contenu: &str, rows: usize) {
        // Lecture seule, sans TextEdit interactif.
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.push_id(id, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.set_min_height(
                        rows as f32 * ui.text_style_height(&egui::TextStyle::Monospace),
                    );
                    ui.monospace(contenu);
                });
            });
    }

    fn bouton_action(&mut self, ui: &mut egui::Ui, label: &str, tip: &str, action: Action) {
        let resp = ui
            .add_sized([56.0, 30.0], egui::Button::new(label))
            .on_hover_text(tip);

        if resp.clicked() {
            match action {
                Action::ClearEntree => self.clear_entree(),
                Action::ClearResultats => self.clear_resultats(),
                Action::ResetTotal => self.reset_total(),
                Action::Backspace => self.backspace_entree(),
            }
            self.focus_entree = true;
        }
    }

    fn bouton_insert(&mut self, ui: &mut egui::Ui, label: &str, to_insert: &str, kind: InsertKind) {
        let resp = ui.add_sized([46.0, 28.0], egui::Button::new(label));
        if resp.clicked() {
            self.insere(to_insert, kind);
            self.focus_entree = true;
        }
    }

    fn insere(&mut self, to_insert: &str, kind: InsertKind) {
        match kind {
            InsertKind::Collee => {
                // chiffres, ")" : pas d’espaces auto
                self.entree.push_str(to_insert);
            }
            InsertKind::Commande => {
                // espace si juste avant c’est un chiffre, une lettre ou une fermeture
                let last = self.entree.chars().next_back();
                if let Some(c) = last {
                    if c.is_ascii_alphanumeric() || c == ')' || c == '}' {
                        self.entree.push(' ');
                    }
                }
                self.entree.push_str(to_insert);
            }
            InsertKind::Op => {
                let garde = self.entree.trim_end().len();
                self.entree.truncate(garde);
                if !self.entree.is_empty() {
                    self.entree.push(' ');
                }
                self.entree.push_str(to_insert);
                self.entree.push(' ');
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Action {
    ClearEntree,
    ClearResultats,
    ResetTotal,
    Backspace,
}

#[derive(Clone, Copy, Debug)]
enum InsertKind {
    Collee,
    Commande,
    Op,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avec(entree: &str) -> AppCalc {
        let mut a = AppCalc::default();
        a.entree = entree.to_string();
        a
    }

    #[test]
    fn del_retire_les_commandes_entieres() {
        let mut a = avec("2 \\times \\pi");
        a.backspace_entree();
        assert_eq!(a.entree, "2 \\times");

        let mut a = avec("\\frac{");
        a.backspace_entree();
        assert_eq!(a.entree, "");

        let mut a = avec("12  ");
        a.backspace_entree();
        assert_eq!(a.entree, "1");

        let mut a = avec("");
        a.backspace_entree();
        assert_eq!(a.entree, "");
    }

    #[test]
    fn insertion_espacee() {
        let mut a = avec("2");
        a.insere("\\pi", InsertKind::Commande);
        assert_eq!(a.entree, "2 \\pi");

        a.insere("+", InsertKind::Op);
        a.insere("1", InsertKind::Collee);
        assert_eq!(a.entree, "2 \\pi + 1");
    }
}
