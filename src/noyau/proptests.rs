//! Tests de propriétés (proptest) : alphabet du nettoyage, invariants de la normalisation,
//! priorité du classement, accord des deux évaluateurs.

use proptest::prelude::*;

use super::arith::evaluer_arithmetique;
use super::classe::{classifier, TypeExpression};
use super::erreur::EchecEvaluation;
use super::latex::{est_equilibre, normaliser};
use super::nettoyage::nettoyer;
use super::orchestre::executer;
use super::source::TexteReconnu;
use super::symbolique::{evaluer_symbolique, Valeur};

const MORCEAUX: &[&str] = &[
    "\\frac{", "}{", "}", "{", "\\sqrt{", "\\int_{0}^{1}", "\\int", "x", "^{2}", "_{1}", "\\sin",
    "\\cos{", "\\log", "\\pi", "\\theta", "+", "-", "\\cdot", "(", ")", "\\left(", "\\right)",
    "dx", "\\,", "$", "2", "7", " ", "\\frac{d}{dx}", "\\mathrm{d}", "\\sum", "\\\\",
];

fn balisage() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(MORCEAUX), 0..14).prop_map(|v| v.concat())
}

fn petit_entier() -> impl Strategy<Value = i64> {
    -1000i64..1000i64
}

proptest! {
    #[test]
    fn nettoyage_reste_dans_l_alphabet(s in ".*") {
        let propre = nettoyer(&s);
        prop_assert!(propre.chars().all(|c| c.is_ascii_digit() || "+-*/%.()".contains(c)));
        // déjà propre => inchangé
        prop_assert_eq!(nettoyer(&propre), propre.clone());
    }

    #[test]
    fn normalisation_sans_barre_et_equilibree(b in balisage()) {
        let canon = normaliser(&b);
        if !canon.is_empty() {
            prop_assert!(!canon.contains('\\'), "{:?} -> {:?}", b, canon);
            prop_assert!(est_equilibre(&canon), "{:?} -> {:?}", b, canon);
            prop_assert_eq!(normaliser(&canon), canon);
        }
    }

    #[test]
    fn integrale_toujours_prioritaire(a in ".*", b in balisage()) {
        let s = format!("{a}\\int{b}");
        prop_assert_eq!(classifier(&s), TypeExpression::Integrale);
    }

    #[test]
    fn classement_total(s in "[a-z0-9+*/^ ]{0,20}") {
        let t = classifier(&s);
        prop_assert_eq!(t == TypeExpression::Inconnu, s.trim().is_empty());
    }

    #[test]
    fn blancs_seuls_entree_vide(s in "[ \t\r\n]*") {
        for t in [TexteReconnu::balisage(s.clone()), TexteReconnu::brut(s.clone())] {
            prop_assert_eq!(executer(&t).resultat, Err(EchecEvaluation::EntreeVide));
        }
    }

    #[test]
    fn arithmetique_et_symbolique_d_accord(a in petit_entier(), b in petit_entier(), c in petit_entier()) {
        let expr = format!("{a}+{b}*({c}-{a})");
        let attendu = (a + b * (c - a)) as f64;
        prop_assert_eq!(evaluer_arithmetique(&expr), Ok(attendu));
        prop_assert_eq!(evaluer_symbolique(&expr), Ok(Valeur::Numerique(attendu)));
    }
}
