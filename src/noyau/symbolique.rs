//! Noyau — adaptateur du moteur symbolique
//!
//! texte canonique -> jetons -> RPN -> Expr -> simplify -> trig spéciale
//!        -> canon (jusqu’à stabilité) -> valeur numérique OU forme symbolique
//!
//! Les refus du parse sont ramenés à un seul message (MSG_INTERPRETATION) ;
//! le détail part dans les journaux.

use std::fmt;

use log::debug;

use super::erreur::{EchecEvaluation, MSG_INTERPRETATION};
use super::expr::Expr;
use super::format::format_canonique;
use super::numerique::{valeur_approchee, Obstacle};
use super::rpn::{analyser_rpn, from_rpn, profondeur};
use super::trig::applique_trig_speciale;

/// Passes simplify+canon max après la première canonicalisation.
const MAX_PASSES: usize = 4;

/// Garde-fous : simplify/canon/format descendent l’arbre récursivement.
pub(crate) const MAX_PROFONDEUR: usize = 128;
const MAX_JETONS: usize = 200_000;

/// Résultat d’une évaluation réussie.
#[derive(Clone, Debug, PartialEq)]
pub enum Valeur {
    Numerique(f64),
    Symbolique(String),
}

impl fmt::Display for Valeur {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // -0 => 0
            Valeur::Numerique(v) if *v == 0.0 => f.write_str("0"),
            Valeur::Numerique(v) => write!(f, "{v}"),
            Valeur::Symbolique(s) => f.write_str(s),
        }
    }
}

/// Valeur + forme simplifiée + preuve (angles spéciaux reconnus).
#[derive(Clone, Debug, PartialEq)]
pub struct ResultatSymbolique {
    pub simplifiee: String,
    pub valeur: Valeur,
    pub preuve: Vec<String>,
}

pub fn evaluer_symbolique(expr: &str) -> Result<Valeur, EchecEvaluation> {
    evaluer_symbolique_detaille(expr).map(|r| r.valeur)
}

pub fn evaluer_symbolique_detaille(expr: &str) -> Result<ResultatSymbolique, EchecEvaluation> {
    let s = expr.trim();
    if s.is_empty() {
        return Err(EchecEvaluation::Analyse(MSG_INTERPRETATION.into()));
    }

    let refus = |e: String| {
        debug!("moteur symbolique : refus de {s:?} ({e})");
        EchecEvaluation::Analyse(MSG_INTERPRETATION.into())
    };

    let rpn = analyser_rpn(s).map_err(refus)?;
    let p = profondeur(&rpn);
    if rpn.len() > MAX_JETONS || p > MAX_PROFONDEUR {
        debug!(
            "moteur symbolique : {} jetons, profondeur {p} (max {MAX_PROFONDEUR})",
            rpn.len()
        );
        return Err(EchecEvaluation::Evaluateur("expression trop grande".into()));
    }
    let e0 = from_rpn(&rpn).map_err(refus)?;

    let mut preuve = Vec::new();
    let e1 = applique_trig_speciale(&e0.simplify(), &mut preuve);
    let forme = stabilise(e1.canon());

    if matches!(forme, Expr::Indefini) {
        return Err(EchecEvaluation::Evaluateur(format!("valeur indéfinie pour {s:?}")));
    }

    let simplifiee = format_canonique(&forme);
    let valeur = if forme.est_symbolique() {
        Valeur::Symbolique(simplifiee.clone())
    } else {
        match valeur_approchee(&forme) {
            Ok(v) if v.is_finite() => Valeur::Numerique(v),
            Ok(v) => {
                return Err(EchecEvaluation::Evaluateur(format!(
                    "résultat non fini ({v}) pour {simplifiee}"
                )))
            }
            Err(Obstacle::Indefini) => {
                return Err(EchecEvaluation::Evaluateur(format!("valeur indéfinie pour {s:?}")))
            }
            Err(Obstacle::Variable(_) | Obstacle::Appel(_)) => Valeur::Symbolique(simplifiee.clone()),
        }
    };

    debug!("moteur symbolique : {s:?} -> {simplifiee} = {valeur}");
    Ok(ResultatSymbolique {
        simplifiee,
        valeur,
        preuve,
    })
}

/// simplify + canon jusqu’au point fixe (borné).
fn stabilise(mut e: Expr) -> Expr {
    for _ in 0..MAX_PASSES {
        let suivant = e.clone().simplify().canon();
        if suivant == e {
            break;
        }
        e = suivant;
    }
    e
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valeur(s: &str) -> Valeur {
        evaluer_symbolique(s).unwrap_or_else(|e| panic!("evaluer_symbolique({s:?}) : {e}"))
    }

    fn texte(s: &str) -> String {
        valeur(s).to_string()
    }

    #[test]
    fn fraction_et_racine() {
        assert_eq!(valeur("(1)/(2)"), Valeur::Numerique(0.5));
        assert_eq!(texte("(1)/(2)"), "0.5");
        assert_eq!(texte("sqrt(9)"), "3");
        assert_eq!(texte("2*3"), "6");
        assert_eq!(texte("53"), "53");
    }

    #[test]
    fn trig_exacte_puis_numerique() {
        assert_eq!(texte("sin(pi/6)"), "0.5");
        assert_eq!(texte("cos(pi)"), "-1");
        assert_eq!(texte("sin(0)"), "0");
        let r = evaluer_symbolique_detaille("sin(pi/4)").unwrap();
        assert_eq!(r.simplifiee, "sqrt(2)/2");
        assert_eq!(r.preuve.len(), 1);
        match r.valeur {
            Valeur::Numerique(v) => assert!((v - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12),
            autre => panic!("attendu numérique, obtenu {autre:?}"),
        }
    }

    #[test]
    fn formes_symboliques() {
        assert_eq!(
            valeur("derivative(x^2, x)"),
            Valeur::Symbolique("derivative(x^2, x)".into())
        );
        assert_eq!(
            valeur("integral(x^(2), x, 0, 1)"),
            Valeur::Symbolique("integral(x^2, x, 0, 1)".into())
        );
        assert_eq!(valeur("x + x"), Valeur::Symbolique("2*x".into()));
        assert_eq!(valeur("alpha*2"), Valeur::Symbolique("2*alpha".into()));
    }

    #[test]
    fn refus_du_parse() {
        for s in ["sin()", "", "   ", "1 +", "(1", "sin x", "7%3"] {
            assert_eq!(
                evaluer_symbolique(s),
                Err(EchecEvaluation::Analyse(MSG_INTERPRETATION.into())),
                "s={s:?}"
            );
        }
    }

    #[test]
    fn erreurs_d_evaluation() {
        for s in ["tan(pi/2)", "1/0", "sqrt(0-4)", "csc(0)", "log(0)"] {
            let r = evaluer_symbolique(s);
            assert!(
                matches!(r, Err(EchecEvaluation::Evaluateur(_))),
                "s={s:?} r={r:?}"
            );
        }
    }

    #[test]
    fn chaines_longues_refusees_sans_pile() {
        let trop_grande = Err(EchecEvaluation::Evaluateur("expression trop grande".into()));

        let somme = |n: usize| vec!["1"; n].join("+");
        assert_eq!(texte(&somme(100)), "100");
        assert_eq!(evaluer_symbolique(&somme(MAX_PROFONDEUR + 1)), trop_grande);
        assert_eq!(evaluer_symbolique(&somme(50_000)), trop_grande);

        let moins = |n: usize| format!("{}1", "-".repeat(n));
        assert_eq!(texte(&moins(100)), "1");
        assert_eq!(evaluer_symbolique(&moins(20_000)), trop_grande);

        // le refus du parse passe avant la taille
        assert!(matches!(
            evaluer_symbolique(&format!("{}+", somme(50_000))),
            Err(EchecEvaluation::Analyse(_))
        ));
    }

    #[test]
    fn zero_negatif_affiche_zero() {
        assert_eq!(Valeur::Numerique(-0.0).to_string(), "0");
        assert_eq!(Valeur::Numerique(2.5).to_string(), "2.5");
    }
}
