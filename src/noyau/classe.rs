// src/noyau/classe.rs
//
// Classement (informatif) d’un balisage LaTeX brut.
// Premier motif trouvé gagne :
// Integrale > Derivee > Fraction > Racine > Trigonometrique > Logarithmique > Algebrique

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeExpression {
    Inconnu,
    Algebrique,
    Integrale,
    Derivee,
    Fraction,
    Racine,
    Trigonometrique,
    Logarithmique,
}

impl fmt::Display for TypeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TypeExpression::Inconnu => "inconnu",
            TypeExpression::Algebrique => "algébrique",
            TypeExpression::Integrale => "intégrale",
            TypeExpression::Derivee => "dérivée",
            TypeExpression::Fraction => "fraction",
            TypeExpression::Racine => "racine",
            TypeExpression::Trigonometrique => "trigonométrique",
            TypeExpression::Logarithmique => "logarithmique",
        };
        f.write_str(s)
    }
}

static RE_DERIVEE: OnceLock<Regex> = OnceLock::new();
static RE_TRIG: OnceLock<Regex> = OnceLock::new();
static RE_LOG: OnceLock<Regex> = OnceLock::new();

fn re(cellule: &'static OnceLock<Regex>, motif: &str) -> &'static Regex {
    cellule.get_or_init(|| Regex::new(motif).expect("motif regex valide"))
}

/// Total : toute entrée reçoit un type (Inconnu si vide).
pub fn classifier(balisage: &str) -> TypeExpression {
    if balisage.trim().is_empty() {
        return TypeExpression::Inconnu;
    }

    let derivee = re(&RE_DERIVEE, r"\\frac\s*\{\s*d\s*\}\s*\{\s*d\s*[a-zA-Z]\s*\}");
    let trig = re(&RE_TRIG, r"sin|cos|tan|sec|csc|cot");
    let log = re(&RE_LOG, r"log|ln|exp");

    if balisage.contains("\\int") {
        TypeExpression::Integrale
    } else if derivee.is_match(balisage) || balisage.contains("derivative") {
        TypeExpression::Derivee
    } else if balisage.contains("\\frac") {
        TypeExpression::Fraction
    } else if balisage.contains("\\sqrt") {
        TypeExpression::Racine
    } else if trig.is_match(balisage) {
        TypeExpression::Trigonometrique
    } else if log.is_match(balisage) {
        TypeExpression::Logarithmique
    } else {
        TypeExpression::Algebrique
    }
}

#[cfg(test)]
mod tests {
    use super::{classifier, TypeExpression as T};

    #[test]
    fn vide_inconnu() {
        assert_eq!(classifier(""), T::Inconnu);
        assert_eq!(classifier(" \t\n"), T::Inconnu);
    }

    #[test]
    fn priorites() {
        assert_eq!(classifier("\\int_0^1 \\frac{1}{x} dx"), T::Integrale);
        assert_eq!(classifier("\\frac{d}{dx} \\sin{x}"), T::Derivee);
        assert_eq!(classifier("\\frac{d}{dt} t^2"), T::Derivee);
        assert_eq!(classifier("derivative(x^2, x)"), T::Derivee);
        assert_eq!(classifier("\\frac{\\sqrt{2}}{2}"), T::Fraction);
        assert_eq!(classifier("\\sqrt{\\ln{2}}"), T::Racine);
        assert_eq!(classifier("\\cos{x} + \\log{x}"), T::Trigonometrique);
        assert_eq!(classifier("\\exp{2}"), T::Logarithmique);
        assert_eq!(classifier("x^2 + 1"), T::Algebrique);
    }

    #[test]
    fn integrale_domine_toujours() {
        for s in ["\\int x", "\\frac{d}{dx}\\int x", "\\sqrt{\\int}", "\\sin \\int"] {
            assert_eq!(classifier(s), T::Integrale, "s={s:?}");
        }
    }
}
