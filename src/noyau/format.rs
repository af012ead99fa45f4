// src/noyau/format.rs
//
// Affichage EXACT de la forme simplifiée, dans la grammaire canonique (re-parsable) :
// sqrt(2)/2, pi/2, -x + 1, 2*x^2, derivative(x^2, x)
//
// Parenthèses minimales selon la priorité :
//   somme (1) < produit (2) < puissance (4) < atome (5)

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::expr::Expr;

const SOMME: u8 = 1;
const PRODUIT: u8 = 2;
const PUISSANCE: u8 = 4;
const ATOME: u8 = 5;

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_canonique(self))
    }
}

/// Texte canonique d’une expression simplifiée.
pub fn format_canonique(e: &Expr) -> String {
    ecrit(e).0
}

fn entoure(s: String, prec: u8, min: u8) -> String {
    if prec < min {
        format!("({s})")
    } else {
        s
    }
}

/// Opérande droit : parenthèses aussi s’il commence par un signe (a - (-b)).
fn operande_droit(e: &Expr, min: u8) -> String {
    let (s, p) = ecrit(e);
    if s.starts_with('-') {
        format!("({s})")
    } else {
        entoure(s, p, min)
    }
}

fn format_rat(r: &BigRational) -> (String, u8) {
    let (n, d) = (r.numer(), r.denom());
    if d.is_one() {
        let p = if n.is_negative() { PRODUIT } else { ATOME };
        (format!("{n}"), p)
    } else {
        (format!("{n}/{d}"), PRODUIT)
    }
}

/// coeff·reste avec coeff = p/q : reste/q, -reste/q, p*reste/q
fn format_coeff(c: &BigRational, reste: &Expr) -> String {
    let (p, q) = (c.numer(), c.denom());
    let (s, prec) = ecrit(reste);
    let r = entoure(s, prec, PRODUIT);

    let num = if p.is_one() {
        r
    } else if *p == -BigInt::one() {
        format!("-{r}")
    } else {
        format!("{p}*{r}")
    };

    if q.is_one() {
        num
    } else {
        format!("{num}/{q}")
    }
}

/// Produit `Rat(c) * reste` (canon place le rationnel devant).
fn as_coeff_mul(e: &Expr) -> Option<(&BigRational, Expr)> {
    let Expr::Mul(a, b) = e else { return None };

    // descendre à gauche jusqu’au premier facteur
    if let Expr::Rat(c) = a.as_ref() {
        return Some((c, (**b).clone()));
    }
    let (c, gauche) = as_coeff_mul(a)?;
    Some((c, Expr::Mul(Box::new(gauche), b.clone())))
}

fn ecrit(e: &Expr) -> (String, u8) {
    use Expr::*;

    match e {
        Indefini => ("indefini".to_string(), ATOME),
        Rat(r) => format_rat(r),
        Pi => ("pi".to_string(), ATOME),
        Var(s) => (s.clone(), ATOME),

        Sqrt(x) => (format!("sqrt({})", ecrit(x).0), ATOME),
        Fonc(f, x) => (format!("{}({})", f.nom(), ecrit(x).0), ATOME),
        Appel(nom, args) => {
            let a: Vec<String> = args.iter().map(|x| ecrit(x).0).collect();
            (format!("{nom}({})", a.join(", ")), ATOME)
        }

        PowInt(x, n) => {
            let (s, p) = ecrit(x);
            let base = if s.starts_with('-') { format!("({s})") } else { entoure(s, p, ATOME) };
            let exp = if *n < 0 { format!("({n})") } else { n.to_string() };
            (format!("{base}^{exp}"), PUISSANCE)
        }
        Puiss(x, y) => {
            let (s, p) = ecrit(x);
            let base = if s.starts_with('-') { format!("({s})") } else { entoure(s, p, ATOME) };
            let (t, q) = ecrit(y);
            let exp = if t.starts_with('-') { format!("({t})") } else { entoure(t, q, ATOME) };
            (format!("{base}^{exp}"), PUISSANCE)
        }

        Mul(a, b) => {
            if let Some((c, reste)) = as_coeff_mul(e) {
                return (format_coeff(c, &reste), PRODUIT);
            }
            let (sa, pa) = ecrit(a);
            let sb = operande_droit(b, PRODUIT);
            (format!("{}*{sb}", entoure(sa, pa, PRODUIT)), PRODUIT)
        }

        Div(a, b) => {
            let (sa, pa) = ecrit(a);
            let sb = operande_droit(b, PUISSANCE);
            (format!("{}/{sb}", entoure(sa, pa, PRODUIT)), PRODUIT)
        }

        Add(a, b) => {
            let sb = operande_droit(b, SOMME);
            (format!("{} + {sb}", ecrit(a).0), SOMME)
        }

        // 0 - x => -x, sinon a - b
        Sub(a, b) => {
            if matches!(a.as_ref(), Rat(r) if r.is_zero()) {
                let (sb, pb) = ecrit(b);
                let sb = if sb.starts_with('-') { format!("({sb})") } else { entoure(sb, pb, PRODUIT) };
                (format!("-{sb}"), PRODUIT)
            } else {
                let sb = operande_droit(b, PRODUIT);
                (format!("{} - {sb}", ecrit(a).0), SOMME)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::format_canonique;
    use crate::noyau::expr::Expr;
    use crate::noyau::rpn::analyser;

    fn f(s: &str) -> String {
        format_canonique(&analyser(s).unwrap_or_else(|e| panic!("{s:?}: {e}")))
    }

    fn fc(s: &str) -> String {
        format_canonique(&analyser(s).unwrap().simplify().canon())
    }

    #[test]
    fn atomes_et_appels() {
        assert_eq!(f("pi"), "pi");
        assert_eq!(f("sqrt(2)"), "sqrt(2)");
        assert_eq!(f("derivative(x^2, x)"), "derivative(x^2, x)");
        assert_eq!(f("integral(x^2,x,0,1)"), "integral(x^2, x, 0, 1)");
        assert_eq!(format_canonique(&Expr::Indefini), "indefini");
    }

    #[test]
    fn parentheses_minimales() {
        assert_eq!(f("(a + b)*c"), "(a + b)*c");
        assert_eq!(f("a - (b - c)"), "a - (b - c)");
        assert_eq!(f("a/(b*c)"), "a/(b*c)");
        assert_eq!(f("(a*b)/c"), "a*b/c");
        assert_eq!(f("(x+1)^2"), "(x + 1)^2");
        assert_eq!(f("(-x)^2"), "(-x)^2");
        assert_eq!(f("x^(-2)"), "x^(-2)");
        assert_eq!(f("8^(1/3)"), "8^(1/3)");
    }

    #[test]
    fn coefficients() {
        assert_eq!(fc("sqrt(2)/2"), "sqrt(2)/2");
        assert_eq!(fc("pi/2"), "pi/2");
        assert_eq!(fc("3*pi/2"), "3*pi/2");
        assert_eq!(fc("-x/3"), "-x/3");
        assert_eq!(fc("1/2"), "1/2");
        assert_eq!(fc("-1/2"), "-1/2");
    }

    #[test]
    fn reparsable() {
        for s in ["x^2 + 2*x + 1", "sqrt(2)/2 - pi", "-(x + 1)/2", "sin(x)^2", "2^x"] {
            let once = fc(s);
            let twice = fc(&once);
            assert_eq!(once, twice, "s={s:?}");
        }
    }
}
