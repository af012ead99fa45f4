// src/noyau/arith.rs
//
// Évaluateur arithmétique de base (sortie du nettoyage OCR).
// Domaine : réels f64, + - * / %, moins/plus unaire, parenthèses. Ni fonctions ni variables.
//
// tokenize -> shunting-yard -> RPN -> pile f64
//
// NOTE: le moins unaire est un opérateur préfixe à part entière (Neg), de priorité
// supérieure à * / % : "2*-3" => 2 3 Neg *.

use log::debug;

use super::erreur::EchecEvaluation;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Jeton {
    Nombre(f64),
    Plus,
    Moins,
    Neg,
    Fois,
    Div,
    Mod,
    LPar,
    RPar,
}

fn precedence(t: Jeton) -> i32 {
    match t {
        Jeton::Plus | Jeton::Moins => 1,
        Jeton::Fois | Jeton::Div | Jeton::Mod => 2,
        Jeton::Neg => 3,
        _ => 0,
    }
}

fn jetons(s: &str) -> Result<Vec<Jeton>, String> {
    let chars: Vec<char> = s.chars().collect();
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let t = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '+' => Jeton::Plus,
            '-' => Jeton::Moins,
            '*' => Jeton::Fois,
            '/' => Jeton::Div,
            '%' => Jeton::Mod,
            '(' => Jeton::LPar,
            ')' => Jeton::RPar,
            c if c.is_ascii_digit() || c == '.' => {
                let debut = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let lit: String = chars[debut..i].iter().collect();
                if lit.matches('.').count() > 1 || lit == "." {
                    return Err(format!("nombre invalide: {lit}"));
                }
                let v = lit
                    .parse::<f64>()
                    .map_err(|_| format!("nombre invalide: {lit}"))?;
                out.push(Jeton::Nombre(v));
                continue;
            }
            autre => return Err(format!("caractère inattendu: '{autre}'")),
        };
        out.push(t);
        i += 1;
    }

    Ok(out)
}

fn vers_rpn(entree: &[Jeton]) -> Result<Vec<Jeton>, String> {
    let mut out: Vec<Jeton> = Vec::with_capacity(entree.len());
    let mut ops: Vec<Jeton> = Vec::new();
    let mut prev_was_value = false;

    for &tok in entree {
        match tok {
            Jeton::Nombre(_) => {
                if prev_was_value {
                    return Err("deux valeurs sans opérateur".into());
                }
                out.push(tok);
                prev_was_value = true;
            }

            Jeton::LPar => {
                if prev_was_value {
                    return Err("multiplication implicite non supportée".into());
                }
                ops.push(tok);
                prev_was_value = false;
            }

            Jeton::RPar => {
                let mut ouvrante = false;
                while let Some(top) = ops.pop() {
                    if top == Jeton::LPar {
                        ouvrante = true;
                        break;
                    }
                    out.push(top);
                }
                if !ouvrante {
                    return Err("parenthèse fermante sans ouvrante".into());
                }
                prev_was_value = true;
            }

            // formes unaires : préfixe, rien à dépiler
            Jeton::Moins | Jeton::Plus if !prev_was_value => {
                if tok == Jeton::Moins {
                    ops.push(Jeton::Neg);
                }
            }

            Jeton::Plus | Jeton::Moins | Jeton::Fois | Jeton::Div | Jeton::Mod => {
                if !prev_was_value {
                    return Err("opérateur sans opérande gauche".into());
                }
                while let Some(&top) = ops.last() {
                    if top == Jeton::LPar || precedence(top) < precedence(tok) {
                        break;
                    }
                    out.push(top);
                    ops.pop();
                }
                ops.push(tok);
                prev_was_value = false;
            }

            Jeton::Neg => return Err("jeton interne inattendu".into()),
        }
    }

    while let Some(op) = ops.pop() {
        if op == Jeton::LPar {
            return Err("parenthèses non fermées".into());
        }
        out.push(op);
    }

    Ok(out)
}

fn calcule_rpn(rpn: &[Jeton]) -> Result<f64, String> {
    let mut pile: Vec<f64> = Vec::with_capacity(rpn.len());

    for &tok in rpn {
        match tok {
            Jeton::Nombre(v) => pile.push(v),
            Jeton::Neg => {
                let a = pile.pop().ok_or("expression invalide")?;
                pile.push(-a);
            }
            Jeton::Plus | Jeton::Moins | Jeton::Fois | Jeton::Div | Jeton::Mod => {
                let b = pile.pop().ok_or("expression invalide")?;
                let a = pile.pop().ok_or("expression invalide")?;
                let r = match tok {
                    Jeton::Plus => a + b,
                    Jeton::Moins => a - b,
                    Jeton::Fois => a * b,
                    Jeton::Div => {
                        if b == 0.0 {
                            return Err("division par zéro".into());
                        }
                        a / b
                    }
                    _ => {
                        if b == 0.0 {
                            return Err("modulo par zéro".into());
                        }
                        a % b
                    }
                };
                pile.push(r);
            }
            Jeton::LPar | Jeton::RPar => return Err("parenthèse inattendue en RPN".into()),
        }
    }

    if pile.len() != 1 {
        return Err("expression invalide".into());
    }
    let v = pile.pop().unwrap_or(f64::NAN);
    if !v.is_finite() {
        return Err("résultat non fini".into());
    }
    Ok(v)
}

/// Évalue une expression arithmétique nettoyée.
/// - vide => Analyse
/// - syntaxe / parenthèses / division par zéro / non fini => Evaluateur
pub fn evaluer_arithmetique(expr: &str) -> Result<f64, EchecEvaluation> {
    let s = expr.trim();
    if s.is_empty() {
        return Err(EchecEvaluation::Analyse("expression vide".into()));
    }

    let calcul = jetons(s)
        .and_then(|j| vers_rpn(&j))
        .and_then(|rpn| calcule_rpn(&rpn));

    match calcul {
        Ok(v) => {
            debug!("arithmétique: {s:?} = {v}");
            Ok(v)
        }
        Err(msg) => {
            debug!("arithmétique: {s:?} refusée ({msg})");
            Err(EchecEvaluation::Evaluateur(format!("{msg} dans {s:?}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{evaluer_arithmetique, vers_rpn, Jeton};
    use crate::noyau::erreur::EchecEvaluation;

    fn ok(s: &str) -> f64 {
        evaluer_arithmetique(s).unwrap_or_else(|e| panic!("{s:?}: {e}"))
    }

    fn assert_evaluateur(s: &str) {
        match evaluer_arithmetique(s) {
            Err(EchecEvaluation::Evaluateur(_)) => {}
            autre => panic!("{s:?}: attendu Evaluateur, obtenu {autre:?}"),
        }
    }

    #[test]
    fn operations_de_base() {
        assert_eq!(ok("2*3"), 6.0);
        assert_eq!(ok("1+2*3"), 7.0);
        assert_eq!(ok("(1+2)*3"), 9.0);
        assert_eq!(ok("7/2"), 3.5);
        assert_eq!(ok("7%3"), 1.0);
        assert_eq!(ok("1.5-0.5"), 1.0);
        assert_eq!(ok(".5+.5"), 1.0);
    }

    #[test]
    fn associativite_gauche() {
        assert_eq!(ok("10-4-3"), 3.0);
        assert_eq!(ok("100/10/5"), 2.0);
    }

    #[test]
    fn moins_unaire() {
        assert_eq!(ok("-3+5"), 2.0);
        assert_eq!(ok("2*-3"), -6.0);
        assert_eq!(ok("-(2+3)"), -5.0);
        assert_eq!(ok("--4"), 4.0);
        assert_eq!(ok("+4"), 4.0);
        assert_eq!(ok("2--3"), 5.0);
    }

    #[test]
    fn chiffres_colles_valeur_litterale() {
        // "5==3" nettoyé => "53" : on accepte la valeur concaténée
        assert_eq!(ok("53"), 53.0);
    }

    #[test]
    fn vide_est_echec_analyse() {
        assert!(matches!(
            evaluer_arithmetique("  "),
            Err(EchecEvaluation::Analyse(_))
        ));
    }

    #[test]
    fn erreurs_evaluateur() {
        assert_evaluateur("1/0");
        assert_evaluateur("5%0");
        assert_evaluateur("(1+2");
        assert_evaluateur("1+2)");
        assert_evaluateur("2+");
        assert_evaluateur("*2");
        assert_evaluateur("()");
        assert_evaluateur("2(3)");
        assert_evaluateur("1.2.3");
        assert_evaluateur("sqrt(4)");
    }

    #[test]
    fn neg_en_entree_refuse_sans_panique() {
        // Neg n’est produit que par vers_rpn lui-même
        for entree in [vec![Jeton::Neg], vec![Jeton::Nombre(1.0), Jeton::Neg]] {
            match vers_rpn(&entree) {
                Err(msg) => assert_eq!(msg, "jeton interne inattendu"),
                Ok(rpn) => panic!("attendu une erreur, obtenu {} jetons", rpn.len()),
            }
        }
    }
}
