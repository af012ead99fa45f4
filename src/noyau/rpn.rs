// src/noyau/rpn.rs
//
// Shunting-yard -> RPN -> AST
//
// Règles:
// - Ident(name):
//    - si est_fonction(name) => appel ; parenthèses obligatoires ; arité comptée par virgules
//    - sinon => variable (Expr::Var)
// - Moins unaire: opérateur préfixe Neg (sous ^ : -x^2 = -(x^2), 2^-1 accepté)
// - Plus unaire: ignoré
// - Appel vide `name()` : refusé
//
// NOTE: les fonctions restent sur la pile d’opérateurs et sortent à leur parenthèse fermante,
// sous la forme Tok::Appel(name, arité).

use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};

use super::expr::{Expr, Fonction};
use super::jetons::{est_fonction, Tok};

/// Profondeur max de parenthèses.
const MAX_IMBRICATION: usize = 256;

fn precedence(t: &Tok) -> i32 {
    match t {
        Tok::Plus | Tok::Minus => 1,
        Tok::Star | Tok::Slash => 2,
        Tok::Neg => 3,
        Tok::Caret => 4,
        _ => 0,
    }
}

fn is_right_associative(t: &Tok) -> bool {
    matches!(t, Tok::Caret)
}

/// Un '(' ouvert : simple groupe, ou liste d’arguments (virgules comptées).
enum Ouvrante {
    Groupe,
    Appel { virgules: usize },
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   tokens: [Ident("sin"), LPar, Pi, Slash, Num(2), RPar]
///   rpn:    [Pi, Num(2), Slash, Appel("sin", 1)]
pub fn to_rpn(tokens: &[Tok]) -> Result<Vec<Tok>, String> {
    let mut out: Vec<Tok> = Vec::new();
    let mut ops: Vec<Tok> = Vec::new();
    let mut ouvertes: Vec<Ouvrante> = Vec::new();

    // “valeur” = un atome ou une expression fermée.
    let mut prev_was_value = false;
    // l’identifiant précédent était une fonction : le '(' qui suit ouvre ses arguments
    let mut attend_arguments = false;

    for tok in tokens.iter().cloned() {
        if attend_arguments && tok != Tok::LPar {
            return Err("fonction sans parenthèses".into());
        }

        match tok {
            Tok::Num(_) | Tok::Pi => {
                if prev_was_value {
                    return Err("deux valeurs sans opérateur".into());
                }
                out.push(tok);
                prev_was_value = true;
            }

            Tok::Ident(name) => {
                if prev_was_value {
                    return Err("deux valeurs sans opérateur".into());
                }
                if est_fonction(&name) {
                    ops.push(Tok::Ident(name));
                    attend_arguments = true;
                    prev_was_value = false;
                } else {
                    out.push(Tok::Ident(name));
                    prev_was_value = true;
                }
            }

            Tok::LPar => {
                if ouvertes.len() >= MAX_IMBRICATION {
                    return Err("imbrication trop profonde".into());
                }
                ouvertes.push(if attend_arguments {
                    Ouvrante::Appel { virgules: 0 }
                } else {
                    Ouvrante::Groupe
                });
                ops.push(tok);
                attend_arguments = false;
                prev_was_value = false;
            }

            Tok::Comma => {
                if !prev_was_value {
                    return Err("argument vide".into());
                }
                depile_jusqua_ouvrante(&mut ops, &mut out);
                match ouvertes.last_mut() {
                    Some(Ouvrante::Appel { virgules }) => *virgules += 1,
                    _ => return Err("virgule hors d’un appel".into()),
                }
                prev_was_value = false;
            }

            Tok::RPar => {
                let ouvrante = ouvertes.pop().ok_or("parenthèse fermante sans ouvrante")?;
                if !prev_was_value {
                    return Err(match ouvrante {
                        Ouvrante::Appel { virgules: 0 } => "appel de fonction vide".into(),
                        Ouvrante::Appel { .. } => "argument vide".into(),
                        Ouvrante::Groupe => "parenthèses vides".into(),
                    });
                }

                depile_jusqua_ouvrante(&mut ops, &mut out);
                // retire le '('
                ops.pop();

                if let Ouvrante::Appel { virgules } = ouvrante {
                    match ops.pop() {
                        Some(Tok::Ident(name)) => out.push(Tok::Appel(name, virgules + 1)),
                        _ => return Err("appel sans nom".into()),
                    }
                }

                prev_was_value = true;
            }

            // formes unaires : préfixe, rien à dépiler
            Tok::Minus | Tok::Plus if !prev_was_value => {
                if tok == Tok::Minus {
                    ops.push(Tok::Neg);
                }
            }

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Caret => {
                if !prev_was_value {
                    return Err("opérateur sans opérande gauche".into());
                }
                while let Some(top) = ops.last() {
                    if matches!(top, Tok::LPar | Tok::Ident(_)) {
                        break;
                    }

                    let p_top = precedence(top);
                    let p_tok = precedence(&tok);

                    let doit_pop = if is_right_associative(&tok) {
                        p_top > p_tok
                    } else {
                        p_top >= p_tok
                    };
                    if !doit_pop {
                        break;
                    }
                    if let Some(op) = ops.pop() {
                        out.push(op);
                    }
                }

                ops.push(tok);
                prev_was_value = false;
            }

            Tok::Neg | Tok::Appel(_, _) => {
                return Err("jeton interne inattendu".into());
            }
        }
    }

    if attend_arguments {
        return Err("fonction sans parenthèses".into());
    }
    if !prev_was_value {
        return Err("expression incomplète".into());
    }

    // vide la pile ops
    while let Some(op) = ops.pop() {
        if matches!(op, Tok::LPar | Tok::Ident(_)) {
            return Err("parenthèses non fermées".into());
        }
        out.push(op);
    }

    Ok(out)
}

/// Dépile vers la sortie jusqu’au '(' courant (laissé sur la pile).
fn depile_jusqua_ouvrante(ops: &mut Vec<Tok>, out: &mut Vec<Tok>) {
    while let Some(top) = ops.last() {
        if matches!(top, Tok::LPar) {
            break;
        }
        if let Some(op) = ops.pop() {
            out.push(op);
        }
    }
}

/// Construit une Expr à partir d’une RPN.
pub fn from_rpn(rpn: &[Tok]) -> Result<Expr, String> {
    let mut st: Vec<Expr> = Vec::new();

    for tok in rpn.iter().cloned() {
        match tok {
            Tok::Num(r) => st.push(Expr::Rat(r)),
            Tok::Pi => st.push(Expr::Pi),
            Tok::Ident(name) => st.push(Expr::Var(name)),

            Tok::Neg => {
                let x = st.pop().ok_or("expression invalide")?;
                st.push(Expr::Sub(
                    Box::new(Expr::Rat(BigRational::zero())),
                    Box::new(x),
                ));
            }

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Caret => {
                let b = st.pop().ok_or("expression invalide")?;
                let a = st.pop().ok_or("expression invalide")?;

                let e = match tok {
                    Tok::Plus => Expr::Add(Box::new(a), Box::new(b)),
                    Tok::Minus => Expr::Sub(Box::new(a), Box::new(b)),
                    Tok::Star => Expr::Mul(Box::new(a), Box::new(b)),
                    Tok::Slash => Expr::Div(Box::new(a), Box::new(b)),
                    _ => puissance(a, b),
                };
                st.push(e);
            }

            Tok::Appel(name, n) => {
                if st.len() < n {
                    return Err("arguments manquants".into());
                }
                let args = st.split_off(st.len() - n);
                st.push(appel(&name, args)?);
            }

            Tok::LPar | Tok::RPar | Tok::Comma => {
                return Err("parenthèse inattendue en RPN".into())
            }
        }
    }

    if st.len() != 1 {
        return Err("expression invalide".into());
    }
    st.pop().ok_or_else(|| "expression invalide".into())
}

/// a^b : exposant entier (i64) => PowInt, sinon Puiss.
fn puissance(a: Expr, b: Expr) -> Expr {
    if let Expr::Rat(r) = &b {
        if r.denom().is_one() {
            if let Some(n) = r.numer().to_i64() {
                return Expr::PowInt(Box::new(a), n);
            }
        }
    }
    Expr::Puiss(Box::new(a), Box::new(b))
}

fn appel(name: &str, mut args: Vec<Expr>) -> Result<Expr, String> {
    let arite = |attendue: &str| format!("{name} attend {attendue} argument(s), reçu {}", args.len());

    match name {
        "sqrt" => {
            if args.len() != 1 {
                return Err(arite("1"));
            }
            Ok(Expr::Sqrt(Box::new(args.remove(0))))
        }

        "integral" | "derivative" => {
            let ok = match name {
                "integral" => args.len() == 2 || args.len() == 4,
                _ => args.len() == 2,
            };
            if !ok {
                return Err(arite(if name == "integral" { "2 ou 4" } else { "2" }));
            }
            if !matches!(args[1], Expr::Var(_)) {
                return Err(format!("{name} : la variable doit être un identifiant"));
            }
            Ok(Expr::Appel(name.to_string(), args))
        }

        _ => {
            let f = Fonction::depuis_nom(name).ok_or_else(|| format!("fonction inconnue: {name}"))?;
            if args.len() != 1 {
                return Err(arite("1"));
            }
            Ok(Expr::Fonc(f, Box::new(args.remove(0))))
        }
    }
}

/// Profondeur de l’arbre que from_rpn construirait (feuille = 1), sans le construire.
/// Parcours itératif : sûr quelle que soit la longueur de la RPN.
pub fn profondeur(rpn: &[Tok]) -> usize {
    let mut pile: Vec<usize> = Vec::with_capacity(64);
    let mut max = 0;

    for tok in rpn {
        let arite = match tok {
            Tok::Num(_) | Tok::Pi | Tok::Ident(_) => 0,
            Tok::Neg => 1,
            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Caret => 2,
            Tok::Appel(_, n) => *n,
            Tok::LPar | Tok::RPar | Tok::Comma => continue,
        };
        let debut = pile.len().saturating_sub(arite);
        // Neg : Sub(0, x), la feuille 0 compte pour 1
        let d = 1 + pile.drain(debut..).max().unwrap_or(0).max(usize::from(arite > 0));
        max = max.max(d);
        pile.push(d);
    }

    max
}

/// Texte -> RPN (sans construire l’arbre).
pub fn analyser_rpn(s: &str) -> Result<Vec<Tok>, String> {
    let jetons = super::jetons::tokenize(s)?;
    to_rpn(&jetons)
}

/// Pipeline de parse complet : texte -> Expr.
pub fn analyser(s: &str) -> Result<Expr, String> {
    from_rpn(&analyser_rpn(s)?)
}
