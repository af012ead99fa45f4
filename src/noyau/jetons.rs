// src/noyau/jetons.rs
//
// Tokenisation de la forme canonique (grammaire du moteur symbolique).
// - nombres décimaux -> rationnel EXACT (1.25 -> 5/4)
// - opérateurs + - * / ^ , ; parenthèses ( ) et crochets [ ] (même rôle)
// - π / pi ; √ (= sqrt)
// - identifiants [a-zA-Z_][a-zA-Z0-9_]* (minuscules)
// - produit implicite inséré : 2pi, 2x, 3(x+1), (a)(b), x sqrt(2)

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Num(BigRational),
    Pi,

    // Fonction ou variable : le parse (RPN) tranche via est_fonction().
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Comma,

    LPar,
    RPar,

    // Produits par to_rpn uniquement
    Neg,
    Appel(String, usize),
}

/// Noms appelables (toujours suivis de parenthèses).
pub fn est_fonction(nom: &str) -> bool {
    matches!(
        nom,
        "sin"
            | "cos"
            | "tan"
            | "sec"
            | "csc"
            | "cot"
            | "log"
            | "ln"
            | "exp"
            | "sqrt"
            | "integral"
            | "derivative"
    )
}

/// Tokenize une chaîne en jetons (produit implicite compris).
pub fn tokenize(s: &str) -> Result<Vec<Tok>, String> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let simple = match c {
            '(' | '[' => Some(Tok::LPar),
            ')' | ']' => Some(Tok::RPar),
            '+' => Some(Tok::Plus),
            '-' => Some(Tok::Minus),
            '*' => Some(Tok::Star),
            '/' => Some(Tok::Slash),
            '^' => Some(Tok::Caret),
            ',' => Some(Tok::Comma),
            'π' => Some(Tok::Pi),
            '√' => Some(Tok::Ident("sqrt".to_string())),
            _ => None,
        };
        if let Some(t) = simple {
            out.push(t);
            i += 1;
            continue;
        }

        // Identifiants ASCII
        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let w = chars[start..i].iter().collect::<String>().to_lowercase();
            if w == "pi" {
                out.push(Tok::Pi);
            } else {
                out.push(Tok::Ident(w));
            }
            continue;
        }

        // Nombre décimal : 12, 1.5, .5
        if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let lit: String = chars[start..i].iter().collect();
            out.push(Tok::Num(decimal_exact(&lit)?));
            continue;
        }

        return Err(format!("caractère inattendu: '{c}'"));
    }

    Ok(insere_produits_implicites(out))
}

/// "12.375" -> 99/8 (exact, sans flottant).
pub fn decimal_exact(lit: &str) -> Result<BigRational, String> {
    let invalide = || format!("nombre invalide: {lit}");

    let (ent, frac) = match lit.split_once('.') {
        Some((e, f)) => (e, f),
        None => (lit, ""),
    };
    if frac.contains('.') || (ent.is_empty() && frac.is_empty()) {
        return Err(invalide());
    }

    let chiffres = format!("{ent}{frac}");
    let n = BigInt::parse_bytes(chiffres.as_bytes(), 10).ok_or_else(invalide)?;
    let d = num_traits::pow(BigInt::from(10), frac.len());
    Ok(BigRational::new(n, d))
}

fn termine_valeur(t: &Tok) -> bool {
    match t {
        Tok::Num(_) | Tok::Pi | Tok::RPar => true,
        Tok::Ident(nom) => !est_fonction(nom),
        _ => false,
    }
}

fn commence_valeur(t: &Tok) -> bool {
    matches!(t, Tok::Num(_) | Tok::Pi | Tok::Ident(_) | Tok::LPar)
}

fn insere_produits_implicites(jetons: Vec<Tok>) -> Vec<Tok> {
    let mut out: Vec<Tok> = Vec::with_capacity(jetons.len());
    for t in jetons {
        if let Some(prev) = out.last() {
            if termine_valeur(prev) && commence_valeur(&t) {
                out.push(Tok::Star);
            }
        }
        out.push(t);
    }
    out
}

/// Format utilitaire (debug/“démarche”) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    fn format_rat(r: &BigRational) -> String {
        if r.denom().is_one() {
            format!("{}", r.numer())
        } else {
            format!("{}/{}", r.numer(), r.denom())
        }
    }

    tokens
        .iter()
        .map(|t| match t {
            Tok::Num(r) => format_rat(r),
            Tok::Pi => "pi".to_string(),
            Tok::Ident(name) => name.clone(),
            Tok::Plus => "+".to_string(),
            Tok::Minus => "-".to_string(),
            Tok::Star => "*".to_string(),
            Tok::Slash => "/".to_string(),
            Tok::Caret => "^".to_string(),
            Tok::Comma => ",".to_string(),
            Tok::LPar => "(".to_string(),
            Tok::RPar => ")".to_string(),
            Tok::Neg => "neg".to_string(),
            Tok::Appel(name, n) => format!("{name}/{n}"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txt(s: &str) -> String {
        format_tokens(&tokenize(s).unwrap_or_else(|e| panic!("{s:?}: {e}")))
    }

    #[test]
    fn decimaux_exacts() {
        assert_eq!(txt("1.25"), "5/4");
        assert_eq!(txt(".5"), "1/2");
        assert_eq!(txt("3."), "3");
        assert!(tokenize("1.2.3").is_err());
        assert!(tokenize(".").is_err());
    }

    #[test]
    fn crochets_et_virgules() {
        assert_eq!(txt("[1,2]"), "( 1 , 2 )");
    }

    #[test]
    fn produit_implicite() {
        assert_eq!(txt("2pi"), "2 * pi");
        assert_eq!(txt("2pi r"), "2 * pi * r");
        assert_eq!(txt("3(x+1)"), "3 * ( x + 1 )");
        assert_eq!(txt("(1)(2)"), "( 1 ) * ( 2 )");
        assert_eq!(txt("2sqrt(2)"), "2 * sqrt ( 2 )");
        // fonction suivie de sa parenthèse : pas de produit
        assert_eq!(txt("sin(x)"), "sin ( x )");
    }

    #[test]
    fn majuscules_et_unicode() {
        assert_eq!(txt("SIN(PI)"), "sin ( pi )");
        assert_eq!(txt("√(4)π"), "sqrt ( 4 ) * pi");
    }

    #[test]
    fn caractere_inconnu() {
        assert!(tokenize("7%3").is_err());
        assert!(tokenize("a=b").is_err());
    }
}
