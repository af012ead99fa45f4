// src/noyau/canon.rs
//
// Canonicalisation forte (déterministe) :
// - aplatissement Add/Sub et Mul
// - suppression neutres (x+0, x*1, etc.)
// - extraction / remontée du signe (Sub(0,x) comme “-x” canon)
// - regroupement des termes semblables (x + x -> 2*x) et des facteurs (x*x -> x^2)
// - tri déterministe des termes/facteurs (ordre total)
// - reconstruction : utilise Sub quand le terme suivant est négatif
// - simplif √(n) -> a*√b (extraction des carrés parfaits) pour n entier ≥ 0

use crate::noyau::expr::Expr;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;

pub fn canon_expr(e: Expr) -> Expr {
    use Expr::*;

    match e {
        Rat(_) | Pi | Indefini | Var(_) => e,

        Sqrt(x) => canon_sqrt(canon_expr(*x)),
        PowInt(x, n) => canon_pow(canon_expr(*x), n),
        Puiss(a, b) => {
            let (a, b) = (canon_expr(*a), canon_expr(*b));
            if matches!(a, Indefini) || matches!(b, Indefini) {
                return Indefini;
            }
            Puiss(Box::new(a), Box::new(b))
        }

        Fonc(f, x) => match canon_expr(*x) {
            Indefini => Indefini,
            x => Fonc(f, Box::new(x)),
        },
        Appel(nom, args) => Appel(nom, args.into_iter().map(canon_expr).collect()),

        Add(a, b) => canon_addsub(Add(Box::new(canon_expr(*a)), Box::new(canon_expr(*b)))),
        Sub(a, b) => canon_addsub(Sub(Box::new(canon_expr(*a)), Box::new(canon_expr(*b)))),

        Mul(a, b) => canon_mul(Mul(Box::new(canon_expr(*a)), Box::new(canon_expr(*b)))),

        Div(a, b) => canon_div(Div(Box::new(canon_expr(*a)), Box::new(canon_expr(*b)))),
    }
}

/* ------------------------ utilitaires signe ------------------------ */

fn is_zero(e: &Expr) -> bool {
    matches!(e, Expr::Rat(r) if r.is_zero())
}

fn is_one(e: &Expr) -> bool {
    matches!(e, Expr::Rat(r) if r.is_one())
}

/// Renvoie (negatif?, valeur_absolue)
fn split_signe(e: Expr) -> (bool, Expr) {
    use Expr::*;
    match e {
        Rat(r) if r.is_negative() => (true, Rat(-r)),
        Sub(a, b) if is_zero(&a) => (true, *b),
        // produit dont le facteur le plus à gauche est négatif : (-2)*x
        Mul(a, b) => match split_signe(*a) {
            (true, abs_a) if is_one(&abs_a) => (true, *b),
            (true, abs_a) => (true, Mul(Box::new(abs_a), b)),
            (false, a) => (false, Mul(Box::new(a), b)),
        },
        other => (false, other),
    }
}

fn neg(e: Expr) -> Expr {
    use Expr::*;
    match e {
        Rat(r) => Rat(-r),
        Sub(a, b) if is_zero(&a) => *b,
        other => Sub(Box::new(Rat(BigRational::zero())), Box::new(other)),
    }
}

/* ------------------------ clef de tri déterministe ------------------------ */

fn rang(e: &Expr) -> u8 {
    use Expr::*;
    match e {
        Rat(_) => 0,
        Var(_) => 1,
        Sqrt(_) => 2,
        Pi => 3,
        PowInt(_, _) | Puiss(_, _) => 4,
        Fonc(_, _) => 5,
        Appel(_, _) => 6,
        Mul(_, _) | Div(_, _) => 7,
        Add(_, _) | Sub(_, _) => 8,
        Indefini => 255,
    }
}

pub(crate) fn key_string(e: &Expr) -> String {
    use Expr::*;
    match e {
        Rat(r) => format!("R{}/{}", r.numer(), r.denom()),
        Var(s) => format!("VAR({s})"),
        Pi => "PI".to_string(),
        Indefini => "INDEF".to_string(),

        Sqrt(x) => format!("SQRT({})", key_string(x)),
        PowInt(x, n) => format!("POW({},{n})", key_string(x)),
        Puiss(a, b) => format!("PUISS({},{})", key_string(a), key_string(b)),

        Fonc(f, x) => format!("{}({})", f.nom().to_uppercase(), key_string(x)),
        Appel(nom, args) => {
            let a: Vec<String> = args.iter().map(key_string).collect();
            format!("CALL:{nom}({})", a.join(","))
        }

        Add(a, b) => format!("ADD({},{})", key_string(a), key_string(b)),
        Sub(a, b) => format!("SUB({},{})", key_string(a), key_string(b)),
        Mul(a, b) => format!("MUL({},{})", key_string(a), key_string(b)),
        Div(a, b) => format!("DIV({},{})", key_string(a), key_string(b)),
    }
}

fn cmp_expr(a: &Expr, b: &Expr) -> Ordering {
    rang(a)
        .cmp(&rang(b))
        .then_with(|| key_string(a).cmp(&key_string(b)))
}

/* ------------------------ Add/Sub : aplatissement + regroupement + tri ------------------------ */

fn collect_addsub(e: Expr, out: &mut Vec<Expr>) {
    use Expr::*;
    match e {
        Add(a, b) => {
            collect_addsub(*a, out);
            collect_addsub(*b, out);
        }
        Sub(a, b) => {
            collect_addsub(*a, out);
            let mut retires = Vec::new();
            collect_addsub(*b, &mut retires);
            out.extend(retires.into_iter().map(neg));
        }
        other => out.push(other),
    }
}

/// Terme = coeff · base (base None => terme purement rationnel).
fn coeff_et_base(t: Expr) -> (BigRational, Option<Expr>) {
    use Expr::*;
    match t {
        Rat(r) => (r, None),
        Sub(a, b) if is_zero(&a) => {
            let (c, base) = coeff_et_base(*b);
            (-c, base)
        }
        Div(a, b) => match *b {
            Rat(k) if !k.is_zero() => {
                let (c, base) = coeff_et_base(*a);
                (c / k, base)
            }
            autre => (BigRational::one(), Some(Div(a, Box::new(autre)))),
        },
        Mul(_, _) => {
            let mut facteurs = Vec::new();
            collect_mul(t, &mut facteurs);
            let mut c = BigRational::one();
            let mut reste: Vec<Expr> = Vec::with_capacity(facteurs.len());
            for f in facteurs {
                match f {
                    Rat(r) => c *= r,
                    autre => reste.push(autre),
                }
            }
            (c, reconstruit_produit(reste))
        }
        other => (BigRational::one(), Some(other)),
    }
}

fn reconstruit_produit(facteurs: Vec<Expr>) -> Option<Expr> {
    let mut it = facteurs.into_iter();
    let premier = it.next()?;
    Some(it.fold(premier, |acc, f| Expr::Mul(Box::new(acc), Box::new(f))))
}

fn canon_addsub(e: Expr) -> Expr {
    // On reçoit déjà des sous-termes canonisés (canon_expr).
    let mut termes: Vec<Expr> = Vec::new();
    collect_addsub(e, &mut termes);

    if termes.iter().any(|t| matches!(t, Expr::Indefini)) {
        return Expr::Indefini;
    }

    // Regrouper les rationnels et les termes de même base.
    let mut somme_rat = BigRational::zero();
    let mut groupes: Vec<(String, Expr, BigRational)> = Vec::new();

    for t in termes {
        match coeff_et_base(t) {
            (c, None) => somme_rat += c,
            (c, Some(base)) => {
                let k = key_string(&base);
                match groupes.iter_mut().find(|(kk, _, _)| *kk == k) {
                    Some((_, _, acc)) => *acc += c,
                    None => groupes.push((k, base, c)),
                }
            }
        }
    }

    let mut v: Vec<Expr> = Vec::with_capacity(groupes.len() + 1);
    for (_, base, c) in groupes {
        if c.is_zero() {
            continue;
        }
        if c.is_one() {
            v.push(base);
        } else {
            v.push(canon_mul(Expr::Mul(Box::new(Expr::Rat(c)), Box::new(base))));
        }
    }
    if !somme_rat.is_zero() {
        v.push(Expr::Rat(somme_rat));
    }

    if v.is_empty() {
        return Expr::Rat(BigRational::zero());
    }

    // Tri déterministe
    v.sort_by(cmp_expr);

    // Reconstruction : si le terme suivant est négatif, on utilise Sub(acc, abs).
    let mut it = v.into_iter();
    let Some(mut acc) = it.next() else {
        return Expr::Rat(BigRational::zero());
    };
    for t in it {
        let (negatif, abs) = split_signe(t);
        acc = if negatif {
            Expr::Sub(Box::new(acc), Box::new(abs))
        } else {
            Expr::Add(Box::new(acc), Box::new(abs))
        };
    }
    acc
}

/* ------------------------ Mul : aplatissement + signe + regroupement + tri ------------------------ */

fn collect_mul(e: Expr, out: &mut Vec<Expr>) {
    use Expr::*;
    match e {
        Mul(a, b) => {
            collect_mul(*a, out);
            collect_mul(*b, out);
        }
        other => out.push(other),
    }
}

fn canon_mul(e: Expr) -> Expr {
    use Expr::*;

    let mut facteurs: Vec<Expr> = Vec::new();
    collect_mul(e, &mut facteurs);

    if facteurs.iter().any(|x| matches!(x, Indefini)) {
        return Indefini;
    }

    // Extraire signe global, regrouper rationnels, retirer *1, court-circuit *0.
    let mut signe_neg = false;
    let mut prod_rat = BigRational::one();
    // base -> exposant entier cumulé
    let mut puissances: Vec<(String, Expr, i64)> = Vec::new();

    for f in facteurs {
        if is_zero(&f) {
            return Rat(BigRational::zero());
        }

        let (neg_f, abs_f) = split_signe(f);
        if neg_f {
            signe_neg = !signe_neg;
        }

        let (base, n) = match abs_f {
            Rat(r) => {
                prod_rat *= r;
                continue;
            }
            PowInt(b, n) => (*b, n),
            other => (other, 1),
        };

        let k = key_string(&base);
        match puissances.iter_mut().find(|(kk, _, _)| *kk == k) {
            Some((_, _, acc)) => *acc = acc.saturating_add(n),
            None => puissances.push((k, base, n)),
        }
    }

    if signe_neg {
        prod_rat = -prod_rat;
    }

    let mut v: Vec<Expr> = Vec::with_capacity(puissances.len() + 1);
    for (_, base, n) in puissances {
        match n {
            0 => {}
            1 => v.push(base),
            n => v.push(canon_pow(base, n)),
        }
    }

    if v.is_empty() {
        return Rat(prod_rat);
    }
    if !prod_rat.is_one() {
        v.push(Rat(prod_rat));
    }
    if v.len() == 1 {
        return v.pop().unwrap_or(Indefini);
    }

    // Tri déterministe des facteurs (le rationnel passe devant)
    v.sort_by(cmp_expr);

    reconstruit_produit(v).unwrap_or(Indefini)
}

/* ------------------------ Div : signe + cas simples ------------------------ */

fn canon_div(e: Expr) -> Expr {
    use Expr::*;

    let Div(a, b) = e else { return e };

    if matches!(a.as_ref(), Indefini) || matches!(b.as_ref(), Indefini) || is_zero(&b) {
        return Indefini;
    }

    // a/1 => a
    if is_one(&b) {
        return *a;
    }

    // 0/b => 0
    if is_zero(&a) {
        return Rat(BigRational::zero());
    }

    // a/a => 1
    if a == b {
        return Rat(BigRational::one());
    }

    // a/k (k rationnel) => (1/k)*a
    if let Rat(k) = b.as_ref() {
        return canon_mul(Mul(Box::new(Rat(BigRational::one() / k)), a));
    }

    // Remonter le signe du dénominateur : a/(-b) => -(a/b)
    let (neg_b, den) = split_signe(*b);
    let mut num = *a;
    if neg_b {
        num = neg(num);
    }

    Div(Box::new(num), Box::new(den))
}

/* ------------------------ PowInt / Sqrt ------------------------ */

fn canon_pow(base: Expr, n: i64) -> Expr {
    use Expr::*;
    if matches!(base, Indefini) {
        return Indefini;
    }
    match n {
        0 => Rat(BigRational::one()),
        1 => base,
        _ => PowInt(Box::new(base), n),
    }
}

fn canon_sqrt(x: Expr) -> Expr {
    use Expr::*;

    if matches!(x, Indefini) {
        return Indefini;
    }

    // √(rat) : si entier >= 0, on extrait les carrés parfaits : √(s²*t) = s*√t
    if let Rat(r) = &x {
        if r.is_zero() {
            return Rat(BigRational::zero());
        }
        if r.is_positive() && r.denom().is_one() {
            let (s, t) = extrait_carre_parfait(r.numer());
            if t.is_one() {
                return Rat(BigRational::from_integer(s));
            }
            let racine = Sqrt(Box::new(Rat(BigRational::from_integer(t))));
            if s.is_one() {
                return racine;
            }
            return canon_mul(Mul(Box::new(Rat(BigRational::from_integer(s))), Box::new(racine)));
        }
    }

    Sqrt(Box::new(x))
}

/// Décompose n >= 0 en n = s^2 * t (essais par diviseurs, bornés).
fn extrait_carre_parfait(n: &BigInt) -> (BigInt, BigInt) {
    const MAX_ESSAIS: u32 = 10_000;

    if n.is_zero() || n.is_one() {
        return (BigInt::one(), n.clone());
    }

    let mut reste = n.clone();
    let mut s = BigInt::one();

    let mut p = BigInt::from(2);
    let mut essais = 0;
    while &p * &p <= reste && essais < MAX_ESSAIS {
        let p2 = &p * &p;
        while (&reste % &p2).is_zero() {
            reste /= &p2;
            s *= &p;
        }
        p += if p == BigInt::from(2) { 1 } else { 2 };
        essais += 1;
    }

    (s, reste)
}

#[cfg(test)]
mod tests {
    use crate::noyau::rpn::analyser;

    fn c(s: &str) -> String {
        let e = analyser(s).unwrap_or_else(|e| panic!("{s:?}: {e}"));
        format!("{}", e.simplify().canon())
    }

    #[test]
    fn termes_semblables() {
        assert_eq!(c("x + x"), "2*x");
        assert_eq!(c("x - x + 1"), "1");
        assert_eq!(c("3*x - 5*x"), "-2*x");
        assert_eq!(c("x + 1"), "1 + x");
    }

    #[test]
    fn facteurs_semblables() {
        assert_eq!(c("x*x"), "x^2");
        assert_eq!(c("x^2*x"), "x^3");
        assert_eq!(c("x*y*x"), "y*x^2");
    }

    #[test]
    fn signe_et_ordre() {
        assert_eq!(c("2 - x"), "2 - x");
        assert_eq!(c("x*2"), "2*x");
        assert_eq!(c("x/2"), "x/2");
        assert_eq!(c("-(x)"), "-x");
    }

    #[test]
    fn racines_carrees() {
        assert_eq!(c("sqrt(12)"), "2*sqrt(3)");
        assert_eq!(c("sqrt(8)/2"), "sqrt(2)");
        assert_eq!(c("sqrt(49)"), "7");
    }

    #[test]
    fn deterministe() {
        assert_eq!(c("y + x + 1"), c("1 + x + y"));
        assert_eq!(c("b*a"), c("a*b"));
    }
}
