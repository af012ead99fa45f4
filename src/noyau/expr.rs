// src/noyau/expr.rs
//
// AST exact (sans flottants).
// - Rat : rationnel exact
// - Pi  : symbole π
// - Indefini : résultat exact indéfini (ex: tan(π/2), 1/0)
// - Var : variable symbolique (ex: x)
// - Appel : integral / derivative, conservés tels quels (non calculés)
//
// IMPORTANT (SAFE):
// - simplify() ne doit jamais “inventer” une valeur pour Var.
// - les puissances exactes sont bornées (taille du résultat), au-delà le noeud reste symbolique.

use crate::noyau::canon::canon_expr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// Fonctions unaires nommées (hors sqrt, qui a son propre noeud).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fonction {
    Sin,
    Cos,
    Tan,
    Sec,
    Csc,
    Cot,
    Log,
    Exp,
}

impl Fonction {
    pub fn depuis_nom(nom: &str) -> Option<Fonction> {
        Some(match nom {
            "sin" => Fonction::Sin,
            "cos" => Fonction::Cos,
            "tan" => Fonction::Tan,
            "sec" => Fonction::Sec,
            "csc" => Fonction::Csc,
            "cot" => Fonction::Cot,
            "log" | "ln" => Fonction::Log,
            "exp" => Fonction::Exp,
            _ => return None,
        })
    }

    pub fn nom(self) -> &'static str {
        match self {
            Fonction::Sin => "sin",
            Fonction::Cos => "cos",
            Fonction::Tan => "tan",
            Fonction::Sec => "sec",
            Fonction::Csc => "csc",
            Fonction::Cot => "cot",
            Fonction::Log => "log",
            Fonction::Exp => "exp",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Rat(BigRational),
    Pi,
    Indefini,

    Var(String),

    Sqrt(Box<Expr>),              // √(x)
    PowInt(Box<Expr>, i64),       // x^n (n entier)
    Puiss(Box<Expr>, Box<Expr>),  // x^y (y quelconque)
    Fonc(Fonction, Box<Expr>),    // sin(x), log(x), ...
    Appel(String, Vec<Expr>),     // integral(f, x, a, b), derivative(f, x)

    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
}

/// Taille max (en bits) d’une puissance calculée exactement.
const MAX_BITS_PUISSANCE: u64 = 65_536;

/// Indice max d’une racine exacte a^(p/q).
const MAX_INDICE_RACINE: i64 = 64;

impl Expr {
    pub fn rat_i(n: i64) -> Expr {
        Expr::Rat(BigRational::from_integer(BigInt::from(n)))
    }

    /// Canonicalisation forte (déterminisme structurel).
    pub fn canon(self) -> Expr {
        canon_expr(self)
    }

    /// Simplification locale (SAFE), sans heuristiques.
    pub fn simplify(self) -> Expr {
        use Expr::*;

        match self {
            Rat(_) | Pi | Indefini | Var(_) => self,

            Add(a, b) => {
                let a = a.simplify();
                let b = b.simplify();
                match (&a, &b) {
                    (Indefini, _) | (_, Indefini) => Indefini,
                    (Rat(x), Rat(y)) => Rat(x + y),
                    (Rat(x), _) if x.is_zero() => b,
                    (_, Rat(y)) if y.is_zero() => a,
                    _ => Add(Box::new(a), Box::new(b)),
                }
            }

            Sub(a, b) => {
                let a = a.simplify();
                let b = b.simplify();

                if matches!(a, Indefini) || matches!(b, Indefini) {
                    return Indefini;
                }

                // x - x => 0
                if a == b {
                    return Rat(BigRational::zero());
                }

                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x - y),
                    (_, Rat(y)) if y.is_zero() => a,
                    // 0 - b : on garde Sub(0,b) (forme “-b”)
                    _ => Sub(Box::new(a), Box::new(b)),
                }
            }

            Mul(a, b) => {
                let a = a.simplify();
                let b = b.simplify();

                if matches!(a, Indefini) || matches!(b, Indefini) {
                    return Indefini;
                }

                // √x * √x => x
                if let (Sqrt(x), Sqrt(y)) = (&a, &b) {
                    if x == y {
                        return (**x).clone();
                    }
                }

                // √u * √v => √(u*v) si u,v rationnels >= 0
                if let (Sqrt(u), Sqrt(v)) = (&a, &b) {
                    if let (Rat(ru), Rat(rv)) = (u.as_ref(), v.as_ref()) {
                        if !ru.is_negative() && !rv.is_negative() {
                            return Sqrt(Box::new(Rat(ru * rv))).simplify();
                        }
                    }
                }

                // (√x / k) * √x  et  √x * (√x / k) => x / k
                for (p, q) in [(&a, &b), (&b, &a)] {
                    if let (Div(num, k), Sqrt(y)) = (p, q) {
                        if let (Sqrt(x), Rat(_)) = (num.as_ref(), k.as_ref()) {
                            if x == y {
                                return Div(x.clone(), k.clone()).simplify();
                            }
                        }
                    }
                }

                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x * y),
                    (Rat(x), _) if x.is_zero() => Rat(BigRational::zero()),
                    (_, Rat(y)) if y.is_zero() => Rat(BigRational::zero()),
                    (Rat(x), _) if x.is_one() => b,
                    (_, Rat(y)) if y.is_one() => a,
                    _ => Mul(Box::new(a), Box::new(b)),
                }
            }

            Div(a, b) => {
                let a = a.simplify();
                let b = b.simplify();

                if matches!(a, Indefini) || matches!(b, Indefini) {
                    return Indefini;
                }

                // division par zéro exacte
                if matches!(&b, Rat(y) if y.is_zero()) {
                    return Indefini;
                }

                // √u / √v => √(u/v) si u,v rationnels > 0
                if let (Sqrt(u), Sqrt(v)) = (&a, &b) {
                    if let (Rat(ru), Rat(rv)) = (u.as_ref(), v.as_ref()) {
                        if ru.is_positive() && rv.is_positive() {
                            return Sqrt(Box::new(Rat(ru / rv))).simplify();
                        }
                    }
                }

                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x / y),
                    (_, Rat(y)) if y.is_one() => a,

                    // (p/q) / √n  => (p/qn) * √n, si n entier > 0
                    (Rat(x), Sqrt(inner)) => {
                        if let Rat(rn) = inner.as_ref() {
                            if rn.is_positive() && rn.denom().is_one() {
                                return Mul(
                                    Box::new(Rat(x / rn)),
                                    Box::new(Sqrt(Box::new(Rat(rn.clone())))),
                                )
                                .simplify();
                            }
                        }
                        Div(Box::new(a), Box::new(b))
                    }

                    _ => Div(Box::new(a), Box::new(b)),
                }
            }

            PowInt(base, n) => puissance_entiere(base.simplify(), n),

            Puiss(base, exp) => {
                let base = base.simplify();
                let exp = exp.simplify();
                if matches!(base, Indefini) || matches!(exp, Indefini) {
                    return Indefini;
                }

                let r = match &exp {
                    Rat(r) => r.clone(),
                    _ => return Puiss(Box::new(base), Box::new(exp)),
                };

                // exposant entier
                if r.denom().is_one() {
                    if let Some(n) = r.numer().to_i64() {
                        return puissance_entiere(base, n);
                    }
                    return Puiss(Box::new(base), Box::new(exp));
                }

                // a^(p/q) : racine exacte si possible, √ si q = 2
                let (p, q) = match (r.numer().to_i64(), r.denom().to_i64()) {
                    (Some(p), Some(q)) if q <= MAX_INDICE_RACINE => (p, q),
                    _ => return Puiss(Box::new(base), Box::new(exp)),
                };
                if let Rat(a) = &base {
                    if let Some(racine) = rational_racine_exacte(a, q) {
                        return puissance_entiere(Rat(racine), p);
                    }
                    if q == 2 && !a.is_negative() {
                        return puissance_entiere(Sqrt(Box::new(base)).simplify(), p);
                    }
                }
                Puiss(Box::new(base), Box::new(exp))
            }

            Sqrt(x) => {
                let x = x.simplify();
                if matches!(x, Indefini) {
                    return Indefini;
                }
                if let Rat(r) = &x {
                    if let Some(s) = rational_sqrt_exact(r) {
                        return Rat(s);
                    }
                }
                Sqrt(Box::new(x))
            }

            Fonc(f, x) => {
                let x = x.simplify();
                if matches!(x, Indefini) {
                    return Indefini;
                }
                match (f, &x) {
                    // log(1) = 0 ; exp(0) = 1 ; log(exp(y)) = y
                    (Fonction::Log, Rat(r)) if r.is_one() => Rat(BigRational::zero()),
                    (Fonction::Exp, Rat(r)) if r.is_zero() => Rat(BigRational::one()),
                    (Fonction::Log, Fonc(Fonction::Exp, y)) => (**y).clone(),
                    _ => Fonc(f, Box::new(x)),
                }
            }

            Appel(nom, args) => {
                let args: Vec<Expr> = args.into_iter().map(Expr::simplify).collect();
                if args.iter().any(|a| matches!(a, Indefini)) {
                    return Indefini;
                }
                Appel(nom, args)
            }
        }
    }

    /// Coefficient rationnel c tel que self = c·π (Add/Sub/Mul/Div rationnels seulement).
    /// Itératif. SAFE: si ça sort du domaine, retourne None.
    pub fn coeff_pi(&self) -> Option<BigRational> {
        use Expr::*;

        const MAX_PILE: usize = 8192;
        const MAX_NOEUDS: usize = 200_000;

        #[derive(Copy, Clone)]
        enum Marque<'a> {
            Entrer(&'a Expr),
            Sortir(&'a Expr),
        }

        // Valeur remontée : rationnel pur, ou coefficient de π
        #[derive(Clone)]
        enum Forme {
            Rationnel(BigRational),
            FoisPi(BigRational),
        }

        let mut pile: Vec<Marque<'_>> = Vec::with_capacity(64);
        let mut res: Vec<Option<Forme>> = Vec::with_capacity(64);

        pile.push(Marque::Entrer(self));
        let mut visites: usize = 0;

        while let Some(m) = pile.pop() {
            visites += 1;
            if visites > MAX_NOEUDS || pile.len() > MAX_PILE {
                return None;
            }

            match m {
                Marque::Entrer(e) => {
                    pile.push(Marque::Sortir(e));
                    if let Add(a, b) | Sub(a, b) | Mul(a, b) | Div(a, b) = e {
                        pile.push(Marque::Entrer(b.as_ref()));
                        pile.push(Marque::Entrer(a.as_ref()));
                    }
                }

                Marque::Sortir(e) => {
                    let forme = match e {
                        Pi => Some(Forme::FoisPi(BigRational::one())),
                        Rat(r) => Some(Forme::Rationnel(r.clone())),
                        Add(_, _) | Sub(_, _) | Mul(_, _) | Div(_, _) => {
                            let rb = res.pop().flatten();
                            let ra = res.pop().flatten();
                            combine(e, ra, rb)
                        }
                        _ => None,
                    };
                    res.push(forme);
                }
            }
        }

        fn combine(e: &Expr, a: Option<Forme>, b: Option<Forme>) -> Option<Forme> {
            use Forme::*;
            let (a, b) = (a?, b?);
            match (e, a, b) {
                (Expr::Add(..), Rationnel(x), Rationnel(y)) => Some(Rationnel(x + y)),
                (Expr::Add(..), FoisPi(x), FoisPi(y)) => Some(FoisPi(x + y)),
                (Expr::Sub(..), Rationnel(x), Rationnel(y)) => Some(Rationnel(x - y)),
                (Expr::Sub(..), FoisPi(x), FoisPi(y)) => Some(FoisPi(x - y)),
                // 0 - c·π
                (Expr::Sub(..), Rationnel(x), FoisPi(y)) if x.is_zero() => Some(FoisPi(-y)),
                (Expr::Mul(..), Rationnel(x), Rationnel(y)) => Some(Rationnel(x * y)),
                (Expr::Mul(..), Rationnel(x), FoisPi(y)) | (Expr::Mul(..), FoisPi(y), Rationnel(x)) => {
                    Some(FoisPi(x * y))
                }
                (Expr::Div(..), _, Rationnel(y)) if y.is_zero() => None,
                (Expr::Div(..), Rationnel(x), Rationnel(y)) => Some(Rationnel(x / y)),
                (Expr::Div(..), FoisPi(x), Rationnel(y)) => Some(FoisPi(x / y)),
                _ => None,
            }
        }

        match (res.len(), res.pop().flatten()) {
            (1, Some(Forme::FoisPi(c))) => Some(c),
            // 0 = 0·π (sin(0), cos(0)...)
            (1, Some(Forme::Rationnel(r))) if r.is_zero() => Some(r),
            _ => None,
        }
    }

    /// Contient une variable libre ou un appel non calculé ?
    pub fn est_symbolique(&self) -> bool {
        use Expr::*;
        match self {
            Var(_) | Appel(_, _) => true,
            Rat(_) | Pi | Indefini => false,
            Sqrt(x) | PowInt(x, _) | Fonc(_, x) => x.est_symbolique(),
            Puiss(a, b) | Add(a, b) | Sub(a, b) | Mul(a, b) | Div(a, b) => {
                a.est_symbolique() || b.est_symbolique()
            }
        }
    }
}

/// x^n, exact quand la taille reste raisonnable.
fn puissance_entiere(base: Expr, n: i64) -> Expr {
    use Expr::*;

    if matches!(base, Indefini) {
        return Indefini;
    }
    if n == 0 {
        return Rat(BigRational::one());
    }
    if n == 1 {
        return base;
    }

    match &base {
        Rat(r) => {
            if r.is_zero() {
                return if n < 0 { Indefini } else { Rat(BigRational::zero()) };
            }
            let bits = r.numer().bits() + r.denom().bits();
            if bits.saturating_mul(n.unsigned_abs()) <= MAX_BITS_PUISSANCE {
                return Rat(rational_pow_int(r.clone(), n));
            }
            PowInt(Box::new(base), n)
        }
        // (√x)^(2k) = x^k
        Sqrt(x) if n % 2 == 0 => puissance_entiere((**x).clone(), n / 2),
        // (x^m)^n = x^(m*n)
        PowInt(x, m) => match m.checked_mul(n) {
            Some(mn) => puissance_entiere((**x).clone(), mn),
            None => PowInt(Box::new(base), n),
        },
        _ => PowInt(Box::new(base), n),
    }
}

/* ------------------------ Modulo rationnel exact (sans flottants) ------------------------ */

/// Réduction modulo `periode` sur un coefficient rationnel (periode=2 pour sin/cos, 1 pour tan).
/// Retourne un rationnel dans [0, periode).
///
/// Si coeff = n/d, alors coeff mod periode = (n mod (periode*d))/d.
pub(crate) fn mod_rationnel(coeff: &BigRational, periode: i64) -> BigRational {
    if coeff.is_zero() {
        return BigRational::zero();
    }
    if periode <= 0 {
        return coeff.clone();
    }

    let d = coeff.denom().clone();
    let n = coeff.numer().clone();
    let m = BigInt::from(periode) * &d;

    let mut r = &n % &m;
    if r.is_negative() {
        r += &m;
    }
    BigRational::new(r, d)
}

/* ------------------------ Outils rationnels (utilisés par simplify) ------------------------ */

fn rational_pow_int(base: BigRational, exp: i64) -> BigRational {
    if exp == 0 {
        return BigRational::one();
    }
    if exp < 0 {
        return BigRational::one() / rational_pow_int(base, exp.saturating_neg());
    }

    let mut e = exp as u64;
    let mut acc = BigRational::one();
    let mut b = base;

    while e > 0 {
        if (e & 1) == 1 {
            acc *= b.clone();
        }
        e >>= 1;
        if e > 0 {
            b *= b.clone();
        }
    }
    acc
}

fn rational_sqrt_exact(r: &BigRational) -> Option<BigRational> {
    if r.is_negative() {
        return None;
    }
    let sn = int_sqrt_exact(r.numer())?;
    let sd = int_sqrt_exact(r.denom())?;
    Some(BigRational::new(sn, sd))
}

fn int_sqrt_exact(x: &BigInt) -> Option<BigInt> {
    if x.is_negative() {
        return None;
    }
    let s = x.sqrt();
    if &s * &s == *x {
        Some(s)
    } else {
        None
    }
}

/// Racine q-ième exacte d’un rationnel (q impair : négatifs acceptés).
fn rational_racine_exacte(r: &BigRational, q: i64) -> Option<BigRational> {
    let q = u32::try_from(q).ok().filter(|&q| q >= 2)?;
    if r.is_negative() && q % 2 == 0 {
        return None;
    }

    let racine = |x: &BigInt| -> Option<BigInt> {
        let s = x.nth_root(q);
        if num_traits::pow(s.clone(), q as usize) == *x {
            Some(s)
        } else {
            None
        }
    };

    let n = racine(r.numer())?;
    let d = racine(r.denom())?;
    Some(BigRational::new(n, d))
}
