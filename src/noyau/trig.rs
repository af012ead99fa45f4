// src/noyau/trig.rs
//
// Trig spéciale (angles “exactement reconnus”)
// -----------------------------------------------------------
// Angle = coeff·π (coeff_pi), ramené sur [0, 2π) puis compté en douzièmes de π :
//   t ∈ [0, 24), reconnu seulement si coeff·12 est entier (dénominateurs 1, 2, 3, 4, 6).
// Une seule table (sinus du premier quadrant) ; cos et tan s’en déduisent.
// sec/csc/cot : inverses de cos/sin/tan (valeur nulle => indéfini).

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};

use super::expr::{mod_rationnel, Expr, Fonction};

#[derive(Clone, Copy, Debug)]
pub enum TrigFn {
    Sin,
    Cos,
    Tan,
}

#[derive(Clone, Debug)]
pub enum TrigOutcome {
    Valeur(Expr, String),
    Indefini(String),
}

/// Valeur exacte de référence (premier quadrant) : expression + écriture courte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Reference {
    Zero,
    Demi,
    RacineDeuxSurDeux,
    RacineTroisSurDeux,
    RacineTroisSurTrois,
    RacineTrois,
    Un,
}

impl Reference {
    fn texte(self) -> &'static str {
        match self {
            Reference::Zero => "0",
            Reference::Demi => "1/2",
            Reference::RacineDeuxSurDeux => "√2/2",
            Reference::RacineTroisSurDeux => "√3/2",
            Reference::RacineTroisSurTrois => "√3/3",
            Reference::RacineTrois => "√3",
            Reference::Un => "1",
        }
    }

    fn expr(self) -> Expr {
        let racine = |n: i64| Expr::Sqrt(Box::new(Expr::rat_i(n)));
        let sur = |e: Expr, d: i64| Expr::Div(Box::new(e), Box::new(Expr::rat_i(d)));
        match self {
            Reference::Zero => Expr::rat_i(0),
            Reference::Demi => Expr::Rat(BigRational::new(BigInt::from(1), BigInt::from(2))),
            Reference::RacineDeuxSurDeux => sur(racine(2), 2),
            Reference::RacineTroisSurDeux => sur(racine(3), 2),
            Reference::RacineTroisSurTrois => sur(racine(3), 3),
            Reference::RacineTrois => racine(3),
            Reference::Un => Expr::rat_i(1),
        }
    }
}

/// sin sur [0, π/2], t en douzièmes de π.
fn sinus_reference(t: i64) -> Option<Reference> {
    Some(match t {
        0 => Reference::Zero,
        2 => Reference::Demi,
        3 => Reference::RacineDeuxSurDeux,
        4 => Reference::RacineTroisSurDeux,
        6 => Reference::Un,
        _ => return None,
    })
}

/// tan sur [0, π/2), t en douzièmes de π.
fn tangente_reference(t: i64) -> Option<Reference> {
    Some(match t {
        0 => Reference::Zero,
        2 => Reference::RacineTroisSurTrois,
        3 => Reference::Un,
        4 => Reference::RacineTrois,
        _ => return None,
    })
}

/// (négatif ?, valeur de référence) de sin(tπ/12), t ∈ [0, 24).
fn sinus(t: i64) -> Option<(bool, Reference)> {
    let (negatif, t) = if t >= 12 { (true, t - 12) } else { (false, t) };
    let t = if t > 6 { 12 - t } else { t };
    let r = sinus_reference(t)?;
    Some((negatif && r != Reference::Zero, r))
}

/// None : angle non tabulé ; Some(None) : indéfini.
fn tangente(t: i64) -> Option<Option<(bool, Reference)>> {
    let t = t % 12;
    if t == 6 {
        return Some(None);
    }
    let (negatif, t) = if t > 6 { (true, 12 - t) } else { (false, t) };
    let r = tangente_reference(t)?;
    Some(Some((negatif && r != Reference::Zero, r)))
}

/// Reconnaît les angles spéciaux pour sin/cos/tan lorsque l’entrée est un multiple rationnel de π.
///
/// Retour:
/// - Some(Valeur(expr_exact, preuve)) si reconnu
/// - Some(Indefini(preuve)) si indéfini (tan(π/2), tan(3π/2))
/// - None si non reconnu
pub fn trig_special(x: &Expr, f: TrigFn) -> Option<TrigOutcome> {
    let coeff = mod_rationnel(&x.coeff_pi()?, 2);
    let douziemes = coeff * BigRational::from_integer(BigInt::from(12));
    if !douziemes.is_integer() {
        return None;
    }
    let t = douziemes.to_integer().to_i64()?;

    let (nom, valeur) = match f {
        TrigFn::Sin => ("sin", Some(sinus(t)?)),
        TrigFn::Cos => ("cos", Some(sinus((t + 6) % 24)?)),
        TrigFn::Tan => ("tan", tangente(t)?),
    };

    let angle = ecrit_angle(t);
    Some(match valeur {
        None => TrigOutcome::Indefini(format!("{nom}({angle}) = indéfini")),
        Some((false, r)) => TrigOutcome::Valeur(r.expr(), format!("{nom}({angle}) = {}", r.texte())),
        Some((true, r)) => TrigOutcome::Valeur(
            Expr::Sub(Box::new(Expr::rat_i(0)), Box::new(r.expr())),
            format!("{nom}({angle}) = -{}", r.texte()),
        ),
    })
}

/* ------------------------ Outils ------------------------ */

/// tπ/12 réduit : "0", "π", "3π/2", "π/6"...
fn ecrit_angle(t: i64) -> String {
    if t == 0 {
        return "0".to_string();
    }
    let r = BigRational::new(BigInt::from(t), BigInt::from(12));
    let k = r.numer();
    let n = r.denom();
    let k = if k == &BigInt::from(1) {
        String::new()
    } else {
        k.to_string()
    };
    if n == &BigInt::from(1) {
        format!("{k}π")
    } else {
        format!("{k}π/{n}")
    }
}

/* ------------------------ Fonctions inverses + parcours ------------------------ */

/// Valeur spéciale de f(x), f trigonométrique (sec/csc/cot par inversion de cos/sin/tan).
pub fn valeur_speciale(f: Fonction, x: &Expr) -> Option<TrigOutcome> {
    let (base, inverse) = match f {
        Fonction::Sin => (TrigFn::Sin, false),
        Fonction::Cos => (TrigFn::Cos, false),
        Fonction::Tan => (TrigFn::Tan, false),
        Fonction::Csc => (TrigFn::Sin, true),
        Fonction::Sec => (TrigFn::Cos, true),
        Fonction::Cot => (TrigFn::Tan, true),
        Fonction::Log | Fonction::Exp => return None,
    };

    let res = trig_special(x, base)?;
    if !inverse {
        return Some(res);
    }

    let nom = f.nom();
    Some(match res {
        TrigOutcome::Valeur(v, p) => {
            let v = v.simplify();
            if matches!(&v, Expr::Rat(r) if r.is_zero()) {
                TrigOutcome::Indefini(format!("{nom} = 1/0 ; {p}"))
            } else {
                let inv = Expr::Div(Box::new(Expr::rat_i(1)), Box::new(v)).simplify();
                TrigOutcome::Valeur(inv, format!("{nom} = 1/({p})"))
            }
        }
        // cot(π/2) = 0
        TrigOutcome::Indefini(p) => TrigOutcome::Valeur(Expr::rat_i(0), format!("{nom} = 0 ; {p}")),
    })
}

/// Trig spéciale récursive : remplace les angles reconnus PARTOUT dans l’arbre.
/// Une ligne de preuve par remplacement.
pub fn applique_trig_speciale(expr: &Expr, preuve: &mut Vec<String>) -> Expr {
    use Expr::*;

    let b = |e: Expr| Box::new(e);

    let out = match expr {
        Fonc(f, x) => match valeur_speciale(*f, x) {
            Some(TrigOutcome::Valeur(v, p)) => {
                preuve.push(p);
                v
            }
            Some(TrigOutcome::Indefini(p)) => {
                preuve.push(p);
                Indefini
            }
            None => Fonc(*f, b(applique_trig_speciale(x, preuve))),
        },

        Add(x, y) => Add(b(applique_trig_speciale(x, preuve)), b(applique_trig_speciale(y, preuve))),
        Sub(x, y) => Sub(b(applique_trig_speciale(x, preuve)), b(applique_trig_speciale(y, preuve))),
        Mul(x, y) => Mul(b(applique_trig_speciale(x, preuve)), b(applique_trig_speciale(y, preuve))),
        Div(x, y) => Div(b(applique_trig_speciale(x, preuve)), b(applique_trig_speciale(y, preuve))),
        Puiss(x, y) => Puiss(b(applique_trig_speciale(x, preuve)), b(applique_trig_speciale(y, preuve))),

        Sqrt(x) => Sqrt(b(applique_trig_speciale(x, preuve))),
        PowInt(x, n) => PowInt(b(applique_trig_speciale(x, preuve)), *n),
        Appel(nom, args) => Appel(
            nom.clone(),
            args.iter().map(|a| applique_trig_speciale(a, preuve)).collect(),
        ),

        Rat(_) | Pi | Indefini | Var(_) => expr.clone(),
    };

    // Un seul simplify à la fin.
    out.simplify()
}
