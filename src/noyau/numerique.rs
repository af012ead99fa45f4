// src/noyau/numerique.rs
//
// Valeur approchée (f64) d’une forme simplifiée.
// Seules les expressions CLOSES s’évaluent : une variable, un appel integral/derivative
// ou un noeud indéfini bloquent la lecture numérique.

use std::f64::consts::PI;

use num_traits::ToPrimitive;

use super::expr::{Expr, Fonction};

/// Ce qui empêche la lecture numérique.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Obstacle {
    Variable(String),
    Appel(String),
    Indefini,
}

pub fn valeur_approchee(e: &Expr) -> Result<f64, Obstacle> {
    use Expr::*;

    Ok(match e {
        Rat(r) => r.to_f64().unwrap_or(f64::NAN),
        Pi => PI,
        Indefini => return Err(Obstacle::Indefini),
        Var(nom) => return Err(Obstacle::Variable(nom.clone())),
        Appel(nom, _) => return Err(Obstacle::Appel(nom.clone())),

        Sqrt(x) => valeur_approchee(x)?.sqrt(),
        PowInt(x, n) => {
            let b = valeur_approchee(x)?;
            match i32::try_from(*n) {
                Ok(n) => b.powi(n),
                Err(_) => b.powf(*n as f64),
            }
        }
        Puiss(x, y) => valeur_approchee(x)?.powf(valeur_approchee(y)?),
        Fonc(f, x) => fonction(*f, valeur_approchee(x)?),

        Add(a, b) => valeur_approchee(a)? + valeur_approchee(b)?,
        Sub(a, b) => valeur_approchee(a)? - valeur_approchee(b)?,
        Mul(a, b) => valeur_approchee(a)? * valeur_approchee(b)?,
        Div(a, b) => valeur_approchee(a)? / valeur_approchee(b)?,
    })
}

fn fonction(f: Fonction, x: f64) -> f64 {
    match f {
        Fonction::Sin => x.sin(),
        Fonction::Cos => x.cos(),
        Fonction::Tan => x.tan(),
        Fonction::Sec => 1.0 / x.cos(),
        Fonction::Csc => 1.0 / x.sin(),
        Fonction::Cot => x.cos() / x.sin(),
        // log = logarithme naturel (ln)
        Fonction::Log => x.ln(),
        Fonction::Exp => x.exp(),
    }
}
