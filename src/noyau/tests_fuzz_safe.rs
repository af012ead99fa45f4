//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - erreurs attendues : uniquement Evaluateur (indéfini, non fini) sur une grammaire valide
//! - invariants clés : sortie normalisée sans '\' et équilibrée, nettoyage dans l’alphabet sûr,
//!   pas d’évaluateur sans texte canonique

use std::time::{Duration, Instant};

use super::classe::{classifier, TypeExpression};
use super::erreur::EchecEvaluation;
use super::latex::{est_equilibre, normaliser};
use super::nettoyage::nettoyer;
use super::orchestre::{executer, Chemin};
use super::source::TexteReconnu;
use super::symbolique::{evaluer_symbolique, Valeur};

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
    fn choix<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.pick(items.len() as u32) as usize]
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Génération canonique (bornée) ------------------------ */

fn gen_rat(rng: &mut Rng) -> String {
    // 0 inclus : les divisions par zéro arrivent via / expr
    let a = rng.pick(8);
    let b = 1 + rng.pick(8);
    if rng.coin() {
        format!("{a}/{b}")
    } else {
        format!("{a}")
    }
}

fn gen_coeff_pi(rng: &mut Rng) -> String {
    let k = rng.pick(14) as i64 - 6;
    let d = [1, 2, 3, 4, 6, 12][rng.pick(6) as usize];
    if d == 1 {
        format!("{k}*pi")
    } else {
        format!("{k}*pi/{d}")
    }
}

fn gen_atom(rng: &mut Rng) -> String {
    match rng.pick(5) {
        0 => gen_rat(rng),
        1 => "pi".to_string(),
        2 => format!("({})", gen_coeff_pi(rng)),
        3 => "sqrt(2)".to_string(),
        _ => "sqrt(3)".to_string(),
    }
}

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_atom(rng);
    }

    let sous = |rng: &mut Rng| gen_expr(rng, depth - 1);
    match rng.pick(9) {
        0 => gen_atom(rng),
        1 => format!("({}+{})", sous(rng), sous(rng)),
        2 => format!("({}-{})", sous(rng), sous(rng)),
        3 => format!("({}*{})", sous(rng), sous(rng)),
        4 => format!("({}/{})", sous(rng), sous(rng)),
        5 => format!("sin({})", gen_coeff_pi(rng)),
        6 => format!("cos({})", gen_coeff_pi(rng)),
        7 => format!("tan({})", gen_coeff_pi(rng)),
        _ => format!("({})^2", sous(rng)),
    }
}

/* ------------------------ Génération balisage / OCR brut ------------------------ */

const MORCEAUX_LATEX: &[&str] = &[
    "\\frac{", "}{", "}", "{", "\\sqrt{", "\\sqrt[3]{", "\\int_{0}^{1}", "\\int", "x", "y",
    "^{2}", "^2", "_{1}", "\\sin", "\\cos{", "\\ln", "\\pi", "\\alpha", "+", "-", "\\cdot",
    "\\times", "(", ")", "\\left(", "\\right)", "dx", "\\,", "$", "$$", "1", "2", "9", " ",
    "\\frac{d}{dx}", "\\sum", "\\zeta", "\\mathrm{d}", "\\\\", "^\\{3\\}",
];

const MORCEAUX_OCR: &[&str] = &[
    "1", "2", "3", "7", "0", "+", "-", "x", "X", "*", "/", "%", "(", ")", "=", ",", ".", " ",
    "\n", "—", "–", "_", "a", "?", "√", "×", "÷", "π",
];

fn gen_morceaux(rng: &mut Rng, items: &[&str], n: usize) -> String {
    (0..n).map(|_| rng.choix(items)).collect()
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_symbolique_determinisme() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    let mut rng = Rng::new(0xC0FFEE_u64);

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..120 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 5);
        let r = evaluer_symbolique(&expr);

        // même entrée => même sortie
        assert_eq!(r, evaluer_symbolique(&expr), "expr={expr:?}");

        match r {
            Ok(Valeur::Numerique(v)) => {
                assert!(v.is_finite(), "expr={expr:?} v={v}");
                seen_ok += 1;
            }
            Ok(Valeur::Symbolique(s)) => panic!("expression close restée symbolique: {expr:?} -> {s}"),
            Err(EchecEvaluation::Evaluateur(_)) => seen_err += 1,
            Err(e) => panic!("erreur non attendue: expr={expr:?} err={e}"),
        }
    }

    // un mix des deux, sinon le fuzz ne “balaye” rien
    assert!(seen_ok > 10, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_balisage_invariants() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    let mut rng = Rng::new(0xBADC0DE_u64);

    for _ in 0..300 {
        budget(t0, max);

        let n = 1 + rng.pick(12) as usize;
        let balisage = gen_morceaux(&mut rng, MORCEAUX_LATEX, n);

        let canon = normaliser(&balisage);
        if !canon.is_empty() {
            assert!(!canon.contains('\\'), "{balisage:?} -> {canon:?}");
            assert!(est_equilibre(&canon), "{balisage:?} -> {canon:?}");
            // idempotence sur forme déjà canonique
            assert_eq!(normaliser(&canon), canon, "{balisage:?}");
        }

        if balisage.contains("\\int") {
            assert_eq!(classifier(&balisage), TypeExpression::Integrale);
        }

        let r = executer(&TexteReconnu::balisage(balisage.clone()));
        assert_eq!(r.canonique, canon);
        if canon.is_empty() {
            assert_eq!(r.chemin, Chemin::Aucun, "{balisage:?}");
            assert!(r.resultat.is_err());
        } else {
            assert_eq!(r.chemin, Chemin::Symbolique);
        }
    }
}

#[test]
fn fuzz_safe_ocr_brut_invariants() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    let mut rng = Rng::new(0x5EED_u64);

    for _ in 0..300 {
        budget(t0, max);

        let n = rng.pick(16) as usize;
        let brut = gen_morceaux(&mut rng, MORCEAUX_OCR, n);

        let propre = nettoyer(&brut);
        assert!(
            propre.chars().all(|c| c.is_ascii_digit() || "+-*/%.()".contains(c)),
            "{brut:?} -> {propre:?}"
        );

        let r = executer(&TexteReconnu::brut(brut.clone()));
        match r.chemin {
            Chemin::Aucun => assert_eq!(r.resultat, Err(EchecEvaluation::EntreeVide)),
            Chemin::Arithmetique => match &r.resultat {
                Ok(Valeur::Numerique(v)) => assert!(v.is_finite()),
                autre => panic!("{brut:?} : {autre:?}"),
            },
            Chemin::ArithmetiqueVersSymbolique => {}
            Chemin::Symbolique => panic!("source brute sans arithmétique: {brut:?}"),
        }
    }
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    let expr = somme_balancee("1/2", 800);
    budget(t0, max);

    // 800*(1/2) = 400, côté exact comme côté arithmétique
    assert_eq!(evaluer_symbolique(&expr), Ok(Valeur::Numerique(400.0)));
    let r = executer(&TexteReconnu::brut(expr));
    assert_eq!(r.chemin, Chemin::Arithmetique);
    assert_eq!(r.message(), "400");
}

/// Chaîne gauche de `n` termes : "1+1+...+1" ou "1-1+1*1..." (jamais de division).
fn chaine_gauche(rng: &mut Rng, n: usize) -> (String, Option<f64>) {
    if rng.coin() {
        return (vec!["1"; n].join("+"), Some(n as f64));
    }
    let mut s = "1".to_string();
    for _ in 1..n {
        s.push_str(rng.choix(&["+", "-", "*"]));
        s.push('1');
    }
    (s, None)
}

#[test]
fn fuzz_safe_chaines_gauches_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_secs(3);
    let trop_grande = Err(EchecEvaluation::Evaluateur("expression trop grande".into()));

    let mut rng = Rng::new(0xC0FFEE);
    for _ in 0..40 {
        let n = match rng.pick(3) {
            0 => 1 + rng.pick(100) as usize,
            1 => 300 + rng.pick(3_000) as usize,
            _ => 10_000 + rng.pick(10_000) as usize,
        };

        // chaîne binaire ou moins unaires empilés
        let (expr, attendu) = if rng.coin() {
            chaine_gauche(&mut rng, n)
        } else {
            (format!("{}1", "-".repeat(n)), Some(if n % 2 == 0 { 1.0 } else { -1.0 }))
        };

        let brut = executer(&TexteReconnu::brut(expr.clone()));
        assert_eq!(brut.chemin, Chemin::Arithmetique, "n={n}");
        if let Some(v) = attendu {
            assert_eq!(brut.resultat, Ok(Valeur::Numerique(v)), "n={n}");
        }

        let balise = executer(&TexteReconnu::balisage(expr));
        if n <= 100 {
            assert!(balise.est_succes(), "n={n} : {:?}", balise.resultat);
        } else {
            assert_eq!(balise.resultat, trop_grande, "n={n}");
        }
        budget(t0, max);
    }
}
