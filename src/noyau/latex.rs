// src/noyau/latex.rs
//
// Normaliseur LaTeX -> expression canonique (grammaire infixe du moteur symbolique).
//
// Liste ORDONNÉE de règles nommées (chaque règle est testable seule).
// L’ordre compte : les règles tardives supposent que les accolades structurelles
// ont déjà été réduites par les précédentes.
//
//  1. delimiteurs       \[ \] \( \) $$ $
//  2. espacements       \, \; \: \! \quad \qquad ~  -> espace
//  3. styles            \mathrm{A} \text{A} \operatorname{A} ... -> A
//  4. derivees          \frac{d}{dx} E -> derivative(E, x)   (AVANT les fractions)
//  5. fractions         \frac{A}{B} -> (A)/(B)               (profondeur d’accolades)
//  6. racines           \sqrt{A} -> sqrt(A) ; \sqrt[n]{A} -> (A)^(1/(n))
//  7. exposants_echappes ^\{A\} -> ^(A) ; _\{A\} -> _A
//  8. integrales        \int_{a}^{b} f -> integral(f, x, a, b) ; \int f -> integral(f, x)
//  9. exposants         ^{A} -> ^(A) ; _{A} -> _A
// 10. gauche_droite     \left( \right) \left[ \right]
// 11. symboles          grecs, \pi, \times \cdot \div \pm \mp
// 12. fonctions         \sin{A} -> sin(A) ... (\ln -> log) ; sans argument : name()
// 13. blancs            espaces multiples -> un seul, trim
// 14. residus           { } -> ( ) ; refus si '\' résiduel ou parenthèses déséquilibrées
//
// NOTE: dérivée / intégrale capturent UN seul jeton (jusqu’au premier blanc) :
// approximation assumée, pas une grammaire complète.
//
// Toute erreur interne => chaîne vide (le pipeline y verra un échec d’analyse).

use std::sync::OnceLock;

use log::{debug, warn};
use regex::Regex;

/// Une règle de réécriture nommée.
#[derive(Clone, Copy)]
pub struct Regle {
    pub nom: &'static str,
    pub applique: fn(&str) -> Result<String, String>,
}

pub const REGLES: &[Regle] = &[
    Regle { nom: "delimiteurs", applique: delimiteurs },
    Regle { nom: "espacements", applique: espacements },
    Regle { nom: "styles", applique: styles },
    Regle { nom: "derivees", applique: derivees },
    Regle { nom: "fractions", applique: fractions },
    Regle { nom: "racines", applique: racines },
    Regle { nom: "exposants_echappes", applique: exposants_echappes },
    Regle { nom: "integrales", applique: integrales },
    Regle { nom: "exposants", applique: exposants },
    Regle { nom: "gauche_droite", applique: gauche_droite },
    Regle { nom: "symboles", applique: symboles },
    Regle { nom: "fonctions", applique: fonctions },
    Regle { nom: "blancs", applique: blancs },
    Regle { nom: "residus", applique: residus },
];

/// Normalise un balisage LaTeX. Entrée vide => "" ; échec interne => "".
pub fn normaliser(balisage: &str) -> String {
    normaliser_avec_trace(balisage).0
}

/// Comme `normaliser`, avec les noms des règles qui ont effectivement modifié le texte.
pub fn normaliser_avec_trace(balisage: &str) -> (String, Vec<&'static str>) {
    let mut trace = Vec::new();

    let mut cur = balisage.trim().to_string();
    if cur.is_empty() {
        return (cur, trace);
    }

    for regle in REGLES {
        match (regle.applique)(&cur) {
            Ok(next) => {
                if next != cur {
                    debug!("latex[{}]: {cur:?} -> {next:?}", regle.nom);
                    trace.push(regle.nom);
                }
                cur = next;
            }
            Err(msg) => {
                warn!("normalisation LaTeX abandonnée ({}): {msg}", regle.nom);
                trace.push(regle.nom);
                return (String::new(), trace);
            }
        }
    }

    (cur, trace)
}

/* ------------------------ Outils de balayage ------------------------ */

/// Parcourt `s` et confie chaque commande `\nom` (nom = lettres ASCII maximales) à `f`.
/// `f` renvoie `Some(reste)` si elle a consommé la commande et ce qui la suit (jusqu’à `reste`),
/// `None` pour recopier la commande telle quelle.
fn pour_chaque_commande<'a, F>(s: &'a str, mut f: F) -> Result<String, String>
where
    F: FnMut(&str, &'a str, &mut String) -> Result<Option<&'a str>, String>,
{
    let mut out = String::with_capacity(s.len());
    let mut reste = s;

    while let Some(pos) = reste.find('\\') {
        out.push_str(&reste[..pos]);
        let apres_barre = &reste[pos + 1..];

        let long = apres_barre
            .bytes()
            .take_while(|b| b.is_ascii_alphabetic())
            .count();

        if long == 0 {
            // commande-symbole (\{, \,, \\ ...) : recopiée, traitée par une autre règle
            out.push('\\');
            reste = apres_barre;
            continue;
        }

        let nom = &apres_barre[..long];
        let apres = &apres_barre[long..];

        match f(nom, apres, &mut out)? {
            Some(suite) => reste = suite,
            None => {
                out.push('\\');
                out.push_str(nom);
                reste = apres;
            }
        }
    }

    out.push_str(reste);
    Ok(out)
}

/// Groupe `{...}` équilibré (après blancs), ou un seul caractère alphanumérique (\frac12).
/// Renvoie (contenu, reste).
fn groupe(s: &str) -> Option<(&str, &str)> {
    let t = s.trim_start();
    let premier = t.chars().next()?;

    if premier != '{' {
        if premier.is_ascii_alphanumeric() {
            let l = premier.len_utf8();
            return Some((&t[..l], &t[l..]));
        }
        return None;
    }

    let mut prof = 0usize;
    let mut it = t.char_indices();
    while let Some((i, c)) = it.next() {
        match c {
            // accolade échappée : ne compte pas
            '\\' => {
                it.next();
            }
            '{' => prof += 1,
            '}' => {
                prof -= 1;
                if prof == 0 {
                    return Some((&t[1..i], &t[i + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Groupe strictement entre accolades (pas de forme “un caractère”).
fn groupe_accolades(s: &str) -> Option<(&str, &str)> {
    if s.trim_start().starts_with('{') {
        groupe(s)
    } else {
        None
    }
}

/// Prochain jeton “délimité par blancs” : s’arrête au premier blanc
/// ou à une accolade fermante sans ouvrante. Renvoie (jeton, reste).
fn jeton_suivant(s: &str) -> (&str, &str) {
    let t = s.trim_start();
    let mut prof = 0usize;
    for (i, c) in t.char_indices() {
        match c {
            c if c.is_whitespace() => return (&t[..i], &t[i..]),
            '{' => prof += 1,
            '}' => {
                if prof == 0 {
                    return (&t[..i], &t[i..]);
                }
                prof -= 1;
            }
            _ => {}
        }
    }
    (t, "")
}

/// Pousse un mot en évitant de le coller à un identifiant voisin.
fn pousse_mot(out: &mut String, mot: &str, suivant: Option<char>) {
    if out.ends_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        out.push(' ');
    }
    out.push_str(mot);
    if suivant.is_some_and(|c| c.is_ascii_alphanumeric()) {
        out.push(' ');
    }
}

fn regex_statique(cellule: &'static OnceLock<Regex>, motif: &str) -> &'static Regex {
    cellule.get_or_init(|| Regex::new(motif).expect("motif regex valide"))
}

/* ------------------------ 1..3 : nettoyage du balisage ------------------------ */

fn delimiteurs(s: &str) -> Result<String, String> {
    let mut out = s.to_string();
    for d in ["\\[", "\\]", "\\(", "\\)", "$$", "$"] {
        out = out.replace(d, "");
    }
    Ok(out)
}

fn espacements(s: &str) -> Result<String, String> {
    let mut out = s.to_string();
    for e in ["\\qquad", "\\quad", "\\,", "\\;", "\\:", "\\!", "\\ ", "~"] {
        out = out.replace(e, " ");
    }
    Ok(out)
}

const STYLES: &[&str] = &[
    "mathrm",
    "mathit",
    "mathbf",
    "mathsf",
    "text",
    "textrm",
    "operatorname",
    "displaystyle",
];

fn styles(s: &str) -> Result<String, String> {
    pour_chaque_commande(s, |nom, apres, out| {
        if !STYLES.contains(&nom) {
            return Ok(None);
        }
        // \displaystyle n’a pas d’argument
        if nom == "displaystyle" {
            return Ok(Some(apres));
        }
        match groupe_accolades(apres) {
            Some((contenu, reste)) => {
                out.push_str(&styles(contenu)?);
                Ok(Some(reste))
            }
            None => Ok(Some(apres)),
        }
    })
}

/* ------------------------ 4..6 : structures binaires puis unaires ------------------------ */

static RE_DERIVEE: OnceLock<Regex> = OnceLock::new();

/// `\frac{d}{d<var>} E` -> `derivative(E, <var>)` ; E = un jeton.
fn derivees(s: &str) -> Result<String, String> {
    let re = regex_statique(&RE_DERIVEE, r"^\s*\{\s*d\s*\}\s*\{\s*d\s*([a-zA-Z])\s*\}");

    pour_chaque_commande(s, |nom, apres, out| {
        if nom != "frac" {
            return Ok(None);
        }
        let Some(cap) = re.captures(apres) else {
            return Ok(None);
        };
        let (Some(tout), Some(var)) = (cap.get(0), cap.get(1)) else {
            return Ok(None);
        };

        let (expr, reste) = jeton_suivant(&apres[tout.end()..]);
        let expr = derivees(expr)?;
        pousse_mot(out, &format!("derivative({expr}, {})", var.as_str()), None);
        Ok(Some(reste))
    })
}

fn fractions(s: &str) -> Result<String, String> {
    pour_chaque_commande(s, |nom, apres, out| {
        if !matches!(nom, "frac" | "dfrac" | "tfrac") {
            return Ok(None);
        }
        let (num, reste) = groupe(apres).ok_or("\\frac sans numérateur")?;
        let (den, reste) = groupe(reste).ok_or("\\frac sans dénominateur")?;
        out.push_str(&format!("({})/({})", fractions(num)?, fractions(den)?));
        Ok(Some(reste))
    })
}

fn racines(s: &str) -> Result<String, String> {
    pour_chaque_commande(s, |nom, apres, out| {
        if nom != "sqrt" {
            return Ok(None);
        }

        // indice optionnel : \sqrt[n]{A}
        let (indice, apres) = match apres.trim_start().strip_prefix('[') {
            Some(t) => {
                let fin = t.find(']').ok_or("\\sqrt[ sans ]")?;
                (Some(&t[..fin]), &t[fin + 1..])
            }
            None => (None, apres),
        };

        let (arg, reste) = groupe(apres).ok_or("\\sqrt sans argument")?;
        let arg = racines(arg)?;
        match indice {
            Some(n) => out.push_str(&format!("({arg})^(1/({}))", racines(n.trim())?)),
            None => pousse_mot(out, &format!("sqrt({arg})"), None),
        }
        Ok(Some(reste))
    })
}

/* ------------------------ 7..9 : exposants / intégrales ------------------------ */

static RE_EXP_ECHAPPE: OnceLock<Regex> = OnceLock::new();
static RE_IND_ECHAPPE: OnceLock<Regex> = OnceLock::new();

fn exposants_echappes(s: &str) -> Result<String, String> {
    let exp = regex_statique(&RE_EXP_ECHAPPE, r"\^\\\{([^}]*)\\\}");
    let ind = regex_statique(&RE_IND_ECHAPPE, r"_\\\{([^}]*)\\\}");
    let out = exp.replace_all(s, "^($1)");
    Ok(ind.replace_all(&out, "_$1").into_owned())
}

/// Borne d’intégrale : `{...}`, une commande `\nom`, ou un seul caractère.
fn borne(s: &str) -> Option<(&str, &str)> {
    let t = s.trim_start();
    if t.starts_with('{') {
        return groupe(t);
    }
    if let Some(apres) = t.strip_prefix('\\') {
        let long = apres.bytes().take_while(|b| b.is_ascii_alphabetic()).count();
        if long > 0 {
            return Some((&t[..long + 1], &t[long + 1..]));
        }
        return None;
    }
    let c = t.chars().next()?;
    if c.is_ascii_alphanumeric() {
        Some((&t[..1], &t[1..]))
    } else {
        None
    }
}

/// `d<lettre>` isolé ?
fn variable_differentielle(jeton: &str) -> Option<char> {
    let mut it = jeton.chars();
    match (it.next(), it.next(), it.next()) {
        (Some('d'), Some(v), None) if v.is_ascii_alphabetic() => Some(v),
        _ => None,
    }
}

/// Sépare un suffixe `d<lettre>` collé à l’intégrande (x^2dx), si précédé d’une non-lettre.
fn separe_differentielle(jeton: &str) -> Option<(&str, char)> {
    let octets = jeton.as_bytes();
    let n = octets.len();
    if n < 3 {
        return None;
    }
    let (avant, d, v) = (octets[n - 3], octets[n - 2], octets[n - 1]);
    if d == b'd' && v.is_ascii_alphabetic() && !avant.is_ascii_alphabetic() {
        Some((&jeton[..n - 2], v as char))
    } else {
        None
    }
}

fn integrales(s: &str) -> Result<String, String> {
    pour_chaque_commande(s, |nom, apres, out| {
        if nom != "int" {
            return Ok(None);
        }

        let mut t = apres.trim_start();
        if let Some(sans) = t.strip_prefix("\\limits") {
            t = sans.trim_start();
        }

        // bornes : _a^b ou ^b_a
        let mut bornes: Option<(String, String)> = None;
        if let Some(r) = t.strip_prefix('_') {
            let (a, r) = borne(r).ok_or("borne inférieure illisible")?;
            let r = r.trim_start().strip_prefix('^').ok_or("borne supérieure manquante")?;
            let (b, r) = borne(r).ok_or("borne supérieure illisible")?;
            bornes = Some((integrales(a)?, integrales(b)?));
            t = r;
        } else if let Some(r) = t.strip_prefix('^') {
            let (b, r) = borne(r).ok_or("borne supérieure illisible")?;
            let r = r.trim_start().strip_prefix('_').ok_or("borne inférieure manquante")?;
            let (a, r) = borne(r).ok_or("borne inférieure illisible")?;
            bornes = Some((integrales(a)?, integrales(b)?));
            t = r;
        }

        let (jeton, mut reste) = jeton_suivant(t);
        let (integrande, var) = match separe_differentielle(jeton) {
            Some((f, v)) => (f, v),
            None => {
                let (suivant, apres_suivant) = jeton_suivant(reste);
                match variable_differentielle(suivant) {
                    Some(v) => {
                        reste = apres_suivant;
                        (jeton, v)
                    }
                    None => (jeton, 'x'),
                }
            }
        };
        let integrande = integrales(integrande)?;

        let appel = match bornes {
            Some((a, b)) => format!("integral({integrande}, {var}, {a}, {b})"),
            None => format!("integral({integrande}, {var})"),
        };
        pousse_mot(out, &appel, None);
        Ok(Some(reste))
    })
}

static RE_EXP: OnceLock<Regex> = OnceLock::new();
static RE_IND: OnceLock<Regex> = OnceLock::new();

/// Accolades non échappées d’exposant / indice, de l’intérieur vers l’extérieur.
fn exposants(s: &str) -> Result<String, String> {
    let exp = regex_statique(&RE_EXP, r"\^\s*\{([^{}]*)\}");
    let ind = regex_statique(&RE_IND, r"_\s*\{([^{}]*)\}");

    let mut cur = s.to_string();
    loop {
        let next = exp.replace_all(&cur, "^($1)");
        let next = ind.replace_all(&next, "_$1").into_owned();
        if next == cur {
            return Ok(cur);
        }
        cur = next;
    }
}

/* ------------------------ 10..12 : symboles et fonctions ------------------------ */

fn gauche_droite(s: &str) -> Result<String, String> {
    pour_chaque_commande(s, |nom, apres, out| {
        let c = match apres.chars().next() {
            Some(c) => c,
            None => return Ok(None),
        };
        let ok = match nom {
            "left" => c == '(' || c == '[',
            "right" => c == ')' || c == ']',
            _ => false,
        };
        if !ok {
            return Ok(None);
        }
        out.push(c);
        Ok(Some(&apres[1..]))
    })
}

const GRECS: &[&str] = &[
    "pi", "alpha", "beta", "gamma", "delta", "theta", "lambda", "mu", "sigma", "phi", "omega",
];

fn operateur(nom: &str) -> Option<&'static str> {
    match nom {
        "times" | "cdot" => Some("*"),
        "div" => Some("/"),
        "pm" => Some("+-"),
        "mp" => Some("-+"),
        _ => None,
    }
}

fn symboles(s: &str) -> Result<String, String> {
    pour_chaque_commande(s, |nom, apres, out| {
        if let Some(op) = operateur(nom) {
            out.push_str(op);
            return Ok(Some(apres));
        }
        if let Some(&g) = GRECS.iter().find(|&&g| g == nom) {
            pousse_mot(out, g, apres.chars().next());
            return Ok(Some(apres));
        }
        Ok(None)
    })
}

const FONCTIONS: &[&str] = &[
    "sin", "cos", "tan", "sec", "csc", "cot", "ln", "log", "exp",
];

fn fonctions(s: &str) -> Result<String, String> {
    pour_chaque_commande(s, |nom, apres, out| {
        if !FONCTIONS.contains(&nom) {
            return Ok(None);
        }
        let f = if nom == "ln" { "log" } else { nom };

        // \sin{A} -> sin(A)
        if let Some((arg, reste)) = groupe_accolades(apres) {
            pousse_mot(out, &format!("{f}({})", fonctions(arg)?), None);
            return Ok(Some(reste));
        }

        // \sin(A) -> sin(A) : la parenthèse reste en place
        let t = apres.trim_start();
        if t.starts_with('(') || t.starts_with('[') {
            pousse_mot(out, f, None);
            return Ok(Some(t));
        }

        // sans argument entre accolades : appel dégénéré
        pousse_mot(out, &format!("{f}()"), None);
        Ok(Some(apres))
    })
}

/* ------------------------ 13..14 : finitions ------------------------ */

static RE_BLANCS: OnceLock<Regex> = OnceLock::new();

fn blancs(s: &str) -> Result<String, String> {
    let re = regex_statique(&RE_BLANCS, r"\s+");
    Ok(re.replace_all(s, " ").trim().to_string())
}

/// Vérifie l’équilibre des parenthèses / crochets.
pub fn est_equilibre(s: &str) -> bool {
    let mut pile: Vec<char> = Vec::new();
    for c in s.chars() {
        match c {
            '(' | '[' => pile.push(c),
            ')' => {
                if pile.pop() != Some('(') {
                    return false;
                }
            }
            ']' => {
                if pile.pop() != Some('[') {
                    return false;
                }
            }
            _ => {}
        }
    }
    pile.is_empty()
}

fn residus(s: &str) -> Result<String, String> {
    let out: String = s
        .chars()
        .map(|c| match c {
            '{' => '(',
            '}' => ')',
            autre => autre,
        })
        .collect();

    if let Some(pos) = out.find('\\') {
        let cmd: String = out[pos..]
            .chars()
            .take(1)
            .chain(out[pos + 1..].chars().take_while(char::is_ascii_alphabetic))
            .collect();
        return Err(format!("commande LaTeX non reconnue: {cmd}"));
    }
    if !est_equilibre(&out) {
        return Err(format!("parenthèses déséquilibrées: {out:?}"));
    }
    Ok(out)
}
