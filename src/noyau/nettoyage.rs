// src/noyau/nettoyage.rs
//
// Nettoyage du texte OCR brut (pas de balisage).
// Ordre :
// 1) retirer tous les blancs (espaces, retours ligne, tabulations)
// 2) substitutions fixes (confusions OCR classiques)
// 3) filtre : chiffres, '.', + - * / % ( ) ; tout le reste disparaît en silence
//
// Volontairement “lossy” : "5==3" devient "53" (les '=' tombent, les chiffres se collent).

/// Substitutions caractère par caractère, appliquées avant le filtre.
/// `None` = caractère supprimé.
fn substitue(c: char) -> Option<char> {
    match c {
        // l’OCR confond le signe × avec la lettre x
        'x' | 'X' | '×' => Some('*'),
        // virgule décimale
        ',' => Some('.'),
        // tirets longs / signe moins typographique
        '—' | '–' | '−' => Some('-'),
        '÷' => Some('/'),
        '=' => None,
        '_' => Some('-'),
        autre => Some(autre),
    }
}

fn est_autorise(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | '*' | '/' | '%' | '(' | ')')
}

/// Nettoie un texte OCR brut vers l’alphabet arithmétique sûr.
/// Entrée vide => sortie vide (pas d’erreur).
pub fn nettoyer(brut: &str) -> String {
    brut.chars()
        .filter(|c| !c.is_whitespace())
        .filter_map(substitue)
        .filter(|&c| est_autorise(c))
        .collect()
}
