use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Drop diacritics by decomposing to NFD and removing the combining marks.
pub fn strip_accents(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Replace en-dashes with the BibTeX `--` ligature. Nothing else is touched.
pub fn escape_for_markup(s: &str) -> String {
    s.replace('\u{2013}', "--")
}

/// Turn lone hyphens of a page range into `--`, leaving existing runs alone.
pub fn page_range(s: &str) -> String {
    static HYPHENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());
    HYPHENS
        .replace_all(s, |caps: &regex::Captures<'_>| {
            let run = &caps[0];
            if run.len() == 1 { "--".to_string() } else { run.to_string() }
        })
        .into_owned()
}

/// Wrap in braces so BibTeX keeps the value verbatim (capitalisation etc).
pub fn protect(s: &str) -> String {
    format!("{{{s}}}")
}
