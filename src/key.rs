use crate::{
    date::guess_year,
    error::{RecordError, Result},
    item::{Field, Item},
    text::strip_accents,
};

/// Sort key of items that are never rendered; sorts after any year.
pub const NON_BIBLIOGRAPHIC_SORT_KEY: &str = "xxx";

const STOPWORDS: &[&str] = &["a", "the", "on"];

pub fn first_author_surname(item: &Item) -> Result<&str> {
    Ok(item.first_creator()?.surname())
}

/// First word that is not a stopword (compared case-insensitively).
pub fn first_significant_word<'a>(words: &[&'a str]) -> Option<&'a str> {
    words
        .iter()
        .copied()
        .find(|w| !STOPWORDS.iter().any(|s| w.eq_ignore_ascii_case(s)))
}

/// The three ingredients shared by the citation and sort keys.
struct KeyParts {
    surname: String,
    word: String,
    year: i32,
}

fn key_parts(item: &Item) -> Result<KeyParts> {
    let surname = strip_accents(first_author_surname(item)?).to_lowercase();
    let date = item
        .raw(Field::Date)
        .ok_or(RecordError::MissingField("date"))?;
    let year = guess_year(date);
    let title = strip_accents(item.require(Field::Title)?);
    let words: Vec<&str> = title.split_whitespace().collect();
    let word = first_significant_word(&words)
        .ok_or_else(|| RecordError::TitleWordNotFound(title.clone()))?
        .to_lowercase();
    Ok(KeyParts { surname, word, year })
}

/// `surname_word_year`, e.g. `novak_study_2018`. Collisions are not resolved.
pub fn citation_key(item: &Item) -> Result<String> {
    let KeyParts { surname, word, year } = key_parts(item)?;
    Ok(format!("{surname}_{word}_{year}"))
}

/// `year surname word`; ascending order puts older work first and
/// attachments last.
pub fn sort_key(item: &Item) -> Result<String> {
    if !item.item_type().is_bibliographic() {
        return Ok(NON_BIBLIOGRAPHIC_SORT_KEY.to_string());
    }
    let KeyParts { surname, word, year } = key_parts(item)?;
    Ok(format!("{year} {surname} {word}"))
}
