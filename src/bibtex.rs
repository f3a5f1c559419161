use crate::{
    date::guess_year,
    error::{RecordError, Result},
    item::{Field, Item, ItemType},
    key::citation_key,
    text::{escape_for_markup, page_range, protect},
};

/// How a Zotero field is mapped onto a BibTeX field.
struct Mapping {
    bibtex: &'static str,
    field: Field,
    protect: bool,
    convert: Option<fn(&str) -> String>,
}

const fn plain(bibtex: &'static str, field: Field) -> Mapping {
    Mapping { bibtex, field, protect: false, convert: None }
}

const fn protected(bibtex: &'static str, field: Field) -> Mapping {
    Mapping { bibtex, field, protect: true, convert: None }
}

/// Optional fields, in output order. They follow title, author, year and
/// howpublished.
const OPTIONAL_FIELDS: &[Mapping] = &[
    protected("booktitle", Field::ProceedingsTitle),
    plain("doi", Field::Doi),
    plain("isbn", Field::Isbn),
    plain("issn", Field::Issn),
    protected("journal", Field::PublicationTitle),
    plain("location", Field::Place),
    plain("number", Field::Issue),
    Mapping { bibtex: "pages", field: Field::Pages, protect: false, convert: Some(page_range) },
    plain("publisher", Field::Publisher),
    protected("series", Field::Series),
    plain("url", Field::Url),
    plain("volume", Field::Volume),
    plain("shorttitle", Field::ShortTitle),
    plain("abstract", Field::AbstractNote),
];

impl ItemType {
    pub fn bibtex_type(&self) -> &'static str {
        match self {
            ItemType::JournalArticle => "article",
            ItemType::ConferencePaper => "inproceedings",
            _ => "misc",
        }
    }
}

struct EntryWriter {
    out: String,
}

impl EntryWriter {
    fn open(entry_type: &str, key: &str) -> Self {
        EntryWriter { out: format!("@{entry_type}{{{key},\n") }
    }

    fn field(&mut self, name: &str, value: &str) {
        self.out
            .push_str(&format!("    {name} = {{{}}},\n", escape_for_markup(value)));
    }

    fn close(mut self) -> String {
        self.out.push_str("}\n\n");
        self.out
    }
}

fn author_list(item: &Item) -> String {
    item.creators()
        .iter()
        .filter(|c| c.role.is_credited())
        .map(|c| c.display_name())
        .collect::<Vec<_>>()
        .join(" and ")
}

fn how_published(item: &Item) -> Option<String> {
    match item.item_type() {
        ItemType::WebPage | ItemType::BlogPost => {
            item.field(Field::Url).map(|url| format!("\\url{{{url}}}"))
        }
        ItemType::Presentation => item.field(Field::MeetingName).map(|meeting| {
            match item.field(Field::Url) {
                Some(url) => format!("Presentation at {{{meeting}}}, \\url{{{url}}}"),
                None => format!("Presentation at {{{meeting}}}"),
            }
        }),
        _ => None,
    }
}

/// Render one item as a BibTeX entry, or `None` for attachments and notes.
///
/// The entry ends with a blank line so entries can simply be concatenated.
pub fn format_entry(item: &Item) -> Result<Option<String>> {
    if !item.item_type().is_bibliographic() {
        return Ok(None);
    }

    let key = citation_key(item)?;
    let mut entry = EntryWriter::open(item.item_type().bibtex_type(), &key);

    entry.field("title", &protect(item.require(Field::Title)?));
    entry.field("author", &author_list(item));
    let date = item
        .raw(Field::Date)
        .ok_or(RecordError::MissingField("date"))?;
    entry.field("year", &guess_year(date).to_string());
    if let Some(hp) = how_published(item) {
        entry.field("howpublished", &hp);
    }

    for m in OPTIONAL_FIELDS {
        let Some(raw) = item.field(m.field) else {
            continue;
        };
        let mut value = match m.convert {
            Some(convert) => convert(raw),
            None => raw.to_string(),
        };
        if m.protect {
            value = protect(&value);
        }
        entry.field(m.bibtex, &value);
    }

    Ok(Some(entry.close()))
}
