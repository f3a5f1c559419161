//! Bibliographic records as delivered by the Zotero web API.
//!
//! The service hands out loosely typed JSON objects. We keep the field bag as
//! is and expose typed accessors that make absence explicit, while the item
//! type and creator roles are closed enums with a catch-all arm.

use serde_json::{Map, Value};

use crate::error::{RecordError, Result};

#[derive(Debug, Clone)]
pub struct Item {
    key: Option<String>,
    item_type: ItemType,
    fields: Map<String, Value>,
    creators: Vec<Creator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemType {
    JournalArticle,
    ConferencePaper,
    Presentation,
    WebPage,
    BlogPost,
    Attachment,
    Note,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creator {
    pub name: CreatorName,
    pub role: CreatorRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatorName {
    Person { last: String, first: String },
    /// Single-field name, typically an organisation.
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatorRole {
    Author,
    Presenter,
    Editor,
    Contributor,
    Translator,
    SeriesEditor,
    BookAuthor,
    Other(String),
}

/// Item fields we know how to render, named after their Zotero keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Date,
    Doi,
    Isbn,
    Issn,
    PublicationTitle,
    ProceedingsTitle,
    Place,
    Issue,
    Pages,
    Publisher,
    Series,
    Url,
    Volume,
    ShortTitle,
    AbstractNote,
    MeetingName,
}

impl Field {
    pub fn zotero_name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Date => "date",
            Field::Doi => "DOI",
            Field::Isbn => "ISBN",
            Field::Issn => "ISSN",
            Field::PublicationTitle => "publicationTitle",
            Field::ProceedingsTitle => "proceedingsTitle",
            Field::Place => "place",
            Field::Issue => "issue",
            Field::Pages => "pages",
            Field::Publisher => "publisher",
            Field::Series => "series",
            Field::Url => "url",
            Field::Volume => "volume",
            Field::ShortTitle => "shortTitle",
            Field::AbstractNote => "abstractNote",
            Field::MeetingName => "meetingName",
        }
    }
}

impl ItemType {
    pub fn from_zotero(s: &str) -> Self {
        match s {
            "journalArticle" => ItemType::JournalArticle,
            "conferencePaper" => ItemType::ConferencePaper,
            "presentation" => ItemType::Presentation,
            "webpage" => ItemType::WebPage,
            "blogPost" => ItemType::BlogPost,
            "attachment" => ItemType::Attachment,
            "note" => ItemType::Note,
            other => ItemType::Other(other.to_string()),
        }
    }

    /// Attachments and notes hang off real items and are never cited.
    pub fn is_bibliographic(&self) -> bool {
        !matches!(self, ItemType::Attachment | ItemType::Note)
    }
}

impl CreatorRole {
    pub fn from_zotero(s: &str) -> Self {
        match s {
            "author" => CreatorRole::Author,
            "presenter" => CreatorRole::Presenter,
            "editor" => CreatorRole::Editor,
            "contributor" => CreatorRole::Contributor,
            "translator" => CreatorRole::Translator,
            "seriesEditor" => CreatorRole::SeriesEditor,
            "bookAuthor" => CreatorRole::BookAuthor,
            other => CreatorRole::Other(other.to_string()),
        }
    }

    /// Roles that end up in the BibTeX `author` list.
    pub fn is_credited(&self) -> bool {
        matches!(self, CreatorRole::Author | CreatorRole::Presenter)
    }
}

impl Creator {
    fn from_json(value: &Value, index: usize) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| RecordError::Malformed(format!("creator #{} is not an object", index + 1)))?;
        let text = |k: &str| obj.get(k).and_then(Value::as_str);

        let name = match (text("lastName"), text("name")) {
            (Some(last), _) => CreatorName::Person {
                last: last.to_string(),
                first: text("firstName").unwrap_or_default().to_string(),
            },
            (None, Some(name)) => CreatorName::Literal(name.to_string()),
            (None, None) => {
                return Err(RecordError::Malformed(format!(
                    "creator #{} has neither lastName nor name",
                    index + 1
                )));
            }
        };
        let role = CreatorRole::from_zotero(text("creatorType").unwrap_or("author"));
        Ok(Creator { name, role })
    }

    pub fn surname(&self) -> &str {
        match &self.name {
            CreatorName::Person { last, .. } => last,
            CreatorName::Literal(name) => name,
        }
    }

    /// `Surname, First` for people, or just `Surname` when there is no first
    /// name. `{Name}` for organisations so BibTeX does not try to split them.
    pub fn display_name(&self) -> String {
        match &self.name {
            CreatorName::Person { last, first } if first.is_empty() => last.clone(),
            CreatorName::Person { last, first } => format!("{last}, {first}"),
            CreatorName::Literal(name) => format!("{{{name}}}"),
        }
    }
}

impl Item {
    /// Build an item from a Zotero API object. Both the full envelope
    /// (`{"key": .., "data": {..}}`) and a bare `data` object are accepted.
    pub fn from_json(value: &Value) -> Result<Self> {
        let envelope = value
            .as_object()
            .ok_or_else(|| RecordError::Malformed("item is not a JSON object".to_string()))?;
        let data = match envelope.get("data") {
            Some(Value::Object(data)) => data,
            Some(_) => return Err(RecordError::Malformed("`data` is not an object".to_string())),
            None => envelope,
        };

        let key = envelope
            .get("key")
            .or_else(|| data.get("key"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let item_type = data
            .get("itemType")
            .and_then(Value::as_str)
            .map(ItemType::from_zotero)
            .ok_or(RecordError::MissingField("itemType"))?;
        let creators = match data.get("creators") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(list)) => list
                .iter()
                .enumerate()
                .map(|(i, c)| Creator::from_json(c, i))
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(RecordError::Malformed("`creators` is not a list".to_string())),
        };

        Ok(Item {
            key,
            item_type,
            fields: data.clone(),
            creators,
        })
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn item_type(&self) -> &ItemType {
        &self.item_type
    }

    pub fn creators(&self) -> &[Creator] {
        &self.creators
    }

    /// Raw string value of a field, even when empty.
    pub fn raw(&self, field: Field) -> Option<&str> {
        self.fields.get(field.zotero_name()).and_then(Value::as_str)
    }

    /// Field value if present and non-empty.
    pub fn field(&self, field: Field) -> Option<&str> {
        self.raw(field).filter(|v| !v.is_empty())
    }

    pub fn require(&self, field: Field) -> Result<&str> {
        self.field(field)
            .ok_or(RecordError::MissingField(field.zotero_name()))
    }

    pub fn first_creator(&self) -> Result<&Creator> {
        self.creators
            .first()
            .ok_or(RecordError::MissingField("creators"))
    }

    /// Best-effort label for error messages.
    pub fn describe(&self) -> String {
        match (self.key(), self.field(Field::Title)) {
            (Some(key), Some(title)) => format!("{key} \"{title}\""),
            (Some(key), None) => key.to_string(),
            (None, Some(title)) => format!("\"{title}\""),
            (None, None) => "untitled item".to_string(),
        }
    }
}
