//! Citation generation
//!
//! Builds a CSL-style item from a record's in-citation contacts and renders
//! an APA-shaped bibliography entry to HTML or plain text. Citation
//! generation is best-effort: any failure yields an empty string rather
//! than propagating, so a missing citation never blocks an EML render.

use crate::value::get_str;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;

/// Output form for a generated citation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationFormat {
    Html,
    Text,
}

static TAG_PATTERN: OnceLock<Regex> = OnceLock::new();

fn strip_tags(html: &str) -> String {
    let pattern = TAG_PATTERN.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern compiles"));
    pattern.replace_all(html, "").replace("&amp;", "&")
}

/// Generate a citation for a record.
///
/// Returns an empty string when the record has no usable citation contacts
/// or no title.
pub fn generate_citation(record: &Value, language: &str, format: CitationFormat) -> String {
    let Some(item) = csl_item(record, language) else {
        return String::new();
    };
    let Some(rendered) = render_apa(&item) else {
        return String::new();
    };
    match format {
        CitationFormat::Html => format!("<span class=\"citation\">{rendered}</span>"),
        CitationFormat::Text => strip_tags(&rendered),
    }
}

fn contact_field<'a>(contact: &'a Value, key: &str) -> &'a str {
    contact.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn org_name<'a>(contact: &'a Value) -> &'a str {
    let direct = contact_field(contact, "orgName");
    if !direct.is_empty() {
        return direct;
    }
    get_str(contact, "organization.name").unwrap_or_default()
}

fn contact_roles(contact: &Value) -> Vec<&str> {
    contact
        .get("role")
        .or_else(|| contact.get("roles"))
        .and_then(Value::as_array)
        .map(|roles| roles.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Usable for citation: both personal name parts longer than one character,
/// or an organization name longer than one character.
fn is_valid_citation_contact(contact: &Value) -> bool {
    (contact_field(contact, "givenNames").len() > 1
        && contact_field(contact, "lastName").len() > 1)
        || org_name(contact).len() > 1
}

/// Decompose an ISO date string into CSL date-parts, by available precision.
fn date_parts(raw: &str) -> Option<Vec<i64>> {
    let mut parts = Vec::new();
    for (index, segment) in raw.split('T').next()?.split('-').take(3).enumerate() {
        match segment.parse::<i64>() {
            Ok(part) if index == 0 && segment.len() == 4 => parts.push(part),
            Ok(part) if index > 0 => parts.push(part),
            _ => break,
        }
    }
    (!parts.is_empty()).then_some(parts)
}

/// Build a CSL item from a record, reproducing the contact selection rules:
/// only in-citation contacts, publisher-only contacts excluded from the
/// author list, invalid name shapes skipped.
pub fn csl_item(record: &Value, language: &str) -> Option<Value> {
    let empty = Vec::new();
    let contacts = record
        .get("contacts")
        .or_else(|| record.get("contact"))
        .and_then(Value::as_array)
        .unwrap_or(&empty);

    let title_map = record
        .get("title")
        .or_else(|| record.get("identification").and_then(|i| i.get("title")));
    let title = title_map
        .and_then(Value::as_object)
        .and_then(|map| {
            map.get(language)
                .or_else(|| map.values().next())
                .and_then(Value::as_str)
        })
        .unwrap_or_default();

    let dataset_identifier = contact_field(record, "datasetIdentifier");
    let dataset_identifier = if dataset_identifier.is_empty() {
        get_str(record, "identification.identifier").unwrap_or_default()
    } else {
        dataset_identifier
    };

    let created = get_str(record, "created")
        .or_else(|| get_str(record, "metadata.dates.creation"));
    let date_published = get_str(record, "datePublished")
        .or_else(|| get_str(record, "metadata.dates.publication"));
    let date_revised = get_str(record, "dateRevised")
        .or_else(|| get_str(record, "metadata.dates.revision"));
    let issued = date_revised.or(date_published).or(created);

    let edition = get_str(record, "edition")
        .or_else(|| get_str(record, "identification.edition"));
    let record_type = get_str(record, "metadataScope")
        .or_else(|| get_str(record, "type"))
        .unwrap_or("dataset");

    let mut publishers: Vec<&str> = Vec::new();
    let mut authors: Vec<Value> = Vec::new();
    for contact in contacts {
        if !contact
            .get("inCitation")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            continue;
        }
        let roles = contact_roles(contact);
        if roles.contains(&"publisher")
            && !org_name(contact).is_empty()
            && is_valid_citation_contact(contact)
            && !publishers.contains(&org_name(contact))
        {
            publishers.push(org_name(contact));
        }
        if roles.contains(&"publisher") && roles.len() == 1 {
            // Publisher-only contacts are cited as publisher, not author
            continue;
        }
        if !is_valid_citation_contact(contact) {
            continue;
        }
        let given = contact_field(contact, "givenNames");
        let family = contact_field(contact, "lastName");
        if given.len() > 1 && family.len() > 1 {
            authors.push(json!({"given": given.trim(), "family": family.trim()}));
        } else {
            let organization = org_name(contact);
            if !organization.is_empty() {
                authors.push(json!({"family": organization.trim()}));
            }
        }
    }

    let doi = crate::mappers::extract_doi(dataset_identifier);

    let id = if !dataset_identifier.is_empty() {
        dataset_identifier.to_string()
    } else if !title.is_empty() {
        title.chars().take(30).collect()
    } else {
        "id".to_string()
    };

    let mut item = Map::new();
    item.insert("id".to_string(), id.into());
    if title.is_empty() {
        return None;
    }
    item.insert("title".to_string(), title.into());
    item.insert("author".to_string(), authors.into());
    match issued.and_then(date_parts) {
        Some(parts) => {
            item.insert("issued".to_string(), json!({"date-parts": [parts]}));
        }
        None => {
            item.insert("issued".to_string(), json!({"raw": "n.d."}));
        }
    }
    if !publishers.is_empty() {
        item.insert("publisher".to_string(), publishers.join(", ").into());
    }
    if let Some(doi) = doi {
        item.insert("DOI".to_string(), doi.into());
    }
    if let Some(edition) = edition {
        item.insert("version".to_string(), format!("v{edition}").into());
    }
    item.insert("type".to_string(), record_type.into());
    Some(Value::Object(item))
}

/// Render a CSL item as an APA-shaped bibliography entry in HTML.
fn render_apa(item: &Value) -> Option<String> {
    let authors = item.get("author").and_then(Value::as_array)?;
    let title = item.get("title").and_then(Value::as_str)?;

    let mut names: Vec<String> = Vec::new();
    for author in authors {
        let family = author.get("family").and_then(Value::as_str)?;
        match author.get("given").and_then(Value::as_str) {
            Some(given) => {
                let initials: Vec<String> = given
                    .split_whitespace()
                    .filter_map(|part| part.chars().next())
                    .map(|initial| format!("{initial}."))
                    .collect();
                names.push(format!("{}, {}", family, initials.join(" ")));
            }
            None => names.push(family.to_string()),
        }
    }

    let author_list = match names.len() {
        0 => String::new(),
        1 => names[0].clone(),
        _ => format!(
            "{}, &amp; {}",
            names[..names.len() - 1].join(", "),
            names[names.len() - 1]
        ),
    };

    let year = match item.get("issued") {
        Some(issued) => issued
            .get("date-parts")
            .and_then(|parts| parts[0][0].as_i64())
            .map(|y| y.to_string())
            .unwrap_or_else(|| "n.d.".to_string()),
        None => "n.d.".to_string(),
    };

    let mut entry = String::new();
    if !author_list.is_empty() {
        entry.push_str(&author_list);
        entry.push(' ');
    }
    entry.push_str(&format!("({year}). <i>{title}</i>"));
    if let Some(version) = item.get("version").and_then(Value::as_str) {
        entry.push_str(&format!(" ({version})"));
    }
    entry.push_str(" [Data set].");
    if let Some(publisher) = item.get("publisher").and_then(Value::as_str) {
        entry.push_str(&format!(" {publisher}."));
    }
    if let Some(doi) = item.get("DOI").and_then(Value::as_str) {
        entry.push_str(&format!(" https://doi.org/{doi}"));
    }
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn firebase_record() -> Value {
        json!({
            "title": {"en": "Water temperature", "fr": "Température de l'eau"},
            "datasetIdentifier": "https://doi.org/10.1234/abcd",
            "datePublished": "2021-05-01",
            "dateRevised": "2023-05-02",
            "edition": "1.0",
            "metadataScope": "dataset",
            "contacts": [
                {
                    "givenNames": "Jane",
                    "lastName": "Doe",
                    "orgName": "Ocean Institute",
                    "role": ["owner"],
                    "inCitation": true,
                },
                {
                    "orgName": "Data Centre",
                    "role": ["publisher"],
                    "inCitation": true,
                },
                {
                    "givenNames": "X",
                    "lastName": "Y",
                    "role": ["custodian"],
                    "inCitation": true,
                },
                {
                    "givenNames": "Sam",
                    "lastName": "Hidden",
                    "role": ["editor"],
                    "inCitation": false,
                },
            ],
        })
    }

    #[test]
    fn test_csl_item_selection() {
        let item = csl_item(&firebase_record(), "en").unwrap();
        assert_eq!(item["title"], "Water temperature");
        let authors = item["author"].as_array().unwrap();
        // Jane Doe only: publisher-only is excluded, "X Y" has short names,
        // Sam Hidden is not inCitation
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0]["family"], "Doe");
        assert_eq!(item["publisher"], "Data Centre");
        assert_eq!(item["DOI"], "10.1234/abcd");
        assert_eq!(item["version"], "v1.0");
        // Revision date wins the issued fallback chain
        assert_eq!(item["issued"]["date-parts"][0][0], 2023);
    }

    #[test]
    fn test_issued_precision() {
        assert_eq!(date_parts("2023-05-02"), Some(vec![2023, 5, 2]));
        assert_eq!(date_parts("2023-05"), Some(vec![2023, 5]));
        assert_eq!(date_parts("2023"), Some(vec![2023]));
        assert_eq!(date_parts("2023-05-02T10:00:00Z"), Some(vec![2023, 5, 2]));
        assert_eq!(date_parts("no date"), None);
    }

    #[test]
    fn test_missing_dates_render_nd() {
        let mut record = firebase_record();
        let object = record.as_object_mut().unwrap();
        object.remove("datePublished");
        object.remove("dateRevised");
        let citation = generate_citation(&record, "en", CitationFormat::Text);
        assert!(citation.contains("(n.d.)"), "{citation}");
    }

    #[test]
    fn test_html_and_text_rendering() {
        let html = generate_citation(&firebase_record(), "en", CitationFormat::Html);
        assert!(html.starts_with("<span class=\"citation\">"));
        assert!(html.contains("<i>Water temperature</i>"));
        assert!(html.contains("https://doi.org/10.1234/abcd"));

        let text = generate_citation(&firebase_record(), "en", CitationFormat::Text);
        assert!(!text.contains('<'));
        assert!(text.contains("Doe, J. (2023)."));
    }

    #[test]
    fn test_failure_yields_empty_string() {
        let citation = generate_citation(&json!({}), "en", CitationFormat::Html);
        assert_eq!(citation, "");
        let citation = generate_citation(&json!({"contacts": []}), "en", CitationFormat::Text);
        assert_eq!(citation, "");
    }

    #[test]
    fn test_canonical_record_fallback_keys() {
        let record = json!({
            "identification": {"title": {"en": "Canonical title"}, "identifier": "10.9/z", "edition": "2"},
            "metadata": {"dates": {"publication": "2020-01-01"}},
            "contact": [
                {"orgName": "Org", "roles": ["owner"], "inCitation": true},
            ],
        });
        let item = csl_item(&record, "en").unwrap();
        assert_eq!(item["title"], "Canonical title");
        assert_eq!(item["DOI"], "10.9/z");
        assert_eq!(item["issued"]["date-parts"][0][0], 2020);
    }
}
