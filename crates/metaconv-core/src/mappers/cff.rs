//! Citation File Format mapping
//!
//! Produces a CFF 1.2 document (<https://citation-file-format.github.io>)
//! from a canonical record, following the schema-guide conventions for
//! person/entity authors and identifier entries.

use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::error::Result;
use crate::mappers::{extract_doi, has_role};
use crate::references::country_code;
use crate::value::{
    drop_empty_values, get_path, get_str, insert_non_empty, lang_str, require, require_str,
    string_or_lang,
};
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;

/// Options controlling CFF generation.
#[derive(Debug, Clone)]
pub struct CffOptions {
    pub language: String,
    pub message: String,
    pub resource_base_url: String,
    pub record_type: String,
}

impl Default for CffOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            message: "If you use this software, please cite it as below".to_string(),
            resource_base_url: "https://catalogue.cioos.org/dataset/".to_string(),
            record_type: "dataset".to_string(),
        }
    }
}

fn placeholder(language: &str) -> &'static str {
    match language {
        "fr" => "Non disponible",
        _ => "Not available",
    }
}

/// Give scheme-less URLs an `https://` prefix.
fn fix_url(url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Map a contact to a CFF person sub-mapping.
fn cff_person(contact: &Value, language: &str, diagnostics: &mut Diagnostics) -> Map<String, Value> {
    let name = get_str(contact, "individual.name").unwrap_or_default();
    let (family, given) = match name.split_once(", ") {
        Some((family, given)) => (family, given),
        None => (name, ""),
    };

    let mut person = Map::new();
    insert_non_empty(&mut person, "given-names", given.into());
    insert_non_empty(&mut person, "family-names", family.into());
    insert_non_empty(&mut person, "email", get_str(contact, "individual.email").into());
    insert_non_empty(&mut person, "orcid", get_str(contact, "individual.orcid").into());
    insert_non_empty(
        &mut person,
        "affiliation",
        get_str(contact, "organization.name").into(),
    );
    insert_non_empty(&mut person, "address", get_str(contact, "organization.address").into());
    insert_non_empty(&mut person, "city", get_str(contact, "organization.city").into());
    insert_non_empty(
        &mut person,
        "country",
        resolve_country(contact, language, diagnostics).into(),
    );
    insert_non_empty(
        &mut person,
        "website",
        get_str(contact, "organization.url").map(fix_url).into(),
    );
    person
}

/// Map an organization-only contact to a CFF entity sub-mapping.
fn cff_entity(contact: &Value, language: &str, diagnostics: &mut Diagnostics) -> Map<String, Value> {
    let mut entity = Map::new();
    insert_non_empty(&mut entity, "name", get_str(contact, "organization.name").into());
    insert_non_empty(&mut entity, "address", get_str(contact, "organization.address").into());
    insert_non_empty(&mut entity, "city", get_str(contact, "organization.city").into());
    insert_non_empty(
        &mut entity,
        "country",
        resolve_country(contact, language, diagnostics).into(),
    );
    insert_non_empty(&mut entity, "email", get_str(contact, "organization.email").into());
    insert_non_empty(
        &mut entity,
        "website",
        get_str(contact, "organization.url").map(fix_url).into(),
    );
    entity
}

fn resolve_country(
    contact: &Value,
    _language: &str,
    diagnostics: &mut Diagnostics,
) -> Option<String> {
    let name = get_str(contact, "organization.country")?;
    match country_code(name) {
        Some(code) => Some(code),
        None => {
            diagnostics.warn(
                DiagnosticCode::UnresolvedCountry,
                "contact.organization.country",
                format!("Country '{name}' not found in the country table"),
            );
            None
        }
    }
}

/// Map a contact as person (has individual) or entity (organization-only).
fn cff_contact(contact: &Value, language: &str, diagnostics: &mut Diagnostics) -> Map<String, Value> {
    if contact.get("individual").map(|i| !i.is_null()).unwrap_or(false) {
        cff_person(contact, language, diagnostics)
    } else {
        cff_entity(contact, language, diagnostics)
    }
}

/// Unique authors by mapped equality, preserving first-seen order.
fn unique_authors(
    contacts: &[Value],
    language: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<Value> {
    let mut authors: Vec<Value> = Vec::new();
    for contact in contacts {
        let mapped = Value::Object(cff_contact(contact, language, diagnostics));
        if mapped.as_object().map(Map::is_empty).unwrap_or(true) {
            diagnostics.warn(
                DiagnosticCode::InvalidShape,
                "contact",
                "Contact mapped to an empty CFF author, skipping",
            );
            continue;
        }
        if !authors.contains(&mapped) {
            authors.push(mapped);
        }
    }
    authors
}

/// One identifier entry per HTTP(S) distribution resource.
fn resource_identifiers(
    record: &Value,
    language: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<Value> {
    let mut resources = Vec::new();
    let Some(distribution) = record.get("distribution").and_then(Value::as_array) else {
        return resources;
    };
    for (index, entry) in distribution.iter().enumerate() {
        let url = entry.get("url").and_then(Value::as_str).unwrap_or_default();
        if !url.starts_with("http") {
            diagnostics.warn(
                DiagnosticCode::SkippedResource,
                &format!("distribution[{index}].url"),
                format!("Invalid resource URL: {url}"),
            );
            continue;
        }
        let name = entry
            .get("name")
            .and_then(|n| string_or_lang(n, language))
            .unwrap_or_default();
        let description = entry
            .get("description")
            .and_then(|d| string_or_lang(d, language))
            .unwrap_or_else(|| placeholder(language));
        let full_description: Vec<&str> = [name, description]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect();
        resources.push(json!({
            "description": full_description.join(": "),
            "type": "url",
            "value": url,
        }));
    }
    resources
}

/// Generate a CFF mapping from a canonical record.
pub fn cff_record(
    record: &Value,
    options: &CffOptions,
    diagnostics: &mut Diagnostics,
) -> Result<Map<String, Value>> {
    let language = options.language.as_str();
    let contacts = require(record, "contact")?
        .as_array()
        .cloned()
        .unwrap_or_default();

    let naming_authority = require_str(record, "metadata.naming_authority")?;
    let identifier = require_str(record, "metadata.identifier")?;
    let resource_url = format!(
        "{}{}_{}",
        options.resource_base_url,
        naming_authority.replace('.', "-"),
        identifier,
    );

    let mut identifiers = vec![
        json!({
            "description": format!("{naming_authority} Unique Identifier"),
            "type": "other",
            "value": identifier,
        }),
        json!({
            "description": "Metadata record URL",
            "type": "url",
            "value": resource_url,
        }),
    ];
    if let Some(doi) = get_str(record, "identification.identifier").and_then(extract_doi) {
        identifiers.push(json!({"description": "DOI", "type": "doi", "value": doi}));
    }
    identifiers.push(json!({
        "description": "Metadata Form used to generate this record",
        "type": "url",
        "value": require_str(record, "metadata.maintenance_note")?
            .replace(crate::references::MAINTENANCE_NOTE_PREFIX, ""),
    }));
    identifiers.extend(resource_identifiers(record, language, diagnostics));

    // Deduplicated keyword union across all groups, ordered for determinism
    let keywords: BTreeSet<String> = get_path(record, "identification.keywords")
        .and_then(Value::as_object)
        .map(|groups| {
            groups
                .values()
                .filter_map(|group| group.get(language))
                .filter_map(Value::as_array)
                .flatten()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let contact_entries: Vec<Value> = contacts
        .iter()
        .filter(|c| has_role(c, "pointOfContact"))
        .map(|c| Value::Object(cff_contact(c, language, diagnostics)))
        .collect();

    let mut document = Map::new();
    document.insert("cff-version".to_string(), "1.2.0".into());
    document.insert("message".to_string(), options.message.clone().into());
    document.insert(
        "authors".to_string(),
        unique_authors(&contacts, language, diagnostics).into(),
    );
    insert_non_empty(
        &mut document,
        "title",
        lang_str(record, "identification.title", language).into(),
    );
    insert_non_empty(
        &mut document,
        "abstract",
        lang_str(record, "identification.abstract", language).into(),
    );
    document.insert(
        "date-released".to_string(),
        require_str(record, "metadata.dates.revision")?
            .split('T')
            .next()
            .unwrap_or_default()
            .into(),
    );
    insert_non_empty(&mut document, "contact", contact_entries.into());
    document.insert("identifiers".to_string(), identifiers.into());
    insert_non_empty(
        &mut document,
        "keywords",
        keywords.into_iter().collect::<Vec<_>>().into(),
    );
    insert_non_empty(
        &mut document,
        "license",
        get_str(record, "metadata.use_constraints.licence.code").into(),
    );
    insert_non_empty(
        &mut document,
        "license-url",
        get_str(record, "metadata.use_constraints.licence.url").into(),
    );
    document.insert("type".to_string(), options.record_type.clone().into());
    document.insert("url".to_string(), resource_url.into());
    insert_non_empty(
        &mut document,
        "version",
        get_str(record, "identification.edition").into(),
    );
    drop_empty_values(&mut document);

    metaconv_schemas::validate_cff(&Value::Object(document.clone()))?;
    Ok(document)
}

/// Render a CFF mapping as YAML.
pub fn to_yaml(document: &Map<String, Value>) -> Result<String> {
    Ok(serde_yaml::to_string(&document)?)
}
