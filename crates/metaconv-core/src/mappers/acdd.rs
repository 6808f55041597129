//! ACDD/ERDDAP global-attribute mapping
//!
//! Produces a flat mapping of ERDDAP global attributes following the
//! ACDD 1.3 conventions from a canonical record, and renders it as the
//! `<addAttributes>` fragment ERDDAP expects in `datasets.xml`.

use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::error::Result;
use crate::mappers::has_role;
use crate::references::{
    keyword_vocabulary, HISTORY_BANNER, MAINTENANCE_NOTE_PREFIX, PLATFORM_VOCABULARY,
};
use crate::value::{
    drop_empty_values, get_path, get_str, insert_non_empty, require, require_lang_str,
    require_str, string_or_lang,
};
use quick_xml::escape::escape;
use serde_json::{Map, Value};

/// Generate ERDDAP global attributes from a canonical record.
///
/// The first contact with role `owner` becomes the creator and the first
/// with role `publisher` the publisher; additional matches degrade with a
/// diagnostic. Empty values are dropped after assembly.
pub fn global_attributes(
    record: &Value,
    language: &str,
    diagnostics: &mut Diagnostics,
) -> Result<Map<String, Value>> {
    let contacts = require(record, "contact")?
        .as_array()
        .cloned()
        .unwrap_or_default();

    let creators: Vec<&Value> = contacts.iter().filter(|c| has_role(c, "owner")).collect();
    let publishers: Vec<&Value> = contacts
        .iter()
        .filter(|c| has_role(c, "publisher"))
        .collect();

    if creators.len() > 1 {
        diagnostics.warn(
            DiagnosticCode::MultipleMatches,
            "contact",
            "Multiple creators found, using the first one",
        );
    }
    if publishers.len() > 1 {
        diagnostics.warn(
            DiagnosticCode::MultipleMatches,
            "contact",
            "Multiple publishers found, using the first one",
        );
    }

    // use_constraints is a required section even when its sub-fields are not
    let use_constraints = require(record, "metadata.use_constraints")?;
    let comment = build_comment(use_constraints, language, diagnostics);

    let mut attributes = Map::new();
    insert_non_empty(
        &mut attributes,
        "institution",
        creators
            .first()
            .and_then(|c| get_str(c, "organization.name"))
            .map(Into::into)
            .unwrap_or(Value::Null),
    );
    attributes.insert(
        "title".to_string(),
        require_lang_str(record, "identification.title", language)?.into(),
    );
    attributes.insert(
        "summary".to_string(),
        require_lang_str(record, "identification.abstract", language)?.into(),
    );
    insert_non_empty(
        &mut attributes,
        "project",
        join_string_array(get_path(record, "identification.project"), ",").into(),
    );
    insert_non_empty(&mut attributes, "comment", comment.into());
    attributes.insert(
        "progress".to_string(),
        require_str(record, "identification.progress_code")?.into(),
    );

    let keywords = require(record, "identification.keywords")?;
    insert_non_empty(
        &mut attributes,
        "keywords",
        prefixed_keywords(keywords, language).into(),
    );
    insert_non_empty(
        &mut attributes,
        "keywords_vocabulary",
        keyword_vocabularies(keywords, language).into(),
    );

    attributes.insert(
        "id".to_string(),
        require_str(record, "metadata.identifier")?.into(),
    );
    attributes.insert(
        "naming_authority".to_string(),
        require_str(record, "metadata.naming_authority")?.into(),
    );
    insert_non_empty(
        &mut attributes,
        "date_modified",
        get_str(record, "metadata.dates.revision").into(),
    );
    insert_non_empty(
        &mut attributes,
        "date_created",
        get_str(record, "metadata.dates.publication").into(),
    );
    insert_non_empty(
        &mut attributes,
        "product_version",
        get_str(record, "identification.edition").into(),
    );
    insert_non_empty(
        &mut attributes,
        "history",
        generate_history(record, language, diagnostics).into(),
    );
    insert_non_empty(
        &mut attributes,
        "license",
        get_str(record, "metadata.use_constraints.licence.url").into(),
    );

    if let Some(creator) = creators.first() {
        contact_attributes(creator, "creator", &mut attributes, diagnostics);
    }
    if let Some(publisher) = publishers.first() {
        contact_attributes(publisher, "publisher", &mut attributes, diagnostics);
    }
    contributor_attributes(&contacts, &mut attributes, diagnostics);

    insert_non_empty(
        &mut attributes,
        "doi",
        get_str(record, "identification.identifier").into(),
    );
    insert_non_empty(
        &mut attributes,
        "metadata_link",
        get_str(record, "identification.identifier").into(),
    );
    insert_non_empty(
        &mut attributes,
        "metadata_form",
        get_str(record, "metadata.maintenance_note")
            .map(|note| note.replace(MAINTENANCE_NOTE_PREFIX, ""))
            .into(),
    );
    platform_attributes(record, &mut attributes, diagnostics);

    drop_empty_values(&mut attributes);
    Ok(attributes)
}

/// Render attributes as an ERDDAP `<addAttributes>` fragment, preserving
/// insertion order.
pub fn to_xml(attributes: &Map<String, Value>) -> String {
    let mut output = vec!["<addAttributes>".to_string()];
    for (key, value) in attributes {
        output.push(format!(
            "    <att name=\"{}\">{}</att>",
            escape(key.as_str()),
            escape(att_text(value).as_str()),
        ));
    }
    output.push("</addAttributes>".to_string());
    output.join("\n")
}

/// Attribute values render as bare text; strings unquoted, scalars as-is.
pub(crate) fn att_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn join_string_array(value: Option<&Value>, separator: &str) -> Option<String> {
    let items: Vec<&str> = value?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .collect();
    (!items.is_empty()).then(|| items.join(separator))
}

/// Concatenate all keyword groups for the language, each entry carrying its
/// group's vocabulary prefix.
fn prefixed_keywords(keywords: &Value, language: &str) -> Option<String> {
    let groups = keywords.as_object()?;
    let mut entries = Vec::new();
    for (group, group_keywords) in groups {
        let prefix = keyword_vocabulary(group).prefix;
        if let Some(words) = group_keywords.get(language).and_then(Value::as_array) {
            for word in words.iter().filter_map(Value::as_str) {
                entries.push(format!("{prefix}{word}"));
            }
        }
    }
    (!entries.is_empty()).then(|| entries.join(","))
}

/// List the vocabularies of groups that have both a label and keywords for
/// the language.
fn keyword_vocabularies(keywords: &Value, language: &str) -> Option<String> {
    let groups = keywords.as_object()?;
    let mut entries = Vec::new();
    for (group, group_keywords) in groups {
        let vocabulary = keyword_vocabulary(group);
        let has_keywords = group_keywords
            .get(language)
            .and_then(Value::as_array)
            .map(|words| !words.is_empty())
            .unwrap_or(false);
        if let (Some(label), true) = (vocabulary.label, has_keywords) {
            entries.push(format!("{} {}", vocabulary.prefix, label));
        }
    }
    (!entries.is_empty()).then(|| entries.join(","))
}

/// Generate a history string from the record's metadata history field.
fn generate_history(record: &Value, language: &str, diagnostics: &mut Diagnostics) -> Option<String> {
    let history = get_path(record, "metadata.history")?;
    match history {
        Value::Object(map) => match map.get(language).and_then(Value::as_str) {
            Some(text) => Some(text.to_string()),
            None => {
                diagnostics.info(
                    DiagnosticCode::MissingOptional,
                    "metadata.history",
                    format!("No '{language}' history entry"),
                );
                None
            }
        },
        Value::Array(_) => {
            let dumped = serde_yaml::to_string(history).ok()?;
            Some(format!("{HISTORY_BANNER}{dumped}"))
        }
        _ => {
            diagnostics.warn(
                DiagnosticCode::InvalidShape,
                "metadata.history",
                "Invalid history format",
            );
            None
        }
    }
}

/// Assemble the `comment` attribute from the optional limitations text and
/// its optional translation note.
fn build_comment(use_constraints: &Value, language: &str, diagnostics: &mut Diagnostics) -> String {
    let mut blocks = Vec::new();

    let limitations = use_constraints.get("limitations");
    if let Some(text) = limitations.and_then(|l| string_or_lang(l, language)) {
        blocks.push(format!("##Limitations:\n{text}"));
    }

    let translation = limitations
        .and_then(|l| l.get("translations"))
        .and_then(|t| t.get(language));
    match translation {
        None | Some(Value::Null) => {}
        Some(Value::String(message)) if !message.is_empty() => {
            blocks.push(format!("##Translation:\n{message}"));
        }
        Some(Value::String(_)) => {}
        Some(Value::Object(map)) if map.contains_key("message") => {
            if let Some(message) = map.get("message").and_then(Value::as_str) {
                blocks.push(format!("##Translation:\n{message}"));
            }
        }
        Some(other) => {
            diagnostics.warn(
                DiagnosticCode::InvalidShape,
                "metadata.use_constraints.limitations.translations",
                format!("Invalid translation comment format: {other}"),
            );
        }
    }

    blocks.join("\n\n")
}

/// Expand a contact into `{role}_*` attributes.
fn contact_attributes(
    contact: &Value,
    role: &str,
    attributes: &mut Map<String, Value>,
    diagnostics: &mut Diagnostics,
) {
    if let Some(individual) = contact.get("individual") {
        insert_non_empty(
            attributes,
            &format!("{role}_name"),
            get_str(individual, "name").into(),
        );
        insert_non_empty(
            attributes,
            &format!("{role}_email"),
            get_str(individual, "email").into(),
        );
        insert_non_empty(
            attributes,
            &format!("{role}_orcid"),
            get_str(individual, "orcid").into(),
        );
        attributes.insert(format!("{role}_type"), "person".into());
    } else {
        insert_non_empty(
            attributes,
            &format!("{role}_name"),
            get_str(contact, "organization.name").into(),
        );
        insert_non_empty(
            attributes,
            &format!("{role}_email"),
            get_str(contact, "organization.email").into(),
        );
        attributes.insert(format!("{role}_type"), "institution".into());
    }

    let Some(organization) = contact.get("organization").filter(|o| o.is_object()) else {
        diagnostics.warn(
            DiagnosticCode::MissingOptional,
            "contact.organization",
            format!("No organization found for {role} contact"),
        );
        return;
    };

    for (suffix, field) in [
        ("institution", "name"),
        ("address", "address"),
        ("city", "city"),
        ("country", "country"),
        ("url", "url"),
        ("ror", "ror"),
    ] {
        insert_non_empty(
            attributes,
            &format!("{role}_{suffix}"),
            get_str(organization, field).into(),
        );
    }
}

/// Join every contact into `contributor_name`/`contributor_role`.
fn contributor_attributes(
    contacts: &[Value],
    attributes: &mut Map<String, Value>,
    diagnostics: &mut Diagnostics,
) {
    let mut names = Vec::new();
    let mut roles = Vec::new();
    for (index, contact) in contacts.iter().enumerate() {
        let name = get_str(contact, "individual.name")
            .or_else(|| get_str(contact, "organization.name"));
        let Some(name) = name else {
            diagnostics.warn(
                DiagnosticCode::InvalidShape,
                &format!("contact[{index}]"),
                "Contact has neither an individual nor an organization name",
            );
            continue;
        };
        names.push(name.to_string());
        roles.push(
            contact
                .get("roles")
                .and_then(Value::as_array)
                .map(|r| {
                    r.iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(",")
                })
                .unwrap_or_default(),
        );
    }
    insert_non_empty(attributes, "contributor_name", names.join(";").into());
    insert_non_empty(attributes, "contributor_role", roles.join(";").into());
}

/// First platform entry, when present and well-shaped.
fn platform_attributes(
    record: &Value,
    attributes: &mut Map<String, Value>,
    diagnostics: &mut Diagnostics,
) {
    let Some(platform) = record.get("platform").filter(|p| !p.is_null()) else {
        return;
    };
    let platform_type = platform
        .as_array()
        .and_then(|entries| entries.first())
        .and_then(|entry| entry.get("type"))
        .and_then(Value::as_str);
    match platform_type {
        Some(platform_type) => {
            attributes.insert("platform".to_string(), platform_type.into());
            attributes.insert(
                "platform_vocabulary".to_string(),
                PLATFORM_VOCABULARY.into(),
            );
        }
        None => diagnostics.warn(
            DiagnosticCode::InvalidShape,
            "platform",
            "Platform entry has no type",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_record() -> Value {
        json!({
            "identification": {
                "title": {"en": "Water temperature", "fr": "Température de l'eau"},
                "abstract": {"en": "Hourly observations", "fr": "Observations horaires"},
                "progress_code": "onGoing",
                "edition": "1.0",
                "project": ["Example Project"],
                "identifier": "https://doi.org/10.1234/abcd",
                "keywords": {
                    "default": {"en": ["ocean"], "fr": ["océan"]},
                    "eov": {"en": ["temperature"]},
                },
            },
            "metadata": {
                "identifier": "abc-123",
                "naming_authority": "ca.cioos",
                "dates": {"revision": "2023-05-02T10:00:00Z", "publication": "2023-05-01"},
                "use_constraints": {
                    "licence": {"code": "CC-BY-4.0", "url": "https://creativecommons.org/licenses/by/4.0/"},
                    "limitations": {
                        "en": "Preliminary data",
                        "translations": {"fr": {"message": "Données préliminaires"}},
                    },
                },
                "maintenance_note": "Generated from https://forms.example.org/abc-123",
                "history": {"en": "Created by hand"},
            },
            "contact": [
                {
                    "roles": ["owner", "pointOfContact"],
                    "individual": {"name": "Doe, Jane", "email": "jane@example.org", "orcid": "0000-0001-2345-6789"},
                    "organization": {"name": "Ocean Institute", "address": "1 Shore Rd", "city": "Halifax", "country": "Canada", "url": "example.org", "ror": "https://ror.org/01abcde"},
                    "inCitation": true,
                },
                {
                    "roles": ["publisher"],
                    "organization": {"name": "Data Centre", "email": "info@example.org", "city": "Victoria", "country": "Canada", "url": "https://datacentre.example.org"},
                    "inCitation": true,
                },
            ],
            "distribution": [
                {"url": "https://erddap.example.org/erddap/tabledap/abc123.html", "name": {"en": "ERDDAP dataset"}},
            ],
        })
    }

    #[test]
    fn test_global_attributes_shape() {
        let mut diagnostics = Diagnostics::new();
        let attrs = global_attributes(&test_record(), "en", &mut diagnostics).unwrap();

        assert_eq!(attrs["title"], "Water temperature");
        assert_eq!(attrs["summary"], "Hourly observations");
        assert_eq!(attrs["id"], "abc-123");
        assert_eq!(attrs["naming_authority"], "ca.cioos");
        assert_eq!(attrs["creator_name"], "Doe, Jane");
        assert_eq!(attrs["creator_type"], "person");
        assert_eq!(attrs["creator_institution"], "Ocean Institute");
        assert_eq!(attrs["publisher_name"], "Data Centre");
        assert_eq!(attrs["publisher_type"], "institution");
        assert_eq!(attrs["contributor_name"], "Doe, Jane;Data Centre");
        assert_eq!(attrs["contributor_role"], "owner,pointOfContact;publisher");
        assert_eq!(attrs["metadata_form"], "https://forms.example.org/abc-123");
        assert_eq!(attrs["history"], "Created by hand");
        assert_eq!(attrs["progress"], "onGoing");
        assert_eq!(attrs["product_version"], "1.0");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.items());
    }

    #[test]
    fn test_keyword_prefixing() {
        let mut diagnostics = Diagnostics::new();
        let attrs = global_attributes(&test_record(), "en", &mut diagnostics).unwrap();
        assert_eq!(attrs["keywords"], "ocean,CIOOS:temperature");
        assert_eq!(
            attrs["keywords_vocabulary"],
            "CIOOS: CIOOS Essential Ocean Variables Vocabulary"
        );
    }

    #[test]
    fn test_single_eov_keyword() {
        let mut record = test_record();
        record["identification"]["keywords"] = json!({"eov": {"en": ["temperature"]}});
        let mut diagnostics = Diagnostics::new();
        let attrs = global_attributes(&record, "en", &mut diagnostics).unwrap();
        assert_eq!(attrs["keywords"], "CIOOS:temperature");
    }

    #[test]
    fn test_comment_blocks() {
        let mut diagnostics = Diagnostics::new();
        let attrs = global_attributes(&test_record(), "en", &mut diagnostics).unwrap();
        assert_eq!(attrs["comment"], "##Limitations:\nPreliminary data");

        let attrs_fr = global_attributes(&test_record(), "fr", &mut diagnostics).unwrap();
        let comment = attrs_fr["comment"].as_str().unwrap();
        assert!(comment.contains("##Translation:\nDonnées préliminaires"));
    }

    #[test]
    fn test_invalid_translation_shape_degrades() {
        let mut record = test_record();
        record["metadata"]["use_constraints"]["limitations"]["translations"]["en"] = json!([1, 2]);
        let mut diagnostics = Diagnostics::new();
        let attrs = global_attributes(&record, "en", &mut diagnostics).unwrap();
        assert_eq!(attrs["comment"], "##Limitations:\nPreliminary data");
        assert_eq!(
            diagnostics.with_code(DiagnosticCode::InvalidShape).count(),
            1
        );
    }

    #[test]
    fn test_multiple_owners_first_wins() {
        let mut record = test_record();
        record["contact"].as_array_mut().unwrap().push(json!({
            "roles": ["owner"],
            "organization": {"name": "Second Institute"},
        }));
        let mut diagnostics = Diagnostics::new();
        let attrs = global_attributes(&record, "en", &mut diagnostics).unwrap();
        assert_eq!(attrs["creator_name"], "Doe, Jane");
        assert_eq!(
            diagnostics
                .with_code(DiagnosticCode::MultipleMatches)
                .count(),
            1
        );
    }

    #[test]
    fn test_missing_title_is_fatal() {
        let mut record = test_record();
        record["identification"]["title"] = json!({"fr": "Titre seulement"});
        let mut diagnostics = Diagnostics::new();
        let err = global_attributes(&record, "en", &mut diagnostics).unwrap_err();
        assert!(err.to_string().contains("identification.title.en"));
    }

    #[test]
    fn test_list_history_gets_banner() {
        let mut record = test_record();
        record["metadata"]["history"] = json!([{"date": "2023-01-01", "note": "created"}]);
        let mut diagnostics = Diagnostics::new();
        let attrs = global_attributes(&record, "en", &mut diagnostics).unwrap();
        let history = attrs["history"].as_str().unwrap();
        assert!(history.starts_with("Metadata record history:\n"));
        assert!(history.contains("created"));
    }

    #[test]
    fn test_no_empty_values_in_output() {
        let mut diagnostics = Diagnostics::new();
        let attrs = global_attributes(&test_record(), "en", &mut diagnostics).unwrap();
        for (key, value) in &attrs {
            assert!(
                !crate::value::is_empty_value(value),
                "attribute '{key}' is empty"
            );
        }
    }

    #[test]
    fn test_xml_fragment() {
        let mut attributes = Map::new();
        attributes.insert("title".to_string(), "A & B <test>".into());
        attributes.insert("id".to_string(), "abc-123".into());
        let xml = to_xml(&attributes);
        assert!(xml.starts_with("<addAttributes>"));
        assert!(xml.ends_with("</addAttributes>"));
        assert!(xml.contains("<att name=\"title\">A &amp; B &lt;test&gt;</att>"));
        let title_pos = xml.find("name=\"title\"").unwrap();
        let id_pos = xml.find("name=\"id\"").unwrap();
        assert!(title_pos < id_pos, "insertion order must be preserved");
    }
}
