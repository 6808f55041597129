//! EML document rendering
//!
//! Renders an EML 2.2.0 XML document from a legacy-shaped record. Only the
//! legacy input shape is supported: the EML party layout needs the flat
//! `givenNames`/`lastName`/`orgName` contact fields, so canonical records
//! are rejected upstream with an unsupported-schema error.

use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::error::Result;
use crate::references::{eml_roles, license};
use crate::value::get_str;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;

const EML_NAMESPACE: &str = "https://eml.ecoinformatics.org/eml-2.2.0";
const EML_SYSTEM: &str = "https://catalogue.cioos.org";

/// True if any element of `first` appears in `second`.
pub fn array_overlap(first: &[&str], second: &[&str]) -> bool {
    first.iter().any(|item| second.contains(item))
}

fn contact_roles(contact: &Value) -> Vec<&str> {
    contact
        .get("role")
        .and_then(Value::as_array)
        .map(|roles| roles.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn contacts(record: &Value) -> Vec<&Value> {
    record
        .get("contacts")
        .and_then(Value::as_array)
        .map(|contacts| contacts.iter().collect())
        .unwrap_or_default()
}

/// Contacts whose roles overlap the party's role set.
fn party_contacts<'a>(record: &'a Value, party: &str) -> Vec<&'a Value> {
    let roles = eml_roles(party);
    contacts(record)
        .into_iter()
        .filter(|contact| array_overlap(roles, &contact_roles(contact)))
        .collect()
}

/// Render an EML XML document from a legacy-shaped record.
///
/// `citation` is embedded verbatim in the additional-metadata block; pass
/// an empty string to omit it.
pub fn eml_xml(
    record: &Value,
    language: &str,
    citation: &str,
    diagnostics: &mut Diagnostics,
) -> Result<String> {
    let mut buffer = Vec::new();
    let mut xml = Writer::new_with_indent(&mut buffer, b' ', 2);

    let identifier = get_str(record, "identifier")
        .or_else(|| get_str(record, "datasetIdentifier"))
        .unwrap_or("unknown");

    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("eml:eml");
    root.push_attribute(("xmlns:eml", EML_NAMESPACE));
    root.push_attribute(("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"));
    root.push_attribute(("packageId", identifier));
    root.push_attribute(("system", EML_SYSTEM));
    root.push_attribute(("xml:lang", language));
    xml.write_event(Event::Start(root))?;

    xml.write_event(Event::Start(BytesStart::new("dataset")))?;

    write_titles(&mut xml, record)?;

    for contact in party_contacts(record, "creator") {
        write_party(&mut xml, contact, "creator", None)?;
    }
    for contact in party_contacts(record, "metadataProvider") {
        write_party(&mut xml, contact, "metadataProvider", None)?;
    }
    for contact in party_contacts(record, "associatedParty") {
        let role = contact_roles(contact)
            .into_iter()
            .find(|role| eml_roles("associatedParty").contains(role))
            .unwrap_or("associatedParty")
            .to_string();
        write_party(&mut xml, contact, "associatedParty", Some(&role))?;
    }

    let publication_date = get_str(record, "datePublished")
        .or_else(|| get_str(record, "created"));
    if let Some(date) = publication_date {
        write_text(&mut xml, "pubDate", date.split('T').next().unwrap_or(date))?;
    }

    if let Some(abstract_text) = record
        .get("abstract")
        .and_then(|a| crate::value::string_or_lang(a, language))
    {
        xml.write_event(Event::Start(BytesStart::new("abstract")))?;
        write_text(&mut xml, "para", abstract_text)?;
        xml.write_event(Event::End(BytesEnd::new("abstract")))?;
    }

    write_keywords(&mut xml, record, language)?;
    write_license(&mut xml, record, diagnostics)?;

    let contact_parties: Vec<&Value> = contacts(record)
        .into_iter()
        .filter(|contact| contact_roles(contact).contains(&"pointOfContact"))
        .collect();
    match contact_parties.first() {
        Some(contact) => write_party(&mut xml, contact, "contact", None)?,
        None => {
            if let Some(first) = contacts(record).first() {
                diagnostics.warn(
                    DiagnosticCode::MissingOptional,
                    "contacts",
                    "No pointOfContact contact, using the first contact",
                );
                write_party(&mut xml, first, "contact", None)?;
            }
        }
    }

    xml.write_event(Event::End(BytesEnd::new("dataset")))?;

    if !citation.is_empty() {
        xml.write_event(Event::Start(BytesStart::new("additionalMetadata")))?;
        xml.write_event(Event::Start(BytesStart::new("metadata")))?;
        write_text(&mut xml, "citation", citation)?;
        xml.write_event(Event::End(BytesEnd::new("metadata")))?;
        xml.write_event(Event::End(BytesEnd::new("additionalMetadata")))?;
    }

    xml.write_event(Event::End(BytesEnd::new("eml:eml")))?;
    Ok(String::from_utf8(buffer).expect("writer output is UTF-8"))
}

fn write_text<W: std::io::Write>(xml: &mut Writer<W>, element: &str, text: &str) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new(element)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(element)))?;
    Ok(())
}

fn write_titles<W: std::io::Write>(xml: &mut Writer<W>, record: &Value) -> Result<()> {
    let Some(titles) = record.get("title").and_then(Value::as_object) else {
        return Ok(());
    };
    for (lang, title) in titles {
        if lang == "translations" {
            continue;
        }
        let Some(title) = title.as_str().filter(|t| !t.is_empty()) else {
            continue;
        };
        let mut element = BytesStart::new("title");
        element.push_attribute(("xml:lang", lang.as_str()));
        xml.write_event(Event::Start(element))?;
        xml.write_event(Event::Text(BytesText::new(title)))?;
        xml.write_event(Event::End(BytesEnd::new("title")))?;
    }
    Ok(())
}

/// Write a responsible-party element: individual name when both parts are
/// present, organization name, email, and an explicit role for associated
/// parties.
fn write_party<W: std::io::Write>(
    xml: &mut Writer<W>,
    contact: &Value,
    element: &str,
    role: Option<&str>,
) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new(element)))?;

    let given = contact
        .get("givenNames")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let family = contact
        .get("lastName")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if !given.is_empty() && !family.is_empty() {
        xml.write_event(Event::Start(BytesStart::new("individualName")))?;
        write_text(xml, "givenName", given)?;
        write_text(xml, "surName", family)?;
        xml.write_event(Event::End(BytesEnd::new("individualName")))?;
    }
    if let Some(organization) = contact.get("orgName").and_then(Value::as_str) {
        if !organization.is_empty() {
            write_text(xml, "organizationName", organization)?;
        }
    }
    let email = contact
        .get("indEmail")
        .or_else(|| contact.get("orgEmail"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    if !email.is_empty() {
        write_text(xml, "electronicMailAddress", email)?;
    }
    if let Some(role) = role {
        write_text(xml, "role", role)?;
    }

    xml.write_event(Event::End(BytesEnd::new(element)))?;
    Ok(())
}

fn write_keywords<W: std::io::Write>(
    xml: &mut Writer<W>,
    record: &Value,
    language: &str,
) -> Result<()> {
    let Some(keywords) = record
        .get("keywords")
        .and_then(|k| k.get(language))
        .and_then(Value::as_array)
    else {
        return Ok(());
    };
    if keywords.is_empty() {
        return Ok(());
    }
    xml.write_event(Event::Start(BytesStart::new("keywordSet")))?;
    for keyword in keywords.iter().filter_map(Value::as_str) {
        write_text(xml, "keyword", keyword)?;
    }
    xml.write_event(Event::End(BytesEnd::new("keywordSet")))?;
    Ok(())
}

fn write_license<W: std::io::Write>(
    xml: &mut Writer<W>,
    record: &Value,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let Some(code) = get_str(record, "license") else {
        return Ok(());
    };
    let Some(entry) = license(code) else {
        diagnostics.warn(
            DiagnosticCode::MissingOptional,
            "license",
            format!("License '{code}' not found in the license table"),
        );
        return Ok(());
    };
    let title = entry.get("title").and_then(Value::as_str).unwrap_or(code);
    let url = entry.get("url").and_then(Value::as_str).unwrap_or_default();

    xml.write_event(Event::Start(BytesStart::new("intellectualRights")))?;
    write_text(xml, "para", &format!("{title} ({url})"))?;
    xml.write_event(Event::End(BytesEnd::new("intellectualRights")))?;

    xml.write_event(Event::Start(BytesStart::new("licensed")))?;
    write_text(xml, "licenseName", title)?;
    if !url.is_empty() {
        write_text(xml, "url", url)?;
    }
    write_text(
        xml,
        "identifier",
        entry.get("code").and_then(Value::as_str).unwrap_or(code),
    )?;
    xml.write_event(Event::End(BytesEnd::new("licensed")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn firebase_record() -> Value {
        json!({
            "title": {"en": "Water temperature", "fr": "Température de l'eau"},
            "abstract": {"en": "Hourly observations"},
            "identifier": "abc-123",
            "datasetIdentifier": "https://doi.org/10.1234/abcd",
            "datePublished": "2021-05-01",
            "license": "CC-BY-4.0",
            "keywords": {"en": ["ocean", "temperature"]},
            "contacts": [
                {
                    "givenNames": "Jane",
                    "lastName": "Doe",
                    "orgName": "Ocean Institute",
                    "indEmail": "jane@example.org",
                    "role": ["author", "pointOfContact"],
                    "inCitation": true,
                },
                {
                    "orgName": "Data Centre",
                    "orgEmail": "info@example.org",
                    "role": ["distributor"],
                    "inCitation": false,
                },
                {
                    "givenNames": "Alex",
                    "lastName": "Smith",
                    "role": ["principalInvestigator"],
                    "inCitation": true,
                },
            ],
        })
    }

    #[test]
    fn test_array_overlap() {
        assert!(array_overlap(&["author", "originator"], &["author"]));
        assert!(!array_overlap(&["author"], &["publisher"]));
        assert!(!array_overlap(&[], &["author"]));
    }

    #[test]
    fn test_document_structure() {
        let mut diagnostics = Diagnostics::new();
        let xml = eml_xml(&firebase_record(), "en", "", &mut diagnostics).unwrap();

        assert!(xml.contains("https://eml.ecoinformatics.org/eml-2.2.0"));
        assert!(xml.contains("packageId=\"abc-123\""));
        assert!(xml.contains("<title xml:lang=\"en\">Water temperature</title>"));
        assert!(xml.contains("<pubDate>2021-05-01</pubDate>"));
        assert!(xml.contains("<para>Hourly observations</para>"));
        assert!(xml.contains("<keyword>ocean</keyword>"));
    }

    #[test]
    fn test_parties_by_role_mapping() {
        let mut diagnostics = Diagnostics::new();
        let xml = eml_xml(&firebase_record(), "en", "", &mut diagnostics).unwrap();

        // author → creator, distributor → metadataProvider,
        // principalInvestigator → associatedParty with explicit role
        assert!(xml.contains("<creator>"));
        assert!(xml.contains("<surName>Doe</surName>"));
        assert!(xml.contains("<metadataProvider>"));
        assert!(xml.contains("<organizationName>Data Centre</organizationName>"));
        assert!(xml.contains("<associatedParty>"));
        assert!(xml.contains("<role>principalInvestigator</role>"));
        assert!(xml.contains("<contact>"));
    }

    #[test]
    fn test_license_block() {
        let mut diagnostics = Diagnostics::new();
        let xml = eml_xml(&firebase_record(), "en", "", &mut diagnostics).unwrap();
        assert!(xml.contains("<licenseName>Creative Commons Attribution 4.0 International</licenseName>"));
        assert!(xml.contains("<identifier>CC-BY-4.0</identifier>"));
    }

    #[test]
    fn test_unknown_license_degrades() {
        let mut record = firebase_record();
        record["license"] = json!("no-such-license");
        let mut diagnostics = Diagnostics::new();
        let xml = eml_xml(&record, "en", "", &mut diagnostics).unwrap();
        assert!(!xml.contains("<licensed>"));
        assert!(diagnostics.has_warnings());
    }

    #[test]
    fn test_citation_embedded() {
        let mut diagnostics = Diagnostics::new();
        let citation = "Doe, J. (2023). Water temperature [Data set].";
        let xml = eml_xml(&firebase_record(), "en", citation, &mut diagnostics).unwrap();
        assert!(xml.contains("<additionalMetadata>"));
        assert!(xml.contains(citation));
    }
}
