//! DataCite Metadata Schema v4 mapping
//!
//! Follows the DataCite schema v4.6 property layout:
//! <https://datacite-metadata-schema.readthedocs.io/en/4.6/properties/overview/>

use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::error::{Error, Result};
use crate::mappers::{extract_doi, has_role};
use crate::references::{contributor_type, date_type};
use crate::value::{
    drop_empty_values, get_path, get_str, insert_non_empty, require, require_str,
};
use chrono::NaiveDate;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::{json, Map, Value};

/// Roles that never map to DataCite contributors
const NON_CONTRIBUTOR_ROLES: [&str; 3] = ["owner", "publisher", "funder"];

/// Build a DataCite name object for a contact.
fn name_object(contact: &Value) -> Map<String, Value> {
    let mut name = Map::new();
    if let Some(individual_name) = get_str(contact, "individual.name") {
        name.insert("name".to_string(), individual_name.into());
        name.insert("nameType".to_string(), "Personal".into());
        if let Some((family, given)) = individual_name.split_once(", ") {
            name.insert("givenName".to_string(), given.into());
            name.insert("familyName".to_string(), family.into());
        }
        if let Some(orcid) = get_str(contact, "individual.orcid") {
            name.insert(
                "nameIdentifiers".to_string(),
                json!([{
                    "nameIdentifier": orcid,
                    "nameIdentifierScheme": "ORCID",
                    "schemeUri": "https://orcid.org",
                }]),
            );
        }
        if let Some(organization) = get_str(contact, "organization.name") {
            let mut affiliation = Map::new();
            affiliation.insert("name".to_string(), organization.into());
            if let Some(ror) = get_str(contact, "organization.ror") {
                affiliation.insert("affiliationIdentifier".to_string(), ror.into());
                affiliation.insert("affiliationIdentifierScheme".to_string(), "ROR".into());
                affiliation.insert("schemeUri".to_string(), "https://ror.org/".into());
            }
            name.insert("affiliation".to_string(), json!([affiliation]));
        }
    } else if let Some(organization_name) = get_str(contact, "organization.name") {
        name.insert("name".to_string(), organization_name.into());
        name.insert("nameType".to_string(), "Organizational".into());
    }
    name
}

fn creators(contacts: &[Value]) -> Vec<Value> {
    contacts
        .iter()
        .filter(|c| has_role(c, "owner"))
        .map(|c| Value::Object(name_object(c)))
        .filter(|c| !c.as_object().map(Map::is_empty).unwrap_or(true))
        .collect()
}

/// Contacts with any role outside owner/publisher/funder become
/// contributors, tagged by the fixed role lookup table.
fn contributors(contacts: &[Value], diagnostics: &mut Diagnostics) -> Vec<Value> {
    let mut entries = Vec::new();
    for (index, contact) in contacts.iter().enumerate() {
        let roles: Vec<&str> = contact
            .get("roles")
            .and_then(Value::as_array)
            .map(|roles| roles.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let Some(role) = roles
            .iter()
            .find(|role| !NON_CONTRIBUTOR_ROLES.contains(role))
        else {
            continue;
        };
        let mapped_type = contributor_type(role).unwrap_or_else(|| {
            diagnostics.error(
                DiagnosticCode::UnmappedRole,
                &format!("contact[{index}].roles"),
                format!("Role '{role}' has no DataCite contributor type, using Other"),
            );
            "Other"
        });
        let mut entry = name_object(contact);
        if entry.is_empty() {
            continue;
        }
        entry.insert("contributorType".to_string(), mapped_type.into());
        entries.push(Value::Object(entry));
    }
    entries
}

fn publisher(contacts: &[Value], diagnostics: &mut Diagnostics) -> Option<Value> {
    let publisher = contacts.iter().find(|c| has_role(c, "publisher"));
    let Some(publisher) = publisher else {
        diagnostics.warn(
            DiagnosticCode::MissingOptional,
            "contact",
            "No publisher found in the record",
        );
        return None;
    };
    let name = get_str(publisher, "organization.name")?;
    let mut entry = Map::new();
    entry.insert("name".to_string(), name.into());
    if let Some(ror) = get_str(publisher, "organization.ror") {
        entry.insert("publisherIdentifier".to_string(), ror.into());
        entry.insert("publisherIdentifierScheme".to_string(), "ROR".into());
        entry.insert("schemeUri".to_string(), "https://ror.org/".into());
    }
    entry.insert("lang".to_string(), "en".into());
    Some(Value::Object(entry))
}

fn funding_references(contacts: &[Value]) -> Vec<Value> {
    contacts
        .iter()
        .filter(|c| has_role(c, "funder"))
        .filter_map(|contact| {
            let name = get_str(contact, "organization.name")?;
            let mut entry = Map::new();
            entry.insert("funderName".to_string(), name.into());
            if let Some(ror) = get_str(contact, "organization.ror") {
                entry.insert("funderIdentifier".to_string(), ror.into());
                entry.insert("funderIdentifierType".to_string(), "ROR".into());
            }
            Some(Value::Object(entry))
        })
        .collect()
}

/// One entry per language key of a `{lang: text}` map.
fn per_language_entries(value: Option<&Value>, key: &str) -> Vec<Value> {
    let Some(map) = value.and_then(Value::as_object) else {
        return Vec::new();
    };
    map.iter()
        .filter(|(lang, _)| *lang != "translations")
        .filter_map(|(lang, text)| {
            let text = text.as_str().filter(|t| !t.is_empty())?;
            Some(json!({key: text, "lang": lang}))
        })
        .collect()
}

/// Date entries from the identification and metadata date maps, plus the
/// synthesized `Collected` span.
fn dates(record: &Value, diagnostics: &mut Diagnostics) -> Vec<Value> {
    let mut entries = Vec::new();
    for section in ["identification.dates", "metadata.dates"] {
        let Some(map) = get_path(record, section).and_then(Value::as_object) else {
            continue;
        };
        for (name, date) in map {
            let Some(date) = date.as_str().filter(|d| !d.is_empty()) else {
                continue;
            };
            match date_type(name) {
                Some(mapped) => entries.push(json!({"date": date, "dateType": mapped})),
                None => {
                    diagnostics.info(
                        DiagnosticCode::UnmappedRole,
                        &format!("{section}.{name}"),
                        format!("Date name '{name}' has no DataCite date type, using Other"),
                    );
                    entries.push(json!({
                        "date": date,
                        "dateType": "Other",
                        "dateInformation": name,
                    }));
                }
            }
        }
    }

    let begin = get_str(record, "identification.temporal_begin").unwrap_or("*");
    let end = get_str(record, "identification.temporal_end").unwrap_or("*");
    entries.push(json!({
        "date": format!("{begin}/{end}"),
        "dateType": "Collected",
    }));
    entries
}

/// Strict `YYYY-MM-DD` parse of the publication date; malformed dates fail
/// the whole conversion.
fn publication_year(record: &Value) -> Result<String> {
    let date = require_str(record, "metadata.dates.publication")?;
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| {
        Error::parse(
            "metadata.dates.publication",
            format!("expected YYYY-MM-DD, got '{date}': {e}"),
        )
    })?;
    Ok(parsed.format("%Y").to_string())
}

/// Parse `spatial.polygon` space-separated `lon,lat` pairs.
fn geo_locations(record: &Value) -> Result<Vec<Value>> {
    let Some(polygon) = get_str(record, "spatial.polygon") else {
        return Ok(Vec::new());
    };
    let mut points = Vec::new();
    for pair in polygon.split_whitespace() {
        let (lon, lat) = pair.split_once(',').ok_or_else(|| {
            Error::parse("spatial.polygon", format!("expected 'lon,lat', got '{pair}'"))
        })?;
        let lon: f64 = lon.trim().parse().map_err(|e| {
            Error::parse("spatial.polygon", format!("bad longitude '{lon}': {e}"))
        })?;
        let lat: f64 = lat.trim().parse().map_err(|e| {
            Error::parse("spatial.polygon", format!("bad latitude '{lat}': {e}"))
        })?;
        points.push(json!({
            "polygonPoint": {"pointLongitude": lon, "pointLatitude": lat}
        }));
    }
    Ok(vec![json!({"geoLocationPolygon": points})])
}

/// Generate a DataCite v4 mapping from a canonical record.
pub fn datacite_record(record: &Value, diagnostics: &mut Diagnostics) -> Result<Map<String, Value>> {
    let contacts = require(record, "contact")?
        .as_array()
        .cloned()
        .unwrap_or_default();

    let mut document = Map::new();

    // Optional scalar fields follow the add-optional policy: empty values
    // are omitted with a debug note, never an error.
    match get_str(record, "identification.identifier").and_then(extract_doi) {
        Some(doi) => {
            document.insert("doi".to_string(), doi.into());
        }
        None => diagnostics.info(
            DiagnosticCode::MissingOptional,
            "identification.identifier",
            "No DOI, omitting doi",
        ),
    }

    document.insert(
        "titles".to_string(),
        per_language_entries(get_path(record, "identification.title"), "title").into(),
    );
    document.insert("creators".to_string(), creators(&contacts).into());
    if let Some(publisher) = publisher(&contacts, diagnostics) {
        document.insert("publisher".to_string(), publisher);
    }
    document.insert(
        "contributors".to_string(),
        contributors(&contacts, diagnostics).into(),
    );
    document.insert("publicationYear".to_string(), publication_year(record)?.into());

    let subjects: Vec<Value> = get_path(record, "identification.keywords")
        .and_then(Value::as_object)
        .map(|groups| {
            groups
                .values()
                .filter_map(Value::as_object)
                .flat_map(|group| group.iter())
                .filter(|(lang, _)| *lang != "translations")
                .flat_map(|(lang, words)| {
                    words
                        .as_array()
                        .into_iter()
                        .flatten()
                        .filter_map(Value::as_str)
                        .map(move |word| json!({"subject": word, "lang": lang}))
                })
                .collect()
        })
        .unwrap_or_default();
    document.insert("subjects".to_string(), subjects.into());

    document.insert("dates".to_string(), dates(record, diagnostics).into());
    insert_non_empty(
        &mut document,
        "language",
        get_str(record, "metadata.language").into(),
    );
    document.insert(
        "types".to_string(),
        json!({"resourceTypeGeneral": "Dataset", "resourceType": "dataset"}),
    );
    insert_non_empty(
        &mut document,
        "version",
        get_str(record, "identification.edition").into(),
    );

    let mut rights = Map::new();
    insert_non_empty(
        &mut rights,
        "rights",
        get_str(record, "metadata.use_constraints.licence.code").into(),
    );
    insert_non_empty(
        &mut rights,
        "rightsUri",
        get_str(record, "metadata.use_constraints.licence.url").into(),
    );
    if !rights.is_empty() {
        document.insert("rightsList".to_string(), json!([rights]));
    }

    document.insert(
        "descriptions".to_string(),
        per_language_entries(get_path(record, "identification.abstract"), "description")
            .into_iter()
            .map(|mut entry| {
                entry
                    .as_object_mut()
                    .expect("entry is an object")
                    .insert("descriptionType".to_string(), "Abstract".into());
                entry
            })
            .collect::<Vec<_>>()
            .into(),
    );
    document.insert("geoLocations".to_string(), geo_locations(record)?.into());
    document.insert(
        "fundingReferences".to_string(),
        funding_references(&contacts).into(),
    );

    drop_empty_values(&mut document);
    Ok(document)
}

/// Render a DataCite mapping as pretty JSON, validating against the bundled
/// v4 structural schema.
pub fn to_json(record: &Value, diagnostics: &mut Diagnostics) -> Result<String> {
    let document = datacite_record(record, diagnostics)?;
    let value = Value::Object(document);
    metaconv_schemas::validate_datacite(&value)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Render a DataCite mapping as kernel-4 XML.
pub fn to_xml(record: &Value, diagnostics: &mut Diagnostics) -> Result<String> {
    let document = datacite_record(record, diagnostics)?;
    metaconv_schemas::validate_datacite(&Value::Object(document.clone()))?;

    let mut buffer = Vec::new();
    let mut xml = Writer::new_with_indent(&mut buffer, b' ', 2);

    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut resource = BytesStart::new("resource");
    resource.push_attribute(("xmlns", "http://datacite.org/schema/kernel-4"));
    resource.push_attribute(("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"));
    resource.push_attribute((
        "xsi:schemaLocation",
        "http://datacite.org/schema/kernel-4 http://schema.datacite.org/meta/kernel-4/metadata.xsd",
    ));
    xml.write_event(Event::Start(resource))?;

    if let Some(doi) = document.get("doi").and_then(Value::as_str) {
        let mut identifier = BytesStart::new("identifier");
        identifier.push_attribute(("identifierType", "DOI"));
        xml.write_event(Event::Start(identifier))?;
        xml.write_event(Event::Text(BytesText::new(doi)))?;
        xml.write_event(Event::End(BytesEnd::new("identifier")))?;
    }

    write_name_objects(&mut xml, &document, "creators", "creator", "creatorName")?;
    write_titles(&mut xml, &document)?;
    write_publisher(&mut xml, &document)?;
    write_simple(&mut xml, &document, "publicationYear")?;
    write_subjects(&mut xml, &document)?;
    write_name_objects(&mut xml, &document, "contributors", "contributor", "contributorName")?;
    write_dates(&mut xml, &document)?;
    write_simple(&mut xml, &document, "language")?;
    write_resource_type(&mut xml, &document)?;
    write_simple(&mut xml, &document, "version")?;
    write_rights(&mut xml, &document)?;
    write_descriptions(&mut xml, &document)?;
    write_geo_locations(&mut xml, &document)?;
    write_funding_references(&mut xml, &document)?;

    xml.write_event(Event::End(BytesEnd::new("resource")))?;
    Ok(String::from_utf8(buffer).expect("writer output is UTF-8"))
}

fn write_text_element<W: std::io::Write>(
    xml: &mut Writer<W>,
    element: BytesStart<'_>,
    text: &str,
) -> Result<()> {
    let name = element.name().as_ref().to_vec();
    xml.write_event(Event::Start(element))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(
        String::from_utf8(name).expect("element names are UTF-8"),
    )))?;
    Ok(())
}

fn write_simple<W: std::io::Write>(
    xml: &mut Writer<W>,
    document: &Map<String, Value>,
    key: &str,
) -> Result<()> {
    if let Some(text) = document.get(key).and_then(Value::as_str) {
        write_text_element(xml, BytesStart::new(key), text)?;
    }
    Ok(())
}

fn write_titles<W: std::io::Write>(xml: &mut Writer<W>, document: &Map<String, Value>) -> Result<()> {
    let Some(titles) = document.get("titles").and_then(Value::as_array) else {
        return Ok(());
    };
    xml.write_event(Event::Start(BytesStart::new("titles")))?;
    for entry in titles {
        let mut element = BytesStart::new("title");
        if let Some(lang) = entry.get("lang").and_then(Value::as_str) {
            element.push_attribute(("xml:lang", lang));
        }
        write_text_element(xml, element, entry["title"].as_str().unwrap_or_default())?;
    }
    xml.write_event(Event::End(BytesEnd::new("titles")))?;
    Ok(())
}

fn write_name_objects<W: std::io::Write>(
    xml: &mut Writer<W>,
    document: &Map<String, Value>,
    group: &str,
    element: &str,
    name_element: &str,
) -> Result<()> {
    let Some(entries) = document.get(group).and_then(Value::as_array) else {
        return Ok(());
    };
    if entries.is_empty() {
        return Ok(());
    }
    xml.write_event(Event::Start(BytesStart::new(group)))?;
    for entry in entries {
        let mut start = BytesStart::new(element);
        if let Some(contributor_type) = entry.get("contributorType").and_then(Value::as_str) {
            start.push_attribute(("contributorType", contributor_type));
        }
        xml.write_event(Event::Start(start))?;

        let mut name = BytesStart::new(name_element);
        if let Some(name_type) = entry.get("nameType").and_then(Value::as_str) {
            name.push_attribute(("nameType", name_type));
        }
        write_text_element(xml, name, entry["name"].as_str().unwrap_or_default())?;

        if let Some(given) = entry.get("givenName").and_then(Value::as_str) {
            write_text_element(xml, BytesStart::new("givenName"), given)?;
        }
        if let Some(family) = entry.get("familyName").and_then(Value::as_str) {
            write_text_element(xml, BytesStart::new("familyName"), family)?;
        }
        for identifier in entry
            .get("nameIdentifiers")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let mut id_element = BytesStart::new("nameIdentifier");
            if let Some(scheme) = identifier.get("nameIdentifierScheme").and_then(Value::as_str) {
                id_element.push_attribute(("nameIdentifierScheme", scheme));
            }
            if let Some(uri) = identifier.get("schemeUri").and_then(Value::as_str) {
                id_element.push_attribute(("schemeURI", uri));
            }
            write_text_element(
                xml,
                id_element,
                identifier["nameIdentifier"].as_str().unwrap_or_default(),
            )?;
        }
        for affiliation in entry
            .get("affiliation")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let mut aff_element = BytesStart::new("affiliation");
            if let Some(id) = affiliation.get("affiliationIdentifier").and_then(Value::as_str) {
                aff_element.push_attribute(("affiliationIdentifier", id));
            }
            if let Some(scheme) = affiliation
                .get("affiliationIdentifierScheme")
                .and_then(Value::as_str)
            {
                aff_element.push_attribute(("affiliationIdentifierScheme", scheme));
            }
            write_text_element(
                xml,
                aff_element,
                affiliation["name"].as_str().unwrap_or_default(),
            )?;
        }
        xml.write_event(Event::End(BytesEnd::new(element)))?;
    }
    xml.write_event(Event::End(BytesEnd::new(group)))?;
    Ok(())
}

fn write_publisher<W: std::io::Write>(
    xml: &mut Writer<W>,
    document: &Map<String, Value>,
) -> Result<()> {
    let Some(publisher) = document.get("publisher") else {
        return Ok(());
    };
    let mut element = BytesStart::new("publisher");
    if let Some(id) = publisher.get("publisherIdentifier").and_then(Value::as_str) {
        element.push_attribute(("publisherIdentifier", id));
    }
    if let Some(scheme) = publisher
        .get("publisherIdentifierScheme")
        .and_then(Value::as_str)
    {
        element.push_attribute(("publisherIdentifierScheme", scheme));
    }
    write_text_element(xml, element, publisher["name"].as_str().unwrap_or_default())?;
    Ok(())
}

fn write_subjects<W: std::io::Write>(
    xml: &mut Writer<W>,
    document: &Map<String, Value>,
) -> Result<()> {
    let Some(subjects) = document.get("subjects").and_then(Value::as_array) else {
        return Ok(());
    };
    if subjects.is_empty() {
        return Ok(());
    }
    xml.write_event(Event::Start(BytesStart::new("subjects")))?;
    for entry in subjects {
        let mut element = BytesStart::new("subject");
        if let Some(lang) = entry.get("lang").and_then(Value::as_str) {
            element.push_attribute(("xml:lang", lang));
        }
        write_text_element(xml, element, entry["subject"].as_str().unwrap_or_default())?;
    }
    xml.write_event(Event::End(BytesEnd::new("subjects")))?;
    Ok(())
}

fn write_dates<W: std::io::Write>(xml: &mut Writer<W>, document: &Map<String, Value>) -> Result<()> {
    let Some(dates) = document.get("dates").and_then(Value::as_array) else {
        return Ok(());
    };
    xml.write_event(Event::Start(BytesStart::new("dates")))?;
    for entry in dates {
        let mut element = BytesStart::new("date");
        if let Some(date_type) = entry.get("dateType").and_then(Value::as_str) {
            element.push_attribute(("dateType", date_type));
        }
        if let Some(information) = entry.get("dateInformation").and_then(Value::as_str) {
            element.push_attribute(("dateInformation", information));
        }
        write_text_element(xml, element, entry["date"].as_str().unwrap_or_default())?;
    }
    xml.write_event(Event::End(BytesEnd::new("dates")))?;
    Ok(())
}

fn write_resource_type<W: std::io::Write>(
    xml: &mut Writer<W>,
    document: &Map<String, Value>,
) -> Result<()> {
    let Some(types) = document.get("types") else {
        return Ok(());
    };
    let mut element = BytesStart::new("resourceType");
    if let Some(general) = types.get("resourceTypeGeneral").and_then(Value::as_str) {
        element.push_attribute(("resourceTypeGeneral", general));
    }
    write_text_element(
        xml,
        element,
        types
            .get("resourceType")
            .and_then(Value::as_str)
            .unwrap_or_default(),
    )?;
    Ok(())
}

fn write_rights<W: std::io::Write>(xml: &mut Writer<W>, document: &Map<String, Value>) -> Result<()> {
    let Some(rights_list) = document.get("rightsList").and_then(Value::as_array) else {
        return Ok(());
    };
    xml.write_event(Event::Start(BytesStart::new("rightsList")))?;
    for entry in rights_list {
        let mut element = BytesStart::new("rights");
        if let Some(uri) = entry.get("rightsUri").and_then(Value::as_str) {
            element.push_attribute(("rightsURI", uri));
        }
        write_text_element(
            xml,
            element,
            entry.get("rights").and_then(Value::as_str).unwrap_or_default(),
        )?;
    }
    xml.write_event(Event::End(BytesEnd::new("rightsList")))?;
    Ok(())
}

fn write_descriptions<W: std::io::Write>(
    xml: &mut Writer<W>,
    document: &Map<String, Value>,
) -> Result<()> {
    let Some(descriptions) = document.get("descriptions").and_then(Value::as_array) else {
        return Ok(());
    };
    if descriptions.is_empty() {
        return Ok(());
    }
    xml.write_event(Event::Start(BytesStart::new("descriptions")))?;
    for entry in descriptions {
        let mut element = BytesStart::new("description");
        if let Some(lang) = entry.get("lang").and_then(Value::as_str) {
            element.push_attribute(("xml:lang", lang));
        }
        if let Some(description_type) = entry.get("descriptionType").and_then(Value::as_str) {
            element.push_attribute(("descriptionType", description_type));
        }
        write_text_element(
            xml,
            element,
            entry["description"].as_str().unwrap_or_default(),
        )?;
    }
    xml.write_event(Event::End(BytesEnd::new("descriptions")))?;
    Ok(())
}

fn write_geo_locations<W: std::io::Write>(
    xml: &mut Writer<W>,
    document: &Map<String, Value>,
) -> Result<()> {
    let Some(locations) = document.get("geoLocations").and_then(Value::as_array) else {
        return Ok(());
    };
    if locations.is_empty() {
        return Ok(());
    }
    xml.write_event(Event::Start(BytesStart::new("geoLocations")))?;
    for location in locations {
        xml.write_event(Event::Start(BytesStart::new("geoLocation")))?;
        if let Some(polygon) = location.get("geoLocationPolygon").and_then(Value::as_array) {
            xml.write_event(Event::Start(BytesStart::new("geoLocationPolygon")))?;
            for point in polygon {
                xml.write_event(Event::Start(BytesStart::new("polygonPoint")))?;
                let coordinates = &point["polygonPoint"];
                write_text_element(
                    xml,
                    BytesStart::new("pointLongitude"),
                    &coordinates["pointLongitude"].to_string(),
                )?;
                write_text_element(
                    xml,
                    BytesStart::new("pointLatitude"),
                    &coordinates["pointLatitude"].to_string(),
                )?;
                xml.write_event(Event::End(BytesEnd::new("polygonPoint")))?;
            }
            xml.write_event(Event::End(BytesEnd::new("geoLocationPolygon")))?;
        }
        xml.write_event(Event::End(BytesEnd::new("geoLocation")))?;
    }
    xml.write_event(Event::End(BytesEnd::new("geoLocations")))?;
    Ok(())
}

fn write_funding_references<W: std::io::Write>(
    xml: &mut Writer<W>,
    document: &Map<String, Value>,
) -> Result<()> {
    let Some(references) = document.get("fundingReferences").and_then(Value::as_array) else {
        return Ok(());
    };
    if references.is_empty() {
        return Ok(());
    }
    xml.write_event(Event::Start(BytesStart::new("fundingReferences")))?;
    for entry in references {
        xml.write_event(Event::Start(BytesStart::new("fundingReference")))?;
        write_text_element(
            xml,
            BytesStart::new("funderName"),
            entry["funderName"].as_str().unwrap_or_default(),
        )?;
        if let Some(identifier) = entry.get("funderIdentifier").and_then(Value::as_str) {
            let mut element = BytesStart::new("funderIdentifier");
            if let Some(id_type) = entry.get("funderIdentifierType").and_then(Value::as_str) {
                element.push_attribute(("funderIdentifierType", id_type));
            }
            write_text_element(xml, element, identifier)?;
        }
        xml.write_event(Event::End(BytesEnd::new("fundingReference")))?;
    }
    xml.write_event(Event::End(BytesEnd::new("fundingReferences")))?;
    Ok(())
}
