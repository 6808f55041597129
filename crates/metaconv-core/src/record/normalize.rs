//! Legacy ("firebase") record normalization
//!
//! Converts the flat legacy record shape (single-language strings, flat
//! contact lists with `givenNames`/`lastName`/`orgName`) into the canonical
//! nested multi-language shape consumed by the mappers. Canonical input is
//! passed through untouched at the `Record` level, so normalization is
//! idempotent across the pipeline.

use crate::references::license;
use crate::value::{get_str, insert_non_empty};
use serde_json::{json, Map, Value};

/// Promote a value that may be a bare string into a language-keyed map.
fn lang_map(value: Option<&Value>, default_language: &str) -> Value {
    match value {
        Some(Value::String(s)) if !s.is_empty() => json!({default_language: s}),
        Some(Value::Object(map)) => Value::Object(map.clone()),
        _ => Value::Null,
    }
}

/// Join legacy name parts into the canonical `"Last, Given"` form.
fn individual_name(contact: &Value) -> Option<String> {
    let given = contact.get("givenNames").and_then(Value::as_str).unwrap_or_default();
    let family = contact.get("lastName").and_then(Value::as_str).unwrap_or_default();
    match (family.is_empty(), given.is_empty()) {
        (false, false) => Some(format!("{family}, {given}")),
        (false, true) => Some(family.to_string()),
        _ => None,
    }
}

fn normalize_contact(contact: &Value) -> Value {
    let mut canonical = Map::new();

    canonical.insert(
        "roles".to_string(),
        contact.get("role").cloned().unwrap_or_else(|| json!([])),
    );
    canonical.insert(
        "inCitation".to_string(),
        contact
            .get("inCitation")
            .cloned()
            .unwrap_or(Value::Bool(false)),
    );

    if let Some(name) = individual_name(contact) {
        let mut individual = Map::new();
        individual.insert("name".to_string(), name.into());
        insert_non_empty(
            &mut individual,
            "email",
            contact.get("indEmail").cloned().unwrap_or(Value::Null),
        );
        insert_non_empty(
            &mut individual,
            "orcid",
            contact.get("indOrcid").cloned().unwrap_or(Value::Null),
        );
        canonical.insert("individual".to_string(), Value::Object(individual));
    }

    let mut organization = Map::new();
    for (canonical_key, legacy_key) in [
        ("name", "orgName"),
        ("email", "orgEmail"),
        ("address", "orgAdress"),
        ("city", "orgCity"),
        ("country", "orgCountry"),
        ("url", "orgURL"),
        ("ror", "orgRor"),
    ] {
        insert_non_empty(
            &mut organization,
            canonical_key,
            contact.get(legacy_key).cloned().unwrap_or(Value::Null),
        );
    }
    if !organization.is_empty() {
        canonical.insert("organization".to_string(), Value::Object(organization));
    }

    Value::Object(canonical)
}

fn normalize_distribution(record: &Value, default_language: &str) -> Value {
    let Some(distribution) = record.get("distribution").and_then(Value::as_array) else {
        return json!([]);
    };
    distribution
        .iter()
        .map(|entry| {
            let mut resource = Map::new();
            insert_non_empty(
                &mut resource,
                "url",
                entry.get("url").cloned().unwrap_or(Value::Null),
            );
            insert_non_empty(
                &mut resource,
                "name",
                lang_map(entry.get("name"), default_language),
            );
            insert_non_empty(
                &mut resource,
                "description",
                lang_map(entry.get("description"), default_language),
            );
            Value::Object(resource)
        })
        .collect()
}

/// Convert a legacy record to the canonical shape.
pub fn firebase_to_canonical(record: &Value) -> Value {
    let default_language = get_str(record, "language").unwrap_or("en");

    let mut identification = Map::new();
    insert_non_empty(
        &mut identification,
        "title",
        lang_map(record.get("title"), default_language),
    );
    insert_non_empty(
        &mut identification,
        "abstract",
        lang_map(record.get("abstract"), default_language),
    );
    insert_non_empty(
        &mut identification,
        "identifier",
        record.get("datasetIdentifier").cloned().unwrap_or(Value::Null),
    );
    insert_non_empty(
        &mut identification,
        "edition",
        record.get("edition").cloned().unwrap_or(Value::Null),
    );
    insert_non_empty(
        &mut identification,
        "progress_code",
        record.get("progress").cloned().unwrap_or(Value::Null),
    );
    if let Some(keywords) = record.get("keywords") {
        identification.insert("keywords".to_string(), json!({"default": keywords}));
    }
    let mut identification_dates = Map::new();
    insert_non_empty(
        &mut identification_dates,
        "creation",
        record.get("created").cloned().unwrap_or(Value::Null),
    );
    if !identification_dates.is_empty() {
        identification.insert("dates".to_string(), Value::Object(identification_dates));
    }

    let mut metadata_dates = Map::new();
    insert_non_empty(
        &mut metadata_dates,
        "publication",
        record.get("datePublished").cloned().unwrap_or(Value::Null),
    );
    insert_non_empty(
        &mut metadata_dates,
        "revision",
        record.get("dateRevised").cloned().unwrap_or(Value::Null),
    );

    let mut use_constraints = Map::new();
    if let Some(code) = get_str(record, "license") {
        let mut licence = Map::new();
        licence.insert("code".to_string(), code.into());
        if let Some(url) = license(code).and_then(|entry| entry.get("url")) {
            licence.insert("url".to_string(), url.clone());
        }
        use_constraints.insert("licence".to_string(), Value::Object(licence));
    }
    insert_non_empty(
        &mut use_constraints,
        "limitations",
        lang_map(record.get("limitations"), default_language),
    );

    let mut metadata = Map::new();
    insert_non_empty(
        &mut metadata,
        "identifier",
        record.get("identifier").cloned().unwrap_or(Value::Null),
    );
    insert_non_empty(
        &mut metadata,
        "naming_authority",
        record.get("region").cloned().unwrap_or(Value::Null),
    );
    if !metadata_dates.is_empty() {
        metadata.insert("dates".to_string(), Value::Object(metadata_dates));
    }
    metadata.insert("use_constraints".to_string(), Value::Object(use_constraints));
    insert_non_empty(
        &mut metadata,
        "language",
        record.get("language").cloned().unwrap_or(Value::Null),
    );
    insert_non_empty(
        &mut metadata,
        "maintenance_note",
        record.get("maintenance_note").cloned().unwrap_or(Value::Null),
    );

    let contacts: Vec<Value> = record
        .get("contacts")
        .and_then(Value::as_array)
        .map(|contacts| contacts.iter().map(normalize_contact).collect())
        .unwrap_or_default();

    let mut canonical = Map::new();
    canonical.insert("identification".to_string(), Value::Object(identification));
    canonical.insert("contact".to_string(), contacts.into());
    canonical.insert("metadata".to_string(), Value::Object(metadata));
    canonical.insert(
        "distribution".to_string(),
        normalize_distribution(record, default_language),
    );
    if let Some(platform) = record.get("platform").filter(|p| !p.is_null()) {
        let platform = match platform {
            Value::Array(_) => platform.clone(),
            other => json!([other]),
        };
        canonical.insert("platform".to_string(), platform);
    }
    Value::Object(canonical)
}
