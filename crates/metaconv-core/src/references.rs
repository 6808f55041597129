//! Bundled reference tables
//!
//! Fixed vocabulary tables used by the mappers, plus bundled license and
//! country lookup data. JSON assets are parsed once per process into
//! read-only `OnceLock` state and handed out by reference; nothing here is
//! mutable after initialization.

use serde_json::Value;
use std::sync::OnceLock;

const LICENSES_JSON: &str = include_str!("../references/licenses.json");
const COUNTRIES_JSON: &str = include_str!("../references/countries.json");

static LICENSES: OnceLock<Value> = OnceLock::new();
static COUNTRIES: OnceLock<Value> = OnceLock::new();

/// NERC L06 platform vocabulary URL carried on ERDDAP `platform` attributes
pub const PLATFORM_VOCABULARY: &str = "http://vocab.nerc.ac.uk/collection/L06/current/";

/// Banner prepended to list-shaped record histories
pub const HISTORY_BANNER: &str = "Metadata record history:\n";

/// Prefix stripped from maintenance notes to recover the metadata-form URL
pub const MAINTENANCE_NOTE_PREFIX: &str = "Generated from ";

/// A keyword group's vocabulary prefix and display label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordVocabulary {
    pub prefix: &'static str,
    pub label: Option<&'static str>,
}

/// Vocabulary prefix table for keyword groups.
///
/// Groups outside the table get no prefix and no vocabulary label.
pub fn keyword_vocabulary(group: &str) -> KeywordVocabulary {
    match group {
        "eov" => KeywordVocabulary {
            prefix: "CIOOS:",
            label: Some("CIOOS Essential Ocean Variables Vocabulary"),
        },
        "taxa" => KeywordVocabulary {
            prefix: "GBIF:",
            label: Some("GBIF Taxonomy Vocabulary"),
        },
        _ => KeywordVocabulary {
            prefix: "",
            label: None,
        },
    }
}

/// Map a record contact role to a DataCite contributor type.
///
/// Returns `None` for roles with no mapping; the DataCite mapper falls back
/// to `Other` and records a diagnostic.
pub fn contributor_type(role: &str) -> Option<&'static str> {
    match role {
        "pointOfContact" => Some("ContactPerson"),
        "custodian" => Some("DataCurator"),
        "distributor" => Some("Distributor"),
        "editor" => Some("Editor"),
        "originator" => Some("Producer"),
        "principalInvestigator" => Some("ProjectLeader"),
        "collaborator" => Some("ProjectMember"),
        "author" | "coAuthor" => Some("Researcher"),
        "processor" => Some("DataManager"),
        "resourceProvider" => Some("HostingInstitution"),
        "rightsHolder" => Some("RightsHolder"),
        "sponsor" => Some("Sponsor"),
        _ => None,
    }
}

/// Map a record date name to a DataCite date type.
///
/// Unknown names fall back to `Other` with the original name preserved in
/// `dateInformation`.
pub fn date_type(name: &str) -> Option<&'static str> {
    match name {
        "creation" => Some("Created"),
        "publication" => Some("Issued"),
        "revision" => Some("Updated"),
        _ => None,
    }
}

/// EML party elements to the record roles they collect.
pub fn eml_roles(party: &str) -> &'static [&'static str] {
    match party {
        "creator" => &["author", "originator"],
        "metadataProvider" => &["distributor", "custodian"],
        "associatedParty" => &["principalInvestigator", "editor"],
        _ => &[],
    }
}

/// Bundled license table keyed by license code.
pub fn licenses() -> &'static Value {
    LICENSES.get_or_init(|| {
        serde_json::from_str(LICENSES_JSON).expect("bundled licenses.json is valid JSON")
    })
}

/// Look up a license entry (title/url/code) by its code.
pub fn license(code: &str) -> Option<&'static Value> {
    licenses().get(code)
}

/// Resolve a country name to its ISO 3166-1 alpha-2 code.
///
/// Accepts names case-insensitively and passes through strings that already
/// are alpha-2 codes.
pub fn country_code(name: &str) -> Option<String> {
    let table = COUNTRIES.get_or_init(|| {
        serde_json::from_str(COUNTRIES_JSON).expect("bundled countries.json is valid JSON")
    });
    let trimmed = name.trim();
    if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_uppercase()) {
        return Some(trimmed.to_string());
    }
    table
        .get(trimmed.to_lowercase().as_str())
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_vocabulary_table() {
        assert_eq!(keyword_vocabulary("eov").prefix, "CIOOS:");
        assert_eq!(keyword_vocabulary("taxa").prefix, "GBIF:");
        assert_eq!(keyword_vocabulary("default").prefix, "");
        assert!(keyword_vocabulary("default").label.is_none());
    }

    #[test]
    fn test_contributor_type_table() {
        assert_eq!(contributor_type("custodian"), Some("DataCurator"));
        assert_eq!(contributor_type("wizard"), None);
    }

    #[test]
    fn test_date_type_table() {
        assert_eq!(date_type("creation"), Some("Created"));
        assert_eq!(date_type("publication"), Some("Issued"));
        assert_eq!(date_type("revision"), Some("Updated"));
        assert_eq!(date_type("reviewed"), None);
    }

    #[test]
    fn test_country_lookup() {
        assert_eq!(country_code("Canada").as_deref(), Some("CA"));
        assert_eq!(country_code("canada").as_deref(), Some("CA"));
        assert_eq!(country_code("CA").as_deref(), Some("CA"));
        assert_eq!(country_code("Atlantis"), None);
    }

    #[test]
    fn test_license_lookup() {
        let entry = license("CC-BY-4.0").unwrap();
        assert!(entry["url"].as_str().unwrap().contains("creativecommons"));
        assert!(license("no-such-license").is_none());
    }
}
