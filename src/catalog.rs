use std::collections::BTreeMap;

use serde::Deserialize;

use crate::assets::AssetStore;
use crate::content;
use crate::error::{Error, Result};
use crate::models::{License, LicenseInfo};

pub const LIST_LICENSES: &str = "licenses.json";
pub const LIST_EXCEPTIONS: &str = "exceptions.json";

/// Wire format of the standard license list document. Fields mirror the
/// published schema in full, used or not.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
struct LicenseList {
    license_list_version: String,
    licenses: Vec<LicenseRecord>,
    release_date: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
struct LicenseRecord {
    reference: String,
    is_deprecated_license_id: bool,
    details_url: String,
    reference_number: String,
    name: String,
    license_id: String,
    see_also: Vec<String>,
    is_osi_approved: bool,
    is_fsf_libre: Option<bool>,
}

/// Wire format of the exception list document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
struct ExceptionList {
    license_list_version: String,
    release_date: String,
    exceptions: Vec<ExceptionRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
struct ExceptionRecord {
    reference: String,
    is_deprecated_license_id: bool,
    details_url: String,
    reference_number: String,
    name: String,
    see_also: Vec<String>,
    license_exception_id: String,
}

/// Query surface over the two catalog documents in an [`AssetStore`].
///
/// Nothing is cached: every query re-reads and re-parses the documents, so
/// a store whose files change between calls is always read fresh.
pub struct Catalog<S: AssetStore> {
    store: S,
}

impl<S: AssetStore> Catalog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn load_standard(&self) -> Result<LicenseList> {
        let raw = self.store.get(LIST_LICENSES)?;
        serde_json::from_slice(&raw).map_err(|e| Error::Parse {
            file: LIST_LICENSES,
            source: e,
        })
    }

    fn load_exceptions(&self) -> Result<ExceptionList> {
        let raw = self.store.get(LIST_EXCEPTIONS)?;
        serde_json::from_slice(&raw).map_err(|e| Error::Parse {
            file: LIST_EXCEPTIONS,
            source: e,
        })
    }

    /// Merged metadata from both documents, keyed by identifier.
    ///
    /// Standard entries are keyed by `licenseId`, exceptions by
    /// `licenseExceptionId`, folded into the same map. Iteration order is
    /// lexicographic by id. On an id collision the exception list wins
    /// silently; the published lists keep the namespaces disjoint.
    pub fn all_info(&self) -> Result<BTreeMap<String, LicenseInfo>> {
        let mut merged = BTreeMap::new();
        merge_standard(&mut merged, self.load_standard()?);
        merge_exceptions(&mut merged, self.load_exceptions()?);
        Ok(merged)
    }

    /// Every catalog entry joined with its stored body.
    ///
    /// Fails whole on the first entry whose body cannot be loaded; there
    /// are no partial results.
    pub fn all(&self) -> Result<Vec<License>> {
        let mut licenses = Vec::new();
        for info in self.all_info()?.into_values() {
            let content = content::load(&self.store, &info)?;
            licenses.push(License { info, content });
        }
        Ok(licenses)
    }

    /// Entries whose display name contains `part`.
    ///
    /// Exact byte comparison when `case_sensitive`, lowercase-folded
    /// otherwise. No match is an empty vec, never an error.
    pub fn search_by_name(&self, part: &str, case_sensitive: bool) -> Result<Vec<License>> {
        let needle = if case_sensitive {
            part.to_string()
        } else {
            part.to_lowercase()
        };

        Ok(self
            .all()?
            .into_iter()
            .filter(|license| {
                if case_sensitive {
                    license.info.name.contains(&needle)
                } else {
                    license.info.name.to_lowercase().contains(&needle)
                }
            })
            .collect())
    }

    /// Validate `info` against the catalog and join it with its body.
    ///
    /// The catalog entry under `info.id` must equal `info` on every field,
    /// references in order; anything else (including the empty record) is
    /// [`Error::NotFound`].
    pub fn get_by_info(&self, info: &LicenseInfo) -> Result<License> {
        match self.all_info()?.get(&info.id) {
            Some(entry) if entry == info => Ok(License {
                info: info.clone(),
                content: content::load(&self.store, info)?,
            }),
            _ => Err(Error::NotFound),
        }
    }
}

fn merge_standard(container: &mut BTreeMap<String, LicenseInfo>, list: LicenseList) {
    for record in list.licenses {
        container.insert(
            record.license_id.clone(),
            LicenseInfo {
                id: record.license_id,
                name: record.name,
                references: record.see_also,
                is_deprecated: record.is_deprecated_license_id,
            },
        );
    }
}

fn merge_exceptions(container: &mut BTreeMap<String, LicenseInfo>, list: ExceptionList) {
    for record in list.exceptions {
        container.insert(
            record.license_exception_id.clone(),
            LicenseInfo {
                id: record.license_exception_id,
                name: record.name,
                references: record.see_also,
                is_deprecated: record.is_deprecated_license_id,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::DirStore;
    use tempfile::TempDir;

    const EXAMPLE_LICENSES: &str = r#"{
  "licenseListVersion": "3.6",
  "licenses": [
    {
      "reference": "./0BSD.html",
      "isDeprecatedLicenseId": false,
      "detailsUrl": "http://spdx.org/licenses/0BSD.json",
      "referenceNumber": "319",
      "name": "BSD Zero Clause License",
      "licenseId": "0BSD",
      "seeAlso": [
        "http://landley.net/toybox/license.html"
      ],
      "isOsiApproved": true
    },
    {
      "reference": "./AAL.html",
      "isDeprecatedLicenseId": false,
      "detailsUrl": "http://spdx.org/licenses/AAL.json",
      "referenceNumber": "21",
      "name": "Attribution Assurance License",
      "licenseId": "AAL",
      "seeAlso": [
        "https://opensource.org/licenses/attribution"
      ],
      "isOsiApproved": true
    },
    {
      "reference": "./AGPL-3.0.html",
      "isDeprecatedLicenseId": true,
      "isFsfLibre": true,
      "detailsUrl": "http://spdx.org/licenses/AGPL-3.0.json",
      "referenceNumber": "229",
      "name": "GNU Affero General Public License v3.0",
      "licenseId": "AGPL-3.0",
      "seeAlso": [
        "https://www.gnu.org/licenses/agpl.txt",
        "https://opensource.org/licenses/AGPL-3.0"
      ],
      "isOsiApproved": true
    }
  ],
  "releaseDate": "2019-07-10"
}"#;

    const EXAMPLE_EXCEPTIONS: &str = r#"{
  "licenseListVersion": "3.6",
  "releaseDate": "2019-07-10",
  "exceptions": [
    {
      "reference": "./Libtool-exception.html",
      "isDeprecatedLicenseId": false,
      "detailsUrl": "http://spdx.org/licenses/Libtool-exception.json",
      "referenceNumber": "1",
      "name": "Libtool Exception",
      "seeAlso": [
        "http://git.savannah.gnu.org/cgit/libtool.git/tree/m4/libtool.m4"
      ],
      "licenseExceptionId": "Libtool-exception"
    },
    {
      "reference": "./Nokia-Qt-exception-1.1.html",
      "isDeprecatedLicenseId": true,
      "detailsUrl": "http://spdx.org/licenses/Nokia-Qt-exception-1.1.json",
      "referenceNumber": "23",
      "name": "Nokia Qt LGPL exception 1.1",
      "seeAlso": [
        "https://www.keepassx.org/dev/projects/keepassx/repository/revisions/b8dfb9cc4d5133e0f09cd7533d15a4f1c19a40f2/entry/LICENSE.NOKIA-LGPL-EXCEPTION"
      ],
      "licenseExceptionId": "Nokia-Qt-exception-1.1"
    }
  ]
}"#;

    /// A data directory holding both documents plus a body file for each
    /// entry they define.
    fn example_store() -> (TempDir, DirStore) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(LIST_LICENSES), EXAMPLE_LICENSES).unwrap();
        std::fs::write(dir.path().join(LIST_EXCEPTIONS), EXAMPLE_EXCEPTIONS).unwrap();

        std::fs::write(dir.path().join("0BSD.txt"), "Zero clause BSD body\n").unwrap();
        std::fs::write(dir.path().join("AAL.txt"), "Attribution assurance body\n").unwrap();
        std::fs::write(dir.path().join("deprecated_AGPL-3.0.txt"), "AGPL v3 body\n").unwrap();
        std::fs::write(dir.path().join("Libtool-exception.txt"), "Libtool body\n").unwrap();
        std::fs::write(
            dir.path().join("Nokia-Qt-exception-1.1.txt"),
            "Nokia Qt exception body\n",
        )
        .unwrap();

        let store = DirStore::new(dir.path());
        (dir, store)
    }

    fn info_0bsd() -> LicenseInfo {
        LicenseInfo {
            id: "0BSD".to_string(),
            name: "BSD Zero Clause License".to_string(),
            references: vec!["http://landley.net/toybox/license.html".to_string()],
            is_deprecated: false,
        }
    }

    #[test]
    fn test_all_info_merges_both_documents() {
        let (_dir, store) = example_store();
        let merged = Catalog::new(store).all_info().unwrap();

        // 3 standard + 2 exception entries, disjoint ids
        assert_eq!(merged.len(), 5);
        assert_eq!(merged["0BSD"], info_0bsd());
        assert_eq!(merged["Libtool-exception"].name, "Libtool Exception");
        assert!(merged["AGPL-3.0"].is_deprecated);
        assert_eq!(
            merged["AGPL-3.0"].references,
            vec![
                "https://www.gnu.org/licenses/agpl.txt".to_string(),
                "https://opensource.org/licenses/AGPL-3.0".to_string(),
            ]
        );
    }

    #[test]
    fn test_all_info_iterates_in_id_order() {
        let (_dir, store) = example_store();
        let merged = Catalog::new(store).all_info().unwrap();

        let ids: Vec<&String> = merged.keys().collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_all_info_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(LIST_LICENSES), EXAMPLE_LICENSES).unwrap();

        let catalog = Catalog::new(DirStore::new(dir.path()));
        assert!(matches!(
            catalog.all_info(),
            Err(Error::AssetMissing(name)) if name == LIST_EXCEPTIONS
        ));
    }

    #[test]
    fn test_all_info_malformed_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(LIST_LICENSES), "{not json").unwrap();
        std::fs::write(dir.path().join(LIST_EXCEPTIONS), EXAMPLE_EXCEPTIONS).unwrap();

        let catalog = Catalog::new(DirStore::new(dir.path()));
        assert!(matches!(
            catalog.all_info(),
            Err(Error::Parse { file, .. }) if file == LIST_LICENSES
        ));
    }

    #[test]
    fn test_all_joins_every_entry_with_content() {
        let (_dir, store) = example_store();
        let licenses = Catalog::new(store).all().unwrap();

        assert_eq!(licenses.len(), 5);
        for license in &licenses {
            assert_eq!(license.info.id, license.content.id);
            assert!(!license.content.content.is_empty());
        }
    }

    #[test]
    fn test_all_fails_whole_on_missing_body() {
        let (dir, store) = example_store();
        std::fs::remove_file(dir.path().join("AAL.txt")).unwrap();

        assert!(matches!(
            Catalog::new(store).all(),
            Err(Error::AssetMissing(name)) if name == "AAL.txt"
        ));
    }

    #[test]
    fn test_search_empty_needle_matches_all() {
        let (_dir, store) = example_store();
        let results = Catalog::new(store).search_by_name("", true).unwrap();
        assert_eq!(results.len(), 5);
    }

    #[test]
    fn test_search_case_insensitive() {
        let (_dir, store) = example_store();
        let results = Catalog::new(store)
            .search_by_name("bsd zero", false)
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].info.id, "0BSD");
    }

    #[test]
    fn test_search_case_sensitive_misses_folded_match() {
        let (_dir, store) = example_store();
        let catalog = Catalog::new(store);

        assert!(catalog.search_by_name("bsd zero", true).unwrap().is_empty());
        assert_eq!(
            catalog.search_by_name("BSD Zero", true).unwrap().len(),
            1
        );
    }

    #[test]
    fn test_search_no_match_is_empty_not_error() {
        let (_dir, store) = example_store();
        let results = Catalog::new(store).search_by_name("Ahola", false).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_get_by_info_exact_match() {
        let (_dir, store) = example_store();
        let license = Catalog::new(store).get_by_info(&info_0bsd()).unwrap();

        assert_eq!(license.info, info_0bsd());
        assert_eq!(license.content.content, b"Zero clause BSD body\n");
        assert_eq!(license.content.raw_content, b"Zero clause BSD body ");
    }

    #[test]
    fn test_get_by_info_rejects_field_mismatch() {
        let (_dir, store) = example_store();
        let catalog = Catalog::new(store);

        let mut wrong_id = info_0bsd();
        wrong_id.id = "1BSD".to_string();
        assert!(matches!(catalog.get_by_info(&wrong_id), Err(Error::NotFound)));

        let mut wrong_refs = info_0bsd();
        wrong_refs.references.push("https://example.com".to_string());
        assert!(matches!(
            catalog.get_by_info(&wrong_refs),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn test_get_by_info_rejects_empty_record() {
        let (_dir, store) = example_store();
        assert!(matches!(
            Catalog::new(store).get_by_info(&LicenseInfo::default()),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn test_get_by_info_for_every_entry() {
        let (_dir, store) = example_store();
        let catalog = Catalog::new(store);

        for info in catalog.all_info().unwrap().values() {
            let license = catalog.get_by_info(info).unwrap();
            assert_eq!(license.content.id, info.id);
        }
    }
}
