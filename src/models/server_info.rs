use semver::Version as Semver;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerInfo {
    #[serde(rename = "name")]
    hostname: String,
    #[serde(rename = "cluster_name")]
    name: String,
    #[serde(rename = "cluster_uuid")]
    uuid: Option<String>,
    version: Version,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Version {
    number: String,
    lucene_version: String,
}

impl ServerInfo {
    pub fn get_hostname(&self) -> &String {
        &self.hostname
    }
    pub fn get_name(&self) -> &String {
        &self.name
    }
    pub fn get_uuid(&self) -> &Option<String> {
        &self.uuid
    }
    pub fn get_version(&self) -> &String {
        &self.version.number
    }
    pub fn get_lucene_version(&self) -> &String {
        &self.version.lucene_version
    }

    /// `None` for version strings semver can't parse (snapshots with odd suffixes).
    pub fn get_version_major(&self) -> Option<u64> {
        Semver::parse(&self.version.number)
            .ok()
            .map(|version| version.major)
    }

    /// The dataset is indexed under the `doc` mapping type, which stores
    /// from 8.0 on no longer accept.
    pub fn supports_mapping_types(&self) -> bool {
        self.get_version_major().map_or(true, |major| major < 8)
    }
}
