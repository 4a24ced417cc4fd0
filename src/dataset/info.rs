//! Static dataset metadata and the feature layout of each schema mode.
//!
//! None of this is consumed by the record adapter; it is exposed so host
//! tooling can describe the dataset.

use serde::Serialize;

use super::class_label::ClassLabel;
use super::schema::{ActionStatus, Connections, FlightClass, Goal, SchemaMode};

pub const DESCRIPTION: &str =
    "AirDialogue is a benchmark dataset for goal-oriented dialogue generation research.\n";

pub const CITATION: &str = r#"
@inproceedings{wei-etal-2018-airdialogue,
    title = "{A}ir{D}ialogue: An Environment for Goal-Oriented Dialogue Research",
    author = "Wei, Wei  and
      Le, Quoc  and
      Dai, Andrew  and
      Li, Jia",
    booktitle = "Proceedings of the 2018 Conference on Empirical Methods in Natural Language Processing",
    month = oct # "-" # nov,
    year = "2018",
    address = "Brussels, Belgium",
    publisher = "Association for Computational Linguistics",
    url = "https://www.aclweb.org/anthology/D18-1419",
    doi = "10.18653/v1/D18-1419",
    pages = "3844--3854",
}
"#;

pub const HOMEPAGE: &str = "https://github.com/google/airdialogue";

pub const LICENSE: &str = "Apache License 2.0";

/// Location of the published archive
pub const ARCHIVE_URL: &str = "https://storage.googleapis.com/airdialogue/airdialogue_data.tar.gz";

pub const VERSION: &str = "1.1.0";

/// Shape of one field in the emitted records
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "_type")]
pub enum Feature {
    Value {
        dtype: &'static str,
    },
    ClassLabel {
        names: &'static [&'static str],
    },
    Sequence {
        feature: Box<Feature>,
    },
    Struct {
        fields: Vec<(&'static str, Feature)>,
    },
}

fn value(dtype: &'static str) -> Feature {
    Feature::Value { dtype }
}

fn label<T: ClassLabel>() -> Feature {
    Feature::ClassLabel { names: T::NAMES }
}

fn sequence(feature: Feature) -> Feature {
    Feature::Sequence {
        feature: Box::new(feature),
    }
}

fn structure(fields: Vec<(&'static str, Feature)>) -> Feature {
    Feature::Struct { fields }
}

fn action_feature() -> Feature {
    structure(vec![
        ("status", label::<ActionStatus>()),
        ("name", value("string")),
        ("flight", sequence(value("int64"))),
    ])
}

/// Top-level fields of a record in the given mode, in emission order
pub fn features(mode: SchemaMode) -> Vec<(&'static str, Feature)> {
    match mode {
        SchemaMode::Kb => vec![
            (
                "kb",
                sequence(structure(vec![
                    ("return_airport", value("string")),
                    ("airline", value("string")),
                    ("departure_day", value("string")),
                    ("departure_airport", value("string")),
                    ("flight_number", value("int64")),
                    ("departure_month", value("string")),
                    ("departure_time_num", value("int64")),
                    ("class", label::<FlightClass>()),
                    ("return_time_num", value("int64")),
                    ("return_month", value("string")),
                    ("return_day", value("string")),
                    ("num_connections", label::<Connections>()),
                    ("price", value("int64")),
                ])),
            ),
            ("reservation", value("int64")),
        ],
        SchemaMode::Data => vec![
            (
                "search_info",
                sequence(structure(vec![
                    ("timestamp", value("int64")),
                    ("button_name", value("string")),
                    ("field_name", value("string")),
                    ("field_value", value("string")),
                ])),
            ),
            ("action", action_feature()),
            (
                "intent",
                structure(vec![
                    ("return_month", value("string")),
                    ("return_day", value("int64")),
                    ("max_price", value("int64")),
                    ("departure_airport", value("string")),
                    ("departure_time", value("string")),
                    ("max_connections", label::<Connections>()),
                    ("departure_day", value("string")),
                    ("goal", label::<Goal>()),
                    ("departure_month", value("string")),
                    ("name", value("string")),
                    ("return_airport", value("string")),
                ]),
            ),
            ("timestamps", sequence(value("int64"))),
            ("dialogue", sequence(value("string"))),
            ("expected_action", action_feature()),
            ("correct_sample", value("bool")),
        ],
    }
}

/// Everything host tooling needs to describe one builder configuration
#[derive(Debug, Clone, Serialize)]
pub struct DatasetInfo {
    pub config_name: SchemaMode,
    pub description: &'static str,
    pub citation: &'static str,
    pub homepage: &'static str,
    pub license: &'static str,
    pub url: &'static str,
    pub version: &'static str,
    pub features: Vec<(&'static str, Feature)>,
    pub supervised_keys: Option<(&'static str, &'static str)>,
}

impl DatasetInfo {
    pub fn for_mode(mode: SchemaMode) -> Self {
        Self {
            config_name: mode,
            description: DESCRIPTION,
            citation: CITATION,
            homepage: HOMEPAGE,
            license: LICENSE,
            url: ARCHIVE_URL,
            version: VERSION,
            features: features(mode),
            // Published metadata attaches the dialogue keys to the kb config
            supervised_keys: match mode {
                SchemaMode::Kb => Some(("dialogue", "expected_action")),
                SchemaMode::Data => None,
            },
        }
    }

    pub fn feature_names(&self) -> Vec<&'static str> {
        self.features.iter().map(|(name, _)| *name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feature_names_follow_record_layout() {
        let kb = DatasetInfo::for_mode(SchemaMode::Kb);
        assert_eq!(kb.feature_names(), vec!["kb", "reservation"]);

        let data = DatasetInfo::for_mode(SchemaMode::Data);
        assert_eq!(
            data.feature_names(),
            vec![
                "search_info",
                "action",
                "intent",
                "timestamps",
                "dialogue",
                "expected_action",
                "correct_sample"
            ]
        );
    }

    #[test]
    fn test_supervised_keys() {
        assert_eq!(
            DatasetInfo::for_mode(SchemaMode::Kb).supervised_keys,
            Some(("dialogue", "expected_action"))
        );
        assert!(DatasetInfo::for_mode(SchemaMode::Data)
            .supervised_keys
            .is_none());
    }

    #[test]
    fn test_class_label_feature_lists_names() {
        let feature = serde_json::to_value(label::<Connections>()).unwrap();
        assert_eq!(
            feature,
            json!({"_type": "ClassLabel", "names": ["0", "1", "many"]})
        );
    }

    #[test]
    fn test_static_metadata() {
        let info = DatasetInfo::for_mode(SchemaMode::Data);
        assert_eq!(info.license, "Apache License 2.0");
        assert!(info.citation.contains("wei-etal-2018-airdialogue"));
        assert!(info.url.ends_with("airdialogue_data.tar.gz"));
        assert_eq!(info.version, "1.1.0");
    }
}
