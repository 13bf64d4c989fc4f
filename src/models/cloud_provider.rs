//! Cloud provider accounts and their datastore associations.

use std::sync::Arc;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::models::datastore::{Datastore, DATASTORE_SCHEMA};
use crate::models::SchemaBacked;
use crate::validation::schema::{FieldKind, RecordSchema};

lazy_static! {
    pub static ref CLOUD_PROVIDER_SCHEMA: Arc<RecordSchema> = Arc::new(
        RecordSchema::builder("CloudProvider")
            .required("cloud_provider_id", FieldKind::String)
            .required("project_id", FieldKind::Integer)
            .build()
            .expect("CloudProvider schema")
    );

    pub static ref CLOUD_PROVIDER_LIST_RESPONSE_SCHEMA: Arc<RecordSchema> = Arc::new(
        RecordSchema::builder("CloudProviderListResponse")
            .required("accounts", FieldKind::sequence(FieldKind::record(&CLOUD_PROVIDER_SCHEMA)))
            .build()
            .expect("CloudProviderListResponse schema")
    );

    pub static ref CLOUD_PROVIDER_DATASTORE_SCHEMA: Arc<RecordSchema> = Arc::new(
        RecordSchema::builder("CloudProviderDatastore")
            .required("project_id", FieldKind::Integer)
            .required("cloud_provider_name", FieldKind::String)
            .required("cloud_provider_id", FieldKind::String)
            .required("datastore", FieldKind::record(&DATASTORE_SCHEMA))
            .build()
            .expect("CloudProviderDatastore schema")
    );
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudProvider {
    pub cloud_provider_id: String,
    pub project_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudProviderListResponse {
    pub accounts: Vec<CloudProvider>,
}

/// A datastore seen through the cloud account and project that own it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudProviderDatastore {
    pub project_id: i64,
    pub cloud_provider_name: String,
    pub cloud_provider_id: String,
    pub datastore: Datastore,
}

impl SchemaBacked for CloudProvider {
    fn schema() -> Arc<RecordSchema> {
        Arc::clone(&*CLOUD_PROVIDER_SCHEMA)
    }
}

impl SchemaBacked for CloudProviderListResponse {
    fn schema() -> Arc<RecordSchema> {
        Arc::clone(&*CLOUD_PROVIDER_LIST_RESPONSE_SCHEMA)
    }
}

impl SchemaBacked for CloudProviderDatastore {
    fn schema() -> Arc<RecordSchema> {
        Arc::clone(&*CLOUD_PROVIDER_DATASTORE_SCHEMA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::decode;
    use crate::validation::validator::validate;
    use crate::validation::violation::ViolationKind;
    use serde_json::json;

    #[test]
    fn test_nested_datastore_name_missing() {
        let input = json!({
            "project_id": 11,
            "cloud_provider_name": "aws",
            "cloud_provider_id": "acct-1",
            "datastore": {"type": "postgres"}
        });
        let failure = validate(&CLOUD_PROVIDER_DATASTORE_SCHEMA, &input).unwrap_err();
        assert_eq!(failure.len(), 1);
        assert_eq!(failure.violations()[0].path, "datastore.name");
        assert_eq!(failure.violations()[0].kind, ViolationKind::Missing);
    }

    #[test]
    fn test_decode_cloud_provider_datastore() {
        let input = json!({
            "project_id": 11,
            "cloud_provider_name": "aws",
            "cloud_provider_id": "acct-1",
            "datastore": {"name": "cache", "type": "elasticache-redis"}
        });
        let association: CloudProviderDatastore = decode(&input).unwrap();
        assert_eq!(association.project_id, 11);
        assert_eq!(association.datastore.name, "cache");
        assert_eq!(association.datastore.status, "");
        assert!(association.datastore.env.is_none());
    }

    #[test]
    fn test_account_list_reports_each_bad_entry() {
        let input = json!({
            "accounts": [
                {"cloud_provider_id": "a", "project_id": 1},
                {"cloud_provider_id": 5, "project_id": 1.5},
                {"project_id": 2}
            ]
        });
        let err = decode::<CloudProviderListResponse>(&input).unwrap_err();
        let paths: Vec<&str> = err.violations().iter().map(|v| v.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["accounts.1.cloud_provider_id", "accounts.1.project_id", "accounts.2.cloud_provider_id"]
        );
    }

    #[test]
    fn test_decode_account_list() {
        let response: CloudProviderListResponse = decode(&json!({
            "accounts": [{"cloud_provider_id": "a", "project_id": 1, "ignored": true}]
        }))
        .unwrap();
        assert_eq!(
            response.accounts,
            vec![CloudProvider {
                cloud_provider_id: "a".to_string(),
                project_id: 1
            }]
        );
    }
}
