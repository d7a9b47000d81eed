//! Loading campaigns from files and running them.

use std::io::Write;

use rossa_core::{PluginRegistry, Rossa};
use serde_json::Value;

use crate::common::{FULL_INTEGRATION_YAML, document, full_integration_parameters};

#[test]
fn test_rossa_parameters_are_interpreted_as_expected() {
    let rossa = Rossa::new(document(full_integration_parameters()));
    assert_eq!(
        rossa.parameters().clone().into_value(),
        full_integration_parameters()
    );
    assert_eq!(rossa.plugins().unwrap(), vec!["dry-run".to_string()]);
}

#[test]
fn test_rossa_from_yaml_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(FULL_INTEGRATION_YAML.as_bytes()).unwrap();

    let rossa = Rossa::from_path(file.path()).unwrap();
    assert_eq!(rossa, Rossa::new(document(full_integration_parameters())));
}

#[tokio::test]
async fn test_full_campaign_dry_run() {
    let rossa = Rossa::new(document(full_integration_parameters()));
    let sequence = rossa.sequence().unwrap();
    let stats = sequence.stats();

    let report = rossa
        .run(&PluginRegistry::with_builtins(), &[])
        .await
        .unwrap();

    assert_eq!(report.records.len(), stats.test_points);
    assert_eq!(report.setups, stats.setups);
    assert_eq!(report.teardowns, stats.teardowns);

    let voltage_records: Vec<_> = report
        .records
        .iter()
        .filter(|record| record.values.contains_key("voltage"))
        .collect();
    assert_eq!(voltage_records.len(), 9 * 9);
    assert!(voltage_records.iter().all(|r| r.values["voltage"] == Value::Null));
}
