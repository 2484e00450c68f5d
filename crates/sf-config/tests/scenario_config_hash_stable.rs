//! Config hash stability.
//!
//! GREEN when:
//! - the same YAML input hashes identically across calls
//! - key order inside YAML does not change the hash
//! - a changed value changes the hash
//! - an overlay that restates the defaults hashes like no overlay at all

use sf_config::{load_layered_yaml_from_strings, StorefrontConfig};

const BASE_YAML: &str = r#"
server:
  bind_addr: "0.0.0.0:3000"
seed:
  website_inventory: 50
  customer_bank: 500
"#;

const BASE_YAML_REORDERED: &str = r#"
seed:
  customer_bank: 500
  website_inventory: 50
server:
  bind_addr: "0.0.0.0:3000"
"#;

#[test]
fn same_input_produces_identical_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, b.canonical_json);
    assert_eq!(a.config_hash.len(), 64, "sha256 hex is 64 chars");
}

#[test]
fn key_order_does_not_change_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
}

#[test]
fn different_values_produce_different_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML, "seed:\n  customer_bank: 501\n"]).unwrap();
    assert_ne!(a.config_hash, b.config_hash);
}

#[test]
fn no_documents_resolves_to_defaults() {
    let loaded = load_layered_yaml_from_strings(&[]).unwrap();
    assert_eq!(loaded.config, StorefrontConfig::default());

    let restated = load_layered_yaml_from_strings(&["seed:\n  website_inventory: 100\n"]).unwrap();
    assert_eq!(loaded.config_hash, restated.config_hash);
}
