use super::*;
use crate::model::{FieldValue, OutputRef};
use serde_json::json;

fn ctx() -> StackContext {
    let mut ctx = StackContext::new("dev");
    ctx.set_config("env", "dev");
    ctx.set_config("location", "westeurope");
    ctx.set_config("vnetAddressSpace", "10.198.10.0/24");
    ctx.set_config("ownerAdObjectId", "owner-object");
    ctx.set_config("ownerGroupObjectId", "owner-group");
    ctx.set_secret("tenantId", "tenant");
    ctx.set_secret("sqlServerAdministratorPassword", "hunter2");
    ctx
}

fn parse(kdl: &str) -> Result<Stack> {
    parse_stack_str(kdl, "unnamed".to_string(), &ctx())
}

#[test]
fn test_parse_minimal_resource() {
    let stack = parse(
        r#"
        stack "poc"
        resource "resourceGroup" kind="azure:core/ResourceGroup" {
            name "midhun-poc-pulumi"
        }
        "#,
    )
    .unwrap();

    assert_eq!(stack.name, "poc");
    assert_eq!(stack.resources.len(), 1);
    let rg = &stack.resources[0];
    assert_eq!(rg.name(), "resourceGroup");
    assert_eq!(rg.kind(), "azure:core/ResourceGroup");
    assert_eq!(rg.input("name"), Some(&FieldValue::from("midhun-poc-pulumi")));
    assert!(rg.tags().is_none());
}

#[test]
fn test_default_name_without_stack_node() {
    let stack = parse_stack_str("", "infra".to_string(), &ctx()).unwrap();
    assert_eq!(stack.name, "infra");
    assert!(stack.resources.is_empty());
}

#[test]
fn test_parse_ref_annotation() {
    let stack = parse(
        r#"
        resource "sNet" kind="azure:network/Subnet" {
            virtual_network_name (ref)"vNet.name"
        }
        "#,
    )
    .unwrap();

    assert_eq!(
        stack.resources[0].input("virtual_network_name"),
        Some(&FieldValue::Deferred(OutputRef::new("vNet", "name")))
    );
}

#[test]
fn test_parse_config_secret_and_naming_annotations() {
    let stack = parse(
        r#"
        naming owner="acme"
        resource "vault" kind="azure:keyvault/KeyVault" {
            name (naming)"key-vault"
            tenant_id (secret)"tenantId"
            region (config)"location"
        }
        "#,
    )
    .unwrap();

    let vault = &stack.resources[0];
    assert_eq!(stack.naming.owner(), "acme");
    assert_eq!(vault.input("name"), Some(&FieldValue::from("acme-dev-new-vault")));
    assert_eq!(vault.input("tenant_id"), Some(&FieldValue::from("tenant")));
    assert_eq!(vault.input("region"), Some(&FieldValue::from("westeurope")));
}

#[test]
fn test_naming_declared_after_use() {
    let stack = parse(
        r#"
        resource "rg" kind="azure:core/ResourceGroup" {
            name (naming)"resource-group"
        }
        naming owner="late"
        "#,
    )
    .unwrap();
    assert_eq!(
        stack.resources[0].input("name"),
        Some(&FieldValue::from("late-dev-new-rg"))
    );
}

#[test]
fn test_missing_config_is_reported() {
    let result = parse(
        r#"
        resource "vNet" kind="azure:network/VirtualNetwork" {
            address_spaces (config)"missingKey"
        }
        "#,
    );
    match result {
        Err(StackError::MissingConfig { key, stack }) => {
            assert_eq!(key, "missingKey");
            assert_eq!(stack, "dev");
        }
        other => panic!("Expected MissingConfig, got {:?}", other),
    }
}

#[test]
fn test_unknown_annotation_rejected() {
    let result = parse(
        r#"
        resource "rg" kind="azure:core/ResourceGroup" {
            name (env)"HOME"
        }
        "#,
    );
    assert!(matches!(result, Err(StackError::InvalidConfig(_))));
}

#[test]
fn test_invalid_ref_rejected() {
    let result = parse(
        r#"
        resource "sNet" kind="azure:network/Subnet" {
            virtual_network_name (ref)"vNet"
        }
        "#,
    );
    assert!(matches!(result, Err(StackError::InvalidOutputRef(_))));
}

#[test]
fn test_resource_requires_kind() {
    let result = parse(r#"resource "rg" { name "x" }"#);
    assert!(matches!(result, Err(StackError::InvalidConfig(_))));
}

/// A dotted name could never be addressed by (ref)"<resource>.<field>"
#[test]
fn test_resource_name_must_be_addressable() {
    let dotted = parse(
        r#"
        resource "net.main" kind="azure:network/VirtualNetwork"
        resource "peer" kind="azure:network/VirtualNetworkPeering" {
            remote_virtual_network_id (ref)"net.main.id"
        }
        "#,
    );
    match dotted {
        Err(StackError::InvalidConfig(msg)) => assert!(msg.contains("'net.main'")),
        other => panic!("Expected InvalidConfig, got {:?}", other),
    }

    for kdl in [
        r#"resource "" kind="azure:core/ResourceGroup""#,
        r#"lookup "  " kind="azure:network/getVirtualNetwork""#,
    ] {
        assert!(matches!(parse(kdl), Err(StackError::InvalidConfig(_))));
    }
}

#[test]
fn test_parse_scalars_lists_and_blocks() {
    let stack = parse(
        r#"
        resource "nsg" kind="azure:network/NetworkSecurityGroup" {
            secret_permissions "get" "list"
            security_rules {
                name "inbound-443-100"
                priority 100
                enabled #true
            }
            subnets {
                - { name "subnet1"; security_group (ref)"other.id" }
                - { name "subnet2" }
            }
            empty
        }
        "#,
    )
    .unwrap();

    let nsg = &stack.resources[0];
    assert_eq!(
        nsg.input("secret_permissions"),
        Some(&FieldValue::List(vec![
            FieldValue::from("get"),
            FieldValue::from("list")
        ]))
    );

    let Some(FieldValue::Object(rules)) = nsg.input("security_rules") else {
        panic!("security_rules should be a block");
    };
    assert_eq!(rules.get("priority"), Some(&FieldValue::literal(100)));
    assert_eq!(rules.get("enabled"), Some(&FieldValue::literal(true)));

    let Some(FieldValue::List(subnets)) = nsg.input("subnets") else {
        panic!("subnets should be a list");
    };
    assert_eq!(subnets.len(), 2);
    assert_eq!(nsg.references(), vec![&OutputRef::new("other", "id")]);
    assert_eq!(nsg.input("empty"), Some(&FieldValue::Literal(json!(null))));
}

#[test]
fn test_repeated_fields_collect_into_list() {
    let stack = parse(
        r#"
        resource "vNet" kind="azure:network/VirtualNetwork" {
            subnet { name "subnet1" }
            subnet { name "subnet2" }
        }
        "#,
    )
    .unwrap();
    let Some(FieldValue::List(subnets)) = stack.resources[0].input("subnet") else {
        panic!("repeated subnet blocks should collect into a list");
    };
    assert_eq!(subnets.len(), 2);
}

#[test]
fn test_depends_on_is_not_an_input() {
    let stack = parse(
        r#"
        resource "nic" kind="azure:network/NetworkInterface" {
            name "nic"
            depends_on "nsg" "vNet"
        }
        "#,
    )
    .unwrap();
    let nic = &stack.resources[0];
    assert_eq!(nic.depends_on(), ["nsg".to_string(), "vNet".to_string()]);
    assert!(nic.input("depends_on").is_none());
}

#[test]
fn test_tag_sets_are_shared() {
    let stack = parse(
        r#"
        tags "default" {
            owner "ops@example.com"
            environment (config)"env"
            retention 30
        }
        resource "rg" kind="azure:core/ResourceGroup" tags="default" { name "rg" }
        resource "vNet" kind="azure:network/VirtualNetwork" tags="default" { name "vnet" }
        "#,
    )
    .unwrap();

    let rg_tags = stack.resources[0].tags().unwrap();
    let vnet_tags = stack.resources[1].tags().unwrap();
    assert!(rg_tags.shares_storage_with(vnet_tags));
    assert!(rg_tags.shares_storage_with(&stack.tag_sets["default"]));
    assert_eq!(rg_tags.get("environment"), Some("dev"));
    assert_eq!(rg_tags.get("retention"), Some("30"));
}

#[test]
fn test_undeclared_tag_set_rejected() {
    let result = parse(r#"resource "rg" kind="azure:core/ResourceGroup" tags="missing""#);
    assert!(matches!(result, Err(StackError::InvalidConfig(_))));
}

#[test]
fn test_tag_values_must_be_literal() {
    let result = parse(
        r#"
        tags "default" { owner (ref)"rg.owner" }
        "#,
    );
    assert!(matches!(result, Err(StackError::InvalidConfig(_))));
}

#[test]
fn test_lookup_and_outputs() {
    let stack = parse(
        r#"
        lookup "remoteVnet" kind="azure:network/getVirtualNetwork" {
            name "midhun-test-vnet-1"
            resource_group_name "midhun-m-dev"
        }
        output "remoteVnetId" (ref)"remoteVnet.id"
        "#,
    )
    .unwrap();

    assert_eq!(stack.lookups().count(), 1);
    assert!(stack.resource("remoteVnet").unwrap().is_lookup());
    assert_eq!(
        stack.outputs.get("remoteVnetId"),
        Some(&OutputRef::new("remoteVnet", "id"))
    );
}

#[test]
fn test_duplicate_output_rejected() {
    let result = parse(
        r#"
        output "id" (ref)"a.id"
        output "id" (ref)"b.id"
        "#,
    );
    assert!(matches!(result, Err(StackError::InvalidConfig(_))));
}

#[test]
fn test_invalid_kdl() {
    let result = parse(r#"resource "rg" {"#);
    assert!(matches!(result, Err(StackError::KdlParse(_))));
}

#[test]
fn test_parse_demo_stack() {
    let content = include_str!("../../../../demos/poc/stack.kdl");
    let stack = parse_stack_str(content, "poc".to_string(), &ctx()).unwrap();

    assert_eq!(stack.name, "poc-pulumi");
    assert_eq!(stack.naming.owner(), "midhun");
    assert_eq!(stack.lookups().count(), 2);
    assert_eq!(stack.resources_by_kind("azure:network/Subnet").len(), 2);
    assert_eq!(
        stack.resource("storage").unwrap().input("name"),
        Some(&FieldValue::from("midhundevnewsa"))
    );
    assert_eq!(
        stack.resource("sbListen").unwrap().input("name"),
        Some(&FieldValue::from("midhun-dev-sbns-listen"))
    );
    assert_eq!(
        stack.outputs.get("subnetId"),
        Some(&OutputRef::new("gsubnet1", "id"))
    );

    let tagged: Vec<_> = stack.resources.iter().filter_map(|r| r.tags()).collect();
    assert!(tagged.len() > 10);
    assert!(tagged.iter().all(|t| t.shares_storage_with(tagged[0])));
}

#[test]
fn test_parse_stack_file_uses_directory_name() {
    let temp_dir = tempfile::tempdir().unwrap();
    let project = temp_dir.path().join("network");
    std::fs::create_dir(&project).unwrap();
    let path = project.join("stack.kdl");
    std::fs::write(&path, r#"resource "rg" kind="azure:core/ResourceGroup""#).unwrap();

    let stack = parse_stack_file(&path, &ctx()).unwrap();
    assert_eq!(stack.name, "network");
    assert_eq!(stack.resources.len(), 1);

    let missing = parse_stack_file(project.join("missing.kdl"), &ctx());
    assert!(matches!(missing, Err(StackError::IoError { .. })));
}
