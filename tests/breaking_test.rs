use api_surface_diff::compat::{ChangeCategory, ChangeSeverity, CompareOptions, ComparisonResult};
use api_surface_diff::surface::ApiSurface;

fn compare(old: &str, new: &str) -> ComparisonResult {
    let old_surface = ApiSurface::try_from(old).expect("Failed to parse old snapshot");
    let new_surface = ApiSurface::try_from(new).expect("Failed to parse new snapshot");
    old_surface
        .check_changes(&new_surface, &CompareOptions::default())
        .expect("Comparison failed")
}

/// Wraps a single `Formatter` class declaring `members` (YAML list items).
fn formatter_with(version: &str, members: &str) -> String {
    format!(
        r#"
package_id: Contoso.Text
version: "{version}"
assemblies:
  - name: Contoso.Text
    version: "{version}.0"
    types:
      - namespace: Contoso.Text
        name: Formatter
        members:
{members}
"#
    )
}

const STRING: &str = "{ kind: named, namespace: System, name: String, assembly: { name: System.Runtime } }";
const INT: &str = "{ kind: named, namespace: System, name: Int32, assembly: { name: System.Runtime } }";
const NULLABLE_INT: &str = "{ kind: generic, definition: { namespace: System, name: Nullable`1, assembly: { name: System.Runtime } }, arguments: [ { kind: named, namespace: System, name: Int32, assembly: { name: System.Runtime } } ] }";
const BOOL: &str = "{ kind: named, namespace: System, name: Boolean, assembly: { name: System.Runtime } }";
const VOID: &str = "{ kind: named, namespace: System, name: Void, assembly: { name: System.Runtime } }";

fn method(params: &[(&str, &str, bool)]) -> String {
    let mut out = format!("          - kind: method\n            name: F\n            member_type: {VOID}\n");
    if params.is_empty() {
        out.push_str("            parameters: []\n");
        return out;
    }
    out.push_str("            parameters:\n");
    for (name, ty, has_default) in params {
        out.push_str(&format!(
            "              - {{ name: {name}, parameter_type: {ty}, has_default: {has_default} }}\n"
        ));
    }
    out
}

#[test]
fn test_optional_parameter_overload_is_merged() {
    let old = formatter_with("1.0", &method(&[("s", STRING, false)]));
    let new = formatter_with("2.0", &method(&[("s", STRING, false), ("n", NULLABLE_INT, true)]));

    let result = compare(&old, &new);

    assert_eq!(result.changes.len(), 1, "Should report exactly one change: {:?}", result.changes);
    let change = &result.changes[0];
    assert_eq!(change.category(), ChangeCategory::MethodOverloadAdded);
    assert_eq!(change.severity(), ChangeSeverity::Low);
    assert_eq!(change.from(), Some("F(String)"));
    assert_eq!(change.to(), Some("F(String,Nullable`1)"));
    assert!(!result.has_breaking_changes());
}

#[test]
fn test_required_parameter_is_not_merged() {
    let old = formatter_with("1.0", &method(&[("n", INT, false)]));
    let new = formatter_with("2.0", &method(&[("n", INT, false), ("s", STRING, false)]));

    let result = compare(&old, &new);

    assert_eq!(result.changes.len(), 2);
    assert_eq!(result.changes[0].category(), ChangeCategory::MemberRemoved);
    assert_eq!(result.changes[1].category(), ChangeCategory::MemberAdded);
    assert!(
        result.changes.iter().all(|c| c.severity() == ChangeSeverity::High),
        "Both sides of a required-parameter change should be High"
    );
    assert!(result.has_breaking_changes());
}

#[test]
fn test_parameter_reordering_is_not_merged() {
    let old = formatter_with("1.0", &method(&[("a", STRING, false), ("b", INT, false), ("c", BOOL, false)]));
    let new = formatter_with("2.0", &method(&[("b", INT, false), ("a", STRING, false), ("c", BOOL, false)]));

    let result = compare(&old, &new);

    let categories: Vec<_> = result.changes.iter().map(|c| c.category()).collect();
    assert_eq!(
        categories,
        vec![ChangeCategory::MemberRemoved, ChangeCategory::MemberAdded]
    );
    assert_eq!(result.changes[0].from(), Some("F(String,Int32,Boolean)"));
    assert_eq!(result.changes[1].to(), Some("F(Int32,String,Boolean)"));
}

#[test]
fn test_reloaded_copy_with_new_versions_has_no_changes() {
    let members = format!(
        "{}          - kind: property\n            name: Culture\n            member_type: {{ kind: named, namespace: System.Globalization, name: CultureInfo, assembly: {{ name: System.Runtime, version: 4.0.0.0 }} }}\n",
        method(&[("s", STRING, false)])
    );
    let old = formatter_with("1.0", &members);
    let new = formatter_with("1.1", &members.replace("4.0.0.0", "8.0.0.0"));

    let result = compare(&old, &new);

    assert!(result.changes.is_empty(), "Unexpected changes: {:?}", result.changes);
    assert_eq!(result.summary.total_changes, 0);
}

#[test]
fn test_enum_value_removed() {
    let enum_doc = |values: &str| {
        format!(
            r#"
package_id: Contoso.Text
version: "1.0"
assemblies:
  - name: Contoso.Text
    types:
      - namespace: Contoso.Text
        name: Alignment
        is_enum: true
        enum_values: [{values}]
"#
        )
    };
    let old = enum_doc("{ name: A, value: 0 }, { name: B, value: 1 }, { name: C, value: 2 }");
    let new = enum_doc("{ name: A, value: 0 }, { name: C, value: 2 }");

    let result = compare(&old, &new);

    assert_eq!(result.changes.len(), 1);
    assert_eq!(result.changes[0].category(), ChangeCategory::EnumValueRemoved);
    assert_eq!(result.changes[0].member_name(), Some("B"));
    assert_eq!(result.changes[0].severity(), ChangeSeverity::High);
}

#[test]
fn test_every_identity_is_accounted_for() {
    let doc = |types: &[&str]| {
        let mut out = String::from(
            "package_id: P\nversion: \"1\"\nassemblies:\n  - name: P\n    types:\n",
        );
        for t in types {
            out.push_str(&format!("      - {{ namespace: N, name: {t} }}\n"));
        }
        out
    };
    let old = doc(&["Kept", "Gone", "Sealed"]);
    let new = doc(&["Kept", "Fresh", "Sealed"]).replace(
        "{ namespace: N, name: Sealed }",
        "{ namespace: N, name: Sealed, is_sealed: true }",
    );

    let result = compare(&old, &new);

    let find = |name: &str| {
        result
            .changes
            .iter()
            .filter(|c| c.type_name() == name)
            .map(|c| c.category())
            .collect::<Vec<_>>()
    };
    assert!(find("Kept").is_empty());
    assert_eq!(find("Gone"), vec![ChangeCategory::TypeRemoved]);
    assert_eq!(find("Fresh"), vec![ChangeCategory::TypeAdded]);
    assert_eq!(find("Sealed"), vec![ChangeCategory::SealedAdded]);
    assert_eq!(result.changes.len(), 3);
}

#[test]
fn test_empty_new_snapshot_is_an_error() {
    let old = formatter_with("1.0", &method(&[]));
    let new = "package_id: Contoso.Text\nversion: \"2.0\"\nassemblies: []\n";

    let old_surface = ApiSurface::try_from(&old).unwrap();
    let new_surface = ApiSurface::try_from(new).unwrap();
    let err = old_surface
        .check_changes(&new_surface, &CompareOptions::default())
        .unwrap_err();

    assert!(err.to_string().contains("new snapshot contains no public types"));
}
