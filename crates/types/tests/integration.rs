//! Integration tests for types

#[cfg(test)]
mod tests {
    use polyenv_types::*;

    #[test]
    fn test_version_set_deserializes_from_strings() {
        let set: RuntimeVersionSet = serde_json::from_str(r#"["3.7", "3.8", "3.9"]"#).unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains(&RuntimeVersion::new(3, 8)));

        let err = serde_json::from_str::<RuntimeVersionSet>("[]");
        assert!(err.is_err());
    }

    #[test]
    fn test_policy_table_from_json() {
        let table: VersionPolicyTable = serde_json::from_str(
            r#"{
                "base": ["python{version}"],
                "rules": [{"min_version": "3.10", "packages": ["python{version}-venv"]}]
            }"#,
        )
        .unwrap();
        let versions = RuntimeVersionSet::parse(&["3.9", "3.10"]).unwrap();
        let plan = table.resolve(&versions).unwrap();
        assert_eq!(plan.entries[0].packages.len(), 1);
        assert_eq!(plan.entries[1].packages[1].as_str(), "python3.10-venv");
    }

    #[test]
    fn test_file_mode_serializes_as_octal() {
        let json = serde_json::to_string(&FileMode::READ_EXECUTE_ALL).unwrap();
        assert_eq!(json, r#""0555""#);
    }

    #[test]
    fn test_stage_order() {
        assert!(Stage::RegisterSource < Stage::InstallRuntimes);
        assert!(Stage::InstallRuntimes < Stage::FetchArtifact);
        assert!(Stage::FetchArtifact < Stage::InstallDependencies);
        assert_eq!(Stage::ALL.len(), 5);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Tty);
    }
}
