#[cfg(test)]
mod tests {
    use super::super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_point_at_public_services() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind, "127.0.0.1:8501");
        assert_eq!(config.descriptors.provider, DescriptorProviderKind::RdkitService);
        assert!(config.endpoints.uniprot.starts_with("https://rest.uniprot.org"));
        assert_eq!(config.model.path, "models/affinity_forest.json");
        assert_eq!(config.clustalo.poll_interval_secs, 3);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [descriptors]
            provider = "pubchem"

            [model]
            path = "/srv/models/forest.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.descriptors.provider, DescriptorProviderKind::PubChem);
        assert_eq!(config.descriptors.rdkit_url, "https://rdkit-api.onrender.com/compute");
        assert_eq!(config.model.path, "/srv/models/forest.json");
        assert_eq!(config.chat.default_model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_shipped_example_matches_defaults() {
        let config = AppConfig::from_toml_str(include_str!("../../../../biostructx.toml")).unwrap();
        let defaults = AppConfig::default();
        assert_eq!(config.server.bind, defaults.server.bind);
        assert_eq!(config.endpoint_urls(), defaults.endpoint_urls());
        assert_eq!(config.clustalo.max_polls, defaults.clustalo.max_polls);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml_str("[server\nbind = 1").unwrap_err();
        assert!(matches!(err, BioStructXError::Config(_)));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.bind, default_bind());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbind = \"0.0.0.0:9000\"").unwrap();
        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
    }

    #[test]
    fn test_endpoint_urls_cover_descriptor_service() {
        let config = AppConfig::default();
        let urls = config.endpoint_urls();
        assert!(urls.contains(&"https://rdkit-api.onrender.com/compute"));
        assert_eq!(urls.len(), 9);
    }
}
