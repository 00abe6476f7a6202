use cardset_export::config::ExportConfig;
use cardset_export::{run_export, ExportError, Exporter};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

mod comprehensive_export_tests {
    use super::*;

    fn write_json(path: &Path, value: Value) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, serde_json::to_vec_pretty(&value).unwrap()).unwrap();
    }

    /// Two sets and three cards in the exported series, plus one ignored series
    fn project() -> (TempDir, ExportConfig) {
        let project = TempDir::new().unwrap();
        let series = project.path().join("cards-database/data/Pokemon TCG Pocket");

        write_json(
            &series.join("A1.json"),
            json!({"id": "A1", "name": {"en": "Genetic Apex"}, "serie": {"id": "tcgp"}}),
        );
        write_json(&series.join("A1/001.json"), json!({"name": {"en": "Bulbasaur"}, "set": {"id": "A1"}}));
        write_json(&series.join("A1/002.json"), json!({"default": {"name": {"en": "Ivysaur"}}}));
        write_json(&series.join("P-A.json"), json!({"id": "P-A"}));
        write_json(&series.join("P-A/001.json"), json!({"name": {"en": "Potion"}}));

        let other = project.path().join("cards-database/data/Base");
        write_json(&other.join("base1.json"), json!({"id": "base1"}));
        write_json(&other.join("base1/1.json"), json!({"name": {"en": "Alakazam"}}));

        let mut config = ExportConfig::new(project.path(), "cards-database");
        config.output_dir = project.path().join("generated");
        (project, config)
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_full_export_publishes_both_artifacts() {
        let (_project, config) = project();
        let output_dir = config.output_dir.clone();

        let summary = run_export(config).await.unwrap();
        assert_eq!(summary.set_count, 2);
        assert_eq!(summary.card_count, 3);
        assert_eq!(summary.artifacts.cards_path, output_dir.join("cards.json"));

        let sets = read_json(&summary.artifacts.sets_path);
        assert_eq!(
            sets,
            json!([
                {"id": "A1", "name": {"en": "Genetic Apex"}},
                {"id": "P-A", "name": {"en": "P-A"}}
            ])
        );

        let cards = read_json(&summary.artifacts.cards_path);
        let set_ids: Vec<&str> = cards
            .as_array()
            .unwrap()
            .iter()
            .map(|card| card["set_id"].as_str().unwrap())
            .collect();
        assert_eq!(set_ids, vec!["A1", "A1", "P-A"]);
        assert!(cards.as_array().unwrap().iter().all(|card| card.get("set").is_none()));
    }

    #[tokio::test]
    async fn test_collect_runs_without_publishing() {
        let (_project, config) = project();
        let output_dir = config.output_dir.clone();

        let exporter = Exporter::new(config).unwrap();
        let (cards, sets) = exporter.collect().await.unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(sets.len(), 2);
        assert!(!output_dir.exists());
    }

    #[tokio::test]
    async fn test_broken_card_aborts_without_publishing() {
        let (project, config) = project();
        let output_dir = config.output_dir.clone();
        std::fs::write(
            project.path().join("cards-database/data/Pokemon TCG Pocket/P-A/002.json"),
            "nope",
        )
        .unwrap();

        let err = run_export(config).await.unwrap_err();
        assert!(matches!(err, ExportError::CardLoadError { .. }));
        assert!(err.failing_path().unwrap().ends_with("P-A/002.json"));
        assert!(!output_dir.join("cards.json").exists());
        assert!(!output_dir.join("sets.json").exists());
    }

    #[tokio::test]
    async fn test_broken_export_keeps_previous_publish() {
        let (project, config) = project();
        let first = run_export(config.clone()).await.unwrap();
        let published_cards = std::fs::read(&first.artifacts.cards_path).unwrap();

        std::fs::write(
            project.path().join("cards-database/data/Pokemon TCG Pocket/A2.json"),
            "[]",
        )
        .unwrap();
        let err = run_export(config).await.unwrap_err();
        assert!(matches!(err, ExportError::SetLoadError { .. }));
        assert_eq!(std::fs::read(&first.artifacts.cards_path).unwrap(), published_cards);
    }

    #[tokio::test]
    async fn test_missing_repository_is_a_setup_error() {
        let project = TempDir::new().unwrap();
        let config = ExportConfig::new(project.path(), "cards-database");
        let err = run_export(config).await.unwrap_err();
        assert!(matches!(err, ExportError::SetupError { .. }));
    }
}
