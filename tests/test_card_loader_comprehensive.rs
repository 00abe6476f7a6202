use cardset_export::builders::CardLoader;
use cardset_export::config::ExportConfig;
use cardset_export::providers::{JsonModuleLoader, RepositoryRoot};
use cardset_export::{ConcurrencyLimit, ExportError};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

mod comprehensive_card_loader_tests {
    use super::*;

    struct Fixture {
        _project: TempDir,
        root: RepositoryRoot,
    }

    impl Fixture {
        fn new() -> Self {
            let project = TempDir::new().unwrap();
            std::fs::create_dir_all(project.path().join("cards-database/data")).unwrap();
            let config = ExportConfig::new(project.path(), "cards-database");
            let root = RepositoryRoot::resolve(&config).unwrap();
            Self {
                _project: project,
                root,
            }
        }

        fn write(&self, relative: &str, content: &str) -> PathBuf {
            let path = self.root.path().join("data").join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, content).unwrap();
            path
        }

        fn write_json(&self, relative: &str, value: Value) -> PathBuf {
            self.write(relative, &value.to_string())
        }

        fn loader(&self) -> CardLoader {
            CardLoader::new(
                Arc::new(JsonModuleLoader::new(self.root.clone())),
                ConcurrencyLimit::new(3).unwrap(),
            )
        }
    }

    #[tokio::test]
    async fn test_set_reference_wins_and_is_removed() {
        let fixture = Fixture::new();
        let path = fixture.write_json(
            "Pocket/A1/001.json",
            json!({
                "name": {"en": "Bulbasaur"},
                "set": {"id": "A1", "name": {"en": "Genetic Apex"}},
                "boosters": ["mewtwo", "pikachu"]
            }),
        );

        let card = fixture.loader().load_one(&path).await.unwrap();
        assert_eq!(card.set_id, "A1");
        assert_eq!(card.boosters, Some(vec!["mewtwo".to_string(), "pikachu".to_string()]));

        let value = serde_json::to_value(&card).unwrap();
        assert!(value.get("set").is_none());
        assert_eq!(value["set_id"], json!("A1"));
        assert_eq!(value["name"], json!({"en": "Bulbasaur"}));
    }

    #[tokio::test]
    async fn test_parent_directory_is_the_fallback() {
        let fixture = Fixture::new();
        let path = fixture.write_json("Pocket/A2/file.json", json!({"name": {"en": "Mew"}}));

        let card = fixture.loader().load_one(&path).await.unwrap();
        assert_eq!(card.set_id, "A2");
        assert_eq!(card.boosters, None);
    }

    #[tokio::test]
    async fn test_reference_differing_from_directory_is_preferred() {
        let fixture = Fixture::new();
        let path = fixture.write_json("Pocket/A2/010.json", json!({"set": {"id": "A2a"}}));

        let card = fixture.loader().load_one(&path).await.unwrap();
        assert_eq!(card.set_id, "A2a");
    }

    #[tokio::test]
    async fn test_unusable_reference_falls_back_and_is_still_removed() {
        let fixture = Fixture::new();
        let path = fixture.write_json("Pocket/A3/001.json", json!({"set": {"name": "no id"}}));

        let card = fixture.loader().load_one(&path).await.unwrap();
        assert_eq!(card.set_id, "A3");
        assert!(serde_json::to_value(&card).unwrap().get("set").is_none());
    }

    #[tokio::test]
    async fn test_both_module_shapes_are_equivalent() {
        let fixture = Fixture::new();
        let record = json!({"set": {"id": "A1"}, "name": {"en": "Ivysaur"}});
        let bare = fixture.write_json("Pocket/A1/002.json", record.clone());
        let wrapped = fixture.write_json("Pocket/A1/003.json", json!({"default": record}));

        let cards = fixture.loader().load_all(vec![bare, wrapped]).await.unwrap();
        assert_eq!(cards[0], cards[1]);
    }

    #[tokio::test]
    async fn test_order_follows_input_order() {
        let fixture = Fixture::new();
        let files: Vec<PathBuf> = (1..=25)
            .rev()
            .map(|n| fixture.write_json(&format!("Pocket/A1/{:03}.json", n), json!({"localId": n})))
            .collect();

        let cards = fixture.loader().load_all(files).await.unwrap();
        let ids: Vec<i64> = cards.iter().map(|c| c.extra["localId"].as_i64().unwrap()).collect();
        assert_eq!(ids, (1..=25).rev().collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_non_object_module_fails_the_batch() {
        let fixture = Fixture::new();
        let good = fixture.write_json("Pocket/A1/001.json", json!({"name": {"en": "Bulbasaur"}}));
        let bad = fixture.write_json("Pocket/A1/002.json", json!(["not", "a", "card"]));

        let err = fixture.loader().load_all(vec![good, bad]).await.unwrap_err();
        match &err {
            ExportError::CardLoadError { path, source } => {
                assert!(path.ends_with("Pocket/A1/002.json"));
                assert!(matches!(**source, ExportError::DecodeError { .. }));
            }
            other => panic!("expected card load error, got {}", other),
        }
        assert!(err.to_string().starts_with("Failed to load card file"));
    }
}
