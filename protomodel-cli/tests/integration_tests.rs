//! End-to-end tests: scan fixture sources, extract the model, generate and
//! write the schema.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use protomodel_cli::{
    config::{Config, ConfigManager, OutputFormat, CONFIG_FILENAME},
    error::{CliError, ModelError},
    generator::SchemaGenerator,
    scanner::SourceScanner,
    writer::{FileWriter, WriteResult},
};

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/todo")
}

fn create_temp_project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    dir
}

fn generate_fixture(config: Config) -> protomodel_cli::Generation {
    let files = SourceScanner::new(fixtures_path()).scan().unwrap();
    SchemaGenerator::new(config).generate(&files).unwrap()
}

fn position(content: &str, needle: &str) -> usize {
    content
        .find(needle)
        .unwrap_or_else(|| panic!("missing `{}` in:\n{}", needle, content))
}

// =============================================================================
// Generation from fixtures
// =============================================================================

#[test]
fn test_fixture_root_message() {
    let generation = generate_fixture(Config::default());
    let content = &generation.content;

    assert_eq!(generation.model_name, "TodoListViewModel");
    assert!(content.contains(
        "message TodoListViewModelState {\n\
         \x20 string title = 1;\n\
         \x20 repeated TodoItemState items = 2;\n\
         \x20 PageTodoItemState archive = 3;\n\
         \x20 repeated Uuid_Attachment_Entry attachments = 4;\n\
         \x20 map<string, int32> counts = 5;\n\
         \x20 TodoItemState selected = 6;\n\
         \x20 google.protobuf.UInt32Value filter_limit = 7;\n\
         }\n"
    ));
}

#[test]
fn test_fixture_nested_messages() {
    let content = generate_fixture(Config::default()).content;

    assert!(content.contains(
        "message TodoItemState {\n\
         \x20 string id = 1;\n\
         \x20 string title = 2;\n\
         \x20 bool done = 3;\n\
         \x20 int32 priority = 4;\n\
         \x20 google.protobuf.Timestamp created_at = 5;\n\
         \x20 google.protobuf.Timestamp due = 6;\n\
         \x20 repeated TodoItemState subtasks = 7;\n\
         }\n"
    ));
    assert!(content.contains(
        "message PageTodoItemState {\n\
         \x20 repeated TodoItemState items = 1;\n\
         \x20 uint32 total = 2;\n\
         }\n"
    ));
    assert!(content.contains(
        "message AttachmentState {\n\
         \x20 string name = 1;\n\
         \x20 bytes content = 2;\n\
         \x20 map<string, string> metadata = 3;\n\
         }\n"
    ));
    assert!(content.contains(
        "message Uuid_Attachment_Entry {\n\
         \x20 string key = 1;\n\
         \x20 AttachmentState value = 2;\n\
         }\n"
    ));

    // Entries are emitted while mapping, composites when the worklist drains.
    let entry = position(&content, "message Uuid_Attachment_Entry");
    let item = position(&content, "message TodoItemState");
    let page = position(&content, "message PageTodoItemState");
    let attachment = position(&content, "message AttachmentState");
    assert!(entry < item && item < page && page < attachment);
    assert_eq!(content.matches("message TodoItemState").count(), 1);
}

#[test]
fn test_fixture_commands() {
    let generation = generate_fixture(Config::default());
    let content = &generation.content;

    assert!(content.contains(
        "message AddItemRequest {\n\
         \x20 string title = 1;\n\
         \x20 int32 priority = 2;\n\
         }\n"
    ));
    assert!(content.contains("message RefreshRequest {}\n"));
    assert!(content.contains("message RemoveItemRequest {\n  string id = 1;\n}\n"));
    assert!(!content.contains("Notify"));
    assert!(!content.contains("NewRequest"));

    assert!(content.contains("  rpc AddItem(AddItemRequest) returns (AddItemResponse);\n"));
    assert!(content.contains("  rpc Refresh(RefreshRequest) returns (RefreshResponse);\n"));
    assert_eq!(generation.rpc_count, 7);
}

#[test]
fn test_fixture_imports() {
    let content = generate_fixture(Config::default()).content;

    assert!(content.contains("import \"google/protobuf/timestamp.proto\";"));
    assert!(content.contains("import \"google/protobuf/wrappers.proto\";"));
    assert!(!content.contains("duration.proto"));
    assert!(generate_fixture(Config::default()).diagnostics.is_empty());
}

#[test]
fn test_generation_is_deterministic() {
    let first = generate_fixture(Config::default()).content;
    let second = generate_fixture(Config::default()).content;
    assert_eq!(first, second);
}

#[test]
fn test_filter_hides_nested_declarations() {
    let files = SourceScanner::new(fixtures_path())
        .with_filter("view_model.rs")
        .unwrap()
        .scan()
        .unwrap();
    let content = SchemaGenerator::new(Config::default())
        .generate(&files)
        .unwrap()
        .content;

    // Undeclared composites still get a (member-less) message.
    assert!(content.contains("message TodoItemState {}\n"));
    // Without the enum declaration `Priority` is treated as a composite.
    assert!(content.contains("  PriorityState priority = 2;\n"));
}

#[test]
fn test_module_qualified_composite_keeps_fields() {
    let dir = create_temp_project(&[
        (
            "src/lib.rs",
            r#"
pub mod models {
    pub struct TodoItem {
        pub title: String,
    }
}

pub struct TodoViewModel {
    pub item: models::TodoItem,
    pub pinned: crate::models::TodoItem,
}
"#,
        ),
    ]);
    let files = SourceScanner::new(dir.path()).scan().unwrap();
    let generation = SchemaGenerator::new(Config::default()).generate(&files).unwrap();
    let content = &generation.content;

    assert!(content.contains("message TodoItemState {\n  string title = 1;\n}\n"));
    assert!(content.contains("  TodoItemState item = 1;\n  TodoItemState pinned = 2;\n"));
    assert_eq!(content.matches("message TodoItemState").count(), 1);
}

#[test]
fn test_module_file_path_resolves_composite() {
    let dir = create_temp_project(&[
        ("src/models.rs", "pub struct Tag { pub label: String }"),
        (
            "src/view_model.rs",
            "pub struct TagsViewModel { pub tags: Vec<models::Tag> }",
        ),
    ]);
    let files = SourceScanner::new(dir.path()).scan().unwrap();
    let content = SchemaGenerator::new(Config::default())
        .generate(&files)
        .unwrap()
        .content;

    assert!(content.contains("message TagState {\n  string label = 1;\n}\n"));
    assert!(content.contains("  repeated TagState tags = 1;\n"));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_file_applies() {
    let dir = create_temp_project(&[(
        CONFIG_FILENAME,
        r#"
[model]
name = "TodoListViewModel"

[output]
file = "todo.proto"

[proto]
package = "todo.v1"
service_name = "TodoService"

[proto.options]
csharp_namespace = "Todo.Grpc"
"#,
    )]);

    let config = ConfigManager::load(Some(&dir.path().join(CONFIG_FILENAME))).unwrap();
    let generation = generate_fixture(config);

    assert_eq!(generation.output_path, PathBuf::from("./generated/todo.proto"));
    assert!(generation.content.contains("\npackage todo.v1;\n"));
    assert!(generation
        .content
        .contains("option csharp_namespace = \"Todo.Grpc\";"));
    assert!(generation.content.contains("service TodoService {"));
}

#[test]
fn test_json_format() {
    let mut config = Config::default();
    config.output.format = OutputFormat::Json;

    let generation = generate_fixture(config);
    let value: serde_json::Value = serde_json::from_str(&generation.content).unwrap();

    assert_eq!(
        generation.output_path,
        PathBuf::from("./generated/todo_list_view_model.json")
    );
    assert_eq!(value["schema"]["source"], "TodoListViewModel");
    assert_eq!(value["schema"]["messages"][1]["provenance"], "synthesized_entry");
    assert_eq!(value["schema"]["imports"]["timestamp"], true);
}

// =============================================================================
// Writing and validation
// =============================================================================

#[test]
fn test_write_then_regenerate_is_unchanged() {
    let out = TempDir::new().unwrap();
    let mut config = Config::default();
    config.output.dir = out.path().to_path_buf();

    let generation = generate_fixture(config.clone());
    let writer = FileWriter::new(false);

    let first = writer
        .write(&generation.output_path, &generation.content)
        .unwrap();
    assert!(first.was_written());
    assert_eq!(
        fs::read_to_string(out.path().join("todo_list_view_model.proto")).unwrap(),
        generation.content
    );

    let again = generate_fixture(config);
    let second = writer.write(&again.output_path, &again.content).unwrap();
    assert!(matches!(second, WriteResult::Unchanged { .. }));
}

#[test]
fn test_dry_run_leaves_disk_untouched() {
    let out = TempDir::new().unwrap();
    let mut config = Config::default();
    config.output.dir = out.path().join("proto");

    let generation = generate_fixture(config);
    let result = FileWriter::new(true)
        .write(&generation.output_path, &generation.content)
        .unwrap();

    assert!(matches!(result, WriteResult::DryRun { .. }));
    assert!(!out.path().join("proto").exists());
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_unmappable_dictionary_value_fails() {
    let dir = create_temp_project(&[(
        "src/lib.rs",
        r#"
pub struct HandlersViewModel {
    pub handlers: std::collections::HashMap<String, fn(i32)>,
}
"#,
    )]);

    let files = SourceScanner::new(dir.path()).scan().unwrap();
    let result = SchemaGenerator::new(Config::default()).generate(&files);

    match result {
        Err(CliError::Generate(e)) => {
            let message = e.to_string();
            assert!(message.contains("HandlersViewModel.handlers"), "{}", message);
        }
        other => panic!("unexpected result: {:?}", other.map(|g| g.content)),
    }
}

#[test]
fn test_ambiguous_root_requires_model() {
    let dir = create_temp_project(&[
        ("a.rs", "pub struct FirstViewModel { pub x: i32 }"),
        ("b.rs", "pub struct SecondViewModel { pub y: i32 }"),
    ]);
    let files = SourceScanner::new(dir.path()).scan().unwrap();

    let result = SchemaGenerator::new(Config::default()).generate(&files);
    assert!(matches!(
        result,
        Err(CliError::Model(ModelError::AmbiguousRoot { .. }))
    ));

    let mut config = Config::default();
    config.model.name = Some("SecondViewModel".to_string());
    let generation = SchemaGenerator::new(config).generate(&files).unwrap();
    assert!(generation.content.contains("message SecondViewModelState {\n  int32 y = 1;\n}"));
}

#[test]
fn test_rank_two_array_fails() {
    let dir = create_temp_project(&[(
        "board.rs",
        "pub struct BoardViewModel { pub cells: [[u8; 3]; 3] }",
    )]);
    let files = SourceScanner::new(dir.path()).scan().unwrap();

    let result = SchemaGenerator::new(Config::default()).generate(&files);
    assert!(matches!(result, Err(CliError::Generate(_))));
}
