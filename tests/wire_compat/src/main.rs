fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use chunkdrive_protocol::types::{
        CreateFileRequest, FileInfo, FileKind, FileList, MoveFilesRequest, Session, UploadedPart,
    };

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and
    /// compares the JSON values key-for-key. A mismatch means the Rust
    /// type would put different bytes on the wire than the remote
    /// service produces and expects.
    fn roundtrip_test<T>(name: &str)
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  fixture: {fixture}\n  rust:    {reserialized}"
        );
    }

    // --- Protocol type tests ---

    #[test]
    fn fixture_session() {
        roundtrip_test::<Session>("session.json");
    }

    #[test]
    fn fixture_file_info() {
        roundtrip_test::<FileInfo>("file_info.json");
    }

    #[test]
    fn fixture_file_list() {
        roundtrip_test::<FileList>("file_list.json");
    }

    #[test]
    fn fixture_uploaded_part() {
        roundtrip_test::<UploadedPart>("uploaded_part.json");
    }

    #[test]
    fn fixture_create_file_request() {
        roundtrip_test::<CreateFileRequest>("create_file_request.json");
    }

    #[test]
    fn fixture_move_request() {
        roundtrip_test::<MoveFilesRequest>("move_request.json");
    }

    // --- Semantic spot checks ---

    #[test]
    fn file_list_distinguishes_kinds() {
        let list: FileList = serde_json::from_value(load_fixture("file_list.json")).unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].kind, FileKind::Folder);
        assert_eq!(list.items[1].kind, FileKind::File);
        assert_eq!(list.meta.count, 2);
    }

    #[test]
    fn create_file_request_keeps_part_order() {
        let req: CreateFileRequest =
            serde_json::from_value(load_fixture("create_file_request.json")).unwrap();
        let ids: Vec<i64> = req.parts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1001, 1002, 1003]);
    }
}
