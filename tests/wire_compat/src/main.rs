fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use slideship_protocol::{
        ChunkAck, ConversionRequest, ConversionResult, DOWNLOAD_PREFIX, ServerErrorBody,
    };
    use slideship_transfer::{ChunkLayout, ResumePoint};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn read_fixture(name: &str) -> String {
        let path = fixtures_dir().join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        serde_json::from_str(&read_fixture(name))
            .unwrap_or_else(|e| panic!("failed to parse fixture {name}: {e}"))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (order-independent comparison).
    fn roundtrip_test<T>(name: &str) -> T
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
            "roundtrip mismatch for {name}:\n  server: {fixture}\n  client: {reserialized}"
        );
        parsed
    }

    // --- Server responses ---

    #[test]
    fn fixture_conversion_success() {
        let result: ConversionResult = roundtrip_test("conversion_success.json");
        let locator = result.download_locator().unwrap();
        assert!(locator.starts_with(DOWNLOAD_PREFIX));
        assert_eq!(result.status.as_deref(), Some("success"));
    }

    #[test]
    fn fixture_conversion_error() {
        let body: ServerErrorBody = roundtrip_test("conversion_error.json");
        assert_eq!(body.status, "error");
        assert_eq!(
            ServerErrorBody::message_from(&read_fixture("conversion_error.json")),
            "Invalid file type. Please upload a .pptx file"
        );
    }

    #[test]
    fn fixture_error_body_is_not_a_result() {
        // An error body parses as a result with no locator.
        let result: ConversionResult =
            serde_json::from_value(load_fixture("conversion_error.json")).unwrap();
        assert!(result.download_locator().is_none());
        assert!(result.extra.contains_key("message"));
    }

    #[test]
    fn fixture_chunk_ack() {
        let ack: ChunkAck = roundtrip_test("chunk_ack.json");
        assert_eq!(ack.0["chunk"], 2);
        assert!(ChunkAck::from_slice(read_fixture("chunk_ack.json").as_bytes()).is_ok());
    }

    // --- Client payloads and state ---

    #[test]
    fn fixture_conversion_request() {
        let request: ConversionRequest = roundtrip_test("conversion_request.json");
        let fields = request.form_fields();
        let names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec![
                "filename",
                "outputName",
                "slideNumbers",
                "conversionDirection",
                "translationToggle"
            ]
        );
        assert_eq!(fields[4].1, "true");
    }

    #[test]
    fn fixture_resume_point() {
        let point: ResumePoint = roundtrip_test("resume_point.json");
        let layout = ChunkLayout::new(5 * 1024 * 1024, 2 * 1024 * 1024).unwrap();
        assert!(point.matches(&layout));
        assert_eq!(point.next_chunk, 2);
    }
}
