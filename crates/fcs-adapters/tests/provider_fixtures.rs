// Every registered provider ships a sample payload and its golden snapshot.

#[test]
fn provider_fixtures_exist_for_every_registered_provider() {
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    for provider in fcs_adapters::PROVIDER_IDS {
        let sample = root.join("fixtures").join(provider).join("sample");
        assert!(sample.join("payload.json").exists(), "{provider} payload missing");
        assert!(sample.join("snapshot.json").exists(), "{provider} snapshot missing");
    }
}
