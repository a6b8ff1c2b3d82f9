use csv_batch_translator::state::SilentReporter;
use csv_batch_translator::{
    AppConfig, BatchScheduler, ColumnConfig, LanguagePair, MockEngineFactory, MockMode, Record,
    RecordSet, SchedulerConfig, TranslationJob, TranslationSpec,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn desc_records(n: usize) -> RecordSet {
    let rows = (0..n)
        .map(|i| Record::from_pairs([("id", format!("{}", 100 - i)), ("desc", format!("item {}", i))]))
        .collect();
    RecordSet::new(vec!["id".to_string(), "desc".to_string()], rows)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn forced_failure_in_last_chunk_leaves_only_its_rows() {
    let factory = MockEngineFactory::new(MockMode::Suffix).panic_on(["item 21"]);
    let scheduler = BatchScheduler::new(Arc::new(factory), SchedulerConfig::default());
    let spec = TranslationSpec::new("en", "id", ["desc"]);

    let output = scheduler
        .translate_all_with(desc_records(25), &spec, 4, &SilentReporter, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(output.stats.chunks_total, 3);
    assert_eq!(output.stats.fallback_chunks, 1);
    for (i, record) in output.records.records.iter().enumerate() {
        // ids run backwards, so position must come from the chunk offsets
        assert_eq!(record.get("id"), Some(format!("{}", 100 - i).as_str()));
        let expected = if i >= 20 {
            format!("item {}", i)
        } else {
            format!("item {}_id", i)
        };
        assert_eq!(record.get("desc"), Some(expected.as_str()));
    }
}

#[tokio::test]
async fn markup_falls_back_to_plain_text_path() {
    let spec = TranslationSpec::new("en", "id", ["desc"]);
    let set = RecordSet::new(
        vec!["desc".to_string()],
        vec![Record::from_pairs([("desc", "<p>Hello</p>")])],
    );

    let with_markup = BatchScheduler::new(
        Arc::new(MockEngineFactory::new(MockMode::Suffix)),
        SchedulerConfig::default(),
    );
    let translated = with_markup.translate_all(set.clone(), &spec, 1).await.unwrap();
    assert_eq!(translated.records[0].get("desc"), Some("<p>Hello</p>_id_markup"));

    let plain_only = BatchScheduler::new(
        Arc::new(MockEngineFactory::new(MockMode::Suffix).without_markup()),
        SchedulerConfig::default(),
    );
    let translated = plain_only.translate_all(set, &spec, 1).await.unwrap();
    assert_eq!(translated.records[0].get("desc"), Some("<p>Hello</p>_id"));
}

#[tokio::test]
async fn csv_directory_to_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    std::fs::create_dir_all(&input).unwrap();
    std::fs::write(
        input.join("faq.csv"),
        "\"question\",\"answer\",\"slug\"\nHow?,Like this,how\n\"Why?\",,why\nWhen?,Café hours\n",
    )
    .unwrap();
    std::fs::write(input.join("notes.csv"), "text\nignored\n").unwrap();
    std::fs::write(
        input.join("column_data.json"),
        r#"{"faq.csv": {"translate": ["question", "answer"]}}"#,
    )
    .unwrap();

    let mut config = AppConfig::default();
    config.paths.input_dir = input.clone();
    config.paths.output_dir = dir.path().join("out");

    let columns = ColumnConfig::load(&input, "column_data.json").unwrap();
    let files = columns.available_files().unwrap();
    assert_eq!(files, vec!["faq.csv".to_string()]);

    let factory = MockEngineFactory::new(MockMode::Uppercase);
    let job = TranslationJob::new(config, columns, Arc::new(factory.clone()), 2);
    let pair = LanguagePair::new("en", "id");
    job.preflight(&pair).await.unwrap();

    let reports = job.process_files(&files, &pair, &SilentReporter).await.unwrap();
    assert_eq!(reports[0].rows, 3);

    let json = std::fs::read_to_string(dir.path().join("out").join("id").join("faq.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let rows = value["rows"].as_array().unwrap();
    assert_eq!(rows[0]["question"], "HOW?");
    assert_eq!(rows[0]["slug"], "how");
    assert_eq!(rows[1]["question"], "WHY?");
    assert_eq!(rows[1]["answer"], "");
    assert_eq!(rows[2]["answer"], "CAFÉ HOURS");
    assert_eq!(rows[2]["slug"], "");
    assert!(json.contains("CAFÉ"));

    let keys: Vec<&String> = rows[0].as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 3);
    assert!(factory.connections() >= 1);
}
