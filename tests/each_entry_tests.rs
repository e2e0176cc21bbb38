use csv_each::{each_entry, ColumnNames, CsvEach, CsvEachError, Entry, EntryConfig};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

const TEST_DATA: &str = "Column1,Column2\n\
value1,value2\t\n \
value3\t,value4\n\
\"val\"ue5,\"val\"\"ue,6\"\n\
,\n\
\n\
value8,value9\n\
value10,value11,value12\n\
value13\n";

const TEST_DATA_RECORDS: usize = 8;

fn fixture() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(TEST_DATA.as_bytes()).unwrap();
    file
}

fn lenient_instance(file: &NamedTempFile) -> CsvEach {
    CsvEach::new(EntryConfig {
        filename: Some(file.path().to_path_buf()),
        raise_on_empty_lines: Some(false),
        raise_on_missing_columns: Some(false),
        raise_on_extra_columns: Some(false),
        ..Default::default()
    })
}

async fn collect(csv: &CsvEach, config: EntryConfig) -> csv_each::Result<Vec<Entry>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    csv.each_entry(config, move |entry| {
        let sink = sink.clone();
        async move {
            sink.lock().unwrap().push(entry);
            Ok::<(), CsvEachError>(())
        }
    })
    .await?;
    let entries = seen.lock().unwrap().clone();
    Ok(entries)
}

#[tokio::test]
async fn test_every_record_reaches_the_step() {
    let file = fixture();
    let entries = collect(&lenient_instance(&file), EntryConfig::default())
        .await
        .unwrap();

    assert_eq!(entries.len(), TEST_DATA_RECORDS);
    assert!(entries.iter().all(|e| e.as_record().is_some()));
}

#[tokio::test]
async fn test_trim_line() {
    let file = fixture();
    let csv = lenient_instance(&file);

    let trimmed = collect(
        &csv,
        EntryConfig {
            trim_line: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(trimmed[0].get("Column2"), Some(&json!("value2")));

    let untouched = collect(&csv, EntryConfig::default()).await.unwrap();
    assert_eq!(untouched[0].get("Column2"), Some(&json!("value2\t")));
}

#[tokio::test]
async fn test_trim_columns() {
    let file = fixture();
    let csv = lenient_instance(&file);

    let trimmed = collect(
        &csv,
        EntryConfig {
            trim_columns: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(trimmed[0].get("Column2"), Some(&json!("value2")));
    assert_eq!(trimmed[1].get("Column1"), Some(&json!("value3")));

    let untouched = collect(&csv, EntryConfig::default()).await.unwrap();
    assert_eq!(untouched[1].get("Column1"), Some(&json!(" value3\t")));
}

#[tokio::test]
async fn test_raise_on_empty_lines() {
    let file = fixture();
    let err = collect(
        &lenient_instance(&file),
        EntryConfig {
            raise_on_empty_lines: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CsvEachError::EmptyLine { line: 6 }));
    assert_eq!(err.to_string(), "line 6: empty line");
}

#[tokio::test]
async fn test_raise_on_missing_columns() {
    let file = fixture();
    let err = collect(
        &lenient_instance(&file),
        EntryConfig {
            raise_on_missing_columns: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.line_number(), Some(6));
    assert_eq!(
        err.to_string(),
        "line 6: missing columns: expected 2 but found only 1"
    );
}

#[tokio::test]
async fn test_raise_on_extra_columns() {
    let file = fixture();
    let err = collect(
        &lenient_instance(&file),
        EntryConfig {
            raise_on_extra_columns: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "line 8: extra columns: expected 2 but found 3"
    );
}

#[tokio::test]
async fn test_extra_columns_truncated_when_not_raising() {
    let file = fixture();
    let entries = collect(&lenient_instance(&file), EntryConfig::default())
        .await
        .unwrap();

    assert_eq!(
        entries[6].clone().into_value(),
        json!({"Column1": "value10", "Column2": "value11"})
    );
}

#[tokio::test]
async fn test_return_lines() {
    let file = fixture();
    let entries = collect(
        &lenient_instance(&file),
        EntryConfig {
            return_lines: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // no header is consumed in line mode
    assert_eq!(entries.len(), TEST_DATA_RECORDS + 1);
    assert_eq!(entries[0], Entry::Line("Column1,Column2".into()));
    assert_eq!(entries[3], Entry::Line("\"val\"ue5,\"val\"\"ue,6\"".into()));
}

#[tokio::test]
async fn test_return_arrays() {
    let file = fixture();
    let entries = collect(
        &lenient_instance(&file),
        EntryConfig {
            return_arrays: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(entries.len(), TEST_DATA_RECORDS);
    assert_eq!(entries[0].as_array(), Some(&[json!("value1"), json!("value2\t")][..]));
    assert_eq!(entries[7].as_array(), Some(&[json!("value13"), Value::Null][..]));
}

#[tokio::test]
async fn test_handle_quotes() {
    let file = fixture();
    let csv = lenient_instance(&file);

    let quoted = collect(&csv, EntryConfig::default()).await.unwrap();
    assert_eq!(quoted[2].get("Column1"), Some(&json!("\"val\"ue5")));
    assert_eq!(quoted[2].get("Column2"), Some(&json!("val\"ue,6")));

    let raw = collect(
        &csv,
        EntryConfig {
            handle_quotes: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(raw[2].get("Column2"), Some(&json!("\"val\"\"ue")));
}

#[tokio::test]
async fn test_default_value_on_empty_column() {
    let file = fixture();
    let entries = collect(
        &lenient_instance(&file),
        EntryConfig {
            default_value_on_empty_column: Some(json!(1111)),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(entries[3].get("Column1"), Some(&json!(1111)));
    assert_eq!(entries[3].get("Column2"), Some(&json!(1111)));
    assert_eq!(entries[4].get("Column1"), Some(&json!(1111)));
}

#[tokio::test]
async fn test_default_value_on_missing_column() {
    let file = fixture();
    let csv = lenient_instance(&file);

    let entries = collect(
        &csv,
        EntryConfig {
            default_value_on_missing_column: Some(json!(1111)),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(entries[4].get("Column2"), Some(&json!(1111)));

    let entries = collect(&csv, EntryConfig::default()).await.unwrap();
    assert_eq!(entries[4].get("Column1"), Some(&json!("")));
    assert_eq!(entries[4].get("Column2"), Some(&Value::Null));
}

#[tokio::test]
async fn test_explicit_column_names() {
    let file = fixture();
    let names = ColumnNames::Explicit(vec!["myColumn1".into(), "myColumn2".into()]);
    let csv = lenient_instance(&file);

    let entries = collect(
        &csv,
        EntryConfig {
            column_names: Some(names.clone()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(entries.len(), TEST_DATA_RECORDS + 1);
    assert_eq!(entries[0].get("Column1"), None);
    assert_eq!(entries[0].get("myColumn1"), Some(&json!("Column1")));
    assert_eq!(entries[0].get("myColumn2"), Some(&json!("Column2")));

    let entries = collect(
        &csv,
        EntryConfig {
            column_names: Some(names),
            skip_first_line: Some(true),
            trim_columns: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(entries.len(), TEST_DATA_RECORDS);
    assert_eq!(
        entries[0].clone().into_value(),
        json!({"myColumn1": "value1", "myColumn2": "value2"})
    );
}

#[tokio::test]
async fn test_skip_empty_lines() {
    let file = fixture();
    let entries = collect(
        &lenient_instance(&file),
        EntryConfig {
            skip_empty_lines: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(entries.len(), TEST_DATA_RECORDS - 1);
    assert_eq!(entries[4].get("Column1"), Some(&json!("value8")));
}

#[tokio::test]
async fn test_missing_filename_fails_before_reading() {
    let called = Arc::new(Mutex::new(false));
    let flag = called.clone();

    let err = CsvEach::default()
        .each_entry(EntryConfig::default(), move |_| {
            *flag.lock().unwrap() = true;
            async { Ok::<(), CsvEachError>(()) }
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "missing option: filename");
    assert!(!*called.lock().unwrap());
}

#[tokio::test]
async fn test_absent_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = each_entry(dir.path().join("nope.csv"), EntryConfig::default(), |_| async {
        Ok::<(), CsvEachError>(())
    })
    .await
    .unwrap_err();

    assert!(matches!(err, CsvEachError::FileNotFound(_)));
}

#[tokio::test]
async fn test_step_error_passes_through_untouched() {
    #[derive(Debug, thiserror::Error)]
    #[error("quota exceeded after {0} rows")]
    struct Quota(usize);

    let file = fixture();
    let count = Arc::new(Mutex::new(0usize));
    let counter = count.clone();

    let err = lenient_instance(&file)
        .each_entry(EntryConfig::default(), move |_| {
            let counter = counter.clone();
            async move {
                let mut n = counter.lock().unwrap();
                *n += 1;
                if *n == 3 {
                    Err(Quota(*n))
                } else {
                    Ok(())
                }
            }
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "quota exceeded after 3 rows");
    let inner = err.into_step_error().unwrap();
    assert!(inner.downcast_ref::<Quota>().is_some());
    assert_eq!(*count.lock().unwrap(), 3);
}

#[tokio::test]
async fn test_sequential_steps_over_a_large_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "id,payload").unwrap();
    for id in 0..500 {
        writeln!(file, "{},\"row {}, quoted\"", id, id).unwrap();
    }

    let in_flight = Arc::new(Mutex::new(false));
    let order = Arc::new(Mutex::new(Vec::new()));
    let (busy, log) = (in_flight.clone(), order.clone());

    CsvEach::default()
        .with_read_ahead(4)
        .each_entry(
            EntryConfig::default().with_filename(file.path()),
            move |entry| {
                let (busy, log) = (busy.clone(), log.clone());
                async move {
                    assert!(!std::mem::replace(&mut *busy.lock().unwrap(), true));
                    tokio::task::yield_now().await;
                    let id = entry.get("id").and_then(Value::as_str).unwrap();
                    let id: usize = id.parse().unwrap();
                    log.lock().unwrap().push(id);
                    *busy.lock().unwrap() = false;
                    Ok::<(), CsvEachError>(())
                }
            },
        )
        .await
        .unwrap();

    assert_eq!(*order.lock().unwrap(), (0..500).collect::<Vec<_>>());
}
