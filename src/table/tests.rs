//! Tests for linked tables and the table factory

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use tempfile::TempDir;

    use crate::config::EngineConfig;
    use crate::driver::{
        DriverError, DriverFactory, DriverResult, FileDriver, MemoryDriver, MemoryDriverFactory,
    };
    use crate::index::{Cursor, IndexError, IndexKind, ProgressListener};
    use crate::record::{Column, DataType, FormatOptions, Row, RowKey, SchemaDescriptor, Value};
    use crate::table::{IndexMode, IndexRequest, TableAdapter, TableError, TableFactory};

    fn two_fields(rows: u64) -> MemoryDriver {
        let columns = vec![
            Column::new("NAME", DataType::Varchar),
            Column::new("SCORE", DataType::Int).not_null(),
        ];
        let data = (1..=rows)
            .map(|i| vec![Value::from(format!("row{i}")), Value::BigInt((i % 3) as i64)])
            .collect();
        MemoryDriver::new(columns, data).unwrap()
    }

    /// Write a placeholder file and serve `driver` for it
    fn link(dir: &TempDir, file: &str, factory: &MemoryDriverFactory, driver: MemoryDriver) -> PathBuf {
        let path = dir.path().join(file);
        fs::write(&path, b"linked").unwrap();
        factory.register(&path, driver);
        path
    }

    fn descriptor(name: &str, path: &Path) -> SchemaDescriptor {
        SchemaDescriptor::new(name, FormatOptions::from_path(path))
    }

    fn scan_keys(table: &dyn TableAdapter) -> Vec<RowKey> {
        let mut cursor = table.scan_index().unwrap().find(None, None).unwrap();
        let mut keys = Vec::new();
        while cursor.next() {
            keys.push(cursor.key().unwrap());
        }
        keys
    }

    fn index_keys(cursor: &mut dyn Cursor) -> Vec<RowKey> {
        let mut keys = Vec::new();
        while cursor.next() {
            keys.push(cursor.key().unwrap());
        }
        keys
    }

    #[derive(Default)]
    struct Batches {
        sizes: Vec<usize>,
        last: Option<(u64, u64)>,
    }

    impl ProgressListener for Batches {
        fn on_progress(&mut self, _index: &str, processed: u64, total: u64) {
            self.last = Some((processed, total));
        }

        fn on_batch(&mut self, _index: &str, rows: usize) {
            self.sizes.push(rows);
        }
    }

    /// Counts close calls and can report one row too many once read
    struct FaultyDriver {
        inner: MemoryDriver,
        closes: Arc<AtomicUsize>,
        overcount: bool,
        reading: AtomicBool,
    }

    impl FileDriver for FaultyDriver {
        fn row_count(&self) -> u64 {
            let count = self.inner.row_count();
            if self.overcount && !self.reading.load(Ordering::SeqCst) {
                count + 1
            } else {
                count
            }
        }

        fn field_count(&self) -> u32 {
            self.inner.field_count()
        }

        fn estimated_row_size(&self, row_id: u64) -> u32 {
            self.inner.estimated_row_size(row_id)
        }

        fn get_field(&self, row_id: u64, column_id: u32) -> DriverResult<Value> {
            self.reading.store(true, Ordering::SeqCst);
            self.inner.get_field(row_id, column_id)
        }

        fn insert_row(&mut self, values: &[Value]) -> DriverResult<()> {
            self.inner.insert_row(values)
        }

        fn close(&mut self) -> DriverResult<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FaultyFactory {
        rows: u64,
        closes: Arc<AtomicUsize>,
        overcount: bool,
        broken_header: bool,
        vanished: bool,
    }

    impl FaultyFactory {
        fn new(rows: u64) -> Self {
            Self {
                rows,
                closes: Arc::new(AtomicUsize::new(0)),
                overcount: false,
                broken_header: false,
                vanished: false,
            }
        }
    }

    impl DriverFactory for FaultyFactory {
        type Driver = FaultyDriver;

        fn open(&self, _path: &Path, _options: &FormatOptions) -> DriverResult<FaultyDriver> {
            if self.vanished {
                return Err(DriverError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    "no such file",
                )));
            }
            Ok(FaultyDriver {
                inner: two_fields(self.rows),
                closes: self.closes.clone(),
                overcount: self.overcount,
                reading: AtomicBool::new(false),
            })
        }

        fn describe(&self, driver: &FaultyDriver) -> DriverResult<Vec<Column>> {
            if self.broken_header {
                return Err(DriverError::StructuralParse("bad header length".to_string()));
            }
            Ok(driver.inner.columns().to_vec())
        }
    }

    fn stub_file(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("stub.shp");
        fs::write(&path, b"stub").unwrap();
        path
    }

    #[test]
    fn test_three_row_example() {
        let dir = TempDir::new().unwrap();
        let drivers = MemoryDriverFactory::new();
        let path = link(&dir, "three.dbf", &drivers, two_fields(3));
        let factory = TableFactory::new(drivers, EngineConfig::default());

        let table = factory.create_table(&descriptor("THREE", &path)).unwrap();

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.row_count_approximation(), 3);
        assert_eq!(table.indexes().len(), 2);
        assert_eq!(table.scan_index().unwrap().name(), "THREE_ROWID_");
        assert_eq!(table.unique_index().unwrap().name(), "THREE.PK_INDEX_");
        assert_eq!(table.unique_index().unwrap().kind(), IndexKind::PrimaryKey);

        let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["PK", "NAME", "SCORE"]);
        assert!(!table.columns()[0].nullable);
        assert!(table.columns()[0].primary_key);

        assert_eq!(scan_keys(table.as_ref()), vec![1, 2, 3]);
        for key in 1..=3u64 {
            let row = table.get_row(key).unwrap();
            assert_eq!(row.key(), key);
            assert_eq!(row.len(), 3);
            assert_eq!(row.get(0), Some(&Value::BigInt(key as i64)));
            assert_eq!(row.get(1), Some(&Value::from(format!("row{key}"))));
        }
    }

    #[test]
    fn test_key_column_name_is_unique() {
        let dir = TempDir::new().unwrap();
        let drivers = MemoryDriverFactory::new();
        let driver = MemoryDriver::new(
            vec![
                Column::new("pk", DataType::Varchar),
                Column::new("Pk2", DataType::Int),
            ],
            vec![vec![Value::from("a"), Value::Int(1)]],
        )
        .unwrap();
        let path = link(&dir, "clash.dbf", &drivers, driver);
        let factory = TableFactory::new(drivers, EngineConfig::default());

        let table = factory.create_table(&descriptor("CLASH", &path)).unwrap();
        assert_eq!(table.columns()[0].name, "PK3");
        assert_eq!(table.unique_index().unwrap().name(), "CLASH.PK3_INDEX_");
    }

    #[test]
    fn test_missing_file_degrades_to_empty_table() {
        let dir = TempDir::new().unwrap();
        let factory = TableFactory::new(MemoryDriverFactory::new(), EngineConfig::default());
        let path = dir.path().join("gone.shp");

        let mut table = factory.create_table(&descriptor("GONE", &path)).unwrap();

        assert!(table.is_fallback());
        assert_eq!(table.row_count(), 0);
        assert!(table.indexes().is_empty());
        assert!(table.scan_index().is_none());
        assert!(table.get_row(1).is_err());

        let request = IndexRequest::new("IDX", &["NAME"], IndexKind::Secondary { unique: false });
        assert!(table.add_index(&request, None).unwrap().is_none());
        assert!(table.add_row(&Row::new(1, vec![])).is_ok());
        assert!(table.truncate().is_ok());
        table.close();
        table.close();
        assert_eq!(table.row_count(), 0);

        // The file showing up makes the stand-in stale
        assert!(!table.is_stale());
        fs::write(&path, b"back").unwrap();
        assert!(table.is_stale());
    }

    #[test]
    fn test_file_deleted_before_open() {
        let dir = TempDir::new().unwrap();
        let drivers = MemoryDriverFactory::new();
        let path = link(&dir, "deleted.shp", &drivers, two_fields(4));
        fs::remove_file(&path).unwrap();
        let factory = TableFactory::new(drivers, EngineConfig::default());

        let table = factory.create_table(&descriptor("DELETED", &path)).unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.indexes().len(), 0);
    }

    #[test]
    fn test_missing_location_is_fatal() {
        let factory = TableFactory::new(MemoryDriverFactory::new(), EngineConfig::default());
        let descriptor = SchemaDescriptor::new("NOWHERE", FormatOptions::default());

        assert!(matches!(
            factory.create_table(&descriptor),
            Err(TableError::MissingLocation(ref name)) if name == "NOWHERE"
        ));
    }

    #[test]
    fn test_structural_parse_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = stub_file(&dir);
        let mut drivers = FaultyFactory::new(3);
        drivers.broken_header = true;
        let closes = drivers.closes.clone();
        let factory = TableFactory::new(drivers, EngineConfig::default());

        let result = factory.create_table(&descriptor("BROKEN", &path));
        assert!(matches!(result, Err(TableError::StructuralParse { .. })));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_file_removed_while_opening_degrades() {
        let dir = TempDir::new().unwrap();
        let path = stub_file(&dir);
        let mut drivers = FaultyFactory::new(3);
        drivers.vanished = true;
        let factory = TableFactory::new(drivers, EngineConfig::default());

        let table = factory.create_table(&descriptor("RACE", &path)).unwrap();
        assert!(table.is_fallback());
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_remote_uri_location_is_fatal() {
        let factory = TableFactory::new(MemoryDriverFactory::new(), EngineConfig::default());
        let options = FormatOptions::new(vec!["file://fileserver/share/roads.shp".to_string()]);

        assert!(matches!(
            factory.create_table(&SchemaDescriptor::new("REMOTE", options)),
            Err(TableError::InvalidLocation { ref table, .. }) if table == "REMOTE"
        ));
    }

    #[test]
    fn test_uri_location() {
        let dir = TempDir::new().unwrap();
        let drivers = MemoryDriverFactory::new();
        let path = link(&dir, "uri.dbf", &drivers, two_fields(2));
        let factory = TableFactory::new(drivers, EngineConfig::default());

        let url = url::Url::from_file_path(&path).unwrap();
        let options = FormatOptions::new(vec![format!("{url}#layer")]);
        let table = factory
            .create_table(&SchemaDescriptor::new("URI", options))
            .unwrap();
        assert!(!table.is_fallback());
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_dml_is_rejected() {
        let dir = TempDir::new().unwrap();
        let drivers = MemoryDriverFactory::new();
        let path = link(&dir, "ro.dbf", &drivers, two_fields(3));
        let factory = TableFactory::new(drivers, EngineConfig::default());
        let mut table = factory.create_table(&descriptor("RO", &path)).unwrap();
        let row = Row::new(4, vec![Value::BigInt(4), Value::from("x"), Value::Int(0)]);

        assert!(matches!(
            table.add_row(&row),
            Err(TableError::UnsupportedWrite { operation: "add row", .. })
        ));
        assert!(matches!(
            table.remove_row(&row),
            Err(TableError::UnsupportedWrite { operation: "remove row", .. })
        ));
        assert!(matches!(
            table.truncate(),
            Err(TableError::UnsupportedWrite { operation: "truncate", .. })
        ));
        assert!(table.check_support_alter().is_err());

        assert_eq!(table.row_count(), 3);
        assert_eq!(fs::read(&path).unwrap(), b"linked");
        assert!(!table.is_stale());
    }

    #[test]
    fn test_close_twice_closes_driver_once() {
        let dir = TempDir::new().unwrap();
        let path = stub_file(&dir);
        let drivers = FaultyFactory::new(3);
        let closes = drivers.closes.clone();
        let factory = TableFactory::new(drivers, EngineConfig::default());

        let mut table = factory.create_table(&descriptor("STUB", &path)).unwrap();
        table.close();
        table.close();
        assert_eq!(closes.load(Ordering::SeqCst), 1);
        assert_eq!(table.row_count(), 0);

        drop(table);
        assert_eq!(closes.load(Ordering::SeqCst), 1);

        let table = factory.create_table(&descriptor("STUB", &path)).unwrap();
        drop(table);
        assert_eq!(closes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_add_secondary_index() {
        let dir = TempDir::new().unwrap();
        let drivers = MemoryDriverFactory::new();
        let path = link(&dir, "idx.dbf", &drivers, two_fields(10));
        let factory = TableFactory::new(drivers, EngineConfig::default().with_btree_order(4));
        let mut table = factory.create_table(&descriptor("IDX", &path)).unwrap();
        let before = table.modification_id();

        let request = IndexRequest::new("IDX_SCORE", &["score"], IndexKind::Secondary { unique: false });
        let index = table.add_index(&request, None).unwrap().unwrap();
        assert_eq!(index.name(), "IDX_SCORE");
        assert_eq!(index.columns(), &[2]);
        assert_eq!(index.row_count(), 10);

        let mut cursor = index.find(None, None).unwrap();
        let keys = index_keys(cursor.as_mut());
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, scan_keys(table.as_ref()));

        let scores: Vec<Value> = keys
            .iter()
            .map(|&k| table.get_row(k).unwrap().get(2).cloned().unwrap())
            .collect();
        assert!(scores.windows(2).all(|w| w[0].total_cmp(&w[1]).is_le()));

        assert_eq!(table.indexes().len(), 3);
        assert_eq!(table.modification_id(), before + 1);
    }

    #[test]
    fn test_index_create_and_attach_modes() {
        let dir = TempDir::new().unwrap();
        let drivers = MemoryDriverFactory::new();
        let path = link(&dir, "modes.dbf", &drivers, two_fields(5));
        let factory = TableFactory::new(drivers, EngineConfig::default());
        let mut table = factory.create_table(&descriptor("MODES", &path)).unwrap();

        let request = IndexRequest::new("BY_NAME", &["NAME"], IndexKind::Secondary { unique: false });
        table.add_index(&request, None).unwrap();
        let id = table.modification_id();

        assert!(matches!(
            table.add_index(&request, None),
            Err(TableError::IndexExists(_))
        ));

        let attach = request.clone().with_mode(IndexMode::Attach);
        let existing = table.add_index(&attach, None).unwrap().unwrap();
        assert_eq!(existing.name(), "BY_NAME");
        assert_eq!(table.indexes().len(), 3);
        assert_eq!(table.modification_id(), id);

        // Built-in indexes attach too
        let pk = IndexRequest::new("modes.pk_index_", &["PK"], IndexKind::PrimaryKey)
            .with_mode(IndexMode::Attach);
        assert_eq!(
            table.add_index(&pk, None).unwrap().unwrap().kind(),
            IndexKind::PrimaryKey
        );
    }

    #[test]
    fn test_index_request_validation() {
        let dir = TempDir::new().unwrap();
        let drivers = MemoryDriverFactory::new();
        let path = link(&dir, "valid.dbf", &drivers, two_fields(5));
        let factory = TableFactory::new(drivers, EngineConfig::default());
        let mut table = factory.create_table(&descriptor("VALID", &path)).unwrap();

        let unique_nullable = IndexRequest::new("U", &["NAME"], IndexKind::Secondary { unique: true });
        assert!(matches!(
            table.add_index(&unique_nullable, None),
            Err(TableError::NullableKeyColumn(ref c)) if c == "NAME"
        ));

        let second_pk = IndexRequest::new("PK2", &["SCORE"], IndexKind::PrimaryKey);
        assert!(matches!(
            table.add_index(&second_pk, None),
            Err(TableError::PrimaryKeyExists(_))
        ));

        let unknown = IndexRequest::new("X", &["NOPE"], IndexKind::Secondary { unique: false });
        assert!(matches!(
            table.add_index(&unknown, None),
            Err(TableError::ColumnNotFound(ref c)) if c == "NOPE"
        ));

        let empty = IndexRequest::new("E", &[], IndexKind::Secondary { unique: false });
        assert!(matches!(
            table.add_index(&empty, None),
            Err(TableError::EmptyIndex(_))
        ));

        let scan = IndexRequest::new("S", &["NAME"], IndexKind::Scan);
        assert!(matches!(
            table.add_index(&scan, None),
            Err(TableError::InvalidIndexKind(IndexKind::Scan))
        ));

        // SCORE is declared NOT NULL, but scores repeat
        let unique_score = IndexRequest::new("U2", &["SCORE"], IndexKind::Secondary { unique: true });
        assert!(matches!(
            table.add_index(&unique_score, None),
            Err(TableError::Index(IndexError::DuplicateKey { .. }))
        ));

        assert_eq!(table.indexes().len(), 2);
        assert_eq!(table.modification_id(), 0);
    }

    #[test]
    fn test_large_rebuild_in_bounded_batches() {
        let dir = TempDir::new().unwrap();
        let drivers = MemoryDriverFactory::new();
        let path = link(&dir, "large.dbf", &drivers, two_fields(10_000));
        let config = EngineConfig::default().with_max_memory_rows(1_000);
        let factory = TableFactory::new(drivers, config);
        let mut table = factory.create_table(&descriptor("LARGE", &path)).unwrap();

        let mut batches = Batches::default();
        let request = IndexRequest::new("LARGE_SCORE", &["SCORE"], IndexKind::Secondary { unique: false });
        let index = table
            .add_index(&request, Some(&mut batches))
            .unwrap()
            .unwrap();

        assert_eq!(index.row_count(), 10_000);
        assert_eq!(batches.sizes.len(), 10);
        assert!(batches.sizes.iter().all(|&size| size <= 1_000));
        assert_eq!(batches.sizes.iter().sum::<usize>(), 10_000);
        assert_eq!(batches.last, Some((10_000, 10_000)));
    }

    #[test]
    fn test_rebuild_consistency_failure_leaves_table_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = stub_file(&dir);
        let mut drivers = FaultyFactory::new(6);
        drivers.overcount = true;
        let factory = TableFactory::new(drivers, EngineConfig::default());
        let mut table = factory.create_table(&descriptor("SHRINK", &path)).unwrap();

        let request = IndexRequest::new("SHRINK_NAME", &["NAME"], IndexKind::Secondary { unique: false });
        let result = table.add_index(&request, None);
        assert!(matches!(
            result,
            Err(TableError::Index(IndexError::RebuildConsistency { remaining: 1, .. }))
        ));

        assert_eq!(table.indexes().len(), 2);
        assert_eq!(table.modification_id(), 0);
        assert!(table.indexes().iter().all(|i| i.name() != "SHRINK_NAME"));
    }

    #[test]
    fn test_index_on_empty_file_skips_rebuild() {
        let dir = TempDir::new().unwrap();
        let drivers = MemoryDriverFactory::new();
        let path = link(&dir, "empty.dbf", &drivers, two_fields(0));
        let factory = TableFactory::new(drivers, EngineConfig::default());
        let mut table = factory.create_table(&descriptor("EMPTY", &path)).unwrap();

        let mut batches = Batches::default();
        let request = IndexRequest::new("E_NAME", &["NAME"], IndexKind::Secondary { unique: false });
        let index = table
            .add_index(&request, Some(&mut batches))
            .unwrap()
            .unwrap();
        assert_eq!(index.row_count(), 0);
        assert!(batches.sizes.is_empty());
        assert!(batches.last.is_none());
    }

    #[test]
    fn test_drop_index() {
        let dir = TempDir::new().unwrap();
        let drivers = MemoryDriverFactory::new();
        let path = link(&dir, "drop.dbf", &drivers, two_fields(3));
        let factory = TableFactory::new(drivers, EngineConfig::default());
        let mut table = factory.create_table(&descriptor("DROP", &path)).unwrap();

        let request = IndexRequest::new("D_NAME", &["NAME"], IndexKind::Secondary { unique: false });
        table.add_index(&request, None).unwrap();
        table.drop_index("d_name").unwrap();
        assert_eq!(table.indexes().len(), 2);
        assert_eq!(table.modification_id(), 2);

        assert!(matches!(
            table.drop_index("DROP_ROWID_"),
            Err(TableError::BuiltInIndex(_))
        ));
        assert!(matches!(
            table.drop_index("D_NAME"),
            Err(TableError::IndexNotFound(_))
        ));
    }

    #[test]
    fn test_explicit_columns() {
        let dir = TempDir::new().unwrap();
        let drivers = MemoryDriverFactory::new();
        let path = link(&dir, "explicit.dbf", &drivers, two_fields(4));
        let factory = TableFactory::new(drivers, EngineConfig::default());

        // Key column plus the two fields, with SCORE read as DOUBLE
        let keyed = descriptor("KEYED", &path).with_columns(vec![
            Column::row_key("ID"),
            Column::new("LABEL", DataType::Varchar),
            Column::new("SCORE", DataType::Double),
        ]);
        let table = factory.create_table(&keyed).unwrap();
        assert_eq!(table.indexes().len(), 2);
        assert_eq!(table.unique_index().unwrap().name(), "KEYED.ID_INDEX_");
        let row = table.get_row(2).unwrap();
        assert_eq!(row.get(0), Some(&Value::BigInt(2)));
        assert_eq!(row.get(2), Some(&Value::Double(2.0)));

        // No key column: scan index only, fields map in order
        let plain = descriptor("PLAIN", &path)
            .with_columns(vec![Column::new("LABEL", DataType::Varchar)]);
        let mut table = factory.create_table(&plain).unwrap();
        assert_eq!(table.indexes().len(), 1);
        assert!(table.unique_index().is_none());
        assert_eq!(table.get_row(1).unwrap().values(), &[Value::from("row1")]);

        // Without a built-in key, a primary key request builds an index
        let mut names = table.columns().to_vec();
        names[0].nullable = false;
        let strict = descriptor("STRICT", &path).with_columns(names);
        drop(table);
        table = factory.create_table(&strict).unwrap();
        let pk = IndexRequest::new("STRICT_PK", &["LABEL"], IndexKind::PrimaryKey);
        let index = table.add_index(&pk, None).unwrap().unwrap();
        assert!(index.needs_rebuild());
        assert!(table.columns()[0].primary_key);
        assert_eq!(table.unique_index().unwrap().name(), "STRICT_PK");

        // Declaring more fields than the file has is a structural error
        let too_wide = descriptor("WIDE", &path).with_columns(vec![
            Column::new("A", DataType::Varchar),
            Column::new("B", DataType::Int),
            Column::new("C", DataType::Int),
        ]);
        assert!(matches!(
            factory.create_table(&too_wide),
            Err(TableError::StructuralParse { .. })
        ));
    }

    #[test]
    fn test_coercion_error_on_read() {
        let dir = TempDir::new().unwrap();
        let drivers = MemoryDriverFactory::new();
        let path = link(&dir, "typed.dbf", &drivers, two_fields(2));
        let factory = TableFactory::new(drivers, EngineConfig::default());

        let typed = descriptor("TYPED", &path).with_columns(vec![
            Column::row_key("PK"),
            Column::new("NAME", DataType::Date),
            Column::new("SCORE", DataType::Int),
        ]);
        let table = factory.create_table(&typed).unwrap();

        assert!(matches!(
            table.get_row(1),
            Err(TableError::Index(IndexError::TypeCoercion { ref column, .. })) if column == "NAME"
        ));
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_stale_after_rewrite() {
        let dir = TempDir::new().unwrap();
        let drivers = MemoryDriverFactory::new();
        let path = link(&dir, "stale.dbf", &drivers, two_fields(2));
        let factory = TableFactory::new(drivers, EngineConfig::default());
        let table = factory.create_table(&descriptor("STALE", &path)).unwrap();

        assert!(!table.is_stale());
        fs::write(&path, b"rewritten with more rows").unwrap();
        assert!(table.is_stale());
        fs::remove_file(&path).unwrap();
        assert!(table.is_stale());
    }

    #[test]
    fn test_concurrent_readers() {
        let dir = TempDir::new().unwrap();
        let drivers = MemoryDriverFactory::new();
        let path = link(&dir, "shared.dbf", &drivers, two_fields(200));
        let factory = TableFactory::new(drivers, EngineConfig::default());
        let table = factory.create_table(&descriptor("SHARED", &path)).unwrap();
        let table = table.as_ref();

        std::thread::scope(|scope| {
            let readers: Vec<_> = (0..4)
                .map(|_| scope.spawn(move || scan_keys(table)))
                .collect();
            for reader in readers {
                assert_eq!(reader.join().unwrap(), (1..=200).collect::<Vec<_>>());
            }
        });
    }
}
