use quarry_core::{
    Catalog, CatalogIr, Column, CommandKind, DriverKind, Error, Options, Override, OverrideType,
    Parameter, Query, RuntimeFlavor, SchemaIr, Table, TableRef,
};
use quarry_gen::driver::{new_driver, Driver};
use quarry_gen::Generator;

use pretty_assertions::assert_eq;

fn driver_with(options: Options) -> Box<dyn Driver> {
    new_driver(options, Catalog::from_ir(&CatalogIr::default()))
}

fn driver(kind: DriverKind) -> Box<dyn Driver> {
    driver_with(Options {
        driver: kind,
        ..Options::default()
    })
}

fn column(name: &str, ty: &str, not_null: bool) -> Column {
    Column {
        name: name.to_string(),
        ty: ty.to_string(),
        not_null,
        ..Column::default()
    }
}

fn one_query(name: &str, columns: Vec<Column>) -> Query {
    Query {
        name: name.to_string(),
        cmd: CommandKind::One,
        text: "SELECT 1".to_string(),
        columns,
        params: vec![],
        insert_into_table: None,
    }
}

#[test]
fn mysql_tinyint_length_tie_break() {
    let driver = driver(DriverKind::Mysql);

    let flag = Column {
        length: 1,
        ..column("flag", "tinyint", true)
    };
    assert_eq!(driver.host_type(&flag, None).unwrap(), "bool");

    let small = Column {
        length: 4,
        ..column("small", "tinyint", true)
    };
    assert_eq!(driver.host_type(&small, None).unwrap(), "i8");
}

#[test]
fn source_type_match_is_case_insensitive() {
    let driver = driver(DriverKind::Postgres);
    assert_eq!(
        driver.host_type(&column("id", "BIGINT", true), None).unwrap(),
        "i64"
    );
}

#[test]
fn unsupported_type_is_fatal_and_names_the_driver() {
    let driver = driver(DriverKind::Mysql);
    let err = driver
        .host_type(&column("location", "geometry", true), None)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedType { .. }));
    let message = err.to_string();
    assert!(message.contains("location"));
    assert!(message.contains("geometry"));
    assert!(message.contains("mysql"));
}

#[test]
fn empty_source_type_falls_back_to_the_dynamic_value() {
    let driver = driver(DriverKind::Postgres);
    assert_eq!(
        driver.host_type(&column("anything", "", false), None).unwrap(),
        "serde_json::Value"
    );
}

#[test]
fn override_beats_the_mapping_table() {
    let driver = driver_with(Options {
        driver: DriverKind::Postgres,
        overrides: vec![Override {
            column: "GetAuthor:id".to_string(),
            rust_type: OverrideType {
                ty: "Uuid".to_string(),
                not_null: true,
            },
        }],
        ..Options::default()
    });

    let query = one_query("GetAuthor", vec![]);
    let id = column("id", "bigint", false);
    assert_eq!(driver.rust_type(&id, Some(&query)).unwrap(), "Uuid");

    // A different query keeps the general mapping (and its nullability).
    let other = one_query("ListAuthors", vec![]);
    assert_eq!(driver.rust_type(&id, Some(&other)).unwrap(), "Option<i64>");
}

#[test]
fn wildcard_override_applies_to_every_query() {
    let driver = driver_with(Options {
        driver: DriverKind::Postgres,
        overrides: vec![Override {
            column: "*:metadata".to_string(),
            rust_type: OverrideType {
                ty: "serde_json::Value".to_string(),
                not_null: false,
            },
        }],
        ..Options::default()
    });

    let query = one_query("Anything", vec![]);
    let metadata = column("metadata", "text", true);
    // The override's nullability replaces the column's own flag.
    assert_eq!(
        driver.rust_type(&metadata, Some(&query)).unwrap(),
        "Option<serde_json::Value>"
    );
}

#[test]
fn value_like_types_are_nullable_under_both_runtimes() {
    for runtime in [RuntimeFlavor::Modern, RuntimeFlavor::Legacy] {
        let driver = driver_with(Options {
            driver: DriverKind::Postgres,
            runtime,
            ..Options::default()
        });
        assert_eq!(
            driver.rust_type(&column("flag", "bool", false), None).unwrap(),
            "Option<bool>"
        );
    }
}

#[test]
fn non_primitive_nullability_depends_on_the_runtime_flavor() {
    let modern = driver(DriverKind::Postgres);
    assert_eq!(
        modern.rust_type(&column("bio", "text", false), None).unwrap(),
        "Option<String>"
    );

    let legacy = driver_with(Options {
        driver: DriverKind::Postgres,
        runtime: RuntimeFlavor::Legacy,
        ..Options::default()
    });
    assert_eq!(
        legacy.rust_type(&column("bio", "text", false), None).unwrap(),
        "String"
    );
}

#[test]
fn not_null_columns_never_get_the_option_wrapper() {
    let driver = driver(DriverKind::Postgres);
    assert_eq!(
        driver.rust_type(&column("id", "bigint", true), None).unwrap(),
        "i64"
    );
}

#[test]
fn postgres_arrays_wrap_in_vec() {
    let driver = driver(DriverKind::Postgres);
    let tags = Column {
        is_array: true,
        ..column("tags", "text", true)
    };
    assert_eq!(driver.host_type(&tags, None).unwrap(), "Vec<String>");

    // A nullable array wraps the whole vector under the modern runtime.
    let maybe_tags = Column {
        is_array: true,
        ..column("tags", "text", false)
    };
    assert_eq!(
        driver.rust_type(&maybe_tags, None).unwrap(),
        "Option<Vec<String>>"
    );
}

#[test]
fn array_without_array_reader_is_fatal() {
    let driver = driver(DriverKind::Postgres);
    let payloads = Column {
        is_array: true,
        ..column("payloads", "jsonb", true)
    };
    let err = driver.column_reader(&payloads, 0, None).unwrap_err();
    assert!(matches!(err, Error::MissingArrayReader { .. }));
    assert!(err.to_string().contains("postgresql"));
}

#[test]
fn missing_convert_func_aborts_exec_last_id_generation() {
    let catalog = CatalogIr {
        default_schema: String::new(),
        schemas: vec![SchemaIr {
            name: String::new(),
            tables: vec![Table {
                rel: TableRef {
                    schema: String::new(),
                    name: "documents".to_string(),
                },
                columns: vec![column("id", "uuid", true)],
            }],
        }],
    };
    let query = Query {
        name: "CreateDocument".to_string(),
        cmd: CommandKind::ExecLastId,
        text: "INSERT INTO documents (id) VALUES (?)".to_string(),
        columns: vec![],
        params: vec![Parameter {
            number: 1,
            column: column("id", "uuid", true),
        }],
        insert_into_table: Some(TableRef {
            schema: String::new(),
            name: "documents".to_string(),
        }),
    };

    let options = Options {
        driver: DriverKind::Sqlite,
        ..Options::default()
    };
    let generator = Generator::new(options, &catalog, vec![query]).unwrap();
    let err = generator.generate().unwrap_err();
    assert!(matches!(err, Error::MissingConvertFunc { .. }));
    assert_eq!(
        err.to_string(),
        "no conversion function registered for id column type Uuid in sqlite driver"
    );
}

#[test]
fn id_inference_prefers_exact_match_over_contains() {
    let catalog = CatalogIr {
        default_schema: "public".to_string(),
        schemas: vec![SchemaIr {
            name: "public".to_string(),
            tables: vec![Table {
                rel: TableRef {
                    schema: "public".to_string(),
                    name: "authors".to_string(),
                },
                columns: vec![
                    column("uuid", "uuid", true),
                    column("id", "bigint", true),
                    column("name", "text", true),
                ],
            }],
        }],
    };
    let driver = new_driver(
        Options::default(),
        Catalog::from_ir(&catalog),
    );

    let query = Query {
        name: "CreateAuthor".to_string(),
        cmd: CommandKind::ExecLastId,
        text: String::new(),
        columns: vec![],
        params: vec![],
        insert_into_table: Some(TableRef {
            schema: String::new(),
            name: "authors".to_string(),
        }),
    };

    assert_eq!(driver.id_column(&query).unwrap().name, "id");
}

#[test]
fn id_inference_falls_back_to_contains_then_first_column() {
    let table = |columns: Vec<Column>| CatalogIr {
        default_schema: String::new(),
        schemas: vec![SchemaIr {
            name: String::new(),
            tables: vec![Table {
                rel: TableRef {
                    schema: String::new(),
                    name: "t".to_string(),
                },
                columns,
            }],
        }],
    };
    let query = Query {
        name: "Insert".to_string(),
        cmd: CommandKind::ExecLastId,
        text: String::new(),
        columns: vec![],
        params: vec![],
        insert_into_table: Some(TableRef {
            schema: String::new(),
            name: "t".to_string(),
        }),
    };

    let contains = new_driver(
        Options::default(),
        Catalog::from_ir(&table(vec![
            column("name", "text", true),
            column("user_identifier", "bigint", true),
        ])),
    );
    assert_eq!(contains.id_column(&query).unwrap().name, "user_identifier");

    let first = new_driver(
        Options::default(),
        Catalog::from_ir(&table(vec![
            column("name", "text", true),
            column("bio", "text", true),
        ])),
    );
    assert_eq!(first.id_column(&query).unwrap().name, "name");
}
