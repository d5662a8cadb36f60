use quarry_core::{
    CatalogIr, Column, CommandKind, DriverKind, Options, Parameter, Query, SchemaIr, Table,
    TableRef,
};
use quarry_gen::Generator;

use pretty_assertions::assert_eq;

fn column(name: &str, ty: &str, not_null: bool) -> Column {
    Column {
        name: name.to_string(),
        ty: ty.to_string(),
        not_null,
        ..Column::default()
    }
}

fn param(number: i32, name: &str, ty: &str, not_null: bool) -> Parameter {
    Parameter {
        number,
        column: column(name, ty, not_null),
    }
}

fn authors_catalog() -> CatalogIr {
    CatalogIr {
        default_schema: "public".to_string(),
        schemas: vec![SchemaIr {
            name: "public".to_string(),
            tables: vec![Table {
                rel: TableRef {
                    schema: "public".to_string(),
                    name: "authors".to_string(),
                },
                columns: vec![
                    column("id", "bigint", true),
                    column("name", "text", true),
                    column("bio", "text", false),
                ],
            }],
        }],
    }
}

fn get_author() -> Query {
    Query {
        name: "GetAuthor".to_string(),
        cmd: CommandKind::One,
        text: "SELECT id, name, bio FROM authors WHERE id = $1".to_string(),
        columns: vec![
            column("id", "bigint", true),
            column("name", "text", true),
            column("bio", "text", false),
        ],
        params: vec![param(1, "id", "bigint", true)],
        insert_into_table: None,
    }
}

fn create_author() -> Query {
    Query {
        name: "CreateAuthor".to_string(),
        cmd: CommandKind::ExecLastId,
        text: "INSERT INTO authors (name, bio) VALUES ($1, $2)".to_string(),
        columns: vec![],
        params: vec![
            param(1, "name", "text", true),
            param(2, "bio", "text", false),
        ],
        insert_into_table: Some(TableRef {
            schema: String::new(),
            name: "authors".to_string(),
        }),
    }
}

#[test]
fn postgres_run_produces_the_expected_fragments() {
    let options = Options::default();
    let generator = Generator::new(
        options,
        &authors_catalog(),
        vec![get_author(), create_author()],
    )
    .unwrap();
    let output = generator.generate().unwrap();

    assert_eq!(output.queries.len(), 2);

    let get = &output.queries[0];
    assert_eq!(
        get.constant.as_deref().unwrap(),
        "pub const GET_AUTHOR: &str = \"SELECT id, name, bio FROM authors WHERE id = $1\";"
    );
    let row = get.row_struct.as_deref().unwrap();
    assert!(row.contains("pub struct GetAuthorRow"));
    assert!(row.contains("pub id: i64,"));
    assert!(row.contains("pub bio: Option<String>,"));
    let method = &get.raw_method;
    assert!(method.contains("pub async fn get_author(&self, args: GetAuthorArgs)"));
    assert!(method.contains("if self.transaction.is_none()"));
    assert!(method.contains("let client = pool.get().await?;"));
    assert!(method.contains("client.prepare(GET_AUTHOR)"));
    assert!(method.contains("transaction.prepare(GET_AUTHOR)"));
    assert!(get.orm_method.is_none());

    let create = &output.queries[1];
    assert!(create
        .constant
        .as_deref()
        .unwrap()
        .ends_with("VALUES ($1, $2) RETURNING id\";"));
    assert!(create.raw_method.contains("-> Result<i64, Error>"));
    assert!(create.row_struct.is_none());

    assert!(output.scaffold.contains("pub struct Queries<'a>"));
    assert!(output.scaffold.contains("deadpool_postgres::Pool"));
    assert!(output.utils[0].contains("pub type Error"));

    assert!(output.package_references.contains_key("tokio-postgres"));
    assert!(output.package_references.contains_key("deadpool-postgres"));
    assert!(!output.package_references.contains_key("sqlx"));
    assert!(!output.package_references.contains_key("chrono"));
    assert!(!output.package_references.contains_key("serde_json"));
}

#[test]
fn orm_configuration_adds_the_helper_path_and_package() {
    let options = Options {
        use_orm: true,
        ..Options::default()
    };
    let generator = Generator::new(options, &authors_catalog(), vec![get_author()]).unwrap();
    let output = generator.generate().unwrap();

    let get = &output.queries[0];
    let orm = get.orm_method.as_deref().unwrap();
    assert!(orm.contains("sqlx::query_as::<_, GetAuthorRow>(GET_AUTHOR)"));
    assert!(orm.contains("q.bind(&args.id)") || orm.contains("q = q.bind(&args.id);"));
    assert!(orm.contains("fetch_optional(pool)"));

    // The raw path is still produced alongside.
    assert!(get.raw_method.contains("client.prepare(GET_AUTHOR)"));

    let row = get.row_struct.as_deref().unwrap();
    assert!(row.contains("sqlx::FromRow"));

    assert_eq!(
        output.package_references.get("sqlx").map(String::as_str),
        Some("0.7.4")
    );
    assert!(output.scaffold.contains("sqlx::PgPool"));
}

#[test]
fn orm_version_pin_overrides_the_default() {
    let options = Options {
        use_orm: true,
        orm_version: Some("0.8.2".to_string()),
        ..Options::default()
    };
    let generator = Generator::new(options, &authors_catalog(), vec![get_author()]).unwrap();
    let output = generator.generate().unwrap();
    assert_eq!(
        output.package_references.get("sqlx").map(String::as_str),
        Some("0.8.2")
    );
}

#[test]
fn mysql_orm_uses_the_params_object_not_sqlx() {
    let options = Options {
        driver: DriverKind::Mysql,
        use_orm: true,
        ..Options::default()
    };
    let query = Query {
        name: "CreateAuthor".to_string(),
        cmd: CommandKind::Exec,
        text: "INSERT INTO authors (name, bio) VALUES (?, ?)".to_string(),
        columns: vec![],
        params: vec![
            param(1, "name", "varchar", true),
            param(2, "bio", "text", false),
        ],
        insert_into_table: None,
    };

    let generator = Generator::new(options, &CatalogIr::default(), vec![query]).unwrap();
    let output = generator.generate().unwrap();

    let orm = output.queries[0].orm_method.as_deref().unwrap();
    assert!(orm.contains("mysql_async::params!"));
    assert!(!output.package_references.contains_key("sqlx"));
}

#[test]
fn slice_query_emits_the_runtime_expansion_helper() {
    let options = Options {
        driver: DriverKind::Sqlite,
        ..Options::default()
    };
    let mut query = Query {
        name: "ListAuthorsByIds".to_string(),
        cmd: CommandKind::Many,
        text: "SELECT id, name, bio FROM authors WHERE id IN (?)".to_string(),
        columns: vec![
            column("id", "integer", true),
            column("name", "text", true),
            column("bio", "text", false),
        ],
        params: vec![param(1, "ids", "integer", true)],
        insert_into_table: None,
    };
    query.params[0].column.is_slice = true;

    let generator = Generator::new(options, &authors_catalog(), vec![query]).unwrap();
    let output = generator.generate().unwrap();

    let method = &output.queries[0].raw_method;
    assert!(method.contains("let mut sql = LIST_AUTHORS_BY_IDS.to_string();"));
    assert!(method.contains("sql = expand_slice_placeholder(&sql, args.ids.len(), \"ids\");"));
    assert!(method.contains("for (i, v) in args.ids.iter().enumerate()"));
    assert!(method.contains("format!(\"@idsArg{i}\")"));

    let helper = output
        .utils
        .iter()
        .find(|util| util.contains("fn expand_slice_placeholder"))
        .unwrap();
    assert!(helper.contains("/*SLICE:{name}*/@{name}"));

    let args = output.queries[0].args_struct.as_deref().unwrap();
    assert!(args.contains("pub ids: Vec<i64>,"));
}

#[test]
fn embedded_tables_expand_into_model_structs() {
    let options = Options::default();
    let query = Query {
        name: "ListAuthors".to_string(),
        cmd: CommandKind::Many,
        text: "SELECT authors.* FROM authors".to_string(),
        columns: vec![Column {
            name: "author".to_string(),
            embed_table: Some(TableRef {
                schema: String::new(),
                name: "authors".to_string(),
            }),
            not_null: true,
            ..Column::default()
        }],
        params: vec![],
        insert_into_table: None,
    };

    let generator = Generator::new(options, &authors_catalog(), vec![query]).unwrap();
    let output = generator.generate().unwrap();

    assert_eq!(output.models.len(), 1);
    let model = &output.models[0];
    assert!(model.contains("pub struct Authors"));
    assert!(model.contains("pub id: i64,"));
    assert!(model.contains("pub bio: Option<String>,"));

    let method = &output.queries[0].raw_method;
    assert!(method.contains("author: Authors {"));
    assert!(method.contains("row.try_get(0)?"));
    assert!(method.contains("row.try_get(2)?"));
}

#[test]
fn mysql_copy_from_delegates_to_the_bulk_path() {
    let options = Options {
        driver: DriverKind::Mysql,
        ..Options::default()
    };
    let catalog = CatalogIr {
        default_schema: String::new(),
        schemas: vec![SchemaIr {
            name: String::new(),
            tables: vec![Table {
                rel: TableRef {
                    schema: String::new(),
                    name: "authors".to_string(),
                },
                columns: vec![column("name", "varchar", true), column("bio", "text", true)],
            }],
        }],
    };
    let query = Query {
        name: "CopyAuthors".to_string(),
        cmd: CommandKind::CopyFrom,
        text: "INSERT INTO authors (name, bio) VALUES (?, ?)".to_string(),
        columns: vec![],
        params: vec![
            param(1, "name", "varchar", true),
            param(2, "bio", "text", true),
        ],
        insert_into_table: Some(TableRef {
            schema: String::new(),
            name: "authors".to_string(),
        }),
    };

    let generator = Generator::new(options, &catalog, vec![query]).unwrap();
    let output = generator.generate().unwrap();

    let copy = &output.queries[0];
    assert!(copy.constant.is_none());
    assert!(copy
        .raw_method
        .contains("pub async fn copy_authors(&mut self, rows: Vec<CopyAuthorsArgs>)"));
    assert!(copy.raw_method.contains("exec_batch"));
    assert!(copy.raw_method.contains("INSERT INTO authors (name, bio) VALUES (:name, :bio)"));
    assert!(copy.orm_method.is_none());
}

#[test]
fn date_time_usage_gates_the_chrono_reference_and_imports() {
    let options = Options {
        driver: DriverKind::Mysql,
        ..Options::default()
    };
    let query = Query {
        name: "GetEvent".to_string(),
        cmd: CommandKind::One,
        text: "SELECT occurred_at FROM events WHERE id = ?".to_string(),
        columns: vec![column("occurred_at", "datetime", true)],
        params: vec![param(1, "id", "bigint", true)],
        insert_into_table: None,
    };

    let generator = Generator::new(options, &CatalogIr::default(), vec![query]).unwrap();
    let output = generator.generate().unwrap();

    assert!(output.package_references.contains_key("chrono"));
    assert!(output.uses.contains("chrono::NaiveDateTime"));
    assert!(output
        .queries[0]
        .row_struct
        .as_deref()
        .unwrap()
        .contains("pub occurred_at: NaiveDateTime,"));
}

#[test]
fn sqlite_methods_are_synchronous() {
    let options = Options {
        driver: DriverKind::Sqlite,
        ..Options::default()
    };
    let query = Query {
        name: "CountAuthors".to_string(),
        cmd: CommandKind::One,
        text: "SELECT count(*) AS total FROM authors".to_string(),
        columns: vec![column("total", "integer", true)],
        params: vec![],
        insert_into_table: None,
    };

    let generator = Generator::new(options, &CatalogIr::default(), vec![query]).unwrap();
    let output = generator.generate().unwrap();

    let method = &output.queries[0].raw_method;
    assert!(method.starts_with("pub fn count_authors(&self)"));
    assert!(!method.contains(".await"));
    assert!(method.contains("rusqlite::Connection::open(&self.url)?"));
}
