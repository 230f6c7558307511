use mssql_helper::prelude::*;
use mssql_helper::test_utils::{RecordedStatement, ScriptedConnector};

fn accessor(connector: &ScriptedConnector) -> AsyncDataAccessor<ScriptedConnector> {
    AsyncDataAccessor::with_connector(connector.clone())
}

#[tokio::test]
async fn create_then_read_round_trips_through_one_connection_each() {
    let connector = ScriptedConnector::new().with_affected(1).with_rows(
        &["id", "val"],
        vec![vec![RowValues::Int(1), RowValues::Text("a".into())]],
    );
    let db = accessor(&connector);

    let inserted = db
        .create(
            "INSERT INTO t(id,val) VALUES (@id,@val)",
            &[SqlParameter::new("@id", 1), SqlParameter::new("@val", "a")],
        )
        .await
        .unwrap();
    assert_eq!(inserted, 1);

    let rows = db
        .read(
            "SELECT * FROM t WHERE id=@id",
            Some(&[SqlParameter::new("@id", 1)]),
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.results[0].get("id"), Some(&RowValues::Int(1)));
    assert_eq!(rows.results[0].get("val").and_then(RowValues::as_text), Some("a"));

    assert_eq!(
        connector.recorded(),
        vec![
            RecordedStatement {
                sql: "INSERT INTO t(id,val) VALUES (@P1,@P2)".into(),
                params: vec![RowValues::Int(1), RowValues::Text("a".into())],
            },
            RecordedStatement {
                sql: "SELECT * FROM t WHERE id=@P1".into(),
                params: vec![RowValues::Int(1)],
            },
        ]
    );
    assert_eq!(connector.opened(), 2);
    assert_eq!(connector.released(), 2);
}

#[tokio::test]
async fn read_with_no_match_is_empty_not_an_error() {
    let connector = ScriptedConnector::new().with_rows(&["id", "val"], vec![]);
    let rows = accessor(&connector)
        .read(
            "SELECT * FROM t WHERE id=@id",
            Some(&[SqlParameter::new("@id", 999)]),
        )
        .await
        .unwrap();
    assert!(rows.is_empty());
    assert_eq!(rows.get_column_names().map(|c| c.len()), Some(2));
}

#[tokio::test]
async fn read_without_params_sends_statement_verbatim() {
    let connector = ScriptedConnector::new();
    let rows = accessor(&connector)
        .read("SELECT @@VERSION AS v", None)
        .await
        .unwrap();
    assert!(rows.is_empty());
    assert_eq!(connector.recorded()[0].sql, "SELECT @@VERSION AS v");
    assert!(connector.recorded()[0].params.is_empty());
}

#[tokio::test]
async fn update_and_delete_return_affected_counts() {
    let connector = ScriptedConnector::new().with_affected(3).with_affected(2);
    let db = accessor(&connector);

    let updated = db
        .update(
            "UPDATE t SET val = @val WHERE id > @id",
            &[SqlParameter::new("id", 0), SqlParameter::new("val", "b")],
        )
        .await
        .unwrap();
    let deleted = db
        .delete("DELETE FROM t WHERE val = @val", &[SqlParameter::new("val", "b")])
        .await
        .unwrap();

    assert_eq!((updated, deleted), (3, 2));
    assert_eq!(
        connector.recorded()[0].sql,
        "UPDATE t SET val = @P2 WHERE id > @P1"
    );
}

#[tokio::test]
async fn connection_failure_surfaces_without_running_anything() {
    let connector = ScriptedConnector::new()
        .with_affected(1)
        .refusing_connections("login failed");
    let err = accessor(&connector)
        .create("INSERT INTO t(id) VALUES (@id)", &[SqlParameter::new("id", 1)])
        .await
        .unwrap_err();

    assert!(err.is_connection_error());
    assert!(connector.recorded().is_empty());
    assert_eq!(connector.remaining(), 1);
    assert_eq!(connector.opened(), 0);
}

#[tokio::test]
async fn statement_failure_still_releases_the_connection() {
    let connector = ScriptedConnector::new().with_failure("Incorrect syntax near 'FORM'");
    let err = accessor(&connector)
        .read("SELECT * FORM t", None)
        .await
        .unwrap_err();

    assert!(err.is_statement_error());
    assert!(err.to_string().contains("FORM"));
    assert_eq!(connector.opened(), 1);
    assert_eq!(connector.released(), 1);
}

#[tokio::test]
async fn duplicate_parameter_names_fail_before_connecting() {
    let connector = ScriptedConnector::new();
    let err = accessor(&connector)
        .update(
            "UPDATE t SET val = @val",
            &[SqlParameter::new("@val", "a"), SqlParameter::new("@VAL", "b")],
        )
        .await
        .unwrap_err();

    assert!(err.is_statement_error());
    assert_eq!(connector.opened(), 0);
}

#[tokio::test]
async fn cancelled_call_releases_its_connection() {
    use std::future::Future;
    use std::task::{Context, Poll, Waker};

    let connector = ScriptedConnector::new().with_hang().with_hang();
    let db = accessor(&connector);
    let mut cx = Context::from_waker(Waker::noop());

    let params = [SqlParameter::new("id", 1)];
    let mut call = Box::pin(db.delete("DELETE FROM t WHERE id = @id", &params));
    assert!(call.as_mut().poll(&mut cx).is_pending());
    assert_eq!(connector.opened(), 1);
    assert_eq!(connector.released(), 0);
    drop(call);
    assert_eq!(connector.released(), 1);

    let mut read = Box::pin(db.read("SELECT * FROM t", None));
    assert!(matches!(read.as_mut().poll(&mut cx), Poll::Pending));
    assert_eq!(connector.opened(), 2);
    drop(read);
    assert_eq!(connector.released(), 2);
    assert_eq!(connector.remaining(), 0);

    // an unpolled call never connects
    drop(db.delete("DELETE FROM t", &[]));
    assert_eq!(connector.opened(), 2);
}

#[tokio::test]
async fn concurrent_calls_on_one_accessor_are_independent() {
    let connector = ScriptedConnector::new()
        .with_rows(&["n"], vec![vec![RowValues::Int(1)]])
        .with_rows(&["n"], vec![vec![RowValues::Int(2)]]);
    let db = accessor(&connector);

    let (a, b) = tokio::join!(
        db.read("SELECT 1 AS n", None),
        db.read("SELECT 2 AS n", None)
    );
    let mut seen = vec![
        *a.unwrap().results[0].get("n").and_then(RowValues::as_int).unwrap(),
        *b.unwrap().results[0].get("n").and_then(RowValues::as_int).unwrap(),
    ];
    seen.sort_unstable();
    assert_eq!(seen, vec![1, 2]);
    assert_eq!(connector.opened(), 2);
    assert_eq!(connector.released(), 2);
}
