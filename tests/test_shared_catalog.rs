mod common;

use anyhow::Result;
use minidb::{Catalog, EngineConfig, Error, Session};
use std::io::Write;
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_sessions_share_catalog() -> Result<()> {
    common::init_tracing();

    let catalog = Arc::new(Catalog::new());
    let mut admin = Session::with_catalog(catalog.clone(), EngineConfig::default());
    admin.execute("create table orders (id int primary key, item varchar(20))")?;

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let catalog = catalog.clone();
            thread::spawn(move || -> minidb::Result<usize> {
                let mut session = Session::with_catalog(catalog, EngineConfig::default());
                let mut inserted = 0;
                for n in 0..25 {
                    let id = worker * 100 + n;
                    inserted += session
                        .execute_update(&format!("insert into orders values ({}, 'item{}')", id, n))?;
                }
                // Every worker also races on one shared key
                if session
                    .execute_update("insert into orders values (9999, 'contested')")
                    .is_ok()
                {
                    inserted += 1;
                }
                Ok(inserted)
            })
        })
        .collect();

    let mut total = 0;
    for handle in handles {
        total += handle.join().expect("worker panicked")?;
    }

    assert_eq!(total, 101);
    let rs = admin.execute_query("select id from orders")?;
    assert_eq!(rs.len(), 101);
    let contested = admin.execute_query("select item from orders where id = 9999")?;
    assert_eq!(contested.len(), 1);
    Ok(())
}

#[test]
fn test_dropped_table_is_gone_for_all_sessions() -> Result<()> {
    common::init_tracing();

    let catalog = Arc::new(Catalog::new());
    let mut first = Session::with_catalog(catalog.clone(), EngineConfig::default());
    let mut second = Session::with_catalog(catalog.clone(), EngineConfig::default());

    first.execute("create table t (id int)")?;
    second.execute("insert into t values (1)")?;
    first.execute("drop table t")?;

    assert!(matches!(
        second.execute("select * from t"),
        Err(Error::UnknownTable(_))
    ));
    assert!(catalog.list_tables()?.is_empty());
    Ok(())
}

#[test]
fn test_session_from_config_file() -> Result<()> {
    common::init_tracing();

    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, r#"{{"strict_mode": false}}"#)?;

    let config = EngineConfig::load(file.path())?;
    let mut session = Session::with_config(config);
    session.execute("create table t (code varchar(3))")?;
    session.execute("insert into t values ('ABCDEF')")?;

    let rs = session.execute_query("select code from t")?;
    assert_eq!(rs.row(0).expect("one row").get_string(1)?, "ABC");

    let mut strict = Session::with_config(EngineConfig::new());
    strict.execute("create table t (code varchar(3))")?;
    assert!(matches!(
        strict.execute("insert into t values ('ABCDEF')"),
        Err(Error::ValueTooLong { max: 3, .. })
    ));
    Ok(())
}
