//! Round trip against a real PostgreSQL server. Skipped unless `DATABASE_URL`
//! is set (a `.env` file is honored).

#![cfg(feature = "postgres")]

use tessera::{Dest, Insertable, OrmError, OrmResult, Record, select};
use tokio_postgres::NoTls;

tessera::table! {
    struct People("tessera_people") {
        name: String,
        age: i32,
    }
}

#[derive(Insertable)]
#[allow(non_snake_case)]
struct Person {
    Name: String,
    Age: i32,
}

#[derive(Debug, Default, Record)]
struct PersonRow {
    name: String,
    age: i32,
}

#[tokio::test]
async fn insert_then_select_roundtrip() -> OrmResult<()> {
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping insert_then_select_roundtrip");
            return Ok(());
        }
    };

    let (mut client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .map_err(OrmError::from_db_error)?;
    tokio::spawn(async move {
        let _ = connection.await;
    });

    client
        .batch_execute(
            "CREATE TEMP TABLE tessera_people (name TEXT PRIMARY KEY, age INT4 NOT NULL)",
        )
        .await
        .map_err(OrmError::from_db_error)?;

    let people = People::new();
    let tx = client.transaction().await?;
    for (name, age) in [("ann", 31), ("bob", 17), ("cy", 45)] {
        let result = tessera::insert(people.table())
            .values(
                &tx,
                &Person {
                    Name: name.into(),
                    Age: age,
                },
            )
            .await?;
        assert_eq!(result.rows_affected, 1);
    }
    tx.commit().await?;

    let mut adults: Vec<PersonRow> = Vec::new();
    select(&[&people])
        .where_([people.age.gte(18)])
        .order_by([people.name.asc()])
        .all(&client, [Dest::sequence(&mut adults)])
        .await?;
    let names: Vec<_> = adults.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["ann", "cy"]);

    let mut oldest = PersonRow::default();
    select(&[&people])
        .order_by([people.age.desc()])
        .first(&client, [Dest::record(&mut oldest)])
        .await?;
    assert_eq!(oldest.age, 45);

    let err = select(&[&people])
        .where_([people.name.eq("nobody")])
        .first(&client, [Dest::record(&mut oldest)])
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = tessera::insert(people.table())
        .values(
            &client,
            &Person {
                Name: "ann".into(),
                Age: 1,
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());

    Ok(())
}
