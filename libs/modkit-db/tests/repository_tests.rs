//! Generic repository behaviour against in-memory SQLite.
#![cfg(feature = "sqlite")]

use futures::FutureExt;
use modkit_db::{ConnectOpts, DbHandle, Filter, RepoError, Repository};
use sea_orm::{ActiveValue::Set, ConnectionTrait, DatabaseConnection, NotSet, Order, Schema};

mod widget {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "widgets")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        #[sea_orm(unique)]
        pub name: String,
        pub score: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

async fn setup() -> (DbHandle, Repository<widget::Entity>) {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("connect");
    let conn = db.sea();
    create_schema(&conn).await;
    (db, Repository::new(conn))
}

async fn create_schema(conn: &DatabaseConnection) {
    let backend = conn.get_database_backend();
    let stmt = Schema::new(backend).create_table_from_entity(widget::Entity);
    conn.execute(backend.build(&stmt)).await.expect("create table");
}

fn widget(name: &str, score: i32) -> widget::ActiveModel {
    widget::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        score: Set(score),
    }
}

#[tokio::test]
async fn create_assigns_identity_and_find_one_reads_it_back() {
    let (_db, repo) = setup().await;

    let created = repo.create(None, widget("gear", 3)).await.unwrap();
    assert!(created.id > 0);

    let found = repo
        .find_one(None, Filter::new().eq(widget::Column::Id, created.id))
        .await
        .unwrap();
    assert_eq!(found, created);
}

#[tokio::test]
async fn find_one_without_match_is_not_found() {
    let (_db, repo) = setup().await;

    let err = repo
        .find_one(None, Filter::new().eq(widget::Column::Name, "missing"))
        .await
        .unwrap_err();
    assert_eq!(err, RepoError::not_found("widgets"));
}

#[tokio::test]
async fn duplicate_unique_value_is_conflict() {
    let (_db, repo) = setup().await;

    repo.create(None, widget("gear", 1)).await.unwrap();
    let err = repo.create(None, widget("gear", 2)).await.unwrap_err();
    assert!(err.is_conflict(), "got {err:?}");
}

#[tokio::test]
async fn find_all_reports_total_independent_of_page() {
    let (_db, repo) = setup().await;
    for (name, score) in [("a", 1), ("b", 2), ("c", 2), ("d", 2), ("e", 5)] {
        repo.create(None, widget(name, score)).await.unwrap();
    }

    let (total, page) = repo
        .find_all(
            None,
            2,
            1,
            Some((widget::Column::Name, Order::Asc)),
            Filter::new().eq(widget::Column::Score, 2),
        )
        .await
        .unwrap();
    assert_eq!(total, 3);
    let names: Vec<_> = page.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, ["c", "d"]);

    let (total, all) = repo
        .find_all(None, 0, 0, None, Filter::default())
        .await
        .unwrap();
    assert_eq!(total, 5);
    assert_eq!(all.len(), 5);
}

#[tokio::test]
async fn find_all_past_last_page_is_empty() {
    let (_db, repo) = setup().await;
    repo.create(None, widget("only", 1)).await.unwrap();

    let (total, rows) = repo
        .find_all(None, 10, 10, None, Filter::new())
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert!(rows.is_empty());
}

#[tokio::test]
async fn update_rewrites_row_and_missing_identity_is_not_found() {
    let (_db, repo) = setup().await;
    let created = repo.create(None, widget("gear", 1)).await.unwrap();

    let updated = repo
        .update(
            None,
            widget::ActiveModel {
                id: Set(created.id),
                name: Set("cog".into()),
                score: Set(9),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "cog");
    assert_eq!(updated.score, 9);

    let err = repo
        .update(
            None,
            widget::ActiveModel {
                id: Set(created.id + 100),
                name: Set("ghost".into()),
                score: Set(0),
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
}

#[tokio::test]
async fn delete_reports_affected_rows() {
    let (_db, repo) = setup().await;
    repo.create(None, widget("a", 1)).await.unwrap();
    repo.create(None, widget("b", 1)).await.unwrap();
    repo.create(None, widget("c", 2)).await.unwrap();

    let n = repo
        .delete(None, Filter::new().eq(widget::Column::Score, 1))
        .await
        .unwrap();
    assert_eq!(n, 2);

    let n = repo
        .delete(None, Filter::new().eq(widget::Column::Score, 1))
        .await
        .unwrap();
    assert_eq!(n, 0);
}

#[tokio::test]
async fn batch_create_inserts_all_and_accepts_empty_input() {
    let (_db, repo) = setup().await;

    repo.batch_create(None, Vec::new()).await.unwrap();
    repo.batch_create(None, vec![widget("x", 1), widget("y", 2), widget("z", 3)])
        .await
        .unwrap();

    let (total, _) = repo
        .find_all(None, 0, 0, None, Filter::new())
        .await
        .unwrap();
    assert_eq!(total, 3);
}

#[tokio::test]
async fn transaction_commits_on_ok() {
    let (_db, repo) = setup().await;
    let inner = repo.clone();

    let id = repo
        .with_transaction(move |tx| {
            async move {
                let w = inner.create(Some(tx), widget("first", 1)).await?;
                inner.create(Some(tx), widget("second", 2)).await?;
                Ok::<_, RepoError>(w.id)
            }
            .boxed()
        })
        .await
        .unwrap();

    let found = repo
        .find_one(None, Filter::new().eq(widget::Column::Id, id))
        .await
        .unwrap();
    assert_eq!(found.name, "first");
    let (total, _) = repo.find_all(None, 0, 0, None, Filter::new()).await.unwrap();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn transaction_rolls_back_and_returns_original_error() {
    let (_db, repo) = setup().await;
    let inner = repo.clone();

    let err = repo
        .with_transaction(move |tx| {
            async move {
                inner.create(Some(tx), widget("kept?", 1)).await?;
                // same unique name: second insert fails
                inner.create(Some(tx), widget("kept?", 2)).await?;
                Ok::<_, RepoError>(())
            }
            .boxed()
        })
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    let (total, _) = repo.find_all(None, 0, 0, None, Filter::new()).await.unwrap();
    assert_eq!(total, 0);
}

#[tokio::test]
async fn transaction_rolls_back_on_panic() {
    let (_db, repo) = setup().await;
    let inner = repo.clone();
    let outer = repo.clone();

    let joined = tokio::spawn(async move {
        outer
            .with_transaction(move |tx| {
                async move {
                    inner.create(Some(tx), widget("doomed", 1)).await?;
                    if tx.get_database_backend() == sea_orm::DbBackend::Sqlite {
                        panic!("boom");
                    }
                    Ok::<_, RepoError>(())
                }
                .boxed()
            })
            .await
    })
    .await;
    assert!(joined.unwrap_err().is_panic());

    let (total, _) = repo.find_all(None, 0, 0, None, Filter::new()).await.unwrap();
    assert_eq!(total, 0);
}

#[tokio::test]
async fn sqlite_file_dsn_creates_parent_directories() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nested").join("catalog.db");
    let dsn = format!("sqlite://{}", path.display());

    let db = DbHandle::connect(&dsn, ConnectOpts::default()).await.unwrap();
    assert_eq!(db.engine(), modkit_db::DbEngine::Sqlite);
    assert!(path.exists());
    db.close().await;
}
