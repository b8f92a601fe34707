#![cfg(feature = "integration")]

mod common;
use anyhow::Result;
use catalog::contract::model::{ListMovies, MovieFilters, Registration};
use catalog::domain::error::DomainError;
use catalog::infra::storage::GenreRepository;
use catalog::Catalog;

#[tokio::test]
async fn catalog_works_with_postgres() -> Result<()> {
    let dut = common::bring_up_postgres().await?;

    // Connect via modkit-db
    let db = modkit_db::DbHandle::connect(&dut.url, modkit_db::ConnectOpts::default()).await?;
    Catalog::migrate(db.seaorm())
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    let genres = GenreRepository::new(db.sea());
    let drama = genres.create(None, "Drama").await?;
    let scifi = genres.create(None, "Sci-Fi").await?;

    let catalog = Catalog::new(db.sea(), &common::test_config())?;
    let movies = catalog.movies();

    let dune = movies
        .create(common::movie("Dune", "2021-10-22"), vec![scifi.id, drama.id, scifi.id])
        .await
        .map_err(|e| anyhow::anyhow!("Service failed to create movie: {}", e))?;
    assert_eq!(dune.genres.len(), 2);
    movies
        .create(common::movie("Dune: Part Two", "2024-03-01"), vec![drama.id])
        .await?;

    // search is case-insensitive on Postgres too
    let page = movies
        .list(ListMovies {
            limit: 10,
            page: 1,
            filters: MovieFilters {
                search: Some("DUNE".into()),
                genre_ids: vec![drama.id],
            },
            ..Default::default()
        })
        .await?;
    assert_eq!(page.total, 2);

    // FK violation rolls the whole create back
    let err = movies
        .create(common::movie("Broken", "2000-01-01"), vec![drama.id, 424_242])
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict { .. }));
    let page = movies
        .list(ListMovies {
            limit: 10,
            page: 1,
            ..Default::default()
        })
        .await?;
    assert_eq!(page.total, 2);

    movies.delete(dune.id).await?;
    movies.delete(dune.id).await?;

    let auth = catalog.auth();
    let reg = Registration {
        name: "Paul".into(),
        email: "paul@arrakis.io".into(),
        username: None,
        password: "spice".into(),
    };
    let (user, _) = auth.register(reg.clone()).await?;
    let (again, _) = auth.login("paul@arrakis.io", "spice").await?;
    assert_eq!(user.id, again.id);
    assert!(matches!(
        auth.register(reg).await,
        Err(DomainError::Conflict { .. })
    ));

    db.close().await;
    Ok(())
}
