//! Generic SeaORM-backed repository.
//!
//! [`Repository<E>`] gives every entity the same CRUD surface. Concrete
//! repositories wrap it and add their own queries (listing, eager loading)
//! without re-deriving the base operations.
//!
//! Every method takes `tx: Option<&DatabaseTransaction>`. With `Some`, the
//! statement runs on that transaction; with `None`, on the pool.

use std::fmt;
use std::marker::PhantomData;

use futures::future::BoxFuture;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection,
    DatabaseTransaction, EntityTrait, IdenStatic, IntoActiveModel, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Value,
};

use crate::errors::{classify, RepoError, RepoResult};

/// Dispatch `$body` on the transaction when present, otherwise on the pool.
macro_rules! on_conn {
    ($self:ident, $tx:expr, |$conn:ident| $body:expr) => {
        match $tx {
            Some($conn) => $body,
            None => {
                let $conn = &$self.conn;
                $body
            }
        }
    };
}

/// Equality filter map: every `(column, value)` pair must match.
pub struct Filter<E: EntityTrait> {
    pairs: Vec<(E::Column, Value)>,
}

impl<E: EntityTrait> Filter<E> {
    /// Empty filter: matches every row.
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Add an equality predicate.
    pub fn eq(mut self, column: E::Column, value: impl Into<Value>) -> Self {
        self.pairs.push((column, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn into_condition(self) -> Condition {
        self.pairs
            .into_iter()
            .fold(Condition::all(), |cond, (column, value)| {
                cond.add(column.eq(value))
            })
    }
}

impl<E: EntityTrait> Default for Filter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> fmt::Debug for Filter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.pairs.iter().map(|(c, v)| (c.as_str(), v)))
            .finish()
    }
}

/// Generic repository over a SeaORM entity.
pub struct Repository<E> {
    conn: DatabaseConnection,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> fmt::Debug for Repository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &std::any::type_name::<E>())
            .finish()
    }
}

impl<E> Repository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
{
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }

    /// Pool-level connection, for callers that build their own statements.
    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    fn entity_name() -> String {
        E::default().table_name().to_string()
    }

    fn classify(err: sea_orm::DbErr) -> RepoError {
        classify(err, &Self::entity_name())
    }

    /// Insert one row and return it as stored (generated identity included).
    pub async fn create(
        &self,
        tx: Option<&DatabaseTransaction>,
        entity: E::ActiveModel,
    ) -> RepoResult<E::Model> {
        on_conn!(self, tx, |conn| entity.insert(conn).await)
            .map_err(Self::classify)
    }

    /// First row matching `filter`; `NotFound` when none does.
    pub async fn find_one(
        &self,
        tx: Option<&DatabaseTransaction>,
        filter: Filter<E>,
    ) -> RepoResult<E::Model> {
        let query = E::find().filter(filter.into_condition());
        on_conn!(self, tx, |conn| query.one(conn).await)
            .map_err(Self::classify)?
            .ok_or_else(|| RepoError::not_found(Self::entity_name()))
    }

    /// Total number of rows matching `filter` plus the requested page.
    ///
    /// `limit == 0` means unbounded. The total ignores `limit`/`offset`.
    pub async fn find_all(
        &self,
        tx: Option<&DatabaseTransaction>,
        limit: u64,
        offset: u64,
        order: Option<(E::Column, Order)>,
        filter: Filter<E>,
    ) -> RepoResult<(u64, Vec<E::Model>)> {
        let base = E::find().filter(filter.into_condition());
        let total = on_conn!(self, tx, |conn| base.clone().count(conn).await)
            .map_err(Self::classify)?;

        let mut query = base;
        if let Some((column, dir)) = order {
            query = query.order_by(column, dir);
        }
        if offset > 0 {
            query = query.offset(offset);
        }
        if limit > 0 {
            query = query.limit(limit);
        }
        let rows = on_conn!(self, tx, |conn| query.all(conn).await)
            .map_err(Self::classify)?;
        Ok((total, rows))
    }

    /// Full-row update by identity; `NotFound` if the identity does not exist.
    pub async fn update(
        &self,
        tx: Option<&DatabaseTransaction>,
        entity: E::ActiveModel,
    ) -> RepoResult<E::Model> {
        on_conn!(self, tx, |conn| entity.update(conn).await)
            .map_err(Self::classify)
    }

    /// Delete every row matching `filter`. Zero rows is not an error; the
    /// affected count lets callers enforce exactly-one semantics.
    pub async fn delete(
        &self,
        tx: Option<&DatabaseTransaction>,
        filter: Filter<E>,
    ) -> RepoResult<u64> {
        let stmt = E::delete_many().filter(filter.into_condition());
        let res = on_conn!(self, tx, |conn| stmt.exec(conn).await)
            .map_err(Self::classify)?;
        Ok(res.rows_affected)
    }

    /// Insert many rows in one statement. Empty input is a no-op.
    pub async fn batch_create(
        &self,
        tx: Option<&DatabaseTransaction>,
        entities: Vec<E::ActiveModel>,
    ) -> RepoResult<()> {
        if entities.is_empty() {
            return Ok(());
        }
        let stmt = E::insert_many(entities);
        on_conn!(self, tx, |conn| stmt.exec_without_returning(conn).await)
            .map_err(Self::classify)?;
        Ok(())
    }

    /// Run `f` in a transaction on this repository's pool.
    /// See [`crate::transaction::with_transaction`].
    pub async fn with_transaction<T, Err, F>(&self, f: F) -> Result<T, Err>
    where
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T, Err>>,
        Err: From<RepoError>,
    {
        crate::transaction::with_transaction(&self.conn, f).await
    }
}
