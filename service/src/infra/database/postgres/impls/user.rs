//! [`User`]-related [`Database`] implementations.

use std::fmt;

use common::operations::{By, Delete, Insert, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::user::list::{Filter, Selector, TotalCount},
};

/// Columns of the `users` table, in the order [`from_row()`] expects them.
const COLUMNS: &str = "id, first_name, last_name, nickname, password, \
                       email, country, created_at, updated_at";

/// SQL inserting a new [`User`].
const INSERT_SQL: &str = "\
    INSERT INTO users (\
        id, \
        first_name, last_name, \
        nickname, password, \
        email, country, \
        created_at, updated_at\
    ) \
    VALUES (\
        $1::UUID, \
        $2::VARCHAR, $3::VARCHAR, \
        $4::VARCHAR, $5::VARCHAR, \
        $6::VARCHAR, $7::VARCHAR, \
        $8::TIMESTAMPTZ, $9::TIMESTAMPTZ\
    )";

/// SQL updating a [`User`] with a [`user::Revision`].
///
/// Stale [`user::Revision`]s match no rows.
const UPDATE_SQL: &str = "\
    UPDATE users \
    SET first_name = $2::VARCHAR, \
        last_name = $3::VARCHAR, \
        nickname = $4::VARCHAR, \
        password = $5::VARCHAR, \
        email = $6::VARCHAR, \
        country = $7::VARCHAR, \
        updated_at = $8::TIMESTAMPTZ \
    WHERE id = $1::UUID \
      AND updated_at < $8::TIMESTAMPTZ";

/// SQL deleting a [`User`] by its [`user::Id`].
const DELETE_SQL: &str = "\
    DELETE FROM users \
    WHERE id = $1::UUID";

/// Parameters of a SQL statement.
type Params<'a> = Vec<&'a (dyn ToSql + Sync)>;

/// Converts the provided [`Row`] into a [`User`].
fn from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        nickname: row.get("nickname"),
        password: row.get("password"),
        email: row.get("email"),
        country: row.get("country"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Pushes equality conditions of the provided [`Filter`] along with their
/// parameters.
fn filter_conditions<'a>(
    filter: &'a Filter,
    ps: &mut Params<'a>,
) -> Vec<String> {
    let Filter {
        country,
        first_name,
        last_name,
        nickname,
    } = filter;

    let param = |v: &'a (dyn ToSql + Sync)| v;
    [
        ("country", country.as_ref().map(|v| param(v))),
        ("first_name", first_name.as_ref().map(|v| param(v))),
        ("last_name", last_name.as_ref().map(|v| param(v))),
        ("nickname", nickname.as_ref().map(|v| param(v))),
    ]
    .into_iter()
    .filter_map(|(column, value)| {
        ps.push(value?);
        Some(format!("{column} = ${}::VARCHAR", ps.len()))
    })
    .collect()
}

/// Formats the provided `conditions` as a `WHERE` clause, if there are any.
fn where_clause(conditions: &[String]) -> impl fmt::Display + '_ {
    conditions.iter().enumerate().format_with("", |(i, c), f| {
        f(&format_args!(" {} {c}", if i == 0 { "WHERE" } else { "AND" }))
    })
}

/// Builds SQL selecting a page of [`User`]s by the provided [`Selector`].
fn select_page_sql<'a>(
    selector: &'a Selector,
    limit: &'a i64,
) -> (String, Params<'a>) {
    let Selector { arguments, filter } = selector;

    let mut ps = Params::new();
    let mut conditions = filter_conditions(filter, &mut ps);
    if let Some(boundary) = arguments.boundary() {
        let (created_at, id) = &boundary.key;
        ps.push(created_at);
        ps.push(id);
        conditions.push(format!(
            "(created_at, id) {op} (${}::TIMESTAMPTZ, ${}::UUID)",
            ps.len() - 1,
            ps.len(),
            op = boundary.kind.operator(),
        ));
    }
    ps.push(limit);

    let sql = format!(
        "SELECT {COLUMNS} \
         FROM users{where_clause} \
         ORDER BY created_at {order}, id {order} \
         LIMIT ${limit}::INT8",
        where_clause = where_clause(&conditions),
        order = arguments.order().sql(),
        limit = ps.len(),
    );
    (sql, ps)
}

/// Builds SQL counting [`User`]s passing the provided [`Filter`].
fn count_sql(filter: &Filter) -> (String, Params<'_>) {
    let mut ps = Params::new();
    let conditions = filter_conditions(filter, &mut ps);

    let sql = format!(
        "SELECT COUNT(*) FROM users{}",
        where_clause(&conditions),
    );
    (sql, ps)
}

impl Database<Insert<User>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            id,
            first_name,
            last_name,
            nickname,
            password,
            email,
            country,
            created_at,
            updated_at,
        } = user;

        self.exec(
            INSERT_SQL,
            &[
                &id,
                &first_name,
                &last_name,
                &nickname,
                &password,
                &email,
                &country,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl Database<Update<user::Revision>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(revision): Update<user::Revision>,
    ) -> Result<Self::Ok, Self::Err> {
        let user::Revision {
            id,
            first_name,
            last_name,
            nickname,
            password,
            email,
            country,
            updated_at,
        } = revision;

        self.exec(
            UPDATE_SQL,
            &[
                &id,
                &first_name,
                &last_name,
                &nickname,
                &password,
                &email,
                &country,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl Database<Delete<By<User, user::Id>>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: user::Id = by.into_inner();

        self.exec(DELETE_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl Database<Select<By<Vec<User>, Selector>>> for Postgres {
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<User>, Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let selector = by.into_inner();
        let limit = selector.arguments.limit();

        let (sql, ps) = select_page_sql(&selector, &limit);
        Ok(self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl Database<Select<By<TotalCount, Filter>>> for Postgres {
    type Ok = TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<TotalCount, Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();

        let (sql, ps) = count_sql(&filter);
        self.query_one(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.get::<_, i64>(0).into())
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::{
        domain::user,
        read::user::list::{Arguments, Cursor, Filter, Request, Selector},
    };

    use super::{
        count_sql, select_page_sql, DELETE_SQL, INSERT_SQL, UPDATE_SQL,
    };

    fn cursor(offset: i64) -> Cursor {
        Cursor {
            key: (DateTime::now().coerce(), user::Id::new()),
            offset,
        }
    }

    fn selector(request: Request, filter: Filter) -> Selector {
        Selector {
            arguments: Arguments::new(request, Some(2)),
            filter,
        }
    }

    #[test]
    fn selects_first_page_without_where() {
        let selector = selector(Request::First, Filter::default());
        let (sql, ps) = select_page_sql(&selector, &2);

        assert_eq!(
            sql,
            "SELECT id, first_name, last_name, nickname, password, \
                    email, country, created_at, updated_at \
             FROM users \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1::INT8",
        );
        assert_eq!(ps.len(), 1);
    }

    #[test]
    fn selects_next_page_with_filter() {
        let selector = selector(
            Request::Next(cursor(0)),
            Filter {
                country: Some(user::Country::new("UK").unwrap()),
                nickname: Some(user::Nickname::new("jd").unwrap()),
                ..Filter::default()
            },
        );
        let (sql, ps) = select_page_sql(&selector, &2);

        assert_eq!(
            sql,
            "SELECT id, first_name, last_name, nickname, password, \
                    email, country, created_at, updated_at \
             FROM users \
             WHERE country = $1::VARCHAR \
               AND nickname = $2::VARCHAR \
               AND (created_at, id) < ($3::TIMESTAMPTZ, $4::UUID) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $5::INT8",
        );
        assert_eq!(ps.len(), 5);
    }

    #[test]
    fn selects_previous_page_ascending() {
        let selector = selector(Request::Previous(cursor(4)), Filter::default());
        let (sql, ps) = select_page_sql(&selector, &2);

        assert_eq!(
            sql,
            "SELECT id, first_name, last_name, nickname, password, \
                    email, country, created_at, updated_at \
             FROM users \
             WHERE (created_at, id) > ($1::TIMESTAMPTZ, $2::UUID) \
             ORDER BY created_at ASC, id ASC \
             LIMIT $3::INT8",
        );
        assert_eq!(ps.len(), 3);
    }

    #[test]
    fn selects_first_page_when_going_back_to_start() {
        let selector = selector(
            Request::Previous(cursor(2)),
            Filter {
                first_name: Some(user::Name::new("John").unwrap()),
                ..Filter::default()
            },
        );
        let (sql, ps) = select_page_sql(&selector, &2);

        assert_eq!(
            sql,
            "SELECT id, first_name, last_name, nickname, password, \
                    email, country, created_at, updated_at \
             FROM users \
             WHERE first_name = $1::VARCHAR \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2::INT8",
        );
        assert_eq!(ps.len(), 2);
    }

    #[test]
    fn counts_with_filter_only() {
        let filter = Filter::default();
        let (sql, ps) = count_sql(&filter);
        assert_eq!(sql, "SELECT COUNT(*) FROM users");
        assert!(ps.is_empty());

        let filter = Filter {
            last_name: Some(user::Name::new("Doe").unwrap()),
            nickname: Some(user::Nickname::new("jd").unwrap()),
            ..Filter::default()
        };
        let (sql, ps) = count_sql(&filter);
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM users \
             WHERE last_name = $1::VARCHAR \
               AND nickname = $2::VARCHAR",
        );
        assert_eq!(ps.len(), 2);
    }

    #[test]
    fn updates_only_older_rows() {
        assert_eq!(
            UPDATE_SQL,
            "UPDATE users \
             SET first_name = $2::VARCHAR, \
                 last_name = $3::VARCHAR, \
                 nickname = $4::VARCHAR, \
                 password = $5::VARCHAR, \
                 email = $6::VARCHAR, \
                 country = $7::VARCHAR, \
                 updated_at = $8::TIMESTAMPTZ \
             WHERE id = $1::UUID \
               AND updated_at < $8::TIMESTAMPTZ",
        );
    }

    #[test]
    fn inserts_all_columns() {
        assert_eq!(
            INSERT_SQL,
            "INSERT INTO users (\
                 id, first_name, last_name, nickname, password, \
                 email, country, created_at, updated_at\
             ) \
             VALUES (\
                 $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                 $5::VARCHAR, $6::VARCHAR, $7::VARCHAR, \
                 $8::TIMESTAMPTZ, $9::TIMESTAMPTZ\
             )",
        );
    }

    #[test]
    fn deletes_by_id_only() {
        assert_eq!(DELETE_SQL, "DELETE FROM users WHERE id = $1::UUID");
    }
}
