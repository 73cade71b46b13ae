//! In-memory doubles of the [`Service`] infrastructure.

#![allow(dead_code, reason = "not every test uses every double")]

use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use common::{
    operations::{By, Delete, Insert, Perform, Publish, Select, Update},
    pagination::Order,
    DateTime,
};
use service::{
    domain::{user, User},
    infra::{
        database::{self, Retention},
        notifier::{self, Message},
        postgres::connection::PoolError,
        pubsub, Database, Notifier,
    },
    read::user::list,
    task, Config, Service,
};
use tracerr::Traced;

/// [`Service`] backed by the in-memory doubles.
pub type TestService = Service<MemoryDb, MemoryNotifier>;

/// Creates a new [`TestService`] over the provided doubles.
pub fn test_service(
    db: &MemoryDb,
    notifier: Option<&MemoryNotifier>,
) -> TestService {
    let (svc, _bg) = Service::new(
        Config {
            cursor_codec: list::Codec::new("test"),
            retain_connections: task::retain_connections::Config {
                interval: Duration::from_secs(60),
                retention: Retention {
                    max_idle: 8,
                    max_lifetime: Duration::from_secs(300),
                },
            },
        },
        db.clone(),
        notifier.cloned(),
    );
    svc
}

/// Builds a [`User`] created at the provided number of seconds after epoch.
pub fn sample(n: u64, nickname: &str, country: &str) -> User {
    let at = DateTime::UNIX_EPOCH + Duration::from_secs(n);
    User {
        id: user::Id::new(),
        first_name: user::Name::new("John").unwrap(),
        last_name: user::Name::new("Doe").unwrap(),
        nickname: user::Nickname::new(nickname).unwrap(),
        password: user::Password::new("qwerty").unwrap(),
        email: user::Email::new(format!("{nickname}@faceit.com")).unwrap(),
        country: user::Country::new(country).unwrap(),
        created_at: at.coerce(),
        updated_at: at.coerce(),
    }
}

/// [`database::Error`] reported by a failing [`MemoryDb`].
fn failure() -> Traced<database::Error> {
    tracerr::new!(database::Error::from(
        service::infra::postgres::Error::from(PoolError::Closed),
    ))
}

/// In-memory [`Database`].
#[derive(Clone, Debug, Default)]
pub struct MemoryDb {
    /// Stored [`User`]s.
    users: Arc<Mutex<Vec<User>>>,

    /// Whether every operation fails.
    failing: Arc<AtomicBool>,

    /// Number of executed operations.
    calls: Arc<AtomicUsize>,
}

impl MemoryDb {
    /// Creates a new [`MemoryDb`] storing the provided [`User`]s.
    pub fn with(users: impl IntoIterator<Item = User>) -> Self {
        let db = Self::default();
        db.users.lock().unwrap().extend(users);
        db
    }

    /// Makes every further operation fail.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Returns number of executed operations.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns the stored [`User`] with the provided ID, if any.
    pub fn get(&self, id: user::Id) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }

    /// Returns number of the stored [`User`]s.
    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    /// Accounts a new operation, failing if requested.
    fn call(&self) -> Result<(), Traced<database::Error>> {
        _ = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(failure());
        }
        Ok(())
    }
}

impl Database<Insert<User>> for MemoryDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.call()?;
        self.users.lock().unwrap().push(user);
        Ok(())
    }
}

impl Database<Update<user::Revision>> for MemoryDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(rev): Update<user::Revision>,
    ) -> Result<Self::Ok, Self::Err> {
        self.call()?;
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users
            .iter_mut()
            .find(|u| u.id == rev.id && u.updated_at < rev.updated_at)
        {
            u.first_name = rev.first_name;
            u.last_name = rev.last_name;
            u.nickname = rev.nickname;
            u.password = rev.password;
            u.email = rev.email;
            u.country = rev.country;
            u.updated_at = rev.updated_at;
        }
        Ok(())
    }
}

impl Database<Delete<By<User, user::Id>>> for MemoryDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.call()?;
        let id = by.into_inner();
        self.users.lock().unwrap().retain(|u| u.id != id);
        Ok(())
    }
}

impl Database<Select<By<Vec<User>, list::Selector>>> for MemoryDb {
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<User>, list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.call()?;
        let list::Selector { arguments, filter } = by.into_inner();

        let mut users = self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| filter.matches(u))
            .filter(|u| {
                arguments.boundary().map_or(true, |b| b.admits(&list::key(u)))
            })
            .cloned()
            .collect::<Vec<_>>();
        users.sort_by_key(list::key);
        if arguments.order() == Order::Descending {
            users.reverse();
        }
        users.truncate(usize::try_from(arguments.limit()).unwrap());
        Ok(users)
    }
}

impl Database<Select<By<list::TotalCount, list::Filter>>> for MemoryDb {
    type Ok = list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::TotalCount, list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.call()?;
        let filter = by.into_inner();
        let count = self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| filter.matches(u))
            .count();
        Ok(i64::try_from(count).unwrap().into())
    }
}

impl Database<Perform<Retention>> for MemoryDb {
    type Ok = usize;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Perform<Retention>) -> Result<usize, Self::Err> {
        self.call()?;
        Ok(0)
    }
}

/// In-memory [`Notifier`] recording published [`Message`]s.
#[derive(Clone, Debug, Default)]
pub struct MemoryNotifier {
    /// Published [`Message`]s.
    messages: Arc<Mutex<Vec<Message>>>,

    /// Whether every publishing fails.
    failing: bool,
}

impl MemoryNotifier {
    /// Creates a new [`MemoryNotifier`] failing every publishing.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Returns the published [`Message`]s as strings.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

impl Notifier<Publish<Message>> for MemoryNotifier {
    type Ok = ();
    type Err = Traced<notifier::Error>;

    async fn execute(
        &self,
        Publish(msg): Publish<Message>,
    ) -> Result<Self::Ok, Self::Err> {
        if self.failing {
            return Err(tracerr::new!(notifier::Error::from(
                pubsub::Error::NotAcknowledged,
            )));
        }
        self.messages.lock().unwrap().push(msg);
        Ok(())
    }
}
