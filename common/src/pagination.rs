//! Abstractions for keyset pagination.
//!
//! Nodes are listed newest-first by a sort key `K`. A page is requested
//! either from the start of the list, or relatively to a [`Cursor`] returned
//! with a previously fetched [`Page`]. A [`Cursor`] remembers the sort key of
//! its anchor node along with the offset of the page it was issued for, so it
//! stays meaningful even if the anchor node itself is gone.

use derive_more::{Display, Error};

/// Position of a page boundary in an ordered list.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Cursor<K> {
    /// Sort key of the anchor node.
    pub key: K,

    /// Offset of the page this [`Cursor`] was issued for.
    pub offset: i64,
}

/// Requested page, relative to the previously fetched one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Request<C> {
    /// The first page of the list.
    First,

    /// The page following the one the cursor was issued for.
    Next(C),

    /// The page preceding the one the cursor was issued for.
    Previous(C),
}

impl<C> Request<C> {
    /// Creates a new [`Request`] out of the optional `previous` and `next`
    /// page cursors.
    ///
    /// # Errors
    ///
    /// If both cursors are provided.
    pub fn new(
        previous: Option<C>,
        next: Option<C>,
    ) -> Result<Self, AmbiguousError> {
        match (previous, next) {
            (None, None) => Ok(Self::First),
            (None, Some(next)) => Ok(Self::Next(next)),
            (Some(previous), None) => Ok(Self::Previous(previous)),
            (Some(_), Some(_)) => Err(AmbiguousError),
        }
    }

    /// Converts the cursor of this [`Request`] with the provided fallible
    /// function.
    ///
    /// # Errors
    ///
    /// If the provided function fails.
    pub fn try_map<D, E>(
        self,
        f: impl FnOnce(C) -> Result<D, E>,
    ) -> Result<Request<D>, E> {
        Ok(match self {
            Self::First => Request::First,
            Self::Next(c) => Request::Next(f(c)?),
            Self::Previous(c) => Request::Previous(f(c)?),
        })
    }
}

/// Error of both the previous and the next page being requested at once.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
#[display("Either next or previous page should be requested, not both")]
pub struct AmbiguousError;

/// Pagination arguments describing how to fetch a page.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Arguments<K> {
    /// Maximum number of nodes on a page.
    limit: i64,

    /// Offset of the requested page in the whole list.
    offset: i64,

    /// [`Boundary`] the nodes of the requested page lie behind, if any.
    boundary: Option<Boundary<K>>,
}

impl<K> Arguments<K> {
    /// Page size used when no (or zero) limit is requested.
    pub const DEFAULT_LIMIT: u32 = 100;

    /// Plans fetching of the page described by the provided [`Request`].
    ///
    /// Going back to the very first page drops the [`Boundary`] entirely, so
    /// any nodes added since the first page was fetched show up again.
    #[must_use]
    pub fn new(request: Request<Cursor<K>>, limit: Option<u32>) -> Self {
        let limit = i64::from(
            limit.filter(|l| *l != 0).unwrap_or(Self::DEFAULT_LIMIT),
        );

        match request {
            Request::First => Self {
                limit,
                offset: 0,
                boundary: None,
            },
            Request::Next(Cursor { key, offset }) => Self {
                limit,
                offset: offset.saturating_add(limit),
                boundary: Some(Boundary {
                    key,
                    kind: Kind::Forward,
                }),
            },
            Request::Previous(Cursor { key, offset }) => Self {
                limit,
                offset: offset.saturating_sub(limit),
                boundary: (offset != limit).then_some(Boundary {
                    key,
                    kind: Kind::Backward,
                }),
            },
        }
    }

    /// Returns maximum number of nodes on the requested page.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Returns offset of the requested page in the whole list.
    #[must_use]
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Returns [`Boundary`] the nodes of the requested page lie behind, if
    /// any.
    #[must_use]
    pub fn boundary(&self) -> Option<&Boundary<K>> {
        self.boundary.as_ref()
    }

    /// Returns [`Order`] the nodes should be fetched in.
    #[must_use]
    pub fn order(&self) -> Order {
        self.boundary
            .as_ref()
            .map_or(Order::Descending, |b| b.kind.order())
    }
}

/// Sort key boundary of a page.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Boundary<K> {
    /// Sort key of the boundary.
    pub key: K,

    /// [`Kind`] of pagination relative to the boundary.
    pub kind: Kind,
}

impl<K: Ord> Boundary<K> {
    /// Checks whether a node with the provided sort `key` lies behind this
    /// [`Boundary`].
    #[must_use]
    pub fn admits(&self, key: &K) -> bool {
        match self.kind {
            Kind::Forward => *key < self.key,
            Kind::Backward => *key > self.key,
        }
    }
}

/// Kind of pagination.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
    /// Towards older nodes.
    Forward,

    /// Towards newer nodes.
    Backward,
}

impl Kind {
    /// Returns comparison operator representing this [`Kind`].
    #[must_use]
    pub const fn operator(&self) -> &'static str {
        match self {
            Self::Forward => "<",
            Self::Backward => ">",
        }
    }

    /// Returns order representing this [`Kind`].
    #[must_use]
    pub const fn order(&self) -> Order {
        match self {
            Self::Forward => Order::Descending,
            Self::Backward => Order::Ascending,
        }
    }
}

/// Order of pagination.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Order {
    /// Ascending order.
    Ascending,

    /// Descending order.
    Descending,
}

impl Order {
    #[cfg(feature = "postgres")]
    /// Returns SQL operator representing this [`Order`].
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// A page of nodes, ordered newest-first.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page<N, K> {
    /// Nodes on this [`Page`].
    pub nodes: Vec<N>,

    /// [`Cursor`] to the previous [`Page`], if there is one.
    pub previous: Option<Cursor<K>>,

    /// [`Cursor`] to the next [`Page`], if there is one.
    pub next: Option<Cursor<K>>,

    /// Total number of nodes in the whole list.
    pub total: i64,
}

impl<N, K> Page<N, K> {
    /// Creates a new [`Page`] out of the `nodes` fetched according to the
    /// provided [`Arguments`].
    ///
    /// The `nodes` are expected in their fetching [`Order`], and `key`
    /// extracts the sort key of a node.
    #[must_use]
    pub fn new(
        args: &Arguments<K>,
        mut nodes: Vec<N>,
        total: i64,
        key: impl Fn(&N) -> K,
    ) -> Self {
        if args.order() == Order::Ascending {
            nodes.reverse();
        }

        let Arguments { limit, offset, .. } = *args;
        let len = i64::try_from(nodes.len()).unwrap_or(i64::MAX);
        let remaining = total.saturating_sub(offset);

        // The newest node anchors the way back, the oldest one the way
        // forward, rather than the last fetched node for both, so backward
        // steps land on adjacent pages.
        let previous = nodes
            .first()
            .filter(|_| offset.saturating_sub(limit) >= 0)
            .map(|n| Cursor {
                key: key(n),
                offset,
            });
        let next = nodes
            .last()
            .filter(|_| remaining > 0 && len >= limit && remaining != limit)
            .map(|n| Cursor {
                key: key(n),
                offset,
            });

        Self {
            nodes,
            previous,
            next,
            total,
        }
    }

    /// Converts the nodes and the cursors of this [`Page`].
    #[must_use]
    pub fn map<M, L>(
        self,
        node: impl FnMut(N) -> M,
        mut cursor: impl FnMut(Cursor<K>) -> L,
    ) -> (Vec<M>, Option<L>, Option<L>, i64) {
        let Self {
            nodes,
            previous,
            next,
            total,
        } = self;
        (
            nodes.into_iter().map(node).collect(),
            previous.map(&mut cursor),
            next.map(&mut cursor),
            total,
        )
    }
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($key:ty, $node:ty, $filter:ty) => {
        #[doc = "Position of a page boundary."]
        pub type Cursor = $crate::pagination::Cursor<$key>;

        #[doc = "Requested page."]
        pub type Request = $crate::pagination::Request<Cursor>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments<$key>;

        #[doc = "Sort key boundary of a [`Page`]."]
        pub type Boundary = $crate::pagination::Boundary<$key>;

        #[doc = "A [`Page`] of nodes."]
        pub type Page = $crate::pagination::Page<$node, $key>;

        #[doc = "[`Page`] selector."]
        #[derive(Clone, Debug)]
        pub struct Selector {
            #[doc = "Pagination [`Arguments`]."]
            pub arguments: Arguments,

            #[doc = "Additional filter being applied to the result."]
            pub filter: $filter,
        }
    };
}
