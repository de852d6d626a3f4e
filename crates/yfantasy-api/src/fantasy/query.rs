//! Query values that compose into fantasy API request paths.
//!
//! A query is a plain value: its path is a pure function of its fields and
//! of the filters nested inside it. Filters are rendered as matrix
//! parameters (`;key=value`) on the segment they restrict, and nested
//! filters always precede the segment of the resource being requested.

use std::fmt;

use super::envelope::Extract;
use super::types::{Game, League, User};

/// Resource collection returned by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// `users>user`
    Users,
    /// `games>game`
    Games,
    /// `leagues>league`
    Leagues,
}

impl Resource {
    /// Collection element name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Games => "games",
            Self::Leagues => "leagues",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the requested collection sits in the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Collection is a direct child of the envelope root.
    Direct,
    /// Collection is nested under `users>user`.
    UserScoped,
}

/// A request that can be turned into a URL and decoded into records.
pub trait Query {
    /// Record type of the returned collection.
    type Item: Extract;

    /// Resource collection this query returns.
    const RESOURCE: Resource;

    /// Request path without leading separator or query string.
    fn path(&self) -> String;

    /// Envelope shape of the response, decided by the nested filters only.
    fn shape(&self) -> Shape;

    /// Full request URL: `base + path + "?format=xml"`.
    ///
    /// `base` is expected to end with `/`.
    fn url(&self, base: &str) -> String {
        format!("{base}{}?format=xml", self.path())
    }
}

/// Accumulates path segments and remembers whether a games segment exists.
#[derive(Debug, Default)]
struct PathComposer {
    segments: Vec<String>,
    has_games: bool,
}

impl PathComposer {
    fn push(&mut self, name: &str, param: Option<String>) {
        let segment = match param {
            Some(param) => format!("{name};{param}"),
            None => String::from(name),
        };
        self.segments.push(segment);
    }

    fn finish(self) -> String {
        self.segments.join("/")
    }
}

/// User-level filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Restrict to the authenticated caller (`;use_login=1`).
    pub active_user: bool,
}

impl UserFilter {
    /// Filter for the authenticated caller.
    #[must_use]
    pub const fn active() -> Self {
        Self { active_user: true }
    }

    fn compose(self, path: &mut PathComposer) {
        path.push(
            Resource::Users.as_str(),
            self.active_user.then(|| String::from("use_login=1")),
        );
    }
}

/// Game-level filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameFilter {
    /// Restrict to games currently open (`;is_available=1`).
    pub available: bool,
}

impl GameFilter {
    /// Filter for games open for registration.
    #[must_use]
    pub const fn available() -> Self {
        Self { available: true }
    }

    fn compose(self, path: &mut PathComposer) {
        path.push(
            Resource::Games.as_str(),
            self.available.then(|| String::from("is_available=1")),
        );
        path.has_games = true;
    }
}

/// Query for users, optionally with their games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserQuery {
    /// Restrict to the authenticated caller.
    pub active_user: bool,
    /// Include the users' games, filtered.
    pub games: Option<GameFilter>,
}

impl UserQuery {
    /// Query for the authenticated caller.
    #[must_use]
    pub const fn active() -> Self {
        Self {
            active_user: true,
            games: None,
        }
    }

    /// Also requests the users' games matching `games`.
    #[must_use]
    pub const fn with_games(mut self, games: GameFilter) -> Self {
        self.games = Some(games);
        self
    }

    fn compose(self, path: &mut PathComposer) {
        UserFilter {
            active_user: self.active_user,
        }
        .compose(path);
        if let Some(games) = self.games {
            games.compose(path);
        }
    }
}

impl Query for UserQuery {
    type Item = User;
    const RESOURCE: Resource = Resource::Users;

    fn path(&self) -> String {
        let mut path = PathComposer::default();
        self.compose(&mut path);
        path.finish()
    }

    fn shape(&self) -> Shape {
        Shape::Direct
    }
}

/// Query for games, optionally scoped to a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameQuery {
    /// Only games of the matching user(s).
    pub user: Option<UserFilter>,
    /// Restrict to games currently open.
    pub available: bool,
}

impl GameQuery {
    /// Query for games open for registration.
    #[must_use]
    pub const fn available() -> Self {
        Self {
            user: None,
            available: true,
        }
    }

    /// Scopes the query to users matching `user`.
    #[must_use]
    pub const fn for_user(mut self, user: UserFilter) -> Self {
        self.user = Some(user);
        self
    }

    /// Scopes the query to the authenticated caller.
    #[must_use]
    pub const fn for_active_user(self) -> Self {
        self.for_user(UserFilter::active())
    }
}

impl Query for GameQuery {
    type Item = Game;
    const RESOURCE: Resource = Resource::Games;

    fn path(&self) -> String {
        let mut path = PathComposer::default();
        if let Some(user) = self.user {
            user.compose(&mut path);
        }
        GameFilter {
            available: self.available,
        }
        .compose(&mut path);
        path.finish()
    }

    fn shape(&self) -> Shape {
        match self.user {
            Some(_) => Shape::UserScoped,
            None => Shape::Direct,
        }
    }
}

/// Query for leagues, optionally scoped to a user and their games.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeagueQuery {
    /// Only leagues of the matching user(s), within their filtered games.
    pub user: Option<UserQuery>,
    /// Specific league keys. Empty means no key filter.
    pub keys: Vec<String>,
}

impl LeagueQuery {
    /// Query for specific leagues by key.
    #[must_use]
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user: None,
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Scopes the query to users (and their games) matching `user`.
    #[must_use]
    pub fn for_user(mut self, user: UserQuery) -> Self {
        self.user = Some(user);
        self
    }
}

impl Query for LeagueQuery {
    type Item = League;
    const RESOURCE: Resource = Resource::Leagues;

    fn path(&self) -> String {
        let mut path = PathComposer::default();
        if let Some(user) = self.user {
            user.compose(&mut path);
            // A league only exists within a game.
            if !path.has_games {
                GameFilter::default().compose(&mut path);
            }
        }
        let keys = (!self.keys.is_empty()).then(|| format!("league_keys={}", self.keys.join(",")));
        path.push(Resource::Leagues.as_str(), keys);
        path.finish()
    }

    fn shape(&self) -> Shape {
        match self.user {
            Some(_) => Shape::UserScoped,
            None => Shape::Direct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://fantasysports.yahooapis.com/fantasy/v2/";

    #[test]
    fn test_game_query_url() {
        // Arrange
        let cases = [
            (GameQuery::available(), "games;is_available=1"),
            (GameQuery::default().for_active_user(), "users;use_login=1/games"),
            (
                GameQuery::available().for_active_user(),
                "users;use_login=1/games;is_available=1",
            ),
            (GameQuery::default(), "games"),
        ];

        // Act & Assert
        for (query, path) in cases {
            assert_eq!(query.url(BASE), format!("{BASE}{path}?format=xml"));
        }
    }

    #[test]
    fn test_user_query_path() {
        // Arrange & Act & Assert
        assert_eq!(UserQuery::active().path(), "users;use_login=1");
        assert_eq!(UserQuery::default().path(), "users");
        assert_eq!(
            UserQuery::active()
                .with_games(GameFilter::available())
                .path(),
            "users;use_login=1/games;is_available=1"
        );
        assert_eq!(
            UserQuery::active().with_games(GameFilter::default()).path(),
            "users;use_login=1/games"
        );
    }

    #[test]
    fn test_league_query_path() {
        // Arrange
        let cases = [
            (
                LeagueQuery::default().for_user(UserQuery::active()),
                "users;use_login=1/games/leagues",
            ),
            (
                LeagueQuery::with_keys(["357.l.37903", "357.l.37825"]),
                "leagues;league_keys=357.l.37903,357.l.37825",
            ),
            (
                LeagueQuery::default()
                    .for_user(UserQuery::active().with_games(GameFilter::available())),
                "users;use_login=1/games;is_available=1/leagues",
            ),
            (
                LeagueQuery::with_keys(["357.l.37903"])
                    .for_user(UserQuery::active().with_games(GameFilter::available())),
                "users;use_login=1/games;is_available=1/leagues;league_keys=357.l.37903",
            ),
        ];

        // Act & Assert
        for (query, path) in cases {
            assert_eq!(query.path(), path);
        }
    }

    #[test]
    fn test_league_query_empty_keys_equals_no_filter() {
        // Arrange
        let empty = LeagueQuery {
            user: None,
            keys: Vec::new(),
        };
        let absent = LeagueQuery::default();

        // Act & Assert
        assert_eq!(empty.path(), absent.path());
        assert_eq!(empty.path(), "leagues");
    }

    #[test]
    fn test_league_keys_preserve_order() {
        // Arrange
        let query = LeagueQuery::with_keys(["b", "a", "c"]);

        // Act & Assert
        assert_eq!(query.path(), "leagues;league_keys=b,a,c");
    }

    #[test]
    fn test_league_key_containing_games_does_not_suppress_segment() {
        // Arrange
        let query = LeagueQuery::with_keys(["games.l.1"]).for_user(UserQuery::active());

        // Act & Assert
        assert_eq!(
            query.path(),
            "users;use_login=1/games/leagues;league_keys=games.l.1"
        );
    }

    #[test]
    fn test_paths_have_no_stray_separators() {
        // Arrange
        let game_filters = [None, Some(GameFilter::default()), Some(GameFilter::available())];
        let mut paths = Vec::new();
        for active_user in [false, true] {
            for games in game_filters {
                let user = UserQuery { active_user, games };
                paths.push(user.path());
                for keys in [vec![], vec![String::from("357.l.1")]] {
                    paths.push(LeagueQuery { user: None, keys: keys.clone() }.path());
                    paths.push(LeagueQuery { user: Some(user), keys }.path());
                }
            }
            for available in [false, true] {
                paths.push(GameQuery { user: None, available }.path());
                paths.push(
                    GameQuery {
                        user: Some(UserFilter { active_user }),
                        available,
                    }
                    .path(),
                );
            }
        }

        // Act & Assert
        for path in paths {
            assert!(!path.starts_with('/'), "{path}");
            assert!(!path.ends_with('/'), "{path}");
            assert!(!path.contains("//"), "{path}");
            assert!(!path.is_empty());
        }
    }

    #[test]
    fn test_shape_follows_user_ancestor() {
        // Arrange & Act & Assert
        assert_eq!(UserQuery::active().shape(), Shape::Direct);
        assert_eq!(GameQuery::available().shape(), Shape::Direct);
        assert_eq!(
            GameQuery::available().for_active_user().shape(),
            Shape::UserScoped
        );
        assert_eq!(LeagueQuery::with_keys(["a"]).shape(), Shape::Direct);
        assert_eq!(
            LeagueQuery::default().for_user(UserQuery::default()).shape(),
            Shape::UserScoped
        );
    }

    #[test]
    fn test_resource_display() {
        // Arrange & Act & Assert
        assert_eq!(Resource::Users.to_string(), "users");
        assert_eq!(UserQuery::RESOURCE, Resource::Users);
        assert_eq!(GameQuery::RESOURCE, Resource::Games);
        assert_eq!(LeagueQuery::RESOURCE, Resource::Leagues);
    }
}
