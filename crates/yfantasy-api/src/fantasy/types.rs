//! Fantasy API response records.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::codec::{
    bool_from_int, date_from_string, deserialize_empty_string_as_none,
    deserialize_empty_string_as_none_u32,
};
use super::envelope::Games;

/// A fantasy sport for one season (e.g. `mlb` 2016).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Game {
    /// Game key used to build league and team keys (e.g. `"357"`).
    #[serde(rename = "game_key")]
    pub key: String,
    /// Numeric game ID.
    #[serde(rename = "game_id")]
    pub id: u32,
    /// Display name (e.g. "Baseball").
    pub name: String,
    /// Sport code (e.g. `nfl`, `mlb`).
    pub code: String,
    /// Game type (`full`, `pickem-team`, ...).
    #[serde(
        rename = "type",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub game_type: Option<String>,
    /// Game home page.
    pub url: String,
    /// Four digit season year.
    pub season: u32,
    /// Whether registration for new teams has closed.
    #[serde(
        rename = "is_registration_over",
        deserialize_with = "bool_from_int",
        default
    )]
    pub registration_closed: bool,
    /// Whether the season has ended.
    #[serde(deserialize_with = "bool_from_int", default)]
    pub is_game_over: bool,
    /// Whether the sport is currently in its offseason.
    #[serde(deserialize_with = "bool_from_int", default)]
    pub is_offseason: bool,
}

/// A league within a game.
///
/// Leagues only exist in the context of a game; `game_code` and `season`
/// identify it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct League {
    /// League ID, unique within its game.
    #[serde(rename = "league_id")]
    pub id: u64,
    /// League key (`{game_key}.l.{league_id}`).
    #[serde(rename = "league_key")]
    pub key: String,
    /// League name.
    pub name: String,
    /// League home page.
    pub url: String,
    /// Chat room ID (absent for leagues without chat).
    #[serde(
        rename = "league_chat_id",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub chat_id: Option<String>,
    /// Draft status (`predraft`, `postdraft`, ...).
    pub draft_status: String,
    /// Number of teams signed up.
    pub num_teams: u32,
    /// Scoring style (`head`, `roto`, `point`, ...).
    pub scoring_type: String,
    /// `public` or `private`.
    #[serde(
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub league_type: Option<String>,
    /// First day of the season.
    #[serde(deserialize_with = "date_from_string")]
    pub start_date: NaiveDate,
    /// Last day of the season.
    #[serde(deserialize_with = "date_from_string")]
    pub end_date: NaiveDate,
    /// Code of the game this league belongs to.
    pub game_code: String,
    /// Four digit season year.
    pub season: u32,
    /// Current scoring week.
    #[serde(deserialize_with = "deserialize_empty_string_as_none_u32", default)]
    pub current_week: Option<u32>,
    /// First scoring week.
    #[serde(deserialize_with = "deserialize_empty_string_as_none_u32", default)]
    pub start_week: Option<u32>,
    /// Last scoring week.
    #[serde(deserialize_with = "deserialize_empty_string_as_none_u32", default)]
    pub end_week: Option<u32>,
    /// Whether the league's season is complete.
    #[serde(deserialize_with = "bool_from_int", default)]
    pub is_finished: bool,
}

/// A team manager within a league.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Manager {
    /// Yahoo GUID of the manager's account.
    pub guid: String,
    /// Manager ID within the league.
    pub manager_id: String,
    /// Nickname shown within the league.
    #[serde(rename = "nickname")]
    pub name: String,
    /// Contact address (only visible to league members).
    #[serde(deserialize_with = "deserialize_empty_string_as_none", default)]
    pub email: Option<String>,
    /// Avatar URL.
    #[serde(deserialize_with = "deserialize_empty_string_as_none", default)]
    pub image_url: Option<String>,
    /// Whether this manager is the authenticated caller.
    #[serde(
        rename = "is_current_login",
        deserialize_with = "bool_from_int",
        default
    )]
    pub is_active_user: bool,
    /// Whether this manager administers the league.
    #[serde(deserialize_with = "bool_from_int", default)]
    pub is_commissioner: bool,
}

/// A Yahoo account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    /// Unique user ID.
    pub guid: String,
    /// Games requested alongside the user (empty when not requested).
    #[serde(deserialize_with = "deserialize_games", default)]
    pub games: Vec<Game>,
}

/// Unwraps a nested `<games><game/>...</games>` collection.
fn deserialize_games<'de, D>(deserializer: D) -> Result<Vec<Game>, D::Error>
where
    D: Deserializer<'de>,
{
    Games::<Game>::deserialize(deserializer).map(|games| games.items)
}
