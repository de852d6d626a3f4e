//! Response envelope handling.
//!
//! Every response is wrapped in a `fantasy_content` root. Depending on how
//! the query was scoped, the requested collection is either a direct child
//! of the root or nested under `users>user`. The extraction path for each
//! resource and shape is listed in [`extraction_path`]; the generic wrapper
//! types below mirror those paths one element at a time.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Deserialize;

use super::query::{Resource, Shape};
use super::types::{Game, League, User};
use crate::error::DecodeError;

/// Root element of every successful response.
pub const ROOT_ELEMENT: &str = "fantasy_content";

/// Root element of service error documents.
const FAULT_ELEMENT: &[u8] = b"error";

/// Element path (below the root) at which records of `resource` are found.
#[must_use]
pub const fn extraction_path(resource: Resource, shape: Shape) -> &'static [&'static str] {
    match (resource, shape) {
        (Resource::Users, Shape::Direct | Shape::UserScoped) => &["users", "user"],
        (Resource::Games, Shape::Direct) => &["games", "game"],
        (Resource::Games, Shape::UserScoped) => &["users", "user", "games", "game"],
        (Resource::Leagues, Shape::Direct) => &["leagues", "league"],
        (Resource::Leagues, Shape::UserScoped) => {
            &["users", "user", "games", "game", "leagues", "league"]
        }
    }
}

/// `<users>` collection.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Users<T> {
    /// `<user>` children.
    #[serde(rename = "user", default)]
    pub items: Vec<T>,
}

/// `<games>` collection.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Games<T> {
    /// `<game>` children.
    #[serde(rename = "game", default)]
    pub items: Vec<T>,
}

/// `<leagues>` collection.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Leagues<T> {
    /// `<league>` children.
    #[serde(rename = "league", default)]
    pub items: Vec<T>,
}

/// Any element whose `<users>` child is of interest (the root).
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct WithUsers<T> {
    #[serde(default)]
    users: Option<Users<T>>,
}

/// Any element whose `<games>` child is of interest (root or `<user>`).
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct WithGames<T> {
    #[serde(default)]
    games: Option<Games<T>>,
}

/// Any element whose `<leagues>` child is of interest (root or `<game>`).
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct WithLeagues<T> {
    #[serde(default)]
    leagues: Option<Leagues<T>>,
}

/// Service error document (`<error><description>..</description></error>`).
#[derive(Debug, Deserialize)]
struct FaultDocument {
    #[serde(default)]
    description: String,
}

/// Record type that can be pulled out of a `fantasy_content` document.
pub trait Extract: Sized {
    /// Decodes every record at the extraction path for `shape`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not deserialize or the first
    /// node of the path is absent.
    fn extract(xml: &str, shape: Shape) -> Result<Vec<Self>, DecodeError>;
}

impl Extract for User {
    fn extract(xml: &str, shape: Shape) -> Result<Vec<Self>, DecodeError> {
        let root: WithUsers<Self> = quick_xml::de::from_str(xml)?;
        let users = root
            .users
            .ok_or_else(|| missing_node(Resource::Users, shape))?;
        Ok(users.items)
    }
}

impl Extract for Game {
    fn extract(xml: &str, shape: Shape) -> Result<Vec<Self>, DecodeError> {
        match shape {
            Shape::Direct => {
                let root: WithGames<Self> = quick_xml::de::from_str(xml)?;
                let games = root
                    .games
                    .ok_or_else(|| missing_node(Resource::Games, shape))?;
                Ok(games.items)
            }
            Shape::UserScoped => {
                let root: WithUsers<WithGames<Self>> = quick_xml::de::from_str(xml)?;
                let users = root
                    .users
                    .ok_or_else(|| missing_node(Resource::Games, shape))?;
                Ok(users
                    .items
                    .into_iter()
                    .filter_map(|user| user.games)
                    .flat_map(|games| games.items)
                    .collect())
            }
        }
    }
}

impl Extract for League {
    fn extract(xml: &str, shape: Shape) -> Result<Vec<Self>, DecodeError> {
        match shape {
            Shape::Direct => {
                let root: WithLeagues<Self> = quick_xml::de::from_str(xml)?;
                let leagues = root
                    .leagues
                    .ok_or_else(|| missing_node(Resource::Leagues, shape))?;
                Ok(leagues.items)
            }
            Shape::UserScoped => {
                let root: WithUsers<WithGames<WithLeagues<Self>>> = quick_xml::de::from_str(xml)?;
                let users = root
                    .users
                    .ok_or_else(|| missing_node(Resource::Leagues, shape))?;
                Ok(users
                    .items
                    .into_iter()
                    .filter_map(|user| user.games)
                    .flat_map(|games| games.items)
                    .filter_map(|game| game.leagues)
                    .flat_map(|leagues| leagues.items)
                    .collect())
            }
        }
    }
}

fn missing_node(resource: Resource, shape: Shape) -> DecodeError {
    let path = extraction_path(resource, shape);
    DecodeError::MissingNode {
        node: path.first().copied().unwrap_or(ROOT_ELEMENT),
        path: format!("{ROOT_ELEMENT}>{}", path.join(">")),
    }
}

/// Outcome of parsing a response body.
#[derive(Debug)]
pub enum Parsed<T> {
    /// Records found at the extraction path (possibly none).
    Records(Vec<T>),
    /// The service returned an error document.
    Fault {
        /// Message reported by the service.
        description: String,
    },
}

/// Parses a response body into records of `T`.
///
/// The root element is inspected first: `fantasy_content` is decoded along
/// the extraction path for `shape`, an `error` root is reported as
/// [`Parsed::Fault`], anything else is a decode error.
///
/// # Errors
///
/// Returns an error if the body has no root element, an unexpected root,
/// malformed XML, a missing collection node, or a field that fails its codec.
pub fn parse<T: Extract>(xml: &str, shape: Shape) -> Result<Parsed<T>, DecodeError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                return classify_root(&e, xml, shape);
            }
            Event::Eof => return Err(DecodeError::MissingRoot),
            _ => {}
        }
    }
}

fn classify_root<T: Extract>(
    root: &BytesStart<'_>,
    xml: &str,
    shape: Shape,
) -> Result<Parsed<T>, DecodeError> {
    let name = root.local_name();
    if name.as_ref() == ROOT_ELEMENT.as_bytes() {
        return T::extract(xml, shape).map(Parsed::Records);
    }
    if name.as_ref() == FAULT_ELEMENT {
        let fault: FaultDocument = quick_xml::de::from_str(xml)?;
        return Ok(Parsed::Fault {
            description: fault.description.trim().to_owned(),
        });
    }
    Err(DecodeError::UnexpectedRoot {
        found: String::from_utf8_lossy(name.as_ref()).into_owned(),
    })
}
