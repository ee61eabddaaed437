use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::models::EntityKind;

/// Every screen the application can show, addressable by path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Home,
    List(EntityKind),
    Create(EntityKind),
    View(EntityKind, i32),
    Edit(EntityKind, i32),
}

impl Route {
    pub fn requires_auth(self) -> bool {
        !matches!(self, Route::Login)
    }

    pub fn entity(self) -> Option<EntityKind> {
        match self {
            Route::Login | Route::Home => None,
            Route::List(kind) | Route::Create(kind) | Route::View(kind, _) | Route::Edit(kind, _) => Some(kind),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Login => write!(f, "/login"),
            Route::Home => write!(f, "/home"),
            Route::List(kind) => write!(f, "/{}", kind.collection()),
            Route::Create(kind) => write!(f, "/{}", kind.resource()),
            Route::View(kind, id) => write!(f, "/{}/view/{id}", kind.resource()),
            Route::Edit(kind, id) => write!(f, "/{}/edit/{id}", kind.resource()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown route {0:?}")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownRoute(path.to_string());
        let segments: Vec<&str> = path.trim().trim_matches('/').split('/').collect();

        let by_resource = |segment: &str| EntityKind::ALL.into_iter().find(|k| k.resource() == segment);
        let by_collection = |segment: &str| EntityKind::ALL.into_iter().find(|k| k.collection() == segment);

        match segments.as_slice() {
            ["" | "home"] => Ok(Route::Home),
            ["login"] => Ok(Route::Login),
            [segment] => by_collection(*segment)
                .map(Route::List)
                .or_else(|| by_resource(*segment).map(Route::Create))
                .ok_or_else(unknown),
            [segment, opr, id] => {
                let kind = by_resource(*segment).ok_or_else(unknown)?;
                let id = id.parse::<i32>().map_err(|_| unknown())?;
                match *opr {
                    "view" => Ok(Route::View(kind, id)),
                    "edit" => Ok(Route::Edit(kind, id)),
                    _ => Err(unknown()),
                }
            }
            _ => Err(unknown()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_roundtrip() {
        for route in [
            Route::Login,
            Route::Home,
            Route::List(EntityKind::Client),
            Route::Create(EntityKind::Employee),
            Route::View(EntityKind::Client, 42),
            Route::Edit(EntityKind::Product, 7),
        ] {
            assert_eq!(route.to_string().parse::<Route>(), Ok(route));
        }
    }

    #[test]
    fn known_paths() {
        assert_eq!("/cliente/view/42".parse::<Route>(), Ok(Route::View(EntityKind::Client, 42)));
        assert_eq!("/produtos".parse::<Route>(), Ok(Route::List(EntityKind::Product)));
        assert_eq!("/funcionario".parse::<Route>(), Ok(Route::Create(EntityKind::Employee)));
        assert_eq!("/".parse::<Route>(), Ok(Route::Home));
    }

    #[test]
    fn bad_paths() {
        assert!("/cliente/delete/1".parse::<Route>().is_err());
        assert!("/cliente/view/abc".parse::<Route>().is_err());
        assert!("/pedidos".parse::<Route>().is_err());
    }

    #[test]
    fn only_login_is_public() {
        assert!(!Route::Login.requires_auth());
        assert!(Route::Home.requires_auth());
        assert!(Route::List(EntityKind::Client).requires_auth());
    }
}
