//! Route table consulted by the guard.
//!
//! Records nest like the application's layouts: a child inherits nothing
//! explicitly, but the guard sees the whole matched chain, so a protected
//! parent protects every child. `:name` segments match any single segment.

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    pub name: Option<String>,
    /// Path relative to the parent; may span several segments.
    pub path: String,
    pub requires_auth: bool,
    /// Query parameter that must be present and non-empty to enter.
    pub required_query: Option<String>,
    pub children: Vec<RouteRecord>,
}

impl RouteRecord {
    pub fn new(path: &str) -> Self {
        Self { name: None, path: path.to_owned(), requires_auth: false, required_query: None, children: Vec::new() }
    }

    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    #[must_use]
    pub fn protected(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    #[must_use]
    pub fn requires_query(mut self, param: &str) -> Self {
        self.required_query = Some(param.to_owned());
        self
    }

    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = RouteRecord>) -> Self {
        self.children.extend(children);
        self
    }

    fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    records: Vec<RouteRecord>,
}

impl RouteTable {
    pub fn new(records: Vec<RouteRecord>) -> Self {
        Self { records }
    }

    /// The application's routes.
    pub fn cyclity() -> Self {
        Self::new(vec![
            RouteRecord::new("/").named("Home"),
            RouteRecord::new("/auth").children([
                RouteRecord::new("login").named("Login"),
                RouteRecord::new("register").named("Register"),
                RouteRecord::new("forgot-password").named("ForgotPassword"),
                RouteRecord::new("reset-password").named("ResetPassword").requires_query("token"),
                RouteRecord::new("activate").named("ConfirmEmail").requires_query("token"),
                RouteRecord::new("pages/error").named("Error 404"),
            ]),
            RouteRecord::new("/dashboard").named("Dashboard").protected().children([
                RouteRecord::new("activities").named("Activities"),
                RouteRecord::new("activities/:id").named("Activity"),
            ]),
            RouteRecord::new("/settings").named("Settings").protected().children([
                RouteRecord::new("profile").named("Profile"),
                RouteRecord::new("strava").named("StravaLink"),
            ]),
        ])
    }

    /// Records matched by `path`, outermost first. Empty when nothing matches.
    pub fn resolve(&self, path: &str) -> Vec<&RouteRecord> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut chain = Vec::new();
        match_records(&self.records, &segments, &mut chain);
        chain
    }

    /// Whether `path`, or any prefix of it that names a record, requires
    /// auth. Unlisted paths under a protected record are protected too.
    pub fn requires_auth(&self, path: &str) -> bool {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        any_protected_prefix(&self.records, &segments)
    }

    /// Absolute path of the record called `name`.
    pub fn path_of(&self, name: &str) -> Option<String> {
        find_named(&self.records, name, "")
    }
}

fn match_records<'a>(records: &'a [RouteRecord], remaining: &[&str], chain: &mut Vec<&'a RouteRecord>) -> bool {
    for record in records {
        let parts = record.segments();
        if !is_prefix(&parts, remaining) {
            continue;
        }

        chain.push(record);
        let rest = &remaining[parts.len()..];
        if rest.is_empty() || match_records(&record.children, rest, chain) {
            return true;
        }
        chain.pop();
    }
    false
}

fn any_protected_prefix(records: &[RouteRecord], remaining: &[&str]) -> bool {
    records.iter().any(|record| {
        let parts = record.segments();
        is_prefix(&parts, remaining)
            && (record.requires_auth || any_protected_prefix(&record.children, &remaining[parts.len()..]))
    })
}

fn is_prefix(parts: &[&str], segments: &[&str]) -> bool {
    parts.len() <= segments.len()
        && parts
            .iter()
            .zip(segments)
            .all(|(part, segment)| part.starts_with(':') || part == segment)
}

fn find_named(records: &[RouteRecord], name: &str, prefix: &str) -> Option<String> {
    for record in records {
        let joined = join_path(prefix, &record.path);
        if record.name.as_deref() == Some(name) {
            return Some(joined);
        }
        if let Some(found) = find_named(&record.children, name, &joined) {
            return Some(found);
        }
    }
    None
}

fn join_path(prefix: &str, path: &str) -> String {
    let parts: Vec<&str> = prefix
        .split('/')
        .chain(path.split('/'))
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", parts.join("/"))
}

impl fmt::Display for RouteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} ({})", self.path),
            None => f.write_str(&self.path),
        }
    }
}
