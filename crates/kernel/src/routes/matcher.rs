//! Route table: resolves URL paths to chains of reduced route nodes.
//!
//! Patterns follow the usual SPA router conventions:
//! - a child path without a leading `/` is relative to its parent
//! - an empty child path matches its parent's path
//! - `:name` captures one segment
//! - `*` captures the remainder (possibly empty) as `pathMatch`
//!
//! Children are tried before their parent, and catch-all patterns after
//! everything else.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace, warn};

use super::tree::RouteNode;
use crate::error::{RouteError, RouteResult};

/// Maximum redirects followed while resolving one navigation.
const MAX_REDIRECTS: usize = 8;

/// Name under which a `*` segment's capture is reported.
pub const WILDCARD_PARAM: &str = "pathMatch";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Wildcard,
}

/// One matchable pattern and the index path of the node it resolves to.
#[derive(Debug)]
struct RouteRecord {
    pattern: String,
    segments: Vec<Segment>,
    /// Indices from the root level down to the matched node.
    trail: Vec<usize>,
}

impl RouteRecord {
    fn is_catch_all(&self) -> bool {
        self.segments.contains(&Segment::Wildcard)
    }
}

/// Result of matching a path.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    /// Full pattern that matched (e.g. `/blog/:slug`).
    pub pattern: String,
    /// Nodes from the root down to the matched route.
    pub matched: Vec<&'a RouteNode>,
    /// Captured path parameters.
    pub params: BTreeMap<String, String>,
}

impl<'a> RouteMatch<'a> {
    /// The deepest matched node.
    pub fn leaf(&self) -> &'a RouteNode {
        // A match always carries at least one node.
        self.matched[self.matched.len() - 1]
    }
}

/// Owns the reduced tree and the patterns derived from it.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<RouteNode>,
    records: Vec<RouteRecord>,
    /// Route name -> index into `records` of its primary pattern.
    names: HashMap<String, usize>,
}

impl RouteTable {
    /// Build the table for a reduced tree.
    pub fn new(routes: Vec<RouteNode>) -> Self {
        let mut records = Vec::new();
        let mut seen = HashMap::new();
        collect_records(&routes, None, &mut Vec::new(), &mut records, &mut seen);

        // Stable partition: catch-all patterns last, otherwise definition order.
        records.sort_by_key(RouteRecord::is_catch_all);

        let mut names = HashMap::new();
        for (index, record) in records.iter().enumerate() {
            if let Some(name) = node_at(&routes, &record.trail).and_then(|n| n.name.as_deref()) {
                names.entry(name.to_string()).or_insert(index);
            }
        }

        debug!(patterns = records.len(), names = names.len(), "built route table");

        Self {
            routes,
            records,
            names,
        }
    }

    /// The reduced tree.
    pub fn routes(&self) -> &[RouteNode] {
        &self.routes
    }

    /// Match a path against the table, without following redirects.
    pub fn match_path(&self, path: &str) -> Option<RouteMatch<'_>> {
        let parts = split_path(path);

        for record in &self.records {
            let Some(params) = match_segments(&record.segments, &parts) else {
                continue;
            };
            let matched = chain(&self.routes, &record.trail);
            if matched.is_empty() {
                continue;
            }

            trace!(path = %path, pattern = %record.pattern, "route matched");
            return Some(RouteMatch {
                pattern: record.pattern.clone(),
                matched,
                params,
            });
        }

        None
    }

    /// Match a path, following `redirect`s.
    pub fn resolve(&self, path: &str) -> RouteResult<RouteMatch<'_>> {
        let mut current = path.to_string();

        for _ in 0..=MAX_REDIRECTS {
            let found = self
                .match_path(&current)
                .ok_or_else(|| RouteError::NotFound(current.clone()))?;

            let Some(redirect) = found.leaf().redirect.as_deref() else {
                return Ok(found);
            };

            let target = self.redirect_target(redirect)?;
            debug!(from = %current, to = %target, "following redirect");
            current = target;
        }

        Err(RouteError::RedirectLoop {
            path: path.to_string(),
            hops: MAX_REDIRECTS,
        })
    }

    /// Find a node by route name.
    pub fn find_by_name(&self, name: &str) -> Option<&RouteNode> {
        let record = &self.records[*self.names.get(name)?];
        node_at(&self.routes, &record.trail)
    }

    /// Full pattern of a named route.
    pub fn path_of(&self, name: &str) -> Option<&str> {
        self.names
            .get(name)
            .map(|&index| self.records[index].pattern.as_str())
    }

    /// Redirects are absolute paths or route names.
    fn redirect_target(&self, redirect: &str) -> RouteResult<String> {
        if redirect.starts_with('/') {
            return Ok(redirect.to_string());
        }

        self.path_of(redirect)
            .map(str::to_string)
            .ok_or_else(|| RouteError::NotFound(redirect.to_string()))
    }
}

fn collect_records(
    level: &[RouteNode],
    parent: Option<&str>,
    trail: &mut Vec<usize>,
    records: &mut Vec<RouteRecord>,
    seen: &mut HashMap<String, Vec<usize>>,
) {
    for (index, node) in level.iter().enumerate() {
        trail.push(index);
        let pattern = join_path(parent, &node.path);

        if let Some(children) = &node.children {
            collect_records(children, Some(pattern.as_str()), trail, records, seen);
        }

        push_record(&pattern, trail, records, seen);

        if let Some(alias) = &node.alias {
            let alias_pattern = join_path(parent, alias);
            if let Some(children) = &node.children {
                collect_records(children, Some(alias_pattern.as_str()), trail, records, seen);
            }
            push_record(&alias_pattern, trail, records, seen);
        }

        trail.pop();
    }
}

fn push_record(
    pattern: &str,
    trail: &[usize],
    records: &mut Vec<RouteRecord>,
    seen: &mut HashMap<String, Vec<usize>>,
) {
    if let Some(existing) = seen.get(pattern) {
        // An empty child path claims its parent's pattern; that is expected.
        if existing.starts_with(trail) {
            trace!(pattern = %pattern, "pattern already served by a child route");
        } else {
            warn!(pattern = %pattern, "duplicate route pattern ignored");
        }
        return;
    }
    seen.insert(pattern.to_string(), trail.to_vec());

    records.push(RouteRecord {
        pattern: pattern.to_string(),
        segments: parse_pattern(pattern),
        trail: trail.to_vec(),
    });
}

/// Join a child path onto its parent's full pattern.
fn join_path(parent: Option<&str>, path: &str) -> String {
    let joined = match parent {
        _ if path.starts_with('/') => path.to_string(),
        Some(parent) => format!("{parent}/{path}"),
        None => format!("/{path}"),
    };

    let segments: Vec<&str> = joined.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    split_path(pattern)
        .into_iter()
        .map(|segment| {
            if segment == "*" {
                Segment::Wildcard
            } else if let Some(name) = segment.strip_prefix(':') {
                Segment::Param(name.to_string())
            } else {
                Segment::Literal(segment.to_string())
            }
        })
        .collect()
}

/// Split a path into non-empty segments, ignoring query and fragment.
fn split_path(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn match_segments(pattern: &[Segment], parts: &[&str]) -> Option<BTreeMap<String, String>> {
    let mut params = BTreeMap::new();

    for (position, segment) in pattern.iter().enumerate() {
        match segment {
            Segment::Wildcard => {
                params.insert(WILDCARD_PARAM.to_string(), parts.get(position..)?.join("/"));
                return Some(params);
            }
            Segment::Param(name) => {
                params.insert(name.clone(), (*parts.get(position)?).to_string());
            }
            Segment::Literal(literal) => {
                if parts.get(position) != Some(&literal.as_str()) {
                    return None;
                }
            }
        }
    }

    (parts.len() == pattern.len()).then_some(params)
}

fn node_at<'a>(routes: &'a [RouteNode], trail: &[usize]) -> Option<&'a RouteNode> {
    chain(routes, trail).last().copied()
}

fn chain<'a>(routes: &'a [RouteNode], trail: &[usize]) -> Vec<&'a RouteNode> {
    let mut level = routes;
    let mut nodes = Vec::with_capacity(trail.len());

    for &index in trail {
        let Some(node) = level.get(index) else {
            return Vec::new();
        };
        nodes.push(node);
        level = node.children();
    }

    nodes
}
