//! Recursive-descent parser for the URL grammar.
//!
//! ```text
//! urltree   = "/"? children ("?" query)? ("#" fragment)?
//! children  = segment ( "/" segment )* ( "/(" group ")" )?
//!           | "(" group ")"
//! group     = outletBlock ( "//" outletBlock )*
//! outletBlock = ( name ":" )? children
//! segment   = pathToken (";" matrixParam)*
//! ```
//!
//! Path tokens match `[^/()?;=#]+`, query keys `[^=?&#]+` and query
//! values `[^?&#]+`. Repeated query keys accumulate into a list in
//! insertion order.

use super::encoding::{decode, decode_query};
use super::tree::{UrlSegment, UrlSegmentGroup, UrlTree, PRIMARY_OUTLET};
use crate::errors::UrlParseError;
use crate::params::{ParamMap, QueryParams};
use regex::Regex;
use std::sync::{Arc, OnceLock};

fn segment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^/()?;=#]+").expect("failed to compile segment regex"))
}

fn query_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^=?&#]+").expect("failed to compile query key regex"))
}

fn query_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^?&#]+").expect("failed to compile query value regex"))
}

fn match_token<'a>(re: &Regex, input: &'a str) -> &'a str {
    re.find(input).map(|m| m.as_str()).unwrap_or("")
}

/// Parse a URL string into a [`UrlTree`].
pub(crate) fn parse_url(url: &str) -> Result<UrlTree, UrlParseError> {
    let mut parser = UrlParser {
        url,
        remaining: url,
    };
    let root = parser.parse_root_segment()?;
    let query_params = parser.parse_query_params()?;
    let fragment = parser.parse_fragment();
    if !parser.remaining.is_empty() {
        return Err(UrlParseError::TrailingInput {
            url: url.to_string(),
            remaining: parser.remaining.to_string(),
        });
    }
    Ok(UrlTree::new(root, query_params, fragment))
}

struct UrlParser<'a> {
    #[allow(dead_code)]
    url: &'a str,
    remaining: &'a str,
}

impl<'a> UrlParser<'a> {
    fn peek_starts_with(&self, s: &str) -> bool {
        self.remaining.starts_with(s)
    }

    fn consume_optional(&mut self, s: &str) -> bool {
        if let Some(rest) = self.remaining.strip_prefix(s) {
            self.remaining = rest;
            true
        } else {
            false
        }
    }

    fn capture(&mut self, s: &str) -> Result<(), UrlParseError> {
        if self.consume_optional(s) {
            Ok(())
        } else {
            Err(UrlParseError::Expected {
                expected: s.to_string(),
                remaining: self.remaining.to_string(),
            })
        }
    }

    fn parse_root_segment(&mut self) -> Result<Arc<UrlSegmentGroup>, UrlParseError> {
        self.consume_optional("/");
        if self.remaining.is_empty() || self.peek_starts_with("?") || self.peek_starts_with("#") {
            return Ok(UrlSegmentGroup::empty());
        }
        let children = self.parse_children()?;
        Ok(UrlSegmentGroup::new(Vec::new(), children))
    }

    fn parse_children(&mut self) -> Result<Vec<(String, Arc<UrlSegmentGroup>)>, UrlParseError> {
        if self.remaining.is_empty() {
            return Ok(Vec::new());
        }
        self.consume_optional("/");

        let mut segments = Vec::new();
        if !self.peek_starts_with("(") {
            segments.push(self.parse_segment()?);
        }
        while self.peek_starts_with("/")
            && !self.peek_starts_with("//")
            && !self.peek_starts_with("/(")
        {
            self.capture("/")?;
            segments.push(self.parse_segment()?);
        }

        // "/(...)" attaches a group as children of the segment chain;
        // a nameless block there defaults to the primary outlet.
        let mut nested_children = Vec::new();
        if self.peek_starts_with("/(") {
            self.capture("/")?;
            nested_children = self.parse_parens(true)?;
        }

        // "(...)" without the slash opens sibling outlets at this level.
        let mut result = Vec::new();
        if self.peek_starts_with("(") {
            result = self.parse_parens(false)?;
        }

        if !segments.is_empty() || !nested_children.is_empty() {
            result.retain(|(name, _)| name != PRIMARY_OUTLET);
            result.insert(
                0,
                (
                    PRIMARY_OUTLET.to_string(),
                    UrlSegmentGroup::new(segments, nested_children),
                ),
            );
        }
        Ok(result)
    }

    fn parse_segment(&mut self) -> Result<UrlSegment, UrlParseError> {
        let path = match_token(segment_re(), self.remaining).to_string();
        if path.is_empty() && self.peek_starts_with(";") {
            return Err(UrlParseError::EmptyPathWithParams {
                remaining: self.remaining.to_string(),
            });
        }
        self.capture(&path)?;
        let parameters = self.parse_matrix_params()?;
        Ok(UrlSegment::with_parameters(decode(&path), parameters))
    }

    fn parse_matrix_params(&mut self) -> Result<ParamMap, UrlParseError> {
        let mut params = ParamMap::new();
        while self.consume_optional(";") {
            self.parse_param(&mut params)?;
        }
        Ok(params)
    }

    fn parse_param(&mut self, params: &mut ParamMap) -> Result<(), UrlParseError> {
        let key = match_token(segment_re(), self.remaining).to_string();
        if key.is_empty() {
            return Ok(());
        }
        self.capture(&key)?;
        let mut value = String::new();
        if self.consume_optional("=") {
            let v = match_token(segment_re(), self.remaining).to_string();
            if !v.is_empty() {
                self.capture(&v)?;
                value = v;
            }
        }
        params.insert(decode(&key), decode(&value));
        Ok(())
    }

    fn parse_parens(
        &mut self,
        allow_primary: bool,
    ) -> Result<Vec<(String, Arc<UrlSegmentGroup>)>, UrlParseError> {
        let mut groups: Vec<(String, Arc<UrlSegmentGroup>)> = Vec::new();
        self.capture("(")?;
        while !self.consume_optional(")") && !self.remaining.is_empty() {
            let path = match_token(segment_re(), self.remaining).to_string();
            // A token inside parens must be followed by '/', ')' or ';'.
            match self.remaining[path.len()..].chars().next() {
                Some('/') | Some(')') | Some(';') => {}
                _ => {
                    return Err(UrlParseError::UnexpectedToken {
                        remaining: self.remaining.to_string(),
                    });
                }
            }
            let outlet_name = if let Some(colon) = path.find(':') {
                let name = path[..colon].to_string();
                self.capture(&name)?;
                self.capture(":")?;
                name
            } else if allow_primary {
                PRIMARY_OUTLET.to_string()
            } else {
                return Err(UrlParseError::UnexpectedToken {
                    remaining: self.remaining.to_string(),
                });
            };
            let children = self.parse_children()?;
            let group = if children.len() == 1 && children[0].0 == PRIMARY_OUTLET {
                children.into_iter().next().map(|(_, g)| g).expect("checked length")
            } else {
                UrlSegmentGroup::new(Vec::new(), children)
            };
            if let Some(slot) = groups.iter_mut().find(|(name, _)| *name == outlet_name) {
                slot.1 = group;
            } else {
                groups.push((outlet_name, group));
            }
            self.consume_optional("//");
        }
        Ok(groups)
    }

    fn parse_query_params(&mut self) -> Result<QueryParams, UrlParseError> {
        let mut params = QueryParams::new();
        if self.consume_optional("?") {
            loop {
                self.parse_query_param(&mut params)?;
                if !self.consume_optional("&") {
                    break;
                }
            }
        }
        Ok(params)
    }

    fn parse_query_param(&mut self, params: &mut QueryParams) -> Result<(), UrlParseError> {
        let key = match_token(query_key_re(), self.remaining).to_string();
        if key.is_empty() {
            return Ok(());
        }
        self.capture(&key)?;
        let mut value = String::new();
        if self.consume_optional("=") {
            let v = match_token(query_value_re(), self.remaining).to_string();
            if !v.is_empty() {
                self.capture(&v)?;
                value = v;
            }
        }
        params.append(decode_query(&key), decode_query(&value));
        Ok(())
    }

    fn parse_fragment(&mut self) -> Option<String> {
        if self.consume_optional("#") {
            let fragment = decode(self.remaining);
            self.remaining = "";
            Some(fragment)
        } else {
            None
        }
    }
}
